use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cannot pack directory `{}`", .path.display())]
    Pack {
        path: PathBuf,
        #[source]
        source: embedzip_format::PackError,
    },

    #[error("Cannot open chunks `{}`", .path.display())]
    OpenChunks {
        path: PathBuf,
        #[source]
        source: embedzip_format::OpenError,
    },

    #[error("Cannot open archive `{}`", .path.display())]
    OpenArchive {
        path: PathBuf,
        #[source]
        source: embedzip_format::OpenError,
    },

    #[error("Cannot extract files to `{}`", .path.display())]
    Extract {
        path: PathBuf,
        #[source]
        source: embedzip_format::ExtractError,
    },

    #[error("{failed} of {total} entries could not be extracted")]
    Incomplete { failed: usize, total: usize },

    #[error("Cannot serialize listing")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },
}
