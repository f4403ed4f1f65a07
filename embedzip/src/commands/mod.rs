pub mod extract;
pub mod list;
pub mod pack;

pub use extract::run as extract;
pub use extract::unzip;
pub use list::run as list;
pub use pack::run as pack;

#[inline(always)]
pub(crate) fn human_size(bytes: u64) -> String {
    use humansize::{file_size_opts as options, FileSize};

    bytes
        .file_size(options::BINARY)
        .unwrap_or_else(|_| bytes.to_string())
}
