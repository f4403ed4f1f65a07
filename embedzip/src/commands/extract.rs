use std::path::{Path, PathBuf};

use embedzip_format::{Archive, ChunkStore, ExtractOptions};

use super::human_size;
use crate::error::{Error, Result};

pub fn run(chunks: PathBuf, dest: PathBuf, options: ExtractOptions) -> Result<()> {
    let store = ChunkStore::open_dir(&chunks).map_err(|source| Error::OpenChunks {
        path: chunks.clone(),
        source,
    })?;
    let archive = Archive::open(store).map_err(|source| Error::OpenArchive {
        path: chunks.clone(),
        source,
    })?;

    extract_into(&archive, &dest, options)
}

/// Extracts a zip file from disk, with the same path checks as packed chunks.
pub fn unzip(zipfile: PathBuf, dest: PathBuf, options: ExtractOptions) -> Result<()> {
    let store = ChunkStore::open_file(&zipfile).map_err(|source| Error::OpenArchive {
        path: zipfile.clone(),
        source,
    })?;
    let archive = Archive::open(store).map_err(|source| Error::OpenArchive {
        path: zipfile.clone(),
        source,
    })?;

    extract_into(&archive, &dest, options)
}

fn extract_into(archive: &Archive, dest: &Path, options: ExtractOptions) -> Result<()> {
    let report = embedzip_format::extract(archive, dest, &options).map_err(|source| {
        Error::Extract {
            path: dest.to_path_buf(),
            source,
        }
    })?;

    tracing::info!(
        "Extracted {} file(s) and {} directory(ies), {} in total, to {}",
        report.files_written(),
        report.dirs_created(),
        human_size(report.bytes_written()),
        dest.display()
    );

    let failed = report.failures().count();
    if failed > 0 {
        return Err(Error::Incomplete {
            failed,
            total: report.outcomes.len(),
        });
    }

    Ok(())
}
