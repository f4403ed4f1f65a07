use std::fs::{File, Metadata};
use std::io::{self, Cursor};
use std::num::NonZeroUsize;
use std::path::Path;

use jwalk::{Parallelism, WalkDir};
use zip::write::SimpleFileOptions;
use zip::{DateTime, ZipWriter};

use crate::{compression::Compression, error::PackError, path::archive_name, store::Chunk};

/// Reference chunk size: 1 MiB.
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

const DEFAULT_CHUNK_SIZE_NZ: NonZeroUsize = match NonZeroUsize::new(DEFAULT_CHUNK_SIZE) {
    Some(v) => v,
    None => panic!("chunk size must not be zero"),
};

const DEFAULT_FILE_MODE: u32 = 0o644;
const DEFAULT_DIR_MODE: u32 = 0o755;

#[derive(Debug, Clone, Copy)]
pub struct PackOptions {
    /// Upper bound on the size of every chunk.
    pub chunk_size: NonZeroUsize,
    pub compression: Compression,
}

impl Default for PackOptions {
    fn default() -> Self {
        PackOptions {
            chunk_size: DEFAULT_CHUNK_SIZE_NZ,
            compression: Compression::default(),
        }
    }
}

/// Zips `source` and splits the result into chunks of at most
/// `options.chunk_size` bytes. A tree with nothing in it gives no chunks.
pub fn pack<P: AsRef<Path>>(source: P, options: &PackOptions) -> Result<Vec<Chunk>, PackError> {
    let buf = zip_directory(source.as_ref(), options.compression)?;
    Ok(split(&buf, options.chunk_size))
}

pub fn split(buf: &[u8], chunk_size: NonZeroUsize) -> Vec<Chunk> {
    buf.chunks(chunk_size.get())
        .map(|c| Chunk::from(c.to_vec()))
        .collect()
}

#[cfg(unix)]
fn mode(meta: &Metadata, _default: u32) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o777
}

#[cfg(not(unix))]
fn mode(meta: &Metadata, default: u32) -> u32 {
    if meta.permissions().readonly() {
        default & 0o555
    } else {
        default
    }
}

fn options_for(compression: Compression, mode: u32) -> SimpleFileOptions {
    // A fixed timestamp keeps the output a function of names, modes and
    // contents only.
    SimpleFileOptions::default()
        .compression_method(compression.method())
        .last_modified_time(DateTime::default())
        .unix_permissions(mode)
}

/// Serializes `source` into an in-memory zip. Entries are visited in sorted
/// order, one directory at a time, so unchanged input gives identical bytes.
/// Returns an empty buffer when there is nothing to pack.
pub fn zip_directory(source: &Path, compression: Compression) -> Result<Vec<u8>, PackError> {
    std::fs::metadata(source)
        .and_then(|meta| {
            if meta.is_dir() {
                Ok(())
            } else {
                Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "source is not a directory",
                ))
            }
        })
        .map_err(|e| PackError::ReadDirFailed(e, source.to_path_buf()))?;

    let walk = WalkDir::new(source)
        .sort(true)
        .skip_hidden(false)
        .follow_links(false)
        .parallelism(Parallelism::Serial);

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let mut count = 0usize;

    for entry in walk {
        let entry = entry
            .map_err(|e| PackError::ReadDirFailed(io::Error::other(e), source.to_path_buf()))?;

        if entry.depth == 0 {
            continue;
        }

        let path = entry.path();
        let relative = path
            .strip_prefix(source)
            .map_err(|_| PackError::InvalidPath(path.clone()))?;
        let name = archive_name(relative).ok_or_else(|| PackError::InvalidPath(path.clone()))?;
        let file_type = entry.file_type();

        if file_type.is_dir() {
            let meta = entry
                .metadata()
                .map_err(|e| PackError::ReadDirFailed(io::Error::other(e), path.clone()))?;
            tracing::debug!("Packing directory {:?} as {:?}", path, name);
            writer
                .add_directory(
                    name.as_str(),
                    options_for(compression, mode(&meta, DEFAULT_DIR_MODE)),
                )
                .map_err(|e| PackError::ArchiveFailed(e, name.clone()))?;
        } else if file_type.is_file() {
            let mut file =
                File::open(&path).map_err(|e| PackError::ReadFileFailed(e, path.clone()))?;
            let meta = file
                .metadata()
                .map_err(|e| PackError::ReadFileFailed(e, path.clone()))?;

            tracing::debug!("Packing {:?} as {:?}", path, name);
            let options = options_for(compression, mode(&meta, DEFAULT_FILE_MODE))
                .large_file(meta.len() >= u32::MAX as u64);
            writer
                .start_file(name.as_str(), options)
                .map_err(|e| PackError::ArchiveFailed(e, name.clone()))?;
            io::copy(&mut file, &mut writer)
                .map_err(|e| PackError::ReadFileFailed(e, path.clone()))?;
        } else {
            tracing::warn!("Skipping {:?}: not a regular file or directory", path);
            continue;
        }

        count += 1;
    }

    if count == 0 {
        return Ok(Vec::new());
    }

    let cursor = writer
        .finish()
        .map_err(|e| PackError::ArchiveFailed(e, String::new()))?;

    tracing::debug!(entries = count, bytes = cursor.get_ref().len(), "packed archive");
    Ok(cursor.into_inner())
}
