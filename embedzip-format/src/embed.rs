//! Writes packed chunks out as a Rust module that compiles them in.
//!
//! The output directory holds `chunk0.bin`, `chunk1.bin`, ... and a
//! `mod.rs` listing them with `include_bytes!` in order, plus a
//! `new_archive_reader()` that hands that list to
//! [`ChunkStore::from_static`](crate::ChunkStore::from_static).

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{
    error::PackError,
    packer::{pack, PackOptions},
    store::{chunk_file_name, Chunk},
};

pub const MODULE_FILE_NAME: &str = "mod.rs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedSummary {
    pub output: PathBuf,
    pub chunks: usize,
    pub bytes: u64,
}

/// Source of the generated module for `count` chunks.
pub fn render_module(count: usize) -> String {
    let mut out = String::new();
    out.push_str("// Code generated by embedzip. DO NOT EDIT.\n\n");
    out.push_str("use embedzip_format::{Archive, ChunkStore, OpenError};\n\n");
    out.push_str("pub static CHUNKS: &[&[u8]] = &[\n");
    for i in 0..count {
        let _ = writeln!(out, "    include_bytes!(\"{}\"),", chunk_file_name(i));
    }
    out.push_str("];\n\n");
    out.push_str("pub fn new_archive_reader() -> Result<Archive, OpenError> {\n");
    out.push_str("    Archive::open(ChunkStore::from_static(CHUNKS))\n");
    out.push_str("}\n");
    out
}

/// Packs `source` and writes the embeddable module to `output`, replacing
/// whatever was there. Files are staged in a sibling temporary directory
/// and moved into place only once all of them are written.
pub fn write_embedded<S: AsRef<Path>, O: AsRef<Path>>(
    source: S,
    output: O,
    options: &PackOptions,
) -> Result<EmbedSummary, PackError> {
    let source = source.as_ref();
    let output = output.as_ref();

    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(|e| PackError::WriteFailed(e, parent.clone()))?;

    check_not_inside(source, output, &parent)?;

    let chunks = pack(source, options)?;

    let staging = tempfile::Builder::new()
        .prefix(".embedzip-")
        .tempdir_in(&parent)
        .map_err(|e| PackError::WriteFailed(e, parent.clone()))?;

    write_chunks(staging.path(), &chunks)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(staging.path(), fs::Permissions::from_mode(0o755))
            .map_err(|e| PackError::WriteFailed(e, staging.path().to_path_buf()))?;
    }

    if output.exists() {
        fs::remove_dir_all(output).map_err(|e| PackError::WriteFailed(e, output.to_path_buf()))?;
    }
    fs::rename(staging.path(), output)
        .map_err(|e| PackError::WriteFailed(e, output.to_path_buf()))?;

    let summary = EmbedSummary {
        output: output.to_path_buf(),
        chunks: chunks.len(),
        bytes: chunks.iter().map(|c| c.len() as u64).sum(),
    };
    tracing::debug!(?summary, "wrote embedded chunks");
    Ok(summary)
}

fn write_chunks(dir: &Path, chunks: &[Chunk]) -> Result<(), PackError> {
    for (i, chunk) in chunks.iter().enumerate() {
        let path = dir.join(chunk_file_name(i));
        fs::write(&path, chunk.as_slice()).map_err(|e| PackError::WriteFailed(e, path))?;
    }

    let path = dir.join(MODULE_FILE_NAME);
    fs::write(&path, render_module(chunks.len())).map_err(|e| PackError::WriteFailed(e, path))
}

/// Packing a tree that contains the previous output would never converge,
/// and replacing an output that contains the source would delete it.
fn check_not_inside(source: &Path, output: &Path, parent: &Path) -> Result<(), PackError> {
    let source = source
        .canonicalize()
        .map_err(|e| PackError::ReadDirFailed(e, source.to_path_buf()))?;
    let parent = parent
        .canonicalize()
        .map_err(|e| PackError::WriteFailed(e, parent.to_path_buf()))?;

    let target = match output.file_name() {
        Some(name) => parent.join(name),
        None => parent,
    };

    if target.starts_with(&source) {
        return Err(PackError::OutputInsideSource(output.to_path_buf()));
    }

    if source.starts_with(&target) {
        return Err(PackError::SourceInsideOutput(output.to_path_buf()));
    }

    Ok(())
}
