use std::path::PathBuf;

use crate::path::UnsafePathError;

#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error("Failed to read chunk data. Path: '{}'", .1.display())]
    ReadFailed(#[source] std::io::Error, PathBuf),

    #[error("Chunk sequence is incomplete. Missing: '{}'", .0.display())]
    MissingChunk(PathBuf),

    #[error("Invalid archive data (the chunk sequence is corrupt or incomplete).")]
    Decode(#[source] zip::result::ZipError),

    #[error("Invalid archive entry. Index: {}", .1)]
    InvalidEntry(#[source] zip::result::ZipError, usize),

    #[error("Path not found in archive. Path: '{}'", .0)]
    NotFoundInArchive(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PackError {
    #[error("Reading source directory failed. Path: '{}'", .1.display())]
    ReadDirFailed(#[source] std::io::Error, PathBuf),

    #[error("Reading source file failed. Path: '{}'", .1.display())]
    ReadFileFailed(#[source] std::io::Error, PathBuf),

    #[error("Path cannot be stored in an archive. Path: '{}'", .0.display())]
    InvalidPath(PathBuf),

    #[error("Writing archive entry failed. Entry: '{}'", .1)]
    ArchiveFailed(#[source] zip::result::ZipError, String),

    #[error("Writing output failed. Path: '{}'", .1.display())]
    WriteFailed(#[source] std::io::Error, PathBuf),

    #[error("Refusing to write output inside the source directory. Path: '{}'", .0.display())]
    OutputInsideSource(PathBuf),

    #[error("Refusing to replace an output directory that contains the source. Path: '{}'", .0.display())]
    SourceInsideOutput(PathBuf),
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Creating destination failed. Path: '{}'", .1.display())]
    CreateRootFailed(#[source] std::io::Error, PathBuf),

    #[error("Refusing to extract outside of destination. Entry: '{}', destination: '{}'", .1, .2.display())]
    UnsafePath(#[source] UnsafePathError, String, PathBuf),

    #[error("Creating directory failed. Entry: '{}', path: '{}'", .1, .2.display())]
    CreateDirFailed(#[source] std::io::Error, String, PathBuf),

    #[error("Creating file failed. Entry: '{}', path: '{}'", .1, .2.display())]
    CreateFileFailed(#[source] std::io::Error, String, PathBuf),

    #[error("Writing file failed. Entry: '{}', path: '{}'", .1, .2.display())]
    WriteFailed(#[source] std::io::Error, String, PathBuf),

    #[error("Setting permissions failed. Entry: '{}', path: '{}'", .1, .2.display())]
    SetPermissionsFailed(#[source] std::io::Error, String, PathBuf),

    #[error("Reading entry failed. Entry: '{}'", .1)]
    ReadEntryFailed(#[source] OpenError, String),
}
