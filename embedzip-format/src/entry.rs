use relative_path::RelativePath;

use crate::{compression::Compression, path::entry_path};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One record of the archive's central directory. Holds no payload; use
/// [`Archive::open_entry`](crate::Archive::open_entry) to read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub(crate) index: usize,
    /// Name exactly as stored, `/`-separated, with a trailing `/` for
    /// directories. Not validated; see [`crate::path::resolve`].
    pub(crate) name: String,
    pub(crate) kind: EntryKind,
    pub(crate) mode: Option<u32>,
    pub(crate) compression: Compression,
    pub(crate) compressed_size: u64,
    pub(crate) size: u64,
    pub(crate) crc32: u32,
}

impl ArchiveEntry {
    #[inline(always)]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    pub fn path(&self) -> &RelativePath {
        entry_path(&self.name)
    }

    #[inline(always)]
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    #[inline(always)]
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    #[inline(always)]
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// Unix mode bits, when the archive was written on a unix host.
    #[inline(always)]
    pub fn mode(&self) -> Option<u32> {
        self.mode
    }

    #[inline(always)]
    pub fn compression(&self) -> Compression {
        self.compression
    }

    #[inline(always)]
    pub fn compressed_size(&self) -> u64 {
        self.compressed_size
    }

    #[inline(always)]
    pub fn size(&self) -> u64 {
        self.size
    }

    #[inline(always)]
    pub fn crc32(&self) -> u32 {
        self.crc32
    }
}
