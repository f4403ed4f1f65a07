use std::fmt;
use std::io::{self, prelude::*, SeekFrom};
use std::sync::Arc;

use zip::ZipArchive;

use crate::{
    compression::Compression,
    entry::{ArchiveEntry, EntryKind},
    error::OpenError,
    store::ChunkStore,
};

/// A seekable reader over a [`ChunkStore`], in the shape `zip` expects.
/// Clones share the store but keep their own position.
#[derive(Debug, Clone)]
pub struct ChunkCursor {
    store: Arc<ChunkStore>,
    pos: u64,
}

impl ChunkCursor {
    pub fn new(store: Arc<ChunkStore>) -> ChunkCursor {
        ChunkCursor { store, pos: 0 }
    }

    #[inline(always)]
    pub fn position(&self) -> u64 {
        self.pos
    }
}

#[inline(always)]
fn offset_by(base: u64, delta: i64) -> Option<u64> {
    if delta >= 0 {
        base.checked_add(delta as u64)
    } else {
        base.checked_sub(delta.unsigned_abs())
    }
}

impl Read for ChunkCursor {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.store.read_range_into(self.pos, buf);
        self.pos += n as u64;
        Ok(n)
    }
}

impl Seek for ChunkCursor {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let next = match pos {
            SeekFrom::Start(n) => Some(n),
            SeekFrom::End(delta) => offset_by(self.store.len(), delta),
            SeekFrom::Current(delta) => offset_by(self.pos, delta),
        };

        match next {
            Some(n) => {
                self.pos = n;
                Ok(n)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            )),
        }
    }
}

/// A zip archive read straight out of a [`ChunkStore`].
///
/// Cloning is cheap: clones share the store and the parsed central
/// directory, so each thread can hold its own.
#[derive(Clone)]
pub struct Archive {
    store: Arc<ChunkStore>,
    /// `None` for an empty store, which stands for an empty archive.
    zip: Option<ZipArchive<ChunkCursor>>,
    pub(crate) entries: Arc<[ArchiveEntry]>,
}

impl Archive {
    pub fn open<S: Into<Arc<ChunkStore>>>(store: S) -> Result<Archive, OpenError> {
        let store = store.into();

        if store.is_empty() {
            return Ok(Archive {
                store,
                zip: None,
                entries: Arc::from(vec![]),
            });
        }

        let mut zip =
            ZipArchive::new(ChunkCursor::new(Arc::clone(&store))).map_err(OpenError::Decode)?;

        let mut entries = Vec::with_capacity(zip.len());
        for index in 0..zip.len() {
            let file = zip
                .by_index_raw(index)
                .map_err(|e| OpenError::InvalidEntry(e, index))?;

            entries.push(ArchiveEntry {
                index,
                name: file.name().to_string(),
                kind: if file.is_dir() {
                    EntryKind::Directory
                } else {
                    EntryKind::File
                },
                mode: file.unix_mode(),
                compression: Compression::from_method(file.compression()),
                compressed_size: file.compressed_size(),
                size: file.size(),
                crc32: file.crc32(),
            });
        }

        tracing::debug!(
            bytes = store.len(),
            chunks = store.chunks().len(),
            entries = entries.len(),
            "opened archive"
        );

        Ok(Archive {
            store,
            zip: Some(zip),
            entries: Arc::from(entries),
        })
    }

    #[inline(always)]
    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    /// Entries in central directory order.
    #[inline(always)]
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    pub fn find(&self, name: &str) -> Option<&ArchiveEntry> {
        let wanted = crate::path::entry_path(name);
        self.entries.iter().find(|e| e.path() == wanted)
    }

    /// Opens the entry's payload for reading, decompressing as needed.
    /// A CRC mismatch is reported as an I/O error once the end is read.
    pub fn open_entry(&mut self, entry: &ArchiveEntry) -> Result<impl Read + '_, OpenError> {
        let known = self
            .entries
            .get(entry.index)
            .map(|x| x.name == entry.name)
            .unwrap_or(false);

        let zip = match self.zip.as_mut() {
            Some(zip) if known => zip,
            _ => return Err(OpenError::NotFoundInArchive(entry.name.clone())),
        };

        zip.by_index(entry.index)
            .map_err(|e| OpenError::InvalidEntry(e, entry.index))
    }

    /// Reads the whole entry into memory.
    pub fn read_entry(&mut self, entry: &ArchiveEntry) -> Result<Vec<u8>, OpenError> {
        let index = entry.index;
        let mut reader = self.open_entry(entry)?;
        let mut out = Vec::new();
        reader
            .read_to_end(&mut out)
            .map_err(|e| OpenError::InvalidEntry(e.into(), index))?;
        Ok(out)
    }
}

impl fmt::Debug for Archive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Archive")
            .field("store", &self.store)
            .field("entries", &self.entries)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Chunk;

    fn cursor(parts: &[&[u8]]) -> ChunkCursor {
        let chunks = parts.iter().map(|p| Chunk::from(p.to_vec())).collect();
        ChunkCursor::new(Arc::new(ChunkStore::new(chunks)))
    }

    #[test]
    fn read_across_chunks() {
        let mut c = cursor(&[b"ab", b"cde", b"f"]);
        let mut out = String::new();
        c.read_to_string(&mut out).unwrap();
        assert_eq!(out, "abcdef");
        assert_eq!(c.position(), 6);
    }

    #[test]
    fn seek_then_read() {
        let mut c = cursor(&[b"ab", b"cde", b"f"]);
        assert_eq!(c.seek(SeekFrom::End(-4)).unwrap(), 2);
        let mut buf = [0u8; 3];
        c.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"cde");
        assert_eq!(c.seek(SeekFrom::Current(-1)).unwrap(), 4);
    }

    #[test]
    fn negative_seek_is_rejected() {
        let mut c = cursor(&[b"ab"]);
        let err = c.seek(SeekFrom::Current(-1)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(c.seek(SeekFrom::End(-3)).is_err());
        assert_eq!(c.position(), 0);
    }

    #[test]
    fn past_the_end_reads_nothing() {
        let mut c = cursor(&[b"ab"]);
        c.seek(SeekFrom::Start(10)).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(c.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn empty_store_is_empty_archive() {
        let archive = Archive::open(ChunkStore::new(vec![])).unwrap();
        assert!(archive.entries().is_empty());
        assert!(archive.find("anything").is_none());
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let store = ChunkStore::new(vec![Chunk::from(b"definitely not a zip".to_vec())]);
        match Archive::open(store) {
            Err(OpenError::Decode(_)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
