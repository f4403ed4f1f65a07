use std::fmt;
use std::fs::File;
use std::path::Path;

use memmap2::Mmap;

use crate::error::OpenError;
use crate::range::{is_empty, local, overlap};

/// File name of the `index`th chunk in a packer output directory.
pub fn chunk_file_name(index: usize) -> String {
    format!("chunk{}.bin", index)
}

/// Inverse of [`chunk_file_name`]. Only the canonical spelling is
/// accepted, so `chunk01.bin` is not mistaken for `chunk1.bin`.
fn parse_chunk_file_name(name: &str) -> Option<usize> {
    let digits = name.strip_prefix("chunk")?.strip_suffix(".bin")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    digits.parse().ok()
}

/// One immutable segment of the logical byte stream.
pub enum Chunk {
    /// Compiled into the binary, usually via `include_bytes!`.
    Static(&'static [u8]),
    Owned(Vec<u8>),
    /// A chunk file mapped read-only from disk.
    Mapped(Mmap),
}

impl Chunk {
    #[inline(always)]
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Chunk::Static(bytes) => bytes,
            Chunk::Owned(bytes) => bytes,
            Chunk::Mapped(mmap) => mmap,
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AsRef<[u8]> for Chunk {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl From<Vec<u8>> for Chunk {
    fn from(bytes: Vec<u8>) -> Chunk {
        Chunk::Owned(bytes)
    }
}

impl From<&'static [u8]> for Chunk {
    fn from(bytes: &'static [u8]) -> Chunk {
        Chunk::Static(bytes)
    }
}

impl PartialEq for Chunk {
    fn eq(&self, other: &Chunk) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for Chunk {}

impl fmt::Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Chunk::Static(_) => "Static",
            Chunk::Owned(_) => "Owned",
            Chunk::Mapped(_) => "Mapped",
        };
        f.debug_struct("Chunk")
            .field("kind", &kind)
            .field("len", &self.len())
            .finish()
    }
}

/// Result of [`ChunkStore::read_range`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeRead {
    pub bytes: Vec<u8>,
    /// The request ran past the end of the stream, so `bytes` is shorter
    /// than the requested length.
    pub truncated: bool,
}

/// An ordered sequence of chunks read as one contiguous stream.
///
/// The store is immutable once built; reads never mutate it, so a single
/// store can be shared between threads without locking.
#[derive(Debug)]
pub struct ChunkStore {
    chunks: Vec<Chunk>,
    /// Stream offset at which each chunk begins.
    starts: Vec<u64>,
    len: u64,
}

impl ChunkStore {
    pub fn new(chunks: Vec<Chunk>) -> ChunkStore {
        let mut starts = Vec::with_capacity(chunks.len());
        let mut len = 0u64;
        for chunk in chunks.iter() {
            starts.push(len);
            len += chunk.len() as u64;
        }

        ChunkStore {
            chunks,
            starts,
            len,
        }
    }

    /// Builds a store over compiled-in chunks, in the order given.
    pub fn from_static(chunks: &'static [&'static [u8]]) -> ChunkStore {
        ChunkStore::new(chunks.iter().map(|&c| Chunk::Static(c)).collect())
    }

    /// Maps `chunk0.bin`, `chunk1.bin`, ... from a packer output directory.
    /// Numbering must be contiguous from zero.
    pub fn open_dir<P: AsRef<Path>>(path: P) -> Result<ChunkStore, OpenError> {
        let path = path.as_ref();
        let dir =
            std::fs::read_dir(path).map_err(|e| OpenError::ReadFailed(e, path.to_path_buf()))?;

        let mut indexes = vec![];
        for entry in dir {
            let entry = entry.map_err(|e| OpenError::ReadFailed(e, path.to_path_buf()))?;
            if let Some(index) = entry.file_name().to_str().and_then(parse_chunk_file_name) {
                indexes.push(index);
            }
        }
        indexes.sort_unstable();

        let mut chunks = Vec::with_capacity(indexes.len());
        for (expected, index) in indexes.into_iter().enumerate() {
            if index != expected {
                return Err(OpenError::MissingChunk(path.join(chunk_file_name(expected))));
            }
            chunks.push(map_file(&path.join(chunk_file_name(index)))?);
        }

        tracing::debug!(dir = %path.display(), chunks = chunks.len(), "opened chunk directory");
        Ok(ChunkStore::new(chunks))
    }

    /// A single file on disk as a one-chunk store.
    pub fn open_file<P: AsRef<Path>>(path: P) -> Result<ChunkStore, OpenError> {
        Ok(ChunkStore::new(vec![map_file(path.as_ref())?]))
    }

    #[inline(always)]
    pub fn len(&self) -> u64 {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Copies the stream bytes starting at `offset` into `buf`, returning how
    /// many were copied. Fewer than `buf.len()` means the stream ended.
    pub fn read_range_into(&self, offset: u64, buf: &mut [u8]) -> usize {
        let end = offset.saturating_add(buf.len() as u64);

        // Last chunk starting at or before `offset`; everything before it
        // ends before the request does.
        let first = self
            .starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);

        let mut written = 0;
        for (chunk, &start) in self.chunks[first..].iter().zip(&self.starts[first..]) {
            if start >= end {
                break;
            }

            let found = overlap(start..start + chunk.len() as u64, offset..end);
            if is_empty(&found) {
                continue;
            }

            let src = &chunk.as_slice()[local(start, found)];
            buf[written..written + src.len()].copy_from_slice(src);
            written += src.len();
        }

        tracing::trace!(offset, requested = buf.len(), written, "read_range");
        written
    }

    /// Reads `[offset, offset + length)`. Only the bytes that exist are
    /// allocated; a request past the end is flagged, not an error.
    pub fn read_range(&self, offset: u64, length: u64) -> RangeRead {
        let available = self.len.saturating_sub(offset).min(length);
        let mut bytes = vec![0u8; available as usize];
        let written = self.read_range_into(offset, &mut bytes);
        bytes.truncate(written);

        RangeRead {
            bytes,
            truncated: offset.saturating_add(length) > self.len,
        }
    }
}

impl From<Vec<Chunk>> for ChunkStore {
    fn from(chunks: Vec<Chunk>) -> ChunkStore {
        ChunkStore::new(chunks)
    }
}

fn map_file(path: &Path) -> Result<Chunk, OpenError> {
    let file = File::open(path).map_err(|e| OpenError::ReadFailed(e, path.to_path_buf()))?;
    let len = file
        .metadata()
        .map_err(|e| OpenError::ReadFailed(e, path.to_path_buf()))?
        .len();

    // Zero-length mappings are rejected on some platforms.
    if len == 0 {
        return Ok(Chunk::Owned(vec![]));
    }

    // The chunk files are build artifacts and are not modified while mapped.
    let mmap =
        unsafe { Mmap::map(&file) }.map_err(|e| OpenError::ReadFailed(e, path.to_path_buf()))?;
    Ok(Chunk::Mapped(mmap))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(sizes: &[usize]) -> (ChunkStore, Vec<u8>) {
        let mut flat = vec![];
        let mut chunks = vec![];
        let mut n = 0u8;
        for &size in sizes {
            let chunk: Vec<u8> = (0..size)
                .map(|_| {
                    n = n.wrapping_add(7);
                    n
                })
                .collect();
            flat.extend_from_slice(&chunk);
            chunks.push(Chunk::from(chunk));
        }
        (ChunkStore::new(chunks), flat)
    }

    #[test]
    fn length_is_sum_of_chunks() {
        let (store, flat) = reference(&[3, 0, 5, 1]);
        assert_eq!(store.len(), 9);
        assert_eq!(store.len() as usize, flat.len());
        assert_eq!(store.chunks().len(), 4);
    }

    #[test]
    fn every_range_matches_reference() {
        let (store, flat) = reference(&[4, 1, 0, 7, 3, 5]);
        let total = flat.len() as u64;

        for offset in 0..=total + 2 {
            for length in 0..=total + 3 {
                let read = store.read_range(offset, length);
                let start = (offset as usize).min(flat.len());
                let end = ((offset + length) as usize).min(flat.len());
                assert_eq!(read.bytes, &flat[start..end], "offset {} length {}", offset, length);
                assert_eq!(read.truncated, offset + length > total);
            }
        }
    }

    #[test]
    fn crosses_many_boundaries() {
        let (store, flat) = reference(&[2, 2, 2, 2, 2]);
        let read = store.read_range(1, 8);
        assert_eq!(read.bytes, &flat[1..9]);
        assert!(!read.truncated);
    }

    #[test]
    fn zero_length_read() {
        let (store, _) = reference(&[4, 4]);
        let read = store.read_range(3, 0);
        assert!(read.bytes.is_empty());
        assert!(!read.truncated);
    }

    #[test]
    fn empty_store() {
        let store = ChunkStore::new(vec![]);
        assert!(store.is_empty());
        let read = store.read_range(0, 10);
        assert!(read.bytes.is_empty());
        assert!(read.truncated);
        assert_eq!(store.read_range_into(0, &mut []), 0);
    }

    #[test]
    fn static_chunks_keep_order() {
        static CHUNKS: &[&[u8]] = &[b"hel", b"lo ", b"wor", b"ld"];
        let store = ChunkStore::from_static(CHUNKS);
        assert_eq!(store.read_range(0, 11).bytes, b"hello world");
        assert_eq!(store.read_range(2, 6).bytes, b"llo wo");
    }

    #[test]
    fn chunk_file_names() {
        assert_eq!(chunk_file_name(12), "chunk12.bin");
        assert_eq!(parse_chunk_file_name("chunk12.bin"), Some(12));
        assert_eq!(parse_chunk_file_name("chunk.bin"), None);
        assert_eq!(parse_chunk_file_name("chunk+1.bin"), None);
        assert_eq!(parse_chunk_file_name("mod.rs"), None);
        assert_eq!(parse_chunk_file_name("chunk0.bin"), Some(0));
        assert_eq!(parse_chunk_file_name("chunk01.bin"), None);
        assert_eq!(parse_chunk_file_name("chunk00.bin"), None);
    }

    #[test]
    fn open_dir_reads_in_numeric_order() {
        let dir = tempfile::tempdir().unwrap();
        // Lexical order would put chunk10 before chunk2.
        for i in 0..12u8 {
            std::fs::write(dir.path().join(chunk_file_name(i as usize)), [i]).unwrap();
        }
        std::fs::write(dir.path().join("mod.rs"), "// not a chunk").unwrap();

        let store = ChunkStore::open_dir(dir.path()).unwrap();
        assert_eq!(store.read_range(0, 12).bytes, (0..12u8).collect::<Vec<_>>());
    }

    #[test]
    fn open_dir_rejects_gaps() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(chunk_file_name(0)), b"a").unwrap();
        std::fs::write(dir.path().join(chunk_file_name(2)), b"c").unwrap();

        match ChunkStore::open_dir(dir.path()) {
            Err(OpenError::MissingChunk(path)) => {
                assert_eq!(path, dir.path().join("chunk1.bin"))
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn open_dir_ignores_padded_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(chunk_file_name(0)), b"ab").unwrap();
        std::fs::write(dir.path().join(chunk_file_name(1)), b"cd").unwrap();
        std::fs::write(dir.path().join("chunk01.bin"), b"stray").unwrap();

        let store = ChunkStore::open_dir(dir.path()).unwrap();
        assert_eq!(store.chunks().len(), 2);
        assert_eq!(store.read_range(0, 4).bytes, b"abcd");
    }
}
