// Code generated by embedzip. DO NOT EDIT.

use embedzip_format::{Archive, ChunkStore, OpenError};

pub static CHUNKS: &[&[u8]] = &[
    include_bytes!("chunk0.bin"),
    include_bytes!("chunk1.bin"),
    include_bytes!("chunk2.bin"),
    include_bytes!("chunk3.bin"),
    include_bytes!("chunk4.bin"),
    include_bytes!("chunk5.bin"),
    include_bytes!("chunk6.bin"),
    include_bytes!("chunk7.bin"),
];

pub fn new_archive_reader() -> Result<Archive, OpenError> {
    Archive::open(ChunkStore::from_static(CHUNKS))
}
