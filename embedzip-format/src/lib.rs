mod compression;
mod embed;
mod entry;
mod error;
mod extract;
mod packer;
pub mod path;
pub mod range;
mod reader;
mod store;

pub use compression::{Compression, ParseCompressionError};
pub use embed::{render_module, write_embedded, EmbedSummary, MODULE_FILE_NAME};
pub use entry::{ArchiveEntry, EntryKind};
pub use error::{ExtractError, OpenError, PackError};
pub use extract::{
    extract, extract_all, EntryOutcome, EntryStatus, ExtractOptions, ExtractReport, FailurePolicy,
};
pub use packer::{pack, split, zip_directory, PackOptions, DEFAULT_CHUNK_SIZE};
pub use path::UnsafePathError;
pub use reader::{Archive, ChunkCursor};
pub use store::{chunk_file_name, Chunk, ChunkStore, RangeRead};
