use std::path::PathBuf;

use embedzip_format::{write_embedded, PackOptions};

use super::human_size;
use crate::error::{Error, Result};

pub fn run(source: PathBuf, output: PathBuf, options: PackOptions) -> Result<()> {
    let summary = write_embedded(&source, &output, &options).map_err(|e| Error::Pack {
        path: source.clone(),
        source: e,
    })?;

    tracing::info!(
        "Packed {} into {} chunk(s), {} in total, at {}",
        source.display(),
        summary.chunks,
        human_size(summary.bytes),
        summary.output.display()
    );

    Ok(())
}
