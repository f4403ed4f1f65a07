use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;

use crate::{
    entry::{ArchiveEntry, EntryKind},
    error::ExtractError,
    path::{resolve, UnsafePathError},
    reader::Archive,
};

/// What to do when one entry cannot be extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the first failure and return it.
    Abort,
    /// Carry on with the remaining entries and record every outcome.
    Continue,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        FailurePolicy::Abort
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    pub policy: FailurePolicy,
    /// Write files on the rayon thread pool once all directories exist.
    pub parallel: bool,
}

#[derive(Debug)]
pub enum EntryStatus {
    Created,
    Written { bytes: u64 },
    /// The entry would have landed outside the destination. Nothing was written.
    Rejected(ExtractError),
    Failed(ExtractError),
}

impl EntryStatus {
    #[inline(always)]
    pub fn is_failure(&self) -> bool {
        matches!(self, EntryStatus::Rejected(_) | EntryStatus::Failed(_))
    }

    pub fn error(&self) -> Option<&ExtractError> {
        match self {
            EntryStatus::Rejected(e) | EntryStatus::Failed(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct EntryOutcome {
    pub name: String,
    /// Where the entry was (or would have been) written. `None` when the
    /// name could not be resolved safely.
    pub path: Option<PathBuf>,
    pub status: EntryStatus,
}

/// Per-entry results of an extraction, in archive order.
#[derive(Debug, Default)]
pub struct ExtractReport {
    pub outcomes: Vec<EntryOutcome>,
}

impl ExtractReport {
    pub fn files_written(&self) -> u64 {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, EntryStatus::Written { .. }))
            .count() as u64
    }

    pub fn dirs_created(&self) -> u64 {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, EntryStatus::Created))
            .count() as u64
    }

    pub fn bytes_written(&self) -> u64 {
        self.outcomes
            .iter()
            .map(|o| match o.status {
                EntryStatus::Written { bytes } => bytes,
                _ => 0,
            })
            .sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &EntryOutcome> {
        self.outcomes.iter().filter(|o| o.status.is_failure())
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    /// The first failure as an error, or the report if there was none.
    pub fn into_result(mut self) -> Result<ExtractReport, ExtractError> {
        if let Some(i) = self.outcomes.iter().position(|o| o.status.is_failure()) {
            if let EntryStatus::Rejected(e) | EntryStatus::Failed(e) = self.outcomes.swap_remove(i).status {
                return Err(e);
            }
        }
        Ok(self)
    }
}

/// Extracts every entry with the default options: serial, abort on the
/// first failure.
pub fn extract_all<P: AsRef<Path>>(archive: &Archive, dest: P) -> Result<ExtractReport, ExtractError> {
    extract(archive, dest, &ExtractOptions::default())
}

/// Recreates the archive's tree below `dest`.
///
/// Every entry name is normalized and checked to stay below `dest` before
/// anything is written for it. With [`FailurePolicy::Abort`] the first
/// failure is returned as `Err`; with [`FailurePolicy::Continue`] the
/// returned report holds one outcome per entry and the caller decides.
pub fn extract<P: AsRef<Path>>(
    archive: &Archive,
    dest: P,
    options: &ExtractOptions,
) -> Result<ExtractReport, ExtractError> {
    let dest = dest.as_ref();
    fs::create_dir_all(dest).map_err(|e| ExtractError::CreateRootFailed(e, dest.to_path_buf()))?;
    let root = dest
        .canonicalize()
        .map_err(|e| ExtractError::CreateRootFailed(e, dest.to_path_buf()))?;

    let extractor = Extractor {
        root: &root,
        policy: options.policy,
    };

    let report = if options.parallel {
        extractor.run_parallel(archive)?
    } else {
        extractor.run_serial(archive)?
    };

    tracing::debug!(
        dest = %root.display(),
        files = report.files_written(),
        dirs = report.dirs_created(),
        bytes = report.bytes_written(),
        "extraction finished"
    );
    Ok(report)
}

struct Extractor<'a> {
    root: &'a Path,
    policy: FailurePolicy,
}

impl<'a> Extractor<'a> {
    fn run_serial(&self, archive: &Archive) -> Result<ExtractReport, ExtractError> {
        let mut archive = archive.clone();
        let entries = Arc::clone(&archive.entries);
        let mut report = ExtractReport::default();

        for entry in entries.iter() {
            let outcome = match self.resolve(entry) {
                Ok(path) => {
                    let status = match entry.kind() {
                        EntryKind::Directory => create_dir(entry, &path),
                        EntryKind::File => write_file(&mut archive, entry, &path),
                    };
                    EntryOutcome {
                        name: entry.name().to_string(),
                        path: Some(path),
                        status,
                    }
                }
                Err(outcome) => outcome,
            };

            self.record(&mut report, outcome)?;
        }

        Ok(report)
    }

    /// Directories first, in order, on this thread; then files across the
    /// pool, each worker reading through its own clone of the archive.
    fn run_parallel(&self, archive: &Archive) -> Result<ExtractReport, ExtractError> {
        let entries = Arc::clone(&archive.entries);
        let mut slots: Vec<Option<EntryOutcome>> = (0..entries.len()).map(|_| None).collect();
        let mut files = vec![];
        let mut report = ExtractReport::default();

        for (i, entry) in entries.iter().enumerate() {
            let path = match self.resolve(entry) {
                Ok(path) => path,
                Err(outcome) => {
                    slots[i] = Some(self.abort_on(outcome)?);
                    continue;
                }
            };

            let status = match entry.kind() {
                EntryKind::Directory => create_dir(entry, &path),
                EntryKind::File => match path.parent().map(|p| ensure_dir(entry, p)) {
                    Some(Err(e)) => EntryStatus::Failed(e),
                    _ => {
                        files.push((i, path));
                        continue;
                    }
                },
            };

            slots[i] = Some(self.abort_on(EntryOutcome {
                name: entry.name().to_string(),
                path: Some(path),
                status,
            })?);
        }

        let written: Vec<(usize, EntryOutcome)> = files
            .into_par_iter()
            .map_init(
                || archive.clone(),
                |archive, (i, path)| {
                    let entry = &entries[i];
                    let status = write_file(archive, entry, &path);
                    let outcome = EntryOutcome {
                        name: entry.name().to_string(),
                        path: Some(path),
                        status,
                    };
                    (i, outcome)
                },
            )
            .collect();

        for (i, outcome) in written {
            slots[i] = Some(outcome);
        }

        for outcome in slots.into_iter().flatten() {
            self.record(&mut report, outcome)?;
        }

        Ok(report)
    }

    fn resolve(&self, entry: &ArchiveEntry) -> Result<PathBuf, EntryOutcome> {
        let rejected = |e: UnsafePathError| EntryOutcome {
            name: entry.name().to_string(),
            path: None,
            status: EntryStatus::Rejected(ExtractError::UnsafePath(
                e,
                entry.name().to_string(),
                self.root.to_path_buf(),
            )),
        };

        let path = resolve(self.root, entry.name()).map_err(rejected)?;

        // A file can never take the place of the root directory.
        if entry.is_file() && path == self.root {
            return Err(rejected(UnsafePathError::EmptyPath));
        }

        Ok(path)
    }

    /// Under `Abort`, a failed outcome becomes the call's error.
    fn abort_on(&self, outcome: EntryOutcome) -> Result<EntryOutcome, ExtractError> {
        let EntryOutcome { name, path, status } = outcome;
        match status {
            EntryStatus::Rejected(e) | EntryStatus::Failed(e)
                if self.policy == FailurePolicy::Abort =>
            {
                Err(e)
            }
            status => Ok(EntryOutcome { name, path, status }),
        }
    }

    fn record(&self, report: &mut ExtractReport, outcome: EntryOutcome) -> Result<(), ExtractError> {
        let outcome = self.abort_on(outcome)?;
        if let Some(e) = outcome.status.error() {
            tracing::warn!("Skipping entry {:?}: {}", outcome.name, e);
        }
        tracing::trace!(name = %outcome.name, status = ?outcome.status, "extracted entry");
        report.outcomes.push(outcome);
        Ok(())
    }
}

fn ensure_dir(entry: &ArchiveEntry, path: &Path) -> Result<(), ExtractError> {
    fs::create_dir_all(path)
        .map_err(|e| ExtractError::CreateDirFailed(e, entry.name().to_string(), path.to_path_buf()))
}

fn create_dir(entry: &ArchiveEntry, path: &Path) -> EntryStatus {
    match ensure_dir(entry, path) {
        Ok(()) => EntryStatus::Created,
        Err(e) => EntryStatus::Failed(e),
    }
}

fn write_file(archive: &mut Archive, entry: &ArchiveEntry, path: &Path) -> EntryStatus {
    match write_file_inner(archive, entry, path) {
        Ok(bytes) => EntryStatus::Written { bytes },
        Err(e) => EntryStatus::Failed(e),
    }
}

fn write_file_inner(archive: &mut Archive, entry: &ArchiveEntry, path: &Path) -> Result<u64, ExtractError> {
    let name = entry.name();

    if let Some(parent) = path.parent() {
        ensure_dir(entry, parent)?;
    }

    let mut reader = archive
        .open_entry(entry)
        .map_err(|e| ExtractError::ReadEntryFailed(e, name.to_string()))?;

    let file = fs::File::create(path)
        .map_err(|e| ExtractError::CreateFileFailed(e, name.to_string(), path.to_path_buf()))?;
    let mut writer = BufWriter::new(file);

    let copied = io::copy(&mut reader, &mut writer).and_then(|n| writer.flush().map(|_| n));
    let bytes = match copied {
        Ok(n) => n,
        Err(e) => {
            drop(writer);
            // A truncated file must not pass for a complete one.
            let _ = fs::remove_file(path);
            return Err(ExtractError::WriteFailed(e, name.to_string(), path.to_path_buf()));
        }
    };

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Some(mode) = entry.mode() {
            fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o777)).map_err(|e| {
                ExtractError::SetPermissionsFailed(e, name.to_string(), path.to_path_buf())
            })?;
        }
    }

    tracing::debug!("Extracted {:?} to {:?} ({} bytes)", name, path, bytes);
    Ok(bytes)
}
