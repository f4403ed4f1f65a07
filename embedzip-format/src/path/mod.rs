use std::path::{Path, PathBuf};

use relative_path::{RelativePath, RelativePathBuf};

mod error;

pub use self::error::UnsafePathError;

/// The separator used in archive entry names, whatever the host uses.
pub const PATH_ARCHIVE_SEP: &str = "/";

fn has_drive_prefix(segment: &str) -> bool {
    let mut chars = segment.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(letter), Some(':')) if letter.is_ascii_alphabetic()
    )
}

/// Lexically normalizes an archive entry name.
///
/// `.` and empty segments are dropped and `..` removes the previous
/// segment. Names that are absolute, carry a drive prefix, contain a
/// backslash or control characters, or climb above their starting point
/// are refused. An empty result means the name refers to the root itself.
pub fn normalize(name: &str) -> Result<RelativePathBuf, UnsafePathError> {
    if name.is_empty() {
        return Err(UnsafePathError::EmptyPath);
    }

    if name.chars().any(|c| c == '\\' || c.is_control()) {
        return Err(UnsafePathError::UnrepresentableStr);
    }

    if name.starts_with(PATH_ARCHIVE_SEP) || has_drive_prefix(name) {
        return Err(UnsafePathError::AbsolutePath);
    }

    let mut out: Vec<&str> = vec![];

    for segment in name.split(PATH_ARCHIVE_SEP) {
        match segment {
            "" | "." => {}
            ".." => {
                if out.pop().is_none() {
                    return Err(UnsafePathError::EscapesRoot);
                }
            }
            segment => out.push(segment),
        }
    }

    Ok(RelativePathBuf::from(out.join(PATH_ARCHIVE_SEP)))
}

/// Resolves an entry name below `root`. The result is `root` itself or one
/// of its descendants, compared component by component so that a sibling
/// such as `/out-evil` never passes for a child of `/out`.
pub fn resolve(root: &Path, name: &str) -> Result<PathBuf, UnsafePathError> {
    let relative = normalize(name)?;
    let resolved = relative.to_path(root);

    if !resolved.starts_with(root) {
        return Err(UnsafePathError::EscapesRoot);
    }

    Ok(resolved)
}

/// Converts a path relative to a source directory into an archive entry
/// name, using `/` regardless of platform.
pub fn archive_name(relative: &Path) -> Option<String> {
    RelativePathBuf::from_path(relative)
        .ok()
        .filter(|x| !x.as_str().is_empty())
        .map(RelativePathBuf::into_string)
}

/// The entry name with any trailing separator removed.
pub fn entry_path(name: &str) -> &RelativePath {
    RelativePath::new(name.trim_end_matches(PATH_ARCHIVE_SEP))
}
