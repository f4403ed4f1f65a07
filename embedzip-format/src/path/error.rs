use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsafePathError {
    EmptyPath,
    AbsolutePath,
    EscapesRoot,
    UnrepresentableStr,
}

impl std::error::Error for UnsafePathError {}

impl fmt::Display for UnsafePathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl UnsafePathError {
    pub fn as_str(&self) -> &str {
        match self {
            UnsafePathError::EmptyPath => "no path provided",
            UnsafePathError::AbsolutePath => "absolute path found in archive entry",
            UnsafePathError::EscapesRoot => "path leaves the destination directory",
            UnsafePathError::UnrepresentableStr => "unrepresentable string found in path",
        }
    }
}
