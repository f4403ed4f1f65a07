use std::fmt;
use std::str::FromStr;

use zip::CompressionMethod;

#[derive(Clone, Copy, Eq, PartialEq)]
pub enum Compression {
    Stored,
    Deflate,
    /// Any other zip method. Can be listed, but never produced by the packer.
    Other,
}

impl Default for Compression {
    fn default() -> Self {
        Self::Deflate
    }
}

impl Compression {
    pub const fn available_variants() -> &'static [&'static str] {
        &["stored", "deflate"]
    }

    pub(crate) fn method(self) -> CompressionMethod {
        match self {
            Compression::Stored => CompressionMethod::Stored,
            Compression::Deflate | Compression::Other => CompressionMethod::Deflated,
        }
    }

    pub(crate) fn from_method(method: CompressionMethod) -> Compression {
        match method {
            CompressionMethod::Stored => Compression::Stored,
            CompressionMethod::Deflated => Compression::Deflate,
            _ => Compression::Other,
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Compression::Stored => "stored",
            Compression::Deflate => "DEFLATE",
            Compression::Other => "other",
        };

        write!(f, "{}", s)
    }
}

impl fmt::Debug for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[derive(Debug)]
pub struct ParseCompressionError(String);

impl std::error::Error for ParseCompressionError {}

impl fmt::Display for ParseCompressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown compression method: {} (expected one of: {})",
            self.0,
            Compression::available_variants().join(", ")
        )
    }
}

impl FromStr for Compression {
    type Err = ParseCompressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compression = match s {
            "stored" => Compression::Stored,
            "deflate" => Compression::Deflate,
            _ => return Err(ParseCompressionError(s.to_string())),
        };

        Ok(compression)
    }
}
