//! Error kinds surfaced by the tape/snapshot parsers (spec §7).
//!
//! Only `BadFile` and `BadBlock` ever leave the core — `TapeMismatch` and
//! `TapeChecksum` are resolved entirely inside the ROM-hook/CPU boundary and
//! never constructed here.
use std::fmt;

#[derive(Debug)]
pub enum FormatError {
    /// Unrecognised format, truncated header, or unsupported hardware id.
    BadFile(String),
    /// A `.tzx` block whose declared length exceeds the file remainder.
    BadBlock(String),
    Io(std::io::Error),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::BadFile(msg) => write!(f, "bad file: {}", msg),
            FormatError::BadBlock(msg) => write!(f, "bad block: {}", msg),
            FormatError::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for FormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FormatError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for FormatError {
    fn from(err: std::io::Error) -> Self {
        FormatError::Io(err)
    }
}

pub type Result<T> = std::result::Result<T, FormatError>;
