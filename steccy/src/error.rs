//! Host-facing error type for the embedding application (spec §7).
use std::fmt;
use steccy_formats::FormatError;

/// Everything `Machine`'s loader methods can fail with. Thin on purpose —
/// `TapeMismatch`/`TapeChecksum`/`Unsupported`/`MenuCancelled` never reach
/// this boundary (spec §7 "Propagation"); they're resolved as plain
/// `bool`/`Option<T>` return values at `RomHook::try_intercept` and
/// `Menu::handle_key` respectively.
#[derive(Debug)]
pub enum MachineError {
    Format(FormatError),
}

impl fmt::Display for MachineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MachineError::Format(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for MachineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MachineError::Format(err) => Some(err),
        }
    }
}

impl From<FormatError> for MachineError {
    fn from(err: FormatError) -> Self {
        MachineError::Format(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_error_displays_through() {
        let err = MachineError::Format(FormatError::BadFile("x".into()));
        assert_eq!(err.to_string(), "bad file: x");
    }

    #[test]
    fn from_conversion_wraps_format_error() {
        let err: MachineError = FormatError::BadBlock("y".into()).into();
        assert!(matches!(err, MachineError::Format(FormatError::BadBlock(_))));
    }
}
