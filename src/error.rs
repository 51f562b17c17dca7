//! Error types for level archive parsing and writing.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for level codec operations.
pub type Result<T> = std::result::Result<T, LevelError>;

/// Error types for level codec operations.
#[derive(Debug, Error)]
pub enum LevelError {
    /// I/O error during reading or writing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required archive file is absent.
    #[error("missing file: {}", path.display())]
    MissingFile { path: PathBuf },

    /// A read extends past the end of a file or section.
    #[error("truncated input: need {needed} bytes at offset 0x{offset:X}")]
    TruncatedInput { offset: u64, needed: usize },

    /// Engine header magic does not match any known game.
    #[error("unsupported variant magic: 0x{0:08X}")]
    UnsupportedVariant(u32),

    /// A structural invariant of the format does not hold.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// Structured record parse failure (fixed-layout leaf structs).
    #[error("record parse error: {0}")]
    Record(#[from] binrw::Error),
}
