//! Error types for archive reading and extraction.
//!
//! Every fallible operation in this crate returns [`Result<T>`]. The host
//! that embeds this reader serves many unrelated requests, so failures are
//! always surfaced as values: a corrupt archive degrades to "no result" for
//! that request and must never panic.

use std::io;
use std::path::PathBuf;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// All failure modes of the archive reader.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The archive file could not be opened, or is empty.
    #[error("cannot open archive {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file is not a valid ZIP container, or its directory is corrupt.
    ///
    /// This covers a missing end-of-directory marker, a record signature
    /// that does not match what the directory promised, and declared spans
    /// that extend past the end of the file.
    #[error("invalid archive: {reason}")]
    Format { reason: String },

    /// No entry matched the queried path pattern.
    ///
    /// Recoverable: callers typically proceed without the optional file.
    #[error("no entry matching `{pattern}`")]
    EntryNotFound { pattern: String },

    /// The entry's payload could not be decompressed.
    ///
    /// Raised for malformed or truncated deflate streams and for
    /// compression methods this reader does not support.
    #[error("cannot decompress `{path}`: {reason}")]
    Decompression { path: String, reason: String },

    /// The decompressed payload does not match the declared CRC-32.
    #[error("checksum mismatch for `{path}`: expected {expected:#010x}, got {actual:#010x}")]
    Checksum {
        path: String,
        expected: u32,
        actual: u32,
    },

    /// Filesystem error while writing extracted output.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn format(reason: impl Into<String>) -> Error {
        Error::Format {
            reason: reason.into(),
        }
    }

    pub(crate) fn decompression(path: &str, reason: impl Into<String>) -> Error {
        Error::Decompression {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}
