use std::path::PathBuf;

use thiserror::Error;

/// The error type for option resolution.
///
/// Every variant is fatal: resolution stops at the first failure and no
/// partially resolved configuration is handed out.
#[derive(Error, Debug)]
pub enum OptionsError {
    /// An argument was unknown, malformed, or outside its choice set.
    ///
    /// The wrapped clap error carries the usage message; `--help` and
    /// `--version` requests also surface through this variant.
    #[error(transparent)]
    Usage(#[from] clap::Error),

    /// The first requested GPU id does not name a usable device.
    #[error("GPU {id} is not available: {reason}")]
    DeviceUnavailable {
        /// The requested device id.
        id: usize,
        /// Why the device could not be selected.
        reason: String,
    },

    /// The derived checkpoint directory could not be created.
    #[error("Failed to create checkpoint directory {}", path.display())]
    CheckpointDir {
        /// The directory that was being created.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The option listing could not be echoed.
    #[error("Failed to echo options listing")]
    Echo {
        #[source]
        source: std::io::Error,
    },

    /// The options snapshot could not be written.
    #[error("Failed to write options snapshot {}", path.display())]
    SnapshotWrite {
        /// The snapshot file path.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An options snapshot could not be read back.
    #[error("Failed to read options snapshot {}", path.display())]
    SnapshotRead {
        /// The snapshot file path.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A snapshot line did not match the listing format.
    #[error("Malformed options snapshot at line {line}: {content:?}")]
    MalformedSnapshot {
        /// One-based line number.
        line: usize,
        /// The offending line.
        content: String,
    },
}

/// Coarse failure categories reported to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or out-of-choice argument.
    Usage,
    /// Requested compute device unavailable.
    Device,
    /// Filesystem failure.
    Io,
}

impl OptionsError {
    /// Returns the category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Usage(_) => ErrorKind::Usage,
            Self::DeviceUnavailable { .. } => ErrorKind::Device,
            Self::CheckpointDir { .. }
            | Self::Echo { .. }
            | Self::SnapshotWrite { .. }
            | Self::SnapshotRead { .. }
            | Self::MalformedSnapshot { .. } => ErrorKind::Io,
        }
    }
}

/// A specialized `Result` type for option resolution.
pub type OptionsResult<T> = Result<T, OptionsError>;
