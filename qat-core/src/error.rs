//! Error types for the QAT device plugin.
//!
//! All errors use `thiserror` for ergonomic error handling and proper error chains.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for plugin operations.
pub type Result<T> = std::result::Result<T, QatError>;

/// Which half of a driver transition failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindStage {
    /// Writing the address to the kernel driver's `unbind` file.
    Unbind,
    /// Writing the device ID to the target driver's `new_id` file.
    Bind,
}

impl fmt::Display for BindStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbind => f.write_str("unbind failed"),
            Self::Bind => f.write_str("bind failed"),
        }
    }
}

/// Coarse classification of a [`QatError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Discovery,
    Identifier,
    Bind,
    NodeResolution,
    Configuration,
}

impl ErrorKind {
    /// Label used for metrics and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovery => "discovery",
            Self::Identifier => "identifier",
            Self::Bind => "bind",
            Self::NodeResolution => "node_resolution",
            Self::Configuration => "configuration",
        }
    }
}

/// Main error type for the plugin.
#[derive(Error, Debug)]
pub enum QatError {
    // Discovery errors
    #[error("Can't read sysfs for driver {driver} at {path:?}: {source}")]
    Discovery {
        driver: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Device {address} is listed under both {first} and {second}")]
    DuplicateDevice { address: String, first: String, second: String },

    // Device errors
    #[error("Cannot obtain ID for the device {address} from {path:?}: {source}")]
    Identifier {
        address: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Device {address}: {stage} ({path:?}): {source}")]
    Bind {
        address: String,
        stage: BindStage,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to resolve device nodes for {address}: {reason}")]
    NodeResolution { address: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl QatError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Discovery { .. } | Self::DuplicateDevice { .. } => ErrorKind::Discovery,
            Self::Identifier { .. } => ErrorKind::Identifier,
            Self::Bind { .. } => ErrorKind::Bind,
            Self::NodeResolution { .. } => ErrorKind::NodeResolution,
            Self::InvalidConfig { .. } => ErrorKind::Configuration,
        }
    }

    /// Create an InvalidConfig error from a message.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig { reason: reason.into() }
    }
}
