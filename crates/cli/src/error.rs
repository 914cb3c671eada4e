//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Peer could not be reached or did not connect
    #[error("Failed to reach peer at {addr}: {message}")]
    PeerConnection { addr: String, message: String },

    /// Recording could not be used as a sample source
    #[error("Recording {path} unusable: {message}")]
    Recording { path: String, message: String },

    /// Pairing library error
    #[error(transparent)]
    Contract(#[from] contracts::ContractError),
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn peer_connection(addr: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PeerConnection {
            addr: addr.into(),
            message: message.into(),
        }
    }

    pub fn recording(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Recording {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
