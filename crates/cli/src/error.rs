//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Every configured vehicle failed to build
    #[error("No vehicle could be built ({failed} failed)")]
    NoVehicles { failed: usize },

    /// RPC server could not start
    #[error("Failed to start RPC server on {address}: {message}")]
    ServerStart { address: String, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn server_start(address: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ServerStart {
            address: address.into(),
            message: message.into(),
        }
    }
}
