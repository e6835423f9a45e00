//! RPC server error types

use contracts::ContractError;
use thiserror::Error;

/// RPC-level errors
#[derive(Debug, Error)]
pub enum RpcError {
    /// Line is not a valid request object
    #[error("malformed request: {message}")]
    MalformedRequest { message: String },

    /// Method name not recognized
    #[error("unknown method '{method}'")]
    UnknownMethod { method: String },

    /// Params missing or of the wrong shape
    #[error("invalid params for '{method}': {message}")]
    InvalidParams { method: String, message: String },

    /// Request line exceeded the configured limit
    #[error("request exceeds {limit} bytes")]
    RequestTooLarge { limit: usize },

    /// Error raised by a vehicle or the registry
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// Response encoding failed
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RpcError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRequest {
            message: message.into(),
        }
    }

    pub fn unknown_method(method: impl Into<String>) -> Self {
        Self::UnknownMethod {
            method: method.into(),
        }
    }

    pub fn invalid_params(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParams {
            method: method.into(),
            message: message.into(),
        }
    }

    /// Label carried in the `error.kind` field of a response
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedRequest { .. } => "malformed_request",
            Self::UnknownMethod { .. } => "unknown_method",
            Self::InvalidParams { .. } => "invalid_params",
            Self::RequestTooLarge { .. } => "request_too_large",
            Self::Contract(e) => e.kind().as_str(),
            Self::Encode(_) | Self::Io(_) => "internal",
        }
    }
}

pub type Result<T> = std::result::Result<T, RpcError>;
