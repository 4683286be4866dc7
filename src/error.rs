//! Error types for the order desk

use thiserror::Error;

/// Result type alias using our custom Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the order desk
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid keypair: {0}")]
    InvalidKeypair(String),

    #[error("Insecure keypair permissions: {0}")]
    InsecureKeypair(String),

    // Order registration errors
    #[error("Limit price must be non-zero")]
    ZeroLimitPrice,

    #[error("Derived order amount overflows u64 (amount {amount}, limit price {limit_price})")]
    AmountOverflow { amount: u64, limit_price: u64 },

    // Stream errors
    #[error("Stream connection failed: {0}")]
    StreamConnection(String),

    #[error("Stream disconnected")]
    StreamDisconnected,

    // Trading errors
    #[error("Transaction build failed: {0}")]
    TransactionBuild(String),

    #[error("Transaction send failed: {0}")]
    TransactionSend(String),

    // RPC errors
    #[error("RPC error: {0}")]
    Rpc(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Check if this error is retryable (transient)
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Rpc(_) | Error::StreamDisconnected | Error::TransactionSend(_)
        )
    }

    /// Check if this error rejects a registration request
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::ZeroLimitPrice | Error::AmountOverflow { .. })
    }
}

// Conversion from solana_client errors
impl From<solana_client::client_error::ClientError> for Error {
    fn from(e: solana_client::client_error::ClientError) -> Self {
        Error::Rpc(e.to_string())
    }
}

// Conversion from serde_json errors
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

// Conversion from I/O errors
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}
