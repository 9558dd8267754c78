//! Error types for Tessera core systems.

/// Signal-specific errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignalError {
    /// The connection ID is invalid or has already been disconnected.
    #[error("invalid or disconnected connection ID")]
    InvalidConnection,
}

/// A specialized Result type for signal operations.
pub type SignalResult<T> = std::result::Result<T, SignalError>;
