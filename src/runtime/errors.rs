//! Error types for the runtime system

use crate::BitsError;
use crossbeam_channel::SendError;

/// Error type for worker operations
#[derive(Debug, thiserror::Error)]
pub enum WorkError {
    #[error("Failed to send to output channel: {0}")]
    SendError(String),

    #[error("Transcoder error: {0}")]
    Transcode(#[from] BitsError),

    #[error("Worker '{0}' panicked")]
    Panicked(String),

    #[error("Shutdown signal received")]
    Shutdown,
}

impl<T> From<SendError<T>> for WorkError {
    fn from(e: SendError<T>) -> Self {
        WorkError::SendError(format!("{}", e))
    }
}

/// Result type for worker operations
pub type WorkResult<T = ()> = Result<T, WorkError>;
