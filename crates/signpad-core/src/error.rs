//! Export pipeline errors.

use thiserror::Error;

/// Reasons an export attempt is abandoned. Every variant is terminal for that
/// attempt; nothing is retried and nothing is delivered.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No drawable surface or uploaded image to export")]
    NoSignature,
    #[error("Could not allocate a {width}x{height} output buffer")]
    ContextUnavailable { width: u32, height: u32 },
    #[error("Encoding failed: {0}")]
    Encode(String),
    #[error("Encoder produced no data")]
    EmptyEncoding,
    #[error("Encoded size {size} bytes exceeds the {limit_kb}KB limit")]
    SizeLimitExceeded { size: usize, limit_kb: u32 },
    #[error("Delivery failed: {0}")]
    Delivery(String),
    #[error("Could not decode image: {0}")]
    Decode(String),
}

impl ExportError {
    /// Message shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ExportError::NoSignature => "No signature to download".to_string(),
            ExportError::ContextUnavailable { .. } => "Could not process signature".to_string(),
            ExportError::SizeLimitExceeded { limit_kb, .. } => {
                format!("File size exceeds {}KB limit", limit_kb)
            }
            ExportError::Decode(_) => "Could not read the uploaded image".to_string(),
            ExportError::Encode(_) | ExportError::EmptyEncoding | ExportError::Delivery(_) => {
                "Failed to download signature".to_string()
            }
        }
    }
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;
