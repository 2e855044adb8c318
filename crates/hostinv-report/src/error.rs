//! Error types for hostinv-report

use thiserror::Error;

/// Errors raised while rendering a report
#[derive(Error, Debug)]
pub enum RenderError {
    /// Writing to the output sink failed
    #[error("output error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding failed
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
