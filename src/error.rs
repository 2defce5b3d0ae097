//! # Error Types
//!
//! This module defines error types used throughout the folio library.
//!
//! Every failure is scoped to a single user action: nothing here is fatal
//! to the process, and the in-memory document stays editable after any
//! error. See the individual variants for how each failure class is
//! surfaced (notification, log entry, or silent recovery).

use thiserror::Error;

/// Main error type for folio operations
#[derive(Debug, Error)]
pub enum FolioError {
    /// Invalid input or document state (e.g. a field edit that does not
    /// apply to the current document kind)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Export was requested but no preview is attached to the session
    #[error("Preview not available")]
    PreviewNotFound,

    /// An operation was triggered while another one is still in flight
    #[error("Operation already in progress: {0}")]
    Busy(String),

    /// Rasterization error (asset decoding, canvas composition)
    #[error("Render error: {0}")]
    Render(String),

    /// PDF emission or print spooling error
    #[error("Export error: {0}")]
    Export(String),

    /// Persistence collaborator error (insert/select/delete)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Numbering collaborator error (reservation RPC)
    #[error("Numbering error: {0}")]
    Numbering(String),

    /// Draft snapshot load/save error
    #[error("Draft error: {0}")]
    Draft(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
