//! Error definitions for the chat orchestration layer.

use crate::genai::GenAiError;
use thiserror::Error;

/// Errors produced while ingesting an uploaded document.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The uploaded bytes could not be spooled to local disk.
    #[error("Failed to spool upload to disk: {0}")]
    Spool(#[from] std::io::Error),
    /// The remote service rejected a call outright.
    #[error(transparent)]
    Remote(#[from] GenAiError),
    /// The service reported a terminal failure for the uploaded file.
    #[error("Remote processing failed for '{display_name}'")]
    ProcessingFailed {
        /// Display name of the rejected upload.
        display_name: String,
    },
    /// The file never left the processing state within the polling budget.
    #[error("File was still processing after {attempts} status checks")]
    PollTimeout {
        /// Number of status checks performed before giving up.
        attempts: u32,
    },
    /// The service reported a state this client does not understand.
    #[error("Remote reported an unrecognized file state")]
    UnexpectedState,
}
