use sync_core::error::AppError;
use thiserror::Error;

/// Failure of a controller operation. None of these are fatal; the user can always
/// retry the gesture.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The store could not be reached, or its response could not be read.
    #[error("Document store unreachable: {0}")]
    Transport(String),

    /// The store answered but refused the operation.
    #[error("Document store rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// A precondition checked before any request was sent.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The store applied a mutation but the follow-up list failed, so the local
    /// snapshot does not show it yet.
    #[error("{accepted}, but the document list could not be reloaded: {source}")]
    ListNotReloaded {
        accepted: String,
        source: Box<SyncError>,
    },
}

impl SyncError {
    pub fn is_transport(&self) -> bool {
        matches!(self, SyncError::Transport(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, SyncError::Rejected { .. })
    }

    /// True when the store accepted the mutation even though the call failed.
    pub fn mutation_applied(&self) -> bool {
        matches!(self, SyncError::ListNotReloaded { .. })
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        SyncError::Transport(err.to_string())
    }
}

impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Transport(msg) => AppError::BadGateway(msg),
            err @ SyncError::Rejected { .. } => AppError::Unprocessable(anyhow::Error::new(err)),
            err @ SyncError::InvalidInput(_) => AppError::Unprocessable(anyhow::Error::new(err)),
            err @ SyncError::ListNotReloaded { .. } => AppError::BadGateway(err.to_string()),
        }
    }
}
