use crate::repository::error::StoreError;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ServiceError {
    #[error("Failed to send notification: {message}")]
    NotifyFailed { message: String },

    #[error("StoreError: {0}")]
    StoreError(#[from] StoreError),
}
