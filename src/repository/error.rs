#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("Store request failed: {0}")]
    RequestFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Store API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse store response: {0}")]
    JsonParseFailed(#[from] serde_json::Error),

    #[error("Unknown column `{column}`.")]
    UnknownColumn { column: String },

    #[error("Sheets authentication failed: {message}")]
    AuthFailed { message: String },

    #[error("Failed to write row {row}: {message}")]
    WriteFailed { row: u32, message: String },
}

impl From<wreq::Error> for StoreError {
    fn from(e: wreq::Error) -> Self {
        StoreError::RequestFailed(Box::new(e))
    }
}

impl From<gcp_auth::Error> for StoreError {
    fn from(e: gcp_auth::Error) -> Self {
        StoreError::AuthFailed {
            message: e.to_string(),
        }
    }
}
