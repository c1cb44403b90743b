#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AvailabilityError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("No class page found at `{url}` (status {status}).")]
    PageNotFound { url: String, status: u16 },

    #[error("Unparseable availability text: `{text}`.")]
    UnparseableAvailability { text: String },
}

impl From<wreq::Error> for AvailabilityError {
    fn from(e: wreq::Error) -> Self {
        AvailabilityError::RequestFailed(Box::new(e))
    }
}
