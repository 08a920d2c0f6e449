use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Query cannot be empty")]
    EmptyQuery,

    #[error("Model API request failed: {0}")]
    Request(reqwest::Error),

    #[error("Model API returned {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Failed to get a valid response from the model API")]
    EmptyResponse,
}

/// Request URLs are stripped so nothing about the endpoint reaches callers or logs.
impl From<reqwest::Error> for AssistantError {
    fn from(e: reqwest::Error) -> Self {
        AssistantError::Request(e.without_url())
    }
}
