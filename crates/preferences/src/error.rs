use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum PreferenceError {
    #[error("Invalid theme")]
    InvalidTheme,

    #[error("Invalid widget configuration: {0}")]
    InvalidPayload(String),
}
