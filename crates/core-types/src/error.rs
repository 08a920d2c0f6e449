use crate::validation::ValidationErrors;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Unknown {0}: '{1}'")]
    UnknownVariant(&'static str, String),

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),
}
