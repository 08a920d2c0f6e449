use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Requested window of {requested} days exceeds the maximum of {max} days")]
    WindowTooLarge { requested: u32, max: u32 },

    #[error("Invalid aggregation window: {0}")]
    InvalidWindow(String),
}
