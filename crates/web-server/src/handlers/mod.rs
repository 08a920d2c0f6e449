//! Route handlers, one module per resource.

pub mod analytics;
pub mod assistant;
pub mod categories;
pub mod dashboard;
pub mod preferences;
pub mod products;
pub mod reports;
pub mod sales;

use chrono::{NaiveDate, Utc};

/// The current calendar day in UTC, the end of every analytics window.
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}
