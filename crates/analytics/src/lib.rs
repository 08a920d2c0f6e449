//! # Stockroom Analytics
//!
//! The computation layer behind the dashboard and the analytics pages.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of storage or
//!   HTTP. It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** The `AnalyticsEngine` takes already-fetched, owner-scoped
//!   records and returns derived series and rankings. Randomness for the placeholder
//!   series is injected by the caller.
//!
//! ## Public API
//!
//! - `stock_status`, `profit_margin`: the per-product derived fields.
//! - `catalog_value`: the live value of a catalog at cost.
//! - `AnalyticsEngine`: date windows, day bucketing, trends, product ranking, dashboard summary.
//! - `change_percentage`, `top_products`, `bottom_products`: series helpers.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

pub mod engine;
pub mod error;
pub mod metrics;
pub mod report;
pub mod synthetic;

// Re-export the key components to create a clean, public-facing API.
pub use engine::{AnalyticsEngine, DateWindow, bottom_products, change_percentage, top_products};
pub use error::AnalyticsError;
pub use metrics::{catalog_value, profit_margin, stock_status};
pub use report::{
    DailySeries, DashboardSummary, PerformanceReport, ProductPerformance, ProductView,
    RankedProduct, TrendReport,
};
