//! # Stockroom Core Types
//!
//! The shared vocabulary of the inventory system: catalog records, sales,
//! snapshots, saved reports and per-user preferences, together with the
//! field-level validation applied before anything reaches persistence.
//!
//! Every record carries the `user_id` of its owner. Nothing in this crate
//! ever looks across owners.

pub mod enums;
pub mod error;
pub mod structs;
pub mod validation;

// Re-export the core types to provide a clean public API.
pub use enums::{PaymentMethod, ProductStatus, ReportType, SaleStatus, StockStatus, Theme};
pub use error::CoreError;
pub use structs::{
    Category, CategoryWithCount, DatedAmount, InventorySnapshot, NewCategory, NewProduct,
    NewSale, NewSaleItem, NewSavedReport, Product, ProductFilter, ProductSalesTotal, Sale,
    SaleItem, SavedReport, UserPreference,
};
pub use validation::ValidationErrors;
