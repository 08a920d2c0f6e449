use crate::error::DbError;
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::{
    Category, CategoryWithCount, CoreError, DatedAmount, InventorySnapshot, NewCategory,
    NewProduct, NewSale, NewSavedReport, Product, ProductFilter, ProductSalesTotal, Sale,
    SavedReport, Theme, UserPreference, ValidationErrors,
};
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use uuid::Uuid;

/// The persistence contract used by the web layer.
///
/// Every method is scoped to one owner. A record belonging to another user is
/// indistinguishable from one that does not exist and yields `DbError::NotFound`.
/// Inputs are validated by the store itself, so every implementation rejects
/// the same payloads with the same field messages.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Products matching `filter`, ordered by name.
    async fn list_products(
        &self,
        user_id: Uuid,
        filter: &ProductFilter,
    ) -> Result<Vec<Product>, DbError>;

    async fn get_product(&self, user_id: Uuid, product_id: Uuid) -> Result<Product, DbError>;

    async fn create_product(&self, user_id: Uuid, input: &NewProduct) -> Result<Product, DbError>;

    async fn update_product(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        input: &NewProduct,
    ) -> Result<Product, DbError>;

    /// Categories ordered by name, each with the number of products filed under it.
    async fn list_categories(&self, user_id: Uuid) -> Result<Vec<CategoryWithCount>, DbError>;

    async fn create_category(&self, user_id: Uuid, input: &NewCategory)
    -> Result<Category, DbError>;

    async fn record_sale(&self, user_id: Uuid, input: &NewSale) -> Result<Sale, DbError>;

    /// Sales with their line items, newest first.
    async fn list_sales(&self, user_id: Uuid) -> Result<Vec<Sale>, DbError>;

    /// Sale totals dated by the (UTC) calendar day of the sale, for `start..=end`.
    async fn sale_amounts_between(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DatedAmount>, DbError>;

    /// Units and revenue per product across every recorded sale line.
    async fn product_sales_totals(&self, user_id: Uuid) -> Result<Vec<ProductSalesTotal>, DbError>;

    /// Records the current inventory value for `date`, replacing any snapshot already taken that day.
    async fn record_snapshot(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<InventorySnapshot, DbError>;

    async fn snapshot_values_between(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DatedAmount>, DbError>;

    /// Returns the user's preference row, creating it with `default_widgets` on first access.
    async fn get_or_create_preference(
        &self,
        user_id: Uuid,
        default_widgets: &JsonValue,
    ) -> Result<UserPreference, DbError>;

    async fn save_dashboard_widgets(
        &self,
        user_id: Uuid,
        widgets: &JsonValue,
    ) -> Result<UserPreference, DbError>;

    /// Upserts the theme. An existing widget configuration is left alone.
    async fn save_theme(&self, user_id: Uuid, theme: Theme) -> Result<UserPreference, DbError>;

    /// Creates the report, or replaces the one with the same name.
    async fn save_report(
        &self,
        user_id: Uuid,
        input: &NewSavedReport,
    ) -> Result<SavedReport, DbError>;

    /// Reports, most recently updated first.
    async fn list_reports(&self, user_id: Uuid) -> Result<Vec<SavedReport>, DbError>;
}

pub(crate) fn invalid_category() -> DbError {
    field_error("category_id", "Select a valid category.")
}

pub(crate) fn duplicate_sku() -> DbError {
    field_error("sku", "Product with this SKU already exists.")
}

pub(crate) fn field_error(field: &str, message: &str) -> DbError {
    DbError::Core(CoreError::Validation(ValidationErrors::single(field, message)))
}

/// Every sale line must point at one of `owned` products.
pub(crate) fn check_sale_products(input: &NewSale, owned: &HashSet<Uuid>) -> Result<(), DbError> {
    let mut errors = ValidationErrors::new();
    for (index, item) in input.items.iter().enumerate() {
        if !owned.contains(&item.product_id) {
            errors.add(&format!("items[{}].product_id", index), "Unknown product.");
        }
    }
    Ok(errors.into_result()?)
}
