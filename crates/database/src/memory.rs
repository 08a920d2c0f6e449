//! An in-process `InventoryStore` for tests.

use crate::error::DbError;
use crate::store::{self, InventoryStore};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use core_types::{
    Category, CategoryWithCount, DatedAmount, InventorySnapshot, NewCategory, NewProduct,
    NewSale, NewSavedReport, Product, ProductFilter, ProductSalesTotal, Sale, SavedReport, Theme,
    UserPreference,
};
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct MemoryState {
    products: Vec<Product>,
    categories: Vec<Category>,
    sales: Vec<Sale>,
    snapshots: Vec<InventorySnapshot>,
    preferences: Vec<UserPreference>,
    reports: Vec<SavedReport>,
}

/// Keeps everything in vectors behind one lock. Mirrors `DbRepository` semantics.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every call fails with `DbError::Unavailable`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Inserts a sale as-is, bypassing validation. Lets tests backdate records.
    pub async fn insert_sale(&self, sale: Sale) {
        self.state.write().await.sales.push(sale);
    }

    /// Inserts a snapshot as-is.
    pub async fn insert_snapshot(&self, snapshot: InventorySnapshot) {
        self.state.write().await.snapshots.push(snapshot);
    }

    fn check(&self) -> Result<(), DbError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DbError::Unavailable("memory store switched off".to_string()));
        }
        Ok(())
    }
}

fn preference_entry(
    preferences: &mut Vec<UserPreference>,
    user_id: Uuid,
    widgets: Option<JsonValue>,
) -> &mut UserPreference {
    let index = match preferences.iter().position(|p| p.user_id == user_id) {
        Some(index) => index,
        None => {
            preferences.push(UserPreference {
                user_id,
                theme: Theme::default(),
                dashboard_widgets: widgets,
                updated_at: Utc::now(),
            });
            preferences.len() - 1
        }
    };
    &mut preferences[index]
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn list_products(
        &self,
        user_id: Uuid,
        filter: &ProductFilter,
    ) -> Result<Vec<Product>, DbError> {
        self.check()?;
        let state = self.state.read().await;
        let mut products: Vec<Product> = state
            .products
            .iter()
            .filter(|p| p.user_id == user_id && filter.matches(p))
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn get_product(&self, user_id: Uuid, product_id: Uuid) -> Result<Product, DbError> {
        self.check()?;
        let state = self.state.read().await;
        state
            .products
            .iter()
            .find(|p| p.id == product_id && p.user_id == user_id)
            .cloned()
            .ok_or(DbError::NotFound)
    }

    async fn create_product(&self, user_id: Uuid, input: &NewProduct) -> Result<Product, DbError> {
        self.check()?;
        input.validate()?;
        let mut state = self.state.write().await;
        if !state
            .categories
            .iter()
            .any(|c| c.id == input.category_id && c.user_id == user_id)
        {
            return Err(store::invalid_category());
        }
        if state
            .products
            .iter()
            .any(|p| p.user_id == user_id && p.sku == input.sku.trim())
        {
            return Err(store::duplicate_sku());
        }

        let product = Product::from_new(user_id, input, Utc::now());
        state.products.push(product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        input: &NewProduct,
    ) -> Result<Product, DbError> {
        self.check()?;
        let mut state = self.state.write().await;
        let index = state
            .products
            .iter()
            .position(|p| p.id == product_id && p.user_id == user_id)
            .ok_or(DbError::NotFound)?;
        input.validate()?;
        if !state
            .categories
            .iter()
            .any(|c| c.id == input.category_id && c.user_id == user_id)
        {
            return Err(store::invalid_category());
        }
        if state
            .products
            .iter()
            .any(|p| p.user_id == user_id && p.id != product_id && p.sku == input.sku.trim())
        {
            return Err(store::duplicate_sku());
        }

        let product = &mut state.products[index];
        product.apply(input, Utc::now());
        Ok(product.clone())
    }

    async fn list_categories(&self, user_id: Uuid) -> Result<Vec<CategoryWithCount>, DbError> {
        self.check()?;
        let state = self.state.read().await;
        let mut rows: Vec<CategoryWithCount> = state
            .categories
            .iter()
            .filter(|c| c.user_id == user_id)
            .map(|c| CategoryWithCount {
                category: c.clone(),
                product_count: state
                    .products
                    .iter()
                    .filter(|p| p.user_id == user_id && p.category_id == c.id)
                    .count() as i64,
            })
            .collect();
        rows.sort_by(|a, b| a.category.name.cmp(&b.category.name));
        Ok(rows)
    }

    async fn create_category(
        &self,
        user_id: Uuid,
        input: &NewCategory,
    ) -> Result<Category, DbError> {
        self.check()?;
        input.validate()?;
        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4(),
            user_id,
            name: input.name.trim().to_string(),
            description: input.description.clone(),
            created_at: now,
            updated_at: now,
        };
        self.state.write().await.categories.push(category.clone());
        Ok(category)
    }

    async fn record_sale(&self, user_id: Uuid, input: &NewSale) -> Result<Sale, DbError> {
        self.check()?;
        input.validate()?;
        let mut state = self.state.write().await;
        let owned: HashSet<Uuid> = state
            .products
            .iter()
            .filter(|p| p.user_id == user_id)
            .map(|p| p.id)
            .collect();
        store::check_sale_products(input, &owned)?;

        let sale = input.into_sale(user_id, Utc::now())?;
        state.sales.push(sale.clone());
        Ok(sale)
    }

    async fn list_sales(&self, user_id: Uuid) -> Result<Vec<Sale>, DbError> {
        self.check()?;
        let state = self.state.read().await;
        let mut sales: Vec<Sale> = state
            .sales
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        sales.sort_by(|a, b| b.sale_date.cmp(&a.sale_date));
        Ok(sales)
    }

    async fn sale_amounts_between(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DatedAmount>, DbError> {
        self.check()?;
        let state = self.state.read().await;
        Ok(state
            .sales
            .iter()
            .filter(|s| s.user_id == user_id)
            .map(|s| DatedAmount {
                date: s.sale_date.date_naive(),
                amount: s.total_amount,
            })
            .filter(|d| d.date >= start && d.date <= end)
            .collect())
    }

    async fn product_sales_totals(&self, user_id: Uuid) -> Result<Vec<ProductSalesTotal>, DbError> {
        self.check()?;
        let state = self.state.read().await;
        // First-seen order, matching how the rows were recorded.
        let mut totals: Vec<ProductSalesTotal> = Vec::new();
        for item in state
            .sales
            .iter()
            .filter(|s| s.user_id == user_id)
            .flat_map(|s| &s.items)
        {
            match totals.iter_mut().find(|t| t.product_id == item.product_id) {
                Some(total) => {
                    total.quantity += i64::from(item.quantity);
                    total.revenue += item.subtotal;
                }
                None => totals.push(ProductSalesTotal {
                    product_id: item.product_id,
                    quantity: i64::from(item.quantity),
                    revenue: item.subtotal,
                }),
            }
        }
        Ok(totals)
    }

    async fn record_snapshot(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<InventorySnapshot, DbError> {
        self.check()?;
        let mut state = self.state.write().await;
        let owned: Vec<&Product> = state.products.iter().filter(|p| p.user_id == user_id).collect();
        let total_value = owned.iter().map(|p| p.stock_value()).sum();
        let total_products = owned.len() as i32;

        if let Some(existing) = state
            .snapshots
            .iter_mut()
            .find(|s| s.user_id == user_id && s.date == date)
        {
            existing.total_value = total_value;
            existing.total_products = total_products;
            return Ok(existing.clone());
        }

        let snapshot = InventorySnapshot {
            id: Uuid::new_v4(),
            user_id,
            date,
            total_value,
            total_products,
            created_at: Utc::now(),
        };
        state.snapshots.push(snapshot.clone());
        Ok(snapshot)
    }

    async fn snapshot_values_between(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DatedAmount>, DbError> {
        self.check()?;
        let state = self.state.read().await;
        let mut values: Vec<DatedAmount> = state
            .snapshots
            .iter()
            .filter(|s| s.user_id == user_id && s.date >= start && s.date <= end)
            .map(|s| DatedAmount {
                date: s.date,
                amount: s.total_value,
            })
            .collect();
        values.sort_by_key(|v| v.date);
        Ok(values)
    }

    async fn get_or_create_preference(
        &self,
        user_id: Uuid,
        default_widgets: &JsonValue,
    ) -> Result<UserPreference, DbError> {
        self.check()?;
        let mut state = self.state.write().await;
        Ok(preference_entry(&mut state.preferences, user_id, Some(default_widgets.clone())).clone())
    }

    async fn save_dashboard_widgets(
        &self,
        user_id: Uuid,
        widgets: &JsonValue,
    ) -> Result<UserPreference, DbError> {
        self.check()?;
        let mut state = self.state.write().await;
        let pref = preference_entry(&mut state.preferences, user_id, None);
        pref.dashboard_widgets = Some(widgets.clone());
        pref.updated_at = Utc::now();
        Ok(pref.clone())
    }

    async fn save_theme(&self, user_id: Uuid, theme: Theme) -> Result<UserPreference, DbError> {
        self.check()?;
        let mut state = self.state.write().await;
        let pref = preference_entry(&mut state.preferences, user_id, None);
        pref.theme = theme;
        pref.updated_at = Utc::now();
        Ok(pref.clone())
    }

    async fn save_report(
        &self,
        user_id: Uuid,
        input: &NewSavedReport,
    ) -> Result<SavedReport, DbError> {
        self.check()?;
        input.validate()?;
        let name = input.name.trim();
        let now = Utc::now();
        let mut state = self.state.write().await;

        if let Some(existing) = state
            .reports
            .iter_mut()
            .find(|r| r.user_id == user_id && r.name == name)
        {
            existing.report_type = input.report_type;
            existing.configuration = input.configuration.clone();
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let report = SavedReport {
            id: Uuid::new_v4(),
            user_id,
            name: name.to_string(),
            report_type: input.report_type,
            configuration: input.configuration.clone(),
            created_at: now,
            updated_at: now,
        };
        state.reports.push(report.clone());
        Ok(report)
    }

    async fn list_reports(&self, user_id: Uuid) -> Result<Vec<SavedReport>, DbError> {
        self.check()?;
        let state = self.state.read().await;
        let mut reports: Vec<SavedReport> = state
            .reports
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        reports.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(reports)
    }
}
