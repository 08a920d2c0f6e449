use crate::enums::{PaymentMethod, ProductStatus, ReportType, SaleStatus, Theme};
use crate::error::CoreError;
use crate::validation::{AMOUNT_TOO_LARGE, ValidationErrors};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// A stocked item owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub sku: String,
    pub barcode: Option<String>,
    pub price: Decimal,
    /// Purchase cost per unit. May be unknown.
    pub cost: Option<Decimal>,
    pub quantity: i32,
    /// Stock level at or below which the product needs reordering.
    pub minimum_stock: i32,
    pub maximum_stock: i32,
    pub status: ProductStatus,
    pub location: Option<String>,
    pub supplier: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Builds a freshly created product from validated input.
    pub fn from_new(user_id: Uuid, input: &NewProduct, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            category_id: input.category_id,
            name: input.name.trim().to_string(),
            description: input.description.clone(),
            sku: input.sku.trim().to_string(),
            barcode: input.barcode.clone(),
            price: input.price,
            cost: input.cost,
            quantity: input.quantity,
            minimum_stock: input.minimum_stock,
            maximum_stock: input.maximum_stock,
            status: input.status,
            location: input.location.clone(),
            supplier: input.supplier.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites every editable field with `input`, keeping identity and creation time.
    pub fn apply(&mut self, input: &NewProduct, now: DateTime<Utc>) {
        self.category_id = input.category_id;
        self.name = input.name.trim().to_string();
        self.description = input.description.clone();
        self.sku = input.sku.trim().to_string();
        self.barcode = input.barcode.clone();
        self.price = input.price;
        self.cost = input.cost;
        self.quantity = input.quantity;
        self.minimum_stock = input.minimum_stock;
        self.maximum_stock = input.maximum_stock;
        self.status = input.status;
        self.location = input.location.clone();
        self.supplier = input.supplier.clone();
        self.updated_at = now;
    }

    /// Value of the units on hand at purchase cost. Unknown cost counts as zero.
    pub fn stock_value(&self) -> Decimal {
        Decimal::from(self.quantity) * self.cost.unwrap_or(Decimal::ZERO)
    }

    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.minimum_stock
    }
}

/// Create/update payload for a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub category_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub sku: String,
    #[serde(default)]
    pub barcode: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub cost: Option<Decimal>,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default)]
    pub minimum_stock: i32,
    #[serde(default)]
    pub maximum_stock: i32,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub supplier: Option<String>,
}

/// Optional narrowing applied when listing products.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductFilter {
    /// Case-insensitive substring of name, SKU or description.
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<Uuid>,
    #[serde(default)]
    pub status: Option<ProductStatus>,
    #[serde(default)]
    pub low_stock: bool,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            let in_description = product
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle));
            if !product.name.to_lowercase().contains(&needle)
                && !product.sku.to_lowercase().contains(&needle)
                && !in_description
            {
                return false;
            }
        }
        if self.category.is_some_and(|c| c != product.category_id) {
            return false;
        }
        if self.status.is_some_and(|s| s != product.status) {
            return false;
        }
        !(self.low_stock && !product.is_low_stock())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A category annotated with the number of products filed under it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryWithCount {
    #[serde(flatten)]
    pub category: Category,
    pub product_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: Uuid,
    pub user_id: Uuid,
    pub invoice_id: String,
    pub sale_date: DateTime<Utc>,
    pub payment_method: PaymentMethod,
    pub status: SaleStatus,
    pub total_amount: Decimal,
    pub items: Vec<SaleItem>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleItem {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: Decimal,
    pub subtotal: Decimal,
}

impl SaleItem {
    /// `quantity × price`, or `None` when the product does not fit a `Decimal`.
    pub fn line_subtotal(quantity: i32, price: Decimal) -> Option<Decimal> {
        Decimal::from(quantity).checked_mul(price)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSale {
    /// Generated from the sale date when omitted.
    #[serde(default)]
    pub invoice_id: Option<String>,
    /// Defaults to the moment the sale is recorded.
    #[serde(default)]
    pub sale_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub status: SaleStatus,
    /// Explicit total. When absent the sum of line subtotals is used.
    #[serde(default)]
    pub total_amount: Option<Decimal>,
    pub items: Vec<NewSaleItem>,
}

impl NewSale {
    /// The explicit total, else the sum of line subtotals. `None` on overflow.
    pub fn resolved_total(&self) -> Option<Decimal> {
        match self.total_amount {
            Some(total) => Some(total),
            None => self.items.iter().try_fold(Decimal::ZERO, |acc, item| {
                acc.checked_add(SaleItem::line_subtotal(item.quantity, item.price)?)
            }),
        }
    }

    /// Materializes the sale and its lines, ready to be persisted.
    pub fn into_sale(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<Sale, CoreError> {
        let sale_id = Uuid::new_v4();
        let sale_date = self.sale_date.unwrap_or(now);
        let invoice_id = self
            .invoice_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| {
                let suffix = sale_id.simple().to_string();
                format!("INV-{}-{}", sale_date.format("%Y%m%d"), &suffix[..8])
            });
        let items = self
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let subtotal = SaleItem::line_subtotal(item.quantity, item.price)
                    .ok_or_else(|| amount_too_large(&format!("items[{}].price", index)))?;
                Ok(SaleItem {
                    id: Uuid::new_v4(),
                    sale_id,
                    product_id: item.product_id,
                    quantity: item.quantity,
                    price: item.price,
                    subtotal,
                })
            })
            .collect::<Result<Vec<_>, CoreError>>()?;
        let total_amount = self
            .resolved_total()
            .ok_or_else(|| amount_too_large("total_amount"))?;

        Ok(Sale {
            id: sale_id,
            user_id,
            invoice_id,
            sale_date,
            payment_method: self.payment_method,
            status: self.status,
            total_amount,
            items,
            created_at: now,
        })
    }
}

fn amount_too_large(field: &str) -> CoreError {
    CoreError::Validation(ValidationErrors::single(field, AMOUNT_TOO_LARGE))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSaleItem {
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: Decimal,
}

/// The recorded total inventory value of one user on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub total_value: Decimal,
    pub total_products: i32,
    pub created_at: DateTime<Utc>,
}

/// A monetary amount attributed to a calendar day, the input of time-series aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DatedAmount {
    pub date: NaiveDate,
    pub amount: Decimal,
}

/// Units sold and revenue earned by one product across all of its sale lines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProductSalesTotal {
    pub product_id: Uuid,
    pub quantity: i64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedReport {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub report_type: ReportType,
    pub configuration: JsonValue,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSavedReport {
    pub name: String,
    pub report_type: ReportType,
    pub configuration: JsonValue,
}

/// Per-user singleton holding the theme and the raw dashboard widget configuration.
///
/// `dashboard_widgets` is kept as stored JSON; interpreting it (and tolerating
/// garbage in it) is the preferences layer's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreference {
    pub user_id: Uuid,
    pub theme: Theme,
    pub dashboard_widgets: Option<JsonValue>,
    pub updated_at: DateTime<Utc>,
}
