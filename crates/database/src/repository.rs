use crate::DbError;
use crate::store::{self, InventoryStore};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use core_types::{
    Category, CategoryWithCount, DatedAmount, InventorySnapshot, NewCategory, NewProduct,
    NewSale, NewSavedReport, Product, ProductFilter, ProductSalesTotal, Sale, SaleItem,
    SavedReport, Theme, UserPreference,
};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use sqlx::postgres::{PgPool, Postgres};
use sqlx::{FromRow, Transaction};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

const PRODUCT_COLUMNS: &str = "id, user_id, category_id, name, description, sku, barcode, price, cost, \
     quantity, minimum_stock, maximum_stock, status, location, supplier, created_at, updated_at";

const PREFERENCE_COLUMNS: &str = "user_id, theme, dashboard_widgets, updated_at";

const REPORT_COLUMNS: &str =
    "id, user_id, name, report_type, configuration, created_at, updated_at";

// --- Row types ---
// Enums are stored as text and parsed back on the way out.

#[derive(Debug, Clone, FromRow)]
pub struct DbProduct {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub sku: String,
    pub barcode: Option<String>,
    pub price: Decimal,
    pub cost: Option<Decimal>,
    pub quantity: i32,
    pub minimum_stock: i32,
    pub maximum_stock: i32,
    pub status: String,
    pub location: Option<String>,
    pub supplier: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbProduct> for Product {
    type Error = DbError;

    fn try_from(row: DbProduct) -> Result<Self, Self::Error> {
        Ok(Product {
            id: row.id,
            user_id: row.user_id,
            category_id: row.category_id,
            name: row.name,
            description: row.description,
            sku: row.sku,
            barcode: row.barcode,
            price: row.price,
            cost: row.cost,
            quantity: row.quantity,
            minimum_stock: row.minimum_stock,
            maximum_stock: row.maximum_stock,
            status: row.status.parse()?,
            location: row.location,
            supplier: row.supplier,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
struct DbCategory {
    id: Uuid,
    user_id: Uuid,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DbCategory> for Category {
    fn from(row: DbCategory) -> Self {
        Category {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
struct DbCategoryWithCount {
    #[sqlx(flatten)]
    category: DbCategory,
    product_count: i64,
}

#[derive(Debug, Clone, FromRow)]
struct DbSale {
    id: Uuid,
    user_id: Uuid,
    invoice_id: String,
    sale_date: DateTime<Utc>,
    payment_method: String,
    status: String,
    total_amount: Decimal,
    created_at: DateTime<Utc>,
}

impl DbSale {
    fn into_sale(self, items: Vec<SaleItem>) -> Result<Sale, DbError> {
        Ok(Sale {
            id: self.id,
            user_id: self.user_id,
            invoice_id: self.invoice_id,
            sale_date: self.sale_date,
            payment_method: self.payment_method.parse()?,
            status: self.status.parse()?,
            total_amount: self.total_amount,
            items,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
struct DbSaleItem {
    id: Uuid,
    sale_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    price: Decimal,
    subtotal: Decimal,
}

impl From<DbSaleItem> for SaleItem {
    fn from(row: DbSaleItem) -> Self {
        SaleItem {
            id: row.id,
            sale_id: row.sale_id,
            product_id: row.product_id,
            quantity: row.quantity,
            price: row.price,
            subtotal: row.subtotal,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
struct DbDatedAmount {
    date: NaiveDate,
    amount: Decimal,
}

#[derive(Debug, Clone, FromRow)]
struct DbProductSalesTotal {
    product_id: Uuid,
    quantity: i64,
    revenue: Decimal,
}

#[derive(Debug, Clone, FromRow)]
struct DbSnapshot {
    id: Uuid,
    user_id: Uuid,
    date: NaiveDate,
    total_value: Decimal,
    total_products: i32,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
struct DbPreference {
    user_id: Uuid,
    theme: String,
    dashboard_widgets: Option<JsonValue>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DbPreference> for UserPreference {
    type Error = DbError;

    fn try_from(row: DbPreference) -> Result<Self, Self::Error> {
        Ok(UserPreference {
            user_id: row.user_id,
            theme: row.theme.parse()?,
            dashboard_widgets: row.dashboard_widgets,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
struct DbSavedReport {
    id: Uuid,
    user_id: Uuid,
    name: String,
    report_type: String,
    configuration: JsonValue,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DbSavedReport> for SavedReport {
    type Error = DbError;

    fn try_from(row: DbSavedReport) -> Result<Self, Self::Error> {
        Ok(SavedReport {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            report_type: row.report_type.parse()?,
            configuration: row.configuration,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Builds an `ILIKE` pattern matching `term` anywhere, with its wildcards escaped.
fn contains_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn category_is_owned(&self, user_id: Uuid, category_id: Uuid) -> Result<bool, DbError> {
        let owned: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1 AND user_id = $2)",
        )
        .bind(category_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(owned)
    }

    async fn items_for_sales(&self, sale_ids: &[Uuid]) -> Result<Vec<DbSaleItem>, DbError> {
        let items = sqlx::query_as::<_, DbSaleItem>(
            "SELECT id, sale_id, product_id, quantity, price, subtotal FROM sale_items WHERE sale_id = ANY($1)",
        )
        .bind(sale_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn insert_sale_items(
        tx: &mut Transaction<'_, Postgres>,
        items: &[SaleItem],
    ) -> Result<(), DbError> {
        for item in items {
            sqlx::query(
                "INSERT INTO sale_items (id, sale_id, product_id, quantity, price, subtotal) VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(item.id)
            .bind(item.sale_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.price)
            .bind(item.subtotal)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for DbRepository {
    async fn list_products(
        &self,
        user_id: Uuid,
        filter: &ProductFilter,
    ) -> Result<Vec<Product>, DbError> {
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(contains_pattern);

        let query = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE user_id = $1
              AND ($2::TEXT IS NULL OR name ILIKE $2 OR sku ILIKE $2 OR description ILIKE $2)
              AND ($3::UUID IS NULL OR category_id = $3)
              AND ($4::TEXT IS NULL OR status = $4)
              AND (NOT $5 OR quantity <= minimum_stock)
            ORDER BY name ASC
            "#
        );
        let rows = sqlx::query_as::<_, DbProduct>(&query)
            .bind(user_id)
            .bind(search)
            .bind(filter.category)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.low_stock)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn get_product(&self, user_id: Uuid, product_id: Uuid) -> Result<Product, DbError> {
        let query = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 AND user_id = $2");
        let row = sqlx::query_as::<_, DbProduct>(&query)
            .bind(product_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DbError::NotFound)?;
        row.try_into()
    }

    async fn create_product(&self, user_id: Uuid, input: &NewProduct) -> Result<Product, DbError> {
        input.validate()?;
        if !self.category_is_owned(user_id, input.category_id).await? {
            return Err(store::invalid_category());
        }

        let product = Product::from_new(user_id, input, Utc::now());
        let query = format!(
            r#"
            INSERT INTO products ({PRODUCT_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#
        );
        sqlx::query(&query)
            .bind(product.id)
            .bind(product.user_id)
            .bind(product.category_id)
            .bind(&product.name)
            .bind(&product.description)
            .bind(&product.sku)
            .bind(&product.barcode)
            .bind(product.price)
            .bind(product.cost)
            .bind(product.quantity)
            .bind(product.minimum_stock)
            .bind(product.maximum_stock)
            .bind(product.status.as_str())
            .bind(&product.location)
            .bind(&product.supplier)
            .bind(product.created_at)
            .bind(product.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| if is_unique_violation(&e) { store::duplicate_sku() } else { e.into() })?;

        tracing::debug!(user_id = %user_id, product_id = %product.id, "Product created.");
        Ok(product)
    }

    async fn update_product(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        input: &NewProduct,
    ) -> Result<Product, DbError> {
        let mut product = self.get_product(user_id, product_id).await?;
        input.validate()?;
        if !self.category_is_owned(user_id, input.category_id).await? {
            return Err(store::invalid_category());
        }

        product.apply(input, Utc::now());
        sqlx::query(
            r#"
            UPDATE products SET
                category_id = $3, name = $4, description = $5, sku = $6, barcode = $7,
                price = $8, cost = $9, quantity = $10, minimum_stock = $11, maximum_stock = $12,
                status = $13, location = $14, supplier = $15, updated_at = $16
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(product.id)
        .bind(user_id)
        .bind(product.category_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.sku)
        .bind(&product.barcode)
        .bind(product.price)
        .bind(product.cost)
        .bind(product.quantity)
        .bind(product.minimum_stock)
        .bind(product.maximum_stock)
        .bind(product.status.as_str())
        .bind(&product.location)
        .bind(&product.supplier)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| if is_unique_violation(&e) { store::duplicate_sku() } else { e.into() })?;

        Ok(product)
    }

    async fn list_categories(&self, user_id: Uuid) -> Result<Vec<CategoryWithCount>, DbError> {
        let rows = sqlx::query_as::<_, DbCategoryWithCount>(
            r#"
            SELECT c.id, c.user_id, c.name, c.description, c.created_at, c.updated_at,
                   COUNT(p.id) AS product_count
            FROM categories AS c
            LEFT JOIN products AS p ON p.category_id = c.id AND p.user_id = c.user_id
            WHERE c.user_id = $1
            GROUP BY c.id
            ORDER BY c.name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| CategoryWithCount {
                category: row.category.into(),
                product_count: row.product_count,
            })
            .collect())
    }

    async fn create_category(
        &self,
        user_id: Uuid,
        input: &NewCategory,
    ) -> Result<Category, DbError> {
        input.validate()?;
        let row = sqlx::query_as::<_, DbCategory>(
            r#"
            INSERT INTO categories (id, user_id, name, description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            RETURNING id, user_id, name, description, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(input.name.trim())
        .bind(&input.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn record_sale(&self, user_id: Uuid, input: &NewSale) -> Result<Sale, DbError> {
        input.validate()?;

        let requested: Vec<Uuid> = input.items.iter().map(|i| i.product_id).collect();
        let owned: Vec<Uuid> =
            sqlx::query_scalar("SELECT id FROM products WHERE user_id = $1 AND id = ANY($2)")
                .bind(user_id)
                .bind(&requested)
                .fetch_all(&self.pool)
                .await?;
        store::check_sale_products(input, &owned.into_iter().collect::<HashSet<_>>())?;

        let sale = input.into_sale(user_id, Utc::now())?;
        let mut tx: Transaction<Postgres> = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO sales (id, user_id, invoice_id, sale_date, payment_method, status, total_amount, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(sale.id)
        .bind(sale.user_id)
        .bind(&sale.invoice_id)
        .bind(sale.sale_date)
        .bind(sale.payment_method.as_str())
        .bind(sale.status.as_str())
        .bind(sale.total_amount)
        .bind(sale.created_at)
        .execute(&mut *tx)
        .await?;
        Self::insert_sale_items(&mut tx, &sale.items).await?;
        tx.commit().await?;

        tracing::info!(user_id = %user_id, invoice = %sale.invoice_id, total = %sale.total_amount, "Sale recorded.");
        Ok(sale)
    }

    async fn list_sales(&self, user_id: Uuid) -> Result<Vec<Sale>, DbError> {
        let sales = sqlx::query_as::<_, DbSale>(
            r#"
            SELECT id, user_id, invoice_id, sale_date, payment_method, status, total_amount, created_at
            FROM sales WHERE user_id = $1
            ORDER BY sale_date DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = sales.iter().map(|s| s.id).collect();
        let mut items_by_sale: HashMap<Uuid, Vec<SaleItem>> = HashMap::new();
        for item in self.items_for_sales(&ids).await? {
            items_by_sale.entry(item.sale_id).or_default().push(item.into());
        }

        sales
            .into_iter()
            .map(|sale| {
                let items = items_by_sale.remove(&sale.id).unwrap_or_default();
                sale.into_sale(items)
            })
            .collect()
    }

    async fn sale_amounts_between(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DatedAmount>, DbError> {
        let rows = sqlx::query_as::<_, DbDatedAmount>(
            r#"
            SELECT (sale_date AT TIME ZONE 'UTC')::DATE AS date, total_amount AS amount
            FROM sales
            WHERE user_id = $1 AND (sale_date AT TIME ZONE 'UTC')::DATE BETWEEN $2 AND $3
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| DatedAmount { date: r.date, amount: r.amount })
            .collect())
    }

    async fn product_sales_totals(&self, user_id: Uuid) -> Result<Vec<ProductSalesTotal>, DbError> {
        let rows = sqlx::query_as::<_, DbProductSalesTotal>(
            r#"
            SELECT si.product_id, SUM(si.quantity)::BIGINT AS quantity, SUM(si.subtotal) AS revenue
            FROM sale_items AS si
            JOIN sales AS s ON s.id = si.sale_id
            WHERE s.user_id = $1
            GROUP BY si.product_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| ProductSalesTotal {
                product_id: r.product_id,
                quantity: r.quantity,
                revenue: r.revenue,
            })
            .collect())
    }

    async fn record_snapshot(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<InventorySnapshot, DbError> {
        let row = sqlx::query_as::<_, DbSnapshot>(
            r#"
            INSERT INTO inventory_snapshots (id, user_id, date, total_value, total_products, created_at)
            SELECT $1, $2, $3,
                   COALESCE(SUM(quantity * COALESCE(cost, 0)), 0),
                   COUNT(*)::INTEGER,
                   NOW()
            FROM products WHERE user_id = $2
            ON CONFLICT (user_id, date) DO UPDATE
                SET total_value = EXCLUDED.total_value,
                    total_products = EXCLUDED.total_products
            RETURNING id, user_id, date, total_value, total_products, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(date)
        .fetch_one(&self.pool)
        .await?;

        Ok(InventorySnapshot {
            id: row.id,
            user_id: row.user_id,
            date: row.date,
            total_value: row.total_value,
            total_products: row.total_products,
            created_at: row.created_at,
        })
    }

    async fn snapshot_values_between(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DatedAmount>, DbError> {
        let rows = sqlx::query_as::<_, DbDatedAmount>(
            r#"
            SELECT date, total_value AS amount
            FROM inventory_snapshots
            WHERE user_id = $1 AND date BETWEEN $2 AND $3
            ORDER BY date ASC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| DatedAmount { date: r.date, amount: r.amount })
            .collect())
    }

    async fn get_or_create_preference(
        &self,
        user_id: Uuid,
        default_widgets: &JsonValue,
    ) -> Result<UserPreference, DbError> {
        // Concurrent first requests race on the insert; the loser's row is simply skipped.
        sqlx::query(
            r#"
            INSERT INTO user_preferences (user_id, theme, dashboard_widgets, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(Theme::default().as_str())
        .bind(default_widgets)
        .execute(&self.pool)
        .await?;

        let query = format!("SELECT {PREFERENCE_COLUMNS} FROM user_preferences WHERE user_id = $1");
        let row = sqlx::query_as::<_, DbPreference>(&query)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    async fn save_dashboard_widgets(
        &self,
        user_id: Uuid,
        widgets: &JsonValue,
    ) -> Result<UserPreference, DbError> {
        let query = format!(
            r#"
            INSERT INTO user_preferences (user_id, theme, dashboard_widgets, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (user_id) DO UPDATE
                SET dashboard_widgets = EXCLUDED.dashboard_widgets, updated_at = NOW()
            RETURNING {PREFERENCE_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, DbPreference>(&query)
            .bind(user_id)
            .bind(Theme::default().as_str())
            .bind(widgets)
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    async fn save_theme(&self, user_id: Uuid, theme: Theme) -> Result<UserPreference, DbError> {
        let query = format!(
            r#"
            INSERT INTO user_preferences (user_id, theme, dashboard_widgets, updated_at)
            VALUES ($1, $2, NULL, NOW())
            ON CONFLICT (user_id) DO UPDATE
                SET theme = EXCLUDED.theme, updated_at = NOW()
            RETURNING {PREFERENCE_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, DbPreference>(&query)
            .bind(user_id)
            .bind(theme.as_str())
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    async fn save_report(
        &self,
        user_id: Uuid,
        input: &NewSavedReport,
    ) -> Result<SavedReport, DbError> {
        input.validate()?;
        let query = format!(
            r#"
            INSERT INTO saved_reports (id, user_id, name, report_type, configuration, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            ON CONFLICT (user_id, name) DO UPDATE
                SET report_type = EXCLUDED.report_type,
                    configuration = EXCLUDED.configuration,
                    updated_at = NOW()
            RETURNING {REPORT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, DbSavedReport>(&query)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(input.name.trim())
            .bind(input.report_type.as_str())
            .bind(&input.configuration)
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    async fn list_reports(&self, user_id: Uuid) -> Result<Vec<SavedReport>, DbError> {
        let query = format!(
            "SELECT {REPORT_COLUMNS} FROM saved_reports WHERE user_id = $1 ORDER BY updated_at DESC"
        );
        let rows = sqlx::query_as::<_, DbSavedReport>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(SavedReport::try_from).collect()
    }
}
