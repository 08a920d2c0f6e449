use crate::metrics::{profit_margin, stock_status};
use chrono::NaiveDate;
use core_types::{CategoryWithCount, Product, StockStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A product together with its derived fields, ready for display or JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub stock_status: StockStatus,
    pub profit_margin: Decimal,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        let stock_status = stock_status(
            product.quantity,
            product.minimum_stock,
            product.maximum_stock,
        );
        let profit_margin = profit_margin(product.price, product.cost);
        Self {
            product,
            stock_status,
            profit_margin,
        }
    }
}

/// One value per calendar day, `dates[i]` labelling `values[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    pub dates: Vec<NaiveDate>,
    pub values: Vec<Decimal>,
}

impl DailySeries {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn total(&self) -> Decimal {
        self.values.iter().copied().sum()
    }
}

/// A date-bucketed series plus the aggregates shown next to its chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    /// Width of the window in days; the series holds `days + 1` points.
    pub days: u32,
    #[serde(flatten)]
    pub series: DailySeries,
    pub total: Decimal,
    pub daily_average: Decimal,
    pub change_percentage: Decimal,
    /// True when no real records existed and the values are generated.
    pub synthetic: bool,
}

/// Aggregated sales figures for one catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPerformance {
    pub product_id: Uuid,
    pub name: String,
    pub quantity: i64,
    pub revenue: Decimal,
    pub profit_margin: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedProduct {
    pub name: String,
    pub revenue: Decimal,
}

impl From<&ProductPerformance> for RankedProduct {
    fn from(p: &ProductPerformance) -> Self {
        Self {
            name: p.name.clone(),
            revenue: p.revenue,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub products: Vec<ProductPerformance>,
    pub top_products: Vec<RankedProduct>,
    pub bottom_products: Vec<RankedProduct>,
    pub synthetic: bool,
}

/// Headline numbers and lists behind the dashboard widgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_products: usize,
    pub total_categories: usize,
    pub low_stock_products: usize,
    pub total_value: Decimal,
    pub recent_products: Vec<ProductView>,
    pub categories_with_counts: Vec<CategoryWithCount>,
}
