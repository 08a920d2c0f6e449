use crate::error::AnalyticsError;
use crate::metrics::{catalog_value, profit_margin};
use crate::report::{
    DailySeries, DashboardSummary, PerformanceReport, ProductPerformance, ProductView,
    RankedProduct, TrendReport,
};
use crate::synthetic;
use chrono::{Days, NaiveDate};
use core_types::{CategoryWithCount, DatedAmount, Product, ProductSalesTotal};
use rand::Rng;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

/// An inclusive range of calendar days, `[end - days, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: u32,
}

impl DateWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every day of the window in ascending order, endpoints included.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.start
            .iter_days()
            .take_while(|d| *d <= self.end)
            .collect()
    }
}

/// A stateless calculator turning raw per-user records into dashboard and chart data.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    max_window_days: u32,
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new(365)
    }
}

impl AnalyticsEngine {
    pub fn new(max_window_days: u32) -> Self {
        Self { max_window_days }
    }

    /// Resolves the window ending on `today` and reaching `days` days back.
    pub fn window(&self, today: NaiveDate, days: u32) -> Result<DateWindow, AnalyticsError> {
        if days > self.max_window_days {
            return Err(AnalyticsError::WindowTooLarge {
                requested: days,
                max: self.max_window_days,
            });
        }
        let start = today
            .checked_sub_days(Days::new(u64::from(days)))
            .ok_or_else(|| AnalyticsError::InvalidWindow(format!("{} days before {}", days, today)))?;

        Ok(DateWindow {
            start,
            end: today,
            days,
        })
    }

    /// Sums `records` per day across `window`; days without records are zero.
    pub fn bucket_by_day(&self, records: &[DatedAmount], window: &DateWindow) -> DailySeries {
        let mut by_date: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
        for record in records.iter().filter(|r| window.contains(r.date)) {
            *by_date.entry(record.date).or_default() += record.amount;
        }

        let dates = window.dates();
        let values = dates
            .iter()
            .map(|d| by_date.get(d).copied().unwrap_or(Decimal::ZERO))
            .collect();

        DailySeries { dates, values }
    }

    /// Daily sales totals over the window, or a generated series when there were no sales.
    pub fn sales_trend<R: Rng + ?Sized>(
        &self,
        sales: &[DatedAmount],
        window: &DateWindow,
        rng: &mut R,
    ) -> TrendReport {
        self.trend(sales, window, |dates| synthetic::sales_series(dates, rng))
    }

    /// Daily snapshot values over the window, or a generated series when there were no snapshots.
    pub fn inventory_trend<R: Rng + ?Sized>(
        &self,
        snapshots: &[DatedAmount],
        window: &DateWindow,
        rng: &mut R,
    ) -> TrendReport {
        self.trend(snapshots, window, |dates| synthetic::inventory_series(dates, rng))
    }

    fn trend<F>(&self, records: &[DatedAmount], window: &DateWindow, fallback: F) -> TrendReport
    where
        F: FnOnce(&[NaiveDate]) -> Vec<Decimal>,
    {
        let has_records = records.iter().any(|r| window.contains(r.date));

        let (series, synthetic) = if has_records {
            (self.bucket_by_day(records, window), false)
        } else {
            tracing::debug!(start = %window.start, end = %window.end, "No records in window, generating placeholder series.");
            let dates = window.dates();
            let values = fallback(&dates);
            (DailySeries { dates, values }, true)
        };

        let total = series.total();
        let daily_average = if series.is_empty() {
            Decimal::ZERO
        } else {
            (total / Decimal::from(series.len())).round_dp(2)
        };
        let change_percentage = change_percentage(&series.values);

        TrendReport {
            days: window.days,
            series,
            total,
            daily_average,
            change_percentage,
            synthetic,
        }
    }

    /// Joins per-product sales totals onto the catalog and ranks by revenue.
    ///
    /// With no sales recorded at all the figures are generated instead.
    pub fn product_performance<R: Rng + ?Sized>(
        &self,
        catalog: &[Product],
        totals: &[ProductSalesTotal],
        list_size: usize,
        rng: &mut R,
    ) -> PerformanceReport {
        let (products, synthetic) = if totals.is_empty() {
            (synthetic::performance(catalog, rng), true)
        } else {
            let by_product: HashMap<_, _> = totals.iter().map(|t| (t.product_id, t)).collect();
            let mut rows: Vec<ProductPerformance> = catalog
                .iter()
                .map(|product| {
                    let (quantity, revenue) = by_product
                        .get(&product.id)
                        .map(|t| (t.quantity, t.revenue))
                        .unwrap_or((0, Decimal::ZERO));
                    ProductPerformance {
                        product_id: product.id,
                        name: product.name.clone(),
                        quantity,
                        revenue,
                        profit_margin: profit_margin(product.price, product.cost),
                    }
                })
                .collect();
            rows.sort_by(|a, b| b.revenue.cmp(&a.revenue));
            (rows, false)
        };

        PerformanceReport {
            top_products: top_products(&products, list_size),
            bottom_products: bottom_products(&products, list_size),
            products,
            synthetic,
        }
    }

    /// Computes the headline dashboard numbers from the user's catalog.
    pub fn dashboard_summary(
        &self,
        products: &[Product],
        mut categories: Vec<CategoryWithCount>,
        recent_limit: usize,
        category_limit: usize,
    ) -> DashboardSummary {
        let low_stock_products = products.iter().filter(|p| p.is_low_stock()).count();
        let total_value = catalog_value(products);

        let mut recent: Vec<&Product> = products.iter().collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let recent_products = recent
            .into_iter()
            .take(recent_limit)
            .cloned()
            .map(ProductView::from)
            .collect();

        let total_categories = categories.len();
        categories.sort_by(|a, b| b.product_count.cmp(&a.product_count));
        categories.truncate(category_limit);

        DashboardSummary {
            total_products: products.len(),
            total_categories,
            low_stock_products,
            total_value,
            recent_products,
            categories_with_counts: categories,
        }
    }
}

/// Relative change from the first to the last value, in percent, rounded to 2 places.
///
/// Fewer than two points yields 0; a zero starting point yields 100.
pub fn change_percentage(values: &[Decimal]) -> Decimal {
    let (Some(first), Some(last)) = (values.first(), values.last()) else {
        return Decimal::ZERO;
    };
    if values.len() < 2 {
        return Decimal::ZERO;
    }
    if first.is_zero() {
        return Decimal::ONE_HUNDRED;
    }

    ((*last - *first) / *first * Decimal::ONE_HUNDRED).round_dp(2)
}

/// The `count` highest-revenue products; equal revenues keep their input order.
pub fn top_products(products: &[ProductPerformance], count: usize) -> Vec<RankedProduct> {
    let mut ranked: Vec<&ProductPerformance> = products.iter().collect();
    ranked.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    ranked.into_iter().take(count).map(RankedProduct::from).collect()
}

/// The `count` lowest-revenue products; equal revenues keep their input order.
pub fn bottom_products(products: &[ProductPerformance], count: usize) -> Vec<RankedProduct> {
    let mut ranked: Vec<&ProductPerformance> = products.iter().collect();
    ranked.sort_by(|a, b| a.revenue.cmp(&b.revenue));
    ranked.into_iter().take(count).map(RankedProduct::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use core_types::{Category, ProductStatus};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn amount(date: NaiveDate, amount: Decimal) -> DatedAmount {
        DatedAmount { date, amount }
    }

    fn product(name: &str, price: Decimal, quantity: i32, created_at: DateTime<Utc>) -> Product {
        Product {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            category_id: Uuid::nil(),
            name: name.to_string(),
            description: None,
            sku: name.to_uppercase(),
            barcode: None,
            price,
            cost: Some(price / dec!(2)),
            quantity,
            minimum_stock: 3,
            maximum_stock: 100,
            status: ProductStatus::Active,
            location: None,
            supplier: None,
            created_at,
            updated_at: created_at,
        }
    }

    fn perf(name: &str, revenue: Decimal) -> ProductPerformance {
        ProductPerformance {
            product_id: Uuid::new_v4(),
            name: name.to_string(),
            quantity: 1,
            revenue,
            profit_margin: Decimal::ZERO,
        }
    }

    #[test]
    fn change_percentage_examples() {
        assert_eq!(change_percentage(&[dec!(100), dec!(150)]), dec!(50));
        assert_eq!(change_percentage(&[dec!(0), dec!(50)]), dec!(100));
        assert_eq!(change_percentage(&[dec!(42)]), Decimal::ZERO);
        assert_eq!(change_percentage(&[]), Decimal::ZERO);
        assert_eq!(change_percentage(&[dec!(3), dec!(1), dec!(4)]), dec!(33.33));
        assert_eq!(change_percentage(&[dec!(200), dec!(150)]), dec!(-25));
    }

    #[test]
    fn window_is_inclusive_of_both_endpoints() {
        let engine = AnalyticsEngine::default();
        let window = engine.window(day(2024, 3, 10), 7).unwrap();

        assert_eq!(window.start, day(2024, 3, 3));
        assert_eq!(window.dates().len(), 8);
        assert_eq!(window.dates().last(), Some(&day(2024, 3, 10)));
    }

    #[test]
    fn window_rejects_oversized_requests() {
        let engine = AnalyticsEngine::new(90);
        let err = engine.window(day(2024, 3, 10), 91).unwrap_err();
        assert!(matches!(err, AnalyticsError::WindowTooLarge { requested: 91, max: 90 }));
    }

    #[test]
    fn bucketing_sums_per_day_and_zero_fills() {
        let engine = AnalyticsEngine::default();
        let window = engine.window(day(2024, 1, 5), 3).unwrap();
        let records = vec![
            amount(day(2024, 1, 2), dec!(10)),
            amount(day(2024, 1, 2), dec!(5.5)),
            amount(day(2024, 1, 5), dec!(20)),
            amount(day(2023, 12, 31), dec!(999)),
        ];

        let series = engine.bucket_by_day(&records, &window);

        assert_eq!(series.dates, vec![day(2024, 1, 2), day(2024, 1, 3), day(2024, 1, 4), day(2024, 1, 5)]);
        assert_eq!(series.values, vec![dec!(15.5), dec!(0), dec!(0), dec!(20)]);
    }

    #[test]
    fn sales_trend_reports_real_totals() {
        let engine = AnalyticsEngine::default();
        let window = engine.window(day(2024, 1, 4), 3).unwrap();
        let records = vec![amount(day(2024, 1, 1), dec!(100)), amount(day(2024, 1, 4), dec!(150))];

        let report = engine.sales_trend(&records, &window, &mut StdRng::seed_from_u64(0));

        assert!(!report.synthetic);
        assert_eq!(report.total, dec!(250));
        assert_eq!(report.daily_average, dec!(62.5));
        assert_eq!(report.change_percentage, dec!(50));
    }

    #[test]
    fn empty_window_falls_back_to_full_synthetic_series() {
        let engine = AnalyticsEngine::default();
        let window = engine.window(day(2024, 5, 31), 30).unwrap();
        // Outside the window, so the window itself is empty.
        let records = vec![amount(day(2024, 1, 1), dec!(100))];

        let report = engine.sales_trend(&records, &window, &mut StdRng::seed_from_u64(3));

        assert!(report.synthetic);
        assert_eq!(report.series.dates.len(), 31);
        assert_eq!(report.series.values.len(), 31);
        assert_eq!(report.series.dates[0], day(2024, 5, 1));
        assert!(report.series.values.iter().all(|v| *v > Decimal::ZERO));
    }

    #[test]
    fn zero_day_window_has_a_single_point() {
        let engine = AnalyticsEngine::default();
        let window = engine.window(day(2024, 5, 31), 0).unwrap();

        let report = engine.inventory_trend(&[], &window, &mut StdRng::seed_from_u64(3));

        assert_eq!(report.series.len(), 1);
        assert_eq!(report.change_percentage, Decimal::ZERO);
    }

    #[test]
    fn top_and_bottom_keep_input_order_on_ties() {
        let rows = vec![
            perf("a", dec!(10)),
            perf("b", dec!(30)),
            perf("c", dec!(10)),
            perf("d", dec!(20)),
        ];

        let top: Vec<_> = top_products(&rows, 3).into_iter().map(|r| r.name).collect();
        let bottom: Vec<_> = bottom_products(&rows, 3).into_iter().map(|r| r.name).collect();

        assert_eq!(top, vec!["b", "d", "a"]);
        assert_eq!(bottom, vec!["a", "c", "d"]);
    }

    #[test]
    fn performance_joins_totals_onto_catalog() {
        let engine = AnalyticsEngine::default();
        let now = Utc::now();
        let catalog = vec![
            product("lamp", dec!(40), 5, now),
            product("desk", dec!(200), 5, now),
            product("chair", dec!(90), 5, now),
        ];
        let totals = vec![
            ProductSalesTotal { product_id: catalog[0].id, quantity: 3, revenue: dec!(120) },
            ProductSalesTotal { product_id: catalog[1].id, quantity: 1, revenue: dec!(200) },
        ];

        let report = engine.product_performance(&catalog, &totals, 2, &mut StdRng::seed_from_u64(0));

        assert!(!report.synthetic);
        let names: Vec<_> = report.products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["desk", "lamp", "chair"]);
        assert_eq!(report.products[2].quantity, 0);
        assert_eq!(report.products[0].profit_margin, dec!(100));
        assert_eq!(report.top_products.len(), 2);
        assert_eq!(report.bottom_products[0].name, "chair");
    }

    #[test]
    fn performance_without_sales_is_synthetic() {
        let engine = AnalyticsEngine::default();
        let catalog = vec![product("lamp", dec!(40), 5, Utc::now())];

        let report = engine.product_performance(&catalog, &[], 5, &mut StdRng::seed_from_u64(9));

        assert!(report.synthetic);
        assert_eq!(report.products.len(), 1);
        assert_eq!(report.top_products.len(), 1);
    }

    #[test]
    fn dashboard_summary_counts_and_limits() {
        let engine = AnalyticsEngine::default();
        let base = Utc::now();
        let products = vec![
            product("old", dec!(10), 2, base - chrono::Duration::days(3)),
            product("mid", dec!(10), 10, base - chrono::Duration::days(2)),
            product("new", dec!(10), 1, base),
        ];
        let category = |name: &str, count: i64| CategoryWithCount {
            category: Category {
                id: Uuid::new_v4(),
                user_id: Uuid::nil(),
                name: name.to_string(),
                description: None,
                created_at: base,
                updated_at: base,
            },
            product_count: count,
        };
        let categories = vec![category("few", 1), category("many", 9), category("some", 4)];

        let summary = engine.dashboard_summary(&products, categories, 2, 2);

        assert_eq!(summary.total_products, 3);
        assert_eq!(summary.total_categories, 3);
        assert_eq!(summary.low_stock_products, 2);
        assert_eq!(summary.total_value, dec!(65));
        let recent: Vec<_> = summary.recent_products.iter().map(|p| p.product.name.as_str()).collect();
        assert_eq!(recent, vec!["new", "mid"]);
        let overview: Vec<_> = summary
            .categories_with_counts
            .iter()
            .map(|c| c.category.name.as_str())
            .collect();
        assert_eq!(overview, vec!["many", "some"]);
    }
}
