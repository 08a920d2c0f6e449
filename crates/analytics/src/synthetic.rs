//! Placeholder data shown when a user has nothing recorded yet.
//!
//! The dates are always the real window; only the values are random. Every
//! generator takes its random source from the caller so tests can seed it.

use crate::metrics::profit_margin;
use crate::report::ProductPerformance;
use chrono::{Datelike, NaiveDate, Weekday};
use core_types::Product;
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

/// Daily sales around a random base level, with weekends half again as busy.
pub fn sales_series<R: Rng + ?Sized>(dates: &[NaiveDate], rng: &mut R) -> Vec<Decimal> {
    let base_amount = rng.gen_range(100.0..500.0);

    dates
        .iter()
        .map(|date| {
            let weekend_factor = match date.weekday() {
                Weekday::Sat | Weekday::Sun => 1.5,
                _ => 1.0,
            };
            let daily_variation = rng.gen_range(0.7..1.3);
            to_money(base_amount * weekend_factor * daily_variation)
        })
        .collect()
}

/// A random walk that drifts half a percent a day in one randomly chosen direction.
pub fn inventory_series<R: Rng + ?Sized>(dates: &[NaiveDate], rng: &mut R) -> Vec<Decimal> {
    let mut value = rng.gen_range(5000.0..20000.0);
    let trend = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    let trend_factor = 1.0 + 0.005 * trend;

    dates
        .iter()
        .map(|_| {
            let daily_variation = rng.gen_range(0.98..1.02);
            value *= daily_variation * trend_factor;
            to_money(value)
        })
        .collect()
}

/// Random unit counts per catalog product, priced at list price. Catalog order is kept.
pub fn performance<R: Rng + ?Sized>(catalog: &[Product], rng: &mut R) -> Vec<ProductPerformance> {
    catalog
        .iter()
        .map(|product| {
            let quantity: i64 = rng.gen_range(5..=100);
            let revenue = (Decimal::from(quantity) * product.price).round_dp(2);
            ProductPerformance {
                product_id: product.id,
                name: product.name.clone(),
                quantity,
                revenue,
                profit_margin: profit_margin(product.price, product.cost).round_dp(2),
            }
        })
        .collect()
}

fn to_money(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default().round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use core_types::ProductStatus;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn week() -> Vec<NaiveDate> {
        // 2024-06-03 is a Monday.
        let start = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        start.iter_days().take(7).collect()
    }

    #[test]
    fn sales_values_stay_in_generated_band() {
        let mut rng = StdRng::seed_from_u64(7);
        let values = sales_series(&week(), &mut rng);

        assert_eq!(values.len(), 7);
        for (index, value) in values.iter().enumerate() {
            let ceiling = if index >= 5 { dec!(975) } else { dec!(650) };
            assert!(*value >= dec!(70) && *value <= ceiling, "{} out of band", value);
            assert_eq!(value.round_dp(2), *value);
        }
    }

    #[test]
    fn seeded_generators_are_reproducible() {
        let a = inventory_series(&week(), &mut StdRng::seed_from_u64(42));
        let b = inventory_series(&week(), &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
        assert!(a.iter().all(|v| *v > Decimal::ZERO));
    }

    #[test]
    fn performance_keeps_catalog_order_and_prices() {
        let now = Utc::now();
        let make = |name: &str, price: Decimal| Product {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            sku: name.to_uppercase(),
            barcode: None,
            price,
            cost: Some(dec!(5)),
            quantity: 1,
            minimum_stock: 0,
            maximum_stock: 10,
            status: ProductStatus::Active,
            location: None,
            supplier: None,
            created_at: now,
            updated_at: now,
        };
        let catalog = vec![make("mug", dec!(10)), make("plate", dec!(7.5))];

        let rows = performance(&catalog, &mut StdRng::seed_from_u64(1));

        assert_eq!(rows[0].name, "mug");
        assert_eq!(rows[1].name, "plate");
        for (row, product) in rows.iter().zip(&catalog) {
            assert!((5..=100).contains(&row.quantity));
            assert_eq!(row.revenue, Decimal::from(row.quantity) * product.price);
        }
        assert_eq!(rows[0].profit_margin, dec!(100));
    }
}
