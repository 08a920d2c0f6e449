use core_types::{Product, StockStatus};
use rust_decimal::Decimal;

/// Classifies a stock level against its thresholds.
///
/// The low-stock check runs first, so when `quantity`, `minimum_stock` and
/// `maximum_stock` all coincide the result is `LowStock`.
pub fn stock_status(quantity: i32, minimum_stock: i32, maximum_stock: i32) -> StockStatus {
    if quantity <= minimum_stock {
        StockStatus::LowStock
    } else if quantity >= maximum_stock {
        StockStatus::Overstocked
    } else {
        StockStatus::Normal
    }
}

/// Markup over cost as a percentage: `(price - cost) / cost * 100`.
///
/// Zero, negative or unknown cost yields zero, as does any arithmetic overflow.
pub fn profit_margin(price: Decimal, cost: Option<Decimal>) -> Decimal {
    let Some(cost) = cost.filter(|c| *c > Decimal::ZERO) else {
        return Decimal::ZERO;
    };

    price
        .checked_sub(cost)
        .and_then(|markup| markup.checked_div(cost))
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO)
}

/// Live value of a catalog at cost, `Σ quantity × cost`.
pub fn catalog_value(products: &[Product]) -> Decimal {
    products.iter().map(Product::stock_value).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn profit_margin_examples() {
        assert_eq!(profit_margin(dec!(100), Some(dec!(50))), dec!(100));
        assert_eq!(profit_margin(dec!(100), Some(dec!(0))), Decimal::ZERO);
        assert_eq!(profit_margin(dec!(100), None), Decimal::ZERO);
        assert_eq!(profit_margin(dec!(100), Some(dec!(-5))), Decimal::ZERO);
        assert_eq!(profit_margin(dec!(40), Some(dec!(50))), dec!(-20));
    }

    #[test]
    fn profit_margin_survives_overflow() {
        assert_eq!(profit_margin(Decimal::MIN, Some(Decimal::MAX)), Decimal::ZERO);
    }

    #[test]
    fn stock_status_examples() {
        assert_eq!(stock_status(2, 5, 50), StockStatus::LowStock);
        assert_eq!(stock_status(5, 5, 50), StockStatus::LowStock);
        assert_eq!(stock_status(50, 5, 50), StockStatus::Overstocked);
        assert_eq!(stock_status(20, 5, 50), StockStatus::Normal);
    }

    #[test]
    fn coinciding_thresholds_report_low_stock() {
        assert_eq!(stock_status(7, 7, 7), StockStatus::LowStock);
        assert_eq!(stock_status(0, 0, 0), StockStatus::LowStock);
    }

    proptest! {
        #[test]
        fn low_stock_iff_at_or_below_minimum(
            quantity in 0i32..10_000,
            minimum in 0i32..10_000,
            spread in 0i32..10_000,
        ) {
            let maximum = minimum + spread;
            let status = stock_status(quantity, minimum, maximum);
            prop_assert_eq!(status == StockStatus::LowStock, quantity <= minimum);
            if quantity > minimum && quantity < maximum {
                prop_assert_eq!(status, StockStatus::Normal);
            }
        }
    }
}
