use crate::error::CoreError;
use crate::structs::{NewCategory, NewProduct, NewSale, NewSavedReport, SaleItem};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

pub(crate) const AMOUNT_TOO_LARGE: &str = "Amount is too large.";
const UNIT_AMOUNT_TOO_LARGE: &str = "Ensure this value is at most 9999999999.99.";

/// Largest price or cost a product or sale line may carry, NUMERIC(12, 2).
fn max_unit_amount() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}

/// Largest line subtotal or sale total, NUMERIC(14, 2).
fn max_sale_amount() -> Decimal {
    Decimal::new(99_999_999_999_999, 2)
}

/// Field-level validation messages, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.fields
    }

    /// `Ok(())` when nothing was recorded, otherwise the collected errors.
    pub fn into_result(self) -> Result<(), CoreError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl NewProduct {
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut errors = ValidationErrors::new();

        if self.name.trim().is_empty() {
            errors.add("name", "This field is required.");
        }
        if self.sku.trim().is_empty() {
            errors.add("sku", "This field is required.");
        }
        if self.price < Decimal::ZERO {
            errors.add("price", "Price cannot be negative.");
        } else if self.price > max_unit_amount() {
            errors.add("price", UNIT_AMOUNT_TOO_LARGE);
        }
        match self.cost {
            Some(cost) if cost < Decimal::ZERO => errors.add("cost", "Cost cannot be negative."),
            Some(cost) if cost > max_unit_amount() => errors.add("cost", UNIT_AMOUNT_TOO_LARGE),
            _ => {}
        }
        if self.quantity < 0 {
            errors.add("quantity", "Quantity cannot be negative");
        }
        if self.minimum_stock < 0 {
            errors.add("minimum_stock", "Minimum stock cannot be negative.");
        }
        if self.minimum_stock > self.maximum_stock {
            errors.add(
                "minimum_stock",
                "Minimum stock cannot be greater than maximum stock",
            );
        }

        errors.into_result()
    }
}

impl NewCategory {
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "This field is required.");
        }
        errors.into_result()
    }
}

impl NewSale {
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut errors = ValidationErrors::new();

        if self.items.is_empty() {
            errors.add("items", "A sale needs at least one line item.");
        }
        for (index, item) in self.items.iter().enumerate() {
            if item.quantity <= 0 {
                errors.add(&format!("items[{}].quantity", index), "Quantity must be positive.");
            }
            let price_field = format!("items[{}].price", index);
            if item.price < Decimal::ZERO {
                errors.add(&price_field, "Price cannot be negative.");
            } else if item.price > max_unit_amount() {
                errors.add(&price_field, UNIT_AMOUNT_TOO_LARGE);
            } else if SaleItem::line_subtotal(item.quantity, item.price)
                .is_none_or(|subtotal| subtotal > max_sale_amount())
            {
                errors.add(&price_field, AMOUNT_TOO_LARGE);
            }
        }
        match self.total_amount {
            Some(total) if total < Decimal::ZERO => {
                errors.add("total_amount", "Total cannot be negative.");
            }
            _ if self.resolved_total().is_none_or(|total| total > max_sale_amount()) => {
                errors.add("total_amount", AMOUNT_TOO_LARGE);
            }
            _ => {}
        }

        errors.into_result()
    }
}

impl NewSavedReport {
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "This field is required.");
        }
        errors.into_result()
    }
}
