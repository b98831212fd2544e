//! Input validation for P&L calculations.
//!
//! The engine itself accepts whatever it is given. These checks run while
//! requests are turned into engine inputs, so out-of-domain values are
//! reported instead of flowing into negative aggregates.
//!
//! The upper limits keep every engine figure, including the percentage
//! shown for a margin over the smallest allowed price, inside the range of
//! `Decimal`.

use std::collections::HashSet;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::ValidationError;

use super::models::{keys, CostInputs, LineItem, ReferenceConfig};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

pub const MAX_CALCULATION_NAME_LEN: usize = 100;

/// Largest money amount accepted for any price, COGS or cost input
pub const MAX_AMOUNT: Decimal = dec!(1000000000);
/// Largest percentage cost input
pub const MAX_PERCENT: Decimal = dec!(1000);
pub const MAX_EXCHANGE_RATE: Decimal = dec!(1000);
pub const MAX_QUANTITY: u32 = 1_000_000;
pub const MAX_LINE_ITEMS: usize = 1_000;
/// Retail prices are divisors in the margin figures
pub const MAX_PRICE_PLACES: u32 = 4;

const PERCENT_KEYS: [&str; 3] = [
    keys::AMAZON_FEE_PERCENT,
    keys::ROYALTY_FEE_PERCENT,
    keys::COMMISSION_PERCENT,
];

fn non_negative(value: Decimal, field: impl Into<String>) -> ValidationResult<()> {
    if value < Decimal::ZERO {
        return Err(ValidationError::Negative {
            field: field.into(),
        });
    }
    Ok(())
}

fn in_range(value: Decimal, max: Decimal, field: impl Into<String>) -> ValidationResult<()> {
    let field = field.into();
    if value > max {
        return Err(ValidationError::TooLarge { field, max });
    }
    non_negative(value, field)
}

fn price(value: Decimal, field: impl Into<String>) -> ValidationResult<()> {
    let field = field.into();
    if value.normalize().scale() > MAX_PRICE_PLACES {
        return Err(ValidationError::TooPrecise {
            field,
            places: MAX_PRICE_PLACES,
        });
    }
    in_range(value, MAX_AMOUNT, field)
}

/// Validates resolved line items.
///
/// ## Rules
/// - at most [`MAX_LINE_ITEMS`] lines
/// - product name must not be blank
/// - quantity at most [`MAX_QUANTITY`]
/// - COGS and retail price between zero and [`MAX_AMOUNT`]
/// - retail price with at most [`MAX_PRICE_PLACES`] decimal places
pub fn validate_line_items(items: &[LineItem]) -> ValidationResult<()> {
    if items.len() > MAX_LINE_ITEMS {
        return Err(ValidationError::TooLarge {
            field: "line_items".to_string(),
            max: Decimal::from(MAX_LINE_ITEMS),
        });
    }

    for (i, item) in items.iter().enumerate() {
        if item.product_name.trim().is_empty() {
            return Err(ValidationError::Required {
                field: format!("line_items[{i}].product_name"),
            });
        }
        if item.quantity > MAX_QUANTITY {
            return Err(ValidationError::TooLarge {
                field: format!("line_items[{i}].quantity"),
                max: Decimal::from(MAX_QUANTITY),
            });
        }
        in_range(item.cogs_gbp, MAX_AMOUNT, format!("line_items[{i}].cogs_gbp"))?;
        price(item.rrp_usd, format!("line_items[{i}].rrp_usd"))?;
    }
    Ok(())
}

/// Validates recognized cost inputs. Unknown keys are not checked.
pub fn validate_cost_inputs(costs: &CostInputs) -> ValidationResult<()> {
    for key in keys::ALL {
        let max = if PERCENT_KEYS.contains(&key) {
            MAX_PERCENT
        } else {
            MAX_AMOUNT
        };
        in_range(costs.get(key), max, format!("costs.{key}"))?;
    }
    Ok(())
}

/// Validates the reference configuration.
///
/// ## Rules
/// - exchange rate greater than zero and at most [`MAX_EXCHANGE_RATE`]
/// - 3PL cost, COGS and default RRP between zero and [`MAX_AMOUNT`]
/// - product names must be present and unique
pub fn validate_reference_config(config: &ReferenceConfig) -> ValidationResult<()> {
    if config.exchange_rate <= Decimal::ZERO {
        return Err(ValidationError::NotPositive {
            field: "exchange_rate".to_string(),
        });
    }
    in_range(config.exchange_rate, MAX_EXCHANGE_RATE, "exchange_rate")?;
    in_range(
        config.shipping_cost_per_unit_3pl,
        MAX_AMOUNT,
        "shipping_cost_per_unit_3pl",
    )?;

    let mut seen = HashSet::new();
    for (i, product) in config.products.iter().enumerate() {
        let name = product.name.trim();
        if name.is_empty() {
            return Err(ValidationError::Required {
                field: format!("products[{i}].name"),
            });
        }
        if !seen.insert(name) {
            return Err(ValidationError::Duplicate {
                field: "products".to_string(),
                value: name.to_string(),
            });
        }
        in_range(product.cogs_gbp_sea, MAX_AMOUNT, format!("products[{i}].cogs_gbp_sea"))?;
        in_range(product.cogs_gbp_air, MAX_AMOUNT, format!("products[{i}].cogs_gbp_air"))?;
        if let Some(rrp) = product.default_rrp_usd {
            price(rrp, format!("products[{i}].default_rrp_usd"))?;
        }
    }
    Ok(())
}

/// Validates a saved calculation name.
///
/// Names double as file names in the file store, so path separators and
/// dot-only names are refused.
pub fn validate_calculation_name(name: &str) -> ValidationResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_CALCULATION_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_CALCULATION_NAME_LEN,
        });
    }

    if name == "." || name == ".." {
        return Err(ValidationError::InvalidFormat {
            field: "name".to_string(),
            reason: "must not be '.' or '..'".to_string(),
        });
    }

    if name.chars().any(|c| matches!(c, '/' | '\\') || c.is_control()) {
        return Err(ValidationError::InvalidFormat {
            field: "name".to_string(),
            reason: "must not contain path separators or control characters".to_string(),
        });
    }

    Ok(())
}
