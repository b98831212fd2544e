//! Request DTOs for P&L API endpoints.

use rust_decimal::Decimal;
use serde::Deserialize;

use super::models::{CostInputs, ShippingType};

/// A line item as entered by the user.
///
/// `cogs_gbp` and `rrp_usd` may be left out, in which case they are taken
/// from the catalog entry with the same product name.
#[derive(Debug, Clone, Deserialize)]
pub struct LineItemRequest {
    pub product_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_shipping_type")]
    pub shipping_type: ShippingType,
    pub quantity: u32,
    #[serde(default)]
    pub cogs_gbp: Option<Decimal>,
    #[serde(default)]
    pub rrp_usd: Option<Decimal>,
}

fn default_shipping_type() -> ShippingType {
    ShippingType::Sea
}

/// Request to calculate a P&L without saving it
#[derive(Debug, Clone, Deserialize)]
pub struct CalculateRequest {
    #[serde(default)]
    pub line_items: Vec<LineItemRequest>,
    #[serde(default)]
    pub costs: CostInputs,
}

/// Request to calculate and save a P&L under a name
#[derive(Debug, Clone, Deserialize)]
pub struct SaveCalculationRequest {
    pub name: String,
    #[serde(default)]
    pub line_items: Vec<LineItemRequest>,
    #[serde(default)]
    pub costs: CostInputs,
}

impl SaveCalculationRequest {
    pub fn calculation(&self) -> CalculateRequest {
        CalculateRequest {
            line_items: self.line_items.clone(),
            costs: self.costs.clone(),
        }
    }
}
