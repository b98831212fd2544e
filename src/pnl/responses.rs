//! Response DTOs for P&L API endpoints.
//!
//! This is the presentation boundary: money is rounded to 2 places and
//! ratios are shown as percentages here, never earlier.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::calculators::round_money;
use super::models::{
    Calculation, CostInputs, LineItem, PlSummary, ProductSummary, SavedCalculation, ShippingType,
};

pub const MONEY_PLACES: u32 = 2;

pub const GBP: &str = "GBP";
pub const USD: &str = "USD";

/// Money value for JSON responses
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoneyResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub currency: String,
}

impl MoneyResponse {
    pub fn gbp(amount: Decimal) -> Self {
        Self {
            amount: present(amount),
            currency: GBP.to_string(),
        }
    }

    pub fn usd(amount: Decimal) -> Self {
        Self {
            amount: present(amount),
            currency: USD.to_string(),
        }
    }
}

/// Round to cents and always carry exactly two decimal places ("400.00", not "400.0")
pub fn present(amount: Decimal) -> Decimal {
    let mut rounded = round_money(amount, MONEY_PLACES);
    rounded.rescale(MONEY_PLACES);
    rounded
}

/// A ratio shown as a percentage, e.g. 0.6875 -> 68.75
pub fn percent(ratio: Decimal) -> Decimal {
    present(ratio * Decimal::ONE_HUNDRED)
}

/// One row of the product summary table
#[derive(Debug, Clone, Serialize)]
pub struct ProductSummaryResponse {
    pub product_name: String,
    pub description: String,
    pub shipping_type: ShippingType,
    pub quantity: u32,
    pub cogs_gbp: MoneyResponse,
    pub cogs_usd: MoneyResponse,
    pub rrp_usd: MoneyResponse,
    pub gmv_usd: MoneyResponse,
    #[serde(with = "rust_decimal::serde::str")]
    pub gross_margin_percent: Decimal,
    pub gross_margin_value_usd: MoneyResponse,
}

impl From<&ProductSummary> for ProductSummaryResponse {
    fn from(s: &ProductSummary) -> Self {
        Self {
            product_name: s.product_name.clone(),
            description: s.description.clone(),
            shipping_type: s.shipping_type,
            quantity: s.quantity,
            cogs_gbp: MoneyResponse::gbp(s.cogs_gbp),
            cogs_usd: MoneyResponse::usd(s.cogs_usd),
            rrp_usd: MoneyResponse::usd(s.rrp_usd),
            gmv_usd: MoneyResponse::usd(s.gmv_usd),
            gross_margin_percent: percent(s.gross_margin_pct),
            gross_margin_value_usd: MoneyResponse::usd(s.gross_margin_value_usd),
        }
    }
}

/// Aggregate P&L statement
#[derive(Debug, Clone, Serialize)]
pub struct PlSummaryResponse {
    pub revenue: MoneyResponse,
    pub amazon_fees: MoneyResponse,
    pub royalty_fees: MoneyResponse,
    pub commission_fee: MoneyResponse,
    pub paid_ads: MoneyResponse,
    pub total_cogs: MoneyResponse,
    pub shipping_costs: MoneyResponse,
    pub other_costs: MoneyResponse,
    pub total_costs: MoneyResponse,
    pub gross_profit: MoneyResponse,
    #[serde(with = "rust_decimal::serde::str")]
    pub gross_profit_percent: Decimal,
    pub total_units: u64,
}

impl From<&PlSummary> for PlSummaryResponse {
    fn from(pl: &PlSummary) -> Self {
        Self {
            revenue: MoneyResponse::usd(pl.revenue),
            amazon_fees: MoneyResponse::usd(pl.amazon_fees),
            royalty_fees: MoneyResponse::usd(pl.royalty_fees),
            commission_fee: MoneyResponse::usd(pl.commission_fee),
            paid_ads: MoneyResponse::usd(pl.paid_ads_usd),
            total_cogs: MoneyResponse::usd(pl.total_cogs),
            shipping_costs: MoneyResponse::usd(pl.shipping_costs),
            other_costs: MoneyResponse::usd(pl.other_costs),
            total_costs: MoneyResponse::usd(pl.total_costs),
            gross_profit: MoneyResponse::usd(pl.gross_profit),
            gross_profit_percent: percent(pl.gross_profit_pct),
            total_units: pl.total_units,
        }
    }
}

/// Response for an unsaved calculation
#[derive(Debug, Clone, Serialize)]
pub struct CalculationResponse {
    pub products: Vec<ProductSummaryResponse>,
    pub p_and_l_summary: PlSummaryResponse,
}

impl From<&Calculation> for CalculationResponse {
    fn from(c: &Calculation) -> Self {
        Self {
            products: c.products.iter().map(Into::into).collect(),
            p_and_l_summary: (&c.p_and_l).into(),
        }
    }
}

/// Response for a saved calculation
#[derive(Debug, Clone, Serialize)]
pub struct SavedCalculationResponse {
    pub name: String,
    pub saved_at: DateTime<Utc>,
    pub products: Vec<LineItem>,
    pub costs: CostInputs,
    pub summary: Vec<ProductSummaryResponse>,
    pub p_and_l_summary: PlSummaryResponse,
}

impl From<&SavedCalculation> for SavedCalculationResponse {
    fn from(c: &SavedCalculation) -> Self {
        Self {
            name: c.name.clone(),
            saved_at: c.saved_at,
            products: c.products.clone(),
            costs: c.costs.clone(),
            summary: c.summary.iter().map(Into::into).collect(),
            p_and_l_summary: (&c.p_and_l_summary).into(),
        }
    }
}

/// Entry in the saved calculations listing
#[derive(Debug, Clone, Serialize)]
pub struct SavedCalculationListEntry {
    pub name: String,
    pub data: SavedCalculationResponse,
    pub csv: String,
}

/// Generic P&L error response
#[derive(Debug, Serialize)]
pub struct PnlErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
