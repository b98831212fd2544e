//! Domain models for P&L calculations.
//!
//! These are the persisted shapes: the reference configuration document and
//! the saved calculation snapshot. Decimals serialize as strings so a record
//! reloads to exactly the values that were saved.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Recognized cost-input keys.
pub mod keys {
    pub const AMAZON_FEE_PERCENT: &str = "amazon_fee_percent";
    pub const ROYALTY_FEE_PERCENT: &str = "royalty_fee_percent";
    pub const COMMISSION_PERCENT: &str = "commission_percent";
    pub const PAID_ADS_GBP: &str = "paid_ads_gbp";
    pub const FIXED_FEE_USD: &str = "fixed_fee_usd";
    pub const LAUNCH_CONTENT_USD: &str = "launch_content_usd";
    pub const INFLUENCER_CONTENT_USD: &str = "influencer_content_usd";
    pub const UGC_CONTENT_USD: &str = "ugc_content_usd";
    pub const PRODUCT_GIFTING_USD: &str = "product_gifting_usd";
    pub const OTHER_USD: &str = "other_usd";

    /// Flat USD buckets summed into "other costs".
    pub const FLAT_USD: [&str; 6] = [
        FIXED_FEE_USD,
        LAUNCH_CONTENT_USD,
        INFLUENCER_CONTENT_USD,
        UGC_CONTENT_USD,
        PRODUCT_GIFTING_USD,
        OTHER_USD,
    ];

    pub const ALL: [&str; 10] = [
        AMAZON_FEE_PERCENT,
        ROYALTY_FEE_PERCENT,
        COMMISSION_PERCENT,
        PAID_ADS_GBP,
        FIXED_FEE_USD,
        LAUNCH_CONTENT_USD,
        INFLUENCER_CONTENT_USD,
        UGC_CONTENT_USD,
        PRODUCT_GIFTING_USD,
        OTHER_USD,
    ];
}

pub const DEFAULT_EXCHANGE_RATE: Decimal = dec!(1.25);
pub const DEFAULT_SHIPPING_COST_PER_UNIT_3PL: Decimal = dec!(2.00);

/// How a line is shipped from the manufacturer; selects the catalog COGS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShippingType {
    Sea,
    Air,
}

impl fmt::Display for ShippingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShippingType::Sea => write!(f, "Sea"),
            ShippingType::Air => write!(f, "Air"),
        }
    }
}

/// Catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub cogs_gbp_sea: Decimal,
    pub cogs_gbp_air: Decimal,
    #[serde(default)]
    pub default_rrp_usd: Option<Decimal>,
}

impl Product {
    /// COGS in GBP for the given shipping type
    pub fn cogs_gbp(&self, shipping_type: ShippingType) -> Decimal {
        match shipping_type {
            ShippingType::Sea => self.cogs_gbp_sea,
            ShippingType::Air => self.cogs_gbp_air,
        }
    }
}

/// Reference data shared by every calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceConfig {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default = "default_shipping_options")]
    pub shipping_options: Vec<String>,
    #[serde(default = "default_exchange_rate")]
    pub exchange_rate: Decimal,
    #[serde(default = "default_shipping_cost")]
    pub shipping_cost_per_unit_3pl: Decimal,
}

fn default_shipping_options() -> Vec<String> {
    vec![ShippingType::Sea.to_string(), ShippingType::Air.to_string()]
}

fn default_exchange_rate() -> Decimal {
    DEFAULT_EXCHANGE_RATE
}

fn default_shipping_cost() -> Decimal {
    DEFAULT_SHIPPING_COST_PER_UNIT_3PL
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            products: Vec::new(),
            shipping_options: default_shipping_options(),
            exchange_rate: DEFAULT_EXCHANGE_RATE,
            shipping_cost_per_unit_3pl: DEFAULT_SHIPPING_COST_PER_UNIT_3PL,
        }
    }
}

impl ReferenceConfig {
    /// First catalog product with exactly this name
    pub fn product(&self, name: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.name == name)
    }
}

/// A product line entered for a calculation, with COGS already resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_name: String,
    #[serde(default)]
    pub description: String,
    pub shipping_type: ShippingType,
    pub quantity: u32,
    pub cogs_gbp: Decimal,
    pub rrp_usd: Decimal,
}

/// Named cost parameters. Missing keys read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CostInputs(BTreeMap<String, Decimal>);

impl CostInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: Decimal) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: Decimal) {
        self.0.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Decimal {
        self.0.get(key).copied().unwrap_or(Decimal::ZERO)
    }

    /// Keys that no P&L figure reads
    pub fn unknown_keys(&self) -> Vec<&str> {
        self.0
            .keys()
            .map(String::as_str)
            .filter(|k| !keys::ALL.contains(k))
            .collect()
    }
}

/// Per-line engine output, full precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub product_name: String,
    pub description: String,
    pub shipping_type: ShippingType,
    pub quantity: u32,
    pub cogs_gbp: Decimal,
    /// Per unit
    pub cogs_usd: Decimal,
    pub rrp_usd: Decimal,
    pub gmv_usd: Decimal,
    /// Ratio, not a percentage (0.6875 means 68.75%)
    pub gross_margin_pct: Decimal,
    pub gross_margin_value_usd: Decimal,
}

/// Aggregate P&L statement, full precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlSummary {
    pub revenue: Decimal,
    pub amazon_fees: Decimal,
    pub royalty_fees: Decimal,
    pub commission_fee: Decimal,
    pub paid_ads_usd: Decimal,
    pub total_cogs: Decimal,
    pub shipping_costs: Decimal,
    /// Flat USD buckets plus paid ads
    pub other_costs: Decimal,
    pub total_costs: Decimal,
    pub gross_profit: Decimal,
    /// Ratio of gross profit to revenue
    pub gross_profit_pct: Decimal,
    pub total_units: u64,
}

/// Engine output
#[derive(Debug, Clone, PartialEq)]
pub struct Calculation {
    pub products: Vec<ProductSummary>,
    pub p_and_l: PlSummary,
}

/// Persisted snapshot of a calculation, keyed by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedCalculation {
    pub name: String,
    pub products: Vec<LineItem>,
    pub summary: Vec<ProductSummary>,
    pub p_and_l_summary: PlSummary,
    #[serde(default)]
    pub costs: CostInputs,
    #[serde(default = "Utc::now")]
    pub saved_at: DateTime<Utc>,
}
