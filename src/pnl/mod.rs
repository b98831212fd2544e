//! P&L engine module.
//!
//! Turns product line items, cost inputs and reference data into per-product
//! summaries and an aggregate profit-and-loss statement, and exposes that
//! over HTTP/JSON together with saved calculations.

pub mod calculators;
pub mod csv;
pub mod models;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;
pub mod validation;

// Re-export commonly used items
pub use calculators::{calculate, round_money};
pub use models::{
    Calculation, CostInputs, LineItem, PlSummary, Product, ProductSummary, ReferenceConfig,
    SavedCalculation, ShippingType,
};
pub use routes::router;
