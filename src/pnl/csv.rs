//! CSV rendering for saved calculations.

use super::models::{LineItem, ProductSummary};
use super::responses::ProductSummaryResponse;

const LINE_ITEM_HEADER: [&str; 6] = [
    "product_name",
    "description",
    "shipping_type",
    "quantity",
    "cogs_gbp",
    "rrp_usd",
];

const SUMMARY_HEADER: [&str; 10] = [
    "product_name",
    "description",
    "shipping_type",
    "quantity",
    "cogs_gbp",
    "cogs_usd",
    "rrp_usd",
    "gmv_usd",
    "gross_margin_percent",
    "gross_margin_value_usd",
];

/// Quote a field if it contains a delimiter, quote or line break
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn write_row<I, S>(out: &mut String, fields: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let row: Vec<String> = fields.into_iter().map(|f| escape(f.as_ref())).collect();
    out.push_str(&row.join(","));
    out.push('\n');
}

/// Render line items with a header row, one row per item.
pub fn line_items_csv(items: &[LineItem]) -> String {
    let mut out = String::new();
    write_row(&mut out, LINE_ITEM_HEADER);

    for item in items {
        write_row(
            &mut out,
            [
                item.product_name.clone(),
                item.description.clone(),
                item.shipping_type.to_string(),
                item.quantity.to_string(),
                item.cogs_gbp.to_string(),
                item.rrp_usd.to_string(),
            ],
        );
    }

    out
}

/// Render the rounded product summary table.
pub fn product_summaries_csv(summaries: &[ProductSummary]) -> String {
    let mut out = String::new();
    write_row(&mut out, SUMMARY_HEADER);

    for s in summaries.iter().map(ProductSummaryResponse::from) {
        write_row(
            &mut out,
            [
                s.product_name,
                s.description,
                s.shipping_type.to_string(),
                s.quantity.to_string(),
                s.cogs_gbp.amount.to_string(),
                s.cogs_usd.amount.to_string(),
                s.rrp_usd.amount.to_string(),
                s.gmv_usd.amount.to_string(),
                s.gross_margin_percent.to_string(),
                s.gross_margin_value_usd.amount.to_string(),
            ],
        );
    }

    out
}
