//! Core P&L calculation functions.
//!
//! Pure functions for profitability math - no database access, no logging.
//! Everything here works at full decimal precision; rounding is applied by
//! the response layer only.

use rust_decimal::prelude::*;

use crate::pnl::models::{
    keys, Calculation, CostInputs, LineItem, PlSummary, ProductSummary, ReferenceConfig,
};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Round a P&L figure to `places` decimals, ties to the even digit.
///
/// Called when figures are presented (JSON responses, the summary CSV);
/// nothing in this module rounds.
///
/// ```
/// use rust_decimal_macros::dec;
/// use profitability_calculator::pnl::round_money;
///
/// // 15% marketplace fee on 33.30 of revenue
/// assert_eq!(round_money(dec!(4.995), 2), dec!(5.00));
/// // a half-cent commission settles on the even cent
/// assert_eq!(round_money(dec!(12.125), 2), dec!(12.12));
/// assert_eq!(round_money(dec!(12.135), 2), dec!(12.14));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
}

/// `numerator / denominator`, or zero when the denominator is zero.
///
/// Both margin figures (per line and aggregate) go through here.
pub fn margin_ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

/// Summarise a single line item.
pub fn summarize_line(item: &LineItem, exchange_rate: Decimal) -> ProductSummary {
    let quantity = Decimal::from(item.quantity);

    let cogs_usd = item.cogs_gbp * exchange_rate;
    let gmv_usd = quantity * item.rrp_usd;
    let gross_margin_pct = margin_ratio(item.rrp_usd - cogs_usd, item.rrp_usd);
    let gross_margin_value_usd = gmv_usd * gross_margin_pct;

    ProductSummary {
        product_name: item.product_name.clone(),
        description: item.description.clone(),
        shipping_type: item.shipping_type,
        quantity: item.quantity,
        cogs_gbp: item.cogs_gbp,
        cogs_usd,
        rrp_usd: item.rrp_usd,
        gmv_usd,
        gross_margin_pct,
        gross_margin_value_usd,
    }
}

/// Calculate product summaries and the P&L statement.
///
/// Product summaries come back in input order. Aggregates are accumulated in
/// the same pass and never rounded, so permuting the lines cannot change them.
/// Cost keys missing from `costs` count as zero.
pub fn calculate(
    line_items: &[LineItem],
    costs: &CostInputs,
    reference: &ReferenceConfig,
) -> Calculation {
    let exchange_rate = reference.exchange_rate;

    let mut products = Vec::with_capacity(line_items.len());
    let mut total_revenue = Decimal::ZERO;
    let mut total_cogs_usd = Decimal::ZERO;
    let mut total_units: u64 = 0;

    for item in line_items {
        let summary = summarize_line(item, exchange_rate);

        total_revenue += summary.gmv_usd;
        // Per-unit COGS scaled by quantity, not the per-unit figure itself
        total_cogs_usd += summary.cogs_usd * Decimal::from(item.quantity);
        total_units += u64::from(item.quantity);

        products.push(summary);
    }

    let amazon_fees = total_revenue * (costs.get(keys::AMAZON_FEE_PERCENT) / HUNDRED);
    let royalty_fees = total_revenue * (costs.get(keys::ROYALTY_FEE_PERCENT) / HUNDRED);
    let commission_fee = total_revenue * (costs.get(keys::COMMISSION_PERCENT) / HUNDRED);
    let paid_ads_usd = costs.get(keys::PAID_ADS_GBP) * exchange_rate;

    let shipping_costs =
        Decimal::from(total_units) * reference.shipping_cost_per_unit_3pl * exchange_rate;

    let other_costs = keys::FLAT_USD
        .iter()
        .map(|key| costs.get(key))
        .sum::<Decimal>()
        + paid_ads_usd;

    let total_costs = amazon_fees
        + royalty_fees
        + commission_fee
        + total_cogs_usd
        + shipping_costs
        + other_costs;

    let gross_profit = total_revenue - total_costs;
    let gross_profit_pct = margin_ratio(gross_profit, total_revenue);

    Calculation {
        products,
        p_and_l: PlSummary {
            revenue: total_revenue,
            amazon_fees,
            royalty_fees,
            commission_fee,
            paid_ads_usd,
            total_cogs: total_cogs_usd,
            shipping_costs,
            other_costs,
            total_costs,
            gross_profit,
            gross_profit_pct,
            total_units,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pnl::models::ShippingType;
    use rust_decimal_macros::dec;

    fn reference() -> ReferenceConfig {
        ReferenceConfig::default()
    }

    fn line(name: &str, quantity: u32, cogs_gbp: Decimal, rrp_usd: Decimal) -> LineItem {
        LineItem {
            product_name: name.to_string(),
            description: String::new(),
            shipping_type: ShippingType::Sea,
            quantity,
            cogs_gbp,
            rrp_usd,
        }
    }

    // ==================== round_money tests ====================

    #[test]
    fn test_round_money_bankers_rounding_to_even() {
        assert_eq!(round_money(dec!(2.5), 0), dec!(2));
        assert_eq!(round_money(dec!(3.5), 0), dec!(4));
        assert_eq!(round_money(dec!(2.345), 2), dec!(2.34));
        assert_eq!(round_money(dec!(2.355), 2), dec!(2.36));
    }

    #[test]
    fn test_round_money_normal_rounding() {
        assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
        assert_eq!(round_money(dec!(1.236), 2), dec!(1.24));
        assert_eq!(round_money(dec!(-1.236), 2), dec!(-1.24));
    }

    // ==================== margin_ratio tests ====================

    #[test]
    fn test_margin_ratio_zero_denominator() {
        assert_eq!(margin_ratio(dec!(10), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(margin_ratio(dec!(-6.25), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_margin_ratio_regular() {
        assert_eq!(margin_ratio(dec!(13.75), dec!(20)), dec!(0.6875));
    }

    // ==================== calculate tests ====================

    #[test]
    fn test_single_line_summary() {
        let items = vec![line("Trtl Pillow", 100, dec!(5), dec!(20))];
        let result = calculate(&items, &CostInputs::new(), &reference());

        let summary = &result.products[0];
        assert_eq!(summary.cogs_usd, dec!(6.25));
        assert_eq!(summary.gmv_usd, dec!(2000));
        assert_eq!(summary.gross_margin_pct, dec!(0.6875));
        assert_eq!(summary.gross_margin_value_usd, dec!(1375));
    }

    #[test]
    fn test_commission_and_shipping() {
        let items = vec![line("Trtl Pillow", 100, dec!(5), dec!(20))];
        let costs = CostInputs::new().with(keys::COMMISSION_PERCENT, dec!(20));
        let pl = calculate(&items, &costs, &reference()).p_and_l;

        assert_eq!(pl.revenue, dec!(2000));
        assert_eq!(pl.commission_fee, dec!(400));
        assert_eq!(pl.total_cogs, dec!(625));
        assert_eq!(pl.shipping_costs, dec!(250));
        assert_eq!(pl.total_costs, dec!(1275));
        assert_eq!(pl.gross_profit, dec!(725));
        assert_eq!(pl.gross_profit_pct, dec!(0.3625));
        assert_eq!(pl.total_units, 100);
    }

    #[test]
    fn test_no_line_items() {
        let costs = CostInputs::new()
            .with(keys::AMAZON_FEE_PERCENT, dec!(15))
            .with(keys::COMMISSION_PERCENT, dec!(20));
        let result = calculate(&[], &costs, &reference());

        assert!(result.products.is_empty());
        assert_eq!(result.p_and_l.revenue, Decimal::ZERO);
        assert_eq!(result.p_and_l.total_costs, Decimal::ZERO);
        assert_eq!(result.p_and_l.gross_profit, Decimal::ZERO);
        assert_eq!(result.p_and_l.gross_profit_pct, Decimal::ZERO);
    }

    #[test]
    fn test_empty_cost_inputs_only_cogs_and_shipping() {
        let items = vec![
            line("Trtl Pillow", 10, dec!(5), dec!(20)),
            line("Trtl Pillow Plus", 4, dec!(8), dec!(35)),
        ];
        let pl = calculate(&items, &CostInputs::new(), &reference()).p_and_l;

        assert_eq!(pl.amazon_fees, Decimal::ZERO);
        assert_eq!(pl.royalty_fees, Decimal::ZERO);
        assert_eq!(pl.commission_fee, Decimal::ZERO);
        assert_eq!(pl.paid_ads_usd, Decimal::ZERO);
        assert_eq!(pl.other_costs, Decimal::ZERO);
        // 10 * 6.25 + 4 * 10
        assert_eq!(pl.total_cogs, dec!(102.5));
        // 14 units * 2.00 * 1.25
        assert_eq!(pl.shipping_costs, dec!(35));
        assert_eq!(pl.total_costs, pl.total_cogs + pl.shipping_costs);
    }

    #[test]
    fn test_zero_price_line_has_zero_margin() {
        let items = vec![line("Sample", 12, dec!(5), Decimal::ZERO)];
        let result = calculate(&items, &CostInputs::new(), &reference());

        let summary = &result.products[0];
        assert_eq!(summary.gross_margin_pct, Decimal::ZERO);
        assert_eq!(summary.gross_margin_value_usd, Decimal::ZERO);
        assert_eq!(result.p_and_l.gross_profit_pct, Decimal::ZERO);
        // Costs still accrue on a zero-priced line
        assert_eq!(result.p_and_l.total_cogs, dec!(75));
    }

    #[test]
    fn test_other_costs_include_flat_buckets_and_paid_ads() {
        let items = vec![line("Trtl Pillow", 100, dec!(5), dec!(20))];
        let costs = CostInputs::new()
            .with(keys::FIXED_FEE_USD, dec!(100))
            .with(keys::LAUNCH_CONTENT_USD, dec!(50))
            .with(keys::INFLUENCER_CONTENT_USD, dec!(25))
            .with(keys::UGC_CONTENT_USD, dec!(10))
            .with(keys::PRODUCT_GIFTING_USD, dec!(5))
            .with(keys::OTHER_USD, dec!(1.5))
            .with(keys::PAID_ADS_GBP, dec!(80))
            .with("retired_bucket_usd", dec!(9999));
        let pl = calculate(&items, &costs, &reference()).p_and_l;

        assert_eq!(pl.paid_ads_usd, dec!(100));
        assert_eq!(pl.other_costs, dec!(291.5));
        assert_eq!(pl.total_costs, dec!(625) + dec!(250) + dec!(291.5));
    }

    #[test]
    fn test_percentage_fees() {
        let items = vec![line("Trtl Pillow", 50, dec!(5), dec!(30))];
        let costs = CostInputs::new()
            .with(keys::AMAZON_FEE_PERCENT, dec!(15))
            .with(keys::ROYALTY_FEE_PERCENT, dec!(2.5));
        let pl = calculate(&items, &costs, &reference()).p_and_l;

        assert_eq!(pl.revenue, dec!(1500));
        assert_eq!(pl.amazon_fees, dec!(225));
        assert_eq!(pl.royalty_fees, dec!(37.5));
    }

    #[test]
    fn test_negative_margin_line() {
        let items = vec![line("Loss Leader", 1, dec!(20), dec!(10))];
        let summary = &calculate(&items, &CostInputs::new(), &reference()).products[0];

        assert_eq!(summary.cogs_usd, dec!(25));
        assert_eq!(summary.gross_margin_pct, dec!(-1.5));
        assert_eq!(summary.gross_margin_value_usd, dec!(-15));
    }

    #[test]
    fn test_uses_reference_exchange_rate_and_3pl_cost() {
        let reference = ReferenceConfig {
            exchange_rate: dec!(1.3),
            shipping_cost_per_unit_3pl: dec!(1.5),
            ..ReferenceConfig::default()
        };
        let items = vec![line("Trtl Pillow", 10, dec!(4), dec!(20))];
        let costs = CostInputs::new().with(keys::PAID_ADS_GBP, dec!(10));
        let result = calculate(&items, &costs, &reference);

        assert_eq!(result.products[0].cogs_usd, dec!(5.2));
        assert_eq!(result.p_and_l.shipping_costs, dec!(19.5));
        assert_eq!(result.p_and_l.paid_ads_usd, dec!(13));
    }

    #[test]
    fn test_output_preserves_input_order() {
        let items = vec![
            line("C", 1, dec!(1), dec!(10)),
            line("A", 2, dec!(2), dec!(10)),
            line("B", 3, dec!(3), dec!(10)),
        ];
        let result = calculate(&items, &CostInputs::new(), &reference());
        let names: Vec<&str> = result
            .products
            .iter()
            .map(|p| p.product_name.as_str())
            .collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_aggregates_independent_of_line_order() {
        let items = vec![
            line("A", 7, dec!(3.33), dec!(19.99)),
            line("B", 13, dec!(4.17), dec!(0)),
            line("C", 1, dec!(11.01), dec!(42.5)),
        ];
        let mut reversed = items.clone();
        reversed.reverse();

        let forward = calculate(&items, &CostInputs::new(), &reference()).p_and_l;
        let backward = calculate(&reversed, &CostInputs::new(), &reference()).p_and_l;

        assert_eq!(forward.revenue, backward.revenue);
        assert_eq!(forward.total_cogs, backward.total_cogs);
        assert_eq!(forward.total_units, backward.total_units);
    }

    #[test]
    fn test_calculate_is_repeatable() {
        let items = vec![
            line("A", 3, dec!(3.333), dec!(9.99)),
            line("B", 5, dec!(1.1), dec!(7)),
        ];
        let costs = CostInputs::new()
            .with(keys::AMAZON_FEE_PERCENT, dec!(15.3))
            .with(keys::PAID_ADS_GBP, dec!(12.34));

        let first = calculate(&items, &costs, &reference());
        let second = calculate(&items, &costs, &reference());
        assert_eq!(first, second);
    }

    #[test]
    fn test_intermediates_are_not_rounded() {
        // 3 * 3.333 * 1.25 = 12.49875, which would drift if rounded per line
        let items = vec![line("A", 3, dec!(3.333), dec!(10))];
        let pl = calculate(&items, &CostInputs::new(), &reference()).p_and_l;
        assert_eq!(pl.total_cogs, dec!(12.49875));
    }
}
