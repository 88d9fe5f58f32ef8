//! Campaign Value Calculator
//!
//! Computes the monetary discount one campaign yields against its eligible
//! lines, dispatched by campaign kind. Uses rust_decimal throughout; the
//! caller converts to f64 at the result boundary.
//!
//! `order_basis` is the amount the campaign may reduce: the running
//! remainder for stacked promotions, the original subtotal for supplied
//! codes. Every computed amount is clamped so it never exceeds it.

use crate::money::to_decimal;
use rust_decimal::Decimal;
use shared::models::{
    Campaign, CampaignKind, CampaignRules, Condition, ConditionField, ConditionOp,
};
use shared::order::{OrderLine, OrderSnapshot};

/// Calculate the discount amount for one campaign.
///
/// Returns a non-negative amount already clamped to the campaign cap and
/// to the applicable basis. Free-shipping campaigns yield zero (shipping
/// cost lives with an external collaborator; the engine reports
/// eligibility only).
pub fn calculate_value(
    campaign: &Campaign,
    snapshot: &OrderSnapshot,
    eligible: &[&OrderLine],
    eligible_total: Decimal,
    order_basis: Decimal,
) -> Decimal {
    let base = campaign.base();
    let hundred = Decimal::ONE_HUNDRED;
    // Scoped kinds cannot discount more than their eligible value
    let scoped_basis = eligible_total.min(order_basis);

    let (raw, clamp_basis) = match base.kind {
        CampaignKind::Percentage => {
            (scoped_basis * to_decimal(base.value) / hundred, scoped_basis)
        }
        CampaignKind::FixedAmount => (to_decimal(base.value), scoped_basis),
        CampaignKind::FreeShipping => (Decimal::ZERO, order_basis),
        CampaignKind::BuyXGetY => (bogo_amount(campaign, eligible), scoped_basis),
        CampaignKind::Bundle => (bundle_amount(campaign, eligible), scoped_basis),
        CampaignKind::TimeBased => (time_based_amount(campaign, order_basis), order_basis),
        CampaignKind::Conditional => {
            (conditional_amount(campaign, snapshot, order_basis), order_basis)
        }
    };

    let mut amount = raw;
    if let Some(cap) = base.max_discount_amount {
        amount = amount.min(to_decimal(cap));
    }
    amount.min(clamp_basis).max(Decimal::ZERO)
}

/// Buy-X-get-Y: whole redemption sets only, free units never exceed the
/// quantity actually in the order.
fn bogo_amount(campaign: &Campaign, eligible: &[&OrderLine]) -> Decimal {
    let Some(CampaignRules::BuyXGetY {
        free_item_id,
        required_qty,
        free_qty,
    }) = campaign.base().rules
    else {
        tracing::warn!(campaign_id = campaign.id(), "BOGO campaign without rules");
        return Decimal::ZERO;
    };
    if required_qty <= 0 || free_qty <= 0 {
        return Decimal::ZERO;
    }

    let matching: Vec<&&OrderLine> = eligible
        .iter()
        .filter(|line| line.product_id == free_item_id)
        .collect();
    let quantity: i32 = matching.iter().map(|line| line.quantity).sum();
    let Some(unit_price) = matching.first().map(|line| to_decimal(line.unit_price)) else {
        return Decimal::ZERO;
    };

    let sets = quantity / required_qty;
    let free_units = (sets * free_qty).min(quantity);
    Decimal::from(free_units) * unit_price
}

/// Bundle: as many complete bundles as the scarcest component allows,
/// each worth the gap between component prices and the bundle price.
fn bundle_amount(campaign: &Campaign, eligible: &[&OrderLine]) -> Decimal {
    let Some(CampaignRules::Bundle {
        ref components,
        bundle_price,
    }) = campaign.base().rules
    else {
        tracing::warn!(campaign_id = campaign.id(), "bundle campaign without rules");
        return Decimal::ZERO;
    };
    if components.is_empty() {
        return Decimal::ZERO;
    }

    let mut max_bundles = i32::MAX;
    let mut components_value = Decimal::ZERO;
    for component in components {
        if component.required_qty <= 0 {
            return Decimal::ZERO;
        }
        let matching: Vec<&&OrderLine> = eligible
            .iter()
            .filter(|line| line.product_id == component.product_id)
            .collect();
        let available: i32 = matching.iter().map(|line| line.quantity).sum();
        max_bundles = max_bundles.min(available / component.required_qty);
        if max_bundles == 0 {
            return Decimal::ZERO;
        }
        // Unit price taken from the order itself
        let unit_price = matching
            .first()
            .map(|line| to_decimal(line.unit_price))
            .unwrap_or_default();
        components_value += Decimal::from(component.required_qty) * unit_price;
    }

    let per_bundle = components_value - to_decimal(bundle_price);
    (Decimal::from(max_bundles) * per_bundle).max(Decimal::ZERO)
}

/// Time-based: percentage or fixed against the whole order basis
fn time_based_amount(campaign: &Campaign, order_basis: Decimal) -> Decimal {
    match campaign.base().rules {
        Some(CampaignRules::TimeBased {
            discount_percentage: Some(pct),
            ..
        }) => order_basis * to_decimal(pct) / Decimal::ONE_HUNDRED,
        Some(CampaignRules::TimeBased {
            discount_amount: Some(amount),
            ..
        }) => to_decimal(amount),
        // No structured params: fall back to the campaign value as a percentage
        _ => order_basis * to_decimal(campaign.base().value) / Decimal::ONE_HUNDRED,
    }
}

/// Conditional: all predicates must pass, then a nested percentage or
/// fixed discount applies to the order basis.
fn conditional_amount(campaign: &Campaign, snapshot: &OrderSnapshot, order_basis: Decimal) -> Decimal {
    let Some(CampaignRules::Conditional {
        ref conditions,
        discount_percentage,
        discount_amount,
    }) = campaign.base().rules
    else {
        tracing::warn!(
            campaign_id = campaign.id(),
            "conditional campaign without rules"
        );
        return Decimal::ZERO;
    };

    if !conditions.iter().all(|c| condition_passes(c, snapshot)) {
        return Decimal::ZERO;
    }

    if let Some(pct) = discount_percentage {
        order_basis * to_decimal(pct) / Decimal::ONE_HUNDRED
    } else if let Some(amount) = discount_amount {
        to_decimal(amount)
    } else {
        Decimal::ZERO
    }
}

fn condition_passes(condition: &Condition, snapshot: &OrderSnapshot) -> bool {
    let actual = match condition.field {
        ConditionField::OrderTotal => to_decimal(snapshot.subtotal),
        ConditionField::ItemQuantity => Decimal::from(snapshot.item_quantity()),
        ConditionField::CategoryTotal => match condition.category_id {
            Some(category_id) => to_decimal(snapshot.category_total(category_id)),
            // A category predicate without a category can never pass
            None => return false,
        },
    };
    let expected = to_decimal(condition.value);

    match condition.op {
        ConditionOp::Gte => actual >= expected,
        ConditionOp::Gt => actual > expected,
        ConditionOp::Lte => actual <= expected,
        ConditionOp::Lt => actual < expected,
        ConditionOp::Eq => actual == expected,
        ConditionOp::Ne => actual != expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{eligible_lines, eligible_total};
    use shared::models::{AppliesTo, BundleComponent, CampaignBase, CustomerSegment, Promotion};
    use std::collections::HashSet;

    fn make_campaign(kind: CampaignKind, value: f64, rules: Option<CampaignRules>) -> Campaign {
        Campaign::Promotion(Promotion {
            base: CampaignBase {
                id: 1,
                code: None,
                name: format!("{:?}", kind),
                receipt_name: None,
                is_active: true,
                kind,
                value,
                min_order_amount: None,
                max_order_amount: None,
                max_discount_amount: None,
                valid_from: 0,
                valid_until: i64::MAX,
                usage_limit: None,
                used_count: 0,
                applies_to: AppliesTo::All,
                included_ids: HashSet::new(),
                excluded_ids: HashSet::new(),
                days_of_week: vec![],
                time_from: None,
                time_until: None,
                customer_segment: CustomerSegment::All,
                combinable: true,
                rules,
                created_at: 0,
            },
            priority: 0,
        })
    }

    fn value_for(campaign: &Campaign, snapshot: &OrderSnapshot) -> Decimal {
        let eligible = eligible_lines(&snapshot.lines, campaign.base());
        let total = eligible_total(&eligible);
        calculate_value(
            campaign,
            snapshot,
            &eligible,
            total,
            to_decimal(snapshot.subtotal),
        )
    }

    #[test]
    fn test_percentage() {
        // Scenario: subtotal 200, 10% -> 20.00
        let snapshot = OrderSnapshot::new(vec![OrderLine::new(1, 10, 2, 100.0)]);
        let campaign = make_campaign(CampaignKind::Percentage, 10.0, None);
        assert_eq!(value_for(&campaign, &snapshot), to_decimal(20.0));
    }

    #[test]
    fn test_fixed_clamped_to_eligible_total() {
        // Scenario: eligible subset 15, fixed 50 -> 15.00
        let snapshot = OrderSnapshot::new(vec![
            OrderLine::new(1, 10, 1, 15.0),
            OrderLine::new(2, 20, 1, 85.0),
        ]);
        let mut campaign = make_campaign(CampaignKind::FixedAmount, 50.0, None);
        campaign.base_mut().applies_to = AppliesTo::Products;
        campaign.base_mut().included_ids = HashSet::from([1]);
        assert_eq!(value_for(&campaign, &snapshot), to_decimal(15.0));
    }

    #[test]
    fn test_free_shipping_reports_zero() {
        let snapshot = OrderSnapshot::new(vec![OrderLine::new(1, 10, 1, 40.0)]);
        let campaign = make_campaign(CampaignKind::FreeShipping, 0.0, None);
        assert_eq!(value_for(&campaign, &snapshot), Decimal::ZERO);
    }

    #[test]
    fn test_bogo_whole_sets() {
        // Scenario: qty 6 at 10.00, buy 2 get 1 -> 3 sets, 3 free, 30.00
        let snapshot = OrderSnapshot::new(vec![OrderLine::new(7, 10, 6, 10.0)]);
        let campaign = make_campaign(
            CampaignKind::BuyXGetY,
            0.0,
            Some(CampaignRules::BuyXGetY {
                free_item_id: 7,
                required_qty: 2,
                free_qty: 1,
            }),
        );
        assert_eq!(value_for(&campaign, &snapshot), to_decimal(30.0));
    }

    #[test]
    fn test_bogo_partial_set_ignored() {
        let snapshot = OrderSnapshot::new(vec![OrderLine::new(7, 10, 5, 10.0)]);
        let campaign = make_campaign(
            CampaignKind::BuyXGetY,
            0.0,
            Some(CampaignRules::BuyXGetY {
                free_item_id: 7,
                required_qty: 2,
                free_qty: 1,
            }),
        );
        // 2 complete sets -> 2 free units
        assert_eq!(value_for(&campaign, &snapshot), to_decimal(20.0));
    }

    #[test]
    fn test_bogo_free_units_capped_by_quantity() {
        // Generous rule: buy 1 get 3 would exceed the 2 units on the order
        let snapshot = OrderSnapshot::new(vec![OrderLine::new(7, 10, 2, 10.0)]);
        let campaign = make_campaign(
            CampaignKind::BuyXGetY,
            0.0,
            Some(CampaignRules::BuyXGetY {
                free_item_id: 7,
                required_qty: 1,
                free_qty: 3,
            }),
        );
        assert_eq!(value_for(&campaign, &snapshot), to_decimal(20.0));
    }

    #[test]
    fn test_bogo_target_not_in_order() {
        let snapshot = OrderSnapshot::new(vec![OrderLine::new(1, 10, 6, 10.0)]);
        let campaign = make_campaign(
            CampaignKind::BuyXGetY,
            0.0,
            Some(CampaignRules::BuyXGetY {
                free_item_id: 7,
                required_qty: 2,
                free_qty: 1,
            }),
        );
        assert_eq!(value_for(&campaign, &snapshot), Decimal::ZERO);
    }

    #[test]
    fn test_bundle() {
        // 2 burgers (8.00) + 2 fries (4.00) + bundle {1 burger + 1 fries} at 10.00
        // components value 12.00, 2 bundles -> 2 * 2.00 = 4.00
        let snapshot = OrderSnapshot::new(vec![
            OrderLine::new(1, 10, 2, 8.0),
            OrderLine::new(2, 20, 2, 4.0),
        ]);
        let campaign = make_campaign(
            CampaignKind::Bundle,
            0.0,
            Some(CampaignRules::Bundle {
                components: vec![
                    BundleComponent {
                        product_id: 1,
                        required_qty: 1,
                    },
                    BundleComponent {
                        product_id: 2,
                        required_qty: 1,
                    },
                ],
                bundle_price: 10.0,
            }),
        );
        assert_eq!(value_for(&campaign, &snapshot), to_decimal(4.0));
    }

    #[test]
    fn test_bundle_missing_component() {
        let snapshot = OrderSnapshot::new(vec![OrderLine::new(1, 10, 2, 8.0)]);
        let campaign = make_campaign(
            CampaignKind::Bundle,
            0.0,
            Some(CampaignRules::Bundle {
                components: vec![
                    BundleComponent {
                        product_id: 1,
                        required_qty: 1,
                    },
                    BundleComponent {
                        product_id: 2,
                        required_qty: 1,
                    },
                ],
                bundle_price: 10.0,
            }),
        );
        assert_eq!(value_for(&campaign, &snapshot), Decimal::ZERO);
    }

    #[test]
    fn test_bundle_price_above_component_value_floors_at_zero() {
        let snapshot = OrderSnapshot::new(vec![OrderLine::new(1, 10, 1, 8.0)]);
        let campaign = make_campaign(
            CampaignKind::Bundle,
            0.0,
            Some(CampaignRules::Bundle {
                components: vec![BundleComponent {
                    product_id: 1,
                    required_qty: 1,
                }],
                bundle_price: 9.0,
            }),
        );
        assert_eq!(value_for(&campaign, &snapshot), Decimal::ZERO);
    }

    #[test]
    fn test_time_based_percentage_on_order_total() {
        // Time-based hits the whole order, not a restricted subset
        let snapshot = OrderSnapshot::new(vec![
            OrderLine::new(1, 10, 1, 60.0),
            OrderLine::new(2, 20, 1, 40.0),
        ]);
        let campaign = make_campaign(
            CampaignKind::TimeBased,
            0.0,
            Some(CampaignRules::TimeBased {
                discount_percentage: Some(15.0),
                discount_amount: None,
            }),
        );
        assert_eq!(value_for(&campaign, &snapshot), to_decimal(15.0));
    }

    #[test]
    fn test_time_based_fixed_amount() {
        let snapshot = OrderSnapshot::new(vec![OrderLine::new(1, 10, 1, 30.0)]);
        let campaign = make_campaign(
            CampaignKind::TimeBased,
            0.0,
            Some(CampaignRules::TimeBased {
                discount_percentage: None,
                discount_amount: Some(5.0),
            }),
        );
        assert_eq!(value_for(&campaign, &snapshot), to_decimal(5.0));
    }

    #[test]
    fn test_conditional_all_predicates_pass() {
        let snapshot = OrderSnapshot::new(vec![
            OrderLine::new(1, 10, 3, 20.0),
            OrderLine::new(2, 20, 1, 40.0),
        ]);
        // subtotal 100, quantity 4, category 10 total 60
        let campaign = make_campaign(
            CampaignKind::Conditional,
            0.0,
            Some(CampaignRules::Conditional {
                conditions: vec![
                    Condition {
                        field: ConditionField::OrderTotal,
                        op: ConditionOp::Gte,
                        value: 100.0,
                        category_id: None,
                    },
                    Condition {
                        field: ConditionField::ItemQuantity,
                        op: ConditionOp::Gt,
                        value: 3.0,
                        category_id: None,
                    },
                    Condition {
                        field: ConditionField::CategoryTotal,
                        op: ConditionOp::Eq,
                        value: 60.0,
                        category_id: Some(10),
                    },
                ],
                discount_percentage: Some(10.0),
                discount_amount: None,
            }),
        );
        assert_eq!(value_for(&campaign, &snapshot), to_decimal(10.0));
    }

    #[test]
    fn test_conditional_one_failed_predicate_yields_zero() {
        let snapshot = OrderSnapshot::new(vec![OrderLine::new(1, 10, 1, 50.0)]);
        let campaign = make_campaign(
            CampaignKind::Conditional,
            0.0,
            Some(CampaignRules::Conditional {
                conditions: vec![Condition {
                    field: ConditionField::OrderTotal,
                    op: ConditionOp::Gte,
                    value: 100.0,
                    category_id: None,
                }],
                discount_percentage: Some(10.0),
                discount_amount: None,
            }),
        );
        assert_eq!(value_for(&campaign, &snapshot), Decimal::ZERO);
    }

    #[test]
    fn test_conditional_ne_operator() {
        let snapshot = OrderSnapshot::new(vec![OrderLine::new(1, 10, 2, 10.0)]);
        let campaign = make_campaign(
            CampaignKind::Conditional,
            0.0,
            Some(CampaignRules::Conditional {
                conditions: vec![Condition {
                    field: ConditionField::ItemQuantity,
                    op: ConditionOp::Ne,
                    value: 3.0,
                    category_id: None,
                }],
                discount_percentage: None,
                discount_amount: Some(2.0),
            }),
        );
        assert_eq!(value_for(&campaign, &snapshot), to_decimal(2.0));
    }

    #[test]
    fn test_max_discount_cap() {
        let snapshot = OrderSnapshot::new(vec![OrderLine::new(1, 10, 2, 100.0)]);
        let mut campaign = make_campaign(CampaignKind::Percentage, 50.0, None);
        campaign.base_mut().max_discount_amount = Some(30.0);
        assert_eq!(value_for(&campaign, &snapshot), to_decimal(30.0));
    }

    #[test]
    fn test_amount_clamped_to_order_basis() {
        // Running remainder smaller than the eligible total
        let snapshot = OrderSnapshot::new(vec![OrderLine::new(1, 10, 1, 100.0)]);
        let campaign = make_campaign(CampaignKind::FixedAmount, 80.0, None);
        let eligible = eligible_lines(&snapshot.lines, campaign.base());
        let total = eligible_total(&eligible);
        let amount = calculate_value(&campaign, &snapshot, &eligible, total, to_decimal(25.0));
        assert_eq!(amount, to_decimal(25.0));
    }
}
