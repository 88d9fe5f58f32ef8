//! Stacking Resolver
//!
//! Decides how matched campaigns combine on one order. Promotions apply in
//! priority order against a running remainder; explicitly supplied codes are
//! valued against the original subtotal and appended afterwards. The final
//! totals never exceed the subtotal or go negative.

use crate::calculator::calculate_value;
use crate::matcher::{eligible_lines, eligible_total};
use crate::money::{to_decimal, to_f64};
use rust_decimal::Decimal;
use shared::models::{Campaign, CampaignKind};
use shared::order::{AppliedCampaign, CodeRejection, DiscountResult, OrderSnapshot};

/// Combine matched promotions and validated code campaigns into a result.
///
/// `promotions` must already have passed the restriction matcher;
/// `code_campaigns` holds the campaigns behind supplied codes (coupon first,
/// then discount), also pre-validated. `rejections` carries codes that
/// failed validation and is passed through untouched.
pub fn resolve(
    snapshot: &OrderSnapshot,
    mut promotions: Vec<Campaign>,
    code_campaigns: Vec<Campaign>,
    rejections: Vec<CodeRejection>,
) -> DiscountResult {
    let subtotal = to_decimal(snapshot.subtotal);
    let mut applied: Vec<AppliedCampaign> = Vec::new();
    let mut remaining = subtotal;

    // A non-combinable code claims the whole order for itself
    let exclusive_code = code_campaigns.iter().any(|c| !c.base().combinable);

    // Highest priority first; id breaks ties for determinism
    promotions.sort_by(|a, b| {
        b.priority()
            .cmp(&a.priority())
            .then_with(|| a.id().cmp(&b.id()))
    });

    if !exclusive_code {
        for promotion in &promotions {
            if !promotion.base().combinable && !applied.is_empty() {
                tracing::debug!(
                    campaign_id = promotion.id(),
                    "skipping non-combinable promotion, order already discounted"
                );
                continue;
            }

            let amount = apply_one(promotion, snapshot, remaining);
            if amount > Decimal::ZERO || promotion.base().kind == CampaignKind::FreeShipping {
                applied.push(AppliedCampaign::from_campaign(promotion, to_f64(amount)));
                remaining -= amount;
            }

            // An applied non-combinable promotion ends the stack
            if !promotion.base().combinable && !applied.is_empty() {
                break;
            }
            if remaining <= Decimal::ZERO {
                break;
            }
        }
    } else if !promotions.is_empty() {
        tracing::debug!(
            count = promotions.len(),
            "non-combinable code supplied, promotions suppressed"
        );
    }

    for campaign in &code_campaigns {
        if !campaign.base().combinable && !applied.is_empty() {
            // Exclusive code on an already-discounted order: promotions were
            // suppressed above, so this only trips when two codes collide
            continue;
        }
        // Codes are valued against the original subtotal, not the remainder
        let amount = apply_one(campaign, snapshot, subtotal);
        if amount > Decimal::ZERO || campaign.base().kind == CampaignKind::FreeShipping {
            applied.push(AppliedCampaign::from_campaign(campaign, to_f64(amount)));
        }
    }

    let raw_total: Decimal = applied.iter().map(|a| to_decimal(a.amount)).sum();
    let total_discount = raw_total.min(subtotal).max(Decimal::ZERO);
    let final_total = (subtotal - total_discount).max(Decimal::ZERO);

    DiscountResult {
        applied,
        rejections,
        subtotal: snapshot.subtotal,
        total_discount: to_f64(total_discount),
        final_total: to_f64(final_total),
    }
}

fn apply_one(campaign: &Campaign, snapshot: &OrderSnapshot, order_basis: Decimal) -> Decimal {
    let eligible = eligible_lines(&snapshot.lines, campaign.base());
    let total = eligible_total(&eligible);
    calculate_value(campaign, snapshot, &eligible, total, order_basis)
}
