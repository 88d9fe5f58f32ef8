//! Campaign Restriction Matcher
//!
//! Decides whether a single campaign is applicable to an order snapshot.
//! Pure: the per-customer redemption count is fetched by the orchestrator
//! and passed in, so these checks never touch the store.
//!
//! Each failed check carries the error kind a user-facing flow would show;
//! automatic-promotion callers simply drop the campaign on any `Err`.

use crate::money::to_decimal;
use chrono::{DateTime, Datelike, NaiveTime, Timelike, Utc, Weekday};
use rust_decimal::Decimal;
use shared::error::{PricingError, PricingResult};
use shared::models::{AppliesTo, Campaign, CampaignBase, CustomerProfile, CustomerSegment};
use shared::order::{OrderLine, OrderSnapshot};

/// Run all restriction checks for one campaign
pub fn check_applicable(
    campaign: &Campaign,
    snapshot: &OrderSnapshot,
    customer: Option<&CustomerProfile>,
    prior_customer_uses: Option<i32>,
    now: DateTime<Utc>,
) -> PricingResult<()> {
    let base = campaign.base();

    // Store queries pre-filter inactive rows; a disabled campaign that
    // slips through is treated like an expired one.
    if !base.is_active {
        return Err(PricingError::Expired);
    }

    let now_ms = now.timestamp_millis();
    if now_ms < base.valid_from {
        return Err(PricingError::NotYetActive);
    }
    if now_ms > base.valid_until {
        return Err(PricingError::Expired);
    }

    // Advisory only; the commit-time conditional update is authoritative
    if !campaign.has_remaining_uses() {
        return Err(PricingError::UsageLimitExceeded);
    }

    if let (Some(limit), Some(uses)) = (campaign.per_customer_limit(), prior_customer_uses)
        && customer.is_some()
        && uses >= limit
    {
        return Err(PricingError::PerCustomerLimitExceeded);
    }

    let subtotal = to_decimal(snapshot.subtotal);
    if let Some(min) = base.min_order_amount
        && subtotal < to_decimal(min)
    {
        return Err(PricingError::MinimumOrderNotMet { required: min });
    }
    if let Some(max) = base.max_order_amount
        && subtotal > to_decimal(max)
    {
        return Err(PricingError::MaximumOrderExceeded { limit: max });
    }

    if !base.days_of_week.is_empty() && !base.days_of_week.contains(&weekday_index(now)) {
        return Err(PricingError::OutsideActiveHours);
    }
    if !is_time_of_day_ok(base, now) {
        return Err(PricingError::OutsideActiveHours);
    }

    check_segment(base.customer_segment, customer)?;

    let eligible = eligible_lines(&snapshot.lines, base);
    if eligible.is_empty() || eligible_total(&eligible) <= Decimal::ZERO {
        return Err(PricingError::NoEligibleItems);
    }

    Ok(())
}

/// Select the order lines a campaign's scope covers.
///
/// Exclusions apply first; the include filter then keys on product or
/// category depending on `applies_to`.
pub fn eligible_lines<'a>(lines: &'a [OrderLine], base: &CampaignBase) -> Vec<&'a OrderLine> {
    lines
        .iter()
        .filter(|line| !base.excluded_ids.contains(&line.product_id))
        .filter(|line| match base.applies_to {
            AppliesTo::All => true,
            AppliesTo::Products => base.included_ids.contains(&line.product_id),
            AppliesTo::Categories => base.included_ids.contains(&line.category_id),
        })
        .collect()
}

/// Summed value of the eligible lines
pub fn eligible_total(lines: &[&OrderLine]) -> Decimal {
    lines
        .iter()
        .map(|line| to_decimal(line.unit_price) * Decimal::from(line.quantity))
        .sum()
}

/// Day of week as 0=Sunday..6=Saturday
fn weekday_index(now: DateTime<Utc>) -> u8 {
    match now.weekday() {
        Weekday::Sun => 0,
        Weekday::Mon => 1,
        Weekday::Tue => 2,
        Weekday::Wed => 3,
        Weekday::Thu => 4,
        Weekday::Fri => 5,
        Weekday::Sat => 6,
    }
}

/// Check the time-of-day window, if configured.
///
/// Ranges where start > end wrap past midnight (e.g. 22:00-02:00).
/// A malformed window is ignored rather than blocking the campaign.
fn is_time_of_day_ok(base: &CampaignBase, now: DateTime<Utc>) -> bool {
    let (Some(from), Some(until)) = (&base.time_from, &base.time_until) else {
        return true;
    };
    let (Ok(from), Ok(until)) = (
        NaiveTime::parse_from_str(from, "%H:%M"),
        NaiveTime::parse_from_str(until, "%H:%M"),
    ) else {
        tracing::warn!(
            campaign_id = base.id,
            "malformed time window, skipping time-of-day check"
        );
        return true;
    };

    let current = NaiveTime::from_hms_opt(now.hour(), now.minute(), 0).unwrap_or_default();

    if from <= until {
        current >= from && current <= until
    } else {
        // Overnight
        current >= from || current <= until
    }
}

fn check_segment(
    segment: CustomerSegment,
    customer: Option<&CustomerProfile>,
) -> PricingResult<()> {
    let matches = match segment {
        CustomerSegment::All => true,
        CustomerSegment::New => customer.is_some_and(|c| c.is_new),
        CustomerSegment::Returning => customer.is_some_and(|c| c.is_returning),
        CustomerSegment::Vip => customer.is_some_and(|c| c.is_vip()),
    };
    if matches {
        Ok(())
    } else {
        Err(PricingError::CustomerNotEligible)
    }
}
