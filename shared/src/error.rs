//! Domain error types for campaign evaluation
//!
//! Evaluation failures are values, never panics, so UI layers can match on
//! the kind and localize the message. Failures for an explicitly supplied
//! code are surfaced to the user; failures of automatic promotions are
//! silent exclusions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a campaign cannot be applied to an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PricingError {
    /// Supplied code does not match any active campaign
    #[error("code '{code}' is not valid")]
    InvalidCode { code: String },

    /// Campaign validity window has not started
    #[error("campaign is not active yet")]
    NotYetActive,

    /// Campaign validity window has passed (or campaign was disabled)
    #[error("campaign has expired")]
    Expired,

    /// Global redemption cap reached
    #[error("campaign usage limit reached")]
    UsageLimitExceeded,

    /// Per-customer redemption cap reached
    #[error("per-customer usage limit reached")]
    PerCustomerLimitExceeded,

    /// Order subtotal below the campaign minimum
    #[error("minimum order amount of {required} not met")]
    MinimumOrderNotMet { required: f64 },

    /// Order subtotal above the campaign maximum
    #[error("order amount exceeds campaign maximum of {limit}")]
    MaximumOrderExceeded { limit: f64 },

    /// Outside the campaign's day-of-week or time-of-day window
    #[error("campaign is not active at this time")]
    OutsideActiveHours,

    /// Customer does not match the campaign's segment
    #[error("customer is not eligible for this campaign")]
    CustomerNotEligible,

    /// Scope filter leaves no eligible lines (or zero eligible value)
    #[error("no items in the order are eligible")]
    NoEligibleItems,

    /// Campaign store failure during evaluation
    #[error("storage failure: {message}")]
    Storage { message: String },
}

/// Result type for evaluation operations
pub type PricingResult<T> = Result<T, PricingError>;
