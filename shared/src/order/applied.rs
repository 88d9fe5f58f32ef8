//! Applied Campaign - tracks which campaigns were applied to an order

use crate::error::PricingError;
use crate::models::campaign::{Campaign, CampaignKind, CampaignType};
use serde::{Deserialize, Serialize};

/// One campaign that contributed to the order discount
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppliedCampaign {
    // === Campaign Identity ===
    pub campaign_id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_name: Option<String>,

    // === Campaign Type ===
    pub campaign_type: CampaignType,
    pub kind: CampaignKind,

    // === Calculation Info ===
    /// Original value (10 = 10% or a fixed amount)
    pub value: f64,
    /// Calculated discount amount (0 for free-shipping eligibility)
    pub amount: f64,
}

impl AppliedCampaign {
    /// Create from a Campaign with a calculated amount
    pub fn from_campaign(campaign: &Campaign, amount: f64) -> Self {
        let base = campaign.base();
        Self {
            campaign_id: base.id,
            name: base.name.clone(),
            receipt_name: base.receipt_name.clone(),
            campaign_type: campaign.campaign_type(),
            kind: base.kind,
            value: base.value,
            amount,
        }
    }
}

/// An explicitly supplied code that could not be applied
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CodeRejection {
    pub code: String,
    pub reason: PricingError,
}

/// Outcome of evaluating all campaigns against one order snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscountResult {
    /// Applied campaigns, in application order (promotions, then codes)
    pub applied: Vec<AppliedCampaign>,
    /// Supplied codes that failed evaluation (surfaced to the user;
    /// promotions are unaffected)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rejections: Vec<CodeRejection>,
    pub subtotal: f64,
    /// Sum of applied amounts, capped at the subtotal
    pub total_discount: f64,
    /// max(0, subtotal - total_discount)
    pub final_total: f64,
}

impl DiscountResult {
    /// A result with no applicable campaigns
    pub fn empty(subtotal: f64) -> Self {
        Self {
            applied: vec![],
            rejections: vec![],
            subtotal,
            total_discount: 0.0,
            final_total: subtotal,
        }
    }
}
