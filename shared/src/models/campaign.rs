//! Campaign Model
//!
//! A campaign is a coupon, a discount code, or an automatic promotion.
//! The three share the same core record (`CampaignBase`); the variants add
//! the fields only that family carries (per-customer cap for coupons,
//! stacking priority for promotions).
//!
//! Restriction lists arrive as typed sets, decoded once at load time; the
//! calculation path never mutates a campaign (`used_count` is owned by the
//! usage ledger).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use validator::Validate;

/// Campaign family (which table/code path a record belongs to)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignType {
    Coupon,
    Discount,
    Promotion,
}

/// Discount formula selector
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignKind {
    Percentage,
    FixedAmount,
    FreeShipping,
    BuyXGetY,
    Bundle,
    TimeBased,
    Conditional,
}

/// Which order lines a campaign covers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppliesTo {
    #[default]
    All,
    Products,
    Categories,
}

/// Customer segment restriction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerSegment {
    #[default]
    All,
    New,
    Returning,
    Vip,
}

/// Predicate input for conditional campaigns
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionField {
    OrderTotal,
    ItemQuantity,
    CategoryTotal,
}

/// Comparison operator for conditional campaigns
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionOp {
    Gte,
    Gt,
    Lte,
    Lt,
    Eq,
    Ne,
}

/// A single predicate of a conditional campaign
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Condition {
    pub field: ConditionField,
    pub op: ConditionOp,
    pub value: f64,
    /// Required when `field` is `CategoryTotal`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
}

/// One component of a bundle (product + required quantity)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BundleComponent {
    pub product_id: i64,
    pub required_qty: i32,
}

/// Structured parameters for the non-trivial campaign kinds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "rule", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignRules {
    /// Buy `required_qty` of the target product, get `free_qty` free
    BuyXGetY {
        free_item_id: i64,
        required_qty: i32,
        free_qty: i32,
    },
    /// Fixed-price combination replacing individual component prices
    Bundle {
        components: Vec<BundleComponent>,
        bundle_price: f64,
    },
    /// Percentage or fixed amount against the whole order total
    TimeBased {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        discount_percentage: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        discount_amount: Option<f64>,
    },
    /// Nested percentage/fixed discount gated on an ordered predicate list
    Conditional {
        conditions: Vec<Condition>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        discount_percentage: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        discount_amount: Option<f64>,
    },
}

fn default_true() -> bool {
    true
}

fn default_per_customer_limit() -> i32 {
    1
}

/// Core campaign record shared by all three families
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CampaignBase {
    pub id: i64,
    /// Redemption code; None for automatic promotions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_name: Option<String>,
    pub is_active: bool,
    pub kind: CampaignKind,
    /// Percentage (10 = 10%) or fixed amount, depending on `kind`
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_order_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_order_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_discount_amount: Option<f64>,
    /// Validity window start (Unix millis, closed interval)
    pub valid_from: i64,
    /// Validity window end (Unix millis, closed interval)
    pub valid_until: i64,
    /// Global redemption cap; None = unlimited
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_limit: Option<i32>,
    /// Owned exclusively by the usage ledger
    #[serde(default)]
    pub used_count: i32,
    #[serde(default)]
    pub applies_to: AppliesTo,
    #[serde(default)]
    pub included_ids: HashSet<i64>,
    #[serde(default)]
    pub excluded_ids: HashSet<i64>,
    /// Active days of week (0=Sunday..6=Saturday); empty = unrestricted
    #[serde(default)]
    pub days_of_week: Vec<u8>,
    /// Active start time ("HH:MM")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_from: Option<String>,
    /// Active end time ("HH:MM"); ranges may wrap past midnight
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_until: Option<String>,
    #[serde(default)]
    pub customer_segment: CustomerSegment,
    /// Whether this campaign stacks with others
    #[serde(default = "default_true")]
    pub combinable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<CampaignRules>,
    pub created_at: i64,
}

/// Coupon: code-redeemed, per-customer capped
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Coupon {
    #[serde(flatten)]
    pub base: CampaignBase,
    #[serde(default = "default_per_customer_limit")]
    pub usage_limit_per_customer: i32,
}

/// Discount: code-redeemed, no per-customer cap
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Discount {
    #[serde(flatten)]
    pub base: CampaignBase,
}

/// Promotion: automatic, ordered by priority
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Promotion {
    #[serde(flatten)]
    pub base: CampaignBase,
    /// Higher evaluates/stacks first
    #[serde(default)]
    pub priority: i32,
}

/// Campaign entity (coupon, discount, or promotion)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "campaign_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Campaign {
    Coupon(Coupon),
    Discount(Discount),
    Promotion(Promotion),
}

impl Campaign {
    pub fn base(&self) -> &CampaignBase {
        match self {
            Campaign::Coupon(c) => &c.base,
            Campaign::Discount(d) => &d.base,
            Campaign::Promotion(p) => &p.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut CampaignBase {
        match self {
            Campaign::Coupon(c) => &mut c.base,
            Campaign::Discount(d) => &mut d.base,
            Campaign::Promotion(p) => &mut p.base,
        }
    }

    pub fn id(&self) -> i64 {
        self.base().id
    }

    pub fn code(&self) -> Option<&str> {
        self.base().code.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.base().name
    }

    pub fn kind(&self) -> CampaignKind {
        self.base().kind
    }

    pub fn campaign_type(&self) -> CampaignType {
        match self {
            Campaign::Coupon(_) => CampaignType::Coupon,
            Campaign::Discount(_) => CampaignType::Discount,
            Campaign::Promotion(_) => CampaignType::Promotion,
        }
    }

    /// Stacking priority (promotions only; coupons/discounts are 0)
    pub fn priority(&self) -> i32 {
        match self {
            Campaign::Promotion(p) => p.priority,
            _ => 0,
        }
    }

    /// Per-customer redemption cap (coupons only)
    pub fn per_customer_limit(&self) -> Option<i32> {
        match self {
            Campaign::Coupon(c) => Some(c.usage_limit_per_customer),
            _ => None,
        }
    }

    /// Advisory check: is there at least one redemption slot left?
    ///
    /// Non-atomic; re-checked by the conditional increment at commit time.
    pub fn has_remaining_uses(&self) -> bool {
        let base = self.base();
        match base.usage_limit {
            Some(limit) => base.used_count < limit,
            None => true,
        }
    }
}

/// Create campaign payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CampaignCreate {
    pub campaign_type: CampaignType,
    #[validate(length(min = 3, max = 32))]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub receipt_name: Option<String>,
    pub kind: CampaignKind,
    #[validate(range(min = 0.0))]
    pub value: f64,
    #[validate(range(min = 0.0))]
    pub min_order_amount: Option<f64>,
    #[validate(range(min = 0.0))]
    pub max_order_amount: Option<f64>,
    #[validate(range(min = 0.0))]
    pub max_discount_amount: Option<f64>,
    pub valid_from: i64,
    pub valid_until: i64,
    #[validate(range(min = 0))]
    pub usage_limit: Option<i32>,
    #[validate(range(min = 1))]
    pub usage_limit_per_customer: Option<i32>,
    pub applies_to: Option<AppliesTo>,
    pub included_ids: Option<HashSet<i64>>,
    pub excluded_ids: Option<HashSet<i64>>,
    pub days_of_week: Option<Vec<u8>>,
    pub time_from: Option<String>,
    pub time_until: Option<String>,
    pub customer_segment: Option<CustomerSegment>,
    pub combinable: Option<bool>,
    pub priority: Option<i32>,
    pub rules: Option<CampaignRules>,
}

/// Update campaign payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CampaignUpdate {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    pub receipt_name: Option<String>,
    #[validate(range(min = 0.0))]
    pub value: Option<f64>,
    #[validate(range(min = 0.0))]
    pub min_order_amount: Option<f64>,
    #[validate(range(min = 0.0))]
    pub max_order_amount: Option<f64>,
    #[validate(range(min = 0.0))]
    pub max_discount_amount: Option<f64>,
    pub valid_from: Option<i64>,
    pub valid_until: Option<i64>,
    #[validate(range(min = 0))]
    pub usage_limit: Option<i32>,
    pub days_of_week: Option<Vec<u8>>,
    pub time_from: Option<String>,
    pub time_until: Option<String>,
    pub customer_segment: Option<CustomerSegment>,
    pub combinable: Option<bool>,
    pub is_active: Option<bool>,
    pub rules: Option<CampaignRules>,
}
