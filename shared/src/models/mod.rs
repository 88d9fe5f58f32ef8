//! Domain models

pub mod campaign;
pub mod customer;

pub use campaign::{
    AppliesTo, BundleComponent, Campaign, CampaignBase, CampaignCreate, CampaignKind,
    CampaignRules, CampaignType, CampaignUpdate, Condition, ConditionField, ConditionOp, Coupon,
    CustomerSegment, Discount, Promotion,
};
pub use customer::{CustomerProfile, CustomerTier};
