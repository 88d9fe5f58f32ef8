//! Customer Profile
//!
//! Input attributes only: loyalty accrual/redemption lives elsewhere, the
//! engine just consumes the tier and history flags for segment checks.

use serde::{Deserialize, Serialize};

/// Loyalty tier flag consumed by the VIP segment check
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerTier {
    #[default]
    Regular,
    Vip,
}

/// Customer attributes relevant to campaign restrictions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerProfile {
    pub id: i64,
    #[serde(default)]
    pub tier: CustomerTier,
    /// Zero prior completed orders
    #[serde(default)]
    pub is_new: bool,
    /// At least one prior completed order
    #[serde(default)]
    pub is_returning: bool,
}

impl CustomerProfile {
    pub fn is_vip(&self) -> bool {
        self.tier == CustomerTier::Vip
    }
}
