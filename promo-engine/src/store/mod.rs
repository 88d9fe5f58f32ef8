//! Campaign Store
//!
//! Persistence boundary of the engine. Evaluation only reads through this
//! interface; the usage ledger writes through it at commit time.

pub mod memory;

pub use memory::MemoryCampaignStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::models::{Campaign, CampaignType};
use thiserror::Error;

/// Store error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<validator::ValidationErrors> for StoreError {
    fn from(err: validator::ValidationErrors) -> Self {
        StoreError::Validation(err.to_string())
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Abstract campaign persistence used by the evaluation engine.
///
/// `used_count` is mutated exclusively through `increment_usage_atomic`;
/// the calculation path never writes.
#[async_trait]
pub trait CampaignStore: Send + Sync {
    /// Load active campaigns of one family.
    ///
    /// Implementations may prune records whose validity window ended long
    /// before `as_of`; the restriction matcher re-checks the exact window,
    /// so over-returning is always safe.
    async fn find_active(
        &self,
        campaign_type: CampaignType,
        as_of: DateTime<Utc>,
    ) -> StoreResult<Vec<Campaign>>;

    /// Prior redemptions of a campaign by one customer
    async fn count_customer_usage(&self, campaign_id: i64, customer_id: i64) -> StoreResult<i32>;

    /// Conditionally increment `used_count`.
    ///
    /// Must be atomic: the increment happens only while the usage limit is
    /// not reached, and the return value says whether it happened. Exactly
    /// one of two racing calls on a campaign with one remaining slot may
    /// return `true`.
    async fn increment_usage_atomic(&self, campaign_id: i64) -> StoreResult<bool>;

    /// Append one customer-usage row (audit trail + per-customer cap data)
    async fn record_customer_usage(
        &self,
        campaign_id: i64,
        order_id: &str,
        customer_id: Option<i64>,
    ) -> StoreResult<()>;
}
