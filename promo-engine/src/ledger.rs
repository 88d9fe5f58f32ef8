//! Usage Ledger
//!
//! Commits redemptions after an order finalizes. Evaluation only performs
//! an advisory limit check; the authoritative decision happens here through
//! the store's atomic conditional increment, so two orders racing for the
//! last slot of a campaign resolve to exactly one winner.

use crate::store::{CampaignStore, StoreError};
use shared::order::DiscountResult;
use std::sync::Arc;
use thiserror::Error;

/// Commit-time failures
#[derive(Debug, Error)]
pub enum UsageError {
    /// The campaign ran out of uses between evaluation and commit
    #[error("Usage limit reached for campaign {campaign_id}")]
    Conflict { campaign_id: i64 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Records campaign redemptions against the store.
pub struct UsageLedger {
    store: Arc<dyn CampaignStore>,
}

impl UsageLedger {
    pub fn new(store: Arc<dyn CampaignStore>) -> Self {
        Self { store }
    }

    /// Commit every applied campaign of a finalized order.
    ///
    /// Increments fail closed: a `Conflict` is returned the moment one
    /// campaign has no remaining slot, and already-performed increments are
    /// left to the caller's surrounding transaction to unwind.
    pub async fn commit(
        &self,
        result: &DiscountResult,
        order_id: &str,
        customer_id: Option<i64>,
    ) -> Result<(), UsageError> {
        for applied in &result.applied {
            if !self.store.increment_usage_atomic(applied.campaign_id).await? {
                tracing::warn!(
                    campaign_id = applied.campaign_id,
                    order_id,
                    "usage limit reached between evaluation and commit"
                );
                return Err(UsageError::Conflict {
                    campaign_id: applied.campaign_id,
                });
            }
            self.store
                .record_customer_usage(applied.campaign_id, order_id, customer_id)
                .await?;
        }

        tracing::info!(
            order_id,
            campaigns = result.applied.len(),
            total_discount = result.total_discount,
            "campaign usage committed"
        );
        Ok(())
    }
}
