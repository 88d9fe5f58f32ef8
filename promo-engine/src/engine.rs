//! Promotion Engine
//!
//! Orchestrates one evaluation pass: load candidates from the store, run
//! the restriction matcher, resolve stacking, and report totals. Evaluation
//! is pure with respect to state; nothing is written until `commit_usage`.

use crate::ledger::{UsageError, UsageLedger};
use crate::matcher::check_applicable;
use crate::stacking;
use crate::store::{CampaignStore, StoreResult};
use chrono::{DateTime, Utc};
use shared::models::{Campaign, CampaignType, CustomerProfile};
use shared::order::{CodeRejection, DiscountResult, OrderSnapshot};
use shared::{PricingError, PricingResult};
use std::sync::Arc;

pub struct PromoEngine {
    store: Arc<dyn CampaignStore>,
    ledger: UsageLedger,
}

impl PromoEngine {
    pub fn new(store: Arc<dyn CampaignStore>) -> Self {
        let ledger = UsageLedger::new(store.clone());
        Self { store, ledger }
    }

    /// Evaluate every applicable campaign against one order snapshot.
    ///
    /// Automatic promotions that fail a restriction are silently filtered;
    /// explicitly supplied codes that fail surface as rejections on the
    /// result. The `Err` arm is reserved for storage failures. Calling this
    /// repeatedly with the same inputs yields the same result.
    pub async fn evaluate(
        &self,
        snapshot: &OrderSnapshot,
        coupon_code: Option<&str>,
        discount_code: Option<&str>,
        customer: Option<&CustomerProfile>,
        now: DateTime<Utc>,
    ) -> Result<DiscountResult, PricingError> {
        if snapshot.is_empty() {
            return Ok(DiscountResult::empty(snapshot.subtotal));
        }

        let promotions = self.matched_promotions(snapshot, customer, now).await?;

        let mut code_campaigns = Vec::new();
        let mut rejections = Vec::new();
        // Coupon before discount, matching application order
        let requested = [
            (coupon_code, CampaignType::Coupon),
            (discount_code, CampaignType::Discount),
        ];
        for (code, campaign_type) in requested {
            let Some(code) = code else { continue };
            match self.resolve_code(code, campaign_type, snapshot, customer, now).await? {
                Ok(campaign) => code_campaigns.push(campaign),
                Err(reason) => rejections.push(CodeRejection {
                    code: code.to_string(),
                    reason,
                }),
            }
        }

        let result = stacking::resolve(snapshot, promotions, code_campaigns, rejections);
        tracing::debug!(
            subtotal = result.subtotal,
            total_discount = result.total_discount,
            applied = result.applied.len(),
            rejected = result.rejections.len(),
            "order evaluated"
        );
        Ok(result)
    }

    /// Check one code without evaluating the whole order.
    ///
    /// Returns the campaign behind the code, or the restriction error a
    /// full evaluation would report as a rejection.
    pub async fn validate_code(
        &self,
        code: &str,
        campaign_type: CampaignType,
        snapshot: &OrderSnapshot,
        customer: Option<&CustomerProfile>,
        now: DateTime<Utc>,
    ) -> Result<Campaign, PricingError> {
        self.resolve_code(code, campaign_type, snapshot, customer, now)
            .await?
    }

    /// Record redemptions for a finalized order. See [`UsageLedger::commit`].
    pub async fn commit_usage(
        &self,
        result: &DiscountResult,
        order_id: &str,
        customer_id: Option<i64>,
    ) -> Result<(), UsageError> {
        self.ledger.commit(result, order_id, customer_id).await
    }

    /// Load active promotions and keep those passing every restriction
    async fn matched_promotions(
        &self,
        snapshot: &OrderSnapshot,
        customer: Option<&CustomerProfile>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Campaign>, PricingError> {
        let candidates = map_store(self.store.find_active(CampaignType::Promotion, now).await)?;

        let mut matched = Vec::with_capacity(candidates.len());
        for campaign in candidates {
            match check_applicable(&campaign, snapshot, customer, None, now) {
                Ok(()) => matched.push(campaign),
                Err(reason) => {
                    tracing::debug!(
                        campaign_id = campaign.id(),
                        %reason,
                        "promotion filtered"
                    );
                }
            }
        }
        Ok(matched)
    }

    /// Look the code up and run the restriction matcher on its campaign.
    ///
    /// Outer error is a storage failure; the inner result carries the
    /// per-code outcome.
    async fn resolve_code(
        &self,
        code: &str,
        campaign_type: CampaignType,
        snapshot: &OrderSnapshot,
        customer: Option<&CustomerProfile>,
        now: DateTime<Utc>,
    ) -> Result<PricingResult<Campaign>, PricingError> {
        let candidates = map_store(self.store.find_active(campaign_type, now).await)?;
        let Some(campaign) = candidates
            .into_iter()
            .find(|c| c.code().is_some_and(|c| c.eq_ignore_ascii_case(code)))
        else {
            return Ok(Err(PricingError::InvalidCode {
                code: code.to_string(),
            }));
        };

        let prior_uses = match (campaign.per_customer_limit(), customer) {
            (Some(_), Some(profile)) => Some(map_store(
                self.store
                    .count_customer_usage(campaign.id(), profile.id)
                    .await,
            )?),
            _ => None,
        };

        match check_applicable(&campaign, snapshot, customer, prior_uses, now) {
            Ok(()) => Ok(Ok(campaign)),
            Err(reason) => Ok(Err(reason)),
        }
    }
}

fn map_store<T>(result: StoreResult<T>) -> Result<T, PricingError> {
    result.map_err(|err| PricingError::Storage {
        message: err.to_string(),
    })
}
