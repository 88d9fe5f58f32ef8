//! In-memory campaign store
//!
//! Backs tests and embedded deployments without a database. The conditional
//! usage increment runs under the map's shard lock, so two racing commits
//! on a campaign with one remaining slot resolve first-committed-wins.

use super::{CampaignStore, StoreError, StoreResult};
use crate::codegen;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use shared::models::{
    Campaign, CampaignBase, CampaignCreate, CampaignType, CampaignUpdate, Coupon, Discount,
    Promotion,
};
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};
use validator::Validate;

/// Append-only customer-usage row
#[derive(Debug, Clone, PartialEq)]
pub struct UsageRecord {
    pub campaign_id: i64,
    pub order_id: String,
    pub customer_id: Option<i64>,
    pub redeemed_at: i64,
}

/// Campaign store backed by a concurrent map
#[derive(Default)]
pub struct MemoryCampaignStore {
    campaigns: DashMap<i64, Campaign>,
    customer_usage: DashMap<(i64, i64), i32>,
    usage_log: Mutex<Vec<UsageRecord>>,
    next_id: AtomicI64,
}

impl MemoryCampaignStore {
    pub fn new() -> Self {
        Self {
            campaigns: DashMap::new(),
            customer_usage: DashMap::new(),
            usage_log: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Insert a fully-formed campaign (test fixtures, migrations)
    pub fn insert(&self, campaign: Campaign) {
        let id = campaign.id();
        self.bump_next_id(id);
        self.campaigns.insert(id, campaign);
    }

    fn bump_next_id(&self, seen: i64) {
        self.next_id.fetch_max(seen + 1, Ordering::Relaxed);
    }

    fn code_taken(&self, code: &str) -> bool {
        self.campaigns.iter().any(|entry| {
            entry
                .value()
                .code()
                .is_some_and(|c| c.eq_ignore_ascii_case(code))
        })
    }

    /// Create a campaign from an admin payload
    pub fn create(&self, data: CampaignCreate) -> StoreResult<Campaign> {
        data.validate()?;

        // Coupons and discounts are code-redeemed
        if data.code.is_none() && data.campaign_type != CampaignType::Promotion {
            return Err(StoreError::Validation(
                "coupon/discount campaigns require a code".to_string(),
            ));
        }
        if let Some(ref code) = data.code
            && self.code_taken(code)
        {
            return Err(StoreError::Duplicate(format!(
                "campaign code '{}' already exists",
                code
            )));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let base = CampaignBase {
            id,
            code: data.code.map(|c| c.to_ascii_uppercase()),
            name: data.name,
            receipt_name: data.receipt_name,
            is_active: true,
            kind: data.kind,
            value: data.value,
            min_order_amount: data.min_order_amount,
            max_order_amount: data.max_order_amount,
            max_discount_amount: data.max_discount_amount,
            valid_from: data.valid_from,
            valid_until: data.valid_until,
            usage_limit: data.usage_limit,
            used_count: 0,
            applies_to: data.applies_to.unwrap_or_default(),
            included_ids: data.included_ids.unwrap_or_default(),
            excluded_ids: data.excluded_ids.unwrap_or_default(),
            days_of_week: data.days_of_week.unwrap_or_default(),
            time_from: data.time_from,
            time_until: data.time_until,
            customer_segment: data.customer_segment.unwrap_or_default(),
            combinable: data.combinable.unwrap_or(true),
            rules: data.rules,
            created_at: Utc::now().timestamp_millis(),
        };

        let campaign = match data.campaign_type {
            CampaignType::Coupon => Campaign::Coupon(Coupon {
                base,
                usage_limit_per_customer: data.usage_limit_per_customer.unwrap_or(1),
            }),
            CampaignType::Discount => Campaign::Discount(Discount { base }),
            CampaignType::Promotion => Campaign::Promotion(Promotion {
                base,
                priority: data.priority.unwrap_or(0),
            }),
        };

        self.campaigns.insert(id, campaign.clone());
        Ok(campaign)
    }

    /// Update mutable campaign fields
    pub fn update(&self, id: i64, data: CampaignUpdate) -> StoreResult<Campaign> {
        data.validate()?;

        let mut entry = self
            .campaigns
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("campaign {} not found", id)))?;
        let base = entry.base_mut();

        if let Some(name) = data.name {
            base.name = name;
        }
        if let Some(receipt_name) = data.receipt_name {
            base.receipt_name = Some(receipt_name);
        }
        if let Some(value) = data.value {
            base.value = value;
        }
        if let Some(v) = data.min_order_amount {
            base.min_order_amount = Some(v);
        }
        if let Some(v) = data.max_order_amount {
            base.max_order_amount = Some(v);
        }
        if let Some(v) = data.max_discount_amount {
            base.max_discount_amount = Some(v);
        }
        if let Some(v) = data.valid_from {
            base.valid_from = v;
        }
        if let Some(v) = data.valid_until {
            base.valid_until = v;
        }
        if let Some(v) = data.usage_limit {
            base.usage_limit = Some(v);
        }
        if let Some(v) = data.days_of_week {
            base.days_of_week = v;
        }
        if let Some(v) = data.time_from {
            base.time_from = Some(v);
        }
        if let Some(v) = data.time_until {
            base.time_until = Some(v);
        }
        if let Some(v) = data.customer_segment {
            base.customer_segment = v;
        }
        if let Some(v) = data.combinable {
            base.combinable = v;
        }
        if let Some(v) = data.is_active {
            base.is_active = v;
        }
        if let Some(v) = data.rules {
            base.rules = Some(v);
        }

        Ok(entry.clone())
    }

    /// Toggle a campaign on or off (the safe retirement path)
    pub fn set_active(&self, id: i64, is_active: bool) -> StoreResult<()> {
        let mut entry = self
            .campaigns
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("campaign {} not found", id)))?;
        entry.base_mut().is_active = is_active;
        Ok(())
    }

    /// Hard delete. Refused once the campaign has been redeemed;
    /// use `set_active(id, false)` instead.
    pub fn delete(&self, id: i64) -> StoreResult<()> {
        let used = {
            let entry = self
                .campaigns
                .get(&id)
                .ok_or_else(|| StoreError::NotFound(format!("campaign {} not found", id)))?;
            entry.base().used_count
        };
        if used > 0 {
            return Err(StoreError::Validation(format!(
                "campaign {} has {} redemptions; disable it instead of deleting",
                id, used
            )));
        }
        self.campaigns.remove(&id);
        Ok(())
    }

    pub fn find_by_id(&self, id: i64) -> Option<Campaign> {
        self.campaigns.get(&id).map(|entry| entry.clone())
    }

    /// Allocate a unique redemption code with this store's code space
    pub async fn allocate_code(&self, prefix: &str) -> StoreResult<String> {
        codegen::allocate_code(prefix, codegen::DEFAULT_MAX_ATTEMPTS, |candidate| async move {
            Ok(self.code_taken(&candidate))
        })
        .await
    }

    /// Audit rows recorded so far (newest last)
    pub fn usage_records(&self) -> Vec<UsageRecord> {
        self.usage_log
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CampaignStore for MemoryCampaignStore {
    async fn find_active(
        &self,
        campaign_type: CampaignType,
        _as_of: DateTime<Utc>,
    ) -> StoreResult<Vec<Campaign>> {
        let mut campaigns: Vec<Campaign> = self
            .campaigns
            .iter()
            .filter(|entry| {
                let c = entry.value();
                c.campaign_type() == campaign_type && c.base().is_active
            })
            .map(|entry| entry.value().clone())
            .collect();
        // Stable order keeps evaluation deterministic
        campaigns.sort_by_key(Campaign::id);
        Ok(campaigns)
    }

    async fn count_customer_usage(&self, campaign_id: i64, customer_id: i64) -> StoreResult<i32> {
        Ok(self
            .customer_usage
            .get(&(campaign_id, customer_id))
            .map(|count| *count)
            .unwrap_or(0))
    }

    async fn increment_usage_atomic(&self, campaign_id: i64) -> StoreResult<bool> {
        // get_mut holds the shard lock for the whole check-and-increment
        let mut entry = self
            .campaigns
            .get_mut(&campaign_id)
            .ok_or_else(|| StoreError::NotFound(format!("campaign {} not found", campaign_id)))?;
        let base = entry.base_mut();
        match base.usage_limit {
            Some(limit) if base.used_count >= limit => Ok(false),
            _ => {
                base.used_count += 1;
                Ok(true)
            }
        }
    }

    async fn record_customer_usage(
        &self,
        campaign_id: i64,
        order_id: &str,
        customer_id: Option<i64>,
    ) -> StoreResult<()> {
        if let Some(customer_id) = customer_id {
            *self
                .customer_usage
                .entry((campaign_id, customer_id))
                .or_insert(0) += 1;
        }
        let record = UsageRecord {
            campaign_id,
            order_id: order_id.to_string(),
            customer_id,
            redeemed_at: Utc::now().timestamp_millis(),
        };
        self.usage_log
            .lock()
            .map_err(|_| StoreError::Storage("usage log poisoned".to_string()))?
            .push(record);
        Ok(())
    }
}
