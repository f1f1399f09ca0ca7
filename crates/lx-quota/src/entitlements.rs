use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::clock::Clock;
use crate::error::QuotaError;
use crate::plans::{Benefits, Plan, FREE_DAILY_LIMIT};
use crate::store::KvStore;

pub const ENTITLEMENT_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementRecord {
    pub plan: Plan,
    pub benefits: Benefits,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl EntitlementRecord {
    /// What a client with no stored record is entitled to.
    pub fn free(now: DateTime<Utc>) -> Self {
        Self {
            plan: Plan::Free,
            benefits: Plan::Free.benefits(),
            activated_at: None,
            created_at: Some(now),
        }
    }

    pub fn activated(plan: Plan, now: DateTime<Utc>) -> Self {
        Self {
            plan,
            benefits: plan.benefits(),
            activated_at: Some(now),
            created_at: None,
        }
    }

    /// Metered actions allowed per UTC day. Free clients always get the
    /// free-tier constant regardless of what the stored benefits say.
    pub fn daily_limit(&self) -> u32 {
        match self.plan {
            Plan::Free => FREE_DAILY_LIMIT,
            _ => self.benefits.ai_daily_free,
        }
    }
}

pub fn entitlement_key(client_id: &str) -> String {
    format!("entitlements:{}", client_id)
}

pub struct EntitlementStore {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
}

impl EntitlementStore {
    pub fn new(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn get(&self, client_id: &str) -> Result<EntitlementRecord, QuotaError> {
        let key = entitlement_key(client_id);
        match self.store.get(&key)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|source| {
                tracing::warn!(key = %key, "Stored entitlement record failed to decode");
                QuotaError::CorruptRecord { key, source }
            }),
            None => Ok(EntitlementRecord::free(self.clock.now())),
        }
    }

    /// Whole-record overwrite; last write wins.
    pub fn set(&self, client_id: &str, record: &EntitlementRecord) -> Result<(), QuotaError> {
        let raw = serde_json::to_string(record).map_err(anyhow::Error::from)?;
        self.store
            .put(&entitlement_key(client_id), &raw, Some(ENTITLEMENT_TTL))?;
        Ok(())
    }

    /// Grant the plan named by `plan_id`. Unknown identifiers leave the
    /// stored record untouched.
    pub fn activate(
        &self,
        client_id: &str,
        plan_id: &str,
    ) -> Result<EntitlementRecord, QuotaError> {
        let plan = Plan::from_plan_id(plan_id)
            .ok_or_else(|| QuotaError::InvalidPlan(plan_id.to_string()))?;
        let record = EntitlementRecord::activated(plan, self.clock.now());
        self.set(client_id, &record)?;
        tracing::info!(client_id = %client_id, plan = %plan, "Plan activated");
        Ok(record)
    }
}
