use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::clock::Clock;
use crate::entitlements::EntitlementStore;
use crate::error::QuotaError;
use crate::store::KvStore;
use crate::usage::{self, usage_key, UsageLedger, UsageRecord, USAGE_TTL};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    QuotaExceeded,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConsumeOutcome {
    pub allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_today: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<DenyReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_limit: Option<u32>,
}

impl ConsumeOutcome {
    pub fn allowed(remaining_today: u32) -> Self {
        Self {
            allowed: true,
            remaining_today: Some(remaining_today),
            reason: None,
            free_limit: None,
        }
    }

    pub fn quota_exceeded(free_limit: u32) -> Self {
        Self {
            allowed: false,
            remaining_today: None,
            reason: Some(DenyReason::QuotaExceeded),
            free_limit: Some(free_limit),
        }
    }
}

/// Gates metered actions behind each client's daily allowance.
pub struct QuotaTracker {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    entitlements: EntitlementStore,
    usage: UsageLedger,
}

impl QuotaTracker {
    pub fn new(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            entitlements: EntitlementStore::new(store.clone(), clock.clone()),
            usage: UsageLedger::new(store.clone(), clock.clone()),
            store,
            clock,
        }
    }

    pub fn entitlements(&self) -> &EntitlementStore {
        &self.entitlements
    }

    pub fn usage(&self) -> &UsageLedger {
        &self.usage
    }

    /// Spend one metered action for `client_id` if today's allowance has
    /// room. The limit check and the increment happen inside a single store
    /// update, so concurrent calls cannot overshoot the limit.
    pub fn consume(&self, client_id: &str) -> Result<ConsumeOutcome, QuotaError> {
        let limit = self.entitlements.get(client_id)?.daily_limit();
        let today = self.clock.today();
        let key = usage_key(client_id, today);

        let mut outcome = None;
        self.store
            .update(&key, Some(USAGE_TTL), &mut |current| {
                let mut record = match current {
                    Some(raw) => usage::decode(&key, raw)?,
                    None => UsageRecord::empty(today),
                };
                if record.ai_used_today >= limit {
                    outcome = Some(ConsumeOutcome::quota_exceeded(limit));
                    return Ok(None);
                }
                record.ai_used_today += 1;
                outcome = Some(ConsumeOutcome::allowed(limit - record.ai_used_today));
                Ok(Some(serde_json::to_string(&record)?))
            })
            .map_err(QuotaError::from_store)?;

        let outcome = outcome
            .ok_or_else(|| QuotaError::Store(anyhow::anyhow!("usage update did not run")))?;
        tracing::debug!(
            client_id = %client_id,
            allowed = outcome.allowed,
            limit,
            "Consume decision"
        );
        Ok(outcome)
    }
}
