use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::clock::Clock;
use crate::error::QuotaError;
use crate::store::KvStore;

/// Usage records outlive their day just long enough to be inspected.
pub const USAGE_TTL: Duration = Duration::from_secs(3 * 24 * 60 * 60);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    pub date: NaiveDate,
    pub ai_used_today: u32,
}

impl UsageRecord {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            ai_used_today: 0,
        }
    }
}

pub fn usage_key(client_id: &str, date: NaiveDate) -> String {
    format!("usage:{}:{}", client_id, date.format("%Y-%m-%d"))
}

pub(crate) fn decode(key: &str, raw: &str) -> Result<UsageRecord, QuotaError> {
    serde_json::from_str(raw).map_err(|source| QuotaError::CorruptRecord {
        key: key.to_string(),
        source,
    })
}

pub struct UsageLedger {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
}

impl UsageLedger {
    pub fn new(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Today's (UTC) record, or a zeroed one if nothing was consumed yet.
    pub fn get(&self, client_id: &str) -> Result<UsageRecord, QuotaError> {
        let today = self.clock.today();
        let key = usage_key(client_id, today);
        match self.store.get(&key)? {
            Some(raw) => decode(&key, &raw),
            None => Ok(UsageRecord::empty(today)),
        }
    }

    /// Persist under the record's own date, which the caller keeps
    /// consistent with the day it describes.
    pub fn set(&self, client_id: &str, record: &UsageRecord) -> Result<(), QuotaError> {
        let raw = serde_json::to_string(record).map_err(anyhow::Error::from)?;
        self.store
            .put(&usage_key(client_id, record.date), &raw, Some(USAGE_TTL))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::SqliteKvStore;
    use chrono::{TimeZone, Utc};

    fn setup() -> (Arc<ManualClock>, UsageLedger) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 7, 4, 8, 30, 0).unwrap(),
        ));
        let store = Arc::new(SqliteKvStore::in_memory(clock.clone()).unwrap());
        (clock.clone(), UsageLedger::new(store, clock))
    }

    #[test]
    fn key_format() {
        let date = NaiveDate::from_ymd_opt(2026, 7, 4).unwrap();
        assert_eq!(usage_key("abc123", date), "usage:abc123:2026-07-04");
    }

    #[test]
    fn missing_record_is_zero_for_today() {
        let (clock, ledger) = setup();
        let record = ledger.get("fresh").unwrap();
        assert_eq!(record.date, clock.today());
        assert_eq!(record.ai_used_today, 0);
    }

    #[test]
    fn set_then_get_same_day() {
        let (clock, ledger) = setup();
        let record = UsageRecord {
            date: clock.today(),
            ai_used_today: 2,
        };
        ledger.set("c1", &record).unwrap();
        assert_eq!(ledger.get("c1").unwrap(), record);
    }

    #[test]
    fn set_uses_record_date_not_today() {
        let (clock, ledger) = setup();
        let tomorrow = clock.today().succ_opt().unwrap();
        ledger
            .set(
                "c1",
                &UsageRecord {
                    date: tomorrow,
                    ai_used_today: 4,
                },
            )
            .unwrap();
        assert_eq!(ledger.get("c1").unwrap().ai_used_today, 0);

        clock.advance(chrono::Duration::days(1));
        assert_eq!(ledger.get("c1").unwrap().ai_used_today, 4);
    }

    #[test]
    fn new_day_starts_from_zero() {
        let (clock, ledger) = setup();
        ledger
            .set(
                "c1",
                &UsageRecord {
                    date: clock.today(),
                    ai_used_today: 1,
                },
            )
            .unwrap();
        clock.advance(chrono::Duration::days(1));
        let record = ledger.get("c1").unwrap();
        assert_eq!(record.ai_used_today, 0);
        assert_eq!(record.date, clock.today());
    }

    #[test]
    fn record_json_shape() {
        let record = UsageRecord {
            date: NaiveDate::from_ymd_opt(2026, 7, 4).unwrap(),
            ai_used_today: 3,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["date"], "2026-07-04");
        assert_eq!(json["aiUsedToday"], 3);
    }
}
