pub mod clock;
pub mod entitlements;
pub mod error;
pub mod migrations;
pub mod plans;
pub mod store;
pub mod tracker;
pub mod usage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entitlements::{EntitlementRecord, EntitlementStore};
pub use error::QuotaError;
pub use plans::{Benefits, Plan, FREE_DAILY_LIMIT};
pub use store::{KvStore, SqliteKvStore};
pub use tracker::{ConsumeOutcome, DenyReason, QuotaTracker};
pub use usage::{UsageLedger, UsageRecord};
