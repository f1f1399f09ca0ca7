pub mod ai;
pub mod entitlements;
pub mod health;
pub mod subscriptions;
pub mod usage;
pub mod webhooks;
