use serde::{Deserialize, Serialize};
use std::env;

/// Settings for the payment-processor webhook endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Shared secret used to verify `Stripe-Signature` headers. When unset,
    /// events are accepted without verification.
    #[serde(default = "default_secret")]
    pub secret: Option<String>,
    /// Maximum allowed distance between the signed timestamp and now.
    #[serde(default = "default_tolerance_secs")]
    pub tolerance_secs: u64,
}

fn default_secret() -> Option<String> {
    env::var("LEXGATE_WEBHOOK_SECRET")
        .ok()
        .filter(|s| !s.trim().is_empty())
}

fn default_tolerance_secs() -> u64 {
    300
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            secret: default_secret(),
            tolerance_secs: default_tolerance_secs(),
        }
    }
}
