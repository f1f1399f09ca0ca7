use serde::{Deserialize, Serialize};

/// Daily metered actions granted to clients on the free plan.
pub const FREE_DAILY_LIMIT: u32 = 1;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Normal,
    Intermedio,
    Premium,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Benefits {
    pub ai_daily_free: u32,
    pub ai_monthly_quota: u32,
    #[serde(default)]
    pub certificates: bool,
    #[serde(default)]
    pub blog_premium: bool,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Normal => "normal",
            Plan::Intermedio => "intermedio",
            Plan::Premium => "premium",
        }
    }

    /// Resolve a purchasable plan identifier. `free` has no identifier.
    pub fn from_plan_id(plan_id: &str) -> Option<Self> {
        match plan_id {
            "plan-normal" => Some(Plan::Normal),
            "plan-intermedio" => Some(Plan::Intermedio),
            "plan-premium" => Some(Plan::Premium),
            _ => None,
        }
    }

    /// The one benefits table. Direct activation and the payment webhook
    /// both go through here.
    pub fn benefits(&self) -> Benefits {
        let (ai_daily_free, ai_monthly_quota, certificates, blog_premium) = match self {
            Plan::Free => (FREE_DAILY_LIMIT, 0, false, false),
            Plan::Normal => (3, 20, true, false),
            Plan::Intermedio => (5, 60, true, true),
            Plan::Premium => (10, 200, true, true),
        };
        Benefits {
            ai_daily_free,
            ai_monthly_quota,
            certificates,
            blog_premium,
        }
    }
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
