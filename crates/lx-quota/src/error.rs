#[derive(Debug, thiserror::Error)]
pub enum QuotaError {
    #[error("Invalid plan id: {0}")]
    InvalidPlan(String),
    #[error("Corrupt record at {key}: {source}")]
    CorruptRecord {
        key: String,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl QuotaError {
    pub fn error_code(&self) -> &'static str {
        match self {
            QuotaError::InvalidPlan(_) => "INVALID_PLAN",
            QuotaError::CorruptRecord { .. } => "CORRUPT_RECORD",
            QuotaError::Store(_) => "STORE_ERROR",
        }
    }

    /// Recover a `QuotaError` raised inside a `KvStore::update` callback,
    /// wrapping anything else as a store failure.
    pub(crate) fn from_store(err: anyhow::Error) -> Self {
        match err.downcast::<QuotaError>() {
            Ok(quota) => quota,
            Err(other) => QuotaError::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes() {
        assert_eq!(
            QuotaError::InvalidPlan("x".into()).error_code(),
            "INVALID_PLAN"
        );
        assert_eq!(
            QuotaError::Store(anyhow::anyhow!("disk full")).error_code(),
            "STORE_ERROR"
        );
    }

    #[test]
    fn from_store_recovers_quota_error() {
        let wrapped = anyhow::Error::new(QuotaError::InvalidPlan("plan-gold".into()));
        assert!(matches!(
            QuotaError::from_store(wrapped),
            QuotaError::InvalidPlan(id) if id == "plan-gold"
        ));
    }

    #[test]
    fn from_store_wraps_other_errors() {
        let err = QuotaError::from_store(anyhow::anyhow!("locked"));
        assert!(matches!(err, QuotaError::Store(_)));
        assert_eq!(err.to_string(), "locked");
    }
}
