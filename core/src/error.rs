use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Malformed {entity} record '{key}': {reason}")]
    MalformedRecord {
        entity: &'static str,
        key:    String,
        reason: String,
    },

    #[error("Invalid configuration '{option}': {reason}")]
    Configuration {
        option: &'static str,
        reason: String,
    },

    #[error("No reference timestamp configured and no dated sales fact to derive one from")]
    UnresolvedReference,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AnalyticsError {
    pub fn malformed(entity: &'static str, key: impl ToString, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            entity,
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn config(option: &'static str, reason: impl Into<String>) -> Self {
        Self::Configuration {
            option,
            reason: reason.into(),
        }
    }
}

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;
