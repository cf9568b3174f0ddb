use thiserror::Error;

/// Caller contract violations in a generation policy.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

impl PolicyError {
    pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        PolicyError::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn field(&self) -> &str {
        match self {
            PolicyError::InvalidField { field, .. } => field,
        }
    }
}

/// Failures loading a synergy rule table.
#[derive(Debug, Error)]
pub enum RuleTableError {
    #[error("failed to parse rule table: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("rule {index}: {message}")]
    Invalid { index: usize, message: String },
}

/// Failure of the external candidate search.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("candidate source unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid policy: {0}")]
    Policy(#[from] PolicyError),
    #[error(transparent)]
    Rules(#[from] RuleTableError),
    #[error(transparent)]
    Source(#[from] SourceError),
}
