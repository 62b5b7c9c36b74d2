//! Domain-level error taxonomy for build promotion.

use crate::store::StorageError;

/// Failure raised by a [`Condition`](crate::domain::Condition) while it was
/// being evaluated against a build.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct ConditionError {
    pub reason: String,
}

impl ConditionError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Promotion engine errors.
#[derive(Debug, thiserror::Error)]
pub enum PromotionError {
    #[error("project {project} has no promotion criterion called {name}")]
    UnknownCriterion { project: String, name: String },

    #[error("project {project} has no promotion criteria configured")]
    NoPromotionConfigured { project: String },

    #[error("promotion recorded but saving {project} #{number} failed: {source}")]
    Persistence {
        project: String,
        number: u64,
        #[source]
        source: StorageError,
    },

    #[error("criterion {criterion} could not be evaluated: {source}")]
    Condition {
        criterion: String,
        #[source]
        source: ConditionError,
    },

    #[error("duplicate promotion criterion: {0}")]
    DuplicateCriterion(String),

    #[error("unknown condition kind: {0}")]
    UnknownConditionKind(String),

    #[error("invalid promotion config: {0}")]
    InvalidConfig(String),
}

impl PromotionError {
    /// Whether the caller may retry. Only persistence failures qualify, and
    /// retrying the save alone is enough since the ledger already holds the
    /// promotion.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PromotionError::Persistence { .. })
    }
}

/// Result type for promotion operations.
pub type Result<T> = std::result::Result<T, PromotionError>;
