//! Promotion criteria.

use std::sync::Arc;

use crate::domain::build::Build;
use crate::domain::condition::Condition;
use crate::domain::error::ConditionError;

/// A named, ordered set of conditions. Met iff every condition is met.
///
/// Immutable once built; replaced wholesale on the next configuration load.
#[derive(Debug, Clone)]
pub struct Criterion {
    name: String,
    conditions: Vec<Arc<dyn Condition>>,
}

impl Criterion {
    pub fn new(name: impl Into<String>, conditions: Vec<Arc<dyn Condition>>) -> Self {
        Self {
            name: name.into(),
            conditions,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn conditions(&self) -> &[Arc<dyn Condition>] {
        &self.conditions
    }

    /// Evaluate conditions in declared order, stopping at the first one that
    /// is not met. A criterion without conditions is trivially met.
    pub fn is_met(&self, build: &Build) -> Result<bool, ConditionError> {
        for condition in &self.conditions {
            if !condition.is_met(build)? {
                tracing::trace!(
                    criterion = %self.name,
                    condition = condition.kind(),
                    "condition not met"
                );
                return Ok(false);
            }
        }
        Ok(true)
    }
}
