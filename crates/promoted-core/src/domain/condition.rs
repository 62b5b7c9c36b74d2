//! Pluggable promotion conditions.
//!
//! A [`Condition`] is a read-only predicate over a [`Build`]. Criteria
//! short-circuit on the first unmet condition, so implementations must not
//! mutate build state or depend on being evaluated.

use std::fmt::Debug;

use serde::Deserialize;

use crate::domain::build::{Build, BuildResult};
use crate::domain::error::ConditionError;

/// A single predicate contributing to a criterion.
pub trait Condition: Debug + Send + Sync {
    /// Registry kind this condition was built from.
    fn kind(&self) -> &str;

    /// Whether `build` satisfies this condition. An `Err` is a failed
    /// evaluation, never an implicit "met".
    fn is_met(&self, build: &Build) -> Result<bool, ConditionError>;
}

/// Met once the build itself has finished well enough.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SelfPromotion {
    /// Also accept `Unstable` builds.
    #[serde(default)]
    pub even_if_unstable: bool,
}

impl SelfPromotion {
    pub const KIND: &'static str = "self_promotion";
}

impl Condition for SelfPromotion {
    fn kind(&self) -> &str {
        Self::KIND
    }

    fn is_met(&self, build: &Build) -> Result<bool, ConditionError> {
        let threshold = if self.even_if_unstable {
            BuildResult::Unstable
        } else {
            BuildResult::Success
        };
        Ok(build
            .result()
            .is_some_and(|result| result.is_better_or_equal(threshold)))
    }
}

/// Met when a build parameter carries an expected value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterMatch {
    pub name: String,
    pub value: String,
}

impl ParameterMatch {
    pub const KIND: &'static str = "parameter";
}

impl Condition for ParameterMatch {
    fn kind(&self) -> &str {
        Self::KIND
    }

    fn is_met(&self, build: &Build) -> Result<bool, ConditionError> {
        if self.name.is_empty() {
            return Err(ConditionError::new("parameter name is empty"));
        }
        Ok(build.parameter(&self.name) == Some(self.value.as_str()))
    }
}
