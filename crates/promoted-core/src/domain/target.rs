//! Non-owning references to other builds.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::build::Build;
use crate::store::{BuildStore, StorageResult};

/// Symbolic pointer to a build: project full name plus build number.
///
/// Persisted as the pair `["<project>", <number>]`. Holds no live build; it is
/// resolved on demand and may legitimately point at nothing once the project
/// or build has been deleted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(String, u64)", into = "(String, u64)")]
pub struct BuildTargetReference {
    project_full_name: String,
    number: u64,
}

impl BuildTargetReference {
    pub fn new(project_full_name: impl Into<String>, number: u64) -> Self {
        Self {
            project_full_name: project_full_name.into(),
            number,
        }
    }

    pub fn project_full_name(&self) -> &str {
        &self.project_full_name
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    /// Look the build up again through `store`. `Ok(None)` means the target
    /// no longer exists.
    pub fn resolve<S>(&self, store: &S) -> StorageResult<Option<Arc<Build>>>
    where
        S: BuildStore + ?Sized,
    {
        let found = store.find_build(&self.project_full_name, self.number)?;
        if found.is_none() {
            tracing::debug!(reference = %self, "build reference did not resolve");
        }
        Ok(found)
    }
}

impl From<&Build> for BuildTargetReference {
    fn from(build: &Build) -> Self {
        Self::new(build.project_full_name(), build.number())
    }
}

impl From<(String, u64)> for BuildTargetReference {
    fn from((project_full_name, number): (String, u64)) -> Self {
        Self {
            project_full_name,
            number,
        }
    }
}

impl From<BuildTargetReference> for (String, u64) {
    fn from(reference: BuildTargetReference) -> Self {
        (reference.project_full_name, reference.number)
    }
}

impl fmt::Display for BuildTargetReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.project_full_name, self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captures_identity_of_build() {
        let build = Build::new("folder/demo", 5);
        let reference = build.target();
        assert_eq!(reference.project_full_name(), "folder/demo");
        assert_eq!(reference.number(), 5);
        assert_eq!(reference.to_string(), "folder/demo#5");
    }

    #[test]
    fn test_persisted_as_pair() {
        let reference = BuildTargetReference::new("demo", 5);
        let json = serde_json::to_string(&reference).expect("serialize");
        assert_eq!(json, r#"["demo",5]"#);

        let back: BuildTargetReference = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, reference);
    }
}
