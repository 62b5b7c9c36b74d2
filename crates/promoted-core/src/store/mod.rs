//! Collaborator traits the promotion engine talks to.
//!
//! - `BuildStore`: looks builds up by project and number, and durably saves
//!   a build after its promotion record changed
//! - `ConfigSource`: supplies a project's promotion configuration
//!
//! An in-memory `BuildStore` is provided for testing via the `fakes` module
//! and a JSON-on-disk one via the `fs` module.

pub mod fakes;
pub mod fs;

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::domain::build::Build;
use crate::domain::config::ProjectPromotionConfig;

/// Errors raised by build stores.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid build key: {0}")]
    InvalidKey(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Lookup and persistence of builds.
///
/// Guarantees:
/// - `find_build` returns the live build that owns its promotion record, or
///   `None` when the project or build no longer exists.
/// - `save` durably stores the build's current state, promotion record
///   included, before returning.
pub trait BuildStore: Send + Sync {
    /// Look a build up by project full name and build number.
    fn find_build(&self, project_full_name: &str, number: u64) -> StorageResult<Option<Arc<Build>>>;

    /// Persist `build`.
    fn save(&self, build: &Build) -> StorageResult<()>;
}

impl<T: BuildStore + ?Sized> BuildStore for Arc<T> {
    fn find_build(&self, project_full_name: &str, number: u64) -> StorageResult<Option<Arc<Build>>> {
        (**self).find_build(project_full_name, number)
    }

    fn save(&self, build: &Build) -> StorageResult<()> {
        (**self).save(build)
    }
}

/// Supplies promotion configuration per project. The engine treats what it
/// gets as read-only and does not cache it past the call.
pub trait ConfigSource: Send + Sync {
    /// `None` when the project has no promotion configuration at all.
    fn promotion_config(&self, project_full_name: &str) -> Option<Arc<ProjectPromotionConfig>>;
}

/// Map-backed [`ConfigSource`].
#[derive(Debug, Clone, Default)]
pub struct StaticConfigSource {
    configs: HashMap<String, Arc<ProjectPromotionConfig>>,
}

impl StaticConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or replace) the configuration of a project.
    pub fn with_project(
        mut self,
        project_full_name: impl Into<String>,
        config: ProjectPromotionConfig,
    ) -> Self {
        self.insert(project_full_name, config);
        self
    }

    pub fn insert(&mut self, project_full_name: impl Into<String>, config: ProjectPromotionConfig) {
        self.configs
            .insert(project_full_name.into(), Arc::new(config));
    }
}

impl ConfigSource for StaticConfigSource {
    fn promotion_config(&self, project_full_name: &str) -> Option<Arc<ProjectPromotionConfig>> {
        self.configs.get(project_full_name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::criterion::Criterion;

    #[test]
    fn test_static_config_source_lookup() {
        let config = ProjectPromotionConfig::new(vec![Criterion::new("qa", Vec::new())])
            .expect("config");
        let source = StaticConfigSource::new().with_project("demo", config);

        let found = source.promotion_config("demo").expect("demo configured");
        assert!(found.get_criterion("qa").is_some());
        assert!(source.promotion_config("other").is_none());
    }

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::Unavailable("read-only filesystem".to_string());
        assert!(err.to_string().contains("read-only filesystem"));
    }
}
