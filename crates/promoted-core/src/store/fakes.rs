//! In-memory fakes for the build store (testing only)
//!
//! `MemoryBuildStore` satisfies the [`BuildStore`] contract without any I/O
//! and records every save so tests can assert on persistence behaviour.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::domain::build::{Build, BuildSnapshot};
use crate::store::{BuildStore, StorageError, StorageResult};

/// In-memory build store backed by a `HashMap<(project, number), Build>`.
#[derive(Debug, Default)]
pub struct MemoryBuildStore {
    builds: Mutex<HashMap<(String, u64), Arc<Build>>>,
    saved: Mutex<Vec<BuildSnapshot>>,
    save_calls: AtomicU64,
    fail_saves: AtomicBool,
}

impl MemoryBuildStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `build` and hand back the shared handle.
    pub fn insert(&self, build: Build) -> Arc<Build> {
        let build = Arc::new(build);
        let key = (build.project_full_name().to_string(), build.number());
        self.builds.lock().unwrap().insert(key, Arc::clone(&build));
        build
    }

    /// Forget a build. Returns whether it existed.
    pub fn delete_build(&self, project_full_name: &str, number: u64) -> bool {
        self.builds
            .lock()
            .unwrap()
            .remove(&(project_full_name.to_string(), number))
            .is_some()
    }

    /// Forget every build of a project.
    pub fn delete_project(&self, project_full_name: &str) {
        self.builds
            .lock()
            .unwrap()
            .retain(|(project, _), _| project != project_full_name);
    }

    /// Make subsequent saves fail (or succeed again).
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of `save` calls, failed ones included.
    pub fn save_calls(&self) -> u64 {
        self.save_calls.load(Ordering::SeqCst)
    }

    /// Snapshots written by successful saves, oldest first.
    pub fn saved(&self) -> Vec<BuildSnapshot> {
        self.saved.lock().unwrap().clone()
    }
}

impl BuildStore for MemoryBuildStore {
    fn find_build(&self, project_full_name: &str, number: u64) -> StorageResult<Option<Arc<Build>>> {
        let builds = self.builds.lock().unwrap();
        Ok(builds
            .get(&(project_full_name.to_string(), number))
            .cloned())
    }

    fn save(&self, build: &Build) -> StorageResult<()> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(format!(
                "save of {}#{} rejected",
                build.project_full_name(),
                build.number()
            )));
        }
        self.saved.lock().unwrap().push(build.to_snapshot());
        Ok(())
    }
}
