use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tempfile::NamedTempFile;

use crate::domain::build::{Build, BuildSnapshot};
use crate::store::{BuildStore, StorageError, StorageResult};

/// Filesystem-backed build store, one JSON document per build.
///
/// Layout: `<root>/builds/<project full name>/<number>.json`. Folder-style
/// project names (`team/app`) map onto nested directories.
///
/// Loaded builds are cached so every lookup of the same build returns the
/// same live [`Build`], which keeps a single owner per promotion record.
///
/// Saves are serialized: the snapshot and the rename happen under one lock,
/// so the file on disk always holds the newest snapshot any save has taken.
pub struct FsBuildStore {
    builds_dir: PathBuf,
    loaded: Mutex<HashMap<(String, u64), Arc<Build>>>,
    saving: Mutex<()>,
}

impl FsBuildStore {
    /// Create a new `FsBuildStore` rooted at `root`. Creates `root/builds/` if needed.
    pub fn new(root: impl AsRef<Path>) -> StorageResult<Self> {
        let builds_dir = root.as_ref().join("builds");
        fs::create_dir_all(&builds_dir)?;
        Ok(Self {
            builds_dir,
            loaded: Mutex::new(HashMap::new()),
            saving: Mutex::new(()),
        })
    }

    fn build_path(&self, project_full_name: &str, number: u64) -> StorageResult<PathBuf> {
        let project = Path::new(project_full_name);
        let well_formed = !project_full_name.is_empty()
            && project
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !well_formed {
            return Err(StorageError::InvalidKey(project_full_name.to_string()));
        }
        Ok(self.builds_dir.join(project).join(format!("{number}.json")))
    }

    /// Persist a new build and return the live handle future lookups share.
    pub fn insert(&self, build: Build) -> StorageResult<Arc<Build>> {
        self.save(&build)?;
        let build = Arc::new(build);
        let key = (build.project_full_name().to_string(), build.number());
        self.loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Arc::clone(&build));
        Ok(build)
    }

    /// Remove a build from disk. Returns whether it existed.
    pub fn delete_build(&self, project_full_name: &str, number: u64) -> StorageResult<bool> {
        let path = self.build_path(project_full_name, number)?;
        self.loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&(project_full_name.to_string(), number));
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

impl BuildStore for FsBuildStore {
    fn find_build(&self, project_full_name: &str, number: u64) -> StorageResult<Option<Arc<Build>>> {
        let path = self.build_path(project_full_name, number)?;
        let key = (project_full_name.to_string(), number);

        // Held across the load so concurrent lookups cannot create two owners.
        let mut loaded = self.loaded.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(build) = loaded.get(&key) {
            return Ok(Some(Arc::clone(build)));
        }

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::Io(e)),
        };
        let snapshot: BuildSnapshot = serde_json::from_slice(&bytes)?;
        if snapshot.project != project_full_name || snapshot.number != number {
            return Err(StorageError::InvalidKey(format!(
                "{} holds {}#{}",
                path.display(),
                snapshot.project,
                snapshot.number
            )));
        }

        let build = Arc::new(Build::from_snapshot(snapshot));
        loaded.insert(key, Arc::clone(&build));
        Ok(Some(build))
    }

    fn save(&self, build: &Build) -> StorageResult<()> {
        let path = self.build_path(build.project_full_name(), build.number())?;
        let dir = path
            .parent()
            .ok_or_else(|| StorageError::InvalidKey(path.display().to_string()))?;
        fs::create_dir_all(dir)?;

        // A snapshot taken outside this lock could be renamed over a newer one.
        let _saving = self.saving.lock().unwrap_or_else(PoisonError::into_inner);
        let json = serde_json::to_vec_pretty(&build.to_snapshot())?;

        // Atomic write: write to temp file in the same directory, then rename.
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&json)?;
        tmp.persist(&path).map_err(|e| e.error)?;

        tracing::debug!(path = %path.display(), "build saved");
        Ok(())
    }
}
