//! Profile store: one agent's cognitive profile, persisted as a JSON file.
//!
//! Storage location: `<data>/profiles/profile_{a,b}.json`
//!
//! The file is rewritten wholesale on every save. A missing file means a
//! fresh agent: the default profile is created and saved immediately.

use copresence_core::error::StoreError;
use copresence_core::profile::{Preferences, Profile};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::jsonl::ensure_parent;

pub struct ProfileStore {
    path: PathBuf,
    profile: Profile,
}

impl ProfileStore {
    /// Load the profile at `path`, or create and save the default one.
    pub fn open(path: impl Into<PathBuf>, agent_name: &str) -> Result<Self, StoreError> {
        let path = path.into();
        match std::fs::read_to_string(&path) {
            Ok(raw) => {
                let profile: Profile = serde_json::from_str(&raw).map_err(|e| StoreError::Decode {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
                profile.snapshot().validate().map_err(|reason| StoreError::Decode {
                    path: path.clone(),
                    reason,
                })?;
                info!(
                    agent = %profile.agent_name,
                    path = %path.display(),
                    changes = profile.history().len(),
                    "Profile loaded"
                );
                Ok(Self { path, profile })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let store = Self {
                    path,
                    profile: Profile::new(agent_name),
                };
                store.save()?;
                info!(agent = %agent_name, path = %store.path.display(), "Created default profile");
                Ok(store)
            }
            Err(e) => Err(StoreError::io(&path, e)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn agent_name(&self) -> &str {
        &self.profile.agent_name
    }

    pub fn snapshot(&self) -> Preferences {
        self.profile.snapshot()
    }

    /// Apply a proposed change set and persist the result.
    ///
    /// Empty sets are a no-op and do not touch the file. Returns the keys
    /// that were applied.
    pub fn apply(
        &mut self,
        proposed_changes: &serde_json::Map<String, serde_json::Value>,
        cycle: u64,
        comment: &str,
    ) -> Result<Vec<String>, StoreError> {
        if proposed_changes.is_empty() {
            return Ok(Vec::new());
        }
        let applied = self.profile.update(proposed_changes, cycle, comment);
        self.save()?;
        Ok(applied)
    }

    pub fn save(&self) -> Result<(), StoreError> {
        self.save_to(&self.path)
    }

    /// Write the profile to an arbitrary path (e.g. a run's final snapshot).
    pub fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        ensure_parent(path)?;
        let json = serde_json::to_string_pretty(&self.profile).map_err(|e| StoreError::Encode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        std::fs::write(path, json).map_err(|e| StoreError::io(path, e))?;
        debug!(agent = %self.profile.agent_name, path = %path.display(), "Profile saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use copresence_core::profile::AbstractionLevel;
    use serde_json::json;

    fn changes(v: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn missing_file_creates_default_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles").join("profile_a.json");
        let store = ProfileStore::open(&path, "Agent A").unwrap();

        assert!(path.exists());
        assert_eq!(store.agent_name(), "Agent A");
        assert_eq!(store.snapshot(), Preferences::default());
    }

    #[test]
    fn applied_changes_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile_a.json");
        let mut store = ProfileStore::open(&path, "Agent A").unwrap();

        let applied = store
            .apply(&changes(json!({"self_focus": 1.5, "world_focus": 0.1})), 3, "less world")
            .unwrap();
        assert_eq!(applied, vec!["world_focus".to_string()]);

        let reloaded = ProfileStore::open(&path, "ignored").unwrap();
        assert_eq!(reloaded.agent_name(), "Agent A");
        assert_eq!(reloaded.snapshot().self_focus, 0.5);
        assert_eq!(reloaded.snapshot().world_focus, 0.1);
        assert_eq!(reloaded.profile().history().len(), 1);
        assert_eq!(reloaded.profile().history()[0].comment, "less world");
    }

    #[test]
    fn empty_change_set_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile_b.json");
        let mut store = ProfileStore::open(&path, "Agent B").unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        assert!(store.apply(&serde_json::Map::new(), 1, "").unwrap().is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
        assert!(store.profile().history().is_empty());
    }

    #[test]
    fn save_to_exports_copy() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ProfileStore::open(dir.path().join("p.json"), "Agent A").unwrap();
        store
            .apply(&changes(json!({"abstraction_level": "high"})), 2, "")
            .unwrap();

        let export = dir.path().join("run").join("final_profiles").join("profile_a.json");
        store.save_to(&export).unwrap();
        let exported: Profile = serde_json::from_str(&std::fs::read_to_string(export).unwrap()).unwrap();
        assert_eq!(exported.snapshot().abstraction_level, AbstractionLevel::High);
    }

    #[test]
    fn corrupted_profile_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            ProfileStore::open(&path, "Agent A"),
            Err(StoreError::Decode { .. })
        ));
    }

    #[test]
    fn out_of_range_weights_are_refused_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.json");
        let raw = json!({
            "agent_name": "Agent A",
            "preferences": {"self_focus": 7.5, "world_focus": -2.0}
        });
        std::fs::write(&path, raw.to_string()).unwrap();

        let err = ProfileStore::open(&path, "Agent A").err().unwrap();
        match err {
            StoreError::Decode { reason, .. } => assert!(reason.contains("self_focus"), "{reason}"),
            other => panic!("expected a decode error, got {other}"),
        }
    }
}
