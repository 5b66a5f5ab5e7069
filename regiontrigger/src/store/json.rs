//! JSON document policy backend.
//!
//! All policies live in one JSON document keyed by region name. Each write
//! rewrites the document to a sibling temp file and renames it over the
//! original, so a crash never leaves a half-written store behind.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use regiontrigger_core::RegionPolicy;
use serde::{Deserialize, Serialize};

use super::backend::PolicyBackend;
use crate::error::PersistenceError;

/// Current on-disk document version.
const DOCUMENT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct PolicyDocument {
    version: u32,
    #[serde(default)]
    regions: BTreeMap<String, RegionPolicy>,
}

impl Default for PolicyDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            regions: BTreeMap::new(),
        }
    }
}

/// Policy backend persisting to a single JSON file.
#[derive(Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileBackend {
    /// Creates a backend for `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Location of the JSON document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<PolicyDocument, PersistenceError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(PolicyDocument::default()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(PolicyDocument::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_document(&self, document: &PolicyDocument) -> Result<(), PersistenceError> {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let encoded = serde_json::to_string_pretty(document)?;
        std::fs::write(&tmp, encoded)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl PolicyBackend for JsonFileBackend {
    fn load_all(&self) -> Result<Vec<RegionPolicy>, PersistenceError> {
        let _guard = self.lock.lock();
        let document = self.read_document()?;
        if document.version > DOCUMENT_VERSION {
            tracing::warn!(
                path = %self.path.display(),
                version = document.version,
                "policy document is newer than this build understands"
            );
        }
        Ok(document
            .regions
            .into_iter()
            .map(|(key, mut policy)| {
                policy.region = key;
                policy
            })
            .collect())
    }

    fn save(&self, policy: &RegionPolicy) -> Result<(), PersistenceError> {
        let _guard = self.lock.lock();
        let mut document = self.read_document()?;
        document
            .regions
            .insert(policy.region.clone(), policy.clone());
        self.write_document(&document)
    }

    fn delete(&self, region: &str) -> Result<(), PersistenceError> {
        let _guard = self.lock.lock();
        let mut document = self.read_document()?;
        if document.regions.remove(region).is_some() {
            self.write_document(&document)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use regiontrigger_core::Event;

    use super::*;

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("policies.json"));
        assert!(backend.load_all().unwrap().is_empty());
    }

    #[test]
    fn every_field_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("policies.json"));

        let mut policy = RegionPolicy::new("GreenZone");
        policy.events.insert(Event::Pvp);
        policy.events.insert(Event::Message);
        policy.tile_bans.extend([0, 5]);
        policy.projectile_bans.insert(44);
        policy.item_bans.insert("Dirt Rod".to_string());
        policy.enter_message = Some(String::new());
        policy.message = Some("Welcome".to_string());
        policy.message_interval = 0;
        policy.temp_group = Some("vip".to_string());
        policy.temp_permissions.insert("tshock.tp.self".to_string());
        backend.save(&policy).unwrap();

        let loaded = backend.load_all().unwrap();
        assert_eq!(loaded, vec![policy]);
        assert_eq!(loaded[0].enter_message.as_deref(), Some(""));
        assert_eq!(loaded[0].leave_message, None);
    }

    #[test]
    fn delete_removes_record() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("policies.json"));
        backend.save(&RegionPolicy::new("a")).unwrap();
        backend.save(&RegionPolicy::new("b")).unwrap();
        backend.delete("a").unwrap();
        backend.delete("never-existed").unwrap();

        let names: Vec<String> = backend
            .load_all()
            .unwrap()
            .into_iter()
            .map(|p| p.region)
            .collect();
        assert_eq!(names, vec!["b".to_string()]);
    }

    #[test]
    fn corrupt_document_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policies.json");
        std::fs::write(&path, "{ not json").unwrap();
        let backend = JsonFileBackend::new(&path);
        assert!(matches!(
            backend.load_all(),
            Err(PersistenceError::Json(_))
        ));
        assert!(backend.save(&RegionPolicy::new("a")).is_err());
    }

    #[test]
    fn no_temp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("policies.json"));
        backend.save(&RegionPolicy::new("a")).unwrap();
        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries.len(), 1);
    }
}
