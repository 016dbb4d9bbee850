use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::models::Project;
use crate::store::Store;

/// On-disk shape of the store
#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    projects: Vec<Project>,
}

/// JSON file holding every project
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the store. A missing or blank file is an empty store.
    pub fn load(&self) -> Result<Store> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("No database at {}, starting empty", self.path.display());
                return Ok(Store::default());
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read database: {}", self.path.display()))
            }
        };

        if content.trim().is_empty() {
            return Ok(Store::default());
        }

        let document: Document = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse database: {}", self.path.display()))?;

        debug!(
            "Loaded {} projects from {}",
            document.projects.len(),
            self.path.display()
        );

        Ok(Store::new(document.projects))
    }

    /// Overwrite the file with the given store
    pub fn save(&self, store: &Store) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory: {}", parent.display())
                })?;
            }
        }

        let document = Document {
            projects: store.projects().to_vec(),
        };
        let mut json =
            serde_json::to_string_pretty(&document).context("Failed to serialize database")?;
        json.push('\n');

        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write database: {}", self.path.display()))?;

        info!("Saved {} projects to {}", store.projects().len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = tempdir().unwrap();
        let db = Database::new(dir.path().join("db.json"));
        assert!(db.load().unwrap().projects().is_empty());
    }

    #[test]
    fn test_counter_depends_on_file_existing() {
        let dir = tempdir().unwrap();
        let db = Database::new(dir.path().join("db.json"));
        let now = Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0).unwrap();

        let mut store = db.load().unwrap();
        assert_eq!(store.create("first", now).id, 1);

        db.save(&Store::default()).unwrap();
        let mut store = db.load().unwrap();
        assert_eq!(store.create("first", now).id, 10);
    }

    #[test]
    fn test_blank_file_is_empty_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, "  \n").unwrap();
        assert!(Database::new(path).load().unwrap().projects().is_empty());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = Database::new(&path).load().unwrap_err();
        assert!(err.to_string().contains("Failed to parse database"));
    }

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let db = Database::new(dir.path().join("nested").join("db.json"));
        let now = Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0).unwrap();

        let mut store = Store::default();
        store.create("Write spec", now).start(now);
        let closed = store.create("Review", now).id;
        let project = store.get_mut(closed).unwrap();
        project.start(now);
        project.stop(now + chrono::Duration::minutes(30));
        project.archived = true;

        db.save(&store).unwrap();
        let loaded = db.load().unwrap();

        assert!(loaded.same_projects(&Store::new(store.projects().to_vec())));
        assert!(loaded.projects()[0].in_progress());
        assert_eq!(loaded.projects()[0].reference(), 0);
    }

    #[test]
    fn test_reads_zero_end_and_stale_ref() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(
            &path,
            r#"{
  "projects": [
    {
      "id": 10,
      "ref": 0,
      "name": "Write spec",
      "entries": [
        { "start": "2025-01-06T09:00:00+01:00", "end": "2025-01-06T10:00:00+01:00" },
        { "start": "2025-01-07T09:00:00+01:00", "end": "0001-01-01T00:00:00Z" }
      ],
      "archived": false,
      "created": "2025-01-06T08:00:00+01:00"
    }
  ]
}"#,
        )
        .unwrap();

        let store = Database::new(&path).load().unwrap();
        let project = &store.projects()[0];
        assert_eq!(project.name, "Write spec");
        assert_eq!(project.entries.len(), 2);
        assert!(project.in_progress());
        assert!(!project.entries[0].in_progress());
    }
}
