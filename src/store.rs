//! YAML persistence for the roster and the published review records
//!
//! Writes go through a temp file in the target directory and an atomic
//! rename, so a failed run never leaves a half-written data file behind.

use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::models::{PersonModel, ReviewRecord};
use crate::roster::Roster;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid YAML in {path}: {source}")]
    Yaml {
        path: String,
        source: serde_yaml::Error,
    },

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

fn read_yaml_list(path: &Path) -> StoreResult<Vec<serde_yaml::Value>> {
    let content = fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let value: Option<Vec<serde_yaml::Value>> =
        serde_yaml::from_str(&content).map_err(|source| StoreError::Yaml {
            path: path.display().to_string(),
            source,
        })?;
    Ok(value.unwrap_or_default())
}

/// Load a roster file (a YAML list of people).
///
/// Entries that do not hydrate are logged and skipped.
pub fn load_roster(path: &Path) -> StoreResult<Roster> {
    let mut people = Vec::new();
    for (idx, entry) in read_yaml_list(path)?.into_iter().enumerate() {
        match serde_yaml::from_value::<PersonModel>(entry) {
            Ok(person) => people.push(person),
            Err(e) => tracing::error!("Error processing roster entry {} in {}: {}", idx, path.display(), e),
        }
    }
    tracing::info!("Loaded {} roster entries from {}", people.len(), path.display());
    Ok(Roster::from_people(people))
}

pub fn save_roster(path: &Path, roster: &Roster) -> StoreResult<()> {
    let people: Vec<&PersonModel> = roster.iter().map(|(_, p)| p).collect();
    write_yaml_atomic(path, &people)
}

/// Load published review records, skipping entries that do not hydrate
pub fn load_packages(path: &Path) -> StoreResult<Vec<ReviewRecord>> {
    let mut records = Vec::new();
    for (idx, entry) in read_yaml_list(path)?.into_iter().enumerate() {
        match serde_yaml::from_value::<ReviewRecord>(entry) {
            Ok(record) => records.push(record),
            Err(e) => tracing::error!("Error processing package entry {} in {}: {}", idx, path.display(), e),
        }
    }
    Ok(records)
}

pub fn save_packages(path: &Path, records: &[ReviewRecord]) -> StoreResult<()> {
    write_yaml_atomic(path, records)
}

/// Serialize `value` as YAML and atomically replace `path`
pub fn write_yaml_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> StoreResult<()> {
    let write_err = |source: std::io::Error| StoreError::Write {
        path: path.display().to_string(),
        source,
    };

    let content = serde_yaml::to_string(value).map_err(|source| StoreError::Yaml {
        path: path.display().to_string(),
        source,
    })?;

    let parent = match path.parent() {
        Some(p) if p.as_os_str().is_empty() => Path::new("."),
        Some(p) => p,
        None => return Err(StoreError::InvalidPath(path.display().to_string())),
    };
    fs::create_dir_all(parent).map_err(write_err)?;

    let mut temp_file = NamedTempFile::new_in(parent).map_err(write_err)?;
    temp_file.write_all(content.as_bytes()).map_err(write_err)?;
    temp_file.flush().map_err(write_err)?;
    temp_file.persist(path).map_err(|e| write_err(e.error))?;

    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PersonSet;
    use tempfile::TempDir;

    #[test]
    fn test_roster_round_trip_keeps_unknown_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("_data/contributors.yml");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            "- name: Jane Doe\n  github_username: JaneDoe\n  title: Board member\n  contributor_type:\n  - community\n  packages_reviewed: null\n- github_username: bob\n  contributor_type: [a, b]\n  packages_editor: [~]\n- bogus: true\n",
        )
        .unwrap();

        let mut roster = load_roster(&path).unwrap();
        assert_eq!(roster.len(), 2);
        roster
            .get_mut("janedoe")
            .unwrap()
            .add_unique_value(PersonSet::PackagesReviewed, ["sunpy"]);

        save_roster(&path, &roster).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("title: Board member"));

        let reloaded = load_roster(&path).unwrap();
        assert_eq!(reloaded, roster);
    }

    #[test]
    fn test_load_roster_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            load_roster(&dir.path().join("nope.yml")),
            Err(StoreError::Read { .. })
        ));
    }

    #[test]
    fn test_empty_file_is_empty_list() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("packages.yml");
        fs::write(&path, "").unwrap();
        assert!(load_packages(&path).unwrap().is_empty());
    }
}
