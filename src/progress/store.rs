use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::progress::ChecklistState;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum ProgressLoadError {
    #[error("failed reading progress snapshot {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("malformed progress snapshot {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum ProgressSaveError {
    #[error("failed creating progress directory {}: {source}", .path.display())]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("failed serializing progress snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed writing progress snapshot {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProgressSnapshot {
    pub requirements_checked: ChecklistState,
    pub last_updated: String,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    requirements_checked: &'a ChecklistState,
    last_updated: &'a str,
}

/// Result of [`ProgressStore::initialize`]. `error` is set when a snapshot
/// existed but could not be used; `state` then holds defaults.
#[derive(Debug)]
pub struct LoadedProgress {
    pub state: ChecklistState,
    pub last_updated: Option<String>,
    pub error: Option<ProgressLoadError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveAck {
    pub path: PathBuf,
    pub last_updated: String,
}

/// Reads and writes the checklist snapshot at a single JSON file.
#[derive(Debug, Clone)]
pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn initialize(&self) -> LoadedProgress {
        match self.read_snapshot() {
            Ok(Some(snapshot)) => {
                info!(
                    "loaded progress from {} (last saved {})",
                    self.path.display(),
                    snapshot.last_updated
                );
                LoadedProgress {
                    state: snapshot.requirements_checked,
                    last_updated: Some(snapshot.last_updated),
                    error: None,
                }
            }
            Ok(None) => {
                debug!("no progress snapshot at {}", self.path.display());
                LoadedProgress {
                    state: ChecklistState::default(),
                    last_updated: None,
                    error: None,
                }
            }
            Err(error) => {
                warn!("{error}; continuing with an empty checklist");
                LoadedProgress {
                    state: ChecklistState::default(),
                    last_updated: None,
                    error: Some(error),
                }
            }
        }
    }

    pub fn read_snapshot(&self) -> Result<Option<ProgressSnapshot>, ProgressLoadError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ProgressLoadError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_str(&data)
            .map(Some)
            .map_err(|source| ProgressLoadError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    pub fn save(&self, state: &ChecklistState) -> Result<SaveAck, ProgressSaveError> {
        self.save_at(state, Local::now().naive_local())
    }

    /// Replaces the snapshot with `state` stamped at `at`. The write goes
    /// through a temp file in the same directory, so a failed save leaves
    /// the previous snapshot intact.
    pub fn save_at(
        &self,
        state: &ChecklistState,
        at: NaiveDateTime,
    ) -> Result<SaveAck, ProgressSaveError> {
        let last_updated = at.format(TIMESTAMP_FORMAT).to_string();
        let content = serde_json::to_string_pretty(&SnapshotRef {
            requirements_checked: state,
            last_updated: &last_updated,
        })?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|source| ProgressSaveError::CreateDir {
            path: dir.clone(),
            source,
        })?;

        let write_err = |source: io::Error| ProgressSaveError::Write {
            path: self.path.clone(),
            source,
        };
        let mut tmp = NamedTempFile::new_in(&dir).map_err(write_err)?;
        tmp.write_all(content.as_bytes()).map_err(write_err)?;
        tmp.as_file_mut().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;

        info!("saved progress to {}", self.path.display());
        Ok(SaveAck {
            path: self.path.clone(),
            last_updated,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::NaiveDate;
    use tempfile::TempDir;

    use super::{ProgressLoadError, ProgressSaveError, ProgressStore};
    use crate::progress::{ChecklistState, Requirement};

    fn sample_state() -> ChecklistState {
        let mut state = ChecklistState::default();
        state.set(Requirement::Gre, true);
        state.set(Requirement::Resume, true);
        let entry = state.ensure_university("UC Davis");
        entry.application_started = true;
        entry.documents_uploaded = true;
        state.ensure_university("UT Austin");
        state
    }

    #[test]
    fn missing_snapshot_yields_defaults_without_error() {
        let temp = TempDir::new().unwrap();
        let store = ProgressStore::new(temp.path().join("progress/application_progress.json"));
        let loaded = store.initialize();
        assert_eq!(loaded.state, ChecklistState::default());
        assert!(loaded.last_updated.is_none());
        assert!(loaded.error.is_none());
    }

    #[test]
    fn save_creates_directory_and_round_trips() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/progress/application_progress.json");
        let store = ProgressStore::new(&path);
        let state = sample_state();

        let ack = store.save(&state).expect("save should succeed");
        assert_eq!(ack.path, path);
        assert!(path.is_file());

        let loaded = store.initialize();
        assert!(loaded.error.is_none());
        assert_eq!(loaded.state, state);
        assert_eq!(loaded.last_updated, Some(ack.last_updated));
    }

    #[test]
    fn snapshot_has_expected_shape_and_timestamp() {
        let temp = TempDir::new().unwrap();
        let store = ProgressStore::new(temp.path().join("application_progress.json"));
        let at = NaiveDate::from_ymd_opt(2024, 11, 3)
            .unwrap()
            .and_hms_opt(9, 5, 7)
            .unwrap();
        store.save_at(&sample_state(), at).expect("save should succeed");

        let raw = fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["last_updated"], "2024-11-03 09:05:07");
        let checked = &value["requirements_checked"];
        assert_eq!(checked["GRE"], true);
        assert_eq!(checked["TOEFL"], false);
        assert_eq!(
            checked["University_Specific"]["UC Davis"]["Documents_Uploaded"],
            true
        );
        assert_eq!(checked["University_Specific"]["UT Austin"]["Fee_Paid"], false);
    }

    #[test]
    fn save_overwrites_previous_snapshot_wholesale() {
        let temp = TempDir::new().unwrap();
        let store = ProgressStore::new(temp.path().join("application_progress.json"));
        store.save(&sample_state()).unwrap();
        store.save(&ChecklistState::default()).unwrap();
        let loaded = store.initialize();
        assert_eq!(loaded.state, ChecklistState::default());
        assert!(loaded.state.university_specific.is_empty());
    }

    #[test]
    fn corrupt_snapshot_falls_back_and_is_overwritten_on_save() {
        let temp = TempDir::new().unwrap();
        let store = ProgressStore::new(temp.path().join("application_progress.json"));
        fs::write(store.path(), [0xff, 0xfe, 0x00, 0x7b]).unwrap();

        let loaded = store.initialize();
        assert_eq!(loaded.state, ChecklistState::default());
        assert!(matches!(loaded.error, Some(ProgressLoadError::Read { .. })));

        store.save(&loaded.state).expect("save should replace corrupt file");
        let reloaded = store.initialize();
        assert!(reloaded.error.is_none());
        assert_eq!(reloaded.state, ChecklistState::default());
    }

    #[test]
    fn partial_university_record_is_malformed() {
        let temp = TempDir::new().unwrap();
        let store = ProgressStore::new(temp.path().join("application_progress.json"));
        let snapshot = r#"{
  "requirements_checked": {
    "GRE": true, "TOEFL": false, "Transcripts": false,
    "SOP": false, "Resume": false, "LORs": false,
    "University_Specific": {
      "UC Davis": { "Application_Started": true, "Fee_Paid": false }
    }
  },
  "last_updated": "2024-11-03 09:05:07"
}"#;
        fs::write(store.path(), snapshot).unwrap();
        let loaded = store.initialize();
        assert!(matches!(loaded.error, Some(ProgressLoadError::Parse { .. })));
        assert!(!loaded.state.gre);
    }

    #[test]
    fn unwritable_destination_reports_error() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("progress");
        fs::write(&blocker, "not a directory").unwrap();
        let store = ProgressStore::new(blocker.join("application_progress.json"));

        let state = sample_state();
        let err = store.save(&state).expect_err("save should fail");
        assert!(matches!(err, ProgressSaveError::CreateDir { .. }));
        assert!(state.gre);
        assert_eq!(state.university_specific.len(), 2);
    }
}
