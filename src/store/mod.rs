//! On-disk layout of recorded sessions and compiled bundles.
//!
//! The recorder posts one JSON object per event. Each is stored as
//! `<root>/<YYYYMMDD>/<taskId>/summary_event_<timestamp>_<seq>.json`, so sorting
//! paths lexicographically restores recording order.

use chrono::Local;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use walkdir::WalkDir;

use crate::compiler::{bundle_for, compile, validate_labeled};
use crate::error::{CompileError, StoreError};
use crate::models::{RecordedEvent, ReplayBundle};

/// A recorded event together with the file it was read from
#[derive(Debug, Clone)]
pub struct LoadedEvent {
    pub path: PathBuf,
    pub event: RecordedEvent,
}

impl LoadedEvent {
    fn label(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Directory of recorded sessions, grouped by day and task
pub struct EventStore {
    root: PathBuf,
    sequence: AtomicU64,
}

impl EventStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            sequence: AtomicU64::new(0),
        }
    }

    /// Persist one raw event posted by the recorder.
    ///
    /// The event must be a JSON object with a string `taskId`.
    pub fn save(&self, event: &Value) -> Result<PathBuf, StoreError> {
        let task_id = event
            .get("taskId")
            .and_then(Value::as_str)
            .ok_or_else(|| StoreError::InvalidTaskId("<missing>".to_string()))?;
        let task_id = check_task_id(task_id)?;

        let now = Local::now();
        let folder = self
            .root
            .join(now.format("%Y%m%d").to_string())
            .join(task_id);
        std::fs::create_dir_all(&folder).map_err(|e| StoreError::io(&folder, e))?;

        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let path = folder.join(format!(
            "summary_event_{}_{:06}.json",
            now.format("%Y%m%d_%H%M%S_%3f"),
            seq
        ));

        let body = serde_json::to_string_pretty(event).map_err(|e| StoreError::json(&path, e))?;
        std::fs::write(&path, body).map_err(|e| StoreError::io(&path, e))?;

        tracing::debug!("Stored event for task {} at {}", task_id, path.display());
        Ok(path)
    }

    /// Event files of a task across every day folder, in recording order
    pub fn task_files(&self, task_id: &str) -> Result<Vec<PathBuf>, StoreError> {
        let task_id = check_task_id(task_id)?;
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        let days = std::fs::read_dir(&self.root).map_err(|e| StoreError::io(&self.root, e))?;
        for day in days {
            let day = day.map_err(|e| StoreError::io(&self.root, e))?;
            let task_dir = day.path().join(task_id);
            if task_dir.is_dir() {
                files.extend(collect_event_files(&task_dir)?);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Load every event of a task; unreadable files are skipped
    pub fn load_task(&self, task_id: &str) -> Result<Vec<LoadedEvent>, StoreError> {
        Ok(load_events(&self.task_files(task_id)?))
    }
}

/// Reject ids that would escape their folder or produce odd file names
fn check_task_id(task_id: &str) -> Result<&str, StoreError> {
    let valid = !task_id.trim().is_empty()
        && task_id != "."
        && task_id != ".."
        && !task_id.contains(['/', '\\', '\0']);
    if valid {
        Ok(task_id)
    } else {
        Err(StoreError::InvalidTaskId(task_id.to_string()))
    }
}

/// Every `*.json` file below `dir`, sorted by path
pub fn collect_event_files(dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        let is_json = entry
            .path()
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if entry.file_type().is_file() && is_json {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Parse event files in the given order, logging and skipping bad ones
pub fn load_events(paths: &[PathBuf]) -> Vec<LoadedEvent> {
    let total = paths.len();
    paths
        .iter()
        .enumerate()
        .filter_map(|(idx, path)| {
            tracing::debug!("[{}/{}] Loading {}", idx + 1, total, path.display());
            match read_event(path) {
                Ok(event) => Some(LoadedEvent {
                    path: path.clone(),
                    event,
                }),
                Err(e) => {
                    tracing::warn!("Could not process {}: {}", path.display(), e);
                    None
                }
            }
        })
        .collect()
}

fn read_event(path: &Path) -> Result<RecordedEvent, StoreError> {
    let content = std::fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| StoreError::json(path, e))
}

/// Load a recorded session folder (searched recursively)
pub fn load_event_dir(dir: &Path) -> Result<Vec<LoadedEvent>, StoreError> {
    if !dir.exists() {
        return Err(StoreError::NotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(StoreError::NotADirectory(dir.to_path_buf()));
    }

    let files = collect_event_files(dir)?;
    if files.is_empty() {
        return Err(StoreError::NoEventFiles(dir.to_path_buf()));
    }
    tracing::info!("Found {} event files under {}", files.len(), dir.display());

    Ok(load_events(&files))
}

/// Validate and compile loaded events, naming files in diagnostics
pub fn compile_loaded(loaded: &[LoadedEvent]) -> Result<ReplayBundle, CompileError> {
    let events: Vec<RecordedEvent> = loaded.iter().map(|l| l.event.clone()).collect();
    let header = validate_labeled(&events, |index| loaded[index].label())?;
    Ok(bundle_for(header, compile(&events)))
}

/// File name a bundle is written under
pub fn bundle_file_name(task_id: &str) -> String {
    format!("wap_exact_replay_list_{}.json", task_id)
}

/// Write a bundle as pretty UTF-8 JSON into `output_dir`
pub fn write_bundle(output_dir: &Path, bundle: &ReplayBundle) -> Result<PathBuf, StoreError> {
    let task_id = check_task_id(&bundle.task_id)?;
    std::fs::create_dir_all(output_dir).map_err(|e| StoreError::io(output_dir, e))?;

    let path = output_dir.join(bundle_file_name(task_id));
    let body = bundle.to_pretty_json().map_err(|e| StoreError::json(&path, e))?;
    std::fs::write(&path, body).map_err(|e| StoreError::io(&path, e))?;

    tracing::info!(
        "Wrote {} actions to {}",
        bundle.action_list.len(),
        path.display()
    );
    Ok(path)
}
