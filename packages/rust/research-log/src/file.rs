//! JSON Lines log store: one `<project>.jsonl` file per project.

use std::collections::HashMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::debug;

use scout_shared::LogError;

use crate::LogStore;

/// Appends whole lines under a per-project async lock.
#[derive(Debug)]
pub struct FileLogStore {
    dir: PathBuf,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl FileLogStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Path of a project's log file.
    pub fn path_for(&self, project: &str) -> PathBuf {
        self.dir.join(format!("{project}.jsonl"))
    }

    fn lock_for(&self, project: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|p| p.into_inner());
        Arc::clone(locks.entry(project.to_string()).or_default())
    }
}

fn check_project(project: &str) -> Result<(), String> {
    if project.is_empty()
        || project.starts_with('.')
        || project.contains(['/', '\\'])
        || project.contains("..")
    {
        return Err(format!("'{project}' cannot name a log file"));
    }
    Ok(())
}

/// Append `line` with one write call.
fn append_blocking(path: &Path, line: &str) -> std::io::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    file.write_all(line.as_bytes())?;
    file.flush()
}

#[async_trait]
impl LogStore for FileLogStore {
    async fn append(&self, project: &str, line: &str) -> Result<(), LogError> {
        check_project(project).map_err(LogError::write_failed)?;

        let guard = self.lock_for(project).lock_owned().await;

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            LogError::write_failed(format!("cannot create {}: {e}", self.dir.display()))
        })?;

        let path = self.path_for(project);
        let mut record = line.trim_end_matches('\n').to_string();
        record.push('\n');

        // Dropping this future before the write is dispatched writes nothing.
        // A dispatched write always completes, and keeps the lock until then.
        let path_display = path.display().to_string();
        tokio::task::spawn_blocking(move || {
            let _guard = guard;
            append_blocking(&path, &record)
        })
        .await
        .map_err(|e| LogError::write_failed(format!("append task failed: {e}")))?
        .map_err(|e| LogError::write_failed(format!("cannot append to {path_display}: {e}")))?;

        debug!(%project, path = %path_display, "log line appended");
        Ok(())
    }

    async fn read_lines(&self, project: &str) -> Result<Vec<String>, LogError> {
        check_project(project).map_err(LogError::read_failed)?;

        let path = self.path_for(project);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(text
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(str::to_string)
                .collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(LogError::read_failed(format!(
                "cannot read {}: {e}",
                path.display()
            ))),
        }
    }
}
