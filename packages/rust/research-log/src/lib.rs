//! Append-only research log, one stream per project.
//!
//! This crate provides:
//! - [`LogStore`]: The storage seam (append a line, read all lines)
//! - [`FileLogStore`]: JSON Lines files under a logs directory
//! - [`ResearchLogger`]: Stamps and persists [`ReviewRecord`]s
//! - [`render_markdown`]: Day-grouped Markdown view of a log

pub mod file;
pub mod markdown;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, instrument};

use scout_shared::{LogConfig, LogError, ReviewDraft, ReviewRecord};

pub use file::FileLogStore;
pub use markdown::render_markdown;

/// Durable, append-only line storage keyed by project.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Append one complete line. Concurrent appends to one project never interleave.
    async fn append(&self, project: &str, line: &str) -> Result<(), LogError>;

    /// Every line of a project's log, oldest first. An absent log is empty.
    async fn read_lines(&self, project: &str) -> Result<Vec<String>, LogError>;
}

/// Writes review records to the project's log.
pub struct ResearchLogger {
    store: Box<dyn LogStore>,
}

impl ResearchLogger {
    pub fn new(store: impl LogStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    pub fn from_config(config: &LogConfig) -> Self {
        Self::new(FileLogStore::new(&config.dir))
    }

    /// Stamp `draft` with the current time and append it.
    ///
    /// The stamped record is returned only once the append succeeded.
    #[instrument(skip_all, fields(project = %draft.project))]
    pub async fn log(&self, draft: ReviewDraft) -> Result<ReviewRecord, LogError> {
        let record = draft.stamp(Utc::now());
        let line = serde_json::to_string(&record)
            .map_err(|e| LogError::write_failed(format!("cannot encode record: {e}")))?;

        self.store.append(&record.project, &line).await?;

        info!(relevance = %record.relevance, url = %record.url, "review logged");
        Ok(record)
    }

    /// All records of a project, oldest first.
    #[instrument(skip_all, fields(project = %project))]
    pub async fn read(&self, project: &str) -> Result<Vec<ReviewRecord>, LogError> {
        self.store
            .read_lines(project)
            .await?
            .iter()
            .enumerate()
            .map(|(i, line)| {
                serde_json::from_str::<ReviewRecord>(line).map_err(|e| {
                    LogError::read_failed(format!("{project} log line {}: {e}", i + 1))
                })
            })
            .collect()
    }
}
