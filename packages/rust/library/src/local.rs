//! Project library backed by a local directory tree.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use scout_shared::ContextError;

use crate::ProjectLibrary;

/// Reads projects from `<projects_root>/<project>/`.
#[derive(Debug, Clone)]
pub struct LocalLibrary {
    projects_root: PathBuf,
}

impl LocalLibrary {
    pub fn new(projects_root: impl Into<PathBuf>) -> Self {
        Self {
            projects_root: projects_root.into(),
        }
    }
}

#[async_trait]
impl ProjectLibrary for LocalLibrary {
    async fn list_project_dirs(&self) -> Result<Vec<String>, ContextError> {
        let mut entries = tokio::fs::read_dir(&self.projects_root).await.map_err(|e| {
            ContextError::unavailable(format!(
                "cannot read project library at {}: {e}",
                self.projects_root.display()
            ))
        })?;

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            ContextError::unavailable(format!(
                "cannot list {}: {e}",
                self.projects_root.display()
            ))
        })? {
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            if is_dir {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }

        debug!(root = %self.projects_root.display(), count = names.len(), "listed project dirs");
        Ok(names)
    }

    async fn project_exists(&self, project: &str) -> Result<bool, ContextError> {
        let dir = self.projects_root.join(project);
        match tokio::fs::metadata(&dir).await {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ContextError::unavailable(format!(
                "cannot stat {}: {e}",
                dir.display()
            ))),
        }
    }

    async fn read_document(
        &self,
        project: &str,
        file: &str,
    ) -> Result<Option<String>, ContextError> {
        let path = self.projects_root.join(project).join(file);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ContextError::unavailable(format!(
                "cannot read {}: {e}",
                path.display()
            ))),
        }
    }

    fn location(&self, project: &str) -> String {
        self.projects_root.join(project).display().to_string()
    }
}
