//! Project context loading from the BrainDrive library.
//!
//! This crate provides:
//! - [`ProjectLibrary`]: Storage seam for project documents
//! - [`LocalLibrary`] / [`GitHubLibrary`]: Directory tree and GitHub backends
//! - [`ContextLoader`]: Builds a [`ProjectContext`] and lists projects

pub mod github;
pub mod local;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use scout_shared::{
    ContextError, LibraryConfig, ProjectContext, ProjectSummary, SupplementaryKind,
    SupplementaryText,
};

pub use github::GitHubLibrary;
pub use local::LocalLibrary;

/// The mandatory specification document of a project.
pub const SPEC_FILE: &str = "spec.md";

/// Descriptions longer than this are cut to 97 chars plus `...`.
const DESCRIPTION_MAX_CHARS: usize = 100;

/// Read access to the project documents of a library.
///
/// Implementations map missing things to `Ok(None)` / `Ok(false)` and reserve
/// errors for a backend that cannot be read at all.
#[async_trait]
pub trait ProjectLibrary: Send + Sync {
    /// Names of all directories directly under the projects root.
    async fn list_project_dirs(&self) -> Result<Vec<String>, ContextError>;

    /// Whether a project directory with this name exists.
    async fn project_exists(&self, project: &str) -> Result<bool, ContextError>;

    /// Contents of `file` in the project directory, `None` if absent.
    async fn read_document(&self, project: &str, file: &str)
    -> Result<Option<String>, ContextError>;

    /// Human-readable location of a project, for listings.
    fn location(&self, project: &str) -> String;
}

/// Assembles project contexts from a [`ProjectLibrary`].
pub struct ContextLoader {
    library: Box<dyn ProjectLibrary>,
}

impl ContextLoader {
    pub fn new(library: impl ProjectLibrary + 'static) -> Self {
        Self {
            library: Box::new(library),
        }
    }

    /// Build the backend named by the configuration.
    pub fn from_config(config: &LibraryConfig) -> scout_shared::Result<Self> {
        Ok(match config {
            LibraryConfig::Local { projects_root } => Self::new(LocalLibrary::new(projects_root)),
            LibraryConfig::Github {
                api_base,
                repo,
                projects_dir,
                token,
                timeout,
            } => Self::new(GitHubLibrary::new(
                api_base.as_str(),
                repo.as_str(),
                projects_dir.as_str(),
                token.clone(),
                *timeout,
            )?),
        })
    }

    /// Load the specification and supplementary documents of `project_id`.
    #[instrument(skip_all, fields(project = %project_id))]
    pub async fn load(&self, project_id: &str) -> Result<ProjectContext, ContextError> {
        if !is_valid_project_id(project_id) {
            return Err(ContextError::not_found(format!(
                "'{project_id}' is not a valid project identifier"
            )));
        }

        if !self.library.project_exists(project_id).await? {
            return Err(ContextError::not_found(format!(
                "project '{project_id}' not found in library"
            )));
        }

        let spec_text = self
            .library
            .read_document(project_id, SPEC_FILE)
            .await?
            .ok_or_else(|| {
                ContextError::missing_spec(format!("project '{project_id}' has no {SPEC_FILE}"))
            })?;

        let mut supplementary_texts = Vec::new();
        for kind in SupplementaryKind::ORDER {
            match self.library.read_document(project_id, kind.file_name()).await? {
                Some(text) if !text.trim().is_empty() => {
                    supplementary_texts.push(SupplementaryText { kind, text });
                }
                _ => debug!(file = kind.file_name(), "supplementary document absent"),
            }
        }

        info!(
            spec_chars = spec_text.len(),
            supplementary = supplementary_texts.len(),
            "project context loaded"
        );

        Ok(ProjectContext {
            project_id: project_id.to_string(),
            spec_text,
            supplementary_texts,
        })
    }

    /// Every non-hidden project, sorted by id, with a one-line description.
    #[instrument(skip_all)]
    pub async fn list_projects(&self) -> Result<Vec<ProjectSummary>, ContextError> {
        let mut ids: Vec<String> = self
            .library
            .list_project_dirs()
            .await?
            .into_iter()
            .filter(|name| !name.starts_with('.'))
            .collect();
        ids.sort();

        let mut projects = Vec::with_capacity(ids.len());
        for id in ids {
            // An unreadable spec costs only its description.
            let description = match self.library.read_document(&id, SPEC_FILE).await {
                Ok(spec) => spec.as_deref().and_then(describe),
                Err(e) => {
                    warn!(project = %id, error = %e, "project description unavailable");
                    None
                }
            };
            projects.push(ProjectSummary {
                path: self.library.location(&id),
                id,
                description,
            });
        }

        info!(count = projects.len(), "projects listed");
        Ok(projects)
    }
}

/// Identifiers must name a single directory under the projects root.
fn is_valid_project_id(id: &str) -> bool {
    !id.is_empty()
        && !id.starts_with('.')
        && !id.contains(['/', '\\'])
        && !id.contains("..")
}

/// First non-empty, non-heading line of a spec, capped in length.
fn describe(spec: &str) -> Option<String> {
    let line = spec
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with('#'))?;

    if line.chars().count() > DESCRIPTION_MAX_CHARS {
        let cut: String = line.chars().take(DESCRIPTION_MAX_CHARS - 3).collect();
        Some(format!("{cut}..."))
    } else {
        Some(line.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_shared::ContextFailure;
    use std::path::{Path, PathBuf};
    use uuid::Uuid;

    const SPEC: &str = "# BrainDrive Library\n\nA markdown library of projects that AI agents read and write.\n\n## Goals\n- Own your data\n";

    fn temp_library() -> PathBuf {
        std::env::temp_dir().join(format!("scout-library-test-{}", Uuid::now_v7()))
    }

    fn write(root: &Path, project: &str, file: &str, text: &str) {
        let dir = root.join(project);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(file), text).unwrap();
    }

    #[tokio::test]
    async fn loads_spec_verbatim_with_supplements_in_order() {
        let root = temp_library();
        write(&root, "braindrive-lib", "spec.md", SPEC);
        write(&root, "braindrive-lib", "ideas.md", "- voice notes\n");
        write(&root, "braindrive-lib", "build-plan.md", "1. Ship the logger\n");

        let loader = ContextLoader::new(LocalLibrary::new(&root));
        let ctx = loader.load("braindrive-lib").await.unwrap();

        assert_eq!(ctx.project_id, "braindrive-lib");
        assert_eq!(ctx.spec_text, SPEC);
        let kinds: Vec<_> = ctx.supplementary_texts.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![SupplementaryKind::BuildPlan, SupplementaryKind::Ideas]);
        assert_eq!(ctx.supplementary_texts[0].text, "1. Ship the logger\n");

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn supplements_are_optional() {
        let root = temp_library();
        write(&root, "scout", "spec.md", SPEC);
        write(&root, "scout", "ideas.md", "   \n");

        let loader = ContextLoader::new(LocalLibrary::new(&root));
        let ctx = loader.load("scout").await.unwrap();
        assert!(ctx.supplementary_texts.is_empty());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn unknown_project_is_not_found() {
        let root = temp_library();
        write(&root, "scout", "spec.md", SPEC);

        let loader = ContextLoader::new(LocalLibrary::new(&root));
        let err = loader.load("nonexistent-project").await.unwrap_err();
        assert_eq!(err.reason, ContextFailure::NotFound);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn project_without_spec_is_missing_spec() {
        let root = temp_library();
        write(&root, "half-baked", "ideas.md", "- later\n");

        let loader = ContextLoader::new(LocalLibrary::new(&root));
        let err = loader.load("half-baked").await.unwrap_err();
        assert_eq!(err.reason, ContextFailure::MissingSpec);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn traversal_ids_never_resolve() {
        let root = temp_library();
        write(&root, "scout", "spec.md", SPEC);

        let loader = ContextLoader::new(LocalLibrary::new(root.join("scout")));
        for id in ["", ".", "..", ".hidden", "../scout", "a/b", "a\\b"] {
            let err = loader.load(id).await.unwrap_err();
            assert_eq!(err.reason, ContextFailure::NotFound, "{id:?}");
        }

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn unreadable_library_is_unavailable() {
        let loader = ContextLoader::new(LocalLibrary::new(temp_library()));
        let err = loader.list_projects().await.unwrap_err();
        assert_eq!(err.reason, ContextFailure::Unavailable);
    }

    #[tokio::test]
    async fn lists_sorted_visible_projects() {
        let root = temp_library();
        write(&root, "scout", "spec.md", SPEC);
        write(&root, "braindrive-lib", "spec.md", "Just a one-liner.");
        write(&root, "no-spec", "ideas.md", "- x");
        std::fs::create_dir_all(root.join(".git")).unwrap();
        std::fs::write(root.join("README.md"), "not a project").unwrap();

        let loader = ContextLoader::new(LocalLibrary::new(&root));
        let projects = loader.list_projects().await.unwrap();

        let ids: Vec<&str> = projects.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["braindrive-lib", "no-spec", "scout"]);
        assert_eq!(projects[0].description.as_deref(), Some("Just a one-liner."));
        assert_eq!(projects[1].description, None);
        assert_eq!(
            projects[2].description.as_deref(),
            Some("A markdown library of projects that AI agents read and write.")
        );
        assert!(projects[2].path.ends_with("scout"));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn unreadable_spec_keeps_project_listed() {
        let root = temp_library();
        write(&root, "good", "spec.md", "A readable project.");
        std::fs::create_dir_all(root.join("bad")).unwrap();
        std::fs::write(root.join("bad").join("spec.md"), [0xff, 0xfe, 0, b'x']).unwrap();

        let loader = ContextLoader::new(LocalLibrary::new(&root));
        let projects = loader.list_projects().await.unwrap();

        let ids: Vec<&str> = projects.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["bad", "good"]);
        assert_eq!(projects[0].description, None);
        assert_eq!(projects[1].description.as_deref(), Some("A readable project."));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn long_descriptions_are_capped() {
        let long = "x".repeat(150);
        let desc = describe(&long).unwrap();
        assert_eq!(desc.chars().count(), 100);
        assert!(desc.ends_with("..."));
        assert_eq!(describe("# Only\n## Headings\n"), None);
    }
}
