//! Project library backed by a GitHub repository (contents API).

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use scout_shared::{ContextError, ScoutError};

use crate::ProjectLibrary;

const USER_AGENT: &str = concat!("Scout/", env!("CARGO_PKG_VERSION"));

const API_VERSION: &str = "2022-11-28";

/// One entry of a directory listing.
#[derive(Debug, Deserialize)]
struct DirEntry {
    name: String,
    #[serde(rename = "type")]
    kind: String,
}

/// A single file's contents response.
#[derive(Debug, Deserialize)]
struct FileContents {
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: String,
}

/// Reads projects from `<projects_dir>/<project>/` in a GitHub repository.
#[derive(Debug, Clone)]
pub struct GitHubLibrary {
    client: Client,
    api_base: String,
    repo: String,
    projects_dir: String,
    token: Option<String>,
}

impl GitHubLibrary {
    pub fn new(
        api_base: impl Into<String>,
        repo: impl Into<String>,
        projects_dir: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> scout_shared::Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ScoutError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            repo: repo.into(),
            projects_dir: projects_dir.into().trim_matches('/').to_string(),
            token,
        })
    }

    fn contents_url(&self, path: &str) -> String {
        let mut full = self.projects_dir.clone();
        if !path.is_empty() {
            if !full.is_empty() {
                full.push('/');
            }
            full.push_str(path);
        }
        format!("{}/repos/{}/contents/{full}", self.api_base, self.repo)
    }

    /// GET a contents path; `Ok(None)` on 404.
    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<T>, ContextError> {
        let url = self.contents_url(path);
        debug!(%url, "GET contents");

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github.v3+json")
            .header("X-GitHub-Api-Version", API_VERSION);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ContextError::unavailable(format!("{url}: library request timed out"))
            } else {
                ContextError::unavailable(format!("{url}: {e}"))
            }
        })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .json::<T>()
                .await
                .map(Some)
                .map_err(|e| ContextError::unavailable(format!("{url}: unreadable response: {e}"))),
            status => Err(ContextError::unavailable(format!("{url}: HTTP {status}"))),
        }
    }
}

#[async_trait]
impl ProjectLibrary for GitHubLibrary {
    async fn list_project_dirs(&self) -> Result<Vec<String>, ContextError> {
        let entries: Vec<DirEntry> = self.get("").await?.ok_or_else(|| {
            ContextError::unavailable(format!(
                "projects directory '{}' not found in {}",
                self.projects_dir, self.repo
            ))
        })?;

        Ok(entries
            .into_iter()
            .filter(|e| e.kind == "dir")
            .map(|e| e.name)
            .collect())
    }

    async fn project_exists(&self, project: &str) -> Result<bool, ContextError> {
        // A directory answers with an array; a file of the same name does not count.
        let listing: Option<serde_json::Value> = self.get(project).await?;
        Ok(listing.is_some_and(|v| v.is_array()))
    }

    async fn read_document(
        &self,
        project: &str,
        file: &str,
    ) -> Result<Option<String>, ContextError> {
        let path = format!("{project}/{file}");
        let Some(contents) = self.get::<FileContents>(&path).await? else {
            return Ok(None);
        };

        if contents.encoding != "base64" {
            return Err(ContextError::unavailable(format!(
                "{path}: unexpected encoding '{}'",
                contents.encoding
            )));
        }

        let packed: String = contents
            .content
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = STANDARD
            .decode(packed)
            .map_err(|e| ContextError::unavailable(format!("{path}: invalid base64: {e}")))?;
        let text = String::from_utf8(bytes)
            .map_err(|e| ContextError::unavailable(format!("{path}: not UTF-8: {e}")))?;

        Ok(Some(text))
    }

    fn location(&self, project: &str) -> String {
        if self.projects_dir.is_empty() {
            format!("{}:{project}", self.repo)
        } else {
            format!("{}:{}/{project}", self.repo, self.projects_dir)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_shared::ContextFailure;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn library(server: &MockServer, token: Option<&str>) -> GitHubLibrary {
        GitHubLibrary::new(
            server.uri(),
            "acme/library",
            "projects/active",
            token.map(str::to_string),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn encoded(text: &str) -> String {
        // GitHub wraps base64 bodies at 60 columns.
        let raw = STANDARD.encode(text);
        raw.as_bytes()
            .chunks(60)
            .map(|c| String::from_utf8_lossy(c).into_owned())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn contents_urls() {
        let lib = GitHubLibrary::new(
            "https://api.github.com/",
            "acme/library",
            "/projects/active/",
            None,
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            lib.contents_url("scout/spec.md"),
            "https://api.github.com/repos/acme/library/contents/projects/active/scout/spec.md"
        );
        assert_eq!(
            lib.contents_url(""),
            "https://api.github.com/repos/acme/library/contents/projects/active"
        );
        assert_eq!(lib.location("scout"), "acme/library:projects/active/scout");
    }

    #[tokio::test]
    async fn reads_base64_document_with_auth() {
        let server = MockServer::start().await;
        let spec = "# Scout\n\nReviews resources against project specs. ".repeat(4);
        Mock::given(method("GET"))
            .and(path("/repos/acme/library/contents/projects/active/scout/spec.md"))
            .and(header("authorization", "Bearer secret-token"))
            .and(header("x-github-api-version", API_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "spec.md",
                "encoding": "base64",
                "content": encoded(&spec),
            })))
            .mount(&server)
            .await;

        let lib = library(&server, Some("secret-token"));
        let text = lib.read_document("scout", "spec.md").await.unwrap();
        assert_eq!(text.as_deref(), Some(spec.as_str()));
    }

    #[tokio::test]
    async fn missing_document_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let lib = library(&server, None);
        assert_eq!(lib.read_document("scout", "ideas.md").await.unwrap(), None);
        assert!(!lib.project_exists("scout").await.unwrap());
    }

    #[tokio::test]
    async fn lists_only_directories() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/library/contents/projects/active"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"name": "scout", "type": "dir"},
                {"name": "README.md", "type": "file"},
                {"name": "braindrive-lib", "type": "dir"},
            ])))
            .mount(&server)
            .await;

        let lib = library(&server, None);
        let dirs = lib.list_project_dirs().await.unwrap();
        assert_eq!(dirs, vec!["scout".to_string(), "braindrive-lib".to_string()]);
    }

    #[tokio::test]
    async fn server_errors_are_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let lib = library(&server, None);
        let err = lib.read_document("scout", "spec.md").await.unwrap_err();
        assert_eq!(err.reason, ContextFailure::Unavailable);
        assert!(err.message.contains("500"));
    }
}
