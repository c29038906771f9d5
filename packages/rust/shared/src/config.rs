//! Application configuration for Scout.
//!
//! User config lives at `~/.scout/scout.toml`. Every field has a default, so a
//! missing file is equivalent to an empty one. Secrets are never stored in the
//! file: it names the environment variables that hold them, and the runtime
//! configs ([`FetchConfig`], [`LibraryConfig`], [`AnalyzerConfig`],
//! [`LogConfig`]) are resolved once by the app and injected into each stage.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoutError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "scout.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".scout";

// ---------------------------------------------------------------------------
// Config structs (matching scout.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Project library location.
    #[serde(default)]
    pub library: LibrarySection,

    /// Language-model provider settings.
    #[serde(default)]
    pub analyzer: AnalyzerSection,

    /// Content fetching limits and endpoints.
    #[serde(default)]
    pub fetch: FetchSection,

    /// Research log storage.
    #[serde(default)]
    pub logs: LogsSection,
}

/// Where project documents are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryBackend {
    /// A directory tree on disk.
    Local,
    /// A GitHub repository, read through the contents API.
    Github,
}

/// `[library]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibrarySection {
    #[serde(default = "default_backend")]
    pub backend: LibraryBackend,

    /// Library root directory (local backend).
    #[serde(default = "default_library_root")]
    pub root: String,

    /// `owner/repo` slug (github backend).
    #[serde(default)]
    pub repo: String,

    /// Directory, relative to the library root, holding one folder per project.
    #[serde(default = "default_projects_dir")]
    pub projects_dir: String,

    /// Name of the env var holding the GitHub token.
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// GitHub API base URL.
    #[serde(default = "default_github_api")]
    pub api_base: String,

    #[serde(default = "default_library_timeout")]
    pub timeout_secs: u64,
}

impl Default for LibrarySection {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            root: default_library_root(),
            repo: String::new(),
            projects_dir: default_projects_dir(),
            token_env: default_token_env(),
            api_base: default_github_api(),
            timeout_secs: default_library_timeout(),
        }
    }
}

fn default_backend() -> LibraryBackend {
    LibraryBackend::Local
}
fn default_library_root() -> String {
    "~/BrainDrive-Library".into()
}
fn default_projects_dir() -> String {
    "projects/active".into()
}
fn default_token_env() -> String {
    "GITHUB_TOKEN".into()
}
fn default_github_api() -> String {
    "https://api.github.com".into()
}
fn default_library_timeout() -> u64 {
    30
}

/// Which completion API the analyzer talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Anthropic,
    Openrouter,
}

/// `[analyzer]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerSection {
    #[serde(default = "default_provider")]
    pub provider: ProviderKind,

    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_model_timeout")]
    pub timeout_secs: u64,

    /// Override for the provider's completion endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl Default for AnalyzerSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_key_env: default_api_key_env(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_model_timeout(),
            endpoint: None,
        }
    }
}

fn default_provider() -> ProviderKind {
    ProviderKind::Anthropic
}
fn default_api_key_env() -> String {
    "ANTHROPIC_API_KEY".into()
}
fn default_model() -> String {
    "claude-sonnet-4-20250514".into()
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_model_timeout() -> u64 {
    60
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchSection {
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,

    /// Article and social-post bodies are cut to this many chars.
    #[serde(default = "default_max_article_chars")]
    pub max_article_chars: usize,

    /// Video transcripts are cut to this many chars.
    #[serde(default = "default_max_transcript_chars")]
    pub max_transcript_chars: usize,

    /// Read-only mirror hosts tried for social posts after oEmbed.
    #[serde(default = "default_social_mirrors")]
    pub social_mirrors: Vec<String>,

    #[serde(default = "default_twitter_oembed")]
    pub twitter_oembed_endpoint: String,

    #[serde(default = "default_youtube_oembed")]
    pub youtube_oembed_endpoint: String,

    /// Watch page base; the video id is appended.
    #[serde(default = "default_youtube_watch_base")]
    pub youtube_watch_base: String,

    /// Allow fetching loopback/private addresses.
    #[serde(default)]
    pub allow_private_hosts: bool,
}

impl Default for FetchSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout(),
            max_article_chars: default_max_article_chars(),
            max_transcript_chars: default_max_transcript_chars(),
            social_mirrors: default_social_mirrors(),
            twitter_oembed_endpoint: default_twitter_oembed(),
            youtube_oembed_endpoint: default_youtube_oembed(),
            youtube_watch_base: default_youtube_watch_base(),
            allow_private_hosts: false,
        }
    }
}

fn default_fetch_timeout() -> u64 {
    30
}
fn default_max_article_chars() -> usize {
    10_000
}
fn default_max_transcript_chars() -> usize {
    15_000
}
fn default_social_mirrors() -> Vec<String> {
    vec!["nitter.net".into(), "nitter.privacydev.net".into()]
}
fn default_twitter_oembed() -> String {
    "https://publish.twitter.com/oembed".into()
}
fn default_youtube_oembed() -> String {
    "https://www.youtube.com/oembed".into()
}
fn default_youtube_watch_base() -> String {
    "https://www.youtube.com/watch?v=".into()
}

/// `[logs]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsSection {
    /// Directory holding one `<project>.jsonl` research log per project.
    #[serde(default = "default_logs_dir")]
    pub dir: String,
}

impl Default for LogsSection {
    fn default() -> Self {
        Self {
            dir: default_logs_dir(),
        }
    }
}

fn default_logs_dir() -> String {
    "~/.scout/logs".into()
}

// ---------------------------------------------------------------------------
// Runtime configs (resolved from AppConfig + environment)
// ---------------------------------------------------------------------------

/// Runtime fetcher configuration.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub max_article_chars: usize,
    pub max_transcript_chars: usize,
    /// Mirror hosts (with or without scheme) tried in order for social posts.
    pub social_mirrors: Vec<String>,
    pub twitter_oembed_endpoint: String,
    pub youtube_oembed_endpoint: String,
    pub youtube_watch_base: String,
    pub allow_private_hosts: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::from(&FetchSection::default())
    }
}

impl From<&FetchSection> for FetchConfig {
    fn from(section: &FetchSection) -> Self {
        Self {
            timeout: Duration::from_secs(section.timeout_secs),
            max_article_chars: section.max_article_chars,
            max_transcript_chars: section.max_transcript_chars,
            social_mirrors: section.social_mirrors.clone(),
            twitter_oembed_endpoint: section.twitter_oembed_endpoint.clone(),
            youtube_oembed_endpoint: section.youtube_oembed_endpoint.clone(),
            youtube_watch_base: section.youtube_watch_base.clone(),
            allow_private_hosts: section.allow_private_hosts,
        }
    }
}

/// Runtime project-library configuration.
#[derive(Debug, Clone)]
pub enum LibraryConfig {
    Local {
        /// Directory holding one folder per project.
        projects_root: PathBuf,
    },
    Github {
        api_base: String,
        /// `owner/repo`.
        repo: String,
        projects_dir: String,
        token: Option<String>,
        timeout: Duration,
    },
}

/// Runtime analyzer configuration, including the resolved API key.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub provider: ProviderKind,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
    /// Completion endpoint; `None` uses the provider's public URL.
    pub endpoint: Option<String>,
}

/// Runtime research-log configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub dir: PathBuf,
}

impl AppConfig {
    /// Fetcher settings (no secrets involved).
    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig::from(&self.fetch)
    }

    /// Library settings; the GitHub backend reads its token from the environment.
    pub fn library_config(&self) -> Result<LibraryConfig> {
        let section = &self.library;
        match section.backend {
            LibraryBackend::Local => {
                let root = expand_tilde(&section.root)?;
                Ok(LibraryConfig::Local {
                    projects_root: root.join(&section.projects_dir),
                })
            }
            LibraryBackend::Github => {
                if !section.repo.contains('/') {
                    return Err(ScoutError::config(format!(
                        "library.repo must be an 'owner/repo' slug, got '{}'",
                        section.repo
                    )));
                }
                let token = std::env::var(&section.token_env)
                    .ok()
                    .filter(|t| !t.is_empty());
                if token.is_none() {
                    tracing::warn!(
                        env = %section.token_env,
                        "no GitHub token set, using unauthenticated requests"
                    );
                }
                Ok(LibraryConfig::Github {
                    api_base: section.api_base.trim_end_matches('/').to_string(),
                    repo: section.repo.clone(),
                    projects_dir: section.projects_dir.trim_matches('/').to_string(),
                    token,
                    timeout: Duration::from_secs(section.timeout_secs),
                })
            }
        }
    }

    /// Analyzer settings with the API key resolved from its env var.
    pub fn analyzer_config(&self) -> Result<AnalyzerConfig> {
        let section = &self.analyzer;
        let api_key = resolve_api_key(section)?;
        Ok(AnalyzerConfig {
            provider: section.provider,
            api_key,
            model: section.model.clone(),
            max_tokens: section.max_tokens,
            timeout: Duration::from_secs(section.timeout_secs),
            endpoint: section.endpoint.clone(),
        })
    }

    /// Research log settings.
    pub fn log_config(&self) -> Result<LogConfig> {
        Ok(LogConfig {
            dir: expand_tilde(&self.logs.dir)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.scout/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| ScoutError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.scout/scout.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ScoutError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| ScoutError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ScoutError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ScoutError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ScoutError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the analyzer API key from the env var the config names.
pub fn resolve_api_key(section: &AnalyzerSection) -> Result<String> {
    let var_name = &section.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(ScoutError::config(format!(
            "{} API key not found. Set the {var_name} environment variable.",
            match section.provider {
                ProviderKind::Anthropic => "Anthropic",
                ProviderKind::Openrouter => "OpenRouter",
            }
        ))),
    }
}

/// Expand `~` or a leading `~/` against the user's home directory.
///
/// `~user` forms are left untouched.
pub fn expand_tilde(path: &str) -> Result<PathBuf> {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return Ok(PathBuf::from(path)),
    };
    let home =
        dirs::home_dir().ok_or_else(|| ScoutError::config("could not determine home directory"))?;
    if rest.is_empty() {
        Ok(home)
    } else {
        Ok(home.join(rest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("projects_dir"));
        assert!(toml_str.contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.fetch.timeout_secs, 30);
        assert_eq!(parsed.analyzer.provider, ProviderKind::Anthropic);
        assert_eq!(parsed.library.backend, LibraryBackend::Local);
    }

    #[test]
    fn config_with_github_library() {
        let toml_str = r#"
[library]
backend = "github"
repo = "BrainDriveAI/BrainDrive-Library"

[analyzer]
provider = "openrouter"
api_key_env = "OPENROUTER_API_KEY"
model = "anthropic/claude-sonnet-4"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.library.backend, LibraryBackend::Github);
        assert_eq!(config.library.projects_dir, "projects/active");
        assert_eq!(config.analyzer.provider, ProviderKind::Openrouter);
        assert_eq!(config.analyzer.max_tokens, 1024);
    }

    #[test]
    fn fetch_config_from_app_config() {
        let app = AppConfig::default();
        let fetch = app.fetch_config();
        assert_eq!(fetch.timeout, Duration::from_secs(30));
        assert_eq!(fetch.max_article_chars, 10_000);
        assert_eq!(fetch.max_transcript_chars, 15_000);
        assert!(!fetch.allow_private_hosts);
    }

    #[test]
    fn local_library_joins_projects_dir() {
        let mut app = AppConfig::default();
        app.library.root = "/srv/library".into();
        match app.library_config().expect("library config") {
            LibraryConfig::Local { projects_root } => {
                assert_eq!(projects_root, PathBuf::from("/srv/library/projects/active"));
            }
            other => panic!("expected local library, got {other:?}"),
        }
    }

    #[test]
    fn github_library_requires_slug() {
        let mut app = AppConfig::default();
        app.library.backend = LibraryBackend::Github;
        app.library.repo = "no-slash".into();
        let err = app.library_config().unwrap_err();
        assert!(err.to_string().contains("owner/repo"));
    }

    #[test]
    fn api_key_validation() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.analyzer.api_key_env = "SCOUT_TEST_NONEXISTENT_KEY_12345".into();
        let result = config.analyzer_config();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API key not found"));
    }

    #[test]
    fn tilde_expansion() {
        assert_eq!(expand_tilde("/abs/path").unwrap(), PathBuf::from("/abs/path"));
        let expanded = expand_tilde("~/logs").unwrap();
        assert!(expanded.ends_with("logs"));
        assert!(!expanded.to_string_lossy().contains('~'));

        assert_eq!(expand_tilde("~").unwrap(), dirs::home_dir().unwrap());
        assert_eq!(expand_tilde("~other/x").unwrap(), PathBuf::from("~other/x"));
        assert_eq!(expand_tilde("logs/~/x").unwrap(), PathBuf::from("logs/~/x"));
    }
}
