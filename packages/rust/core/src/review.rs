//! End-to-end review pipeline: URL + project → fetch → context → analyze → log.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{Instrument, info, info_span, warn};
use url::Url;
use uuid::Uuid;

use scout_analyzer::Analyzer;
use scout_fetcher::Fetcher;
use scout_library::ContextLoader;
use scout_research_log::ResearchLogger;
use scout_shared::{
    AnalyzerConfig, ContentType, FetchConfig, LibraryConfig, LogConfig, Relevance, ReviewDraft,
    ReviewRecord, ReviewRequest,
};

use crate::error::ReviewError;

/// Runtime configuration for every stage of the pipeline.
#[derive(Debug, Clone)]
pub struct ReviewerConfig {
    pub fetch: FetchConfig,
    pub library: LibraryConfig,
    pub analyzer: AnalyzerConfig,
    pub logs: LogConfig,
}

/// One project's verdict within a [`MultiProjectReview`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectRelevance {
    pub project: String,
    pub relevance: Relevance,
    pub insights: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Result of reviewing one URL against every project in the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultiProjectReview {
    pub url: String,
    pub title: String,
    pub content_type: ContentType,
    /// Only `high` and `medium` verdicts, high first.
    pub results: Vec<ProjectRelevance>,
    pub reviewed_at: DateTime<Utc>,
}

/// Progress callback for reporting pipeline status.
pub trait ReviewProgress: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Per-project progress during a multi-project review.
    fn project_progress(&self, current: usize, total: usize, project: &str);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ReviewProgress for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn project_progress(&self, _current: usize, _total: usize, _project: &str) {}
}

/// Wires the four stages together.
pub struct Reviewer {
    fetcher: Fetcher,
    loader: ContextLoader,
    analyzer: Analyzer,
    logger: ResearchLogger,
}

impl Reviewer {
    pub fn new(
        fetcher: Fetcher,
        loader: ContextLoader,
        analyzer: Analyzer,
        logger: ResearchLogger,
    ) -> Self {
        Self {
            fetcher,
            loader,
            analyzer,
            logger,
        }
    }

    /// Build every stage from its runtime configuration.
    pub fn from_config(config: ReviewerConfig) -> scout_shared::Result<Self> {
        Ok(Self::new(
            Fetcher::new(config.fetch)?,
            ContextLoader::from_config(&config.library)?,
            Analyzer::from_config(&config.analyzer)?,
            ResearchLogger::from_config(&config.logs),
        ))
    }

    /// Review `request.url` against `request.project` and log the verdict.
    ///
    /// Fetching and context loading run concurrently; the first failure
    /// cancels the other. Nothing is logged unless every stage succeeds.
    pub async fn review(
        &self,
        request: &ReviewRequest,
        progress: &dyn ReviewProgress,
    ) -> Result<ReviewRecord, ReviewError> {
        let review_id = Uuid::now_v7();
        let span = info_span!(
            "review",
            %review_id,
            url = %request.url,
            project = %request.project
        );

        self.run_review(request, progress).instrument(span).await
    }

    async fn run_review(
        &self,
        request: &ReviewRequest,
        progress: &dyn ReviewProgress,
    ) -> Result<ReviewRecord, ReviewError> {
        let start = Instant::now();
        let url = validate_url(&request.url)?;
        let project = request.project.trim();
        if project.is_empty() {
            return Err(ReviewError::invalid("project identifier is empty"));
        }

        info!("starting review");

        // --- Phase 1: Fetch + context ---
        progress.phase("Fetching content and loading project context");
        let (content, context) = tokio::try_join!(
            async { self.fetcher.fetch(url.as_str()).await.map_err(ReviewError::from) },
            async { self.loader.load(project).await.map_err(ReviewError::from) },
        )
        .inspect_err(|e| warn!(stage = %e.stage(), reason = e.reason(), "review aborted"))?;

        // --- Phase 2: Analyze ---
        progress.phase("Analyzing relevance");
        let verdict = self
            .analyzer
            .analyze(&content, &context)
            .await
            .inspect_err(|e| warn!(reason = %e.reason, "analysis failed"))?;

        // --- Phase 3: Log ---
        progress.phase("Writing research log");
        let draft = ReviewDraft {
            url: content.url,
            project: context.project_id,
            title: content.title,
            content_type: content.content_type,
            verdict,
        };
        let record = self.logger.log(draft).await?;

        info!(
            relevance = %record.relevance,
            content_type = %record.content_type,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "review complete"
        );

        Ok(record)
    }

    /// Review `url` against every project, keeping `high` and `medium` verdicts.
    ///
    /// An invalid URL, a failed fetch, or an unlistable library aborts the
    /// run. Per-project failures are skipped with a warning.
    pub async fn review_all(
        &self,
        url: &str,
        progress: &dyn ReviewProgress,
    ) -> Result<MultiProjectReview, ReviewError> {
        let review_id = Uuid::now_v7();
        let span = info_span!("review_all", %review_id, url = %url);

        self.run_review_all(url, progress).instrument(span).await
    }

    async fn run_review_all(
        &self,
        url: &str,
        progress: &dyn ReviewProgress,
    ) -> Result<MultiProjectReview, ReviewError> {
        let start = Instant::now();
        let url = validate_url(url)?;

        progress.phase("Fetching content and listing projects");
        let (content, projects) = tokio::try_join!(
            async { self.fetcher.fetch(url.as_str()).await.map_err(ReviewError::from) },
            async { self.loader.list_projects().await.map_err(ReviewError::from) },
        )?;

        progress.phase("Analyzing projects");
        let total = projects.len();
        let mut results = Vec::new();

        for (i, summary) in projects.iter().enumerate() {
            progress.project_progress(i + 1, total, &summary.id);

            let context = match self.loader.load(&summary.id).await {
                Ok(context) => context,
                Err(e) => {
                    warn!(project = %summary.id, error = %e, "skipping project");
                    continue;
                }
            };

            let verdict = match self.analyzer.analyze(&content, &context).await {
                Ok(verdict) => verdict,
                Err(e) => {
                    warn!(project = %summary.id, error = %e, "skipping project");
                    continue;
                }
            };

            if !matches!(verdict.relevance, Relevance::High | Relevance::Medium) {
                continue;
            }

            let draft = ReviewDraft {
                url: content.url.clone(),
                project: summary.id.clone(),
                title: content.title.clone(),
                content_type: content.content_type,
                verdict: verdict.clone(),
            };
            if let Err(e) = self.logger.log(draft).await {
                warn!(project = %summary.id, error = %e, "verdict not logged");
            }

            results.push(ProjectRelevance {
                project: summary.id.clone(),
                relevance: verdict.relevance,
                insights: verdict.insights,
                suggestions: verdict.suggestions,
            });
        }

        // Stable: ties keep listing order.
        results.sort_by_key(|r| r.relevance);

        info!(
            projects = total,
            relevant = results.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "multi-project review complete"
        );

        Ok(MultiProjectReview {
            url: content.url,
            title: content.title,
            content_type: content.content_type,
            results,
            reviewed_at: Utc::now(),
        })
    }

    pub fn loader(&self) -> &ContextLoader {
        &self.loader
    }

    pub fn logger(&self) -> &ResearchLogger {
        &self.logger
    }
}

/// Absolute http(s) URL, or `InvalidRequest`.
fn validate_url(raw: &str) -> Result<Url, ReviewError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ReviewError::invalid("url is empty"));
    }
    let url =
        Url::parse(raw).map_err(|e| ReviewError::invalid(format!("malformed url '{raw}': {e}")))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ReviewError::invalid(format!(
            "url must be http or https, got '{}'",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(ReviewError::invalid(format!("url has no host: {raw}")));
    }
    Ok(url)
}
