//! Relevance analysis: one model call per (content, project) pair.
//!
//! This crate provides:
//! - [`CompletionProvider`]: The language-model seam
//! - [`providers`]: Anthropic and OpenRouter backends
//! - [`Analyzer`]: Builds the prompt, calls the model, validates the verdict

pub mod parse;
pub mod prompt;
pub mod providers;

use std::time::Instant;

use async_trait::async_trait;
use tracing::{info, instrument};

use scout_shared::{
    AnalysisError, AnalyzerConfig, ExtractedContent, ProjectContext, ProviderKind,
    RelevanceVerdict,
};

pub use parse::parse_verdict;
pub use prompt::{build_prompt, render_context};
pub use providers::{AnthropicProvider, OpenRouterProvider};

/// A single-shot text completion backend.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send `prompt` as one user message and return the reply text.
    ///
    /// Transport failures, timeouts, non-2xx statuses and undecodable
    /// envelopes are all `provider_unavailable`.
    async fn complete(&self, prompt: &str) -> Result<String, AnalysisError>;

    /// Provider name for tracing.
    fn name(&self) -> &str;
}

/// Judges how relevant extracted content is to a project.
pub struct Analyzer {
    provider: Box<dyn CompletionProvider>,
}

impl Analyzer {
    pub fn new(provider: impl CompletionProvider + 'static) -> Self {
        Self {
            provider: Box::new(provider),
        }
    }

    /// Build the provider named by the configuration.
    pub fn from_config(config: &AnalyzerConfig) -> scout_shared::Result<Self> {
        Ok(match config.provider {
            ProviderKind::Anthropic => Self::new(AnthropicProvider::new(config)?),
            ProviderKind::Openrouter => Self::new(OpenRouterProvider::new(config)?),
        })
    }

    /// Ask the model for a verdict. Exactly one completion request per call.
    #[instrument(skip_all, fields(project = %context.project_id, provider = self.provider.name()))]
    pub async fn analyze(
        &self,
        content: &ExtractedContent,
        context: &ProjectContext,
    ) -> Result<RelevanceVerdict, AnalysisError> {
        let prompt = build_prompt(content, context);
        let started = Instant::now();

        let reply = self.provider.complete(&prompt).await?;
        let verdict = parse_verdict(&reply)?;

        info!(
            relevance = %verdict.relevance,
            insights = verdict.insights.len(),
            suggestions = verdict.suggestions.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "analysis complete"
        );

        Ok(verdict)
    }
}
