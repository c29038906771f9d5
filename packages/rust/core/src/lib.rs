//! Review orchestration for Scout.
//!
//! This crate ties together fetching, context loading, relevance analysis,
//! and research logging into end-to-end workflows ([`Reviewer::review`] and
//! [`Reviewer::review_all`]).

pub mod error;
pub mod review;

pub use error::{ReviewError, ReviewStage};
pub use review::{
    MultiProjectReview, ProjectRelevance, ReviewProgress, Reviewer, ReviewerConfig,
    SilentProgress,
};

// Stage components, for callers that need one stage on its own.
pub use scout_analyzer::{Analyzer, CompletionProvider};
pub use scout_fetcher::Fetcher;
pub use scout_library::ContextLoader;
pub use scout_research_log::{ResearchLogger, render_markdown};
