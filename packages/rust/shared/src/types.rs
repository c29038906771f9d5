//! Core domain types for Scout reviews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ContentType
// ---------------------------------------------------------------------------

/// The kind of resource behind a URL, which selects the extraction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Article,
    SocialPost,
    Video,
}

impl ContentType {
    /// Wire name (`article`, `social_post`, `video`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::SocialPost => "social_post",
            Self::Video => "video",
        }
    }

    /// Minimum trimmed body length (in chars) for an extraction to count as content.
    pub fn min_body_chars(&self) -> usize {
        match self {
            Self::Article => 200,
            Self::SocialPost => 20,
            Self::Video => 100,
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Relevance
// ---------------------------------------------------------------------------

/// Categorical verdict of how pertinent a resource is to a project.
///
/// Declaration order is ranking order: `High` sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relevance {
    High,
    Medium,
    Low,
    None,
}

impl Relevance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::None => "none",
        }
    }
}

impl std::fmt::Display for Relevance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Pipeline entities
// ---------------------------------------------------------------------------

/// An incoming request to review `url` against `project`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub url: String,
    pub project: String,
}

/// Normalized text pulled from a resource by the fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    /// The URL that was analyzed.
    pub url: String,
    pub title: String,
    /// Plain text, never empty on success.
    pub body: String,
    pub content_type: ContentType,
}

/// Which optional project document a supplementary text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplementaryKind {
    BuildPlan,
    Ideas,
}

impl SupplementaryKind {
    /// Fixed load order; earlier entries are higher-priority context.
    pub const ORDER: [SupplementaryKind; 2] = [Self::BuildPlan, Self::Ideas];

    /// File name within the project directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::BuildPlan => "build-plan.md",
            Self::Ideas => "ideas.md",
        }
    }

    /// Section heading used when the text is rendered into a prompt.
    pub fn heading(&self) -> &'static str {
        match self {
            Self::BuildPlan => "Build Plan",
            Self::Ideas => "Ideas",
        }
    }
}

/// One optional document appended after the project specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplementaryText {
    pub kind: SupplementaryKind,
    pub text: String,
}

/// The textual grounding for a relevance judgment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectContext {
    pub project_id: String,
    /// The project's `spec.md`, verbatim.
    pub spec_text: String,
    /// Build plan then ideas, whichever exist.
    pub supplementary_texts: Vec<SupplementaryText>,
}

/// A project discovered in the library, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: String,
    /// First prose line of the project's spec, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Location of the project within the library.
    pub path: String,
}

/// Structured output of the relevance analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelevanceVerdict {
    pub relevance: Relevance,
    pub insights: Vec<String>,
    pub suggestions: Vec<String>,
}

/// A completed review before the logger has stamped it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDraft {
    pub url: String,
    pub project: String,
    pub title: String,
    pub content_type: ContentType,
    pub verdict: RelevanceVerdict,
}

impl ReviewDraft {
    /// Attach the logging timestamp, producing the durable record.
    pub fn stamp(self, logged_at: DateTime<Utc>) -> ReviewRecord {
        ReviewRecord {
            url: self.url,
            project: self.project,
            title: self.title,
            content_type: self.content_type,
            relevance: self.verdict.relevance,
            insights: self.verdict.insights,
            suggestions: self.verdict.suggestions,
            logged_at,
        }
    }
}

/// The durable, per-project audit entry, and the response of a review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub url: String,
    pub project: String,
    pub title: String,
    pub content_type: ContentType,
    pub relevance: Relevance,
    pub insights: Vec<String>,
    pub suggestions: Vec<String>,
    pub logged_at: DateTime<Utc>,
}
