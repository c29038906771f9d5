//! Content fetching: URL in, normalized text out.
//!
//! This crate provides:
//! - [`classify`]: Decides which strategy handles a URL (article, social post, video)
//! - [`extractors`]: One [`Extractor`] per content type
//! - [`Fetcher`]: Runs the right strategy and enforces length limits
//!
//! Every failure is reported as a [`FetchError`] with reason `unreachable`,
//! `unsupported`, or `empty`.

pub mod classify;
pub mod extractors;
mod http;
pub mod normalize;

use tracing::{info, instrument, warn};
use url::Url;

use scout_shared::{ContentType, ExtractedContent, FetchConfig, FetchError};

pub use classify::{
    Source, SourceKind, classify, is_private_target, resolves_to_private, video_id,
};
pub use extractors::{
    ArticleExtractor, Extraction, Extractor, SocialPostExtractor, VideoExtractor,
};
pub use http::{Http, Page};

/// Fetches a URL with the strategy matching its content type.
pub struct Fetcher {
    config: FetchConfig,
    http: Http,
    article: ArticleExtractor,
    social: SocialPostExtractor,
    video: VideoExtractor,
}

impl Fetcher {
    /// Create a fetcher with the given configuration.
    pub fn new(config: FetchConfig) -> scout_shared::Result<Self> {
        let http = Http::new(&config)?;
        Ok(Self {
            social: SocialPostExtractor::new(&config),
            video: VideoExtractor::new(&config),
            article: ArticleExtractor,
            http,
            config,
        })
    }

    /// Retrieve `raw_url` and return its title and plain-text body.
    ///
    /// The body is never shorter than the content type's minimum (else
    /// `empty`) and never longer than its limit (else truncated with a
    /// visible marker).
    #[instrument(skip_all, fields(url = %raw_url))]
    pub async fn fetch(&self, raw_url: &str) -> Result<ExtractedContent, FetchError> {
        let url = Url::parse(raw_url.trim())
            .map_err(|e| FetchError::unsupported(format!("invalid URL '{raw_url}': {e}")))?;

        let source = classify(&url)?;

        if !self.config.allow_private_hosts
            && (is_private_target(&source.url) || resolves_to_private(&source.url).await)
        {
            warn!("refusing private or local address");
            return Err(FetchError::unsupported(format!(
                "{url} points at a private or local address"
            )));
        }

        let extractor = self.extractor_for(&source.kind);
        let content_type = source.kind.content_type();
        info!(strategy = extractor.name(), "fetching");

        let extraction = extractor.extract(&self.http, &source).await?;

        let body = extraction.body.trim();
        let chars = body.chars().count();
        if chars < content_type.min_body_chars() {
            return Err(FetchError::empty(format!(
                "{url}: only {chars} characters of {content_type} text extracted (need {})",
                content_type.min_body_chars()
            )));
        }

        let body = normalize::truncate_chars(body, self.max_chars(content_type));

        let title = match extraction.title.trim() {
            "" => default_title(content_type).to_string(),
            t => t.to_string(),
        };

        info!(%content_type, chars, title = %title, "content extracted");

        Ok(ExtractedContent {
            url: url.to_string(),
            title,
            body,
            content_type,
        })
    }

    fn extractor_for(&self, kind: &SourceKind) -> &dyn Extractor {
        match kind {
            SourceKind::Article => &self.article,
            SourceKind::SocialPost => &self.social,
            SourceKind::Video { .. } => &self.video,
        }
    }

    fn max_chars(&self, content_type: ContentType) -> usize {
        match content_type {
            ContentType::Video => self.config.max_transcript_chars,
            ContentType::Article | ContentType::SocialPost => self.config.max_article_chars,
        }
    }
}

fn default_title(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Article => "Untitled Article",
        ContentType::SocialPost => "X post",
        ContentType::Video => "YouTube Video",
    }
}
