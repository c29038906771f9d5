//! Extraction strategies, one per [`SourceKind`](crate::SourceKind).
//!
//! Each strategy knows how to reach its provider's public surface and turn
//! the response into a title and a plain-text body. Length limits and the
//! minimum-content check are applied afterwards by the [`Fetcher`](crate::Fetcher).

mod article;
mod social;
mod video;

use async_trait::async_trait;

use scout_shared::FetchError;

use crate::classify::Source;
use crate::http::Http;

pub use article::{ArticleExtractor, parse_article};
pub use social::{SocialPostExtractor, parse_mirror_page, parse_oembed_html, synthesize_title};
pub use video::{CaptionTrack, VideoExtractor, find_caption_tracks, parse_timed_text, pick_track};

/// Raw result of an extraction strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub title: String,
    pub body: String,
}

/// Capability interface implemented once per content type.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Retrieve and extract the resource behind `source`.
    async fn extract(&self, http: &Http, source: &Source) -> Result<Extraction, FetchError>;

    /// Strategy name for tracing.
    fn name(&self) -> &str;
}
