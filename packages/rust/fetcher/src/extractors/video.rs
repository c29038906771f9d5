//! Video strategy (YouTube).
//!
//! Metadata comes from the public oEmbed endpoint; the transcript comes from
//! the caption tracks advertised in the watch page's player configuration.

use std::sync::LazyLock;

use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::Deserialize;
use tracing::{debug, info, warn};

use scout_shared::{FetchConfig, FetchError};

use super::{Extraction, Extractor};
use crate::classify::{Source, SourceKind};
use crate::http::Http;
use crate::normalize;

const UNTITLED: &str = "YouTube Video";

const CAPTION_MARKER: &str = "\"captionTracks\":";

#[derive(Debug, Deserialize)]
struct VideoOEmbed {
    #[serde(default)]
    title: Option<String>,
}

/// One caption track advertised by the player configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    #[serde(default)]
    pub language_code: String,
    /// `Some("asr")` for auto-generated tracks.
    #[serde(default)]
    pub kind: Option<String>,
}

impl CaptionTrack {
    fn is_english(&self) -> bool {
        self.language_code == "en" || self.language_code.starts_with("en-")
    }

    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

/// Fetches video metadata and transcript text.
pub struct VideoExtractor {
    oembed_endpoint: String,
    watch_base: String,
}

impl VideoExtractor {
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            oembed_endpoint: config.youtube_oembed_endpoint.clone(),
            watch_base: config.youtube_watch_base.clone(),
        }
    }
}

#[async_trait]
impl Extractor for VideoExtractor {
    async fn extract(&self, http: &Http, source: &Source) -> Result<Extraction, FetchError> {
        let SourceKind::Video { id } = &source.kind else {
            return Err(FetchError::unsupported(format!(
                "{} is not a video URL",
                source.url
            )));
        };

        let watch_url = format!("{}{id}", self.watch_base);
        let query = [("url", source.url.as_str()), ("format", "json")];

        let (oembed, watch) = tokio::join!(
            http.get_json::<VideoOEmbed>(&self.oembed_endpoint, &query),
            http.get_page(&watch_url),
        );

        let oembed_title = match oembed {
            Ok(meta) => meta.title.filter(|t| !t.trim().is_empty()),
            Err(e) => {
                warn!(video_id = %id, error = %e, "video metadata unavailable");
                None
            }
        };

        let watch = watch?;

        let title = oembed_title
            .or_else(|| watch_page_title(&watch.body))
            .unwrap_or_else(|| UNTITLED.to_string());

        let tracks = find_caption_tracks(&watch.body);
        debug!(video_id = %id, tracks = tracks.len(), "caption tracks found");

        let track = pick_track(&tracks).ok_or_else(|| {
            FetchError::empty(format!("no transcript available for video {id}"))
        })?;

        let captions = http.get_page(&track.base_url).await?;
        let body = parse_timed_text(&captions.body);

        info!(
            video_id = %id,
            language = %track.language_code,
            generated = track.is_generated(),
            chars = body.len(),
            "transcript extracted"
        );

        Ok(Extraction { title, body })
    }

    fn name(&self) -> &str {
        "video"
    }
}

/// Caption tracks embedded in a watch page's player response.
///
/// Returns an empty list when the page advertises none or the array cannot
/// be decoded.
pub fn find_caption_tracks(watch_html: &str) -> Vec<CaptionTrack> {
    let Some(start) = watch_html.find(CAPTION_MARKER) else {
        return Vec::new();
    };
    let rest = watch_html[start + CAPTION_MARKER.len()..].trim_start();

    let Some(array) = balanced_array(rest) else {
        return Vec::new();
    };

    match serde_json::from_str::<Vec<CaptionTrack>>(array) {
        Ok(tracks) => tracks,
        Err(e) => {
            debug!(error = %e, "caption track list did not decode");
            Vec::new()
        }
    }
}

/// The leading `[...]` of `text`, matched with string-aware bracket counting.
fn balanced_array(text: &str) -> Option<&str> {
    if !text.starts_with('[') {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Manual English, then any English, then whatever is first.
pub fn pick_track(tracks: &[CaptionTrack]) -> Option<&CaptionTrack> {
    tracks
        .iter()
        .find(|t| t.is_english() && !t.is_generated())
        .or_else(|| tracks.iter().find(|t| t.is_english()))
        .or_else(|| tracks.first())
}

/// Join the cues of a timed-text document into one line of prose.
pub fn parse_timed_text(xml: &str) -> String {
    static TEXT: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("text").expect("valid selector"));
    static PARA: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("p").expect("valid selector"));

    let doc = Html::parse_document(xml);

    let mut cues: Vec<String> = doc
        .select(&TEXT)
        .map(|el| normalize::element_text(&el))
        .collect();
    if cues.is_empty() {
        cues = doc
            .select(&PARA)
            .map(|el| normalize::element_text(&el))
            .collect();
    }

    let joined = cues
        .iter()
        .map(|c| normalize::decode_entities(c))
        .filter(|c| !c.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    normalize::collapse_whitespace(&joined)
}

fn watch_page_title(html: &str) -> Option<String> {
    static TITLE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("title").expect("valid selector"));

    let doc = Html::parse_document(html);
    let raw = normalize::element_text(&doc.select(&TITLE).next()?);
    let title = raw.strip_suffix(" - YouTube").unwrap_or(&raw).trim();
    (!title.is_empty() && title != "YouTube").then(|| title.to_string())
}
