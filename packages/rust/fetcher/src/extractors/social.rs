//! Social post strategy (X / Twitter).
//!
//! The provider's public oEmbed endpoint is tried first; its embed markup holds
//! the post text and author. Read-only mirror instances are the fallback.

use std::sync::LazyLock;

use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use scout_shared::{FetchConfig, FetchError};

use super::{Extraction, Extractor};
use crate::classify::Source;
use crate::http::Http;
use crate::normalize;

/// Characters of post text used in a synthesized title.
const TITLE_PREFIX_CHARS: usize = 60;

/// Subset of the oEmbed response we use.
#[derive(Debug, Deserialize)]
struct OEmbed {
    #[serde(default)]
    author_name: Option<String>,
    #[serde(default)]
    html: String,
}

/// Text pulled from a mirror's rendering of a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorPost {
    pub author: Option<String>,
    pub text: String,
}

/// Fetches post text via oEmbed, then mirrors.
pub struct SocialPostExtractor {
    oembed_endpoint: String,
    mirrors: Vec<String>,
}

impl SocialPostExtractor {
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            oembed_endpoint: config.twitter_oembed_endpoint.clone(),
            mirrors: config.social_mirrors.clone(),
        }
    }
}

#[async_trait]
impl Extractor for SocialPostExtractor {
    async fn extract(&self, http: &Http, source: &Source) -> Result<Extraction, FetchError> {
        let mut reachable = false;
        let mut failures: Vec<String> = Vec::new();

        let query = [
            ("url", source.url.as_str()),
            ("omit_script", "true"),
            ("dnt", "true"),
        ];
        match http.get_json::<OEmbed>(&self.oembed_endpoint, &query).await {
            Ok(embed) => {
                reachable = true;
                if let Some(text) = parse_oembed_html(&embed.html) {
                    let author = embed
                        .author_name
                        .filter(|a| !a.trim().is_empty())
                        .unwrap_or_else(|| handle_from_url(&source.url));
                    info!(surface = "oembed", chars = text.len(), "social post extracted");
                    return Ok(Extraction {
                        title: synthesize_title(&author, &text),
                        body: text,
                    });
                }
                debug!("oEmbed response carried no post text");
            }
            Err(e) => {
                debug!(error = %e, "oEmbed lookup failed");
                failures.push(e.message);
            }
        }

        for mirror in &self.mirrors {
            let mirror_url = mirror_url(mirror, &source.url);
            match http.get_page(&mirror_url).await {
                Ok(page) => {
                    reachable = true;
                    if let Some(post) = parse_mirror_page(&page.body) {
                        let author = post.author.unwrap_or_else(|| handle_from_url(&source.url));
                        info!(surface = %mirror, chars = post.text.len(), "social post extracted");
                        return Ok(Extraction {
                            title: synthesize_title(&author, &post.text),
                            body: post.text,
                        });
                    }
                    debug!(%mirror_url, "mirror page carried no post text");
                }
                Err(e) => {
                    debug!(%mirror_url, error = %e, "mirror fetch failed");
                    failures.push(e.message);
                }
            }
        }

        if reachable {
            Err(FetchError::empty(format!(
                "{}: no post text found; the post may be protected or deleted",
                source.url
            )))
        } else {
            Err(FetchError::unreachable(failures.join("; ")))
        }
    }

    fn name(&self) -> &str {
        "social_post"
    }
}

/// Post text from an oEmbed blockquote: each paragraph, in order.
///
/// The first paragraph is the post; any further paragraphs are quoted text.
pub fn parse_oembed_html(html: &str) -> Option<String> {
    static PARAGRAPH: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("blockquote p").expect("valid selector"));

    let fragment = Html::parse_fragment(html);
    let paragraphs: Vec<String> = fragment
        .select(&PARAGRAPH)
        .map(|el| normalize::element_text(&el))
        .filter(|t| !t.is_empty())
        .collect();

    (!paragraphs.is_empty()).then(|| paragraphs.join("\n\n"))
}

/// Post text, quoted text, and author from a mirror's HTML page.
pub fn parse_mirror_page(html: &str) -> Option<MirrorPost> {
    static CONTENT: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(".main-tweet .tweet-content, .tweet-content").expect("valid selector")
    });
    static QUOTE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse(".quote-text").expect("valid selector"));
    static AUTHOR: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(".main-tweet .fullname, .fullname").expect("valid selector")
    });

    let doc = Html::parse_document(html);

    let text = doc
        .select(&CONTENT)
        .next()
        .map(|el| normalize::element_text(&el))
        .filter(|t| !t.is_empty())?;

    let quoted = doc
        .select(&QUOTE)
        .next()
        .map(|el| normalize::element_text(&el))
        .filter(|t| !t.is_empty());

    let author = doc
        .select(&AUTHOR)
        .next()
        .map(|el| normalize::element_text(&el))
        .filter(|t| !t.is_empty());

    let text = match quoted {
        Some(q) => format!("{text}\n\nQuoted: {q}"),
        None => text,
    };

    Some(MirrorPost { author, text })
}

/// `"<author>: <first 60 chars>"`, with an ellipsis only when the text was cut.
pub fn synthesize_title(author: &str, text: &str) -> String {
    let flat = normalize::collapse_whitespace(text);
    let mut prefix: String = flat.chars().take(TITLE_PREFIX_CHARS).collect();
    if flat.chars().count() > TITLE_PREFIX_CHARS {
        prefix = format!("{}…", prefix.trim_end());
    }
    format!("{}: {prefix}", author.trim())
}

/// Same post path on a mirror host (scheme optional in the mirror entry).
fn mirror_url(mirror: &str, original: &Url) -> String {
    let base = if mirror.contains("://") {
        mirror.trim_end_matches('/').to_string()
    } else {
        format!("https://{}", mirror.trim_end_matches('/'))
    };
    format!("{base}{}", original.path())
}

/// `@handle` from `https://x.com/<handle>/status/<id>`.
fn handle_from_url(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut s| s.next())
        .filter(|h| !h.is_empty())
        .map(|h| format!("@{h}"))
        .unwrap_or_else(|| "X post".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use scout_shared::FetchFailure;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const EMBED_HTML: &str = r#"<blockquote class="twitter-tweet"><p lang="en" dir="ltr">Shipping a plugin system for local AI today. Every feature is a plugin, even the chat UI. <a href="https://t.co/abc">https://t.co/abc</a></p>&mdash; Dev Person (@devperson) <a href="https://twitter.com/devperson/status/1">May 1, 2025</a></blockquote>"#;

    const MIRROR_HTML: &str = r#"<html><body>
        <div class="main-tweet">
          <a class="fullname" href="/devperson">Dev Person</a>
          <div class="tweet-content media-body">Owning your AI means owning the data.</div>
          <div class="quote"><div class="quote-text">Cloud AI is renting intelligence.</div></div>
        </div>
    </body></html>"#;

    fn source(raw: &str) -> Source {
        classify(&Url::parse(raw).unwrap()).unwrap()
    }

    fn config_for(server: &MockServer, mirrors: Vec<String>) -> FetchConfig {
        FetchConfig {
            twitter_oembed_endpoint: format!("{}/oembed", server.uri()),
            social_mirrors: mirrors,
            ..FetchConfig::default()
        }
    }

    #[test]
    fn oembed_html_yields_post_text() {
        let text = parse_oembed_html(EMBED_HTML).unwrap();
        assert!(text.starts_with("Shipping a plugin system for local AI today."));
        assert!(!text.contains("May 1, 2025"));
    }

    #[test]
    fn mirror_page_includes_quote() {
        let post = parse_mirror_page(MIRROR_HTML).unwrap();
        assert_eq!(post.author.as_deref(), Some("Dev Person"));
        assert_eq!(
            post.text,
            "Owning your AI means owning the data.\n\nQuoted: Cloud AI is renting intelligence."
        );
        assert!(parse_mirror_page("<html><body><p>login</p></body></html>").is_none());
    }

    #[test]
    fn title_synthesis() {
        assert_eq!(synthesize_title("Ann", "short post"), "Ann: short post");
        let long = "word ".repeat(30);
        let title = synthesize_title("Ann", &long);
        assert!(title.ends_with('…'));
        assert!(title.chars().count() <= "Ann: ".len() + TITLE_PREFIX_CHARS + 1);
    }

    #[test]
    fn mirror_urls_and_handles() {
        let url = Url::parse("https://x.com/devperson/status/123").unwrap();
        assert_eq!(mirror_url("nitter.net", &url), "https://nitter.net/devperson/status/123");
        assert_eq!(
            mirror_url("http://127.0.0.1:9000/", &url),
            "http://127.0.0.1:9000/devperson/status/123"
        );
        assert_eq!(handle_from_url(&url), "@devperson");
    }

    #[tokio::test]
    async fn extracts_via_oembed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oembed"))
            .and(query_param("url", "https://x.com/devperson/status/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "author_name": "Dev Person",
                "html": EMBED_HTML,
            })))
            .mount(&server)
            .await;

        let extractor = SocialPostExtractor::new(&config_for(&server, vec![]));
        let http = Http::new(&FetchConfig::default()).unwrap();
        let extraction = extractor
            .extract(&http, &source("https://x.com/devperson/status/1"))
            .await
            .unwrap();

        assert!(extraction.title.starts_with("Dev Person: Shipping a plugin system"));
        assert!(extraction.body.contains("Every feature is a plugin"));
    }

    #[tokio::test]
    async fn falls_back_to_mirror() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oembed"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/devperson/status/2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(MIRROR_HTML))
            .mount(&server)
            .await;

        let extractor = SocialPostExtractor::new(&config_for(&server, vec![server.uri()]));
        let http = Http::new(&FetchConfig::default()).unwrap();
        let extraction = extractor
            .extract(&http, &source("https://twitter.com/devperson/status/2"))
            .await
            .unwrap();

        assert_eq!(
            extraction.title,
            "Dev Person: Owning your AI means owning the data."
        );
        assert!(extraction.body.contains("Quoted: Cloud AI"));
    }

    #[tokio::test]
    async fn reachable_but_textless_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oembed"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"html": ""})),
            )
            .mount(&server)
            .await;

        let extractor = SocialPostExtractor::new(&config_for(&server, vec![]));
        let http = Http::new(&FetchConfig::default()).unwrap();
        let err = extractor
            .extract(&http, &source("https://x.com/devperson/status/3"))
            .await
            .unwrap_err();
        assert_eq!(err.reason, FetchFailure::Empty);
    }

    #[tokio::test]
    async fn all_surfaces_down_is_unreachable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let extractor = SocialPostExtractor::new(&config_for(&server, vec![server.uri()]));
        let http = Http::new(&FetchConfig::default()).unwrap();
        let err = extractor
            .extract(&http, &source("https://x.com/devperson/status/4"))
            .await
            .unwrap_err();
        assert_eq!(err.reason, FetchFailure::Unreachable);
        assert!(err.message.contains("503"));
    }
}
