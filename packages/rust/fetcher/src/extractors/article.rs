//! Web article strategy.
//!
//! Uses readability heuristics to find the primary content container and
//! takes the title from page metadata, then the first heading.

use std::sync::LazyLock;

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::debug;

use scout_shared::FetchError;

use super::{Extraction, Extractor};
use crate::classify::Source;
use crate::http::Http;
use crate::normalize;

/// Containers tried in order; the first match holds the article.
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "main",
    r#"[role="main"]"#,
    ".post-content",
    ".article-content",
    ".entry-content",
];

const UNTITLED: &str = "Untitled Article";

/// Fetches a page and keeps only its primary text.
pub struct ArticleExtractor;

#[async_trait]
impl Extractor for ArticleExtractor {
    async fn extract(&self, http: &Http, source: &Source) -> Result<Extraction, FetchError> {
        let page = http.get_page(source.url.as_str()).await?;

        if !page.is_html() {
            return Err(FetchError::unsupported(format!(
                "{}: not an HTML page ({})",
                source.url,
                page.content_type.as_deref().unwrap_or("unknown type")
            )));
        }

        parse_article(&page.body)
    }

    fn name(&self) -> &str {
        "article"
    }
}

/// Extract title and body text from a full HTML document.
pub fn parse_article(html: &str) -> Result<Extraction, FetchError> {
    let doc = Html::parse_document(html);

    let title = page_title(&doc).unwrap_or_else(|| UNTITLED.to_string());

    let content_html = CONTENT_SELECTORS
        .iter()
        .find_map(|sel_str| {
            let sel = Selector::parse(sel_str).expect("valid selector");
            doc.select(&sel).next().map(|el| {
                debug!(selector = sel_str, "content container found");
                el.inner_html()
            })
        })
        .or_else(|| {
            static BODY: LazyLock<Selector> =
                LazyLock::new(|| Selector::parse("body").expect("valid selector"));
            doc.select(&BODY).next().map(|el| el.inner_html())
        })
        .unwrap_or_default();

    let body = normalize::html_to_text(&content_html)?;

    Ok(Extraction { title, body })
}

/// `<title>`, then `og:title`, then the first `<h1>`.
fn page_title(doc: &Html) -> Option<String> {
    static TITLE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("head title, title").expect("valid selector"));
    static OG_TITLE: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(r#"meta[property="og:title"], meta[name="twitter:title"]"#)
            .expect("valid selector")
    });
    static H1: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("h1").expect("valid selector"));

    let non_empty = |s: String| (!s.is_empty()).then_some(s);

    doc.select(&TITLE)
        .next()
        .and_then(|el| non_empty(normalize::element_text(&el)))
        .or_else(|| {
            doc.select(&OG_TITLE)
                .filter_map(|el| el.value().attr("content"))
                .map(normalize::collapse_whitespace)
                .find(|s| !s.is_empty())
        })
        .or_else(|| {
            doc.select(&H1)
                .next()
                .and_then(|el| non_empty(normalize::element_text(&el)))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOG_POST: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Building a Local-First AI System</title>
  <meta property="og:title" content="OG Title">
</head>
<body>
  <header><a href="/">Blog</a> <a href="/about">About</a></header>
  <nav class="sidebar"><ul><li>Archive</li></ul></nav>
  <article>
    <h1>Building a Local-First AI System</h1>
    <p>Plugins let every user extend their assistant without a server.</p>
    <p>We store conversations in <a href="https://sqlite.org">SQLite</a> on device.</p>
    <aside>Subscribe to our newsletter!</aside>
  </article>
  <footer>Copyright 2025</footer>
  <script>window.analytics = {};</script>
</body>
</html>"#;

    #[test]
    fn extracts_article_container() {
        let extraction = parse_article(BLOG_POST).unwrap();
        assert_eq!(extraction.title, "Building a Local-First AI System");
        assert!(extraction.body.contains("Plugins let every user extend"));
        assert!(extraction.body.contains("conversations in SQLite on device"));
        assert!(!extraction.body.contains("Subscribe"));
        assert!(!extraction.body.contains("Archive"));
        assert!(!extraction.body.contains("Copyright"));
        assert!(!extraction.body.contains("analytics"));
    }

    #[test]
    fn title_falls_back_to_og_then_h1() {
        let og = r#"<html><head><meta property="og:title" content="From OG"></head>
            <body><main><h1>Heading</h1><p>Text</p></main></body></html>"#;
        assert_eq!(parse_article(og).unwrap().title, "From OG");

        let h1 = r#"<html><body><main><h1>Only Heading</h1><p>Text</p></main></body></html>"#;
        assert_eq!(parse_article(h1).unwrap().title, "Only Heading");

        let none = r#"<html><body><p>Just text</p></body></html>"#;
        assert_eq!(parse_article(none).unwrap().title, UNTITLED);
    }

    #[test]
    fn falls_back_to_body_without_chrome() {
        let html = r#"<html><body>
            <nav>Menu</nav>
            <div class="wrapper"><p>Body level prose.</p></div>
            <footer>Footer links</footer>
        </body></html>"#;
        let extraction = parse_article(html).unwrap();
        assert!(extraction.body.contains("Body level prose."));
        assert!(!extraction.body.contains("Menu"));
        assert!(!extraction.body.contains("Footer links"));
    }

    #[test]
    fn empty_page_yields_empty_body() {
        let extraction = parse_article("<html><head><title>Blank</title></head><body></body></html>")
            .unwrap();
        assert_eq!(extraction.title, "Blank");
        assert!(extraction.body.trim().is_empty());
    }
}
