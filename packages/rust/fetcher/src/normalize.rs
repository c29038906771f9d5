//! HTML-to-text normalization.
//!
//! Content HTML is converted to Markdown with `htmd` (which keeps headings and
//! list structure readable), then a series of cleanup passes reduces it to
//! plain prose: images go, links keep only their text, stray tags are
//! stripped, whitespace is normalized.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;

use scout_shared::FetchError;

/// Elements dropped wholesale during conversion.
const SKIP_TAGS: &[&str] = &[
    "script", "style", "nav", "header", "footer", "aside", "iframe", "noscript", "svg", "form",
    "button",
];

/// Appended when a body is cut to its size limit.
pub const TRUNCATION_MARKER: &str = "[Content truncated...]";

/// Convert a content HTML fragment into normalized plain text.
pub fn html_to_text(html: &str) -> Result<String, FetchError> {
    let converter = htmd::HtmlToMarkdown::builder()
        .skip_tags(SKIP_TAGS.to_vec())
        .build();

    let markdown = converter
        .convert(html)
        .map_err(|e| FetchError::empty(format!("HTML conversion failed: {e}")))?;

    Ok(run_pipeline(&markdown))
}

/// Visible text of an element, whitespace-collapsed.
pub fn element_text(el: &scraper::ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<String>())
}

/// Visible text of an HTML fragment, whitespace-collapsed.
pub fn fragment_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    collapse_whitespace(&fragment.root_element().text().collect::<String>())
}

/// Collapse every run of whitespace into a single space and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut `text` to at most `max_chars` characters, on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((byte_idx, _)) => {
            format!("{}\n\n{TRUNCATION_MARKER}", text[..byte_idx].trim_end())
        }
    }
}

/// Decode the handful of HTML entities left in already-extracted text.
///
/// Caption payloads are frequently double-escaped (`&amp;#39;`), so the
/// scraper's own decoding leaves one layer behind.
pub fn decode_entities(text: &str) -> String {
    static ENTITY_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"&(#x?[0-9a-fA-F]+|[a-zA-Z]+);").expect("valid regex"));

    ENTITY_RE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            let decoded = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ if name.starts_with("#x") || name.starts_with("#X") => {
                    u32::from_str_radix(&name[2..], 16).ok().and_then(char::from_u32)
                }
                _ if name.starts_with('#') => name[1..].parse().ok().and_then(char::from_u32),
                _ => None,
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

// ---------------------------------------------------------------------------
// Cleanup pipeline
// ---------------------------------------------------------------------------

/// Run the full cleanup pipeline on raw Markdown text.
fn run_pipeline(md: &str) -> String {
    let mut result = strip_images(md);
    result = unwrap_links(&result);
    result = strip_leftover_html(&result);
    normalize_whitespace(&result)
}

/// Drop Markdown image references entirely.
fn strip_images(md: &str) -> String {
    static IMG_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").expect("valid regex"));

    IMG_RE.replace_all(md, "").into_owned()
}

/// Replace `[text](url)` with `text`.
fn unwrap_links(md: &str) -> String {
    static LINK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").expect("valid regex"));

    LINK_RE.replace_all(md, "$1").into_owned()
}

/// Remove stray HTML tags outside code blocks (content is kept).
fn strip_leftover_html(md: &str) -> String {
    static TAG_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"</?[a-zA-Z][^>]*>").expect("valid regex"));

    let mut lines = Vec::new();
    let mut in_code_block = false;

    for line in md.lines() {
        if line.trim_start().starts_with("```") {
            in_code_block = !in_code_block;
            lines.push(line.to_string());
            continue;
        }

        if in_code_block {
            lines.push(line.to_string());
        } else {
            lines.push(TAG_RE.replace_all(line, "").into_owned());
        }
    }

    lines.join("\n")
}

/// Trim line ends, drop whitespace-only lines into blank lines, and keep at
/// most one blank line between paragraphs.
fn normalize_whitespace(md: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut blank_run = 0;

    for line in md.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run == 1 && !out.is_empty() {
                out.push("");
            }
            continue;
        }
        blank_run = 0;
        out.push(line);
    }

    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }

    out.join("\n")
}
