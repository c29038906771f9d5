//! URL classification: which extraction strategy handles a URL.
//!
//! Classification is a pure function of the URL. Only the private-address
//! guard's name lookup ([`resolves_to_private`]) touches the network.

use std::net::IpAddr;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;
use url::Url;

use scout_shared::{ContentType, FetchError};

/// File extensions that never carry extractable article text.
const MEDIA_EXTENSIONS: &[&str] = &[
    "pdf", "png", "jpg", "jpeg", "gif", "webp", "svg", "ico", "bmp", "mp3", "wav", "ogg", "flac",
    "mp4", "mov", "avi", "mkv", "webm", "zip", "gz", "tgz", "tar", "rar", "7z", "exe", "dmg",
    "iso", "doc", "docx", "xls", "xlsx", "ppt", "pptx",
];

const SOCIAL_HOSTS: &[&str] = &["x.com", "twitter.com"];

const VIDEO_HOSTS: &[&str] = &["youtube.com", "youtu.be"];

/// A classified URL, tagged with its extraction strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Article,
    SocialPost,
    Video {
        /// The 11-character video id.
        id: String,
    },
}

impl SourceKind {
    pub fn content_type(&self) -> ContentType {
        match self {
            Self::Article => ContentType::Article,
            Self::SocialPost => ContentType::SocialPost,
            Self::Video { .. } => ContentType::Video,
        }
    }
}

/// A URL paired with its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub url: Url,
    pub kind: SourceKind,
}

/// Classify `url` into one of the supported source kinds.
///
/// Fails with `unsupported` for non-http(s) schemes, host-less URLs, media
/// files, and video URLs without a resolvable video id.
pub fn classify(url: &Url) -> Result<Source, FetchError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(FetchError::unsupported(format!(
            "unsupported scheme '{}' in {url}",
            url.scheme()
        )));
    }

    let host = url
        .host_str()
        .ok_or_else(|| FetchError::unsupported(format!("URL has no host: {url}")))?
        .to_ascii_lowercase();

    let kind = if host_matches(&host, SOCIAL_HOSTS) {
        SourceKind::SocialPost
    } else if host_matches(&host, VIDEO_HOSTS) {
        let id = video_id(url).ok_or_else(|| {
            FetchError::unsupported(format!("no video id could be resolved from {url}"))
        })?;
        SourceKind::Video { id }
    } else if let Some(ext) = media_extension(url) {
        return Err(FetchError::unsupported(format!(
            "'.{ext}' files carry no article text: {url}"
        )));
    } else {
        SourceKind::Article
    };

    Ok(Source {
        url: url.clone(),
        kind,
    })
}

/// Match `host` exactly or as a subdomain of any of `domains`.
fn host_matches(host: &str, domains: &[&str]) -> bool {
    domains
        .iter()
        .any(|d| host == *d || host.ends_with(&format!(".{d}")))
}

fn media_extension(url: &Url) -> Option<String> {
    let last = url.path_segments()?.next_back()?;
    let (_, ext) = last.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    MEDIA_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Resolve the video id from any of the common YouTube URL shapes.
pub fn video_id(url: &Url) -> Option<String> {
    static ID_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("valid regex"));

    let host = url.host_str()?.to_ascii_lowercase();

    let candidate = if host == "youtu.be" {
        url.path_segments()?.next().map(str::to_string)
    } else {
        let mut segments = url.path_segments()?;
        match segments.next() {
            Some("watch") => url
                .query_pairs()
                .find(|(k, _)| k == "v")
                .map(|(_, v)| v.into_owned()),
            Some("embed" | "v" | "shorts" | "live") => segments.next().map(str::to_string),
            _ => None,
        }
    }?;

    ID_RE.is_match(&candidate).then_some(candidate)
}

// ---------------------------------------------------------------------------
// Private-address guard
// ---------------------------------------------------------------------------

/// Check if a URL targets a loopback, private, or local-only host.
pub fn is_private_target(url: &Url) -> bool {
    match url.host() {
        Some(url::Host::Ipv4(v4)) => is_private_ip(&IpAddr::V4(v4)),
        Some(url::Host::Ipv6(v6)) => is_private_ip(&IpAddr::V6(v6)),
        Some(url::Host::Domain(host)) => {
            let host = host.trim_end_matches('.').to_ascii_lowercase();
            host == "localhost"
                || host.ends_with(".localhost")
                || host.ends_with(".local")
                || host.ends_with(".internal")
        }
        None => true,
    }
}

/// Check if the URL's host name resolves to any private address.
///
/// IP literals are left to [`is_private_target`]. A failed lookup returns
/// `false` so the fetch itself reports the host as unreachable.
pub async fn resolves_to_private(url: &Url) -> bool {
    let Some(url::Host::Domain(host)) = url.host() else {
        return false;
    };
    let port = url.port_or_known_default().unwrap_or(80);

    match tokio::net::lookup_host((host, port)).await {
        Ok(addrs) => any_private(addrs.map(|addr| addr.ip())),
        Err(e) => {
            debug!(%host, error = %e, "host lookup failed");
            false
        }
    }
}

fn any_private(addrs: impl IntoIterator<Item = IpAddr>) -> bool {
    addrs.into_iter().any(|ip| is_private_ip(&ip))
}

/// Check if an IP is in a private/reserved range.
fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_unspecified()
                // 100.64.0.0/10 (Carrier-grade NAT)
                || (v4.octets()[0] == 100 && (v4.octets()[1] & 0xC0) == 64)
        }
        IpAddr::V6(v6) => {
            if let Some(v4) = v6.to_ipv4_mapped() {
                return is_private_ip(&IpAddr::V4(v4));
            }
            v6.is_loopback()
                || v6.is_unspecified()
                // fc00::/7 unique local, fe80::/10 link local
                || (v6.segments()[0] & 0xfe00) == 0xfc00
                || (v6.segments()[0] & 0xffc0) == 0xfe80
        }
    }
}
