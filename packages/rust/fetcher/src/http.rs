//! Thin HTTP layer shared by the extraction strategies.
//!
//! Every failure is mapped onto [`FetchError`]: transport errors, timeouts and
//! non-success statuses are `unreachable`; oversized bodies and redirects to
//! private addresses are `unsupported`.

use std::error::Error as _;
use std::fmt;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use tracing::debug;

use scout_shared::{FetchConfig, FetchError, ScoutError};

use crate::classify::is_private_target;

/// User-Agent string for fetch requests.
const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; Scout/",
    env!("CARGO_PKG_VERSION"),
    "; +resource-review)"
);

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// Maximum response size we consider valid (10 MB).
const MAX_RESPONSE_SIZE: u64 = 10 * 1024 * 1024;

/// Redirect hop refused by the private-address guard.
#[derive(Debug)]
struct PrivateRedirect(String);

impl fmt::Display for PrivateRedirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "redirect to private or local address {}", self.0)
    }
}

impl std::error::Error for PrivateRedirect {}

/// A fetched document body with its declared media type.
#[derive(Debug, Clone)]
pub struct Page {
    pub body: String,
    /// Lowercased `Content-Type` header, if the server sent one.
    pub content_type: Option<String>,
}

impl Page {
    /// Whether the server declared an HTML (or unspecified) body.
    pub fn is_html(&self) -> bool {
        match &self.content_type {
            Some(ct) => ct.contains("text/html") || ct.contains("application/xhtml"),
            None => true,
        }
    }
}

/// Shared HTTP client with the fetcher's timeout and redirect policy.
#[derive(Debug, Clone)]
pub struct Http {
    client: Client,
    timeout_secs: u64,
}

impl Http {
    /// Build a client from the fetch configuration.
    pub fn new(config: &FetchConfig) -> scout_shared::Result<Self> {
        let guard_private = !config.allow_private_hosts;
        let redirects = reqwest::redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() >= MAX_REDIRECTS {
                attempt.error(format!("more than {MAX_REDIRECTS} redirects"))
            } else if guard_private && is_private_target(attempt.url()) {
                let target = attempt.url().to_string();
                attempt.error(PrivateRedirect(target))
            } else {
                attempt.follow()
            }
        });

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(redirects)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ScoutError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            timeout_secs: config.timeout.as_secs(),
        })
    }

    /// GET `url` and return the body as text.
    pub async fn get_page(&self, url: &str) -> Result<Page, FetchError> {
        debug!(%url, "GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.network_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::unreachable(format!("{url}: HTTP {status}")));
        }

        if let Some(len) = response.content_length() {
            if len > MAX_RESPONSE_SIZE {
                return Err(FetchError::unsupported(format!(
                    "{url}: response too large ({len} bytes, max {MAX_RESPONSE_SIZE})"
                )));
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase());

        let body = response
            .text()
            .await
            .map_err(|e| self.network_error(url, e))?;

        Ok(Page { body, content_type })
    }

    /// GET `url` with query parameters and decode a JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        debug!(%url, "GET json");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.network_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::unreachable(format!("{url}: HTTP {status}")));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FetchError::unreachable(format!("{url}: unreadable JSON: {e}")))
    }

    fn network_error(&self, url: &str, e: reqwest::Error) -> FetchError {
        let mut source = e.source();
        while let Some(cause) = source {
            if let Some(refused) = cause.downcast_ref::<PrivateRedirect>() {
                return FetchError::unsupported(format!("{url}: {refused}"));
            }
            source = cause.source();
        }

        if e.is_timeout() {
            FetchError::unreachable(format!("{url}: timed out after {}s", self.timeout_secs))
        } else {
            FetchError::unreachable(format!("{url}: {e}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_shared::FetchFailure;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn html_detection() {
        let page = Page {
            body: String::new(),
            content_type: Some("text/html; charset=utf-8".into()),
        };
        assert!(page.is_html());

        let pdf = Page {
            body: String::new(),
            content_type: Some("application/pdf".into()),
        };
        assert!(!pdf.is_html());
    }

    #[tokio::test]
    async fn non_success_status_is_unreachable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let http = Http::new(&FetchConfig::default()).unwrap();
        let err = http
            .get_page(&format!("{}/gone", server.uri()))
            .await
            .unwrap_err();
        assert_eq!(err.reason, FetchFailure::Unreachable);
        assert!(err.message.contains("404"));
    }

    #[tokio::test]
    async fn slow_response_times_out_as_unreachable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("late")
                    .set_delay(std::time::Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let config = FetchConfig {
            timeout: std::time::Duration::from_millis(200),
            ..FetchConfig::default()
        };
        let http = Http::new(&config).unwrap();
        let err = http
            .get_page(&format!("{}/slow", server.uri()))
            .await
            .unwrap_err();
        assert_eq!(err.reason, FetchFailure::Unreachable);
        assert!(err.message.contains("timed out"));
    }

    #[tokio::test]
    async fn redirect_to_private_address_is_refused() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hop"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("location", "http://169.254.169.254/latest/meta-data"),
            )
            .mount(&server)
            .await;

        let http = Http::new(&FetchConfig::default()).unwrap();
        let err = http
            .get_page(&format!("{}/hop", server.uri()))
            .await
            .unwrap_err();
        assert_eq!(err.reason, FetchFailure::Unsupported);
        assert!(err.message.contains("private"), "{}", err.message);
    }

    #[tokio::test]
    async fn redirects_followed_when_private_hosts_allowed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(
                ResponseTemplate::new(301).insert_header("location", format!("{}/new", server.uri())),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200).set_body_string("moved here"))
            .mount(&server)
            .await;

        let config = FetchConfig {
            allow_private_hosts: true,
            ..FetchConfig::default()
        };
        let http = Http::new(&config).unwrap();
        let page = http.get_page(&format!("{}/old", server.uri())).await.unwrap();
        assert_eq!(page.body, "moved here");
    }

    #[tokio::test]
    async fn get_json_sends_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oembed"))
            .and(query_param("url", "https://x.com/a/status/1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"title": "ok"})),
            )
            .mount(&server)
            .await;

        let http = Http::new(&FetchConfig::default()).unwrap();
        let value: serde_json::Value = http
            .get_json(
                &format!("{}/oembed", server.uri()),
                &[("url", "https://x.com/a/status/1")],
            )
            .await
            .unwrap();
        assert_eq!(value["title"], "ok");
    }
}
