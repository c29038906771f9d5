//! Language-model backends behind [`CompletionProvider`](crate::CompletionProvider).

pub mod anthropic;
pub mod openrouter;

use std::time::Duration;

use reqwest::{Client, Response};

use scout_shared::{AnalysisError, ScoutError};

pub use anthropic::AnthropicProvider;
pub use openrouter::OpenRouterProvider;

/// Longest slice of an error body echoed into a message.
const ERROR_BODY_PREVIEW: usize = 300;

fn build_client(timeout: Duration) -> scout_shared::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ScoutError::config(format!("failed to build HTTP client: {e}")))
}

fn transport_error(provider: &str, e: reqwest::Error) -> AnalysisError {
    if e.is_timeout() {
        AnalysisError::provider_unavailable(format!("{provider} request timed out"))
    } else {
        AnalysisError::provider_unavailable(format!("{provider} request failed: {e}"))
    }
}

/// Pass a 2xx response through; anything else becomes `provider_unavailable`.
async fn ensure_success(provider: &str, response: Response) -> Result<Response, AnalysisError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let preview: String = body.chars().take(ERROR_BODY_PREVIEW).collect();
    Err(AnalysisError::provider_unavailable(format!(
        "{provider} returned HTTP {status}: {preview}"
    )))
}
