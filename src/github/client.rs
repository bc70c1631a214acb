// GitHub API HTTP client.
// Issues single GET requests and classifies responses as success, not-found,
// or other failure.

use reqwest::{
    Client, Response, StatusCode,
    header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT},
};
use serde::Deserialize;

use crate::error::{Error, Result};

const GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// Error body shape returned by the GitHub API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Unauthenticated GitHub API client.
///
/// The base address is the only configuration surface; everything else rides
/// on reqwest defaults. Each call performs exactly one network round trip —
/// no retry, no backoff.
pub struct GitHubClient {
    client: Client,
    base_url: String,
}

impl GitHubClient {
    /// Create a client against the public GitHub API.
    pub fn new() -> Result<Self> {
        Self::with_base_url(GITHUB_API_BASE)
    }

    /// Create a client against a non-default API base address.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();

        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("hublook"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(Error::Network)?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Make a GET request to the API.
    ///
    /// Never touches the entity store; the fetch orchestrator owns all writes.
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "GET");

        let response = self.client.get(&url).send().await.map_err(Error::Network)?;
        check_response(response).await
    }
}

/// Check response status and convert errors.
///
/// 2xx passes the response through for the caller to deserialize. 404 is the
/// domain-meaningful "no such entity" outcome, distinct from every other
/// failure code.
async fn check_response(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = error_message(response.text().await.unwrap_or_default());
    tracing::debug!(code = status.as_u16(), %message, "request failed");

    match status {
        StatusCode::NOT_FOUND => Err(Error::NotFound { message }),
        _ => Err(Error::Status {
            code: status.as_u16(),
            message,
        }),
    }
}

/// Pull the `message` field out of a GitHub error body, falling back to the
/// raw text for non-JSON responses.
fn error_message(body: String) -> String {
    serde_json::from_str::<ApiErrorBody>(&body)
        .map(|b| b.message)
        .unwrap_or(body)
}
