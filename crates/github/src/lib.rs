//! gh-dispatch GitHub infrastructure adapter.
//!
//! Implements [`dispatch::RestClient`] over `reqwest`: base URL handling,
//! bearer authentication, the GitHub media type and API version headers, and
//! mapping of non-success responses to [`dispatch::TransportError`].
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules. Response
//! bodies are handed back undecoded; the `tracker` crate owns decoding.

use std::time::Duration;

use async_trait::async_trait;
use dispatch::{RestClient, TransportError};
use reqwest::header::{ACCEPT, USER_AGENT as USER_AGENT_HEADER};
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

/// Public GitHub REST API root.
pub const DEFAULT_API_URL: &str = "https://api.github.com/";

const API_VERSION: &str = "2022-11-28";
const MEDIA_TYPE: &str = "application/vnd.github+json";
const USER_AGENT: &str = concat!("gh-dispatch/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while constructing a [`GithubClient`].
#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to build HTTP client")]
    Http(#[from] reqwest::Error),
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Configures a [`GithubClient`].
///
/// The transport can be injected with [`GithubClientBuilder::http_client`];
/// otherwise one is built with a 30 second timeout. GitHub headers and the
/// token are added per request either way.
#[derive(Debug, Default)]
pub struct GithubClientBuilder {
    base_url: Option<String>,
    token: Option<String>,
    http: Option<reqwest::Client>,
    timeout: Option<Duration>,
}

impl GithubClientBuilder {
    /// API root, e.g. `https://ghe.example.com/api/v3` for GitHub Enterprise.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Bearer token sent with every request.
    pub fn token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    /// Sends requests through `http` instead of a client built here.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Ignored when a transport was injected.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Validates the base URL and builds the client.
    pub fn build(self) -> Result<GithubClient, ClientBuildError> {
        let raw = self.base_url.unwrap_or_else(|| DEFAULT_API_URL.to_owned());
        let base_url = parse_base_url(&raw)?;
        let http = match self.http {
            Some(http) => http,
            None => reqwest::Client::builder()
                .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
                .build()?,
        };
        Ok(GithubClient {
            http,
            base_url,
            token: self.token,
        })
    }
}

/// Parses the API root, adding the trailing slash `Url::join` needs to keep
/// the last path segment.
fn parse_base_url(raw: &str) -> Result<Url, ClientBuildError> {
    let normalised = if raw.ends_with('/') {
        raw.to_owned()
    } else {
        format!("{raw}/")
    };
    let url = Url::parse(&normalised).map_err(|e| ClientBuildError::InvalidBaseUrl {
        url: raw.to_owned(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ClientBuildError::InvalidBaseUrl {
            url: raw.to_owned(),
            reason: "not a hierarchical URL".to_owned(),
        });
    }
    Ok(url)
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// REST client for the GitHub API.
#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl std::fmt::Debug for GithubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl GithubClient {
    /// Starts configuring a client for the public API.
    pub fn builder() -> GithubClientBuilder {
        GithubClientBuilder::default()
    }

    /// The normalised API root, always ending in `/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves a relative API path (with optional query) against the base URL.
    pub fn url(&self, path: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| TransportError::InvalidUrl {
                path: path.to_owned(),
                reason: e.to_string(),
            })
    }

    async fn send(&self, request: RequestBuilder, url: &Url) -> Result<String, TransportError> {
        let request = request
            .header(ACCEPT, MEDIA_TYPE)
            .header("X-GitHub-Api-Version", API_VERSION)
            .header(USER_AGENT_HEADER, USER_AGENT);
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;
        debug!(status = status.as_u16(), bytes = body.len(), "response");

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                message: error_message(status, &body),
                url: url.to_string(),
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl RestClient for GithubClient {
    #[instrument(level = "debug", skip(self))]
    async fn get(&self, path: &str) -> Result<String, TransportError> {
        let url = self.url(path)?;
        self.send(self.http.get(url.clone()), &url).await
    }

    #[instrument(level = "debug", skip(self, body))]
    async fn post(&self, path: &str, body: &Value) -> Result<String, TransportError> {
        let url = self.url(path)?;
        self.send(self.http.post(url.clone()).json(body), &url).await
    }
}

/// The `message` of a GitHub error body, falling back to the status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown Status").to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> GithubClient {
        GithubClient::builder().base_url(base).build().unwrap()
    }

    #[test]
    fn paths_join_onto_the_public_api() {
        let client = GithubClient::builder().build().unwrap();
        assert_eq!(
            client.url("repos/o/r/actions/runs/1").unwrap().as_str(),
            "https://api.github.com/repos/o/r/actions/runs/1"
        );
    }

    #[test]
    fn enterprise_base_keeps_its_path_prefix() {
        let client = client("https://ghe.example.com/api/v3");
        assert_eq!(
            client
                .url("/repos/o/r/actions/runs?name=ci&event=workflow_dispatch")
                .unwrap()
                .as_str(),
            "https://ghe.example.com/api/v3/repos/o/r/actions/runs?name=ci&event=workflow_dispatch"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = GithubClient::builder().base_url("not a url").build().unwrap_err();
        assert!(matches!(err, ClientBuildError::InvalidBaseUrl { .. }));
        let err = GithubClient::builder().base_url("mailto:x@y.z").build().unwrap_err();
        assert!(matches!(err, ClientBuildError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn error_message_prefers_github_body() {
        assert_eq!(
            error_message(StatusCode::NOT_FOUND, r#"{"message": "Not Found", "documentation_url": "x"}"#),
            "Not Found"
        );
        assert_eq!(
            error_message(StatusCode::UNPROCESSABLE_ENTITY, "<html>"),
            "Unprocessable Entity"
        );
    }

    #[test]
    fn debug_output_redacts_the_token() {
        let client = GithubClient::builder()
            .token(Some("ghp_secret".into()))
            .build()
            .unwrap();
        let shown = format!("{client:?}");
        assert!(!shown.contains("ghp_secret"));
        assert!(shown.contains("<redacted>"));
    }

    #[tokio::test]
    async fn refused_connection_is_a_transport_error() {
        let client = client("http://127.0.0.1:9");
        let err = client.get("repos/o/r/actions/runs/1").await.unwrap_err();
        assert!(matches!(err, TransportError::Connection(_)));
    }
}
