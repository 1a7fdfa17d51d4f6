//! Access to the infoBMKG/data-cuaca repository on GitHub.
//!
//! Two endpoints are used: the contents API for listings and the raw content
//! host for file bodies. Both accept an optional bearer token taken from
//! `GITHUB_TOKEN`.

use std::env;

use reqwest::header::ACCEPT;
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};

pub const CONTENTS_API_BASE: &str = "https://api.github.com/repos/infoBMKG/data-cuaca/contents";
pub const RAW_CONTENT_BASE: &str = "https://raw.githubusercontent.com/infoBMKG/data-cuaca/main";
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

const GITHUB_JSON: &str = "application/vnd.github+json";

/// Base URLs requests are built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub contents_api: String,
    pub raw_content: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints {
            contents_api: CONTENTS_API_BASE.to_string(),
            raw_content: RAW_CONTENT_BASE.to_string(),
        }
    }
}

impl Endpoints {
    /// Contents API URL for `path`, or for the repository root when unset.
    ///
    /// The path is appended as given; no slashes are trimmed.
    pub fn listing_url(&self, path: Option<&str>) -> String {
        match path {
            Some(path) => format!("{}/{}", self.contents_api, path),
            None => self.contents_api.clone(),
        }
    }

    /// Raw content URL for `path`, appended as given.
    pub fn raw_url(&self, path: &str) -> String {
        format!("{}/{}", self.raw_content, path)
    }
}

fn user_agent() -> String {
    format!("data-cuaca/{}", env!("CARGO_PKG_VERSION"))
}

/// HTTP client carrying the optional GitHub token.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    token: Option<String>,
}

impl GitHubClient {
    /// Build a client with the crate's user agent. Empty tokens are ignored.
    pub fn new(token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent())
            .build()
            .map_err(Error::Client)?;
        Ok(Self::with_client(client, token))
    }

    /// Build a client using `GITHUB_TOKEN` when it is set.
    pub fn from_env() -> Result<Self> {
        Self::new(env::var(TOKEN_ENV).ok())
    }

    /// Wrap an already configured `reqwest::Client`.
    pub fn with_client(client: Client, token: Option<String>) -> Self {
        Self {
            client,
            token: token.filter(|t| !t.is_empty()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    async fn get(&self, url: &str, accept: Option<&str>, authenticate: bool) -> Result<Response> {
        let mut request = self.client.get(url);
        if let Some(accept) = accept {
            request = request.header(ACCEPT, accept);
        }
        let token = self.token.as_ref().filter(|_| authenticate);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        debug!(url, authenticated = token.is_some(), "sending request");
        let response = request.send().await.map_err(|source| Error::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        debug!(url, status = status.as_u16(), "received response");
        if !status.is_success() {
            warn!(url, status = status.as_u16(), "request rejected");
            return Err(Error::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }

    /// GET `url` and require the body to be JSON.
    pub async fn fetch_json(&self, url: &str) -> Result<Value> {
        self.get(url, Some(GITHUB_JSON), true)
            .await?
            .json::<Value>()
            .await
            .map_err(|source| Error::Decode {
                url: url.to_string(),
                source,
            })
    }

    /// GET `url` and return the body as text.
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        self.read_text(url, true).await
    }

    /// Like [`fetch_text`](Self::fetch_text) but never sends the token, for
    /// URLs outside GitHub.
    pub async fn fetch_public_text(&self, url: &str) -> Result<String> {
        self.read_text(url, false).await
    }

    async fn read_text(&self, url: &str, authenticate: bool) -> Result<String> {
        self.get(url, None, authenticate)
            .await?
            .text()
            .await
            .map_err(|source| Error::Body {
                url: url.to_string(),
                source,
            })
    }
}
