//! data-cuaca
//!
//! Core library for browsing the infoBMKG/data-cuaca weather repository:
//! directory listings come from the GitHub contents API, file bodies from the
//! raw content host. JSON payloads are re-printed with two-space indentation.
//! A city name can stand in for a path via a `{code, name}` city index.
//!
//! The binary crate parses arguments into [`Options`] and calls [`run`].

pub mod cities;
pub mod cli;
pub mod error;
pub mod github;

use serde_json::Value;
use tracing::debug;

pub use cities::{City, CityIndex, CityMatch};
pub use cli::{Invocation, Mode, Options, usage};
pub use error::{Error, Result};
pub use github::{Endpoints, GitHubClient};

/// Pretty-print a JSON value with two-space indentation, keeping key order.
pub fn render_json(value: &Value) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Error::Render)
}

/// Perform the single fetch described by `options` and return what should be
/// written to stdout.
pub async fn dispatch(
    options: &Options,
    client: &GitHubClient,
    endpoints: &Endpoints,
) -> Result<String> {
    let resolved;
    let options = match options.city.as_deref() {
        Some(city) => {
            resolved = cities::resolve_options(options, city, client).await?;
            &resolved
        }
        None => options,
    };

    let mode = options.mode()?;
    debug!(?mode, "dispatching");

    match mode {
        Mode::Listing { path } => {
            let url = endpoints.listing_url(path);
            let listing = client.fetch_json(&url).await?;
            render_json(&listing)
        }
        Mode::Raw { path } => client.fetch_text(&endpoints.raw_url(path)).await,
        Mode::Json { path } => {
            let url = endpoints.raw_url(path);
            let body = client.fetch_text(&url).await?;
            let value: Value =
                serde_json::from_str(&body).map_err(|source| Error::NotJson { url, source })?;
            render_json(&value)
        }
    }
}

/// [`dispatch`] against the public repository, authenticated from the
/// environment.
pub async fn run(options: &Options) -> Result<String> {
    let client = GitHubClient::from_env()?;
    dispatch(options, &client, &Endpoints::default()).await
}
