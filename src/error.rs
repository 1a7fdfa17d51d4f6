//! Error taxonomy for the data-cuaca client.

use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the data-cuaca library.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can end an invocation early.
#[derive(Debug, Error)]
pub enum Error {
    /// Neither `--list` nor `--path` was given.
    #[error("--path is required when not using --list")]
    MissingPath,

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    /// The request never produced a response (DNS, connect, TLS, ...).
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("Request failed: {status} {reason}")]
    Status {
        status: u16,
        reason: String,
        url: String,
    },

    /// The response body could not be read.
    #[error("failed to read response body from {url}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A contents API response was not JSON.
    #[error("failed to parse JSON from {url}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Raw content was expected to be JSON but was not.
    #[error("response is not valid JSON. Use --raw to print it as-is")]
    NotJson {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// `--city` was given without a city index to look it up in.
    #[error("--city needs a city index: pass --cities <PATH|URL> or set DATA_CUACA_CITIES")]
    CityIndexMissing,

    /// The city index file could not be read.
    #[error("failed to read city index {}", .path.display())]
    CityIndexRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The city index is not a JSON array of `{code, name}` objects.
    #[error("city index must be a JSON array of {{code, name}} objects")]
    CityIndex(#[source] serde_json::Error),

    /// No city in the index matched the name exactly.
    #[error("unknown city: {query}{}", format_suggestions(.suggestions))]
    UnknownCity {
        query: String,
        suggestions: Vec<String>,
    },

    /// A JSON value could not be serialized for display.
    #[error("failed to render JSON")]
    Render(#[source] serde_json::Error),
}

fn format_suggestions(suggestions: &[String]) -> String {
    match suggestions {
        [] => ". Please retype the city or try another name.".to_string(),
        [only] => format!(". Did you mean '{only}'?"),
        many => format!(
            ". Did you mean one of: {}?",
            many.iter()
                .map(|s| format!("'{s}'"))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_message_includes_code_and_reason() {
        let err = Error::Status {
            status: 404,
            reason: "Not Found".into(),
            url: "https://example.invalid/x".into(),
        };
        assert_eq!(err.to_string(), "Request failed: 404 Not Found");
    }

    #[test]
    fn not_json_suggests_raw() {
        let source = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err = Error::NotJson {
            url: "u".into(),
            source,
        };
        assert!(err.to_string().contains("--raw"));
    }

    #[test]
    fn unknown_city_lists_suggestions() {
        let none = Error::UnknownCity {
            query: "Zzyzx".into(),
            suggestions: vec![],
        };
        assert_eq!(
            none.to_string(),
            "unknown city: Zzyzx. Please retype the city or try another name."
        );

        let many = Error::UnknownCity {
            query: "jakarta".into(),
            suggestions: vec!["Jakarta Pusat (31.71)".into(), "Jakarta Selatan (31.74)".into()],
        };
        assert_eq!(
            many.to_string(),
            "unknown city: jakarta. Did you mean one of: 'Jakarta Pusat (31.71)', 'Jakarta Selatan (31.74)'?"
        );
    }
}
