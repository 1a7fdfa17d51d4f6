//! City index lookups.
//!
//! A city index is a JSON array of `{ "code": ..., "name": ... }` objects,
//! where `code` is the BMKG region code used in the repository's
//! `data/<code>.json` file names. Lookups try an exact match on the
//! normalized name, then a case-insensitive substring match, then fuzzy
//! similarity on normalized names.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::cli::Options;
use crate::error::{Error, Result};
use crate::github::GitHubClient;

/// Maximum number of suggestions offered for an unknown city.
pub const SUGGEST_LIMIT: usize = 5;

/// Minimum normalized similarity for a fuzzy suggestion.
const CLOSE_MATCH_CUTOFF: f64 = 0.6;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct City {
    pub code: String,
    pub name: String,
}

/// Outcome of [`CityIndex::find`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CityMatch {
    Found(City),
    /// No exact match, but these cities look related.
    Suggestions(Vec<City>),
    NotFound,
}

#[derive(Debug, Clone, Default)]
pub struct CityIndex {
    cities: Vec<City>,
}

/// Lowercase, replace anything but ASCII letters, digits and whitespace with
/// a space, and collapse runs of whitespace.
pub fn normalize_name(value: &str) -> String {
    let cleaned: String = value
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Repository path of the weather file for a region code.
pub fn data_path(code: &str) -> String {
    format!("data/{code}.json")
}

impl CityIndex {
    pub fn new(cities: Vec<City>) -> Self {
        Self { cities }
    }

    /// Parse a JSON city index.
    pub fn parse(text: &str) -> Result<Self> {
        let cities: Vec<City> = serde_json::from_str(text).map_err(Error::CityIndex)?;
        Ok(Self::new(cities))
    }

    /// Load an index from a local file or an `http(s)://` URL.
    ///
    /// URLs are fetched without the GitHub token.
    pub async fn load(source: &str, client: &GitHubClient) -> Result<Self> {
        let text = if source.starts_with("http://") || source.starts_with("https://") {
            client.fetch_public_text(source).await?
        } else {
            tokio::fs::read_to_string(source)
                .await
                .map_err(|source_err| Error::CityIndexRead {
                    path: PathBuf::from(source),
                    source: source_err,
                })?
        };
        let index = Self::parse(&text)?;
        if index.is_empty() {
            warn!(source, "city index is empty");
        }
        debug!(source, cities = index.len(), "loaded city index");
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Normalized name to city. Later entries win on collisions.
    fn by_normalized_name(&self) -> HashMap<String, &City> {
        self.cities
            .iter()
            .map(|city| (normalize_name(&city.name), city))
            .collect()
    }

    pub fn find(&self, query: &str, limit: usize) -> CityMatch {
        let normalized_query = normalize_name(query);
        let normalized = self.by_normalized_name();

        if let Some(city) = normalized.get(&normalized_query) {
            return CityMatch::Found((*city).clone());
        }

        let needle = query.to_lowercase();
        let substring: Vec<City> = self
            .cities
            .iter()
            .filter(|city| city.name.to_lowercase().contains(&needle))
            .take(limit)
            .cloned()
            .collect();
        if !substring.is_empty() {
            return CityMatch::Suggestions(substring);
        }

        let mut scored: Vec<(f64, &String, &City)> = normalized
            .iter()
            .map(|(name, city)| {
                (
                    strsim::normalized_levenshtein(&normalized_query, name),
                    name,
                    *city,
                )
            })
            .filter(|(score, _, _)| *score >= CLOSE_MATCH_CUTOFF)
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));

        let close: Vec<City> = scored
            .into_iter()
            .take(limit)
            .map(|(_, _, city)| city.clone())
            .collect();
        if close.is_empty() {
            CityMatch::NotFound
        } else {
            CityMatch::Suggestions(close)
        }
    }

    /// Like [`find`](Self::find), but anything other than an exact match is an
    /// [`Error::UnknownCity`] carrying the suggestions.
    pub fn resolve(&self, query: &str, limit: usize) -> Result<City> {
        match self.find(query, limit) {
            CityMatch::Found(city) => Ok(city),
            CityMatch::Suggestions(cities) => Err(Error::UnknownCity {
                query: query.to_string(),
                suggestions: cities
                    .iter()
                    .map(|c| format!("{} ({})", c.name, c.code))
                    .collect(),
            }),
            CityMatch::NotFound => Err(Error::UnknownCity {
                query: query.to_string(),
                suggestions: Vec::new(),
            }),
        }
    }
}

/// Replace `--city` in `options` with the `--path` of that city's data file.
pub async fn resolve_options(
    options: &Options,
    query: &str,
    client: &GitHubClient,
) -> Result<Options> {
    let source = options.cities.as_deref().ok_or(Error::CityIndexMissing)?;
    let index = CityIndex::load(source, client).await?;
    let city = index.resolve(query, SUGGEST_LIMIT)?;
    debug!(name = %city.name, code = %city.code, "resolved city");

    Ok(Options {
        path: Some(data_path(&city.code)),
        city: None,
        ..options.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city(code: &str, name: &str) -> City {
        City {
            code: code.into(),
            name: name.into(),
        }
    }

    fn sample() -> CityIndex {
        CityIndex::new(vec![
            city("11.01.01.2001", "Kota Banda Aceh"),
            city("11.71.01.1001", "Banda Aceh"),
            city("31.71.01.1001", "Jakarta Pusat"),
            city("31.74.01.1001", "Jakarta Selatan"),
            city("32.73.01.1001", "Bandung"),
            city("51.71.01.1001", "Denpasar"),
        ])
    }

    #[test]
    fn normalize_strips_punctuation_and_spacing() {
        assert_eq!(normalize_name("  Kota  BANDA-Aceh! "), "kota banda aceh");
        assert_eq!(normalize_name("Pare²pare"), "pare pare");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn exact_match_ignores_case_and_punctuation() {
        let found = sample().find("banda   ACEH", SUGGEST_LIMIT);
        assert_eq!(found, CityMatch::Found(city("11.71.01.1001", "Banda Aceh")));
    }

    #[test]
    fn substring_match_suggests_in_index_order() {
        match sample().find("jakarta", SUGGEST_LIMIT) {
            CityMatch::Suggestions(cities) => {
                let names: Vec<_> = cities.iter().map(|c| c.name.as_str()).collect();
                assert_eq!(names, ["Jakarta Pusat", "Jakarta Selatan"]);
            }
            other => panic!("expected suggestions, got {other:?}"),
        }
    }

    #[test]
    fn substring_suggestions_respect_limit() {
        match sample().find("a", 2) {
            CityMatch::Suggestions(cities) => assert_eq!(cities.len(), 2),
            other => panic!("expected suggestions, got {other:?}"),
        }
    }

    #[test]
    fn close_match_catches_typos() {
        match sample().find("Denpasr", SUGGEST_LIMIT) {
            CityMatch::Suggestions(cities) => {
                assert_eq!(cities[0], city("51.71.01.1001", "Denpasar"));
            }
            other => panic!("expected suggestions, got {other:?}"),
        }
    }

    #[test]
    fn unrelated_query_is_not_found() {
        assert_eq!(sample().find("Zzyzx", SUGGEST_LIMIT), CityMatch::NotFound);
    }

    #[test]
    fn later_duplicate_names_win_exact_match() {
        let index = CityIndex::new(vec![city("1", "Bandung"), city("2", "bandung")]);
        assert_eq!(
            index.find("Bandung", SUGGEST_LIMIT),
            CityMatch::Found(city("2", "bandung"))
        );
    }

    #[test]
    fn resolve_reports_suggestions() {
        let err = sample().resolve("Denpasr", SUGGEST_LIMIT).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Denpasr"), "{msg}");
        assert!(msg.contains("Did you mean 'Denpasar (51.71.01.1001)'?"), "{msg}");
    }

    #[test]
    fn parse_requires_code_and_name() {
        assert_eq!(
            CityIndex::parse(r#"[{"code":"1","name":"A"}]"#)
                .unwrap()
                .len(),
            1
        );
        assert!(matches!(
            CityIndex::parse(r#"[{"code":"1"}]"#),
            Err(Error::CityIndex(_))
        ));
        assert!(matches!(
            CityIndex::parse(r#"{"code":"1","name":"A"}"#),
            Err(Error::CityIndex(_))
        ));
    }

    #[test]
    fn data_path_uses_region_code() {
        assert_eq!(data_path("11.01.01.2001"), "data/11.01.01.2001.json");
    }
}
