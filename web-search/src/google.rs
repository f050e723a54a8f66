//! Google Custom Search JSON API client.
//!
//! `GET {endpoint}?key=..&cx=..&q=..&num=..` → `items[].{title, link, snippet}`.
//! A response without `items` means "no results", not an error.

use std::time::Instant;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{error, info};

use crate::{SearchSnippet, WebSearch, config::SearchConfig, errors::SearchError};

#[derive(Debug)]
pub struct GoogleSearchService {
    client: reqwest::Client,
    cfg: SearchConfig,
}

impl GoogleSearchService {
    pub fn new(cfg: SearchConfig) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder().timeout(cfg.timeout).build()?;
        info!(
            max_results = cfg.max_results,
            timeout_secs = cfg.timeout.as_secs(),
            "GoogleSearchService initialized"
        );
        Ok(Self { client, cfg })
    }
}

#[async_trait]
impl WebSearch for GoogleSearchService {
    async fn search(&self, query: &str) -> Result<Vec<SearchSnippet>, SearchError> {
        let started = Instant::now();
        let num = self.cfg.max_results.to_string();

        let resp = self
            .client
            .get(&self.cfg.endpoint)
            .query(&[
                ("key", self.cfg.api_key.as_str()),
                ("cx", self.cfg.engine_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            let snippet: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
            let snippet: String = snippet.chars().take(300).collect();
            error!(
                %status,
                %snippet,
                latency_ms = started.elapsed().as_millis(),
                "custom search returned non-success status"
            );
            return Err(SearchError::HttpStatus { status, snippet });
        }

        let body = resp.text().await?;
        let hits = parse_items(&body)?;

        info!(
            hits = hits.len(),
            latency_ms = started.elapsed().as_millis(),
            "custom search completed"
        );
        Ok(hits)
    }
}

fn parse_items(body: &str) -> Result<Vec<SearchSnippet>, SearchError> {
    let parsed: SearchResponse =
        serde_json::from_str(body).map_err(|e| SearchError::Decode(e.to_string()))?;
    Ok(parsed
        .items
        .into_iter()
        .map(|i| SearchSnippet {
            title: i.title,
            link: i.link,
            snippet: i.snippet,
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_items() {
        let body = r#"{
            "kind": "customsearch#search",
            "items": [
                {"title": "Rust", "link": "https://rust-lang.org", "snippet": "Fast."},
                {"title": "Ferris", "link": "https://rustacean.net"}
            ]
        }"#;
        let hits = parse_items(body).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].snippet, "Fast.");
        assert_eq!(hits[1].snippet, "");
    }

    #[test]
    fn missing_items_is_empty() {
        assert!(parse_items(r#"{"kind":"customsearch#search"}"#).unwrap().is_empty());
    }

    #[test]
    fn garbage_is_decode_error() {
        assert!(matches!(parse_items("<html>"), Err(SearchError::Decode(_))));
    }
}
