//! Live web-search augmentation.
//!
//! [`WebSearch`] is the capability boundary; [`GoogleSearchService`] is the
//! production implementation. [`search_context`] runs a query and folds the
//! snippets into a single context block for the prompt.

pub mod config;
pub mod errors;
pub mod google;

use async_trait::async_trait;
use tracing::debug;

pub use config::SearchConfig;
pub use errors::SearchError;
pub use google::GoogleSearchService;

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSnippet {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

/// Query → snippets.
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchSnippet>, SearchError>;
}

/// Runs `query` and summarises up to `max_results` hits.
///
/// Returns `Ok(None)` when the search produced nothing usable.
pub async fn search_context(
    search: &dyn WebSearch,
    query: &str,
    max_results: usize,
) -> Result<Option<String>, SearchError> {
    let hits = search.search(query).await?;
    debug!(query_len = query.len(), hits = hits.len(), "web search finished");
    Ok(summarize(&hits, max_results))
}

/// Numbered `title: snippet` lines, blank snippets skipped.
pub fn summarize(hits: &[SearchSnippet], max_results: usize) -> Option<String> {
    let lines: Vec<String> = hits
        .iter()
        .filter(|h| !h.snippet.trim().is_empty())
        .take(max_results)
        .enumerate()
        .map(|(i, h)| {
            let snippet = h.snippet.split_whitespace().collect::<Vec<_>>().join(" ");
            if h.title.trim().is_empty() {
                format!("{}. {snippet}", i + 1)
            } else {
                format!("{}. {}: {snippet}", i + 1, h.title.trim())
            }
        })
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}
