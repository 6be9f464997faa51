//! arXiv title lookup feeding the AI summarizer.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::core::ai_client::ChatCompletion;
use crate::utils::url::paper_search_url;

pub const DEFAULT_PAPERS_URL: &str = "https://export.arxiv.org/api/query";
pub const PAPERS_ERROR: &str = "arXiv API Error";
pub const MAX_TITLES: usize = 5;

const SUMMARY_PREFIX: &str = "Summarize these papers: ";
const SUMMARY_CONTEXT: &str = "Provide bullet-point summaries with key equations.";

#[derive(Debug)]
pub enum PaperLookupError {
    Network(reqwest::Error),
    NoTitles,
}

impl fmt::Display for PaperLookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaperLookupError::Network(err) => write!(f, "paper search failed: {err}"),
            PaperLookupError::NoTitles => write!(f, "no paper titles found"),
        }
    }
}

impl std::error::Error for PaperLookupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PaperLookupError::Network(err) => Some(err),
            PaperLookupError::NoTitles => None,
        }
    }
}

fn title_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<title>[^<]+").expect("title pattern is valid"))
}

/// Pull entry titles out of an Atom feed body.
///
/// The first `<title>` belongs to the feed itself and is skipped; at most
/// [`MAX_TITLES`] entry titles follow.
pub fn extract_titles(feed: &str) -> Vec<String> {
    title_pattern()
        .find_iter(feed)
        .skip(1)
        .take(MAX_TITLES)
        .map(|m| m.as_str().trim_start_matches("<title>").to_string())
        .collect()
}

pub struct PaperLookup {
    client: reqwest::Client,
    search_base: String,
}

impl PaperLookup {
    pub fn new(client: reqwest::Client, search_base: impl Into<String>) -> Self {
        Self {
            client,
            search_base: search_base.into(),
        }
    }

    /// Newline-joined titles for `query`.
    pub async fn fetch_titles(&self, query: &str) -> Result<String, PaperLookupError> {
        let url = paper_search_url(&self.search_base, query);
        debug!(%url, "Searching papers");

        let body = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(PaperLookupError::Network)?
            .text()
            .await
            .map_err(PaperLookupError::Network)?;

        let titles = extract_titles(&body);
        debug!(count = titles.len(), "Extracted paper titles");
        if titles.is_empty() {
            return Err(PaperLookupError::NoTitles);
        }
        Ok(titles.join("\n"))
    }

    /// Look up titles and ask `ai` to summarize them. Lookup failures return
    /// [`PAPERS_ERROR`] and leave `ai` untouched.
    pub async fn summarize_papers(&self, query: &str, ai: &dyn ChatCompletion) -> String {
        match self.fetch_titles(query).await {
            Ok(titles) => {
                ai.query(&format!("{SUMMARY_PREFIX}{titles}"), SUMMARY_CONTEXT)
                    .await
            }
            Err(err) => {
                warn!(error = %err, query, "Paper lookup failed");
                PAPERS_ERROR.to_string()
            }
        }
    }
}
