// src/ingest/types.rs
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// One configured syndication feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    pub url: String,
}

impl FeedSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// A parsed feed entry. `url` is never empty; entries without one are dropped while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawArticle {
    pub title: String,
    pub url: String,
    pub summary: String,
    pub source: String,             // feed title, or host when the feed has none
    pub published_at: Option<i64>,  // unix seconds
}

/// Result of fetching one source. Failures are values so the caller's skip is explicit.
#[derive(Debug, Clone)]
pub enum SourceOutcome {
    Fetched {
        source: FeedSource,
        articles: Vec<RawArticle>,
    },
    Failed {
        source: FeedSource,
        reason: String,
    },
}

impl SourceOutcome {
    pub fn source(&self) -> &FeedSource {
        match self {
            SourceOutcome::Fetched { source, .. } | SourceOutcome::Failed { source, .. } => source,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SourceOutcome::Failed { .. })
    }
}

/// Fetches the raw feed document for a URL.
#[async_trait::async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch_xml(&self, url: &str) -> Result<String>;
}
