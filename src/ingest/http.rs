// src/ingest/http.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::ingest::types::FeedFetcher;

const USER_AGENT: &str = concat!("feed-digest/", env!("CARGO_PKG_VERSION"));

/// Plain HTTP GET fetcher with a per-request timeout.
#[derive(Clone)]
pub struct HttpFeedFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFeedFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

impl Default for HttpFeedFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch_xml(&self, url: &str) -> Result<String> {
        self.client
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(self.timeout)
            .send()
            .await
            .with_context(|| format!("feed get {url}"))?
            .error_for_status()
            .with_context(|| format!("feed non-2xx {url}"))?
            .text()
            .await
            .context("feed body")
    }
}
