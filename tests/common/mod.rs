// tests/common/mod.rs
#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use feed_digest::config::DigestConfig;
use feed_digest::fingerprint::Fingerprint;
use feed_digest::ingest::types::FeedFetcher;
use feed_digest::{Digest, MemoryCache, Notifier, SeenCache};

/// Serves canned documents by URL; unknown URLs fail like a dead host.
#[derive(Default)]
pub struct MapFetcher {
    pub docs: HashMap<String, String>,
}

impl MapFetcher {
    pub fn with(mut self, url: &str, xml: &str) -> Self {
        self.docs.insert(url.to_string(), xml.to_string());
        self
    }
}

#[async_trait]
impl FeedFetcher for MapFetcher {
    async fn fetch_xml(&self, url: &str) -> Result<String> {
        self.docs
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("connect error for {url}"))
    }
}

/// Records every digest; optionally fails every send.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Digest>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn calls(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<Digest> {
        self.sent.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, digest: &Digest) -> Result<()> {
        self.sent.lock().unwrap().push(digest.clone());
        if self.fail {
            return Err(anyhow!("slack post failed: channel_not_found"));
        }
        Ok(())
    }
}

/// Reads like a normal seen-set; writes for the listed fingerprints fail.
pub struct RejectingCache {
    pub inner: MemoryCache,
    pub reject: Vec<Fingerprint>,
}

impl RejectingCache {
    pub fn rejecting(reject: Vec<Fingerprint>) -> Self {
        Self {
            inner: MemoryCache::new(),
            reject,
        }
    }
}

#[async_trait]
impl SeenCache for RejectingCache {
    async fn has(&self, fp: &Fingerprint) -> bool {
        self.inner.has(fp).await
    }

    async fn mark_seen(&self, fp: &Fingerprint, ttl_secs: u64) -> bool {
        if self.reject.contains(fp) {
            return false;
        }
        self.inner.mark_seen(fp, ttl_secs).await
    }
}

pub fn config_with(pairs: &[(&str, &str)]) -> Arc<DigestConfig> {
    let mut map: HashMap<String, String> = [
        ("SLACK_BOT_TOKEN", "xoxb-test"),
        ("SLACK_CHANNEL_ID", "C0TEST"),
        ("UPSTASH_REDIS_REST", "https://upstash.invalid"),
        ("UPSTASH_REDIS_TOKEN", "tok"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in pairs {
        map.insert(k.to_string(), v.to_string());
    }
    Arc::new(DigestConfig::from_lookup(|k| map.get(k).cloned()).expect("test config"))
}

/// RSS document with one `<item>` per (title, link, description).
pub fn rss(title: &str, items: &[(&str, &str, &str)]) -> String {
    let mut body = String::new();
    for (t, link, desc) in items {
        body.push_str(&format!(
            "<item><title>{t}</title><link>{link}</link><description>{desc}</description></item>"
        ));
    }
    format!(r#"<?xml version="1.0"?><rss version="2.0"><channel><title>{title}</title>{body}</channel></rss>"#)
}
