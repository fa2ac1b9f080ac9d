// src/cache.rs
//! Seen-set client: remembers which article fingerprints were already posted.
//!
//! Both operations are infallible from the caller's view. A failed read counts
//! as "not seen" (a possible duplicate beats silently dropping content); a
//! failed write is logged and reported as `false`.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use metrics::counter;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::fingerprint::Fingerprint;

/// Seven days.
pub const DEFAULT_SEEN_TTL_SECS: u64 = 7 * 86_400;

#[async_trait]
pub trait SeenCache: Send + Sync {
    async fn has(&self, fp: &Fingerprint) -> bool;
    async fn mark_seen(&self, fp: &Fingerprint, ttl_secs: u64) -> bool;
}

/// Upstash Redis REST API client (`GET /get/{key}`, `POST /set/{key}/{value}?ex=`).
#[derive(Clone)]
pub struct UpstashCache {
    base_url: String,
    token: String,
    client: Client,
    timeout: Duration,
}

#[derive(Deserialize)]
struct UpstashReply {
    #[serde(default)]
    result: Option<serde_json::Value>,
}

impl UpstashCache {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            client: Client::new(),
            timeout: Duration::from_secs(8),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    async fn try_get(&self, fp: &Fingerprint) -> Result<bool> {
        let url = format!("{}/get/{}", self.base_url, fp);
        let rsp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .timeout(self.timeout)
            .send()
            .await
            .context("upstash get")?;
        let status = rsp.status();
        if !status.is_success() {
            let body = rsp.text().await.unwrap_or_default();
            return Err(anyhow!("upstash GET {status}: {body}"));
        }
        let reply: UpstashReply = rsp.json().await.context("upstash get json")?;
        Ok(reply.result.is_some_and(|v| !v.is_null()))
    }

    async fn try_set(&self, fp: &Fingerprint, ttl_secs: u64) -> Result<()> {
        let url = format!("{}/set/{}/1", self.base_url, fp);
        self.client
            .post(&url)
            .bearer_auth(&self.token)
            .query(&[("ex", ttl_secs)])
            .timeout(self.timeout)
            .send()
            .await
            .context("upstash set")?
            .error_for_status()
            .context("upstash set non-2xx")?;
        Ok(())
    }
}

#[async_trait]
impl SeenCache for UpstashCache {
    async fn has(&self, fp: &Fingerprint) -> bool {
        match self.try_get(fp).await {
            Ok(seen) => seen,
            Err(e) => {
                tracing::warn!(error = ?e, fingerprint = %fp, "seen-set read failed; treating as unseen");
                counter!("digest_cache_errors_total", "op" => "get").increment(1);
                false
            }
        }
    }

    async fn mark_seen(&self, fp: &Fingerprint, ttl_secs: u64) -> bool {
        match self.try_set(fp, ttl_secs).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = ?e, fingerprint = %fp, "seen-set write failed");
                counter!("digest_cache_errors_total", "op" => "set").increment(1);
                false
            }
        }
    }
}

/// In-process seen-set with per-entry expiry. Local dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryCache {
    inner: Mutex<HashMap<Fingerprint, Instant>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed entries (e.g. articles posted by an earlier run).
    pub fn with_seen<I: IntoIterator<Item = Fingerprint>>(fps: I, ttl: Duration) -> Self {
        let until = Instant::now() + ttl;
        Self {
            inner: Mutex::new(fps.into_iter().map(|fp| (fp, until)).collect()),
        }
    }

    pub fn len(&self) -> usize {
        let now = Instant::now();
        let map = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        map.values().filter(|&&until| until > now).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SeenCache for MemoryCache {
    async fn has(&self, fp: &Fingerprint) -> bool {
        let now = Instant::now();
        let mut map = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        match map.get(fp) {
            Some(&until) if until > now => true,
            Some(_) => {
                map.remove(fp);
                false
            }
            None => false,
        }
    }

    async fn mark_seen(&self, fp: &Fingerprint, ttl_secs: u64) -> bool {
        let until = Instant::now() + Duration::from_secs(ttl_secs);
        let mut map = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        map.insert(fp.clone(), until);
        true
    }
}
