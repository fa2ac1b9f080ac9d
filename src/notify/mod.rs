// src/notify/mod.rs
//! Digest delivery: the item types, the `Notifier` seam and the Slack implementation.

pub mod render;
pub mod slack;

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;

pub use slack::SlackNotifier;

/// One article ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DigestItem {
    pub title: String,
    pub url: String,
    pub source: String,
    pub score: u32,
    pub bullets: Vec<String>, // at most two
}

/// Everything posted in one run; sent whole or not at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Digest {
    pub date: NaiveDate,
    pub items: Vec<DigestItem>,
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver the digest once. Any error means the digest was not posted.
    async fn send(&self, digest: &Digest) -> Result<()>;
}
