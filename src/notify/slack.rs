// src/notify/slack.rs
use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::render::{render_blocks, render_fallback};
use super::{Digest, Notifier};

pub const DEFAULT_SLACK_API_BASE: &str = "https://slack.com/api";

/// Posts digests with `chat.postMessage` using a bot token.
#[derive(Clone)]
pub struct SlackNotifier {
    api_base: String,
    token: String,
    channel: String,
    client: Client,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct SlackReply {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

impl SlackNotifier {
    pub fn new(token: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_SLACK_API_BASE.to_string(),
            token: token.into(),
            channel: channel.into(),
            client: Client::new(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Point at a different Web API root (tests, proxies).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

#[async_trait::async_trait]
impl Notifier for SlackNotifier {
    async fn send(&self, digest: &Digest) -> Result<()> {
        let body = serde_json::json!({
            "channel": self.channel,
            "text": render_fallback(digest),
            "blocks": render_blocks(digest),
        });

        let rsp = self
            .client
            .post(format!("{}/chat.postMessage", self.api_base))
            .bearer_auth(&self.token)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .context("slack post")?;

        let status = rsp.status();
        let text = rsp.text().await.context("slack body")?;
        if !status.is_success() {
            return Err(anyhow!("slack post failed: status={status}, body={text}"));
        }
        let reply: SlackReply = serde_json::from_str(&text)
            .with_context(|| format!("slack reply not json: {text}"))?;
        if !reply.ok {
            return Err(anyhow!(
                "slack post failed: {}",
                reply.error.as_deref().unwrap_or("ok=false")
            ));
        }
        tracing::info!(items = digest.items.len(), "digest posted to slack");
        Ok(())
    }
}
