// src/config/mod.rs
//! Runtime configuration, read once at startup and passed down explicitly.

pub mod keywords;

use std::path::PathBuf;

use crate::cache::DEFAULT_SEEN_TTL_SECS;
use crate::ingest::types::FeedSource;
use crate::notify::render::MAX_DIGEST_ITEMS;
use crate::notify::slack::DEFAULT_SLACK_API_BASE;
use crate::schedule::{PostingWindow, DEFAULT_POSTING_TZ};

pub const ENV_SLACK_BOT_TOKEN: &str = "SLACK_BOT_TOKEN";
pub const ENV_SLACK_CHANNEL_ID: &str = "SLACK_CHANNEL_ID";
pub const ENV_UPSTASH_REDIS_REST: &str = "UPSTASH_REDIS_REST";
pub const ENV_UPSTASH_REDIS_TOKEN: &str = "UPSTASH_REDIS_TOKEN";

pub const REQUIRED_KEYS: [&str; 4] = [
    ENV_SLACK_BOT_TOKEN,
    ENV_SLACK_CHANNEL_ID,
    ENV_UPSTASH_REDIS_REST,
    ENV_UPSTASH_REDIS_TOKEN,
];

pub const DEFAULT_MIN_SCORE: u32 = 3;
pub const DEFAULT_POST_MAX: usize = 10;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_FEEDS: [&str; 3] = [
    "https://techcrunch.com/feed/",
    "https://www.crn.com/news/data-center/rss.xml",
    "https://www.theregister.com/data_centre/headlines.atom",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing env vars: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error("Invalid env var {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct DigestConfig {
    pub slack_bot_token: String,
    pub slack_channel_id: String,
    pub slack_api_base: String,
    pub upstash_rest_url: String,
    pub upstash_token: String,
    /// Articles scoring below this are dropped.
    pub min_score: u32,
    /// Cap on digest items per run.
    pub post_max: usize,
    pub feeds: Vec<FeedSource>,
    pub http_timeout_secs: u64,
    pub seen_ttl_secs: u64,
    pub keywords_path: Option<PathBuf>,
    pub posting_window: Option<PostingWindow>,
}

impl DigestConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let missing: Vec<&'static str> = REQUIRED_KEYS
            .iter()
            .copied()
            .filter(|k| get(*k).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }
        let required = |k: &str| get(k).unwrap_or_default();

        let min_score = parse_or("MIN_SCORE", get("MIN_SCORE"), DEFAULT_MIN_SCORE)?;
        let post_max = parse_or("POST_MAX_PER_RUN", get("POST_MAX_PER_RUN"), DEFAULT_POST_MAX)?;
        if post_max > MAX_DIGEST_ITEMS {
            return Err(ConfigError::Invalid {
                key: "POST_MAX_PER_RUN",
                reason: format!(
                    "{post_max} items do not fit in one Slack message (max {MAX_DIGEST_ITEMS})"
                ),
            });
        }
        let http_timeout_secs =
            parse_or("HTTP_TIMEOUT_SECS", get("HTTP_TIMEOUT_SECS"), DEFAULT_HTTP_TIMEOUT_SECS)?;
        let seen_ttl_secs = parse_or("SEEN_TTL_SECS", get("SEEN_TTL_SECS"), DEFAULT_SEEN_TTL_SECS)?;

        let feeds = match get("RSS_FEEDS") {
            None => DEFAULT_FEEDS.iter().map(|u| FeedSource::new(*u)).collect(),
            Some(raw) => parse_feeds(&raw)?,
        };

        let posting_window = match get("POSTING_HOURS") {
            None => None,
            Some(hours) => {
                let tz = get("POSTING_TZ")
                    .unwrap_or_else(|| DEFAULT_POSTING_TZ.name().to_string());
                let w = PostingWindow::parse(&hours, &tz).map_err(|reason| ConfigError::Invalid {
                    key: "POSTING_HOURS",
                    reason,
                })?;
                Some(w)
            }
        };

        Ok(Self {
            slack_bot_token: required(ENV_SLACK_BOT_TOKEN),
            slack_channel_id: required(ENV_SLACK_CHANNEL_ID),
            slack_api_base: get("SLACK_API_BASE")
                .unwrap_or_else(|| DEFAULT_SLACK_API_BASE.to_string()),
            upstash_rest_url: required(ENV_UPSTASH_REDIS_REST),
            upstash_token: required(ENV_UPSTASH_REDIS_TOKEN),
            min_score,
            post_max,
            feeds,
            http_timeout_secs,
            seen_ttl_secs,
            keywords_path: get("KEYWORDS_PATH").map(PathBuf::from),
            posting_window,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
            key,
            reason: format!("'{v}' is not a non-negative integer"),
        }),
    }
}

/// `RSS_FEEDS` is a JSON array of URLs; blanks and duplicates are dropped, order kept.
fn parse_feeds(raw: &str) -> Result<Vec<FeedSource>, ConfigError> {
    let urls: Vec<String> = serde_json::from_str(raw).map_err(|e| ConfigError::Invalid {
        key: "RSS_FEEDS",
        reason: e.to_string(),
    })?;
    let mut out: Vec<FeedSource> = Vec::with_capacity(urls.len());
    for u in urls {
        let u = u.trim();
        if !u.is_empty() && !out.iter().any(|f| f.url == u) {
            out.push(FeedSource::new(u));
        }
    }
    Ok(out)
}
