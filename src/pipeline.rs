// src/pipeline.rs
//! One digest run: fetch -> score/filter -> dedupe/cap -> condense -> notify -> mark seen.
//!
//! The stages are plain functions so each can be exercised on its own; the
//! [`DigestService`] only wires them to the configured collaborators.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use metrics::{counter, gauge};
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::cache::{SeenCache, UpstashCache};
use crate::condense::{condense, DEFAULT_MAX_BULLETS};
use crate::config::{keywords, ConfigError, DigestConfig};
use crate::fingerprint::{fingerprint, Fingerprint};
use crate::ingest::{self, http::HttpFeedFetcher, types::FeedFetcher, types::RawArticle};
use crate::notify::{Digest, DigestItem, Notifier, SlackNotifier};
use crate::relevance::RelevanceScorer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredArticle {
    pub article: RawArticle,
    pub score: u32,
}

/// An unseen article that made the cut, with the key it will be marked under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selected {
    pub scored: ScoredArticle,
    pub fingerprint: Fingerprint,
}

/// How a run ended (errors aside).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunReport {
    NotPostingHour,
    NoNewItems,
    Posted { items: usize, marked: usize },
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunReport::NotPostingHour => f.write_str("not a posting hour"),
            RunReport::NoNewItems => f.write_str("no new items"),
            RunReport::Posted { items, .. } => write!(f, "posted digest with {items} items"),
        }
    }
}

/// Keep `score >= min_score`, highest first; equal scores keep input order.
pub fn score_and_filter(
    articles: Vec<RawArticle>,
    scorer: &RelevanceScorer,
    min_score: u32,
) -> Vec<ScoredArticle> {
    let mut scored: Vec<ScoredArticle> = articles
        .into_iter()
        .map(|article| {
            let score = scorer.score(&article.title, &article.summary);
            ScoredArticle { article, score }
        })
        .filter(|s| s.score >= min_score)
        .collect();
    // sort_by is stable
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

/// Walk in score order, skip seen fingerprints, stop once `cap` are collected.
/// Items after the cap is reached are never looked up.
pub async fn dedupe_and_cap(
    scored: Vec<ScoredArticle>,
    cache: &dyn SeenCache,
    cap: usize,
) -> Vec<Selected> {
    let mut out = Vec::with_capacity(cap.min(scored.len()));
    for s in scored {
        if out.len() >= cap {
            break;
        }
        let fp = fingerprint(&s.article.url);
        // The same URL can appear in two feeds within one batch.
        if out.iter().any(|sel: &Selected| sel.fingerprint == fp) {
            continue;
        }
        if cache.has(&fp).await {
            tracing::debug!(fingerprint = %fp, "already posted, skipping");
            counter!("digest_duplicates_total").increment(1);
            continue;
        }
        out.push(Selected {
            scored: s,
            fingerprint: fp,
        });
    }
    out
}

pub fn condense_items(selected: &[Selected]) -> Vec<DigestItem> {
    selected
        .iter()
        .map(|sel| {
            let a = &sel.scored.article;
            DigestItem {
                title: a.title.clone(),
                url: a.url.clone(),
                source: a.source.clone(),
                score: sel.scored.score,
                bullets: condense(&a.summary, DEFAULT_MAX_BULLETS),
            }
        })
        .collect()
}

/// Fan out one write per fingerprint and wait for all of them.
/// Failed or panicked writes are counted out, never propagated. Returns the number that succeeded.
pub async fn mark_seen_all(cache: Arc<dyn SeenCache>, fps: Vec<Fingerprint>, ttl_secs: u64) -> usize {
    let mut set = JoinSet::new();
    for fp in fps {
        let cache = Arc::clone(&cache);
        set.spawn(async move { cache.mark_seen(&fp, ttl_secs).await });
    }
    let mut ok = 0usize;
    while let Some(res) = set.join_next().await {
        match res {
            Ok(true) => ok += 1,
            Ok(false) => {}
            Err(e) => tracing::warn!(error = ?e, "mark-seen task failed"),
        }
    }
    ok
}

/// Runs the pipeline against its collaborators. Cheap to share behind an `Arc`.
pub struct DigestService {
    config: Arc<DigestConfig>,
    scorer: RelevanceScorer,
    fetcher: Arc<dyn FeedFetcher>,
    cache: Arc<dyn SeenCache>,
    notifier: Arc<dyn Notifier>,
}

impl DigestService {
    pub fn new(
        config: Arc<DigestConfig>,
        fetcher: Arc<dyn FeedFetcher>,
        cache: Arc<dyn SeenCache>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            scorer: RelevanceScorer::default(),
            fetcher,
            cache,
            notifier,
        }
    }

    pub fn with_scorer(mut self, scorer: RelevanceScorer) -> Self {
        self.scorer = scorer;
        self
    }

    /// Production wiring: HTTP feeds, Upstash seen-set, Slack.
    pub fn from_config(config: Arc<DigestConfig>) -> Result<Self, ConfigError> {
        let kw = keywords::load_keywords(config.keywords_path.as_deref()).map_err(|e| {
            ConfigError::Invalid {
                key: "KEYWORDS_PATH",
                reason: format!("{e:#}"),
            }
        })?;
        let timeout = config.http_timeout_secs;
        let fetcher = HttpFeedFetcher::new().with_timeout(timeout);
        let cache = UpstashCache::new(&config.upstash_rest_url, &config.upstash_token)
            .with_timeout(timeout);
        let notifier = SlackNotifier::new(&config.slack_bot_token, &config.slack_channel_id)
            .with_api_base(&config.slack_api_base)
            .with_timeout(timeout);

        Ok(Self::new(
            Arc::clone(&config),
            Arc::new(fetcher),
            Arc::new(cache),
            Arc::new(notifier),
        )
        .with_scorer(RelevanceScorer::new(kw)))
    }

    pub async fn run(&self) -> Result<RunReport> {
        self.run_at(Utc::now()).await
    }

    /// Single pass. Only a failed notification is an error.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<RunReport> {
        counter!("digest_runs_total").increment(1);
        gauge!("digest_last_run_ts").set(now.timestamp() as f64);

        if let Some(window) = &self.config.posting_window {
            if !window.allows(now) {
                tracing::info!(hours = ?window.hours(), tz = %window.tz(), "outside posting hours");
                return Ok(RunReport::NotPostingHour);
            }
        }

        let outcomes = ingest::fetch_all(self.fetcher.as_ref(), &self.config.feeds).await;
        let failed = outcomes.iter().filter(|o| o.is_failed()).count();
        let articles = ingest::collect_articles(outcomes);

        let fetched = articles.len();
        let scored = score_and_filter(articles, &self.scorer, self.config.min_score);
        let qualifying = scored.len();
        let selected = dedupe_and_cap(scored, self.cache.as_ref(), self.config.post_max).await;

        tracing::info!(
            sources = self.config.feeds.len(),
            failed_sources = failed,
            fetched,
            qualifying,
            selected = selected.len(),
            "digest candidates"
        );

        if selected.is_empty() {
            tracing::info!("no new items");
            return Ok(RunReport::NoNewItems);
        }

        let digest = Digest {
            date: now.date_naive(),
            items: condense_items(&selected),
        };
        self.notifier
            .send(&digest)
            .await
            .context("digest failed")?;

        let items = digest.items.len();
        counter!("digest_items_posted_total").increment(items as u64);

        let fps = selected.into_iter().map(|s| s.fingerprint).collect();
        let marked = mark_seen_all(Arc::clone(&self.cache), fps, self.config.seen_ttl_secs).await;
        if marked < items {
            tracing::warn!(items, marked, "some posted items were not marked seen");
        }

        tracing::info!(items, marked, "posted digest");
        Ok(RunReport::Posted { items, marked })
    }
}
