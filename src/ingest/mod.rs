// src/ingest/mod.rs
pub mod feed;
pub mod http;
pub mod types;

use crate::ingest::types::{FeedFetcher, FeedSource, RawArticle, SourceOutcome};
use metrics::counter;
use once_cell::sync::OnceCell;
use regex::Regex;

/// Normalize feed text: decode entities, strip tags, ASCII quotes, collapse whitespace.
/// A `<` not followed by a tag name is text ("revenue < $5M") and is kept.
/// Sentence punctuation is kept; the condenser depends on it.
pub fn clean_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[A-Za-z][^<>]*>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // 5) Tags replaced above leave a gap before trailing punctuation
    static RE_PUNCT: OnceCell<Regex> = OnceCell::new();
    let re_punct = RE_PUNCT.get_or_init(|| Regex::new(r" ([.,!?;:])").unwrap());
    re_punct.replace_all(&out, "$1").to_string()
}

/// Fetch and parse one source. Never fails; a failure is reported as [`SourceOutcome::Failed`].
pub async fn fetch_source(fetcher: &dyn FeedFetcher, source: &FeedSource) -> SourceOutcome {
    let parsed = match fetcher.fetch_xml(&source.url).await {
        Ok(xml) => feed::parse_feed(&xml, &source.url),
        Err(e) => Err(e),
    };
    match parsed {
        Ok(articles) => {
            counter!("digest_articles_total").increment(articles.len() as u64);
            SourceOutcome::Fetched {
                source: source.clone(),
                articles,
            }
        }
        Err(e) => SourceOutcome::Failed {
            source: source.clone(),
            reason: format!("{e:#}"),
        },
    }
}

/// Fetch every source in order, one at a time.
pub async fn fetch_all(fetcher: &dyn FeedFetcher, sources: &[FeedSource]) -> Vec<SourceOutcome> {
    let mut out = Vec::with_capacity(sources.len());
    for s in sources {
        out.push(fetch_source(fetcher, s).await);
    }
    out
}

/// Flatten successful outcomes; failed sources are logged and skipped.
pub fn collect_articles(outcomes: Vec<SourceOutcome>) -> Vec<RawArticle> {
    let mut articles = Vec::new();
    for outcome in outcomes {
        match outcome {
            SourceOutcome::Fetched { source, articles: mut got } => {
                tracing::debug!(source = %source.url, count = got.len(), "feed fetched");
                articles.append(&mut got);
            }
            SourceOutcome::Failed { source, reason } => {
                tracing::warn!(source = %source.url, %reason, "feed skipped");
                counter!("digest_feed_errors_total").increment(1);
            }
        }
    }
    articles
}
