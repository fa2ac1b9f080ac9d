// src/relevance.rs
//! Keyword relevance scoring for feed articles.
//!
//! Two tiers of lowercase terms, matched by plain substring containment on
//! `lowercase(title + " " + summary)`:
//! - `high`  : funding / M&A / outage / launch vocabulary, +3 per matching term
//! - `infra` : accelerator and hardware-vendor vocabulary, +2 per matching term
//!
//! Each term counts once regardless of how often it appears. Terms overlap on
//! purpose: "acquisition" matches both "acquisition" and "acqui".

pub const HIGH_SIGNAL_WEIGHT: u32 = 3;
pub const INFRA_WEIGHT: u32 = 2;

const DEFAULT_HIGH: &[&str] = &[
    "funding",
    "raises",
    "acquisition",
    "acqui",
    "outage",
    "breach",
    "open source",
    "partnership",
    "launch",
    "announced",
    "milestone",
];

const DEFAULT_INFRA: &[&str] = &[
    "h100",
    "h200",
    "mi300",
    "gpu",
    "accelerator",
    "nvidia",
    "amd",
    "intel",
];

/// The two curated term lists. Entries are stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSets {
    pub high: Vec<String>,
    pub infra: Vec<String>,
}

impl Default for KeywordSets {
    fn default() -> Self {
        Self {
            high: DEFAULT_HIGH.iter().map(|s| s.to_string()).collect(),
            infra: DEFAULT_INFRA.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl KeywordSets {
    /// Lowercase, trim, drop empties and duplicates (first occurrence wins).
    pub fn normalized(self) -> Self {
        fn clean(items: Vec<String>) -> Vec<String> {
            let mut out: Vec<String> = Vec::with_capacity(items.len());
            for it in items {
                let t = it.trim().to_lowercase();
                if !t.is_empty() && !out.contains(&t) {
                    out.push(t);
                }
            }
            out
        }
        Self {
            high: clean(self.high),
            infra: clean(self.infra),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RelevanceScorer {
    keywords: KeywordSets,
}

impl RelevanceScorer {
    pub fn new(keywords: KeywordSets) -> Self {
        Self {
            keywords: keywords.normalized(),
        }
    }

    pub fn keywords(&self) -> &KeywordSets {
        &self.keywords
    }

    /// Pure function of `title` and `summary`.
    pub fn score(&self, title: &str, summary: &str) -> u32 {
        let txt = format!("{title} {summary}").to_lowercase();
        hits(&txt, &self.keywords.high) * HIGH_SIGNAL_WEIGHT
            + hits(&txt, &self.keywords.infra) * INFRA_WEIGHT
    }
}

fn hits(txt: &str, terms: &[String]) -> u32 {
    terms.iter().filter(|t| txt.contains(t.as_str())).count() as u32
}
