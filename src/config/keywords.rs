// src/config/keywords.rs
//! Keyword sets for the relevance scorer, from TOML or the built-in lists.
//!
//! ```toml
//! high  = ["funding", "acqui", "outage"]
//! infra = ["gpu", "nvidia"]
//! ```

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::relevance::KeywordSets;

pub const DEFAULT_KEYWORDS_PATH: &str = "config/keywords.toml";

/// Load keyword sets from an explicit TOML file. A missing table falls back to the built-in list.
pub fn load_keywords_from(path: &Path) -> Result<KeywordSets> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading keywords from {}", path.display()))?;
    parse_keywords(&content)
}

/// Resolution order:
/// 1) explicit path (from `KEYWORDS_PATH`), which must exist
/// 2) config/keywords.toml
/// 3) built-in defaults
pub fn load_keywords(explicit: Option<&Path>) -> Result<KeywordSets> {
    if let Some(p) = explicit {
        if p.exists() {
            return load_keywords_from(p);
        }
        return Err(anyhow!("KEYWORDS_PATH points to non-existent path {}", p.display()));
    }
    let fallback = PathBuf::from(DEFAULT_KEYWORDS_PATH);
    if fallback.exists() {
        return load_keywords_from(&fallback);
    }
    Ok(KeywordSets::default())
}

fn parse_keywords(s: &str) -> Result<KeywordSets> {
    #[derive(serde::Deserialize)]
    struct TomlKeywords {
        high: Option<Vec<String>>,
        infra: Option<Vec<String>>,
    }
    let raw: TomlKeywords = toml::from_str(s).context("parsing keywords toml")?;
    let defaults = KeywordSets::default();
    Ok(KeywordSets {
        high: raw.high.unwrap_or(defaults.high),
        infra: raw.infra.unwrap_or(defaults.infra),
    }
    .normalized())
}
