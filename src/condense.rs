// src/condense.rs
//! Heuristic summary condenser: at most `max_bullets` short lines per article.
//!
//! Sentence boundary = `.`, `?` or `!` followed by whitespace; the punctuation
//! stays with the preceding sentence. A lone sentence longer than
//! [`LONG_SENTENCE_CHARS`] is bisected at the first whitespace at or after its
//! character midpoint.

use once_cell::sync::OnceCell;
use regex::Regex;

pub const DEFAULT_MAX_BULLETS: usize = 2;
pub const LONG_SENTENCE_CHARS: usize = 180;

fn collapse_ws(s: &str) -> String {
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    re.replace_all(s, " ").trim().to_string()
}

fn split_sentences(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '?' | '!') && chars.peek().is_some_and(|n| n.is_whitespace()) {
            while chars.peek().is_some_and(|n| n.is_whitespace()) {
                chars.next();
            }
            out.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Split at the first whitespace at or after the char midpoint.
fn bisect(sentence: &str) -> Option<(String, String)> {
    let chars: Vec<char> = sentence.chars().collect();
    let mid = chars.len() / 2;
    let idx = (mid..chars.len()).find(|&i| chars[i].is_whitespace())?;
    let left: String = chars[..idx].iter().collect();
    let right: String = chars[idx + 1..].iter().collect();
    Some((left.trim().to_string(), right.trim().to_string()))
}

pub fn condense(summary: &str, max_bullets: usize) -> Vec<String> {
    let text = collapse_ws(summary);
    if text.is_empty() {
        return Vec::new();
    }

    let sentences = split_sentences(&text);
    if sentences.len() >= max_bullets {
        return sentences.into_iter().take(max_bullets).collect();
    }

    if sentences.len() == 1 && sentences[0].chars().count() > LONG_SENTENCE_CHARS {
        return match bisect(&sentences[0]) {
            Some((a, b)) => vec![a, b],
            None => sentences,
        };
    }

    sentences
}
