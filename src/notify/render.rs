// src/notify/render.rs
//! Slack Block Kit rendering for a [`Digest`], plus the plain-text fallback.

use serde_json::{json, Value};

use super::{Digest, DigestItem};

pub const MAX_TITLE_CHARS: usize = 300;
pub const MAX_BULLET_CHARS: usize = 700;

/// `chat.postMessage` rejects messages with more blocks than this.
pub const SLACK_MAX_BLOCKS: usize = 50;
/// A digest of n items renders to at most 4n blocks: the header, up to three
/// blocks per item and n - 1 dividers.
pub const MAX_DIGEST_ITEMS: usize = SLACK_MAX_BLOCKS / 4;

pub fn header_text(digest: &Digest) -> String {
    format!("Infra news digest — {}", digest.date.format("%Y-%m-%d"))
}

/// Slack mrkdwn control characters.
pub fn escape_mrkdwn(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Characters that would end the `<url|label>` link early.
fn escape_link_url(url: &str) -> String {
    url.replace('|', "%7C")
        .replace('<', "%3C")
        .replace('>', "%3E")
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn item_blocks(item: &DigestItem) -> Vec<Value> {
    let title = escape_mrkdwn(&truncate_chars(&item.title, MAX_TITLE_CHARS));
    let mut blocks = vec![json!({
        "type": "section",
        "text": { "type": "mrkdwn", "text": format!("*{title}*") }
    })];

    if !item.bullets.is_empty() {
        let lines = item
            .bullets
            .iter()
            .take(2)
            .map(|b| format!("    • {}", escape_mrkdwn(&truncate_chars(b, MAX_BULLET_CHARS))))
            .collect::<Vec<_>>()
            .join("\n");
        blocks.push(json!({
            "type": "section",
            "text": { "type": "mrkdwn", "text": lines }
        }));
    }

    let footer = format!(
        "<{}|Read article> • Source: {} • Score: {}",
        escape_link_url(&item.url),
        escape_mrkdwn(&item.source),
        item.score
    );
    blocks.push(json!({
        "type": "context",
        "elements": [ { "type": "mrkdwn", "text": footer } ]
    }));
    blocks
}

/// Header, then per item: title, bullets, footer; dividers between items.
pub fn render_blocks(digest: &Digest) -> Vec<Value> {
    let mut blocks = vec![json!({
        "type": "header",
        "text": { "type": "plain_text", "text": header_text(digest) }
    })];
    for (i, item) in digest.items.iter().enumerate() {
        if i > 0 {
            blocks.push(json!({ "type": "divider" }));
        }
        blocks.extend(item_blocks(item));
    }
    blocks
}

/// For clients that cannot render blocks (and for push notifications).
pub fn render_fallback(digest: &Digest) -> String {
    let mut out = header_text(digest);
    for item in &digest.items {
        out.push('\n');
        out.push_str(&format!("{} - {}", item.title, item.url));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn item(title: &str, bullets: &[&str]) -> DigestItem {
        DigestItem {
            title: title.into(),
            url: format!("https://n.test/{}", title.len()),
            source: "Wire".into(),
            score: 5,
            bullets: bullets.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn digest(items: Vec<DigestItem>) -> Digest {
        Digest {
            date: NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
            items,
        }
    }

    #[test]
    fn blocks_layout_with_dividers_between_items() {
        let d = digest(vec![item("A", &["One.", "Two."]), item("Bb", &[])]);
        let blocks = render_blocks(&d);
        let kinds: Vec<&str> = blocks.iter().map(|b| b["type"].as_str().unwrap()).collect();
        assert_eq!(
            kinds,
            vec!["header", "section", "section", "context", "divider", "section", "context"]
        );
        assert_eq!(blocks[0]["text"]["text"], "Infra news digest — 2025-06-10");
        assert_eq!(blocks[1]["text"]["text"], "*A*");
        assert_eq!(blocks[2]["text"]["text"], "    • One.\n    • Two.");
        assert_eq!(
            blocks[3]["elements"][0]["text"],
            "<https://n.test/1|Read article> • Source: Wire • Score: 5"
        );
    }

    #[test]
    fn fallback_lists_title_and_link_per_item() {
        let d = digest(vec![item("A", &[]), item("Bb", &[])]);
        assert_eq!(
            render_fallback(&d),
            "Infra news digest — 2025-06-10\nA - https://n.test/1\nBb - https://n.test/2"
        );
    }

    #[test]
    fn escapes_and_truncates() {
        let long = "x".repeat(400);
        let d = digest(vec![item(&format!("<b>&{long}"), &[])]);
        let blocks = render_blocks(&d);
        let t = blocks[1]["text"]["text"].as_str().unwrap();
        assert!(t.starts_with("*&lt;b&gt;&amp;"));
        // 300 visible chars before escaping, wrapped in '*'
        assert!(t.ends_with("…*"));
    }

    #[test]
    fn largest_digest_fits_in_one_message() {
        let items = (0..MAX_DIGEST_ITEMS)
            .map(|_| item("Title", &["One.", "Two."]))
            .collect();
        let blocks = render_blocks(&digest(items));
        assert!(blocks.len() <= SLACK_MAX_BLOCKS, "{} blocks", blocks.len());

        let one_more = (0..=MAX_DIGEST_ITEMS)
            .map(|_| item("Title", &["One.", "Two."]))
            .collect();
        assert!(render_blocks(&digest(one_more)).len() > SLACK_MAX_BLOCKS);
    }

    #[test]
    fn link_delimiters_in_url_are_encoded() {
        let mut it = item("A", &[]);
        it.url = "https://n.test/q?a=1|2&b=<x>".into();
        let blocks = render_blocks(&digest(vec![it]));
        assert_eq!(
            blocks[2]["elements"][0]["text"],
            "<https://n.test/q?a=1%7C2&b=%3Cx%3E|Read article> • Source: Wire • Score: 5"
        );
    }
}
