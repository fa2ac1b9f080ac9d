// src/ingest/feed.rs
//! RSS 2.0 and Atom parsing into [`RawArticle`]s.

use anyhow::{anyhow, Context, Result};
use quick_xml::de::from_str;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::OffsetDateTime;

use super::clean_text;
use super::types::RawArticle;

// ---- RSS 2.0 ----

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    title: Option<TextNode>,
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<TextNode>,
    #[serde(rename = "link", default)]
    links: Vec<LinkNode>,
    guid: Option<TextNode>,
    description: Option<TextNode>,
    #[serde(rename = "encoded", alias = "content:encoded")]
    content_encoded: Option<TextNode>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

// ---- Atom ----

#[derive(Debug, Deserialize)]
struct AtomFeed {
    title: Option<TextNode>,
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<TextNode>,
    #[serde(rename = "link", default)]
    links: Vec<LinkNode>,
    id: Option<String>,
    summary: Option<TextNode>,
    content: Option<TextNode>,
    published: Option<String>,
    updated: Option<String>,
}

// ---- shared nodes ----

/// Element text, tolerating attributes such as Atom's `type="html"`.
#[derive(Debug, Default, Deserialize)]
struct TextNode {
    #[serde(rename = "$text", default)]
    value: Option<String>,
}

impl TextNode {
    fn text(node: &Option<TextNode>) -> &str {
        node.as_ref()
            .and_then(|n| n.value.as_deref())
            .unwrap_or_default()
    }
}

/// `<link>url</link>` (RSS) or `<link rel=".." href=".."/>` (Atom, atom:link inside RSS).
#[derive(Debug, Default, Deserialize)]
struct LinkNode {
    #[serde(rename = "@href", default)]
    href: Option<String>,
    #[serde(rename = "@rel", default)]
    rel: Option<String>,
    #[serde(rename = "$text", default)]
    value: Option<String>,
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

/// RSS: element text first (`<link>`), then a self-closing alternate href.
fn rss_link(links: &[LinkNode]) -> Option<String> {
    links
        .iter()
        .find_map(|l| non_empty(l.value.as_deref()))
        .or_else(|| atom_link(links))
}

/// Atom: `rel="alternate"` or no `rel` wins over `self`/`enclosure`/etc.
fn atom_link(links: &[LinkNode]) -> Option<String> {
    links
        .iter()
        .filter(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .find_map(|l| non_empty(l.href.as_deref()))
}

fn parse_rfc2822_to_unix(ts: &str) -> Option<i64> {
    OffsetDateTime::parse(ts.trim(), &Rfc2822)
        .ok()
        .map(|dt| dt.unix_timestamp())
}

fn parse_rfc3339_to_unix(ts: &str) -> Option<i64> {
    OffsetDateTime::parse(ts.trim(), &Rfc3339)
        .ok()
        .map(|dt| dt.unix_timestamp())
}

/// Named HTML entities feeds like to emit but XML does not define.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&hellip;", "...")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}

fn host_of(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string())
}

/// Local name of the document element, if any.
fn root_element(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Some(String::from_utf8_lossy(e.local_name().as_ref()).into_owned())
            }
            Ok(Event::Eof) | Err(_) => return None,
            Ok(_) => {}
        }
    }
}

/// Parse an RSS 2.0 or Atom document. `feed_url` names the source when the feed has no title.
pub fn parse_feed(xml: &str, feed_url: &str) -> Result<Vec<RawArticle>> {
    let xml = scrub_html_entities_for_xml(xml);

    match root_element(&xml).as_deref() {
        Some("rss") => {
            let rss: Rss = from_str(&xml).context("parsing rss xml")?;
            Ok(from_rss(rss, feed_url))
        }
        Some("feed") => {
            let feed: AtomFeed = from_str(&xml).context("parsing atom xml")?;
            Ok(from_atom(feed, feed_url))
        }
        Some(other) => Err(anyhow!("unsupported feed root element <{other}>")),
        None => Err(anyhow!("no xml document element")),
    }
}

fn source_name(title: &Option<TextNode>, feed_url: &str) -> String {
    let t = clean_text(TextNode::text(title));
    if t.is_empty() {
        host_of(feed_url)
    } else {
        t
    }
}

fn from_rss(rss: Rss, feed_url: &str) -> Vec<RawArticle> {
    let source = source_name(&rss.channel.title, feed_url);
    rss.channel
        .items
        .into_iter()
        .filter_map(|it| {
            let url = rss_link(&it.links).or_else(|| non_empty(Some(TextNode::text(&it.guid))))?;
            let summary = match clean_text(TextNode::text(&it.description)) {
                s if s.is_empty() => clean_text(TextNode::text(&it.content_encoded)),
                s => s,
            };
            Some(RawArticle {
                title: clean_text(TextNode::text(&it.title)),
                url,
                summary,
                source: source.clone(),
                published_at: it.pub_date.as_deref().and_then(parse_rfc2822_to_unix),
            })
        })
        .collect()
}

fn from_atom(feed: AtomFeed, feed_url: &str) -> Vec<RawArticle> {
    let source = source_name(&feed.title, feed_url);
    feed.entries
        .into_iter()
        .filter_map(|e| {
            let url = atom_link(&e.links).or_else(|| non_empty(e.id.as_deref()))?;
            let summary = match clean_text(TextNode::text(&e.summary)) {
                s if s.is_empty() => clean_text(TextNode::text(&e.content)),
                s => s,
            };
            let published_at = e
                .published
                .as_deref()
                .or(e.updated.as_deref())
                .and_then(parse_rfc3339_to_unix);
            Some(RawArticle {
                title: clean_text(TextNode::text(&e.title)),
                url,
                summary,
                source: source.clone(),
                published_at,
            })
        })
        .collect()
}
