// src/schedule.rs
//! Optional posting-hour gate.
//!
//! The external scheduler may call the endpoint every hour; when a window is
//! configured, only calls landing in one of the listed local hours post.
//! Local time is computed through the IANA zone, so DST shifts are handled.

use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;

pub const DEFAULT_POSTING_TZ: Tz = chrono_tz::Europe::London;

#[derive(Debug, Clone, PartialEq)]
pub struct PostingWindow {
    hours: Vec<u32>,
    tz: Tz,
}

impl PostingWindow {
    pub fn new(mut hours: Vec<u32>, tz: Tz) -> Self {
        hours.sort_unstable();
        hours.dedup();
        Self { hours, tz }
    }

    /// Parse `"8,17"` style lists. Every entry must be an hour in 0..=23.
    pub fn parse(hours: &str, tz: &str) -> Result<Self, String> {
        let tz: Tz = tz.trim().parse().map_err(|_| format!("unknown time zone '{tz}'"))?;
        let mut out = Vec::new();
        for part in hours.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let h: u32 = part.parse().map_err(|_| format!("'{part}' is not an hour"))?;
            if h > 23 {
                return Err(format!("hour {h} out of range 0..=23"));
            }
            out.push(h);
        }
        if out.is_empty() {
            return Err("no hours listed".to_string());
        }
        Ok(Self::new(out, tz))
    }

    pub fn hours(&self) -> &[u32] {
        &self.hours
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    pub fn allows(&self, now: DateTime<Utc>) -> bool {
        let local = now.with_timezone(&self.tz);
        self.hours.contains(&local.hour())
    }
}
