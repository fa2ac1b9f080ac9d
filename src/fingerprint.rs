// src/fingerprint.rs
//! Stable article identity: hex SHA-256 of the canonical URL, used as the seen-set key.

use sha2::{Digest, Sha256};
use std::fmt;

/// 64 hex chars, lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the fingerprint for `url`. The URL is hashed as given; callers trim it at ingestion.
pub fn fingerprint(url: &str) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest.iter() {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    Fingerprint(out)
}
