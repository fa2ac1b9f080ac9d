// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod cache;
pub mod condense;
pub mod config;
pub mod fingerprint;
pub mod ingest;
pub mod metrics;
pub mod notify;
pub mod pipeline;
pub mod relevance;
pub mod schedule;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::cache::{MemoryCache, SeenCache, UpstashCache};
pub use crate::config::{ConfigError, DigestConfig};
pub use crate::notify::{Digest, DigestItem, Notifier, SlackNotifier};
pub use crate::pipeline::{DigestService, RunReport};
