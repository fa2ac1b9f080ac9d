// src/metrics.rs
use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder and describe the digest series.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;

        describe_counter!("digest_runs_total", "Digest runs started.");
        describe_counter!("digest_feed_errors_total", "Feed sources skipped after fetch/parse errors.");
        describe_counter!("digest_articles_total", "Articles parsed from feeds.");
        describe_counter!("digest_duplicates_total", "Qualifying articles skipped as already posted.");
        describe_counter!("digest_items_posted_total", "Items included in posted digests.");
        describe_counter!("digest_cache_errors_total", "Seen-set read/write failures.");
        describe_gauge!("digest_last_run_ts", "Unix ts when the digest last ran.");

        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
