// tests/upstash_wiremock.rs
//
// Upstash REST contract: bearer auth, GET /get/{key}, POST /set/{key}/1?ex=,
// and the availability-first failure policy.

use feed_digest::fingerprint::fingerprint;
use feed_digest::{SeenCache, UpstashCache};
use serde_json::json;
use wiremock::{
    matchers::{header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

#[tokio::test]
async fn has_true_when_result_present() {
    let server = MockServer::start().await;
    let fp = fingerprint("https://n.test/seen");

    Mock::given(method("GET"))
        .and(path(format!("/get/{fp}")))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "1" })))
        .expect(1)
        .mount(&server)
        .await;

    let cache = UpstashCache::new(server.uri(), "tok");
    assert!(cache.has(&fp).await);
}

#[tokio::test]
async fn has_false_when_result_null() {
    let server = MockServer::start().await;
    let fp = fingerprint("https://n.test/new");

    Mock::given(method("GET"))
        .and(path(format!("/get/{fp}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": null })))
        .mount(&server)
        .await;

    let cache = UpstashCache::new(server.uri(), "tok");
    assert!(!cache.has(&fp).await);
}

#[tokio::test]
async fn read_failure_counts_as_unseen() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let cache = UpstashCache::new(server.uri(), "tok");
    assert!(!cache.has(&fingerprint("https://n.test/x")).await);
}

#[tokio::test]
async fn unreachable_store_counts_as_unseen() {
    // Nothing listens on port 9 on loopback in test environments.
    let cache = UpstashCache::new("http://127.0.0.1:9", "tok").with_timeout(2);
    assert!(!cache.has(&fingerprint("https://n.test/x")).await);
    assert!(!cache.mark_seen(&fingerprint("https://n.test/x"), 60).await);
}

#[tokio::test]
async fn mark_seen_posts_with_expiry() {
    let server = MockServer::start().await;
    let fp = fingerprint("https://n.test/post");

    Mock::given(method("POST"))
        .and(path(format!("/set/{fp}/1")))
        .and(query_param("ex", "604800"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "OK" })))
        .expect(1)
        .mount(&server)
        .await;

    let cache = UpstashCache::new(format!("{}/", server.uri()), "tok");
    assert!(cache.mark_seen(&fp, 604_800).await);
}

#[tokio::test]
async fn mark_seen_failure_is_reported_not_raised() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "unauthorized" })))
        .mount(&server)
        .await;

    let cache = UpstashCache::new(server.uri(), "bad");
    assert!(!cache.mark_seen(&fingerprint("https://n.test/y"), 60).await);
}
