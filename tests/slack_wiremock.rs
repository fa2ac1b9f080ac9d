// tests/slack_wiremock.rs
//
// chat.postMessage contract: bearer token, channel + fallback text + blocks,
// `ok:false` and non-2xx both fail the send.

use chrono::NaiveDate;
use feed_digest::{Digest, DigestItem, Notifier, SlackNotifier};
use serde_json::{json, Value};
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn digest() -> Digest {
    Digest {
        date: NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
        items: vec![
            DigestItem {
                title: "GPU startup raises".into(),
                url: "https://n.test/1".into(),
                source: "Wire".into(),
                score: 8,
                bullets: vec!["First.".into(), "Second.".into()],
            },
            DigestItem {
                title: "Outage".into(),
                url: "https://n.test/2".into(),
                source: "Wire".into(),
                score: 3,
                bullets: vec![],
            },
        ],
    }
}

#[tokio::test]
async fn posts_blocks_and_fallback() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat.postMessage"))
        .and(header("authorization", "Bearer xoxb-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "ts": "1.2" })))
        .expect(1)
        .mount(&server)
        .await;

    let slack = SlackNotifier::new("xoxb-test", "C0TEST").with_api_base(server.uri());
    slack.send(&digest()).await.expect("send ok");

    let reqs = server.received_requests().await.expect("recording on");
    let body: Value = serde_json::from_slice(&reqs[0].body).unwrap();
    assert_eq!(body["channel"], "C0TEST");
    assert_eq!(
        body["text"],
        "Infra news digest — 2025-06-10\nGPU startup raises - https://n.test/1\nOutage - https://n.test/2"
    );
    let blocks = body["blocks"].as_array().unwrap();
    assert_eq!(blocks[0]["type"], "header");
    assert_eq!(blocks.iter().filter(|b| b["type"] == "divider").count(), 1);
    assert_eq!(blocks.iter().filter(|b| b["type"] == "context").count(), 2);
}

#[tokio::test]
async fn ok_false_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat.postMessage"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "ok": false, "error": "not_in_channel" })),
        )
        .mount(&server)
        .await;

    let slack = SlackNotifier::new("xoxb-test", "C0TEST").with_api_base(server.uri());
    let err = slack.send(&digest()).await.unwrap_err();
    assert!(format!("{err:#}").contains("not_in_channel"));
}

#[tokio::test]
async fn non_2xx_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let slack = SlackNotifier::new("xoxb-test", "C0TEST").with_api_base(server.uri());
    let err = slack.send(&digest()).await.unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("503"), "{msg}");
}
