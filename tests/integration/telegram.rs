//! Telegram sink against a mocked Bot API

use mafafx::error::EngineError;
use mafafx::notifications::{NotificationSink, TelegramSink};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::test_utils::BOT_TOKEN;

fn sink(server: &MockServer) -> TelegramSink {
    TelegramSink::with_client(server.uri(), BOT_TOKEN, reqwest::Client::new())
}

#[tokio::test]
async fn posts_message_to_chat() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", BOT_TOKEN)))
        .and(body_partial_json(json!({"chat_id": "111", "text": "XAU/USD BUY"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": {}})))
        .expect(1)
        .mount(&server)
        .await;

    sink(&server).send("111", "XAU/USD BUY").await.unwrap();
}

#[tokio::test]
async fn api_rejection_is_delivery_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: chat not found"
        })))
        .mount(&server)
        .await;

    let err = sink(&server).send("999", "hello").await.unwrap_err();
    assert_eq!(
        err,
        EngineError::Delivery {
            recipient: "999".to_string(),
            reason: "Bad Request: chat not found".to_string()
        }
    );
}

#[tokio::test]
async fn unreachable_api_is_delivery_error() {
    let sink = TelegramSink::with_client("http://127.0.0.1:9", BOT_TOKEN, reqwest::Client::new());
    let err = sink.send("111", "hello").await.unwrap_err();
    assert_eq!(err.kind(), "delivery");
    assert!(!err.to_string().contains(BOT_TOKEN), "bot token leaked: {}", err);
}
