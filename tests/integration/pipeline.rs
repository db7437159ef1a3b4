//! End-to-end evaluation cycles against mocked upstreams

use mafafx::models::{AlertStatus, SignalState};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::test_utils::{mock_all_upstreams, TestApp, BOT_TOKEN};

#[tokio::test]
async fn transition_is_alerted_once_across_cycles() {
    let upstream = MockServer::start().await;
    mock_all_upstreams(&upstream).await;
    let app = TestApp::with_upstream(upstream).await;

    let first = app.runtime.run_cycle().await.unwrap();
    let second = app.runtime.run_cycle().await.unwrap();
    let third = app.runtime.force_refresh().await.unwrap();

    assert_eq!(first.bias.state, SignalState::StrongBuy);
    assert_eq!(
        first.alert,
        AlertStatus::Dispatched {
            delivered: 1,
            failed: 0
        }
    );
    assert_eq!(second.alert, AlertStatus::Suppressed);
    assert_eq!(third.alert, AlertStatus::Suppressed);

    let requests = app.upstream.received_requests().await.unwrap();
    let sends = requests
        .iter()
        .filter(|r| r.url.path() == format!("/bot{}/sendMessage", BOT_TOKEN))
        .count();
    let primary_fetches = requests
        .iter()
        .filter(|r| r.url.query().unwrap_or("").contains("symbol=XAU%2FUSD"))
        .count();
    assert_eq!(sends, 1);
    // second cycle served from cache, forced refresh went upstream again
    assert_eq!(primary_fetches, 2);
}

#[tokio::test]
async fn snapshot_carries_display_values() {
    let upstream = MockServer::start().await;
    mock_all_upstreams(&upstream).await;
    let app = TestApp::with_upstream(upstream).await;

    let snapshot = app.runtime.run_cycle().await.unwrap();

    assert_eq!(snapshot.primary_asset.last_price, 2134.0);
    assert!((snapshot.proxy_asset.last_price - 100.0 / 1.0811).abs() < 1e-6);
    assert!(snapshot.proxy_asset.percent_change < -0.05);
    assert!(snapshot.yield_change < -0.5);
    assert_eq!(snapshot.primary_asset.as_of.offset().local_minus_utc(), 7 * 3600);
    assert!(snapshot.degraded.is_empty());
    assert_eq!(snapshot.calendar_events.len(), 1);
}

#[tokio::test]
async fn failing_telegram_does_not_fail_the_cycle() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", BOT_TOKEN)))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({"ok": false})))
        .mount(&upstream)
        .await;
    mock_all_upstreams(&upstream).await;
    let app = TestApp::with_upstream(upstream).await;

    let snapshot = app.runtime.run_cycle().await.unwrap();
    assert_eq!(
        snapshot.alert,
        AlertStatus::Dispatched {
            delivered: 0,
            failed: 1
        }
    );
    assert_eq!(app.runtime.memory().await.last_emitted_state, SignalState::StrongBuy);

    let metrics = app.metrics.export().unwrap();
    assert!(metrics.contains("notifications_total{result=\"failed\"} 1"));
}
