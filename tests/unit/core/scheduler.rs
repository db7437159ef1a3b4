//! Unit tests for the cycle scheduler

use mafafx::core::runtime::SignalRuntime;
use mafafx::core::scheduler::{cron_expression, Cadence, CycleScheduler};
use mafafx::notifications::SignalTransitionNotifier;
use std::sync::Arc;
use tokio_test::assert_ok;

use crate::support::pipeline;

fn runtime() -> Arc<SignalRuntime> {
    Arc::new(SignalRuntime::new(
        pipeline().orchestrator,
        SignalTransitionNotifier::disabled(),
    ))
}

#[test]
fn test_cron_expression_from_interval() {
    assert_eq!(cron_expression(15).as_deref(), Some("*/15 * * * * *"));
    assert_eq!(cron_expression(60).as_deref(), Some("0 */1 * * * *"));
    assert_eq!(cron_expression(300).as_deref(), Some("0 */5 * * * *"));
    assert_eq!(cron_expression(7200).as_deref(), Some("0 0 */2 * * *"));
}

#[test]
fn test_uneven_intervals_have_no_cron_step() {
    for secs in [0, 7, 45, 90, 100, 5400, 7000, 36_000, 86_400, 172_800] {
        assert_eq!(cron_expression(secs), None, "interval {}", secs);
    }
}

#[tokio::test]
async fn test_uneven_interval_uses_fixed_period() {
    let scheduler = assert_ok!(CycleScheduler::new(runtime(), 45));
    assert!(matches!(
        scheduler.cadence(),
        Cadence::Every(period) if *period == std::time::Duration::from_secs(45)
    ));

    let scheduler = assert_ok!(CycleScheduler::new(runtime(), 300));
    assert!(matches!(scheduler.cadence(), Cadence::Cron(_)));
}

#[tokio::test]
async fn test_zero_interval_is_rejected() {
    assert!(CycleScheduler::new(runtime(), 0).is_err());
}

#[tokio::test]
async fn test_start_and_stop() {
    let scheduler = assert_ok!(CycleScheduler::new(runtime(), 60));
    assert!(!scheduler.is_running().await);

    assert_ok!(scheduler.start().await);
    assert!(scheduler.is_running().await);
    assert!(scheduler.start().await.is_err());

    scheduler.stop().await;
    assert!(!scheduler.is_running().await);
}

#[tokio::test]
async fn test_tick_runs_a_cycle() {
    let runtime = runtime();
    let scheduler = assert_ok!(CycleScheduler::new(runtime.clone(), 1));
    assert_ok!(scheduler.start().await);

    let mut published = false;
    for _ in 0..40 {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        if runtime.snapshot().await.is_some() {
            published = true;
            break;
        }
    }
    scheduler.stop().await;
    assert!(published);
}
