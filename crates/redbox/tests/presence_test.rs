// Integration tests for the overlay presence protocol
//
// Covers the two entry semantics against a mock page:
// - assert_visible never performs the open action
// - open_and_assert_visible always clicks first, and skips polling entirely
//   when nothing is openable


use std::time::Duration;

use mock_driver::MockDriver;
use redbox_rs::{OverlayAccessor, PresenceOutcome, assert_visible, open_and_assert_visible};

const TIMEOUT: Duration = Duration::from_millis(200);
const INTERVAL: Duration = Duration::from_millis(10);

#[tokio::test]
async fn visible_overlay_is_reported_without_clicking() {
    let driver = MockDriver::new().with_visible_overlay();
    let accessor = OverlayAccessor::new(&driver);

    let outcome = assert_visible(&accessor, TIMEOUT, INTERVAL).await;

    assert_eq!(outcome, PresenceOutcome::Visible);
    assert_eq!(driver.toast_clicks(), 0);
}

#[tokio::test]
async fn overlay_appearing_mid_poll_is_reported_visible() {
    let driver = MockDriver::new().with_reveal_after_checks(3);
    let accessor = OverlayAccessor::new(&driver);

    let outcome = assert_visible(&accessor, TIMEOUT, INTERVAL).await;

    assert_eq!(outcome, PresenceOutcome::Visible);
    assert!(driver.presence_checks() >= 3);
    assert_eq!(driver.toast_clicks(), 0);
}

#[tokio::test]
async fn missing_overlay_times_out_to_not_found() {
    let driver = MockDriver::new();
    let accessor = OverlayAccessor::new(&driver);

    let outcome = assert_visible(&accessor, Duration::from_millis(50), INTERVAL).await;

    assert_eq!(outcome, PresenceOutcome::NotFound);
    assert!(driver.presence_checks() >= 1);
    assert_eq!(driver.toast_clicks(), 0);
}

#[tokio::test]
async fn collapsed_overlay_behind_toast_counts_as_not_found_for_assert_visible() {
    let driver = MockDriver::new().with_toast();
    let accessor = OverlayAccessor::new(&driver);

    let outcome = assert_visible(&accessor, Duration::from_millis(50), INTERVAL).await;

    assert_eq!(outcome, PresenceOutcome::NotFound);
    assert_eq!(driver.toast_clicks(), 0);
}

#[tokio::test]
async fn collapsed_overlay_is_opened_then_visible() {
    let driver = MockDriver::new().with_toast();
    let accessor = OverlayAccessor::new(&driver);

    let outcome = open_and_assert_visible(&accessor, TIMEOUT, INTERVAL).await;

    assert_eq!(outcome, PresenceOutcome::Visible);
    assert_eq!(driver.toast_clicks(), 1);
}

#[tokio::test]
async fn nothing_openable_skips_polling_entirely() {
    let driver = MockDriver::new();
    let accessor = OverlayAccessor::new(&driver);

    let outcome = open_and_assert_visible(&accessor, TIMEOUT, INTERVAL).await;

    assert_eq!(outcome, PresenceOutcome::NotOpenable);
    assert_eq!(driver.toast_clicks(), 0);
    assert_eq!(driver.presence_checks(), 0);
}

#[tokio::test]
async fn toast_that_never_expands_reports_not_openable() {
    let driver = MockDriver::new().with_stuck_toast();
    let accessor = OverlayAccessor::new(&driver);

    let outcome = open_and_assert_visible(&accessor, Duration::from_millis(50), INTERVAL).await;

    assert_eq!(outcome, PresenceOutcome::NotOpenable);
    assert_eq!(driver.toast_clicks(), 1);
    assert!(driver.presence_checks() >= 1);
}
