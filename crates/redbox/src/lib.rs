//! redbox-rs: Inline-snapshot assertions for dev-mode error overlays
//!
//! A verification harness for the in-browser diagnostic panel ("redbox")
//! that development servers pop up when a page hits a runtime or compile
//! error. The harness drives a [`BrowserDriver`] to either confirm an
//! overlay is visible or expand a collapsed one, extracts a normalized
//! [`OverlayRecord`] (description, source excerpt, call stack, dedup count,
//! title), and compares it against an expected literal, or records the
//! capture as the new expectation when none is supplied.
//!
//! # Example
//!
//! ```ignore
//! use redbox_rs::{expect_redbox, TestOutcome};
//!
//! #[tokio::test]
//! async fn shows_console_error_overlay() {
//!     let driver = connect_to_dev_server().await; // impls BrowserDriver
//!     // ... navigate and trigger the error ...
//!
//!     let outcome = expect_redbox(&driver)
//!         .to_display_redbox(Some(
//!             r#"
//!             {
//!               "description": "trigger an console.error in render",
//!               "source": "app/browser/render/page.js (4:11) @ error
//!             > 4 |   console.error('trigger an console.error in render')
//!                 |           ^",
//!               "stack": [],
//!               "count": 1,
//!               "title": "Console Error",
//!             }
//!             "#,
//!         ))
//!         .await;
//!
//!     // A Fail outcome carries the full expected-vs-actual diff and tells
//!     // the test to skip its remaining steps.
//!     assert_eq!(outcome, TestOutcome::Pass, "{outcome:?}");
//! }
//! ```
//!
//! Overlay absence is snapshottable too: when no overlay ever appears, the
//! comparison runs against `"<no redbox found>"` (or `"<no redbox to open>"`
//! for the collapsed entry point) instead of erroring.

pub mod accessor;
mod driver;
mod error;
mod harness;
mod matcher;
mod poll;
mod presence;
pub mod record;
mod store;

// Re-export error types
pub use error::{Error, Result};

// Re-export the browser collaborator seam
pub use driver::{BrowserDriver, ElementId};

// Re-export the assertion entry points and defaults
pub use harness::{
    DEFAULT_POLL_INTERVAL, DEFAULT_REDBOX_TIMEOUT, RedboxExpectation, expect_redbox,
};

// Re-export the match engine surface
pub use matcher::{EntryPoint, SnapshotDiff, TestOutcome, match_snapshot};

// Re-export the presence protocol
pub use presence::{PresenceOutcome, assert_visible, open_and_assert_visible};

// Re-export the poll primitive
pub use poll::poll_until;

// Re-export the record model and sentinels
pub use record::{
    ABSENCE_SENTINEL, ErrorCount, NO_REDBOX_FOUND, NO_REDBOX_TO_OPEN, OverlayRecord, RawCapture,
    normalize,
};

// Re-export the snapshot store
pub use store::{SnapshotDecision, SnapshotKey, SnapshotStore};

// Re-export the accessor types
pub use accessor::{OverlayAccessor, OverlaySelectors};
