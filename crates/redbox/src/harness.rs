// Harness - the two assertion operations exposed to test bodies
//
// expect_redbox(driver).to_display_redbox(..) for overlays that pop up by
// default, .to_display_collapsed_redbox(..) for overlays hidden behind a
// toast. Each runs the presence protocol, captures a record with per-field
// fault isolation, and hands off to the match engine.

use std::time::Duration;

use crate::accessor::{OverlayAccessor, OverlaySelectors};
use crate::driver::BrowserDriver;
use crate::matcher::{EntryPoint, TestOutcome, match_snapshot};
use crate::presence::{self, PresenceOutcome};
use crate::record::{RawCapture, normalize};
use crate::store::{SnapshotKey, SnapshotStore};

/// Default budget for the overlay to reach the required presence state.
pub const DEFAULT_REDBOX_TIMEOUT: Duration = Duration::from_secs(5);

/// Default polling interval for presence checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Creates an overlay expectation for the given driver.
///
/// # Example
///
/// ```ignore
/// use redbox_rs::expect_redbox;
///
/// // The scenario triggered a console error; the overlay is collapsed
/// // behind a toast and must match the embedded snapshot exactly.
/// let outcome = expect_redbox(&driver)
///     .to_display_collapsed_redbox(Some(
///         r#"
///         {
///           "description": "trigger an console <error>",
///           "source": "app/browser/event/page.js (7:17) @ error
///         >  7 |         console.error('trigger an console <%s>', 'error')
///              |                 ^",
///           "stack": [
///             "button <anonymous> (0:0)",
///             "button app/browser/event/page.js (5:6)",
///           ],
///           "count": 1,
///           "title": "Console Error",
///         }
///         "#,
///     ))
///     .await;
/// if outcome.should_abort() {
///     // report the diff and skip the remaining steps of this test
/// }
/// ```
pub fn expect_redbox<D: BrowserDriver + ?Sized>(driver: &D) -> RedboxExpectation<'_, D> {
    RedboxExpectation::new(driver)
}

/// Builder for one overlay assertion.
///
/// Consumed by exactly one of the two `to_display_*` operations.
pub struct RedboxExpectation<'a, D: ?Sized> {
    driver: &'a D,
    selectors: OverlaySelectors,
    timeout: Duration,
    poll_interval: Duration,
    store: Option<(&'a SnapshotStore, SnapshotKey)>,
}

// to_* methods consume self; this matches the expect() assertion pattern.
#[allow(clippy::wrong_self_convention)]
impl<'a, D: BrowserDriver + ?Sized> RedboxExpectation<'a, D> {
    pub(crate) fn new(driver: &'a D) -> Self {
        Self {
            driver,
            selectors: OverlaySelectors::default(),
            timeout: DEFAULT_REDBOX_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            store: None,
        }
    }

    /// Sets a custom presence timeout for this assertion.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets a custom poll interval for this assertion.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Overrides the overlay DOM selectors.
    pub fn with_selectors(mut self, selectors: OverlaySelectors) -> Self {
        self.selectors = selectors;
        self
    }

    /// Configures the snapshot store used when no expected literal is
    /// supplied (record mode).
    pub fn with_store(mut self, store: &'a SnapshotStore, key: SnapshotKey) -> Self {
        self.store = Some((store, key));
        self
    }

    /// Asserts against an overlay that pops up by default.
    ///
    /// `expected = None` records the capture as the new expectation (an
    /// explicit accept-current-behavior operation); `Some(..)` must match
    /// after literal normalization. An overlay that never appears compares
    /// against `"<no redbox found>"`.
    pub async fn to_display_redbox(self, expected: Option<&str>) -> TestOutcome {
        self.run(EntryPoint::Immediate, expected).await
    }

    /// Asserts against an overlay that is collapsed behind a toast.
    ///
    /// Always attempts to open the toast first; when nothing is openable the
    /// capture compares against `"<no redbox to open>"`.
    pub async fn to_display_collapsed_redbox(self, expected: Option<&str>) -> TestOutcome {
        self.run(EntryPoint::Collapsed, expected).await
    }

    async fn run(self, entry: EntryPoint, expected: Option<&str>) -> TestOutcome {
        let accessor = OverlayAccessor::with_selectors(self.driver, self.selectors);

        let outcome = match entry {
            EntryPoint::Immediate => {
                presence::assert_visible(&accessor, self.timeout, self.poll_interval).await
            }
            EntryPoint::Collapsed => {
                presence::open_and_assert_visible(&accessor, self.timeout, self.poll_interval).await
            }
        };
        tracing::debug!(?entry, ?outcome, "presence protocol resolved");

        let record = match outcome {
            PresenceOutcome::Visible => Some(normalize(capture(&accessor).await)),
            _ => None,
        };

        match_snapshot(
            entry,
            outcome,
            record.as_ref(),
            expected,
            self.store.as_ref().map(|(store, key)| (*store, key)),
        )
    }
}

/// Runs all field extractions against a visible overlay.
///
/// Each extraction is independently fallible; a failure is carried in the
/// capture and recovered into a sentinel by the normalizer, never cancelling
/// sibling fields.
async fn capture<D: BrowserDriver + ?Sized>(accessor: &OverlayAccessor<'_, D>) -> RawCapture {
    RawCapture {
        description: accessor.description().await,
        source: accessor.source().await,
        stack: accessor.stack().await,
        count: accessor.error_count().await,
        title: accessor.title().await,
    }
}
