// Overlay Presence Protocol - the two entry semantics for locating an
// overlay before extraction
//
// State machine:
//   assert_visible:           Unknown -(poll)-> Visible | NotFound
//   open_and_assert_visible:  Unknown -(open)-> NotOpenable
//                                     \-(ok)--(poll)-> Visible | NotOpenable
//
// All three outcomes are terminal; each selects exactly one branch in the
// match engine.

use std::time::Duration;

use crate::accessor::OverlayAccessor;
use crate::driver::BrowserDriver;
use crate::poll::poll_until;

/// Terminal result of a presence protocol run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceOutcome {
    /// The overlay is fully rendered; a real record will be captured.
    Visible,
    /// A visible overlay was required but never appeared within the budget.
    NotFound,
    /// A collapsed overlay could not be opened (no toast, or it never
    /// expanded after the click).
    NotOpenable,
}

impl PresenceOutcome {
    pub fn is_visible(self) -> bool {
        matches!(self, PresenceOutcome::Visible)
    }
}

/// Requires an overlay that is already popped up.
///
/// Polls `overlay_is_present` until it reports true or the timeout elapses.
/// Never performs the open action; a collapsed overlay hiding behind a toast
/// counts as [`PresenceOutcome::NotFound`].
pub async fn assert_visible<D: BrowserDriver + ?Sized>(
    accessor: &OverlayAccessor<'_, D>,
    timeout: Duration,
    interval: Duration,
) -> PresenceOutcome {
    let visible = poll_until(
        move || async move { accessor.overlay_is_present().await.unwrap_or(false) },
        timeout,
        interval,
    )
    .await;

    if visible {
        PresenceOutcome::Visible
    } else {
        tracing::debug!(?timeout, "overlay did not become visible");
        PresenceOutcome::NotFound
    }
}

/// Requires an overlay that is collapsed behind a toast by default.
///
/// Always attempts the open action first; if that fails there is nothing to
/// poll for and the outcome is [`PresenceOutcome::NotOpenable`] immediately.
/// A timeout after a successful click also reports `NotOpenable`: the toast
/// was there but never produced a visible overlay.
pub async fn open_and_assert_visible<D: BrowserDriver + ?Sized>(
    accessor: &OverlayAccessor<'_, D>,
    timeout: Duration,
    interval: Duration,
) -> PresenceOutcome {
    if let Err(e) = accessor.open_collapsed_overlay().await {
        tracing::debug!(error = %e, "overlay could not be opened");
        return PresenceOutcome::NotOpenable;
    }

    match assert_visible(accessor, timeout, interval).await {
        PresenceOutcome::Visible => PresenceOutcome::Visible,
        _ => PresenceOutcome::NotOpenable,
    }
}
