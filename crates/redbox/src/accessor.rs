// Overlay Accessor - read/extract operations against the live overlay DOM
//
// The overlay renders inside a shadow root under a custom portal element, so
// most reads go through evaluate() with a shadow-piercing query. Each read is
// a single shot: NotFound conditions surface immediately and retry/polling
// belongs to the presence protocol, never here.

use regex::Regex;
use serde_json::Value;

use crate::driver::BrowserDriver;
use crate::error::{Error, Result};
use crate::record::ErrorCount;

/// Selectors for the overlay's DOM regions.
///
/// The defaults target the Next.js dev overlay; override them for other
/// overlay implementations via
/// [`RedboxExpectation::with_selectors`](crate::RedboxExpectation::with_selectors).
#[derive(Debug, Clone)]
pub struct OverlaySelectors {
    /// Custom element hosting the overlay's shadow root.
    pub portal: String,
    /// Fully expanded overlay dialog.
    pub overlay: String,
    /// Minimized toast indicating a collapsed overlay.
    pub toast: String,
    /// Error description paragraph.
    pub description: String,
    /// Code frame with the caret-annotated excerpt.
    pub code_frame: String,
    /// One call-stack frame entry.
    pub stack_frame: String,
    /// Header badge carrying the dedup count.
    pub count_badge: String,
    /// Category label ("Console Error", ...).
    pub title_label: String,
}

impl Default for OverlaySelectors {
    fn default() -> Self {
        Self {
            portal: "nextjs-portal".to_string(),
            overlay: "[data-nextjs-dialog-overlay]".to_string(),
            toast: "[data-nextjs-toast]".to_string(),
            description: "#nextjs__container_errors_desc".to_string(),
            code_frame: "[data-nextjs-codeframe]".to_string(),
            stack_frame: "[data-nextjs-call-stack-frame]".to_string(),
            count_badge: "[data-nextjs-dialog-header-total-count]".to_string(),
            title_label: "#nextjs__container_errors_label".to_string(),
        }
    }
}

/// Read (and one open) operations against the current page state.
///
/// Lightweight wrapper over a driver reference plus selectors; constructed
/// per assertion. All reads are side-effect free;
/// [`open_collapsed_overlay`](OverlayAccessor::open_collapsed_overlay) is the
/// only operation that mutates page state.
pub struct OverlayAccessor<'a, D: ?Sized> {
    driver: &'a D,
    selectors: OverlaySelectors,
}

impl<'a, D: BrowserDriver + ?Sized> OverlayAccessor<'a, D> {
    pub fn new(driver: &'a D) -> Self {
        Self::with_selectors(driver, OverlaySelectors::default())
    }

    pub fn with_selectors(driver: &'a D, selectors: OverlaySelectors) -> Self {
        Self { driver, selectors }
    }

    pub fn selectors(&self) -> &OverlaySelectors {
        &self.selectors
    }

    /// Wraps a script body so `root` resolves inside the portal's shadow
    /// root, falling back to the document when no portal is mounted.
    fn scoped(&self, body: &str) -> String {
        format!(
            "(() => {{ \
             const portal = document.querySelector('{portal}'); \
             const root = portal && portal.shadowRoot ? portal.shadowRoot : document; \
             {body} }})()",
            portal = self.selectors.portal,
            body = body,
        )
    }

    /// Whether a fully expanded overlay dialog is currently rendered.
    ///
    /// A collapsed toast does not count as present.
    pub async fn overlay_is_present(&self) -> Result<bool> {
        let script = self.scoped(&format!(
            "return root.querySelector('{overlay}') !== null;",
            overlay = self.selectors.overlay,
        ));
        match self.driver.evaluate(&script).await? {
            Value::Bool(present) => Ok(present),
            other => Err(Error::EvaluationFailed(format!(
                "presence check returned non-boolean: {other}"
            ))),
        }
    }

    /// Extracts the human-readable error description.
    pub async fn description(&self) -> Result<String> {
        let element = self
            .driver
            .find_element(&self.selectors.description)
            .await?;
        let text = self.driver.get_text(&element).await?;
        Ok(text.trim().to_string())
    }

    /// Extracts the caret-annotated source excerpt.
    ///
    /// `Ok(None)` when the overlay renders no code frame (no source location
    /// is attributable to this error); errors only when the query itself
    /// fails.
    pub async fn source(&self) -> Result<Option<String>> {
        let script = self.scoped(&format!(
            "const frame = root.querySelector('{code_frame}'); \
             return frame ? frame.innerText : null;",
            code_frame = self.selectors.code_frame,
        ));
        match self.driver.evaluate(&script).await? {
            Value::Null => Ok(None),
            Value::String(text) => Ok(Some(text.trim_end().to_string())),
            other => Err(Error::EvaluationFailed(format!(
                "code frame returned unexpected payload: {other}"
            ))),
        }
    }

    /// Extracts the ordered call-stack frames.
    ///
    /// An overlay with a rendered but empty frame list yields `Ok(vec![])`;
    /// a missing overlay dialog yields `ElementNotFound`.
    pub async fn stack(&self) -> Result<Vec<String>> {
        let script = self.scoped(&format!(
            "const dialog = root.querySelector('{overlay}'); \
             if (!dialog) return null; \
             return Array.from(dialog.querySelectorAll('{stack_frame}')).map((f) => f.innerText);",
            overlay = self.selectors.overlay,
            stack_frame = self.selectors.stack_frame,
        ));
        match self.driver.evaluate(&script).await? {
            Value::Null => Err(Error::ElementNotFound(self.selectors.overlay.clone())),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(frame) => Ok(frame.trim().to_string()),
                    other => Err(Error::EvaluationFailed(format!(
                        "stack frame is not a string: {other}"
                    ))),
                })
                .collect(),
            other => Err(Error::EvaluationFailed(format!(
                "stack extraction returned unexpected payload: {other}"
            ))),
        }
    }

    /// Extracts the dedup count from the header badge.
    ///
    /// A badge with no parseable number (compile errors render none) yields
    /// `ErrorCount::Unavailable`; a missing badge region yields
    /// `ElementNotFound`.
    pub async fn error_count(&self) -> Result<ErrorCount> {
        let script = self.scoped(&format!(
            "const badge = root.querySelector('{count_badge}'); \
             return badge ? badge.innerText : null;",
            count_badge = self.selectors.count_badge,
        ));
        match self.driver.evaluate(&script).await? {
            Value::Null => Err(Error::ElementNotFound(self.selectors.count_badge.clone())),
            Value::String(text) => {
                let digits = Regex::new(r"\d+")
                    .map_err(|e| Error::EvaluationFailed(format!("count pattern: {e}")))?;
                match digits.find(&text).and_then(|m| m.as_str().parse().ok()) {
                    Some(count) => Ok(ErrorCount::Known(count)),
                    None => Ok(ErrorCount::Unavailable),
                }
            }
            other => Err(Error::EvaluationFailed(format!(
                "count badge returned unexpected payload: {other}"
            ))),
        }
    }

    /// Extracts the overlay's category label.
    ///
    /// `Ok(None)` when no title is rendered for this overlay type.
    pub async fn title(&self) -> Result<Option<String>> {
        let script = self.scoped(&format!(
            "const label = root.querySelector('{title_label}'); \
             return label ? label.innerText : null;",
            title_label = self.selectors.title_label,
        ));
        match self.driver.evaluate(&script).await? {
            Value::Null => Ok(None),
            Value::String(text) => Ok(Some(text.trim().to_string())),
            other => Err(Error::EvaluationFailed(format!(
                "title label returned unexpected payload: {other}"
            ))),
        }
    }

    /// Expands a collapsed overlay by clicking its toast.
    ///
    /// Fails with [`Error::OpenFailed`] when no openable element exists.
    /// Does not wait for the expanded overlay to appear; that is the
    /// presence protocol's job.
    pub async fn open_collapsed_overlay(&self) -> Result<()> {
        let toast = self
            .driver
            .find_element(&self.selectors.toast)
            .await
            .map_err(|e| Error::OpenFailed(format!("no collapsed overlay toast: {e}")))?;
        self.driver
            .click(&toast)
            .await
            .map_err(|e| Error::OpenFailed(format!("toast click failed: {e}")))?;
        tracing::debug!(toast = %self.selectors.toast, "clicked collapsed overlay toast");
        Ok(())
    }
}
