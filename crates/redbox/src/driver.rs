// BrowserDriver - the browser-automation collaborator seam
//
// The harness never talks to a real browser directly. Everything it needs
// from the page is expressed through this four-operation trait, so any
// automation backend (a Playwright client, a CDP connection, an in-memory
// fake in tests) can drive it.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Opaque handle to an element previously located by a driver.
///
/// The harness never inspects the contents; it only hands the id back to the
/// same driver for [`get_text`](BrowserDriver::get_text) and
/// [`click`](BrowserDriver::click).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Browser operations consumed by the overlay accessor.
///
/// All operations are asynchronous and may fail with a not-found condition
/// ([`Error::ElementNotFound`](crate::Error::ElementNotFound)); the driver is
/// expected to resolve selectors against the live page at call time, not to
/// cache. Selector syntax is the driver's own; the default overlay selectors
/// are plain CSS.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Locates an element on the current page.
    async fn find_element(&self, selector: &str) -> Result<ElementId>;

    /// Returns the rendered text of a previously located element.
    async fn get_text(&self, element: &ElementId) -> Result<String>;

    /// Clicks a previously located element, mutating visible page state.
    async fn click(&self, element: &ElementId) -> Result<()>;

    /// Evaluates a script in the page and returns its JSON-converted result.
    async fn evaluate(&self, script: &str) -> Result<Value>;
}
