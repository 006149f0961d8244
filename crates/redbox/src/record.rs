// OverlayRecord - the canonical snapshot of an error overlay
//
// A record is constructed fresh per assertion, rendered once for comparison,
// and discarded. The rendered form (see Display) is the canonical comparison
// format embedded as expected literals in test source.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Substituted into any record field whose extraction errored.
///
/// Distinct from "field present but empty": an empty call stack renders as
/// `[]`, a failed stack extraction renders as `["<empty>"]`.
pub const ABSENCE_SENTINEL: &str = "<empty>";

/// The actual value compared when a visible overlay was required but never
/// appeared.
pub const NO_REDBOX_FOUND: &str = "<no redbox found>";

/// The actual value compared when a collapsed overlay could not be opened.
pub const NO_REDBOX_TO_OPEN: &str = "<no redbox to open>";

/// How many times the same error was deduplicated into one overlay entry.
///
/// Compile errors (and other overlay states where aggregation is not
/// meaningful) carry `Unavailable`, which renders as the bare token `NaN`.
/// Equality is structural: `Unavailable == Unavailable` holds, so identical
/// compile-error snapshots match. No float is involved anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCount {
    Known(u32),
    Unavailable,
}

impl fmt::Display for ErrorCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCount::Known(n) => write!(f, "{}", n),
            ErrorCount::Unavailable => write!(f, "NaN"),
        }
    }
}

/// Canonical snapshot of an error overlay at a point in time.
///
/// Field order is fixed (description, source, stack, count, title) and the
/// rendering follows it, so comparison is deterministic regardless of the
/// order fields were extracted in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayRecord {
    /// Human-readable error summary, may include a component/source prefix.
    pub description: String,
    /// Code excerpt with a caret marking the offending column; `None` when no
    /// source location is attributable (renders as `undefined`).
    pub source: Option<String>,
    /// Ordered call-stack frames. Empty is valid and distinct from
    /// unavailable.
    pub stack: Vec<String>,
    /// Dedup count, or `Unavailable` when not meaningful for this overlay.
    pub count: ErrorCount,
    /// Category label such as "Console Error"; `None` renders as `null`.
    pub title: Option<String>,
}

impl fmt::Display for OverlayRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{{")?;
        writeln!(f, "  \"description\": \"{}\",", self.description)?;
        match &self.source {
            Some(source) => writeln!(f, "  \"source\": \"{}\",", source)?,
            None => writeln!(f, "  \"source\": undefined,")?,
        }
        if self.stack.is_empty() {
            writeln!(f, "  \"stack\": [],")?;
        } else {
            writeln!(f, "  \"stack\": [")?;
            for frame in &self.stack {
                writeln!(f, "    \"{}\",", frame)?;
            }
            writeln!(f, "  ],")?;
        }
        writeln!(f, "  \"count\": {},", self.count)?;
        match &self.title {
            Some(title) => writeln!(f, "  \"title\": \"{}\",", title)?,
            None => writeln!(f, "  \"title\": null,")?,
        }
        write!(f, "}}")
    }
}

/// Per-field extraction results as produced by the accessor, before absence
/// sentinels are substituted. Each field is independently fallible so that a
/// failure in one never cancels the others.
#[derive(Debug)]
pub struct RawCapture {
    pub description: Result<String>,
    pub source: Result<Option<String>>,
    pub stack: Result<Vec<String>>,
    pub count: Result<ErrorCount>,
    pub title: Result<Option<String>>,
}

/// Converts raw extraction results into a fully-formed [`OverlayRecord`].
///
/// Pure: no DOM or I/O access, and identical inputs always produce identical
/// records. Every errored field is recovered into its absence form; the
/// comparator downstream never sees a partial record.
pub fn normalize(raw: RawCapture) -> OverlayRecord {
    OverlayRecord {
        description: raw.description.unwrap_or_else(|e| {
            tracing::debug!(error = %e, "description extraction failed");
            ABSENCE_SENTINEL.to_string()
        }),
        source: raw.source.unwrap_or_else(|e| {
            tracing::debug!(error = %e, "source extraction failed");
            Some(ABSENCE_SENTINEL.to_string())
        }),
        stack: raw.stack.unwrap_or_else(|e| {
            tracing::debug!(error = %e, "stack extraction failed");
            vec![ABSENCE_SENTINEL.to_string()]
        }),
        count: raw.count.unwrap_or_else(|e| {
            tracing::debug!(error = %e, "count extraction failed");
            ErrorCount::Unavailable
        }),
        title: raw.title.unwrap_or_else(|e| {
            tracing::debug!(error = %e, "title extraction failed");
            Some(ABSENCE_SENTINEL.to_string())
        }),
    }
}
