// Match-and-Report Engine - compares a capture against the expected literal
//
// The engine never panics and never throws on mismatch: it returns an
// explicit TestOutcome, and the test runner decides to short-circuit the
// remaining steps of the test on Fail. Subsequent assertions would run
// against a page state inconsistent with what was expected and produce
// misleading secondary failures.

use std::fmt;

use crate::presence::PresenceOutcome;
use crate::record::{NO_REDBOX_FOUND, NO_REDBOX_TO_OPEN, OverlayRecord};
use crate::store::{SnapshotDecision, SnapshotKey, SnapshotStore};

/// Which assertion operation was used, selecting the not-found literal
/// compared when no overlay could be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint {
    /// The overlay was required to be popped up already.
    Immediate,
    /// The overlay was collapsed and had to be opened first.
    Collapsed,
}

impl EntryPoint {
    fn not_found_literal(self) -> &'static str {
        match self {
            EntryPoint::Immediate => NO_REDBOX_FOUND,
            EntryPoint::Collapsed => NO_REDBOX_TO_OPEN,
        }
    }
}

/// Expected-vs-actual pair carried by a failing assertion.
///
/// Renders as a labeled line diff; the first differing line names the
/// offending record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotDiff {
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for SnapshotDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Snapshot mismatch (- expected, + actual):")?;
        let expected: Vec<&str> = self.expected.lines().collect();
        let actual: Vec<&str> = self.actual.lines().collect();
        let len = expected.len().max(actual.len());
        for i in 0..len {
            match (expected.get(i), actual.get(i)) {
                (Some(e), Some(a)) if e == a => writeln!(f, "  {e}")?,
                (Some(e), Some(a)) => {
                    writeln!(f, "- {e}")?;
                    writeln!(f, "+ {a}")?;
                }
                (Some(e), None) => writeln!(f, "- {e}")?,
                (None, Some(a)) => writeln!(f, "+ {a}")?,
                (None, None) => unreachable!(),
            }
        }
        Ok(())
    }
}

/// Result of one assertion operation, returned up the call stack.
///
/// `Fail` means: report the diff and abort the remaining assertions of this
/// test. The runner, not the matcher, performs the short-circuit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestOutcome {
    Pass,
    Fail(SnapshotDiff),
}

impl TestOutcome {
    pub fn passed(&self) -> bool {
        matches!(self, TestOutcome::Pass)
    }

    /// Whether the enclosing test should skip its remaining steps.
    pub fn should_abort(&self) -> bool {
        !self.passed()
    }
}

/// Strips the indentation a multi-line literal picks up from being embedded
/// in test source: surrounding blank lines go, and the common leading
/// whitespace of the non-empty lines is removed.
///
/// Indentation is counted and stripped in characters, not bytes: overlay
/// excerpts carry non-ASCII whitespace (NBSP in `innerText`), and slicing at
/// a byte offset could land mid-character.
fn normalize_literal(literal: &str) -> String {
    let lines: Vec<&str> = literal.lines().collect();
    let start = lines
        .iter()
        .position(|l| !l.trim().is_empty())
        .unwrap_or(lines.len());
    let end = lines
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .map_or(start, |i| i + 1);
    let lines = &lines[start..end];

    let indent = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|l| strip_indent(l, indent))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Removes up to `indent` leading whitespace characters from `line`.
fn strip_indent(line: &str, indent: usize) -> &str {
    let mut remaining = indent;
    for (i, c) in line.char_indices() {
        if remaining == 0 || !c.is_whitespace() {
            return &line[i..];
        }
        remaining -= 1;
    }
    ""
}

/// Compares the capture (or absence) against the expected literal.
///
/// - A non-visible `outcome` substitutes the entry point's fixed not-found
///   literal as the actual value, so overlay absence is snapshottable.
/// - `expected == None` records the actual value as the new expectation via
///   the store; whether a literal was *supplied*, not what it contains,
///   selects this branch. Record mode without a configured store fails
///   loudly rather than passing silently.
/// - `expected == Some(..)` is a textual comparison of the rendered actual
///   against the normalized literal.
pub fn match_snapshot(
    entry: EntryPoint,
    outcome: PresenceOutcome,
    record: Option<&OverlayRecord>,
    expected: Option<&str>,
    store: Option<(&SnapshotStore, &SnapshotKey)>,
) -> TestOutcome {
    let actual = match (outcome, record) {
        (PresenceOutcome::Visible, Some(record)) => record.to_string(),
        // The harness always captures a record for a visible overlay; a
        // missing one degrades to the absence literal instead of panicking.
        (PresenceOutcome::Visible, None) => entry.not_found_literal().to_string(),
        _ => entry.not_found_literal().to_string(),
    };

    match expected {
        Some(literal) => {
            let expected = normalize_literal(literal);
            if expected == actual {
                TestOutcome::Pass
            } else {
                tracing::debug!("snapshot literal mismatch");
                TestOutcome::Fail(SnapshotDiff { expected, actual })
            }
        }
        None => match store {
            None => TestOutcome::Fail(SnapshotDiff {
                expected: "<no snapshot store configured for record mode>".to_string(),
                actual,
            }),
            Some((store, key)) => match store.compare_or_record(key, &actual) {
                Ok(SnapshotDecision::Matched) | Ok(SnapshotDecision::Recorded) => TestOutcome::Pass,
                Ok(SnapshotDecision::Mismatch { expected }) => {
                    TestOutcome::Fail(SnapshotDiff { expected, actual })
                }
                Err(e) => TestOutcome::Fail(SnapshotDiff {
                    expected: format!("<snapshot store error: {e}>"),
                    actual,
                }),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ErrorCount;

    fn record() -> OverlayRecord {
        OverlayRecord {
            description: "boom".to_string(),
            source: Some("app/page.js (4:11) @ Page".to_string()),
            stack: vec!["Page app/page.js (4:11)".to_string()],
            count: ErrorCount::Known(1),
            title: Some("Console Error".to_string()),
        }
    }

    #[test]
    fn normalize_literal_outdents_and_trims_blank_lines() {
        let literal = "\n      {\n        \"count\": 1,\n      }\n    ";
        assert_eq!(normalize_literal(literal), "{\n  \"count\": 1,\n}");
    }

    #[test]
    fn normalize_literal_keeps_flat_text_unchanged() {
        assert_eq!(normalize_literal("<no redbox found>"), "<no redbox found>");
    }

    #[test]
    fn normalize_literal_outdents_non_ascii_whitespace_by_characters() {
        // NBSP and ideographic space are whitespace but multi-byte; the
        // common indent must be counted in characters, never byte-sliced.
        assert_eq!(normalize_literal("\u{3000}x\n y"), "x\ny");
        assert_eq!(
            normalize_literal("\u{a0}\u{a0}<no redbox found>"),
            "<no redbox found>"
        );
    }

    #[test]
    fn non_ascii_indented_literal_mismatch_fails_without_panicking() {
        let outcome = match_snapshot(
            EntryPoint::Immediate,
            PresenceOutcome::NotFound,
            None,
            Some("\u{3000}x\n y"),
            None,
        );
        let TestOutcome::Fail(diff) = outcome else {
            panic!("expected a mismatch");
        };
        assert_eq!(diff.actual, "<no redbox found>");
        assert_eq!(diff.expected, "x\ny");
    }

    #[test]
    fn equal_literal_passes() {
        let record = record();
        let literal = record.to_string();
        let outcome = match_snapshot(
            EntryPoint::Immediate,
            PresenceOutcome::Visible,
            Some(&record),
            Some(&literal),
            None,
        );
        assert_eq!(outcome, TestOutcome::Pass);
    }

    #[test]
    fn single_field_difference_fails_naming_the_field() {
        let record = record();
        let expected = OverlayRecord {
            count: ErrorCount::Known(2),
            ..record.clone()
        };
        let literal = expected.to_string();
        let outcome = match_snapshot(
            EntryPoint::Immediate,
            PresenceOutcome::Visible,
            Some(&record),
            Some(&literal),
            None,
        );
        let TestOutcome::Fail(diff) = outcome else {
            panic!("expected a mismatch");
        };
        let rendered = diff.to_string();
        assert!(rendered.contains("- "));
        assert!(rendered.contains("\"count\": 2,"));
        assert!(rendered.contains("\"count\": 1,"));
        // Matching fields show up as context, not as +/- lines.
        assert!(rendered.contains("  \"description\": \"boom\","));
    }

    #[test]
    fn extra_stack_frame_in_expected_fails() {
        let record = record();
        let mut expected = record.clone();
        expected.stack.push("extra <anonymous> (0:0)".to_string());
        let literal = expected.to_string();
        let outcome = match_snapshot(
            EntryPoint::Immediate,
            PresenceOutcome::Visible,
            Some(&record),
            Some(&literal),
            None,
        );
        let TestOutcome::Fail(diff) = outcome else {
            panic!("expected a mismatch");
        };
        assert!(diff.to_string().contains("extra <anonymous> (0:0)"));
    }

    #[test]
    fn absence_compares_against_entry_point_literal() {
        assert_eq!(
            match_snapshot(
                EntryPoint::Immediate,
                PresenceOutcome::NotFound,
                None,
                Some("<no redbox found>"),
                None,
            ),
            TestOutcome::Pass
        );
        assert_eq!(
            match_snapshot(
                EntryPoint::Collapsed,
                PresenceOutcome::NotOpenable,
                None,
                Some("<no redbox to open>"),
                None,
            ),
            TestOutcome::Pass
        );
        assert!(
            match_snapshot(
                EntryPoint::Immediate,
                PresenceOutcome::NotFound,
                None,
                Some("<some other text>"),
                None,
            )
            .should_abort()
        );
    }

    #[test]
    fn empty_literal_is_a_comparison_not_a_record() {
        // Supplying Some("") must compare (and fail), never record.
        let outcome = match_snapshot(
            EntryPoint::Immediate,
            PresenceOutcome::NotFound,
            None,
            Some(""),
            None,
        );
        assert!(outcome.should_abort());
    }

    #[test]
    fn record_mode_without_store_fails_loudly() {
        let outcome = match_snapshot(
            EntryPoint::Immediate,
            PresenceOutcome::NotFound,
            None,
            None,
            None,
        );
        let TestOutcome::Fail(diff) = outcome else {
            panic!("expected a failure");
        };
        assert!(diff.expected.contains("no snapshot store"));
    }

    #[test]
    fn record_mode_records_then_matches() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(dir.path().join("snapshots.json")).unwrap();
        let key = SnapshotKey::new("tests/matcher.rs", "record_mode").unwrap();
        let record = record();

        let first = match_snapshot(
            EntryPoint::Immediate,
            PresenceOutcome::Visible,
            Some(&record),
            None,
            Some((&store, &key)),
        );
        assert_eq!(first, TestOutcome::Pass);
        assert!(store.recorded_this_run(&key));

        // Idempotent: the same capture matches the now-persisted literal.
        let second = match_snapshot(
            EntryPoint::Immediate,
            PresenceOutcome::Visible,
            Some(&record),
            None,
            Some((&store, &key)),
        );
        assert_eq!(second, TestOutcome::Pass);

        // A diverging capture for the same key is a mismatch, not a
        // re-record.
        let diverged = OverlayRecord {
            description: "different".to_string(),
            ..record
        };
        let third = match_snapshot(
            EntryPoint::Immediate,
            PresenceOutcome::Visible,
            Some(&diverged),
            None,
            Some((&store, &key)),
        );
        assert!(third.should_abort());
    }
}
