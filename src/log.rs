//! Append-only log of a test run.
//!
//! The engine appends headers, messages and separators; the engine's assertion
//! handler appends assertion entries while a test is running. Pass/fail per test
//! is derived from [`TestLog::assertion_count`] sampled before and after the
//! test, so scoring never rescans the entries.

use serde::Serialize;

use crate::diagnostics::AssayResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogEntryKind {
    Header,
    Message,
    Separator,
    Assertion,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub kind: LogEntryKind,
    pub text: String,
}

/// Counters describing everything logged since the last [`TestLog::clear`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LogSummary {
    pub ran: usize,
    pub failed: usize,
    pub assertions: usize,
}

impl LogSummary {
    pub fn passed(&self) -> usize {
        self.ran - self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TestLog {
    entries: Vec<LogEntry>,
    summary: LogSummary,
    failed_tests: Vec<String>,
}

const SEPARATOR: &str = "----------------------------------------------------------------";

impl TestLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: LogEntryKind, text: impl Into<String>) {
        self.entries.push(LogEntry {
            kind,
            text: text.into(),
        });
    }

    pub fn header(&mut self, text: impl Into<String>) {
        self.push(LogEntryKind::Header, text);
    }

    pub fn message(&mut self, text: impl Into<String>) {
        self.push(LogEntryKind::Message, text);
    }

    pub fn separator(&mut self) {
        self.push(LogEntryKind::Separator, SEPARATOR);
    }

    pub fn record_assertion(&mut self, text: impl Into<String>) {
        self.push(LogEntryKind::Assertion, text);
        self.summary.assertions += 1;
    }

    /// Counts one executed test.
    pub fn record_test_result(&mut self, name: &str, passed: bool) {
        self.summary.ran += 1;
        if !passed {
            self.summary.failed += 1;
            self.failed_tests.push(name.to_string());
        }
    }

    /// Names of failed tests, in execution order.
    pub fn failed_tests(&self) -> &[String] {
        &self.failed_tests
    }

    /// Number of assertions recorded so far.
    pub fn assertion_count(&self) -> usize {
        self.summary.assertions
    }

    pub fn summary(&self) -> LogSummary {
        self.summary
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn assertions(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.kind == LogEntryKind::Assertion)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops all entries and resets the counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.failed_tests.clear();
        self.summary = LogSummary::default();
    }

    /// Serializes entries and summary as pretty JSON.
    pub fn to_json(&self) -> AssayResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl std::fmt::Display for TestLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for entry in &self.entries {
            match entry.kind {
                LogEntryKind::Header => writeln!(f, "=== {}", entry.text)?,
                LogEntryKind::Message | LogEntryKind::Separator => writeln!(f, "{}", entry.text)?,
                LogEntryKind::Assertion => writeln!(f, "  ASSERTION: {}", entry.text)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_preserve_order_and_kind() {
        let mut log = TestLog::new();
        log.header("ByteRangeTests");
        log.message("starting");
        log.record_assertion("ByteRange.cpp:10: out of range");
        log.separator();

        let kinds: Vec<_> = log.entries().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            [
                LogEntryKind::Header,
                LogEntryKind::Message,
                LogEntryKind::Assertion,
                LogEntryKind::Separator
            ]
        );
        assert_eq!(log.assertion_count(), 1);
        assert_eq!(log.assertions().count(), 1);
    }

    #[test]
    fn summary_counts_runs_and_failures() {
        let mut log = TestLog::new();
        log.record_test_result("first", true);
        log.record_test_result("second", false);
        log.record_test_result("third", true);

        let summary = log.summary();
        assert_eq!(summary.ran, 3);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.passed(), 2);
        assert!(summary.has_failures());
        assert_eq!(log.failed_tests(), ["second"]);
    }

    #[test]
    fn clear_resets_entries_and_counters() {
        let mut log = TestLog::new();
        log.record_assertion("boom");
        log.record_test_result("boom", false);
        log.clear();

        assert!(log.is_empty());
        assert!(log.failed_tests().is_empty());
        assert_eq!(log.summary(), LogSummary::default());
    }

    #[test]
    fn display_marks_assertions() {
        let mut log = TestLog::new();
        log.header("Hook");
        log.record_assertion("lib.rs:3: bad");
        let text = log.to_string();
        assert!(text.contains("=== Hook"));
        assert!(text.contains("  ASSERTION: lib.rs:3: bad"));
    }

    #[test]
    fn json_export_includes_summary() {
        let mut log = TestLog::new();
        log.message("hello");
        log.record_test_result("hello", true);
        let json: serde_json::Value = serde_json::from_str(&log.to_json().unwrap()).unwrap();
        assert_eq!(json["summary"]["ran"], 1);
        assert_eq!(json["entries"][0]["kind"], "message");
        assert_eq!(json["entries"][0]["text"], "hello");
    }
}
