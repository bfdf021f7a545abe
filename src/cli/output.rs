//! Handles all user-facing output of the runner.
//!
//! Writes the test log as a colored report, a test listing, or JSON. Every
//! writer is generic over `WriteColor` so tests can capture output with
//! `termcolor::NoColor`.

use std::io::{self, Write};

use termcolor::{Color, ColorSpec, WriteColor};

use crate::descriptor::UnitTestDescriptor;
use crate::log::{LogEntryKind, TestLog};

fn with_color<W: WriteColor>(
    out: &mut W,
    color: Color,
    bold: bool,
    text: &str,
) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(bold))?;
    write!(out, "{}", text)?;
    out.reset()
}

/// Prints every log entry followed by the summary and the failed test names.
pub fn write_report<W: WriteColor>(out: &mut W, log: &TestLog) -> io::Result<()> {
    for entry in log.entries() {
        match entry.kind {
            LogEntryKind::Header => {
                with_color(out, Color::Cyan, true, &entry.text)?;
                writeln!(out)?;
            }
            LogEntryKind::Message if entry.text.starts_with("FAILED") => {
                with_color(out, Color::Red, true, &entry.text)?;
                writeln!(out)?;
            }
            LogEntryKind::Message | LogEntryKind::Separator => writeln!(out, "{}", entry.text)?,
            LogEntryKind::Assertion => {
                write!(out, "  ")?;
                with_color(out, Color::Red, false, "ASSERTION")?;
                writeln!(out, ": {}", entry.text)?;
            }
        }
    }

    let summary = log.summary();
    write!(out, "\nTest summary: total {}, ", summary.ran)?;
    with_color(out, Color::Green, false, "passed")?;
    write!(out, " {}, ", summary.passed())?;
    with_color(out, Color::Red, false, "failed")?;
    writeln!(out, " {}, assertions {}", summary.failed, summary.assertions)?;

    if !log.failed_tests().is_empty() {
        writeln!(out, "\nFailed tests:")?;
        for name in log.failed_tests() {
            writeln!(out, "  - {}", name)?;
        }
    }
    Ok(())
}

/// Prints one line per test: name and tags.
pub fn write_listing<W: Write>(out: &mut W, tests: &[&UnitTestDescriptor]) -> io::Result<()> {
    for test in tests {
        writeln!(out, "{}", test.full_description())?;
    }
    writeln!(out, "{} test(s) selected", tests.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use termcolor::NoColor;

    fn render(log: &TestLog) -> String {
        let mut out = NoColor::new(Vec::new());
        write_report(&mut out, log).unwrap();
        String::from_utf8(out.into_inner()).unwrap()
    }

    #[test]
    fn report_lists_entries_summary_and_failures() {
        let mut log = TestLog::new();
        log.header("Codec [core]");
        log.record_assertion("codec.rs:12: bad padding");
        log.record_test_result("Codec", false);
        log.message("FAILED: Codec (1 assertion(s))");
        log.separator();

        let text = render(&log);
        assert!(text.contains("Codec [core]\n"));
        assert!(text.contains("  ASSERTION: codec.rs:12: bad padding\n"));
        assert!(text.contains("Test summary: total 1, passed 0, failed 1, assertions 1"));
        assert!(text.contains("Failed tests:\n  - Codec\n"));
    }

    #[test]
    fn clean_report_has_no_failure_section() {
        let mut log = TestLog::new();
        log.record_test_result("Codec", true);
        let text = render(&log);
        assert!(text.contains("passed 1, failed 0"));
        assert!(!text.contains("Failed tests"));
    }
}
