//! Failure text for test reports.
//!
//! Thin, total rendering of captured failures: a one-line (or multi-line)
//! exception description and a CPython-style traceback listing. Reporting
//! consumes these as opaque strings.

use std::fmt::Write;

/// One frame of a captured call stack, innermost last.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StackFrame {
    /// Source file the frame executes in.
    pub file: String,
    /// 1-based line number.
    pub line: u32,
    /// Function or step name.
    pub function: String,
}

impl StackFrame {
    /// Creates a frame record.
    pub fn new(file: impl Into<String>, line: u32, function: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            function: function.into(),
        }
    }
}

/// Renders an exception as report text.
///
/// Returns `None` when both inputs are absent, otherwise the conventional
/// `Type: message` line, degrading to whichever side is known when only
/// one is. Total and side-effect free.
#[must_use]
pub fn format_exception(exc_type: Option<&str>, message: Option<&str>) -> Option<String> {
    match (exc_type, message) {
        (None, None) => None,
        (Some(t), None) => Some(t.to_owned()),
        (None, Some(m)) => Some(m.to_owned()),
        (Some(t), Some(m)) => Some(format!("{t}: {m}")),
    }
}

/// Renders a traceback as report text, innermost frame last.
///
/// Returns `None` for an empty trace; otherwise one
/// `  File "name", line N, in function` line per frame.
#[must_use]
pub fn format_traceback(frames: &[StackFrame]) -> Option<String> {
    if frames.is_empty() {
        return None;
    }
    let mut out = String::new();
    for frame in frames {
        writeln!(
            out,
            "  File \"{}\", line {}, in {}",
            frame.file, frame.line, frame.function
        )
        .expect("writing to a String never fails");
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exception_absent_inputs_yield_none() {
        assert_eq!(format_exception(None, None), None);
    }

    #[test]
    fn exception_partial_and_full() {
        assert_eq!(
            format_exception(Some("AssertionError"), None).as_deref(),
            Some("AssertionError")
        );
        assert_eq!(
            format_exception(Some("AssertionError"), Some("boom")).as_deref(),
            Some("AssertionError: boom")
        );
        assert_eq!(format_exception(None, Some("boom")).as_deref(), Some("boom"));
    }

    #[test]
    fn traceback_lines() {
        assert_eq!(format_traceback(&[]), None);
        let frames = [
            StackFrame::new("suite.rs", 10, "test_login"),
            StackFrame::new("steps.rs", 42, "login"),
        ];
        assert_eq!(
            format_traceback(&frames).as_deref(),
            Some("  File \"suite.rs\", line 10, in test_login\n  File \"steps.rs\", line 42, in login\n")
        );
    }
}
