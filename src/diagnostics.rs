//! Diagnostics channel: an accumulating, non-unwinding error/warning stream.

use std::sync::RwLock;

use crate::source::SourceRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// The pass a diagnostic was raised from, independent of its free-text
/// message. Lets a consumer of the sink filter or group reports without
/// parsing `message`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Malformed grammar: an expected token never showed up.
    Syntax,
    /// Raised by the scanner, before any token exists.
    Lexical,
    /// An identifier or type name didn't resolve, or resolved to the wrong
    /// kind of binding, or collided with an existing one.
    NameResolution,
    /// A value's type doesn't fit where it was used.
    Type,
    /// Reserved for ownership/lifetime diagnostics; no pass raises these
    /// yet.
    Resource,
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub range: SourceRange,
    pub message: String,
}

/// Accumulates reports across a single `parse()` call. Safe for a single
/// writer (the parser) and any number of concurrent readers, per the
/// concurrency model: a background consumer may drain diagnostics while
/// the parser keeps appending. The in-memory vec is only the default sink;
/// `with_sink` installs an additional one, invoked synchronously from
/// `report` as each diagnostic is raised.
pub struct Diagnostics {
    reports: RwLock<Vec<Diagnostic>>,
    sink: Option<Box<dyn Fn(&Diagnostic) + Send + Sync>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics {
            reports: RwLock::new(Vec::new()),
            sink: None,
        }
    }

    /// Installs a sink invoked with every diagnostic in addition to the
    /// default in-memory accumulation `take_all` reads back from.
    pub fn with_sink<F>(sink: F) -> Self
    where
        F: Fn(&Diagnostic) + Send + Sync + 'static,
    {
        Diagnostics {
            reports: RwLock::new(Vec::new()),
            sink: Some(Box::new(sink)),
        }
    }

    pub fn report(&self, kind: DiagnosticKind, severity: Severity, range: SourceRange, message: String) {
        tracing::event!(
            tracing::Level::DEBUG,
            kind = ?kind,
            severity = ?severity,
            start = %range.start,
            message = %message,
            "diagnostic"
        );
        let diagnostic = Diagnostic {
            kind,
            severity,
            range,
            message,
        };
        if let Some(sink) = &self.sink {
            sink(&diagnostic);
        }
        self.reports
            .write()
            .expect("diagnostics lock poisoned")
            .push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.reports
            .read()
            .expect("diagnostics lock poisoned")
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    pub fn len(&self) -> usize {
        self.reports.read().expect("diagnostics lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshots all reports in emission order.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        self.reports.read().expect("diagnostics lock poisoned").clone()
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceId;
    use crate::source::SourceLoc;

    fn pt() -> SourceRange {
        SourceRange::point(SourceLoc::new(SourceId(0), 1, 1))
    }

    #[test]
    fn reports_accumulate_in_order() {
        let d = Diagnostics::new();
        d.report(DiagnosticKind::Syntax, Severity::Error, pt(), "first".into());
        d.report(DiagnosticKind::Syntax, Severity::Warning, pt(), "second".into());
        let all = d.take_all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].message, "first");
        assert_eq!(all[1].message, "second");
    }

    #[test]
    fn has_errors_reflects_severity() {
        let d = Diagnostics::new();
        assert!(!d.has_errors());
        d.report(DiagnosticKind::Syntax, Severity::Warning, pt(), "w".into());
        assert!(!d.has_errors());
        d.report(DiagnosticKind::Syntax, Severity::Error, pt(), "e".into());
        assert!(d.has_errors());
    }

    #[test]
    fn with_sink_receives_every_report() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let count = Arc::new(AtomicUsize::new(0));
        let counted = count.clone();
        let d = Diagnostics::with_sink(move |_diag| {
            counted.fetch_add(1, Ordering::SeqCst);
        });
        d.report(DiagnosticKind::Lexical, Severity::Error, pt(), "bad byte".into());
        d.report(DiagnosticKind::Type, Severity::Warning, pt(), "mismatch".into());
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(d.len(), 2);
    }
}
