// src/diag.rs
use std::fmt;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};

pub use crate::frontend::span::Span;
use crate::error::TemplateError;
use crate::utils::fast::{fast_map, FastMap};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub code: String,
    /// Display name of the source unit (usually its path)
    pub file: String,
    pub span: Option<Span>,
    pub message: String,
    pub severity: Severity,
}

/// Collects diagnostics for the caller to render; never prints by itself.
#[derive(Default, Clone, Debug)]
pub struct DiagSink {
    buf: Vec<Diagnostic>,
}

impl DiagSink {
    #[inline]
    pub fn new() -> Self { Self { buf: Vec::new() } }

    fn push<S: Into<String>>(&mut self, severity: Severity, code: &str, file: &str, span: Option<Span>, msg: S) {
        self.buf.push(Diagnostic {
            code: code.to_string(),
            file: file.to_string(),
            span,
            message: msg.into(),
            severity,
        });
    }

    pub fn error<S: Into<String>>(&mut self, code: &str, file: &str, span: Option<Span>, msg: S) {
        self.push(Severity::Error, code, file, span, msg);
    }

    pub fn warn<S: Into<String>>(&mut self, code: &str, file: &str, span: Option<Span>, msg: S) {
        self.push(Severity::Warning, code, file, span, msg);
    }

    /// Record a failed run.
    pub fn record(&mut self, file: &str, err: &TemplateError) {
        self.error(err.code(), file, err.span(), err.to_string());
    }

    #[inline] pub fn is_empty(&self) -> bool { self.buf.is_empty() }
    #[inline] pub fn len(&self) -> usize { self.buf.len() }
    #[inline] pub fn has_errors(&self) -> bool { self.buf.iter().any(|d| d.severity == Severity::Error) }
    #[inline] pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> { self.buf.iter() }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sev = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        match self.span {
            Some(sp) => write!(f, "[{} {}] {}:{}..{}: {}", sev, self.code, self.file, sp.start, sp.end, self.message),
            None => write!(f, "[{} {}] {}: {}", sev, self.code, self.file, self.message),
        }
    }
}

/// Source texts by display name, for rendering snippets.
#[derive(Default, Debug)]
pub struct SourceMap {
    files: FastMap<String, String>,
}

impl SourceMap {
    pub fn new() -> Self {
        SourceMap { files: fast_map() }
    }

    pub fn add_file(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.files.insert(name.into(), text.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.files.get(name).map(String::as_str)
    }
}

/// Print every diagnostic to stderr, with a source snippet when the file is
/// known and the diagnostic has a span.
pub fn render_diagnostics_colored(diags: &DiagSink, sm: &SourceMap, color: bool) {
    for d in diags.iter() {
        let (kind, label_color) = match d.severity {
            Severity::Error => (ReportKind::Error, Color::Red),
            Severity::Warning => (ReportKind::Warning, Color::Yellow),
        };
        let (Some(span), Some(text)) = (d.span, sm.get(&d.file)) else {
            eprintln!("{d}");
            continue;
        };
        let range = clamp(span, text.len());
        let report = Report::build(kind, (d.file.clone(), range.clone()))
            .with_code(&d.code)
            .with_message(&d.message)
            .with_label(
                Label::new((d.file.clone(), range))
                    .with_message(&d.message)
                    .with_color(label_color),
            )
            .with_config(Config::default().with_color(color))
            .finish();
        if report.eprint((d.file.clone(), Source::from(text))).is_err() {
            eprintln!("{d}");
        }
    }
}

fn clamp(span: Span, len: usize) -> std::ops::Range<usize> {
    let start = span.start.min(len);
    let end = span.end.clamp(start, len);
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_template_errors_with_code_and_span() {
        let mut sink = DiagSink::new();
        let err = TemplateError::definition("didn't find template definition in set.go", Some(Span { start: 2, end: 4 }));
        sink.record("set.go", &err);
        assert!(sink.has_errors());
        let d = sink.iter().next().unwrap();
        assert_eq!(d.code, "GT0001");
        assert_eq!(d.to_string(), "[error GT0001] set.go:2..4: didn't find template definition in set.go");
    }

    #[test]
    fn spans_are_clamped_to_the_source() {
        assert_eq!(clamp(Span { start: 3, end: 99 }, 10), 3..10);
        assert_eq!(clamp(Span { start: 20, end: 30 }, 10), 10..10);
    }
}
