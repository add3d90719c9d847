//! The error report

use datalog_ast::Span;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt;

/// Diagnostic severities
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One message of a diagnostic, optionally anchored to a source location
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticMessage {
    pub text: String,
    pub span: Option<Span>,
}

impl DiagnosticMessage {
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        DiagnosticMessage {
            text: text.into(),
            span: Some(span),
        }
    }

    pub fn unanchored(text: impl Into<String>) -> Self {
        DiagnosticMessage {
            text: text.into(),
            span: None,
        }
    }
}

impl fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.span {
            Some(span) => write!(
                f,
                "{} ({}:{}..{})",
                self.text,
                span.src(),
                span.start(),
                span.end()
            ),
            None => write!(f, "{}", self.text),
        }
    }
}

impl Serialize for DiagnosticMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("DiagnosticMessage", 4)?;
        state.serialize_field("text", &self.text)?;
        match self.span {
            Some(span) => {
                state.serialize_field("source", &span.src().to_string())?;
                state.serialize_field("start", &span.start())?;
                state.serialize_field("end", &span.end())?;
            }
            None => {
                state.serialize_field("source", &Option::<String>::None)?;
                state.serialize_field("start", &Option::<usize>::None)?;
                state.serialize_field("end", &Option::<usize>::None)?;
            }
        }
        state.end()
    }
}

/// A diagnostic: a severity, a primary message, and follow-up notes such as
/// the location of a previous conflicting definition
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: DiagnosticMessage,
    pub followups: Vec<DiagnosticMessage>,
}

impl Diagnostic {
    pub fn error(message: DiagnosticMessage) -> Self {
        Diagnostic {
            severity: Severity::Error,
            message,
            followups: Vec::new(),
        }
    }

    pub fn warning(message: DiagnosticMessage) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            message,
            followups: Vec::new(),
        }
    }

    pub fn with_followup(mut self, followup: DiagnosticMessage) -> Self {
        self.followups.push(followup);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", kind, self.message)?;
        for followup in &self.followups {
            write!(f, "\n  note: {}", followup)?;
        }
        Ok(())
    }
}

/// An append-only accumulator of diagnostics shared by all passes
#[derive(Debug, Clone, Default)]
pub struct ErrorReport {
    diagnostics: Vec<Diagnostic>,
}

impl ErrorReport {
    pub fn new() -> Self {
        ErrorReport::default()
    }

    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn add_error(&mut self, text: impl Into<String>, span: Span) {
        self.add_diagnostic(Diagnostic::error(DiagnosticMessage::new(text, span)));
    }

    pub fn add_warning(&mut self, text: impl Into<String>, span: Span) {
        self.add_diagnostic(Diagnostic::warning(DiagnosticMessage::new(text, span)));
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Diagnostics ordered by source location, for user-facing emission
    pub fn sorted(&self) -> Vec<&Diagnostic> {
        let mut sorted: Vec<&Diagnostic> = self.diagnostics.iter().collect();
        sorted.sort_by_key(|d| {
            d.message
                .span
                .map(|span| (span.src().to_string(), span.start(), span.end()))
                .unwrap_or_default()
        });
        sorted
    }
}
