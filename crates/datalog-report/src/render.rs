//! Terminal rendering of diagnostics

use crate::report::{Diagnostic, Severity};
use ariadne::{Config, Label, Report, ReportKind, Source};
use datalog_ast::{Span, SrcId};
use std::collections::HashMap;
use std::fmt;

/// Source texts keyed by [`SrcId`], for rendering labeled snippets
#[derive(Default)]
pub struct SourceCache {
    sources: HashMap<SrcId, Source<String>>,
}

impl SourceCache {
    pub fn new() -> Self {
        SourceCache::default()
    }

    pub fn insert(&mut self, src: SrcId, text: impl Into<String>) {
        self.sources.insert(src, Source::from(text.into()));
    }
}

impl ariadne::Cache<SrcId> for &SourceCache {
    type Storage = String;

    fn fetch(&mut self, id: &SrcId) -> Result<&Source<String>, Box<dyn fmt::Debug + '_>> {
        self.sources
            .get(id)
            .ok_or_else(|| Box::new(format!("unknown source {}", id)) as Box<dyn fmt::Debug>)
    }

    fn display<'a>(&self, id: &'a SrcId) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(*id))
    }
}

/// Render one diagnostic as text.
///
/// Diagnostics carrying a span whose source is in the cache get an ariadne
/// snippet; everything else falls back to the one-line `Display` format.
pub fn render(diagnostic: &Diagnostic, cache: &SourceCache) -> String {
    let span = match diagnostic.message.span {
        Some(span) if cache.sources.contains_key(&span.src()) => span,
        _ => return format!("{}\n", diagnostic),
    };

    let kind = match diagnostic.severity {
        Severity::Error => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
    };

    let mut builder = Report::<Span>::build(kind, span.src(), span.start())
        .with_config(Config::default().with_color(false))
        .with_message(&diagnostic.message.text)
        .with_label(Label::new(span).with_message(&diagnostic.message.text));

    for followup in &diagnostic.followups {
        if let Some(followup_span) = followup.span {
            builder = builder.with_label(Label::new(followup_span).with_message(&followup.text));
        } else {
            builder = builder.with_note(&followup.text);
        }
    }

    let mut out = Vec::new();
    if builder.finish().write(cache, &mut out).is_err() {
        return format!("{}\n", diagnostic);
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::DiagnosticMessage;

    #[test]
    fn test_renders_snippet_when_source_known() {
        let src = SrcId::empty();
        let mut cache = SourceCache::new();
        cache.insert(src, ".decl r(x:S)\nr(1).\n");

        let diag = Diagnostic::error(DiagnosticMessage::new(
            "constant is not a symbol",
            Span::new(src, 15..16),
        ));
        let rendered = render(&diag, &cache);
        assert!(rendered.contains("constant is not a symbol"));
    }

    #[test]
    fn test_falls_back_without_source() {
        let diag = Diagnostic::error(DiagnosticMessage::unanchored("component limit reached"));
        let rendered = render(&diag, &SourceCache::new());
        assert!(rendered.starts_with("error: component limit reached"));
    }
}
