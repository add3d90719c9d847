//! Diagnostics for the Datalog front end
//!
//! Passes append structured diagnostics to a shared [`ErrorReport`] instead
//! of aborting; every pass runs to completion on faulty input so one run
//! surfaces as many issues as possible. The report performs no deduplication.
//!
//! Rendering goes through [`ariadne`] when source text is available, and a
//! plain one-line format otherwise.

mod render;
mod report;

pub use render::{render, SourceCache};
pub use report::{Diagnostic, DiagnosticMessage, ErrorReport, Severity};
