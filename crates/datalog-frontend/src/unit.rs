//! The translation unit

use crate::validator::{check_components, check_declarations, check_typing};
use datalog_ast::Program;
use datalog_components::instantiate_components;
use datalog_report::ErrorReport;
use datalog_typecheck::{TypeAnalysis, TypeEnvironmentAnalysis};
use datalog_types::TypeEnvironment;

/// One program on its way through the front end, together with its error
/// report and the analyses cached so far
pub struct TranslationUnit {
    program: Program,
    report: ErrorReport,
    type_env: Option<TypeEnvironmentAnalysis>,
    type_analysis: Option<TypeAnalysis>,
}

impl TranslationUnit {
    pub fn new(program: Program) -> Self {
        TranslationUnit {
            program,
            report: ErrorReport::new(),
            type_env: None,
            type_analysis: None,
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Mutable access to the program; drops the cached analyses
    pub fn program_mut(&mut self) -> &mut Program {
        self.invalidate();
        &mut self.program
    }

    pub fn error_report(&self) -> &ErrorReport {
        &self.report
    }

    pub fn error_report_mut(&mut self) -> &mut ErrorReport {
        &mut self.report
    }

    /// Drop cached analyses after a transformation changed the program
    pub fn invalidate(&mut self) {
        self.type_env = None;
        self.type_analysis = None;
    }

    /// The type environment built from the current program, computed on
    /// first use
    pub fn type_environment(&mut self) -> &TypeEnvironment {
        let program = &self.program;
        self.type_env
            .get_or_insert_with(|| TypeEnvironmentAnalysis::run(program))
            .type_environment()
    }

    /// The clause type analysis for the current program, computed on first
    /// use
    pub fn type_analysis(&mut self) -> &TypeAnalysis {
        let program = &self.program;
        let env = self
            .type_env
            .get_or_insert_with(|| TypeEnvironmentAnalysis::run(program))
            .type_environment();
        self.type_analysis
            .get_or_insert_with(|| TypeAnalysis::run(env, program))
    }

    /// Run the full front-end pipeline: instantiate components, build the
    /// type environment, validate, and type-check all clauses
    pub fn run(&mut self) {
        check_components(&self.program, &mut self.report);
        instantiate_components(&mut self.program, &mut self.report);
        self.invalidate();

        let program = &self.program;
        let env = self
            .type_env
            .get_or_insert_with(|| TypeEnvironmentAnalysis::run(program))
            .type_environment();
        check_declarations(program, env, &mut self.report);

        let analysis = self
            .type_analysis
            .get_or_insert_with(|| TypeAnalysis::run(env, program));
        check_typing(program, env, analysis, &mut self.report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datalog_ast::{QualifiedName, Span, TypeAttribute, TypeDecl, TypeDeclKind};

    #[test]
    fn test_analyses_are_cached_and_invalidated() {
        let mut program = Program::new();
        program.types.push(TypeDecl {
            name: QualifiedName::from("N"),
            kind: TypeDeclKind::Primitive(TypeAttribute::Signed),
            span: Span::none(),
        });

        let mut tu = TranslationUnit::new(program);
        assert!(tu.type_environment().is_type(&QualifiedName::from("N")));

        // mutation drops the cache; the rebuilt environment sees the change
        tu.program_mut().types.push(TypeDecl {
            name: QualifiedName::from("M"),
            kind: TypeDeclKind::Primitive(TypeAttribute::Symbol),
            span: Span::none(),
        });
        assert!(tu.type_environment().is_type(&QualifiedName::from("M")));
    }
}
