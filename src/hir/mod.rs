//! # hir
//!
//! Semantic analysis of Klass compilation units.
//!
//! ```text
//! input    → compilation units and macro units
//!   ↓
//! lower    → scaffold (decl table + element arenas)
//!   ↓
//! resolve  → symbol table, classifier references, association wiring
//!   ↓
//! infer    → macro-expanded properties and service criteria
//!   ↓
//! resolve  → member paths, criteria, projections, foreign keys
//!   ↓
//! check    → annotations
//!   ↓
//! build    → frozen DomainModel (only when no errors were reported)
//! ```

// ============================================================================
// MODULES
// ============================================================================

pub mod build;
pub mod check;
pub mod criteria;
pub mod decl;
pub mod diagnostics;
pub mod foreign_keys;
pub mod ids;
pub mod infer;
pub mod input;
pub mod lower;
pub mod model;
pub mod resolve;
pub mod scaffold;
pub mod types;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use build::{ChildrenWired, Freeze, ShellBuilt, Unbuilt, freeze};
pub use check::check_scaffold;
pub use criteria::{Criteria, ExpressionValue, Frozen, LiteralValue, MemberPath, Operator, OperatorCriteria, Scaffolded};
pub use decl::{DeclHeader, DeclKind, DeclTable, WriteOnce};
pub use diagnostics::{
    AnnotationRecord, AnnotationStyle, CompilerAnnotation, ContextLine, PlainStyle, Reporter, Severity, SourceLocation,
    codes,
};
pub use ids::{
    AssociationId, ClassifierId, DeclId, EnumerationId, ParameterId, ProjectionId, ProjectionNodeId, PropertyId,
    ReferenceId, ServiceGroupId, ServiceId, UrlId,
};
pub use infer::{SERVICE_CRITERIA_MACRO, TEMPORAL_MACRO};
pub use input::{CompilationUnit, SourceRoot};
pub use model::{
    AssociationEndView, AssociationView, ClassifierView, DataType, DomainModel, PropertyView, TopLevelElement,
};
pub use resolve::{Resolution, SymbolTable};
pub use scaffold::{MemberRef, Scaffold};
pub use types::{
    ClassifierKind, CriteriaKeyword, EndPosition, InheritanceStrategy, Multiplicity, OrderByDirection, PrimitiveType,
    ServiceMultiplicity, ValidationKind, Verb,
};

// ============================================================================
// TEST SUPPORT
// ============================================================================

#[cfg(test)]
pub(crate) mod test_support {
    use crate::compiler::{Analysis, KlassCompiler};
    use crate::config::CompilerOptions;

    use super::ids::PropertyId;
    use super::input::SourceRoot;
    use super::resolve::SymbolTable;
    use super::scaffold::Scaffold;

    fn sources_of(texts: &[&str]) -> SourceRoot {
        let mut sources = SourceRoot::new();
        for (i, text) in texts.iter().enumerate() {
            let name = if texts.len() == 1 {
                "model.klass".to_string()
            } else {
                format!("model{i}.klass")
            };
            sources.add_source(name, *text);
        }
        sources
    }

    /// Run every phase up to and including the checks.
    pub fn analyze(texts: &[&str]) -> (SourceRoot, Analysis) {
        let mut sources = sources_of(texts);
        let analysis = KlassCompiler::new(CompilerOptions::default())
            .analyze(&mut sources)
            .expect("analysis should not hit a fatal error");
        assert!(analysis.syntax_ok, "test source has syntax errors: {:?}", analysis.reporter.codes());
        (sources, analysis)
    }

    pub fn scaffold_of(texts: &[&str]) -> (Scaffold, SymbolTable) {
        let (_, analysis) = analyze(texts);
        (analysis.scaffold, analysis.symbols)
    }

    pub fn scaffold_and_sources(texts: &[&str]) -> (SourceRoot, Scaffold) {
        let (sources, analysis) = analyze(texts);
        (sources, analysis.scaffold)
    }

    /// Annotation codes in the order they were reported.
    pub fn check_codes(texts: &[&str]) -> Vec<&'static str> {
        analyze(texts).1.reporter.codes()
    }

    pub fn property_named(scaffold: &Scaffold, class: &str, property: &str) -> PropertyId {
        let (id, _) = scaffold
            .classifiers()
            .find(|(_, c)| c.name.text == class)
            .unwrap_or_else(|| panic!("no classifier {class}"));
        scaffold
            .all_data_type_properties(id)
            .into_iter()
            .find(|p| scaffold.property(*p).name.text == property)
            .unwrap_or_else(|| panic!("no property {class}.{property}"))
    }
}
