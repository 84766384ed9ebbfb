//! The compiler driver.
//!
//! [`KlassCompiler`] runs the analysis phases over a [`SourceRoot`] and, if
//! no error was reported, freezes the result into a [`DomainModel`]. User
//! errors come back as annotations; only pipeline faults are `Err`.

use std::sync::Arc;

use crate::config::CompilerOptions;
use crate::error::CompileError;
use crate::hir::diagnostics::{AnnotationRecord, AnnotationStyle, CompilerAnnotation, Reporter};
use crate::hir::infer::{infer_service_criteria, infer_temporal_properties};
use crate::hir::input::SourceRoot;
use crate::hir::lower::lower_source_units;
use crate::hir::model::DomainModel;
use crate::hir::resolve::{SymbolTable, resolve_classifiers, resolve_member_paths, wire_associations};
use crate::hir::scaffold::Scaffold;
use crate::hir::{build, check};

/// Everything analysis produced, before freezing.
#[derive(Debug)]
pub struct Analysis {
    pub scaffold: Scaffold,
    pub symbols: SymbolTable,
    pub reporter: Reporter,
    /// False if any unit failed to parse; nothing after the parse check ran.
    pub syntax_ok: bool,
}

/// Compiles Klass sources into a domain model.
#[derive(Clone, Debug, Default)]
pub struct KlassCompiler {
    options: CompilerOptions,
}

impl KlassCompiler {
    pub fn new(options: CompilerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Compile `(source name, text)` pairs.
    pub fn compile_sources<I, N, T>(&self, units: I) -> Result<CompilationResult, CompileError>
    where
        I: IntoIterator<Item = (N, T)>,
        N: Into<Arc<str>>,
        T: Into<Arc<str>>,
    {
        let mut sources = SourceRoot::new();
        for (name, text) in units {
            sources.add_source(name, text);
        }
        self.compile(sources)
    }

    /// Run every phase. The model is present only if no error was reported.
    pub fn compile(&self, mut sources: SourceRoot) -> Result<CompilationResult, CompileError> {
        let _span = tracing::debug_span!("compile", units = sources.len()).entered();

        let result = self.analyze(&mut sources).and_then(|analysis| {
            let model = if analysis.reporter.has_errors() {
                tracing::debug!(errors = analysis.reporter.error_count(), "skipping freeze");
                None
            } else {
                Some(build::freeze(&analysis.scaffold, &sources)?)
            };
            let annotations = analysis
                .reporter
                .finish(&sources, &analysis.scaffold.decls, &self.options);
            Ok(CompilationResult {
                model,
                annotations,
                sources,
            })
        });

        match &result {
            Ok(compiled) => tracing::debug!(
                annotations = compiled.annotations.len(),
                success = compiled.is_success(),
                "compilation finished"
            ),
            Err(error) => tracing::error!(%error, "compilation aborted"),
        }
        result
    }

    /// Phases up to and including the checks. Macro units are added to
    /// `sources` as they are expanded.
    pub fn analyze(&self, sources: &mut SourceRoot) -> Result<Analysis, CompileError> {
        let mut reporter = Reporter::new();
        let mut scaffold = Scaffold::new();

        if !parse_check(sources, &mut reporter) {
            return Ok(Analysis {
                scaffold,
                symbols: SymbolTable::new(),
                reporter,
                syntax_ok: false,
            });
        }

        {
            let _span = tracing::debug_span!("scaffold").entered();
            lower_source_units(sources, &mut scaffold, self.options.package_separator);
            tracing::debug!(declarations = scaffold.decls.len(), "scaffold built");
        }

        let symbols = {
            let _span = tracing::debug_span!("symbol_table").entered();
            let symbols = SymbolTable::build(&scaffold);
            tracing::debug!(symbols = symbols.len(), "symbol table built");
            symbols
        };

        resolve_classifiers(&mut scaffold, &symbols)?;
        wire_associations(&mut scaffold)?;

        if self.options.infer_temporal_properties {
            infer_temporal_properties(sources, &mut scaffold, &symbols)?;
        }
        if self.options.infer_service_criteria {
            infer_service_criteria(sources, &mut scaffold)?;
        }

        resolve_member_paths(&mut scaffold, &symbols, sources, &mut reporter)?;
        check::check_scaffold(&scaffold, &symbols, sources, &mut reporter);

        Ok(Analysis {
            scaffold,
            symbols,
            reporter,
            syntax_ok: true,
        })
    }
}

/// Report every syntax error. True if there were none.
fn parse_check(sources: &SourceRoot, reporter: &mut Reporter) -> bool {
    let _span = tracing::debug_span!("parse_check").entered();
    for unit in sources.source_units() {
        for error in unit.parse().errors() {
            reporter.syntax_error(unit.id(), error.message.clone(), error.range);
        }
    }
    tracing::debug!(errors = reporter.len(), "parse check complete");
    reporter.is_empty()
}

// ============================================================================
// RESULT
// ============================================================================

/// The output of one compilation.
#[derive(Debug)]
pub struct CompilationResult {
    model: Option<DomainModel>,
    annotations: Vec<CompilerAnnotation>,
    sources: SourceRoot,
}

impl CompilationResult {
    /// The frozen model, absent if any error was reported.
    pub fn model(&self) -> Option<&DomainModel> {
        self.model.as_ref()
    }

    pub fn into_model(self) -> Option<DomainModel> {
        self.model
    }

    pub fn is_success(&self) -> bool {
        self.model.is_some()
    }

    /// Every annotation, sorted.
    pub fn annotations(&self) -> &[CompilerAnnotation] {
        &self.annotations
    }

    pub fn errors(&self) -> impl Iterator<Item = &CompilerAnnotation> + '_ {
        self.annotations.iter().filter(|a| a.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &CompilerAnnotation> + '_ {
        self.annotations.iter().filter(|a| !a.is_error())
    }

    /// Codes of every annotation, in sorted order.
    pub fn codes(&self) -> Vec<&str> {
        self.annotations.iter().map(|a| &*a.code).collect()
    }

    /// Every unit compiled, macro units included.
    pub fn sources(&self) -> &SourceRoot {
        &self.sources
    }

    /// All annotations rendered with `style`, one after another.
    pub fn render(&self, style: &dyn AnnotationStyle) -> String {
        self.annotations.iter().map(|a| a.render(style)).collect()
    }

    pub fn github_annotations(&self) -> Vec<String> {
        self.annotations.iter().map(CompilerAnnotation::to_github_annotation).collect()
    }

    pub fn records(&self) -> Vec<AnnotationRecord> {
        self.annotations.iter().map(CompilerAnnotation::record).collect()
    }

    /// The annotation records as a JSON array.
    #[cfg(feature = "serde")]
    pub fn annotations_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.records())
    }
}
