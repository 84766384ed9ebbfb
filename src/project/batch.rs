use rayon::prelude::*;

use crate::compiler::{CompilationResult, KlassCompiler};
use crate::error::CompileError;
use crate::hir::input::SourceRoot;

/// Compile independent source sets in parallel.
///
/// Each set gets its own symbol table and diagnostics; nothing is shared
/// between compilations. Results come back in input order.
pub fn compile_batch(
    compiler: &KlassCompiler,
    batches: Vec<SourceRoot>,
) -> Vec<Result<CompilationResult, CompileError>> {
    let _span = tracing::debug_span!("compile_batch", batches = batches.len()).entered();
    batches
        .into_par_iter()
        .map(|sources| compiler.compile(sources))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root(text: &str) -> SourceRoot {
        let mut sources = SourceRoot::new();
        sources.add_source("model.klass", text);
        sources
    }

    #[test]
    fn test_batches_are_independent() {
        // Both sets declare `A`; sharing a symbol table would make it ambiguous.
        let batches = vec![
            root("package p\nclass A { id: Long key; }"),
            root("package q\nclass A { id: Long key; b: Missing; }"),
            root("package r\nclass A { id: Long key; }"),
        ];

        let results = compile_batch(&KlassCompiler::default(), batches);

        let successes: Vec<_> = results.iter().map(|r| r.as_ref().unwrap().is_success()).collect();
        assert_eq!(successes, vec![true, false, true]);
    }
}
