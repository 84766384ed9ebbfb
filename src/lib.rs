//! # klass
//!
//! Compiler front end for the Klass domain-modelling language: syntax
//! trees, semantic analysis, diagnostics and a frozen domain model for code
//! generators to consume.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! compiler → KlassCompiler driver, CompilationResult
//!   ↓
//! hir      → scaffold, resolution, checks, freeze, diagnostics
//!   ↓
//! syntax   → logos lexer, parser, rowan CST + typed AST
//!   ↓
//! base     → primitives (FileId, LineIndex, TextRange)
//! ```
//!
//! `project` loads `.klass` files from disk and compiles independent source
//! sets in parallel; `config` holds the compiler options.
//!
//! ```ignore
//! use klass::{CompilerOptions, KlassCompiler};
//!
//! let result = KlassCompiler::new(CompilerOptions::default())
//!     .compile_sources([("model.klass", "package p\nclass Question { id: Long key; }")])?;
//! for annotation in result.annotations() {
//!     eprintln!("{annotation}");
//! }
//! let model = result.model().expect("no errors");
//! ```

/// Foundation types: FileId, LineIndex, TextRange
pub mod base;

/// Lossless syntax trees and the reference reader
pub mod syntax;

/// Semantic analysis and the frozen domain model
pub mod hir;

pub mod compiler;
pub mod config;
pub mod error;
pub mod project;

pub use base::{FileId, LineCol, LineIndex, TextRange, TextSize};
pub use compiler::{CompilationResult, KlassCompiler};
pub use config::CompilerOptions;
pub use error::CompileError;
pub use hir::{CompilerAnnotation, DomainModel, Severity, SourceRoot};
