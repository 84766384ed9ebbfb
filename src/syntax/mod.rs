//! Lossless syntax trees for Klass source text.
//!
//! The semantic pipeline only consumes the syntax facade: rowan
//! [`SyntaxNode`]s plus the typed wrappers in [`ast`]. The reference reader
//! (`logos` lexer and a recursive-descent parser) produces those trees for
//! whole compilation units and for the small entry points macro units use.
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (logos) → Tokens with SyntaxKind
//!     ↓
//! Parser → GreenNode tree
//!     ↓
//! SyntaxNode (rowan) → CST with parent pointers
//!     ↓
//! AST layer → Typed wrappers over SyntaxNode
//!     ↓
//! HIR → Scaffold, resolution, domain model
//! ```

mod lexer;
mod parser;
mod syntax_kind;

pub mod ast;
pub mod keywords;

pub use ast::AstNode;
pub use lexer::{Token, tokenize};
pub use parser::{Parse, SyntaxError, parse, parse_members, parse_service_criteria};
pub use syntax_kind::{KlassLanguage, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};

/// Re-export rowan types for convenience
pub use rowan::{GreenNode, TextRange, TextSize};
