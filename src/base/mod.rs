//! Foundation types shared by every compiler layer.
//!
//! - [`FileId`] - identifier of a compilation unit
//! - [`TextRange`], [`TextSize`] - byte positions in a unit's text
//! - [`LineCol`], [`LineIndex`] - line/column conversion for diagnostics
//!
//! This module has NO dependencies on other klass modules.

mod file_id;
mod span;

pub use file_id::FileId;
pub use span::{LineCol, LineIndex, TextRange, TextSize};

// Re-export text-size types for convenience
pub use text_size;
