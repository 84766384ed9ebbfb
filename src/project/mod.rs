//! Loading sources from disk and compiling independent source sets.
//!
//! Nothing here is needed to compile in-memory text; it exists for callers
//! that keep `.klass` files in a directory tree.

mod batch;
mod loader;

pub use batch::compile_batch;
pub use loader::{KLASS_EXTENSION, SourceLoader, collect_source_paths};
