use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::error::CompileError;
use crate::hir::input::SourceRoot;

pub const KLASS_EXTENSION: &str = "klass";

/// Loads `.klass` files into a [`SourceRoot`].
///
/// Units are registered in sorted path order so that unit ordinals, and
/// with them annotation order, do not depend on directory iteration order.
#[derive(Clone, Debug, Default)]
pub struct SourceLoader {
    follow_hidden: bool,
}

impl SourceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also descend into directories whose name starts with `.`.
    pub fn with_hidden_directories(mut self, follow: bool) -> Self {
        self.follow_hidden = follow;
        self
    }

    /// Load every `.klass` file under `dir`. Source names are paths
    /// relative to `dir`, joined with `/`.
    pub fn load_directory(&self, dir: impl AsRef<Path>) -> Result<SourceRoot, CompileError> {
        let dir = dir.as_ref();
        let _span = tracing::debug_span!("load_directory", dir = %dir.display()).entered();

        let paths = self.collect(dir)?;
        // Read in parallel, register in path order.
        let texts = paths
            .par_iter()
            .map(|path| read_source(path))
            .collect::<Result<Vec<_>, _>>()?;

        let mut sources = SourceRoot::new();
        for (path, text) in paths.iter().zip(texts) {
            sources.add_source(source_name(dir, path), text);
        }
        tracing::debug!(units = sources.len(), "sources loaded");
        Ok(sources)
    }

    /// Load a single file into `sources`, named by its file name.
    pub fn load_file(&self, path: impl AsRef<Path>, sources: &mut SourceRoot) -> Result<(), CompileError> {
        let path = path.as_ref();
        let text = read_source(path)?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        sources.add_source(name, text);
        Ok(())
    }

    /// Sorted by file name at every level, so the walk order equals the
    /// sorted path order.
    fn collect(&self, dir: &Path) -> Result<Vec<PathBuf>, CompileError> {
        let follow_hidden = self.follow_hidden;
        let mut paths = Vec::new();
        let walk = WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0 || follow_hidden || !(entry.file_type().is_dir() && is_hidden(entry.path()))
            });
        for entry in walk {
            let entry = entry.map_err(|error| walk_error(dir, error))?;
            if entry.file_type().is_file() && is_klass_file(entry.path()) {
                paths.push(entry.into_path());
            }
        }
        tracing::trace!(files = paths.len(), "source paths collected");
        Ok(paths)
    }
}

/// Every `.klass` file under `dir`, sorted, skipping hidden directories.
pub fn collect_source_paths(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, CompileError> {
    SourceLoader::new().collect(dir.as_ref())
}

fn read_source(path: &Path) -> Result<String, CompileError> {
    tracing::trace!(path = %path.display(), "reading source");
    fs::read_to_string(path).map_err(|source| io_error(path, source))
}

fn io_error(path: &Path, source: io::Error) -> CompileError {
    CompileError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn walk_error(root: &Path, error: walkdir::Error) -> CompileError {
    let path = error.path().unwrap_or(root).to_path_buf();
    let source = error
        .into_io_error()
        .unwrap_or_else(|| io::Error::other("filesystem loop"));
    CompileError::Io { path, source }
}

fn is_klass_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == KLASS_EXTENSION)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with('.'))
}

fn source_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, relative: &str, text: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    #[test]
    fn test_load_directory_in_path_order() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "b.klass", "package p\nclass B { id: Long key; }");
        write(temp.path(), "nested/a.klass", "package p\nclass A { id: Long key; }");
        write(temp.path(), "a.klass", "package p\nclass C { id: Long key; }");
        write(temp.path(), "notes.txt", "not a source");
        write(temp.path(), ".hidden/x.klass", "package p\nclass X { }");

        let sources = SourceLoader::new().load_directory(temp.path()).unwrap();

        let names: Vec<_> = sources.iter().map(|u| u.source_name().to_string()).collect();
        assert_eq!(names, vec!["a.klass", "b.klass", "nested/a.klass"]);
    }

    #[test]
    fn test_hidden_directories_on_request() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), ".hidden/x.klass", "package p\nclass X { }");

        let sources = SourceLoader::new()
            .with_hidden_directories(true)
            .load_directory(temp.path())
            .unwrap();
        assert_eq!(sources.len(), 1);
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let temp = TempDir::new().unwrap();
        let err = SourceLoader::new()
            .load_directory(temp.path().join("missing"))
            .unwrap_err();
        assert!(matches!(err, CompileError::Io { .. }));
    }

    #[test]
    fn test_walk_order_matches_sorted_paths() {
        let temp = TempDir::new().unwrap();
        for relative in ["model.klass", "model/z.klass", "model/a/b.klass", "Model.klass", "m.klass"] {
            write(temp.path(), relative, "package p");
        }

        let paths = collect_source_paths(temp.path()).unwrap();
        let mut sorted = paths.clone();
        sorted.sort();
        assert_eq!(paths, sorted);
        assert_eq!(paths.len(), 5);
    }

    #[test]
    fn test_missing_directory_error_names_the_path() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing");
        let Err(CompileError::Io { path, .. }) = collect_source_paths(&missing) else {
            panic!("expected an io error");
        };
        assert_eq!(path, missing);
    }

    #[test]
    fn test_load_single_file() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "one.klass", "package p\nclass One { }");

        let mut sources = SourceRoot::new();
        SourceLoader::new()
            .load_file(temp.path().join("one.klass"), &mut sources)
            .unwrap();
        assert_eq!(sources.iter().next().unwrap().source_name(), "one.klass");
    }
}
