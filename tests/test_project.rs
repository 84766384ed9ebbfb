//! Loading source trees from disk and compiling them.

use std::fs;
use std::path::Path;

use rstest::{fixture, rstest};
use tempfile::TempDir;
use walkdir::WalkDir;

use klass::KlassCompiler;
use klass::hir::codes;
use klass::project::{KLASS_EXTENSION, SourceLoader, collect_source_paths, compile_batch};

fn write(root: &Path, relative: &str, text: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

#[fixture]
fn source_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "questions/question.klass", "package q\nclass Question { id: Long key; }");
    write(
        dir.path(),
        "questions/answer.klass",
        "package q\nclass Answer { id: Long key; questionId: Long; }\n\
         association QuestionHasAnswers {\n\
             question: Question[1..1];\n\
             answers: Answer[0..*];\n\
             relationship this.id == Answer.questionId\n\
         }",
    );
    write(dir.path(), "tags.klass", "package t\nclass Tag { name: String key; }");
    write(dir.path(), ".hidden/ignored.klass", "package h\nclass Question { id: Long key; }");
    write(dir.path(), "notes.txt", "not a klass file");
    dir
}

#[rstest]
fn test_collect_matches_a_directory_walk(source_tree: TempDir) {
    let paths = collect_source_paths(source_tree.path()).unwrap();

    let mut walked: Vec<_> = WalkDir::new(source_tree.path())
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().is_some_and(|ext| ext == KLASS_EXTENSION))
        .map(|e| e.into_path())
        .collect();
    walked.sort();

    assert_eq!(paths, walked);
    assert_eq!(paths.len(), 3);
}

#[rstest]
fn test_loaded_tree_compiles(source_tree: TempDir) {
    let sources = SourceLoader::new().load_directory(source_tree.path()).unwrap();
    let names: Vec<_> = sources.iter().map(|u| u.source_name().to_string()).collect();
    assert_eq!(names, vec!["questions/answer.klass", "questions/question.klass", "tags.klass"]);

    let result = KlassCompiler::default().compile(sources).unwrap();
    assert!(result.is_success(), "{:?}", result.codes());
    let model = result.model().unwrap();
    assert_eq!(model.classifiers().len(), 3);
    assert!(model.classifier_named("Answer").unwrap().property("questionId").unwrap().is_foreign_key());
}

#[rstest]
fn test_hidden_directories_can_be_followed(source_tree: TempDir) {
    let sources = SourceLoader::new()
        .with_hidden_directories(true)
        .load_directory(source_tree.path())
        .unwrap();
    assert_eq!(sources.len(), 4);

    let result = KlassCompiler::default().compile(sources).unwrap();
    assert!(result.codes().contains(&codes::ERR_DUP_TOP));
    // The annotation names the file relative to the loaded root.
    assert!(result.records().iter().any(|r| r.file == ".hidden/ignored.klass"));
}

#[test]
fn test_missing_directory_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let err = SourceLoader::new().load_directory(dir.path().join("absent")).unwrap_err();
    assert!(matches!(err, klass::CompileError::Io { .. }));
}

#[rstest]
fn test_batch_keeps_input_order(source_tree: TempDir) {
    let loader = SourceLoader::new();
    let tree = loader.load_directory(source_tree.path()).unwrap();
    let mut broken = klass::SourceRoot::new();
    broken.add_source("broken.klass", "package b\nclass B { id: Missing key; }");

    let results = compile_batch(&KlassCompiler::default(), vec![broken, tree]);

    assert_eq!(results.len(), 2);
    let first = results[0].as_ref().unwrap();
    assert_eq!(first.codes(), vec![codes::ERR_REF_TYP]);
    assert!(results[1].as_ref().unwrap().is_success());
}
