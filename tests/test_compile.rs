//! End-to-end compilation tests.
//!
//! Each test compiles Klass text through the public driver and inspects
//! either the annotations or the frozen model.

use once_cell::sync::Lazy;
use rstest::rstest;

use klass::hir::{EndPosition, Multiplicity, PlainStyle, TopLevelElement, codes};
use klass::{CompilationResult, CompileError, CompilerOptions, KlassCompiler};

// ============================================================================
// FIXTURES
// ============================================================================

static QUESTION_ANSWER: &str = "package com.example.questions

class Question
{
    id: Long key id;
    title: String;
}

class Answer
{
    id: Long key id;
    questionId: Long private;
    body: String;
}

association QuestionHasAnswers
{
    question: Question[1..1];
    answers: Answer[0..*] owned orderBy: this.id ascending;

    relationship this.id == Answer.questionId
}
";

static TAGS: &str = "package com.example.tags

class Tag
{
    name: String key;
}

class QuestionTag
{
    questionId: Long key private;
    tagName: String key private;
}

association TagHasQuestionTags
{
    tag: Tag[1..1];
    questionTags: QuestionTag[0..*];

    relationship this.name == QuestionTag.tagName
}

association QuestionHasTags
{
    question: Question[1..1];
    tags: QuestionTag[0..*];

    relationship this.id == QuestionTag.questionId
}
";

static CLEAN: Lazy<CompilationResult> = Lazy::new(|| compile_units(&[("questions.klass", QUESTION_ANSWER), ("tags.klass", TAGS)]));

fn compile_units(units: &[(&str, &str)]) -> CompilationResult {
    KlassCompiler::new(CompilerOptions::default())
        .compile_sources(units.iter().copied())
        .expect("no fatal error")
}

fn compile(text: &str) -> CompilationResult {
    compile_units(&[("model.klass", text)])
}

// ============================================================================
// MODEL
// ============================================================================

#[test]
fn test_clean_model_has_no_annotations() {
    assert!(CLEAN.annotations().is_empty(), "{:?}", CLEAN.codes());
    assert!(CLEAN.is_success());
}

#[test]
fn test_question_answer_foreign_key() {
    let model = CLEAN.model().unwrap();
    let question = model.classifier_named("Question").unwrap();
    let answer = model.classifier_named("Answer").unwrap();

    let question_end = answer.end("question").unwrap();
    let answers_end = question.end("answers").unwrap();
    assert_eq!(question_end.target().name(), "Question");
    assert_eq!(answers_end.multiplicity(), Multiplicity::ZeroToMany);

    let foreign_key = answer.property("questionId").unwrap();
    assert!(foreign_key.is_foreign_key());
    let keys: Vec<_> = foreign_key.keys_for(question_end.id()).map(|p| p.name()).collect();
    assert_eq!(keys, vec!["id"]);
    assert_eq!(keys_owner(&foreign_key, question_end.id()), vec!["Question"]);

    let key = question.property("id").unwrap();
    let foreign_keys: Vec<_> = key.foreign_keys_for(answers_end.id()).map(|p| p.name()).collect();
    assert_eq!(foreign_keys, vec!["questionId"]);
    assert!(!answer.property("body").unwrap().is_foreign_key());
}

fn keys_owner(property: &klass::hir::PropertyView<'_>, end: klass::hir::ReferenceId) -> Vec<String> {
    property.keys_for(end).map(|k| k.owner().name().to_string()).collect()
}

#[test]
fn test_opposites_are_symmetric() {
    let model = CLEAN.model().unwrap();
    assert_eq!(model.references().len(), 6);

    for (id, _) in model.references() {
        let end = model.end_view(id);
        let opposite = end.opposite().expect("every end has an opposite");
        assert_eq!(opposite.opposite().map(|o| o.id()), Some(id));
        assert_eq!(end.owner().id(), opposite.target().id());
    }
}

#[test]
fn test_association_ends_by_position() {
    let model = CLEAN.model().unwrap();
    let association = model.association_named("QuestionHasAnswers").unwrap();

    assert_eq!(association.end(EndPosition::Source).name(), "question");
    assert_eq!(association.target().name(), "answers");
    assert!(association.criteria().is_some());
    assert!(association.target().has_modifier("owned"));
    assert!(!association.target().element().order_by.is_empty());
}

#[test]
fn test_lookup_by_simple_and_qualified_name() {
    let model = CLEAN.model().unwrap();

    let by_simple = model.lookup("QuestionTag");
    let by_qualified = model.lookup("com.example.tags.QuestionTag");
    assert!(matches!(by_simple, Some(TopLevelElement::Classifier(_))));
    assert_eq!(by_simple, by_qualified);
    assert!(matches!(model.lookup("TagHasQuestionTags"), Some(TopLevelElement::Association(_))));
    assert_eq!(model.lookup("Missing"), None);
}

#[test]
fn test_composite_keys_across_units() {
    let model = CLEAN.model().unwrap();
    let question_tag = model.classifier_named("QuestionTag").unwrap();

    let keys: Vec<_> = question_tag.key_properties().iter().map(|p| p.name()).collect();
    assert_eq!(keys, vec!["questionId", "tagName"]);
    assert!(keys.iter().all(|k| question_tag.property(k).unwrap().is_foreign_key()));
}

// ============================================================================
// ANNOTATIONS
// ============================================================================

#[rstest]
#[case::unknown_type("class A { id: Long key; b: Missing; }", codes::ERR_REF_TYP)]
#[case::unknown_reference("class A { id: Long key; b: Missing[0..1]; }", codes::ERR_REF_TYP)]
#[case::duplicate_class("class A { id: Long key; }\nclass A { id: Long key; }", codes::ERR_DUP_TOP)]
#[case::to_one_order_by(
    "class A { id: Long key; }\nclass B { id: Long key; aId: Long; }\n\
     association AB { a: A[1..1] orderBy: this.id; b: B[0..*]; relationship this.id == B.aId }",
    codes::ERR_REF_ORD
)]
#[case::unknown_member("class A { id: Long key; }\nservice A { /a GET { multiplicity: many; criteria: this.missing == 1; } }", codes::ERR_THS_MEM)]
fn test_errors_block_the_model(#[case] body: &str, #[case] expected: &str) {
    let result = compile(&format!("package p\n{body}"));

    assert!(!result.is_success());
    assert!(result.codes().contains(&expected), "{:?}", result.codes());
}

#[test]
fn test_integer_overflow_keeps_other_annotations() {
    let result = compile(
        "package p\n\
         class A { id: Long key; }\n\
         class B { id: Long key; aId: Long; }\n\
         class C { id: Long key; x: Missing; }\n\
         association AB { a: A[1..1]; b: B[0..*]; relationship this.id == 99999999999999999999 }",
    );

    assert!(!result.is_success());
    assert_eq!(result.codes(), vec![codes::ERR_REF_TYP, codes::ERR_LIT_RNG]);
    let overflow = result.errors().find(|a| &*a.code == codes::ERR_LIT_RNG).unwrap();
    assert_eq!(&*overflow.message, "Integer literal '99999999999999999999' is out of range.");
}

#[rstest]
#[case::one_unit(&[("model.klass", "package p\nclass B extends A { }\nclass A { id: Long key; }")])]
#[case::two_units(&[
    ("b.klass", "package p\nclass B extends A { }"),
    ("a.klass", "package p\nclass A { id: Long key; }"),
])]
fn test_forward_references_resolve(#[case] units: &[(&str, &str)]) {
    let result = compile_units(units);
    let model = result.model().expect("no errors");

    let b = model.classifier_named("B").unwrap();
    assert_eq!(b.super_class().map(|s| s.name()), Some("A"));
    assert_eq!(b.key_properties().len(), 1);
}

#[test]
fn test_annotation_order_is_stable() {
    let text = "package p\n\
                class A { id: Long key; b: Missing; c: Other[0..1]; }\n\
                class A { id: Long key; }\n\
                class D { id: Long key; author: String createdBy userId private; }";
    let first = compile(text);
    let second = compile(text);

    assert_eq!(first.codes(), second.codes());
    assert_eq!(first.render(&PlainStyle), second.render(&PlainStyle));

    let keys: Vec<_> = first.annotations().iter().map(|a| a.sort_key()).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
    assert!(first.errors().count() >= 3);
    assert_eq!(first.warnings().count(), 1);
}

#[test]
fn test_github_annotation_points_at_the_source() {
    let result = compile("package p\nclass A\n{\n    id: Long key;\n    b: Missing;\n}");

    assert_eq!(result.codes(), vec![codes::ERR_REF_TYP]);
    let line = &result.github_annotations()[0];
    assert!(line.starts_with("::error file=model.klass,line=5,"), "{line}");
    assert!(line.contains("title=ERR_REF_TYP::"));
}

#[test]
fn test_error_in_inferred_criteria_names_the_macro() {
    let result = compile(
        "package p\n\
         class Question { id: Long key; }\n\
         class QuestionVersion { id: Long key; number: Integer; }\n\
         association QuestionHasVersion {\n\
             question: Question[1..1];\n\
             version: QuestionVersion[1..1] owned version;\n\
         }\n\
         service Question {\n\
             /question/{id: Long[1..1]}?{version: Integer[0..1]}\n\
                 GET { multiplicity: one; criteria: this.id == id; }\n\
         }",
    );

    assert!(result.codes().contains(&codes::ERR_THS_MEM), "{:?}", result.codes());
    let annotation = result
        .errors()
        .find(|a| &*a.code == codes::ERR_THS_MEM)
        .unwrap();
    assert!(annotation.location.full_path.contains("Service criteria macro"));

    let rendered = annotation.render(&PlainStyle);
    assert!(rendered.contains("Which was generated by macro at location"));
    assert!(annotation.to_github_annotation().contains("file=model.klass,"));
    assert!(result.sources().iter().any(|unit| unit.is_macro()));
}

#[test]
fn test_syntax_errors_are_reported_per_unit() {
    let result = compile_units(&[
        ("good.klass", "package p\nclass A { id: Long key; }"),
        ("bad.klass", "package p\nclass B { id: Long key }"),
    ]);

    assert!(!result.is_success());
    assert!(result.codes().iter().all(|c| *c == codes::ERR_SYNTAX));
    assert!(result.records().iter().all(|r| r.file == "bad.klass"));
}

// ============================================================================
// FATAL ERRORS
// ============================================================================

#[test]
fn test_bare_value_criteria_is_fatal() {
    let err = KlassCompiler::default()
        .compile_sources([(
            "model.klass",
            "package p\nclass A { id: Long key; }\nservice A { /a GET { multiplicity: many; criteria: this.id; } }",
        )])
        .unwrap_err();

    assert!(matches!(err, CompileError::UnsupportedCriteria { shape: "bare value", .. }));
    assert!(err.to_string().starts_with("unsupported criteria shape `bare value` at model.klass:"));
}
