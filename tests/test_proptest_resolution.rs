//! Property-based tests for resolution and annotation ordering.
//!
//! Models are generated as a set of classes whose properties use either a
//! primitive type or a name nothing declares. Every undeclared name must be
//! reported exactly once, and the output must not depend on how the classes
//! are split across units.
#![cfg(feature = "proptest")]

use proptest::prelude::*;

use klass::hir::codes;
use klass::{CompilationResult, KlassCompiler};

// ============================================================================
// PROPTEST STRATEGIES
// ============================================================================

#[derive(Clone, Debug)]
enum PropertyType {
    Primitive(&'static str),
    Undeclared(u8),
}

impl PropertyType {
    fn name(&self) -> String {
        match self {
            PropertyType::Primitive(name) => (*name).to_string(),
            PropertyType::Undeclared(n) => format!("Missing{n}"),
        }
    }
}

fn arb_property_type() -> impl Strategy<Value = PropertyType> {
    prop_oneof![
        4 => prop_oneof![Just("Long"), Just("String"), Just("Integer"), Just("Boolean")]
            .prop_map(PropertyType::Primitive),
        1 => (0u8..4).prop_map(PropertyType::Undeclared),
    ]
}

/// Property types of each class, in declaration order.
fn arb_classes() -> impl Strategy<Value = Vec<Vec<PropertyType>>> {
    prop::collection::vec(prop::collection::vec(arb_property_type(), 0..5), 1..6)
}

fn class_text(index: usize, properties: &[PropertyType]) -> String {
    let mut text = format!("class C{index}\n{{\n    id: Long key;\n");
    for (i, property) in properties.iter().enumerate() {
        text.push_str(&format!("    p{i}: {};\n", property.name()));
    }
    text.push_str("}\n");
    text
}

fn compile_split(classes: &[Vec<PropertyType>], order: &[usize]) -> CompilationResult {
    let units: Vec<(String, String)> = order
        .iter()
        .map(|&i| (format!("c{i}.klass"), format!("package p\n{}", class_text(i, &classes[i]))))
        .collect();
    KlassCompiler::default().compile_sources(units).unwrap()
}

fn compile_single(classes: &[Vec<PropertyType>]) -> CompilationResult {
    let mut text = String::from("package p\n");
    for (i, properties) in classes.iter().enumerate() {
        text.push_str(&class_text(i, properties));
    }
    KlassCompiler::default().compile_sources([("model.klass", text)]).unwrap()
}

fn undeclared_count(classes: &[Vec<PropertyType>]) -> usize {
    classes
        .iter()
        .flatten()
        .filter(|p| matches!(p, PropertyType::Undeclared(_)))
        .count()
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn every_undeclared_type_is_reported_once(classes in arb_classes()) {
        let result = compile_single(&classes);
        let reported = result.codes().iter().filter(|c| **c == codes::ERR_REF_TYP).count();

        prop_assert_eq!(reported, undeclared_count(&classes));
        prop_assert_eq!(result.is_success(), reported == 0);
        if let Some(model) = result.model() {
            prop_assert_eq!(model.classifiers().len(), classes.len());
            prop_assert_eq!(model.properties().len(), classes.iter().map(|c| c.len() + 1).sum::<usize>());
        }
    }

    #[test]
    fn annotations_are_sorted(classes in arb_classes()) {
        let result = compile_single(&classes);
        let keys: Vec<_> = result.annotations().iter().map(|a| a.sort_key()).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        prop_assert_eq!(keys, sorted);
    }

    #[test]
    fn unit_order_does_not_change_the_messages(
        (classes, order) in arb_classes().prop_flat_map(|classes| {
            let order = Just((0..classes.len()).collect::<Vec<_>>()).prop_shuffle();
            (Just(classes), order)
        })
    ) {
        let in_order: Vec<usize> = (0..classes.len()).collect();
        let first = compile_split(&classes, &in_order);
        let shuffled = compile_split(&classes, &order);

        let mut expected: Vec<_> = first.records().into_iter().map(|r| (r.file, r.line, r.message)).collect();
        let mut actual: Vec<_> = shuffled.records().into_iter().map(|r| (r.file, r.line, r.message)).collect();
        expected.sort();
        actual.sort();
        prop_assert_eq!(expected, actual);
    }

    #[test]
    fn compilation_is_deterministic(classes in arb_classes()) {
        let first = compile_single(&classes);
        let second = compile_single(&classes);
        prop_assert_eq!(first.github_annotations(), second.github_annotations());
    }
}
