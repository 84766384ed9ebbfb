//! Macro inference.
//!
//! Some declarations imply others. The implied declarations are written out
//! as Klass text, parsed as a macro unit and lowered like any other source,
//! so they are checked and frozen the same way and their annotations lead
//! back to the declaration that implied them.

use crate::error::CompileError;
use crate::syntax::{parse_members, parse_service_criteria};

use super::ids::{ClassifierId, DeclId, ServiceId};
use super::input::SourceRoot;
use super::lower::{lower_members, lower_service_criteria};
use super::resolve::{SymbolTable, resolve_property_type};
use super::scaffold::{MemberRef, Scaffold};
use super::types::{CriteriaKeyword, ServiceMultiplicity, Verb};

pub const TEMPORAL_MACRO: &str = "Temporal modifier macro";
pub const SERVICE_CRITERIA_MACRO: &str = "Service criteria macro";

/// One temporal dimension and the properties it implies.
struct TemporalDimension {
    modifiers: [&'static str; 2],
    properties: [(&'static str, &'static str); 3],
}

const VALID_TIME: TemporalDimension = TemporalDimension {
    modifiers: ["validTemporal", "bitemporal"],
    properties: [
        ("valid", "valid: TemporalRange? valid private;"),
        ("validFrom", "validFrom: TemporalInstant? valid from;"),
        ("validTo", "validTo: TemporalInstant? valid to;"),
    ],
};

const SYSTEM_TIME: TemporalDimension = TemporalDimension {
    modifiers: ["systemTemporal", "bitemporal"],
    properties: [
        ("system", "system: TemporalRange? system private;"),
        ("systemFrom", "systemFrom: TemporalInstant? system from;"),
        ("systemTo", "systemTo: TemporalInstant? system to;"),
    ],
};

// ============================================================================
// TEMPORAL PROPERTIES
// ============================================================================

/// Add the `valid*` and `system*` properties implied by temporal classifier
/// modifiers. Returns the number of properties added.
pub fn infer_temporal_properties(
    sources: &mut SourceRoot,
    scaffold: &mut Scaffold,
    symbols: &SymbolTable,
) -> Result<usize, CompileError> {
    let _span = tracing::debug_span!("infer_temporal_properties").entered();

    let classifiers: Vec<ClassifierId> = scaffold.classifiers().map(|(id, _)| id).collect();
    let mut added = 0;
    for classifier in classifiers {
        for dimension in [&VALID_TIME, &SYSTEM_TIME] {
            added += infer_dimension(sources, scaffold, symbols, classifier, dimension)?;
        }
    }
    tracing::debug!(properties = added, "temporal properties inferred");
    Ok(added)
}

fn infer_dimension(
    sources: &mut SourceRoot,
    scaffold: &mut Scaffold,
    symbols: &SymbolTable,
    classifier: ClassifierId,
    dimension: &TemporalDimension,
) -> Result<usize, CompileError> {
    let matching: Vec<DeclId> = scaffold
        .classifier(classifier)
        .modifiers
        .iter()
        .filter(|m| dimension.modifiers.iter().any(|k| m.keyword == *k))
        .map(|m| m.decl)
        .collect();
    // Zero means nothing to do; more than one is a conflict left to the checks.
    let [element] = matching.as_slice() else {
        return Ok(0);
    };

    let existing: Vec<_> = scaffold
        .all_data_type_properties(classifier)
        .into_iter()
        .map(|id| scaffold.property(id).name.text.clone())
        .collect();
    let text: String = dimension
        .properties
        .iter()
        .filter(|(name, _)| !existing.iter().any(|e| e == name))
        .map(|(_, line)| format!("{line}\n"))
        .collect();
    if text.is_empty() {
        return Ok(0);
    }

    tracing::trace!(
        classifier = %scaffold.classifier(classifier).name.text,
        "expanding temporal modifier"
    );
    let parse = parse_members(&text);
    let file = sources.add_macro_unit(TEMPORAL_MACRO, text, parse, *element)?;
    let unit = sources.get(file).ok_or_else(|| CompileError::unresolved("macro unit"))?;
    let members = lower_members(unit, scaffold, classifier);
    for member in &members {
        if let MemberRef::DataType(property) = member {
            resolve_property_type(scaffold, symbols, *property)?;
        }
    }
    Ok(members.len())
}

// ============================================================================
// SERVICE CRITERIA
// ============================================================================

/// Add the `version` and `conflict` criteria implied by versioned classes.
/// Returns the number of clauses added.
pub fn infer_service_criteria(sources: &mut SourceRoot, scaffold: &mut Scaffold) -> Result<usize, CompileError> {
    let _span = tracing::debug_span!("infer_service_criteria").entered();

    let services: Vec<ServiceId> = scaffold
        .services()
        .filter(|(_, service)| is_versioned_service(scaffold, service.url))
        .map(|(id, _)| id)
        .collect();

    let mut added = 0;
    for id in services {
        for text in implied_clauses(scaffold, id) {
            tracing::trace!(clause = text, "expanding service criteria");
            let element = scaffold.service(id).decl;
            let parse = parse_service_criteria(text);
            let file = sources.add_macro_unit(SERVICE_CRITERIA_MACRO, text, parse, element)?;
            let unit = sources.get(file).ok_or_else(|| CompileError::unresolved("macro unit"))?;
            if lower_service_criteria(unit, scaffold, id) {
                added += 1;
            }
        }
    }
    tracing::debug!(clauses = added, "service criteria inferred");
    Ok(added)
}

fn is_versioned_service(scaffold: &Scaffold, url: super::ids::UrlId) -> bool {
    let url = scaffold.url(url);
    let Some(class) = scaffold
        .service_group(url.group)
        .class
        .get()
        .and_then(|r| r.resolved())
    else {
        return false;
    };
    let has_version_end = scaffold
        .classifier(class)
        .reference_properties()
        .any(|end| scaffold.reference(end).has_modifier("version"));
    let has_version_parameter = url
        .parameters()
        .into_iter()
        .any(|p| scaffold.parameter(p).name.text == "version");
    has_version_end && has_version_parameter
}

fn implied_clauses(scaffold: &Scaffold, id: ServiceId) -> Vec<&'static str> {
    let service = scaffold.service(id);
    let mut clauses = Vec::new();
    if service.verb == Verb::Get
        && service.multiplicity == ServiceMultiplicity::One
        && !service.has_criteria(CriteriaKeyword::Version)
    {
        clauses.push("version: this.system equalsEdgePoint && this.version.number == version;");
    }
    if service.verb.is_update() && !service.has_criteria(CriteriaKeyword::Conflict) {
        clauses.push("conflict: this.version.number == version;");
    }
    clauses
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::lower::lower_source_units;
    use crate::hir::resolve::{resolve_classifiers, wire_associations};
    use crate::hir::test_support::property_named;
    use crate::hir::types::PrimitiveType;

    fn analyze(text: &str) -> (SourceRoot, Scaffold, SymbolTable) {
        let mut sources = SourceRoot::new();
        sources.add_source("model.klass", text);
        let mut scaffold = Scaffold::new();
        lower_source_units(&sources, &mut scaffold, '.');
        let symbols = SymbolTable::build(&scaffold);
        resolve_classifiers(&mut scaffold, &symbols).unwrap();
        wire_associations(&mut scaffold).unwrap();
        (sources, scaffold, symbols)
    }

    #[test]
    fn test_valid_temporal_adds_three_properties() {
        let (mut sources, mut scaffold, symbols) =
            analyze("package p\nclass Question validTemporal { id: Long key; }");

        let added = infer_temporal_properties(&mut sources, &mut scaffold, &symbols).unwrap();
        assert_eq!(added, 3);

        let valid = scaffold.property(property_named(&scaffold, "Question", "valid"));
        assert_eq!(valid.primitive(), Some(PrimitiveType::TemporalRange));
        assert!(valid.has_modifier("private"));
        assert!(scaffold.decls.is_inferred(valid.decl));

        let unit = sources.get(scaffold.decls.get(valid.decl).unwrap().unit).unwrap();
        assert_eq!(unit.source_name(), TEMPORAL_MACRO);
    }

    #[test]
    fn test_bitemporal_adds_both_dimensions() {
        let (mut sources, mut scaffold, symbols) =
            analyze("package p\nclass Question bitemporal { id: Long key; }");

        assert_eq!(infer_temporal_properties(&mut sources, &mut scaffold, &symbols).unwrap(), 6);
        property_named(&scaffold, "Question", "systemTo");
    }

    #[test]
    fn test_existing_property_is_not_duplicated() {
        let (mut sources, mut scaffold, symbols) = analyze(
            "package p\n\
             class Question validTemporal { id: Long key; valid: TemporalRange? valid private; }",
        );

        assert_eq!(infer_temporal_properties(&mut sources, &mut scaffold, &symbols).unwrap(), 2);
    }

    #[test]
    fn test_versioned_services_get_criteria() {
        let (mut sources, mut scaffold, _) = analyze(
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
                     PUT { criteria: this.id == id; }\n\
                     POST { }\n\
             }",
        );

        assert_eq!(infer_service_criteria(&mut sources, &mut scaffold).unwrap(), 2);
        let (_, url) = scaffold.urls().next().unwrap();
        let get = scaffold.service(url.services[0]);
        assert!(get.has_criteria(CriteriaKeyword::Version));
        let put = scaffold.service(url.services[1]);
        assert!(put.has_criteria(CriteriaKeyword::Conflict));
        assert!(scaffold.decls.is_inferred(put.criteria[1].decl));
        assert!(scaffold.service(url.services[2]).criteria.is_empty());
    }
}
