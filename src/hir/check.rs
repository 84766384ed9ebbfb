//! Semantic checks.
//!
//! Every problem in the scaffold is reported here, after resolution is
//! complete. Each unresolved reference lives in exactly one scaffold field
//! and is reported from that field only.

use smol_str::SmolStr;
use text_size::TextRange;

use super::criteria::{Criteria, MemberReference, Scaffolded};
use super::diagnostics::{Reporter, codes};
use super::ids::{
    AssociationId, ClassifierId, DeclId, ProjectionNodeId, PropertyId, ReferenceId, ServiceGroupId,
    ServiceId, UrlId,
};
use super::input::SourceRoot;
use super::resolve::{Resolution, SymbolTable, TopLevelSymbol, inheritance_cycles, projection_parent_classifier};
use super::scaffold::{
    DataType, DataTypePropertyScaffold, MemberRef, ModifierScaffold, OrderByMemberScaffold,
    ProjectionShape, Scaffold,
};
use super::types::{ClassifierKind, Multiplicity, PrimitiveType};

/// Run every check over `scaffold`.
pub fn check_scaffold(scaffold: &Scaffold, symbols: &SymbolTable, sources: &SourceRoot, reporter: &mut Reporter) {
    let _span = tracing::debug_span!("check").entered();
    let before = reporter.len();

    let mut checker = SemanticChecker {
        scaffold,
        symbols,
        sources,
        reporter,
    };
    checker.check_top_level_names();
    checker.check_inheritance_cycles();
    for (id, _) in scaffold.classifiers() {
        checker.check_classifier(id);
    }
    for (id, _) in scaffold.properties() {
        checker.check_data_type_property(id);
    }
    for (id, _) in scaffold.references() {
        checker.check_reference(id);
    }
    for (id, _) in scaffold.associations() {
        checker.check_association(id);
    }
    checker.check_projections();
    checker.check_service_groups();

    tracing::debug!(annotations = checker.reporter.len() - before, "checks complete");
}

struct SemanticChecker<'a> {
    scaffold: &'a Scaffold,
    symbols: &'a SymbolTable,
    sources: &'a SourceRoot,
    reporter: &'a mut Reporter,
}

impl SemanticChecker<'_> {
    fn classifier_name(&self, id: ClassifierId) -> &str {
        &self.scaffold.classifier(id).name.text
    }

    fn line_of(&self, decl: DeclId) -> u32 {
        self.scaffold
            .decls
            .get(decl)
            .and_then(|header| Some(self.sources.get(header.unit)?.line_col(header.range.start())))
            .map_or(0, |position| position.line_one_indexed())
    }

    /// True if `referenced` is declared after `referrer` in the same unit.
    fn is_forward_reference(&self, referrer: DeclId, referenced: DeclId) -> bool {
        match (self.scaffold.decls.get(referrer), self.scaffold.decls.get(referenced)) {
            (Some(a), Some(b)) => a.unit == b.unit && b.range.start() > a.range.start(),
            _ => false,
        }
    }

    // ------------------------------------------------------------------------
    // Names and inheritance
    // ------------------------------------------------------------------------

    fn check_top_level_names(&mut self) {
        let duplicates: Vec<_> = self
            .symbols
            .duplicates()
            .flat_map(|(name, symbols)| symbols.iter().map(move |symbol| (name.clone(), *symbol)))
            .collect();
        for (name, symbol) in duplicates {
            let (decl, range) = self.top_level_name(symbol);
            self.reporter.error(
                codes::ERR_DUP_TOP,
                format!("Duplicate top level item name: '{name}'."),
                decl,
                vec![range],
            );
        }
    }

    fn top_level_name(&self, symbol: TopLevelSymbol) -> (DeclId, TextRange) {
        let (decl, name) = match symbol {
            TopLevelSymbol::Classifier(id) => {
                let it = self.scaffold.classifier(id);
                (it.decl, &it.name)
            }
            TopLevelSymbol::Enumeration(id) => {
                let it = self.scaffold.enumeration(id);
                (it.decl, &it.name)
            }
            TopLevelSymbol::Association(id) => {
                let it = self.scaffold.association(id);
                (it.decl, &it.name)
            }
            TopLevelSymbol::Projection(id) => {
                let it = self.scaffold.projection(id);
                (it.decl, &it.name)
            }
        };
        (decl, name.range)
    }

    fn check_inheritance_cycles(&mut self) {
        for id in inheritance_cycles(self.scaffold) {
            let classifier = self.scaffold.classifier(id);
            self.reporter.error(
                codes::ERR_INH_CYC,
                format!("Circular inheritance involving '{}'.", classifier.name.text),
                classifier.decl,
                vec![classifier.name.range],
            );
        }
    }

    fn check_classifier(&mut self, id: ClassifierId) {
        let scaffold = self.scaffold;
        let classifier = scaffold.classifier(id);
        let decl = classifier.decl;

        if let (Some(name), Some(Some(Resolution::NotFound))) = (&classifier.super_class_ref, classifier.super_class.get()) {
            self.reporter.error(
                codes::ERR_SUP_TYP,
                format!("Cannot find class '{}'.", name.text),
                decl,
                vec![name.range],
            );
        }
        self.check_interfaces(id);
        self.check_duplicate_members(id);
        self.check_keys(id);
    }

    fn check_interfaces(&mut self, id: ClassifierId) {
        let scaffold = self.scaffold;
        let classifier = scaffold.classifier(id);
        let resolutions = classifier.interfaces.get().map(Vec::as_slice).unwrap_or(&[]);
        let resolved: Vec<Option<ClassifierId>> = resolutions.iter().map(Resolution::resolved).collect();

        for (index, (name, resolution)) in classifier.interface_refs.iter().zip(resolutions).enumerate() {
            let Some(interface) = resolution.resolved() else {
                if resolution.is_not_found() {
                    self.reporter.error(
                        codes::ERR_IMP_INT,
                        format!("Cannot find interface '{}'.", name.text),
                        classifier.decl,
                        vec![name.range],
                    );
                }
                continue;
            };

            if resolved[..index].contains(&Some(interface)) {
                self.reporter.error(
                    codes::ERR_DUP_INT,
                    format!("Duplicate interface '{}'.", name.text),
                    classifier.decl,
                    vec![name.range],
                );
                continue;
            }

            let implied_by_sibling = resolved
                .iter()
                .enumerate()
                .filter(|(other, _)| *other != index)
                .filter_map(|(_, other)| *other)
                .filter(|other| *other != interface)
                .any(|other| self.scaffold.supertypes_inclusive(other).contains(&interface));
            let implied_by_super_class = classifier
                .resolved_super_class()
                .is_some_and(|super_class| self.scaffold.supertypes_inclusive(super_class).contains(&interface));
            if implied_by_sibling || implied_by_super_class {
                self.reporter.error(
                    codes::ERR_RED_INT,
                    format!("Redundant interface '{}'.", name.text),
                    classifier.decl,
                    vec![name.range],
                );
            }

            let interface_decl = self.scaffold.classifier(interface).decl;
            if self.is_forward_reference(classifier.decl, interface_decl) {
                let source_name = self
                    .scaffold
                    .decls
                    .get(classifier.decl)
                    .and_then(|header| self.sources.get(header.unit))
                    .map(|unit| unit.source_name().to_string())
                    .unwrap_or_default();
                let message = format!(
                    "Class '{}' is declared on line {} and has a forward reference to implemented interface '{}' which is declared later in the source file '{}' on line {}.",
                    classifier.name.text,
                    self.line_of(classifier.decl),
                    name.text,
                    source_name,
                    self.line_of(interface_decl),
                );
                self.reporter.error(codes::ERR_FWD_REF, message, classifier.decl, vec![name.range]);
            }
        }
    }

    fn check_duplicate_members(&mut self, id: ClassifierId) {
        let scaffold = self.scaffold;
        let members = &scaffold.classifier(id).members;
        for member in members {
            let name = self.scaffold.member_name(*member);
            let count = members
                .iter()
                .filter(|other| self.scaffold.member_name(**other).text == name.text)
                .count();
            if count > 1 {
                self.reporter.error(
                    codes::ERR_DUP_MEM,
                    format!("Duplicate member: '{}'.", name.text),
                    self.scaffold.member_decl(*member),
                    vec![name.range],
                );
            }
        }
    }

    fn check_keys(&mut self, id: ClassifierId) {
        let scaffold = self.scaffold;
        let classifier = scaffold.classifier(id);
        if classifier.kind == ClassifierKind::Interface {
            return;
        }
        let properties: Vec<_> = classifier
            .data_type_properties()
            .map(|p| (p, scaffold.property(p)))
            .collect();

        if classifier.has_modifier("transient") {
            for (_, property) in &properties {
                let ranges = modifier_ranges(&property.modifiers, &["id"]);
                if !ranges.is_empty() {
                    self.reporter.error(
                        codes::ERR_TNS_IDP,
                        format!("Transient class '{}' may not have id properties.", classifier.name.text),
                        property.decl,
                        ranges,
                    );
                }
            }
        }

        let ids: Vec<_> = properties.iter().filter(|(_, p)| p.has_modifier("id")).collect();
        let non_id_keys: Vec<_> = properties
            .iter()
            .filter(|(_, p)| p.has_modifier("key") && !p.has_modifier("id"))
            .collect();
        if ids.is_empty() || non_id_keys.is_empty() {
            return;
        }
        for (_, property) in ids {
            self.reporter.error(
                codes::ERR_KEY_IDS,
                format!(
                    "Class '{}' may have id properties or non-id key properties, but not both. Found id property: {}.",
                    classifier.name.text,
                    property_display(property)
                ),
                property.decl,
                Vec::new(),
            );
        }
        for (_, property) in non_id_keys {
            self.reporter.error(
                codes::ERR_KEY_IDS,
                format!(
                    "Class '{}' may have id properties or non-id key properties, but not both. Found non-id key property: {}.",
                    classifier.name.text,
                    property_display(property)
                ),
                property.decl,
                Vec::new(),
            );
        }
    }

    // ------------------------------------------------------------------------
    // Data-type properties
    // ------------------------------------------------------------------------

    fn check_data_type_property(&mut self, id: PropertyId) {
        let scaffold = self.scaffold;
        let property = scaffold.property(id);
        if let (Some(name), Some(DataType::Enumeration(Resolution::NotFound))) = (&property.type_ref, property.data_type.get()) {
            self.reporter.error(
                codes::ERR_REF_TYP,
                format!("Cannot find class '{}'.", name.text),
                property.decl,
                vec![name.range],
            );
        }

        for (index, validation) in property.validations.iter().enumerate() {
            if property.validations[..index].iter().any(|v| v.kind == validation.kind) {
                self.reporter.error(
                    codes::ERR_DUP_VAL,
                    format!("Duplicate validation '{}'.", validation.kind.keyword()),
                    property.decl,
                    vec![validation.range],
                );
            }
        }

        self.check_foreign_key(property);
        self.check_temporal(property);
        self.check_audit(property);
        self.check_user_id_and_version_types(property);
    }

    fn check_user_id_and_version_types(&mut self, property: &DataTypePropertyScaffold) {
        let type_range = property.type_ref.as_ref().map(|t| t.range);
        let modifier = |keyword: &str| property.modifiers.iter().find(|m| m.keyword == keyword);

        // createdBy and lastUpdatedBy have their own type check.
        if !property.has_modifier("createdBy") && !property.has_modifier("lastUpdatedBy") {
            if let Some(user_id) = modifier("userId") {
                if property.primitive() != Some(PrimitiveType::String) {
                    self.reporter.error(
                        codes::ERR_USR_DTP,
                        format!(
                            "Expected type '{}' but was '{}' for '{}' property '{}'.",
                            PrimitiveType::String,
                            property.type_name(),
                            user_id.keyword,
                            property_display(property)
                        ),
                        property.decl,
                        std::iter::once(user_id.range).chain(type_range).collect(),
                    );
                }
            }
        }

        if let Some(version) = modifier("version") {
            if !matches!(property.primitive(), Some(PrimitiveType::Integer | PrimitiveType::Long)) {
                self.reporter.error(
                    codes::ERR_VER_DTP,
                    format!(
                        "Expected types [{}, {}] but was '{}' for '{}' property '{}'.",
                        PrimitiveType::Integer,
                        PrimitiveType::Long,
                        property.type_name(),
                        version.keyword,
                        property_display(property)
                    ),
                    property.decl,
                    type_range.into_iter().chain(std::iter::once(version.range)).collect(),
                );
            }
        }
    }

    fn check_foreign_key(&mut self, property: &DataTypePropertyScaffold) {
        let owner = self.classifier_name(property.owner).to_string();
        for end_id in property.keys_matching_this_foreign_key.keys() {
            let end = self.scaffold.reference(*end_id);
            let Some(multiplicity) = end.multiplicity else {
                continue;
            };
            let end_owner = end.resolved_owner().map(|o| self.classifier_name(o).to_string()).unwrap_or_default();
            let type_range = property.type_ref.as_ref().map(|t| t.range).into_iter().collect::<Vec<_>>();

            if property.optional && multiplicity.is_required() {
                let message = format!(
                    "Association end '{end_owner}.{}' has multiplicity [{multiplicity}] so foreign key '{owner}.{}' ought to be required.",
                    end.name.text, property.name.text
                );
                self.reporter.error(codes::ERR_FOR_MUL, message.clone(), property.decl, type_range.clone());
                self.reporter.error(codes::ERR_FOR_MUL, message, end.decl, vec![end.multiplicity_range]);
            }
            if !property.optional && !multiplicity.is_required() && !property.has_modifier("key") {
                let message = format!(
                    "Association end '{end_owner}.{}' has multiplicity [{multiplicity}] so foreign key '{owner}.{}' ought to be optional.",
                    end.name.text, property.name.text
                );
                self.reporter.warning(codes::ERR_FOR_MUL, message, property.decl, type_range);
            }

            if property.has_modifier("createdBy") || property.has_modifier("lastUpdatedBy") {
                continue;
            }
            let end_final = end.has_modifier("final");
            let property_final = property.has_modifier("final");
            if end_final && !property_final {
                let message = format!(
                    "Association end '{end_owner}.{}' is final [{multiplicity}] so foreign key '{owner}.{}' ought to be final.",
                    end.name.text, property.name.text
                );
                self.reporter.error(codes::ERR_FOR_FIN, message.clone(), property.decl, Vec::new());
                let ranges = modifier_ranges(&end.modifiers, &["final"]);
                self.reporter.error(codes::ERR_FOR_FIN, message, end.decl, ranges);
            }
            if property_final && !end_final {
                let message = format!(
                    "Association end '{end_owner}.{}' is not final [{multiplicity}] but foreign key '{owner}.{}' is final. The two properties must match.",
                    end.name.text, property.name.text
                );
                let ranges = modifier_ranges(&property.modifiers, &["final"]);
                self.reporter.error(codes::ERR_FOR_FIN, message.clone(), property.decl, ranges);
                self.reporter.error(codes::ERR_FOR_FIN, message, end.decl, Vec::new());
            }
        }
    }

    fn check_temporal(&mut self, property: &DataTypePropertyScaffold) {
        let has = |keyword| property.has_modifier(keyword);
        let (valid, system, from, to) = (has("valid"), has("system"), has("from"), has("to"));
        let primitive = property.primitive();
        let type_range = || property.type_ref.as_ref().map(|t| t.range).into_iter().collect::<Vec<_>>();

        if (valid || system) && !from && !to {
            if primitive != Some(PrimitiveType::TemporalRange) {
                let mut ranges = type_range();
                ranges.extend(modifier_ranges(&property.modifiers, &["valid", "system", "version"]));
                self.reporter.error(
                    codes::ERR_TMP_RNG,
                    format!(
                        "Expected type '{}' for temporal property but found '{}'.",
                        PrimitiveType::TemporalRange,
                        property.type_name()
                    ),
                    property.decl,
                    ranges,
                );
            }
        } else if from || to {
            let temporal = modifier_ranges(&property.modifiers, &["from", "to"]);
            if !valid && !system {
                let keywords: Vec<_> = property
                    .modifiers
                    .iter()
                    .filter(|m| m.keyword == "from" || m.keyword == "to")
                    .map(|m| m.keyword.as_str())
                    .collect();
                self.reporter.error(
                    codes::ERR_TMP_SYS,
                    format!(
                        "Property '{}' with temporal modifier(s) [{}] must be marked as 'system' or 'valid'.",
                        property_display(property),
                        keywords.join(", ")
                    ),
                    property.decl,
                    temporal,
                );
            } else if primitive != Some(PrimitiveType::TemporalInstant) {
                let mut ranges = type_range();
                ranges.extend(modifier_ranges(&property.modifiers, &["valid", "system", "version", "from", "to"]));
                self.reporter.error(
                    codes::ERR_TMP_INS,
                    format!(
                        "Expected type '{}' for temporal property but found '{}'.",
                        PrimitiveType::TemporalInstant,
                        property.type_name()
                    ),
                    property.decl,
                    ranges,
                );
            } else if from && to {
                self.reporter.error(
                    codes::ERR_TMP_FTO,
                    "Property may not have both 'from' and to' modifiers.",
                    property.decl,
                    temporal,
                );
            }
        }
    }

    fn check_audit(&mut self, property: &DataTypePropertyScaffold) {
        let has = |keyword| property.has_modifier(keyword);
        let display = property_display(property);
        let first = |keywords: &[&str]| property.modifiers.iter().find(|m| keywords.iter().any(|k| m.keyword == *k));
        let type_range = property.type_ref.as_ref().map(|t| t.range);

        if has("userId") && !has("key") && !has("createdBy") && !has("lastUpdatedBy") {
            if let Some(modifier) = first(&["userId"]) {
                self.reporter.error(
                    codes::ERR_AUD_KEY,
                    format!(
                        "Expected property '{display}' with modifier '{}' to be a key, createdBy, or lastUpdatedBy.",
                        modifier.keyword
                    ),
                    property.decl,
                    vec![modifier.range],
                );
            }
        }

        if let Some(modifier) = first(&["createdBy", "lastUpdatedBy"]) {
            if property.primitive() != Some(PrimitiveType::String) {
                self.reporter.error(
                    codes::ERR_AUD_DTP,
                    format!(
                        "Expected type '{}' but was '{}' for '{}' property '{display}'.",
                        PrimitiveType::String,
                        property.type_name(),
                        modifier.keyword
                    ),
                    property.decl,
                    std::iter::once(modifier.range).chain(type_range).collect(),
                );
            } else if !has("userId") {
                self.reporter.error(
                    codes::ERR_AUD_UID,
                    format!(
                        "Expected property '{display}' with modifier '{}' to also have the userId modifier.",
                        modifier.keyword
                    ),
                    property.decl,
                    vec![modifier.range],
                );
            } else if !has("private") {
                self.reporter.error(
                    codes::ERR_AUD_PRI,
                    format!(
                        "Expected property '{display}' with modifier '{}' to also have the private modifier.",
                        modifier.keyword
                    ),
                    property.decl,
                    vec![modifier.range],
                );
            }
        }

        if let Some(modifier) = first(&["createdOn"]) {
            if property.primitive() != Some(PrimitiveType::Instant) {
                self.reporter.error(
                    codes::ERR_AUD_DTP,
                    format!(
                        "Expected type '{}' but was '{}' for '{}' property '{display}'.",
                        PrimitiveType::Instant,
                        property.type_name(),
                        modifier.keyword
                    ),
                    property.decl,
                    std::iter::once(modifier.range).chain(type_range).collect(),
                );
            } else if !has("final") {
                self.reporter.error(
                    codes::ERR_CON_FIN,
                    format!("Expected createdOn property '{display}' to be final."),
                    property.decl,
                    vec![modifier.range],
                );
            }
        }

        if has("createdBy") && has("lastUpdatedBy") {
            return;
        }
        let naming = [
            ("createdBy", "createdById", codes::WRN_CRT_NAM),
            ("lastUpdatedBy", "lastUpdatedById", codes::WRN_LUB_NAM),
        ];
        for (keyword, expected, code) in naming {
            let Some(modifier) = first(&[keyword]) else {
                continue;
            };
            if property.name.text != expected {
                self.reporter.warning(
                    code,
                    format!("Expected {keyword} property '{display}' to be named '{expected}'."),
                    property.decl,
                    vec![property.name.range, modifier.range],
                );
            }
        }
    }

    // ------------------------------------------------------------------------
    // Reference properties and associations
    // ------------------------------------------------------------------------

    fn check_reference(&mut self, id: ReferenceId) {
        let scaffold = self.scaffold;
        let reference = scaffold.reference(id);

        if let (Some(name), Some(Resolution::NotFound)) = (&reference.type_ref, reference.target.get()) {
            self.reporter.error(
                codes::ERR_REF_TYP,
                format!("Cannot find class '{}'.", name.text),
                reference.decl,
                vec![name.range],
            );
        }

        match reference.multiplicity {
            None => {
                let (lower, upper) = &reference.bounds;
                self.reporter.error(
                    codes::ERR_ASO_MUL,
                    format!(
                        "Reference property '{}: {}[{lower}..{upper}]' has invalid multiplicity. Expected one of {}.",
                        reference.name.text,
                        reference.type_name(),
                        Multiplicity::expected_list()
                    ),
                    reference.decl,
                    vec![reference.multiplicity_range],
                );
            }
            Some(multiplicity) if multiplicity.is_to_one() => {
                if let Some(range) = reference.order_by_range {
                    let owner = reference
                        .resolved_owner()
                        .map(|o| self.classifier_name(o).to_string())
                        .unwrap_or_default();
                    self.reporter.error(
                        codes::ERR_REF_ORD,
                        format!(
                            "Reference property '{owner}.{}' is to-one but has an order-by clause. Order by clauses are only valid for to-many properties.",
                            reference.name.text
                        ),
                        reference.decl,
                        vec![range],
                    );
                }
            }
            Some(_) => {}
        }

        self.check_order_by(&reference.order_by);
    }

    fn check_order_by(&mut self, order_by: &[OrderByMemberScaffold]) {
        for member in order_by {
            if let Some(path) = member.path.get() {
                self.check_member_reference(path, member.decl);
            }
        }
    }

    fn check_association(&mut self, id: AssociationId) {
        let scaffold = self.scaffold;
        let association = scaffold.association(id);
        if let Some(criteria) = association.criteria.get() {
            self.check_criteria(criteria, association.decl);
        }
    }

    fn check_criteria(&mut self, criteria: &Criteria<Scaffolded>, owner: DeclId) {
        for member in criteria.member_references() {
            self.check_member_reference(member, owner);
        }
        for variable in criteria.variables() {
            if variable.parameter.is_not_found() {
                self.reporter.error(
                    codes::ERR_VAR_REF,
                    format!("Cannot find parameter '{}'.", variable.name.text),
                    owner,
                    vec![variable.name.range],
                );
            }
        }
    }

    /// Report where a member path stopped resolving. Paths whose start is
    /// unresolved are reported at the start's declaration instead.
    fn check_member_reference(&mut self, member: &MemberReference, owner: DeclId) {
        if let Some(type_name) = &member.type_name {
            if member.classifier.is_not_found() {
                self.reporter.error(
                    codes::ERR_MEM_TYP,
                    format!("Cannot find class '{}'.", type_name.text),
                    owner,
                    vec![type_name.range],
                );
                return;
            }
        }
        let Some(failure) = member.failure else {
            return;
        };
        let Some(segment) = member.segments.get(failure.segment) else {
            return;
        };
        let code = if member.type_name.is_some() {
            codes::ERR_TYP_MEM
        } else {
            codes::ERR_THS_MEM
        };
        self.reporter.error(
            code,
            format!("Cannot find member '{}.{}'.", self.classifier_name(failure.classifier), segment.text),
            owner,
            vec![segment.range],
        );
    }

    // ------------------------------------------------------------------------
    // Projections
    // ------------------------------------------------------------------------

    fn check_projections(&mut self) {
        let scaffold = self.scaffold;
        for (_, projection) in scaffold.projections() {
            if let (Some(name), Some(Resolution::NotFound)) = (&projection.classifier_ref, projection.classifier.get()) {
                self.reporter.error(
                    codes::ERR_PRJ_TYP,
                    format!("Cannot find class '{}'.", name.text),
                    projection.decl,
                    vec![name.range],
                );
            }
            self.check_duplicate_projection_members(&projection.children);
        }
        for (id, node) in scaffold.projection_nodes() {
            self.check_duplicate_projection_members(node.children());
            self.check_projection_node(id);
        }
    }

    fn check_duplicate_projection_members(&mut self, children: &[ProjectionNodeId]) {
        for child in children {
            let node = self.scaffold.projection_node(*child);
            let count = children
                .iter()
                .filter(|other| self.scaffold.projection_node(**other).name.text == node.name.text)
                .count();
            if count > 1 {
                self.reporter.error(
                    codes::ERR_DUP_PRJ,
                    format!("Duplicate member: '{}'.", node.name.text),
                    node.decl,
                    vec![node.name.range],
                );
            }
        }
    }

    fn check_projection_node(&mut self, id: ProjectionNodeId) {
        let scaffold = self.scaffold;
        let node = scaffold.projection_node(id);
        let Some(parent) = projection_parent_classifier(self.scaffold, node.parent) else {
            return;
        };
        let member = node.member.get().copied().unwrap_or(Resolution::NotFound);

        match &node.shape {
            ProjectionShape::Leaf { .. } => {
                if !matches!(member, Resolution::Resolved(MemberRef::DataType(_))) {
                    self.reporter.error(
                        codes::ERR_PRJ_DTP,
                        format!("Cannot find member '{}.{}'.", self.classifier_name(parent), node.name.text),
                        node.decl,
                        vec![node.name.range],
                    );
                }
            }
            ProjectionShape::Nested { .. } | ProjectionShape::ProjectionRef(_) => match member {
                Resolution::Ambiguous => {
                    self.reporter.error(
                        codes::ERR_PAE_AMB,
                        format!("Not found: '{}'.", node.name.text),
                        node.decl,
                        vec![node.name.range],
                    );
                }
                Resolution::NotFound | Resolution::Resolved(MemberRef::DataType(_)) => {
                    self.reporter.error(
                        codes::ERR_PAE_NFD,
                        format!("Not found: '{}'.", node.name.text),
                        node.decl,
                        vec![node.name.range],
                    );
                }
                Resolution::Resolved(MemberRef::Reference(reference)) => {
                    if let ProjectionShape::ProjectionRef(_) = &node.shape {
                        self.check_projection_reference(id, reference);
                    }
                }
            },
        }
    }

    fn check_projection_reference(&mut self, id: ProjectionNodeId, reference: ReferenceId) {
        let scaffold = self.scaffold;
        let node = scaffold.projection_node(id);
        let ProjectionShape::ProjectionRef(name) = &node.shape else {
            return;
        };
        let decl = node.decl;
        let node_name = &node.name;
        let referenced = node.projection.get().copied().unwrap_or(Resolution::NotFound);
        let Some(projection) = referenced.resolved() else {
            if referenced.is_not_found() {
                self.reporter.error(
                    codes::ERR_PAE_NFD,
                    format!("Not found: '{}'.", name.text),
                    decl,
                    vec![name.range],
                );
            }
            return;
        };
        let (Some(target), Some(projected)) = (
            self.scaffold.reference(reference).resolved_target(),
            self.scaffold.projection(projection).classifier.get().and_then(Resolution::resolved),
        ) else {
            return;
        };
        if !self.scaffold.supertypes_inclusive(target).contains(&projected) {
            self.reporter.error(
                codes::ERR_PRR_KLS,
                format!(
                    "Type mismatch: '{}' has type '{}' but '{}' has type '{}'.",
                    node_name.text,
                    self.classifier_name(target),
                    name.text,
                    self.classifier_name(projected)
                ),
                decl,
                vec![name.range],
            );
        }
    }

    // ------------------------------------------------------------------------
    // Services
    // ------------------------------------------------------------------------

    fn check_service_groups(&mut self) {
        let groups: Vec<(ServiceGroupId, Option<ClassifierId>)> = self
            .scaffold
            .service_groups()
            .map(|(id, group)| (id, group.class.get().and_then(Resolution::resolved)))
            .collect();

        let scaffold = self.scaffold;
        for (id, class) in &groups {
            let group = scaffold.service_group(*id);
            let class_name: SmolStr = group.class_ref.as_ref().map(|n| n.text.clone()).unwrap_or_default();
            let class_range = group.class_ref.as_ref().map(|n| n.range).into_iter().collect::<Vec<_>>();

            match class {
                None if group.class.get().is_some_and(Resolution::is_not_found) => {
                    self.reporter.error(
                        codes::ERR_SRG_TYP,
                        format!("Cannot find class '{class_name}'"),
                        group.decl,
                        class_range.clone(),
                    );
                }
                Some(class) => {
                    let class_decl = self.scaffold.classifier(*class).decl;
                    if self.is_forward_reference(group.decl, class_decl) {
                        let source_name = self
                            .scaffold
                            .decls
                            .get(group.decl)
                            .and_then(|header| self.sources.get(header.unit))
                            .map(|unit| unit.source_name().to_string())
                            .unwrap_or_default();
                        let message = format!(
                            "Service group '{class_name}' is declared on line {} and has a forward reference to class '{class_name}' which is declared later in the source file '{source_name}' on line {}.",
                            self.line_of(group.decl),
                            self.line_of(class_decl),
                        );
                        self.reporter.error(codes::ERR_FWD_REF, message, group.decl, class_range.clone());
                    }
                    if groups.iter().filter(|(_, other)| *other == Some(*class)).count() > 1 {
                        let classifier = self.scaffold.classifier(*class);
                        self.reporter.error(
                            codes::ERR_DUP_SVC,
                            format!(
                                "Multiple service groups for class: '{}.{}'.",
                                classifier.package, classifier.name.text
                            ),
                            group.decl,
                            class_range.clone(),
                        );
                    }
                }
                None => {}
            }

            if group.urls.is_empty() {
                self.reporter.error(
                    codes::ERR_SER_EMP,
                    format!("Service group should declare at least one url: '{class_name}'."),
                    group.decl,
                    class_range,
                );
            }
            for (index, url) in group.urls.iter().enumerate() {
                let text = &self.scaffold.url(*url).text;
                if group.urls[..index].iter().any(|other| self.scaffold.url(*other).text == *text) {
                    self.reporter.error(
                        codes::ERR_DUP_URL,
                        format!("Duplicate URL: '{text}' in service group for class '{class_name}'."),
                        self.scaffold.url(*url).decl,
                        Vec::new(),
                    );
                }
                self.check_url(*url);
            }
        }
    }

    fn check_url(&mut self, id: UrlId) {
        let scaffold = self.scaffold;
        let url = scaffold.url(id);
        let parameters = url.parameters();
        for parameter_id in &parameters {
            let parameter = self.scaffold.parameter(*parameter_id);
            let count = parameters
                .iter()
                .filter(|other| self.scaffold.parameter(**other).name.text == parameter.name.text)
                .count();
            if count > 1 {
                self.reporter.error(
                    codes::ERR_DUP_PAR,
                    format!("Duplicate parameter: '{}'.", parameter.name.text),
                    parameter.decl,
                    vec![parameter.name.range],
                );
            }
            if let (Some(name), Some(DataType::Enumeration(Resolution::NotFound))) =
                (&parameter.type_ref, parameter.data_type.get())
            {
                self.reporter.error(
                    codes::ERR_REF_TYP,
                    format!("Cannot find class '{}'.", name.text),
                    parameter.decl,
                    vec![name.range],
                );
            }
        }
        for service in &url.services {
            self.check_service(*service);
        }
    }

    fn check_service(&mut self, id: ServiceId) {
        let scaffold = self.scaffold;
        let service = scaffold.service(id);

        for (index, clause) in service.criteria.iter().enumerate() {
            if service.criteria[..index].iter().any(|c| c.keyword == clause.keyword) {
                self.reporter.error(
                    codes::ERR_DUP_CRI,
                    format!("Duplicate service criteria: '{}'.", clause.keyword.keyword()),
                    clause.decl,
                    vec![clause.keyword_range],
                );
            }
            let allowed = service.verb.allowed_criteria();
            if !allowed.contains(&clause.keyword) {
                let allowed: Vec<_> = allowed.iter().map(|k| k.keyword()).collect();
                self.reporter.error(
                    codes::ERR_VRB_CRT,
                    format!(
                        "Criteria '{}' not allowed for verb '{}'. Must be one of [{}].",
                        clause.keyword.keyword(),
                        service.verb,
                        allowed.join(", ")
                    ),
                    clause.decl,
                    vec![clause.keyword_range],
                );
            }
            if let Some(criteria) = clause.criteria.get() {
                self.check_criteria(criteria, clause.decl);
            }
        }

        if let (Some(name), Some(Resolution::NotFound)) = (&service.projection_ref, service.projection.get()) {
            self.reporter.error(
                codes::ERR_SVC_PRJ,
                format!("Cannot find projection '{}'.", name.text),
                service.decl,
                vec![name.range],
            );
        }
        self.check_order_by(&service.order_by);
    }
}

fn modifier_ranges(modifiers: &[ModifierScaffold], keywords: &[&str]) -> Vec<TextRange> {
    modifiers
        .iter()
        .filter(|m| keywords.iter().any(|k| m.keyword == *k))
        .map(|m| m.range)
        .collect()
}

fn property_display(property: &DataTypePropertyScaffold) -> String {
    format!("{}: {}", property.name.text, property.type_name())
}

#[cfg(test)]
mod tests {
    use crate::hir::diagnostics::codes;
    use crate::hir::test_support::check_codes;

    #[test]
    fn test_clean_model_has_no_annotations() {
        let codes = check_codes(&["package p\n\
             class Question { id: Long key; title: String; }\n\
             class Answer { id: Long key; questionId: Long; }\n\
             association QuestionHasAnswers {\n\
                 question: Question[1..1];\n\
                 answers: Answer[0..*] orderBy: this.id;\n\
                 relationship this.id == Answer.questionId\n\
             }"]);
        assert!(codes.is_empty(), "{codes:?}");
    }

    #[test]
    fn test_unknown_property_type() {
        assert_eq!(check_codes(&["package p\nclass A { id: Long key; foo: Bar; }"]), vec![codes::ERR_REF_TYP]);
    }

    #[test]
    fn test_duplicate_top_level_names() {
        let codes = check_codes(&["package p\nclass A { id: Long key; }\nenumeration A { X }"]);
        assert_eq!(codes, vec![codes::ERR_DUP_TOP, codes::ERR_DUP_TOP]);
    }

    #[test]
    fn test_duplicate_members() {
        let codes = check_codes(&["package p\nclass A { id: Long key; id: String; }"]);
        assert_eq!(codes, vec![codes::ERR_DUP_MEM, codes::ERR_DUP_MEM]);
    }

    #[test]
    fn test_to_one_order_by() {
        let codes = check_codes(&["package p\n\
             class Question { id: Long key; }\n\
             class Answer { id: Long key; questionId: Long; }\n\
             association QuestionHasAnswers {\n\
                 question: Question[1..1] orderBy: this.id;\n\
                 answers: Answer[0..*];\n\
             }"]);
        assert_eq!(codes, vec![codes::ERR_REF_ORD]);
    }

    #[test]
    fn test_invalid_multiplicity() {
        let codes = check_codes(&["package p\n\
             class Question { id: Long key; }\n\
             class Answer { id: Long key; }\n\
             association QuestionHasAnswers {\n\
                 question: Question[1..1];\n\
                 answers: Answer[2..5];\n\
             }"]);
        assert_eq!(codes, vec![codes::ERR_ASO_MUL]);
    }

    #[test]
    fn test_member_paths_in_criteria() {
        let codes = check_codes(&["package p\n\
             class Question { id: Long key; }\n\
             class Answer { id: Long key; questionId: Long; }\n\
             association QuestionHasAnswers {\n\
                 question: Question[1..1];\n\
                 answers: Answer[0..*];\n\
                 relationship this.missing == Answer.questionId && this.id == Nope.id\n\
             }"]);
        assert_eq!(codes, vec![codes::ERR_THS_MEM, codes::ERR_MEM_TYP]);
    }

    #[test]
    fn test_inheritance_problems() {
        let codes = check_codes(&["package p\n\
             interface Named { name: String; }\n\
             interface Titled implements Named { title: String; }\n\
             class Book extends Missing implements Titled, Named, Unknown { id: Long key; }"]);
        assert_eq!(codes, vec![codes::ERR_SUP_TYP, codes::ERR_RED_INT, codes::ERR_IMP_INT]);
    }

    #[test]
    fn test_forward_interface_reference() {
        let codes = check_codes(&["package p\n\
             class Book implements Named { id: Long key; }\n\
             interface Named { name: String; }"]);
        assert_eq!(codes, vec![codes::ERR_FWD_REF]);
    }

    #[test]
    fn test_audit_and_temporal_properties() {
        let codes = check_codes(&["package p\n\
             class Doc {\n\
                 id: Long key;\n\
                 author: String createdBy;\n\
                 createdAt: Instant createdOn;\n\
                 since: Instant from;\n\
             }"]);
        assert_eq!(
            codes,
            vec![codes::ERR_AUD_UID, codes::WRN_CRT_NAM, codes::ERR_CON_FIN, codes::ERR_TMP_SYS]
        );
    }

    #[test]
    fn test_user_id_must_be_a_string() {
        let codes = check_codes(&["package p\n\
             class Account { id: Long key; owner: Long key userId; login: String key userId; }"]);
        assert_eq!(codes, vec![codes::ERR_USR_DTP]);
    }

    #[test]
    fn test_version_must_be_an_integer_or_long() {
        let codes = check_codes(&["package p\n\
             class A { id: Long key; rev: String version; number: Integer version; }"]);
        assert_eq!(codes, vec![codes::ERR_VER_DTP]);
    }

    #[test]
    fn test_foreign_key_optionality() {
        let codes = check_codes(&["package p\n\
             class Question { id: Long key; }\n\
             class Answer { id: Long key; questionId: Long?; }\n\
             association QuestionHasAnswers {\n\
                 question: Question[1..1];\n\
                 answers: Answer[0..*];\n\
                 relationship this.id == Answer.questionId\n\
             }"]);
        assert_eq!(codes, vec![codes::ERR_FOR_MUL, codes::ERR_FOR_MUL]);
    }

    #[test]
    fn test_service_checks() {
        let codes = check_codes(&["package p\n\
             class Question { id: Long key; }\n\
             service Question {\n\
                 /question/{id: Long[1..1]}/{id: Long[1..1]}\n\
                     POST { criteria: this.id == id; projection: Missing; }\n\
                     GET { criteria: this.id == nope; criteria: all; }\n\
             }\n\
             service Nobody { }"]);
        let mut sorted = codes.clone();
        sorted.sort_unstable();
        let mut expected = vec![
            codes::ERR_DUP_PAR,
            codes::ERR_DUP_PAR,
            codes::ERR_VRB_CRT,
            codes::ERR_SVC_PRJ,
            codes::ERR_VAR_REF,
            codes::ERR_DUP_CRI,
            codes::ERR_SRG_TYP,
            codes::ERR_SER_EMP,
        ];
        expected.sort_unstable();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn test_projection_checks() {
        let codes = check_codes(&["package p\n\
             class Question { id: Long key; title: String; }\n\
             projection QuestionProjection on Question {\n\
                 title: \"Title\",\n\
                 title: \"Again\",\n\
                 body: \"Body\",\n\
                 answers: { id: \"Id\" },\n\
             }\n\
             projection Lost on Nowhere { id: \"Id\" }"]);
        let mut sorted = codes.clone();
        sorted.sort_unstable();
        let mut expected = vec![
            codes::ERR_DUP_PRJ,
            codes::ERR_DUP_PRJ,
            codes::ERR_PRJ_DTP,
            codes::ERR_PAE_NFD,
            codes::ERR_PRJ_TYP,
        ];
        expected.sort_unstable();
        assert_eq!(sorted, expected);
    }
}
