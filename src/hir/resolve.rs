//! Name resolution: the symbol table and the reference resolver.
//!
//! # Architecture
//!
//! Resolution runs after every unit has been scaffolded, so forward
//! references and references across units resolve regardless of order:
//!
//! 1. **Symbol table** - every top-level name, simple and qualified
//! 2. **Classifier resolution** - supertypes, property and end types
//! 3. **Association wiring** - end owners and opposites
//! 4. **Member paths** - order-by, criteria, projections, foreign keys
//!
//! Resolution is total. The [`Resolver`] never reports anything: it returns
//! a [`Resolution`] and the checks report each failed one exactly once.

use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use crate::error::CompileError;

use super::criteria::{CriteriaContext, MemberReference, PathFailure, lower_criteria};
use super::diagnostics::Reporter;
use super::foreign_keys::derive_foreign_keys;
use super::ids::{
    AssociationId, ClassifierId, EnumerationId, ParameterId, ProjectionId, PropertyId, UrlId,
};
use super::input::SourceRoot;
use super::scaffold::{
    DataType, MemberRef, NameRef, OrderByMemberScaffold, ProjectionParent, ProjectionShape,
    Scaffold,
};
use super::types::{ClassifierKind, EndPosition, PrimitiveType};

// ============================================================================
// RESOLUTION RESULT
// ============================================================================

/// Result of resolving a reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resolution<T> {
    /// Exactly one candidate.
    Resolved(T),
    /// More than one candidate.
    Ambiguous,
    /// No candidate.
    NotFound,
}

impl<T: Copy> Resolution<T> {
    /// Classify a candidate list.
    pub fn from_candidates(candidates: &[T]) -> Self {
        match candidates {
            [] => Resolution::NotFound,
            [single] => Resolution::Resolved(*single),
            _ => Resolution::Ambiguous,
        }
    }

    #[inline]
    pub fn resolved(&self) -> Option<T> {
        match self {
            Resolution::Resolved(value) => Some(*value),
            _ => None,
        }
    }
}

impl<T> Resolution<T> {
    #[inline]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    #[inline]
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Resolution::Ambiguous)
    }

    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Resolution::NotFound)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolution<U> {
        match self {
            Resolution::Resolved(value) => Resolution::Resolved(f(value)),
            Resolution::Ambiguous => Resolution::Ambiguous,
            Resolution::NotFound => Resolution::NotFound,
        }
    }

    pub fn and_then<U>(self, f: impl FnOnce(T) -> Resolution<U>) -> Resolution<U> {
        match self {
            Resolution::Resolved(value) => f(value),
            Resolution::Ambiguous => Resolution::Ambiguous,
            Resolution::NotFound => Resolution::NotFound,
        }
    }
}

// ============================================================================
// SYMBOL TABLE
// ============================================================================

/// A top-level declaration that can be named from anywhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TopLevelSymbol {
    Classifier(ClassifierId),
    Enumeration(EnumerationId),
    Association(AssociationId),
    Projection(ProjectionId),
}

/// Every top-level name of one compilation.
///
/// Service groups are keyed by their class and are not registered.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    by_name: FxHashMap<SmolStr, Vec<TopLevelSymbol>>,
    by_qualified_name: FxHashMap<SmolStr, Vec<TopLevelSymbol>>,
    /// Names in registration order, for deterministic duplicate reporting.
    order: Vec<SmolStr>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every top-level declaration of `scaffold`.
    pub fn build(scaffold: &Scaffold) -> Self {
        let mut table = Self::new();
        for (id, classifier) in scaffold.classifiers() {
            table.insert(&classifier.name.text, &classifier.qualified_name, TopLevelSymbol::Classifier(id));
        }
        for (id, enumeration) in scaffold.enumerations() {
            table.insert(
                &enumeration.name.text,
                &enumeration.qualified_name,
                TopLevelSymbol::Enumeration(id),
            );
        }
        for (id, association) in scaffold.associations() {
            table.insert(
                &association.name.text,
                &association.qualified_name,
                TopLevelSymbol::Association(id),
            );
        }
        for (id, projection) in scaffold.projections() {
            table.insert(
                &projection.name.text,
                &projection.qualified_name,
                TopLevelSymbol::Projection(id),
            );
        }
        tracing::debug!(names = table.by_name.len(), "symbol table built");
        table
    }

    pub fn insert(&mut self, name: &str, qualified_name: &str, symbol: TopLevelSymbol) {
        let entry = self.by_name.entry(SmolStr::new(name)).or_default();
        if entry.is_empty() {
            self.order.push(SmolStr::new(name));
        }
        entry.push(symbol);
        self.by_qualified_name
            .entry(SmolStr::new(qualified_name))
            .or_default()
            .push(symbol);
    }

    /// Candidates for a simple or qualified name.
    pub fn lookup(&self, name: &str) -> &[TopLevelSymbol] {
        self.by_qualified_name
            .get(name)
            .or_else(|| self.by_name.get(name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Simple names declared more than once, in registration order.
    pub fn duplicates(&self) -> impl Iterator<Item = (&SmolStr, &[TopLevelSymbol])> + '_ {
        self.order.iter().filter_map(|name| {
            let symbols = self.by_name.get(name)?;
            (symbols.len() > 1).then_some((name, symbols.as_slice()))
        })
    }

    pub fn len(&self) -> usize {
        self.by_name.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

/// Query-time resolution over a scaffold and its symbol table.
#[derive(Clone, Copy, Debug)]
pub struct Resolver<'a> {
    scaffold: &'a Scaffold,
    symbols: &'a SymbolTable,
}

impl<'a> Resolver<'a> {
    pub fn new(scaffold: &'a Scaffold, symbols: &'a SymbolTable) -> Self {
        Self { scaffold, symbols }
    }

    fn classifiers_named(&self, name: &str, accept: impl Fn(ClassifierKind) -> bool) -> Resolution<ClassifierId> {
        let candidates: Vec<_> = self
            .symbols
            .lookup(name)
            .iter()
            .filter_map(|symbol| match symbol {
                TopLevelSymbol::Classifier(id) => Some(*id),
                _ => None,
            })
            .filter(|id| accept(self.scaffold.classifier(*id).kind))
            .collect();
        Resolution::from_candidates(&candidates)
    }

    /// A class or an interface.
    pub fn resolve_classifier(&self, name: &str) -> Resolution<ClassifierId> {
        self.classifiers_named(name, |_| true)
    }

    pub fn resolve_class(&self, name: &str) -> Resolution<ClassifierId> {
        self.classifiers_named(name, ClassifierKind::is_class)
    }

    pub fn resolve_interface(&self, name: &str) -> Resolution<ClassifierId> {
        self.classifiers_named(name, |kind| kind == ClassifierKind::Interface)
    }

    pub fn resolve_enumeration(&self, name: &str) -> Resolution<EnumerationId> {
        let candidates: Vec<_> = self
            .symbols
            .lookup(name)
            .iter()
            .filter_map(|symbol| match symbol {
                TopLevelSymbol::Enumeration(id) => Some(*id),
                _ => None,
            })
            .collect();
        Resolution::from_candidates(&candidates)
    }

    pub fn resolve_projection(&self, name: &str) -> Resolution<ProjectionId> {
        let candidates: Vec<_> = self
            .symbols
            .lookup(name)
            .iter()
            .filter_map(|symbol| match symbol {
                TopLevelSymbol::Projection(id) => Some(*id),
                _ => None,
            })
            .collect();
        Resolution::from_candidates(&candidates)
    }

    /// The type of a data-type property or parameter: a primitive if the
    /// name is one, otherwise an enumeration.
    pub fn resolve_data_type(&self, name: &str) -> DataType {
        match PrimitiveType::from_name(name) {
            Some(primitive) => DataType::Primitive(primitive),
            None => DataType::Enumeration(self.resolve_enumeration(name)),
        }
    }

    /// A member of `classifier` by name: own members first, then the
    /// superclass chain, then interfaces.
    pub fn find_member(&self, classifier: ClassifierId, name: &str) -> Resolution<MemberRef> {
        for id in self.scaffold.supertypes_inclusive(classifier) {
            let candidates: Vec<_> = self
                .scaffold
                .classifier(id)
                .members
                .iter()
                .copied()
                .filter(|member| self.scaffold.member_name(*member).text == name)
                .collect();
            if !candidates.is_empty() {
                return Resolution::from_candidates(&candidates);
            }
        }
        Resolution::NotFound
    }

    /// Walk `segments` from `start`: every segment but the last names a
    /// reference property, the last names a data-type property.
    pub fn resolve_member_path(
        &self,
        start: Resolution<ClassifierId>,
        segments: Vec<NameRef>,
    ) -> MemberReference {
        let mut reference = MemberReference {
            classifier: start,
            type_name: None,
            segments,
            ends: Vec::new(),
            property: Resolution::NotFound,
            failure: None,
        };
        let Some(mut current) = start.resolved() else {
            return reference;
        };

        let last = reference.segments.len().saturating_sub(1);
        for (index, segment) in reference.segments.iter().enumerate() {
            let fail = move |ambiguous| PathFailure {
                segment: index,
                classifier: current,
                ambiguous,
            };
            match self.find_member(current, &segment.text) {
                Resolution::Resolved(MemberRef::DataType(property)) if index == last => {
                    reference.property = Resolution::Resolved(property);
                }
                Resolution::Resolved(MemberRef::Reference(end)) if index < last => {
                    reference.ends.push(end);
                    match self.scaffold.reference(end).resolved_target() {
                        Some(target) => current = target,
                        // The end's type is reported on its own.
                        None => return reference,
                    }
                }
                Resolution::Ambiguous => {
                    reference.property = Resolution::Ambiguous;
                    reference.failure = Some(fail(true));
                    return reference;
                }
                _ => {
                    reference.failure = Some(fail(false));
                    return reference;
                }
            }
        }
        reference
    }

    /// Like [`resolve_member_path`](Self::resolve_member_path), starting at
    /// whatever `this` denotes where the path is written.
    ///
    /// Member paths resolve only after every unit is scaffolded and every
    /// classifier is in the symbol table, so the classifier a path sits in
    /// is already registered, members included. A path inside its own
    /// classifier therefore needs no separate lookup. Callers still use this
    /// entry point for `this.` paths so criteria, order-by and projections
    /// say which start they mean.
    pub fn resolve_this_member_path(
        &self,
        this: Resolution<ClassifierId>,
        segments: Vec<NameRef>,
    ) -> MemberReference {
        self.resolve_member_path(this, segments)
    }

    pub fn resolve_parameter(&self, parameters: &[ParameterId], name: &str) -> Resolution<ParameterId> {
        let candidates: Vec<_> = parameters
            .iter()
            .copied()
            .filter(|id| self.scaffold.parameter(*id).name.text == name)
            .collect();
        Resolution::from_candidates(&candidates)
    }
}

// ============================================================================
// PHASES
// ============================================================================

/// Resolve supertypes, property and end types, projection and service
/// group classes, service projections and parameter types.
pub fn resolve_classifiers(scaffold: &mut Scaffold, symbols: &SymbolTable) -> Result<(), CompileError> {
    let _span = tracing::debug_span!("resolve_classifiers").entered();

    let supertypes: Vec<_> = {
        let resolver = Resolver::new(scaffold, symbols);
        scaffold
            .classifiers()
            .map(|(id, classifier)| {
                let super_class = classifier.super_class_ref.as_ref().map(|name| match classifier.kind {
                    ClassifierKind::Interface => resolver.resolve_interface(&name.text),
                    ClassifierKind::Class | ClassifierKind::User => resolver.resolve_class(&name.text),
                });
                let interfaces = classifier
                    .interface_refs
                    .iter()
                    .map(|name| resolver.resolve_interface(&name.text))
                    .collect::<Vec<_>>();
                (id, super_class, interfaces)
            })
            .collect()
    };
    for (id, super_class, interfaces) in supertypes {
        let classifier = scaffold.classifier_mut(id);
        classifier.super_class.enter(super_class)?;
        classifier.interfaces.enter(interfaces)?;
    }

    let property_ids: Vec<_> = scaffold.properties().map(|(id, _)| id).collect();
    for id in property_ids {
        resolve_property_type(scaffold, symbols, id)?;
    }

    let targets: Vec<_> = {
        let resolver = Resolver::new(scaffold, symbols);
        scaffold
            .references()
            .map(|(id, reference)| {
                let target = reference
                    .type_ref
                    .as_ref()
                    .map_or(Resolution::NotFound, |name| resolver.resolve_classifier(&name.text));
                (id, target)
            })
            .collect()
    };
    for (id, target) in targets {
        scaffold.reference_mut(id).target.enter(target)?;
    }

    let projections: Vec<_> = {
        let resolver = Resolver::new(scaffold, symbols);
        scaffold
            .projections()
            .map(|(id, projection)| {
                let classifier = projection
                    .classifier_ref
                    .as_ref()
                    .map_or(Resolution::NotFound, |name| resolver.resolve_classifier(&name.text));
                (id, classifier)
            })
            .collect()
    };
    for (id, classifier) in projections {
        scaffold.projection_mut(id).classifier.enter(classifier)?;
    }

    let referenced_projections: Vec<_> = {
        let resolver = Resolver::new(scaffold, symbols);
        scaffold
            .projection_nodes()
            .filter_map(|(id, node)| match &node.shape {
                ProjectionShape::ProjectionRef(name) => Some((id, resolver.resolve_projection(&name.text))),
                _ => None,
            })
            .collect()
    };
    for (id, projection) in referenced_projections {
        scaffold.projection_node_mut(id).projection.enter(projection)?;
    }

    let group_classes: Vec<_> = {
        let resolver = Resolver::new(scaffold, symbols);
        scaffold
            .service_groups()
            .map(|(id, group)| {
                let class = group
                    .class_ref
                    .as_ref()
                    .map_or(Resolution::NotFound, |name| resolver.resolve_class(&name.text));
                (id, class)
            })
            .collect()
    };
    for (id, class) in group_classes {
        scaffold.service_group_mut(id).class.enter(class)?;
    }

    let service_projections: Vec<_> = {
        let resolver = Resolver::new(scaffold, symbols);
        scaffold
            .services()
            .filter_map(|(id, service)| {
                let name = service.projection_ref.as_ref()?;
                Some((id, resolver.resolve_projection(&name.text)))
            })
            .collect()
    };
    for (id, projection) in service_projections {
        scaffold.service_mut(id).projection.enter(projection)?;
    }

    let parameter_types: Vec<_> = {
        let resolver = Resolver::new(scaffold, symbols);
        scaffold
            .parameters()
            .filter_map(|(id, parameter)| {
                let name = parameter.type_ref.as_ref()?;
                Some((id, resolver.resolve_data_type(&name.text)))
            })
            .collect()
    };
    for (id, data_type) in parameter_types {
        scaffold.parameter_mut(id).data_type.enter(data_type)?;
    }

    tracing::debug!(
        classifiers = scaffold.classifiers().len(),
        references = scaffold.references().len(),
        "classifier references resolved"
    );
    Ok(())
}

/// Resolve one data-type property's type. Also used for inferred
/// properties, which appear after classifier resolution.
pub fn resolve_property_type(
    scaffold: &mut Scaffold,
    symbols: &SymbolTable,
    id: PropertyId,
) -> Result<(), CompileError> {
    let data_type = {
        let resolver = Resolver::new(scaffold, symbols);
        let property = scaffold.property(id);
        property
            .type_ref
            .as_ref()
            .map(|name| resolver.resolve_data_type(&name.text))
    };
    if let Some(data_type) = data_type {
        scaffold.property_mut(id).data_type.enter(data_type)?;
    }
    Ok(())
}

/// Give every association end its owner and its opposite.
///
/// An end is owned by the type of the other end, and joins the owner's
/// members after the owner's body members.
pub fn wire_associations(scaffold: &mut Scaffold) -> Result<(), CompileError> {
    let _span = tracing::debug_span!("wire_associations").entered();

    let associations: Vec<_> = scaffold.associations().map(|(_, a)| a.ends).collect();
    for [source, target] in &associations {
        let (source, target) = (*source, *target);
        let source_type = scaffold.reference(source).target.require()?;
        let target_type = scaffold.reference(target).target.require()?;

        scaffold.reference_mut(source).owner.enter(target_type)?;
        scaffold.reference_mut(target).owner.enter(source_type)?;
        scaffold.reference_mut(source).opposite.enter(target)?;
        scaffold.reference_mut(target).opposite.enter(source)?;

        for (end, owner) in [(source, target_type), (target, source_type)] {
            if let Some(owner) = owner.resolved() {
                scaffold.classifier_mut(owner).members.push(MemberRef::Reference(end));
            }
        }
    }

    tracing::debug!(associations = associations.len(), "association ends wired");
    Ok(())
}

/// The classifier whose members a projection node is looked up in.
pub fn projection_parent_classifier(scaffold: &Scaffold, parent: ProjectionParent) -> Option<ClassifierId> {
    match parent {
        ProjectionParent::Projection(id) => scaffold.projection(id).classifier.get()?.resolved(),
        ProjectionParent::Node(id) => match scaffold.projection_node(id).member.get()?.resolved()? {
            MemberRef::Reference(reference) => scaffold.reference(reference).resolved_target(),
            MemberRef::DataType(_) => None,
        },
    }
}

/// Resolve order-by paths, association and service criteria, and
/// projection members, then derive foreign keys from the join criteria.
pub fn resolve_member_paths(
    scaffold: &mut Scaffold,
    symbols: &SymbolTable,
    sources: &SourceRoot,
    reporter: &mut Reporter,
) -> Result<(), CompileError> {
    let _span = tracing::debug_span!("resolve_member_paths").entered();

    resolve_order_by_paths(scaffold, symbols)?;
    resolve_association_criteria(scaffold, symbols, sources, reporter)?;
    resolve_service_criteria(scaffold, symbols, sources, reporter)?;
    resolve_projection_members(scaffold, symbols)?;
    derive_foreign_keys(scaffold)?;
    Ok(())
}

fn order_by_paths(
    resolver: &Resolver<'_>,
    this: Resolution<ClassifierId>,
    order_by: &[OrderByMemberScaffold],
) -> Vec<MemberReference> {
    order_by
        .iter()
        .map(|member| resolver.resolve_this_member_path(this, member.segments.clone()))
        .collect()
}

fn resolve_order_by_paths(scaffold: &mut Scaffold, symbols: &SymbolTable) -> Result<(), CompileError> {
    let reference_paths: Vec<_> = {
        let resolver = Resolver::new(scaffold, symbols);
        scaffold
            .references()
            .filter(|(_, reference)| !reference.order_by.is_empty())
            .map(|(id, reference)| {
                let this = reference.target.get().copied().unwrap_or(Resolution::NotFound);
                (id, order_by_paths(&resolver, this, &reference.order_by))
            })
            .collect()
    };
    for (id, paths) in reference_paths {
        for (member, path) in scaffold.reference_mut(id).order_by.iter_mut().zip(paths) {
            member.path.enter(path)?;
        }
    }

    let service_paths: Vec<_> = {
        let resolver = Resolver::new(scaffold, symbols);
        scaffold
            .services()
            .filter(|(_, service)| !service.order_by.is_empty())
            .map(|(id, service)| {
                let this = service_class(scaffold, service.url);
                (id, order_by_paths(&resolver, this, &service.order_by))
            })
            .collect()
    };
    for (id, paths) in service_paths {
        for (member, path) in scaffold.service_mut(id).order_by.iter_mut().zip(paths) {
            member.path.enter(path)?;
        }
    }
    Ok(())
}

fn service_class(scaffold: &Scaffold, url: UrlId) -> Resolution<ClassifierId> {
    let group = scaffold.url(url).group;
    scaffold
        .service_group(group)
        .class
        .get()
        .copied()
        .unwrap_or(Resolution::NotFound)
}

fn resolve_association_criteria(
    scaffold: &mut Scaffold,
    symbols: &SymbolTable,
    sources: &SourceRoot,
    reporter: &mut Reporter,
) -> Result<(), CompileError> {
    let mut lowered = Vec::new();
    {
        let resolver = Resolver::new(scaffold, symbols);
        for (id, association) in scaffold.associations() {
            let Some(syntax) = &association.relationship else {
                continue;
            };
            let Some(unit) = scaffold.decls.get(association.decl).and_then(|h| sources.get(h.unit)) else {
                continue;
            };
            let source = association.end(EndPosition::Source);
            let ctx = CriteriaContext {
                unit,
                this: scaffold.reference(source).target.require()?,
                parameters: &[],
                owner: association.decl,
            };
            lowered.push((id, lower_criteria(syntax, &resolver, &ctx, reporter)?));
        }
    }
    for (id, criteria) in lowered {
        scaffold.association_mut(id).criteria.enter(criteria)?;
    }
    Ok(())
}

fn resolve_service_criteria(
    scaffold: &mut Scaffold,
    symbols: &SymbolTable,
    sources: &SourceRoot,
    reporter: &mut Reporter,
) -> Result<(), CompileError> {
    let mut lowered = Vec::new();
    {
        let resolver = Resolver::new(scaffold, symbols);
        for (id, service) in scaffold.services() {
            let this = service_class(scaffold, service.url);
            let parameters = scaffold.url(service.url).parameters();
            for (index, clause) in service.criteria.iter().enumerate() {
                let Some(unit) = scaffold.decls.get(clause.decl).and_then(|h| sources.get(h.unit)) else {
                    continue;
                };
                let ctx = CriteriaContext {
                    unit,
                    this,
                    parameters: &parameters,
                    owner: clause.decl,
                };
                lowered.push((id, index, lower_criteria(&clause.syntax, &resolver, &ctx, reporter)?));
            }
        }
    }
    for (id, index, criteria) in lowered {
        scaffold.service_mut(id).criteria[index].criteria.enter(criteria)?;
    }
    Ok(())
}

fn resolve_projection_members(scaffold: &mut Scaffold, symbols: &SymbolTable) -> Result<(), CompileError> {
    // Nodes are allocated parent first, so a parent's member is entered
    // before its children look at it.
    let nodes: Vec<_> = scaffold.projection_nodes().map(|(id, _)| id).collect();
    for id in nodes {
        let member = {
            let node = scaffold.projection_node(id);
            match projection_parent_classifier(scaffold, node.parent) {
                Some(classifier) => Resolver::new(scaffold, symbols).find_member(classifier, &node.name.text),
                None => Resolution::NotFound,
            }
        };
        scaffold.projection_node_mut(id).member.enter(member)?;
    }
    Ok(())
}

/// Every classifier in a supertype cycle, each reported once.
pub fn inheritance_cycles(scaffold: &Scaffold) -> Vec<ClassifierId> {
    let mut cyclic = Vec::new();
    for (id, _) in scaffold.classifiers() {
        let mut seen = FxHashSet::default();
        let mut stack: Vec<ClassifierId> = direct_supertypes(scaffold, id);
        while let Some(next) = stack.pop() {
            if next == id {
                cyclic.push(id);
                break;
            }
            if seen.insert(next) {
                stack.extend(direct_supertypes(scaffold, next));
            }
        }
    }
    cyclic
}

fn direct_supertypes(scaffold: &Scaffold, id: ClassifierId) -> Vec<ClassifierId> {
    let classifier = scaffold.classifier(id);
    classifier
        .resolved_super_class()
        .into_iter()
        .chain(classifier.resolved_interfaces())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::lower::lower_source_units;

    fn scaffold_of(texts: &[&str]) -> (Scaffold, SymbolTable) {
        let mut sources = SourceRoot::new();
        for (i, text) in texts.iter().enumerate() {
            sources.add_source(format!("unit{i}.klass"), *text);
        }
        let mut scaffold = Scaffold::new();
        lower_source_units(&sources, &mut scaffold, '.');
        let symbols = SymbolTable::build(&scaffold);
        resolve_classifiers(&mut scaffold, &symbols).unwrap();
        wire_associations(&mut scaffold).unwrap();
        (scaffold, symbols)
    }

    fn class_named(scaffold: &Scaffold, name: &str) -> ClassifierId {
        scaffold
            .classifiers()
            .find(|(_, c)| c.name.text == name)
            .map(|(id, _)| id)
            .unwrap()
    }

    #[test]
    fn test_resolution_from_candidates() {
        assert_eq!(Resolution::<u32>::from_candidates(&[]), Resolution::NotFound);
        assert_eq!(Resolution::from_candidates(&[7]), Resolution::Resolved(7));
        assert_eq!(Resolution::from_candidates(&[1, 2]), Resolution::Ambiguous);
        assert_eq!(Resolution::Resolved(2).map(|v| v * 2), Resolution::Resolved(4));
    }

    #[test]
    fn test_forward_and_cross_unit_references() {
        let (scaffold, symbols) = scaffold_of(&[
            "package a\nclass Car extends Vehicle { id: Long key; }",
            "package b\nclass Vehicle { id: Long key; }",
        ]);
        let car = class_named(&scaffold, "Car");
        let vehicle = class_named(&scaffold, "Vehicle");

        assert_eq!(scaffold.classifier(car).resolved_super_class(), Some(vehicle));
        let resolver = Resolver::new(&scaffold, &symbols);
        assert_eq!(resolver.resolve_classifier("b.Vehicle"), Resolution::Resolved(vehicle));
    }

    #[test]
    fn test_duplicate_names_are_ambiguous() {
        let (scaffold, symbols) = scaffold_of(&[
            "package a\nclass Thing { id: Long key; }",
            "package b\nclass Thing { id: Long key; }",
        ]);
        let resolver = Resolver::new(&scaffold, &symbols);

        assert_eq!(resolver.resolve_classifier("Thing"), Resolution::Ambiguous);
        assert!(resolver.resolve_classifier("a.Thing").is_resolved());
        assert_eq!(symbols.duplicates().count(), 1);
    }

    #[test]
    fn test_missing_name_is_not_found_every_time() {
        let (scaffold, symbols) = scaffold_of(&["package a\nclass A { id: Long key; }"]);
        let resolver = Resolver::new(&scaffold, &symbols);

        assert_eq!(resolver.resolve_classifier("Missing"), Resolution::NotFound);
        assert_eq!(resolver.resolve_classifier("Missing"), Resolution::NotFound);
        assert_eq!(resolver.resolve_classifier("A"), resolver.resolve_classifier("A"));
    }

    #[test]
    fn test_association_wiring() {
        let (scaffold, _) = scaffold_of(&[
            "package p\n\
             class Question { id: Long key; }\n\
             class Answer { id: Long key; questionId: Long; }\n\
             association QuestionHasAnswers {\n\
                 question: Question[1..1];\n\
                 answers: Answer[0..*];\n\
             }",
        ]);
        let question = class_named(&scaffold, "Question");
        let answer = class_named(&scaffold, "Answer");
        let (_, association) = scaffold.associations().next().unwrap();
        let [source, target] = association.ends;

        assert_eq!(scaffold.reference(source).resolved_owner(), Some(answer));
        assert_eq!(scaffold.reference(target).resolved_owner(), Some(question));
        assert_eq!(scaffold.opposite(source), Some(target));
        assert_eq!(scaffold.opposite(target), Some(source));
        assert!(scaffold.classifier(question).reference_properties().any(|r| r == target));
    }

    #[test]
    fn test_member_path_through_association_end() {
        let (scaffold, symbols) = scaffold_of(&[
            "package p\n\
             class Question { id: Long key; title: String; }\n\
             class Answer { id: Long key; questionId: Long; }\n\
             association QuestionHasAnswers {\n\
                 question: Question[1..1];\n\
                 answers: Answer[0..*];\n\
             }",
        ]);
        let answer = class_named(&scaffold, "Answer");
        let resolver = Resolver::new(&scaffold, &symbols);
        let segment = |s: &str| NameRef::new(s, Default::default());

        let path = resolver.resolve_member_path(
            Resolution::Resolved(answer),
            vec![segment("question"), segment("title")],
        );
        assert!(path.property.is_resolved());
        assert_eq!(path.ends.len(), 1);

        let missing = resolver.resolve_member_path(
            Resolution::Resolved(answer),
            vec![segment("question"), segment("body")],
        );
        assert!(missing.property.is_not_found());
        assert_eq!(missing.failure.map(|f| f.segment), Some(1));
    }

    #[test]
    fn test_this_path_through_self_association() {
        let (scaffold, symbols) = scaffold_of(&[
            "package p\n\
             association NodeHasChildren {\n\
                 parent: Node[0..1];\n\
                 children: Node[0..*] orderBy: this.parent.name;\n\
             }\n\
             class Node { id: Long key; parentId: Long?; name: String; }",
        ]);
        let node = class_named(&scaffold, "Node");
        let resolver = Resolver::new(&scaffold, &symbols);
        let segment = |s: &str| NameRef::new(s, Default::default());

        let this_path = resolver.resolve_this_member_path(
            Resolution::Resolved(node),
            vec![segment("parent"), segment("name")],
        );
        let plain = resolver.resolve_member_path(
            Resolution::Resolved(node),
            vec![segment("parent"), segment("name")],
        );
        assert!(this_path.property.is_resolved());
        assert_eq!(this_path.property, plain.property);
        assert_eq!(this_path.ends, plain.ends);
    }

    #[test]
    fn test_inheritance_cycle_detected() {
        let (scaffold, _) = scaffold_of(&[
            "package p\nclass A extends B { id: Long key; }\nclass B extends A { id: Long key; }",
        ]);
        assert_eq!(inheritance_cycles(&scaffold).len(), 2);
    }
}
