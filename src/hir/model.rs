//! The frozen domain model.
//!
//! Produced only by [`crate::hir::build`], only from a scaffold that passed
//! every check. Elements are stored in arenas indexed by the same ids the
//! scaffold used, and reference each other by id, so the cyclic parts of the
//! graph (opposite ends, superclass and subclasses) need no indirection.

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use text_size::TextRange;

use crate::base::FileId;

use super::criteria::{Criteria, Frozen, MemberPath};
use super::ids::{
    AssociationId, ClassifierId, DeclId, EnumerationId, ParameterId, ProjectionId, ProjectionNodeId, PropertyId,
    ReferenceId, ServiceGroupId, ServiceId, UrlId,
};
use super::scaffold::{MemberRef, ProjectionParent};
use super::types::{
    ClassifierKind, CriteriaKeyword, EndPosition, InheritanceStrategy, Multiplicity, OrderByDirection, PrimitiveType,
    ServiceMultiplicity, ValidationKind, Verb,
};

/// Where an element was declared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeclInfo {
    pub decl: DeclId,
    pub unit: FileId,
    pub range: TextRange,
    /// True if a macro produced the element.
    pub inferred: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Modifier {
    pub keyword: SmolStr,
    /// Position among the owner's modifiers.
    pub ordinal: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    Primitive(PrimitiveType),
    Enumeration(EnumerationId),
}

// ============================================================================
// ELEMENTS
// ============================================================================

#[derive(Clone, Debug)]
pub struct Classifier {
    pub info: DeclInfo,
    pub kind: ClassifierKind,
    pub name: SmolStr,
    pub package: SmolStr,
    pub qualified_name: SmolStr,
    pub is_abstract: bool,
    pub strategy: InheritanceStrategy,
    pub modifiers: Vec<Modifier>,
    pub super_class: Option<ClassifierId>,
    pub interfaces: Vec<ClassifierId>,
    pub sub_classes: Vec<ClassifierId>,
    /// Body members in declaration order, then association ends.
    pub members: Vec<MemberRef>,
}

#[derive(Clone, Debug)]
pub struct Enumeration {
    pub info: DeclInfo,
    pub name: SmolStr,
    pub package: SmolStr,
    pub qualified_name: SmolStr,
    pub literals: Vec<EnumerationLiteral>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumerationLiteral {
    pub name: SmolStr,
    pub pretty_name: Option<SmolStr>,
    pub ordinal: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validation {
    pub kind: ValidationKind,
    pub value: Option<i64>,
}

#[derive(Clone, Debug)]
pub struct DataTypeProperty {
    pub info: DeclInfo,
    pub owner: ClassifierId,
    pub name: SmolStr,
    /// Position among the owner's members.
    pub ordinal: u32,
    pub data_type: DataType,
    pub optional: bool,
    pub modifiers: Vec<Modifier>,
    pub validations: Vec<Validation>,
    /// Association end → keys this property is a foreign key for.
    pub keys_matching_this_foreign_key: IndexMap<ReferenceId, Vec<PropertyId>>,
    /// Association end → foreign keys that refer to this key.
    pub foreign_keys_matching_this_key: IndexMap<ReferenceId, Vec<PropertyId>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderBy {
    pub path: MemberPath,
    pub direction: OrderByDirection,
}

/// An association end, or an end signature declared in a class body.
#[derive(Clone, Debug)]
pub struct ReferenceProperty {
    pub info: DeclInfo,
    pub owner: ClassifierId,
    pub name: SmolStr,
    pub ordinal: u32,
    pub target: ClassifierId,
    pub multiplicity: Multiplicity,
    pub modifiers: Vec<Modifier>,
    pub order_by: Vec<OrderBy>,
    /// The association and this end's position in it.
    pub association: Option<(AssociationId, EndPosition)>,
    /// Set for association ends only.
    pub opposite: Option<ReferenceId>,
}

#[derive(Clone, Debug)]
pub struct Association {
    pub info: DeclInfo,
    pub name: SmolStr,
    pub package: SmolStr,
    pub qualified_name: SmolStr,
    pub ends: [ReferenceId; 2],
    pub criteria: Option<Criteria<Frozen>>,
}

#[derive(Clone, Debug)]
pub struct Projection {
    pub info: DeclInfo,
    pub name: SmolStr,
    pub package: SmolStr,
    pub qualified_name: SmolStr,
    pub classifier: ClassifierId,
    pub children: Vec<ProjectionNodeId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProjectionNodeKind {
    DataType { property: PropertyId, header: SmolStr },
    Reference { reference: ReferenceId, children: Vec<ProjectionNodeId> },
    ProjectionRef { reference: ReferenceId, projection: ProjectionId },
}

#[derive(Clone, Debug)]
pub struct ProjectionNode {
    pub info: DeclInfo,
    pub name: SmolStr,
    pub parent: ProjectionParent,
    pub kind: ProjectionNodeKind,
}

#[derive(Clone, Debug)]
pub struct ServiceGroup {
    pub info: DeclInfo,
    pub class: ClassifierId,
    pub urls: Vec<UrlId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UrlSegment {
    Constant(SmolStr),
    Parameter(ParameterId),
}

#[derive(Clone, Debug)]
pub struct Url {
    pub info: DeclInfo,
    pub group: ServiceGroupId,
    pub text: SmolStr,
    pub path: Vec<UrlSegment>,
    pub query: Vec<ParameterId>,
    pub services: Vec<ServiceId>,
}

#[derive(Clone, Debug)]
pub struct Parameter {
    pub info: DeclInfo,
    pub url: UrlId,
    pub name: SmolStr,
    pub data_type: DataType,
    pub multiplicity: Option<Multiplicity>,
    pub modifiers: Vec<Modifier>,
}

#[derive(Clone, Debug)]
pub struct ServiceCriteria {
    pub info: DeclInfo,
    pub keyword: CriteriaKeyword,
    pub criteria: Criteria<Frozen>,
}

#[derive(Clone, Debug)]
pub struct Service {
    pub info: DeclInfo,
    pub url: UrlId,
    pub verb: Verb,
    pub multiplicity: ServiceMultiplicity,
    pub projection: Option<ProjectionId>,
    pub criteria: Vec<ServiceCriteria>,
    pub order_by: Vec<OrderBy>,
}

// ============================================================================
// MODEL
// ============================================================================

/// A source unit as it was compiled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceInfo {
    pub name: Arc<str>,
    pub text: Arc<str>,
}

/// The immutable, fully wired result of a successful compilation.
///
/// Holds only ids and strings, so it is `Send + Sync` and can be shared
/// with code generators running on other threads.
#[derive(Clone, Debug, Default)]
pub struct DomainModel {
    pub(crate) sources: Vec<SourceInfo>,
    pub(crate) classifiers: Vec<Classifier>,
    pub(crate) enumerations: Vec<Enumeration>,
    pub(crate) properties: Vec<DataTypeProperty>,
    pub(crate) references: Vec<ReferenceProperty>,
    pub(crate) associations: Vec<Association>,
    pub(crate) projections: Vec<Projection>,
    pub(crate) projection_nodes: Vec<ProjectionNode>,
    pub(crate) service_groups: Vec<ServiceGroup>,
    pub(crate) urls: Vec<Url>,
    pub(crate) parameters: Vec<Parameter>,
    pub(crate) services: Vec<Service>,
    pub(crate) by_name: FxHashMap<SmolStr, TopLevelElement>,
    pub(crate) by_qualified_name: FxHashMap<SmolStr, TopLevelElement>,
}

/// A named top-level element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TopLevelElement {
    Classifier(ClassifierId),
    Enumeration(EnumerationId),
    Association(AssociationId),
    Projection(ProjectionId),
}

macro_rules! model_arenas {
    ($($field:ident: $id:ident => $ty:ident { $get:ident, $iter:ident })*) => {
        impl DomainModel {
            $(
                #[inline]
                pub fn $get(&self, id: $id) -> &$ty {
                    &self.$field[id.as_usize()]
                }

                pub fn $iter(&self) -> impl ExactSizeIterator<Item = ($id, &$ty)> + '_ {
                    self.$field
                        .iter()
                        .enumerate()
                        .map(|(i, element)| ($id::next(i), element))
                }
            )*
        }
    };
}

model_arenas! {
    classifiers: ClassifierId => Classifier { classifier, classifiers }
    enumerations: EnumerationId => Enumeration { enumeration, enumerations }
    properties: PropertyId => DataTypeProperty { property, properties }
    references: ReferenceId => ReferenceProperty { reference, references }
    associations: AssociationId => Association { association, associations }
    projections: ProjectionId => Projection { projection, projections }
    projection_nodes: ProjectionNodeId => ProjectionNode { projection_node, projection_nodes }
    service_groups: ServiceGroupId => ServiceGroup { service_group, service_groups }
    urls: UrlId => Url { url, urls }
    parameters: ParameterId => Parameter { parameter, parameters }
    services: ServiceId => Service { service, services }
}

impl DomainModel {
    /// Compiled sources, indexed by [`FileId`].
    pub fn sources(&self) -> &[SourceInfo] {
        &self.sources
    }

    pub fn source(&self, unit: FileId) -> Option<&SourceInfo> {
        self.sources.get(unit.as_usize())
    }

    /// A top-level element by simple or qualified name.
    pub fn lookup(&self, name: &str) -> Option<TopLevelElement> {
        self.by_qualified_name
            .get(name)
            .or_else(|| self.by_name.get(name))
            .copied()
    }

    pub fn classifier_named(&self, name: &str) -> Option<ClassifierView<'_>> {
        match self.lookup(name)? {
            TopLevelElement::Classifier(id) => Some(self.classifier_view(id)),
            _ => None,
        }
    }

    pub fn association_named(&self, name: &str) -> Option<AssociationView<'_>> {
        match self.lookup(name)? {
            TopLevelElement::Association(id) => Some(AssociationView { model: self, id }),
            _ => None,
        }
    }

    pub fn enumeration_named(&self, name: &str) -> Option<&Enumeration> {
        match self.lookup(name)? {
            TopLevelElement::Enumeration(id) => Some(self.enumeration(id)),
            _ => None,
        }
    }

    pub fn projection_named(&self, name: &str) -> Option<&Projection> {
        match self.lookup(name)? {
            TopLevelElement::Projection(id) => Some(self.projection(id)),
            _ => None,
        }
    }

    #[inline]
    pub fn classifier_view(&self, id: ClassifierId) -> ClassifierView<'_> {
        ClassifierView { model: self, id }
    }

    #[inline]
    pub fn property_view(&self, id: PropertyId) -> PropertyView<'_> {
        PropertyView { model: self, id }
    }

    #[inline]
    pub fn end_view(&self, id: ReferenceId) -> AssociationEndView<'_> {
        AssociationEndView { model: self, id }
    }

    /// The service group for `class`, if there is one.
    pub fn service_group_for(&self, class: ClassifierId) -> Option<&ServiceGroup> {
        self.service_groups.iter().find(|group| group.class == class)
    }
}

// ============================================================================
// VIEWS
// ============================================================================

/// A class or interface with navigation helpers.
#[derive(Clone, Copy, Debug)]
pub struct ClassifierView<'m> {
    model: &'m DomainModel,
    id: ClassifierId,
}

impl<'m> ClassifierView<'m> {
    #[inline]
    pub fn id(&self) -> ClassifierId {
        self.id
    }

    #[inline]
    pub fn element(&self) -> &'m Classifier {
        self.model.classifier(self.id)
    }

    pub fn name(&self) -> &'m str {
        &self.element().name
    }

    pub fn qualified_name(&self) -> &'m str {
        &self.element().qualified_name
    }

    pub fn has_modifier(&self, keyword: &str) -> bool {
        self.element().modifiers.iter().any(|m| m.keyword == keyword)
    }

    pub fn super_class(&self) -> Option<ClassifierView<'m>> {
        Some(self.model.classifier_view(self.element().super_class?))
    }

    pub fn interfaces(&self) -> impl Iterator<Item = ClassifierView<'m>> + 'm {
        let model = self.model;
        self.element().interfaces.iter().map(move |id| model.classifier_view(*id))
    }

    pub fn sub_classes(&self) -> impl Iterator<Item = ClassifierView<'m>> + 'm {
        let model = self.model;
        self.element().sub_classes.iter().map(move |id| model.classifier_view(*id))
    }

    /// Own data-type properties in declaration order.
    pub fn data_type_properties(&self) -> impl Iterator<Item = PropertyView<'m>> + 'm {
        let model = self.model;
        self.element().members.iter().filter_map(move |member| match member {
            MemberRef::DataType(id) => Some(model.property_view(*id)),
            MemberRef::Reference(_) => None,
        })
    }

    /// Own association ends and end signatures in declaration order.
    pub fn reference_properties(&self) -> impl Iterator<Item = AssociationEndView<'m>> + 'm {
        let model = self.model;
        self.element().members.iter().filter_map(move |member| match member {
            MemberRef::Reference(id) => Some(model.end_view(*id)),
            MemberRef::DataType(_) => None,
        })
    }

    pub fn property(&self, name: &str) -> Option<PropertyView<'m>> {
        self.data_type_properties().find(|p| p.name() == name)
    }

    pub fn end(&self, name: &str) -> Option<AssociationEndView<'m>> {
        self.reference_properties().find(|e| e.name() == name)
    }

    /// Key properties, own first then inherited through the superclass chain.
    pub fn key_properties(&self) -> Vec<PropertyView<'m>> {
        let mut out = Vec::new();
        let mut next = Some(*self);
        while let Some(classifier) = next {
            out.extend(classifier.data_type_properties().filter(|p| p.has_modifier("key")));
            next = classifier.super_class().filter(|s| s.id != self.id);
        }
        out
    }
}

#[derive(Clone, Copy, Debug)]
pub struct PropertyView<'m> {
    model: &'m DomainModel,
    id: PropertyId,
}

impl<'m> PropertyView<'m> {
    #[inline]
    pub fn id(&self) -> PropertyId {
        self.id
    }

    #[inline]
    pub fn element(&self) -> &'m DataTypeProperty {
        self.model.property(self.id)
    }

    pub fn name(&self) -> &'m str {
        &self.element().name
    }

    pub fn owner(&self) -> ClassifierView<'m> {
        self.model.classifier_view(self.element().owner)
    }

    pub fn has_modifier(&self, keyword: &str) -> bool {
        self.element().modifiers.iter().any(|m| m.keyword == keyword)
    }

    pub fn is_foreign_key(&self) -> bool {
        !self.element().keys_matching_this_foreign_key.is_empty()
    }

    /// The keys this property refers to through `end`.
    pub fn keys_for(&self, end: ReferenceId) -> impl Iterator<Item = PropertyView<'m>> + 'm {
        let model = self.model;
        self.element()
            .keys_matching_this_foreign_key
            .get(&end)
            .into_iter()
            .flatten()
            .map(move |id| model.property_view(*id))
    }

    /// The foreign keys that refer to this key through `end`.
    pub fn foreign_keys_for(&self, end: ReferenceId) -> impl Iterator<Item = PropertyView<'m>> + 'm {
        let model = self.model;
        self.element()
            .foreign_keys_matching_this_key
            .get(&end)
            .into_iter()
            .flatten()
            .map(move |id| model.property_view(*id))
    }
}

#[derive(Clone, Copy, Debug)]
pub struct AssociationEndView<'m> {
    model: &'m DomainModel,
    id: ReferenceId,
}

impl<'m> AssociationEndView<'m> {
    #[inline]
    pub fn id(&self) -> ReferenceId {
        self.id
    }

    #[inline]
    pub fn element(&self) -> &'m ReferenceProperty {
        self.model.reference(self.id)
    }

    pub fn name(&self) -> &'m str {
        &self.element().name
    }

    pub fn multiplicity(&self) -> Multiplicity {
        self.element().multiplicity
    }

    pub fn has_modifier(&self, keyword: &str) -> bool {
        self.element().modifiers.iter().any(|m| m.keyword == keyword)
    }

    pub fn owner(&self) -> ClassifierView<'m> {
        self.model.classifier_view(self.element().owner)
    }

    pub fn target(&self) -> ClassifierView<'m> {
        self.model.classifier_view(self.element().target)
    }

    pub fn opposite(&self) -> Option<AssociationEndView<'m>> {
        Some(self.model.end_view(self.element().opposite?))
    }

    pub fn association(&self) -> Option<AssociationView<'m>> {
        let (id, _) = self.element().association?;
        Some(AssociationView { model: self.model, id })
    }
}

#[derive(Clone, Copy, Debug)]
pub struct AssociationView<'m> {
    model: &'m DomainModel,
    id: AssociationId,
}

impl<'m> AssociationView<'m> {
    #[inline]
    pub fn id(&self) -> AssociationId {
        self.id
    }

    #[inline]
    pub fn element(&self) -> &'m Association {
        self.model.association(self.id)
    }

    pub fn name(&self) -> &'m str {
        &self.element().name
    }

    pub fn end(&self, position: EndPosition) -> AssociationEndView<'m> {
        self.model.end_view(self.element().ends[position.index()])
    }

    pub fn source(&self) -> AssociationEndView<'m> {
        self.end(EndPosition::Source)
    }

    pub fn target(&self) -> AssociationEndView<'m> {
        self.end(EndPosition::Target)
    }

    pub fn criteria(&self) -> Option<&'m Criteria<Frozen>> {
        self.element().criteria.as_ref()
    }
}
