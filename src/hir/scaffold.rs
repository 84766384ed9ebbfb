//! The declaration scaffold.
//!
//! One mutable element per declaration, written or inferred, stored in typed
//! arenas. Fields that later phases fill in are [`WriteOnce`]; everything
//! else is known when the declaration is lowered.

use indexmap::IndexMap;
use smol_str::SmolStr;
use text_size::TextRange;

use crate::syntax::ast;

use super::criteria::{Criteria, MemberReference, Scaffolded};
use super::decl::{DeclHeader, DeclTable, WriteOnce};
use super::ids::{
    AssociationId, ClassifierId, DeclId, EnumerationId, ParameterId, ProjectionId,
    ProjectionNodeId, PropertyId, ReferenceId, ServiceGroupId, ServiceId, UrlId,
};
use super::resolve::Resolution;
use super::types::{
    ClassifierKind, CriteriaKeyword, EndPosition, InheritanceStrategy, Multiplicity,
    OrderByDirection, PrimitiveType, ServiceMultiplicity, ValidationKind, Verb,
};

// ============================================================================
// SHARED PIECES
// ============================================================================

/// A name as written, with its span.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NameRef {
    pub text: SmolStr,
    pub range: TextRange,
}

impl NameRef {
    pub fn new(text: impl Into<SmolStr>, range: TextRange) -> Self {
        Self {
            text: text.into(),
            range,
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// A classifier or property modifier keyword.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModifierScaffold {
    pub decl: DeclId,
    pub keyword: SmolStr,
    pub range: TextRange,
}

pub(crate) fn has_modifier(modifiers: &[ModifierScaffold], keyword: &str) -> bool {
    modifiers.iter().any(|m| m.keyword == keyword)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationScaffold {
    pub decl: DeclId,
    pub kind: ValidationKind,
    pub value: Option<i64>,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrderByMemberScaffold {
    pub decl: DeclId,
    pub segments: Vec<NameRef>,
    pub direction: OrderByDirection,
    pub path: WriteOnce<MemberReference>,
}

/// Any member of a classifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemberRef {
    DataType(PropertyId),
    Reference(ReferenceId),
}

/// The type of a data-type property or url parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataType {
    Primitive(PrimitiveType),
    Enumeration(Resolution<EnumerationId>),
}

// ============================================================================
// CLASSIFIERS
// ============================================================================

#[derive(Debug)]
pub struct ClassifierScaffold {
    pub decl: DeclId,
    pub kind: ClassifierKind,
    pub name: NameRef,
    pub package: SmolStr,
    pub qualified_name: SmolStr,
    pub is_abstract: bool,
    pub strategy: InheritanceStrategy,
    pub modifiers: Vec<ModifierScaffold>,
    pub super_class_ref: Option<NameRef>,
    pub interface_refs: Vec<NameRef>,
    pub super_class: WriteOnce<Option<Resolution<ClassifierId>>>,
    pub interfaces: WriteOnce<Vec<Resolution<ClassifierId>>>,
    /// Own members in declaration order; association ends are appended when
    /// their association is wired.
    pub members: Vec<MemberRef>,
}

impl ClassifierScaffold {
    pub fn data_type_properties(&self) -> impl Iterator<Item = PropertyId> + '_ {
        self.members.iter().filter_map(|m| match m {
            MemberRef::DataType(id) => Some(*id),
            MemberRef::Reference(_) => None,
        })
    }

    pub fn reference_properties(&self) -> impl Iterator<Item = ReferenceId> + '_ {
        self.members.iter().filter_map(|m| match m {
            MemberRef::Reference(id) => Some(*id),
            MemberRef::DataType(_) => None,
        })
    }

    pub fn has_modifier(&self, keyword: &str) -> bool {
        has_modifier(&self.modifiers, keyword)
    }

    /// The resolved superclass, if written and found.
    pub fn resolved_super_class(&self) -> Option<ClassifierId> {
        self.super_class.get().and_then(|r| r.as_ref()).and_then(Resolution::resolved)
    }

    /// Resolved interfaces in written order.
    pub fn resolved_interfaces(&self) -> impl Iterator<Item = ClassifierId> + '_ {
        self.interfaces
            .get()
            .into_iter()
            .flatten()
            .filter_map(Resolution::resolved)
    }
}

#[derive(Debug)]
pub struct EnumerationScaffold {
    pub decl: DeclId,
    pub name: NameRef,
    pub package: SmolStr,
    pub qualified_name: SmolStr,
    pub literals: Vec<EnumLiteralScaffold>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumLiteralScaffold {
    pub decl: DeclId,
    pub name: NameRef,
    pub pretty_name: Option<SmolStr>,
}

// ============================================================================
// PROPERTIES
// ============================================================================

#[derive(Debug)]
pub struct DataTypePropertyScaffold {
    pub decl: DeclId,
    pub owner: ClassifierId,
    pub name: NameRef,
    pub type_ref: Option<NameRef>,
    pub optional: bool,
    pub modifiers: Vec<ModifierScaffold>,
    pub validations: Vec<ValidationScaffold>,
    pub data_type: WriteOnce<DataType>,
    /// For a foreign key: the keys it matches, per association end.
    pub keys_matching_this_foreign_key: IndexMap<ReferenceId, Vec<PropertyId>>,
    /// For a key: the foreign keys that match it, per association end.
    pub foreign_keys_matching_this_key: IndexMap<ReferenceId, Vec<PropertyId>>,
}

impl DataTypePropertyScaffold {
    pub fn has_modifier(&self, keyword: &str) -> bool {
        has_modifier(&self.modifiers, keyword)
    }

    pub fn primitive(&self) -> Option<PrimitiveType> {
        match self.data_type.get() {
            Some(DataType::Primitive(primitive)) => Some(*primitive),
            _ => None,
        }
    }

    /// The type name as written, for messages.
    pub fn type_name(&self) -> &str {
        self.type_ref.as_ref().map_or("", NameRef::as_str)
    }
}

/// Where a reference property was declared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReferenceOrigin {
    AssociationEnd {
        association: AssociationId,
        position: EndPosition,
    },
    /// Declared in a class body without an association.
    Signature { owner: ClassifierId },
}

#[derive(Debug)]
pub struct ReferenceScaffold {
    pub decl: DeclId,
    pub origin: ReferenceOrigin,
    pub name: NameRef,
    pub type_ref: Option<NameRef>,
    /// Bounds as written, for messages.
    pub bounds: (SmolStr, SmolStr),
    /// `None` if the written bounds are not a supported multiplicity.
    pub multiplicity: Option<Multiplicity>,
    pub multiplicity_range: TextRange,
    pub modifiers: Vec<ModifierScaffold>,
    pub order_by: Vec<OrderByMemberScaffold>,
    pub order_by_range: Option<TextRange>,
    pub target: WriteOnce<Resolution<ClassifierId>>,
    pub owner: WriteOnce<Resolution<ClassifierId>>,
    pub opposite: WriteOnce<ReferenceId>,
}

impl ReferenceScaffold {
    pub fn has_modifier(&self, keyword: &str) -> bool {
        has_modifier(&self.modifiers, keyword)
    }

    pub fn is_association_end(&self) -> bool {
        matches!(self.origin, ReferenceOrigin::AssociationEnd { .. })
    }

    pub fn resolved_owner(&self) -> Option<ClassifierId> {
        self.owner.get().and_then(Resolution::resolved)
    }

    pub fn resolved_target(&self) -> Option<ClassifierId> {
        self.target.get().and_then(Resolution::resolved)
    }

    pub fn type_name(&self) -> &str {
        self.type_ref.as_ref().map_or("", NameRef::as_str)
    }
}

// ============================================================================
// ASSOCIATIONS
// ============================================================================

#[derive(Debug)]
pub struct AssociationScaffold {
    pub decl: DeclId,
    pub name: NameRef,
    pub package: SmolStr,
    pub qualified_name: SmolStr,
    pub ends: [ReferenceId; 2],
    pub relationship: Option<ast::Criteria>,
    pub criteria: WriteOnce<Criteria<Scaffolded>>,
}

impl AssociationScaffold {
    #[inline]
    pub fn end(&self, position: EndPosition) -> ReferenceId {
        self.ends[position.index()]
    }
}

// ============================================================================
// PROJECTIONS
// ============================================================================

#[derive(Debug)]
pub struct ProjectionScaffold {
    pub decl: DeclId,
    pub name: NameRef,
    pub package: SmolStr,
    pub qualified_name: SmolStr,
    pub classifier_ref: Option<NameRef>,
    pub classifier: WriteOnce<Resolution<ClassifierId>>,
    pub children: Vec<ProjectionNodeId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProjectionParent {
    Projection(ProjectionId),
    Node(ProjectionNodeId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProjectionShape {
    /// A data-type property shown under a header.
    Leaf { header: SmolStr },
    /// A reference property projected inline.
    Nested { children: Vec<ProjectionNodeId> },
    /// A reference property projected through a named projection.
    ProjectionRef(NameRef),
}

#[derive(Debug)]
pub struct ProjectionNodeScaffold {
    pub decl: DeclId,
    pub name: NameRef,
    pub parent: ProjectionParent,
    pub shape: ProjectionShape,
    /// The member of the parent's classifier this node projects.
    pub member: WriteOnce<Resolution<MemberRef>>,
    /// For projection references: the referenced projection.
    pub projection: WriteOnce<Resolution<ProjectionId>>,
}

impl ProjectionNodeScaffold {
    pub fn children(&self) -> &[ProjectionNodeId] {
        match &self.shape {
            ProjectionShape::Nested { children } => children,
            _ => &[],
        }
    }
}

// ============================================================================
// SERVICES
// ============================================================================

#[derive(Debug)]
pub struct ServiceGroupScaffold {
    pub decl: DeclId,
    pub class_ref: Option<NameRef>,
    pub class: WriteOnce<Resolution<ClassifierId>>,
    pub urls: Vec<UrlId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UrlSegment {
    Constant(NameRef),
    Parameter(ParameterId),
}

#[derive(Debug)]
pub struct UrlScaffold {
    pub decl: DeclId,
    pub group: ServiceGroupId,
    /// Normalized text, `/question/{id}`, used to detect duplicates.
    pub text: SmolStr,
    pub path: Vec<UrlSegment>,
    pub query: Vec<ParameterId>,
    pub services: Vec<ServiceId>,
}

impl UrlScaffold {
    /// Path parameters then query parameters.
    pub fn parameters(&self) -> Vec<ParameterId> {
        self.path
            .iter()
            .filter_map(|segment| match segment {
                UrlSegment::Parameter(id) => Some(*id),
                UrlSegment::Constant(_) => None,
            })
            .chain(self.query.iter().copied())
            .collect()
    }
}

#[derive(Debug)]
pub struct ParameterScaffold {
    pub decl: DeclId,
    pub url: UrlId,
    pub name: NameRef,
    pub type_ref: Option<NameRef>,
    pub multiplicity: Option<Multiplicity>,
    pub modifiers: Vec<ModifierScaffold>,
    pub data_type: WriteOnce<DataType>,
}

#[derive(Debug)]
pub struct ServiceCriteriaScaffold {
    pub decl: DeclId,
    pub keyword: CriteriaKeyword,
    pub keyword_range: TextRange,
    pub syntax: ast::Criteria,
    pub criteria: WriteOnce<Criteria<Scaffolded>>,
}

#[derive(Debug)]
pub struct ServiceScaffold {
    pub decl: DeclId,
    pub url: UrlId,
    pub verb: Verb,
    pub verb_range: TextRange,
    pub multiplicity: ServiceMultiplicity,
    pub projection_ref: Option<NameRef>,
    pub projection: WriteOnce<Resolution<ProjectionId>>,
    pub criteria: Vec<ServiceCriteriaScaffold>,
    pub order_by: Vec<OrderByMemberScaffold>,
}

impl ServiceScaffold {
    pub fn has_criteria(&self, keyword: CriteriaKeyword) -> bool {
        self.criteria.iter().any(|c| c.keyword == keyword)
    }
}

// ============================================================================
// ARENAS
// ============================================================================

/// Every scaffold element of one compilation.
#[derive(Debug, Default)]
pub struct Scaffold {
    pub decls: DeclTable,
    classifiers: Vec<ClassifierScaffold>,
    enumerations: Vec<EnumerationScaffold>,
    properties: Vec<DataTypePropertyScaffold>,
    references: Vec<ReferenceScaffold>,
    associations: Vec<AssociationScaffold>,
    projections: Vec<ProjectionScaffold>,
    projection_nodes: Vec<ProjectionNodeScaffold>,
    service_groups: Vec<ServiceGroupScaffold>,
    urls: Vec<UrlScaffold>,
    parameters: Vec<ParameterScaffold>,
    services: Vec<ServiceScaffold>,
}

macro_rules! arenas {
    ($($field:ident: $id:ident => $ty:ident { $alloc:ident, $get:ident, $get_mut:ident, $iter:ident })*) => {
        impl Scaffold {
            $(
                pub fn $alloc(&mut self, element: $ty) -> $id {
                    let id = $id::next(self.$field.len());
                    self.$field.push(element);
                    id
                }

                #[inline]
                pub fn $get(&self, id: $id) -> &$ty {
                    &self.$field[id.as_usize()]
                }

                #[inline]
                pub fn $get_mut(&mut self, id: $id) -> &mut $ty {
                    &mut self.$field[id.as_usize()]
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

arenas! {
    classifiers: ClassifierId => ClassifierScaffold {
        alloc_classifier, classifier, classifier_mut, classifiers
    }
    enumerations: EnumerationId => EnumerationScaffold {
        alloc_enumeration, enumeration, enumeration_mut, enumerations
    }
    properties: PropertyId => DataTypePropertyScaffold {
        alloc_property, property, property_mut, properties
    }
    references: ReferenceId => ReferenceScaffold {
        alloc_reference, reference, reference_mut, references
    }
    associations: AssociationId => AssociationScaffold {
        alloc_association, association, association_mut, associations
    }
    projections: ProjectionId => ProjectionScaffold {
        alloc_projection, projection, projection_mut, projections
    }
    projection_nodes: ProjectionNodeId => ProjectionNodeScaffold {
        alloc_projection_node, projection_node, projection_node_mut, projection_nodes
    }
    service_groups: ServiceGroupId => ServiceGroupScaffold {
        alloc_service_group, service_group, service_group_mut, service_groups
    }
    urls: UrlId => UrlScaffold {
        alloc_url, url, url_mut, urls
    }
    parameters: ParameterId => ParameterScaffold {
        alloc_parameter, parameter, parameter_mut, parameters
    }
    services: ServiceId => ServiceScaffold {
        alloc_service, service, service_mut, services
    }
}

impl Scaffold {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_decl(&mut self, header: DeclHeader) -> DeclId {
        self.decls.alloc(header)
    }

    /// A classifier member's name.
    pub fn member_name(&self, member: MemberRef) -> &NameRef {
        match member {
            MemberRef::DataType(id) => &self.property(id).name,
            MemberRef::Reference(id) => &self.reference(id).name,
        }
    }

    pub fn member_decl(&self, member: MemberRef) -> DeclId {
        match member {
            MemberRef::DataType(id) => self.property(id).decl,
            MemberRef::Reference(id) => self.reference(id).decl,
        }
    }

    /// Own and inherited data-type properties: own first, then the
    /// superclass chain, then interfaces; each classifier visited once.
    pub fn all_data_type_properties(&self, classifier: ClassifierId) -> Vec<PropertyId> {
        let mut out = Vec::new();
        for id in self.supertypes_inclusive(classifier) {
            out.extend(self.classifier(id).data_type_properties());
        }
        out
    }

    /// `classifier`, then its superclasses, then interfaces breadth first.
    pub fn supertypes_inclusive(&self, classifier: ClassifierId) -> Vec<ClassifierId> {
        let mut seen = rustc_hash::FxHashSet::default();
        let mut order = Vec::new();
        let mut queue = std::collections::VecDeque::from([classifier]);
        while let Some(id) = queue.pop_front() {
            if !seen.insert(id) {
                continue;
            }
            order.push(id);
            let scaffold = self.classifier(id);
            queue.extend(scaffold.resolved_super_class());
            queue.extend(scaffold.resolved_interfaces());
        }
        order
    }

    /// The opposite end of an association end.
    pub fn opposite(&self, end: ReferenceId) -> Option<ReferenceId> {
        self.reference(end).opposite.get().copied()
    }
}
