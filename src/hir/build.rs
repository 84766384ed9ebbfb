//! Builder/freeze: scaffold → [`DomainModel`].
//!
//! Two passes, tracked in the type of [`Freeze`]:
//!
//! ```text
//! Freeze<Unbuilt> --build()--> Freeze<ShellBuilt> --build_children()--> Freeze<ChildrenWired>
//! ```
//!
//! `build()` creates every element shell from its direct fields and from
//! shells built before it. `build_children()` wires what the shells could
//! not hold: modifiers, order-by clauses, opposites, foreign-key maps,
//! subclass lists and criteria. Each transition consumes the previous
//! state, so neither pass can run twice.
//!
//! Freezing assumes the checks passed. A reference that is still unresolved
//! here is a pipeline bug and aborts with [`CompileError::UnresolvedAfterCheck`].

use std::marker::PhantomData;

use crate::error::CompileError;

use super::criteria::{Criteria, Frozen, MemberPath, MemberReference, Scaffolded, VariableReference};
use super::ids::{ClassifierId, DeclId, ParameterId, ProjectionId};
use super::input::SourceRoot;
use super::model::{
    Association, Classifier, DataType, DataTypeProperty, DeclInfo, DomainModel, Enumeration, EnumerationLiteral,
    Modifier, OrderBy, Parameter, Projection, ProjectionNode, ProjectionNodeKind, ReferenceProperty, Service,
    ServiceCriteria, ServiceGroup, SourceInfo, TopLevelElement, Url, UrlSegment, Validation,
};
use super::resolve::Resolution;
use super::scaffold::{self, MemberRef, ModifierScaffold, OrderByMemberScaffold, ProjectionShape, ReferenceOrigin, Scaffold};

// ============================================================================
// TYPESTATE
// ============================================================================

/// A freeze pass state.
pub trait FreezeState: private::Sealed {}

/// Nothing built yet.
#[derive(Debug)]
pub struct Unbuilt;
impl FreezeState for Unbuilt {}

/// Every element shell exists; collections and cross-references are empty.
#[derive(Debug)]
pub struct ShellBuilt;
impl FreezeState for ShellBuilt {}

/// The model is complete.
#[derive(Debug)]
pub struct ChildrenWired;
impl FreezeState for ChildrenWired {}

mod private {
    pub trait Sealed {}
    impl Sealed for super::Unbuilt {}
    impl Sealed for super::ShellBuilt {}
    impl Sealed for super::ChildrenWired {}
}

/// A domain model under construction.
#[derive(Debug)]
pub struct Freeze<'s, S: FreezeState> {
    scaffold: &'s Scaffold,
    sources: &'s SourceRoot,
    model: DomainModel,
    _state: PhantomData<S>,
}

impl<'s, S: FreezeState> Freeze<'s, S> {
    fn into_state<T: FreezeState>(self) -> Freeze<'s, T> {
        Freeze {
            scaffold: self.scaffold,
            sources: self.sources,
            model: self.model,
            _state: PhantomData,
        }
    }

    fn info(&self, decl: DeclId) -> Result<DeclInfo, CompileError> {
        let header = self
            .scaffold
            .decls
            .get(decl)
            .ok_or_else(|| CompileError::unresolved("declaration header"))?;
        Ok(DeclInfo {
            decl,
            unit: header.unit,
            range: header.range,
            inferred: header.is_inferred(),
        })
    }
}

/// Freeze a checked scaffold in one call.
pub fn freeze(scaffold: &Scaffold, sources: &SourceRoot) -> Result<DomainModel, CompileError> {
    let _span = tracing::debug_span!("freeze").entered();
    let model = Freeze::new(scaffold, sources).build()?.build_children()?.into_model();
    tracing::debug!(
        classifiers = model.classifiers.len(),
        associations = model.associations.len(),
        services = model.services.len(),
        "domain model frozen"
    );
    Ok(model)
}

// ============================================================================
// PASS 1: SHELLS
// ============================================================================

impl<'s> Freeze<'s, Unbuilt> {
    pub fn new(scaffold: &'s Scaffold, sources: &'s SourceRoot) -> Self {
        Self {
            scaffold,
            sources,
            model: DomainModel::default(),
            _state: PhantomData,
        }
    }

    /// Build every element shell.
    pub fn build(mut self) -> Result<Freeze<'s, ShellBuilt>, CompileError> {
        let _span = tracing::debug_span!("build_shells").entered();
        let scaffold = self.scaffold;

        self.model.sources = self
            .sources
            .iter()
            .map(|unit| SourceInfo {
                name: unit.source_name_arc(),
                text: unit.text_arc(),
            })
            .collect();

        for (_, classifier) in scaffold.classifiers() {
            let shell = Classifier {
                info: self.info(classifier.decl)?,
                kind: classifier.kind,
                name: classifier.name.text.clone(),
                package: classifier.package.clone(),
                qualified_name: classifier.qualified_name.clone(),
                is_abstract: classifier.is_abstract,
                strategy: classifier.strategy,
                modifiers: Vec::new(),
                super_class: None,
                interfaces: Vec::new(),
                sub_classes: Vec::new(),
                members: Vec::new(),
            };
            self.model.classifiers.push(shell);
        }

        for (_, enumeration) in scaffold.enumerations() {
            let literals = enumeration
                .literals
                .iter()
                .zip(0..)
                .map(|(literal, ordinal)| EnumerationLiteral {
                    name: literal.name.text.clone(),
                    pretty_name: literal.pretty_name.clone(),
                    ordinal,
                })
                .collect();
            let shell = Enumeration {
                info: self.info(enumeration.decl)?,
                name: enumeration.name.text.clone(),
                package: enumeration.package.clone(),
                qualified_name: enumeration.qualified_name.clone(),
                literals,
            };
            self.model.enumerations.push(shell);
        }

        let ordinals = member_ordinals(scaffold);

        for (id, property) in scaffold.properties() {
            let shell = DataTypeProperty {
                info: self.info(property.decl)?,
                owner: property.owner,
                name: property.name.text.clone(),
                ordinal: ordinals.get(&MemberRef::DataType(id)).copied().unwrap_or_default(),
                data_type: freeze_data_type(&property.data_type.require()?)?,
                optional: property.optional,
                modifiers: Vec::new(),
                validations: Vec::new(),
                keys_matching_this_foreign_key: Default::default(),
                foreign_keys_matching_this_key: Default::default(),
            };
            self.model.properties.push(shell);
        }

        for (id, reference) in scaffold.references() {
            let association = match reference.origin {
                ReferenceOrigin::AssociationEnd { association, position } => Some((association, position)),
                ReferenceOrigin::Signature { .. } => None,
            };
            let shell = ReferenceProperty {
                info: self.info(reference.decl)?,
                owner: resolved(&reference.owner.require()?, "reference owner")?,
                name: reference.name.text.clone(),
                ordinal: ordinals.get(&MemberRef::Reference(id)).copied().unwrap_or_default(),
                target: resolved(&reference.target.require()?, "reference target")?,
                multiplicity: reference
                    .multiplicity
                    .ok_or_else(|| CompileError::unresolved("multiplicity"))?,
                modifiers: Vec::new(),
                order_by: Vec::new(),
                association,
                opposite: None,
            };
            self.model.references.push(shell);
        }

        for (_, association) in scaffold.associations() {
            let shell = Association {
                info: self.info(association.decl)?,
                name: association.name.text.clone(),
                package: association.package.clone(),
                qualified_name: association.qualified_name.clone(),
                ends: association.ends,
                criteria: None,
            };
            self.model.associations.push(shell);
        }

        for (_, projection) in scaffold.projections() {
            let shell = Projection {
                info: self.info(projection.decl)?,
                name: projection.name.text.clone(),
                package: projection.package.clone(),
                qualified_name: projection.qualified_name.clone(),
                classifier: resolved(&projection.classifier.require()?, "projection classifier")?,
                children: Vec::new(),
            };
            self.model.projections.push(shell);
        }

        for (_, node) in scaffold.projection_nodes() {
            let member = resolved(&node.member.require()?, "projection member")?;
            let kind = match (&node.shape, member) {
                (ProjectionShape::Leaf { header }, MemberRef::DataType(property)) => ProjectionNodeKind::DataType {
                    property,
                    header: header.clone(),
                },
                (ProjectionShape::Nested { .. }, MemberRef::Reference(reference)) => ProjectionNodeKind::Reference {
                    reference,
                    children: Vec::new(),
                },
                (ProjectionShape::ProjectionRef(_), MemberRef::Reference(reference)) => {
                    ProjectionNodeKind::ProjectionRef {
                        reference,
                        projection: resolved(&node.projection.require()?, "referenced projection")?,
                    }
                }
                _ => return Err(CompileError::unresolved("projection member kind")),
            };
            let shell = ProjectionNode {
                info: self.info(node.decl)?,
                name: node.name.text.clone(),
                parent: node.parent,
                kind,
            };
            self.model.projection_nodes.push(shell);
        }

        for (_, group) in scaffold.service_groups() {
            let shell = ServiceGroup {
                info: self.info(group.decl)?,
                class: resolved(&group.class.require()?, "service group class")?,
                urls: Vec::new(),
            };
            self.model.service_groups.push(shell);
        }

        for (_, url) in scaffold.urls() {
            let shell = Url {
                info: self.info(url.decl)?,
                group: url.group,
                text: url.text.clone(),
                path: url
                    .path
                    .iter()
                    .map(|segment| match segment {
                        scaffold::UrlSegment::Constant(name) => UrlSegment::Constant(name.text.clone()),
                        scaffold::UrlSegment::Parameter(id) => UrlSegment::Parameter(*id),
                    })
                    .collect(),
                query: url.query.clone(),
                services: Vec::new(),
            };
            self.model.urls.push(shell);
        }

        for (_, parameter) in scaffold.parameters() {
            let shell = Parameter {
                info: self.info(parameter.decl)?,
                url: parameter.url,
                name: parameter.name.text.clone(),
                data_type: freeze_data_type(&parameter.data_type.require()?)?,
                multiplicity: parameter.multiplicity,
                modifiers: Vec::new(),
            };
            self.model.parameters.push(shell);
        }

        for (_, service) in scaffold.services() {
            let projection: Option<ProjectionId> = match service.projection.get() {
                Some(resolution) => Some(resolved(resolution, "service projection")?),
                None => None,
            };
            let shell = Service {
                info: self.info(service.decl)?,
                url: service.url,
                verb: service.verb,
                multiplicity: service.multiplicity,
                projection,
                criteria: Vec::new(),
                order_by: Vec::new(),
            };
            self.model.services.push(shell);
        }

        self.register_names();
        tracing::debug!(
            classifiers = self.model.classifiers.len(),
            properties = self.model.properties.len(),
            references = self.model.references.len(),
            "shells built"
        );
        Ok(self.into_state())
    }

    fn register_names(&mut self) {
        let model = &mut self.model;
        let named = model
            .classifiers
            .iter()
            .zip(0..)
            .map(|(c, i)| (&c.name, &c.qualified_name, TopLevelElement::Classifier(ClassifierId::next(i))))
            .chain(model.enumerations.iter().zip(0..).map(|(e, i)| {
                (&e.name, &e.qualified_name, TopLevelElement::Enumeration(super::ids::EnumerationId::next(i)))
            }))
            .chain(model.associations.iter().zip(0..).map(|(a, i)| {
                (&a.name, &a.qualified_name, TopLevelElement::Association(super::ids::AssociationId::next(i)))
            }))
            .chain(
                model
                    .projections
                    .iter()
                    .zip(0..)
                    .map(|(p, i)| (&p.name, &p.qualified_name, TopLevelElement::Projection(ProjectionId::next(i)))),
            );
        let mut by_name = rustc_hash::FxHashMap::default();
        let mut by_qualified_name = rustc_hash::FxHashMap::default();
        for (name, qualified_name, element) in named {
            by_name.insert(name.clone(), element);
            by_qualified_name.insert(qualified_name.clone(), element);
        }
        model.by_name = by_name;
        model.by_qualified_name = by_qualified_name;
    }
}

// ============================================================================
// PASS 2: CHILDREN
// ============================================================================

impl<'s> Freeze<'s, ShellBuilt> {
    /// Wire collections and cross-references between the shells.
    pub fn build_children(mut self) -> Result<Freeze<'s, ChildrenWired>, CompileError> {
        let _span = tracing::debug_span!("build_children").entered();
        let scaffold = self.scaffold;

        for (id, classifier) in scaffold.classifiers() {
            let super_class = match classifier.super_class.require()? {
                Some(resolution) => Some(resolved(&resolution, "super class")?),
                None => None,
            };
            let interfaces = classifier
                .interfaces
                .require()?
                .iter()
                .map(|resolution| resolved(resolution, "interface"))
                .collect::<Result<Vec<_>, _>>()?;

            let shell = &mut self.model.classifiers[id.as_usize()];
            shell.modifiers = freeze_modifiers(&classifier.modifiers);
            shell.super_class = super_class;
            shell.interfaces = interfaces;
            shell.members = classifier.members.clone();

            if let Some(super_class) = super_class {
                self.model.classifiers[super_class.as_usize()].sub_classes.push(id);
            }
        }

        for (id, property) in scaffold.properties() {
            let shell = &mut self.model.properties[id.as_usize()];
            shell.modifiers = freeze_modifiers(&property.modifiers);
            shell.validations = property
                .validations
                .iter()
                .map(|v| Validation {
                    kind: v.kind,
                    value: v.value,
                })
                .collect();
            shell.keys_matching_this_foreign_key = property.keys_matching_this_foreign_key.clone();
            shell.foreign_keys_matching_this_key = property.foreign_keys_matching_this_key.clone();
        }

        for (id, reference) in scaffold.references() {
            let order_by = freeze_order_by(&reference.order_by)?;
            let shell = &mut self.model.references[id.as_usize()];
            shell.modifiers = freeze_modifiers(&reference.modifiers);
            shell.order_by = order_by;
            if reference.is_association_end() {
                let opposite = reference.opposite.require()?;
                wire_once(&mut shell.opposite, opposite, "opposite")?;
            }
        }

        for (id, association) in scaffold.associations() {
            let criteria = match association.criteria.get() {
                Some(criteria) => Some(freeze_criteria(criteria)?),
                None => None,
            };
            self.model.associations[id.as_usize()].criteria = criteria;
        }

        for (id, projection) in scaffold.projections() {
            self.model.projections[id.as_usize()].children = projection.children.clone();
        }
        for (id, node) in scaffold.projection_nodes() {
            if let ProjectionNodeKind::Reference { children, .. } = &mut self.model.projection_nodes[id.as_usize()].kind {
                *children = node.children().to_vec();
            }
        }

        for (id, group) in scaffold.service_groups() {
            self.model.service_groups[id.as_usize()].urls = group.urls.clone();
        }
        for (id, url) in scaffold.urls() {
            self.model.urls[id.as_usize()].services = url.services.clone();
        }
        for (id, parameter) in scaffold.parameters() {
            self.model.parameters[id.as_usize()].modifiers = freeze_modifiers(&parameter.modifiers);
        }
        for (id, service) in scaffold.services() {
            let mut criteria = Vec::with_capacity(service.criteria.len());
            for clause in &service.criteria {
                let tree = clause
                    .criteria
                    .get()
                    .ok_or_else(|| CompileError::unresolved("service criteria"))?;
                criteria.push(ServiceCriteria {
                    info: self.info(clause.decl)?,
                    keyword: clause.keyword,
                    criteria: freeze_criteria(tree)?,
                });
            }
            let order_by = freeze_order_by(&service.order_by)?;
            let shell = &mut self.model.services[id.as_usize()];
            shell.criteria = criteria;
            shell.order_by = order_by;
        }

        tracing::debug!("children wired");
        Ok(self.into_state())
    }
}

impl Freeze<'_, ChildrenWired> {
    pub fn into_model(self) -> DomainModel {
        self.model
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn resolved<T: Copy>(resolution: &Resolution<T>, what: &'static str) -> Result<T, CompileError> {
    resolution.resolved().ok_or_else(|| CompileError::unresolved(what))
}

fn wire_once<T>(slot: &mut Option<T>, value: T, field: &'static str) -> Result<(), CompileError> {
    if slot.is_some() {
        return Err(CompileError::WriteOnceViolated { field });
    }
    *slot = Some(value);
    Ok(())
}

fn freeze_data_type(data_type: &scaffold::DataType) -> Result<DataType, CompileError> {
    match data_type {
        scaffold::DataType::Primitive(primitive) => Ok(DataType::Primitive(*primitive)),
        scaffold::DataType::Enumeration(resolution) => Ok(DataType::Enumeration(resolved(resolution, "enumeration")?)),
    }
}

fn freeze_modifiers(modifiers: &[ModifierScaffold]) -> Vec<Modifier> {
    modifiers
        .iter()
        .zip(0..)
        .map(|(modifier, ordinal)| Modifier {
            keyword: modifier.keyword.clone(),
            ordinal,
        })
        .collect()
}

fn freeze_order_by(order_by: &[OrderByMemberScaffold]) -> Result<Vec<OrderBy>, CompileError> {
    order_by
        .iter()
        .map(|member| {
            let path = member.path.get().ok_or_else(|| CompileError::unresolved("order-by path"))?;
            Ok(OrderBy {
                path: freeze_member_path(path)?,
                direction: member.direction,
            })
        })
        .collect()
}

fn freeze_member_path(member: &MemberReference) -> Result<MemberPath, CompileError> {
    if member.failure.is_some() {
        return Err(CompileError::unresolved("member path"));
    }
    Ok(MemberPath {
        classifier: resolved(&member.classifier, "member path classifier")?,
        ends: member.ends.clone(),
        property: resolved(&member.property, "member path property")?,
    })
}

fn freeze_variable(variable: &VariableReference) -> Result<ParameterId, CompileError> {
    resolved(&variable.parameter, "criteria parameter")
}

fn freeze_criteria(criteria: &Criteria<Scaffolded>) -> Result<Criteria<Frozen>, CompileError> {
    criteria.try_map::<Frozen, CompileError>(&freeze_member_path, &freeze_variable)
}

/// Each member's position in its owner's member list.
fn member_ordinals(scaffold: &Scaffold) -> rustc_hash::FxHashMap<MemberRef, u32> {
    scaffold
        .classifiers()
        .flat_map(|(_, classifier)| classifier.members.iter().copied().zip(0..))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::test_support::scaffold_and_sources;
    use crate::hir::types::Multiplicity;

    const QUESTIONS: &str = "package p\n\
        class Question { id: Long key; title: String; }\n\
        class Answer { id: Long key; questionId: Long; }\n\
        association QuestionHasAnswers {\n\
            question: Question[1..1];\n\
            answers: Answer[0..*] orderBy: this.id descending;\n\
            relationship this.id == Answer.questionId\n\
        }";

    #[test]
    fn test_two_pass_freeze() {
        let (sources, scaffold) = scaffold_and_sources(&[QUESTIONS]);

        let shells = Freeze::new(&scaffold, &sources).build().unwrap();
        let answers_end = scaffold.association(crate::hir::ids::AssociationId::new(0)).ends[1];
        assert_eq!(shells.model.reference(answers_end).opposite, None);
        assert!(shells.model.classifiers[0].members.is_empty());

        let model = shells.build_children().unwrap().into_model();
        let end = model.end_view(answers_end);
        assert_eq!(end.name(), "answers");
        assert_eq!(end.multiplicity(), Multiplicity::ZeroToMany);
        assert_eq!(end.owner().name(), "Question");
        assert_eq!(end.opposite().map(|o| o.name()), Some("question"));
        assert_eq!(end.opposite().and_then(|o| o.opposite()).map(|o| o.id()), Some(answers_end));
        assert_eq!(end.element().order_by.len(), 1);
    }

    #[test]
    fn test_member_ordinals_follow_declaration_order() {
        let (sources, scaffold) = scaffold_and_sources(&[QUESTIONS]);
        let model = freeze(&scaffold, &sources).unwrap();

        let question = model.classifier_named("p.Question").unwrap();
        let ordinals: Vec<_> = question.data_type_properties().map(|p| p.element().ordinal).collect();
        assert_eq!(ordinals, vec![0, 1]);
        assert_eq!(question.end("answers").unwrap().element().ordinal, 2);
    }

    #[test]
    fn test_unresolved_reference_is_fatal() {
        let (sources, scaffold) = scaffold_and_sources(&["package p\nclass A { id: Long key; b: Missing; }"]);

        let err = Freeze::new(&scaffold, &sources).build().unwrap_err();
        assert!(matches!(err, CompileError::UnresolvedAfterCheck { ref what } if what == "enumeration"));
    }

    #[test]
    fn test_subclasses_are_wired() {
        let (sources, scaffold) = scaffold_and_sources(&[
            "package p\nclass Node abstract { id: Long key; }\nclass Leaf extends Node { }\nclass Branch extends Node { }",
        ]);
        let model = freeze(&scaffold, &sources).unwrap();

        let node = model.classifier_named("Node").unwrap();
        let subs: Vec<_> = node.sub_classes().map(|c| c.name()).collect();
        assert_eq!(subs, vec!["Leaf", "Branch"]);
        assert_eq!(model.classifier_named("Leaf").unwrap().super_class().map(|c| c.id()), Some(node.id()));
    }
}
