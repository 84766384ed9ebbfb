//! Lowering: syntax trees to scaffold elements.
//!
//! A [`Lowerer`] walks one compilation unit and allocates a declaration
//! header plus a scaffold element for every declaration it finds. Macro
//! units go through the same walker, which stamps their macro element on
//! every header it creates.

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use crate::syntax::ast::{self, AstNode};
use crate::syntax::{SyntaxNode, SyntaxToken};

use super::decl::{DeclHeader, DeclKind, WriteOnce};
use super::ids::{
    AssociationId, ClassifierId, DeclId, ParameterId, ProjectionNodeId, ReferenceId, ServiceGroupId,
    ServiceId, UrlId,
};
use super::input::{CompilationUnit, SourceRoot};
use super::resolve::Resolution;
use super::scaffold::{
    AssociationScaffold, ClassifierScaffold, DataTypePropertyScaffold, EnumLiteralScaffold,
    EnumerationScaffold, MemberRef, ModifierScaffold, NameRef, OrderByMemberScaffold,
    ParameterScaffold, ProjectionNodeScaffold, ProjectionParent, ProjectionScaffold,
    ProjectionShape, ReferenceOrigin, ReferenceScaffold, Scaffold, ServiceCriteriaScaffold,
    ServiceGroupScaffold, ServiceScaffold, UrlScaffold, UrlSegment, ValidationScaffold,
};
use super::types::{
    ClassifierKind, CriteriaKeyword, EndPosition, InheritanceStrategy, Multiplicity,
    OrderByDirection, ServiceMultiplicity, ValidationKind, Verb,
};

/// Lower every source unit, in registration order.
pub fn lower_source_units(sources: &SourceRoot, scaffold: &mut Scaffold, separator: char) {
    let _span = tracing::debug_span!("scaffold").entered();
    for unit in sources.source_units() {
        Lowerer::new(unit, scaffold, separator).lower_unit();
    }
    tracing::debug!(declarations = scaffold.decls.len(), "scaffold built");
}

/// Lower a macro unit of class body members into `owner`.
pub fn lower_members(unit: &CompilationUnit, scaffold: &mut Scaffold, owner: ClassifierId) -> Vec<MemberRef> {
    let Some(body) = ast::MacroBody::cast(unit.syntax()) else {
        return Vec::new();
    };
    let owner_decl = scaffold.classifier(owner).decl;
    let mut lowerer = Lowerer::new(unit, scaffold, '.');
    let members: Vec<_> = body
        .members()
        .filter_map(|member| lowerer.lower_member(owner, owner_decl, &member))
        .collect();
    scaffold.classifier_mut(owner).members.extend(members.iter().copied());
    members
}

/// Lower a macro unit holding one service criteria clause into `service`.
pub fn lower_service_criteria(unit: &CompilationUnit, scaffold: &mut Scaffold, service: ServiceId) -> bool {
    let Some(clause) = ast::MacroBody::cast(unit.syntax()).and_then(|body| body.service_criteria()) else {
        return false;
    };
    let surrounding = service_surrounding(scaffold, service);
    let lowered = Lowerer::new(unit, scaffold, '.').lower_criteria_clause(&clause, surrounding);
    match lowered {
        Some(criteria) => {
            scaffold.service_mut(service).criteria.push(criteria);
            true
        }
        None => false,
    }
}

fn service_surrounding(scaffold: &Scaffold, service: ServiceId) -> Vec<DeclId> {
    let service = scaffold.service(service);
    let url = scaffold.url(service.url);
    let group = scaffold.service_group(url.group);
    vec![service.decl, url.decl, group.decl]
}

// ============================================================================
// LOWERER
// ============================================================================

pub struct Lowerer<'a> {
    unit: &'a CompilationUnit,
    scaffold: &'a mut Scaffold,
    package: SmolStr,
    separator: char,
    macro_origin: Option<DeclId>,
}

impl<'a> Lowerer<'a> {
    pub fn new(unit: &'a CompilationUnit, scaffold: &'a mut Scaffold, separator: char) -> Self {
        Self {
            unit,
            scaffold,
            package: SmolStr::default(),
            separator,
            macro_origin: unit.macro_element(),
        }
    }

    fn decl(&mut self, kind: DeclKind, range: TextRange, surrounding: Vec<DeclId>) -> DeclId {
        self.scaffold.alloc_decl(DeclHeader {
            kind,
            unit: self.unit.id(),
            range,
            macro_origin: self.macro_origin,
            surrounding,
        })
    }

    fn qualify(&self, name: &str) -> SmolStr {
        if self.package.is_empty() {
            SmolStr::new(name)
        } else {
            SmolStr::new(format!("{}{}{}", self.package, self.separator, name))
        }
    }

    pub fn lower_unit(&mut self) {
        let Some(file) = ast::SourceFile::cast(self.unit.syntax()) else {
            return;
        };
        self.package = file
            .package()
            .and_then(|p| p.name())
            .map(|name| SmolStr::new(name.text(self.separator)))
            .unwrap_or_default();

        for item in file.items() {
            match item {
                ast::Item::Classifier(it) => self.lower_classifier(&it),
                ast::Item::Enumeration(it) => self.lower_enumeration(&it),
                ast::Item::Association(it) => self.lower_association(&it),
                ast::Item::Projection(it) => self.lower_projection(&it),
                ast::Item::ServiceGroup(it) => self.lower_service_group(&it),
            }
        }
    }

    // ------------------------------------------------------------------------
    // Classifiers
    // ------------------------------------------------------------------------

    fn lower_classifier(&mut self, syntax: &ast::ClassifierDecl) {
        let Some(name) = syntax.name().map(|t| name_ref(&t)) else {
            return;
        };
        let decl = self.decl(DeclKind::Classifier, node_range(syntax.syntax()), Vec::new());
        let kind = if syntax.is_interface() {
            ClassifierKind::Interface
        } else if syntax.is_user() {
            ClassifierKind::User
        } else {
            ClassifierKind::Class
        };
        let abstract_clause = syntax.abstract_clause();
        let strategy = abstract_clause
            .as_ref()
            .and_then(|clause| clause.strategy())
            .and_then(|text| InheritanceStrategy::from_keyword(&text))
            .unwrap_or_default();
        let modifiers = syntax
            .modifiers()
            .filter_map(|m| m.keyword())
            .map(|keyword| self.modifier(DeclKind::ClassifierModifier, &keyword, vec![decl]))
            .collect();
        let super_class_ref = syntax
            .extends_clause()
            .and_then(|clause| clause.classifier())
            .and_then(|c| c.name())
            .map(|t| name_ref(&t));
        let interface_refs = syntax
            .implements_clause()
            .map(|clause| {
                clause
                    .classifiers()
                    .filter_map(|c| c.name())
                    .map(|t| name_ref(&t))
                    .collect()
            })
            .unwrap_or_default();

        let qualified_name = self.qualify(&name.text);
        let id = self.scaffold.alloc_classifier(ClassifierScaffold {
            decl,
            kind,
            name,
            package: self.package.clone(),
            qualified_name,
            is_abstract: abstract_clause.is_some(),
            strategy,
            modifiers,
            super_class_ref,
            interface_refs,
            super_class: WriteOnce::new("super_class"),
            interfaces: WriteOnce::new("interfaces"),
            members: Vec::new(),
        });

        let members: Vec<_> = syntax
            .body()
            .into_iter()
            .flat_map(|body| body.members())
            .filter_map(|member| self.lower_member(id, decl, &member))
            .collect();
        self.scaffold.classifier_mut(id).members = members;
    }

    fn modifier(&mut self, kind: DeclKind, keyword: &SyntaxToken, surrounding: Vec<DeclId>) -> ModifierScaffold {
        let range = keyword.text_range();
        ModifierScaffold {
            decl: self.decl(kind, range, surrounding),
            keyword: SmolStr::new(keyword.text()),
            range,
        }
    }

    fn property_modifiers(
        &mut self,
        modifiers: impl Iterator<Item = ast::PropertyModifier>,
        surrounding: &[DeclId],
    ) -> Vec<ModifierScaffold> {
        modifiers
            .filter_map(|m| m.keyword())
            .map(|keyword| self.modifier(DeclKind::PropertyModifier, &keyword, surrounding.to_vec()))
            .collect()
    }

    /// Lower a class body member into `owner`. The caller adds the result to
    /// the owner's member list.
    pub fn lower_member(&mut self, owner: ClassifierId, owner_decl: DeclId, member: &ast::Member) -> Option<MemberRef> {
        let name = member.name().map(|t| name_ref(&t))?;
        let type_ref = member.type_ref().and_then(|t| t.name()).map(|t| name_ref(&t));
        let range = node_range(member.syntax());

        if member.is_reference() {
            let decl = self.decl(DeclKind::ReferenceProperty, range, vec![owner_decl]);
            let modifiers = self.property_modifiers(member.modifiers(), &[decl, owner_decl]);
            let (order_by, order_by_range) = self.order_by(member.order_by(), &[decl, owner_decl]);
            let (bounds, multiplicity, multiplicity_range) = multiplicity(member.multiplicity());
            let id = self.scaffold.alloc_reference(ReferenceScaffold {
                decl,
                origin: ReferenceOrigin::Signature { owner },
                name,
                type_ref,
                bounds,
                multiplicity,
                multiplicity_range,
                modifiers,
                order_by,
                order_by_range,
                target: WriteOnce::new("target"),
                owner: WriteOnce::entered("owner", Resolution::Resolved(owner)),
                opposite: WriteOnce::new("opposite"),
            });
            return Some(MemberRef::Reference(id));
        }

        let decl = self.decl(DeclKind::DataTypeProperty, range, vec![owner_decl]);
        let modifiers = self.property_modifiers(member.modifiers(), &[decl, owner_decl]);
        let validations = member
            .validations()
            .filter_map(|validation| {
                let keyword = validation.keyword()?;
                let kind = ValidationKind::from_keyword(keyword.text())?;
                let range = node_range(validation.syntax());
                Some(ValidationScaffold {
                    decl: self.decl(DeclKind::Validation, range, vec![decl, owner_decl]),
                    kind,
                    value: validation.value().and_then(|v| v.text().parse().ok()),
                    range,
                })
            })
            .collect();
        let id = self.scaffold.alloc_property(DataTypePropertyScaffold {
            decl,
            owner,
            name,
            type_ref,
            optional: member.is_optional(),
            modifiers,
            validations,
            data_type: WriteOnce::new("data_type"),
            keys_matching_this_foreign_key: Default::default(),
            foreign_keys_matching_this_key: Default::default(),
        });
        Some(MemberRef::DataType(id))
    }

    fn order_by(
        &mut self,
        order_by: Option<ast::OrderBy>,
        surrounding: &[DeclId],
    ) -> (Vec<OrderByMemberScaffold>, Option<TextRange>) {
        let Some(order_by) = order_by else {
            return (Vec::new(), None);
        };
        let members = order_by
            .members()
            .map(|member| {
                let segments = member
                    .path()
                    .map(|path| path.segments().iter().map(name_ref).collect())
                    .unwrap_or_default();
                let direction = match member.direction() {
                    Some(token) if token.text() == "descending" => OrderByDirection::Descending,
                    _ => OrderByDirection::Ascending,
                };
                OrderByMemberScaffold {
                    decl: self.decl(DeclKind::OrderByMember, node_range(member.syntax()), surrounding.to_vec()),
                    segments,
                    direction,
                    path: WriteOnce::new("order_by_path"),
                }
            })
            .collect();
        (members, Some(node_range(order_by.syntax())))
    }

    // ------------------------------------------------------------------------
    // Enumerations and associations
    // ------------------------------------------------------------------------

    fn lower_enumeration(&mut self, syntax: &ast::EnumerationDecl) {
        let Some(name) = syntax.name().map(|t| name_ref(&t)) else {
            return;
        };
        let decl = self.decl(DeclKind::Enumeration, node_range(syntax.syntax()), Vec::new());
        let literals = syntax
            .literals()
            .filter_map(|literal| {
                let literal_name = literal.name().map(|t| name_ref(&t))?;
                Some(EnumLiteralScaffold {
                    decl: self.decl(DeclKind::EnumerationLiteral, node_range(literal.syntax()), vec![decl]),
                    name: literal_name,
                    pretty_name: literal.pretty_name().map(|t| unquote(t.text())),
                })
            })
            .collect();
        let qualified_name = self.qualify(&name.text);
        self.scaffold.alloc_enumeration(EnumerationScaffold {
            decl,
            name,
            package: self.package.clone(),
            qualified_name,
            literals,
        });
    }

    fn lower_association(&mut self, syntax: &ast::AssociationDecl) {
        let Some(name) = syntax.name().map(|t| name_ref(&t)) else {
            return;
        };
        let ends: Vec<_> = syntax.ends().collect();
        let [source, target] = ends.as_slice() else {
            // Reported as a syntax error.
            return;
        };
        let decl = self.decl(DeclKind::Association, node_range(syntax.syntax()), Vec::new());

        // The association is allocated right after its ends.
        let association = AssociationId::next(self.scaffold.associations().len());
        let ends = [
            self.lower_association_end(association, EndPosition::Source, source, decl),
            self.lower_association_end(association, EndPosition::Target, target, decl),
        ];
        let qualified_name = self.qualify(&name.text);
        self.scaffold.alloc_association(AssociationScaffold {
            decl,
            name,
            package: self.package.clone(),
            qualified_name,
            ends,
            relationship: syntax.relationship().and_then(|r| r.criteria()),
            criteria: WriteOnce::new("association_criteria"),
        });
    }

    fn lower_association_end(
        &mut self,
        association: AssociationId,
        position: EndPosition,
        syntax: &ast::AssociationEnd,
        association_decl: DeclId,
    ) -> ReferenceId {
        let range = node_range(syntax.syntax());
        let name = syntax
            .name()
            .map(|t| name_ref(&t))
            .unwrap_or_else(|| NameRef::new("", TextRange::empty(range.start())));
        let decl = self.decl(DeclKind::ReferenceProperty, range, vec![association_decl]);
        let modifiers = self.property_modifiers(syntax.modifiers(), &[decl, association_decl]);
        let (order_by, order_by_range) = self.order_by(syntax.order_by(), &[decl, association_decl]);
        let (bounds, multiplicity, multiplicity_range) = multiplicity(syntax.multiplicity());
        self.scaffold.alloc_reference(ReferenceScaffold {
            decl,
            origin: ReferenceOrigin::AssociationEnd { association, position },
            name,
            type_ref: syntax.type_ref().and_then(|t| t.name()).map(|t| name_ref(&t)),
            bounds,
            multiplicity,
            multiplicity_range,
            modifiers,
            order_by,
            order_by_range,
            target: WriteOnce::new("target"),
            owner: WriteOnce::new("owner"),
            opposite: WriteOnce::new("opposite"),
        })
    }

    // ------------------------------------------------------------------------
    // Projections
    // ------------------------------------------------------------------------

    fn lower_projection(&mut self, syntax: &ast::ProjectionDecl) {
        let Some(name) = syntax.name().map(|t| name_ref(&t)) else {
            return;
        };
        let decl = self.decl(DeclKind::Projection, node_range(syntax.syntax()), Vec::new());
        let qualified_name = self.qualify(&name.text);
        let id = self.scaffold.alloc_projection(ProjectionScaffold {
            decl,
            name,
            package: self.package.clone(),
            qualified_name,
            classifier_ref: syntax.classifier().and_then(|c| c.name()).map(|t| name_ref(&t)),
            classifier: WriteOnce::new("projection_classifier"),
            children: Vec::new(),
        });
        let children = self.lower_projection_body(syntax.body(), ProjectionParent::Projection(id), &[decl]);
        self.scaffold.projection_mut(id).children = children;
    }

    fn lower_projection_body(
        &mut self,
        body: Option<ast::ProjectionBody>,
        parent: ProjectionParent,
        surrounding: &[DeclId],
    ) -> Vec<ProjectionNodeId> {
        body.into_iter()
            .flat_map(|body| body.members())
            .filter_map(|member| self.lower_projection_member(&member, parent, surrounding))
            .collect()
    }

    fn lower_projection_member(
        &mut self,
        member: &ast::ProjectionMember,
        parent: ProjectionParent,
        surrounding: &[DeclId],
    ) -> Option<ProjectionNodeId> {
        let name = member.name().map(|t| name_ref(&t))?;
        let kind = member.kind()?;
        let decl = self.decl(DeclKind::ProjectionMember, node_range(member.syntax()), surrounding.to_vec());
        let (shape, nested) = match kind {
            ast::ProjectionMemberKind::Leaf(header) => (
                ProjectionShape::Leaf {
                    header: unquote(header.text()),
                },
                None,
            ),
            ast::ProjectionMemberKind::ProjectionRef(token) => {
                (ProjectionShape::ProjectionRef(name_ref(&token)), None)
            }
            ast::ProjectionMemberKind::Nested(body) => {
                (ProjectionShape::Nested { children: Vec::new() }, Some(body))
            }
        };
        let id = self.scaffold.alloc_projection_node(ProjectionNodeScaffold {
            decl,
            name,
            parent,
            shape,
            member: WriteOnce::new("projection_member"),
            projection: WriteOnce::new("projection_reference"),
        });
        if let Some(body) = nested {
            let mut inner = vec![decl];
            inner.extend_from_slice(surrounding);
            let children = self.lower_projection_body(Some(body), ProjectionParent::Node(id), &inner);
            self.scaffold.projection_node_mut(id).shape = ProjectionShape::Nested { children };
        }
        Some(id)
    }

    // ------------------------------------------------------------------------
    // Services
    // ------------------------------------------------------------------------

    fn lower_service_group(&mut self, syntax: &ast::ServiceGroupDecl) {
        let decl = self.decl(DeclKind::ServiceGroup, node_range(syntax.syntax()), Vec::new());
        let id = self.scaffold.alloc_service_group(ServiceGroupScaffold {
            decl,
            class_ref: syntax.classifier().and_then(|c| c.name()).map(|t| name_ref(&t)),
            class: WriteOnce::new("service_group_class"),
            urls: Vec::new(),
        });
        let urls = syntax.urls().map(|url| self.lower_url(id, decl, &url)).collect();
        self.scaffold.service_group_mut(id).urls = urls;
    }

    fn lower_url(&mut self, group: ServiceGroupId, group_decl: DeclId, syntax: &ast::UrlDecl) -> UrlId {
        let range = syntax
            .path()
            .map_or_else(|| node_range(syntax.syntax()), |path| node_range(path.syntax()));
        let decl = self.decl(DeclKind::Url, range, vec![group_decl]);
        let id = self.scaffold.alloc_url(UrlScaffold {
            decl,
            group,
            text: SmolStr::default(),
            path: Vec::new(),
            query: Vec::new(),
            services: Vec::new(),
        });

        let surrounding = [decl, group_decl];
        let mut text = String::new();
        let mut path = Vec::new();
        for element in syntax.path().into_iter().flat_map(|p| p.elements()) {
            text.push('/');
            match element {
                ast::UrlElement::Constant(token) => {
                    text.push_str(token.text());
                    path.push(UrlSegment::Constant(name_ref(&token)));
                }
                ast::UrlElement::Parameter(parameter) => {
                    let name = parameter.name().map(|t| t.text().to_string()).unwrap_or_default();
                    text.push_str(&format!("{{{name}}}"));
                    path.push(UrlSegment::Parameter(self.lower_parameter(id, &parameter, &surrounding)));
                }
            }
        }
        let query = syntax
            .query_parameters()
            .map(|parameter| self.lower_parameter(id, &parameter, &surrounding))
            .collect();
        let services = syntax
            .services()
            .filter_map(|service| self.lower_service(id, &service, &surrounding))
            .collect();

        let url = self.scaffold.url_mut(id);
        url.text = SmolStr::new(text);
        url.path = path;
        url.query = query;
        url.services = services;
        id
    }

    fn lower_parameter(&mut self, url: UrlId, syntax: &ast::UrlParameter, surrounding: &[DeclId]) -> ParameterId {
        let range = node_range(syntax.syntax());
        let decl = self.decl(DeclKind::UrlParameter, range, surrounding.to_vec());
        let modifiers = self.property_modifiers(syntax.modifiers(), &[decl]);
        let name = syntax
            .name()
            .map(|t| name_ref(&t))
            .unwrap_or_else(|| NameRef::new("", TextRange::empty(range.start())));
        let (_, multiplicity, _) = multiplicity(syntax.multiplicity());
        self.scaffold.alloc_parameter(ParameterScaffold {
            decl,
            url,
            name,
            type_ref: syntax.type_ref().and_then(|t| t.name()).map(|t| name_ref(&t)),
            multiplicity,
            modifiers,
            data_type: WriteOnce::new("parameter_type"),
        })
    }

    fn lower_service(&mut self, url: UrlId, syntax: &ast::ServiceDecl, surrounding: &[DeclId]) -> Option<ServiceId> {
        let verb_token = syntax.verb()?;
        let verb = Verb::from_keyword(verb_token.text())?;
        let decl = self.decl(DeclKind::Service, node_range(syntax.syntax()), surrounding.to_vec());

        let mut inner = vec![decl];
        inner.extend_from_slice(surrounding);
        let criteria = syntax
            .criteria()
            .filter_map(|clause| self.lower_criteria_clause(&clause, inner.clone()))
            .collect();
        let (order_by, _) = self.order_by(syntax.order_by(), &inner);
        let multiplicity = match syntax.multiplicity() {
            Some(token) if token.text() == "one" => ServiceMultiplicity::One,
            Some(_) => ServiceMultiplicity::Many,
            None => ServiceMultiplicity::default(),
        };

        Some(self.scaffold.alloc_service(ServiceScaffold {
            decl,
            url,
            verb,
            verb_range: verb_token.text_range(),
            multiplicity,
            projection_ref: syntax.projection().map(|t| name_ref(&t)),
            projection: WriteOnce::new("service_projection"),
            criteria,
            order_by,
        }))
    }

    fn lower_criteria_clause(
        &mut self,
        clause: &ast::ServiceCriteria,
        surrounding: Vec<DeclId>,
    ) -> Option<ServiceCriteriaScaffold> {
        let keyword_token = clause.keyword()?;
        let keyword = CriteriaKeyword::from_keyword(keyword_token.text())?;
        let syntax = clause.criteria()?;
        Some(ServiceCriteriaScaffold {
            decl: self.decl(DeclKind::ServiceCriteria, node_range(clause.syntax()), surrounding),
            keyword,
            keyword_range: keyword_token.text_range(),
            syntax,
            criteria: WriteOnce::new("service_criteria"),
        })
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn name_ref(token: &SyntaxToken) -> NameRef {
    NameRef::new(token.text(), token.text_range())
}

/// Range of a node without its leading and trailing trivia.
fn node_range(node: &SyntaxNode) -> TextRange {
    let tokens = || {
        node.descendants_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| !t.kind().is_trivia())
    };
    match (tokens().next(), tokens().last()) {
        (Some(first), Some(last)) => TextRange::new(first.text_range().start(), last.text_range().end()),
        _ => TextRange::empty(node.text_range().start()),
    }
}

fn unquote(text: &str) -> SmolStr {
    SmolStr::new(text.trim_matches('"'))
}

fn multiplicity(syntax: Option<ast::Multiplicity>) -> ((SmolStr, SmolStr), Option<Multiplicity>, TextRange) {
    let Some(syntax) = syntax else {
        return (Default::default(), None, TextRange::empty(TextSize::from(0)));
    };
    let (lower, upper) = syntax.bounds();
    let text = |t: Option<SyntaxToken>| t.map(|t| SmolStr::new(t.text())).unwrap_or_default();
    let (lower, upper) = (text(lower), text(upper));
    let multiplicity = Multiplicity::from_bounds(&lower, &upper);
    ((lower, upper), multiplicity, node_range(syntax.syntax()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::ids::PropertyId;
    use crate::syntax::parse_members;

    fn lower(text: &str) -> Scaffold {
        let mut sources = SourceRoot::new();
        sources.add_source("model.klass", text);
        let mut scaffold = Scaffold::new();
        lower_source_units(&sources, &mut scaffold, '.');
        scaffold
    }

    #[test]
    fn test_lower_classifier_members() {
        let scaffold = lower(
            "package com.example\n\
             class Answer abstract(table-per-class) implements Auditable audited {\n\
                 id: Long key id;\n\
                 body: String? maxLength(500);\n\
                 author: User[0..1] owned;\n\
             }",
        );
        let (_, answer) = scaffold.classifiers().next().unwrap();

        assert_eq!(answer.qualified_name, "com.example.Answer");
        assert!(answer.is_abstract);
        assert_eq!(answer.strategy, InheritanceStrategy::TablePerClass);
        assert!(answer.has_modifier("audited"));
        assert_eq!(answer.interface_refs[0].as_str(), "Auditable");
        assert_eq!(answer.data_type_properties().count(), 2);

        let body = scaffold.property(PropertyId::new(1));
        assert!(body.optional);
        assert_eq!(body.validations[0].value, Some(500));
        let author = scaffold.reference(answer.reference_properties().next().unwrap());
        assert_eq!(author.multiplicity, Some(Multiplicity::ZeroToOne));
        assert_eq!(author.resolved_owner(), Some(ClassifierId::new(0)));
    }

    #[test]
    fn test_surrounding_declarations() {
        let scaffold = lower("package p\nclass A { id: Long key; }");
        let property = scaffold.property(PropertyId::new(0));
        let header = scaffold.decls.get(property.decl).unwrap();

        assert_eq!(header.surrounding, vec![scaffold.classifier(ClassifierId::new(0)).decl]);
        assert!(!header.is_inferred());
    }

    #[test]
    fn test_lower_services() {
        let scaffold = lower(
            "package p\n\
             service Question {\n\
                 /question/{id: Long[1..1]}?{version: Integer[0..1]}\n\
                     GET { multiplicity: one; criteria: this.id == id; projection: QP; }\n\
                     PUT { criteria: this.id == id; }\n\
             }",
        );
        let (_, url) = scaffold.urls().next().unwrap();

        assert_eq!(url.text, "/question/{id}");
        assert_eq!(url.parameters().len(), 2);
        assert_eq!(url.services.len(), 2);
        let get = scaffold.service(url.services[0]);
        assert_eq!(get.verb, Verb::Get);
        assert_eq!(get.multiplicity, ServiceMultiplicity::One);
        assert!(get.has_criteria(CriteriaKeyword::Criteria));
        assert_eq!(scaffold.service(url.services[1]).multiplicity, ServiceMultiplicity::Many);
    }

    #[test]
    fn test_lower_nested_projection() {
        let scaffold = lower(
            "package p\n\
             projection QP on Question {\n\
                 title: \"Title\",\n\
                 answers: { body: \"Body\" },\n\
             }",
        );
        let (_, projection) = scaffold.projections().next().unwrap();
        assert_eq!(projection.children.len(), 2);

        let answers = scaffold.projection_node(projection.children[1]);
        assert_eq!(answers.children().len(), 1);
        let body = scaffold.projection_node(answers.children()[0]);
        assert_eq!(body.parent, ProjectionParent::Node(projection.children[1]));
        assert_eq!(body.shape, ProjectionShape::Leaf { header: "Body".into() });
    }

    #[test]
    fn test_macro_members_are_inferred() {
        let text = "package p\nclass A validTemporal { id: Long key; }";
        let mut sources = SourceRoot::new();
        sources.add_source("model.klass", text);
        let mut scaffold = Scaffold::new();
        lower_source_units(&sources, &mut scaffold, '.');

        let class = ClassifierId::new(0);
        let element = scaffold.classifier(class).modifiers[0].decl;
        let body = "valid: TemporalRange? valid private;";
        let file = sources
            .add_macro_unit("Temporal modifier macro", body, parse_members(body), element)
            .unwrap();
        let added = lower_members(sources.get(file).unwrap(), &mut scaffold, class);

        assert_eq!(added.len(), 1);
        let MemberRef::DataType(valid) = added[0] else {
            panic!("expected a data-type property");
        };
        let header = scaffold.decls.get(scaffold.property(valid).decl).unwrap();
        assert_eq!(header.macro_origin, Some(element));
        assert_eq!(scaffold.classifier(class).members.len(), 2);
    }
}
