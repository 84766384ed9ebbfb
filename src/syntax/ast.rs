//! Typed AST wrappers over the rowan CST.
//!
//! Each wrapper is a zero-cost newtype around a [`SyntaxNode`] of one kind.
//! Accessors return `Option` because the tree may be incomplete after a
//! syntax error.

use super::syntax_kind::{SyntaxKind, SyntaxNode, SyntaxToken};

use SyntaxKind::*;

/// A typed view of a syntax node.
pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;

    fn cast(node: SyntaxNode) -> Option<Self>;

    fn syntax(&self) -> &SyntaxNode;
}

macro_rules! ast_node {
    ($(#[$meta:meta])* $name:ident, $($kind:ident)|+) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl AstNode for $name {
            #[inline]
            fn can_cast(kind: SyntaxKind) -> bool {
                matches!(kind, $($kind)|+)
            }

            fn cast(node: SyntaxNode) -> Option<Self> {
                Self::can_cast(node.kind()).then(|| Self(node))
            }

            #[inline]
            fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

// ============================================================================
// HELPERS
// ============================================================================

fn child<N: AstNode>(parent: &SyntaxNode) -> Option<N> {
    parent.children().find_map(N::cast)
}

fn children<N: AstNode>(parent: &SyntaxNode) -> impl Iterator<Item = N> + use<N> {
    parent.children().filter_map(N::cast)
}

/// Direct child tokens of one kind, trivia excluded.
fn tokens(parent: &SyntaxNode, kind: SyntaxKind) -> impl Iterator<Item = SyntaxToken> + use<> {
    parent
        .children_with_tokens()
        .filter_map(|element| element.into_token())
        .filter(move |token| token.kind() == kind)
}

fn nth_ident(parent: &SyntaxNode, n: usize) -> Option<SyntaxToken> {
    tokens(parent, IDENT).nth(n)
}

// ============================================================================
// ROOTS
// ============================================================================

ast_node!(SourceFile, SOURCE_FILE);

impl SourceFile {
    pub fn package(&self) -> Option<PackageDecl> {
        child(&self.0)
    }

    pub fn items(&self) -> impl Iterator<Item = Item> + use<> {
        children(&self.0)
    }
}

ast_node!(
    /// Root of a macro unit.
    MacroBody,
    MACRO_BODY
);

impl MacroBody {
    pub fn members(&self) -> impl Iterator<Item = Member> + use<> {
        children(&self.0)
    }

    pub fn service_criteria(&self) -> Option<ServiceCriteria> {
        child(&self.0)
    }
}

ast_node!(PackageDecl, PACKAGE_DECL);

impl PackageDecl {
    pub fn name(&self) -> Option<QualifiedName> {
        child(&self.0)
    }
}

ast_node!(QualifiedName, QUALIFIED_NAME);

impl QualifiedName {
    /// Segments joined with `separator`.
    pub fn text(&self, separator: char) -> String {
        let mut out = String::new();
        for (i, segment) in tokens(&self.0, IDENT).enumerate() {
            if i > 0 {
                out.push(separator);
            }
            out.push_str(segment.text());
        }
        out
    }
}

/// Any top-level declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Item {
    Classifier(ClassifierDecl),
    Enumeration(EnumerationDecl),
    Association(AssociationDecl),
    Projection(ProjectionDecl),
    ServiceGroup(ServiceGroupDecl),
}

impl AstNode for Item {
    fn can_cast(kind: SyntaxKind) -> bool {
        ClassifierDecl::can_cast(kind)
            || matches!(
                kind,
                ENUMERATION_DECL | ASSOCIATION_DECL | PROJECTION_DECL | SERVICE_GROUP_DECL
            )
    }

    fn cast(node: SyntaxNode) -> Option<Self> {
        let item = match node.kind() {
            INTERFACE_DECL | CLASS_DECL => Item::Classifier(ClassifierDecl(node)),
            ENUMERATION_DECL => Item::Enumeration(EnumerationDecl(node)),
            ASSOCIATION_DECL => Item::Association(AssociationDecl(node)),
            PROJECTION_DECL => Item::Projection(ProjectionDecl(node)),
            SERVICE_GROUP_DECL => Item::ServiceGroup(ServiceGroupDecl(node)),
            _ => return None,
        };
        Some(item)
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Item::Classifier(it) => it.syntax(),
            Item::Enumeration(it) => it.syntax(),
            Item::Association(it) => it.syntax(),
            Item::Projection(it) => it.syntax(),
            Item::ServiceGroup(it) => it.syntax(),
        }
    }
}

// ============================================================================
// CLASSIFIERS
// ============================================================================

ast_node!(
    /// A `class`, `user` or `interface` declaration.
    ClassifierDecl,
    INTERFACE_DECL | CLASS_DECL
);

impl ClassifierDecl {
    pub fn is_interface(&self) -> bool {
        self.0.kind() == INTERFACE_DECL
    }

    /// `user` classes are classes with a user-identity role.
    pub fn is_user(&self) -> bool {
        self.keyword().is_some_and(|kw| kw.text() == "user")
    }

    pub fn keyword(&self) -> Option<SyntaxToken> {
        nth_ident(&self.0, 0)
    }

    pub fn name(&self) -> Option<SyntaxToken> {
        nth_ident(&self.0, 1)
    }

    pub fn abstract_clause(&self) -> Option<AbstractClause> {
        child(&self.0)
    }

    pub fn extends_clause(&self) -> Option<ExtendsClause> {
        child(&self.0)
    }

    pub fn implements_clause(&self) -> Option<ImplementsClause> {
        child(&self.0)
    }

    pub fn modifiers(&self) -> impl Iterator<Item = ClassifierModifier> + use<> {
        children(&self.0)
    }

    pub fn body(&self) -> Option<ClassBody> {
        child(&self.0)
    }
}

ast_node!(AbstractClause, ABSTRACT_CLAUSE);

impl AbstractClause {
    /// The dash-joined inheritance strategy inside the parentheses.
    pub fn strategy(&self) -> Option<String> {
        let mut inside = false;
        let mut text = String::new();
        for token in self.0.children_with_tokens().filter_map(|e| e.into_token()) {
            match token.kind() {
                L_PAREN => inside = true,
                R_PAREN => break,
                IDENT | MINUS if inside => text.push_str(token.text()),
                _ => {}
            }
        }
        (!text.is_empty()).then_some(text)
    }
}

ast_node!(ExtendsClause, EXTENDS_CLAUSE);

impl ExtendsClause {
    pub fn classifier(&self) -> Option<ClassifierRef> {
        child(&self.0)
    }
}

ast_node!(ImplementsClause, IMPLEMENTS_CLAUSE);

impl ImplementsClause {
    pub fn classifiers(&self) -> impl Iterator<Item = ClassifierRef> + use<> {
        children(&self.0)
    }
}

ast_node!(ClassifierRef, CLASSIFIER_REF);

impl ClassifierRef {
    pub fn name(&self) -> Option<SyntaxToken> {
        nth_ident(&self.0, 0)
    }
}

ast_node!(ClassifierModifier, CLASSIFIER_MODIFIER);

impl ClassifierModifier {
    pub fn keyword(&self) -> Option<SyntaxToken> {
        nth_ident(&self.0, 0)
    }
}

ast_node!(ClassBody, CLASS_BODY);

impl ClassBody {
    pub fn members(&self) -> impl Iterator<Item = Member> + use<> {
        children(&self.0)
    }
}

// ============================================================================
// MEMBERS
// ============================================================================

ast_node!(
    /// A class member: a data-type property, or a reference property when it
    /// carries a multiplicity.
    Member,
    DATA_TYPE_PROPERTY | REFERENCE_PROPERTY
);

impl Member {
    pub fn is_reference(&self) -> bool {
        self.0.kind() == REFERENCE_PROPERTY
    }

    pub fn name(&self) -> Option<SyntaxToken> {
        nth_ident(&self.0, 0)
    }

    pub fn type_ref(&self) -> Option<TypeRef> {
        child(&self.0)
    }

    pub fn is_optional(&self) -> bool {
        self.0.children().any(|n| n.kind() == OPTIONAL_MARKER)
    }

    pub fn multiplicity(&self) -> Option<Multiplicity> {
        child(&self.0)
    }

    pub fn modifiers(&self) -> impl Iterator<Item = PropertyModifier> + use<> {
        children(&self.0)
    }

    pub fn validations(&self) -> impl Iterator<Item = Validation> + use<> {
        children(&self.0)
    }

    pub fn order_by(&self) -> Option<OrderBy> {
        child(&self.0)
    }
}

ast_node!(TypeRef, TYPE_REF);

impl TypeRef {
    pub fn name(&self) -> Option<SyntaxToken> {
        nth_ident(&self.0, 0)
    }
}

ast_node!(Multiplicity, MULTIPLICITY);

impl Multiplicity {
    /// The two bounds as written: integers or `*`.
    pub fn bounds(&self) -> (Option<SyntaxToken>, Option<SyntaxToken>) {
        let mut bounds = self
            .0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| matches!(t.kind(), INTEGER | STAR));
        (bounds.next(), bounds.next())
    }
}

ast_node!(PropertyModifier, PROPERTY_MODIFIER);

impl PropertyModifier {
    pub fn keyword(&self) -> Option<SyntaxToken> {
        nth_ident(&self.0, 0)
    }
}

ast_node!(Validation, VALIDATION);

impl Validation {
    pub fn keyword(&self) -> Option<SyntaxToken> {
        nth_ident(&self.0, 0)
    }

    pub fn value(&self) -> Option<SyntaxToken> {
        tokens(&self.0, INTEGER).next()
    }
}

ast_node!(OrderBy, ORDER_BY);

impl OrderBy {
    pub fn members(&self) -> impl Iterator<Item = OrderByMember> + use<> {
        children(&self.0)
    }
}

ast_node!(OrderByMember, ORDER_BY_MEMBER);

impl OrderByMember {
    pub fn path(&self) -> Option<ThisMemberPath> {
        child(&self.0)
    }

    /// `ascending` or `descending`, when written.
    pub fn direction(&self) -> Option<SyntaxToken> {
        nth_ident(&self.0, 0)
    }
}

// ============================================================================
// ENUMERATIONS
// ============================================================================

ast_node!(EnumerationDecl, ENUMERATION_DECL);

impl EnumerationDecl {
    pub fn name(&self) -> Option<SyntaxToken> {
        nth_ident(&self.0, 1)
    }

    pub fn literals(&self) -> impl Iterator<Item = EnumLiteral> + use<> {
        children(&self.0)
    }
}

ast_node!(EnumLiteral, ENUM_LITERAL);

impl EnumLiteral {
    pub fn name(&self) -> Option<SyntaxToken> {
        nth_ident(&self.0, 0)
    }

    pub fn pretty_name(&self) -> Option<SyntaxToken> {
        tokens(&self.0, STRING).next()
    }
}

// ============================================================================
// ASSOCIATIONS
// ============================================================================

ast_node!(AssociationDecl, ASSOCIATION_DECL);

impl AssociationDecl {
    pub fn name(&self) -> Option<SyntaxToken> {
        nth_ident(&self.0, 1)
    }

    pub fn ends(&self) -> impl Iterator<Item = AssociationEnd> + use<> {
        children(&self.0)
    }

    pub fn relationship(&self) -> Option<Relationship> {
        child(&self.0)
    }
}

ast_node!(AssociationEnd, ASSOCIATION_END);

impl AssociationEnd {
    pub fn name(&self) -> Option<SyntaxToken> {
        nth_ident(&self.0, 0)
    }

    pub fn type_ref(&self) -> Option<TypeRef> {
        child(&self.0)
    }

    pub fn multiplicity(&self) -> Option<Multiplicity> {
        child(&self.0)
    }

    pub fn modifiers(&self) -> impl Iterator<Item = PropertyModifier> + use<> {
        children(&self.0)
    }

    pub fn order_by(&self) -> Option<OrderBy> {
        child(&self.0)
    }
}

ast_node!(Relationship, RELATIONSHIP);

impl Relationship {
    pub fn criteria(&self) -> Option<Criteria> {
        child(&self.0)
    }
}

// ============================================================================
// PROJECTIONS
// ============================================================================

ast_node!(ProjectionDecl, PROJECTION_DECL);

impl ProjectionDecl {
    pub fn name(&self) -> Option<SyntaxToken> {
        nth_ident(&self.0, 1)
    }

    pub fn classifier(&self) -> Option<ClassifierRef> {
        child(&self.0)
    }

    pub fn body(&self) -> Option<ProjectionBody> {
        child(&self.0)
    }
}

ast_node!(ProjectionBody, PROJECTION_BODY);

impl ProjectionBody {
    pub fn members(&self) -> impl Iterator<Item = ProjectionMember> + use<> {
        children(&self.0)
    }
}

ast_node!(ProjectionMember, PROJECTION_MEMBER);

/// What a projection member projects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProjectionMemberKind {
    /// `name: "Header"`, a data-type property leaf.
    Leaf(SyntaxToken),
    /// `question: QuestionProjection`, another named projection.
    ProjectionRef(SyntaxToken),
    /// `question: { ... }`, an inline nested projection.
    Nested(ProjectionBody),
}

impl ProjectionMember {
    pub fn name(&self) -> Option<SyntaxToken> {
        nth_ident(&self.0, 0)
    }

    pub fn kind(&self) -> Option<ProjectionMemberKind> {
        if let Some(body) = child(&self.0) {
            return Some(ProjectionMemberKind::Nested(body));
        }
        if let Some(header) = tokens(&self.0, STRING).next() {
            return Some(ProjectionMemberKind::Leaf(header));
        }
        nth_ident(&self.0, 1).map(ProjectionMemberKind::ProjectionRef)
    }
}

// ============================================================================
// SERVICES
// ============================================================================

ast_node!(ServiceGroupDecl, SERVICE_GROUP_DECL);

impl ServiceGroupDecl {
    pub fn classifier(&self) -> Option<ClassifierRef> {
        child(&self.0)
    }

    pub fn urls(&self) -> impl Iterator<Item = UrlDecl> + use<> {
        children(&self.0)
    }
}

ast_node!(UrlDecl, URL_DECL);

impl UrlDecl {
    pub fn path(&self) -> Option<UrlPath> {
        child(&self.0)
    }

    pub fn query_parameters(&self) -> impl Iterator<Item = UrlParameter> + use<> {
        self.0
            .children()
            .find(|n| n.kind() == QUERY_PARAMETERS)
            .into_iter()
            .flat_map(|n| children::<UrlParameter>(&n).collect::<Vec<_>>())
    }

    pub fn services(&self) -> impl Iterator<Item = ServiceDecl> + use<> {
        children(&self.0)
    }
}

ast_node!(UrlPath, URL_PATH);

/// One `/`-separated element of a url path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UrlElement {
    Constant(SyntaxToken),
    Parameter(UrlParameter),
}

impl UrlPath {
    pub fn elements(&self) -> impl Iterator<Item = UrlElement> + use<> {
        self.0.children().filter_map(|node| match node.kind() {
            URL_SEGMENT => nth_ident(&node, 0).map(UrlElement::Constant),
            URL_PARAMETER => UrlParameter::cast(node).map(UrlElement::Parameter),
            _ => None,
        })
    }
}

ast_node!(UrlParameter, URL_PARAMETER);

impl UrlParameter {
    pub fn name(&self) -> Option<SyntaxToken> {
        nth_ident(&self.0, 0)
    }

    pub fn type_ref(&self) -> Option<TypeRef> {
        child(&self.0)
    }

    pub fn multiplicity(&self) -> Option<Multiplicity> {
        child(&self.0)
    }

    pub fn modifiers(&self) -> impl Iterator<Item = PropertyModifier> + use<> {
        children(&self.0)
    }
}

ast_node!(ServiceDecl, SERVICE_DECL);

impl ServiceDecl {
    pub fn verb(&self) -> Option<SyntaxToken> {
        nth_ident(&self.0, 0)
    }

    /// `one` or `many`.
    pub fn multiplicity(&self) -> Option<SyntaxToken> {
        self.0
            .children()
            .find(|n| n.kind() == SERVICE_MULTIPLICITY)
            .and_then(|n| nth_ident(&n, 1))
    }

    pub fn criteria(&self) -> impl Iterator<Item = ServiceCriteria> + use<> {
        children(&self.0)
    }

    pub fn projection(&self) -> Option<SyntaxToken> {
        self.0
            .children()
            .find(|n| n.kind() == SERVICE_PROJECTION)
            .and_then(|n| nth_ident(&n, 1))
    }

    pub fn order_by(&self) -> Option<OrderBy> {
        self.0
            .children()
            .find(|n| n.kind() == SERVICE_ORDER_BY)
            .and_then(|n| child(&n))
    }
}

ast_node!(ServiceCriteria, SERVICE_CRITERIA);

impl ServiceCriteria {
    /// `criteria`, `authorize`, `validate`, `conflict` or `version`.
    pub fn keyword(&self) -> Option<SyntaxToken> {
        nth_ident(&self.0, 0)
    }

    pub fn criteria(&self) -> Option<Criteria> {
        child(&self.0)
    }
}

// ============================================================================
// CRITERIA
// ============================================================================

/// A criteria expression node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Criteria {
    All(SyntaxNode),
    Native(CriteriaNative),
    And(CriteriaBinary),
    Or(CriteriaBinary),
    Group(CriteriaGroup),
    Operator(CriteriaOperator),
    EdgePoint(CriteriaEdgePoint),
    BareValue(SyntaxNode),
}

impl AstNode for Criteria {
    fn can_cast(kind: SyntaxKind) -> bool {
        matches!(
            kind,
            CRITERIA_ALL
                | CRITERIA_NATIVE
                | CRITERIA_AND
                | CRITERIA_OR
                | CRITERIA_GROUP
                | CRITERIA_OPERATOR
                | CRITERIA_EDGE_POINT
                | CRITERIA_BARE_VALUE
        )
    }

    fn cast(node: SyntaxNode) -> Option<Self> {
        let criteria = match node.kind() {
            CRITERIA_ALL => Criteria::All(node),
            CRITERIA_NATIVE => Criteria::Native(CriteriaNative(node)),
            CRITERIA_AND => Criteria::And(CriteriaBinary(node)),
            CRITERIA_OR => Criteria::Or(CriteriaBinary(node)),
            CRITERIA_GROUP => Criteria::Group(CriteriaGroup(node)),
            CRITERIA_OPERATOR => Criteria::Operator(CriteriaOperator(node)),
            CRITERIA_EDGE_POINT => Criteria::EdgePoint(CriteriaEdgePoint(node)),
            CRITERIA_BARE_VALUE => Criteria::BareValue(node),
            _ => return None,
        };
        Some(criteria)
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Criteria::All(node) | Criteria::BareValue(node) => node,
            Criteria::Native(it) => it.syntax(),
            Criteria::And(it) | Criteria::Or(it) => it.syntax(),
            Criteria::Group(it) => it.syntax(),
            Criteria::Operator(it) => it.syntax(),
            Criteria::EdgePoint(it) => it.syntax(),
        }
    }
}

ast_node!(CriteriaNative, CRITERIA_NATIVE);

impl CriteriaNative {
    pub fn name(&self) -> Option<SyntaxToken> {
        nth_ident(&self.0, 1)
    }
}

ast_node!(CriteriaBinary, CRITERIA_AND | CRITERIA_OR);

impl CriteriaBinary {
    pub fn lhs(&self) -> Option<Criteria> {
        children(&self.0).next()
    }

    pub fn rhs(&self) -> Option<Criteria> {
        children(&self.0).nth(1)
    }
}

ast_node!(CriteriaGroup, CRITERIA_GROUP);

impl CriteriaGroup {
    pub fn inner(&self) -> Option<Criteria> {
        child(&self.0)
    }
}

ast_node!(CriteriaOperator, CRITERIA_OPERATOR);

impl CriteriaOperator {
    pub fn source(&self) -> Option<Value> {
        children(&self.0).next()
    }

    pub fn operator(&self) -> Option<SyntaxToken> {
        self.0
            .children()
            .find(|n| n.kind() == OPERATOR)
            .and_then(|n| n.first_token())
    }

    pub fn target(&self) -> Option<Value> {
        children(&self.0).nth(1)
    }
}

ast_node!(CriteriaEdgePoint, CRITERIA_EDGE_POINT);

impl CriteriaEdgePoint {
    pub fn value(&self) -> Option<Value> {
        child(&self.0)
    }
}

// ============================================================================
// VALUES
// ============================================================================

/// An expression value inside a criteria.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    ThisMember(ThisMemberPath),
    TypeMember(TypeMemberPath),
    Literal(Literal),
    LiteralList(LiteralList),
    User(SyntaxNode),
    Variable(VariableRef),
}

impl AstNode for Value {
    fn can_cast(kind: SyntaxKind) -> bool {
        matches!(
            kind,
            THIS_MEMBER_PATH | TYPE_MEMBER_PATH | LITERAL | LITERAL_LIST | USER_LITERAL | VARIABLE_REF
        )
    }

    fn cast(node: SyntaxNode) -> Option<Self> {
        let value = match node.kind() {
            THIS_MEMBER_PATH => Value::ThisMember(ThisMemberPath(node)),
            TYPE_MEMBER_PATH => Value::TypeMember(TypeMemberPath(node)),
            LITERAL => Value::Literal(Literal(node)),
            LITERAL_LIST => Value::LiteralList(LiteralList(node)),
            USER_LITERAL => Value::User(node),
            VARIABLE_REF => Value::Variable(VariableRef(node)),
            _ => return None,
        };
        Some(value)
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Value::ThisMember(it) => it.syntax(),
            Value::TypeMember(it) => it.syntax(),
            Value::Literal(it) => it.syntax(),
            Value::LiteralList(it) => it.syntax(),
            Value::User(node) => node,
            Value::Variable(it) => it.syntax(),
        }
    }
}

ast_node!(
    /// `this.a.b`
    ThisMemberPath,
    THIS_MEMBER_PATH
);

impl ThisMemberPath {
    /// Member segments after `this`.
    pub fn segments(&self) -> Vec<SyntaxToken> {
        tokens(&self.0, IDENT).skip(1).collect()
    }
}

ast_node!(
    /// `Type.a.b`
    TypeMemberPath,
    TYPE_MEMBER_PATH
);

impl TypeMemberPath {
    pub fn type_name(&self) -> Option<SyntaxToken> {
        nth_ident(&self.0, 0)
    }

    pub fn segments(&self) -> Vec<SyntaxToken> {
        tokens(&self.0, IDENT).skip(1).collect()
    }
}

ast_node!(Literal, LITERAL);

impl Literal {
    /// Literal text; negative integers keep their sign.
    pub fn text(&self) -> String {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| !t.kind().is_trivia())
            .map(|t| t.text().to_string())
            .collect()
    }

    /// The token that decides the literal's kind.
    pub fn token(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| matches!(t.kind(), INTEGER | STRING | IDENT))
    }
}

ast_node!(LiteralList, LITERAL_LIST);

impl LiteralList {
    pub fn literals(&self) -> impl Iterator<Item = Literal> + use<> {
        children(&self.0)
    }
}

ast_node!(VariableRef, VARIABLE_REF);

impl VariableRef {
    pub fn name(&self) -> Option<SyntaxToken> {
        nth_ident(&self.0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;

    fn source(text: &str) -> SourceFile {
        let parse = parse(text);
        assert!(parse.ok(), "{:?}", parse.errors());
        SourceFile::cast(parse.syntax()).unwrap()
    }

    #[test]
    fn test_classifier_accessors() {
        let file = source(
            "package com.example\n\
             class Car abstract(table-per-subclass) extends Vehicle implements A, B bitemporal {\n\
                 id: Long key id;\n\
                 name: String? maxLength(20);\n\
             }",
        );
        assert_eq!(
            file.package().and_then(|p| p.name()).map(|n| n.text('.')),
            Some("com.example".to_string())
        );

        let Some(Item::Classifier(class)) = file.items().next() else {
            panic!("expected a classifier");
        };
        assert!(!class.is_interface());
        assert_eq!(class.name().unwrap().text(), "Car");
        assert_eq!(
            class.abstract_clause().and_then(|a| a.strategy()),
            Some("table-per-subclass".to_string())
        );
        assert_eq!(
            class
                .extends_clause()
                .and_then(|e| e.classifier())
                .and_then(|c| c.name())
                .unwrap()
                .text(),
            "Vehicle"
        );
        let interfaces: Vec<_> = class
            .implements_clause()
            .unwrap()
            .classifiers()
            .filter_map(|c| c.name())
            .map(|t| t.text().to_string())
            .collect();
        assert_eq!(interfaces, vec!["A", "B"]);
        assert_eq!(class.modifiers().count(), 1);

        let members: Vec<_> = class.body().unwrap().members().collect();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].modifiers().count(), 2);
        assert!(members[1].is_optional());
        assert_eq!(members[1].validations().next().unwrap().value().unwrap().text(), "20");
    }

    #[test]
    fn test_criteria_operator_accessors() {
        let file = source(
            "package p\n\
             association AH { a: A[1..1]; b: B[0..*]; relationship this.id == B.aId }",
        );
        let Some(Item::Association(assoc)) = file.items().next() else {
            panic!("expected an association");
        };
        assert_eq!(assoc.ends().count(), 2);

        let Some(Criteria::Operator(op)) = assoc.relationship().and_then(|r| r.criteria()) else {
            panic!("expected an operator criteria");
        };
        assert_eq!(op.operator().unwrap().text(), "==");
        let Some(Value::ThisMember(this)) = op.source() else {
            panic!("expected a this path");
        };
        assert_eq!(this.segments()[0].text(), "id");
        let Some(Value::TypeMember(ty)) = op.target() else {
            panic!("expected a type path");
        };
        assert_eq!(ty.type_name().unwrap().text(), "B");
        assert_eq!(ty.segments()[0].text(), "aId");
    }

    #[test]
    fn test_projection_member_kinds() {
        let file = source(
            "package p\n\
             projection QP on Question {\n\
                 title: \"Title\",\n\
                 answers: { body: \"Body\" },\n\
                 owner: UserProjection,\n\
             }",
        );
        let Some(Item::Projection(projection)) = file.items().next() else {
            panic!("expected a projection");
        };
        let kinds: Vec<_> = projection
            .body()
            .unwrap()
            .members()
            .map(|m| m.kind().unwrap())
            .collect();

        assert!(matches!(kinds[0], ProjectionMemberKind::Leaf(_)));
        assert!(matches!(kinds[1], ProjectionMemberKind::Nested(_)));
        assert!(matches!(kinds[2], ProjectionMemberKind::ProjectionRef(_)));
    }

    #[test]
    fn test_url_elements() {
        let file = source(
            "package p\n\
             service Question {\n\
                 /question/{id: Long[1..1]}?{version: Integer[0..1]}\n\
                     GET { multiplicity: one; }\n\
             }",
        );
        let Some(Item::ServiceGroup(group)) = file.items().next() else {
            panic!("expected a service group");
        };
        let url = group.urls().next().unwrap();
        let elements: Vec<_> = url.path().unwrap().elements().collect();

        assert!(matches!(&elements[0], UrlElement::Constant(t) if t.text() == "question"));
        assert!(matches!(&elements[1], UrlElement::Parameter(_)));
        assert_eq!(url.query_parameters().count(), 1);
        let service = url.services().next().unwrap();
        assert_eq!(service.verb().unwrap().text(), "GET");
        assert_eq!(service.multiplicity().unwrap().text(), "one");
    }
}
