//! The criteria AST and its lowering from syntax.
//!
//! One tagged union serves both the scaffold and the frozen model: the
//! [`CriteriaRefs`] parameter decides how member and parameter references
//! are represented. Scaffold criteria carry resolutions plus the names as
//! written, frozen criteria carry plain ids.

use std::fmt;

use smol_str::SmolStr;

use crate::error::CompileError;
use crate::syntax::ast::{self, AstNode};
use crate::syntax::SyntaxToken;

use super::diagnostics::{Reporter, codes};
use super::ids::{ClassifierId, DeclId, ParameterId, PropertyId, ReferenceId};
use super::input::CompilationUnit;
use super::resolve::{Resolution, Resolver};
use super::scaffold::NameRef;

// ============================================================================
// REFERENCE REPRESENTATIONS
// ============================================================================

/// How a criteria tree represents its references.
pub trait CriteriaRefs: Clone + fmt::Debug + PartialEq {
    type Member: Clone + fmt::Debug + PartialEq;
    type Variable: Clone + fmt::Debug + PartialEq;
}

/// References as resolved during analysis.
#[derive(Clone, Debug, PartialEq)]
pub struct Scaffolded;

impl CriteriaRefs for Scaffolded {
    type Member = MemberReference;
    type Variable = VariableReference;
}

/// References in the frozen model.
#[derive(Clone, Debug, PartialEq)]
pub struct Frozen;

impl CriteriaRefs for Frozen {
    type Member = MemberPath;
    type Variable = ParameterId;
}

/// A member path such as `this.question.id` or `Answer.questionId`, with
/// the segments as written and how far resolution got.
#[derive(Clone, Debug, PartialEq)]
pub struct MemberReference {
    /// The classifier the path starts from.
    pub classifier: Resolution<ClassifierId>,
    /// The class name as written, for type member paths.
    pub type_name: Option<NameRef>,
    pub segments: Vec<NameRef>,
    /// Association ends walked before the terminal property.
    pub ends: Vec<ReferenceId>,
    pub property: Resolution<PropertyId>,
    pub failure: Option<PathFailure>,
}

impl MemberReference {
    /// True if the path names a property of its start classifier directly.
    pub fn is_direct(&self) -> bool {
        self.ends.is_empty() && self.segments.len() == 1
    }
}

/// Where a member path stopped resolving.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathFailure {
    /// Index into the path's segments.
    pub segment: usize,
    /// The classifier that was searched.
    pub classifier: ClassifierId,
    pub ambiguous: bool,
}

/// A url parameter used as a criteria value.
#[derive(Clone, Debug, PartialEq)]
pub struct VariableReference {
    pub name: NameRef,
    pub parameter: Resolution<ParameterId>,
}

/// A fully resolved member path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MemberPath {
    pub classifier: ClassifierId,
    pub ends: Vec<ReferenceId>,
    pub property: PropertyId,
}

// ============================================================================
// CRITERIA
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub enum Criteria<R: CriteriaRefs> {
    /// Matches everything.
    All,
    And(Box<Criteria<R>>, Box<Criteria<R>>),
    Or(Box<Criteria<R>>, Box<Criteria<R>>),
    Operator(OperatorCriteria<R>),
    /// The temporal edge of a `valid` or `system` range is open.
    EdgePoint(R::Member),
    /// Opaque generator-specific predicate.
    Native(SmolStr),
}

#[derive(Clone, Debug, PartialEq)]
pub struct OperatorCriteria<R: CriteriaRefs> {
    pub source: ExpressionValue<R>,
    pub operator: Operator,
    pub target: ExpressionValue<R>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExpressionValue<R: CriteriaRefs> {
    ThisMember(R::Member),
    TypeMember(R::Member),
    Literal(LiteralValue),
    LiteralList(Vec<LiteralValue>),
    /// The calling user.
    User,
    Variable(R::Variable),
}

impl<R: CriteriaRefs> ExpressionValue<R> {
    pub fn member(&self) -> Option<&R::Member> {
        match self {
            ExpressionValue::ThisMember(member) | ExpressionValue::TypeMember(member) => Some(member),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    Integer(i64),
    String(SmolStr),
    Boolean(bool),
    Null,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Equals,
    NotEquals,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    In,
    Contains,
    StartsWith,
    EndsWith,
}

impl Operator {
    pub fn from_text(text: &str) -> Option<Self> {
        let operator = match text {
            "==" => Operator::Equals,
            "!=" => Operator::NotEquals,
            "<" => Operator::LessThan,
            ">" => Operator::GreaterThan,
            "<=" => Operator::LessThanOrEqual,
            ">=" => Operator::GreaterThanOrEqual,
            "in" => Operator::In,
            "contains" => Operator::Contains,
            "startsWith" => Operator::StartsWith,
            "endsWith" => Operator::EndsWith,
            _ => return None,
        };
        Some(operator)
    }

    pub fn text(self) -> &'static str {
        match self {
            Operator::Equals => "==",
            Operator::NotEquals => "!=",
            Operator::LessThan => "<",
            Operator::GreaterThan => ">",
            Operator::LessThanOrEqual => "<=",
            Operator::GreaterThanOrEqual => ">=",
            Operator::In => "in",
            Operator::Contains => "contains",
            Operator::StartsWith => "startsWith",
            Operator::EndsWith => "endsWith",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

impl<R: CriteriaRefs> Criteria<R> {
    /// Every operator criteria, left to right.
    pub fn operators(&self) -> Vec<&OperatorCriteria<R>> {
        let mut out = Vec::new();
        self.walk(&mut |criteria| {
            if let Criteria::Operator(op) = criteria {
                out.push(op);
            }
        });
        out
    }

    /// Every member reference, left to right.
    pub fn member_references(&self) -> Vec<&R::Member> {
        let mut out = Vec::new();
        self.walk(&mut |criteria| match criteria {
            Criteria::Operator(op) => {
                out.extend(op.source.member());
                out.extend(op.target.member());
            }
            Criteria::EdgePoint(member) => out.push(member),
            _ => {}
        });
        out
    }

    /// Every parameter reference, left to right.
    pub fn variables(&self) -> Vec<&R::Variable> {
        let mut out = Vec::new();
        self.walk(&mut |criteria| {
            if let Criteria::Operator(op) = criteria {
                for value in [&op.source, &op.target] {
                    if let ExpressionValue::Variable(variable) = value {
                        out.push(variable);
                    }
                }
            }
        });
        out
    }

    /// Pre-order walk.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Criteria<R>)) {
        f(self);
        match self {
            Criteria::And(lhs, rhs) | Criteria::Or(lhs, rhs) => {
                lhs.walk(f);
                rhs.walk(f);
            }
            Criteria::All | Criteria::Operator(_) | Criteria::EdgePoint(_) | Criteria::Native(_) => {}
        }
    }

    /// Rebuild the tree with another reference representation.
    pub fn try_map<S: CriteriaRefs, E>(
        &self,
        member: &impl Fn(&R::Member) -> Result<S::Member, E>,
        variable: &impl Fn(&R::Variable) -> Result<S::Variable, E>,
    ) -> Result<Criteria<S>, E> {
        let mapped = match self {
            Criteria::All => Criteria::All,
            Criteria::And(lhs, rhs) => Criteria::And(
                Box::new(lhs.try_map(member, variable)?),
                Box::new(rhs.try_map(member, variable)?),
            ),
            Criteria::Or(lhs, rhs) => Criteria::Or(
                Box::new(lhs.try_map(member, variable)?),
                Box::new(rhs.try_map(member, variable)?),
            ),
            Criteria::Operator(op) => Criteria::Operator(OperatorCriteria {
                source: op.source.try_map(member, variable)?,
                operator: op.operator,
                target: op.target.try_map(member, variable)?,
            }),
            Criteria::EdgePoint(path) => Criteria::EdgePoint(member(path)?),
            Criteria::Native(name) => Criteria::Native(name.clone()),
        };
        Ok(mapped)
    }
}

impl<R: CriteriaRefs> ExpressionValue<R> {
    fn try_map<S: CriteriaRefs, E>(
        &self,
        member: &impl Fn(&R::Member) -> Result<S::Member, E>,
        variable: &impl Fn(&R::Variable) -> Result<S::Variable, E>,
    ) -> Result<ExpressionValue<S>, E> {
        let mapped = match self {
            ExpressionValue::ThisMember(path) => ExpressionValue::ThisMember(member(path)?),
            ExpressionValue::TypeMember(path) => ExpressionValue::TypeMember(member(path)?),
            ExpressionValue::Literal(literal) => ExpressionValue::Literal(literal.clone()),
            ExpressionValue::LiteralList(list) => ExpressionValue::LiteralList(list.clone()),
            ExpressionValue::User => ExpressionValue::User,
            ExpressionValue::Variable(v) => ExpressionValue::Variable(variable(v)?),
        };
        Ok(mapped)
    }
}

// ============================================================================
// LOWERING
// ============================================================================

/// Where a criteria appears.
pub struct CriteriaContext<'a> {
    pub unit: &'a CompilationUnit,
    /// What `this` denotes.
    pub this: Resolution<ClassifierId>,
    /// Url parameters visible as variables.
    pub parameters: &'a [ParameterId],
    /// The declaration owning the criteria, for annotations.
    pub owner: DeclId,
}

/// Lower a criteria syntax tree, resolving every reference in it.
///
/// Unresolved references are kept as resolutions and reported later by
/// the checks. Shapes the AST has no variant for are fatal.
pub fn lower_criteria(
    syntax: &ast::Criteria,
    resolver: &Resolver<'_>,
    ctx: &CriteriaContext<'_>,
    reporter: &mut Reporter,
) -> Result<Criteria<Scaffolded>, CompileError> {
    let lowered = match syntax {
        ast::Criteria::All(_) => Criteria::All,
        ast::Criteria::Native(native) => {
            let name = native.name().map(|t| SmolStr::new(t.text())).unwrap_or_default();
            Criteria::Native(name)
        }
        ast::Criteria::And(binary) => {
            let (lhs, rhs) = binary_children(binary, ctx)?;
            Criteria::And(
                Box::new(lower_criteria(&lhs, resolver, ctx, reporter)?),
                Box::new(lower_criteria(&rhs, resolver, ctx, reporter)?),
            )
        }
        ast::Criteria::Or(binary) => {
            let (lhs, rhs) = binary_children(binary, ctx)?;
            Criteria::Or(
                Box::new(lower_criteria(&lhs, resolver, ctx, reporter)?),
                Box::new(lower_criteria(&rhs, resolver, ctx, reporter)?),
            )
        }
        ast::Criteria::Group(group) => {
            let inner = group
                .inner()
                .ok_or_else(|| unsupported("empty group", syntax.syntax(), ctx))?;
            lower_criteria(&inner, resolver, ctx, reporter)?
        }
        ast::Criteria::Operator(op) => {
            let (Some(source), Some(operator_token), Some(target)) =
                (op.source(), op.operator(), op.target())
            else {
                return Err(unsupported("incomplete operator", syntax.syntax(), ctx));
            };
            let operator = Operator::from_text(operator_token.text())
                .ok_or_else(|| unsupported("unknown operator", syntax.syntax(), ctx))?;
            if operator == Operator::In && !matches!(target, ast::Value::LiteralList(_)) {
                let found = target.syntax().text().to_string();
                reporter.error(
                    codes::ERR_OPR_IN,
                    format!("Operator 'in' expects a literal list but found '{found}'."),
                    ctx.owner,
                    vec![target.syntax().text_range()],
                );
            }
            Criteria::Operator(OperatorCriteria {
                source: lower_value(&source, resolver, ctx, reporter)?,
                operator,
                target: lower_value(&target, resolver, ctx, reporter)?,
            })
        }
        ast::Criteria::EdgePoint(edge) => match edge.value() {
            Some(ast::Value::ThisMember(path)) => {
                Criteria::EdgePoint(resolver.resolve_this_member_path(ctx.this, names(&path.segments())))
            }
            Some(ast::Value::TypeMember(path)) => {
                Criteria::EdgePoint(lower_type_member(&path, resolver))
            }
            _ => return Err(unsupported("edge point on a non-member value", syntax.syntax(), ctx)),
        },
        ast::Criteria::BareValue(node) => return Err(unsupported("bare value", node, ctx)),
    };
    Ok(lowered)
}

fn binary_children(
    binary: &ast::CriteriaBinary,
    ctx: &CriteriaContext<'_>,
) -> Result<(ast::Criteria, ast::Criteria), CompileError> {
    match (binary.lhs(), binary.rhs()) {
        (Some(lhs), Some(rhs)) => Ok((lhs, rhs)),
        _ => Err(unsupported("incomplete binary criteria", binary.syntax(), ctx)),
    }
}

fn lower_value(
    value: &ast::Value,
    resolver: &Resolver<'_>,
    ctx: &CriteriaContext<'_>,
    reporter: &mut Reporter,
) -> Result<ExpressionValue<Scaffolded>, CompileError> {
    let lowered = match value {
        ast::Value::ThisMember(path) => {
            ExpressionValue::ThisMember(resolver.resolve_this_member_path(ctx.this, names(&path.segments())))
        }
        ast::Value::TypeMember(path) => ExpressionValue::TypeMember(lower_type_member(path, resolver)),
        ast::Value::Literal(literal) => ExpressionValue::Literal(lower_literal(literal, ctx, reporter)?),
        ast::Value::LiteralList(list) => ExpressionValue::LiteralList(
            list.literals()
                .map(|literal| lower_literal(&literal, ctx, reporter))
                .collect::<Result<_, _>>()?,
        ),
        ast::Value::User(_) => ExpressionValue::User,
        ast::Value::Variable(variable) => {
            let name = variable
                .name()
                .map(|t| name_ref(&t))
                .ok_or_else(|| unsupported("unnamed variable", variable.syntax(), ctx))?;
            let parameter = resolver.resolve_parameter(ctx.parameters, &name.text);
            ExpressionValue::Variable(VariableReference { name, parameter })
        }
    };
    Ok(lowered)
}

fn lower_type_member(path: &ast::TypeMemberPath, resolver: &Resolver<'_>) -> MemberReference {
    let type_name = path.type_name().map(|t| name_ref(&t));
    let classifier = type_name
        .as_ref()
        .map_or(Resolution::NotFound, |name| resolver.resolve_classifier(&name.text));
    let mut reference = resolver.resolve_member_path(classifier, names(&path.segments()));
    reference.type_name = type_name;
    reference
}

/// An integer that does not fit `i64` is reported and lowered as zero; the
/// error blocks the freeze.
fn lower_literal(
    literal: &ast::Literal,
    ctx: &CriteriaContext<'_>,
    reporter: &mut Reporter,
) -> Result<LiteralValue, CompileError> {
    let token = literal
        .token()
        .ok_or_else(|| unsupported("empty literal", literal.syntax(), ctx))?;
    let value = match token.text() {
        "true" => LiteralValue::Boolean(true),
        "false" => LiteralValue::Boolean(false),
        "null" => LiteralValue::Null,
        text if text.starts_with('"') => {
            LiteralValue::String(SmolStr::new(text.trim_matches('"')))
        }
        _ => {
            let text = literal.text();
            match text.parse::<i64>() {
                Ok(parsed) => LiteralValue::Integer(parsed),
                Err(_) => {
                    reporter.error(
                        codes::ERR_LIT_RNG,
                        format!("Integer literal '{text}' is out of range."),
                        ctx.owner,
                        vec![literal.syntax().text_range()],
                    );
                    LiteralValue::Integer(0)
                }
            }
        }
    };
    Ok(value)
}

fn name_ref(token: &SyntaxToken) -> NameRef {
    NameRef::new(token.text(), token.text_range())
}

fn names(tokens: &[SyntaxToken]) -> Vec<NameRef> {
    tokens.iter().map(name_ref).collect()
}

fn unsupported(
    shape: &'static str,
    node: &crate::syntax::SyntaxNode,
    ctx: &CriteriaContext<'_>,
) -> CompileError {
    let position = ctx.unit.line_col(node.text_range().start());
    let location = format!("{}:{}", ctx.unit.source_name(), position);
    tracing::error!(shape, %location, "unsupported criteria");
    CompileError::UnsupportedCriteria { shape, location }
}
