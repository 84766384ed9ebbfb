//! Token and node kinds of the Klass concrete syntax tree.

use logos::Logos;

/// Every token and node kind that can appear in a Klass CST.
///
/// Token kinds carry the `logos` patterns directly. Node kinds have no
/// pattern and are only produced by the parser. Words are always lexed as
/// [`SyntaxKind::IDENT`]; keywords are contextual and checked by text.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // ========================================================================
    // TRIVIA
    // ========================================================================
    #[regex(r"[ \t\r\n]+")]
    WHITESPACE = 0,
    #[token("//", line_comment)]
    LINE_COMMENT,
    #[token("/*", block_comment)]
    BLOCK_COMMENT,

    // ========================================================================
    // TOKENS
    // ========================================================================
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    IDENT,
    #[regex(r"[0-9]+")]
    INTEGER,
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    STRING,
    #[token("{")]
    L_BRACE,
    #[token("}")]
    R_BRACE,
    #[token("(")]
    L_PAREN,
    #[token(")")]
    R_PAREN,
    #[token("[")]
    L_BRACKET,
    #[token("]")]
    R_BRACKET,
    #[token(":")]
    COLON,
    #[token(";")]
    SEMICOLON,
    #[token(",")]
    COMMA,
    #[token(".")]
    DOT,
    #[token("..")]
    DOT_DOT,
    #[token("*")]
    STAR,
    #[token("?")]
    QUESTION,
    #[token("/")]
    SLASH,
    #[token("-")]
    MINUS,
    #[token("&")]
    AMP,
    #[token("&&")]
    AMP_AMP,
    #[token("||")]
    PIPE_PIPE,
    #[token("==")]
    EQ_EQ,
    #[token("!=")]
    NEQ,
    #[token("<")]
    LT,
    #[token(">")]
    GT,
    #[token("<=")]
    LT_EQ,
    #[token(">=")]
    GT_EQ,
    /// Any character the lexer does not recognise.
    ERROR_TOKEN,

    // ========================================================================
    // NODES
    // ========================================================================
    SOURCE_FILE,
    /// Root of a macro unit: a run of members or one service criteria.
    MACRO_BODY,
    PACKAGE_DECL,
    QUALIFIED_NAME,
    INTERFACE_DECL,
    CLASS_DECL,
    ABSTRACT_CLAUSE,
    EXTENDS_CLAUSE,
    IMPLEMENTS_CLAUSE,
    CLASSIFIER_MODIFIER,
    CLASSIFIER_REF,
    CLASS_BODY,
    DATA_TYPE_PROPERTY,
    REFERENCE_PROPERTY,
    TYPE_REF,
    OPTIONAL_MARKER,
    MULTIPLICITY,
    PROPERTY_MODIFIER,
    VALIDATION,
    ORDER_BY,
    ORDER_BY_MEMBER,
    ENUMERATION_DECL,
    ENUM_LITERAL,
    ASSOCIATION_DECL,
    ASSOCIATION_END,
    RELATIONSHIP,
    PROJECTION_DECL,
    PROJECTION_BODY,
    PROJECTION_MEMBER,
    SERVICE_GROUP_DECL,
    URL_DECL,
    URL_PATH,
    URL_SEGMENT,
    URL_PARAMETER,
    QUERY_PARAMETERS,
    SERVICE_DECL,
    SERVICE_MULTIPLICITY,
    SERVICE_CRITERIA,
    SERVICE_PROJECTION,
    SERVICE_ORDER_BY,
    CRITERIA_ALL,
    CRITERIA_NATIVE,
    CRITERIA_AND,
    CRITERIA_OR,
    CRITERIA_GROUP,
    CRITERIA_OPERATOR,
    CRITERIA_EDGE_POINT,
    /// A value written where a criteria was expected.
    CRITERIA_BARE_VALUE,
    OPERATOR,
    THIS_MEMBER_PATH,
    TYPE_MEMBER_PATH,
    LITERAL,
    LITERAL_LIST,
    USER_LITERAL,
    VARIABLE_REF,
    ERROR,
}

use SyntaxKind::*;

fn line_comment(lex: &mut logos::Lexer<'_, SyntaxKind>) {
    let rest = lex.remainder();
    lex.bump(rest.find('\n').unwrap_or(rest.len()));
}

/// An unterminated block comment runs to the end of the text.
fn block_comment(lex: &mut logos::Lexer<'_, SyntaxKind>) {
    let rest = lex.remainder();
    lex.bump(rest.find("*/").map_or(rest.len(), |end| end + 2));
}

/// All kinds in discriminant order, used to map raw rowan kinds back.
const ALL_KINDS: &[SyntaxKind] = &[
    WHITESPACE, LINE_COMMENT, BLOCK_COMMENT, IDENT, INTEGER, STRING, L_BRACE, R_BRACE,
    L_PAREN, R_PAREN, L_BRACKET, R_BRACKET, COLON, SEMICOLON, COMMA, DOT, DOT_DOT, STAR,
    QUESTION, SLASH, MINUS, AMP, AMP_AMP, PIPE_PIPE, EQ_EQ, NEQ, LT, GT, LT_EQ, GT_EQ,
    ERROR_TOKEN, SOURCE_FILE, MACRO_BODY, PACKAGE_DECL, QUALIFIED_NAME, INTERFACE_DECL,
    CLASS_DECL, ABSTRACT_CLAUSE, EXTENDS_CLAUSE, IMPLEMENTS_CLAUSE, CLASSIFIER_MODIFIER,
    CLASSIFIER_REF, CLASS_BODY, DATA_TYPE_PROPERTY, REFERENCE_PROPERTY, TYPE_REF,
    OPTIONAL_MARKER, MULTIPLICITY, PROPERTY_MODIFIER, VALIDATION, ORDER_BY, ORDER_BY_MEMBER,
    ENUMERATION_DECL, ENUM_LITERAL, ASSOCIATION_DECL, ASSOCIATION_END, RELATIONSHIP,
    PROJECTION_DECL, PROJECTION_BODY, PROJECTION_MEMBER, SERVICE_GROUP_DECL, URL_DECL,
    URL_PATH, URL_SEGMENT, URL_PARAMETER, QUERY_PARAMETERS, SERVICE_DECL,
    SERVICE_MULTIPLICITY, SERVICE_CRITERIA, SERVICE_PROJECTION, SERVICE_ORDER_BY,
    CRITERIA_ALL, CRITERIA_NATIVE, CRITERIA_AND, CRITERIA_OR, CRITERIA_GROUP,
    CRITERIA_OPERATOR, CRITERIA_EDGE_POINT, CRITERIA_BARE_VALUE, OPERATOR,
    THIS_MEMBER_PATH, TYPE_MEMBER_PATH, LITERAL, LITERAL_LIST, USER_LITERAL, VARIABLE_REF,
    ERROR,
];

impl SyntaxKind {
    /// Whitespace and comments.
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(self, WHITESPACE | LINE_COMMENT | BLOCK_COMMENT)
    }

    /// Map a raw rowan kind back to a `SyntaxKind`.
    pub fn from_raw(raw: u16) -> SyntaxKind {
        ALL_KINDS.get(raw as usize).copied().unwrap_or(ERROR)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Language marker tying rowan trees to [`SyntaxKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KlassLanguage {}

impl rowan::Language for KlassLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        SyntaxKind::from_raw(raw.0)
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

pub type SyntaxNode = rowan::SyntaxNode<KlassLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<KlassLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<KlassLanguage>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_roundtrip_covers_every_kind() {
        for (index, kind) in ALL_KINDS.iter().enumerate() {
            assert_eq!(*kind as usize, index, "{kind:?} out of order");
            assert_eq!(SyntaxKind::from_raw(*kind as u16), *kind);
        }
    }

    #[test]
    fn test_unknown_raw_kind_is_error() {
        assert_eq!(SyntaxKind::from_raw(u16::MAX), ERROR);
    }
}
