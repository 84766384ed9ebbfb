//! Lexer: source text to a flat token list, trivia included.

use logos::Logos;
use text_size::{TextRange, TextSize};

use super::syntax_kind::SyntaxKind;

/// A lexed token borrowing its text from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
    pub range: TextRange,
}

/// Tokenize `text` losslessly.
///
/// Unrecognised characters become [`SyntaxKind::ERROR_TOKEN`] so the parser
/// can still cover every byte of the input.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut lexer = SyntaxKind::lexer(text);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let kind = result.unwrap_or(SyntaxKind::ERROR_TOKEN);
        tokens.push(Token {
            kind,
            text: lexer.slice(),
            range: TextRange::new(
                TextSize::from(span.start as u32),
                TextSize::from(span.end as u32),
            ),
        });
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use SyntaxKind::*;

    fn kinds(text: &str) -> Vec<SyntaxKind> {
        tokenize(text)
            .into_iter()
            .map(|t| t.kind)
            .filter(|k| !k.is_trivia())
            .collect()
    }

    #[test]
    fn test_lex_multiplicity() {
        assert_eq!(
            kinds("answers: Answer[0..*];"),
            vec![IDENT, COLON, IDENT, L_BRACKET, INTEGER, DOT_DOT, STAR, R_BRACKET, SEMICOLON]
        );
    }

    #[test]
    fn test_lex_criteria_operators() {
        assert_eq!(
            kinds("this.id == Answer.questionId && x != 1 || y <= 2"),
            vec![
                IDENT, DOT, IDENT, EQ_EQ, IDENT, DOT, IDENT, AMP_AMP, IDENT, NEQ, INTEGER,
                PIPE_PIPE, IDENT, LT_EQ, INTEGER
            ]
        );
    }

    #[test]
    fn test_lex_comments_are_trivia() {
        let tokens = tokenize("// line\nclass /* block */ A");
        let comment_kinds: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind.is_trivia() && t.kind != WHITESPACE)
            .map(|t| (t.kind, t.text))
            .collect();

        assert_eq!(
            comment_kinds,
            vec![(LINE_COMMENT, "// line"), (BLOCK_COMMENT, "/* block */")]
        );
    }

    #[test]
    fn test_lex_is_lossless() {
        let text = "class A { name: String? key; } # stray";
        let rebuilt: String = tokenize(text).iter().map(|t| t.text).collect();

        assert_eq!(rebuilt, text);
        assert!(tokenize(text).iter().any(|t| t.kind == ERROR_TOKEN));
    }
}
