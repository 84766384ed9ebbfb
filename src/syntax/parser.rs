//! Recursive-descent reader producing rowan green trees.
//!
//! The reader never fails: malformed input yields [`SyntaxError`]s and
//! `ERROR` nodes, and the tree always covers every byte of the text.

use rowan::{Checkpoint, GreenNode, GreenNodeBuilder};
use text_size::{TextRange, TextSize};

use super::keywords;
use super::lexer::{Token, tokenize};
use super::syntax_kind::{SyntaxKind, SyntaxNode};

use SyntaxKind::*;

// ============================================================================
// PARSE RESULT
// ============================================================================

/// A syntax error reported by the reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub range: TextRange,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, range: TextRange) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }
}

/// The result of parsing: a green tree plus the errors found on the way.
#[derive(Debug, Clone)]
pub struct Parse {
    green: GreenNode,
    errors: Vec<SyntaxError>,
}

impl Parse {
    /// Build a `Parse` from a tree produced elsewhere.
    pub fn from_green(green: GreenNode, errors: Vec<SyntaxError>) -> Self {
        Self { green, errors }
    }

    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    /// A fresh root node for navigation.
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse a whole compilation unit (`SOURCE_FILE` root).
pub fn parse(text: &str) -> Parse {
    let mut p = Parser::new(text);
    p.source_file();
    p.finish()
}

/// Parse a run of class body members (`MACRO_BODY` root).
///
/// Entry point for macro units that add properties to an existing class.
pub fn parse_members(text: &str) -> Parse {
    let mut p = Parser::new(text);
    p.start_node(MACRO_BODY);
    while !p.at_eof() {
        if p.at(IDENT) {
            p.member();
        } else {
            p.error_and_bump("expected a member declaration");
        }
    }
    p.eat_trivia();
    p.finish_node();
    p.finish()
}

/// Parse one service criteria clause (`MACRO_BODY` root).
pub fn parse_service_criteria(text: &str) -> Parse {
    let mut p = Parser::new(text);
    p.start_node(MACRO_BODY);
    if p.at(IDENT) && keywords::is_criteria_keyword(p.current_text()) {
        p.service_criteria();
    } else {
        p.error("expected a service criteria clause");
    }
    while !p.at_eof() {
        p.error_and_bump("unexpected input after service criteria");
    }
    p.eat_trivia();
    p.finish_node();
    p.finish()
}

// ============================================================================
// PARSER
// ============================================================================

struct Parser<'t> {
    tokens: Vec<Token<'t>>,
    pos: usize,
    text_len: TextSize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<SyntaxError>,
}

impl<'t> Parser<'t> {
    fn new(text: &'t str) -> Self {
        Self {
            tokens: tokenize(text),
            pos: 0,
            text_len: TextSize::of(text),
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
        }
    }

    fn finish(self) -> Parse {
        Parse {
            green: self.builder.finish(),
            errors: self.errors,
        }
    }

    // ------------------------------------------------------------------------
    // Token cursor
    // ------------------------------------------------------------------------

    /// Index of the n-th non-trivia token from the cursor.
    fn nth_index(&self, n: usize) -> Option<usize> {
        self.tokens
            .iter()
            .enumerate()
            .skip(self.pos)
            .filter(|(_, t)| !t.kind.is_trivia())
            .nth(n)
            .map(|(i, _)| i)
    }

    fn nth(&self, n: usize) -> SyntaxKind {
        self.nth_index(n).map_or(ERROR, |i| self.tokens[i].kind)
    }

    fn nth_text(&self, n: usize) -> &'t str {
        self.nth_index(n).map_or("", |i| self.tokens[i].text)
    }

    fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    fn current_text(&self) -> &'t str {
        self.nth_text(0)
    }

    fn current_range(&self) -> TextRange {
        self.nth_index(0)
            .map_or(TextRange::empty(self.text_len), |i| self.tokens[i].range)
    }

    fn at_eof(&self) -> bool {
        self.nth_index(0).is_none()
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        !self.at_eof() && self.current() == kind
    }

    fn at_kw(&self, word: &str) -> bool {
        self.at(IDENT) && self.current_text() == word
    }

    fn nth_at(&self, n: usize, kind: SyntaxKind) -> bool {
        self.nth_index(n).is_some() && self.nth(n) == kind
    }

    // ------------------------------------------------------------------------
    // Tree building
    // ------------------------------------------------------------------------

    fn eat_trivia(&mut self) {
        while let Some(token) = self.tokens.get(self.pos) {
            if !token.kind.is_trivia() {
                break;
            }
            self.builder.token(token.kind.into(), token.text);
            self.pos += 1;
        }
    }

    fn start_node(&mut self, kind: SyntaxKind) {
        self.eat_trivia();
        self.builder.start_node(kind.into());
    }

    fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
    }

    fn checkpoint(&mut self) -> Checkpoint {
        self.eat_trivia();
        self.builder.checkpoint()
    }

    fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    fn bump(&mut self) {
        self.eat_trivia();
        if let Some(token) = self.tokens.get(self.pos) {
            self.builder.token(token.kind.into(), token.text);
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: SyntaxKind, what: &str) -> bool {
        if self.eat(kind) {
            return true;
        }
        self.error(format!("expected {what}"));
        false
    }

    fn expect_kw(&mut self, word: &str) -> bool {
        if self.at_kw(word) {
            self.bump();
            return true;
        }
        self.error(format!("expected '{word}'"));
        false
    }

    fn error(&mut self, message: impl Into<String>) {
        let range = self.current_range();
        self.errors.push(SyntaxError::new(message, range));
    }

    fn error_and_bump(&mut self, message: &str) {
        self.error(message);
        self.start_node(ERROR);
        self.bump();
        self.finish_node();
    }

    /// Wrap tokens into an `ERROR` node until one of `stop` (not consumed).
    fn recover_until(&mut self, stop: &[SyntaxKind]) {
        if self.at_eof() || stop.contains(&self.current()) {
            return;
        }
        self.start_node(ERROR);
        while !self.at_eof() && !stop.contains(&self.current()) {
            self.bump();
        }
        self.finish_node();
    }

    // ------------------------------------------------------------------------
    // Compilation unit
    // ------------------------------------------------------------------------

    fn source_file(&mut self) {
        self.start_node(SOURCE_FILE);
        if self.at_kw("package") {
            self.package_decl();
        } else {
            self.error("expected 'package'");
        }
        while !self.at_eof() {
            self.top_level();
        }
        self.eat_trivia();
        self.finish_node();
    }

    fn package_decl(&mut self) {
        self.start_node(PACKAGE_DECL);
        self.bump();
        self.qualified_name();
        self.finish_node();
    }

    fn qualified_name(&mut self) {
        self.start_node(QUALIFIED_NAME);
        self.expect(IDENT, "a package name");
        while self.at(DOT) && self.nth_at(1, IDENT) {
            self.bump();
            self.bump();
        }
        self.finish_node();
    }

    fn top_level(&mut self) {
        if !self.at(IDENT) {
            self.error_and_bump("expected a top-level declaration");
            return;
        }
        match self.current_text() {
            "interface" => self.classifier(INTERFACE_DECL),
            "class" | "user" => self.classifier(CLASS_DECL),
            "enumeration" => self.enumeration(),
            "association" => self.association(),
            "projection" => self.projection(),
            "service" => self.service_group(),
            _ => self.error_and_bump("expected a top-level declaration"),
        }
    }

    // ------------------------------------------------------------------------
    // Classifiers
    // ------------------------------------------------------------------------

    fn classifier(&mut self, kind: SyntaxKind) {
        self.start_node(kind);
        self.bump();
        self.expect(IDENT, "a classifier name");
        self.classifier_header();
        self.class_body();
        self.finish_node();
    }

    fn classifier_header(&mut self) {
        while self.at(IDENT) {
            match self.current_text() {
                "abstract" => self.abstract_clause(),
                "extends" => {
                    self.start_node(EXTENDS_CLAUSE);
                    self.bump();
                    self.classifier_ref();
                    self.finish_node();
                }
                "implements" => {
                    self.start_node(IMPLEMENTS_CLAUSE);
                    self.bump();
                    self.classifier_ref();
                    while self.eat(COMMA) {
                        self.classifier_ref();
                    }
                    self.finish_node();
                }
                word if keywords::is_classifier_modifier(word) => {
                    self.start_node(CLASSIFIER_MODIFIER);
                    self.bump();
                    self.finish_node();
                }
                _ => {
                    self.error_and_bump("expected a classifier modifier or '{'");
                }
            }
        }
    }

    fn abstract_clause(&mut self) {
        self.start_node(ABSTRACT_CLAUSE);
        self.bump();
        if self.eat(L_PAREN) {
            // Strategies are dash-joined words: table-per-class
            while !self.at_eof() && matches!(self.current(), IDENT | MINUS) {
                self.bump();
            }
            self.expect(R_PAREN, "')'");
        }
        self.finish_node();
    }

    fn classifier_ref(&mut self) {
        self.start_node(CLASSIFIER_REF);
        self.expect(IDENT, "a classifier name");
        self.finish_node();
    }

    fn class_body(&mut self) {
        self.start_node(CLASS_BODY);
        if self.expect(L_BRACE, "'{'") {
            while !self.at_eof() && !self.at(R_BRACE) {
                if self.at(IDENT) {
                    self.member();
                } else {
                    self.error_and_bump("expected a member declaration");
                }
            }
            self.expect(R_BRACE, "'}'");
        }
        self.finish_node();
    }

    /// `name: Type?[m..n] modifiers validations orderBy;`
    fn member(&mut self) {
        let checkpoint = self.checkpoint();
        self.bump();
        self.expect(COLON, "':'");
        self.type_ref();
        if self.at(QUESTION) {
            self.start_node(OPTIONAL_MARKER);
            self.bump();
            self.finish_node();
        }
        let kind = if self.at(L_BRACKET) {
            self.multiplicity();
            REFERENCE_PROPERTY
        } else {
            DATA_TYPE_PROPERTY
        };
        self.start_node_at(checkpoint, kind);
        self.property_modifiers();
        while self.at(IDENT)
            && keywords::VALIDATIONS.contains(&self.current_text())
            && self.nth_at(1, L_PAREN)
        {
            self.validation();
        }
        if self.at_kw("orderBy") {
            self.order_by();
        }
        if !self.eat(SEMICOLON) {
            self.error("expected ';'");
            self.recover_until(&[SEMICOLON, R_BRACE]);
            self.eat(SEMICOLON);
        }
        self.finish_node();
    }

    fn type_ref(&mut self) {
        self.start_node(TYPE_REF);
        self.expect(IDENT, "a type name");
        self.finish_node();
    }

    fn property_modifiers(&mut self) {
        while self.at(IDENT) && keywords::is_property_modifier(self.current_text()) {
            self.start_node(PROPERTY_MODIFIER);
            self.bump();
            self.finish_node();
        }
    }

    fn multiplicity(&mut self) {
        self.start_node(MULTIPLICITY);
        self.bump();
        self.multiplicity_bound();
        self.expect(DOT_DOT, "'..'");
        self.multiplicity_bound();
        self.expect(R_BRACKET, "']'");
        self.finish_node();
    }

    fn multiplicity_bound(&mut self) {
        if !self.eat(INTEGER) && !self.eat(STAR) {
            self.error("expected a multiplicity bound");
        }
    }

    fn validation(&mut self) {
        self.start_node(VALIDATION);
        self.bump();
        self.bump();
        self.expect(INTEGER, "an integer");
        self.expect(R_PAREN, "')'");
        self.finish_node();
    }

    fn order_by(&mut self) {
        self.start_node(ORDER_BY);
        self.bump();
        self.expect(COLON, "':'");
        self.order_by_member();
        while self.eat(COMMA) {
            self.order_by_member();
        }
        self.finish_node();
    }

    fn order_by_member(&mut self) {
        self.start_node(ORDER_BY_MEMBER);
        if self.at_kw("this") {
            self.this_member_path();
        } else {
            self.error("expected 'this'");
        }
        if self.at_kw("ascending") || self.at_kw("descending") {
            self.bump();
        }
        self.finish_node();
    }

    // ------------------------------------------------------------------------
    // Enumerations
    // ------------------------------------------------------------------------

    fn enumeration(&mut self) {
        self.start_node(ENUMERATION_DECL);
        self.bump();
        self.expect(IDENT, "an enumeration name");
        if self.expect(L_BRACE, "'{'") {
            while !self.at_eof() && !self.at(R_BRACE) {
                if self.at(IDENT) {
                    self.start_node(ENUM_LITERAL);
                    self.bump();
                    if self.eat(L_PAREN) {
                        self.expect(STRING, "a pretty name");
                        self.expect(R_PAREN, "')'");
                    }
                    self.finish_node();
                    self.eat(COMMA);
                } else {
                    self.error_and_bump("expected an enumeration literal");
                }
            }
            self.expect(R_BRACE, "'}'");
        }
        self.finish_node();
    }

    // ------------------------------------------------------------------------
    // Associations
    // ------------------------------------------------------------------------

    fn association(&mut self) {
        self.start_node(ASSOCIATION_DECL);
        self.bump();
        self.expect(IDENT, "an association name");
        if self.expect(L_BRACE, "'{'") {
            let mut ends = 0;
            while self.at(IDENT) && !self.at_kw("relationship") {
                self.association_end();
                ends += 1;
            }
            if ends != 2 {
                self.error(format!("expected exactly two association ends, found {ends}"));
            }
            if self.at_kw("relationship") {
                self.start_node(RELATIONSHIP);
                self.bump();
                self.criteria();
                self.finish_node();
            }
            self.recover_until(&[R_BRACE]);
            self.expect(R_BRACE, "'}'");
        }
        self.finish_node();
    }

    fn association_end(&mut self) {
        self.start_node(ASSOCIATION_END);
        self.bump();
        self.expect(COLON, "':'");
        self.type_ref();
        if self.at(L_BRACKET) {
            self.multiplicity();
        } else {
            self.error("expected a multiplicity");
        }
        self.property_modifiers();
        if self.at_kw("orderBy") {
            self.order_by();
        }
        if !self.eat(SEMICOLON) {
            self.error("expected ';'");
            self.recover_until(&[SEMICOLON, R_BRACE]);
            self.eat(SEMICOLON);
        }
        self.finish_node();
    }

    // ------------------------------------------------------------------------
    // Projections
    // ------------------------------------------------------------------------

    fn projection(&mut self) {
        self.start_node(PROJECTION_DECL);
        self.bump();
        self.expect(IDENT, "a projection name");
        self.expect_kw("on");
        self.classifier_ref();
        self.projection_body();
        self.finish_node();
    }

    fn projection_body(&mut self) {
        self.start_node(PROJECTION_BODY);
        if self.expect(L_BRACE, "'{'") {
            while !self.at_eof() && !self.at(R_BRACE) {
                if self.at(IDENT) {
                    self.start_node(PROJECTION_MEMBER);
                    self.bump();
                    self.expect(COLON, "':'");
                    if self.at(L_BRACE) {
                        self.projection_body();
                    } else if !self.eat(STRING) && !self.eat(IDENT) {
                        self.error("expected a header, a projection name or '{'");
                    }
                    self.finish_node();
                    self.eat(COMMA);
                } else {
                    self.error_and_bump("expected a projection member");
                }
            }
            self.expect(R_BRACE, "'}'");
        }
        self.finish_node();
    }

    // ------------------------------------------------------------------------
    // Services
    // ------------------------------------------------------------------------

    fn service_group(&mut self) {
        self.start_node(SERVICE_GROUP_DECL);
        self.bump();
        self.classifier_ref();
        if self.expect(L_BRACE, "'{'") {
            while !self.at_eof() && !self.at(R_BRACE) {
                if self.at(SLASH) {
                    self.url();
                } else {
                    self.error_and_bump("expected a url");
                }
            }
            self.expect(R_BRACE, "'}'");
        }
        self.finish_node();
    }

    fn url(&mut self) {
        self.start_node(URL_DECL);
        self.start_node(URL_PATH);
        while self.eat(SLASH) {
            if self.at(IDENT) {
                self.start_node(URL_SEGMENT);
                self.bump();
                self.finish_node();
            } else if self.eat(L_BRACE) {
                self.url_parameter();
                self.expect(R_BRACE, "'}'");
            } else {
                self.error("expected a path segment or '{'");
            }
        }
        self.finish_node();
        if self.at(QUESTION) {
            self.start_node(QUERY_PARAMETERS);
            self.bump();
            loop {
                if self.expect(L_BRACE, "'{'") {
                    self.url_parameter();
                    self.expect(R_BRACE, "'}'");
                }
                if !self.eat(AMP) {
                    break;
                }
            }
            self.finish_node();
        }
        while self.at(IDENT) && keywords::is_verb(self.current_text()) {
            self.service();
        }
        self.finish_node();
    }

    fn url_parameter(&mut self) {
        self.start_node(URL_PARAMETER);
        self.expect(IDENT, "a parameter name");
        self.expect(COLON, "':'");
        self.type_ref();
        if self.at(L_BRACKET) {
            self.multiplicity();
        }
        self.property_modifiers();
        self.finish_node();
    }

    fn service(&mut self) {
        self.start_node(SERVICE_DECL);
        self.bump();
        if self.expect(L_BRACE, "'{'") {
            while !self.at_eof() && !self.at(R_BRACE) {
                if !self.at(IDENT) {
                    self.error_and_bump("expected a service clause");
                    continue;
                }
                match self.current_text() {
                    "multiplicity" => self.service_multiplicity(),
                    "projection" => self.service_projection(),
                    "orderBy" => {
                        self.start_node(SERVICE_ORDER_BY);
                        self.order_by();
                        self.expect(SEMICOLON, "';'");
                        self.finish_node();
                    }
                    word if keywords::is_criteria_keyword(word) => self.service_criteria(),
                    _ => self.error_and_bump("expected a service clause"),
                }
            }
            self.expect(R_BRACE, "'}'");
        }
        self.finish_node();
    }

    fn service_multiplicity(&mut self) {
        self.start_node(SERVICE_MULTIPLICITY);
        self.bump();
        self.expect(COLON, "':'");
        if self.at_kw("one") || self.at_kw("many") {
            self.bump();
        } else {
            self.error("expected 'one' or 'many'");
        }
        self.expect(SEMICOLON, "';'");
        self.finish_node();
    }

    fn service_projection(&mut self) {
        self.start_node(SERVICE_PROJECTION);
        self.bump();
        self.expect(COLON, "':'");
        self.expect(IDENT, "a projection name");
        self.expect(SEMICOLON, "';'");
        self.finish_node();
    }

    fn service_criteria(&mut self) {
        self.start_node(SERVICE_CRITERIA);
        self.bump();
        self.expect(COLON, "':'");
        self.criteria();
        if !self.eat(SEMICOLON) {
            self.error("expected ';'");
            self.recover_until(&[SEMICOLON, R_BRACE]);
            self.eat(SEMICOLON);
        }
        self.finish_node();
    }

    // ------------------------------------------------------------------------
    // Criteria
    // ------------------------------------------------------------------------

    fn criteria(&mut self) {
        let checkpoint = self.checkpoint();
        self.criteria_and();
        while self.at(PIPE_PIPE) {
            self.start_node_at(checkpoint, CRITERIA_OR);
            self.bump();
            self.criteria_and();
            self.finish_node();
        }
    }

    fn criteria_and(&mut self) {
        let checkpoint = self.checkpoint();
        self.criteria_atom();
        while self.at(AMP_AMP) {
            self.start_node_at(checkpoint, CRITERIA_AND);
            self.bump();
            self.criteria_atom();
            self.finish_node();
        }
    }

    fn criteria_atom(&mut self) {
        if self.at_kw("all") && !self.nth_at(1, DOT) {
            self.start_node(CRITERIA_ALL);
            self.bump();
            self.finish_node();
            return;
        }
        if self.at_kw("native") && self.nth_at(1, L_PAREN) {
            self.start_node(CRITERIA_NATIVE);
            self.bump();
            self.bump();
            self.expect(IDENT, "a native criteria name");
            self.expect(R_PAREN, "')'");
            self.finish_node();
            return;
        }
        if self.at(L_PAREN) {
            self.start_node(CRITERIA_GROUP);
            self.bump();
            self.criteria();
            self.expect(R_PAREN, "')'");
            self.finish_node();
            return;
        }

        let checkpoint = self.checkpoint();
        if !self.value() {
            return;
        }
        if self.at_kw("equalsEdgePoint") {
            self.start_node_at(checkpoint, CRITERIA_EDGE_POINT);
            self.bump();
            self.finish_node();
        } else if self.at_operator() {
            self.start_node_at(checkpoint, CRITERIA_OPERATOR);
            self.start_node(OPERATOR);
            self.bump();
            self.finish_node();
            self.value();
            self.finish_node();
        } else {
            self.start_node_at(checkpoint, CRITERIA_BARE_VALUE);
            self.finish_node();
        }
    }

    fn at_operator(&self) -> bool {
        match self.current() {
            EQ_EQ | NEQ | LT | GT | LT_EQ | GT_EQ => !self.at_eof(),
            IDENT => keywords::OPERATOR_WORDS.contains(&self.current_text()),
            _ => false,
        }
    }

    /// Parse one expression value. Returns false (with an error) when the
    /// cursor is not at a value.
    fn value(&mut self) -> bool {
        match self.current() {
            _ if self.at_eof() => {
                self.error("expected a value");
                false
            }
            IDENT if self.current_text() == "this" => {
                self.this_member_path();
                true
            }
            IDENT if self.nth_at(1, DOT) => {
                self.start_node(TYPE_MEMBER_PATH);
                self.bump();
                self.member_path_segments();
                self.finish_node();
                true
            }
            IDENT if self.current_text() == "user" => {
                self.start_node(USER_LITERAL);
                self.bump();
                self.finish_node();
                true
            }
            IDENT if matches!(self.current_text(), "true" | "false" | "null") => {
                self.literal();
                true
            }
            IDENT => {
                self.start_node(VARIABLE_REF);
                self.bump();
                self.finish_node();
                true
            }
            INTEGER | STRING | MINUS => {
                self.literal();
                true
            }
            L_PAREN => {
                self.start_node(LITERAL_LIST);
                self.bump();
                self.literal();
                while self.eat(COMMA) {
                    self.literal();
                }
                self.expect(R_PAREN, "')'");
                self.finish_node();
                true
            }
            _ => {
                self.error_and_bump("expected a value");
                false
            }
        }
    }

    fn literal(&mut self) {
        self.start_node(LITERAL);
        if self.eat(MINUS) {
            self.expect(INTEGER, "an integer");
        } else if self.at(INTEGER) || self.at(STRING) {
            self.bump();
        } else if matches!(self.current_text(), "true" | "false" | "null") && self.at(IDENT) {
            self.bump();
        } else {
            self.error("expected a literal");
        }
        self.finish_node();
    }

    fn this_member_path(&mut self) {
        self.start_node(THIS_MEMBER_PATH);
        self.bump();
        if self.at(DOT) {
            self.member_path_segments();
        } else {
            self.error("expected '.' after 'this'");
        }
        self.finish_node();
    }

    fn member_path_segments(&mut self) {
        while self.eat(DOT) {
            self.expect(IDENT, "a member name");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child_kinds(node: &SyntaxNode) -> Vec<SyntaxKind> {
        node.children().map(|n| n.kind()).collect()
    }

    #[test]
    fn test_parse_class_with_members() {
        let text = "package com.example\n\
                    class Answer {\n\
                        id: Long key;\n\
                        question: Question[1..1];\n\
                    }\n";
        let parse = parse(text);

        assert!(parse.ok(), "{:?}", parse.errors());
        let root = parse.syntax();
        assert_eq!(root.to_string(), text);
        assert_eq!(child_kinds(&root), vec![PACKAGE_DECL, CLASS_DECL]);

        let body = root
            .descendants()
            .find(|n| n.kind() == CLASS_BODY)
            .unwrap();
        assert_eq!(child_kinds(&body), vec![DATA_TYPE_PROPERTY, REFERENCE_PROPERTY]);
    }

    #[test]
    fn test_parse_association_relationship() {
        let text = "package p\n\
                    association QuestionHasAnswers {\n\
                        question: Question[1..1];\n\
                        answers: Answer[0..*] owned;\n\
                        relationship this.id == Answer.questionId && this.id != 0\n\
                    }";
        let parse = parse(text);

        assert!(parse.ok(), "{:?}", parse.errors());
        let relationship = parse
            .syntax()
            .descendants()
            .find(|n| n.kind() == RELATIONSHIP)
            .unwrap();
        assert_eq!(child_kinds(&relationship), vec![CRITERIA_AND]);
        let and = relationship.first_child().unwrap();
        assert_eq!(child_kinds(&and), vec![CRITERIA_OPERATOR, CRITERIA_OPERATOR]);
    }

    #[test]
    fn test_or_binds_looser_than_and() {
        let parse = parse_service_criteria("criteria: all || this.a == 1 && this.b == 2;");

        assert!(parse.ok(), "{:?}", parse.errors());
        let criteria = parse
            .syntax()
            .descendants()
            .find(|n| n.kind() == SERVICE_CRITERIA)
            .unwrap();
        let or = criteria.first_child().unwrap();
        assert_eq!(or.kind(), CRITERIA_OR);
        assert_eq!(child_kinds(&or), vec![CRITERIA_ALL, CRITERIA_AND]);
    }

    #[test]
    fn test_parse_service_group() {
        let text = "package p\n\
                    service Question {\n\
                        /question/{id: Long[1..1]}?{version: Integer[0..1]}\n\
                            GET { multiplicity: one; criteria: this.id == id; projection: QuestionProjection; }\n\
                            PUT { criteria: this.id == id; }\n\
                    }";
        let parse = parse(text);

        assert!(parse.ok(), "{:?}", parse.errors());
        let url = parse
            .syntax()
            .descendants()
            .find(|n| n.kind() == URL_DECL)
            .unwrap();
        assert_eq!(
            child_kinds(&url),
            vec![URL_PATH, QUERY_PARAMETERS, SERVICE_DECL, SERVICE_DECL]
        );
    }

    #[test]
    fn test_bare_value_criteria_is_its_own_shape() {
        let parse = parse_service_criteria("criteria: this.id;");

        assert!(parse.ok());
        assert!(parse.syntax().descendants().any(|n| n.kind() == CRITERIA_BARE_VALUE));
    }

    #[test]
    fn test_missing_semicolon_is_reported_and_recovered() {
        let text = "package p\nclass A { id: Long key\n name: String; }";
        let parse = parse(text);

        assert_eq!(parse.errors().len(), 1);
        assert_eq!(parse.errors()[0].message, "expected ';'");
        assert_eq!(parse.syntax().to_string(), text);
    }

    #[test]
    fn test_association_needs_two_ends() {
        let parse = parse("package p\nassociation A { a: A[0..1]; }");

        assert!(
            parse
                .errors()
                .iter()
                .any(|e| e.message == "expected exactly two association ends, found 1")
        );
    }

    #[test]
    fn test_parse_members_entry_point() {
        let parse = parse_members("valid: TemporalRange? valid private;\nvalidFrom: TemporalInstant? valid from;");

        assert!(parse.ok(), "{:?}", parse.errors());
        let root = parse.syntax();
        assert_eq!(root.kind(), MACRO_BODY);
        assert_eq!(child_kinds(&root), vec![DATA_TYPE_PROPERTY, DATA_TYPE_PROPERTY]);
    }
}
