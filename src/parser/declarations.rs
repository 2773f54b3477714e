//! Declaration parsing implementation
//!
//! This module handles the top-level declaration forms:
//!
//! - Typedefs: `typedef ... alias;`
//! - Function prototypes and definitions: `type name(params);` / `type name(params) { ... }`
//! - Variable declarations: `type *name[dims] = initializer;`
//!
//! # Grammar
//!
//! ```text
//! typedef      ::= "typedef" token* ";"
//! function     ::= specifier* data_type "*"* identifier "(" balanced ")" ( ";" | "{" balanced "}" )
//! variable     ::= data_type declarator ( "," declarator )* ";"
//! declarator   ::= "*"* identifier ( "[" balanced "]" )* ( "=" initializer )?
//! data_type    ::= scalar_type ( scalar_type | "const" | "volatile" )*
//! ```
//!
//! Parameter lists and function bodies are kept as opaque spans.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.
//! Each `try_` method rewinds and returns `None` when its construct does not match.

use crate::parser::ast::*;
use crate::parser::parse::Parser;
use crate::parser::token::{Token, TokenKind};

impl<'src> Parser<'src> {
    /// Parse `typedef ... ;`, keeping the alias name as a child.
    pub(crate) fn try_parse_typedef(&mut self) -> Option<Subtree> {
        if !self.check(TokenKind::Typedef) {
            return None;
        }

        let start = self.checkpoint();
        let mark = self.comment_mark();
        let first = self.advance();

        let mut depth = 0usize;
        let mut alias: Option<Token<'src>> = None;
        let mut pointer_alias: Option<Token<'src>> = None;
        let mut previous = first.kind;

        loop {
            let token = self.advance();
            match token.kind {
                TokenKind::LParen | TokenKind::LBrace | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBrace | TokenKind::RBracket => {
                    depth = depth.saturating_sub(1)
                }
                TokenKind::Identifier if depth == 0 => alias = Some(token),
                // typedef int (*handler)(int);
                TokenKind::Identifier
                    if depth == 1 && previous == TokenKind::Star && pointer_alias.is_none() =>
                {
                    pointer_alias = Some(token)
                }
                TokenKind::Semicolon if depth == 0 => {
                    let children = alias
                        .or(pointer_alias)
                        .map(|name| Subtree::leaf(NodeKind::Identifier, name.span, name.location))
                        .into_iter()
                        .collect();
                    return Some(self.node_from_tokens(
                        NodeKind::Typedef,
                        first,
                        token.span.end,
                        children,
                        mark,
                    ));
                }
                TokenKind::Eof => {
                    self.record_error(
                        "expected ';' after typedef",
                        Span::new(first.span.start, token.span.start),
                        first.location,
                    );
                    self.rewind(start);
                    return None;
                }
                _ => {}
            }
            previous = token.kind;
        }
    }

    /// Parse a function prototype or definition.
    pub(crate) fn try_parse_function(&mut self) -> Option<Subtree> {
        let first = self.peek_significant();
        if !first.kind.is_declaration_specifier() && !first.kind.is_scalar_type() {
            return None;
        }

        let start = self.checkpoint();
        let mark = self.comment_mark();

        while self.peek_significant().kind.is_declaration_specifier() {
            self.advance();
        }

        let Some(data_type) = self.parse_data_type() else {
            self.rewind(start);
            return None;
        };
        self.skip_pointers();

        let Some(name) = self.match_token(TokenKind::Identifier) else {
            self.rewind(start);
            return None;
        };
        if !self.check(TokenKind::LParen) {
            self.rewind(start);
            return None;
        }

        let Some(params) = self.parse_group(
            TokenKind::LParen,
            TokenKind::RParen,
            NodeKind::ParameterList,
            "')' closing the parameter list",
        ) else {
            self.rewind(start);
            return None;
        };

        let mut children = vec![
            data_type,
            Subtree::leaf(NodeKind::Identifier, name.span, name.location),
            params,
        ];

        match self.peek_significant().kind {
            TokenKind::Semicolon => {
                let semi = self.advance();
                Some(self.node_from_tokens(
                    NodeKind::FunctionDeclaration,
                    first,
                    semi.span.end,
                    children,
                    mark,
                ))
            }
            TokenKind::LBrace => {
                let Some(body) = self.parse_group(
                    TokenKind::LBrace,
                    TokenKind::RBrace,
                    NodeKind::Block,
                    "'}' closing the function body",
                ) else {
                    self.rewind(start);
                    return None;
                };
                let end = body.span.end;
                children.push(body);
                Some(self.node_from_tokens(
                    NodeKind::FunctionDefinition,
                    first,
                    end,
                    children,
                    mark,
                ))
            }
            _ => {
                self.rewind(start);
                None
            }
        }
    }

    /// Parse `type *name = initializer, *other;`.
    ///
    /// Must start with a scalar type keyword. A missing first identifier is a
    /// plain non-match; a missing `;`, or a `,` with no identifier after it, is
    /// recorded as an error and the rule still fails.
    pub(crate) fn try_parse_variable_declaration(&mut self) -> Option<Subtree> {
        let first = self.peek_significant();
        if !first.kind.is_scalar_type() {
            return None;
        }

        let start = self.checkpoint();
        let mark = self.comment_mark();

        let data_type = self.parse_data_type()?;
        self.skip_pointers();

        let Some(name) = self.match_token(TokenKind::Identifier) else {
            self.rewind(start);
            return None;
        };

        let mut children = vec![data_type];
        if self.parse_declarator_rest(name, &mut children).is_none() {
            self.rewind(start);
            return None;
        }

        while self.match_token(TokenKind::Comma).is_some() {
            self.skip_pointers();
            let Some(name) = self.match_token(TokenKind::Identifier) else {
                let found = self.peek_significant();
                self.record_error(
                    format!("expected identifier after ',', found {}", found.kind),
                    found.span,
                    found.location,
                );
                self.rewind(start);
                return None;
            };
            if self.parse_declarator_rest(name, &mut children).is_none() {
                self.rewind(start);
                return None;
            }
        }

        match self.match_token(TokenKind::Semicolon) {
            Some(semi) => Some(self.node_from_tokens(
                NodeKind::Declaration,
                first,
                semi.span.end,
                children,
                mark,
            )),
            None => {
                let found = self.peek_significant();
                self.record_error(
                    format!(
                        "expected ';' after variable declaration, found {}",
                        found.kind
                    ),
                    found.span,
                    found.location,
                );
                self.rewind(start);
                None
            }
        }
    }

    /// Array dimensions and initializer of one declarator whose name was just
    /// consumed. The name and the value are pushed onto `children`.
    fn parse_declarator_rest(
        &mut self,
        name: Token<'src>,
        children: &mut Vec<Subtree>,
    ) -> Option<()> {
        children.push(Subtree::leaf(NodeKind::Identifier, name.span, name.location));

        // Array dimensions are covered by the declaration's span
        while self.check(TokenKind::LBracket) {
            self.scan_group(TokenKind::LBracket, TokenKind::RBracket, "']' closing the array size")?;
        }

        if let Some(assign) = self.match_token(TokenKind::Assign) {
            children.push(self.parse_initializer(assign));
        }
        Some(())
    }

    /// One or more scalar type keywords, optionally mixed with `const`/`volatile`.
    pub(crate) fn parse_data_type(&mut self) -> Option<Subtree> {
        if !self.peek_significant().kind.is_scalar_type() {
            return None;
        }

        self.skip_trivia();
        let mark = self.comment_mark();
        let first = self.bump();
        let mut end = first.span.end;

        loop {
            let next = self.peek_significant().kind;
            if next.is_scalar_type() || matches!(next, TokenKind::Const | TokenKind::Volatile) {
                end = self.advance().span.end;
            } else {
                break;
            }
        }

        Some(self.node_from_tokens(NodeKind::DataType, first, end, Vec::new(), mark))
    }

    /// Pointer markers, each with optional qualifiers: `* const *`
    pub(crate) fn skip_pointers(&mut self) {
        while self.match_token(TokenKind::Star).is_some() {
            while matches!(
                self.peek_significant().kind,
                TokenKind::Const | TokenKind::Volatile | TokenKind::Restrict
            ) {
                self.advance();
            }
        }
    }

    /// Consume a bracketed group as one node; comments inside become its children.
    fn parse_group(
        &mut self,
        open: TokenKind,
        close: TokenKind,
        kind: NodeKind,
        expected: &str,
    ) -> Option<Subtree> {
        self.skip_trivia();
        let mark = self.comment_mark();
        let (first, last) = self.scan_group(open, close, expected)?;
        Some(self.node_from_tokens(kind, first, last.span.end, Vec::new(), mark))
    }

    /// Consume `open ... close` with nesting; records an error at end of file.
    fn scan_group(
        &mut self,
        open: TokenKind,
        close: TokenKind,
        expected: &str,
    ) -> Option<(Token<'src>, Token<'src>)> {
        let first = self.advance();
        debug_assert_eq!(first.kind, open);
        let mut depth = 1usize;

        loop {
            let token = self.advance();
            if token.kind == open {
                depth += 1;
            } else if token.kind == close {
                depth -= 1;
                if depth == 0 {
                    return Some((first, token));
                }
            } else if token.kind == TokenKind::Eof {
                self.record_error(
                    format!("expected {expected} before end of file"),
                    Span::new(first.span.start, token.span.start),
                    first.location,
                );
                return None;
            }
        }
    }
}
