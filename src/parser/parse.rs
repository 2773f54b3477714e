//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct, its token-cursor helpers and the
//! top-level dispatch loop behind [`Parser::parse_file`].
//!
//! # Parser Architecture
//!
//! Parser methods are split across files using `impl Parser` blocks:
//! - This module: cursor helpers, trivia handling, checkpoints, top-level loop
//! - `preprocessor`: `#` directives and includes
//! - `declarations`: typedefs, functions and variable declarations
//! - `expressions`: initializer expressions with precedence climbing
//!
//! # Fidelity
//!
//! Every byte of the input ends up under exactly one child of the program
//! root. Top-level trivia becomes sibling nodes; whitespace inside a construct
//! is covered by the construct's span; comments inside a construct become
//! children of the innermost construct that encloses them.
//!
//! Constructs are parsed speculatively into detached [`Subtree`]s. A rule that
//! does not match rewinds the lexer to its [`Checkpoint`] and the next rule is
//! tried; nothing is written to the arena until a rule succeeds.

use crate::parser::ast::*;
use crate::parser::error::{ErrorList, FatalError, ParseError, MAX_PARSE_ERRORS};
use crate::parser::lexer::{Lexer, LexerState};
use crate::parser::token::{Token, TokenKind};
use tracing::{debug, trace, warn};

/// Result of parsing one file
#[derive(Debug, Clone)]
pub struct ParsedFile<'src> {
    pub tree: SyntaxTree<'src>,
    pub errors: ErrorList,
}

/// Saved parser position for backtracking.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Checkpoint {
    lexer: LexerState,
    comments: usize,
    depth: usize,
}

/// Expression nesting (operators, parentheses, postfix chains) allowed in one
/// initializer before it is kept opaque instead.
pub const MAX_EXPRESSION_DEPTH: usize = 256;

/// Recursive descent parser building a full-fidelity [`SyntaxTree`]
pub struct Parser<'src> {
    pub(crate) lexer: Lexer<'src>,
    pub(crate) tree: SyntaxTree<'src>,
    pub(crate) errors: ErrorList,
    /// Comments skipped inside the construct being parsed, not yet attached
    pub(crate) comments: Vec<Subtree>,
    /// Nesting of the expression being parsed
    pub(crate) depth: usize,
}

impl<'src> Parser<'src> {
    pub fn new<S>(source: &'src S) -> Self
    where
        S: AsRef<[u8]> + ?Sized,
    {
        Self::from_lexer(Lexer::new(source))
    }

    /// Parse starting from wherever `lexer` currently is.
    ///
    /// The program root covers the source from the lexer's position onwards,
    /// so [`SyntaxTree::reconstruct`] yields exactly the bytes that were parsed.
    pub fn from_lexer(lexer: Lexer<'src>) -> Self {
        let tree = SyntaxTree::starting_at(lexer.source(), lexer.position(), lexer.location());
        Self {
            lexer,
            tree,
            errors: ErrorList::with_capacity(MAX_PARSE_ERRORS),
            comments: Vec::new(),
            depth: 0,
        }
    }

    /// Keep at most `capacity` recorded errors.
    pub fn with_error_capacity(mut self, capacity: usize) -> Self {
        self.errors = ErrorList::with_capacity(capacity);
        self
    }

    /// Parse the whole file into a tree rooted at a `Program` node.
    ///
    /// Malformed input still produces a tree; only an unterminated
    /// `#include <...` is fatal.
    pub fn parse_file(mut self) -> Result<ParsedFile<'src>, FatalError> {
        let root = self.tree.root();

        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::Eof => break,
                kind if kind.is_trivia() => self.push_trivia(root),
                TokenKind::Semicolon => {
                    self.bump();
                    self.tree
                        .push(root, NodeKind::EmptyDeclaration, token.span, token.location);
                }
                TokenKind::Hash => {
                    let directive = self.parse_directive()?;
                    trace!(kind = %directive.kind, start = directive.span.start, "directive");
                    self.tree.attach(root, directive);
                }
                _ => match self.parse_top_level_construct() {
                    Some(node) => {
                        trace!(kind = %node.kind, start = node.span.start, end = node.span.end, "construct");
                        self.tree.attach(root, node);
                    }
                    None => self.advance_unknown(root),
                },
            }
        }

        debug_assert!(self.comments.is_empty());
        debug!(
            nodes = self.tree.len(),
            errors = self.errors.len(),
            dropped = self.errors.dropped(),
            "parse finished"
        );

        Ok(ParsedFile {
            tree: self.tree,
            errors: self.errors,
        })
    }

    /// Typedef, then function, then variable declaration; first match wins.
    fn parse_top_level_construct(&mut self) -> Option<Subtree> {
        if let Some(node) = self.try_parse_typedef() {
            return Some(node);
        }
        if let Some(node) = self.try_parse_function() {
            return Some(node);
        }
        self.try_parse_variable_declaration()
    }

    /// Attach one trivia token to `parent`, merging runs of spaces or tabs.
    fn push_trivia(&mut self, parent: NodeId) {
        let first = self.bump();
        let mut span = first.span;

        if matches!(first.kind, TokenKind::Space | TokenKind::Tab) {
            while self.peek().kind == first.kind {
                span = span.merge(self.bump().span);
            }
        }

        self.tree
            .push(parent, trivia_node_kind(first.kind), span, first.location);
    }

    /// Consume one token no rule could place.
    fn advance_unknown(&mut self, parent: NodeId) {
        let token = self.bump();
        debug!(
            token = %token.kind,
            line = token.location.line,
            column = token.location.column,
            "no top-level rule matched, skipping token"
        );
        self.tree
            .push(parent, NodeKind::Unknown, token.span, token.location);
    }

    // ===== Helper methods =====

    /// Next raw token, trivia included, without consuming it.
    pub(crate) fn peek(&self) -> Token<'src> {
        self.lexer.peek_token()
    }

    /// Next non-trivia token without consuming anything.
    pub(crate) fn peek_significant(&self) -> Token<'src> {
        self.lexer.peek_token_skip_trivia()
    }

    /// The `n`th non-trivia token ahead, counting from zero.
    pub(crate) fn peek_nth_significant(&self, n: usize) -> Token<'src> {
        let mut probe = self.lexer.clone();
        let mut seen = 0;
        loop {
            let token = probe.next_token();
            if token.kind.is_trivia() {
                continue;
            }
            if seen == n || token.kind == TokenKind::Eof {
                return token;
            }
            seen += 1;
        }
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek_significant().kind == kind
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    pub(crate) fn bump(&mut self) -> Token<'src> {
        self.lexer.next_token()
    }

    /// Skip trivia and consume the next token if it has the given kind.
    pub(crate) fn match_token(&mut self, kind: TokenKind) -> Option<Token<'src>> {
        if self.check(kind) {
            self.skip_trivia();
            Some(self.bump())
        } else {
            None
        }
    }

    /// Skip trivia and consume the next token whatever it is.
    pub(crate) fn advance(&mut self) -> Token<'src> {
        self.skip_trivia();
        self.bump()
    }

    /// Skip whitespace and comments, keeping the comments for the enclosing node.
    pub(crate) fn skip_trivia(&mut self) {
        while self.peek().kind.is_trivia() {
            let token = self.bump();
            self.keep_comment(token);
        }
    }

    /// Like [`skip_trivia`](Self::skip_trivia) but stops at a newline.
    pub(crate) fn skip_horizontal_trivia(&mut self) {
        loop {
            let kind = self.peek().kind;
            if !kind.is_trivia() || kind == TokenKind::Newline {
                break;
            }
            let token = self.bump();
            self.keep_comment(token);
        }
    }

    fn keep_comment(&mut self, token: Token<'src>) {
        if token.kind.is_comment() {
            self.comments.push(Subtree::leaf(
                trivia_node_kind(token.kind),
                token.span,
                token.location,
            ));
        }
    }

    /// Position in the pending comment buffer; pair with [`take_comments`](Self::take_comments).
    pub(crate) fn comment_mark(&self) -> usize {
        self.comments.len()
    }

    /// Remove and return the comments collected since `mark`.
    pub(crate) fn take_comments(&mut self, mark: usize) -> Vec<Subtree> {
        self.comments.split_off(mark.min(self.comments.len()))
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            lexer: self.lexer.snapshot(),
            comments: self.comments.len(),
            depth: self.depth,
        }
    }

    pub(crate) fn rewind(&mut self, checkpoint: Checkpoint) {
        self.lexer.restore(checkpoint.lexer);
        self.comments.truncate(checkpoint.comments);
        self.depth = checkpoint.depth;
    }

    /// Record a non-fatal error covering `span`.
    pub(crate) fn record_error(
        &mut self,
        message: impl Into<String>,
        span: Span,
        location: SourceLocation,
    ) {
        let error = ParseError::new(message, span, location);
        debug!(%error, "recorded parse error");
        if !self.errors.push(error) && self.errors.dropped() == 1 {
            warn!(
                capacity = self.errors.capacity(),
                "parse error list is full, further errors are dropped"
            );
        }
    }

    /// Build a construct node from its first and last tokens.
    pub(crate) fn node_from_tokens(
        &mut self,
        kind: NodeKind,
        first: Token<'src>,
        last_end: usize,
        mut children: Vec<Subtree>,
        comment_mark: usize,
    ) -> Subtree {
        children.extend(self.take_comments(comment_mark));
        Subtree::with_children(
            kind,
            Span::new(first.span.start, last_end),
            first.location,
            children,
        )
    }
}

pub(crate) fn trivia_node_kind(kind: TokenKind) -> NodeKind {
    match kind {
        TokenKind::Space => NodeKind::Space,
        TokenKind::Tab => NodeKind::Tab,
        TokenKind::Newline => NodeKind::Newline,
        TokenKind::LineComment => NodeKind::LineComment,
        TokenKind::BlockComment => NodeKind::BlockComment,
        _ => NodeKind::Unknown,
    }
}
