//! Expression parsing implementation
//!
//! Initializers are parsed as C expressions using precedence climbing for
//! binary operators and recursive descent for the other forms.
//!
//! # Supported Expressions
//!
//! - Literals: integer, float, hex, character, string (adjacent strings merge)
//! - Identifiers
//! - Binary operators: arithmetic, comparison, logical, bitwise, shifts
//! - Assignment and compound assignment (right-associative)
//! - Unary operators: `-`, `+`, `!`, `~`, `&`, `*`, `++`, `--`, `sizeof`
//! - Postfix: `[]`, `.`, `->`, `()`, `++`, `--`
//! - Ternary: `? :`
//! - Type casts: `(type)expr`
//!
//! A parenthesised expression keeps the node of its inner expression, widened
//! to cover the parentheses.
//!
//! When an initializer is not a single expression followed by `;` or the `,`
//! of the next declarator (brace lists, comma expressions, stray tokens) it is
//! kept as one opaque `Initializer` node instead. The same happens once the
//! expression nests deeper than [`MAX_EXPRESSION_DEPTH`]; every method that
//! adds a level calls `enter` and, on success, `leave`. A failed attempt is
//! rewound to a checkpoint, which restores the depth as well.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::parse::{Parser, MAX_EXPRESSION_DEPTH};
use crate::parser::token::{Token, TokenKind};
use tracing::debug;

/// Parsing function for one precedence level
type Level<'src> = fn(&mut Parser<'src>) -> Option<Subtree>;

impl<'src> Parser<'src> {
    /// Parse the right-hand side of `=` in a declaration.
    pub(crate) fn parse_initializer(&mut self, assign: Token<'src>) -> Subtree {
        let start = self.checkpoint();

        if let Some(expr) = self.parse_expression() {
            if ends_initializer(self.peek_significant().kind) {
                return expr;
            }
        }

        self.rewind(start);
        self.parse_opaque_initializer(assign)
    }

    /// Everything up to the `;` or `,` that ends the declarator, as one node.
    fn parse_opaque_initializer(&mut self, assign: Token<'src>) -> Subtree {
        let next = self.peek_significant();
        if next.kind == TokenKind::Eof || ends_initializer(next.kind) {
            self.record_error("expected expression after '='", next.span, next.location);
            let at = assign.span.end;
            let location =
                SourceLocation::new(assign.location.line, assign.location.column + assign.span.len());
            return Subtree::leaf(NodeKind::Initializer, Span::new(at, at), location);
        }

        self.skip_trivia();
        let mark = self.comment_mark();
        let first = self.bump();
        let mut end = first.span.end;
        let mut depth = opening_delta(first.kind);

        loop {
            let next = self.peek_significant();
            match next.kind {
                TokenKind::Eof => break,
                kind if depth <= 0 && ends_initializer(kind) => break,
                kind => {
                    depth += opening_delta(kind);
                    end = self.advance().span.end;
                }
            }
        }

        debug!(start = first.span.start, end, "initializer kept opaque");
        self.node_from_tokens(NodeKind::Initializer, first, end, Vec::new(), mark)
    }

    /// Parse expression (top-level entry point)
    pub(crate) fn parse_expression(&mut self) -> Option<Subtree> {
        self.parse_assignment()
    }

    /// Parse assignment or ternary (right-associative)
    fn parse_assignment(&mut self) -> Option<Subtree> {
        self.enter()?;
        self.skip_trivia();
        let mark = self.comment_mark();
        let target = self.parse_ternary()?;

        let expr = match assignment_op(self.peek_significant().kind) {
            Some(op) => {
                self.advance();
                let value = self.parse_assignment()?;
                self.binary(op, target, value, mark)
            }
            None => target,
        };
        self.leave(1);
        Some(expr)
    }

    /// Parse ternary: condition ? true_expr : false_expr
    fn parse_ternary(&mut self) -> Option<Subtree> {
        self.skip_trivia();
        let mark = self.comment_mark();
        let condition = self.parse_logical_or()?;

        if self.match_token(TokenKind::Question).is_none() {
            return Some(condition);
        }
        self.enter()?;
        let true_expr = self.parse_expression()?;
        self.match_token(TokenKind::Colon)?;
        let false_expr = self.parse_ternary()?;
        self.leave(1);

        let span = condition.span.merge(false_expr.span);
        let location = condition.location;
        Some(self.expression_node(
            NodeKind::Conditional,
            span,
            location,
            vec![condition, true_expr, false_expr],
            mark,
        ))
    }

    fn parse_logical_or(&mut self) -> Option<Subtree> {
        self.parse_binary_level(Self::parse_logical_and, |kind| match kind {
            TokenKind::LogicalOr => Some(BinOp::Or),
            _ => None,
        })
    }

    fn parse_logical_and(&mut self) -> Option<Subtree> {
        self.parse_binary_level(Self::parse_bitwise_or, |kind| match kind {
            TokenKind::LogicalAnd => Some(BinOp::And),
            _ => None,
        })
    }

    fn parse_bitwise_or(&mut self) -> Option<Subtree> {
        self.parse_binary_level(Self::parse_bitwise_xor, |kind| match kind {
            TokenKind::BitOr => Some(BinOp::BitOr),
            _ => None,
        })
    }

    fn parse_bitwise_xor(&mut self) -> Option<Subtree> {
        self.parse_binary_level(Self::parse_bitwise_and, |kind| match kind {
            TokenKind::BitXor => Some(BinOp::BitXor),
            _ => None,
        })
    }

    fn parse_bitwise_and(&mut self) -> Option<Subtree> {
        self.parse_binary_level(Self::parse_equality, |kind| match kind {
            TokenKind::BitAnd => Some(BinOp::BitAnd),
            _ => None,
        })
    }

    /// Parse equality (== !=)
    fn parse_equality(&mut self) -> Option<Subtree> {
        self.parse_binary_level(Self::parse_relational, |kind| match kind {
            TokenKind::Equal => Some(BinOp::Eq),
            TokenKind::NotEqual => Some(BinOp::Ne),
            _ => None,
        })
    }

    /// Parse relational (< <= > >=)
    fn parse_relational(&mut self) -> Option<Subtree> {
        self.parse_binary_level(Self::parse_shift, |kind| match kind {
            TokenKind::Less => Some(BinOp::Lt),
            TokenKind::LessEqual => Some(BinOp::Le),
            TokenKind::Greater => Some(BinOp::Gt),
            TokenKind::GreaterEqual => Some(BinOp::Ge),
            _ => None,
        })
    }

    /// Parse bitwise shift (<< >>)
    fn parse_shift(&mut self) -> Option<Subtree> {
        self.parse_binary_level(Self::parse_additive, |kind| match kind {
            TokenKind::ShiftLeft => Some(BinOp::BitShl),
            TokenKind::ShiftRight => Some(BinOp::BitShr),
            _ => None,
        })
    }

    /// Parse additive (+ -)
    fn parse_additive(&mut self) -> Option<Subtree> {
        self.parse_binary_level(Self::parse_multiplicative, |kind| match kind {
            TokenKind::Plus => Some(BinOp::Add),
            TokenKind::Minus => Some(BinOp::Sub),
            _ => None,
        })
    }

    /// Parse multiplicative (* / %)
    fn parse_multiplicative(&mut self) -> Option<Subtree> {
        self.parse_binary_level(Self::parse_cast, |kind| match kind {
            TokenKind::Star => Some(BinOp::Mul),
            TokenKind::Slash => Some(BinOp::Div),
            TokenKind::Percent => Some(BinOp::Mod),
            _ => None,
        })
    }

    /// Left-associative loop shared by the binary precedence levels.
    ///
    /// Each operator in the chain nests the tree one level deeper.
    fn parse_binary_level(
        &mut self,
        operand: Level<'src>,
        operator: fn(TokenKind) -> Option<BinOp>,
    ) -> Option<Subtree> {
        self.skip_trivia();
        let mark = self.comment_mark();
        let mut left = operand(self)?;
        let mut links = 0;

        while let Some(op) = operator(self.peek_significant().kind) {
            self.enter()?;
            links += 1;
            self.advance();
            let right = operand(self)?;
            left = self.binary(op, left, right, mark);
        }

        self.leave(links);
        Some(left)
    }

    /// Parse cast: (type *)expr
    fn parse_cast(&mut self) -> Option<Subtree> {
        self.skip_trivia();
        let mark = self.comment_mark();

        if self.check(TokenKind::LParen) && self.peek_nth_significant(1).kind.is_scalar_type() {
            self.enter()?;
            let open = self.bump();
            let target_type = self.parse_data_type()?;
            self.skip_pointers();
            self.match_token(TokenKind::RParen)?;
            let operand = self.parse_cast()?;
            self.leave(1);

            let span = Span::new(open.span.start, operand.span.end);
            return Some(self.expression_node(
                NodeKind::Cast,
                span,
                open.location,
                vec![target_type, operand],
                mark,
            ));
        }

        self.parse_unary()
    }

    /// Parse unary (! ~ - + & * ++ -- sizeof)
    fn parse_unary(&mut self) -> Option<Subtree> {
        self.skip_trivia();
        let mark = self.comment_mark();
        let token = self.peek();

        let op = match token.kind {
            TokenKind::Minus => UnOp::Neg,
            TokenKind::Plus => UnOp::Plus,
            TokenKind::Not => UnOp::Not,
            TokenKind::BitNot => UnOp::BitNot,
            TokenKind::BitAnd => UnOp::AddrOf,
            TokenKind::Star => UnOp::Deref,
            TokenKind::Increment => UnOp::PreInc,
            TokenKind::Decrement => UnOp::PreDec,
            TokenKind::Sizeof => return self.parse_sizeof(),
            _ => return self.parse_postfix(),
        };

        self.enter()?;
        self.bump();
        let operand = match op {
            UnOp::PreInc | UnOp::PreDec => self.parse_unary()?,
            _ => self.parse_cast()?,
        };
        self.leave(1);

        let span = Span::new(token.span.start, operand.span.end);
        Some(self.expression_node(
            NodeKind::UnaryOp(op),
            span,
            token.location,
            vec![operand],
            mark,
        ))
    }

    /// `sizeof(type)` or `sizeof expr`
    fn parse_sizeof(&mut self) -> Option<Subtree> {
        self.enter()?;
        let mark = self.comment_mark();
        let keyword = self.bump();

        let (operand, end) =
            if self.check(TokenKind::LParen) && self.peek_nth_significant(1).kind.is_scalar_type() {
                self.advance();
                let target_type = self.parse_data_type()?;
                self.skip_pointers();
                let close = self.match_token(TokenKind::RParen)?;
                (target_type, close.span.end)
            } else {
                let operand = self.parse_unary()?;
                let end = operand.span.end;
                (operand, end)
            };
        self.leave(1);

        Some(self.expression_node(
            NodeKind::UnaryOp(UnOp::Sizeof),
            Span::new(keyword.span.start, end),
            keyword.location,
            vec![operand],
            mark,
        ))
    }

    /// Parse postfix (++ -- [] . -> ())
    fn parse_postfix(&mut self) -> Option<Subtree> {
        self.skip_trivia();
        let mark = self.comment_mark();
        let mut expr = self.parse_primary()?;
        let mut links = 0;

        loop {
            let token = self.peek_significant();
            let start = expr.span.start;
            let location = expr.location;
            if is_postfix_operator(token.kind) {
                self.enter()?;
                links += 1;
            }

            expr = match token.kind {
                TokenKind::Increment | TokenKind::Decrement => {
                    self.advance();
                    let op = if token.kind == TokenKind::Increment {
                        UnOp::PostInc
                    } else {
                        UnOp::PostDec
                    };
                    self.expression_node(
                        NodeKind::UnaryOp(op),
                        Span::new(start, token.span.end),
                        location,
                        vec![expr],
                        mark,
                    )
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expression()?;
                    let close = self.match_token(TokenKind::RBracket)?;
                    self.expression_node(
                        NodeKind::BinaryOp(BinOp::Subscript),
                        Span::new(start, close.span.end),
                        location,
                        vec![expr, index],
                        mark,
                    )
                }
                TokenKind::Dot | TokenKind::Arrow => {
                    self.advance();
                    let member = self.match_token(TokenKind::Identifier)?;
                    let op = if token.kind == TokenKind::Dot {
                        BinOp::Member
                    } else {
                        BinOp::PointerMember
                    };
                    let member = Subtree::leaf(NodeKind::Identifier, member.span, member.location);
                    self.expression_node(
                        NodeKind::BinaryOp(op),
                        Span::new(start, member.span.end),
                        location,
                        vec![expr, member],
                        mark,
                    )
                }
                TokenKind::LParen => {
                    self.advance();
                    let mut children = vec![expr];
                    if !self.check(TokenKind::RParen) {
                        loop {
                            children.push(self.parse_assignment()?);
                            if self.match_token(TokenKind::Comma).is_none() {
                                break;
                            }
                        }
                    }
                    let close = self.match_token(TokenKind::RParen)?;
                    self.expression_node(
                        NodeKind::Call,
                        Span::new(start, close.span.end),
                        location,
                        children,
                        mark,
                    )
                }
                _ => break,
            };
        }

        self.leave(links);
        Some(expr)
    }

    /// Parse primary (literals, identifiers, parenthesized expressions)
    fn parse_primary(&mut self) -> Option<Subtree> {
        self.skip_trivia();
        let token = self.peek();

        let literal = match token.kind {
            TokenKind::IntLiteral => LiteralKind::Int,
            TokenKind::FloatLiteral => LiteralKind::Float,
            TokenKind::HexLiteral => LiteralKind::Hex,
            TokenKind::CharLiteral => LiteralKind::Char,
            TokenKind::StringLiteral => return Some(self.parse_string_literal()),
            TokenKind::LParen => return self.parse_parenthesized(),
            TokenKind::Identifier => {
                self.bump();
                return Some(Subtree::leaf(NodeKind::Identifier, token.span, token.location));
            }
            _ => return None,
        };

        self.bump();
        Some(Subtree::leaf(NodeKind::Literal(literal), token.span, token.location))
    }

    /// Adjacent string literals form one literal node.
    fn parse_string_literal(&mut self) -> Subtree {
        let mark = self.comment_mark();
        let first = self.bump();
        let mut end = first.span.end;

        while self.check(TokenKind::StringLiteral) {
            end = self.advance().span.end;
        }

        self.node_from_tokens(
            NodeKind::Literal(LiteralKind::String),
            first,
            end,
            Vec::new(),
            mark,
        )
    }

    fn parse_parenthesized(&mut self) -> Option<Subtree> {
        self.enter()?;
        let mark = self.comment_mark();
        let open = self.bump();
        let mut inner = self.parse_expression()?;
        let close = self.match_token(TokenKind::RParen)?;
        self.leave(1);

        inner.span = Span::new(open.span.start, close.span.end);
        inner.location = open.location;
        inner.children.extend(self.take_comments(mark));
        inner.children.sort_by_key(|child| child.span.start);
        Some(inner)
    }

    /// One level deeper into the current expression; `None` past the limit.
    fn enter(&mut self) -> Option<()> {
        if self.depth >= MAX_EXPRESSION_DEPTH {
            debug!(depth = self.depth, "expression nesting limit reached");
            return None;
        }
        self.depth += 1;
        Some(())
    }

    fn leave(&mut self, levels: usize) {
        self.depth -= levels;
    }

    fn binary(&mut self, op: BinOp, left: Subtree, right: Subtree, mark: usize) -> Subtree {
        let span = left.span.merge(right.span);
        let location = left.location;
        self.expression_node(NodeKind::BinaryOp(op), span, location, vec![left, right], mark)
    }

    fn expression_node(
        &mut self,
        kind: NodeKind,
        span: Span,
        location: SourceLocation,
        mut children: Vec<Subtree>,
        mark: usize,
    ) -> Subtree {
        children.extend(self.take_comments(mark));
        Subtree::with_children(kind, span, location, children)
    }
}

fn assignment_op(kind: TokenKind) -> Option<BinOp> {
    let op = match kind {
        TokenKind::Assign => BinOp::Assign,
        TokenKind::PlusAssign => BinOp::AddAssign,
        TokenKind::MinusAssign => BinOp::SubAssign,
        TokenKind::StarAssign => BinOp::MulAssign,
        TokenKind::SlashAssign => BinOp::DivAssign,
        TokenKind::PercentAssign => BinOp::ModAssign,
        TokenKind::ShiftLeftAssign => BinOp::ShlAssign,
        TokenKind::ShiftRightAssign => BinOp::ShrAssign,
        TokenKind::BitAndAssign => BinOp::AndAssign,
        TokenKind::BitOrAssign => BinOp::OrAssign,
        TokenKind::BitXorAssign => BinOp::XorAssign,
        _ => return None,
    };
    Some(op)
}

/// Tokens that close an initializer: the declaration's `;` or the `,` before
/// the next declarator.
fn ends_initializer(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Semicolon | TokenKind::Comma)
}

fn is_postfix_operator(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Increment
            | TokenKind::Decrement
            | TokenKind::LBracket
            | TokenKind::Dot
            | TokenKind::Arrow
            | TokenKind::LParen
    )
}

/// +1 for an opening bracket, -1 for a closing one.
fn opening_delta(kind: TokenKind) -> isize {
    match kind {
        TokenKind::LParen | TokenKind::LBrace | TokenKind::LBracket => 1,
        TokenKind::RParen | TokenKind::RBrace | TokenKind::RBracket => -1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parse::{ParsedFile, Parser};

    fn parse(source: &str) -> ParsedFile<'_> {
        Parser::new(source).parse_file().unwrap()
    }

    /// The initializer child of the first declaration.
    fn initializer(file: &ParsedFile<'_>) -> NodeId {
        let tree = &file.tree;
        let decl = tree
            .children(tree.root())
            .iter()
            .copied()
            .find(|&id| tree.kind(id) == NodeKind::Declaration)
            .expect("no declaration");
        *tree.children(decl).last().unwrap()
    }

    /// Run `f` on a thread with the 8 MiB stack a binary's main thread gets.
    fn with_main_stack<F>(f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        std::thread::Builder::new()
            .stack_size(8 << 20)
            .spawn(f)
            .unwrap()
            .join()
            .unwrap();
    }

    fn text(file: &ParsedFile<'_>, id: NodeId) -> String {
        String::from_utf8_lossy(file.tree.text(id)).into_owned()
    }

    fn kinds(file: &ParsedFile<'_>, id: NodeId) -> Vec<NodeKind> {
        file.tree
            .children(id)
            .iter()
            .map(|&child| file.tree.kind(child))
            .collect()
    }

    #[test]
    fn test_precedence() {
        let file = parse("int x = 1 + 2 * 3;");
        let expr = initializer(&file);
        assert_eq!(file.tree.kind(expr), NodeKind::BinaryOp(BinOp::Add));
        assert_eq!(text(&file, expr), "1 + 2 * 3");

        let right = file.tree.children(expr)[1];
        assert_eq!(file.tree.kind(right), NodeKind::BinaryOp(BinOp::Mul));
        assert_eq!(text(&file, right), "2 * 3");
    }

    #[test]
    fn test_left_associativity() {
        let file = parse("int x = 8 - 4 - 2;");
        let expr = initializer(&file);
        let left = file.tree.children(expr)[0];
        assert_eq!(file.tree.kind(left), NodeKind::BinaryOp(BinOp::Sub));
        assert_eq!(text(&file, left), "8 - 4");
    }

    #[test]
    fn test_parentheses_widen_span() {
        let file = parse("int x = (1 + 2) * 3;");
        let expr = initializer(&file);
        assert_eq!(file.tree.kind(expr), NodeKind::BinaryOp(BinOp::Mul));
        let left = file.tree.children(expr)[0];
        assert_eq!(file.tree.kind(left), NodeKind::BinaryOp(BinOp::Add));
        assert_eq!(text(&file, left), "(1 + 2)");
    }

    #[test]
    fn test_literal_kinds() {
        let cases = [
            ("int x = 42;", LiteralKind::Int),
            ("float x = 0.01;", LiteralKind::Float),
            ("int x = 0xFF;", LiteralKind::Hex),
            ("char x = 'a';", LiteralKind::Char),
        ];
        for (source, expected) in cases {
            let file = parse(source);
            assert_eq!(
                file.tree.kind(initializer(&file)),
                NodeKind::Literal(expected),
                "{source}"
            );
        }
    }

    #[test]
    fn test_adjacent_strings_merge() {
        let file = parse("char *s = \"ab\" \"cd\";");
        let expr = initializer(&file);
        assert_eq!(file.tree.kind(expr), NodeKind::Literal(LiteralKind::String));
        assert_eq!(text(&file, expr), "\"ab\" \"cd\"");
    }

    #[test]
    fn test_unary_and_sizeof() {
        let file = parse("int x = -sizeof(int);");
        let expr = initializer(&file);
        assert_eq!(file.tree.kind(expr), NodeKind::UnaryOp(UnOp::Neg));

        let sizeof = file.tree.children(expr)[0];
        assert_eq!(file.tree.kind(sizeof), NodeKind::UnaryOp(UnOp::Sizeof));
        assert_eq!(text(&file, sizeof), "sizeof(int)");
        assert_eq!(kinds(&file, sizeof), vec![NodeKind::DataType]);

        let file = parse("int n = sizeof x;");
        let sizeof = initializer(&file);
        assert_eq!(kinds(&file, sizeof), vec![NodeKind::Identifier]);
    }

    #[test]
    fn test_cast() {
        let file = parse("int x = (int)3.5;");
        let expr = initializer(&file);
        assert_eq!(file.tree.kind(expr), NodeKind::Cast);
        assert_eq!(text(&file, expr), "(int)3.5");
        assert_eq!(
            kinds(&file, expr),
            vec![NodeKind::DataType, NodeKind::Literal(LiteralKind::Float)]
        );
    }

    #[test]
    fn test_call_and_postfix() {
        let file = parse("int r = add(1, b[2]) + p->x.y++;");
        let expr = initializer(&file);
        let children = file.tree.children(expr).to_vec();

        assert_eq!(file.tree.kind(children[0]), NodeKind::Call);
        assert_eq!(text(&file, children[0]), "add(1, b[2])");
        assert_eq!(
            kinds(&file, children[0]),
            vec![
                NodeKind::Identifier,
                NodeKind::Literal(LiteralKind::Int),
                NodeKind::BinaryOp(BinOp::Subscript),
            ]
        );

        assert_eq!(file.tree.kind(children[1]), NodeKind::UnaryOp(UnOp::PostInc));
        let member = file.tree.children(children[1])[0];
        assert_eq!(file.tree.kind(member), NodeKind::BinaryOp(BinOp::Member));
        let pointer = file.tree.children(member)[0];
        assert_eq!(file.tree.kind(pointer), NodeKind::BinaryOp(BinOp::PointerMember));
    }

    #[test]
    fn test_conditional_and_assignment() {
        let file = parse("int m = a > b ? a : b;");
        let expr = initializer(&file);
        assert_eq!(file.tree.kind(expr), NodeKind::Conditional);
        assert_eq!(file.tree.children(expr).len(), 3);

        let file = parse("int y = x += 2;");
        let expr = initializer(&file);
        assert_eq!(file.tree.kind(expr), NodeKind::BinaryOp(BinOp::AddAssign));
    }

    #[test]
    fn test_comment_attaches_to_enclosing_expression() {
        let file = parse("int x = 1 /* one */ + 2;");
        let expr = initializer(&file);
        assert_eq!(
            kinds(&file, expr),
            vec![
                NodeKind::Literal(LiteralKind::Int),
                NodeKind::BlockComment,
                NodeKind::Literal(LiteralKind::Int),
            ]
        );
    }

    #[test]
    fn test_brace_list_is_opaque() {
        let file = parse("int a[3] = { 1, 2, 3 };");
        let init = initializer(&file);
        assert_eq!(file.tree.kind(init), NodeKind::Initializer);
        assert_eq!(text(&file, init), "{ 1, 2, 3 }");
        assert!(file.errors.is_empty());
    }

    #[test]
    fn test_empty_initializer_records_error() {
        let file = parse("int x = ;");
        let init = initializer(&file);
        assert_eq!(file.tree.kind(init), NodeKind::Initializer);
        assert!(file.tree.span(init).is_empty());
        assert_eq!(file.tree.span(init).start, 7);
        assert_eq!(file.errors.len(), 1);
        assert_eq!(file.errors.as_slice()[0].message, "expected expression after '='");
    }

    #[test]
    fn test_moderate_nesting_still_parses() {
        let source = format!("int x = {}1{};", "(".repeat(60), ")".repeat(60));
        let file = parse(&source);
        let expr = initializer(&file);
        assert_eq!(file.tree.kind(expr), NodeKind::Literal(LiteralKind::Int));
        assert_eq!(text(&file, expr), source[8..source.len() - 1]);
    }

    #[test]
    fn test_deep_parentheses_stay_opaque() {
        with_main_stack(|| {
            let source = format!("int x = {}1{};\nint y;", "(".repeat(10_000), ")".repeat(10_000));
            let file = parse(&source);
            let init = initializer(&file);

            assert_eq!(file.tree.kind(init), NodeKind::Initializer);
            assert_eq!(file.tree.span(init).len(), 20_001);
            assert!(file.errors.is_empty());
            assert_eq!(file.tree.reconstruct(), source.as_bytes().to_vec());
        });
    }

    #[test]
    fn test_long_operator_chains_stay_opaque() {
        with_main_stack(|| {
            let chains = [
                format!("int x = {}a;", "a+".repeat(200_000)),
                format!("int x = {}a;", "-".repeat(100_000)),
                format!("int x = a{};", ".b".repeat(100_000)),
                format!("int x = {}a;", "(int)".repeat(50_000)),
                format!("int x = {}a;", "a = ".repeat(50_000)),
                format!("int x = {}c;", "a ? b : ".repeat(50_000)),
            ];
            for source in &chains {
                let file = parse(source);
                let init = initializer(&file);
                assert_eq!(file.tree.kind(init), NodeKind::Initializer);
                assert_eq!(file.tree.reconstruct(), source.as_bytes().to_vec());
            }
        });
    }

    #[test]
    fn test_chain_within_limit_builds_tree() {
        let src = format!("int x = {}a;", "a + ".repeat(200));
        let file = parse(&src);
        let expr = initializer(&file);
        assert_eq!(file.tree.kind(expr), NodeKind::BinaryOp(BinOp::Add));
        let depth = file
            .tree
            .walk()
            .filter(|&(id, _)| file.tree.kind(id) == NodeKind::Identifier)
            .map(|(_, depth)| depth)
            .max()
            .unwrap();
        // Program, Declaration, then 200 nested additions
        assert_eq!(depth, 202);
    }
}
