//! Preprocessor directive parsing
//!
//! Directives are recognised and stored, never executed: no macro expansion,
//! no conditional evaluation, no include resolution.
//!
//! ```text
//! directive ::= "#" name? rest-of-logical-line
//! include   ::= "#" "include" ( "<" header ">" | string-literal )
//! ```
//!
//! A directive runs to the end of its logical line; a `\` directly before the
//! newline continues it onto the next line. The directive node ends at its
//! last non-trivia token so that trailing blanks and comments on the line stay
//! top-level trivia.

use crate::parser::ast::*;
use crate::parser::error::FatalError;
use crate::parser::parse::Parser;
use crate::parser::token::TokenKind;

impl<'src> Parser<'src> {
    /// Parse a directive starting at the current `#` token.
    pub(crate) fn parse_directive(&mut self) -> Result<Subtree, FatalError> {
        let mark = self.comment_mark();
        let hash = self.bump();
        let mut end = hash.span.end;
        let mut last = self.checkpoint();

        self.skip_horizontal_trivia();
        let name = self.peek();
        let kind = if name.kind.is_word() {
            self.bump();
            end = name.span.end;
            last = self.checkpoint();
            DirectiveKind::from_name(name.text)
        } else {
            DirectiveKind::Unknown
        };

        let mut children = Vec::new();
        if kind == DirectiveKind::Include {
            self.skip_horizontal_trivia();
            let include = match self.peek().kind {
                TokenKind::Less => Some(self.parse_system_include()?),
                TokenKind::StringLiteral => Some(self.parse_local_include()),
                _ => None,
            };
            if let Some((node, include_end)) = include {
                children.push(node);
                end = include_end;
                last = self.checkpoint();
            }
        }

        // Whatever else is on the logical line belongs to the directive
        loop {
            self.skip_horizontal_trivia();
            let token = self.peek();
            match token.kind {
                TokenKind::Eof | TokenKind::Newline => break,
                TokenKind::Unknown if self.at_line_continuation() => {
                    self.bump();
                    end = self.bump().span.end;
                }
                _ => {
                    self.bump();
                    end = token.span.end;
                }
            }
            last = self.checkpoint();
        }

        self.rewind(last);
        children.extend(self.take_comments(mark));

        Ok(Subtree::with_children(
            NodeKind::Directive(kind),
            Span::new(hash.span.start, end),
            hash.location,
            children,
        ))
    }

    /// `<header>`; the node spans the header name without the brackets.
    ///
    /// Returns the node and the offset just past the closing `>`.
    fn parse_system_include(&mut self) -> Result<(Subtree, usize), FatalError> {
        let open = self.bump();
        let start = open.span.end;
        let location = SourceLocation::new(open.location.line, open.location.column + 1);

        loop {
            let token = self.bump();
            match token.kind {
                TokenKind::Greater => {
                    let node = Subtree::leaf(
                        NodeKind::Include(IncludeKind::System),
                        Span::new(start, token.span.start),
                        location,
                    );
                    return Ok((node, token.span.end));
                }
                TokenKind::Eof => {
                    return Err(FatalError::UnexpectedEof {
                        expected: "'>' closing the include",
                        origin: "parse_system_include",
                        span: Span::new(open.span.start, token.span.start),
                        location: open.location,
                    });
                }
                _ => {}
            }
        }
    }

    /// `"header"`; the node spans the header name without the quotes.
    fn parse_local_include(&mut self) -> (Subtree, usize) {
        let literal = self.bump();
        let span = literal.span;

        let inner = if is_closed_string(literal.text) {
            Span::new(span.start + 1, span.end - 1)
        } else {
            Span::new(span.start + 1, span.end)
        };
        let location = SourceLocation::new(literal.location.line, literal.location.column + 1);

        (
            Subtree::leaf(NodeKind::Include(IncludeKind::Local), inner, location),
            span.end,
        )
    }

    /// A `\` immediately followed by a line break.
    fn at_line_continuation(&self) -> bool {
        self.lexer.peek(0) == b'\\' && matches!(self.lexer.peek(1), b'\n' | b'\r')
    }
}

/// True when a string literal token ends with a `"` that is not escaped.
fn is_closed_string(text: &[u8]) -> bool {
    if text.len() < 2 || !text.ends_with(b"\"") {
        return false;
    }
    let body = &text[1..text.len() - 1];
    let escapes = body.iter().rev().take_while(|&&b| b == b'\\').count();
    escapes % 2 == 0
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::error::FatalError;
    use crate::parser::parse::{ParsedFile, Parser};

    fn parse(source: &str) -> ParsedFile<'_> {
        Parser::new(source).parse_file().unwrap()
    }

    fn text(file: &ParsedFile<'_>, id: NodeId) -> String {
        String::from_utf8_lossy(file.tree.text(id)).into_owned()
    }

    fn first_child(file: &ParsedFile<'_>) -> NodeId {
        file.tree.children(file.tree.root())[0]
    }

    #[test]
    fn test_system_include() {
        let file = parse("#include <stdio.h>\n");
        let directive = first_child(&file);
        assert_eq!(
            file.tree.kind(directive),
            NodeKind::Directive(DirectiveKind::Include)
        );
        assert_eq!(text(&file, directive), "#include <stdio.h>");

        let children = file.tree.children(directive);
        assert_eq!(children.len(), 1);
        assert_eq!(
            file.tree.kind(children[0]),
            NodeKind::Include(IncludeKind::System)
        );
        assert_eq!(text(&file, children[0]), "stdio.h");
        assert_eq!(file.tree.node(children[0]).location, SourceLocation::new(1, 11));
    }

    #[test]
    fn test_local_include_strips_quotes() {
        let file = parse("# include \"local.h\"   // note\n");
        let directive = first_child(&file);
        assert_eq!(text(&file, directive), "# include \"local.h\"");

        let include = file.tree.children(directive)[0];
        assert_eq!(
            file.tree.kind(include),
            NodeKind::Include(IncludeKind::Local)
        );
        assert_eq!(text(&file, include), "local.h");

        let kinds: Vec<NodeKind> = file
            .tree
            .children(file.tree.root())
            .iter()
            .map(|&id| file.tree.kind(id))
            .collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Directive(DirectiveKind::Include),
                NodeKind::Space,
                NodeKind::LineComment,
                NodeKind::Newline,
            ]
        );
    }

    #[test]
    fn test_local_include_with_escaped_closing_quote() {
        let file = parse("#include \"a\\\"");
        let include = file.tree.children(first_child(&file))[0];
        assert_eq!(text(&file, include), "a\\\"");
        assert_eq!(file.tree.reconstruct(), b"#include \"a\\\"".to_vec());

        let file = parse("#include \"a\\\\\"\n");
        let include = file.tree.children(first_child(&file))[0];
        assert_eq!(text(&file, include), "a\\\\");
    }

    #[test]
    fn test_unterminated_system_include_is_fatal() {
        let result = Parser::new("#include <stdio.h\nint x;").parse_file();
        match result {
            Err(FatalError::UnexpectedEof { origin, span, location, .. }) => {
                assert_eq!(origin, "parse_system_include");
                assert_eq!(span.start, 9);
                assert_eq!(location, SourceLocation::new(1, 10));
            }
            other => panic!("expected fatal error, got {other:?}"),
        }
    }

    #[test]
    fn test_define_consumes_whole_line() {
        let source = "#define MAX(a, b) ((a) > (b) ? (a) : (b))\nint x;";
        let file = parse(source);
        let directive = first_child(&file);
        assert_eq!(
            file.tree.kind(directive),
            NodeKind::Directive(DirectiveKind::Define)
        );
        assert_eq!(text(&file, directive), "#define MAX(a, b) ((a) > (b) ? (a) : (b))");
        assert!(file.tree.children(directive).is_empty());
        assert_eq!(file.tree.reconstruct(), source.as_bytes().to_vec());
    }

    #[test]
    fn test_line_continuation() {
        let source = "#define TWO \\\n  (1 + 1)\n;";
        let file = parse(source);
        let directive = first_child(&file);
        assert_eq!(text(&file, directive), "#define TWO \\\n  (1 + 1)");

        let kinds: Vec<NodeKind> = file
            .tree
            .children(file.tree.root())
            .iter()
            .map(|&id| file.tree.kind(id))
            .collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Directive(DirectiveKind::Define),
                NodeKind::Newline,
                NodeKind::EmptyDeclaration,
            ]
        );
    }

    #[test]
    fn test_directive_names() {
        let cases = [
            ("#if defined(X)", DirectiveKind::If),
            ("#ifdef X", DirectiveKind::Ifdef),
            ("#ifndef X", DirectiveKind::Ifndef),
            ("#elif Y", DirectiveKind::Elif),
            ("#else", DirectiveKind::Else),
            ("#endif", DirectiveKind::Endif),
            ("#undef PI", DirectiveKind::Undef),
            ("#pragma once", DirectiveKind::Pragma),
            ("#error stop", DirectiveKind::Error),
            ("#warning careful", DirectiveKind::Warning),
            ("#line 10", DirectiveKind::Line),
            ("#frobnicate", DirectiveKind::Unknown),
            ("#", DirectiveKind::Unknown),
        ];
        for (source, expected) in cases {
            let file = parse(source);
            let directive = first_child(&file);
            assert_eq!(file.tree.kind(directive), NodeKind::Directive(expected), "{source}");
            assert_eq!(text(&file, directive), source);
        }
    }

    #[test]
    fn test_stray_hash_leaves_trailing_space() {
        let file = parse("#  \n");
        let directive = first_child(&file);
        assert_eq!(text(&file, directive), "#");
        assert_eq!(file.tree.reconstruct(), b"#  \n".to_vec());
    }

    #[test]
    fn test_comment_inside_directive_is_child() {
        let file = parse("#define A /* one */ 1 // trailing\n");
        let directive = first_child(&file);
        assert_eq!(text(&file, directive), "#define A /* one */ 1");

        let children = file.tree.children(directive);
        assert_eq!(children.len(), 1);
        assert_eq!(file.tree.kind(children[0]), NodeKind::BlockComment);
    }
}
