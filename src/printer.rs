//! Plain-text dumps of the token stream and the syntax tree
//!
//! Printers only read the tree. Whitespace and comment nodes can be hidden;
//! hiding a node hides its whole subtree.

use crate::parser::ast::{NodeId, NodeKind, SyntaxTree};
use crate::parser::error::ErrorList;
use crate::parser::token::{Token, TokenKind};
use crossterm::style::{Color, Stylize};
use std::io::{self, Write};

/// Width the token name column is padded to.
pub const TOKEN_NAME_WIDTH: usize = 26;

/// Node text longer than this is cut and marked with `...`.
pub const MAX_NODE_TEXT: usize = 40;

/// What the printers show and how
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrintOptions {
    pub show_whitespace: bool,
    pub show_comments: bool,
    pub color: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            show_whitespace: true,
            show_comments: true,
            color: false,
        }
    }
}

impl PrintOptions {
    /// Whether nodes of `kind` pass the whitespace/comment filters.
    pub fn shows(&self, kind: NodeKind) -> bool {
        if kind.is_whitespace() {
            self.show_whitespace
        } else if kind.is_comment() {
            self.show_comments
        } else {
            true
        }
    }

    fn shows_token(&self, kind: TokenKind) -> bool {
        if kind.is_whitespace() {
            self.show_whitespace
        } else if kind.is_comment() {
            self.show_comments
        } else {
            true
        }
    }
}

/// Pre-order `(node, depth)` rows that pass the filters.
pub fn visible_rows(tree: &SyntaxTree<'_>, options: &PrintOptions) -> Vec<(NodeId, usize)> {
    let mut rows = Vec::new();
    let mut stack = vec![(tree.root(), 0)];

    while let Some((id, depth)) = stack.pop() {
        if !options.shows(tree.kind(id)) {
            continue;
        }
        rows.push((id, depth));
        for &child in tree.children(id).iter().rev() {
            stack.push((child, depth + 1));
        }
    }

    rows
}

/// One line per token: name, escaped text, byte span, line:column.
pub fn print_tokens<W: Write>(
    out: &mut W,
    tokens: &[Token<'_>],
    options: &PrintOptions,
) -> io::Result<()> {
    for token in tokens {
        if !options.shows_token(token.kind) {
            continue;
        }

        let name = format!("{:<width$}", token.kind.name(), width = TOKEN_NAME_WIDTH);
        let name = if options.color {
            name.with(token_color(token.kind)).to_string()
        } else {
            name
        };

        writeln!(
            out,
            "{} '{}' [{}, {}] {}:{}",
            name,
            escape(token.text),
            token.span.start,
            token.span.end,
            token.location.line,
            token.location.column
        )?;
    }
    Ok(())
}

/// Indented pre-order dump of the tree, two spaces per level.
pub fn print_tree<W: Write>(
    out: &mut W,
    tree: &SyntaxTree<'_>,
    options: &PrintOptions,
) -> io::Result<()> {
    for (id, depth) in visible_rows(tree, options) {
        writeln!(out, "{}", tree_row(tree, id, depth, options.color))?;
    }
    Ok(())
}

/// Text of a single tree row as `print_tree` writes it.
pub fn tree_row(tree: &SyntaxTree<'_>, id: NodeId, depth: usize, color: bool) -> String {
    let node = tree.node(id);
    let kind = node.kind.to_string();
    let kind = if color {
        kind.with(node_color(node.kind)).to_string()
    } else {
        kind
    };

    format!(
        "{:indent$}{} [{}, {}] '{}'",
        "",
        kind,
        node.span.start,
        node.span.end,
        truncate(&escape(tree.text(id)), MAX_NODE_TEXT),
        indent = depth * 2
    )
}

pub fn print_errors<W: Write>(out: &mut W, errors: &ErrorList) -> io::Result<()> {
    for error in errors {
        writeln!(out, "{error}")?;
    }
    if errors.dropped() > 0 {
        writeln!(out, "... {} more errors not recorded", errors.dropped())?;
    }
    Ok(())
}

/// Make control characters visible: `\n`, `\t`, `\r`, others as `\xNN`.
pub fn escape(text: &[u8]) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in String::from_utf8_lossy(text).chars() {
        match ch {
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            c if c.is_control() => escaped.push_str(&format!("\\x{:02x}", c as u32)),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Cut `text` after `max_chars` characters, marking the cut with `...`.
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn token_color(kind: TokenKind) -> Color {
    match kind {
        k if k.is_comment() => Color::DarkGreen,
        k if k.is_whitespace() => Color::DarkGrey,
        k if k.is_keyword() => Color::Blue,
        k if k.is_literal() => Color::Yellow,
        TokenKind::Identifier => Color::Cyan,
        TokenKind::Hash => Color::Magenta,
        TokenKind::Unknown => Color::Red,
        _ => Color::Reset,
    }
}

fn node_color(kind: NodeKind) -> Color {
    match kind {
        k if k.is_comment() => Color::DarkGreen,
        k if k.is_whitespace() => Color::DarkGrey,
        NodeKind::Directive(_) | NodeKind::Include(_) => Color::Magenta,
        NodeKind::Literal(_) => Color::Yellow,
        NodeKind::Identifier => Color::Cyan,
        NodeKind::DataType => Color::Blue,
        NodeKind::Unknown => Color::Red,
        _ => Color::Reset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::Lexer;
    use crate::parser::parse::Parser;

    fn render_tree(source: &str, options: PrintOptions) -> String {
        let file = Parser::new(source).parse_file().unwrap();
        let mut out = Vec::new();
        print_tree(&mut out, &file.tree, &options).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_print_tokens_format() {
        let tokens = Lexer::new("x\n").tokenize();
        let mut out = Vec::new();
        print_tokens(&mut out, &tokens, &PrintOptions::default()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], format!("{:<26} 'x' [0, 1] 1:1", "Identifier"));
        assert_eq!(lines[1], format!("{:<26} '\\n' [1, 2] 1:2", "NewLine"));
        assert_eq!(lines[2], format!("{:<26} '' [2, 2] 2:1", "EndOfFile"));
    }

    #[test]
    fn test_print_tree_indents_children() {
        let text = render_tree("int x;\n", PrintOptions::default());
        let expected = "\
Program [0, 7] 'int x;\\n'
  Declaration [0, 6] 'int x;'
    DataType [0, 3] 'int'
    Identifier [4, 5] 'x'
  Newline [6, 7] '\\n'
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_filters_hide_trivia() {
        let options = PrintOptions {
            show_whitespace: false,
            show_comments: false,
            color: false,
        };
        let text = render_tree("; // c\n;", options);
        assert!(!text.contains("Newline"));
        assert!(!text.contains("LineComment"));
        assert!(!text.contains("Space"));
        assert_eq!(text.matches("EmptyDeclaration").count(), 2);
    }

    #[test]
    fn test_long_text_is_truncated() {
        let source = format!("/* {} */", "a".repeat(60));
        let text = render_tree(&source, PrintOptions::default());
        let comment_line = text.lines().nth(1).unwrap();
        assert!(comment_line.ends_with("...'"));
        assert!(comment_line.contains(&format!("/* {}...", "a".repeat(37))));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(b"a\tb\r\n"), "a\\tb\\r\\n");
        assert_eq!(escape(b"\x01"), "\\x01");
    }

    #[test]
    fn test_color_adds_escape_codes() {
        let plain = render_tree("x;", PrintOptions::default());
        let colored = render_tree(
            "x;",
            PrintOptions {
                color: true,
                ..PrintOptions::default()
            },
        );
        assert!(!plain.contains('\u{1b}'));
        // crossterm honours NO_COLOR
        assert!(colored.contains('\u{1b}') || std::env::var_os("NO_COLOR").is_some());
        assert!(colored.contains("Unknown"));
    }
}
