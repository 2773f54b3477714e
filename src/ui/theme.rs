use crate::parser::ast::NodeKind;
use crate::parser::token::TokenKind;
use ratatui::style::{Color, Style};

pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub primary: Color,   // Blue
    pub secondary: Color, // Orange
    pub comment: Color,   // Grey
    pub success: Color,   // Green
    pub error: Color,     // Red
    pub keyword: Color,
    pub string: Color,
    pub number: Color,
    pub border_focused: Color,
    pub border_normal: Color,
    pub current_line_bg: Color,
    pub selection_bg: Color,
    pub directive: Color, // Pink for preprocessor lines
    pub type_name: Color, // Cyan for type names
    pub whitespace: Color,
}

pub const DEFAULT_THEME: Theme = Theme {
    bg: Color::Rgb(30, 30, 46),
    fg: Color::Rgb(205, 214, 244),
    primary: Color::Rgb(137, 180, 250),   // Blue
    secondary: Color::Rgb(250, 179, 135), // Orange
    comment: Color::Rgb(108, 112, 134),
    success: Color::Rgb(166, 227, 161),
    error: Color::Rgb(243, 139, 168),
    keyword: Color::Rgb(137, 180, 250),        // Blue for keywords
    string: Color::Rgb(250, 179, 135),         // Orange for strings
    number: Color::Rgb(250, 179, 135),         // Orange for numbers
    border_focused: Color::Rgb(249, 226, 175), // Yellow border for focus
    border_normal: Color::Rgb(108, 112, 134),  // Grey border for normal
    current_line_bg: Color::Rgb(50, 50, 70),   // Slightly lighter BG for current line
    selection_bg: Color::Rgb(69, 71, 90),
    directive: Color::Rgb(245, 194, 231),
    type_name: Color::Rgb(148, 226, 213),
    whitespace: Color::Rgb(69, 71, 90),
};

impl Theme {
    pub fn token_style(&self, kind: TokenKind) -> Style {
        let fg = match kind {
            k if k.is_comment() => self.comment,
            k if k.is_scalar_type() => self.type_name,
            k if k.is_keyword() => self.keyword,
            TokenKind::StringLiteral | TokenKind::CharLiteral => self.string,
            k if k.is_literal() => self.number,
            TokenKind::Hash => self.directive,
            TokenKind::Unknown => self.error,
            _ => self.fg,
        };
        Style::default().fg(fg)
    }

    pub fn node_style(&self, kind: NodeKind) -> Style {
        let fg = match kind {
            k if k.is_comment() => self.comment,
            k if k.is_whitespace() => self.whitespace,
            NodeKind::Directive(_) | NodeKind::Include(_) => self.directive,
            NodeKind::DataType | NodeKind::Typedef => self.type_name,
            NodeKind::Literal(_) => self.number,
            NodeKind::Unknown => self.error,
            NodeKind::FunctionDeclaration | NodeKind::FunctionDefinition => self.border_focused,
            k if k.is_expression() => self.secondary,
            _ => self.primary,
        };
        Style::default().fg(fg)
    }
}
