//! Source code pane rendering with syntax highlighting
//!
//! This module renders the parsed file with colouring driven by the real
//! lexer, so the pane shows exactly the tokens the parser saw.
//!
//! # Features
//!
//! - Token colouring for keywords, types, literals, comments and directives
//! - Background highlight over the selected node's byte span
//! - Line numbering, with the selected node's first line kept in view

use crate::parser::ast::Span;
use crate::parser::lexer::Lexer;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span as TextSpan},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const TAB_WIDTH: usize = 4;

/// Split the source into display lines, styling each token and painting the
/// selection background over `selected`.
pub fn highlight_source(source: &[u8], selected: Span) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut current: Vec<TextSpan<'static>> = Vec::new();

    for token in Lexer::new(source).tokenize() {
        let style = DEFAULT_THEME.token_style(token.kind);
        let mut start = token.span.start;
        let end = token.span.end;

        while start < end {
            // Cut at the next line break and at either edge of the selection
            let mut cut = source[start..end]
                .iter()
                .position(|&b| matches!(b, b'\n' | b'\r'))
                .map_or(end, |offset| start + offset);
            for edge in [selected.start, selected.end] {
                if edge > start && edge < cut {
                    cut = edge;
                }
            }

            if cut > start {
                let text = display_text(&source[start..cut]);
                let piece_style = if selected.contains(start) {
                    style
                        .bg(DEFAULT_THEME.selection_bg)
                        .add_modifier(Modifier::BOLD)
                } else {
                    style
                };
                current.push(TextSpan::styled(text, piece_style));
            }

            if cut < end && matches!(source[cut], b'\n' | b'\r') {
                lines.push(Line::from(std::mem::take(&mut current)));
                // `\r\n` is one break, as the lexer counts it
                let crlf = source[cut] == b'\r' && cut + 1 < end && source[cut + 1] == b'\n';
                start = if crlf { cut + 2 } else { cut + 1 };
            } else {
                start = cut;
            }
        }
    }

    lines.push(Line::from(current));
    lines
}

fn display_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).replace('\t', &" ".repeat(TAB_WIDTH))
}

/// Move `offset` the least amount needed for `line` (1-based) to be visible.
pub fn follow_line(offset: usize, line: usize, visible_height: usize) -> usize {
    let index = line.saturating_sub(1);
    if index < offset {
        index
    } else if index >= offset + visible_height {
        index + 1 - visible_height
    } else {
        offset
    }
}

/// Render the source code pane
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    source: &[u8],
    selected: Span,
    selected_line: usize,
    scroll: &mut usize,
) {
    let block = Block::default()
        .title(" Source Code ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(DEFAULT_THEME.border_normal));

    let lines = highlight_source(source, selected);
    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    *scroll = follow_line(*scroll, selected_line, visible_height);

    let visible_lines: Vec<Line> = lines
        .into_iter()
        .enumerate()
        .skip(*scroll)
        .take(visible_height)
        .map(|(idx, line)| {
            let line_num = idx + 1;
            let num_style = if line_num == selected_line {
                Style::default()
                    .fg(DEFAULT_THEME.secondary)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.comment)
            };

            let mut spans = vec![TextSpan::styled(format!("{:4} ", line_num), num_style)];
            spans.extend(line.spans);
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(visible_lines).block(block);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn test_highlight_splits_lines() {
        let lines = highlight_source(b"int x;\n/* a\nb */\n", Span::new(0, 0));
        let texts: Vec<String> = lines.iter().map(line_text).collect();
        assert_eq!(texts, vec!["int x;", "/* a", "b */", ""]);
    }

    #[test]
    fn test_highlight_splits_carriage_returns() {
        let lines = highlight_source(b"a;\rb;\r\nc; /* x\ry */", Span::new(0, 0));
        let texts: Vec<String> = lines.iter().map(line_text).collect();
        assert_eq!(texts, vec!["a;", "b;", "c; /* x", "y */"]);
    }

    #[test]
    fn test_selection_gets_background() {
        let lines = highlight_source(b"int value;", Span::new(4, 7));
        let selected: String = lines[0]
            .spans
            .iter()
            .filter(|span| span.style.bg == Some(DEFAULT_THEME.selection_bg))
            .map(|span| span.content.as_ref())
            .collect();
        assert_eq!(selected, "val");
    }

    #[test]
    fn test_tabs_expand() {
        let lines = highlight_source(b"\tx", Span::new(0, 0));
        assert_eq!(line_text(&lines[0]), "    x");
    }

    #[test]
    fn test_follow_line() {
        assert_eq!(follow_line(0, 5, 10), 0);
        assert_eq!(follow_line(0, 15, 10), 5);
        assert_eq!(follow_line(8, 3, 10), 2);
    }
}
