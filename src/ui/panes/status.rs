//! Status bar rendering with keybindings and the selected node's details

use crate::parser::ast::AstNode;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// What the status bar shows besides the key hints
pub struct StatusRenderData<'a> {
    pub selected: Option<&'a AstNode>,
    pub error_count: usize,
    pub show_whitespace: bool,
    pub show_comments: bool,
    pub message: &'a str,
}

/// Render the status bar at the bottom.
pub fn render_status_bar(frame: &mut Frame, area: Rect, data: &StatusRenderData<'_>) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let bar_bg = Style::default().bg(DEFAULT_THEME.current_line_bg);
    let sep_style = bar_bg.fg(DEFAULT_THEME.comment);

    // Left side: selected node and error count
    let (kind_text, detail) = match data.selected {
        Some(node) => (
            format!(" {} ", node.kind),
            format!(
                " [{}, {}] {}:{} ",
                node.span.start, node.span.end, node.location.line, node.location.column
            ),
        ),
        None => (" (none) ".to_string(), String::new()),
    };

    let error_style = if data.error_count > 0 {
        bar_bg.fg(DEFAULT_THEME.error).add_modifier(Modifier::BOLD)
    } else {
        bar_bg.fg(DEFAULT_THEME.success)
    };

    let mut left_spans = vec![
        Span::styled(
            kind_text,
            Style::default()
                .bg(DEFAULT_THEME.primary)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(detail, bar_bg.fg(DEFAULT_THEME.fg)),
        Span::styled("│", sep_style),
        Span::styled(format!(" {} errors ", data.error_count), error_style),
    ];
    if !data.message.is_empty() {
        left_spans.push(Span::styled("│", sep_style));
        left_spans.push(Span::styled(
            format!(" {} ", data.message),
            bar_bg.fg(DEFAULT_THEME.fg),
        ));
    }

    let left_paragraph = Paragraph::new(Line::from(left_spans))
        .style(bar_bg)
        .alignment(Alignment::Left);
    frame.render_widget(left_paragraph, layout[0]);

    // Right side: keybinds, toggles lit while their rows are shown
    let key_style = Style::default().bg(DEFAULT_THEME.comment).fg(Color::Black);
    let toggle_style = |on: bool| {
        if on {
            Style::default().bg(DEFAULT_THEME.success).fg(Color::Black)
        } else {
            key_style
        }
    };
    let desc_style = bar_bg.fg(DEFAULT_THEME.fg);

    let right_spans = vec![
        Span::styled(" ↑/↓ ", key_style),
        Span::styled(" move ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" PgUp/PgDn ", key_style),
        Span::styled(" page ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" w ", toggle_style(data.show_whitespace)),
        Span::styled(" whitespace ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" c ", toggle_style(data.show_comments)),
        Span::styled(" comments ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" q ", key_style),
        Span::styled(" quit ", desc_style),
    ];

    let right_paragraph = Paragraph::new(Line::from(right_spans))
        .style(bar_bg)
        .alignment(Alignment::Right);
    frame.render_widget(right_paragraph, layout[1]);
}
