//! Syntax tree pane: the filtered pre-order rows, one node per line

use crate::parser::ast::{NodeId, SyntaxTree};
use crate::printer::{escape, truncate, MAX_NODE_TEXT};
use crate::ui::panes::source::follow_line;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn row_line(tree: &SyntaxTree<'_>, id: NodeId, depth: usize, is_selected: bool) -> Line<'static> {
    let node = tree.node(id);
    let text = truncate(&escape(tree.text(id)), MAX_NODE_TEXT);

    let mut spans = vec![
        Span::raw(" ".repeat(depth * 2)),
        Span::styled(node.kind.to_string(), DEFAULT_THEME.node_style(node.kind)),
        Span::styled(
            format!(" [{}, {}] ", node.span.start, node.span.end),
            Style::default().fg(DEFAULT_THEME.comment),
        ),
        Span::styled(format!("'{text}'"), Style::default().fg(DEFAULT_THEME.fg)),
    ];

    if is_selected {
        for span in &mut spans {
            span.style = span
                .style
                .bg(DEFAULT_THEME.current_line_bg)
                .add_modifier(Modifier::BOLD);
        }
    }
    Line::from(spans)
}

/// Render the tree pane, keeping the selected row in view.
pub fn render_tree_pane(
    frame: &mut Frame,
    area: Rect,
    tree: &SyntaxTree<'_>,
    rows: &[(NodeId, usize)],
    selected: usize,
    scroll: &mut usize,
) {
    let block = Block::default()
        .title(format!(" Syntax Tree ({} rows) ", rows.len()))
        .borders(Borders::ALL)
        .border_style(
            Style::default()
                .fg(DEFAULT_THEME.border_focused)
                .add_modifier(Modifier::BOLD),
        );

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    *scroll = follow_line(*scroll, selected + 1, visible_height);

    let lines: Vec<Line> = rows
        .iter()
        .enumerate()
        .skip(*scroll)
        .take(visible_height)
        .map(|(index, &(id, depth))| row_line(tree, id, depth, index == selected))
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
