//! Main TUI application state and logic

use crate::parser::ast::NodeId;
use crate::parser::parse::ParsedFile;
use crate::printer::{visible_rows, PrintOptions};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;

/// Rows moved by PageUp / PageDown
const PAGE_SIZE: usize = 10;

/// The main application state
pub struct App<'src> {
    /// The parsed file being viewed
    pub file: ParsedFile<'src>,

    /// Whitespace / comment filters for the tree pane
    pub options: PrintOptions,

    /// Visible `(node, depth)` rows in pre-order
    pub rows: Vec<(NodeId, usize)>,

    /// Index into `rows`
    pub selected: usize,

    /// Per-pane scroll offsets
    pub source_scroll: usize,
    pub tree_scroll: usize,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,
}

impl<'src> App<'src> {
    pub fn new(file: ParsedFile<'src>, options: PrintOptions) -> Self {
        let rows = visible_rows(&file.tree, &options);
        App {
            file,
            options,
            rows,
            selected: 0,
            source_scroll: 0,
            tree_scroll: 0,
            should_quit: false,
            status_message: String::new(),
        }
    }

    /// Node under the cursor.
    pub fn selected_node(&self) -> Option<NodeId> {
        self.rows.get(self.selected).map(|&(id, _)| id)
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key_event(key);
                }
            }
        }

        Ok(())
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // Panes on top, status bar at the bottom
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(main_chunks[0]);

        let tree = &self.file.tree;
        let selected = self.selected_node().map(|id| tree.node(id));
        let (span, line) = selected
            .map(|node| (node.span, node.location.line))
            .unwrap_or_default();

        super::panes::render_source_pane(
            frame,
            columns[0],
            tree.source(),
            span,
            line,
            &mut self.source_scroll,
        );

        super::panes::render_tree_pane(
            frame,
            columns[1],
            tree,
            &self.rows,
            self.selected,
            &mut self.tree_scroll,
        );

        super::panes::render_status_bar(
            frame,
            main_chunks[1],
            &super::panes::StatusRenderData {
                selected,
                error_count: self.file.errors.len() + self.file.errors.dropped(),
                show_whitespace: self.options.show_whitespace,
                show_comments: self.options.show_comments,
                message: &self.status_message,
            },
        );
    }

    /// Handle keyboard events
    fn handle_key_event(&mut self, key: KeyEvent) {
        let last = self.rows.len().saturating_sub(1);
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = (self.selected + 1).min(last);
            }
            KeyCode::PageUp => {
                self.selected = self.selected.saturating_sub(PAGE_SIZE);
            }
            KeyCode::PageDown => {
                self.selected = (self.selected + PAGE_SIZE).min(last);
            }
            KeyCode::Home => {
                self.selected = 0;
            }
            KeyCode::End => {
                self.selected = last;
            }
            KeyCode::Char('w') => {
                self.options.show_whitespace = !self.options.show_whitespace;
                self.refilter();
                self.status_message = if self.options.show_whitespace {
                    "Showing whitespace".to_string()
                } else {
                    "Hiding whitespace".to_string()
                };
            }
            KeyCode::Char('c') => {
                self.options.show_comments = !self.options.show_comments;
                self.refilter();
                self.status_message = if self.options.show_comments {
                    "Showing comments".to_string()
                } else {
                    "Hiding comments".to_string()
                };
            }
            _ => {}
        }
    }

    /// Rebuild the rows after a filter change, keeping the cursor on the same
    /// node, or on the closest row before it when that node is now hidden.
    fn refilter(&mut self) {
        let tree = &self.file.tree;
        let anchor = self.selected_node().map(|id| tree.span(id).start);
        let previous = self.selected_node();

        self.rows = visible_rows(tree, &self.options);
        self.selected = match (previous, anchor) {
            (Some(id), Some(start)) => self
                .rows
                .iter()
                .position(|&(row, _)| row == id)
                .or_else(|| {
                    self.rows
                        .iter()
                        .rposition(|&(row, _)| tree.span(row).start <= start)
                })
                .unwrap_or(0),
            _ => 0,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::NodeKind;
    use crate::parser::parse;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;

    const SOURCE: &str = "#include <stdio.h>\n// entry\nint main(void) { return 0; }\n";

    fn press(app: &mut App<'_>, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_navigation_clamps() {
        let file = parse(SOURCE).unwrap();
        let mut app = App::new(file, PrintOptions::default());
        let last = app.rows.len() - 1;

        press(&mut app, KeyCode::Up);
        assert_eq!(app.selected, 0);
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.selected, 1);
        press(&mut app, KeyCode::End);
        assert_eq!(app.selected, last);
        press(&mut app, KeyCode::PageDown);
        assert_eq!(app.selected, last);
        press(&mut app, KeyCode::PageUp);
        assert_eq!(app.selected, last.saturating_sub(PAGE_SIZE));
        press(&mut app, KeyCode::Home);
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_toggles_filter_rows() {
        let file = parse(SOURCE).unwrap();
        let mut app = App::new(file, PrintOptions::default());
        let all_rows = app.rows.len();

        press(&mut app, KeyCode::Char('w'));
        assert!(app.rows.len() < all_rows);
        assert!(app
            .rows
            .iter()
            .all(|&(id, _)| !app.file.tree.kind(id).is_whitespace()));

        press(&mut app, KeyCode::Char('c'));
        assert!(app
            .rows
            .iter()
            .all(|&(id, _)| app.file.tree.kind(id) != NodeKind::LineComment));

        press(&mut app, KeyCode::Char('w'));
        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.rows.len(), all_rows);
    }

    #[test]
    fn test_hidden_selection_moves_to_previous_row() {
        let file = parse(SOURCE).unwrap();
        let mut app = App::new(file, PrintOptions::default());
        let comment_row = app
            .rows
            .iter()
            .position(|&(id, _)| app.file.tree.kind(id) == NodeKind::LineComment)
            .unwrap();
        app.selected = comment_row;

        press(&mut app, KeyCode::Char('c'));
        let id = app.selected_node().unwrap();
        assert_eq!(app.file.tree.kind(id), NodeKind::Newline);
        assert_eq!(app.file.tree.span(id).end, app.file.tree.span(id).start + 1);
    }

    #[test]
    fn test_quit_keys() {
        let file = parse(SOURCE).unwrap();
        let mut app = App::new(file, PrintOptions::default());
        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit);
    }

    #[test]
    fn test_render_shows_panes() {
        let file = parse(SOURCE).unwrap();
        let mut app = App::new(file, PrintOptions::default());
        let mut terminal = Terminal::new(TestBackend::new(160, 20)).unwrap();

        press(&mut app, KeyCode::Char('j'));
        terminal.draw(|f| app.render(f)).unwrap();
        let screen = screen_text(&terminal);

        assert!(screen.contains("Source Code"));
        assert!(screen.contains("Syntax Tree"));
        assert!(screen.contains("Directive(Include)"));
        assert!(screen.contains("#include <stdio.h>"));
        assert!(screen.contains("0 errors"));
    }
}
