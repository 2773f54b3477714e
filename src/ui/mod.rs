//! Terminal user interface built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! The UI is organized into three layers:
//!
//! - **[`app`]**: viewer state, keyboard event loop, row filtering
//! - **[`panes`]**: stateless render functions for the source pane, the tree
//!   pane and the status bar
//! - **[`theme`]**: centralized color palette used by all panes
//!
//! The entry point for consumers is [`App`]: construct it with a
//! [`ParsedFile`] and call [`App::run`] to start the event loop. The viewer
//! never modifies the tree.
//!
//! [`ParsedFile`]: crate::parser::ParsedFile
//! [`App::run`]: app::App::run

pub mod app;
pub mod panes;
pub mod theme;

pub use app::App;
