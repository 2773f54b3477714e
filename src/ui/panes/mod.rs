//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`source`]: Source code with lexer-driven highlighting and the selected span
//! - [`tree`]: Filtered pre-order rows of the syntax tree
//! - [`status`]: Status bar with the selected node, error count and keybindings
//!
//! Each pane module exports a `render_*` function that draws from borrowed
//! state; scroll offsets are owned by the app and passed in mutably.

pub mod source;
pub mod status;
pub mod tree;

// Re-export render functions for convenience
pub use source::render_source_pane;
pub use status::{render_status_bar, StatusRenderData};
pub use tree::render_tree_pane;
