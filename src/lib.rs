//! # Introduction
//!
//! crustree turns C source files into a full-fidelity syntax tree: every
//! byte of the input, whitespace and comments included, is covered by a node,
//! so the text of the root's children concatenates back to the original file.
//! Preprocessor directives are kept as nodes and never executed.
//!
//! ## Pipeline
//!
//! ```text
//! Source bytes → Lexer → Tokens (with trivia) → Parser → SyntaxTree → printers / TUI
//! ```
//!
//! 1. [`parser`]: tokenises the source and builds the tree, recording
//!    recoverable errors and stopping only on a [`parser::FatalError`].
//! 2. [`printer`]: read-only token and tree dumps with whitespace/comment
//!    filters.
//! 3. [`config`]: the options threaded from the command line.
//! 4. [`ui`]: ratatui-based tree viewer; not part of the stable library API.
//!
//! ## Example
//!
//! ```
//! let file = crustree::parser::parse("int x = 1 + 2; // sum\n").unwrap();
//! assert_eq!(file.tree.reconstruct(), b"int x = 1 + 2; // sum\n");
//! assert!(file.errors.is_empty());
//! ```

pub mod config;
pub mod parser;
pub mod printer;
pub mod ui;
