//! C source code parser
//!
//! This module transforms C source bytes into a full-fidelity syntax tree:
//! - [`token`]: Token kinds and the keyword table
//! - [`lexer`]: Tokenization (source bytes → tokens, trivia included)
//! - [`parse`]: Parsing (tokens → tree), split across `impl Parser` files
//! - [`ast`]: Tree node definitions and the node arena
//! - [`error`]: Recorded and fatal parse errors
//!
//! # Supported C Subset
//!
//! Lexing covers the complete C lexical grammar. Parsing recognises:
//! - Top-level whitespace and comments, kept as nodes
//! - Preprocessor directives (stored, never executed) and `#include`s
//! - Empty declarations, typedefs, function prototypes and definitions
//! - Scalar variable declarations with expression initializers
//!
//! Function bodies and parameter lists are kept as opaque spans. Anything the
//! parser cannot place becomes an `Unknown` node, so concatenating the text of
//! the root's children always gives back the original file.
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with precedence climbing for binary operators.
//! No external parser generator dependencies.

pub mod ast;
mod declarations;
pub mod error;
mod expressions;
pub mod lexer;
pub mod parse;
mod preprocessor;
pub mod token;

#[cfg(test)]
mod property_tests;

pub use ast::{NodeId, NodeKind, Span, SyntaxTree};
pub use error::{ErrorList, FatalError, ParseError};
pub use lexer::Lexer;
pub use parse::{ParsedFile, Parser};
pub use token::{Token, TokenKind};

/// Parse a whole buffer with the default error capacity.
pub fn parse<S>(source: &S) -> Result<ParsedFile<'_>, FatalError>
where
    S: AsRef<[u8]> + ?Sized,
{
    Parser::new(source).parse_file()
}
