//! Property-based tests for the lexer and parser.
//!
//! 1. **Tokens tile the input**: consecutive spans, no gaps, ending at EOF
//! 2. **EOF is idempotent**: repeated calls at end of file return empty EOF tokens
//! 3. **Lookahead is pure**: `peek_token` and `peek_token_skip_trivia` leave state alone
//! 4. **Lexing is deterministic**: the same buffer always gives the same tokens
//! 5. **Round trip**: root children reconstruct the input byte for byte
//! 6. **Spans nest**: every child lies inside its parent, children in order

use proptest::prelude::*;

use super::ast::NodeKind;
use super::error::FatalError;
use super::lexer::Lexer;
use super::parse::Parser;
use super::token::TokenKind;

/// C-flavoured fragments, so generated inputs reach the parser's rules.
const FRAGMENTS: &[&str] = &[
    "int", "char", "unsigned", "typedef", "static", "x", "main", " ", "\t", "\n", "\r\n", ";",
    "=", "*", "(", ")", "{", "}", "[", "]", ",", "+", "<<=", "->", "0x1F", "3.14f", "10UL",
    "'a'", "\"s\\\"\"", "// c\n", "/* b */", "#", "#include", "<stdio.h>", "\\\n", "?", ":",
    "sizeof", "\x01",
];

fn c_like_source() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(FRAGMENTS), 0..60).prop_map(|parts| parts.concat())
}

fn proptest_config() -> ProptestConfig {
    let default = ProptestConfig::default();
    ProptestConfig {
        cases: default.cases.max(256),
        ..default
    }
}

fn check_round_trip(source: &[u8]) -> Result<(), TestCaseError> {
    match Parser::new(source).parse_file() {
        Ok(file) => {
            prop_assert_eq!(file.tree.reconstruct(), source.to_vec());
            let tree = &file.tree;
            for (id, _) in tree.walk() {
                let span = tree.span(id);
                let mut previous_end = span.start;
                for &child in tree.children(id) {
                    let child_span = tree.span(child);
                    prop_assert!(child_span.start >= previous_end);
                    prop_assert!(child_span.end <= span.end);
                    previous_end = child_span.end;
                }
                if tree.kind(id) == NodeKind::Program {
                    prop_assert_eq!(previous_end, source.len());
                }
            }
        }
        // Only an unterminated `<...>` include may stop the parse
        Err(FatalError::UnexpectedEof { origin, .. }) => {
            prop_assert_eq!(origin, "parse_system_include");
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(proptest_config())]

    #[test]
    fn tokens_tile_input(input in prop::collection::vec(any::<u8>(), 0..400)) {
        let tokens = Lexer::new(input.as_slice()).tokenize();
        let mut offset = 0;
        for token in &tokens {
            prop_assert_eq!(token.span.start, offset);
            prop_assert_eq!(token.text, &input[token.span.start..token.span.end]);
            if token.kind == TokenKind::Eof {
                prop_assert!(token.span.is_empty());
            } else {
                prop_assert!(!token.span.is_empty());
            }
            offset = token.span.end;
        }
        prop_assert_eq!(offset, input.len());
        prop_assert_eq!(tokens.last().map(|token| token.kind), Some(TokenKind::Eof));
    }

    #[test]
    fn eof_is_idempotent(input in "\\PC{0,200}") {
        let mut lexer = Lexer::new(&input);
        lexer.tokenize();
        for _ in 0..3 {
            let token = lexer.next_token();
            prop_assert_eq!(token.kind, TokenKind::Eof);
            prop_assert_eq!(token.span.start, input.len());
            prop_assert_eq!(lexer.position(), input.len());
        }
    }

    #[test]
    fn lookahead_is_pure(input in c_like_source(), steps in 0usize..20) {
        let mut lexer = Lexer::new(&input);
        for _ in 0..steps {
            lexer.next_token();
        }
        let before = lexer.snapshot();
        let peeked = lexer.peek_token();
        let significant = lexer.peek_token_skip_trivia();
        prop_assert_eq!(lexer.snapshot(), before);

        prop_assert!(!significant.kind.is_trivia());
        prop_assert_eq!(lexer.next_token(), peeked);
    }

    #[test]
    fn lexing_is_deterministic(input in "\\PC{0,300}") {
        let first = Lexer::new(&input).tokenize();
        let second = Lexer::new(&input).tokenize();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn round_trip_arbitrary_bytes(input in prop::collection::vec(any::<u8>(), 0..400)) {
        check_round_trip(&input)?;
    }

    #[test]
    fn round_trip_c_like_source(input in c_like_source()) {
        check_round_trip(input.as_bytes())?;
    }
}
