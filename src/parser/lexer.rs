//! Lexer (tokenizer) for C source code
//!
//! Converts raw source bytes into [`Token`]s one at a time. Nothing is
//! skipped: whitespace, comments and the `#` of a directive are all emitted as
//! tokens so the parser can keep every byte of the file in its tree.
//!
//! The lexer never fails. A byte that starts no known token becomes a
//! one-byte [`TokenKind::Unknown`] token, and unterminated strings or block
//! comments simply end at end of file.

use super::ast::{SourceLocation, Span};
use super::token::{keyword, Token, TokenKind};

/// Cursor position captured for speculative lookahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexerState {
    position: usize,
    line: usize,
    column: usize,
}

impl LexerState {
    pub fn position(&self) -> usize {
        self.position
    }
}

/// Lexer for C source code
#[derive(Debug, Clone)]
pub struct Lexer<'src> {
    source: &'src [u8],
    position: usize,
    line: usize,
    column: usize,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer at offset 0, line 1, column 1.
    pub fn new<S>(source: &'src S) -> Self
    where
        S: AsRef<[u8]> + ?Sized,
    {
        Self {
            source: source.as_ref(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn source(&self) -> &'src [u8] {
        self.source
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Current line/column of the cursor
    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.source.len()
    }

    /// Byte at `cursor + offset`, or `b'\0'` past end of file.
    pub fn peek(&self, offset: usize) -> u8 {
        self.source
            .get(self.position + offset)
            .copied()
            .unwrap_or(b'\0')
    }

    pub fn snapshot(&self) -> LexerState {
        LexerState {
            position: self.position,
            line: self.line,
            column: self.column,
        }
    }

    pub fn restore(&mut self, state: LexerState) {
        self.position = state.position;
        self.line = state.line;
        self.column = state.column;
    }

    /// Token that the next call to [`next_token`](Self::next_token) would return.
    pub fn peek_token(&self) -> Token<'src> {
        let mut probe = self.clone();
        probe.next_token()
    }

    /// First non-trivia token ahead of the cursor.
    pub fn peek_token_skip_trivia(&self) -> Token<'src> {
        let mut probe = self.clone();
        loop {
            let token = probe.next_token();
            if !token.kind.is_trivia() {
                return token;
            }
        }
    }

    /// Lex the rest of the input, including the final [`TokenKind::Eof`].
    pub fn tokenize(&mut self) -> Vec<Token<'src>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            tokens.push(token);
            if token.kind == TokenKind::Eof {
                break;
            }
        }
        tokens
    }

    /// Consume and return exactly one token.
    ///
    /// At end of file this returns a zero-length `Eof` token and can be called
    /// any number of times.
    pub fn next_token(&mut self) -> Token<'src> {
        let start = self.position;
        let location = self.location();

        let kind = if self.is_at_end() {
            TokenKind::Eof
        } else {
            self.classify()
        };

        Token::new(
            kind,
            &self.source[start..self.position],
            Span::new(start, self.position),
            location,
        )
    }

    /// Rules are tried in order; several share a first byte.
    fn classify(&mut self) -> TokenKind {
        if let Some(kind) = self.whitespace() {
            return kind;
        }
        if self.peek(0) == b'#' {
            self.advance();
            return TokenKind::Hash;
        }
        if let Some(kind) = self.comment() {
            return kind;
        }

        match self.peek(0) {
            c if c.is_ascii_alphabetic() || c == b'_' => return self.identifier_or_keyword(),
            c if c.is_ascii_digit() => return self.number_literal(),
            b'"' => return self.string_literal(),
            b'\'' => return self.char_literal(),
            _ => {}
        }

        if let Some(kind) = self.operator() {
            return kind;
        }
        if let Some(kind) = self.delimiter() {
            return kind;
        }
        if let Some(kind) = self.brace() {
            return kind;
        }

        self.advance();
        TokenKind::Unknown
    }

    fn whitespace(&mut self) -> Option<TokenKind> {
        let kind = match self.peek(0) {
            b' ' => TokenKind::Space,
            b'\t' => TokenKind::Tab,
            b'\n' => TokenKind::Newline,
            b'\r' => {
                self.advance();
                if self.peek(0) == b'\n' {
                    self.advance();
                }
                return Some(TokenKind::Newline);
            }
            _ => return None,
        };
        self.advance();
        Some(kind)
    }

    fn comment(&mut self) -> Option<TokenKind> {
        match (self.peek(0), self.peek(1)) {
            (b'/', b'/') => {
                self.advance_by(2);
                while !self.is_at_end() && !matches!(self.peek(0), b'\n' | b'\r') {
                    self.advance();
                }
                Some(TokenKind::LineComment)
            }
            (b'/', b'*') => {
                self.advance_by(2);
                while !self.is_at_end() {
                    if self.peek(0) == b'*' && self.peek(1) == b'/' {
                        self.advance_by(2);
                        break;
                    }
                    self.advance();
                }
                Some(TokenKind::BlockComment)
            }
            _ => None,
        }
    }

    fn identifier_or_keyword(&mut self) -> TokenKind {
        let start = self.position;
        while self.peek(0).is_ascii_alphanumeric() || self.peek(0) == b'_' {
            self.advance();
        }
        keyword(&self.source[start..self.position]).unwrap_or(TokenKind::Identifier)
    }

    /// Integer, float and hex literals with their optional suffix
    fn number_literal(&mut self) -> TokenKind {
        let mut kind;

        if self.peek(0) == b'0'
            && matches!(self.peek(1), b'x' | b'X')
            && self.peek(2).is_ascii_hexdigit()
        {
            self.advance_by(2);
            while self.peek(0).is_ascii_hexdigit() {
                self.advance();
            }
            kind = TokenKind::HexLiteral;
        } else {
            kind = TokenKind::IntLiteral;
            self.skip_digits();

            if self.peek(0) == b'.' {
                self.advance();
                self.skip_digits();
                kind = TokenKind::FloatLiteral;
            }

            if matches!(self.peek(0), b'e' | b'E') {
                let sign = usize::from(matches!(self.peek(1), b'+' | b'-'));
                if self.peek(1 + sign).is_ascii_digit() {
                    self.advance_by(1 + sign);
                    self.skip_digits();
                    kind = TokenKind::FloatLiteral;
                }
            }
        }

        // Suffixes: f, or u/l alone or paired as ul/lu in any case
        match self.peek(0) {
            b'f' | b'F' => {
                self.advance();
                kind = TokenKind::FloatLiteral;
            }
            b'u' | b'U' => {
                self.advance();
                if matches!(self.peek(0), b'l' | b'L') {
                    self.advance();
                }
            }
            b'l' | b'L' => {
                self.advance();
                if matches!(self.peek(0), b'u' | b'U') {
                    self.advance();
                }
            }
            _ => {}
        }

        kind
    }

    fn skip_digits(&mut self) {
        while self.peek(0).is_ascii_digit() {
            self.advance();
        }
    }

    /// String literal including both quotes; runs to EOF when unterminated
    fn string_literal(&mut self) -> TokenKind {
        self.advance(); // opening quote
        while let Some(ch) = self.advance() {
            match ch {
                b'\\' => {
                    self.advance();
                }
                b'"' => break,
                _ => {}
            }
        }
        TokenKind::StringLiteral
    }

    /// One possibly escaped unit between single quotes.
    fn char_literal(&mut self) -> TokenKind {
        self.advance(); // opening quote

        match self.peek(0) {
            b'\'' => {
                self.advance();
                return TokenKind::CharLiteral;
            }
            b'\n' | b'\r' => return TokenKind::CharLiteral,
            _ => {}
        }

        if self.advance() == Some(b'\\') {
            self.advance();
        }
        if self.peek(0) == b'\'' {
            self.advance();
        }
        TokenKind::CharLiteral
    }

    /// Longest match: three-byte operators, then two, then one.
    fn operator(&mut self) -> Option<TokenKind> {
        use TokenKind::*;

        let (kind, len) = match (self.peek(0), self.peek(1), self.peek(2)) {
            (b'<', b'<', b'=') => (ShiftLeftAssign, 3),
            (b'>', b'>', b'=') => (ShiftRightAssign, 3),

            (b'+', b'+', _) => (Increment, 2),
            (b'-', b'-', _) => (Decrement, 2),
            (b'+', b'=', _) => (PlusAssign, 2),
            (b'-', b'=', _) => (MinusAssign, 2),
            (b'*', b'=', _) => (StarAssign, 2),
            (b'/', b'=', _) => (SlashAssign, 2),
            (b'%', b'=', _) => (PercentAssign, 2),
            (b'=', b'=', _) => (Equal, 2),
            (b'!', b'=', _) => (NotEqual, 2),
            (b'<', b'=', _) => (LessEqual, 2),
            (b'>', b'=', _) => (GreaterEqual, 2),
            (b'-', b'>', _) => (Arrow, 2),
            (b'&', b'&', _) => (LogicalAnd, 2),
            (b'|', b'|', _) => (LogicalOr, 2),
            (b'&', b'=', _) => (BitAndAssign, 2),
            (b'|', b'=', _) => (BitOrAssign, 2),
            (b'^', b'=', _) => (BitXorAssign, 2),
            (b'<', b'<', _) => (ShiftLeft, 2),
            (b'>', b'>', _) => (ShiftRight, 2),

            (b'+', _, _) => (Plus, 1),
            (b'-', _, _) => (Minus, 1),
            (b'*', _, _) => (Star, 1),
            (b'/', _, _) => (Slash, 1),
            (b'%', _, _) => (Percent, 1),
            (b'=', _, _) => (Assign, 1),
            (b'!', _, _) => (Not, 1),
            (b'<', _, _) => (Less, 1),
            (b'>', _, _) => (Greater, 1),
            (b'&', _, _) => (BitAnd, 1),
            (b'|', _, _) => (BitOr, 1),
            (b'^', _, _) => (BitXor, 1),
            (b'~', _, _) => (BitNot, 1),

            _ => return None,
        };

        self.advance_by(len);
        Some(kind)
    }

    fn delimiter(&mut self) -> Option<TokenKind> {
        let kind = match self.peek(0) {
            b';' => TokenKind::Semicolon,
            b',' => TokenKind::Comma,
            b'.' => TokenKind::Dot,
            b':' => TokenKind::Colon,
            b'?' => TokenKind::Question,
            _ => return None,
        };
        self.advance();
        Some(kind)
    }

    fn brace(&mut self) -> Option<TokenKind> {
        let kind = match self.peek(0) {
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            _ => return None,
        };
        self.advance();
        Some(kind)
    }

    /// Advance to next byte
    ///
    /// `\n`, and a `\r` not followed by `\n`, start a new line.
    fn advance(&mut self) -> Option<u8> {
        let ch = *self.source.get(self.position)?;
        self.position += 1;

        let breaks_line = ch == b'\n' || (ch == b'\r' && self.peek(0) != b'\n');
        if breaks_line {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn advance_by(&mut self, count: usize) {
        for _ in 0..count {
            self.advance();
        }
    }
}
