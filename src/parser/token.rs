//! Token kinds and token values produced by the [`Lexer`](super::lexer::Lexer)
//!
//! A [`Token`] never owns its text: it borrows the exact bytes it covers from
//! the source buffer, together with its byte span and starting line/column.

use super::ast::{SourceLocation, Span};
use rustc_hash::FxHashMap;
use std::borrow::Cow;
use std::fmt;
use std::sync::OnceLock;

/// Every token the lexer can produce.
///
/// The set is closed: consumers match on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Unknown,

    // Literals
    Identifier,
    IntLiteral,
    FloatLiteral,
    HexLiteral,
    StringLiteral,
    CharLiteral,

    // Keywords
    Return,
    If,
    Else,
    While,
    For,
    Break,
    Continue,
    Struct,
    Union,
    Enum,
    Typedef,
    Static,
    Void,
    Int,
    Char,
    Float,
    Double,
    Unsigned,
    Signed,
    Const,
    Extern,
    Switch,
    Case,
    Default,
    Sizeof,
    Inline,
    Do,
    Goto,
    Restrict,
    Volatile,
    Register,

    // Preprocessor
    Hash, // #

    // Operators
    Plus,             // +
    PlusAssign,       // +=
    Increment,        // ++
    Minus,            // -
    MinusAssign,      // -=
    Decrement,        // --
    Arrow,            // ->
    Star,             // *
    StarAssign,       // *=
    Slash,            // /
    SlashAssign,      // /=
    Percent,          // %
    PercentAssign,    // %=
    Assign,           // =
    Equal,            // ==
    Not,              // !
    NotEqual,         // !=
    Less,             // <
    LessEqual,        // <=
    ShiftLeft,        // <<
    ShiftLeftAssign,  // <<=
    Greater,          // >
    GreaterEqual,     // >=
    ShiftRight,       // >>
    ShiftRightAssign, // >>=
    BitAnd,           // &
    BitAndAssign,     // &=
    LogicalAnd,       // &&
    BitOr,            // |
    BitOrAssign,      // |=
    LogicalOr,        // ||
    BitXor,           // ^
    BitXorAssign,     // ^=
    BitNot,           // ~

    // Delimiters
    Semicolon, // ;
    Comma,     // ,
    Dot,       // .
    Colon,     // :
    Question,  // ?

    // Braces
    LParen,   // (
    RParen,   // )
    LBrace,   // {
    RBrace,   // }
    LBracket, // [
    RBracket, // ]

    // Trivia
    Space,
    Tab,
    Newline, // \n, \r or \r\n
    LineComment,
    BlockComment,

    Eof,
}

/// Keyword spellings, matched case-sensitively against identifier text.
pub const KEYWORDS: &[(&str, TokenKind)] = &[
    ("return", TokenKind::Return),
    ("if", TokenKind::If),
    ("else", TokenKind::Else),
    ("while", TokenKind::While),
    ("for", TokenKind::For),
    ("break", TokenKind::Break),
    ("continue", TokenKind::Continue),
    ("struct", TokenKind::Struct),
    ("union", TokenKind::Union),
    ("enum", TokenKind::Enum),
    ("typedef", TokenKind::Typedef),
    ("static", TokenKind::Static),
    ("void", TokenKind::Void),
    ("int", TokenKind::Int),
    ("char", TokenKind::Char),
    ("float", TokenKind::Float),
    ("double", TokenKind::Double),
    ("unsigned", TokenKind::Unsigned),
    ("signed", TokenKind::Signed),
    ("const", TokenKind::Const),
    ("extern", TokenKind::Extern),
    ("switch", TokenKind::Switch),
    ("case", TokenKind::Case),
    ("default", TokenKind::Default),
    ("sizeof", TokenKind::Sizeof),
    ("inline", TokenKind::Inline),
    ("do", TokenKind::Do),
    ("goto", TokenKind::Goto),
    ("restrict", TokenKind::Restrict),
    ("volatile", TokenKind::Volatile),
    ("register", TokenKind::Register),
];

fn keyword_index() -> &'static FxHashMap<&'static [u8], TokenKind> {
    static INDEX: OnceLock<FxHashMap<&'static [u8], TokenKind>> = OnceLock::new();
    INDEX.get_or_init(|| {
        KEYWORDS
            .iter()
            .map(|&(spelling, kind)| (spelling.as_bytes(), kind))
            .collect()
    })
}

/// Look up identifier text in the keyword table.
pub fn keyword(text: &[u8]) -> Option<TokenKind> {
    keyword_index().get(text).copied()
}

impl TokenKind {
    /// Stable printable name used by the token dump.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Unknown => "Unknown",
            TokenKind::Identifier => "Identifier",
            TokenKind::IntLiteral => "IntLiteral",
            TokenKind::FloatLiteral => "FloatLiteral",
            TokenKind::HexLiteral => "HexLiteral",
            TokenKind::StringLiteral => "StringLiteral",
            TokenKind::CharLiteral => "CharLiteral",
            TokenKind::Return => "KeywordReturn",
            TokenKind::If => "KeywordIf",
            TokenKind::Else => "KeywordElse",
            TokenKind::While => "KeywordWhile",
            TokenKind::For => "KeywordFor",
            TokenKind::Break => "KeywordBreak",
            TokenKind::Continue => "KeywordContinue",
            TokenKind::Struct => "KeywordStruct",
            TokenKind::Union => "KeywordUnion",
            TokenKind::Enum => "KeywordEnum",
            TokenKind::Typedef => "KeywordTypedef",
            TokenKind::Static => "KeywordStatic",
            TokenKind::Void => "KeywordVoid",
            TokenKind::Int => "KeywordInt",
            TokenKind::Char => "KeywordChar",
            TokenKind::Float => "KeywordFloat",
            TokenKind::Double => "KeywordDouble",
            TokenKind::Unsigned => "KeywordUnsigned",
            TokenKind::Signed => "KeywordSigned",
            TokenKind::Const => "KeywordConst",
            TokenKind::Extern => "KeywordExtern",
            TokenKind::Switch => "KeywordSwitch",
            TokenKind::Case => "KeywordCase",
            TokenKind::Default => "KeywordDefault",
            TokenKind::Sizeof => "KeywordSizeof",
            TokenKind::Inline => "KeywordInline",
            TokenKind::Do => "KeywordDo",
            TokenKind::Goto => "KeywordGoto",
            TokenKind::Restrict => "KeywordRestrict",
            TokenKind::Volatile => "KeywordVolatile",
            TokenKind::Register => "KeywordRegister",
            TokenKind::Hash => "PreprocessorHash",
            TokenKind::Plus => "Plus",
            TokenKind::PlusAssign => "PlusAssign",
            TokenKind::Increment => "Increment",
            TokenKind::Minus => "Minus",
            TokenKind::MinusAssign => "MinusAssign",
            TokenKind::Decrement => "Decrement",
            TokenKind::Arrow => "Arrow",
            TokenKind::Star => "Multiply",
            TokenKind::StarAssign => "MultiplyAssign",
            TokenKind::Slash => "Divide",
            TokenKind::SlashAssign => "DivideAssign",
            TokenKind::Percent => "Modulo",
            TokenKind::PercentAssign => "ModuloAssign",
            TokenKind::Assign => "Assign",
            TokenKind::Equal => "Equal",
            TokenKind::Not => "Not",
            TokenKind::NotEqual => "NotEqual",
            TokenKind::Less => "Less",
            TokenKind::LessEqual => "LessEqual",
            TokenKind::ShiftLeft => "LeftShift",
            TokenKind::ShiftLeftAssign => "LeftShiftAssign",
            TokenKind::Greater => "Greater",
            TokenKind::GreaterEqual => "GreaterEqual",
            TokenKind::ShiftRight => "RightShift",
            TokenKind::ShiftRightAssign => "RightShiftAssign",
            TokenKind::BitAnd => "BitAnd",
            TokenKind::BitAndAssign => "BitAndAssign",
            TokenKind::LogicalAnd => "LogicalAnd",
            TokenKind::BitOr => "BitOr",
            TokenKind::BitOrAssign => "BitOrAssign",
            TokenKind::LogicalOr => "LogicalOr",
            TokenKind::BitXor => "BitXor",
            TokenKind::BitXorAssign => "BitXorAssign",
            TokenKind::BitNot => "BitNot",
            TokenKind::Semicolon => "Semicolon",
            TokenKind::Comma => "Comma",
            TokenKind::Dot => "Dot",
            TokenKind::Colon => "Colon",
            TokenKind::Question => "Question",
            TokenKind::LParen => "OpenParenthesis",
            TokenKind::RParen => "CloseParenthesis",
            TokenKind::LBrace => "OpenBrace",
            TokenKind::RBrace => "CloseBrace",
            TokenKind::LBracket => "OpenBracket",
            TokenKind::RBracket => "CloseBracket",
            TokenKind::Space => "Space",
            TokenKind::Tab => "Tab",
            TokenKind::Newline => "NewLine",
            TokenKind::LineComment => "CommentLine",
            TokenKind::BlockComment => "CommentBlock",
            TokenKind::Eof => "EndOfFile",
        }
    }

    pub fn is_trivia(self) -> bool {
        self.is_whitespace() || self.is_comment()
    }

    pub fn is_whitespace(self) -> bool {
        matches!(self, TokenKind::Space | TokenKind::Tab | TokenKind::Newline)
    }

    pub fn is_comment(self) -> bool {
        matches!(self, TokenKind::LineComment | TokenKind::BlockComment)
    }

    pub fn is_keyword(self) -> bool {
        KEYWORDS.iter().any(|&(_, kind)| kind == self)
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::IntLiteral
                | TokenKind::FloatLiteral
                | TokenKind::HexLiteral
                | TokenKind::StringLiteral
                | TokenKind::CharLiteral
        )
    }

    /// Type keywords that may open a variable declaration.
    pub fn is_scalar_type(self) -> bool {
        matches!(
            self,
            TokenKind::Int
                | TokenKind::Float
                | TokenKind::Double
                | TokenKind::Char
                | TokenKind::Signed
                | TokenKind::Unsigned
                | TokenKind::Void
        )
    }

    /// Storage-class and qualifier keywords allowed before a function's type.
    pub fn is_declaration_specifier(self) -> bool {
        matches!(
            self,
            TokenKind::Static
                | TokenKind::Extern
                | TokenKind::Inline
                | TokenKind::Const
                | TokenKind::Volatile
                | TokenKind::Register
                | TokenKind::Restrict
        )
    }

    /// Identifier or keyword, i.e. anything spelled `[A-Za-z_][A-Za-z0-9_]*`.
    pub fn is_word(self) -> bool {
        self == TokenKind::Identifier || self.is_keyword()
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One lexed token, borrowing its text from the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub text: &'src [u8],
    pub span: Span,
    pub location: SourceLocation,
}

impl<'src> Token<'src> {
    pub fn new(kind: TokenKind, text: &'src [u8], span: Span, location: SourceLocation) -> Self {
        debug_assert_eq!(text.len(), span.len());
        Self {
            kind,
            text,
            span,
            location,
        }
    }

    /// Token text as UTF-8, replacing invalid sequences.
    pub fn lexeme(&self) -> Cow<'src, str> {
        String::from_utf8_lossy(self.text)
    }
}
