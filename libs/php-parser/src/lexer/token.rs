//! # Tokens
//!
//! Token types for the PHP lexer. Keywords are not separate kinds: PHP
//! keywords are case-insensitive and most of them are legal member names,
//! so they lex as [`TokenKind::Ident`] and the parser matches on text.

use php_ast::{Position, Span};

// =============================================================================
// TOKEN
// =============================================================================

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Token type.
    pub kind: TokenKind,
    /// Source span.
    pub span: Span,
    /// Line/column of the span start.
    pub pos: Position,
    /// Token text. Variables omit the `$`; casts hold the canonical cast name.
    pub text: String,
    /// Doc comment (`/** ... */`) immediately preceding this token.
    pub doc: Option<String>,
    /// Other comments between the previous token and this one, in order.
    pub comments: Vec<String>,
}

impl Token {
    /// Create a new token.
    pub fn new(kind: TokenKind, span: Span, pos: Position, text: String) -> Self {
        Self {
            kind,
            span,
            pos,
            text,
            doc: None,
            comments: Vec::new(),
        }
    }

    /// Check if token is EOF.
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Check if token is the identifier `keyword`, ignoring ASCII case.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Ident && self.text.eq_ignore_ascii_case(keyword)
    }
}

// =============================================================================
// TOKEN KIND
// =============================================================================

/// Types of tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Modes
    /// Text outside `<?php ... ?>`
    InlineHtml,
    /// `<?php`
    OpenTag,
    /// `<?=`
    OpenTagEcho,
    /// `?>`
    CloseTag,

    // Literals and names
    /// `$name`
    Variable,
    /// Identifier, keyword or qualified name (`Foo\Bar`, `\strlen`)
    Ident,
    /// Integer literal
    Int,
    /// Float literal
    Float,
    /// Quoted, backtick, heredoc or nowdoc string
    String,
    /// `(int)`, `(string)`, ...
    Cast,
    /// `#[...]`, raw text
    Attribute,

    // Delimiters
    Semicolon,
    Comma,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Backslash,
    Colon,
    DoubleColon,
    Ellipsis,
    Dollar,

    // Operators
    Question,
    QuestionQuestion,
    QuestionQuestionEq,
    QuestionArrow,
    Arrow,
    FatArrow,
    Eq,
    EqEq,
    EqEqEq,
    BangEq,
    BangEqEq,
    Bang,
    Lt,
    LtEq,
    Spaceship,
    Shl,
    ShlEq,
    Gt,
    GtEq,
    Shr,
    ShrEq,
    Plus,
    PlusEq,
    PlusPlus,
    Minus,
    MinusEq,
    MinusMinus,
    Star,
    StarEq,
    Pow,
    PowEq,
    Slash,
    SlashEq,
    Percent,
    PercentEq,
    Dot,
    DotEq,
    Amp,
    AmpAmp,
    AmpEq,
    Pipe,
    PipePipe,
    PipeEq,
    Caret,
    CaretEq,
    Tilde,
    At,

    // Meta
    /// End of file
    Eof,
}

impl TokenKind {
    /// Get display name for error messages.
    pub const fn display(&self) -> &'static str {
        match self {
            Self::InlineHtml => "inline HTML",
            Self::OpenTag => "'<?php'",
            Self::OpenTagEcho => "'<?='",
            Self::CloseTag => "'?>'",
            Self::Variable => "variable",
            Self::Ident => "identifier",
            Self::Int => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Cast => "cast",
            Self::Attribute => "attribute",
            Self::Semicolon => "';'",
            Self::Comma => "','",
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::LBracket => "'['",
            Self::RBracket => "']'",
            Self::LBrace => "'{'",
            Self::RBrace => "'}'",
            Self::Backslash => "'\\'",
            Self::Colon => "':'",
            Self::DoubleColon => "'::'",
            Self::Ellipsis => "'...'",
            Self::Dollar => "'$'",
            Self::Question => "'?'",
            Self::QuestionQuestion => "'??'",
            Self::QuestionQuestionEq => "'??='",
            Self::QuestionArrow => "'?->'",
            Self::Arrow => "'->'",
            Self::FatArrow => "'=>'",
            Self::Eq => "'='",
            Self::EqEq => "'=='",
            Self::EqEqEq => "'==='",
            Self::BangEq => "'!='",
            Self::BangEqEq => "'!=='",
            Self::Bang => "'!'",
            Self::Lt => "'<'",
            Self::LtEq => "'<='",
            Self::Spaceship => "'<=>'",
            Self::Shl => "'<<'",
            Self::ShlEq => "'<<='",
            Self::Gt => "'>'",
            Self::GtEq => "'>='",
            Self::Shr => "'>>'",
            Self::ShrEq => "'>>='",
            Self::Plus => "'+'",
            Self::PlusEq => "'+='",
            Self::PlusPlus => "'++'",
            Self::Minus => "'-'",
            Self::MinusEq => "'-='",
            Self::MinusMinus => "'--'",
            Self::Star => "'*'",
            Self::StarEq => "'*='",
            Self::Pow => "'**'",
            Self::PowEq => "'**='",
            Self::Slash => "'/'",
            Self::SlashEq => "'/='",
            Self::Percent => "'%'",
            Self::PercentEq => "'%='",
            Self::Dot => "'.'",
            Self::DotEq => "'.='",
            Self::Amp => "'&'",
            Self::AmpAmp => "'&&'",
            Self::AmpEq => "'&='",
            Self::Pipe => "'|'",
            Self::PipePipe => "'||'",
            Self::PipeEq => "'|='",
            Self::Caret => "'^'",
            Self::CaretEq => "'^='",
            Self::Tilde => "'~'",
            Self::At => "'@'",
            Self::Eof => "end of file",
        }
    }

    /// Check if this token ends a statement.
    pub const fn is_statement_end(&self) -> bool {
        matches!(self, Self::Semicolon | Self::CloseTag)
    }
}

/// Punctuation, longest first so that `===` wins over `==` and `=`.
pub(crate) const PUNCTUATION: &[(&str, TokenKind)] = &[
    ("===", TokenKind::EqEqEq),
    ("!==", TokenKind::BangEqEq),
    ("<=>", TokenKind::Spaceship),
    ("**=", TokenKind::PowEq),
    ("...", TokenKind::Ellipsis),
    ("<<=", TokenKind::ShlEq),
    (">>=", TokenKind::ShrEq),
    ("??=", TokenKind::QuestionQuestionEq),
    ("?->", TokenKind::QuestionArrow),
    ("==", TokenKind::EqEq),
    ("!=", TokenKind::BangEq),
    ("<>", TokenKind::BangEq),
    ("<=", TokenKind::LtEq),
    (">=", TokenKind::GtEq),
    ("<<", TokenKind::Shl),
    (">>", TokenKind::Shr),
    ("++", TokenKind::PlusPlus),
    ("--", TokenKind::MinusMinus),
    ("+=", TokenKind::PlusEq),
    ("-=", TokenKind::MinusEq),
    ("*=", TokenKind::StarEq),
    ("/=", TokenKind::SlashEq),
    ("%=", TokenKind::PercentEq),
    (".=", TokenKind::DotEq),
    ("&=", TokenKind::AmpEq),
    ("|=", TokenKind::PipeEq),
    ("^=", TokenKind::CaretEq),
    ("&&", TokenKind::AmpAmp),
    ("||", TokenKind::PipePipe),
    ("??", TokenKind::QuestionQuestion),
    ("->", TokenKind::Arrow),
    ("=>", TokenKind::FatArrow),
    ("::", TokenKind::DoubleColon),
    ("**", TokenKind::Pow),
    (";", TokenKind::Semicolon),
    (",", TokenKind::Comma),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    ("[", TokenKind::LBracket),
    ("]", TokenKind::RBracket),
    ("{", TokenKind::LBrace),
    ("}", TokenKind::RBrace),
    ("\\", TokenKind::Backslash),
    (":", TokenKind::Colon),
    ("$", TokenKind::Dollar),
    ("?", TokenKind::Question),
    ("=", TokenKind::Eq),
    ("!", TokenKind::Bang),
    ("<", TokenKind::Lt),
    (">", TokenKind::Gt),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Star),
    ("/", TokenKind::Slash),
    ("%", TokenKind::Percent),
    (".", TokenKind::Dot),
    ("&", TokenKind::Amp),
    ("|", TokenKind::Pipe),
    ("^", TokenKind::Caret),
    ("~", TokenKind::Tilde),
    ("@", TokenKind::At),
];

/// Cast spellings and the canonical name each one maps to.
pub(crate) const CASTS: &[(&str, &str)] = &[
    ("int", "int"),
    ("integer", "int"),
    ("float", "float"),
    ("double", "float"),
    ("real", "float"),
    ("string", "string"),
    ("binary", "string"),
    ("bool", "bool"),
    ("boolean", "bool"),
    ("array", "array"),
    ("object", "object"),
];

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_are_case_insensitive() {
        let token = Token::new(TokenKind::Ident, Span::new(0, 5), Position::default(), "CLASS".to_string());
        assert!(token.is_keyword("class"));
        assert!(!token.is_keyword("clas"));
    }

    #[test]
    fn test_punctuation_longest_first() {
        let eq = PUNCTUATION.iter().position(|(s, _)| *s == "=").unwrap_or(0);
        let eqeqeq = PUNCTUATION.iter().position(|(s, _)| *s == "===").unwrap_or(usize::MAX);
        assert!(eqeqeq < eq);
    }

    #[test]
    fn test_statement_end() {
        assert!(TokenKind::Semicolon.is_statement_end());
        assert!(TokenKind::CloseTag.is_statement_end());
        assert!(!TokenKind::RBrace.is_statement_end());
    }
}
