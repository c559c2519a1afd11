//! # PHP Lexer
//!
//! Tokenizes PHP source code. The lexer starts in inline-HTML mode and
//! switches to code at `<?php` / `<?=`, back again at `?>`.
//!
//! Comments are attached to the next token: the last doc comment
//! (`/** ... */`) as [`Token::doc`], everything else in source order as
//! [`Token::comments`]. String, heredoc and attribute tokens keep their raw
//! source text so printing reproduces them exactly.
//!
//! ## Example
//!
//! ```rust
//! use php_parser::lexer::{Lexer, TokenKind};
//!
//! let tokens = Lexer::new("<?php echo $x;").tokenize().unwrap();
//! assert_eq!(tokens[0].kind, TokenKind::OpenTag);
//! assert_eq!(tokens[1].kind, TokenKind::Ident);
//! assert_eq!(tokens[2].kind, TokenKind::Variable);
//! ```

mod cursor;
mod token;

pub use cursor::Cursor;
pub use token::{Token, TokenKind};

use crate::error::{ParseError, ParseErrorKind};
use php_ast::{Position, Span};
use token::{CASTS, PUNCTUATION};

// =============================================================================
// LEXER
// =============================================================================

/// PHP lexer.
///
/// Converts source text into a stream of tokens terminated by
/// [`TokenKind::Eof`].
pub struct Lexer<'a> {
    /// Source text being lexed.
    source: &'a str,
    /// Character cursor.
    cursor: Cursor<'a>,
    /// Collected tokens.
    tokens: Vec<Token>,
    /// Doc comment waiting for the next token.
    pending_doc: Option<String>,
    /// Plain comments waiting for the next token.
    pending_comments: Vec<String>,
    /// Outside `<?php ... ?>`.
    in_html: bool,
    saw_open_tag: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for source text.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            cursor: Cursor::new(source),
            tokens: Vec::new(),
            pending_doc: None,
            pending_comments: Vec::new(),
            in_html: true,
            saw_open_tag: false,
        }
    }

    /// Tokenize the entire source.
    ///
    /// ## Returns
    ///
    /// Tokens including the final EOF token, or the first lexical error.
    /// A source without any open tag is rejected with
    /// [`ParseErrorKind::MissingOpenTag`].
    pub fn tokenize(mut self) -> Result<Vec<Token>, ParseError> {
        loop {
            if self.in_html {
                self.scan_inline_html();
                if self.in_html {
                    break;
                }
                continue;
            }

            self.skip_trivia()?;
            if self.cursor.is_eof() {
                break;
            }

            if self.cursor.starts_with("?>") {
                let start = self.cursor.position();
                self.cursor.advance_by(2);
                // A single newline after the close tag belongs to the tag.
                if self.cursor.starts_with("\r\n") {
                    self.cursor.advance_by(2);
                } else if self.cursor.starts_with("\n") {
                    self.cursor.advance();
                }
                self.push_text(TokenKind::CloseTag, start, "?>".to_string());
                self.in_html = true;
                continue;
            }

            self.scan_token()?;
        }

        if !self.saw_open_tag {
            return Err(ParseError::new(
                ParseErrorKind::MissingOpenTag,
                Span::new(0, 0),
                Position::default(),
            ));
        }

        let eof = self.cursor.position();
        let mut token = Token::new(TokenKind::Eof, Span::new(eof.byte, eof.byte), eof, String::new());
        token.comments = std::mem::take(&mut self.pending_comments);
        token.comments.extend(self.pending_doc.take());
        self.tokens.push(token);

        Ok(self.tokens)
    }

    // =========================================================================
    // TOKEN CONSTRUCTION
    // =========================================================================

    /// Push a token whose text is the source slice from `start` to here.
    fn push(&mut self, kind: TokenKind, start: Position) {
        let text = self.source[start.byte..self.cursor.offset()].to_string();
        self.push_text(kind, start, text);
    }

    fn push_text(&mut self, kind: TokenKind, start: Position, text: String) {
        let span = Span::new(start.byte, self.cursor.offset());
        let mut token = Token::new(kind, span, start, text);
        token.doc = self.pending_doc.take();
        token.comments = std::mem::take(&mut self.pending_comments);
        self.tokens.push(token);
    }

    fn error(&self, kind: ParseErrorKind, start: Position) -> ParseError {
        let end = self.cursor.offset().max(start.byte);
        ParseError::new(kind, Span::new(start.byte, end), start)
    }

    // =========================================================================
    // MODES
    // =========================================================================

    /// Consume inline HTML up to and including the next open tag.
    fn scan_inline_html(&mut self) {
        let start = self.cursor.position();
        match find_open_tag(self.cursor.rest()) {
            Some((offset, len, kind)) => {
                if offset > 0 {
                    self.cursor.advance_to(start.byte + offset);
                    self.push(TokenKind::InlineHtml, start);
                }
                let tag_start = self.cursor.position();
                self.cursor.advance_to(tag_start.byte + len);
                let text = self.source[tag_start.byte..self.cursor.offset()].to_string();
                if kind == TokenKind::OpenTag {
                    if self.cursor.starts_with("\r\n") {
                        self.cursor.advance_by(2);
                    } else if self.cursor.peek().map_or(false, char::is_whitespace) {
                        self.cursor.advance();
                    }
                }
                self.push_text(kind, tag_start, text);
                self.in_html = false;
                self.saw_open_tag = true;
            }
            None => {
                if !self.cursor.is_eof() {
                    self.cursor.advance_to(self.source.len());
                    self.push(TokenKind::InlineHtml, start);
                }
            }
        }
    }

    /// Skip whitespace and collect comments. A doc comment followed by
    /// another doc comment is demoted to a plain one.
    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            self.cursor.advance_while(char::is_whitespace);

            if self.cursor.starts_with("#[") {
                return Ok(());
            }

            if self.cursor.starts_with("//") || self.cursor.starts_with("#") {
                let start = self.cursor.offset();
                while let Some(c) = self.cursor.peek() {
                    if c == '\n' || self.cursor.starts_with("?>") {
                        break;
                    }
                    self.cursor.advance();
                }
                let text = self.source[start..self.cursor.offset()].trim_end();
                self.pending_comments.push(text.to_string());
                continue;
            }

            if self.cursor.starts_with("/*") {
                let start = self.cursor.position();
                let is_doc = self.cursor.starts_with("/**") && !self.cursor.starts_with("/**/");
                let Some(close) = self.cursor.rest()[2..].find("*/") else {
                    self.cursor.advance_to(self.source.len());
                    return Err(self.error(ParseErrorKind::UnterminatedComment, start));
                };
                let end = start.byte + 2 + close + 2;
                self.cursor.advance_to(end);
                let text = self.source[start.byte..end].to_string();
                if is_doc {
                    if let Some(earlier) = self.pending_doc.replace(text) {
                        self.pending_comments.push(earlier);
                    }
                } else {
                    self.pending_comments.push(text);
                }
                continue;
            }

            return Ok(());
        }
    }

    // =========================================================================
    // CODE TOKENS
    // =========================================================================

    /// Scan a single token.
    fn scan_token(&mut self) -> Result<(), ParseError> {
        let start = self.cursor.position();
        let Some(c) = self.cursor.peek() else {
            return Ok(());
        };
        let next = self.cursor.peek_next();

        if c == '$' && next.map_or(false, is_ident_start) {
            self.cursor.advance();
            let name_start = self.cursor.offset();
            self.cursor.advance_while(is_ident_char);
            let name = self.source[name_start..self.cursor.offset()].to_string();
            self.push_text(TokenKind::Variable, start, name);
            return Ok(());
        }

        if is_ident_start(c) || (c == '\\' && next.map_or(false, is_ident_start)) {
            self.scan_name(start);
            return Ok(());
        }

        if c.is_ascii_digit() || (c == '.' && next.map_or(false, |n| n.is_ascii_digit())) {
            self.scan_number(start);
            return Ok(());
        }

        match c {
            '\'' | '"' | '`' => {
                self.cursor.advance();
                self.skip_quoted(c, c != '\'', start)?;
                self.push(TokenKind::String, start);
                return Ok(());
            }
            '(' => {
                if let Some((consumed, canonical)) = self.match_cast() {
                    self.cursor.advance_to(start.byte + consumed);
                    self.push_text(TokenKind::Cast, start, canonical.to_string());
                    return Ok(());
                }
            }
            _ => {}
        }

        if self.cursor.starts_with("<<<") {
            return self.scan_heredoc(start);
        }

        if self.cursor.starts_with("#[") {
            return self.scan_attribute(start);
        }

        for (text, kind) in PUNCTUATION {
            if self.cursor.starts_with(text) {
                self.cursor.advance_by(text.len());
                self.push(*kind, start);
                return Ok(());
            }
        }

        self.cursor.advance();
        Err(self.error(
            ParseErrorKind::UnexpectedToken {
                found: c.to_string(),
                expected: "token".to_string(),
            },
            start,
        ))
    }

    /// Scan an identifier, keyword or qualified name.
    fn scan_name(&mut self, start: Position) {
        while let Some(c) = self.cursor.peek() {
            if c == '\\' && self.cursor.peek_next().map_or(false, is_ident_start) {
                self.cursor.advance();
            } else if is_ident_char(c) {
                self.cursor.advance();
            } else {
                break;
            }
        }
        self.push(TokenKind::Ident, start);
    }

    /// Scan an integer or float literal, kept as written.
    fn scan_number(&mut self, start: Position) {
        let rest = self.cursor.rest();
        let radix_digit: Option<fn(char) -> bool> = if rest.starts_with("0x") || rest.starts_with("0X") {
            Some(|c: char| c.is_ascii_hexdigit() || c == '_')
        } else if rest.starts_with("0b") || rest.starts_with("0B") {
            Some(|c: char| c == '0' || c == '1' || c == '_')
        } else if rest.starts_with("0o") || rest.starts_with("0O") {
            Some(|c: char| ('0'..='7').contains(&c) || c == '_')
        } else {
            None
        };

        if let Some(is_digit) = radix_digit {
            self.cursor.advance_by(2);
            self.cursor.advance_while(is_digit);
            self.push(TokenKind::Int, start);
            return;
        }

        let mut is_float = false;
        self.cursor.advance_while(|c| c.is_ascii_digit() || c == '_');
        if self.cursor.peek() == Some('.') && self.cursor.peek_next().map_or(false, |c| c.is_ascii_digit()) {
            is_float = true;
            self.cursor.advance();
            self.cursor.advance_while(|c| c.is_ascii_digit() || c == '_');
        }
        if matches!(self.cursor.peek(), Some('e' | 'E')) {
            let signed = matches!(self.cursor.peek_next(), Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.cursor.peek_nth(digit_at).map_or(false, |c| c.is_ascii_digit()) {
                is_float = true;
                self.cursor.advance_by(digit_at);
                self.cursor.advance_while(|c| c.is_ascii_digit());
            }
        }
        self.push(if is_float { TokenKind::Float } else { TokenKind::Int }, start);
    }

    /// Recognize `( int )` style casts. Returns consumed bytes and the
    /// canonical cast name.
    fn match_cast(&self) -> Option<(usize, &'static str)> {
        let rest = self.cursor.rest();
        let is_blank = |c: char| c == ' ' || c == '\t';
        let body = rest.get(1..)?.trim_start_matches(is_blank);
        let word_len = body.find(|c: char| !c.is_ascii_alphabetic()).unwrap_or(body.len());
        let word = &body[..word_len];
        let after = body[word_len..].trim_start_matches(is_blank);
        if word.is_empty() || !after.starts_with(')') {
            return None;
        }
        let canonical = CASTS.iter().find(|(spelling, _)| word.eq_ignore_ascii_case(spelling))?.1;
        Some((rest.len() - after.len() + 1, canonical))
    }

    /// Skip the body of a quoted literal whose opening quote is consumed.
    fn skip_quoted(&mut self, quote: char, interpolates: bool, start: Position) -> Result<(), ParseError> {
        loop {
            match self.cursor.peek() {
                None => return Err(self.error(ParseErrorKind::UnterminatedString, start)),
                Some('\\') => {
                    self.cursor.advance();
                    self.cursor.advance();
                }
                Some(c) if c == quote => {
                    self.cursor.advance();
                    return Ok(());
                }
                Some('{') if interpolates && self.cursor.peek_next() == Some('$') => {
                    self.skip_interpolation(start)?;
                }
                Some('$') if interpolates && self.cursor.peek_next() == Some('{') => {
                    self.cursor.advance();
                    self.skip_interpolation(start)?;
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    /// Skip a `{...}` interpolation inside a double-quoted string.
    fn skip_interpolation(&mut self, start: Position) -> Result<(), ParseError> {
        let mut depth = 0usize;
        loop {
            match self.cursor.peek() {
                None => return Err(self.error(ParseErrorKind::UnterminatedString, start)),
                Some('{') => {
                    depth += 1;
                    self.cursor.advance();
                }
                Some('}') => {
                    self.cursor.advance();
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Ok(());
                    }
                }
                Some(q @ ('\'' | '"')) => {
                    self.cursor.advance();
                    self.skip_quoted(q, q == '"', start)?;
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    /// Scan a heredoc or nowdoc, closing label included.
    fn scan_heredoc(&mut self, start: Position) -> Result<(), ParseError> {
        self.cursor.advance_by(3);
        self.cursor.advance_while(|c| c == ' ' || c == '\t');
        let quote = match self.cursor.peek() {
            Some(q @ ('\'' | '"')) => {
                self.cursor.advance();
                Some(q)
            }
            _ => None,
        };
        let label_start = self.cursor.offset();
        self.cursor.advance_while(is_ident_char);
        let label = self.source[label_start..self.cursor.offset()].to_string();
        if label.is_empty() {
            return Err(self.error(
                ParseErrorKind::UnexpectedToken {
                    found: "<<<".to_string(),
                    expected: "heredoc label".to_string(),
                },
                start,
            ));
        }
        if let Some(q) = quote {
            if self.cursor.peek() != Some(q) {
                return Err(self.error(ParseErrorKind::UnterminatedString, start));
            }
            self.cursor.advance();
        }
        if self.cursor.starts_with("\r\n") {
            self.cursor.advance_by(2);
        } else if self.cursor.starts_with("\n") {
            self.cursor.advance();
        } else {
            return Err(self.error(ParseErrorKind::UnterminatedString, start));
        }

        loop {
            let line = self.cursor.rest();
            let body = line.trim_start_matches(|c| c == ' ' || c == '\t');
            let indent = line.len() - body.len();
            let closes = body.starts_with(label.as_str())
                && !body[label.len()..].chars().next().map_or(false, is_ident_char);
            if closes {
                let end = self.cursor.offset() + indent + label.len();
                self.cursor.advance_to(end);
                break;
            }
            match line.find('\n') {
                Some(i) => {
                    let next_line = self.cursor.offset() + i + 1;
                    self.cursor.advance_to(next_line);
                }
                None => {
                    self.cursor.advance_to(self.source.len());
                    return Err(self.error(ParseErrorKind::UnterminatedString, start));
                }
            }
        }

        self.push(TokenKind::String, start);
        Ok(())
    }

    /// Scan `#[...]`, nested brackets and strings included.
    fn scan_attribute(&mut self, start: Position) -> Result<(), ParseError> {
        self.cursor.advance_by(2);
        let mut depth = 1usize;
        loop {
            match self.cursor.peek() {
                None => {
                    return Err(self.error(
                        ParseErrorKind::UnexpectedEof {
                            expected: "']'".to_string(),
                        },
                        start,
                    ))
                }
                Some('[') => {
                    depth += 1;
                    self.cursor.advance();
                }
                Some(']') => {
                    self.cursor.advance();
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                Some(q @ ('\'' | '"')) => {
                    self.cursor.advance();
                    self.skip_quoted(q, q == '"', start)?;
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
        self.push(TokenKind::Attribute, start);
        Ok(())
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Locate the next `<?php` (followed by whitespace or EOF) or `<?=`.
///
/// Returns byte offset, tag length and tag kind.
fn find_open_tag(text: &str) -> Option<(usize, usize, TokenKind)> {
    let mut from = 0;
    while let Some(i) = text[from..].find("<?") {
        let at = from + i;
        let after = &text[at + 2..];
        if after.starts_with('=') {
            return Some((at, 3, TokenKind::OpenTagEcho));
        }
        if after.get(..3).map_or(false, |s| s.eq_ignore_ascii_case("php"))
            && after[3..].chars().next().map_or(true, char::is_whitespace)
        {
            return Some((at, 5, TokenKind::OpenTag));
        }
        from = at + 2;
    }
    None
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_empty_source_has_no_open_tag() {
        let err = Lexer::new("").tokenize().unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingOpenTag);
    }

    #[test]
    fn test_open_tag_only() {
        assert_eq!(kinds("<?php"), vec![TokenKind::OpenTag, TokenKind::Eof]);
    }

    #[test]
    fn test_inline_html_around_code() {
        assert_eq!(
            kinds("<p><?php echo 1; ?>\n</p>"),
            vec![
                TokenKind::InlineHtml,
                TokenKind::OpenTag,
                TokenKind::Ident,
                TokenKind::Int,
                TokenKind::Semicolon,
                TokenKind::CloseTag,
                TokenKind::InlineHtml,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_variable_text_omits_dollar() {
        let tokens = Lexer::new("<?php $userName").tokenize().unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Variable);
        assert_eq!(tokens[1].text, "userName");
    }

    #[test]
    fn test_qualified_name_is_one_token() {
        let tokens = Lexer::new("<?php \\App\\Models\\User").tokenize().unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Ident);
        assert_eq!(tokens[1].text, "\\App\\Models\\User");
    }

    #[test]
    fn test_casts_are_canonical() {
        let tokens = Lexer::new("<?php (integer) ( bool )").tokenize().unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Cast);
        assert_eq!(tokens[1].text, "int");
        assert_eq!(tokens[2].text, "bool");
    }

    #[test]
    fn test_paren_expression_is_not_cast() {
        assert_eq!(
            kinds("<?php (foo)"),
            vec![TokenKind::OpenTag, TokenKind::LParen, TokenKind::Ident, TokenKind::RParen, TokenKind::Eof]
        );
    }

    #[test]
    fn test_numbers() {
        let tokens = Lexer::new("<?php 42 0x1F 1_000 1.5 .5 1e3").tokenize().unwrap();
        let got: Vec<_> = tokens[1..7].iter().map(|t| (t.kind, t.text.as_str())).collect();
        assert_eq!(
            got,
            vec![
                (TokenKind::Int, "42"),
                (TokenKind::Int, "0x1F"),
                (TokenKind::Int, "1_000"),
                (TokenKind::Float, "1.5"),
                (TokenKind::Float, ".5"),
                (TokenKind::Float, "1e3"),
            ]
        );
    }

    #[test]
    fn test_interpolated_string_with_nested_quotes() {
        let tokens = Lexer::new(r#"<?php "a {$x["k"]} b";"#).tokenize().unwrap();
        assert_eq!(tokens[1].kind, TokenKind::String);
        assert_eq!(tokens[1].text, r#""a {$x["k"]} b""#);
        assert_eq!(tokens[2].kind, TokenKind::Semicolon);
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::new("<?php 'abc").tokenize().unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnterminatedString);
        assert_eq!(err.span.start(), 6);
    }

    #[test]
    fn test_unterminated_comment() {
        let err = Lexer::new("<?php /* abc").tokenize().unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnterminatedComment);
    }

    #[test]
    fn test_heredoc_kept_raw() {
        let source = "<?php $s = <<<EOT\n  hello\n  EOT;\n";
        let tokens = Lexer::new(source).tokenize().unwrap();
        assert_eq!(tokens[3].kind, TokenKind::String);
        assert_eq!(tokens[3].text, "<<<EOT\n  hello\n  EOT");
        assert_eq!(tokens[4].kind, TokenKind::Semicolon);
    }

    #[test]
    fn test_doc_comment_attaches_to_next_token() {
        let tokens = Lexer::new("<?php /** Doc. */ // note\n function f() {}").tokenize().unwrap();
        assert_eq!(tokens[1].text, "function");
        assert_eq!(tokens[1].doc.as_deref(), Some("/** Doc. */"));
        assert_eq!(tokens[2].doc, None);
    }

    #[test]
    fn test_plain_comments_attach_in_order() {
        let tokens = Lexer::new("<?php // one  \n# two\n/* three */ /** old */ /** new */ $x; // tail")
            .tokenize()
            .unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Variable);
        assert_eq!(tokens[1].comments, vec!["// one", "# two", "/* three */", "/** old */"]);
        assert_eq!(tokens[1].doc.as_deref(), Some("/** new */"));
        let eof = tokens.last().unwrap();
        assert!(eof.is_eof());
        assert_eq!(eof.comments, vec!["// tail"]);
    }

    #[test]
    fn test_hash_comment_and_attribute() {
        let tokens = Lexer::new("<?php # comment\n#[Route('/x')] function f() {}").tokenize().unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Attribute);
        assert_eq!(tokens[1].text, "#[Route('/x')]");
    }

    #[test]
    fn test_line_comment_stops_at_close_tag() {
        assert_eq!(
            kinds("<?php // c ?>x"),
            vec![TokenKind::OpenTag, TokenKind::CloseTag, TokenKind::InlineHtml, TokenKind::Eof]
        );
    }

    #[test]
    fn test_longest_punctuation() {
        assert_eq!(
            kinds("<?php === ?-> ??= **"),
            vec![
                TokenKind::OpenTag,
                TokenKind::EqEqEq,
                TokenKind::QuestionArrow,
                TokenKind::QuestionQuestionEq,
                TokenKind::Pow,
                TokenKind::Eof,
            ]
        );
    }
}
