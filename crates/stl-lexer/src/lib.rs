//! Lexer for the State Transition Language (STL).
//!
//! STL source is tokenized in a single, context-free pass: reserved words,
//! identifiers, integer and string literals, the booleans `true`/`false`,
//! `null`, and the single- and two-character punctuation the grammar needs
//! (`-> : ; { } ( ) [ ] = , . &`). Line comments start with `//`.
//!
//! # Usage
//!
//! ```
//! use stl_lexer::Lexer;
//! use stl_token::TokenKind;
//!
//! let mut lexer = Lexer::new("module foo;");
//! let tokens: Vec<_> = lexer.tokenize().into_iter().map(|t| t.kind).collect();
//! assert!(matches!(tokens[0], TokenKind::Reserved(_)));
//! assert_eq!(tokens.last(), Some(&TokenKind::Eof));
//! ```

mod error;

pub use error::{LexerError, Result};

use stl_token::{ReservedWord, Token, TokenKind};

/// Byte-by-byte cursor over STL source text, tracking 1-based line/column.
pub struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: u32,
    column: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer { source, bytes: source.as_bytes(), pos: 0, line: 1, column: 1 }
    }

    /// Tokenize the whole input, collecting lexer errors as `Error` tokens
    /// rather than aborting — the parser decides whether a lex failure is
    /// fatal via the error-position it carries.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            match self.next_token() {
                Ok(tok) => {
                    let is_eof = tok.kind == TokenKind::Eof;
                    tokens.push(tok);
                    if is_eof {
                        break;
                    }
                }
                Err(err) => {
                    tokens.push(self.error_token(err));
                    break;
                }
            }
        }
        tokens
    }

    /// Produce the next token, or a `LexerError` describing why the source
    /// could not be tokenized further.
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_trivia();

        let start = self.pos;
        let (line, col_start) = (self.line, self.column);

        let Some(ch) = self.peek_char() else {
            return Ok(self.make_token(TokenKind::Eof, start, line, col_start));
        };

        if ch == '"' {
            return self.lex_string(start, line, col_start);
        }
        if ch == '\'' {
            self.advance_char();
            return Err(LexerError::UnsupportedSingleQuote { start });
        }
        if ch == '-' && self.peek_at(1) == Some('>') {
            self.advance_char();
            self.advance_char();
            return Ok(self.make_token(TokenKind::Arrow, start, line, col_start));
        }
        if ch.is_ascii_digit() || (ch == '-' && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()))
        {
            return Ok(self.lex_integer(start, line, col_start));
        }
        if is_ident_start(ch) {
            return Ok(self.lex_identifier(start, line, col_start));
        }
        if let Some(kind) = single_char_kind(ch) {
            self.advance_char();
            return Ok(self.make_token(kind, start, line, col_start));
        }

        self.advance_char();
        Err(LexerError::UnknownLexerError { start, found: ch })
    }

    fn error_token(&self, err: LexerError) -> Token {
        Token::new(TokenKind::Error, self.source[err.start()..self.pos].to_string(), err.start(), self.pos, self.line, (self.column, self.column + 1))
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek_char() {
                Some(' ') | Some('\t') => {
                    self.advance_char();
                }
                Some('\n') => {
                    self.advance_char();
                }
                Some('\r') => {
                    self.advance_char();
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    let rest = &self.bytes[self.pos..];
                    let len = memchr::memchr(b'\n', rest).unwrap_or(rest.len());
                    self.column += len as u32;
                    self.pos += len;
                }
                _ => break,
            }
        }
    }

    fn lex_string(&mut self, start: usize, line: u32, col_start: u32) -> Result<Token> {
        self.advance_char(); // opening quote
        loop {
            match self.peek_char() {
                None | Some('\n') => return Err(LexerError::MissingStringQuote { start }),
                Some('\\') => {
                    self.advance_char();
                    match self.peek_char() {
                        Some('"') | Some('\\') => self.advance_char(),
                        _ => return Err(LexerError::MissingStringQuote { start }),
                    }
                }
                Some('"') => {
                    self.advance_char();
                    break;
                }
                Some(_) => self.advance_char(),
            }
        }
        Ok(self.make_token(TokenKind::String, start, line, col_start))
    }

    fn lex_integer(&mut self, start: usize, line: u32, col_start: u32) -> Token {
        if self.peek_char() == Some('-') {
            self.advance_char();
        }
        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.advance_char();
        }
        self.make_token(TokenKind::Integer, start, line, col_start)
    }

    fn lex_identifier(&mut self, start: usize, line: u32, col_start: u32) -> Token {
        self.advance_char();
        while self.peek_char().is_some_and(is_ident_continue) {
            self.advance_char();
        }
        let text = &self.source[start..self.pos];
        let kind = match text {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            _ => match ReservedWord::lookup(text) {
                Some(word) => TokenKind::Reserved(word),
                None => TokenKind::Identifier,
            },
        };
        self.make_token(kind, start, line, col_start)
    }

    fn make_token(&self, kind: TokenKind, start: usize, line: u32, col_start: u32) -> Token {
        Token::new(kind, &self.source[start..self.pos], start, self.pos, line, (col_start, self.column))
    }

    fn peek_char(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.source[self.pos..].chars().nth(ahead)
    }

    fn advance_char(&mut self) {
        if let Some(ch) = self.peek_char() {
            self.pos += ch.len_utf8();
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }
}

fn is_ident_start(ch: char) -> bool {
    ch == '_' || unicode_ident::is_xid_start(ch)
}

fn is_ident_continue(ch: char) -> bool {
    ch == '_' || unicode_ident::is_xid_continue(ch)
}

fn single_char_kind(ch: char) -> Option<TokenKind> {
    Some(match ch {
        ':' => TokenKind::Colon,
        ';' => TokenKind::Semicolon,
        '{' => TokenKind::LeftBrace,
        '}' => TokenKind::RightBrace,
        '(' => TokenKind::LeftParen,
        ')' => TokenKind::RightParen,
        '[' => TokenKind::LeftBracket,
        ']' => TokenKind::RightBracket,
        '=' => TokenKind::Equals,
        ',' => TokenKind::Comma,
        '.' => TokenKind::Dot,
        '&' => TokenKind::Ampersand,
        '$' => TokenKind::Dollar,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src).tokenize().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn tokenizes_module_header() {
        let kinds = kinds("module foo;");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Reserved(stl_token::ReservedWord::Module),
                TokenKind::Identifier,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn negative_integer_literal() {
        let kinds = kinds("-42");
        assert_eq!(kinds, vec![TokenKind::Integer, TokenKind::Eof]);
    }

    #[test]
    fn string_with_escapes() {
        let tokens = Lexer::new(r#""a\"b\\c""#).tokenize();
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(&*tokens[0].text, r#""a\"b\\c""#);
    }

    #[test]
    fn unterminated_string_is_fatal() {
        let mut lexer = Lexer::new("\"abc");
        assert_eq!(lexer.next_token(), Err(LexerError::MissingStringQuote { start: 0 }));
    }

    #[test]
    fn single_quote_is_unsupported() {
        let mut lexer = Lexer::new("'abc'");
        assert_eq!(lexer.next_token(), Err(LexerError::UnsupportedSingleQuote { start: 0 }));
    }

    #[test]
    fn line_comment_is_skipped() {
        let kinds = kinds("// a comment\nmodule foo;");
        assert_eq!(kinds[0], TokenKind::Reserved(stl_token::ReservedWord::Module));
    }

    #[test]
    fn arrow_and_punctuation() {
        let kinds = kinds("-> : ; { } ( ) [ ] = , . &");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Arrow,
                TokenKind::Colon,
                TokenKind::Semicolon,
                TokenKind::LeftBrace,
                TokenKind::RightBrace,
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::LeftBracket,
                TokenKind::RightBracket,
                TokenKind::Equals,
                TokenKind::Comma,
                TokenKind::Dot,
                TokenKind::Ampersand,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn tracks_line_and_column() {
        let tokens = Lexer::new("module foo;\nconst int a = 1;").tokenize();
        let const_tok = &tokens[3];
        assert_eq!(const_tok.line, 2);
    }
}
