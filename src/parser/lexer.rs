//! Lexer for C++-style declaration strings.
//!
//! [`Lexer::tokenize`] converts a declaration into a flat token vector.
//! Declarations are short single strings, so the whole vector is produced
//! up front and the parser walks it by index.

use overmatch_core::{ParseError, Span};

use super::token::{Token, TokenKind, lookup_keyword};

/// A cursor over a declaration string that tracks position.
///
/// Provides peek/advance access over the characters while keeping byte
/// offset and line/column counters for spans. Declarations are ASCII in
/// practice, so the hot paths work on bytes.
struct Cursor<'src> {
    /// The full declaration text.
    source: &'src str,
    /// Remaining text (slice starting at the current position).
    rest: &'src str,
    /// Current byte offset from start of source.
    offset: u32,
    /// Current line number (1-indexed).
    line: u32,
    /// Current column number (1-indexed, byte-based).
    column: u32,
}

impl<'src> Cursor<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            source,
            rest: source,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    #[inline]
    fn is_eof(&self) -> bool {
        self.rest.is_empty()
    }

    /// Peek at the current character without consuming it.
    #[inline]
    fn peek(&self) -> Option<char> {
        let first = *self.rest.as_bytes().first()?;
        if first < 128 {
            Some(first as char)
        } else {
            self.rest.chars().next()
        }
    }

    /// Peek at the nth character ahead (0 = current).
    #[inline]
    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest.chars().nth(n)
    }

    /// Consume the current character, updating line/column tracking.
    #[inline]
    fn advance(&mut self) -> Option<char> {
        let ch = self.rest.chars().next()?;
        let len = ch.len_utf8() as u32;
        self.rest = &self.rest[len as usize..];
        self.offset += len;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += len;
        }
        Some(ch)
    }

    /// Consume if the current character matches.
    #[inline]
    fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume characters while the predicate matches.
    fn eat_while(&mut self, f: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&f) {
            self.advance();
        }
    }

    /// Slice of source from a starting offset to the current position.
    #[inline]
    fn slice_from(&self, start: u32) -> &'src str {
        &self.source[start as usize..self.offset as usize]
    }
}

/// Check if a character can start an identifier.
#[inline]
fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Check if a character can continue an identifier.
#[inline]
fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Lexer over one declaration string.
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
        }
    }

    /// Tokenize the whole declaration. The returned vector always ends
    /// with an [`TokenKind::Eof`] token.
    pub fn tokenize(mut self) -> Result<Vec<Token<'src>>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                return Ok(tokens);
            }
        }
    }

    fn next_token(&mut self) -> Result<Token<'src>, ParseError> {
        self.cursor.eat_while(|c| c.is_ascii_whitespace());

        if self.cursor.is_eof() {
            return Ok(Token::new(
                TokenKind::Eof,
                "",
                Span::point(self.cursor.line, self.cursor.column),
            ));
        }

        let start_line = self.cursor.line;
        let start_col = self.cursor.column;
        let start_offset = self.cursor.offset;
        let make = |lexer: &Self, kind| {
            let lexeme = lexer.cursor.slice_from(start_offset);
            Ok(Token::new(
                kind,
                lexeme,
                Span::new(start_line, start_col, lexeme.len() as u32),
            ))
        };

        match self.cursor.peek().unwrap_or('\0') {
            c if is_ident_start(c) => {
                self.cursor.eat_while(is_ident_continue);
                let lexeme = self.cursor.slice_from(start_offset);
                let kind = lookup_keyword(lexeme).unwrap_or(TokenKind::Identifier);
                make(self, kind)
            }

            c if c.is_ascii_digit() => {
                let kind = self.scan_number();
                make(self, kind)
            }

            '(' => {
                self.cursor.advance();
                make(self, TokenKind::LeftParen)
            }
            ')' => {
                self.cursor.advance();
                make(self, TokenKind::RightParen)
            }
            '<' => {
                self.cursor.advance();
                make(self, TokenKind::Less)
            }
            '>' => {
                self.cursor.advance();
                make(self, TokenKind::Greater)
            }
            ',' => {
                self.cursor.advance();
                make(self, TokenKind::Comma)
            }
            '=' => {
                self.cursor.advance();
                make(self, TokenKind::Equal)
            }
            '-' => {
                self.cursor.advance();
                make(self, TokenKind::Minus)
            }

            ':' => {
                self.cursor.advance();
                if self.cursor.eat(':') {
                    make(self, TokenKind::ColonColon)
                } else {
                    Err(ParseError::unexpected_token(
                        Span::new(start_line, start_col, 1),
                        "':'",
                    ))
                }
            }

            '.' => {
                // Either the ellipsis tail or a fraction like `.5`.
                if self.cursor.peek_nth(1) == Some('.') && self.cursor.peek_nth(2) == Some('.') {
                    self.cursor.advance();
                    self.cursor.advance();
                    self.cursor.advance();
                    make(self, TokenKind::Ellipsis)
                } else if self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
                    let kind = self.scan_number();
                    make(self, kind)
                } else {
                    Err(ParseError::unexpected_token(
                        Span::new(start_line, start_col, 1),
                        "'.'",
                    ))
                }
            }

            other => Err(ParseError::unexpected_token(
                Span::new(start_line, start_col, other.len_utf8() as u32),
                &format!("'{other}'"),
            )),
        }
    }

    /// Scan a number literal: integer, double, or `f`-suffixed float.
    fn scan_number(&mut self) -> TokenKind {
        self.cursor.eat_while(|c| c.is_ascii_digit());

        let mut is_floating = false;

        if self.cursor.peek() == Some('.')
            && self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit())
        {
            self.cursor.advance();
            self.cursor.eat_while(|c| c.is_ascii_digit());
            is_floating = true;
        }

        if matches!(self.cursor.peek(), Some('e' | 'E')) {
            self.cursor.advance();
            if matches!(self.cursor.peek(), Some('+' | '-')) {
                self.cursor.advance();
            }
            self.cursor.eat_while(|c| c.is_ascii_digit());
            is_floating = true;
        }

        if matches!(self.cursor.peek(), Some('f' | 'F')) {
            self.cursor.advance();
            return TokenKind::FloatLiteral;
        }

        if is_floating {
            TokenKind::DoubleLiteral
        } else {
            TokenKind::IntLiteral
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut kinds: Vec<_> = Lexer::new(source)
            .tokenize()
            .unwrap()
            .iter()
            .map(|t| t.kind)
            .collect();
        assert_eq!(kinds.pop(), Some(TokenKind::Eof));
        kinds
    }

    #[test]
    fn empty_declaration() {
        let tokens = Lexer::new("   ").tokenize().unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
    }

    #[test]
    fn plain_signature() {
        assert_eq!(
            kinds("int add(int num1, int num2)"),
            vec![
                TokenKind::Int,
                TokenKind::Identifier,
                TokenKind::LeftParen,
                TokenKind::Int,
                TokenKind::Identifier,
                TokenKind::Comma,
                TokenKind::Int,
                TokenKind::Identifier,
                TokenKind::RightParen,
            ]
        );
    }

    #[test]
    fn keywords_and_identifiers() {
        // "constant" is an identifier, not "const" + "ant".
        let tokens = Lexer::new("const constant unsigned T").tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Const);
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].lexeme, "constant");
        assert_eq!(tokens[2].kind, TokenKind::Unsigned);
        assert_eq!(tokens[3].kind, TokenKind::Identifier);
        assert_eq!(tokens[3].lexeme, "T");
    }

    #[test]
    fn ellipsis_tail() {
        assert_eq!(
            kinds("int add(int count, ...)"),
            vec![
                TokenKind::Int,
                TokenKind::Identifier,
                TokenKind::LeftParen,
                TokenKind::Int,
                TokenKind::Identifier,
                TokenKind::Comma,
                TokenKind::Ellipsis,
                TokenKind::RightParen,
            ]
        );
    }

    #[test]
    fn qualified_name() {
        let tokens = Lexer::new("OverloadClass::get_number").tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].kind, TokenKind::ColonColon);
        assert_eq!(tokens[2].kind, TokenKind::Identifier);
    }

    #[test]
    fn template_prefix() {
        assert_eq!(
            kinds("template <typename T>"),
            vec![
                TokenKind::Template,
                TokenKind::Less,
                TokenKind::Typename,
                TokenKind::Identifier,
                TokenKind::Greater,
            ]
        );
    }

    #[test]
    fn number_literals() {
        let tokens = Lexer::new("2 2.5 1.0f 1e10 .5 5.0").tokenize().unwrap();
        let got: Vec<_> = tokens.iter().map(|t| (t.kind, t.lexeme)).collect();
        assert_eq!(
            &got[..6],
            &[
                (TokenKind::IntLiteral, "2"),
                (TokenKind::DoubleLiteral, "2.5"),
                (TokenKind::FloatLiteral, "1.0f"),
                (TokenKind::DoubleLiteral, "1e10"),
                (TokenKind::DoubleLiteral, ".5"),
                (TokenKind::DoubleLiteral, "5.0"),
            ]
        );
    }

    #[test]
    fn negative_constant_tokens() {
        assert_eq!(
            kinds("= -5.0"),
            vec![TokenKind::Equal, TokenKind::Minus, TokenKind::DoubleLiteral]
        );
    }

    #[test]
    fn deleted_declaration() {
        assert_eq!(
            kinds("void foo(char) = delete"),
            vec![
                TokenKind::Void,
                TokenKind::Identifier,
                TokenKind::LeftParen,
                TokenKind::Char,
                TokenKind::RightParen,
                TokenKind::Equal,
                TokenKind::Delete,
            ]
        );
    }

    #[test]
    fn spans_point_into_the_declaration() {
        let tokens = Lexer::new("int add(int, int)").tokenize().unwrap();
        assert_eq!(tokens[0].span, Span::new(1, 1, 3));
        assert_eq!(tokens[1].span, Span::new(1, 5, 3));
        assert_eq!(tokens[1].lexeme, "add");
        assert_eq!(tokens[2].span, Span::new(1, 8, 1));
    }

    #[test]
    fn lone_colon_is_rejected() {
        let err = Lexer::new("int a : b").tokenize().unwrap_err();
        assert_eq!(err.span, Span::new(1, 7, 1));
    }

    #[test]
    fn stray_character_is_rejected() {
        let err = Lexer::new("int add(int&)").tokenize().unwrap_err();
        assert!(err.message.contains("'&'"));
    }
}
