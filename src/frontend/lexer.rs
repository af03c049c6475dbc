//! Lexer for classc
//!
//! Converts source code into a stream of tokens. Illegal characters are
//! recorded as errors and skipped; scanning always runs to the end of input.

use log::{debug, warn};

use crate::frontend::token::{Token, TokenKind};
use crate::utils::{Error, Span};

/// The lexer state
pub struct Lexer {
    /// Source code as characters
    source: Vec<char>,
    /// Current position in source
    pos: usize,
    /// Start position of current token
    start: usize,
    /// Current 1-based line
    line: usize,
    /// Offset of the first character of the current line
    line_start: usize,
    /// Lexical errors collected so far
    errors: Vec<Error>,
}

impl Lexer {
    /// Create a new lexer for the given source code
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            start: 0,
            line: 1,
            line_start: 0,
            errors: Vec::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        self.pos += 1;
        c
    }

    /// Create a span from start to current position
    fn make_span(&self) -> Span {
        Span::new(self.start, self.pos, self.line, self.start - self.line_start + 1)
    }

    fn text(&self) -> String {
        self.source[self.start..self.pos].iter().collect()
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.text(), self.make_span())
    }

    /// Skip spaces, tabs, line breaks and `#` line comments
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' => {
                    self.advance();
                }
                // Only as part of a `\r\n` line break; a lone `\r` is illegal
                '\r' if self.source.get(self.pos + 1) == Some(&'\n') => {
                    self.advance();
                }
                '\n' => {
                    self.advance();
                    self.line += 1;
                    self.line_start = self.pos;
                }
                '#' => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn skip_digits(&mut self) {
        while self.peek().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    /// Read an identifier or keyword
    fn read_identifier(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }

        let text = self.text();
        let kind = TokenKind::keyword_from_str(&text).unwrap_or(TokenKind::Ident(text));

        self.make_token(kind)
    }

    /// Read a number literal.
    ///
    /// `digits '.' digits?` and `digits? '.' digits` are floats; a bare digit
    /// run is an integer. An integer wider than 64 bits is reported and
    /// kept as `u64::MAX`.
    fn read_number(&mut self) -> Token {
        self.skip_digits();

        if self.peek() == Some('.') {
            self.advance();
            self.skip_digits();

            let mut text = self.text();
            if text.starts_with('.') {
                text.insert(0, '0');
            }
            if text.ends_with('.') {
                text.push('0');
            }
            let value = text.parse().unwrap_or(0.0);
            return self.make_token(TokenKind::FloatLit(value));
        }

        let text = self.text();
        let value = match text.parse() {
            Ok(value) => value,
            Err(_) => {
                // Keep the token so the parse is unaffected; the value saturates
                warn!("integer literal {} does not fit in 64 bits", text);
                self.errors.push(Error::IntegerOutOfRange {
                    text,
                    span: self.make_span(),
                });
                u64::MAX
            }
        };
        self.make_token(TokenKind::IntLit(value))
    }

    /// Get the next token, which may be `Unknown` for an illegal character
    fn scan_token(&mut self) -> Token {
        self.skip_whitespace();
        self.start = self.pos;

        let c = match self.advance() {
            Some(c) => c,
            None => return Token::eof(self.make_span()),
        };

        // Identifiers and keywords
        if c.is_ascii_alphabetic() || c == '_' {
            self.pos -= 1;
            return self.read_identifier();
        }

        // Numbers, including floats written with a leading '.'
        if c.is_ascii_digit() || (c == '.' && self.peek().map_or(false, |n| n.is_ascii_digit())) {
            self.pos -= 1;
            return self.read_number();
        }

        // Operators and punctuation
        let kind = match c {
            '+' => TokenKind::Plus,
            '-' => {
                if self.peek() == Some('>') {
                    self.advance();
                    TokenKind::Arrow
                } else {
                    TokenKind::Minus
                }
            }
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '=' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::EqEq
                } else {
                    TokenKind::Assign
                }
            }
            '!' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::Ne
                } else {
                    TokenKind::Unknown('!')
                }
            }
            '<' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::Le
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            ':' => {
                if self.peek() == Some(':') {
                    self.advance();
                    TokenKind::Sr
                } else if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::Assign
                } else {
                    TokenKind::Colon
                }
            }
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '.' => TokenKind::Dot,
            _ => TokenKind::Unknown(c),
        };

        self.make_token(kind)
    }

    /// Tokenize the entire source.
    ///
    /// The returned tokens always end with a single `Eof`. Illegal characters
    /// are not part of the stream; they are available from [`Lexer::errors`].
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.scan_token();
            match token.kind {
                TokenKind::Unknown(ch) => {
                    warn!(
                        "skipping illegal character {:?} at line {}, position {}",
                        ch, token.span.line, token.span.start
                    );
                    self.errors.push(Error::IllegalCharacter { ch, span: token.span });
                }
                TokenKind::Eof => {
                    tokens.push(token);
                    break;
                }
                _ => tokens.push(token),
            }
        }
        debug!(
            "lexed {} tokens with {} lexical errors",
            tokens.len() - 1,
            self.errors.len()
        );
        tokens
    }

    /// Lexical errors found so far, in source order
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<Error> {
        self.errors
    }
}

/// Tokenize `source`, returning the tokens and any lexical errors
pub fn tokenize(source: &str) -> (Vec<Token>, Vec<Error>) {
    let mut lexer = Lexer::new(source);
    let tokens = lexer.tokenize();
    (tokens, lexer.into_errors())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(source);
        lexer.tokenize().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_simple_tokens() {
        let mut lexer = Lexer::new("function main() -> void [ ]");
        let tokens = lexer.tokenize();

        assert!(matches!(tokens[0].kind, TokenKind::Function));
        assert!(matches!(tokens[1].kind, TokenKind::Ident(ref s) if s == "main"));
        assert!(matches!(tokens[2].kind, TokenKind::LParen));
        assert!(matches!(tokens[3].kind, TokenKind::RParen));
        assert!(matches!(tokens[4].kind, TokenKind::Arrow));
        assert!(matches!(tokens[5].kind, TokenKind::Void));
        assert!(matches!(tokens[6].kind, TokenKind::LBracket));
        assert!(matches!(tokens[7].kind, TokenKind::RBracket));
        assert!(matches!(tokens[8].kind, TokenKind::Eof));
        assert!(lexer.errors().is_empty());
    }

    #[test]
    fn test_numbers() {
        let tokens = kinds("42 3.14 7. .5 0");

        assert_eq!(tokens[0], TokenKind::IntLit(42));
        assert!(matches!(tokens[1], TokenKind::FloatLit(f) if (f - 3.14).abs() < 1e-9));
        assert!(matches!(tokens[2], TokenKind::FloatLit(f) if f == 7.0));
        assert!(matches!(tokens[3], TokenKind::FloatLit(f) if f == 0.5));
        assert_eq!(tokens[4], TokenKind::IntLit(0));
    }

    #[test]
    fn test_float_is_never_split() {
        for source in ["1.0", "3.14", "0.001", "123.456", "10.01"] {
            let tokens = kinds(source);
            assert_eq!(tokens.len(), 2, "{}", source);
            assert!(matches!(tokens[0], TokenKind::FloatLit(_)), "{}", source);
        }
    }

    #[test]
    fn test_keywords() {
        let tokens = kinds("class while read localVar then isa type");

        assert_eq!(tokens[0], TokenKind::Class);
        assert_eq!(tokens[1], TokenKind::While);
        assert_eq!(tokens[2], TokenKind::Read);
        assert_eq!(tokens[3], TokenKind::LocalVar);
        assert_eq!(tokens[4], TokenKind::Then);
        assert_eq!(tokens[5], TokenKind::Isa);
        assert_eq!(tokens[6], TokenKind::Type);
    }

    #[test]
    fn test_keyword_prefix_is_identifier() {
        let tokens = kinds("classes _if whileX id");
        assert_eq!(tokens[0], TokenKind::Ident("classes".to_string()));
        assert_eq!(tokens[1], TokenKind::Ident("_if".to_string()));
        assert_eq!(tokens[2], TokenKind::Ident("whileX".to_string()));
        assert_eq!(tokens[3], TokenKind::Ident("id".to_string()));
    }

    #[test]
    fn test_operators() {
        let tokens = kinds("== != < > <= >= + - * / = , ; : ( ) [ ] { } . -> :: :=");
        assert_eq!(
            tokens,
            vec![
                TokenKind::EqEq,
                TokenKind::Ne,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::Le,
                TokenKind::Ge,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Assign,
                TokenKind::Comma,
                TokenKind::Semicolon,
                TokenKind::Colon,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Dot,
                TokenKind::Arrow,
                TokenKind::Sr,
                TokenKind::Assign,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keyword_spellings_of_symbols() {
        assert_eq!(kinds("sr arrow"), vec![TokenKind::Sr, TokenKind::Arrow, TokenKind::Eof]);
    }

    #[test]
    fn test_illegal_characters_are_skipped() {
        let mut lexer = Lexer::new("x @ y $! 1");
        let tokens = lexer.tokenize();

        let kinds: Vec<_> = tokens.iter().map(|t| t.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Ident("x".to_string()),
                TokenKind::Ident("y".to_string()),
                TokenKind::IntLit(1),
                TokenKind::Eof,
            ]
        );
        let errors = lexer.errors();
        assert_eq!(errors.len(), 3);
        assert!(matches!(errors[0], Error::IllegalCharacter { ch: '@', span } if span.start == 2));
        assert!(matches!(errors[1], Error::IllegalCharacter { ch: '$', .. }));
        assert!(matches!(errors[2], Error::IllegalCharacter { ch: '!', .. }));
    }

    #[test]
    fn test_line_and_position_tracking() {
        let mut lexer = Lexer::new("a\n\n  b # note\nc");
        let tokens = lexer.tokenize();

        assert_eq!((tokens[0].span.line, tokens[0].span.start), (1, 0));
        assert_eq!((tokens[1].span.line, tokens[1].span.start, tokens[1].span.column), (3, 5, 3));
        assert_eq!((tokens[2].span.line, tokens[2].span.start), (4, 14));
    }

    #[test]
    fn test_comment_runs_to_end_of_line() {
        assert_eq!(
            kinds("# class while\nx"),
            vec![TokenKind::Ident("x".to_string()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_crlf_counts_one_line() {
        let mut lexer = Lexer::new("a\r\nb");
        let tokens = lexer.tokenize();
        assert_eq!(tokens[1].span.line, 2);
        assert!(lexer.errors().is_empty());
    }

    #[test]
    fn test_lone_carriage_return_is_illegal() {
        let mut lexer = Lexer::new("class A {\r attribute");
        let tokens = lexer.tokenize();
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[3].span.line, 1);
        assert!(matches!(lexer.errors(), [Error::IllegalCharacter { ch: '\r', span }] if span.start == 9));
    }

    #[test]
    fn test_full_i64_range_magnitude_lexes() {
        let (tokens, errors) = tokenize("9223372036854775808");
        assert_eq!(tokens[0].kind, TokenKind::IntLit(9_223_372_036_854_775_808));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_integer_overflow_keeps_the_token() {
        let (tokens, errors) = tokenize("99999999999999999999 1");
        assert_eq!(tokens[0].kind, TokenKind::IntLit(u64::MAX));
        assert_eq!(tokens[0].lexeme, "99999999999999999999");
        assert_eq!(tokens[1].kind, TokenKind::IntLit(1));
        assert!(matches!(&errors[..], [Error::IntegerOutOfRange { .. }]));
    }

    #[test]
    fn test_retokenizing_lexemes_is_stable() {
        let source = "function A::f(x: integer{}, y: float) -> integer [\n\
                      localVar z: float{3};\n\
                      z{1} = .5 * (x + 2.) - not y; # trailing\n\
                      if (x <= y) then write(x); else { read(z{0}); };\n\
                      ]";
        let (first, errors) = tokenize(source);
        assert!(errors.is_empty());

        let rebuilt: Vec<&str> = first.iter().map(|t| t.lexeme.as_str()).collect();
        let (second, _) = tokenize(&rebuilt.join(" "));

        let a: Vec<_> = first.iter().map(|t| &t.kind).collect();
        let b: Vec<_> = second.iter().map(|t| &t.kind).collect();
        assert_eq!(a, b);
    }
}
