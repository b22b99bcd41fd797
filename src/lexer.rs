use std::{fmt, str::FromStr};

use rust_decimal::Decimal;

use crate::ast::Token;

/// Zero-based character offset into the line being lexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position(pub usize);

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "position {}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub message: String,
    pub position: Position,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.position)
    }
}

impl std::error::Error for LexError {}

/// Character range `start..end` covered by a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn error(&self, message: impl Into<String>, position: usize) -> LexError {
        LexError {
            message: message.into(),
            position: Position(position),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self) -> Result<String, LexError> {
        let start = self.position;
        let mut result = String::new();
        self.advance(); // Consume opening quote

        while let Some(ch) = self.current_char() {
            self.advance();
            if ch == '\'' {
                return Ok(result);
            }
            result.push(ch);
        }

        Err(self.error("Unterminated string: missing closing quote", start))
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        let mut number = String::new();
        let mut is_fraction = false;

        if self.current_char() == Some('-') {
            number.push('-');
            self.advance();
        }

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.'
                && !is_fraction
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                is_fraction = true;
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Decimal::from_str(&number)
            .map(Token::Number)
            .map_err(|e| self.error(format!("Invalid number '{}': {}", number, e), start))
    }

    fn single(&mut self, token: Token) -> Token {
        self.advance();
        token
    }

    /// Pick the two-character token when the next char is `second`.
    fn pair(&mut self, second: char, long: Token, short: Token) -> Token {
        if self.peek_char(1) == Some(second) {
            self.advance();
            self.advance();
            long
        } else {
            self.advance();
            short
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.next_spanned().map(|(token, _)| token)
    }

    /// Like [`Lexer::next_token`], also reporting where the token sits.
    pub fn next_spanned(&mut self) -> Result<(Token, Span), LexError> {
        self.skip_whitespace();
        let start = self.position;

        let token = match self.current_char() {
            None => Token::Eof,
            Some('&') => self.single(Token::Ampersand),
            Some('|') => self.single(Token::Pipe),
            Some('\\') => self.single(Token::Backslash),
            Some('*') => self.single(Token::Star),
            Some('(') => self.single(Token::LParen),
            Some(')') => self.single(Token::RParen),
            Some('[') => self.single(Token::LBracket),
            Some(']') => self.single(Token::RBracket),
            Some(',') => self.single(Token::Comma),
            Some('.') => self.single(Token::Dot),
            Some('=') => self.single(Token::Eq),
            Some('<') => self.pair('=', Token::LtEq, Token::Lt),
            Some('>') => self.pair('=', Token::GtEq, Token::Gt),
            Some('!') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Token::NotEq
                } else {
                    return Err(self.error("Unexpected '!' (did you mean '!='?)", self.position));
                }
            }
            Some('-') => match self.peek_char(1) {
                Some('>') => {
                    self.advance();
                    self.advance();
                    Token::Arrow
                }
                Some(c) if c.is_ascii_digit() => self.read_number()?,
                _ => {
                    return Err(self.error("Unexpected '-' (did you mean '->'?)", self.position));
                }
            },
            Some('\'') => Token::String(self.read_string()?),
            Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => Token::Identifier(self.read_identifier()),
            Some(ch) if ch.is_ascii_digit() => self.read_number()?,
            Some(ch) => {
                return Err(self.error(format!("Unexpected character '{}'", ch), self.position));
            }
        };

        Ok((
            token,
            Span {
                start,
                end: self.position,
            },
        ))
    }

    /// Lex the whole input. The returned sequence always ends with [`Token::Eof`].
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        Ok(self
            .tokenize_spanned()?
            .into_iter()
            .map(|(token, _)| token)
            .collect())
    }

    pub fn tokenize_spanned(&mut self) -> Result<Vec<(Token, Span)>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let (token, span) = self.next_spanned()?;
            let done = token == Token::Eof;
            tokens.push((token, span));
            if done {
                return Ok(tokens);
            }
        }
    }

    /// Source text covered by `span`.
    pub fn text(&self, span: Span) -> String {
        self.input[span.start..span.end].iter().collect()
    }
}

#[test]
fn test_binding_line() {
    let mut lexer = Lexer::new("Users & Admins -> Res");
    assert_eq!(lexer.next_token().unwrap(), Token::Identifier("Users".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::Ampersand);
    assert_eq!(lexer.next_token().unwrap(), Token::Identifier("Admins".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::Arrow);
    assert_eq!(lexer.next_token().unwrap(), Token::Identifier("Res".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::Eof);
}

#[test]
fn test_selection_body() {
    let mut lexer = Lexer::new("Users[name!='John']");
    assert_eq!(lexer.next_token().unwrap(), Token::Identifier("Users".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::LBracket);
    assert_eq!(lexer.next_token().unwrap(), Token::Identifier("name".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::NotEq);
    assert_eq!(lexer.next_token().unwrap(), Token::String("John".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::RBracket);
}
