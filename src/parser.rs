use std::{fmt, mem};

use crate::{
    ast::{AttrRef, Comparator, Condition, Expr, Literal, Operand, SetOp, Statement, Token},
    lexer::{LexError, Lexer, Span},
};

/// Errors produced while turning a line into a [`Statement`].
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The line could not be tokenized
    Lex(LexError),

    /// A token did not fit the grammar at this point
    UnexpectedToken { expected: String, found: Token },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Lex(e) => write!(f, "{}", e),
            ParseError::UnexpectedToken { expected, found } => {
                write!(f, "Expected {}, got {}", expected, found)
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Lex(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError::Lex(e)
    }
}

/// Parse one `<expression> -> <identifier>` line.
pub fn parse_line(line: &str) -> Result<Statement, ParseError> {
    Parser::new(Lexer::new(line))?.parse_statement()
}

pub struct Parser {
    lexer: Lexer,
    tokens: Vec<Token>,
    spans: Vec<Span>,
    position: usize,
}

impl Parser {
    /// Tokenizes the whole line up front; bracket bodies need lookahead.
    pub fn new(mut lexer: Lexer) -> Result<Self, ParseError> {
        let (tokens, spans) = lexer.tokenize_spanned()?.into_iter().unzip();
        Ok(Parser {
            lexer,
            tokens,
            spans,
            position: 0,
        })
    }

    /// Source text from the start of token `from` to the end of the last
    /// consumed token.
    fn text_since(&self, from: usize) -> String {
        match (self.spans.get(from), self.position.checked_sub(1)) {
            (Some(first), Some(last)) if last >= from => self.lexer.text(Span {
                start: first.start,
                end: self.spans[last].end,
            }),
            _ => String::new(),
        }
    }

    fn current_token(&self) -> &Token {
        // tokenize() always terminates the stream with Eof
        self.tokens.get(self.position).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn take(&mut self) -> Token {
        let token = match self.tokens.get_mut(self.position) {
            Some(token) => mem::replace(token, Token::Eof),
            None => Token::Eof,
        };
        self.advance();
        token
    }

    fn unexpected(&self, expected: impl Into<String>) -> ParseError {
        ParseError::UnexpectedToken {
            expected: expected.into(),
            found: self.current_token().clone(),
        }
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(self.current_token()) == mem::discriminant(token)
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if !self.check(&expected) {
            return Err(self.unexpected(expected.to_string()));
        }
        self.advance();
        Ok(())
    }

    fn expect_identifier(&mut self, what: &str) -> Result<String, ParseError> {
        match self.current_token() {
            Token::Identifier(_) => match self.take() {
                Token::Identifier(name) => Ok(name),
                _ => unreachable!(),
            },
            _ => Err(self.unexpected(what)),
        }
    }

    /// Parse primary expressions: a relation name or a parenthesized expression
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.current_token() {
            Token::Identifier(_) => {
                let name = self.expect_identifier("relation name")?;
                Ok(Expr::Identifier(name))
            }
            Token::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }
            _ => Err(self.unexpected("relation name or '('")),
        }
    }

    /// Parse `primary ('[' bracket_body ']')*`
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        while self.check(&Token::LBracket) {
            self.advance(); // Consume '['
            let body = self.position;

            expr = if self.bracket_holds_condition() {
                let condition = self.parse_condition()?;
                Expr::Selection {
                    base: Box::new(expr),
                    condition,
                    text: self.text_since(body),
                }
            } else {
                let attributes = self.parse_attribute_list()?;
                Expr::Projection {
                    base: Box::new(expr),
                    attributes,
                    text: self.text_since(body),
                }
            };

            self.expect(Token::RBracket)?;
        }
        Ok(expr)
    }

    /// A bracket body is a selection iff a comparator appears before its `]`.
    fn bracket_holds_condition(&self) -> bool {
        self.tokens[self.position..]
            .iter()
            .take_while(|t| !matches!(t, Token::RBracket | Token::Eof))
            .any(Token::is_comparator)
    }

    /// Parse `identifier ('.' identifier)*`; everything before the last dot
    /// is the qualifier.
    fn parse_attr_ref(&mut self) -> Result<AttrRef, ParseError> {
        let mut parts = vec![self.expect_identifier("attribute name")?];

        while self.check(&Token::Dot) {
            self.advance();
            parts.push(self.expect_identifier("attribute name after '.'")?);
        }

        let name = parts.pop().unwrap_or_default();
        if parts.is_empty() {
            Ok(AttrRef::new(name))
        } else {
            Ok(AttrRef::qualified(parts.join("."), name))
        }
    }

    fn parse_attribute_list(&mut self) -> Result<Vec<AttrRef>, ParseError> {
        let mut attributes = vec![self.parse_attr_ref()?];

        while self.check(&Token::Comma) {
            self.advance();
            attributes.push(self.parse_attr_ref()?);
        }
        Ok(attributes)
    }

    fn parse_condition(&mut self) -> Result<Condition, ParseError> {
        let attribute = self.parse_attr_ref()?;

        let comparator = match self.current_token() {
            Token::Eq => Comparator::Equal,
            Token::NotEq => Comparator::NotEqual,
            Token::Lt => Comparator::LessThan,
            Token::LtEq => Comparator::LessEqual,
            Token::Gt => Comparator::GreaterThan,
            Token::GtEq => Comparator::GreaterEqual,
            _ => return Err(self.unexpected("comparator")),
        };
        self.advance();

        let operand = match self.current_token() {
            Token::Identifier(_) => Operand::Attribute(self.parse_attr_ref()?),
            Token::Number(_) | Token::String(_) => match self.take() {
                Token::Number(n) => Operand::Literal(Literal::Number(n)),
                Token::String(s) => Operand::Literal(Literal::String(s)),
                _ => unreachable!(),
            },
            _ => return Err(self.unexpected("attribute, number or string")),
        };

        Ok(Condition {
            attribute,
            comparator,
            operand,
        })
    }

    /// Parse `postfix ('*' postfix)*`
    fn parse_product(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_postfix()?;

        while self.check(&Token::Star) {
            self.advance();
            let right = self.parse_postfix()?;

            left = Expr::Product {
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    /// Parse `term (('&' | '|' | '\') term)*`
    fn parse_set_operation(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_product()?;

        loop {
            let op = match self.current_token() {
                Token::Ampersand => SetOp::Intersect,
                Token::Pipe => SetOp::Union,
                Token::Backslash => SetOp::Difference,
                _ => break,
            };

            self.advance();
            let right = self.parse_product()?;

            left = Expr::SetOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_set_operation()
    }

    /// Parse a bare expression spanning the whole input.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expression()?;
        self.expect(Token::Eof)?;
        Ok(expr)
    }

    /// Parse a complete `<expression> -> <identifier>` line.
    pub fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let expr = self.parse_expression()?;

        if !self.check(&Token::Arrow) {
            return Err(self.unexpected("'->' followed by a result name"));
        }
        self.advance();

        let target = self.expect_identifier("result name after '->'")?;
        self.expect(Token::Eof)?;

        Ok(Statement { expr, target })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brackets_without_comparator_project() {
        let stmt = parse_line("Users[id, name] -> Res").unwrap();
        assert!(matches!(stmt.expr, Expr::Projection { ref attributes, .. } if attributes.len() == 2));
    }

    #[test]
    fn test_missing_arrow() {
        let err = parse_line("Users & Admins").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnexpectedToken {
                expected: "'->' followed by a result name".to_string(),
                found: Token::Eof,
            }
        );
    }

    #[test]
    fn test_bracket_text_is_kept_as_written() {
        match parse_line("Users[ age  >= 18 ][id,name] -> Res").unwrap().expr {
            Expr::Projection { base, text, .. } => {
                assert_eq!(text, "id,name");
                assert!(matches!(*base, Expr::Selection { ref text, .. } if text == "age  >= 18"));
            }
            other => panic!("Expected projection, got {:?}", other),
        }
    }

    #[test]
    fn test_stacked_qualifier() {
        match parse_line("Z[Q.Users.id] -> Res").unwrap().expr {
            Expr::Projection { attributes, .. } => {
                assert_eq!(attributes, vec![AttrRef::qualified("Q.Users", "id")]);
                assert_eq!(attributes[0].attribute_name(), "Q.Users.id");
            }
            other => panic!("Expected projection, got {:?}", other),
        }
    }

    #[test]
    fn test_lex_errors_surface() {
        assert!(matches!(parse_line("Users ! Admins -> Res"), Err(ParseError::Lex(_))));
    }
}
