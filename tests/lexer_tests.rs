// tests/lexer_tests.rs

use rela_lang::ast::Token;
use rela_lang::lexer::{Lexer, Position};
use rust_decimal::Decimal;

fn lex(input: &str) -> Vec<Token> {
    Lexer::new(input).tokenize().unwrap()
}

fn ident(name: &str) -> Token {
    Token::Identifier(name.to_string())
}

fn number(text: &str) -> Token {
    Token::Number(text.parse::<Decimal>().unwrap())
}

// ============================================================================
// Single Character Tokens
// ============================================================================

#[test]
fn test_single_char_tokens() {
    let test_cases = vec![
        ("&", Token::Ampersand),
        ("|", Token::Pipe),
        ("\\", Token::Backslash),
        ("*", Token::Star),
        ("(", Token::LParen),
        (")", Token::RParen),
        ("[", Token::LBracket),
        ("]", Token::RBracket),
        (",", Token::Comma),
        (".", Token::Dot),
        ("=", Token::Eq),
        ("<", Token::Lt),
        (">", Token::Gt),
    ];

    for (input, expected) in test_cases {
        let mut lexer = Lexer::new(input);
        let token = lexer.next_token().unwrap();
        assert_eq!(token, expected, "Failed for input: {}", input);
        assert_eq!(lexer.next_token().unwrap(), Token::Eof);
    }
}

// ============================================================================
// Two Character Tokens
// ============================================================================

#[test]
fn test_two_char_tokens() {
    let test_cases = vec![
        ("->", Token::Arrow),
        ("!=", Token::NotEq),
        ("<=", Token::LtEq),
        (">=", Token::GtEq),
    ];

    for (input, expected) in test_cases {
        let mut lexer = Lexer::new(input);
        let token = lexer.next_token().unwrap();
        assert_eq!(token, expected, "Failed for input: {}", input);
        assert_eq!(lexer.next_token().unwrap(), Token::Eof);
    }
}

#[test]
fn test_two_char_vs_single_char() {
    assert_eq!(lex("< ="), vec![Token::Lt, Token::Eq, Token::Eof]);
    assert_eq!(lex("<="), vec![Token::LtEq, Token::Eof]);
    assert_eq!(lex("> ="), vec![Token::Gt, Token::Eq, Token::Eof]);
}

// ============================================================================
// Literals and Identifiers
// ============================================================================

#[test]
fn test_numbers() {
    assert_eq!(lex("42"), vec![number("42"), Token::Eof]);
    assert_eq!(lex("3.25"), vec![number("3.25"), Token::Eof]);
    assert_eq!(lex("-7"), vec![number("-7"), Token::Eof]);
}

#[test]
fn test_number_keeps_written_scale() {
    let tokens = lex("1.50");
    assert_eq!(tokens[0].to_string(), "number 1.50");
}

#[test]
fn test_trailing_dot_is_not_part_of_number() {
    assert_eq!(lex("1."), vec![number("1"), Token::Dot, Token::Eof]);
}

#[test]
fn test_strings() {
    assert_eq!(
        lex("'John Smith'"),
        vec![Token::String("John Smith".to_string()), Token::Eof]
    );
    assert_eq!(lex("''"), vec![Token::String(String::new()), Token::Eof]);
}

#[test]
fn test_string_keeps_backslash() {
    assert_eq!(
        lex(r"'a\b'"),
        vec![Token::String(r"a\b".to_string()), Token::Eof]
    );
}

#[test]
fn test_identifiers() {
    assert_eq!(
        lex("Users year_of_birth _1 x2"),
        vec![
            ident("Users"),
            ident("year_of_birth"),
            ident("_1"),
            ident("x2"),
            Token::Eof
        ]
    );
}

#[test]
fn test_qualified_attribute() {
    assert_eq!(
        lex("Users.id"),
        vec![ident("Users"), Token::Dot, ident("id"), Token::Eof]
    );
}

// ============================================================================
// Whole Lines
// ============================================================================

#[test]
fn test_whitespace_is_insignificant() {
    assert_eq!(lex("Users&Admins->Res"), lex("  Users  &  Admins  ->  Res  "));
}

#[test]
fn test_full_line() {
    assert_eq!(
        lex("(Users \\ Admins)[id >= 2] -> Res"),
        vec![
            Token::LParen,
            ident("Users"),
            Token::Backslash,
            ident("Admins"),
            Token::RParen,
            Token::LBracket,
            ident("id"),
            Token::GtEq,
            number("2"),
            Token::RBracket,
            Token::Arrow,
            ident("Res"),
            Token::Eof,
        ]
    );
}

#[test]
fn test_negative_number_in_condition() {
    assert_eq!(
        lex("T[x>-1]"),
        vec![
            ident("T"),
            Token::LBracket,
            ident("x"),
            Token::Gt,
            number("-1"),
            Token::RBracket,
            Token::Eof
        ]
    );
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_unterminated_string() {
    let err = Lexer::new("Users[name='John]").tokenize().unwrap_err();
    assert!(err.message.contains("Unterminated string"));
    assert_eq!(err.position, Position(11));
}

#[test]
fn test_lone_bang() {
    let err = Lexer::new("a ! b").tokenize().unwrap_err();
    assert_eq!(err.position, Position(2));
}

#[test]
fn test_lone_minus() {
    assert!(Lexer::new("a - b").tokenize().is_err());
}

#[test]
fn test_unexpected_character() {
    let err = Lexer::new("Users + Admins").tokenize().unwrap_err();
    assert_eq!(err.to_string(), "Unexpected character '+' at position 6");
}

#[test]
fn test_double_quotes_are_not_strings() {
    assert!(Lexer::new("Users[name=\"John\"]").tokenize().is_err());
}

#[test]
fn test_identifiers_are_ascii() {
    let err = Lexer::new("x² -> R").tokenize().unwrap_err();
    assert_eq!(err.to_string(), "Unexpected character '²' at position 1");
    assert!(Lexer::new("Über -> R").tokenize().is_err());
}

#[test]
fn test_spans_cover_source_text() {
    let mut lexer = Lexer::new("Users[ id >= 2 ]");
    let spanned = lexer.tokenize_spanned().unwrap();
    let texts: Vec<String> = spanned.iter().map(|(_, span)| lexer.text(*span)).collect();
    assert_eq!(texts, vec!["Users", "[", "id", ">=", "2", "]", ""]);
}
