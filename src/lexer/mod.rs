mod errors;
mod matchers;

pub use errors::*;
use matchers::*;

use std::fmt::Debug;

use miette::SourceSpan;

use crate::dbg_line;

const EMPTY_STR: &str = "";

#[derive(Debug, PartialEq, Clone)]
pub enum Token<'a> {
    Identifier(&'a str),

    Integer(i64),
    Float(f64),
    Bool(bool),
    String(&'a str),
    Nil,

    Underscore, // _

    // Binding keywords
    Let, // immutable
    Var, // mutable

    // Type casting
    Is,
    As,

    // Brackets
    LeftParen,  // (
    RightParen, // )

    // Separators
    Comma, // , Element separator
    Colon, // : Type annotation
    Dot,   // . Enum case access

    QuestionMark, // ?
    Minus,        // -

    // Ranges
    ClosedRange,   // 1...5
    HalfOpenRange, // 1..<5
}

impl<'a> Token<'a> {
    pub fn eq_type(&self, other: &Token) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

#[derive(PartialEq, Clone)]
pub struct TokenSpan<'a> {
    pub token: Token<'a>,
    pub from: usize,
    pub to: usize,
}

impl From<&TokenSpan<'_>> for SourceSpan {
    fn from(span: &TokenSpan) -> Self {
        (span.from..span.to).into()
    }
}

impl<'a> TokenSpan<'a> {
    pub fn new(from: usize, to: usize, token: Token<'a>) -> Self {
        TokenSpan {
            from,
            // adding one because miette takes range instead of inclusive range
            to: to + 1,
            token,
        }
    }
}

impl Debug for TokenSpan<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.token.fmt(f)
    }
}

pub struct Lexer<'a> {
    cursor: usize,
    code: &'a str,
    input: &'a [u8],
}

impl<'a> Lexer<'a> {
    pub fn new(code: &'a str) -> Self {
        Lexer {
            cursor: 0,
            code,
            input: code.as_bytes(),
        }
    }

    pub fn current(&self) -> u8 {
        self.peek_next_n(0)
    }

    pub fn peek_next(&self) -> u8 {
        self.peek_next_n(1)
    }

    pub fn peek_next_n(&self, n: usize) -> u8 {
        if self.cursor + n >= self.input.len() {
            0
        } else {
            self.input[self.cursor + n]
        }
    }

    pub fn skip_whitespace(&mut self) {
        while self.current().is_ascii_whitespace() {
            self.cursor += 1;
        }
    }

    /// Reads everything that matches, leaving cursor at the last matched byte.
    pub fn read_str_that_matches(&mut self, match_fn: Matcher) -> &'a str {
        let from = self.cursor;

        while match_fn(self.current(), &self.input[from..self.cursor]) {
            self.cursor += 1;
        }

        if from == self.cursor {
            EMPTY_STR
        } else {
            let str = &self.code[from..self.cursor];
            self.cursor -= 1;
            str
        }
    }

    pub fn skip_matches(&mut self, match_fn: Matcher) {
        let from = self.cursor;
        while match_fn(self.current(), &self.input[from..self.cursor]) {
            self.cursor += 1;
        }
    }

    fn unexpected_character(&self, at: usize, expected: &str) -> LexerError {
        let actual = self.code[at..].chars().next().unwrap_or('\0');
        LexerError::UnexpectedCharacter(UnexpectedCharacter {
            dbg_line: dbg_line!(),
            expected: expected.to_string(),
            actual,
            src: self.code.to_string(),
            position: (at, actual.len_utf8()).into(),
        })
    }

    fn lex_number(&mut self) -> Result<Token<'a>, LexerError> {
        let start = self.cursor;
        self.skip_matches(NUMBER_MATCHER);

        // `1...5` is a range, not a float
        let is_float = self.current() == b'.' && self.peek_next().is_ascii_digit();
        if is_float {
            self.cursor += 1;
            self.skip_matches(NUMBER_MATCHER);
        }

        let literal = &self.code[start..self.cursor];
        self.cursor -= 1;

        let invalid_number = || {
            LexerError::InvalidNumber(InvalidNumber {
                dbg_line: dbg_line!(),
                literal: literal.to_string(),
                src: self.code.to_string(),
                position: (start..start + literal.len()).into(),
            })
        };

        if is_float {
            literal
                .parse::<f64>()
                .map(Token::Float)
                .map_err(|_| invalid_number())
        } else {
            literal
                .parse::<i64>()
                .map(Token::Integer)
                .map_err(|_| invalid_number())
        }
    }

    fn lex_string(&mut self) -> Result<Token<'a>, LexerError> {
        let start = self.cursor + 1;
        let mut end = start;
        while !matches!(self.input.get(end), Some(b'"') | None) {
            end += 1;
        }

        if end >= self.input.len() {
            return Err(LexerError::UnterminatedString(UnterminatedString {
                dbg_line: dbg_line!(),
                src: self.code.to_string(),
                position: (self.cursor..end).into(),
            }));
        }

        // closing quote
        self.cursor = end;
        Ok(Token::String(&self.code[start..end]))
    }

    pub fn lex(mut self) -> Result<Vec<TokenSpan<'a>>, LexerError> {
        let mut tokens: Vec<TokenSpan<'a>> = Vec::new();

        loop {
            self.skip_whitespace();
            if self.cursor >= self.input.len() {
                break;
            }
            let span_from = self.cursor;

            let token = match self.current() {
                b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                    let str = self.read_str_that_matches(IDENTIFIER_MATCHER);

                    match str {
                        "_" => Token::Underscore,

                        "let" => Token::Let,
                        "var" => Token::Var,

                        "is" => Token::Is,
                        "as" => Token::As,

                        "true" => Token::Bool(true),
                        "false" => Token::Bool(false),
                        "nil" => Token::Nil,

                        _ => Token::Identifier(str),
                    }
                }

                b'0'..=b'9' => self.lex_number()?,
                b'"' => self.lex_string()?,

                b'(' => Token::LeftParen,
                b')' => Token::RightParen,
                b',' => Token::Comma,
                b':' => Token::Colon,
                b'?' => Token::QuestionMark,
                b'-' => Token::Minus,

                b'.' => match (self.peek_next(), self.peek_next_n(2)) {
                    (b'.', b'.') => {
                        self.cursor += 2;
                        Token::ClosedRange
                    }
                    (b'.', b'<') => {
                        self.cursor += 2;
                        Token::HalfOpenRange
                    }
                    (b'.', _) => {
                        return Err(self.unexpected_character(self.cursor + 2, "'.' or '<'"))
                    }
                    _ => Token::Dot,
                },

                _ => return Err(self.unexpected_character(self.cursor, "pattern token")),
            };

            tokens.push(TokenSpan::new(span_from, self.cursor, token));

            self.cursor += 1;
        }

        tracing::trace!(count = tokens.len(), "lexed pattern source");
        Ok(tokens)
    }
}
