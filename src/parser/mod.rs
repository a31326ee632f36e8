mod errors;
mod expressions;
mod patterns;

pub use self::{
    errors::{IllegalPatternKind, ParseError, UnexpectedEndOfFile, UnexpectedToken},
    expressions::Expression,
    patterns::{
        EnumCasePattern, Pattern, PatternContext, OPTIONAL_NONE_CASE, OPTIONAL_SOME_CASE,
        OPTIONAL_TYPE_NAME,
    },
};

use miette::SourceSpan;
use rustc_hash::FxHashMap;

use crate::{
    dbg_line,
    lexer::{Lexer, Token, TokenSpan},
    shared::{errors::DuplicateBindingError, types::TypeRef},
};

pub type ParseResult<T> = Result<T, ParseError>;

/// Lexes and parses a whole pattern in one go.
pub fn parse_pattern_str(code: &str, context: PatternContext) -> ParseResult<Pattern> {
    let tokens = Lexer::new(code).lex()?;
    Parser::new(code, tokens).parse(context)
}

pub struct Parser<'a> {
    cursor: usize,
    code: &'a str,
    input: Vec<TokenSpan<'a>>,

    context: PatternContext,
    binding: Option<bool>, // mutability of the enclosing let/var
    bound_names: FxHashMap<&'a str, SourceSpan>,
}

impl<'a> Parser<'a> {
    pub fn new(code: &'a str, tokens: Vec<TokenSpan<'a>>) -> Self {
        Parser {
            cursor: 0,
            code,
            input: tokens,

            context: PatternContext::FullMatch,
            binding: None,
            bound_names: FxHashMap::default(),
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current_span(&self) -> Option<&TokenSpan<'a>> {
        self.input.get(self.cursor)
    }

    pub fn current(&self) -> Option<&Token<'a>> {
        self.peek_next_n(0)
    }

    pub fn peek_next_n(&self, n: usize) -> Option<&Token<'a>> {
        self.input.get(self.cursor + n).map(|span| &span.token)
    }

    fn end_span(&self) -> SourceSpan {
        match self.input.last() {
            Some(span) => (span.to, 0).into(),
            None => (0, 0).into(),
        }
    }

    fn current_position(&self) -> SourceSpan {
        match self.current_span() {
            Some(span) => span.into(),
            None => self.end_span(),
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.current_span() {
            Some(span) => ParseError::UnexpectedToken(UnexpectedToken {
                dbg_line: dbg_line!(),
                expected: expected.to_string(),
                actual: format!("{:?}", span.token),
                src: self.code.to_string(),
                position: span.into(),
            }),
            None => ParseError::UnexpectedEndOfFile(UnexpectedEndOfFile {
                dbg_line: dbg_line!(),
                expected: expected.to_string(),
                src: self.code.to_string(),
                position: self.end_span(),
            }),
        }
    }

    pub fn expect_current(&mut self, token: &Token, expected: &str) -> ParseResult<()> {
        match self.current() {
            Some(current) if current.eq_type(token) => {
                self.cursor += 1;
                Ok(())
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    fn expect_identifier(&mut self, expected: &str) -> ParseResult<&'a str> {
        match self.current() {
            Some(&Token::Identifier(name)) => {
                self.cursor += 1;
                Ok(name)
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    fn ensure_refutable_allowed(&self, kind: &str) -> ParseResult<()> {
        if self.context == PatternContext::FullMatch {
            return Ok(());
        }

        Err(ParseError::IllegalPatternKind(IllegalPatternKind {
            dbg_line: dbg_line!(),
            kind: kind.to_string(),
            src: self.code.to_string(),
            position: self.current_position(),
        }))
    }

    /// Parses a whole pattern clause, every token has to be consumed.
    pub fn parse(mut self, context: PatternContext) -> ParseResult<Pattern> {
        let pattern = self.parse_pattern(context)?;

        if self.cursor < self.input.len() {
            return Err(self.unexpected("end of pattern"));
        }

        tracing::debug!(%pattern, ?context, "parsed pattern");
        Ok(pattern)
    }

    /// Parses one pattern at the cursor, leaving the cursor right after it.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn parse_pattern(&mut self, context: PatternContext) -> ParseResult<Pattern> {
        self.context = context;
        self.binding = None;
        self.bound_names.clear();

        self.parse_cast_pattern()
    }

    // pattern ("as" type)*
    fn parse_cast_pattern(&mut self) -> ParseResult<Pattern> {
        let mut pattern = self.parse_annotated_pattern()?;

        while let Some(Token::As) = self.current() {
            self.ensure_refutable_allowed("type-casting pattern")?;
            self.cursor += 1;

            let type_ref = self.parse_type()?;
            pattern = Pattern::As(Box::new(pattern), type_ref);
        }

        Ok(pattern)
    }

    // pattern (":" type)?
    fn parse_annotated_pattern(&mut self) -> ParseResult<Pattern> {
        let pattern = self.parse_primary_pattern()?;

        let annotatable = matches!(
            pattern,
            Pattern::Wildcard
                | Pattern::Identifier(_)
                | Pattern::ValueBinding(..)
                | Pattern::Tuple(_)
        );

        if annotatable && matches!(self.current(), Some(Token::Colon)) {
            self.cursor += 1;
            let type_ref = self.parse_type()?;
            return Ok(Pattern::Typed(Box::new(pattern), type_ref));
        }

        Ok(pattern)
    }

    fn parse_primary_pattern(&mut self) -> ParseResult<Pattern> {
        let Some(span) = self.current_span() else {
            return Err(self.unexpected("pattern"));
        };
        let position: SourceSpan = span.into();

        match span.token.clone() {
            Token::Let | Token::Var => self.parse_value_binding(),

            Token::Underscore => {
                self.cursor += 1;
                Ok(Pattern::Wildcard)
            }

            Token::LeftParen => self.parse_tuple_pattern(),

            Token::Dot => {
                self.ensure_refutable_allowed("enum case pattern")?;
                self.cursor += 1;

                let case = self.expect_identifier("enum case name")?;
                self.parse_enum_case(None, case)
            }

            Token::Identifier(name) => self.parse_identifier_pattern(name, position),

            Token::Is => {
                self.ensure_refutable_allowed("type-casting pattern")?;
                self.cursor += 1;
                Ok(Pattern::Is(self.parse_type()?))
            }

            Token::Integer(_)
            | Token::Float(_)
            | Token::String(_)
            | Token::Bool(_)
            | Token::Nil
            | Token::Minus => {
                self.ensure_refutable_allowed("expression pattern")?;
                Ok(Pattern::Expression(self.parse_expression()?))
            }

            _ => Err(self.unexpected("pattern")),
        }
    }

    fn parse_value_binding(&mut self) -> ParseResult<Pattern> {
        let mutable = matches!(self.current(), Some(Token::Var));
        self.cursor += 1;

        // identifier leaves below pick this up in `bind_name`,
        // so no ValueBinding wraps anything but an identifier.
        // The innermost keyword wins: `let (x, var y)` is `(let x, var y)`
        let outer = self.binding.replace(mutable);
        let pattern = self.parse_cast_pattern();
        self.binding = outer;

        pattern
    }

    fn parse_identifier_pattern(
        &mut self,
        name: &'a str,
        position: SourceSpan,
    ) -> ParseResult<Pattern> {
        match self.peek_next_n(1) {
            // Shape.circle, Geometry.Shape.circle
            Some(Token::Dot) => {
                self.ensure_refutable_allowed("enum case pattern")?;
                self.cursor += 1;

                let mut segments = vec![name];
                while let Some(Token::Dot) = self.current() {
                    self.cursor += 1;
                    segments.push(self.expect_identifier("enum case name")?);
                }

                let case = segments.pop().unwrap_or(name);
                self.parse_enum_case(Some(segments.join(".")), case)
            }

            // circle(r)
            Some(Token::LeftParen) => {
                self.ensure_refutable_allowed("enum case pattern")?;
                self.cursor += 1;
                self.parse_enum_case(None, name)
            }

            // x?
            Some(Token::QuestionMark) => {
                self.ensure_refutable_allowed("optional pattern")?;
                self.cursor += 2;
                let leaf = self.bind_name(name, position)?;
                Ok(Pattern::Optional(Box::new(leaf)))
            }

            _ => {
                self.cursor += 1;
                self.bind_name(name, position)
            }
        }
    }

    fn parse_enum_case(
        &mut self,
        qualifier: Option<String>,
        case: &'a str,
    ) -> ParseResult<Pattern> {
        let payload = if matches!(self.current(), Some(Token::LeftParen)) {
            Some(Box::new(self.parse_tuple_pattern()?))
        } else {
            None
        };

        Ok(Pattern::EnumCase(EnumCasePattern {
            qualifier,
            case: case.to_string(),
            payload,
        }))
    }

    fn parse_tuple_pattern(&mut self) -> ParseResult<Pattern> {
        self.expect_current(&Token::LeftParen, "'('")?;

        let mut patterns = Vec::new();
        loop {
            if matches!(self.current(), Some(Token::RightParen)) {
                break;
            }

            patterns.push(self.parse_cast_pattern()?);

            match self.current() {
                Some(Token::Comma) => {
                    self.cursor += 1;
                    if matches!(self.current(), Some(Token::RightParen)) {
                        return Err(self.unexpected("pattern"));
                    }
                }
                Some(Token::RightParen) => {}
                _ => return Err(self.unexpected("',' or ')'")),
            }
        }

        self.cursor += 1;
        Ok(Pattern::tuple(patterns))
    }

    fn bind_name(&mut self, name: &'a str, position: SourceSpan) -> ParseResult<Pattern> {
        if let Some(first) = self.bound_names.get(name) {
            return Err(ParseError::DuplicateBinding(DuplicateBindingError {
                dbg_line: dbg_line!(),
                name: name.to_string(),
                src: self.code.to_string(),
                first: Some(*first),
                second: Some(position),
            }));
        }
        self.bound_names.insert(name, position);

        Ok(match self.binding {
            Some(mutable) => Pattern::binding(name, mutable),
            None => Pattern::identifier(name),
        })
    }

    pub fn parse_type(&mut self) -> ParseResult<TypeRef> {
        let mut type_ref = match self.current().cloned() {
            Some(Token::LeftParen) => {
                self.cursor += 1;

                let mut items = Vec::new();
                loop {
                    if matches!(self.current(), Some(Token::RightParen)) {
                        break;
                    }

                    items.push(self.parse_type()?);

                    match self.current() {
                        Some(Token::Comma) => {
                            self.cursor += 1;
                            if matches!(self.current(), Some(Token::RightParen)) {
                                return Err(self.unexpected("type"));
                            }
                        }
                        Some(Token::RightParen) => {}
                        _ => return Err(self.unexpected("',' or ')'")),
                    }
                }
                self.cursor += 1;

                if items.len() == 1 {
                    items.remove(0)
                } else {
                    TypeRef::Tuple(items)
                }
            }

            Some(Token::Identifier(name)) => {
                self.cursor += 1;

                let mut path = name.to_string();
                while let (Some(Token::Dot), Some(&Token::Identifier(segment))) =
                    (self.current(), self.peek_next_n(1))
                {
                    path.push('.');
                    path.push_str(segment);
                    self.cursor += 2;
                }

                TypeRef::Named(path)
            }

            _ => return Err(self.unexpected("type")),
        };

        while let Some(Token::QuestionMark) = self.current() {
            self.cursor += 1;
            type_ref = TypeRef::Optional(Box::new(type_ref));
        }

        Ok(type_ref)
    }

    // literal ("..." | "..<" literal)?
    fn parse_expression(&mut self) -> ParseResult<Expression> {
        let from = self.parse_unary_expression()?;

        match self.current() {
            Some(Token::ClosedRange) => {
                self.cursor += 1;
                Ok(Expression::closed_range(from, self.parse_unary_expression()?))
            }
            Some(Token::HalfOpenRange) => {
                self.cursor += 1;
                Ok(Expression::half_open_range(from, self.parse_unary_expression()?))
            }
            _ => Ok(from),
        }
    }

    fn parse_unary_expression(&mut self) -> ParseResult<Expression> {
        let expression = match self.current().cloned() {
            Some(Token::Minus) => {
                self.cursor += 1;
                let operand = self.parse_unary_expression()?;
                return Ok(Expression::Negate(Box::new(operand)));
            }

            Some(Token::Integer(value)) => Expression::Integer(value),
            Some(Token::Float(value)) => Expression::Float(value),
            Some(Token::String(value)) => Expression::String(value.to_string()),
            Some(Token::Bool(value)) => Expression::Boolean(value),
            Some(Token::Nil) => Expression::Nil,

            _ => return Err(self.unexpected("literal expression")),
        };

        self.cursor += 1;
        Ok(expression)
    }
}
