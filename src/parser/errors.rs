use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::{lexer::LexerError, shared::errors::DuplicateBindingError};

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum ParseError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lexer(LexerError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    UnexpectedToken(UnexpectedToken),
    #[error(transparent)]
    #[diagnostic(transparent)]
    UnexpectedEndOfFile(UnexpectedEndOfFile),
    #[error(transparent)]
    #[diagnostic(transparent)]
    IllegalPatternKind(IllegalPatternKind),
    #[error(transparent)]
    #[diagnostic(transparent)]
    DuplicateBinding(DuplicateBindingError),
}

impl From<LexerError> for ParseError {
    fn from(error: LexerError) -> Self {
        ParseError::Lexer(error)
    }
}

#[derive(Error, Debug, Diagnostic, Clone)]
#[error("unexpected-token")]
#[diagnostic(
	code(parser::unexpected_token),
	help("[{}] Expected {}, got {} instead", self.dbg_line, self.expected, self.actual),
)]
pub struct UnexpectedToken {
    pub dbg_line: String,
    pub expected: String,
    pub actual: String,
    #[source_code]
    pub src: String,
    #[label("Unexpected token: {}", self.actual)]
    pub position: SourceSpan,
}

#[derive(Error, Debug, Diagnostic, Clone)]
#[error("unexpected-eof")]
#[diagnostic(
	code(parser::unexpected_eof),
	help("[{}] Expected {}, pattern ended instead", self.dbg_line, self.expected),
)]
pub struct UnexpectedEndOfFile {
    pub dbg_line: String,
    pub expected: String,
    #[source_code]
    pub src: String,
    #[label("Unexpected end of pattern")]
    pub position: SourceSpan,
}

#[derive(Error, Debug, Diagnostic, Clone)]
#[error("illegal-pattern-kind")]
#[diagnostic(
	code(parser::illegal_pattern_kind),
	help("[{}] {} can fail to match, only irrefutable patterns are allowed here", self.dbg_line, self.kind),
)]
pub struct IllegalPatternKind {
    pub dbg_line: String,
    pub kind: String,
    #[source_code]
    pub src: String,
    #[label("Refutable {} is not allowed in a binding", self.kind)]
    pub position: SourceSpan,
}
