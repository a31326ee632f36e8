use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum LexerError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    UnexpectedCharacter(UnexpectedCharacter),
    #[error(transparent)]
    #[diagnostic(transparent)]
    UnterminatedString(UnterminatedString),
    #[error(transparent)]
    #[diagnostic(transparent)]
    InvalidNumber(InvalidNumber),
}

#[derive(Error, Debug, Diagnostic, Clone)]
#[error("unexpected-character")]
#[diagnostic(
	code(lexer::unexpected_character),
	help("[{}] Expected {}, got {:?} instead", self.dbg_line, self.expected, self.actual),
)]
pub struct UnexpectedCharacter {
    pub dbg_line: String,
    pub expected: String,
    pub actual: char,
    #[source_code]
    pub src: String,
    #[label("Unexpected character: {:?}", self.actual)]
    pub position: SourceSpan,
}

#[derive(Error, Debug, Diagnostic, Clone)]
#[error("unterminated-string")]
#[diagnostic(
	code(lexer::unterminated_string),
	help("[{}] Close the string literal with '\"'", self.dbg_line),
)]
pub struct UnterminatedString {
    pub dbg_line: String,
    #[source_code]
    pub src: String,
    #[label("String starts here and never ends")]
    pub position: SourceSpan,
}

#[derive(Error, Debug, Diagnostic, Clone)]
#[error("invalid-number")]
#[diagnostic(
    code(lexer::invalid_number),
    help("[{}] {:?} is not a valid number literal", self.dbg_line, self.literal),
)]
pub struct InvalidNumber {
    pub dbg_line: String,
    pub literal: String,
    #[source_code]
    pub src: String,
    #[label("Invalid number: {:?}", self.literal)]
    pub position: SourceSpan,
}
