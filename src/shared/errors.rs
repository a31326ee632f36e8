use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Two identifier leaves of one pattern bind the same name.
///
/// Raised by the parser (with both spans pointing into the pattern source) and by
/// [`Pattern::check_bindings`](crate::parser::Pattern::check_bindings) /
/// [`Environment::bind`](crate::interpreter::Environment::bind) for hand-built patterns,
/// where there is no source to point into.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
#[error("duplicate-binding")]
#[diagnostic(
	code(pattern::duplicate_binding),
	help("[{}] {:?} is bound more than once in the same pattern, rename one of them", self.dbg_line, self.name),
)]
pub struct DuplicateBindingError {
    pub dbg_line: String,
    pub name: String,
    #[source_code]
    pub src: String,
    #[label("First bound here")]
    pub first: Option<SourceSpan>,
    #[label("Bound again here")]
    pub second: Option<SourceSpan>,
}

impl DuplicateBindingError {
    pub fn without_source(dbg_line: String, name: impl Into<String>) -> Self {
        Self {
            dbg_line,
            name: name.into(),
            src: String::new(),
            first: None,
            second: None,
        }
    }
}
