use std::fmt::Display;

use miette::Diagnostic;
use thiserror::Error;

/// External piece of machinery the matcher leans on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collaborator {
    ExpressionEvaluator,
    EquivalenceResolver,
    TypeOracle,
}

impl Display for Collaborator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Collaborator::ExpressionEvaluator => write!(f, "expression evaluator"),
            Collaborator::EquivalenceResolver => write!(f, "equivalence resolver"),
            Collaborator::TypeOracle => write!(f, "type oracle"),
        }
    }
}

/// A collaborator faulted while a match was being evaluated.
///
/// This is never a plain non-match, those are [`MatchOutcome::Failed`](super::MatchOutcome::Failed).
#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
#[error("match-evaluation-error")]
#[diagnostic(
	code(matcher::evaluation_fault),
	help("[{}] {} failed: {}", self.dbg_line, self.collaborator, self.message),
)]
pub struct MatchEvaluationError {
    pub dbg_line: String,
    pub collaborator: Collaborator,
    pub message: String,
}

#[macro_export]
macro_rules! evaluation_fault {
    ($collaborator:ident, $($message:tt)+) => {
        $crate::interpreter::MatchEvaluationError {
            dbg_line: $crate::dbg_line!(),
            collaborator: $crate::interpreter::Collaborator::$collaborator,
            message: format!($($message)+),
        }
    };
}
