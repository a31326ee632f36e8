mod environment;
mod equivalence;
mod errors;
mod evaluator;
mod matcher;
mod oracle;
mod values;

pub use environment::{Binding, Checkpoint, Environment};
pub use equivalence::{DefaultEquivalence, EquivalenceResolver, ResolverRegistry};
pub use errors::{Collaborator, MatchEvaluationError};
pub use evaluator::{ExpressionEvaluator, LiteralEvaluator};
pub use matcher::{MatchOutcome, MatchResult, Matcher};
pub use oracle::{BuiltinOracle, TypeOracle};
pub use values::{CaseValue, ObjectValue, RangeValue, Value};
