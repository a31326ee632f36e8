use std::fmt::Debug;

use rustc_hash::FxHashMap;

use crate::shared::types::Type;

use super::{errors::MatchEvaluationError, oracle::TypeOracle, values::Value};

/// Decides whether the value of an expression pattern matches a candidate value.
pub trait EquivalenceResolver {
    fn matches(&self, pattern: &Value, candidate: &Value) -> Result<bool, MatchEvaluationError>;
}

impl<F> EquivalenceResolver for F
where
    F: Fn(&Value, &Value) -> Result<bool, MatchEvaluationError>,
{
    fn matches(&self, pattern: &Value, candidate: &Value) -> Result<bool, MatchEvaluationError> {
        self(pattern, candidate)
    }
}

/// Plain equality, except that a range pattern matches the scalars it contains.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEquivalence;

impl EquivalenceResolver for DefaultEquivalence {
    fn matches(&self, pattern: &Value, candidate: &Value) -> Result<bool, MatchEvaluationError> {
        Ok(match (pattern, candidate) {
            (Value::Range(_), Value::Range(_)) => pattern == candidate,
            (Value::Range(range), candidate) => range.contains(candidate),
            (pattern, candidate) => pattern == candidate,
        })
    }
}

struct RegisteredResolver {
    pattern_type: Type,
    candidate_type: Type,
    resolver: Box<dyn EquivalenceResolver>,
}

/// Custom resolvers keyed by (pattern value type, candidate value type).
#[derive(Default)]
pub struct ResolverRegistry {
    resolvers: Vec<RegisteredResolver>,
    index: FxHashMap<(Type, Type), usize>,
}

impl Debug for ResolverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(
                self.resolvers
                    .iter()
                    .map(|registered| (&registered.pattern_type, &registered.candidate_type)),
            )
            .finish()
    }
}

impl ResolverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registering the same pair twice replaces the earlier resolver.
    pub fn register(
        &mut self,
        pattern_type: Type,
        candidate_type: Type,
        resolver: impl EquivalenceResolver + 'static,
    ) {
        let key = (pattern_type.clone(), candidate_type.clone());
        let registered = RegisteredResolver {
            pattern_type,
            candidate_type,
            resolver: Box::new(resolver),
        };

        match self.index.get(&key) {
            Some(&i) => self.resolvers[i] = registered,
            None => {
                self.index.insert(key, self.resolvers.len());
                self.resolvers.push(registered);
            }
        }
    }

    pub fn with_resolver(
        mut self,
        pattern_type: Type,
        candidate_type: Type,
        resolver: impl EquivalenceResolver + 'static,
    ) -> Self {
        self.register(pattern_type, candidate_type, resolver);
        self
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Exact pair first, otherwise the most specific registered pair both types conform to.
    /// Between unrelated candidates the one registered first wins.
    pub fn nearest(
        &self,
        oracle: &dyn TypeOracle,
        pattern_type: &Type,
        candidate_type: &Type,
    ) -> Option<&dyn EquivalenceResolver> {
        let key = (pattern_type.clone(), candidate_type.clone());
        if let Some(&i) = self.index.get(&key) {
            return Some(&*self.resolvers[i].resolver);
        }

        let mut nearest: Option<&RegisteredResolver> = None;
        for registered in self.resolvers.iter().filter(|registered| {
            oracle.is_subtype(pattern_type, &registered.pattern_type)
                && oracle.is_subtype(candidate_type, &registered.candidate_type)
        }) {
            nearest = match nearest {
                Some(best)
                    if !(oracle.is_subtype(&registered.pattern_type, &best.pattern_type)
                        && oracle.is_subtype(&registered.candidate_type, &best.candidate_type)) =>
                {
                    Some(best)
                }
                _ => Some(registered),
            };
        }

        nearest.map(|registered| &*registered.resolver)
    }

    pub fn matches(
        &self,
        oracle: &dyn TypeOracle,
        pattern: &Value,
        candidate: &Value,
    ) -> Result<bool, MatchEvaluationError> {
        let pattern_type = oracle.dynamic_type(pattern)?;
        let candidate_type = oracle.dynamic_type(candidate)?;

        match self.nearest(oracle, &pattern_type, &candidate_type) {
            Some(resolver) => {
                tracing::trace!(%pattern_type, %candidate_type, "using registered resolver");
                resolver.matches(pattern, candidate)
            }
            None => DefaultEquivalence.matches(pattern, candidate),
        }
    }
}
