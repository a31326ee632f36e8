use crate::{
    evaluation_fault,
    parser::{EnumCasePattern, Pattern, OPTIONAL_SOME_CASE, OPTIONAL_TYPE_NAME},
    shared::types::TypeRef,
};

use super::{
    environment::{Binding, Environment},
    equivalence::ResolverRegistry,
    errors::MatchEvaluationError,
    evaluator::ExpressionEvaluator,
    oracle::TypeOracle,
    values::Value,
};

pub type MatchResult<T> = Result<T, MatchEvaluationError>;

#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    Bound(Environment),
    Failed,
}

impl MatchOutcome {
    pub fn is_bound(&self) -> bool {
        matches!(self, MatchOutcome::Bound(_))
    }

    pub fn into_environment(self) -> Option<Environment> {
        match self {
            MatchOutcome::Bound(env) => Some(env),
            MatchOutcome::Failed => None,
        }
    }
}

/// Matches patterns against values.
///
/// Patterns are expected to bind every name once, which parsed patterns always do;
/// hand-built ones can be checked with [`Pattern::check_bindings`].
#[derive(Clone, Copy)]
pub struct Matcher<'m> {
    oracle: &'m dyn TypeOracle,
    evaluator: &'m dyn ExpressionEvaluator,
    resolvers: &'m ResolverRegistry,
}

impl<'m> Matcher<'m> {
    pub fn new(
        oracle: &'m dyn TypeOracle,
        evaluator: &'m dyn ExpressionEvaluator,
        resolvers: &'m ResolverRegistry,
    ) -> Self {
        Self {
            oracle,
            evaluator,
            resolvers,
        }
    }

    /// Matches `pattern` against `value`.
    ///
    /// Bindings are collected in a fresh environment and only merged into a copy of `env`
    /// once the whole pattern matched, `env` itself is never touched.
    #[tracing::instrument(level = "trace", skip_all, fields(pattern = %pattern, value = %value))]
    pub fn match_pattern(
        &self,
        pattern: &Pattern,
        value: &Value,
        env: &Environment,
    ) -> MatchResult<MatchOutcome> {
        let mut bindings = Environment::new();

        if !self.match_into(pattern, value, &mut bindings, false)? {
            tracing::trace!("failed");
            return Ok(MatchOutcome::Failed);
        }

        tracing::trace!(bound = bindings.len(), "bound");
        let mut env = env.clone();
        bindings.commit_into(&mut env);
        Ok(MatchOutcome::Bound(env))
    }

    /// Tries `patterns` in order, returning the first one that matches.
    /// Patterns after it are never evaluated.
    pub fn first_match(
        &self,
        patterns: &[Pattern],
        value: &Value,
        env: &Environment,
    ) -> MatchResult<Option<(usize, Environment)>> {
        for (i, pattern) in patterns.iter().enumerate() {
            if let MatchOutcome::Bound(env) = self.match_pattern(pattern, value, env)? {
                tracing::debug!(case = i, %pattern, "case matched");
                return Ok(Some((i, env)));
            }
        }

        tracing::debug!(cases = patterns.len(), "no case matched");
        Ok(None)
    }

    fn match_into(
        &self,
        pattern: &Pattern,
        value: &Value,
        env: &mut Environment,
        mutable: bool,
    ) -> MatchResult<bool> {
        match pattern {
            Pattern::Wildcard => Ok(true),

            Pattern::Identifier(name) => {
                env.push(Binding {
                    name: name.clone(),
                    value: value.clone(),
                    mutable,
                });
                Ok(true)
            }

            Pattern::ValueBinding(inner, mutable) => self.match_into(inner, value, env, *mutable),

            Pattern::Tuple(patterns) => self.match_tuple(patterns, value, env, mutable),

            Pattern::EnumCase(EnumCasePattern {
                qualifier,
                case,
                payload,
            }) => self.match_enum_case(
                qualifier.as_deref(),
                case,
                payload.as_deref(),
                value,
                env,
                mutable,
            ),

            // x? is Optional.some(x)
            Pattern::Optional(inner) => self.match_enum_case(
                Some(OPTIONAL_TYPE_NAME),
                OPTIONAL_SOME_CASE,
                Some(&**inner),
                value,
                env,
                mutable,
            ),

            Pattern::Is(type_ref) => self.conforms(value, type_ref),

            Pattern::As(inner, type_ref) => {
                if !self.conforms(value, type_ref)? {
                    return Ok(false);
                }

                let target = self.oracle.resolve(type_ref)?;
                let value = self.oracle.reinterpret(value, &target)?;
                self.match_into(inner, &value, env, mutable)
            }

            Pattern::Expression(expression) => {
                let pattern_value = self.evaluator.evaluate(expression)?;
                self.resolvers.matches(self.oracle, &pattern_value, value)
            }

            Pattern::Typed(inner, type_ref) => {
                Ok(self.conforms(value, type_ref)? && self.match_into(inner, value, env, mutable)?)
            }
        }
    }

    fn conforms(&self, value: &Value, type_ref: &TypeRef) -> MatchResult<bool> {
        let target = self.oracle.resolve(type_ref)?;
        let actual = self.oracle.dynamic_type(value)?;
        Ok(actual == target || self.oracle.is_subtype(&actual, &target))
    }

    fn match_tuple(
        &self,
        patterns: &[Pattern],
        value: &Value,
        env: &mut Environment,
        mutable: bool,
    ) -> MatchResult<bool> {
        if let [pattern] = patterns {
            return self.match_into(pattern, value, env, mutable);
        }

        match self.oracle.shape_of(value) {
            Some(arity) if arity == patterns.len() => {}
            _ => return Ok(false),
        }

        let Some(components) = self.oracle.components(value) else {
            return Err(evaluation_fault!(
                TypeOracle,
                "{value} has a tuple shape but no components"
            ));
        };

        self.match_sequence(patterns, components, env, mutable)
    }

    /// Matches left to right, dropping everything bound so far on the first failure.
    fn match_sequence(
        &self,
        patterns: &[Pattern],
        values: &[Value],
        env: &mut Environment,
        mutable: bool,
    ) -> MatchResult<bool> {
        if patterns.len() != values.len() {
            return Ok(false);
        }

        let checkpoint = env.checkpoint();
        for (pattern, value) in patterns.iter().zip(values) {
            if !self.match_into(pattern, value, env, mutable)? {
                env.rollback(checkpoint);
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn match_enum_case(
        &self,
        qualifier: Option<&str>,
        case: &str,
        payload: Option<&Pattern>,
        value: &Value,
        env: &mut Environment,
        mutable: bool,
    ) -> MatchResult<bool> {
        // the enum type is the oracle's call, case names are compared as written
        if let Some(qualifier) = qualifier {
            if !self.conforms(value, &TypeRef::named(qualifier))? {
                return Ok(false);
            }
        }

        let Some(active) = self.oracle.case_of(value) else {
            return Ok(false);
        };

        if active.case != case {
            return Ok(false);
        }

        match (payload, active.payload.as_slice()) {
            // no payload pattern is an empty tuple pattern
            (None, values) => self.match_sequence(&[], values, env, mutable),
            // a single associated value is not wrapped in a tuple
            (Some(pattern), [value]) => self.match_into(pattern, value, env, mutable),
            (Some(Pattern::Tuple(patterns)), values) => {
                self.match_sequence(patterns, values, env, mutable)
            }
            (Some(pattern), values) => {
                let tuple = Value::Tuple(values.to_vec());
                self.match_into(pattern, &tuple, env, mutable)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::*;
    use crate::{
        interpreter::{BuiltinOracle, LiteralEvaluator},
        parser::{parse_pattern_str, Expression, PatternContext},
        shared::types::Type,
    };
    use pretty_assertions::assert_eq;

    fn full(code: &str) -> Pattern {
        parse_pattern_str(code, PatternContext::FullMatch).unwrap()
    }

    fn oracle() -> BuiltinOracle {
        BuiltinOracle::new()
            .with_type("Shape")
            .with_type("Result")
            .with_supertype("Dog", "Animal")
            .with_supertype("Cat", "Animal")
    }

    fn pair(a: i64, b: i64) -> Value {
        Value::Tuple(vec![Value::Integer(a), Value::Integer(b)])
    }

    fn bindings(env: &Environment) -> Vec<(&str, &Value, bool)> {
        env.iter()
            .map(|binding| (binding.name.as_str(), &binding.value, binding.mutable))
            .collect()
    }

    fn run(pattern: &Pattern, value: &Value) -> MatchOutcome {
        let oracle = oracle();
        let resolvers = ResolverRegistry::new();
        Matcher::new(&oracle, &LiteralEvaluator, &resolvers)
            .match_pattern(pattern, value, &Environment::new())
            .unwrap()
    }

    fn bound(pattern: &Pattern, value: &Value) -> Environment {
        match run(pattern, value) {
            MatchOutcome::Bound(env) => env,
            MatchOutcome::Failed => panic!("{pattern} should match {value}"),
        }
    }

    #[test]
    fn irrefutable_patterns_always_match() {
        let value = Value::Tuple(vec![
            Value::Integer(1),
            Value::Tuple(vec![Value::from("a"), Value::Boolean(true)]),
            Value::none(),
        ]);

        for code in ["_", "x", "let x", "(a, b, c)", "var (a, (b, _), c)", "(_, _, _)"] {
            assert!(run(&full(code), &value).is_bound(), "{code}");
        }
    }

    #[test]
    fn identifiers_bind_immutably() {
        let env = bound(&full("(x, var y)"), &pair(3, 2));
        assert_eq!(
            bindings(&env),
            vec![
                ("x", &Value::Integer(3), false),
                ("y", &Value::Integer(2), true)
            ]
        );
    }

    #[test]
    fn binding_distribution() {
        let distributed = bound(&full("let (x, y)"), &pair(3, 2));
        let explicit = bound(&full("(let x, let y)"), &pair(3, 2));

        assert_eq!(distributed, explicit);
        assert_eq!(distributed.get("x"), Some(&Value::Integer(3)));
        assert_eq!(distributed.get("y"), Some(&Value::Integer(2)));
    }

    #[test]
    fn inner_binding_keyword_sets_mutability() {
        let env = bound(&full("let (x, var y)"), &pair(3, 2));
        assert_eq!(
            bindings(&env),
            vec![
                ("x", &Value::Integer(3), false),
                ("y", &Value::Integer(2), true)
            ]
        );
    }

    #[test]
    fn hand_built_value_binding_tags_every_leaf() {
        let pattern = Pattern::ValueBinding(
            Box::new(Pattern::Tuple(vec![
                Pattern::identifier("x"),
                Pattern::identifier("y"),
            ])),
            true,
        );
        let env = bound(&pattern, &pair(3, 2));
        assert_eq!(env.is_mutable("x"), Some(true));
        assert_eq!(env.is_mutable("y"), Some(true));
    }

    #[test]
    fn tuple_arity_must_match() {
        assert_eq!(
            run(&full("(a, b)"), &Value::Tuple(vec![Value::Integer(1); 3])),
            MatchOutcome::Failed
        );
        assert_eq!(run(&full("(a, b)"), &Value::Integer(1)), MatchOutcome::Failed);
        assert!(run(&full("()"), &Value::unit()).is_bound());
        assert_eq!(run(&full("()"), &Value::Integer(1)), MatchOutcome::Failed);
    }

    #[test]
    fn optional_sugar() {
        let sugar = Pattern::optional("x");
        let explicit = Pattern::enum_case(
            Some("Optional"),
            "some",
            Some(Pattern::tuple(vec![Pattern::identifier("x")])),
        );
        let present = Value::some(Value::Integer(5));

        assert_eq!(run(&sugar, &present), run(&explicit, &present));
        assert_eq!(bound(&sugar, &present).get("x"), Some(&Value::Integer(5)));
        assert_eq!(run(&sugar, &Value::none()), MatchOutcome::Failed);
        assert_eq!(run(&sugar, &Value::Integer(5)), MatchOutcome::Failed);
    }

    #[test]
    fn enum_cases() {
        let circle = Value::case("Shape", "circle", vec![Value::Float(1.5)]);
        let rect = Value::case("Shape", "rect", vec![Value::Float(2.0), Value::Float(3.0)]);
        let point = Value::case("Shape", "point", vec![]);

        assert_eq!(
            bound(&full("Shape.circle(let r)"), &circle).get("r"),
            Some(&Value::Float(1.5))
        );
        assert_eq!(run(&full("Result.circle(_)"), &circle), MatchOutcome::Failed);
        assert_eq!(run(&full(".rect(_, _)"), &circle), MatchOutcome::Failed);

        let env = bound(&full(".rect(let w, let h)"), &rect);
        assert_eq!(env.get("w"), Some(&Value::Float(2.0)));
        assert_eq!(env.get("h"), Some(&Value::Float(3.0)));

        // the whole payload as one tuple
        assert_eq!(
            bound(&full(".rect(let size)"), &rect).get("size"),
            Some(&Value::Tuple(vec![Value::Float(2.0), Value::Float(3.0)]))
        );

        assert!(run(&full(".point"), &point).is_bound());
        assert!(run(&full("Shape.point()"), &point).is_bound());
        // omitted payload pattern stands for an empty one
        assert_eq!(run(&full(".rect"), &rect), MatchOutcome::Failed);
    }

    #[test]
    fn enum_qualifiers_are_resolved() {
        let oracle = BuiltinOracle::new()
            .with_type("Geometry.Shape")
            .with_type("Shape");
        let resolvers = ResolverRegistry::new();
        let matcher = Matcher::new(&oracle, &LiteralEvaluator, &resolvers);
        let circle = Value::case("Shape", "circle", vec![Value::Float(1.0)]);

        let env = matcher
            .match_pattern(&full("Geometry.Shape.circle(let r)"), &circle, &Environment::new())
            .unwrap()
            .into_environment()
            .unwrap();
        assert_eq!(env.get("r"), Some(&Value::Float(1.0)));

        let error = matcher
            .match_pattern(&full("Nope.circle(let r)"), &circle, &Environment::new())
            .unwrap_err();
        assert_eq!(error.collaborator, crate::interpreter::Collaborator::TypeOracle);
    }

    #[test]
    fn qualified_optional_cases() {
        let present = Value::some(Value::Integer(5));
        assert_eq!(
            bound(&full("Optional.some(let x)"), &present).get("x"),
            Some(&Value::Integer(5))
        );
        assert!(run(&full("Optional.none"), &Value::none()).is_bound());
        assert_eq!(run(&full("Optional.none"), &present), MatchOutcome::Failed);
        assert_eq!(
            run(&full("Optional.some(_)"), &Value::case("Shape", "some", vec![Value::Integer(5)])),
            MatchOutcome::Failed
        );
    }

    #[test]
    fn single_payload_holding_a_tuple() {
        let value = Value::some(pair(1, 2));
        let env = bound(&full(".some((let a, let b))"), &value);
        assert_eq!(env.get("a"), Some(&Value::Integer(1)));
        assert_eq!(env.get("b"), Some(&Value::Integer(2)));
    }

    #[test]
    fn expression_patterns() {
        assert_eq!(
            bound(&Pattern::Expression(Expression::Integer(5)), &Value::Integer(5)).len(),
            0
        );
        assert_eq!(
            run(&Pattern::Expression(Expression::Integer(5)), &Value::Integer(6)),
            MatchOutcome::Failed
        );
        assert!(run(&full("-2...2"), &Value::Integer(1)).is_bound());
        assert_eq!(run(&full("-2...2"), &Value::Integer(5)), MatchOutcome::Failed);
        assert!(run(&full("nil"), &Value::none()).is_bound());
        assert!(run(&full("\"on\""), &Value::from("on")).is_bound());
    }

    #[test]
    fn ordered_case_selection() {
        let oracle = oracle();
        let resolvers = ResolverRegistry::new();
        let matcher = Matcher::new(&oracle, &LiteralEvaluator, &resolvers);

        let cases = [full("(0, 0)"), full("(-2...2, -2...2)"), full("_")];
        let (index, env) = matcher
            .first_match(&cases, &pair(1, 2), &Environment::new())
            .unwrap()
            .unwrap();
        assert_eq!(index, 1);
        assert!(env.is_empty());

        let (index, _) = matcher
            .first_match(&cases, &pair(0, 0), &Environment::new())
            .unwrap()
            .unwrap();
        assert_eq!(index, 0);

        assert_eq!(
            matcher
                .first_match(&cases[..2], &pair(9, 9), &Environment::new())
                .unwrap(),
            None
        );
    }

    #[test]
    fn later_cases_are_never_evaluated() {
        let oracle = oracle();
        let resolvers = ResolverRegistry::new();
        let evaluator = |expression: &Expression| -> MatchResult<Value> {
            match expression {
                Expression::Integer(1) => Ok(Value::Integer(1)),
                _ => Err(evaluation_fault!(ExpressionEvaluator, "evaluated {expression}")),
            }
        };
        let matcher = Matcher::new(&oracle, &evaluator, &resolvers);

        let cases = [full("1"), full("2")];
        let (index, _) = matcher
            .first_match(&cases, &Value::Integer(1), &Environment::new())
            .unwrap()
            .unwrap();
        assert_eq!(index, 0);
    }

    #[test]
    fn failed_tuple_rolls_back() {
        let pattern = full("(.some(let x), .some(let y))");
        let value = Value::Tuple(vec![Value::some(Value::Integer(1)), Value::none()]);

        let oracle = oracle();
        let resolvers = ResolverRegistry::new();
        let matcher = Matcher::new(&oracle, &LiteralEvaluator, &resolvers);

        let mut scope = Environment::new();
        scope.bind("outer", Value::Boolean(true), false).unwrap();

        assert_eq!(
            matcher.match_pattern(&pattern, &value, &scope).unwrap(),
            MatchOutcome::Failed
        );
        assert_eq!(scope.len(), 1);
        assert!(!scope.contains("x"));
    }

    #[test]
    fn nested_rollback_keeps_earlier_bindings_out() {
        let oracle = oracle();
        let resolvers = ResolverRegistry::new();
        let matcher = Matcher::new(&oracle, &LiteralEvaluator, &resolvers);
        let mut bindings = Environment::new();

        let inner = full("(let a, 0)");
        assert!(!matcher
            .match_into(&inner, &pair(1, 1), &mut bindings, false)
            .unwrap());
        assert!(bindings.is_empty());
    }

    #[test]
    fn bound_environment_extends_callers_copy() {
        let oracle = oracle();
        let resolvers = ResolverRegistry::new();
        let matcher = Matcher::new(&oracle, &LiteralEvaluator, &resolvers);

        let mut scope = Environment::new();
        scope.bind("x", Value::Integer(0), true).unwrap();

        let env = matcher
            .match_pattern(&full("(let x, let y)"), &pair(3, 2), &scope)
            .unwrap()
            .into_environment()
            .unwrap();

        assert_eq!(env.get("x"), Some(&Value::Integer(3)));
        assert_eq!(env.get("y"), Some(&Value::Integer(2)));
        assert_eq!(scope.get("x"), Some(&Value::Integer(0)));
    }

    #[test]
    fn type_casting() {
        let dog = Value::object("Dog", vec![("name", Value::from("rex"))]);

        assert!(run(&full("is Dog"), &dog).is_bound());
        assert!(run(&full("is Animal"), &dog).is_bound());
        assert!(run(&full("is Any"), &dog).is_bound());
        assert_eq!(run(&full("is Cat"), &dog), MatchOutcome::Failed);
        assert_eq!(bound(&full("is Int"), &Value::Integer(1)).len(), 0);

        assert_eq!(
            bound(&full("let pet as Animal"), &dog).get("pet"),
            Some(&dog)
        );
        assert_eq!(run(&full("let pet as Cat"), &dog), MatchOutcome::Failed);
        let mixed = Value::Tuple(vec![Value::Integer(1), Value::from("a")]);
        assert!(run(&full("(_ as Int, is String)"), &mixed).is_bound());
    }

    #[test]
    fn type_annotations() {
        assert!(run(&full("x: Int"), &Value::Integer(1)).is_bound());
        assert_eq!(run(&full("x: String"), &Value::Integer(1)), MatchOutcome::Failed);
        assert!(run(&full("let (a, b): (Int, Any)"), &pair(1, 2)).is_bound());
        assert!(run(&full("x: Int?"), &Value::none()).is_bound());
    }

    #[test]
    fn as_patterns_bind_the_reinterpreted_value() {
        struct Unboxing(BuiltinOracle);

        impl TypeOracle for Unboxing {
            fn resolve(&self, type_ref: &TypeRef) -> MatchResult<Type> {
                self.0.resolve(type_ref)
            }

            fn dynamic_type(&self, value: &Value) -> MatchResult<Type> {
                self.0.dynamic_type(value)
            }

            // Boxed stands in for Int
            fn is_subtype(&self, sub: &Type, sup: &Type) -> bool {
                matches!((sub, sup), (Type::Custom(name), Type::Integer) if name == "Boxed")
                    || self.0.is_subtype(sub, sup)
            }

            fn reinterpret<'v>(
                &self,
                value: &'v Value,
                target: &Type,
            ) -> MatchResult<Cow<'v, Value>> {
                match (value, target) {
                    (Value::Object(object), Type::Integer) => {
                        Ok(Cow::Owned(object.fields[0].1.clone()))
                    }
                    _ => Ok(Cow::Borrowed(value)),
                }
            }
        }

        let oracle = Unboxing(BuiltinOracle::new());
        let resolvers = ResolverRegistry::new();
        let matcher = Matcher::new(&oracle, &LiteralEvaluator, &resolvers);

        let boxed = Value::object("Boxed", vec![("value", Value::Integer(7))]);
        let env = matcher
            .match_pattern(&full("let n as Int"), &boxed, &Environment::new())
            .unwrap()
            .into_environment()
            .unwrap();
        assert_eq!(env.get("n"), Some(&Value::Integer(7)));

        let outcome = matcher
            .match_pattern(
                &full("(let n as Int, 0)"),
                &Value::Tuple(vec![boxed, Value::Integer(1)]),
                &Environment::new(),
            )
            .unwrap();
        assert_eq!(outcome, MatchOutcome::Failed);
    }

    #[test]
    fn custom_resolver() {
        let oracle = oracle();
        let resolvers = ResolverRegistry::new().with_resolver(
            Type::String,
            Type::Integer,
            |pattern: &Value, candidate: &Value| -> MatchResult<bool> {
                Ok(match (pattern, candidate) {
                    (Value::String(text), Value::Integer(n)) => text.parse::<i64>() == Ok(*n),
                    _ => false,
                })
            },
        );
        let matcher = Matcher::new(&oracle, &LiteralEvaluator, &resolvers);

        let outcome = matcher
            .match_pattern(&full("\"42\""), &Value::Integer(42), &Environment::new())
            .unwrap();
        assert!(outcome.is_bound());
    }

    #[test]
    fn collaborator_faults_are_not_failures() {
        let oracle = oracle();
        let resolvers = ResolverRegistry::new();
        let matcher = Matcher::new(&oracle, &LiteralEvaluator, &resolvers);

        let error = matcher
            .match_pattern(&full("5...1"), &Value::Integer(3), &Environment::new())
            .unwrap_err();
        assert_eq!(error.collaborator, crate::interpreter::Collaborator::ExpressionEvaluator);

        let error = matcher
            .match_pattern(&full("is Unknown"), &Value::Integer(3), &Environment::new())
            .unwrap_err();
        assert_eq!(error.collaborator, crate::interpreter::Collaborator::TypeOracle);
    }

    #[test]
    fn patterns_are_shared_across_threads() {
        let cases = vec![full(".some(let x)"), full("nil")];
        let values = [Value::some(Value::Integer(1)), Value::none()];

        std::thread::scope(|scope| {
            for (expected, value) in values.iter().enumerate() {
                let cases = &cases;
                scope.spawn(move || {
                    let oracle = BuiltinOracle::new();
                    let resolvers = ResolverRegistry::new();
                    let matcher = Matcher::new(&oracle, &LiteralEvaluator, &resolvers);

                    for _ in 0..100 {
                        let (index, _) = matcher
                            .first_match(cases, value, &Environment::new())
                            .unwrap()
                            .unwrap();
                        assert_eq!(index, expected);
                    }
                });
            }
        });
    }
}
