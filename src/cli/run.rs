use miette::{bail, Result};

use crate::{
    interpreter::{
        BuiltinOracle, Environment, ExpressionEvaluator, LiteralEvaluator, Matcher,
        ResolverRegistry, Value,
    },
    lexer::Lexer,
    parser::{
        parse_pattern_str, EnumCasePattern, Pattern, PatternContext, OPTIONAL_NONE_CASE,
        OPTIONAL_SOME_CASE, OPTIONAL_TYPE_NAME,
    },
};

pub fn run_parse(code: &str, context: PatternContext, debug: bool) -> Result<()> {
    if debug {
        let tokens = Lexer::new(code).lex()?;
        println!("Tokens:\n{tokens:?}");
    }

    let pattern = parse_pattern_str(code, context)?;
    if debug {
        println!("Pattern:\n{pattern:#?}");
    }

    println!("{pattern}");
    println!("refutable: {}", pattern.is_refutable());
    println!("bindings: [{}]", pattern.bindings().join(", "));
    Ok(())
}

/// Returns whether any case matched.
pub fn run_match(
    value: &str,
    patterns: &[&str],
    subtypes: &[&str],
    context: PatternContext,
    debug: bool,
) -> Result<bool> {
    let value = parse_value(value)?;
    let cases = patterns
        .iter()
        .map(|code| parse_pattern_str(code, context))
        .collect::<Result<Vec<_>, _>>()?;

    if debug {
        println!("Value:\n{value:#?}");
        println!("Cases:\n{cases:#?}");
    }

    let oracle = oracle_for(&value, subtypes)?;
    let resolvers = ResolverRegistry::new();
    let matcher = Matcher::new(&oracle, &LiteralEvaluator, &resolvers);

    match matcher.first_match(&cases, &value, &Environment::new())? {
        Some((index, env)) => {
            println!("case {index}: {}", cases[index]);
            for binding in &env {
                let keyword = if binding.mutable { "var" } else { "let" };
                println!("  {keyword} {} = {}", binding.name, binding.value);
            }
            Ok(true)
        }
        None => {
            println!("no case matched {value}");
            Ok(false)
        }
    }
}

/// Reads a value written in pattern syntax, e.g. `(1, "a", Shape.circle(2.5), nil)`.
pub fn parse_value(code: &str) -> Result<Value> {
    let pattern = parse_pattern_str(code, PatternContext::FullMatch)?;
    value_from_pattern(&pattern)
}

fn value_from_pattern(pattern: &Pattern) -> Result<Value> {
    match pattern {
        Pattern::Expression(expression) => Ok(LiteralEvaluator.evaluate(expression)?),

        Pattern::Tuple(items) => Ok(Value::Tuple(
            items
                .iter()
                .map(value_from_pattern)
                .collect::<Result<_>>()?,
        )),

        Pattern::EnumCase(EnumCasePattern {
            qualifier,
            case,
            payload,
        }) => {
            let enum_name = match qualifier.as_deref() {
                Some(name) => name,
                None if case == OPTIONAL_SOME_CASE || case == OPTIONAL_NONE_CASE => {
                    OPTIONAL_TYPE_NAME
                }
                None => bail!("enum case .{case} needs its enum name to be used as a value"),
            };

            let payload = match payload.as_deref() {
                None => Vec::new(),
                Some(Pattern::Tuple(items)) => items
                    .iter()
                    .map(value_from_pattern)
                    .collect::<Result<_>>()?,
                Some(single) => vec![value_from_pattern(single)?],
            };

            Ok(Value::case(enum_name, case.as_str(), payload))
        }

        pattern => bail!("{pattern} is not a value"),
    }
}

fn oracle_for(value: &Value, subtypes: &[&str]) -> Result<BuiltinOracle> {
    let mut oracle = BuiltinOracle::new();
    register_enum_types(&mut oracle, value);

    for subtype in subtypes {
        let Some((sub, sup)) = subtype.split_once(':') else {
            bail!("subtype {subtype:?} should look like Sub:Super");
        };
        oracle.register_supertype(sub.trim(), sup.trim());
    }

    Ok(oracle)
}

fn register_enum_types(oracle: &mut BuiltinOracle, value: &Value) {
    match value {
        Value::Tuple(items) => items
            .iter()
            .for_each(|item| register_enum_types(oracle, item)),
        Value::Case(case) => {
            oracle.register_type(case.enum_name.as_str());
            case.payload
                .iter()
                .for_each(|item| register_enum_types(oracle, item));
        }
        _ => {}
    }
}
