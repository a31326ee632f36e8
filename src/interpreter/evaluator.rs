use std::cmp::Ordering;

use crate::{evaluation_fault, parser::Expression};

use super::{errors::MatchEvaluationError, values::Value};

/// Turns the expression of an expression pattern into the value it is compared with.
pub trait ExpressionEvaluator {
    fn evaluate(&self, expression: &Expression) -> Result<Value, MatchEvaluationError>;
}

impl<F> ExpressionEvaluator for F
where
    F: Fn(&Expression) -> Result<Value, MatchEvaluationError>,
{
    fn evaluate(&self, expression: &Expression) -> Result<Value, MatchEvaluationError> {
        self(expression)
    }
}

/// Evaluates literals, negation and ranges.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralEvaluator;

impl ExpressionEvaluator for LiteralEvaluator {
    fn evaluate(&self, expression: &Expression) -> Result<Value, MatchEvaluationError> {
        Ok(match expression {
            Expression::Integer(value) => Value::Integer(*value),
            Expression::Float(value) => Value::Float(*value),
            Expression::String(value) => Value::String(value.clone()),
            Expression::Boolean(value) => Value::Boolean(*value),
            Expression::Nil => Value::none(),

            Expression::Negate(operand) => match self.evaluate(operand)? {
                Value::Integer(value) => match value.checked_neg() {
                    Some(value) => Value::Integer(value),
                    None => {
                        return Err(evaluation_fault!(
                            ExpressionEvaluator,
                            "integer overflow negating {value}"
                        ))
                    }
                },
                Value::Float(value) => Value::Float(-value),
                value => {
                    return Err(evaluation_fault!(ExpressionEvaluator, "cannot negate {value}"))
                }
            },

            Expression::Range(from, to, inclusive) => {
                let from = self.evaluate(from)?;
                let to = self.evaluate(to)?;

                match from.compare_scalar(&to) {
                    Some(Ordering::Greater) => {
                        return Err(evaluation_fault!(
                            ExpressionEvaluator,
                            "range lower bound {from} is greater than upper bound {to}"
                        ))
                    }
                    Some(_) => Value::range(from, to, *inclusive),
                    None => {
                        return Err(evaluation_fault!(
                            ExpressionEvaluator,
                            "range bounds {from} and {to} are not comparable"
                        ))
                    }
                }
            }
        })
    }
}
