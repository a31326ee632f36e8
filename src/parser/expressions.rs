use std::fmt::Display;

/// Expression embedded in an expression pattern.
///
/// Evaluating it is up to an [`ExpressionEvaluator`](crate::interpreter::ExpressionEvaluator),
/// the parser only records its shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    // values
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Nil,

    Negate(Box<Expression>), // -x

    Range(Box<Expression>, Box<Expression>, bool), // from, to, inclusive
}

impl Expression {
    pub fn closed_range(from: Expression, to: Expression) -> Self {
        Expression::Range(Box::new(from), Box::new(to), true)
    }

    pub fn half_open_range(from: Expression, to: Expression) -> Self {
        Expression::Range(Box::new(from), Box::new(to), false)
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::Integer(value) => write!(f, "{value}"),
            Expression::Float(value) => write!(f, "{value:?}"),
            Expression::String(value) => write!(f, "{value:?}"),
            Expression::Boolean(value) => write!(f, "{value}"),
            Expression::Nil => write!(f, "nil"),
            Expression::Negate(value) => write!(f, "-{value}"),
            Expression::Range(from, to, true) => write!(f, "{from}...{to}"),
            Expression::Range(from, to, false) => write!(f, "{from}..<{to}"),
        }
    }
}
