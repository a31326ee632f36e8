mod case;
mod range;
pub use self::{case::*, range::*};

use std::{cmp::Ordering, fmt::Display};

use crate::parser::{OPTIONAL_NONE_CASE, OPTIONAL_SOME_CASE, OPTIONAL_TYPE_NAME};

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectValue {
    pub class: String,
    pub fields: Vec<(String, Value)>, // name, value
}

/// Runtime value patterns are matched against.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    // numbers
    Integer(i64),
    Float(f64),
    // bool
    Boolean(bool),
    // string
    String(String),
    // Built-in objects
    Tuple(Vec<Value>),
    Range(RangeValue), // from, to, inclusive
    // Sum types, Optional included
    Case(CaseValue), // enum_name, case, payload
    // Class instances
    Object(ObjectValue),
}

impl Value {
    pub fn unit() -> Self {
        Value::Tuple(Vec::new())
    }

    /// Single element tuples are transparent, `(5)` is just `5`.
    pub fn tuple(mut items: Vec<Value>) -> Self {
        if items.len() == 1 {
            items.remove(0)
        } else {
            Value::Tuple(items)
        }
    }

    pub fn case(
        enum_name: impl Into<String>,
        case: impl Into<String>,
        payload: Vec<Value>,
    ) -> Self {
        Value::Case(CaseValue::new(enum_name, case, payload))
    }

    pub fn some(value: Value) -> Self {
        Value::case(OPTIONAL_TYPE_NAME, OPTIONAL_SOME_CASE, vec![value])
    }

    pub fn none() -> Self {
        Value::case(OPTIONAL_TYPE_NAME, OPTIONAL_NONE_CASE, Vec::new())
    }

    pub fn range(from: Value, to: Value, inclusive: bool) -> Self {
        Value::Range(RangeValue::new(from, to, inclusive))
    }

    pub fn object(class: impl Into<String>, fields: Vec<(&str, Value)>) -> Self {
        Value::Object(ObjectValue {
            class: class.into(),
            fields: fields
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        })
    }

    pub fn as_tuple(&self) -> Option<&[Value]> {
        match self {
            Value::Tuple(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_case(&self) -> Option<&CaseValue> {
        match self {
            Value::Case(case) => Some(case),
            _ => None,
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Value::Case(case) if case.enum_name == OPTIONAL_TYPE_NAME)
    }

    /// Ordering between scalars of the same type, `None` for anything else.
    pub fn compare_scalar(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(left), Value::Integer(right)) => Some(left.cmp(right)),
            (Value::Float(left), Value::Float(right)) => left.partial_cmp(right),
            (Value::String(left), Value::String(right)) => Some(left.cmp(right)),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

fn write_list<T: Display>(f: &mut std::fmt::Formatter<'_>, items: &[T]) -> std::fmt::Result {
    write!(f, "(")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, ")")
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value:?}"),
            Value::Boolean(value) => write!(f, "{value}"),
            Value::String(value) => write!(f, "{value:?}"),
            Value::Tuple(items) => write_list(f, items),
            Value::Range(RangeValue(from, to, true)) => write!(f, "{from}...{to}"),
            Value::Range(RangeValue(from, to, false)) => write!(f, "{from}..<{to}"),
            Value::Case(CaseValue {
                enum_name,
                case,
                payload,
            }) => {
                write!(f, "{enum_name}.{case}")?;
                if payload.is_empty() {
                    Ok(())
                } else {
                    write_list(f, payload)
                }
            }
            Value::Object(ObjectValue { class, fields }) => {
                write!(f, "{class} {{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " {name}: {value}")?;
                }
                write!(f, " }}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn single_element_tuple_is_transparent() {
        assert_eq!(Value::tuple(vec![Value::Integer(5)]), Value::Integer(5));
        assert_eq!(Value::tuple(vec![]), Value::unit());
    }

    #[test]
    fn optionals() {
        assert!(Value::some(Value::Integer(5)).is_optional());
        assert!(Value::none().is_optional());
        assert!(!Value::case("Shape", "circle", vec![]).is_optional());
    }

    #[test]
    fn display() {
        let value = Value::Tuple(vec![
            Value::some(Value::Integer(1)),
            Value::none(),
            Value::range(Value::Integer(-2), Value::Integer(2), true),
            Value::object("Point", vec![("x", Value::Float(1.5)), ("y", "up".into())]),
        ]);
        assert_eq!(
            value.to_string(),
            "(Optional.some(1), Optional.none, -2...2, Point { x: 1.5, y: \"up\" })"
        );
    }
}
