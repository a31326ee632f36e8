use std::cmp::Ordering;

use super::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct RangeValue(pub Box<Value>, pub Box<Value>, pub bool); // from, to, inclusive

impl RangeValue {
    pub fn new(from: Value, to: Value, inclusive: bool) -> Self {
        Self(Box::new(from), Box::new(to), inclusive)
    }

    /// Values of a different type than the bounds are never contained.
    pub fn contains(&self, value: &Value) -> bool {
        let RangeValue(from, to, inclusive) = self;

        let above_from = matches!(
            from.compare_scalar(value),
            Some(Ordering::Less | Ordering::Equal)
        );
        let below_to = match value.compare_scalar(to) {
            Some(Ordering::Less) => true,
            Some(Ordering::Equal) => *inclusive,
            _ => false,
        };

        above_from && below_to
    }
}
