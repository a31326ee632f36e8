use std::borrow::Cow;

use once_cell::sync::Lazy;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
    evaluation_fault,
    parser::{OPTIONAL_SOME_CASE, OPTIONAL_TYPE_NAME},
    shared::types::{Type, TypeRef},
};

use super::{
    errors::MatchEvaluationError,
    values::{CaseValue, RangeValue, Value},
};

static BUILTIN_TYPES: Lazy<FxHashMap<&'static str, Type>> = Lazy::new(|| {
    let mut types = FxHashMap::default();
    types.insert("Int", Type::Integer);
    types.insert("Double", Type::Float);
    types.insert("Float", Type::Float);
    types.insert("Bool", Type::Boolean);
    types.insert("String", Type::String);
    types.insert("Void", Type::unit());
    types.insert("Any", Type::Any);
    types
});

/// Answers type questions about runtime values on behalf of the host.
pub trait TypeOracle {
    /// Resolves a type as written in a pattern.
    fn resolve(&self, type_ref: &TypeRef) -> Result<Type, MatchEvaluationError>;

    fn dynamic_type(&self, value: &Value) -> Result<Type, MatchEvaluationError>;

    /// Whether `sub` can be used where `sup` is expected, reflexive.
    fn is_subtype(&self, sub: &Type, sup: &Type) -> bool;

    fn case_of<'v>(&self, value: &'v Value) -> Option<&'v CaseValue> {
        value.as_case()
    }

    /// Arity of a tuple value, `None` when the value is not a tuple.
    fn shape_of(&self, value: &Value) -> Option<usize> {
        self.components(value).map(<[Value]>::len)
    }

    fn components<'v>(&self, value: &'v Value) -> Option<&'v [Value]> {
        value.as_tuple()
    }

    /// View of `value` as `target`, called once `value` is known to conform to it.
    fn reinterpret<'v>(
        &self,
        value: &'v Value,
        _target: &Type,
    ) -> Result<Cow<'v, Value>, MatchEvaluationError> {
        Ok(Cow::Borrowed(value))
    }
}

/// Oracle for the builtin value model with a nominal supertype graph registered by the host.
#[derive(Debug, Clone, Default)]
pub struct BuiltinOracle {
    known_types: FxHashSet<String>,
    supertypes: FxHashMap<String, Vec<String>>,
}

impl BuiltinOracle {
    pub fn new() -> Self {
        let mut oracle = Self::default();
        oracle.register_type(OPTIONAL_TYPE_NAME);
        oracle
    }

    pub fn register_type(&mut self, name: impl Into<String>) {
        self.known_types.insert(name.into());
    }

    /// Registers `sub` as a direct subtype of `sup`, both become known types.
    pub fn register_supertype(&mut self, sub: impl Into<String>, sup: impl Into<String>) {
        let (sub, sup) = (sub.into(), sup.into());
        self.known_types.insert(sub.clone());
        self.known_types.insert(sup.clone());
        self.supertypes.entry(sub).or_default().push(sup);
    }

    pub fn with_type(mut self, name: impl Into<String>) -> Self {
        self.register_type(name);
        self
    }

    pub fn with_supertype(mut self, sub: impl Into<String>, sup: impl Into<String>) -> Self {
        self.register_supertype(sub, sup);
        self
    }

    fn is_nominal_subtype(&self, sub: &str, sup: &str) -> bool {
        let mut visited = FxHashSet::default();
        let mut stack = vec![sub];

        while let Some(name) = stack.pop() {
            if same_nominal(name, sup) {
                return true;
            }
            if !visited.insert(name) {
                continue;
            }
            if let Some(parents) = self.supertypes.get(name) {
                stack.extend(parents.iter().map(String::as_str));
            }
        }

        false
    }
}

/// `Geometry.Shape` and `Shape` name the same type.
fn same_nominal(left: &str, right: &str) -> bool {
    fn qualifies(path: &str, name: &str) -> bool {
        path.strip_suffix(name)
            .is_some_and(|prefix| prefix.ends_with('.'))
    }

    left == right || qualifies(left, right) || qualifies(right, left)
}

impl TypeOracle for BuiltinOracle {
    fn resolve(&self, type_ref: &TypeRef) -> Result<Type, MatchEvaluationError> {
        Ok(match type_ref {
            TypeRef::Named(name) => {
                if let Some(builtin) = BUILTIN_TYPES.get(name.as_str()) {
                    builtin.clone()
                } else if self.known_types.contains(name) {
                    Type::Custom(name.clone())
                } else {
                    return Err(evaluation_fault!(TypeOracle, "unknown type {name:?}"));
                }
            }
            TypeRef::Tuple(items) => Type::Tuple(
                items
                    .iter()
                    .map(|item| self.resolve(item))
                    .collect::<Result<_, _>>()?,
            ),
            TypeRef::Optional(inner) => Type::Optional(Box::new(self.resolve(inner)?)),
        })
    }

    fn dynamic_type(&self, value: &Value) -> Result<Type, MatchEvaluationError> {
        Ok(match value {
            Value::Integer(_) => Type::Integer,
            Value::Float(_) => Type::Float,
            Value::Boolean(_) => Type::Boolean,
            Value::String(_) => Type::String,
            Value::Tuple(items) => Type::Tuple(
                items
                    .iter()
                    .map(|item| self.dynamic_type(item))
                    .collect::<Result<_, _>>()?,
            ),
            Value::Range(RangeValue(from, ..)) => Type::Range(Box::new(self.dynamic_type(from)?)),
            Value::Case(case) if case.enum_name == OPTIONAL_TYPE_NAME => {
                match (case.case.as_str(), case.payload.as_slice()) {
                    (OPTIONAL_SOME_CASE, [payload]) => {
                        Type::Optional(Box::new(self.dynamic_type(payload)?))
                    }
                    // nil fits any optional
                    _ => Type::Optional(Box::new(Type::Any)),
                }
            }
            Value::Case(case) => Type::Custom(case.enum_name.clone()),
            Value::Object(object) => Type::Custom(object.class.clone()),
        })
    }

    fn is_subtype(&self, sub: &Type, sup: &Type) -> bool {
        if sub == sup || *sup == Type::Any {
            return true;
        }

        match (sub, sup) {
            (Type::Tuple(sub_items), Type::Tuple(sup_items)) => {
                sub_items.len() == sup_items.len()
                    && sub_items
                        .iter()
                        .zip(sup_items.iter())
                        .all(|(sub, sup)| self.is_subtype(sub, sup))
            }
            (Type::Optional(sub), Type::Optional(sup)) => {
                **sub == Type::Any || self.is_subtype(sub, sup)
            }
            // bare `Optional` names the enum itself
            (Type::Optional(_), Type::Custom(name)) => name == OPTIONAL_TYPE_NAME,
            (Type::Range(sub), Type::Range(sup)) => self.is_subtype(sub, sup),
            (Type::Custom(sub), Type::Custom(sup)) => self.is_nominal_subtype(sub, sup),
            _ => false,
        }
    }
}
