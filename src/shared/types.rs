use std::fmt::Display;

/// Type as it was written in a pattern, e.g. `Int`, `Shape.Kind`, `(Int, String)` or `Int?`.
///
/// The parser never resolves these, that's the job of the [`TypeOracle`](crate::interpreter::TypeOracle).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Named(String),          // Int, Shape.Kind
    Tuple(Vec<TypeRef>),    // (Int, String)
    Optional(Box<TypeRef>), // Int?
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }
}

impl Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeRef::Named(name) => write!(f, "{name}"),
            TypeRef::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            TypeRef::Optional(inner) => write!(f, "{inner}?"),
        }
    }
}

/// Resolved runtime type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Integer,
    Float,
    Boolean,
    String,

    Range(Box<Type>), // bound type

    Tuple(Box<[Type]>),
    Optional(Box<Type>),

    // Custom type like class, struct or enum
    Custom(String), // type_name

    // Top type, everything is a subtype of it
    Any,
}

impl Type {
    pub fn unit() -> Self {
        Type::Tuple(Box::new([]))
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Integer => write!(f, "Int"),
            Type::Float => write!(f, "Double"),
            Type::Boolean => write!(f, "Bool"),
            Type::String => write!(f, "String"),
            Type::Range(bound) => write!(f, "Range<{bound}>"),
            Type::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            Type::Optional(inner) => write!(f, "{inner}?"),
            Type::Custom(name) => write!(f, "{name}"),
            Type::Any => write!(f, "Any"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_ref_display() {
        let type_ref = TypeRef::Optional(Box::new(TypeRef::Tuple(vec![
            TypeRef::named("Int"),
            TypeRef::named("Shape.Kind"),
        ])));
        assert_eq!(type_ref.to_string(), "(Int, Shape.Kind)?");
    }

    #[test]
    fn type_display() {
        assert_eq!(Type::unit().to_string(), "()");
        assert_eq!(
            Type::Range(Box::new(Type::Integer)).to_string(),
            "Range<Int>"
        );
    }
}
