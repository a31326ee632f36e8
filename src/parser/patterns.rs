use std::fmt::Display;

use rustc_hash::FxHashSet;

use crate::{
    dbg_line,
    shared::{errors::DuplicateBindingError, types::TypeRef},
};

use super::Expression;

pub const OPTIONAL_TYPE_NAME: &str = "Optional";
pub const OPTIONAL_SOME_CASE: &str = "some";
pub const OPTIONAL_NONE_CASE: &str = "none";

/// Where a pattern is being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternContext {
    /// Declarations and loop variables, only irrefutable patterns are allowed
    BindingOnly,
    /// Case clauses, anything goes
    FullMatch,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumCasePattern {
    pub qualifier: Option<String>, // Shape in Shape.circle
    pub case: String,
    pub payload: Option<Box<Pattern>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Wildcard,           // _
    Identifier(String), // x

    ValueBinding(Box<Pattern>, bool), // let x, var x (inner, mutable)

    Tuple(Vec<Pattern>), // (a, b, c)

    EnumCase(EnumCasePattern), // Shape.circle(r), .none
    Optional(Box<Pattern>),    // x?

    Is(TypeRef),              // is Int
    As(Box<Pattern>, TypeRef), // x as Int

    Expression(Expression), // 1...5

    Typed(Box<Pattern>, TypeRef), // x: Int
}

impl Pattern {
    pub fn identifier(name: impl Into<String>) -> Self {
        Pattern::Identifier(name.into())
    }

    pub fn binding(name: impl Into<String>, mutable: bool) -> Self {
        Pattern::ValueBinding(Box::new(Pattern::identifier(name)), mutable)
    }

    /// Single element tuples are transparent, `(a)` is just `a`.
    pub fn tuple(mut items: Vec<Pattern>) -> Self {
        if items.len() == 1 {
            items.remove(0)
        } else {
            Pattern::Tuple(items)
        }
    }

    pub fn enum_case(
        qualifier: Option<&str>,
        case: impl Into<String>,
        payload: Option<Pattern>,
    ) -> Self {
        Pattern::EnumCase(EnumCasePattern {
            qualifier: qualifier.map(str::to_string),
            case: case.into(),
            payload: payload.map(Box::new),
        })
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Pattern::Optional(Box::new(Pattern::identifier(name)))
    }

    pub fn is_refutable(&self) -> bool {
        match self {
            Pattern::Wildcard | Pattern::Identifier(_) => false,
            Pattern::ValueBinding(inner, _) | Pattern::Typed(inner, _) => inner.is_refutable(),
            Pattern::Tuple(items) => items.iter().any(Pattern::is_refutable),
            Pattern::EnumCase(_)
            | Pattern::Optional(_)
            | Pattern::Is(_)
            | Pattern::As(..)
            | Pattern::Expression(_) => true,
        }
    }

    /// Names bound by this pattern, left to right.
    pub fn bindings(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_bindings(&mut names);
        names
    }

    fn collect_bindings<'p>(&'p self, names: &mut Vec<&'p str>) {
        match self {
            Pattern::Identifier(name) => names.push(name),
            Pattern::ValueBinding(inner, _)
            | Pattern::Optional(inner)
            | Pattern::As(inner, _)
            | Pattern::Typed(inner, _) => inner.collect_bindings(names),
            Pattern::Tuple(items) => {
                for item in items {
                    item.collect_bindings(names);
                }
            }
            Pattern::EnumCase(EnumCasePattern { payload, .. }) => {
                if let Some(payload) = payload {
                    payload.collect_bindings(names);
                }
            }
            Pattern::Wildcard | Pattern::Is(_) | Pattern::Expression(_) => {}
        }
    }

    /// Rejects hand-built patterns binding one name twice.
    /// Parsed patterns are already checked by the parser.
    pub fn check_bindings(&self) -> Result<(), DuplicateBindingError> {
        let mut seen = FxHashSet::default();
        for name in self.bindings() {
            if !seen.insert(name) {
                return Err(DuplicateBindingError::without_source(dbg_line!(), name));
            }
        }
        Ok(())
    }
}

impl Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pattern::Wildcard => write!(f, "_"),
            Pattern::Identifier(name) => write!(f, "{name}"),
            Pattern::ValueBinding(inner, true) => write!(f, "var {inner}"),
            Pattern::ValueBinding(inner, false) => write!(f, "let {inner}"),
            Pattern::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            Pattern::EnumCase(EnumCasePattern {
                qualifier,
                case,
                payload,
            }) => {
                if let Some(qualifier) = qualifier {
                    write!(f, "{qualifier}")?;
                }
                write!(f, ".{case}")?;
                match payload.as_deref() {
                    Some(payload @ Pattern::Tuple(_)) => write!(f, "{payload}"),
                    Some(payload) => write!(f, "({payload})"),
                    None => Ok(()),
                }
            }
            Pattern::Optional(inner) => write!(f, "{inner}?"),
            Pattern::Is(type_ref) => write!(f, "is {type_ref}"),
            Pattern::As(inner, type_ref) => write!(f, "{inner} as {type_ref}"),
            Pattern::Expression(expression) => write!(f, "{expression}"),
            Pattern::Typed(inner, type_ref) => write!(f, "{inner}: {type_ref}"),
        }
    }
}
