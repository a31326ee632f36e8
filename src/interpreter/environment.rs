use rustc_hash::FxHashMap;

use crate::{dbg_line, shared::errors::DuplicateBindingError};

use super::values::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: String,
    pub value: Value,
    pub mutable: bool,
}

/// Position to roll an [`Environment`] back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

/// Names bound by a match, in the order they were bound.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    bindings: Vec<Binding>,
    index: FxHashMap<String, usize>,
}

impl PartialEq for Environment {
    fn eq(&self, other: &Self) -> bool {
        self.bindings == other.bindings
    }
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a binding, refusing names that are already bound.
    pub fn bind(
        &mut self,
        name: impl Into<String>,
        value: Value,
        mutable: bool,
    ) -> Result<(), DuplicateBindingError> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(DuplicateBindingError::without_source(dbg_line!(), name));
        }

        self.push(Binding {
            name,
            value,
            mutable,
        });
        Ok(())
    }

    /// Adds a binding without the duplicate check, names are unique per pattern.
    pub(crate) fn push(&mut self, binding: Binding) {
        debug_assert!(
            !self.index.contains_key(&binding.name),
            "{} is already bound",
            binding.name
        );
        self.index.insert(binding.name.clone(), self.bindings.len());
        self.bindings.push(binding);
    }

    /// Replaces an existing binding in place, or appends a new one.
    fn shadow(&mut self, binding: Binding) {
        match self.index.get(&binding.name) {
            Some(&i) => self.bindings[i] = binding,
            None => self.push(binding),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.binding(name).map(|binding| &binding.value)
    }

    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.index.get(name).map(|&i| &self.bindings[i])
    }

    pub fn is_mutable(&self, name: &str) -> Option<bool> {
        self.binding(name).map(|binding| binding.mutable)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(|binding| binding.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.bindings.len())
    }

    /// Drops every binding made after `checkpoint`.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        let Checkpoint(len) = checkpoint;
        if len >= self.bindings.len() {
            return;
        }

        for binding in self.bindings.drain(len..) {
            self.index.remove(&binding.name);
        }
    }

    /// Merges all bindings into an enclosing scope at once, shadowing names it already has.
    pub fn commit_into(self, scope: &mut Environment) {
        for binding in self.bindings {
            scope.shadow(binding);
        }
    }
}

impl<'e> IntoIterator for &'e Environment {
    type Item = &'e Binding;
    type IntoIter = std::slice::Iter<'e, Binding>;

    fn into_iter(self) -> Self::IntoIter {
        self.bindings.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn bind_keeps_order_and_mutability() {
        let mut env = Environment::new();
        env.bind("b", Value::Integer(2), false).unwrap();
        env.bind("a", Value::Integer(1), true).unwrap();

        assert_eq!(env.names().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(env.get("a"), Some(&Value::Integer(1)));
        assert_eq!(env.is_mutable("a"), Some(true));
        assert_eq!(env.is_mutable("b"), Some(false));
        assert_eq!(env.get("c"), None);
    }

    #[test]
    fn bind_rejects_duplicates() {
        let mut env = Environment::new();
        env.bind("x", Value::Integer(1), false).unwrap();

        let error = env.bind("x", Value::Integer(2), true).unwrap_err();
        assert_eq!(error.name, "x");
        assert_eq!(env.get("x"), Some(&Value::Integer(1)));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "x is already bound")]
    fn push_refuses_duplicates_in_debug_builds() {
        let mut env = Environment::new();
        for value in [1, 2] {
            env.push(Binding {
                name: "x".to_string(),
                value: Value::Integer(value),
                mutable: false,
            });
        }
    }

    #[test]
    fn rollback_discards_later_bindings() {
        let mut env = Environment::new();
        env.bind("x", Value::Integer(1), false).unwrap();

        let checkpoint = env.checkpoint();
        env.bind("y", Value::Integer(2), false).unwrap();
        env.bind("z", Value::Integer(3), false).unwrap();
        env.rollback(checkpoint);

        assert_eq!(env.len(), 1);
        assert!(!env.contains("y"));
        assert!(!env.contains("z"));
        env.bind("y", Value::Integer(4), false).unwrap();
        assert_eq!(env.get("y"), Some(&Value::Integer(4)));
    }

    #[test]
    fn commit_shadows_enclosing_scope() {
        let mut scope = Environment::new();
        scope.bind("x", Value::Integer(1), true).unwrap();
        scope.bind("outer", Value::Boolean(true), false).unwrap();

        let mut matched = Environment::new();
        matched.bind("x", Value::Integer(10), false).unwrap();
        matched.bind("y", Value::Integer(20), false).unwrap();
        matched.commit_into(&mut scope);

        assert_eq!(scope.len(), 3);
        assert_eq!(scope.get("x"), Some(&Value::Integer(10)));
        assert_eq!(scope.is_mutable("x"), Some(false));
        assert_eq!(scope.get("y"), Some(&Value::Integer(20)));
        assert_eq!(scope.get("outer"), Some(&Value::Boolean(true)));
    }
}
