use crate::lib::object::Object;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Environments are shared between a closure and every call frame created
/// from it, so they live behind `Rc<RefCell<..>>`; cloning the handle shares
/// the scope, it never duplicates it.
pub type Env = Rc<RefCell<Environment>>;

/// A chained lexical scope: local bindings plus a reference to the enclosing
/// scope, if any.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Environment {
    store: HashMap<String, Object>,
    outer: Option<Env>,
}

impl Environment {
    /// A fresh global scope. The REPL creates one per session and keeps it
    /// alive across inputs.
    pub fn new() -> Env {
        Rc::new(RefCell::new(Environment::default()))
    }

    /// A child scope for a function call; `outer` is the function's captured
    /// environment.
    pub fn new_enclosed(outer: Env) -> Env {
        Rc::new(RefCell::new(Environment {
            store: HashMap::new(),
            outer: Some(outer),
        }))
    }

    /// Looks up `name` locally, then up the outer chain.
    pub fn get(&self, name: &str) -> Option<Object> {
        match self.store.get(name) {
            Some(value) => Some(value.clone()),
            None => self
                .outer
                .as_ref()
                .and_then(|outer| outer.borrow().get(name)),
        }
    }

    /// Binds `name` in the local scope only (defines or shadows; never
    /// mutates an outer scope) and returns the bound value.
    pub fn set(&mut self, name: impl Into<String>, value: Object) -> Object {
        self.store.insert(name.into(), value.clone());
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_get_walks_the_outer_chain() -> Result<()> {
        let global = Environment::new();
        global.borrow_mut().set("x", Object::Integer(1));
        let inner = Environment::new_enclosed(Rc::clone(&global));
        let innermost = Environment::new_enclosed(Rc::clone(&inner));

        assert_eq!(innermost.borrow().get("x"), Some(Object::Integer(1)));
        assert_eq!(innermost.borrow().get("missing"), None);
        Ok(())
    }

    #[test]
    fn test_set_shadows_without_touching_outer() -> Result<()> {
        let global = Environment::new();
        global.borrow_mut().set("x", Object::Integer(1));
        let inner = Environment::new_enclosed(Rc::clone(&global));
        inner.borrow_mut().set("x", Object::Integer(2));

        assert_eq!(inner.borrow().get("x"), Some(Object::Integer(2)));
        assert_eq!(global.borrow().get("x"), Some(Object::Integer(1)));
        Ok(())
    }

    #[test]
    fn test_sibling_scopes_observe_shared_mutation() -> Result<()> {
        let shared = Environment::new();
        let a = Environment::new_enclosed(Rc::clone(&shared));
        let b = Environment::new_enclosed(Rc::clone(&shared));

        shared.borrow_mut().set("counter", Object::Integer(41));
        assert_eq!(a.borrow().get("counter"), Some(Object::Integer(41)));
        assert_eq!(b.borrow().get("counter"), Some(Object::Integer(41)));
        Ok(())
    }
}
