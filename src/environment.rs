use crate::error::RuntimeError;
use crate::token::Token;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A lexically nested name→value frame (spec §4.4). Shared via `Rc<RefCell<_>>`
/// because closures capture the environment active at declaration time and
/// several closures may share the same enclosing frame.
pub type Env = Rc<RefCell<Environment>>;

#[derive(Debug)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<Env>,
}

impl Environment {
    pub fn global() -> Env {
        Rc::new(RefCell::new(Environment { values: HashMap::new(), enclosing: None }))
    }

    /// Creates a new frame nested inside `enclosing`.
    pub fn nested(enclosing: &Env) -> Env {
        Rc::new(RefCell::new(Environment {
            values: HashMap::new(),
            enclosing: Some(Rc::clone(enclosing)),
        }))
    }

    /// A new variable is always declared in the innermost frame; redefining
    /// an existing name in the same frame is allowed (the resolver is what
    /// forbids shadowing within a single scope, not the environment).
    pub fn define(&mut self, name: String, value: Value) {
        self.values.insert(name, value);
    }

    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = self.values.get(&name.lexeme) {
            return Ok(value.clone());
        }
        match &self.enclosing {
            Some(parent) => parent.borrow().get(name),
            None => Err(undefined(name)),
        }
    }

    pub fn assign(&mut self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        if self.values.contains_key(&name.lexeme) {
            self.values.insert(name.lexeme.clone(), value);
            return Ok(());
        }
        match &self.enclosing {
            Some(parent) => parent.borrow_mut().assign(name, value),
            None => Err(undefined(name)),
        }
    }

    /// Walks exactly `distance` enclosing links and returns that frame. The
    /// resolver guarantees `distance` is correct, so a missing link here
    /// would be an interpreter bug, not a Lox program error.
    fn ancestor(env: &Env, distance: usize) -> Env {
        let mut current = Rc::clone(env);
        for _ in 0..distance {
            let parent = current
                .borrow()
                .enclosing
                .clone()
                .expect("resolver-reported depth exceeds environment chain length");
            current = parent;
        }
        current
    }

    pub fn get_at(env: &Env, distance: usize, name: &str) -> Value {
        Environment::ancestor(env, distance)
            .borrow()
            .values
            .get(name)
            .cloned()
            .expect("resolver-reported binding missing from its resolved frame")
    }

    pub fn assign_at(env: &Env, distance: usize, name: &Token, value: Value) {
        Environment::ancestor(env, distance)
            .borrow_mut()
            .values
            .insert(name.lexeme.clone(), value);
    }
}

fn undefined(name: &Token) -> RuntimeError {
    RuntimeError::new(name.clone(), format!("Undefined variable '{}'.", name.lexeme))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenType;

    fn token(lexeme: &str) -> Token {
        Token::new(TokenType::IDENTIFIER, lexeme.to_string(), None, 1)
    }

    #[test]
    fn shadowing_does_not_affect_outer_binding() {
        let global = Environment::global();
        global.borrow_mut().define("a".into(), Value::String("global".into()));

        let block = Environment::nested(&global);
        block.borrow_mut().define("a".into(), Value::String("block".into()));

        assert_eq!(global.borrow().get(&token("a")).unwrap().to_string(), "global");
        assert_eq!(block.borrow().get(&token("a")).unwrap().to_string(), "block");
    }

    #[test]
    fn get_at_reads_exactly_the_resolved_frame() {
        let global = Environment::global();
        global.borrow_mut().define("a".into(), Value::String("global".into()));
        let inner = Environment::nested(&global);

        assert_eq!(Environment::get_at(&inner, 1, "a").to_string(), "global");
    }

    #[test]
    fn assign_walks_to_the_defining_frame() {
        let global = Environment::global();
        global.borrow_mut().define("a".into(), Value::Number(1.0));
        let inner = Environment::nested(&global);

        inner.borrow_mut().assign(&token("a"), Value::Number(2.0)).unwrap();
        assert_eq!(global.borrow().get(&token("a")).unwrap().to_string(), "2");
    }

    #[test]
    fn get_undefined_variable_errors() {
        let global = Environment::global();
        assert!(global.borrow().get(&token("missing")).is_err());
    }
}
