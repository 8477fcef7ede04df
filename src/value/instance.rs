use crate::error::RuntimeError;
use crate::token::Token;
use crate::value::class::LoxClass;
use crate::value::Value;
use std::collections::HashMap;
use std::fmt::Display;
use std::rc::Rc;

/// The runtime representation of an instance of a Lox class (spec §3).
/// Fields are per-instance; methods live on the class and are looked up
/// through the inheritance chain and bound on access.
#[derive(Debug)]
pub struct LoxInstance {
    pub class: Rc<LoxClass>,
    fields: HashMap<String, Value>,
}

impl Display for LoxInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} instance", self.class.name)
    }
}

impl LoxInstance {
    pub fn new(class: Rc<LoxClass>) -> Self {
        LoxInstance { class, fields: HashMap::new() }
    }

    /// Fields shadow methods of the same name (spec §4.5, "Get"): a field
    /// hit returns immediately, only a miss falls through to the method
    /// chain, where a hit is bound to `self_value` before being returned.
    pub fn get(&self, name: &Token, self_value: Value) -> Result<Value, RuntimeError> {
        if let Some(value) = self.fields.get(&name.lexeme) {
            return Ok(value.clone());
        }
        if let Some(method) = self.class.find_method(&name.lexeme) {
            return Ok(Value::Function(Rc::new(method.bind(self_value))));
        }
        Err(RuntimeError::new(name.clone(), format!("Undefined property '{}'.", name.lexeme)))
    }

    pub fn set(&mut self, name: &Token, value: Value) {
        self.fields.insert(name.lexeme.clone(), value);
    }
}
