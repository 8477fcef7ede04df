pub mod callable;
pub mod class;
pub mod function;
pub mod instance;

use crate::error::RuntimeError;
use crate::interpreter::Interpreter;
use crate::token::Token;
use crate::value::callable::{Callable, NativeFunction};
use crate::value::class::LoxClass;
use crate::value::function::LoxFunction;
use crate::value::instance::LoxInstance;
use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

/// The runtime value type (spec §3). Function/Class/Instance are `Rc`-wrapped
/// because the same function or class value is shared across every closure,
/// binding and environment slot that refers to it, and equality between two
/// callables is by identity (`Rc::ptr_eq`), not structural.
#[derive(Clone, Debug)]
pub enum Value {
    Nil,
    Boolean(bool),
    Number(f64),
    String(String),
    Function(Rc<LoxFunction>),
    Class(Rc<LoxClass>),
    Instance(Rc<RefCell<LoxInstance>>),
    Native(Rc<NativeFunction>),
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s}"),
            Value::Function(func) => write!(f, "<fn {}>", func.name()),
            Value::Class(class) => write!(f, "{}", class.name),
            Value::Instance(instance) => write!(f, "{}", instance.borrow()),
            Value::Native(_) => write!(f, "<native fn>"),
        }
    }
}

impl Value {
    /// Only `nil` and `false` are falsy; everything else, including `0` and
    /// `""`, is truthy (spec §4.5, "Truthiness").
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Boolean(false))
    }

    /// `==`/`!=` never error (spec §4.5): nil equals only nil, differently
    /// typed values are unequal, and callables compare by identity.
    pub fn is_equal(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Dispatches a call expression's callee (spec §4.5, "Call"). Only
    /// Function/Class/Native are callable; anything else is a runtime error
    /// at the call site's paren token.
    pub fn call(&self, interpreter: &mut Interpreter, paren: &Token, arguments: Vec<Value>) -> Result<Value, RuntimeError> {
        let arity = match self {
            Value::Function(f) => f.arity(),
            Value::Class(c) => c.arity(),
            Value::Native(n) => n.arity,
            _ => return Err(RuntimeError::new(paren.clone(), "Can only call functions and classes.".to_string())),
        };
        if arguments.len() != arity {
            return Err(RuntimeError::new(
                paren.clone(),
                format!("Expected {arity} arguments but got {}.", arguments.len()),
            ));
        }
        match self {
            Value::Function(f) => f.call(interpreter, arguments),
            Value::Class(c) => c.instantiate(interpreter, arguments),
            Value::Native(n) => Ok((n.func)(interpreter, arguments)),
            _ => unreachable!(),
        }
    }
}
