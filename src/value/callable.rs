use crate::error::RuntimeError;
use crate::interpreter::Interpreter;
use crate::value::Value;
use std::time::{SystemTime, UNIX_EPOCH};

/// Anything invocable with `(...)`. Implemented by `LoxFunction` and
/// `LoxClass` (class-call constructs an instance); native functions don't
/// need the trait since there's only ever one of them.
pub trait Callable {
    fn arity(&self) -> usize;
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value, RuntimeError>;
}

/// A builtin exposed as a global binding. The only one spec'd is `clock`;
/// the shape exists so adding another later doesn't need a new `Value`
/// variant.
#[derive(Debug)]
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub func: fn(&mut Interpreter, Vec<Value>) -> Value,
}

pub fn clock(_interpreter: &mut Interpreter, _args: Vec<Value>) -> Value {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before the epoch")
        .as_secs_f64();
    Value::Number(secs)
}
