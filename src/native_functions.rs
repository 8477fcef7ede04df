use crate::environment::Env;
use crate::value::callable::{clock, NativeFunction};
use crate::value::Value;
use std::rc::Rc;

/// Populates the global environment with the single built-in the spec
/// names: `clock()` (spec §4.5, "Native function").
pub fn define_globals(globals: &Env) {
    globals.borrow_mut().define(
        "clock".to_string(),
        Value::Native(Rc::new(NativeFunction { name: "clock", arity: 0, func: clock })),
    );
}
