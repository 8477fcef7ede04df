use crate::environment::{Env, Environment};
use crate::error::{RuntimeError, Unwind};
use crate::interpreter::Interpreter;
use crate::stmt::FunctionDecl;
use crate::value::callable::Callable;
use crate::value::Value;
use std::rc::Rc;

/// The runtime representation of a function or method declaration (spec
/// §3, "LoxFunction"). `closure` is the environment active when the
/// declaration was evaluated, not when it's called — that's what makes
/// closures close over their lexical scope instead of the caller's.
#[derive(Debug)]
pub struct LoxFunction {
    pub declaration: Rc<FunctionDecl>,
    pub closure: Env,
    pub is_initializer: bool,
}

impl LoxFunction {
    pub fn new(declaration: Rc<FunctionDecl>, closure: Env, is_initializer: bool) -> Self {
        LoxFunction { declaration, closure, is_initializer }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    /// Returns a new function identical to `self` except its closure is a
    /// one-entry frame binding `this` to `instance`, parented on the
    /// original closure. `get_at(0, "this")` inside the body then always
    /// finds the receiver, which is also why an initializer's implicit
    /// return of `this` reads from depth 0 (spec §4.5, "Method binding").
    pub fn bind(&self, instance: Value) -> LoxFunction {
        let env = Environment::nested(&self.closure);
        env.borrow_mut().define("this".to_string(), instance);
        LoxFunction::new(Rc::clone(&self.declaration), env, self.is_initializer)
    }
}

impl Callable for LoxFunction {
    fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value, RuntimeError> {
        let call_env = Environment::nested(&self.closure);
        for (param, arg) in self.declaration.params.iter().zip(arguments) {
            call_env.borrow_mut().define(param.lexeme.clone(), arg);
        }

        match interpreter.execute_block(&self.declaration.body, call_env) {
            Ok(()) => {
                if self.is_initializer {
                    Ok(Environment::get_at(&self.closure, 0, "this"))
                } else {
                    Ok(Value::Nil)
                }
            }
            Err(Unwind::Return(value)) => {
                if self.is_initializer {
                    Ok(Environment::get_at(&self.closure, 0, "this"))
                } else {
                    Ok(value)
                }
            }
            Err(Unwind::Error(err)) => Err(err),
        }
    }
}
