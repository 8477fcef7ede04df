use crate::error::RuntimeError;
use crate::interpreter::Interpreter;
use crate::value::callable::Callable;
use crate::value::function::LoxFunction;
use crate::value::instance::LoxInstance;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// The runtime representation of a class declaration (spec §3). Methods are
/// stored unbound; binding happens per-lookup in `LoxInstance::get` so every
/// access to `instance.method` produces a fresh bound function.
#[derive(Debug)]
pub struct LoxClass {
    pub name: String,
    pub superclass: Option<Rc<LoxClass>>,
    pub methods: HashMap<String, Rc<LoxFunction>>,
}

impl LoxClass {
    pub fn new(name: String, superclass: Option<Rc<LoxClass>>, methods: HashMap<String, Rc<LoxFunction>>) -> Self {
        LoxClass { name, superclass, methods }
    }

    /// Walks the inheritance chain outward; a subclass method of the same
    /// name shadows the superclass's.
    pub fn find_method(&self, name: &str) -> Option<Rc<LoxFunction>> {
        if let Some(method) = self.methods.get(name) {
            return Some(Rc::clone(method));
        }
        self.superclass.as_ref().and_then(|sup| sup.find_method(name))
    }

    /// The arity of `init` if present, else zero (spec §4.5, "Class instantiation").
    pub fn arity(&self) -> usize {
        self.find_method("init").map_or(0, |init| init.arity())
    }

    /// Calling a class constructs an instance and, if `init` exists, runs it
    /// bound to that instance before returning the instance itself (spec
    /// §4.5). Takes `self` as an `Rc` because the new instance holds a
    /// reference back to its class.
    pub fn instantiate(self: &Rc<LoxClass>, interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value, RuntimeError> {
        let instance = Rc::new(RefCell::new(LoxInstance::new(Rc::clone(self))));
        let instance_value = Value::Instance(instance);
        if let Some(initializer) = self.find_method("init") {
            initializer.bind(instance_value.clone()).call(interpreter, arguments)?;
        }
        Ok(instance_value)
    }
}
