use crate::environment::{Env, Environment};
use crate::error::{Diagnostics, RuntimeError, Unwind};
use crate::expr::Expr;
use crate::native_functions;
use crate::stmt::Stmt;
use crate::token::{Literal, TokenType};
use crate::value::class::LoxClass;
use crate::value::function::LoxFunction;
use crate::value::Value;
use std::collections::HashMap;
use std::rc::Rc;

/// The tree-walking evaluator (spec §4.5). Holds the environment chain's
/// current frame and the resolver's expression→depth map; everything else
/// (the AST) is borrowed per call, never owned here.
pub struct Interpreter {
    globals: Env,
    environment: Env,
    locals: HashMap<*const Expr, usize>,
}

impl Interpreter {
    pub fn new() -> Self {
        let globals = Environment::global();
        native_functions::define_globals(&globals);
        Interpreter { environment: Rc::clone(&globals), globals, locals: HashMap::new() }
    }

    /// Merges in the depth map produced by a resolver pass over statements
    /// about to be interpreted. Additive, not a replace: the REPL resolves
    /// and interprets one line at a time, and a function closed over in an
    /// earlier line must keep resolving the variable references in its body
    /// after later lines have added their own entries (spec §6, "REPL...
    /// keeps the interpreter+resolver state so definitions persist").
    pub fn add_locals(&mut self, locals: HashMap<*const Expr, usize>) {
        self.locals.extend(locals);
    }

    /// Runs a program's top-level statements. Stops at the first runtime
    /// error, reporting it through `diagnostics` (spec §7: only runtime
    /// errors abort evaluation; static errors are checked before this is
    /// ever called).
    pub fn interpret(&mut self, statements: &[Stmt], diagnostics: &mut Diagnostics) {
        for stmt in statements {
            match self.execute(stmt) {
                Ok(()) => {}
                Err(Unwind::Error(err)) => {
                    diagnostics.runtime_error(&err);
                    return;
                }
                // A top-level `return` can't parse past the resolver's static
                // check, but nothing stops us from just ignoring it here too.
                Err(Unwind::Return(_)) => return,
            }
        }
    }

    pub fn execute_block(&mut self, statements: &[Stmt], env: Env) -> Result<(), Unwind> {
        let previous = std::mem::replace(&mut self.environment, env);
        let result = self.run_all(statements);
        self.environment = previous;
        result
    }

    fn run_all(&mut self, statements: &[Stmt]) -> Result<(), Unwind> {
        for stmt in statements {
            self.execute(stmt)?;
        }
        Ok(())
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<(), Unwind> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
            }
            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                println!("{value}");
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                self.environment.borrow_mut().define(name.lexeme.clone(), value);
            }
            Stmt::Block(statements) => {
                let env = Environment::nested(&self.environment);
                self.execute_block(statements, env)?;
            }
            Stmt::If { condition, then_branch, else_branch } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)?;
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)?;
                }
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    self.execute(body)?;
                }
            }
            Stmt::Function(decl) => {
                let function = LoxFunction::new(Rc::clone(decl), Rc::clone(&self.environment), false);
                self.environment
                    .borrow_mut()
                    .define(decl.name.lexeme.clone(), Value::Function(Rc::new(function)));
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                return Err(Unwind::Return(value));
            }
            Stmt::Class { name, superclass, methods } => {
                self.execute_class(name, superclass.as_ref(), methods)?;
            }
        }
        Ok(())
    }

    fn execute_class(
        &mut self,
        name: &crate::token::Token,
        superclass: Option<&Expr>,
        methods: &[Rc<crate::stmt::FunctionDecl>],
    ) -> Result<(), Unwind> {
        let superclass_class = match superclass {
            Some(expr) => {
                let value = self.evaluate(expr)?;
                match value {
                    Value::Class(class) => Some(class),
                    _ => {
                        let token = superclass_token(expr);
                        return Err(RuntimeError::new(token, "Superclass must be a class.".to_string()).into());
                    }
                }
            }
            None => None,
        };

        self.environment.borrow_mut().define(name.lexeme.clone(), Value::Nil);

        let enclosing_env = Rc::clone(&self.environment);
        if let Some(sup) = &superclass_class {
            let super_env = Environment::nested(&self.environment);
            super_env.borrow_mut().define("super".to_string(), Value::Class(Rc::clone(sup)));
            self.environment = super_env;
        }

        let mut method_map = HashMap::new();
        for method in methods {
            let is_initializer = method.name.lexeme == "init";
            let function = LoxFunction::new(Rc::clone(method), Rc::clone(&self.environment), is_initializer);
            method_map.insert(method.name.lexeme.clone(), Rc::new(function));
        }

        self.environment = enclosing_env;

        let class = LoxClass::new(name.lexeme.clone(), superclass_class, method_map);
        self.environment
            .borrow_mut()
            .assign(name, Value::Class(Rc::new(class)))
            .map_err(Unwind::Error)?;
        Ok(())
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Value, Unwind> {
        let value = match expr {
            Expr::Literal(literal) => match literal {
                Some(Literal::Number(n)) => Value::Number(*n),
                Some(Literal::Str(s)) => Value::String(s.clone()),
                None => Value::Nil,
            },
            Expr::Bool(b) => Value::Boolean(*b),
            Expr::Nil => Value::Nil,
            Expr::Grouping(inner) => self.evaluate(inner)?,
            Expr::Unary { operator, right } => {
                let right = self.evaluate(right)?;
                match operator.token_type {
                    TokenType::MINUS => match right {
                        Value::Number(n) => Value::Number(-n),
                        _ => return Err(RuntimeError::new(operator.clone(), "Operand must be a number.".to_string()).into()),
                    },
                    TokenType::BANG => Value::Boolean(!right.is_truthy()),
                    _ => unreachable!("scanner/parser never produce other unary operators"),
                }
            }
            Expr::Binary { left, operator, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                self.evaluate_binary(operator, left, right)?
            }
            Expr::Logical { left, operator, right } => {
                let left = self.evaluate(left)?;
                let is_or = operator.token_type == TokenType::OR;
                if (is_or && left.is_truthy()) || (!is_or && !left.is_truthy()) {
                    left
                } else {
                    self.evaluate(right)?
                }
            }
            Expr::Variable { name } => self.look_up_variable(name, expr)?,
            Expr::Assign { name, value } => {
                let value = self.evaluate(value)?;
                match self.locals.get(&(expr as *const Expr)) {
                    Some(&distance) => Environment::assign_at(&self.environment, distance, name, value.clone()),
                    None => self.globals.borrow_mut().assign(name, value.clone()).map_err(Unwind::Error)?,
                }
                value
            }
            Expr::Call { callee, paren, arguments } => {
                let callee = self.evaluate(callee)?;
                let mut args = Vec::with_capacity(arguments.len());
                for arg in arguments {
                    args.push(self.evaluate(arg)?);
                }
                callee.call(self, paren, args).map_err(Unwind::Error)?
            }
            Expr::Get { object, name } => {
                let object = self.evaluate(object)?;
                match object {
                    Value::Instance(instance) => {
                        let value = instance.borrow().get(name, Value::Instance(Rc::clone(&instance)));
                        value.map_err(Unwind::Error)?
                    }
                    _ => return Err(RuntimeError::new(name.clone(), "Only instances have properties.".to_string()).into()),
                }
            }
            Expr::Set { object, name, value } => {
                let object = self.evaluate(object)?;
                match object {
                    Value::Instance(instance) => {
                        let value = self.evaluate(value)?;
                        instance.borrow_mut().set(name, value.clone());
                        value
                    }
                    _ => return Err(RuntimeError::new(name.clone(), "Only instances have fields.".to_string()).into()),
                }
            }
            Expr::This { keyword } => self.look_up_variable(keyword, expr)?,
            Expr::Super { method, .. } => self.evaluate_super(expr, method)?,
        };
        Ok(value)
    }

    fn evaluate_binary(&self, operator: &crate::token::Token, left: Value, right: Value) -> Result<Value, Unwind> {
        use TokenType::*;
        let err = |msg: &str| RuntimeError::new(operator.clone(), msg.to_string()).into();
        Ok(match (operator.token_type, left, right) {
            (STAR, Value::Number(l), Value::Number(r)) => Value::Number(l * r),
            (SLASH, Value::Number(l), Value::Number(r)) => Value::Number(l / r),
            (MINUS, Value::Number(l), Value::Number(r)) => Value::Number(l - r),
            (PLUS, Value::Number(l), Value::Number(r)) => Value::Number(l + r),
            (PLUS, Value::String(l), Value::String(r)) => Value::String(l + &r),
            (PLUS, _, _) => return Err(err("Operands must be two numbers or two strings.")),
            (GREATER, Value::Number(l), Value::Number(r)) => Value::Boolean(l > r),
            (GREATER_EQUAL, Value::Number(l), Value::Number(r)) => Value::Boolean(l >= r),
            (LESS, Value::Number(l), Value::Number(r)) => Value::Boolean(l < r),
            (LESS_EQUAL, Value::Number(l), Value::Number(r)) => Value::Boolean(l <= r),
            (BANG_EQUAL, l, r) => Value::Boolean(!l.is_equal(&r)),
            (EQUAL_EQUAL, l, r) => Value::Boolean(l.is_equal(&r)),
            (STAR | SLASH | MINUS | GREATER | GREATER_EQUAL | LESS | LESS_EQUAL, _, _) => {
                return Err(err("Operands must be numbers."))
            }
            _ => unreachable!("scanner/parser never produce other binary operators"),
        })
    }

    fn look_up_variable(&self, name: &crate::token::Token, expr: &Expr) -> Result<Value, Unwind> {
        match self.locals.get(&(expr as *const Expr)) {
            Some(&distance) => Ok(Environment::get_at(&self.environment, distance, &name.lexeme)),
            None => self.globals.borrow().get(name).map_err(Unwind::Error),
        }
    }

    /// `super.method` resolves at the depth of the `Super` node itself, and
    /// the receiver one level shallower — the (d, d-1) invariant the
    /// resolver establishes by nesting the `this`-scope one level inside
    /// the `super`-scope (spec §4.5, "Super").
    fn evaluate_super(&self, expr: &Expr, method: &crate::token::Token) -> Result<Value, Unwind> {
        let distance = *self
            .locals
            .get(&(expr as *const Expr))
            .expect("resolver always resolves a well-formed Super expression");
        let superclass = match Environment::get_at(&self.environment, distance, "super") {
            Value::Class(class) => class,
            _ => unreachable!("'super' binding is always a class"),
        };
        let instance = Environment::get_at(&self.environment, distance - 1, "this");

        let bound = superclass
            .find_method(&method.lexeme)
            .ok_or_else(|| RuntimeError::new(method.clone(), format!("Undefined property '{}'.", method.lexeme)))?
            .bind(instance);
        Ok(Value::Function(Rc::new(bound)))
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn superclass_token(expr: &Expr) -> crate::token::Token {
    match expr {
        Expr::Variable { name } => name.clone(),
        _ => unreachable!("parser only ever builds a Variable expression for a superclass"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::resolver::Resolver;
    use crate::scanner::Scanner;

    fn run(src: &str) -> (Interpreter, bool, bool) {
        let mut diagnostics = Diagnostics::new();
        let tokens = Scanner::new(src).scan_tokens(&mut diagnostics);
        let stmts = Parser::new(tokens, &mut diagnostics).parse();
        let locals = Resolver::new(&mut diagnostics).resolve(&stmts);
        let mut interpreter = Interpreter::new();
        interpreter.add_locals(locals);
        interpreter.interpret(&stmts, &mut diagnostics);
        (interpreter, diagnostics.had_error(), diagnostics.had_runtime_error())
    }

    #[test]
    fn arithmetic_and_truthiness() {
        let (_, had_error, had_runtime_error) = run("print 1 + 2 * 3;");
        assert!(!had_error && !had_runtime_error);
    }

    #[test]
    fn calling_a_number_is_a_runtime_error() {
        let (_, _, had_runtime_error) = run("var x = 1; x();");
        assert!(had_runtime_error);
    }

    #[test]
    fn undefined_property_is_a_runtime_error() {
        let (_, _, had_runtime_error) = run("class Box {} var b = Box(); print b.missing;");
        assert!(had_runtime_error);
    }

    #[test]
    fn string_plus_number_is_a_runtime_error() {
        let (_, _, had_runtime_error) = run("print \"a\" + 1;");
        assert!(had_runtime_error);
    }
}
