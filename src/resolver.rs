use crate::error::Diagnostics;
use crate::expr::Expr;
use crate::stmt::{FunctionDecl, Stmt};
use crate::token::Token;
use std::collections::HashMap;

#[derive(Clone, Copy, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
    Method,
    Initializer,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ClassType {
    None,
    Class,
    Subclass,
}

/// The static pass between parsing and interpretation (spec §4.2). Walks
/// the AST once, recording for every variable reference the number of
/// enclosing scopes to traverse at runtime, and rejecting the handful of
/// uses that can only be caught by looking at lexical structure (`return`
/// outside a function, `this`/`super` outside a class, self-referential
/// initializers).
pub struct Resolver<'a> {
    scopes: Vec<HashMap<String, bool>>,
    resolved: HashMap<*const Expr, usize>,
    current_function: FunctionType,
    current_class: ClassType,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> Resolver<'a> {
    pub fn new(diagnostics: &'a mut Diagnostics) -> Self {
        Resolver {
            scopes: Vec::new(),
            resolved: HashMap::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
            diagnostics,
        }
    }

    /// Consumes the resolver, returning the finished expression→depth map.
    /// Global references are deliberately left absent — see §9's "Global vs
    /// resolved lookup asymmetry" in the architecture notes.
    pub fn resolve(mut self, statements: &[Stmt]) -> HashMap<*const Expr, usize> {
        self.resolve_stmts(statements);
        self.resolved
    }

    fn resolve_stmts(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            self.resolve_stmt(stmt);
        }
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(statements) => {
                self.begin_scope();
                self.resolve_stmts(statements);
                self.end_scope();
            }
            Stmt::Var { name, initializer } => {
                self.declare(name);
                if let Some(expr) = initializer {
                    self.resolve_expr(expr);
                }
                self.define(name);
            }
            Stmt::Function(decl) => {
                self.declare(&decl.name);
                self.define(&decl.name);
                self.resolve_function(decl, FunctionType::Function);
            }
            Stmt::Expression(expr) => self.resolve_expr(expr),
            Stmt::Print(expr) => self.resolve_expr(expr),
            Stmt::If { condition, then_branch, else_branch } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.resolve_stmt(else_branch);
                }
            }
            Stmt::While { condition, body } => {
                self.resolve_expr(condition);
                self.resolve_stmt(body);
            }
            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionType::None {
                    self.diagnostics.error_at(keyword, "Can't return from top-level code.");
                }
                if let Some(expr) = value {
                    if self.current_function == FunctionType::Initializer {
                        self.diagnostics
                            .error_at(keyword, "Can't return a value from an initializer.");
                    }
                    self.resolve_expr(expr);
                }
            }
            Stmt::Class { name, superclass, methods } => {
                self.resolve_class(name, superclass.as_ref(), methods);
            }
        }
    }

    fn resolve_class(&mut self, name: &Token, superclass: Option<&Expr>, methods: &[std::rc::Rc<FunctionDecl>]) {
        let enclosing_class = self.current_class;
        self.current_class = ClassType::Class;

        self.declare(name);
        self.define(name);

        if let Some(Expr::Variable { name: super_name }) = superclass {
            if super_name.lexeme == name.lexeme {
                self.diagnostics.error_at(super_name, "A class can't inherit from itself.");
            }
            self.current_class = ClassType::Subclass;
            self.resolve_local_by_token(superclass.unwrap(), super_name);
            self.begin_scope();
            self.scopes.last_mut().unwrap().insert("super".to_string(), true);
        }

        self.begin_scope();
        self.scopes.last_mut().unwrap().insert("this".to_string(), true);

        for method in methods {
            let kind = if method.name.lexeme == "init" {
                FunctionType::Initializer
            } else {
                FunctionType::Method
            };
            self.resolve_function(method, kind);
        }

        self.end_scope();
        if superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing_class;
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Variable { name } => {
                if let Some(false) = self.scopes.last().and_then(|s| s.get(&name.lexeme)) {
                    self.diagnostics
                        .error_at(name, "Can't read local variable in its own initializer.");
                }
                self.resolve_local_by_token(expr, name);
            }
            Expr::Assign { name, value } => {
                self.resolve_expr(value);
                self.resolve_local_by_token(expr, name);
            }
            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            Expr::Call { callee, arguments, .. } => {
                self.resolve_expr(callee);
                for arg in arguments {
                    self.resolve_expr(arg);
                }
            }
            Expr::Grouping(inner) | Expr::Unary { right: inner, .. } => self.resolve_expr(inner),
            Expr::Literal(_) | Expr::Bool(_) | Expr::Nil => {}
            Expr::Get { object, .. } => self.resolve_expr(object),
            Expr::Set { object, value, .. } => {
                self.resolve_expr(value);
                self.resolve_expr(object);
            }
            Expr::This { keyword } => {
                if self.current_class == ClassType::None {
                    self.diagnostics.error_at(keyword, "Can't use 'this' outside of a class.");
                    return;
                }
                self.resolve_local_by_token(expr, keyword);
            }
            Expr::Super { keyword, .. } => {
                match self.current_class {
                    ClassType::None => {
                        self.diagnostics.error_at(keyword, "Can't use 'super' outside of a class.");
                        return;
                    }
                    ClassType::Class => {
                        self.diagnostics
                            .error_at(keyword, "Can't use 'super' in a class with no superclass.");
                        return;
                    }
                    ClassType::Subclass => {}
                }
                self.resolve_local_by_token(expr, keyword);
            }
        }
    }

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            if scope.contains_key(&name.lexeme) {
                self.diagnostics
                    .error_at(name, "Already a variable with this name in this scope.");
            }
            scope.insert(name.lexeme.clone(), false);
        }
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), true);
        }
    }

    fn resolve_local_by_token(&mut self, expr: &Expr, name: &Token) {
        for (distance, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(&name.lexeme) {
                self.resolved.insert(expr as *const Expr, distance);
                return;
            }
        }
        // Not found in any local scope: treated as a global (spec §4.2, §9).
    }

    fn resolve_function(&mut self, function: &FunctionDecl, kind: FunctionType) {
        let enclosing_function = self.current_function;
        self.current_function = kind;

        self.begin_scope();
        for param in &function.params {
            self.declare(param);
            self.define(param);
        }
        self.resolve_stmts(&function.body);
        self.end_scope();

        self.current_function = enclosing_function;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::scanner::Scanner;

    fn resolve(src: &str) -> (HashMap<*const Expr, usize>, bool) {
        let mut diagnostics = Diagnostics::new();
        let tokens = Scanner::new(src).scan_tokens(&mut diagnostics);
        let stmts = Parser::new(tokens, &mut diagnostics).parse();
        let depths = Resolver::new(&mut diagnostics).resolve(&stmts);
        (depths, diagnostics.had_error())
    }

    #[test]
    fn redeclaration_in_same_scope_is_an_error() {
        let (_, had_error) = resolve("{ var a = 1; var a = 2; }");
        assert!(had_error);
    }

    #[test]
    fn self_referential_initializer_is_an_error() {
        let (_, had_error) = resolve("{ var a = a; }");
        assert!(had_error);
    }

    #[test]
    fn top_level_return_is_an_error() {
        let (_, had_error) = resolve("return 1;");
        assert!(had_error);
    }

    #[test]
    fn this_outside_class_is_an_error() {
        let (_, had_error) = resolve("print this;");
        assert!(had_error);
    }

    #[test]
    fn super_without_superclass_is_an_error() {
        let (_, had_error) = resolve("class E { cook() { super.cook(); } }");
        assert!(had_error);
    }

    #[test]
    fn class_inheriting_itself_is_an_error() {
        let (_, had_error) = resolve("class Oops < Oops {}");
        assert!(had_error);
    }
}
