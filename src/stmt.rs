use crate::expr::Expr;
use crate::token::Token;

/// A function's name, parameter list and body, shared verbatim between a
/// `Stmt::Function` declaration and a class's methods — both become a
/// `LoxFunction` wrapping an `Rc` of this same struct, so cloning a
/// declaration into a closure never copies the body.
#[derive(Debug)]
pub struct FunctionDecl {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
}

/// Statement nodes, the second AST layer. Unlike `Expr`, no statement
/// variant needs a stable identity of its own — only expressions are
/// resolver-map keys (spec §4.3).
#[derive(Debug)]
pub enum Stmt {
    Expression(Expr),
    Print(Expr),
    Var {
        name: Token,
        initializer: Option<Expr>,
    },
    Block(Vec<Stmt>),
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    Function(std::rc::Rc<FunctionDecl>),
    Return {
        keyword: Token,
        value: Option<Expr>,
    },
    Class {
        name: Token,
        superclass: Option<Expr>,
        methods: Vec<std::rc::Rc<FunctionDecl>>,
    },
}
