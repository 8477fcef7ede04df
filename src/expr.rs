use crate::token::{Literal, Token};
use std::fmt::Display;

/// Expression nodes. Each variant owns its subexpressions directly (no
/// arena, no indices) — the resolver and interpreter key off a node's
/// address (`&Expr as *const Expr`), so the AST must be built once and
/// walked by reference afterward rather than rebuilt or moved.
#[derive(Debug, Clone)]
pub enum Expr {
    Literal(Option<Literal>),
    /// `true`, `false` and `nil` don't carry a scanner literal, so the
    /// parser folds them into dedicated boolean/nil nodes instead of
    /// inventing fake tokens.
    Bool(bool),
    Nil,
    Grouping(Box<Expr>),
    Unary {
        operator: Token,
        right: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    Variable {
        name: Token,
    },
    Assign {
        name: Token,
        value: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        paren: Token,
        arguments: Vec<Expr>,
    },
    Get {
        object: Box<Expr>,
        name: Token,
    },
    Set {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },
    This {
        keyword: Token,
    },
    Super {
        keyword: Token,
        method: Token,
    },
}

impl Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Literal(Some(lit)) => write!(f, "{lit}"),
            Expr::Literal(None) => write!(f, "nil"),
            Expr::Bool(b) => write!(f, "{b}"),
            Expr::Nil => write!(f, "nil"),
            Expr::Grouping(inner) => write!(f, "(group {inner})"),
            Expr::Unary { operator, right } => write!(f, "({} {right})", operator.lexeme),
            Expr::Binary { left, operator, right } => {
                write!(f, "({} {left} {right})", operator.lexeme)
            }
            Expr::Logical { left, operator, right } => {
                write!(f, "({} {left} {right})", operator.lexeme)
            }
            Expr::Variable { name } => write!(f, "{}", name.lexeme),
            Expr::Assign { name, value } => write!(f, "(assign {} {value})", name.lexeme),
            Expr::Call { callee, arguments, .. } => {
                write!(f, "({callee}")?;
                for arg in arguments {
                    write!(f, " {arg}")?;
                }
                write!(f, ")")
            }
            Expr::Get { object, name } => write!(f, "(get {object} {})", name.lexeme),
            Expr::Set { object, name, value } => {
                write!(f, "(set {object} {} {value})", name.lexeme)
            }
            Expr::This { .. } => write!(f, "this"),
            Expr::Super { method, .. } => write!(f, "(super {})", method.lexeme),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Literal, TokenType};

    fn token(token_type: TokenType, lexeme: &str) -> Token {
        Token::new(token_type, lexeme.to_string(), None, 1)
    }

    #[test]
    fn prints_nested_unary_and_grouping_in_prefix_form() {
        let expr = Expr::Binary {
            left: Box::new(Expr::Unary {
                operator: token(TokenType::MINUS, "-"),
                right: Box::new(Expr::Literal(Some(Literal::Number(123.0)))),
            }),
            operator: token(TokenType::STAR, "*"),
            right: Box::new(Expr::Grouping(Box::new(Expr::Literal(Some(Literal::Number(45.67)))))),
        };

        assert_eq!(expr.to_string(), "(* (- 123) (group 45.67))");
    }
}
