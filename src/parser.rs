use crate::error::{Diagnostics, ParseError};
use crate::expr::Expr;
use crate::stmt::{FunctionDecl, Stmt};
use crate::token::{Token, TokenType, TokenType::*};
use std::rc::Rc;

const MAX_ARGS: usize = 255;

/// Recursive-descent parser over the grammar in spec §4.1. Each grammar
/// rule below is one method; the precedence chain from `equality` down to
/// `primary` is the standard "climb down by binding power" structure.
pub struct Parser<'a> {
    tokens: Vec<Token>,
    current: usize,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, diagnostics: &'a mut Diagnostics) -> Self {
        Parser { tokens, current: 0, diagnostics }
    }

    /// `program → declaration* EOF`. Collects whatever statements parse
    /// successfully; a malformed declaration is skipped via `synchronize`
    /// so later ones can still be checked (spec §4.1, "Error recovery").
    pub fn parse(&mut self) -> Vec<Stmt> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        statements
    }

    fn declaration(&mut self) -> Option<Stmt> {
        let result = if self.match_types(&[CLASS]) {
            self.class_declaration()
        } else if self.match_types(&[FUN]) {
            self.function("function").map(Stmt::Function)
        } else if self.match_types(&[VAR]) {
            self.var_declaration()
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(ParseError) => {
                self.synchronize();
                None
            }
        }
    }

    fn class_declaration(&mut self) -> Result<Stmt, ParseError> {
        let name = self.consume(IDENTIFIER, "Expect class name.")?;

        let superclass = if self.match_types(&[LESS]) {
            let super_name = self.consume(IDENTIFIER, "Expect superclass name.")?;
            Some(Expr::Variable { name: super_name })
        } else {
            None
        };

        self.consume(LEFT_BRACE, "Expect '{' before class body.")?;
        let mut methods = Vec::new();
        while !self.check(RIGHT_BRACE) && !self.is_at_end() {
            methods.push(Rc::new(self.function("method")?));
        }
        self.consume(RIGHT_BRACE, "Expect '}' after class body.")?;

        Ok(Stmt::Class { name, superclass, methods })
    }

    fn function(&mut self, kind: &str) -> Result<FunctionDecl, ParseError> {
        let name = self.consume(IDENTIFIER, &format!("Expect {kind} name."))?;
        self.consume(LEFT_PAREN, &format!("Expect '(' after {kind} name."))?;
        let mut params = Vec::new();
        if !self.check(RIGHT_PAREN) {
            loop {
                if params.len() >= MAX_ARGS {
                    self.error_at_current("Can't have more than 255 parameters.");
                }
                params.push(self.consume(IDENTIFIER, "Expect parameter name.")?);
                if !self.match_types(&[COMMA]) {
                    break;
                }
            }
        }
        self.consume(RIGHT_PAREN, "Expect ')' after parameters.")?;
        self.consume(LEFT_BRACE, &format!("Expect '{{' before {kind} body."))?;
        let body = self.block()?;
        Ok(FunctionDecl { name, params, body })
    }

    fn var_declaration(&mut self) -> Result<Stmt, ParseError> {
        let name = self.consume(IDENTIFIER, "Expect variable name.")?;
        let initializer = if self.match_types(&[EQUAL]) { Some(self.expression()?) } else { None };
        self.consume(SEMICOLON, "Expect ';' after variable declaration.")?;
        Ok(Stmt::Var { name, initializer })
    }

    fn statement(&mut self) -> Result<Stmt, ParseError> {
        if self.match_types(&[FOR]) {
            return self.for_statement();
        }
        if self.match_types(&[IF]) {
            return self.if_statement();
        }
        if self.match_types(&[PRINT]) {
            return self.print_statement();
        }
        if self.match_types(&[RETURN]) {
            return self.return_statement();
        }
        if self.match_types(&[WHILE]) {
            return self.while_statement();
        }
        if self.match_types(&[LEFT_BRACE]) {
            return Ok(Stmt::Block(self.block()?));
        }
        self.expression_statement()
    }

    /// Desugars `for (init; cond; incr) body` into a `while` wrapped in a
    /// block, entirely inside the parser, so the resolver and interpreter
    /// never need to know `for` exists (spec §4.1, "`for` desugaring").
    fn for_statement(&mut self) -> Result<Stmt, ParseError> {
        self.consume(LEFT_PAREN, "Expect '(' after 'for'.")?;

        let initializer = if self.match_types(&[SEMICOLON]) {
            None
        } else if self.match_types(&[VAR]) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if !self.check(SEMICOLON) { Some(self.expression()?) } else { None };
        self.consume(SEMICOLON, "Expect ';' after loop condition.")?;

        let increment = if !self.check(RIGHT_PAREN) { Some(self.expression()?) } else { None };
        self.consume(RIGHT_PAREN, "Expect ')' after for clauses.")?;

        let mut body = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block(vec![body, Stmt::Expression(increment)]);
        }

        let condition = condition.unwrap_or(Expr::Bool(true));
        body = Stmt::While { condition, body: Box::new(body) };

        if let Some(initializer) = initializer {
            body = Stmt::Block(vec![initializer, body]);
        }

        Ok(body)
    }

    fn if_statement(&mut self) -> Result<Stmt, ParseError> {
        self.consume(LEFT_PAREN, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(RIGHT_PAREN, "Expect ')' after if condition.")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.match_types(&[ELSE]) { Some(Box::new(self.statement()?)) } else { None };

        Ok(Stmt::If { condition, then_branch, else_branch })
    }

    fn print_statement(&mut self) -> Result<Stmt, ParseError> {
        let value = self.expression()?;
        self.consume(SEMICOLON, "Expect ';' after value.")?;
        Ok(Stmt::Print(value))
    }

    fn return_statement(&mut self) -> Result<Stmt, ParseError> {
        let keyword = self.previous();
        let value = if !self.check(SEMICOLON) { Some(self.expression()?) } else { None };
        self.consume(SEMICOLON, "Expect ';' after return value.")?;
        Ok(Stmt::Return { keyword, value })
    }

    fn while_statement(&mut self) -> Result<Stmt, ParseError> {
        self.consume(LEFT_PAREN, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(RIGHT_PAREN, "Expect ')' after condition.")?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::While { condition, body })
    }

    fn block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut statements = Vec::new();
        while !self.check(RIGHT_BRACE) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        self.consume(RIGHT_BRACE, "Expect '}' after block.")?;
        Ok(statements)
    }

    fn expression_statement(&mut self) -> Result<Stmt, ParseError> {
        let expr = self.expression()?;
        self.consume(SEMICOLON, "Expect ';' after expression.")?;
        Ok(Stmt::Expression(expr))
    }

    fn expression(&mut self) -> Result<Expr, ParseError> {
        self.assignment()
    }

    /// `assignment → ( call "." )? IDENT "=" assignment | logic_or`. The
    /// left-hand side is parsed as an ordinary expression first; only once
    /// we see `=` do we inspect what we parsed to decide whether it's a
    /// valid assignment target (spec §4.1, "Assignment target validation").
    fn assignment(&mut self) -> Result<Expr, ParseError> {
        let expr = self.or()?;

        if self.match_types(&[EQUAL]) {
            let equals = self.previous();
            let value = Box::new(self.assignment()?);
            return match expr {
                Expr::Variable { name } => Ok(Expr::Assign { name, value }),
                Expr::Get { object, name } => Ok(Expr::Set { object, name, value }),
                _ => {
                    self.diagnostics.error_at(&equals, "Invalid assignment target.");
                    Err(ParseError)
                }
            };
        }

        Ok(expr)
    }

    fn or(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.and()?;
        while self.match_types(&[OR]) {
            let operator = self.previous();
            let right = Box::new(self.and()?);
            expr = Expr::Logical { left: Box::new(expr), operator, right };
        }
        Ok(expr)
    }

    fn and(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.equality()?;
        while self.match_types(&[AND]) {
            let operator = self.previous();
            let right = Box::new(self.equality()?);
            expr = Expr::Logical { left: Box::new(expr), operator, right };
        }
        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.comparison()?;
        while self.match_types(&[BANG_EQUAL, EQUAL_EQUAL]) {
            let operator = self.previous();
            let right = Box::new(self.comparison()?);
            expr = Expr::Binary { left: Box::new(expr), operator, right };
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.term()?;
        while self.match_types(&[GREATER, GREATER_EQUAL, LESS, LESS_EQUAL]) {
            let operator = self.previous();
            let right = Box::new(self.term()?);
            expr = Expr::Binary { left: Box::new(expr), operator, right };
        }
        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.factor()?;
        while self.match_types(&[MINUS, PLUS]) {
            let operator = self.previous();
            let right = Box::new(self.factor()?);
            expr = Expr::Binary { left: Box::new(expr), operator, right };
        }
        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.unary()?;
        while self.match_types(&[SLASH, STAR]) {
            let operator = self.previous();
            let right = Box::new(self.unary()?);
            expr = Expr::Binary { left: Box::new(expr), operator, right };
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        if self.match_types(&[BANG, MINUS]) {
            let operator = self.previous();
            let right = Box::new(self.unary()?);
            return Ok(Expr::Unary { operator, right });
        }
        self.call()
    }

    /// `call → primary ( "(" args? ")" | "." IDENT )*`.
    fn call(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.primary()?;
        loop {
            if self.match_types(&[LEFT_PAREN]) {
                expr = self.finish_call(expr)?;
            } else if self.match_types(&[DOT]) {
                let name = self.consume(IDENTIFIER, "Expect property name after '.'.")?;
                expr = Expr::Get { object: Box::new(expr), name };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> Result<Expr, ParseError> {
        let mut arguments = Vec::new();
        if !self.check(RIGHT_PAREN) {
            loop {
                if arguments.len() >= MAX_ARGS {
                    self.error_at_current("Can't have more than 255 arguments.");
                }
                arguments.push(self.expression()?);
                if !self.match_types(&[COMMA]) {
                    break;
                }
            }
        }
        let paren = self.consume(RIGHT_PAREN, "Expect ')' after arguments.")?;
        Ok(Expr::Call { callee: Box::new(callee), paren, arguments })
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        if self.match_types(&[FALSE]) {
            return Ok(Expr::Bool(false));
        }
        if self.match_types(&[TRUE]) {
            return Ok(Expr::Bool(true));
        }
        if self.match_types(&[NIL]) {
            return Ok(Expr::Nil);
        }
        if self.match_types(&[NUMBER, STRING]) {
            return Ok(Expr::Literal(self.previous().literal));
        }
        if self.match_types(&[SUPER]) {
            let keyword = self.previous();
            self.consume(DOT, "Expect '.' after 'super'.")?;
            let method = self.consume(IDENTIFIER, "Expect superclass method name.")?;
            return Ok(Expr::Super { keyword, method });
        }
        if self.match_types(&[THIS]) {
            return Ok(Expr::This { keyword: self.previous() });
        }
        if self.match_types(&[IDENTIFIER]) {
            return Ok(Expr::Variable { name: self.previous() });
        }
        if self.match_types(&[LEFT_PAREN]) {
            let expr = self.expression()?;
            self.consume(RIGHT_PAREN, "Expect ')' after expression.")?;
            return Ok(Expr::Grouping(Box::new(expr)));
        }

        Err(self.error_at_current("Expect expression."))
    }

    fn consume(&mut self, token_type: TokenType, message: &str) -> Result<Token, ParseError> {
        if self.check(token_type) {
            return Ok(self.advance());
        }
        Err(self.error_at_current(message))
    }

    fn match_types(&mut self, types: &[TokenType]) -> bool {
        for &token_type in types {
            if self.check(token_type) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn check(&self, token_type: TokenType) -> bool {
        !self.is_at_end() && self.peek().token_type == token_type
    }

    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().token_type == EOF
    }

    fn peek(&self) -> Token {
        self.tokens[self.current].clone()
    }

    fn previous(&self) -> Token {
        self.tokens[self.current - 1].clone()
    }

    fn error_at_current(&mut self, message: &str) -> ParseError {
        let token = self.peek();
        self.diagnostics.error_at(&token, message);
        ParseError
    }

    /// Discards tokens until we're at a likely statement boundary, so a
    /// single malformed statement doesn't cascade into spurious errors for
    /// everything after it (spec §4.1, "Error recovery (panic mode)").
    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if self.previous().token_type == SEMICOLON {
                return;
            }
            match self.peek().token_type {
                CLASS | FUN | VAR | FOR | IF | WHILE | PRINT | RETURN => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::Scanner;

    fn parse(src: &str) -> (Vec<Stmt>, bool) {
        let mut diagnostics = Diagnostics::new();
        let tokens = Scanner::new(src).scan_tokens(&mut diagnostics);
        let stmts = Parser::new(tokens, &mut diagnostics).parse();
        (stmts, diagnostics.had_error())
    }

    #[test]
    fn for_loop_desugars_to_while() {
        let (stmts, had_error) = parse("for (var i = 0; i < 3; i = i + 1) print i;");
        assert!(!had_error);
        assert_eq!(stmts.len(), 1);
        match &stmts[0] {
            Stmt::Block(block) => {
                assert_eq!(block.len(), 2);
                assert!(matches!(block[1], Stmt::While { .. }));
            }
            other => panic!("expected desugared block, got {other:?}"),
        }
    }

    #[test]
    fn invalid_assignment_target_is_an_error() {
        let (_, had_error) = parse("1 = 2;");
        assert!(had_error);
    }

    #[test]
    fn class_with_superclass_parses() {
        let (stmts, had_error) = parse("class B < A { m() {} }");
        assert!(!had_error);
        match &stmts[0] {
            Stmt::Class { superclass, methods, .. } => {
                assert!(superclass.is_some());
                assert_eq!(methods.len(), 1);
            }
            other => panic!("expected class decl, got {other:?}"),
        }
    }

    #[test]
    fn missing_semicolon_is_a_parse_error() {
        let (_, had_error) = parse("var a = 1");
        assert!(had_error);
    }
}
