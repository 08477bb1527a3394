//! Recursive-descent parser.
//!
//! Statements dispatch on their leading keyword; expressions use one
//! function per precedence level (or, and, comparison, concat, additive,
//! multiplicative, unary, power, postfix, primary).
//!
//! `then`/`do` are optional, and a block that runs into end of input without
//! its `end` is accepted with a warning.

use crate::ast::*;
use crate::error::ParseError;
use crate::token::{Token, TokenKind};

/// Tokens the recovery loop resynchronizes on.
pub const SYNC_TOKENS: &[&str] = &[";", "end", "local", "function"];

/// Nesting limit for blocks, parenthesized expressions and operator chains.
pub const MAX_DEPTH: usize = 100;

const COMPOUND_ASSIGN: &[&str] = &["=", "+=", "-=", "*=", "/="];

/// Parse a token stream. The first error aborts the parse.
pub fn parse(tokens: &[Token]) -> Result<Program, ParseError> {
    Parser::new(tokens).parse_program()
}

/// Result of a recovering parse.
#[derive(Debug, Clone, PartialEq)]
pub struct Recovered {
    pub program: Program,
    /// Errors for the statements that were dropped, in source order.
    pub errors: Vec<ParseError>,
}

/// Parse with statement-level recovery: a malformed top-level statement is
/// dropped and parsing resumes at the next synchronization token. Fails only
/// once more than `max_steps` statements had to be dropped.
pub fn parse_recovering(tokens: &[Token], max_steps: usize) -> Result<Recovered, ParseError> {
    Parser::new(tokens).parse_program_recovering(max_steps)
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    pub fn new(tokens: &[Token]) -> Self {
        let mut tokens = tokens.to_vec();
        if !tokens.last().is_some_and(Token::is_eof) {
            let (line, column) = tokens
                .last()
                .map(|t| (t.line, t.column + t.text.len()))
                .unwrap_or((1, 1));
            tokens.push(Token::eof(line, column));
        }
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    // ------------------------------------------------------------------
    // Token helpers
    // ------------------------------------------------------------------

    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + offset).min(last)]
    }

    fn at_eof(&self) -> bool {
        self.peek().is_eof()
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !token.is_eof() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, text: &str) -> bool {
        self.peek().is(text)
    }

    fn check_any(&self, texts: &[&str]) -> bool {
        texts.iter().any(|t| self.check(t))
    }

    fn eat(&mut self, text: &str) -> bool {
        if self.check(text) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, text: &str) -> Result<Token, ParseError> {
        if self.check(text) {
            Ok(self.advance())
        } else {
            Err(ParseError::expected(text, self.peek()))
        }
    }

    fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if self.peek().kind == TokenKind::Identifier {
            Ok(self.advance().text)
        } else {
            Err(ParseError::expected("identifier", self.peek()))
        }
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::TooDeep {
                limit: MAX_DEPTH,
                line: self.peek().line,
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    // ------------------------------------------------------------------
    // Program
    // ------------------------------------------------------------------

    pub fn parse_program(mut self) -> Result<Program, ParseError> {
        let mut body = Vec::new();
        while !self.at_eof() {
            if let Some(stmt) = self.parse_statement()? {
                body.push(stmt);
            }
        }
        Ok(Program::new(body))
    }

    pub fn parse_program_recovering(mut self, max_steps: usize) -> Result<Recovered, ParseError> {
        let mut body = Vec::new();
        let mut errors: Vec<ParseError> = Vec::new();

        while !self.at_eof() {
            let start = self.pos;
            match self.parse_statement() {
                Ok(Some(stmt)) => body.push(stmt),
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!("dropping malformed statement: {err}");
                    errors.push(err);
                    if errors.len() > max_steps {
                        let first = errors.swap_remove(0);
                        return Err(ParseError::RecoveryLimit {
                            steps: max_steps,
                            first: Box::new(first),
                        });
                    }
                    self.depth = 0;
                    self.synchronize(start);
                }
            }
        }

        Ok(Recovered {
            program: Program::new(body),
            errors,
        })
    }

    /// Resume after a failed statement. If the statement failed on its very
    /// first token, only that token is dropped. Otherwise tokens are skipped
    /// up to the next synchronization token; a stray `end`/`;` there is
    /// consumed, `local`/`function` start the next statement.
    fn synchronize(&mut self, start: usize) {
        if self.pos == start {
            self.advance();
            return;
        }
        while !self.at_eof() && !self.check_any(SYNC_TOKENS) {
            self.advance();
        }
        if self.check("end") || self.check(";") {
            self.advance();
        }
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn parse_statement(&mut self) -> Result<Option<Stmt>, ParseError> {
        let token = self.peek().clone();
        let line = token.line;

        if token.kind == TokenKind::Keyword {
            match token.text.as_str() {
                "local" => return self.parse_local().map(Some),
                "function" => {
                    self.advance();
                    return self.parse_function_declaration(line, false).map(Some);
                }
                "if" => return self.parse_if().map(Some),
                "while" => return self.parse_while().map(Some),
                "for" => return self.parse_for().map(Some),
                "return" => return self.parse_return().map(Some),
                "break" => {
                    self.advance();
                    return Ok(Some(Stmt::new(line, StmtKind::Break)));
                }
                _ => {}
            }
        }

        if self.eat(";") {
            return Ok(None);
        }

        self.parse_expression_statement().map(Some)
    }

    fn parse_local(&mut self) -> Result<Stmt, ParseError> {
        let line = self.advance().line;

        if self.eat("function") {
            return self.parse_function_declaration(line, true);
        }

        let name = self.expect_identifier()?;
        let value = if self.eat("=") {
            Some(self.parse_expression()?)
        } else {
            None
        };

        Ok(Stmt::new(line, StmtKind::LocalDeclaration { name, value }))
    }

    /// Everything after the `function` keyword of a declaration.
    fn parse_function_declaration(
        &mut self,
        line: usize,
        is_local: bool,
    ) -> Result<Stmt, ParseError> {
        let mut name = self.expect_identifier()?;
        let mut is_method = false;

        if !is_local {
            while self.check(".") || self.check(":") {
                let sep = self.advance().text;
                is_method = sep == ":";
                name.push_str(&sep);
                name.push_str(&self.expect_identifier()?);
                if is_method {
                    break;
                }
            }
        }

        let params = self.parse_params()?;
        let body = self.parse_block(&["end"])?;
        self.finish_block("function", line);

        Ok(Stmt::new(
            line,
            StmtKind::FunctionDeclaration {
                name,
                params,
                body,
                is_local,
                is_method,
            },
        ))
    }

    fn parse_params(&mut self) -> Result<Vec<String>, ParseError> {
        self.expect("(")?;
        let mut params = Vec::new();
        if !self.check(")") {
            loop {
                if self.eat("...") {
                    params.push("...".to_string());
                    break;
                }
                params.push(self.expect_identifier()?);
                if !self.eat(",") {
                    break;
                }
            }
        }
        self.expect(")")?;
        Ok(params)
    }

    /// Parse statements until one of `terminators` (not consumed) or EOF.
    fn parse_block(&mut self, terminators: &[&str]) -> Result<Vec<Stmt>, ParseError> {
        self.enter()?;
        let mut body = Vec::new();
        while !self.at_eof() && !self.check_any(terminators) {
            if let Some(stmt) = self.parse_statement()? {
                body.push(stmt);
            }
        }
        self.leave();
        Ok(body)
    }

    /// Consume the `end` closing a block opened at `line`. End of input is
    /// accepted in its place.
    fn finish_block(&mut self, construct: &str, line: usize) {
        if !self.eat("end") {
            tracing::warn!("unterminated {construct} opened at line {line}; accepted at end of input");
        }
    }

    /// `if`/`elseif` share this: an `elseif` becomes a nested conditional
    /// that owns the single closing `end` of the chain.
    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let line = self.advance().line;
        let condition = self.parse_expression()?;
        self.eat("then");
        let consequent = self.parse_block(&["else", "elseif", "end"])?;

        let alternate = if self.check("elseif") {
            Some(vec![self.parse_if()?])
        } else {
            let alternate = if self.eat("else") {
                Some(self.parse_block(&["end"])?)
            } else {
                None
            };
            self.finish_block("if", line);
            alternate
        };

        Ok(Stmt::new(
            line,
            StmtKind::IfStatement {
                condition,
                consequent,
                alternate,
            },
        ))
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        let line = self.advance().line;
        let condition = self.parse_expression()?;
        self.eat("do");
        let body = self.parse_block(&["end"])?;
        self.finish_block("while", line);
        Ok(Stmt::new(line, StmtKind::WhileLoop { condition, body }))
    }

    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        let line = self.advance().line;
        let first = self.expect_identifier()?;

        if self.eat("=") {
            let start = self.parse_expression()?;
            self.expect(",")?;
            let end = self.parse_expression()?;
            let step = if self.eat(",") {
                Some(self.parse_expression()?)
            } else {
                None
            };
            self.eat("do");
            let body = self.parse_block(&["end"])?;
            self.finish_block("for", line);
            return Ok(Stmt::new(
                line,
                StmtKind::ForLoop {
                    variable: first,
                    start,
                    end,
                    step,
                    body,
                },
            ));
        }

        let mut variables = vec![first];
        while self.eat(",") {
            variables.push(self.expect_identifier()?);
        }
        self.expect("in")?;
        let iterable = self.parse_expression()?;
        self.eat("do");
        let body = self.parse_block(&["end"])?;
        self.finish_block("for", line);

        Ok(Stmt::new(
            line,
            StmtKind::ForInLoop {
                variables,
                iterable,
                body,
            },
        ))
    }

    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        let line = self.advance().line;
        let mut values = Vec::new();

        let ends_block = self.at_eof() || self.check_any(&["end", "else", "elseif", "until", ";"]);
        if !ends_block {
            values.push(self.parse_expression()?);
            while self.eat(",") {
                values.push(self.parse_expression()?);
            }
        }
        self.eat(";");

        Ok(Stmt::new(line, StmtKind::ReturnStatement { values }))
    }

    fn parse_expression_statement(&mut self) -> Result<Stmt, ParseError> {
        let line = self.peek().line;
        let expr = self.parse_expression()?;

        if self.check_any(COMPOUND_ASSIGN) {
            let assignable = matches!(
                expr,
                Expr::Identifier { .. } | Expr::MemberExpression { .. } | Expr::IndexExpression { .. }
            );
            if !assignable {
                return Err(ParseError::unexpected(self.peek()));
            }
            let op = self.advance().text;
            let value = self.parse_expression()?;
            return Ok(Stmt::new(
                line,
                StmtKind::Assignment {
                    target: expr,
                    op,
                    value,
                },
            ));
        }

        Ok(Stmt::new(line, StmtKind::ExpressionStatement { expr }))
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.enter()?;
        let expr = self.parse_or();
        self.leave();
        expr
    }

    /// Run `parse` and drop whatever nesting it entered, on success or error.
    fn chained(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<Expr, ParseError>,
    ) -> Result<Expr, ParseError> {
        let depth = self.depth;
        let expr = parse(self);
        self.depth = depth;
        expr
    }

    /// Each operator in a chain counts as one level of nesting: the tree it
    /// builds is as deep as the chain is long.
    fn parse_left_assoc(
        &mut self,
        ops: &[&str],
        next: fn(&mut Self) -> Result<Expr, ParseError>,
    ) -> Result<Expr, ParseError> {
        self.chained(|this| this.left_assoc_chain(ops, next))
    }

    fn left_assoc_chain(
        &mut self,
        ops: &[&str],
        next: fn(&mut Self) -> Result<Expr, ParseError>,
    ) -> Result<Expr, ParseError> {
        let mut left = next(self)?;
        while self.check_any(ops) {
            self.enter()?;
            let symbol = self.advance().text;
            let right = next(self)?;
            let op = BinaryOp::from_symbol(&symbol)
                .ok_or_else(|| ParseError::unexpected(self.peek()))?;
            left = Expr::binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        self.parse_left_assoc(&["or"], Self::parse_and)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        self.parse_left_assoc(&["and"], Self::parse_comparison)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        self.parse_left_assoc(&["==", "~=", "<", ">", "<=", ">="], Self::parse_concat)
    }

    fn parse_concat(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_additive()?;
        if self.eat("..") {
            self.enter()?;
            let right = self.parse_concat();
            self.leave();
            return Ok(Expr::binary(left, BinaryOp::Concat, right?));
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        self.parse_left_assoc(&["+", "-"], Self::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        self.parse_left_assoc(&["*", "/", "//", "%"], Self::parse_unary)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek().text.as_str() {
            "not" if self.peek().kind == TokenKind::Keyword => Some(UnaryOp::Not),
            "-" if self.peek().kind == TokenKind::Operator => Some(UnaryOp::Neg),
            "#" if self.peek().kind == TokenKind::Operator => Some(UnaryOp::Len),
            _ => None,
        };

        if let Some(op) = op {
            self.advance();
            self.enter()?;
            let operand = self.parse_unary();
            self.leave();
            return Ok(Expr::UnaryExpression {
                op,
                operand: Box::new(operand?),
            });
        }

        self.parse_power()
    }

    fn parse_power(&mut self) -> Result<Expr, ParseError> {
        let base = self.parse_postfix()?;
        if self.eat("^") {
            self.enter()?;
            let exponent = self.parse_unary();
            self.leave();
            return Ok(Expr::binary(base, BinaryOp::Pow, exponent?));
        }
        Ok(base)
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        self.chained(Self::postfix_chain)
    }

    fn postfix_chain(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            if self.check_any(&["(", ":", ".", "["]) {
                self.enter()?;
            }
            if self.check("(") {
                let args = self.parse_args()?;
                expr = Expr::FunctionCall {
                    callee: Box::new(expr),
                    args,
                };
            } else if self.eat(":") {
                let method = self.expect_identifier()?;
                let args = self.parse_args()?;
                expr = Expr::MethodCall {
                    object: Box::new(expr),
                    method,
                    args,
                };
            } else if self.eat(".") {
                let property = self.expect_identifier()?;
                expr = Expr::member(expr, property);
            } else if self.eat("[") {
                let index = self.parse_expression()?;
                self.expect("]")?;
                expr = Expr::IndexExpression {
                    object: Box::new(expr),
                    index: Box::new(index),
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.expect("(")?;
        let mut args = Vec::new();
        if !self.check(")") {
            loop {
                args.push(self.parse_expression()?);
                if !self.eat(",") {
                    break;
                }
            }
        }
        self.expect(")")?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.peek().clone();

        match token.kind {
            TokenKind::String => {
                self.advance();
                return Ok(Expr::StringLiteral {
                    value: token.text,
                    quote: token.quote.unwrap_or('"'),
                });
            }
            TokenKind::Number => {
                self.advance();
                return Ok(Expr::number(token.text));
            }
            TokenKind::Identifier => {
                self.advance();
                return Ok(Expr::ident(token.text));
            }
            _ => {}
        }

        match token.text.as_str() {
            "true" | "false" if token.kind == TokenKind::Keyword => {
                self.advance();
                Ok(Expr::BooleanLiteral {
                    value: token.text == "true",
                })
            }
            "nil" if token.kind == TokenKind::Keyword => {
                self.advance();
                Ok(Expr::NilLiteral)
            }
            "..." if token.kind == TokenKind::Operator => {
                self.advance();
                Ok(Expr::Vararg)
            }
            "(" if token.kind == TokenKind::Punctuation => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(")")?;
                Ok(expr)
            }
            "{" if token.kind == TokenKind::Punctuation => self.parse_table(),
            "function" if token.kind == TokenKind::Keyword => self.parse_anonymous_function(),
            _ => Err(ParseError::unexpected(&token)),
        }
    }

    fn parse_table(&mut self) -> Result<Expr, ParseError> {
        self.expect("{")?;
        let mut fields = Vec::new();

        while !self.check("}") && !self.at_eof() {
            if self.eat("[") {
                let key = self.parse_expression()?;
                self.expect("]")?;
                self.expect("=")?;
                let value = self.parse_expression()?;
                fields.push(TableField::Keyed { key, value });
            } else if self.peek().kind == TokenKind::Identifier && self.peek_at(1).is("=") {
                let name = self.advance().text;
                self.advance();
                let value = self.parse_expression()?;
                fields.push(TableField::Named { name, value });
            } else {
                let value = self.parse_expression()?;
                fields.push(TableField::Positional { value });
            }

            if !(self.eat(",") || self.eat(";")) {
                break;
            }
        }

        self.expect("}")?;
        Ok(Expr::TableConstructor { fields })
    }

    fn parse_anonymous_function(&mut self) -> Result<Expr, ParseError> {
        let line = self.advance().line;
        let params = self.parse_params()?;
        let body = self.parse_block(&["end"])?;
        self.finish_block("function", line);
        Ok(Expr::AnonymousFunction { params, body })
    }
}
