use std::{cell::Cell, result};

use crate::ast::lexer::{Lexer, Token, TokenKind};
use crate::ast::{self, Ast, Position, Span};

type Result<T> = result::Result<T, ast::Error>;

/// Default maximum nesting of groups and repetitions.
pub const DEFAULT_NEST_LIMIT: u32 = 250;

/// Recursive descent parser over the tokens produced by [`Lexer`].
///
/// ```text
/// expression -> subexpr EOF
/// subexpr    -> seq ('|' seq)*
/// seq        -> sufope+ | ε
/// sufope     -> factor ('*' | '+' | '?')*
/// factor     -> '(' subexpr ')' | '.' | CHARACTER
/// ```
///
/// Only groups recurse. Sequences and alternatives are collected
/// iteratively and folded into balanced trees.
pub struct Parser {
    p: String,
    tokens: Vec<Token>,
    pos: Cell<usize>,
    depth: u32,
    nest_limit: u32,
}

impl Parser {
    pub fn new(p: String) -> Self {
        Parser::with_nest_limit(p, DEFAULT_NEST_LIMIT)
    }

    pub fn with_nest_limit(p: String, nest_limit: u32) -> Self {
        Parser {
            p,
            tokens: vec![],
            pos: Cell::new(0),
            depth: 0,
            nest_limit,
        }
    }

    fn pattern(&self) -> &str {
        &self.p
    }

    fn look(&self) -> Token {
        match self.tokens.get(self.pos.get()) {
            Some(token) => *token,
            None => Token {
                kind: TokenKind::Eof,
                span: Span::point(Position::new(self.p.len())),
            },
        }
    }

    fn bump(&self) {
        if self.pos.get() < self.tokens.len() {
            self.pos.set(self.pos.get() + 1);
        }
    }

    fn error(&self, span: Span, kind: ast::ErrorKind) -> ast::Error {
        ast::Error::new(kind, self.pattern(), span)
    }

    fn unexpected(&self, expected: &'static str, token: Token) -> ast::Error {
        let kind = match token.kind {
            TokenKind::Star | TokenKind::Plus | TokenKind::Question => {
                ast::ErrorKind::RepetitionMissing
            }
            found => ast::ErrorKind::UnexpectedToken {
                expected,
                found: found.to_string(),
            },
        };
        self.error(token.span, kind)
    }

    fn check_nest(&self, nest: u32, span: Span) -> Result<()> {
        if nest > self.nest_limit {
            return Err(self.error(span, ast::ErrorKind::NestLimitExceeded(self.nest_limit)));
        }
        Ok(())
    }

    pub fn parse(&mut self) -> Result<Ast> {
        self.tokens = Lexer::new(&self.p).scan()?;
        self.pos.set(0);
        self.depth = 0;
        self.expression()
    }

    fn expression(&mut self) -> Result<Ast> {
        let (ast, _) = self.subexpr()?;
        let token = self.look();
        match token.kind {
            TokenKind::Eof => Ok(ast),
            TokenKind::RParen => Err(self.error(token.span, ast::ErrorKind::GroupUnopened)),
            _ => Err(self.unexpected("end of pattern", token)),
        }
    }

    // Every parse function also returns the nesting depth of the tree it
    // built, counted in groups and repetitions.
    fn subexpr(&mut self) -> Result<(Ast, u32)> {
        let (first, mut nest) = self.seq()?;
        let mut alternatives = vec![first];
        while self.look().kind == TokenKind::Union {
            self.bump();
            let (ast, n) = self.seq()?;
            nest = nest.max(n);
            alternatives.push(ast);
        }
        Ok((Ast::union_all(alternatives), nest))
    }

    fn seq(&mut self) -> Result<(Ast, u32)> {
        let mut asts = vec![];
        let mut nest = 0;
        while self.look().kind.starts_factor() {
            let (ast, n) = self.sufope()?;
            nest = nest.max(n);
            asts.push(ast);
        }
        Ok((Ast::concat_all(asts), nest))
    }

    fn sufope(&mut self) -> Result<(Ast, u32)> {
        let (mut ast, mut nest) = self.factor()?;
        loop {
            let token = self.look();
            let repeat: fn(Ast) -> Ast = match token.kind {
                TokenKind::Star => Ast::star,
                TokenKind::Plus => Ast::plus,
                TokenKind::Question => Ast::question,
                _ => break,
            };
            nest += 1;
            self.check_nest(nest, token.span)?;
            self.bump();
            ast = repeat(ast);
        }
        Ok((ast, nest))
    }

    fn factor(&mut self) -> Result<(Ast, u32)> {
        let token = self.look();
        match token.kind {
            TokenKind::LParen => {
                self.depth += 1;
                self.check_nest(self.depth, token.span)?;
                self.bump();
                let (ast, nest) = self.subexpr()?;
                let close = self.look();
                match close.kind {
                    TokenKind::RParen => self.bump(),
                    TokenKind::Eof => {
                        return Err(self.error(token.span, ast::ErrorKind::GroupUnclosed))
                    }
                    _ => return Err(self.unexpected("')'", close)),
                }
                self.depth -= 1;
                self.check_nest(nest + 1, token.span)?;
                Ok((ast, nest + 1))
            }
            TokenKind::Any => {
                self.bump();
                Ok((Ast::Any, 0))
            }
            TokenKind::Char(c) => {
                self.bump();
                Ok((Ast::Literal(c), 0))
            }
            _ => Err(self.unexpected("character", token)),
        }
    }
}
