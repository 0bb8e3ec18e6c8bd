use std::ops::Range;

use log::{debug, trace};

use crate::ast::parser::{Parser, DEFAULT_NEST_LIMIT};
use crate::ast::Ast;
use crate::automata::compiler::Compiler;
use crate::automata::program::{Inst, Program};
use crate::errors::Error;
use crate::executor::{Executor, Input, DEFAULT_THREAD_LIMIT};

/// A compiled regular expression.
///
/// Searches return the leftmost match; among matches starting at the
/// same offset, alternatives written first are preferred and repetitions
/// are greedy. Offsets are byte offsets into the searched string.
#[derive(Clone, Debug)]
pub struct Regex {
    pattern: String,
    program: Program,
    thread_limit: usize,
}

impl Regex {
    pub fn new(pat: &str) -> Result<Regex, Error> {
        RegexBuilder::new(pat).build()
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn is_match(&self, s: &str) -> Result<bool, Error> {
        Ok(self.find(s)?.is_some())
    }

    pub fn find<'h>(&self, s: &'h str) -> Result<Option<Match<'h>>, Error> {
        self.find_at(s, 0)
    }

    /// Finds the leftmost match starting at byte offset `start` or later.
    pub fn find_at<'h>(&self, s: &'h str, start: usize) -> Result<Option<Match<'h>>, Error> {
        let input = Input::new(s)?;
        let first = input
            .position(start)
            .ok_or(Error::InvalidStart { offset: start })?;
        match self.executor().find(&input, first)? {
            Some((start, end)) => {
                trace!("{:?} matched at {}..{}", self.pattern, start, end);
                Ok(Some(Match::new(s, input.offset(start), input.offset(end))))
            }
            None => {
                trace!("{:?} did not match", self.pattern);
                Ok(None)
            }
        }
    }

    /// Whether a match starts exactly at byte offset `start`.
    pub fn matches_at(&self, s: &str, start: usize) -> Result<bool, Error> {
        Ok(self.end_at(s, start)?.is_some())
    }

    /// End of the match starting exactly at byte offset `start`.
    pub fn end_at(&self, s: &str, start: usize) -> Result<Option<usize>, Error> {
        let input = Input::new(s)?;
        let sp = input
            .position(start)
            .ok_or(Error::InvalidStart { offset: start })?;
        let end = self.executor().run(&input, sp)?;
        Ok(end.map(|end| input.offset(end)))
    }

    fn executor(&self) -> Executor<'_> {
        Executor::new(&self.program, self.thread_limit)
    }
}

/// Configures and builds a [`Regex`].
#[derive(Clone, Debug)]
pub struct RegexBuilder {
    pattern: String,
    nest_limit: u32,
    thread_limit: usize,
    optimize: bool,
}

impl RegexBuilder {
    pub fn new(pattern: &str) -> RegexBuilder {
        RegexBuilder {
            pattern: pattern.to_string(),
            nest_limit: DEFAULT_NEST_LIMIT,
            thread_limit: DEFAULT_THREAD_LIMIT,
            optimize: true,
        }
    }

    pub fn nest_limit(&mut self, limit: u32) -> &mut RegexBuilder {
        self.nest_limit = limit;
        self
    }

    /// Maximum number of pending threads during a single match attempt.
    pub fn thread_limit(&mut self, limit: usize) -> &mut RegexBuilder {
        self.thread_limit = limit;
        self
    }

    /// Whether the compiled program is optimized. Matching results are
    /// the same either way.
    pub fn optimize(&mut self, yes: bool) -> &mut RegexBuilder {
        self.optimize = yes;
        self
    }

    pub fn build(&self) -> Result<Regex, Error> {
        let ast = Parser::with_nest_limit(self.pattern.clone(), self.nest_limit).parse()?;
        self.compile(self.pattern.clone(), &ast)
    }

    /// Builds a regex from an already parsed tree. The builder's pattern
    /// is ignored.
    pub fn build_from_ast(&self, ast: &Ast) -> Result<Regex, Error> {
        self.compile(ast.to_string(), ast)
    }

    fn compile(&self, pattern: String, ast: &Ast) -> Result<Regex, Error> {
        let mut bytecode = Compiler::new().compile(ast)?;
        bytecode.push(Inst::Match);
        if self.optimize {
            bytecode.optimize()?;
        }
        let program = bytecode.freeze()?;
        debug!("{:?} compiled into {} instructions", pattern, program.len());
        Ok(Regex {
            pattern,
            program,
            thread_limit: self.thread_limit,
        })
    }
}

/// A match found in a haystack.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Match<'h> {
    haystack: &'h str,
    start: usize,
    end: usize,
}

impl<'h> Match<'h> {
    fn new(haystack: &'h str, start: usize, end: usize) -> Match<'h> {
        Match {
            haystack,
            start,
            end,
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn as_str(&self) -> &'h str {
        &self.haystack[self.range()]
    }
}
