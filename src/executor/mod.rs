use std::collections::HashSet;

use log::warn;

pub use crate::ast::SENTINEL;
use crate::automata::program::{Inst, InstPtr, Program};
use crate::errors::Error;

pub const DEFAULT_THREAD_LIMIT: usize = 10_000;

/// An input prepared for the VM: its characters followed by [`SENTINEL`].
///
/// Positions used by the VM are character indexes; [`Input::offset`]
/// maps them back to byte offsets of the original string.
#[derive(Debug)]
pub struct Input {
    chars: Vec<char>,
    offsets: Vec<usize>,
}

impl Input {
    pub fn new(haystack: &str) -> Result<Input, Error> {
        let mut chars = Vec::with_capacity(haystack.len() + 1);
        let mut offsets = Vec::with_capacity(haystack.len() + 1);
        for (offset, c) in haystack.char_indices() {
            if c == SENTINEL {
                return Err(Error::SentinelInInput { offset });
            }
            chars.push(c);
            offsets.push(offset);
        }
        chars.push(SENTINEL);
        offsets.push(haystack.len());
        Ok(Input { chars, offsets })
    }

    // Not counting the sentinel.
    pub fn len(&self) -> usize {
        self.chars.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn at(&self, sp: usize) -> char {
        self.chars[sp]
    }

    pub fn offset(&self, sp: usize) -> usize {
        self.offsets[sp]
    }

    /// Position of the character starting at byte `offset`, if any.
    pub fn position(&self, offset: usize) -> Option<usize> {
        self.offsets.binary_search(&offset).ok()
    }
}

/// One speculative execution path.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
struct Thread {
    pc: InstPtr,
    sp: usize,
}

// Scratch space of one scan over one input. `visited` survives between
// start positions: a state explored during a failed attempt can't lead to
// a match from any other start either. It is never shared across inputs.
#[derive(Debug, Default)]
struct Cache {
    ready: Vec<Thread>,
    visited: HashSet<Thread>,
}

/// Runs a frozen [`Program`] over an [`Input`].
///
/// Threads live on an explicit ready list instead of the call stack. A
/// thread runs until it dies; `Split` queues its second target and keeps
/// going with the first, so first targets are always preferred. The
/// first thread reaching `Match` wins.
pub struct Executor<'p> {
    program: &'p Program,
    thread_limit: usize,
}

impl<'p> Executor<'p> {
    pub fn new(program: &'p Program, thread_limit: usize) -> Executor<'p> {
        Executor {
            program,
            thread_limit,
        }
    }

    /// Tries to match starting exactly at position `start`. Returns the
    /// position where the match ends.
    pub fn run(&self, input: &Input, start: usize) -> Result<Option<usize>, Error> {
        self.attempt(input, start, &mut Cache::default())
    }

    pub fn matches(&self, input: &Input, start: usize) -> Result<bool, Error> {
        Ok(self.run(input, start)?.is_some())
    }

    /// Leftmost match starting at position `first` or later, as a
    /// `(start, end)` pair of positions.
    pub fn find(&self, input: &Input, first: usize) -> Result<Option<(usize, usize)>, Error> {
        let mut cache = Cache::default();
        for start in first..=input.len() {
            if let Some(end) = self.attempt(input, start, &mut cache)? {
                return Ok(Some((start, end)));
            }
        }
        Ok(None)
    }

    fn attempt(
        &self,
        input: &Input,
        start: usize,
        cache: &mut Cache,
    ) -> Result<Option<usize>, Error> {
        cache.ready.clear();
        cache.ready.push(Thread {
            pc: self.program.start(),
            sp: start,
        });

        while let Some(mut t) = cache.ready.pop() {
            // A state seen before either failed already or is being
            // explored by the path that found it first.
            while cache.visited.insert(t) {
                match self.program[t.pc] {
                    Inst::Literal(c) => {
                        if c == SENTINEL || input.at(t.sp) != c {
                            break;
                        }
                        t.pc += 1;
                        t.sp += 1;
                    }
                    Inst::Any => {
                        if input.at(t.sp) == SENTINEL {
                            break;
                        }
                        t.pc += 1;
                        t.sp += 1;
                    }
                    Inst::Match => return Ok(Some(t.sp)),
                    Inst::Jump(goto) => t.pc = goto,
                    Inst::Split { goto1, goto2 } => {
                        if cache.ready.len() >= self.thread_limit {
                            warn!("thread limit of {} exceeded", self.thread_limit);
                            return Err(Error::ThreadLimitExceeded {
                                limit: self.thread_limit,
                            });
                        }
                        cache.ready.push(Thread {
                            pc: goto2,
                            sp: t.sp,
                        });
                        t.pc = goto1;
                    }
                    Inst::Nop => t.pc += 1,
                }
            }
        }
        Ok(None)
    }
}
