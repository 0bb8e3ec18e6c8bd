//! Size reducing passes over a finished [`Bytecode`].
//!
//! The passes never change the language a program matches. They must run
//! in the order used by [`Bytecode::optimize`]: jump collapsing expects
//! nops to be gone, and pruning expects chains to be collapsed.

use std::collections::HashMap;

use log::debug;

use crate::automata::bytecode::{Bytecode, InstId};
use crate::automata::program::Inst;
use crate::automata::ProgramError;

impl Bytecode {
    pub fn optimize(&mut self) -> Result<(), ProgramError> {
        let before = self.len();
        self.elide_nops()?;
        debug!("nop elision: {} -> {} instructions", before, self.len());
        self.collapse_jump_chains()?;
        let before = self.len();
        self.prune_unreachable_jumps();
        debug!("unreachable jump pruning: {} -> {} instructions", before, self.len());
        Ok(())
    }

    /// Removes every `Nop`. References to a `Nop` are redirected to the
    /// first instruction after it that is not a `Nop`.
    pub fn elide_nops(&mut self) -> Result<(), ProgramError> {
        let positions = self.positions();
        // next_real[i]: the first non-nop at position i or later.
        let mut next_real = vec![None; self.code.len() + 1];
        for (pos, &id) in self.code.iter().enumerate().rev() {
            next_real[pos] = match self.arena[id.0] {
                Inst::Nop => next_real[pos + 1],
                _ => Some(id),
            };
        }
        let redirect = |target: InstId| -> Result<InstId, ProgramError> {
            let pos = positions
                .get(&target)
                .ok_or(ProgramError::DanglingReference(target))?;
            next_real[*pos].ok_or(ProgramError::UnresolvedNop(target))
        };
        for &id in &self.code {
            self.arena[id.0] = self.arena[id.0].try_map(redirect)?;
        }
        self.code.retain(|id| self.arena[id.0] != Inst::Nop);
        Ok(())
    }

    /// Points every branch whose target is a `Jump` at the end of the jump
    /// chain. No instruction is removed.
    pub fn collapse_jump_chains(&mut self) -> Result<(), ProgramError> {
        // A chain can't be longer than the program without repeating.
        let limit = self.code.len();
        for &id in &self.code {
            let arena = &self.arena;
            let collapsed = arena[id.0].try_map(|target| chain_end(arena, target, limit))?;
            self.arena[id.0] = collapsed;
        }
        Ok(())
    }

    /// Removes jumps that directly follow another jump and are not the
    /// target of any branch. Nothing can reach them.
    pub fn prune_unreachable_jumps(&mut self) {
        let mut references: HashMap<InstId, usize> = HashMap::new();
        for (_, inst) in self.insts() {
            for target in inst.targets() {
                *references.entry(target).or_default() += 1;
            }
        }
        let mut pos = self.code.len();
        while pos > 1 {
            pos -= 1;
            let id = self.code[pos];
            let referenced = references.get(&id).copied().unwrap_or(0) > 0;
            if self.is_jump_at(pos) && self.is_jump_at(pos - 1) && !referenced {
                for target in self.arena[id.0].targets() {
                    if let Some(count) = references.get_mut(&target) {
                        *count -= 1;
                    }
                }
                self.code.remove(pos);
            }
        }
    }

    fn is_jump_at(&self, pos: usize) -> bool {
        matches!(self.arena[self.code[pos].0], Inst::Jump(_))
    }
}

fn chain_end(
    arena: &[Inst<InstId>],
    start: InstId,
    limit: usize,
) -> Result<InstId, ProgramError> {
    let mut dst = start;
    for _ in 0..=limit {
        match arena.get(dst.0) {
            Some(Inst::Jump(next)) => dst = *next,
            Some(_) => return Ok(dst),
            None => return Err(ProgramError::DanglingReference(dst)),
        }
    }
    Err(ProgramError::JumpCycle(start))
}

#[cfg(test)]
mod test {
    use crate::ast::parser::Parser;
    use crate::automata::bytecode::Bytecode;
    use crate::automata::compiler::Compiler;
    use crate::automata::program::{Inst, Program};
    use crate::automata::ProgramError;
    use crate::executor::{Executor, Input, DEFAULT_THREAD_LIMIT};
    use pretty_assertions::assert_eq;

    fn bc(s: &str) -> Bytecode {
        let ast = Parser::new(s.to_string())
            .parse()
            .expect("should be valid ast");
        let mut bc = Compiler::new().compile(&ast).expect("should compile");
        bc.push(Inst::Match);
        bc
    }

    fn optimized(s: &str) -> Program {
        let mut bc = bc(s);
        bc.optimize().expect("should optimize");
        bc.freeze().expect("should freeze")
    }

    fn i_split(goto1: usize, goto2: usize) -> Inst {
        Inst::Split { goto1, goto2 }
    }

    // Leftmost-first match of `program` in `s` as (start, end) positions.
    fn find(program: &Program, s: &str) -> Option<(usize, usize)> {
        let input = Input::new(s).expect("valid input");
        Executor::new(program, DEFAULT_THREAD_LIMIT)
            .find(&input, 0)
            .expect("within thread limit")
    }

    #[test]
    fn elide_nops() {
        assert_eq!(optimized("").insts(), &[Inst::Match]);
        assert_eq!(
            optimized("a|b").insts(),
            &[
                i_split(1, 3),
                Inst::Literal('a'),
                Inst::Jump(4),
                Inst::Literal('b'),
                Inst::Match,
            ]
        );
        assert_eq!(
            optimized("a*").insts(),
            &[i_split(1, 3), Inst::Literal('a'), Inst::Jump(0), Inst::Match]
        );
        assert_eq!(
            optimized("a+").insts(),
            &[Inst::Literal('a'), i_split(0, 2), Inst::Match]
        );
        assert_eq!(
            optimized("a?").insts(),
            &[i_split(1, 2), Inst::Literal('a'), Inst::Match]
        );
    }

    #[test]
    fn collapse_jump_chains() {
        let mut program = bc("(a|b)|c");
        program.elide_nops().expect("should elide");
        assert_eq!(
            program.freeze().expect("should freeze").insts()[3],
            Inst::Jump(5)
        );
        program.collapse_jump_chains().expect("should collapse");
        assert_eq!(
            program.freeze().expect("should freeze").insts(),
            &[
                i_split(1, 6),
                i_split(2, 4),
                Inst::Literal('a'),
                Inst::Jump(7),
                Inst::Literal('b'),
                Inst::Jump(7),
                Inst::Literal('c'),
                Inst::Match,
            ]
        );
    }

    #[test]
    fn prune_unreachable_jumps() {
        assert_eq!(
            optimized("(a*|b)").insts(),
            &[
                i_split(1, 4),
                i_split(2, 5),
                Inst::Literal('a'),
                Inst::Jump(1),
                Inst::Literal('b'),
                Inst::Match,
            ]
        );
        assert_eq!(
            optimized("(a*)*").insts(),
            &[
                i_split(1, 4),
                i_split(2, 0),
                Inst::Literal('a'),
                Inst::Jump(1),
                Inst::Match,
            ]
        );
    }

    #[test]
    fn jump_cycle_is_an_error() {
        let mut program = Bytecode::new();
        let first = program.reserve();
        let second = program.push(Inst::Jump(first));
        program.place(first);
        program.fill(first, Inst::Jump(second));
        program.push(Inst::Match);
        assert!(matches!(
            program.collapse_jump_chains(),
            Err(ProgramError::JumpCycle(_))
        ));
    }

    #[test]
    fn trailing_nop_is_an_error() {
        let mut program = Bytecode::new();
        let join = program.reserve();
        program.push(Inst::Jump(join));
        program.place(join);
        assert_eq!(
            program.elide_nops(),
            Err(ProgramError::UnresolvedNop(join))
        );
    }

    #[test]
    fn idempotent() {
        for pattern in ["", "a|b", "(a*|b)", "(a*)*", "((a|b)|c)*d", "x(y?z+)*|."] {
            let once = optimized(pattern);
            let mut twice = bc(pattern);
            twice.optimize().expect("should optimize");
            twice.optimize().expect("should optimize again");
            assert_eq!(twice.freeze().expect("should freeze"), once, "{}", pattern);
        }
    }

    #[test]
    fn preserves_semantics() {
        let patterns = [
            "",
            "abc",
            "a|b",
            "a|ab",
            "ab|a",
            "a*",
            "a+b",
            "a?b",
            "(a|b)*c",
            "(a*|b)c",
            "(a*)*b",
            "((a|b)|c)+",
            "a(bc|cd)*e",
            "x.?y",
            "()*a",
            "(a|)+",
        ];
        let inputs = [
            "", "a", "b", "ab", "aab", "abc", "bbc", "cab", "ae", "abce", "acdbce", "xy",
            "xzy", "xzzy", "aaab", "ba",
        ];
        for pattern in patterns {
            let plain = bc(pattern).freeze().expect("should freeze");
            let optimized = optimized(pattern);
            for input in inputs {
                assert_eq!(
                    find(&plain, input),
                    find(&optimized, input),
                    "pattern {:?} input {:?}",
                    pattern,
                    input
                );
            }
        }
    }
}
