use thiserror::Error;

use crate::automata::bytecode::InstId;

pub mod bytecode;
pub mod compiler;
pub mod optimizer;
pub mod program;

/// A program whose instruction graph is inconsistent. These are bugs in
/// the compiler or optimizer, never a consequence of user input.
#[derive(Error, Clone, Debug, Eq, PartialEq)]
pub enum ProgramError {
    #[error("program has no instructions")]
    Empty,
    #[error("instruction {0} is referenced but is not part of the program")]
    DanglingReference(InstId),
    #[error("instruction {0} is referenced but only nops follow it")]
    UnresolvedNop(InstId),
    #[error("jump chain starting at {0} never ends")]
    JumpCycle(InstId),
    #[error("the last instruction falls through past the end of the program")]
    FallsOffEnd,
}
