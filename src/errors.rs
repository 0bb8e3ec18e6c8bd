use thiserror::Error;

use crate::ast;
use crate::automata::ProgramError;

/// Errors returned while building or running a [`crate::Regex`].
#[derive(Error, Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// The pattern is malformed. No regex is produced.
    #[error(transparent)]
    Syntax(#[from] ast::Error),

    /// A single match call needed more concurrent threads than allowed.
    /// The regex stays usable for later calls.
    #[error("thread limit of {limit} exceeded")]
    ThreadLimitExceeded { limit: usize },

    /// The input contains the character reserved as end-of-input marker.
    #[error("input contains the reserved end-of-input character at offset {offset}")]
    SentinelInInput { offset: usize },

    /// The start offset is past the end or not on a character boundary.
    #[error("start offset {offset} is not a character boundary of the input")]
    InvalidStart { offset: usize },

    /// Compilation or optimization produced an inconsistent program.
    #[error("internal error: {0}")]
    Internal(#[from] ProgramError),
}
