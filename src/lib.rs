//! A small regular expression engine built as a compiler pipeline.
//!
//! A pattern is tokenized and parsed into an [`ast::Ast`], compiled into a
//! graph of VM instructions ([`automata::bytecode::Bytecode`]), optimized,
//! frozen into an [`automata::program::Program`] and finally executed by a
//! non-recursive thread-list VM.
//!
//! ```
//! use vmregex::Regex;
//!
//! let re = Regex::new("a+").unwrap();
//! let m = re.find("baaab").unwrap().unwrap();
//! assert_eq!((m.start(), m.end()), (1, 4));
//! ```
//!
//! Supported syntax: literal characters, `.`, concatenation, `|`, `(...)`
//! and the suffix operators `*`, `+` and `?`.

pub mod ast;
pub mod automata;
pub mod errors;
pub mod executor;
mod regex;

pub use crate::errors::Error;
pub use crate::regex::{Match, Regex, RegexBuilder};
