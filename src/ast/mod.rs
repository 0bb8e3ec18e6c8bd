use std::fmt;

use thiserror::Error;

pub mod lexer;
pub mod parser;

/// Marks the end of the input. It can't appear in patterns nor inputs.
pub const SENTINEL: char = '\0';

/// Syntax tree of a pattern.
///
/// Every node owns its children, so a tree is never shared nor cyclic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Ast {
    Literal(char),
    Any,
    Concat(Box<Ast>, Box<Ast>),
    Union(Box<Ast>, Box<Ast>),
    Star(Box<Ast>),
    Plus(Box<Ast>),
    Question(Box<Ast>),
    Epsilon,
}

impl Ast {
    pub fn concat(left: Ast, right: Ast) -> Ast {
        Ast::Concat(Box::new(left), Box::new(right))
    }

    pub fn union(left: Ast, right: Ast) -> Ast {
        Ast::Union(Box::new(left), Box::new(right))
    }

    pub fn star(ast: Ast) -> Ast {
        Ast::Star(Box::new(ast))
    }

    pub fn plus(ast: Ast) -> Ast {
        Ast::Plus(Box::new(ast))
    }

    pub fn question(ast: Ast) -> Ast {
        Ast::Question(Box::new(ast))
    }

    /// Joins a sequence into a balanced tree of `Concat` nodes. An empty
    /// sequence is `Epsilon`.
    pub fn concat_all(asts: Vec<Ast>) -> Ast {
        Ast::balanced(asts, Ast::concat)
    }

    /// Joins alternatives into a balanced tree of `Union` nodes, keeping
    /// their left to right priority.
    pub fn union_all(asts: Vec<Ast>) -> Ast {
        Ast::balanced(asts, Ast::union)
    }

    // Both operators are associative, so halving keeps the tree depth
    // logarithmic in the number of operands.
    fn balanced(mut asts: Vec<Ast>, join: fn(Ast, Ast) -> Ast) -> Ast {
        if asts.len() <= 1 {
            return asts.pop().unwrap_or(Ast::Epsilon);
        }
        let right = asts.split_off(asts.len() / 2);
        join(Ast::balanced(asts, join), Ast::balanced(right, join))
    }

    pub fn depth(&self) -> usize {
        match self {
            Ast::Literal(_) | Ast::Any | Ast::Epsilon => 1,
            Ast::Concat(l, r) | Ast::Union(l, r) => 1 + l.depth().max(r.depth()),
            Ast::Star(a) | Ast::Plus(a) | Ast::Question(a) => 1 + a.depth(),
        }
    }
}

impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ast::Literal(c) => write!(f, "Literal({:?})", c),
            Ast::Any => write!(f, "Any"),
            Ast::Concat(l, r) => write!(f, "Concat({}, {})", l, r),
            Ast::Union(l, r) => write!(f, "Union({}, {})", l, r),
            Ast::Star(a) => write!(f, "Star({})", a),
            Ast::Plus(a) => write!(f, "Plus({})", a),
            Ast::Question(a) => write!(f, "Question({})", a),
            Ast::Epsilon => write!(f, "Epsilon"),
        }
    }
}

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct Position {
    pub offset: usize,
}
impl Position {
    pub fn new(offset: usize) -> Position {
        Position { offset }
    }
}

#[derive(Clone, Copy, Eq, PartialEq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn point(pos: Position) -> Span {
        Span {
            start: pos,
            end: pos,
        }
    }

    pub fn new(start: Position, end: Position) -> Span {
        Span { start, end }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({:?}, {:?})", self.start, self.end)
    }
}

/// A syntax error, with the offending part of the pattern.
#[derive(Error, Clone, Debug, Eq, PartialEq)]
#[error("syntax error: {kind} at {}..{} in {pattern:?}", .span.start.offset, .span.end.offset)]
pub struct Error {
    kind: ErrorKind,
    pattern: String,
    span: Span,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, pattern: &str, span: Span) -> Error {
        Error {
            kind,
            pattern: pattern.to_string(),
            span,
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}

#[derive(Error, Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
    },
    #[error("repetition operator without an operand")]
    RepetitionMissing,
    #[error("unopened group")]
    GroupUnopened,
    #[error("unclosed group")]
    GroupUnclosed,
    #[error("nesting deeper than {0}")]
    NestLimitExceeded(u32),
    #[error("reserved character in pattern")]
    ReservedCharacter,
}

#[cfg(test)]
mod test {
    use super::Ast;
    use pretty_assertions::assert_eq;

    fn lit(c: char) -> Ast {
        Ast::Literal(c)
    }

    #[test]
    fn concat_all_is_balanced() {
        assert_eq!(Ast::concat_all(vec![]), Ast::Epsilon);
        assert_eq!(Ast::concat_all(vec![lit('a')]), lit('a'));
        assert_eq!(
            Ast::concat_all(vec![lit('a'), lit('b'), lit('c'), lit('d')]),
            Ast::concat(
                Ast::concat(lit('a'), lit('b')),
                Ast::concat(lit('c'), lit('d'))
            )
        );
        let long = Ast::concat_all((0..1024).map(|_| lit('x')).collect());
        assert_eq!(long.depth(), 11);
    }

    #[test]
    fn union_all_keeps_order() {
        assert_eq!(
            Ast::union_all(vec![lit('a'), lit('b'), lit('c')]),
            Ast::union(lit('a'), Ast::union(lit('b'), lit('c')))
        );
    }

    #[test]
    fn display() {
        let ast = Ast::concat(lit('a'), Ast::star(Ast::union(Ast::Any, Ast::Epsilon)));
        assert_eq!(
            ast.to_string(),
            "Concat(Literal('a'), Star(Union(Any, Epsilon)))"
        );
    }
}
