use std::fmt;

/// Position of an instruction in a frozen [`Program`].
pub type InstPtr = usize;

/// The closed set of VM operations.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Opcode {
    Literal,
    Any,
    Match,
    Jump,
    Split,
    Nop,
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Opcode::Literal => "literal",
            Opcode::Any => "any",
            Opcode::Match => "match",
            Opcode::Jump => "jump",
            Opcode::Split => "split",
            Opcode::Nop => "nop",
        };
        f.write_str(name)
    }
}

/// A single VM instruction. `T` is the type of control flow edges:
/// arena handles while the program is being built, positions once it is
/// frozen.
///
/// `Literal`, `Any` and `Nop` continue with the next instruction in
/// program order. `Split` tries `goto1` before `goto2`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Inst<T = InstPtr> {
    Literal(char),
    Any,
    Match,
    Jump(T),
    Split { goto1: T, goto2: T },
    Nop,
}

impl<T: Copy> Inst<T> {
    pub fn opcode(&self) -> Opcode {
        match self {
            Inst::Literal(_) => Opcode::Literal,
            Inst::Any => Opcode::Any,
            Inst::Match => Opcode::Match,
            Inst::Jump(_) => Opcode::Jump,
            Inst::Split { .. } => Opcode::Split,
            Inst::Nop => Opcode::Nop,
        }
    }

    pub fn falls_through(&self) -> bool {
        matches!(self, Inst::Literal(_) | Inst::Any | Inst::Nop)
    }

    pub fn targets(&self) -> impl Iterator<Item = T> {
        let targets = match *self {
            Inst::Jump(goto) => [Some(goto), None],
            Inst::Split { goto1, goto2 } => [Some(goto1), Some(goto2)],
            _ => [None, None],
        };
        targets.into_iter().flatten()
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Inst<U> {
        match self {
            Inst::Literal(c) => Inst::Literal(c),
            Inst::Any => Inst::Any,
            Inst::Match => Inst::Match,
            Inst::Jump(goto) => Inst::Jump(f(goto)),
            Inst::Split { goto1, goto2 } => Inst::Split {
                goto1: f(goto1),
                goto2: f(goto2),
            },
            Inst::Nop => Inst::Nop,
        }
    }

    /// Like [`Inst::map`], stopping at the first error.
    pub fn try_map<U, E>(self, mut f: impl FnMut(T) -> Result<U, E>) -> Result<Inst<U>, E> {
        Ok(match self {
            Inst::Literal(c) => Inst::Literal(c),
            Inst::Any => Inst::Any,
            Inst::Match => Inst::Match,
            Inst::Jump(goto) => Inst::Jump(f(goto)?),
            Inst::Split { goto1, goto2 } => Inst::Split {
                goto1: f(goto1)?,
                goto2: f(goto2)?,
            },
            Inst::Nop => Inst::Nop,
        })
    }
}

/// A finished program, ready to be executed.
///
/// Built only by [`crate::automata::bytecode::Bytecode::freeze`], which
/// checks that every target is in range and that execution never falls
/// off the end. It can't be modified afterwards.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Program {
    insts: Vec<Inst>,
}

impl Program {
    pub(crate) fn new(insts: Vec<Inst>) -> Program {
        Program { insts }
    }

    pub fn insts(&self) -> &[Inst] {
        &self.insts
    }

    pub fn start(&self) -> InstPtr {
        0
    }

    pub fn len(&self) -> usize {
        self.insts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }
}

impl std::ops::Index<InstPtr> for Program {
    type Output = Inst;

    fn index(&self, pc: InstPtr) -> &Inst {
        &self.insts[pc]
    }
}

/// One line per instruction: `pc: opcode operand -> target(s)`.
impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (pc, inst) in self.insts.iter().enumerate() {
            write!(f, "{:02}: {}", pc, inst.opcode())?;
            match *inst {
                Inst::Literal(c) => write!(f, " {:?} -> {:02}", c, pc + 1)?,
                Inst::Any | Inst::Nop => write!(f, " -> {:02}", pc + 1)?,
                Inst::Jump(goto) => write!(f, " -> {:02}", goto)?,
                Inst::Split { goto1, goto2 } => write!(f, " -> {:02}, {:02}", goto1, goto2)?,
                Inst::Match => {}
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{Inst, Opcode, Program};
    use pretty_assertions::assert_eq;

    #[test]
    fn dump() {
        let program = Program::new(vec![
            Inst::Split { goto1: 1, goto2: 3 },
            Inst::Literal('a'),
            Inst::Jump(0),
            Inst::Any,
            Inst::Match,
        ]);
        assert_eq!(
            program.to_string(),
            "00: split -> 01, 03\n\
             01: literal 'a' -> 02\n\
             02: jump -> 00\n\
             03: any -> 04\n\
             04: match\n"
        );
    }

    #[test]
    fn targets() {
        let split: Inst = Inst::Split { goto1: 4, goto2: 2 };
        assert_eq!(split.targets().collect::<Vec<_>>(), vec![4, 2]);
        assert_eq!(split.opcode(), Opcode::Split);
        assert_eq!(Inst::<usize>::Literal('x').targets().count(), 0);
        assert!(Inst::<usize>::Nop.falls_through());
        assert!(!Inst::Jump(0).falls_through());
    }
}
