use std::collections::HashMap;
use std::fmt;

use crate::automata::program::{Inst, InstPtr, Program};
use crate::automata::ProgramError;

/// Stable handle of an instruction inside a [`Bytecode`] arena.
///
/// Handles stay valid when instructions are inserted, spliced or removed
/// around them, which is what lets fragments be assembled in any order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct InstId(pub(crate) usize);

impl fmt::Display for InstId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A mutable program under construction.
///
/// `arena` owns every instruction ever created for this program, `code`
/// is the execution order. Edges are [`InstId`]s into the arena, so
/// reordering `code` never invalidates them. Removing a handle from
/// `code` leaves its slot in the arena; referencing such an instruction
/// is a [`ProgramError::DanglingReference`].
#[derive(Clone, Debug, Default)]
pub struct Bytecode {
    pub(super) arena: Vec<Inst<InstId>>,
    pub(super) code: Vec<InstId>,
}

impl Bytecode {
    pub fn new() -> Bytecode {
        Bytecode::default()
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn code(&self) -> &[InstId] {
        &self.code
    }

    pub fn get(&self, id: InstId) -> Option<&Inst<InstId>> {
        self.arena.get(id.0)
    }

    pub fn entry(&self) -> Option<InstId> {
        self.code.first().copied()
    }

    pub fn insts(&self) -> impl Iterator<Item = (InstId, &Inst<InstId>)> + '_ {
        self.code.iter().map(|&id| (id, &self.arena[id.0]))
    }

    pub fn push(&mut self, inst: Inst<InstId>) -> InstId {
        let id = self.alloc(inst);
        self.code.push(id);
        id
    }

    /// Allocates a `Nop` that is not placed yet. It is either placed later
    /// as a join point or filled with the real instruction once its
    /// targets are known.
    pub fn reserve(&mut self) -> InstId {
        self.alloc(Inst::Nop)
    }

    pub fn place(&mut self, id: InstId) {
        self.code.push(id);
    }

    pub fn fill(&mut self, id: InstId, inst: Inst<InstId>) {
        match self.arena[id.0] {
            Inst::Nop => self.arena[id.0] = inst,
            ref other => unreachable!(
                "only reserved instructions can be filled, \
                 instead it was called on: {:?}",
                other
            ),
        }
    }

    fn alloc(&mut self, inst: Inst<InstId>) -> InstId {
        let id = InstId(self.arena.len());
        self.arena.push(inst);
        id
    }

    /// Appends `fragment` at the end of this program, rebasing its handles
    /// into this arena. Returns the handle of the fragment's first
    /// instruction.
    pub fn splice(&mut self, fragment: Bytecode) -> Result<InstId, ProgramError> {
        let base = self.arena.len();
        let rebase = |id: InstId| InstId(id.0 + base);
        self.arena
            .extend(fragment.arena.into_iter().map(|inst| inst.map(rebase)));
        let entry = fragment.code.first().copied().map(rebase);
        self.code.extend(fragment.code.into_iter().map(rebase));
        entry.ok_or(ProgramError::Empty)
    }

    pub(super) fn positions(&self) -> HashMap<InstId, InstPtr> {
        self.code
            .iter()
            .enumerate()
            .map(|(pos, &id)| (id, pos))
            .collect()
    }

    /// Resolves every handle to a position and returns the executable
    /// program.
    pub fn freeze(&self) -> Result<Program, ProgramError> {
        let positions = self.positions();
        let resolve = |id: InstId| {
            positions
                .get(&id)
                .copied()
                .ok_or(ProgramError::DanglingReference(id))
        };
        let insts = self
            .code
            .iter()
            .map(|&id| self.arena[id.0].try_map(resolve))
            .collect::<Result<Vec<Inst>, ProgramError>>()?;
        match insts.last() {
            None => Err(ProgramError::Empty),
            Some(last) if last.falls_through() => Err(ProgramError::FallsOffEnd),
            Some(_) => Ok(Program::new(insts)),
        }
    }
}
