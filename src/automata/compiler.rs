use std::result;

use log::debug;

use crate::{
    ast::Ast,
    automata::bytecode::{Bytecode, InstId},
    automata::program::Inst,
    automata::ProgramError,
};

type Result = result::Result<Bytecode, ProgramError>;

/// Translates a syntax tree into a bytecode fragment.
///
/// Each node is compiled into its own [`Bytecode`] and spliced into its
/// parent's, so fragments only ever reference their own instructions.
/// Branching fragments end in a join `Nop` that the optimizer removes
/// later. The returned fragment is not terminated: the caller appends
/// the `Match` instruction.
#[derive(Debug, Default)]
pub struct Compiler {}

impl Compiler {
    pub fn new() -> Compiler {
        Compiler {}
    }

    pub fn compile(&self, ast: &Ast) -> Result {
        let bc = self.c(ast)?;
        debug!("compiled {} instructions", bc.len());
        Ok(bc)
    }

    fn c(&self, ast: &Ast) -> Result {
        match *ast {
            Ast::Literal(c) => self.c_char(c),
            Ast::Any => self.c_any(),
            Ast::Epsilon => self.c_empty(),
            Ast::Concat(ref left, ref right) => self.c_concat(left, right),
            Ast::Union(ref left, ref right) => self.c_alternation(left, right),
            Ast::Star(ref ast) => self.c_zero_or_more(ast),
            Ast::Plus(ref ast) => self.c_one_or_more(ast),
            Ast::Question(ref ast) => self.c_zero_or_one(ast),
        }
    }

    fn single(inst: Inst<InstId>) -> Bytecode {
        let mut bc = Bytecode::new();
        bc.push(inst);
        bc
    }

    fn c_char(&self, c: char) -> Result {
        Ok(Compiler::single(Inst::Literal(c)))
    }

    fn c_any(&self) -> Result {
        Ok(Compiler::single(Inst::Any))
    }

    fn c_empty(&self) -> Result {
        Ok(Compiler::single(Inst::Nop))
    }

    fn c_concat(&self, left: &Ast, right: &Ast) -> Result {
        let mut bc = self.c(left)?;
        bc.splice(self.c(right)?)?;
        Ok(bc)
    }

    //     split L1, L2
    // L1: <left>
    //     jump L3
    // L2: <right>
    // L3: nop
    fn c_alternation(&self, left: &Ast, right: &Ast) -> Result {
        let mut bc = Bytecode::new();
        let split = bc.reserve();
        bc.place(split);
        let join = bc.reserve();
        let goto1 = bc.splice(self.c(left)?)?;
        bc.push(Inst::Jump(join));
        let goto2 = bc.splice(self.c(right)?)?;
        bc.place(join);
        bc.fill(split, Inst::Split { goto1, goto2 });
        Ok(bc)
    }

    // L1: split L2, L3
    // L2: <body>
    //     jump L1
    // L3: nop
    fn c_zero_or_more(&self, ast: &Ast) -> Result {
        let mut bc = Bytecode::new();
        let split = bc.reserve();
        bc.place(split);
        let join = bc.reserve();
        let body = bc.splice(self.c(ast)?)?;
        bc.push(Inst::Jump(split));
        bc.place(join);
        bc.fill(split, Inst::Split { goto1: body, goto2: join });
        Ok(bc)
    }

    // L1: <body>
    //     split L1, L2
    // L2: nop
    fn c_one_or_more(&self, ast: &Ast) -> Result {
        let mut bc = self.c(ast)?;
        let body = bc.entry().ok_or(ProgramError::Empty)?;
        let join = bc.reserve();
        bc.push(Inst::Split { goto1: body, goto2: join });
        bc.place(join);
        Ok(bc)
    }

    //     split L1, L2
    // L1: <body>
    // L2: nop
    fn c_zero_or_one(&self, ast: &Ast) -> Result {
        let mut bc = Bytecode::new();
        let split = bc.reserve();
        bc.place(split);
        let join = bc.reserve();
        let body = bc.splice(self.c(ast)?)?;
        bc.place(join);
        bc.fill(split, Inst::Split { goto1: body, goto2: join });
        Ok(bc)
    }
}

#[cfg(test)]
mod test {
    use super::Compiler;
    use crate::ast::parser::Parser;
    use crate::ast::Ast;
    use crate::automata::program::{Inst, Program};
    use pretty_assertions::assert_eq;

    fn p(s: &str) -> Ast {
        Parser::new(s.to_string())
            .parse()
            .expect("should be valid ast")
    }

    fn c(s: &str) -> Program {
        let mut bc = Compiler::new().compile(&p(s)).expect("should compile");
        bc.push(Inst::Match);
        bc.freeze().expect("should freeze")
    }

    fn i_split(goto1: usize, goto2: usize) -> Inst {
        Inst::Split { goto1, goto2 }
    }
    fn i_char(c: char) -> Inst {
        Inst::Literal(c)
    }
    fn i_jump(goto: usize) -> Inst {
        Inst::Jump(goto)
    }

    #[test]
    fn primitives() {
        assert_eq!(c("a").insts(), &[i_char('a'), Inst::Match]);
        assert_eq!(c(".").insts(), &[Inst::Any, Inst::Match]);
        assert_eq!(c("").insts(), &[Inst::Nop, Inst::Match]);
    }

    #[test]
    fn concat() {
        assert_eq!(
            c("ab").insts(),
            &[i_char('a'), i_char('b'), Inst::Match]
        );
    }

    #[test]
    fn alternate() {
        assert_eq!(
            c("a|b").insts(),
            &[
                i_split(1, 3),
                i_char('a'),
                i_jump(4),
                i_char('b'),
                Inst::Nop,
                Inst::Match,
            ]
        );
        assert_eq!(
            c("a|b|c").insts(),
            &[
                i_split(1, 3),
                i_char('a'),
                i_jump(8),
                i_split(4, 6),
                i_char('b'),
                i_jump(7),
                i_char('c'),
                Inst::Nop,
                Inst::Nop,
                Inst::Match,
            ]
        );
    }

    #[test]
    fn repeat_zero_or_many() {
        assert_eq!(
            c("a*").insts(),
            &[i_split(1, 3), i_char('a'), i_jump(0), Inst::Nop, Inst::Match]
        );
        assert_eq!(
            c("a(bc)*").insts(),
            &[
                i_char('a'),
                i_split(2, 5),
                i_char('b'),
                i_char('c'),
                i_jump(1),
                Inst::Nop,
                Inst::Match,
            ]
        );
    }

    #[test]
    fn repeat_zero_or_one() {
        assert_eq!(
            c("a?").insts(),
            &[i_split(1, 2), i_char('a'), Inst::Nop, Inst::Match]
        );
    }

    #[test]
    fn repeat_one_or_many() {
        assert_eq!(
            c("a+").insts(),
            &[i_char('a'), i_split(0, 2), Inst::Nop, Inst::Match]
        );
        assert_eq!(
            c("(ab)+").insts(),
            &[
                i_char('a'),
                i_char('b'),
                i_split(0, 3),
                Inst::Nop,
                Inst::Match
            ]
        );
    }

    #[test]
    fn fragments_never_end_in_match() {
        let bc = Compiler::new()
            .compile(&p("a|b*"))
            .expect("should compile");
        let last = bc.code().last().copied().expect("non empty");
        assert_eq!(bc.get(last), Some(&Inst::Nop));
    }
}
