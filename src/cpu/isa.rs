use std::fmt::{Display, Formatter};

use anyhow::{anyhow, bail, Context};
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::{FromPrimitive, ToPrimitive};
use phf::phf_map;
use serde::Serialize;

use crate::mem::block::Word;

/// Closed opcode set. Discriminants are the numeric codes used in program
/// files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i32)]
pub enum Opcode {
    Halt = -1,
    Add = 1,
    Sub = 2,
    Mul = 3,
    Div = 4,
    CopyRegToMem = 5,
    CopyMemToReg = 6,
    CopyImmediateToReg = 7,
    Jump = 10,
    JumpIfZero = 11,
    JumpIfNonzero = 12,
    JumpIfGt = 13,
    JumpIfLt = 14,
}

/// Legacy code that behaved exactly like `CopyRegToMem`.
const OBTAIN_REG_CODE: i32 = 8;

static MNEMONICS: phf::Map<&'static str, Opcode> = phf_map! {
    "halt" => Opcode::Halt,
    "add" => Opcode::Add,
    "sub" => Opcode::Sub,
    "mul" => Opcode::Mul,
    "div" => Opcode::Div,
    "store" => Opcode::CopyRegToMem,
    "load" => Opcode::CopyMemToReg,
    "li" => Opcode::CopyImmediateToReg,
    "jmp" => Opcode::Jump,
    "jz" => Opcode::JumpIfZero,
    "jnz" => Opcode::JumpIfNonzero,
    "jgt" => Opcode::JumpIfGt,
    "jlt" => Opcode::JumpIfLt,
};

impl Opcode {
    pub fn from_code(code: i32) -> Option<Opcode> {
        match code {
            OBTAIN_REG_CODE => Some(Opcode::CopyRegToMem),
            _ => Opcode::from_i32(code),
        }
    }

    pub fn code(self) -> i32 {
        self.to_i32().unwrap_or_default()
    }

    pub fn from_mnemonic(name: &str) -> Option<Opcode> {
        MNEMONICS.get(name.to_ascii_lowercase().as_str()).copied()
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Halt => "halt",
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Mul => "mul",
            Opcode::Div => "div",
            Opcode::CopyRegToMem => "store",
            Opcode::CopyMemToReg => "load",
            Opcode::CopyImmediateToReg => "li",
            Opcode::Jump => "jmp",
            Opcode::JumpIfZero => "jz",
            Opcode::JumpIfNonzero => "jnz",
            Opcode::JumpIfGt => "jgt",
            Opcode::JumpIfLt => "jlt",
        }
    }

    pub fn is_jump(self) -> bool {
        matches!(
            self,
            Opcode::Jump
                | Opcode::JumpIfZero
                | Opcode::JumpIfNonzero
                | Opcode::JumpIfGt
                | Opcode::JumpIfLt
        )
    }
}

impl Display for Opcode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// One decoded instruction. Operands are addresses, register selectors or
/// immediates depending on the opcode; unused slots are zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Instruction {
    pub opcode: Opcode,
    pub op1: Word,
    pub op2: Word,
    pub op3: Word,
}

impl Instruction {
    pub const fn new(opcode: Opcode, op1: Word, op2: Word, op3: Word) -> Self {
        Self { opcode, op1, op2, op3 }
    }

    pub const fn halt() -> Self {
        Self::new(Opcode::Halt, 0, 0, 0)
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {} {}", self.opcode, self.op1, self.op2, self.op3)
    }
}

/// Ordered, read-only instruction sequence. Its length bounds the program
/// counter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    insts: Vec<Instruction>,
}

impl Program {
    pub fn new(insts: Vec<Instruction>) -> Self {
        Self { insts }
    }

    pub fn len(&self) -> usize {
        self.insts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }

    pub fn insts(&self) -> &[Instruction] {
        &self.insts
    }

    /// `None` once the program counter leaves the program.
    pub fn fetch(&self, pc: i32) -> Option<&Instruction> {
        usize::try_from(pc).ok().and_then(|idx| self.insts.get(idx))
    }

    pub fn contains_pc(&self, pc: i32) -> bool {
        self.fetch(pc).is_some()
    }

    /// Parses one instruction per line: an opcode mnemonic or numeric code
    /// followed by up to three integer operands. `#` starts a comment.
    pub fn parse(text: &str) -> anyhow::Result<Program> {
        let mut insts = Vec::new();
        for (lineno, raw) in text.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let inst = parse_line(line)
                .with_context(|| format!("line {}: '{}'", lineno + 1, raw.trim()))?;
            insts.push(inst);
        }
        Ok(Program::new(insts))
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (pc, inst) in self.insts.iter().enumerate() {
            writeln!(f, "{:4}: {}", pc, inst)?;
        }
        Ok(())
    }
}

impl From<Vec<Instruction>> for Program {
    fn from(insts: Vec<Instruction>) -> Self {
        Program::new(insts)
    }
}

fn parse_line(line: &str) -> anyhow::Result<Instruction> {
    let mut fields = line.split(|c: char| c.is_whitespace() || c == ',').filter(|f| !f.is_empty());
    let head = fields.next().ok_or_else(|| anyhow!("missing opcode"))?;
    let opcode = match head.parse::<i32>() {
        Ok(code) => {
            Opcode::from_code(code).ok_or_else(|| anyhow!("unknown opcode code {}", code))?
        }
        Err(_) => {
            Opcode::from_mnemonic(head).ok_or_else(|| anyhow!("unknown mnemonic '{}'", head))?
        }
    };

    let mut operands = [0 as Word; 3];
    for (idx, field) in fields.enumerate() {
        if idx >= operands.len() {
            bail!("too many operands");
        }
        operands[idx] = field.parse().with_context(|| format!("bad operand '{}'", field))?;
    }
    Ok(Instruction::new(opcode, operands[0], operands[1], operands[2]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_codes_round_trip() {
        for op in [Opcode::Halt, Opcode::Div, Opcode::CopyImmediateToReg, Opcode::JumpIfLt] {
            assert_eq!(Opcode::from_code(op.code()), Some(op));
        }
        assert_eq!(Opcode::Halt.code(), -1);
        assert_eq!(Opcode::from_code(8), Some(Opcode::CopyRegToMem));
        assert_eq!(Opcode::from_code(0), None);
        assert_eq!(Opcode::from_code(9), None);
    }

    #[test]
    fn mnemonics_are_case_insensitive() {
        assert_eq!(Opcode::from_mnemonic("JGT"), Some(Opcode::JumpIfGt));
        assert_eq!(Opcode::from_mnemonic("nop"), None);
    }

    #[test]
    fn parses_mnemonics_codes_and_comments() {
        let program = Program::parse(
            "# factorial tail\n\
             sub 1 2 5\n\
             \n\
             13 4        # jgt, trailing operands default to zero\n\
             li 1, -3\n\
             halt\n",
        )
        .unwrap();
        assert_eq!(
            program.insts(),
            &[
                Instruction::new(Opcode::Sub, 1, 2, 5),
                Instruction::new(Opcode::JumpIfGt, 4, 0, 0),
                Instruction::new(Opcode::CopyImmediateToReg, 1, -3, 0),
                Instruction::halt(),
            ]
        );
    }

    #[test]
    fn parse_errors_name_the_line() {
        let err = Program::parse("add 1 2 3\nfrob 1\n").unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
        assert!(Program::parse("add 1 2 3 4").is_err());
        assert!(Program::parse("add x").is_err());
    }

    #[test]
    fn fetch_is_bounded_by_program_length() {
        let program = Program::new(vec![Instruction::halt()]);
        assert!(program.fetch(0).is_some());
        assert!(program.fetch(1).is_none());
        assert!(program.fetch(-1).is_none());
    }
}
