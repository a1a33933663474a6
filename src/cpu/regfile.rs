use serde::Serialize;

use crate::cpu::isa::Opcode;
use crate::mem::block::Word;

/// Architectural state of the CPU. `ir` is `None` until the first fetch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegFile {
    pub pc: i32,
    pub ac: Word,
    pub ir: Option<Opcode>,
    pub r1: Word,
    pub r2: Word,
}

impl RegFile {
    pub fn reset(&mut self) {
        *self = RegFile::default();
    }

    pub fn halted(&self) -> bool {
        self.ir == Some(Opcode::Halt)
    }

    /// Register selected by an instruction operand (1 or 2).
    pub fn gpr(&self, selector: Word) -> Option<Word> {
        match selector {
            1 => Some(self.r1),
            2 => Some(self.r2),
            _ => None,
        }
    }

    pub fn gpr_mut(&mut self, selector: Word) -> Option<&mut Word> {
        match selector {
            1 => Some(&mut self.r1),
            2 => Some(&mut self.r2),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_map_to_general_registers() {
        let mut regs = RegFile::default();
        *regs.gpr_mut(2).unwrap() = 7;
        assert_eq!(regs.gpr(2), Some(7));
        assert_eq!(regs.gpr(1), Some(0));
        assert!(regs.gpr(3).is_none());
        assert!(regs.gpr_mut(0).is_none());
    }

    #[test]
    fn reset_clears_everything() {
        let mut regs = RegFile { pc: 4, ac: -1, ir: Some(Opcode::Halt), r1: 2, r2: 3 };
        assert!(regs.halted());
        regs.reset();
        assert_eq!(regs, RegFile::default());
        assert!(!regs.halted());
    }
}
