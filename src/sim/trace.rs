use std::collections::VecDeque;

use serde::Serialize;

use crate::cpu::isa::Instruction;
use crate::cpu::regfile::RegFile;
use crate::mem::block::Word;

/// Queues one line per executed instruction in program order.
#[derive(Debug, Default)]
pub struct Tracer {
    enabled: bool,
    buf: VecDeque<Line>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub step: u64,
    pub pc: i32,
    pub inst: Instruction,
    pub ac: Word,
    pub r1: Word,
    pub r2: Word,
}

impl Tracer {
    pub fn new(enabled: bool) -> Tracer {
        Tracer { enabled, buf: VecDeque::new() }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// `pc` is where the instruction was fetched; `regs` is the state after it
    /// executed.
    pub fn record(&mut self, step: u64, pc: i32, inst: &Instruction, regs: &RegFile) {
        if !self.enabled {
            return;
        }
        self.buf.push_back(Line {
            step,
            pc,
            inst: *inst,
            ac: regs.ac,
            r1: regs.r1,
            r2: regs.r2,
        });
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.buf.iter()
    }

    pub fn consume(&mut self) -> Option<Line> {
        self.buf.pop_front()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.buf)
    }
}
