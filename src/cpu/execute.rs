use std::sync::Arc;

use log::{error, warn};
use serde::Serialize;

use crate::base::error::{SimError, SimResult};
use crate::cpu::isa::{Instruction, Opcode, Program};
use crate::cpu::regfile::RegFile;
use crate::mem::block::Word;
use crate::mem::ucm::Ucm;
use crate::sim::log::{LogLevel, Logger};
use crate::sim::trace::Tracer;
use crate::{debug, info};

/// What a single `execute` call did to the control state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Halted,
    PcOutOfRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunOutcome {
    Halted { steps: u64 },
    PcOutOfRange { steps: u64, pc: i32 },
    TimedOut { steps: u64 },
}

impl RunOutcome {
    pub fn steps(&self) -> u64 {
        match *self {
            RunOutcome::Halted { steps }
            | RunOutcome::PcOutOfRange { steps, .. }
            | RunOutcome::TimedOut { steps } => steps,
        }
    }
}

/// Fetch-decode-execute engine. Every operand read and result write goes
/// through the cache manager; the CPU keeps no timing of its own.
pub struct Cpu {
    regs: RegFile,
    steps: u64,
    logger: Arc<Logger>,
    tracer: Tracer,
}

impl Cpu {
    pub fn new(logger: &Arc<Logger>, trace: bool) -> Self {
        Cpu {
            regs: RegFile::default(),
            steps: 0,
            logger: logger.clone(),
            tracer: Tracer::new(trace),
        }
    }

    pub fn regs(&self) -> &RegFile {
        &self.regs
    }

    pub fn regs_mut(&mut self) -> &mut RegFile {
        &mut self.regs
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    pub fn tracer_mut(&mut self) -> &mut Tracer {
        &mut self.tracer
    }

    pub fn reset(&mut self) {
        self.regs.reset();
        self.steps = 0;
    }

    /// Executes the instruction at PC.
    ///
    /// A zero divisor sets AC to 0 and returns `DivisionByZero` without
    /// writing a result or advancing PC, so the next call fetches the same
    /// DIV again.
    pub fn execute(&mut self, ucm: &mut Ucm, program: &Program) -> SimResult<Step> {
        let pc = self.regs.pc;
        let inst = match program.fetch(pc) {
            Some(inst) => *inst,
            None => return Ok(Step::PcOutOfRange),
        };
        self.regs.ir = Some(inst.opcode);
        self.steps += 1;
        debug!(self.logger, "pc {:4}: {}", pc, inst);

        match inst.opcode {
            Opcode::Halt => {
                self.logger.always(LogLevel::Info, format_args!("program ended at pc {}", pc));
                self.tracer.record(self.steps - 1, pc, &inst, &self.regs);
                return Ok(Step::Halted);
            }
            Opcode::Add | Opcode::Sub | Opcode::Mul => {
                self.load_operands(ucm, &inst)?;
                let (a, b) = (self.regs.r1, self.regs.r2);
                self.regs.ac = match inst.opcode {
                    Opcode::Add => a.wrapping_add(b),
                    Opcode::Sub => a.wrapping_sub(b),
                    _ => a.wrapping_mul(b),
                };
                let dst = Self::address(ucm, inst.op3)?;
                ucm.write(dst, self.regs.ac)?;
            }
            Opcode::Div => {
                self.load_operands(ucm, &inst)?;
                if self.regs.r2 == 0 {
                    self.regs.ac = 0;
                    self.tracer.record(self.steps - 1, pc, &inst, &self.regs);
                    let err = SimError::DivisionByZero { pc };
                    warn!("{}", err);
                    self.logger.always(LogLevel::Warn, format_args!("{}", err));
                    return Err(err);
                }
                self.regs.ac = self.regs.r1.wrapping_div(self.regs.r2);
                let dst = Self::address(ucm, inst.op3)?;
                ucm.write(dst, self.regs.ac)?;
            }
            Opcode::CopyImmediateToReg => match self.regs.gpr_mut(inst.op1) {
                Some(reg) => *reg = inst.op2,
                None => Self::bad_selector(pc, &inst),
            },
            Opcode::CopyRegToMem => match self.regs.gpr(inst.op1) {
                Some(value) => {
                    let dst = Self::address(ucm, inst.op2)?;
                    ucm.write(dst, value)?;
                }
                None => Self::bad_selector(pc, &inst),
            },
            Opcode::CopyMemToReg => {
                if self.regs.gpr(inst.op1).is_some() {
                    let src = Self::address(ucm, inst.op2)?;
                    let value = ucm.read(src)?;
                    if let Some(reg) = self.regs.gpr_mut(inst.op1) {
                        *reg = value;
                    }
                } else {
                    Self::bad_selector(pc, &inst);
                }
            }
            Opcode::Jump => self.jump(inst.op1),
            Opcode::JumpIfZero => {
                if self.regs.ac == 0 {
                    self.jump(inst.op1);
                }
            }
            Opcode::JumpIfNonzero => {
                if self.regs.ac != 0 {
                    self.jump(inst.op1);
                }
            }
            Opcode::JumpIfGt => {
                if self.regs.ac > 0 {
                    self.jump(inst.op1);
                }
            }
            Opcode::JumpIfLt => {
                if self.regs.ac < 0 {
                    self.jump(inst.op1);
                }
            }
        }

        self.regs.pc = self.regs.pc.wrapping_add(1);
        self.tracer.record(self.steps - 1, pc, &inst, &self.regs);
        Ok(Step::Continue)
    }

    /// Resets the registers and executes until HALT, until PC leaves the
    /// program, or until `max_steps` instructions have run. A DIV by zero
    /// does not end the run; it keeps refetching the same instruction.
    pub fn run(
        &mut self,
        ucm: &mut Ucm,
        program: &Program,
        max_steps: u64,
    ) -> SimResult<RunOutcome> {
        self.reset();
        info!(self.logger, "running program of {} instructions", program.len());

        loop {
            if self.regs.halted() {
                return Ok(RunOutcome::Halted { steps: self.steps });
            }
            if !program.contains_pc(self.regs.pc) {
                info!(self.logger, "pc {} left the program, stopping", self.regs.pc);
                return Ok(RunOutcome::PcOutOfRange { steps: self.steps, pc: self.regs.pc });
            }
            if self.steps >= max_steps {
                warn!("gave up after {} instructions at pc {}", self.steps, self.regs.pc);
                return Ok(RunOutcome::TimedOut { steps: self.steps });
            }

            match self.execute(ucm, program) {
                Ok(_) => {}
                Err(err) if err.is_division_by_zero() => {}
                Err(err) => {
                    error!("{} at pc {}", err, self.regs.pc);
                    return Err(err);
                }
            }
        }
    }

    fn load_operands(&mut self, ucm: &mut Ucm, inst: &Instruction) -> SimResult<()> {
        let a = Self::address(ucm, inst.op1)?;
        self.regs.r1 = ucm.read(a)?;
        let b = Self::address(ucm, inst.op2)?;
        self.regs.r2 = ucm.read(b)?;
        Ok(())
    }

    // the trailing increment lands PC on the target
    fn jump(&mut self, target: Word) {
        self.regs.pc = target.wrapping_sub(1);
    }

    fn address(ucm: &Ucm, operand: Word) -> SimResult<usize> {
        usize::try_from(operand)
            .map_err(|_| SimError::word_out_of_bounds(operand as i64, ucm.capacity()))
    }

    fn bad_selector(pc: i32, inst: &Instruction) {
        warn!("pc {}: register selector {} is neither 1 nor 2, ignoring {}", pc, inst.op1, inst);
    }
}
