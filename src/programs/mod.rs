//! Canned programs for exercising the hierarchy. Every generator initialises
//! its own data through instructions, so all of them run against a zeroed
//! store.

use std::ops::Range;

use anyhow::{bail, ensure};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cpu::isa::{Instruction, Opcode, Program};
use crate::mem::block::Word;

pub const NAMES: [&str; 6] = ["mult", "fibonacci", "factorial", "div", "sum_matrix", "mat_mul"];

#[derive(Debug, Clone)]
pub struct SampleProgram {
    pub name: String,
    pub program: Program,
    /// Labelled address ranges holding the results.
    pub outputs: Vec<(&'static str, Range<usize>)>,
    /// Smallest store that fits the program's data.
    pub min_words: usize,
}

impl SampleProgram {
    pub fn output(&self, label: &str) -> Option<Range<usize>> {
        self.outputs
            .iter()
            .find(|(name, _)| *name == label)
            .map(|(_, range)| range.clone())
    }
}

/// Picks a generator by name; `args` are its integer parameters. Matrix
/// programs are checked against `capacity` words before any code is emitted.
pub fn by_name(
    name: &str,
    args: &[Word],
    seed: u64,
    capacity: usize,
) -> anyhow::Result<SampleProgram> {
    let arg = |idx: usize| -> anyhow::Result<Word> {
        args.get(idx)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("program '{}' needs argument #{}", name, idx + 1))
    };
    let size = |idx: usize| -> anyhow::Result<usize> {
        let value = arg(idx)?;
        ensure!(value > 0, "matrix size must be positive, got {}", value);
        Ok(value as usize)
    };
    // three size*size matrices plus `extra` scratch words
    let fits = |size: usize, extra: usize| -> anyhow::Result<usize> {
        let words = size
            .checked_mul(size)
            .and_then(|n| n.checked_mul(3))
            .and_then(|n| n.checked_add(extra))
            .filter(|&words| words <= Word::MAX as usize)
            .ok_or_else(|| anyhow::anyhow!("matrix size {} overflows the address space", size))?;
        ensure!(
            words <= capacity,
            "program '{}' needs {} words of storage, the store has {}",
            name,
            words,
            capacity
        );
        Ok(size)
    };

    let sample = match name {
        "mult" => mult(arg(0)?, arg(1)?),
        "fibonacci" => fibonacci(arg(0)?),
        "factorial" => factorial(arg(0)?),
        "div" => div(arg(0)?, arg(1)?),
        "sum_matrix" => sum_matrix(fits(size(0)?, 0)?, seed),
        "mat_mul" => mat_mul(fits(size(0)?, 1)?, seed),
        _ => bail!("unknown program '{}', expected one of: {}", name, NAMES.join(", ")),
    };
    Ok(sample)
}

/// Small assembler with back-patching for forward jumps.
#[derive(Default)]
struct Asm {
    insts: Vec<Instruction>,
}

impl Asm {
    fn here(&self) -> Word {
        self.insts.len() as Word
    }

    fn emit(&mut self, opcode: Opcode, op1: Word, op2: Word, op3: Word) -> usize {
        self.insts.push(Instruction::new(opcode, op1, op2, op3));
        self.insts.len() - 1
    }

    fn jump(&mut self, opcode: Opcode, target: Word) -> usize {
        debug_assert!(opcode.is_jump());
        self.emit(opcode, target, 0, 0)
    }

    fn patch(&mut self, at: usize, target: Word) {
        self.insts[at].op1 = target;
    }

    /// mem[addr] = value, through R1
    fn set(&mut self, addr: usize, value: Word) {
        self.emit(Opcode::CopyImmediateToReg, 1, value, 0);
        self.emit(Opcode::CopyRegToMem, 1, addr as Word, 0);
    }

    fn finish(mut self) -> Program {
        self.emit(Opcode::Halt, 0, 0, 0);
        Program::new(self.insts)
    }
}

/// `a * b` by repeated addition into address 0. `b` must be non-negative.
pub fn mult(a: Word, b: Word) -> SampleProgram {
    const RESULT: usize = 0;
    const A: usize = 1;
    const COUNTER: usize = 2;
    const B: usize = 3;
    const ONE: usize = 4;
    const SCRATCH: usize = 5;

    let mut asm = Asm::default();
    asm.set(RESULT, 0);
    asm.set(A, a);
    asm.set(COUNTER, 0);
    asm.set(B, b);
    asm.set(ONE, 1);

    let top = asm.here();
    asm.emit(Opcode::Sub, B as Word, COUNTER as Word, SCRATCH as Word);
    let to_body = asm.jump(Opcode::JumpIfGt, 0);
    let to_end = asm.jump(Opcode::Jump, 0);
    let body = asm.here();
    asm.patch(to_body, body);
    asm.emit(Opcode::Add, RESULT as Word, A as Word, RESULT as Word);
    asm.emit(Opcode::Add, COUNTER as Word, ONE as Word, COUNTER as Word);
    asm.jump(Opcode::Jump, top);
    let end = asm.here();
    asm.patch(to_end, end);

    SampleProgram {
        name: "mult".to_string(),
        program: asm.finish(),
        outputs: vec![("product", RESULT..RESULT + 1)],
        min_words: SCRATCH + 1,
    }
}

/// F(n) into address 0, with F(0) = 0 and F(1) = 1.
pub fn fibonacci(n: Word) -> SampleProgram {
    const PREV: usize = 0;
    const CUR: usize = 1;
    const COUNTER: usize = 2;
    const ONE: usize = 3;
    const NEXT: usize = 4;
    const ZERO: usize = 5;
    const SCRATCH: usize = 6;

    let mut asm = Asm::default();
    asm.set(PREV, 0);
    asm.set(CUR, 1);
    asm.set(COUNTER, n);
    asm.set(ONE, 1);
    asm.set(ZERO, 0);

    let top = asm.here();
    asm.emit(Opcode::Add, COUNTER as Word, ZERO as Word, SCRATCH as Word);
    let to_body = asm.jump(Opcode::JumpIfGt, 0);
    let to_end = asm.jump(Opcode::Jump, 0);
    let body = asm.here();
    asm.patch(to_body, body);
    asm.emit(Opcode::Add, PREV as Word, CUR as Word, NEXT as Word);
    asm.emit(Opcode::CopyMemToReg, 1, CUR as Word, 0);
    asm.emit(Opcode::CopyMemToReg, 2, NEXT as Word, 0);
    asm.emit(Opcode::CopyRegToMem, 1, PREV as Word, 0);
    asm.emit(Opcode::CopyRegToMem, 2, CUR as Word, 0);
    asm.emit(Opcode::Sub, COUNTER as Word, ONE as Word, COUNTER as Word);
    asm.jump(Opcode::Jump, top);
    let end = asm.here();
    asm.patch(to_end, end);

    SampleProgram {
        name: "fibonacci".to_string(),
        program: asm.finish(),
        outputs: vec![("fib", PREV..PREV + 1)],
        min_words: SCRATCH + 1,
    }
}

/// n! into address 0; any n < 1 yields 1.
pub fn factorial(n: Word) -> SampleProgram {
    const RESULT: usize = 0;
    const COUNTER: usize = 1;
    const ONE: usize = 2;
    const SCRATCH: usize = 3;

    let mut asm = Asm::default();
    asm.set(RESULT, 1);
    asm.set(COUNTER, n);
    asm.set(ONE, 1);

    let top = asm.here();
    asm.emit(Opcode::Sub, COUNTER as Word, ONE as Word, SCRATCH as Word);
    let to_end = asm.jump(Opcode::JumpIfLt, 0);
    asm.emit(Opcode::Mul, RESULT as Word, COUNTER as Word, RESULT as Word);
    asm.emit(Opcode::Sub, COUNTER as Word, ONE as Word, COUNTER as Word);
    asm.jump(Opcode::Jump, top);
    let end = asm.here();
    asm.patch(to_end, end);

    SampleProgram {
        name: "factorial".to_string(),
        program: asm.finish(),
        outputs: vec![("factorial", RESULT..RESULT + 1)],
        min_words: SCRATCH + 1,
    }
}

/// Divides twice: once with DIV into address 4, once by repeated subtraction
/// leaving the quotient at 3 and the remainder at 0. A zero divisor stalls on
/// the DIV. The subtraction loop expects `dividend >= 0` and `divisor > 0`.
pub fn div(dividend: Word, divisor: Word) -> SampleProgram {
    const REMAINDER: usize = 0;
    const DIVISOR: usize = 1;
    const ONE: usize = 2;
    const QUOTIENT: usize = 3;
    const NATIVE: usize = 4;
    const SCRATCH: usize = 5;

    let mut asm = Asm::default();
    asm.set(REMAINDER, dividend);
    asm.set(DIVISOR, divisor);
    asm.set(ONE, 1);
    asm.set(QUOTIENT, 0);
    asm.emit(Opcode::Div, REMAINDER as Word, DIVISOR as Word, NATIVE as Word);

    let top = asm.here();
    asm.emit(Opcode::Sub, REMAINDER as Word, DIVISOR as Word, SCRATCH as Word);
    let to_end = asm.jump(Opcode::JumpIfLt, 0);
    asm.emit(Opcode::Sub, REMAINDER as Word, DIVISOR as Word, REMAINDER as Word);
    asm.emit(Opcode::Add, QUOTIENT as Word, ONE as Word, QUOTIENT as Word);
    asm.jump(Opcode::Jump, top);
    let end = asm.here();
    asm.patch(to_end, end);

    SampleProgram {
        name: "div".to_string(),
        program: asm.finish(),
        outputs: vec![
            ("quotient", QUOTIENT..QUOTIENT + 1),
            ("remainder", REMAINDER..REMAINDER + 1),
            ("native_quotient", NATIVE..NATIVE + 1),
        ],
        min_words: SCRATCH + 1,
    }
}

fn random_elements(count: usize, rng: &mut StdRng) -> Vec<Word> {
    (0..count).map(|_| rng.gen_range(0..100)).collect()
}

/// C = A + B for two random `size`x`size` matrices laid out row-major at 0,
/// `size*size` and `2*size*size`.
pub fn sum_matrix(size: usize, seed: u64) -> SampleProgram {
    let n = size * size;
    let (a, b, c) = (0, n, 2 * n);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut asm = Asm::default();
    for (i, value) in random_elements(n, &mut rng).into_iter().enumerate() {
        asm.set(a + i, value);
    }
    for (i, value) in random_elements(n, &mut rng).into_iter().enumerate() {
        asm.set(b + i, value);
    }
    for i in 0..n {
        asm.emit(Opcode::Add, (a + i) as Word, (b + i) as Word, (c + i) as Word);
    }

    SampleProgram {
        name: "sum_matrix".to_string(),
        program: asm.finish(),
        outputs: vec![("a", a..a + n), ("b", b..b + n), ("c", c..c + n)],
        min_words: 3 * n,
    }
}

/// C = A x B for two random `size`x`size` matrices, same layout as
/// `sum_matrix` with one scratch word after C.
pub fn mat_mul(size: usize, seed: u64) -> SampleProgram {
    let n = size * size;
    let (a, b, c, tmp) = (0, n, 2 * n, 3 * n);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut asm = Asm::default();
    for (i, value) in random_elements(n, &mut rng).into_iter().enumerate() {
        asm.set(a + i, value);
    }
    for (i, value) in random_elements(n, &mut rng).into_iter().enumerate() {
        asm.set(b + i, value);
    }
    for row in 0..size {
        for col in 0..size {
            let dst = (c + row * size + col) as Word;
            asm.set(dst as usize, 0);
            for k in 0..size {
                let lhs = (a + row * size + k) as Word;
                let rhs = (b + k * size + col) as Word;
                asm.emit(Opcode::Mul, lhs, rhs, tmp as Word);
                asm.emit(Opcode::Add, dst, tmp as Word, dst);
            }
        }
    }

    SampleProgram {
        name: "mat_mul".to_string(),
        program: asm.finish(),
        outputs: vec![("a", a..a + n), ("b", b..b + n), ("c", c..c + n)],
        min_words: 3 * n + 1,
    }
}
