pub mod execute;
pub mod isa;
pub mod regfile;

pub use execute::{Cpu, RunOutcome, Step};
pub use isa::{Instruction, Opcode, Program};
pub use regfile::RegFile;
