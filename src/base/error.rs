use std::fmt::{Display, Formatter};

/// Granularity of an out-of-bounds index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Word,
    Block,
}

impl Display for Unit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Unit::Word => write!(f, "address"),
            Unit::Block => write!(f, "block"),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error("{unit} {index} out of bounds (max: {limit})")]
    OutOfBounds { unit: Unit, index: i64, limit: usize },

    #[error("couldn't divide by zero (pc {pc})")]
    DivisionByZero { pc: i32 },
}

impl SimError {
    pub fn word_out_of_bounds(index: i64, limit: usize) -> Self {
        Self::OutOfBounds { unit: Unit::Word, index, limit }
    }

    pub fn block_out_of_bounds(index: usize, limit: usize) -> Self {
        Self::OutOfBounds { unit: Unit::Block, index: index as i64, limit }
    }

    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self, Self::OutOfBounds { .. })
    }

    pub fn is_division_by_zero(&self) -> bool {
        matches!(self, Self::DivisionByZero { .. })
    }
}

pub type SimResult<T> = Result<T, SimError>;
