pub mod error;
pub mod mem;
