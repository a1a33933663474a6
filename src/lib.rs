pub mod base;
pub mod cli;
pub mod cpu;
pub mod mem;
pub mod programs;
pub mod sim;

#[cfg(test)]
mod unit_tests;
