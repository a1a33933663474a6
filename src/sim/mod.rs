pub mod config;
pub mod log;
pub mod report;
pub mod top;
pub mod trace;
