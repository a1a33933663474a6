#[cfg(test)]
mod program_tests;
#[cfg(test)]
mod report_tests;
