use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use toml::Table;

use crate::sim::config::{CacheConfig, Config, MemConfig, ReportFormat, SimConfig};
use crate::sim::top::{Sim, FILE_PROGRAM};

#[derive(Parser, Debug, Default)]
#[command(version, about = "Instruction-driven CPU behind a three-level inclusive cache hierarchy")]
pub struct SimArgs {
    #[arg(help = "Path to config.toml")]
    pub config_path: Option<PathBuf>,
    #[arg(
        long,
        help = "Override program (mult, fibonacci, factorial, div, sum_matrix, mat_mul, file)"
    )]
    pub program: Option<String>,
    #[arg(
        long,
        value_delimiter = ',',
        allow_hyphen_values = true,
        help = "Override program arguments, comma separated"
    )]
    pub args: Option<Vec<i32>>,
    #[arg(long, help = "Run instructions from a text file")]
    pub program_file: Option<PathBuf>,
    #[arg(long, help = "Override store size in words")]
    pub num_words: Option<usize>,
    #[arg(long, help = "Override max executed instructions")]
    pub timeout: Option<u64>,
    #[arg(long, help = "Enable log at level (0:none, 1:info, 2:debug)")]
    pub log: Option<u64>,
    #[arg(long, help = "Dump an instruction trace as JSON")]
    pub trace: Option<bool>,
    #[arg(long, help = "Print the statistics report as JSON")]
    pub json: bool,
}

/// Make a Sim object from the TOML configuration.
/// If `cli_args` is given, override TOML options with CLI arguments.
pub fn make_sim(toml_string: &str, cli_args: Option<SimArgs>) -> anyhow::Result<Sim> {
    let config_table: Table = toml::from_str(toml_string).context("cannot parse config toml")?;
    let mut sim_config = SimConfig::from_section(config_table.get("sim"))?;
    let mut mem_config = MemConfig::from_section(config_table.get("mem"))?;
    let cache_config = CacheConfig::from_section(config_table.get("cache"))?;

    // override toml configs with CLI args
    if let Some(args) = cli_args {
        sim_config.program = args.program.unwrap_or(sim_config.program);
        sim_config.args = args.args.unwrap_or(sim_config.args);
        if let Some(path) = args.program_file {
            sim_config.program = FILE_PROGRAM.to_string();
            sim_config.program_file = path;
        }
        sim_config.timeout = args.timeout.unwrap_or(sim_config.timeout);
        sim_config.log_level = args.log.unwrap_or(sim_config.log_level);
        sim_config.trace = args.trace.unwrap_or(sim_config.trace);
        if args.json {
            sim_config.report = ReportFormat::Json;
        }
        mem_config.num_words = args.num_words.unwrap_or(mem_config.num_words);
    }

    Sim::new(sim_config, mem_config, cache_config)
}
