use std::fs;

use clap::Parser;
use log::error;
use ucmsim::cli::{make_sim, SimArgs};
use ucmsim::sim::config::ReportFormat;
use ucmsim::sim::report;

pub fn main() -> Result<(), u32> {
    env_logger::init();

    let argv = SimArgs::parse();
    let config = match &argv.config_path {
        Some(path) => fs::read_to_string(path).unwrap_or_else(|err| {
            eprintln!("failed to read config file: {}", err);
            std::process::exit(1);
        }),
        None => String::new(),
    };

    let mut sim = make_sim(&config, Some(argv)).map_err(|err| {
        eprintln!("invalid configuration: {:#}", err);
        1u32
    })?;
    let run = sim.simulate().map_err(|err| {
        error!("{:#}", err);
        eprintln!("simulation stopped: {:#}", err);
        2u32
    })?;

    match sim.sim_config.report {
        ReportFormat::Text => {
            println!("{}", run.program);
            print!("{}", report::render_text(&run.stats));
            println!("outcome: {:?}", run.outcome);
            for (label, words) in &run.outputs {
                println!("{} = {:?}", label, words);
            }
        }
        ReportFormat::Json => match serde_json::to_string_pretty(&run) {
            Ok(json) => println!("{}", json),
            Err(err) => {
                eprintln!("failed to serialize report: {}", err);
                return Err(3);
            }
        },
    }

    if let Some(trace) = &run.trace_json {
        println!("{}", trace);
    }
    Ok(())
}
