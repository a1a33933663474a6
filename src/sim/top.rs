use std::fs;
use std::sync::Arc;

use anyhow::{ensure, Context};
use serde::Serialize;

use crate::base::mem::HasMemory;
use crate::cpu::execute::{Cpu, RunOutcome};
use crate::cpu::isa::Program;
use crate::info;
use crate::mem::block::Word;
use crate::mem::stats::UcmStats;
use crate::mem::store::BlockStore;
use crate::mem::ucm::Ucm;
use crate::programs::{self, SampleProgram};
use crate::sim::config::{CacheConfig, MemConfig, SimConfig, StoreInit};
use crate::sim::log::Logger;

/// Name that selects a program file instead of a generator.
pub const FILE_PROGRAM: &str = "file";

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub program: String,
    pub outcome: RunOutcome,
    pub stats: UcmStats,
    pub outputs: Vec<(String, Vec<Word>)>,
    #[serde(skip)]
    pub trace_json: Option<String>,
}

/// One store, and a fresh cache manager and CPU per run.
pub struct Sim {
    pub sim_config: SimConfig,
    pub mem_config: MemConfig,
    pub cache_config: CacheConfig,
    logger: Arc<Logger>,
    store: BlockStore,
}

impl Sim {
    pub fn new(
        sim_config: SimConfig,
        mem_config: MemConfig,
        cache_config: CacheConfig,
    ) -> anyhow::Result<Sim> {
        let logger = Arc::new(Logger::new(sim_config.log_level));
        Self::with_logger(sim_config, mem_config, cache_config, logger)
    }

    pub fn with_logger(
        sim_config: SimConfig,
        mem_config: MemConfig,
        cache_config: CacheConfig,
        logger: Arc<Logger>,
    ) -> anyhow::Result<Sim> {
        cache_config.ensure_valid(mem_config.latency)?;
        ensure!(mem_config.num_words > 0, "mem.num_words must be > 0");

        let store = match mem_config.init {
            StoreInit::Zeroed => BlockStore::new(mem_config.num_words),
            StoreInit::Random => BlockStore::random(mem_config.num_words, mem_config.seed),
        };
        Ok(Sim { sim_config, mem_config, cache_config, logger, store })
    }

    pub fn store(&self) -> &BlockStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut BlockStore {
        &mut self.store
    }

    /// Builds the program named in `[sim]`, either a generator or a file.
    pub fn load_program(&self) -> anyhow::Result<SampleProgram> {
        let name = self.sim_config.program.as_str();
        if name == FILE_PROGRAM {
            let path = &self.sim_config.program_file;
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read program file {}", path.display()))?;
            let program = Program::parse(&text)?;
            return Ok(SampleProgram {
                name: path.display().to_string(),
                program,
                outputs: Vec::new(),
                min_words: 0,
            });
        }
        let seed = self.mem_config.seed.unwrap_or_else(rand::random);
        programs::by_name(name, &self.sim_config.args, seed, self.store.num_words())
    }

    pub fn simulate(&mut self) -> anyhow::Result<RunReport> {
        let sample = self.load_program()?;
        self.run(&sample)
    }

    pub fn run(&mut self, sample: &SampleProgram) -> anyhow::Result<RunReport> {
        ensure!(
            self.store.num_words() >= sample.min_words,
            "program '{}' needs {} words of storage, mem.num_words is {}",
            sample.name,
            sample.min_words,
            self.store.num_words()
        );
        info!(self.logger, "running '{}'", sample.name);

        let mut cpu = Cpu::new(&self.logger, self.sim_config.trace);
        let mut ucm = Ucm::new(&mut self.store, &self.cache_config, self.mem_config.latency);
        let outcome = cpu.run(&mut ucm, &sample.program, self.sim_config.timeout)?;
        let stats = ucm.stats();
        drop(ucm);

        let outputs = sample
            .outputs
            .iter()
            .map(|(label, range)| -> anyhow::Result<(String, Vec<Word>)> {
                let words = range
                    .clone()
                    .map(|addr| self.store.read_word(addr))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((label.to_string(), words))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let trace_json = if cpu.tracer().enabled() {
            Some(cpu.tracer().to_json()?)
        } else {
            None
        };

        Ok(RunReport {
            program: sample.name.clone(),
            outcome,
            stats,
            outputs,
            trace_json,
        })
    }
}
