use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{ensure, Context};
use log::warn;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use toml::*;

pub trait Config: DeserializeOwned + Default {
    fn from_section(section: Option<&Value>) -> anyhow::Result<Self> {
        match section {
            Some(value) => value.clone().try_into().context("cannot deserialize config"),
            None => {
                warn!("config section not found");
                Ok(Self::default())
            }
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SimConfig {
    pub program: String,
    pub args: Vec<i32>,
    pub program_file: PathBuf,
    pub log_level: u64,
    pub timeout: u64,
    pub trace: bool,
    pub report: ReportFormat,
}

impl Config for SimConfig {}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            program: "mult".to_string(),
            args: vec![10, 10],
            program_file: PathBuf::new(),
            log_level: 0,
            timeout: 100_000,
            trace: false,
            report: ReportFormat::Text,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreInit {
    #[default]
    Zeroed,
    Random,
}

impl FromStr for StoreInit {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "zeroed" => Ok(Self::Zeroed),
            "random" => Ok(Self::Random),
            _ => Err(format!(
                "unsupported store init '{}', expected one of: zeroed, random",
                value
            )),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct MemConfig {
    pub num_words: usize,
    pub init: StoreInit,
    pub seed: Option<u64>,
    pub latency: u64,
}

impl Config for MemConfig {}

impl Default for MemConfig {
    fn default() -> Self {
        Self {
            num_words: 100,
            init: StoreInit::Zeroed,
            seed: None,
            latency: 100,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct LevelConfig {
    pub lines: usize,
    pub latency: u64,
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct CacheConfig {
    pub l1: LevelConfig,
    pub l2: LevelConfig,
    pub l3: LevelConfig,
}

impl Config for CacheConfig {}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            l1: LevelConfig { lines: 2, latency: 1 },
            l2: LevelConfig { lines: 4, latency: 10 },
            l3: LevelConfig { lines: 8, latency: 50 },
        }
    }
}

impl CacheConfig {
    /// Every level needs a line, and each level must be strictly slower than
    /// the one above it, with the store slowest of all.
    pub fn ensure_valid(&self, store_latency: u64) -> anyhow::Result<()> {
        for (name, level) in [("l1", self.l1), ("l2", self.l2), ("l3", self.l3)] {
            ensure!(level.lines > 0, "{name}.lines must be > 0");
        }
        ensure!(
            self.l1.latency < self.l2.latency
                && self.l2.latency < self.l3.latency
                && self.l3.latency < store_latency,
            "latencies must strictly increase: l1 {} < l2 {} < l3 {} < store {}",
            self.l1.latency,
            self.l2.latency,
            self.l3.latency,
            store_latency
        );
        Ok(())
    }
}
