use serde::Serialize;

use crate::mem::cache::Cache;

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct LevelStats {
    pub name: String,
    pub lines: usize,
    pub latency: u64,
    pub hits: u64,
    pub misses: u64,
}

impl LevelStats {
    pub fn from_cache(name: &str, cache: &Cache) -> Self {
        Self {
            name: name.to_string(),
            lines: cache.num_lines(),
            latency: cache.latency(),
            hits: cache.hits(),
            misses: cache.misses(),
        }
    }

    pub fn lookups(&self) -> u64 {
        self.hits.saturating_add(self.misses)
    }

    /// Percentage, or `None` if the level was never looked up.
    pub fn hit_rate_percent(&self) -> Option<f64> {
        match self.lookups() {
            0 => None,
            n => Some(self.hits as f64 / n as f64 * 100.0),
        }
    }
}

/// Snapshot of the cache manager counters, consumed read-only by the report.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct UcmStats {
    pub total_accesses: u64,
    pub total_hits: u64,
    pub total_misses: u64,
    pub total_time: u64,
    pub global_time: u64,
    pub levels: Vec<LevelStats>,
}

impl UcmStats {
    pub fn hit_rate(&self) -> f64 {
        if self.total_accesses == 0 {
            return 0.0;
        }
        self.total_hits as f64 / self.total_accesses as f64
    }

    pub fn avg_time_per_access(&self) -> Option<f64> {
        match self.total_accesses {
            0 => None,
            n => Some(self.total_time as f64 / n as f64),
        }
    }
}
