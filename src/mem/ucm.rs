use std::fmt::{Display, Formatter};

use log::{debug, trace};

use crate::base::error::SimResult;
use crate::base::mem::HasMemory;
use crate::mem::block::{word_to_block, word_to_offset, Word};
use crate::mem::cache::Cache;
use crate::mem::stats::{LevelStats, UcmStats};
use crate::mem::store::BlockStore;
use crate::sim::config::{CacheConfig, MemConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    L1 = 0,
    L2 = 1,
    L3 = 2,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::L1, Level::L2, Level::L3];

    pub fn name(self) -> &'static str {
        match self {
            Level::L1 => "L1",
            Level::L2 => "L2",
            Level::L3 => "L3",
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write(Word),
}

/// Unified cache manager: the single path from the CPU to storage.
///
/// Reads fill inclusively: a hit at level N copies the block into every
/// faster level, and a full miss fills L3, then L2, then L1 from the store.
/// Writes go through to every level holding the block and always to the
/// store. Only L1 allocates on a write miss, so a written block may be in L1
/// without being in L2 or L3.
///
/// The store is borrowed and outlives the manager.
#[derive(Debug)]
pub struct Ucm<'a> {
    levels: [Cache; 3],
    store: &'a mut BlockStore,
    store_latency: u64,
    global_time: u64,
    total_accesses: u64,
    total_hits: u64,
    total_misses: u64,
    total_time: u64,
}

impl<'a> Ucm<'a> {
    pub fn new(store: &'a mut BlockStore, cache_config: &CacheConfig, store_latency: u64) -> Self {
        Self {
            levels: [
                Cache::new(cache_config.l1.lines, cache_config.l1.latency),
                Cache::new(cache_config.l2.lines, cache_config.l2.latency),
                Cache::new(cache_config.l3.lines, cache_config.l3.latency),
            ],
            store,
            store_latency,
            global_time: 0,
            total_accesses: 0,
            total_hits: 0,
            total_misses: 0,
            total_time: 0,
        }
    }

    /// 2/4/8 lines at 1/10/50 cycles in front of a 100-cycle store.
    pub fn with_reference_config(store: &'a mut BlockStore) -> Self {
        Self::new(store, &CacheConfig::default(), MemConfig::default().latency)
    }

    pub fn access(&mut self, addr: usize, op: Access) -> SimResult<Word> {
        match op {
            Access::Read => self.read(addr),
            Access::Write(value) => self.write(addr, value).map(|_| value),
        }
    }

    pub fn read(&mut self, addr: usize) -> SimResult<Word> {
        self.store.check_word(addr)?;
        let block_index = word_to_block(addr);
        let offset = word_to_offset(addr);

        let now = self.tick();
        let mut access_time = 0;

        for depth in 0..self.levels.len() {
            access_time += self.levels[depth].latency();
            if let Some(line) = self.levels[depth].search(block_index) {
                line.touch(now);
                let block = line.data;
                self.total_hits += 1;
                // nearest level first, so L3 hits fill L2 before L1
                for upper in (0..depth).rev() {
                    self.levels[upper].load(block_index, block, now);
                }
                self.total_time += access_time;
                trace!("read @{} hit {} ({} cycles)", addr, Level::ALL[depth], access_time);
                return Ok(block.word(offset));
            }
        }

        self.total_misses += 1;
        let block = self.store.read_block(block_index)?;
        access_time += self.store_latency;
        for cache in self.levels.iter_mut().rev() {
            cache.load(block_index, block, now);
        }
        self.total_time += access_time;
        debug!(
            "read @{} missed every level, filled block {} ({} cycles)",
            addr, block_index, access_time
        );
        Ok(block.word(offset))
    }

    pub fn write(&mut self, addr: usize, value: Word) -> SimResult<()> {
        self.store.check_word(addr)?;
        let block_index = word_to_block(addr);
        let offset = word_to_offset(addr);

        let now = self.tick();
        let (l1, lower) = self.levels.split_at_mut(1);
        let l1 = &mut l1[0];
        let mut access_time = l1.latency();

        if l1.search(block_index).is_some() {
            l1.write_word_in_place(block_index, offset, value, now);
            self.total_hits += 1;
        } else {
            let mut block = self.store.read_block(block_index)?;
            block.set_word(offset, value);
            l1.load(block_index, block, now);
            trace!("write @{} allocated block {} in L1", addr, block_index);
        }

        for cache in lower.iter_mut() {
            access_time += cache.latency();
            if cache.search(block_index).is_some() {
                cache.write_word_in_place(block_index, offset, value, now);
            }
        }

        self.store.write_word(addr, value)?;
        access_time += self.store_latency;
        self.total_time += access_time;
        trace!("write @{} = {} ({} cycles)", addr, value, access_time);
        Ok(())
    }

    /// Zeroes every counter and the clock. Resident lines and the store are
    /// left untouched.
    pub fn reset_statistics(&mut self) {
        self.global_time = 0;
        self.total_accesses = 0;
        self.total_hits = 0;
        self.total_misses = 0;
        self.total_time = 0;
        self.levels.iter_mut().for_each(Cache::reset_statistics);
    }

    pub fn hit_rate(&self) -> f64 {
        if self.total_accesses == 0 {
            return 0.0;
        }
        self.total_hits as f64 / self.total_accesses as f64
    }

    pub fn stats(&self) -> UcmStats {
        UcmStats {
            total_accesses: self.total_accesses,
            total_hits: self.total_hits,
            total_misses: self.total_misses,
            total_time: self.total_time,
            global_time: self.global_time,
            levels: Level::ALL
                .iter()
                .map(|&level| LevelStats::from_cache(level.name(), self.cache(level)))
                .collect(),
        }
    }

    pub fn cache(&self, level: Level) -> &Cache {
        &self.levels[level as usize]
    }

    pub fn store(&self) -> &BlockStore {
        &*self.store
    }

    pub fn store_latency(&self) -> u64 {
        self.store_latency
    }

    pub fn capacity(&self) -> usize {
        self.store.num_words()
    }

    pub fn global_time(&self) -> u64 {
        self.global_time
    }

    pub fn total_accesses(&self) -> u64 {
        self.total_accesses
    }

    pub fn total_hits(&self) -> u64 {
        self.total_hits
    }

    pub fn total_misses(&self) -> u64 {
        self.total_misses
    }

    pub fn total_time(&self) -> u64 {
        self.total_time
    }

    fn tick(&mut self) -> u64 {
        self.global_time += 1;
        self.total_accesses += 1;
        self.global_time
    }
}
