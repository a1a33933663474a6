use log::trace;

use crate::mem::block::{Block, Word};

#[derive(Debug, Default, Clone)]
pub struct CacheLine {
    pub valid: bool,
    pub tag: Option<usize>,
    pub data: Block,
    pub last_used: u64,
}

impl CacheLine {
    pub fn touch(&mut self, now: u64) {
        self.last_used = now;
    }

    fn holds(&self, block_index: usize) -> bool {
        self.valid && self.tag == Some(block_index)
    }
}

/// One fully-associative cache level with LRU replacement. Lookups are a
/// linear scan over all lines.
#[derive(Debug, Clone)]
pub struct Cache {
    lines: Vec<CacheLine>,
    latency: u64,
    hits: u64,
    misses: u64,
}

impl Cache {
    pub fn new(num_lines: usize, latency: u64) -> Self {
        assert!(num_lines > 0, "cache needs at least one line");
        Self {
            lines: vec![CacheLine::default(); num_lines],
            latency,
            hits: 0,
            misses: 0,
        }
    }

    pub fn num_lines(&self) -> usize {
        self.lines.len()
    }

    pub fn latency(&self) -> u64 {
        self.latency
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn lines(&self) -> &[CacheLine] {
        &self.lines
    }

    /// Counts a hit or a miss. Refreshing the timestamp is left to the caller.
    pub fn search(&mut self, block_index: usize) -> Option<&mut CacheLine> {
        match self.lines.iter().position(|line| line.holds(block_index)) {
            Some(idx) => {
                self.hits = self.hits.saturating_add(1);
                Some(&mut self.lines[idx])
            }
            None => {
                self.misses = self.misses.saturating_add(1);
                None
            }
        }
    }

    /// Residency check that leaves the counters alone.
    pub fn contains(&self, block_index: usize) -> bool {
        self.lines.iter().any(|line| line.holds(block_index))
    }

    pub fn resident_blocks(&self) -> Vec<usize> {
        self.lines
            .iter()
            .filter(|line| line.valid)
            .filter_map(|line| line.tag)
            .collect()
    }

    pub fn load(&mut self, block_index: usize, block: Block, now: u64) {
        if let Some(line) = self.lines.iter_mut().find(|line| line.holds(block_index)) {
            line.data = block;
            line.touch(now);
            return;
        }

        let idx = self.victim();
        let line = &mut self.lines[idx];
        if line.valid {
            trace!("evict block {:?} from line {} (last used {})", line.tag, idx, line.last_used);
        }
        *line = CacheLine {
            valid: true,
            tag: Some(block_index),
            data: block,
            last_used: now,
        };
    }

    /// Returns false when the block is not resident; nothing is loaded then.
    pub fn write_word_in_place(
        &mut self,
        block_index: usize,
        offset: usize,
        value: Word,
        now: u64,
    ) -> bool {
        match self.lines.iter_mut().find(|line| line.holds(block_index)) {
            Some(line) => {
                line.data.set_word(offset, value);
                line.touch(now);
                true
            }
            None => false,
        }
    }

    pub fn reset_statistics(&mut self) {
        self.hits = 0;
        self.misses = 0;
    }

    pub fn invalidate_all(&mut self) {
        self.lines.fill(CacheLine::default());
    }

    // first empty line, else oldest timestamp with ties to the lowest index
    fn victim(&self) -> usize {
        if let Some(idx) = self.lines.iter().position(|line| !line.valid) {
            return idx;
        }
        self.lines
            .iter()
            .enumerate()
            .min_by_key(|(_, line)| line.last_used)
            .map(|(idx, _)| idx)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(tag: i32) -> Block {
        Block::new([tag; 4])
    }

    #[test]
    fn search_counts_hits_and_misses() {
        let mut cache = Cache::new(2, 1);
        assert!(cache.search(0).is_none());
        cache.load(0, block(0), 1);
        assert!(cache.search(0).is_some());
        assert_eq!((cache.hits(), cache.misses()), (1, 1));
    }

    #[test]
    fn search_does_not_touch_timestamp() {
        let mut cache = Cache::new(2, 1);
        cache.load(3, block(3), 5);
        let line = cache.search(3).unwrap();
        assert_eq!(line.last_used, 5);
    }

    #[test]
    fn empty_lines_fill_first_in_order() {
        let mut cache = Cache::new(3, 1);
        cache.load(10, block(10), 9);
        cache.load(11, block(11), 1);
        assert_eq!(cache.lines()[0].tag, Some(10));
        assert_eq!(cache.lines()[1].tag, Some(11));
        assert!(!cache.lines()[2].valid);
    }

    #[test]
    fn evicts_least_recently_used() {
        let mut cache = Cache::new(2, 1);
        cache.load(0, block(0), 1);
        cache.load(1, block(1), 2);
        cache.search(0).unwrap().touch(3);
        cache.load(2, block(2), 4);
        assert!(cache.contains(0));
        assert!(!cache.contains(1));
        assert!(cache.contains(2));
    }

    #[test]
    fn timestamp_ties_evict_lowest_line() {
        let mut cache = Cache::new(2, 1);
        cache.load(0, block(0), 7);
        cache.load(1, block(1), 7);
        cache.load(2, block(2), 8);
        assert_eq!(cache.lines()[0].tag, Some(2));
        assert_eq!(cache.lines()[1].tag, Some(1));
    }

    #[test]
    fn loading_resident_block_keeps_tags_unique() {
        let mut cache = Cache::new(4, 1);
        cache.load(5, block(1), 1);
        cache.load(5, block(2), 2);
        assert_eq!(cache.resident_blocks(), vec![5]);
        assert_eq!(cache.lines()[0].data, block(2));
    }

    #[test]
    fn write_in_place_requires_residency() {
        let mut cache = Cache::new(2, 1);
        assert!(!cache.write_word_in_place(4, 1, 9, 1));
        assert!(cache.resident_blocks().is_empty());

        cache.load(4, block(0), 1);
        assert!(cache.write_word_in_place(4, 1, 9, 6));
        let line = &cache.lines()[0];
        assert_eq!(line.data.words(), &[0, 9, 0, 0]);
        assert_eq!(line.last_used, 6);
    }

    #[test]
    fn reset_statistics_keeps_data() {
        let mut cache = Cache::new(1, 1);
        cache.load(1, block(1), 1);
        cache.search(1);
        cache.search(2);
        cache.reset_statistics();
        assert_eq!((cache.hits(), cache.misses()), (0, 0));
        assert!(cache.contains(1));
    }

    #[test]
    fn invalidate_all_clears_entire_cache() {
        let mut cache = Cache::new(2, 1);
        cache.load(1, block(1), 1);
        cache.load(2, block(2), 2);
        cache.invalidate_all();
        assert!(!cache.contains(1));
        assert!(!cache.contains(2));
    }

    #[test]
    fn single_line_cache() {
        let mut cache = Cache::new(1, 1);
        cache.load(1, block(1), 1);
        assert!(cache.contains(1));
        cache.load(2, block(2), 2);
        assert!(!cache.contains(1));
        assert!(cache.contains(2));
    }
}
