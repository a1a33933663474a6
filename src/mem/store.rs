use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::base::mem::HasMemory;
use crate::mem::block::{word_to_block, word_to_offset, Block, Word, WORDS_PER_BLOCK};

/// Main storage, kept as a vector of blocks so fills and write-throughs never
/// have to gather words. The last block may carry padding words past
/// `num_words`; those are never addressable by word.
#[derive(Debug, Clone)]
pub struct BlockStore {
    blocks: Vec<Block>,
    num_words: usize,
}

impl HasMemory for BlockStore {
    fn num_words(&self) -> usize {
        self.num_words
    }

    fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    fn read_word_impl(&self, addr: usize) -> Word {
        self.blocks[word_to_block(addr)].word(word_to_offset(addr))
    }

    fn write_word_impl(&mut self, addr: usize, value: Word) {
        self.blocks[word_to_block(addr)].set_word(word_to_offset(addr), value);
    }

    fn read_block_impl(&self, block_index: usize) -> Block {
        self.blocks[block_index]
    }

    fn write_block_impl(&mut self, block_index: usize, block: &Block) {
        self.blocks[block_index] = *block;
    }
}

impl BlockStore {
    pub fn new(num_words: usize) -> Self {
        let num_blocks = num_words.div_ceil(WORDS_PER_BLOCK);
        Self {
            blocks: vec![Block::default(); num_blocks],
            num_words,
        }
    }

    /// Store filled with non-negative pseudo-random words. Without a seed the
    /// generator is seeded from entropy.
    pub fn random(num_words: usize, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut store = Self::new(num_words);
        for addr in 0..num_words {
            store.write_word_impl(addr, rng.gen_range(0..=Word::MAX));
        }
        debug!("filled {} words with random data (seed {:?})", num_words, seed);
        store
    }

    pub fn reset(&mut self) {
        self.blocks.fill(Block::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::error::{SimError, Unit};

    #[test]
    fn new_store_is_zeroed() {
        let store = BlockStore::new(10);
        assert_eq!(store.num_words(), 10);
        assert_eq!(store.num_blocks(), 3);
        for addr in 0..10 {
            assert_eq!(store.read_word(addr).unwrap(), 0);
        }
    }

    #[test]
    fn word_writes_land_in_owning_block() {
        let mut store = BlockStore::new(16);
        store.write_word(6, 42).unwrap();
        assert_eq!(store.read_block(1).unwrap().words(), &[0, 0, 42, 0]);
        assert_eq!(store.read_word(6).unwrap(), 42);
    }

    #[test]
    fn block_writes_are_copies() {
        let mut store = BlockStore::new(8);
        let mut block = Block::new([1, 2, 3, 4]);
        store.write_block(1, &block).unwrap();
        block.set_word(0, 99);
        assert_eq!(store.read_word(4).unwrap(), 1);
    }

    #[test]
    fn out_of_bounds_word_is_rejected() {
        let mut store = BlockStore::new(6);
        assert_eq!(
            store.read_word(6),
            Err(SimError::OutOfBounds { unit: Unit::Word, index: 6, limit: 6 })
        );
        assert!(store.write_word(100, 1).unwrap_err().is_out_of_bounds());
    }

    #[test]
    fn padding_words_are_not_addressable() {
        // 6 words -> 2 blocks, words 6 and 7 are padding
        let store = BlockStore::new(6);
        assert!(store.read_block(1).is_ok());
        assert!(store.read_word(7).is_err());
        assert!(store.read_block(2).unwrap_err().is_out_of_bounds());
    }

    #[test]
    fn seeded_random_store_is_reproducible() {
        let a = BlockStore::random(32, Some(7));
        let b = BlockStore::random(32, Some(7));
        for addr in 0..32 {
            let word = a.read_word(addr).unwrap();
            assert!(word >= 0);
            assert_eq!(word, b.read_word(addr).unwrap());
        }
    }

    #[test]
    fn reset_zeroes_everything() {
        let mut store = BlockStore::random(12, Some(1));
        store.reset();
        assert!((0..12).all(|addr| store.read_word(addr).unwrap() == 0));
    }
}
