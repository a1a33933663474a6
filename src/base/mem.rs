use crate::base::error::{SimError, SimResult};
use crate::mem::block::{Block, Word};

/// Trait for word-addressable simulated memories.
pub trait HasMemory {
    /// Number of addressable words.
    fn num_words(&self) -> usize;

    /// Number of whole blocks backing the address space.
    fn num_blocks(&self) -> usize;

    fn read_word_impl(&self, addr: usize) -> Word;
    fn read_word(&self, addr: usize) -> SimResult<Word> {
        self.check_word(addr)?;
        Ok(self.read_word_impl(addr))
    }

    fn write_word_impl(&mut self, addr: usize, value: Word);
    fn write_word(&mut self, addr: usize, value: Word) -> SimResult<()> {
        self.check_word(addr)?;
        self.write_word_impl(addr, value);
        Ok(())
    }

    fn read_block_impl(&self, block_index: usize) -> Block;
    fn read_block(&self, block_index: usize) -> SimResult<Block> {
        self.check_block(block_index)?;
        Ok(self.read_block_impl(block_index))
    }

    fn write_block_impl(&mut self, block_index: usize, block: &Block);
    fn write_block(&mut self, block_index: usize, block: &Block) -> SimResult<()> {
        self.check_block(block_index)?;
        self.write_block_impl(block_index, block);
        Ok(())
    }

    fn check_word(&self, addr: usize) -> SimResult<()> {
        if addr >= self.num_words() {
            return Err(SimError::word_out_of_bounds(addr as i64, self.num_words()));
        }
        Ok(())
    }

    fn check_block(&self, block_index: usize) -> SimResult<()> {
        if block_index >= self.num_blocks() {
            return Err(SimError::block_out_of_bounds(block_index, self.num_blocks()));
        }
        Ok(())
    }
}
