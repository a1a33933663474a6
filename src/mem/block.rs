use serde::Serialize;

pub type Word = i32;

pub const WORDS_PER_BLOCK: usize = 4;

pub fn word_to_block(addr: usize) -> usize {
    addr / WORDS_PER_BLOCK
}

pub fn word_to_offset(addr: usize) -> usize {
    addr % WORDS_PER_BLOCK
}

/// Unit of transfer between the store and the caches. Moved by value, so a
/// cache line never aliases the store's copy.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Block {
    words: [Word; WORDS_PER_BLOCK],
}

impl Block {
    pub fn new(words: [Word; WORDS_PER_BLOCK]) -> Self {
        Self { words }
    }

    pub fn word(&self, offset: usize) -> Word {
        self.words[offset]
    }

    pub fn set_word(&mut self, offset: usize, value: Word) {
        self.words[offset] = value;
    }

    pub fn words(&self) -> &[Word; WORDS_PER_BLOCK] {
        &self.words
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_decomposes_into_block_and_offset() {
        assert_eq!(word_to_block(0), 0);
        assert_eq!(word_to_offset(0), 0);
        assert_eq!(word_to_block(7), 1);
        assert_eq!(word_to_offset(7), 3);
        assert_eq!(word_to_block(8), 2);
        assert_eq!(word_to_offset(8), 0);
    }

    #[test]
    fn copies_do_not_alias() {
        let mut a = Block::new([1, 2, 3, 4]);
        let b = a;
        a.set_word(2, 42);
        assert_eq!(a.word(2), 42);
        assert_eq!(b.word(2), 3);
    }
}
