pub mod block;
pub mod cache;
pub mod stats;
pub mod store;
pub mod ucm;

pub use block::{Block, Word, WORDS_PER_BLOCK};
pub use cache::{Cache, CacheLine};
pub use stats::{LevelStats, UcmStats};
pub use store::BlockStore;
pub use ucm::{Access, Level, Ucm};
