use bitvec::vec::BitVec;

use crate::error::{FsError, Result};
use crate::layout::{Block, BlockId, BLOCK_SIZE, EMPTY_BLOCK};

/// The fixed pool of storage blocks.
///
/// Allocation is deterministic: [`BlockStore::allocate`] always hands out the
/// lowest free id, so a freed id is reused before any higher one.
pub struct BlockStore {
    blocks: Vec<Block>,
    /// Tracks the allocation status of blocks.
    /// A value of `true` represents "occupied".
    bitmap: BitVec,
}

impl BlockStore {
    #[must_use]
    pub fn new(total_blocks: usize) -> Self {
        let mut bitmap = BitVec::new();
        bitmap.resize(total_blocks, false);

        Self {
            blocks: vec![EMPTY_BLOCK; total_blocks],
            bitmap,
        }
    }

    /// Removes the lowest id from the free set and returns it. The block
    /// comes back zeroed.
    pub fn allocate(&mut self) -> Result<BlockId> {
        let id = self.bitmap.first_zero().ok_or(FsError::StorageExhausted)?;

        self.bitmap.set(id, true);
        self.blocks[id] = EMPTY_BLOCK;

        Ok(id)
    }

    /// Returns `id` to the free set. The caller must ensure no inode still
    /// references it; the store performs no reference counting.
    pub fn free(&mut self, id: BlockId) {
        self.bitmap.set(id, false);
    }

    #[must_use]
    pub fn read(&self, id: BlockId) -> &Block {
        &self.blocks[id]
    }

    /// Fills the block's prefix with `data`, leaving the rest of its
    /// capacity zeroed. `data` must fit in one block.
    pub fn fill(&mut self, id: BlockId, data: &[u8]) {
        debug_assert!(data.len() <= BLOCK_SIZE);

        self.blocks[id][..data.len()].copy_from_slice(data);
    }

    #[must_use]
    pub fn is_allocated(&self, id: BlockId) -> bool {
        self.bitmap[id]
    }

    #[must_use]
    pub fn free_count(&self) -> usize {
        self.bitmap.count_zeros()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.blocks.len()
    }
}
