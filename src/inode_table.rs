use bitvec::vec::BitVec;

use crate::error::{FsError, Result};
use crate::layout::{Inode, InodeId};

/// The inode arena: a fixed-capacity slot per id, plus an allocation bitmap.
///
/// A slot holds `Some` metadata exactly while its id is allocated. Like the
/// block store, allocation hands out the lowest free id.
pub struct InodeTable {
    slots: Vec<Option<Inode>>,
    /// Tracks the allocation status of inodes.
    /// A value of `true` represents "occupied".
    bitmap: BitVec,
}

impl InodeTable {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let mut bitmap = BitVec::new();
        bitmap.resize(capacity, false);

        Self {
            slots: vec![None; capacity],
            bitmap,
        }
    }

    /// Removes the lowest id from the free set and returns it. The slot is
    /// empty until the caller writes metadata with [`InodeTable::insert`].
    pub fn allocate(&mut self) -> Result<InodeId> {
        let id = self.bitmap.first_zero().ok_or(FsError::InodeExhausted)?;
        self.bitmap.set(id, true);

        Ok(id)
    }

    pub fn insert(&mut self, id: InodeId, inode: Inode) {
        debug_assert!(self.bitmap[id]);

        self.slots[id] = Some(inode);
    }

    pub fn get(&self, id: InodeId) -> Result<&Inode> {
        self.slots
            .get(id)
            .and_then(Option::as_ref)
            .ok_or_else(|| FsError::NotFound(format!("inode #{id}")))
    }

    pub fn get_mut(&mut self, id: InodeId) -> Result<&mut Inode> {
        self.slots
            .get_mut(id)
            .and_then(Option::as_mut)
            .ok_or_else(|| FsError::NotFound(format!("inode #{id}")))
    }

    /// Removes the metadata entry and returns the id to the free set.
    pub fn free(&mut self, id: InodeId) {
        self.slots[id] = None;
        self.bitmap.set(id, false);
    }

    #[must_use]
    pub fn is_allocated(&self, id: InodeId) -> bool {
        self.bitmap[id]
    }

    pub fn iter_allocated(&self) -> impl Iterator<Item = (InodeId, &Inode)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| slot.as_ref().map(|inode| (id, inode)))
    }

    #[must_use]
    pub fn free_count(&self) -> usize {
        self.bitmap.count_zeros()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}
