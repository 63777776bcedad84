use crate::error::{FsError, Result};
use crate::layout::{DirectoryEntry, InodeId};

/// Per-directory ordered entry lists, indexed by directory inode id.
///
/// A slot is `Some` exactly while its inode is a registered directory.
/// Entries keep insertion order; removal is by linear scan over names.
pub struct DirectoryTree {
    slots: Vec<Option<Vec<DirectoryEntry>>>,
}

impl DirectoryTree {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    /// Registers an empty content list for a directory inode.
    pub fn register(&mut self, id: InodeId) {
        debug_assert!(self.slots[id].is_none());

        self.slots[id] = Some(Vec::new());
    }

    /// Drops a directory's content list along with the slot.
    pub fn unregister(&mut self, id: InodeId) {
        self.slots[id] = None;
    }

    #[must_use]
    pub fn is_registered(&self, id: InodeId) -> bool {
        self.slots.get(id).is_some_and(Option::is_some)
    }

    pub fn entries(&self, id: InodeId) -> Result<&[DirectoryEntry]> {
        self.slots
            .get(id)
            .and_then(Option::as_ref)
            .map(Vec::as_slice)
            .ok_or_else(|| FsError::NotFound(format!("directory #{id}")))
    }

    pub fn append(&mut self, id: InodeId, entry: DirectoryEntry) -> Result<()> {
        self.slots
            .get_mut(id)
            .and_then(Option::as_mut)
            .ok_or_else(|| FsError::NotFound(format!("directory #{id}")))?
            .push(entry);

        Ok(())
    }

    /// Removes the first entry named `name`, preserving the relative order
    /// of the remaining entries.
    pub fn remove_named(&mut self, id: InodeId, name: &str) -> Result<DirectoryEntry> {
        let entries = self
            .slots
            .get_mut(id)
            .and_then(Option::as_mut)
            .ok_or_else(|| FsError::NotFound(format!("directory #{id}")))?;

        let index = entries
            .iter()
            .position(|entry| entry.name == name)
            .ok_or_else(|| FsError::NotFound(format!("no entry named {name:?} in directory #{id}")))?;

        Ok(entries.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, inum: InodeId) -> DirectoryEntry {
        DirectoryEntry {
            name: name.to_owned(),
            inum,
        }
    }

    #[test]
    fn test_register_and_append() {
        let mut tree = DirectoryTree::new(4);

        tree.register(0);
        tree.append(0, entry("a", 1)).unwrap();
        tree.append(0, entry("b", 2)).unwrap();

        assert_eq!(tree.entries(0).unwrap(), &[entry("a", 1), entry("b", 2)]);
    }

    #[test]
    fn test_unregistered_slot() {
        let mut tree = DirectoryTree::new(4);

        assert!(matches!(tree.entries(0), Err(FsError::NotFound(_))));
        assert!(matches!(
            tree.append(0, entry("a", 1)),
            Err(FsError::NotFound(_))
        ));
        assert!(matches!(
            tree.entries(10), // out of range entirely
            Err(FsError::NotFound(_))
        ));
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut tree = DirectoryTree::new(2);

        tree.register(0);
        tree.append(0, entry("a", 1)).unwrap();
        tree.append(0, entry("b", 2)).unwrap();
        tree.append(0, entry("c", 3)).unwrap();

        let removed = tree.remove_named(0, "b").unwrap();
        assert_eq!(removed, entry("b", 2));
        assert_eq!(tree.entries(0).unwrap(), &[entry("a", 1), entry("c", 3)]);
    }

    #[test]
    fn test_remove_missing_name() {
        let mut tree = DirectoryTree::new(2);

        tree.register(0);
        assert!(matches!(
            tree.remove_named(0, "ghost"),
            Err(FsError::NotFound(_))
        ));
    }

    #[test]
    fn test_unregister() {
        let mut tree = DirectoryTree::new(2);

        tree.register(1);
        tree.append(1, entry("a", 0)).unwrap();
        tree.unregister(1);

        assert!(!tree.is_registered(1));
        assert!(matches!(tree.entries(1), Err(FsError::NotFound(_))));
    }
}
