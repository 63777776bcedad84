use std::collections::{HashMap, HashSet};
use std::time::SystemTime;

use anyhow::{bail, ensure};
use log::info;

use crate::block_store::BlockStore;
use crate::directory::DirectoryTree;
use crate::error::{FsError, Result};
use crate::inode_table::InodeTable;
use crate::layout::{
    BlockId, DirectoryEntry, Inode, InodeId, InodeKind, BLOCKS_PER_INODE, BLOCK_SIZE,
};

/// A snapshot of the filesystem's capacity and usage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FsStats {
    pub total_blocks: usize,
    pub free_blocks: usize,
    pub total_inodes: usize,
    pub free_inodes: usize,
}

/// The in-memory filesystem: a block pool, an inode arena, and the directory
/// tree, coordinated so that the allocated/free partitions and the
/// inode-block-entry cross references stay consistent.
///
/// Everything lives in memory and every call runs to completion on the
/// caller's thread. Nothing here is safe for concurrent mutation; a
/// multi-threaded host must serialize calls behind its own lock.
pub struct FileSystem {
    blocks: BlockStore,
    inodes: InodeTable,
    directories: DirectoryTree,
    root: InodeId,
}

impl FileSystem {
    /// Constructs a filesystem with `total_blocks` blocks of [`BLOCK_SIZE`]
    /// bytes and `total_blocks / 8` inodes, then allocates the root
    /// directory (mode 0o755, one link).
    ///
    /// The root's content list starts empty: unlike directories made with
    /// [`FileSystem::create_directory`], the root gets no `.` or `..`
    /// entries. Callers may depend on a fresh filesystem listing the root as
    /// empty, so the asymmetry is kept.
    pub fn new(total_blocks: usize) -> Result<Self> {
        let num_inodes = total_blocks / BLOCKS_PER_INODE;

        info!("{total_blocks} total blocks");
        info!("{num_inodes} total inodes");

        let mut fs = Self {
            blocks: BlockStore::new(total_blocks),
            inodes: InodeTable::new(num_inodes),
            directories: DirectoryTree::new(num_inodes),
            root: 0,
        };

        let root = fs.inodes.allocate()?;
        fs.inodes.insert(root, Inode::new_directory(1));
        fs.directories.register(root);
        fs.root = root;

        Ok(fs)
    }

    /// The root directory's inode id. It is the first id ever allocated,
    /// which with this allocator makes it 0.
    #[must_use]
    pub fn root(&self) -> InodeId {
        self.root
    }

    /// Metadata access for an allocated inode.
    pub fn inode(&self, inum: InodeId) -> Result<&Inode> {
        self.inodes.get(inum)
    }

    #[must_use]
    pub fn stats(&self) -> FsStats {
        FsStats {
            total_blocks: self.blocks.capacity(),
            free_blocks: self.blocks.free_count(),
            total_inodes: self.inodes.capacity(),
            free_inodes: self.inodes.free_count(),
        }
    }

    /// Creates an empty regular file named `name` under `parent` and returns
    /// its inode id.
    pub fn create_file(&mut self, parent: InodeId, name: &str) -> Result<InodeId> {
        // check the parent before allocating so a bad id doesn't consume an inode
        if !self.directories.is_registered(parent) {
            return Err(FsError::NotFound(format!("parent directory #{parent}")));
        }

        let inum = self.inodes.allocate()?;
        self.inodes.insert(inum, Inode::new_file());
        self.directories.append(
            parent,
            DirectoryEntry {
                name: name.to_owned(),
                inum,
            },
        )?;

        info!("[inode #{inum}] created file {name:?} under directory #{parent}");
        Ok(inum)
    }

    /// Creates a directory named `name` under `parent` and returns its inode
    /// id. The new directory's content list is seeded with `.` pointing to
    /// itself and `..` pointing to `parent`.
    pub fn create_directory(&mut self, parent: InodeId, name: &str) -> Result<InodeId> {
        if !self.directories.is_registered(parent) {
            return Err(FsError::NotFound(format!("parent directory #{parent}")));
        }

        let inum = self.inodes.allocate()?;
        self.inodes.insert(inum, Inode::new_directory(2));
        self.directories.register(inum);
        self.directories.append(
            inum,
            DirectoryEntry {
                name: ".".to_owned(),
                inum,
            },
        )?;
        self.directories.append(
            inum,
            DirectoryEntry {
                name: "..".to_owned(),
                inum: parent,
            },
        )?;
        self.directories.append(
            parent,
            DirectoryEntry {
                name: name.to_owned(),
                inum,
            },
        )?;

        info!("[inode #{inum}] created directory {name:?} under directory #{parent}");
        Ok(inum)
    }

    /// Replaces the file's content with `data`.
    ///
    /// Every write reallocates storage for the entire new content: the
    /// blocks the inode holds go back to the pool and `ceil(len / 1024)`
    /// fresh blocks are allocated in order. There is no in-place partial
    /// update path.
    ///
    /// Capacity is checked up front (counting the blocks about to be
    /// released), so a failing write returns [`FsError::StorageExhausted`]
    /// without touching any state.
    pub fn write_file(&mut self, inum: InodeId, data: &[u8]) -> Result<()> {
        info!("[inode #{inum}] writing file (data.len() = {})", data.len());

        let held = self.require_file(inum)?.blocks.len();
        let needed = data.len().div_ceil(BLOCK_SIZE);

        if needed > self.blocks.free_count() + held {
            return Err(FsError::StorageExhausted);
        }

        let old_blocks = std::mem::take(&mut self.inodes.get_mut(inum)?.blocks);
        for id in old_blocks {
            self.blocks.free(id);
        }

        let mut new_blocks = Vec::with_capacity(needed);
        for chunk in data.chunks(BLOCK_SIZE) {
            // cannot fail: capacity was checked above
            let id = self.blocks.allocate()?;
            self.blocks.fill(id, chunk);
            new_blocks.push(id);
        }

        let inode = self.inodes.get_mut(inum)?;
        inode.blocks = new_blocks;
        inode.size = data.len();
        inode.modified = SystemTime::now();

        info!("[inode #{inum}] wrote {} bytes across {needed} blocks", data.len());
        Ok(())
    }

    /// Reconstructs the file's content: the valid prefix of each held block,
    /// concatenated in block-list order, exactly `size` bytes in all.
    pub fn read_file(&self, inum: InodeId) -> Result<Vec<u8>> {
        let inode = self.require_file(inum)?;

        let mut data = Vec::with_capacity(inode.size);
        let mut remaining = inode.size;
        for &id in &inode.blocks {
            let take = remaining.min(BLOCK_SIZE);
            data.extend_from_slice(&self.blocks.read(id)[..take]);
            remaining -= take;
        }

        Ok(data)
    }

    /// The directory's entries in insertion order. For directories made with
    /// [`FileSystem::create_directory`], `.` and `..` come first.
    pub fn list_directory(&self, inum: InodeId) -> Result<&[DirectoryEntry]> {
        match self.inodes.get(inum) {
            Ok(inode) if inode.is_directory() => {}
            _ => {
                return Err(FsError::InvalidType(format!(
                    "inode #{inum} is not a directory"
                )))
            }
        }

        self.directories.entries(inum)
    }

    /// Removes the entry named `name` from `parent` and destroys the inode
    /// it refers to: its blocks and its id return to the free sets, and if
    /// it was a directory its content list is dropped too.
    ///
    /// Files and directories are not distinguished here. Nothing prevents
    /// deleting a non-empty directory, or a directory's own `.` entry;
    /// callers are responsible for correct usage.
    pub fn delete_file(&mut self, parent: InodeId, name: &str) -> Result<()> {
        // look everything up before mutating so a failure can't leave the
        // tree half-deleted
        let inum = self
            .directories
            .entries(parent)?
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.inum)
            .ok_or_else(|| {
                FsError::NotFound(format!("no entry named {name:?} in directory #{parent}"))
            })?;

        let inode = self.inodes.get(inum)?;
        let was_directory = inode.is_directory();
        let held = inode.blocks.clone();

        self.directories.remove_named(parent, name)?;
        for id in held {
            self.blocks.free(id);
        }
        self.inodes.free(inum);
        if was_directory {
            self.directories.unregister(inum);
        }

        info!("[inode #{inum}] deleted entry {name:?} from directory #{parent}");
        Ok(())
    }

    fn require_file(&self, inum: InodeId) -> Result<&Inode> {
        match self.inodes.get(inum) {
            Ok(inode) if inode.kind == InodeKind::File => Ok(inode),
            _ => Err(FsError::InvalidType(format!(
                "inode #{inum} is not a regular file"
            ))),
        }
    }

    /// Checks the filesystem for consistency. Performs a depth-first
    /// traversal of the directory tree.
    ///
    /// Verified here: the allocation bitmaps agree with the arenas, every
    /// held block is allocated and held by exactly one inode, block counts
    /// match sizes, content lists exist exactly for directory inodes, entry
    /// names are unique per directory, `.`/`..` of every non-root directory
    /// point at self/parent, and the tree contains no loops.
    pub fn check_consistency(&self) -> anyhow::Result<()> {
        for inum in 0..self.inodes.capacity() {
            ensure!(
                self.inodes.is_allocated(inum) == self.inodes.get(inum).is_ok(),
                "inode #{inum}: bitmap and arena disagree"
            );
        }

        let root_inode = self.inodes.get(self.root)?;
        ensure!(
            root_inode.is_directory(),
            "root inode does not represent a directory"
        );

        let mut block_owners: HashMap<BlockId, InodeId> = HashMap::new();

        for (inum, inode) in self.inodes.iter_allocated() {
            ensure!(
                inode.blocks.len() == inode.size.div_ceil(BLOCK_SIZE),
                "inode #{inum} holds {} blocks for {} bytes",
                inode.blocks.len(),
                inode.size
            );

            for &block in &inode.blocks {
                ensure!(block < self.blocks.capacity(), "invalid block id: {block}");
                ensure!(
                    self.blocks.is_allocated(block),
                    "inode #{inum} references free block {block}"
                );

                if let Some(owner) = block_owners.insert(block, inum) {
                    bail!("block {block} is held by inodes #{owner} and #{inum}");
                }
            }

            if inode.is_directory() {
                ensure!(
                    self.directories.is_registered(inum),
                    "directory inode #{inum} has no content list"
                );
            } else {
                ensure!(
                    !self.directories.is_registered(inum),
                    "file inode #{inum} has a content list"
                );
            }
        }

        let mut queue = vec![self.root];
        let mut seen = HashSet::<InodeId>::new();
        let mut directory_parents = HashMap::from([(self.root, self.root)]);

        while let Some(inum) = queue.pop() {
            if !seen.insert(inum) {
                bail!("directory tree includes loop");
            }

            let parent = *directory_parents
                .get(&inum)
                .expect("this directory was discovered through the entries of some directory");

            let mut entry_names = HashSet::new();

            for entry in self.directories.entries(inum)? {
                ensure!(
                    entry_names.insert(entry.name.as_str()),
                    "directory #{inum} contains duplicate entry: {}",
                    entry.name
                );

                let Ok(entry_inode) = self.inodes.get(entry.inum) else {
                    bail!(
                        "entry {:?} in directory #{inum} points at missing inode #{}",
                        entry.name,
                        entry.inum
                    );
                };

                match entry.name.as_str() {
                    "." => ensure!(entry.inum == inum, "'.' entry doesn't point to self"),
                    ".." => ensure!(entry.inum == parent, "'..' entry doesn't point to parent"),
                    _ => {
                        if entry_inode.is_directory() {
                            directory_parents.insert(entry.inum, inum);
                            queue.push(entry.inum);
                        }
                    }
                }
            }

            if inum != self.root {
                ensure!(entry_names.contains("."), "directory #{inum} has no '.' entry");
                ensure!(
                    entry_names.contains(".."),
                    "directory #{inum} has no '..' entry"
                );
            }
        }

        Ok(())
    }
}
