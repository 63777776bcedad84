use std::time::SystemTime;

/// size of a block in bytes
pub const BLOCK_SIZE: usize = 1024;

/// a filesystem with `N` blocks gets `N / BLOCKS_PER_INODE` inodes
pub const BLOCKS_PER_INODE: usize = 8;

/// mode bits for newly created regular files (rw-r--r--)
pub const FILE_MODE: u32 = 0o644;

/// mode bits for newly created directories (rwxr-xr-x)
pub const DIRECTORY_MODE: u32 = 0o755;

pub type Block = [u8; BLOCK_SIZE];

pub type BlockId = usize;
pub type InodeId = usize;

pub const EMPTY_BLOCK: Block = [0; BLOCK_SIZE];

/// Metadata describing a file or directory's identity, size, and storage
/// layout. An inode's id is its index in the inode arena and is not
/// duplicated here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inode {
    /// permission mode bits (stored, never enforced)
    pub mode: u32,
    /// file size in bytes
    pub size: usize,
    /// ids of the blocks holding the content, in content order
    pub blocks: Vec<BlockId>,
    /// number of hard links to the inode
    pub nlink: u16,
    /// creation time
    pub created: SystemTime,
    /// last modification time
    pub modified: SystemTime,
    /// whether the inode describes a regular file or a directory
    pub kind: InodeKind,
}

impl Inode {
    /// A fresh regular file inode: empty, mode `rw-r--r--`, one link.
    #[must_use]
    pub fn new_file() -> Self {
        Self::new(InodeKind::File, FILE_MODE, 1)
    }

    /// A fresh directory inode with mode `rwxr-xr-x`. The link count is the
    /// caller's business: 2 for an ordinary directory (its name plus its own
    /// `.` entry), 1 for the root.
    #[must_use]
    pub fn new_directory(nlink: u16) -> Self {
        Self::new(InodeKind::Directory, DIRECTORY_MODE, nlink)
    }

    fn new(kind: InodeKind, mode: u32, nlink: u16) -> Self {
        let now = SystemTime::now();

        Self {
            mode,
            size: 0,
            blocks: Vec::new(),
            nlink,
            created: now,
            modified: now,
            kind,
        }
    }

    #[must_use]
    pub fn is_directory(&self) -> bool {
        self.kind == InodeKind::Directory
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InodeKind {
    /// This inode describes a regular data file.
    File,
    /// This inode describes a directory.
    Directory,
}

/// A name-to-inode binding inside a directory's content list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// The name of the entry, unique within its directory.
    pub name: String,
    /// The inode number the name refers to.
    pub inum: InodeId,
}
