use thiserror::Error;

/// The error returned by every filesystem operation.
///
/// All failures are synchronous and immediate; the filesystem never retries
/// on its own, and a failed operation leaves unrelated inodes, blocks, and
/// directory entries untouched.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FsError {
    /// No free block is available to satisfy an allocation.
    #[error("no more free blocks")]
    StorageExhausted,
    /// No free inode is available to satisfy an allocation.
    #[error("no more free inodes")]
    InodeExhausted,
    /// The referenced parent directory, inode, or named entry does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// The operation was attempted on an inode of the wrong kind, or on an
    /// inode that doesn't exist.
    #[error("invalid inode type: {0}")]
    InvalidType(String),
}

pub type Result<T> = std::result::Result<T, FsError>;
