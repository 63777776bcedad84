/// The block pool and its allocation bitmap.
pub mod block_store;
/// Per-directory entry lists.
pub mod directory;
/// Error types returned by filesystem operations.
pub mod error;
/// The filesystem facade.
pub mod fs;
/// The inode arena and its allocation bitmap.
pub mod inode_table;
/// Constants and structures that define the simulated filesystem's layout.
pub mod layout;
