#![forbid(unsafe_code)]

pub mod domain;
pub mod error;
pub mod segment;
pub mod vfs;
pub mod vfs_dir;
pub mod vfs_mem;

pub mod util {
    pub mod owner;
}

pub mod container {
    pub mod aggregate;
    pub mod header;
}

pub mod read {
    pub mod cursor;
    pub mod range;
}

pub mod pack {
    pub mod archive;
    pub mod entry;
    pub mod walker;
}

// Re-exports: stable API surface
pub use container::aggregate::Aggregate;
pub use container::header::{BLOCK_SIZE, EntryType, HeaderRecord};
pub use domain::{EntryInfo, EntryKind, EntryMeta};
pub use error::{Result, SeektarError};
pub use pack::archive::Archive;
pub use pack::entry::{tar_file, tar_vfs_file};
pub use pack::walker::{TarOptions, tar_dir, tar_vfs};
pub use read::cursor::Cursor;
pub use read::range::RangeReader;
pub use segment::{ByteSegment, FileSegment, Piece, ReadSeek, VirtualFileSegment};
pub use util::owner::{NoOwners, OwnerLookup, SystemOwners};
pub use vfs::VirtualFs;
pub use vfs_dir::DirFs;
pub use vfs_mem::MemFs;
