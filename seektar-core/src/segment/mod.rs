//! Pieces: independently openable, fixed-size byte sources that make up a
//! virtual stream.
//!
//! A piece never changes size after construction, so callers may cache
//! [`Piece::size`]. Every call to [`Piece::open`] returns a fresh reader
//! positioned at offset 0; readers from separate calls share no state.

use std::borrow::Cow;
use std::io::{self, Read, Seek};

pub mod bytes;
pub mod file;
pub mod virt;

pub use bytes::ByteSegment;
pub use file::FileSegment;
pub use virt::VirtualFileSegment;

/// A readable, seekable resource handed out by [`Piece::open`]. Dropping it
/// releases the underlying handle.
pub trait ReadSeek: Read + Seek + Send {}

impl<T: Read + Seek + Send> ReadSeek for T {}

#[derive(Clone, Debug)]
pub enum Piece {
    Bytes(ByteSegment),
    File(FileSegment),
    Virtual(VirtualFileSegment),
}

impl Piece {
    pub fn size(&self) -> u64 {
        match self {
            Piece::Bytes(p) => p.size(),
            Piece::File(p) => p.size(),
            Piece::Virtual(p) => p.size(),
        }
    }

    /// Cheap identity of the content, usable as a caching key. Not a digest.
    pub fn fingerprint(&self) -> Cow<'_, [u8]> {
        match self {
            Piece::Bytes(p) => Cow::Borrowed(p.as_bytes()),
            Piece::File(p) => p.fingerprint(),
            Piece::Virtual(p) => Cow::Borrowed(p.path().as_bytes()),
        }
    }

    pub fn open(&self) -> io::Result<Box<dyn ReadSeek + '_>> {
        match self {
            Piece::Bytes(p) => Ok(Box::new(p.reader())),
            Piece::File(p) => Ok(Box::new(p.open()?)),
            Piece::Virtual(p) => p.open(),
        }
    }
}

impl From<ByteSegment> for Piece {
    fn from(p: ByteSegment) -> Self {
        Piece::Bytes(p)
    }
}

impl From<FileSegment> for Piece {
    fn from(p: FileSegment) -> Self {
        Piece::File(p)
    }
}

impl From<VirtualFileSegment> for Piece {
    fn from(p: VirtualFileSegment) -> Self {
        Piece::Virtual(p)
    }
}

impl From<Vec<u8>> for Piece {
    fn from(data: Vec<u8>) -> Self {
        Piece::Bytes(ByteSegment::new(data))
    }
}
