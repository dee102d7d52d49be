use std::fmt;
use std::io;
use std::sync::Arc;

use super::ReadSeek;
use crate::error::{Result, SeektarError};
use crate::vfs::VirtualFs;

/// Piece backed by a path inside a [`VirtualFs`].
#[derive(Clone)]
pub struct VirtualFileSegment {
    vfs: Arc<dyn VirtualFs>,
    path: String,
    size: u64,
}

impl VirtualFileSegment {
    pub fn new(vfs: Arc<dyn VirtualFs>, path: &str) -> Result<Self> {
        let meta = vfs.metadata(path).map_err(|e| SeektarError::path("create virtual file segment", path, e))?;
        Ok(Self {
            vfs,
            path: path.to_string(),
            size: meta.size,
        })
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn open(&self) -> io::Result<Box<dyn ReadSeek>> {
        self.vfs.open(&self.path)
    }
}

impl fmt::Debug for VirtualFileSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualFileSegment")
            .field("path", &self.path)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}
