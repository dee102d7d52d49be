use std::borrow::Cow;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Result, SeektarError};

/// Piece backed by a file on the local filesystem.
///
/// The size is probed once when the segment is created; `open` hands out a
/// new file handle on every call.
#[derive(Clone, Debug)]
pub struct FileSegment {
    path: PathBuf,
    size: u64,
}

impl FileSegment {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let md = fs::metadata(path).map_err(|e| SeektarError::path("create file segment", path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            size: md.len(),
        })
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn fingerprint(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.path.as_os_str().as_encoded_bytes())
    }

    pub(crate) fn open(&self) -> io::Result<File> {
        File::open(&self.path)
    }
}
