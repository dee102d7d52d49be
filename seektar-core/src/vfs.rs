// seektar_core/src/vfs.rs
use std::io;

use crate::domain::EntryMeta;
use crate::segment::ReadSeek;

/// A `/`-separated, read-only file tree that archives can be built from.
///
/// Paths are absolute within the tree (`"/"` is the root). Implementations
/// must hand out independent readers from every `open` call.
pub trait VirtualFs: Send + Sync {
    /// Metadata of the entry at `path`, following symlinks.
    fn metadata(&self, path: &str) -> io::Result<EntryMeta>;

    /// Like [`VirtualFs::metadata`], but a symlink is described as itself
    /// (kind [`EntryKind::Other`]). Trees without links can keep the default.
    ///
    /// [`EntryKind::Other`]: crate::domain::EntryKind::Other
    fn symlink_metadata(&self, path: &str) -> io::Result<EntryMeta> {
        self.metadata(path)
    }

    /// Names (not paths) of the direct children of a directory.
    fn read_dir(&self, path: &str) -> io::Result<Vec<String>>;

    fn open(&self, path: &str) -> io::Result<Box<dyn ReadSeek>>;
}

/// Join a child name onto a virtual directory path.
pub fn join(dir: &str, name: &str) -> String {
    let name = name.trim_start_matches('/');
    if dir.is_empty() {
        format!("/{name}")
    } else if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}

/// Normalize a virtual path: leading `/`, no empty or `.` components, no
/// trailing `/` (except for the root). Returns `None` if it tries to escape
/// the root through `..`.
pub fn clean(path: &str) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    for comp in path.split('/') {
        match comp {
            "" | "." => {}
            ".." => return None,
            c => parts.push(c),
        }
    }
    Some(format!("/{}", parts.join("/")))
}
