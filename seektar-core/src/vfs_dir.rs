// seektar_core/src/vfs_dir.rs
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use crate::domain::EntryMeta;
use crate::segment::ReadSeek;
use crate::vfs::{VirtualFs, clean};

/// A local directory exposed as a virtual tree rooted at `/`.
///
/// Nothing outside the root is reachable, neither through `..` nor through
/// symlinks.
#[derive(Clone, Debug)]
pub struct DirFs {
    root: PathBuf,
}

impl DirFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        let cleaned = clean(path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unsafe path: {path}"),
            )
        })?;
        let rel = cleaned.trim_start_matches('/');
        if rel.is_empty() {
            Ok(self.root.clone())
        } else {
            Ok(self.root.join(rel))
        }
    }

    /// Canonical form of `p`, refused when symlinks lead it out of the root.
    fn contained(&self, p: &Path) -> io::Result<PathBuf> {
        let root = fs::canonicalize(&self.root)?;
        let real = fs::canonicalize(p)?;
        if real.starts_with(&root) {
            Ok(real)
        } else {
            Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{} resolves outside {}", p.display(), self.root.display()),
            ))
        }
    }
}

impl VirtualFs for DirFs {
    /// Follows symlinks, but only to targets inside the root. A link to one
    /// of its own ancestor directories is reported as a loop.
    fn metadata(&self, path: &str) -> io::Result<EntryMeta> {
        let p = self.resolve(path)?;
        let real = self.contained(&p)?;
        let md = fs::metadata(&real)?;
        if md.is_dir() && p != self.root && fs::symlink_metadata(&p)?.file_type().is_symlink() {
            if let Some(parent) = p.parent() {
                if fs::canonicalize(parent)?.starts_with(&real) {
                    return Err(io::Error::other(format!(
                        "filesystem loop: {path} points at an ancestor"
                    )));
                }
            }
        }
        Ok(EntryMeta::from_fs(&md))
    }

    fn symlink_metadata(&self, path: &str) -> io::Result<EntryMeta> {
        let p = self.resolve(path)?;
        if let Some(parent) = p.parent().filter(|_| p != self.root) {
            self.contained(parent)?;
        }
        Ok(EntryMeta::from_fs(&fs::symlink_metadata(&p)?))
    }

    fn read_dir(&self, path: &str) -> io::Result<Vec<String>> {
        let real = self.contained(&self.resolve(path)?)?;
        let mut names = Vec::new();
        for e in fs::read_dir(real)? {
            names.push(e?.file_name().to_string_lossy().to_string());
        }
        names.sort();
        Ok(names)
    }

    fn open(&self, path: &str) -> io::Result<Box<dyn ReadSeek>> {
        let real = self.contained(&self.resolve(path)?)?;
        Ok(Box::new(File::open(real)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntryKind;
    use std::io::Read;

    #[test]
    fn resolves_inside_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/b"), b"bee").unwrap();
        fs::write(dir.path().join("a"), b"a").unwrap();

        let vfs = DirFs::new(dir.path());
        assert_eq!(vfs.read_dir("/").unwrap(), vec!["a", "sub"]);
        assert_eq!(vfs.metadata("/").unwrap().kind, EntryKind::Dir);
        assert_eq!(vfs.metadata("/sub/b").unwrap().size, 3);

        let mut s = String::new();
        vfs.open("sub/b").unwrap().read_to_string(&mut s).unwrap();
        assert_eq!(s, "bee");
    }

    #[test]
    fn rejects_escapes() {
        let dir = tempfile::tempdir().unwrap();
        let vfs = DirFs::new(dir.path());
        let err = vfs.open("/../etc/passwd").err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_stay_inside_root() {
        use std::os::unix::fs::symlink;

        let outside = tempfile::tempdir().unwrap();
        fs::write(outside.path().join("secret"), b"s3cr3t").unwrap();
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("f"), b"ok").unwrap();
        symlink(outside.path().join("secret"), dir.path().join("leak")).unwrap();
        symlink(dir.path().join("f"), dir.path().join("alias")).unwrap();

        let vfs = DirFs::new(dir.path());
        assert_eq!(
            vfs.open("/leak").err().unwrap().kind(),
            io::ErrorKind::PermissionDenied
        );
        assert!(vfs.metadata("/leak").is_err());
        assert_eq!(vfs.symlink_metadata("/leak").unwrap().kind, EntryKind::Other);

        let mut s = String::new();
        vfs.open("/alias").unwrap().read_to_string(&mut s).unwrap();
        assert_eq!(s, "ok");
        assert_eq!(vfs.metadata("/alias").unwrap().kind, EntryKind::File);
    }

    #[cfg(unix)]
    #[test]
    fn self_link_is_a_loop() {
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(".", dir.path().join("loop")).unwrap();

        let vfs = DirFs::new(dir.path());
        assert_eq!(vfs.symlink_metadata("/loop").unwrap().kind, EntryKind::Other);
        assert!(vfs.metadata("/loop").is_err());
        assert_eq!(vfs.metadata("/").unwrap().kind, EntryKind::Dir);
    }
}
