// seektar_core/src/domain.rs
use serde::Serialize;
use std::fs::Metadata;
use std::time::UNIX_EPOCH;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    /// Symlinks, devices, sockets; not representable in the archive.
    Other,
}

/// Metadata of one filesystem entry as the archive builders consume it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryMeta {
    pub kind: EntryKind,
    pub size: u64,
    /// Permission bits only.
    pub mode: u32,
    /// Seconds since the Unix epoch.
    pub mtime: u64,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
}

impl EntryMeta {
    pub fn file(size: u64, mode: u32) -> Self {
        Self {
            kind: EntryKind::File,
            size,
            mode: mode & 0o777,
            mtime: 0,
            uid: None,
            gid: None,
        }
    }

    pub fn dir(mode: u32) -> Self {
        Self {
            kind: EntryKind::Dir,
            size: 0,
            mode: mode & 0o777,
            mtime: 0,
            uid: None,
            gid: None,
        }
    }

    pub fn from_fs(md: &Metadata) -> Self {
        let ft = md.file_type();
        let kind = if ft.is_dir() {
            EntryKind::Dir
        } else if ft.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        };
        let (uid, gid) = owner_from(md);
        Self {
            kind,
            size: if kind == EntryKind::File { md.len() } else { 0 },
            mode: mode_from(md) & 0o777,
            mtime: mtime_from(md),
            uid,
            gid,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

fn mode_from(_md: &Metadata) -> u32 {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        _md.permissions().mode()
    }
    #[cfg(not(unix))]
    {
        if _md.is_dir() {
            0o755
        } else if _md.permissions().readonly() {
            0o444
        } else {
            0o644
        }
    }
}

fn mtime_from(md: &Metadata) -> u64 {
    md.modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn owner_from(_md: &Metadata) -> (Option<u32>, Option<u32>) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        (Some(_md.uid()), Some(_md.gid()))
    }
    #[cfg(not(unix))]
    {
        (None, None)
    }
}

/// One row of an archive's entry table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EntryInfo {
    pub name: String,
    pub kind: EntryKind,
    pub mode: u32,
    pub mtime: u64,
    /// Content bytes, excluding header and padding.
    pub size: u64,
    /// Absolute offset of the header block within the archive.
    pub header_offset: u64,
    /// Absolute offset of the first content byte.
    pub data_offset: u64,
}
