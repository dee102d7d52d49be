use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use walkdir::WalkDir;

use super::archive::Archive;
use super::entry::{tar_file, tar_vfs_file};
use crate::container::aggregate::Aggregate;
use crate::domain::{EntryKind, EntryMeta};
use crate::error::{Result, SeektarError};
use crate::util::owner::{OwnerLookup, SystemOwners};
use crate::vfs::{self, VirtualFs};

#[derive(Clone)]
pub struct TarOptions {
    /// Directory name to store the content under. When empty, content sits
    /// at the archive root and the root directory itself is not encoded.
    pub prefix: String,
    /// Zero mtimes and owner ids, leave owner names blank.
    pub deterministic: bool,
    /// Walk symlinks as their targets. Otherwise entries that are neither
    /// regular files nor directories are skipped.
    pub follow_links: bool,
    /// Terminate the stream with two zero blocks.
    pub end_of_archive: bool,
    pub owners: Arc<dyn OwnerLookup>,
}

impl Default for TarOptions {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            deterministic: false,
            follow_links: false,
            end_of_archive: true,
            owners: Arc::new(SystemOwners::new()),
        }
    }
}

impl fmt::Debug for TarOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TarOptions")
            .field("prefix", &self.prefix)
            .field("deterministic", &self.deterministic)
            .field("follow_links", &self.follow_links)
            .field("end_of_archive", &self.end_of_archive)
            .finish_non_exhaustive()
    }
}

struct Planned<P> {
    name: String,
    path: P,
    meta: EntryMeta,
}

/// Build a virtual tar archive of a local directory.
///
/// Entries appear in walk order with siblings sorted by file name. The
/// result stays valid as long as the directory's contents do not change.
pub fn tar_dir(dir: &Path, opts: Option<&TarOptions>) -> Result<Archive> {
    let defaults = TarOptions::default();
    let opts = opts.unwrap_or(&defaults);

    let mut planned: Vec<Planned<PathBuf>> = Vec::new();
    for e in WalkDir::new(dir)
        .follow_links(opts.follow_links)
        .sort_by_file_name()
    {
        let e = e?;
        let Ok(rel) = e.path().strip_prefix(dir) else {
            continue;
        };
        let Some(name) = archive_name(&opts.prefix, rel) else {
            continue;
        };
        let meta = EntryMeta::from_fs(&e.metadata()?);
        if meta.kind == EntryKind::Other {
            tracing::debug!(path = %e.path().display(), "skipping unsupported entry type");
            continue;
        }
        planned.push(Planned {
            name,
            path: e.into_path(),
            meta: scrub(meta, opts),
        });
    }

    let owners = opts.owners.as_ref();
    let fragments = planned
        .par_iter()
        .map(|p| tar_file(&p.meta, &p.path, &p.name, owners))
        .collect::<Result<Vec<_>>>()?;

    Ok(assemble(&planned, fragments, opts))
}

/// Build a virtual tar archive of a directory inside a [`VirtualFs`].
///
/// Entries come depth first with siblings sorted by name, the same order
/// [`tar_dir`] produces. Symlinks below `dir` are skipped unless
/// `follow_links` is set.
pub fn tar_vfs(vfs: Arc<dyn VirtualFs>, dir: &str, opts: Option<&TarOptions>) -> Result<Archive> {
    let defaults = TarOptions::default();
    let opts = opts.unwrap_or(&defaults);

    let root = vfs::clean(dir).ok_or_else(|| SeektarError::VirtualPath(dir.to_string()))?;
    let root_meta = vfs
        .metadata(&root)
        .map_err(|e| SeektarError::path("stat virtual entry", &root, e))?;
    let mut listing = Vec::new();
    list_recursive(vfs.as_ref(), root.clone(), root_meta, opts.follow_links, &mut listing)?;

    let mut planned: Vec<Planned<String>> = Vec::with_capacity(listing.len());
    for (path, meta) in listing {
        let rel = path[root.len()..].trim_start_matches('/');
        let Some(name) = archive_name(&opts.prefix, Path::new(rel)) else {
            continue;
        };
        if meta.kind == EntryKind::Other {
            tracing::debug!(path, "skipping unsupported entry type");
            continue;
        }
        planned.push(Planned {
            name,
            path,
            meta: scrub(meta, opts),
        });
    }

    let owners = opts.owners.as_ref();
    let fragments = planned
        .iter()
        .map(|p| tar_vfs_file(&vfs, &p.meta, &p.path, &p.name, owners))
        .collect::<Result<Vec<_>>>()?;

    Ok(assemble(&planned, fragments, opts))
}

fn list_recursive(
    fs: &dyn VirtualFs,
    path: String,
    meta: EntryMeta,
    follow_links: bool,
    out: &mut Vec<(String, EntryMeta)>,
) -> Result<()> {
    let is_dir = meta.is_dir();
    out.push((path.clone(), meta));
    if !is_dir {
        return Ok(());
    }
    let mut names = fs
        .read_dir(&path)
        .map_err(|e| SeektarError::path("list virtual directory", &path, e))?;
    names.sort();
    for name in names {
        let child = vfs::join(&path, &name);
        let stat = if follow_links {
            fs.metadata(&child)
        } else {
            fs.symlink_metadata(&child)
        };
        let meta = stat.map_err(|e| SeektarError::path("stat virtual entry", &child, e))?;
        list_recursive(fs, child, meta, follow_links, out)?;
    }
    Ok(())
}

fn assemble<P>(planned: &[Planned<P>], fragments: Vec<Aggregate>, opts: &TarOptions) -> Archive {
    let mut archive = Archive::new();
    for (p, fragment) in planned.iter().zip(fragments) {
        archive.push_entry(&p.name, &p.meta, fragment);
    }
    if opts.end_of_archive {
        archive.push_end_of_archive();
    }
    tracing::debug!(
        entries = archive.entries().len(),
        pieces = archive.aggregate().len(),
        size = archive.size(),
        "built virtual archive"
    );
    archive
}

/// Entry name inside the archive for a path relative to the walk root, or
/// `None` for the root itself when there is no prefix.
fn archive_name(prefix: &str, rel: &Path) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    let prefix = prefix.trim_matches('/');
    if !prefix.is_empty() {
        parts.push(prefix.to_string());
    }
    for c in rel.components() {
        if let Component::Normal(s) = c {
            parts.push(s.to_string_lossy().to_string());
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

fn scrub(mut meta: EntryMeta, opts: &TarOptions) -> EntryMeta {
    if opts.deterministic {
        meta.mtime = 0;
        meta.uid = None;
        meta.gid = None;
    }
    meta
}
