use std::path::Path;
use std::sync::Arc;

use crate::container::aggregate::Aggregate;
use crate::container::header::{HeaderRecord, padding_len};
use crate::domain::{EntryKind, EntryMeta};
use crate::error::Result;
use crate::segment::{ByteSegment, FileSegment, Piece, VirtualFileSegment};
use crate::util::owner::OwnerLookup;
use crate::vfs::VirtualFs;

/// `[header][content][padding]` for one entry.
///
/// When content is given, the header's size field is taken from the piece
/// so the two can never disagree. Padding is only added when the content
/// does not end on a block boundary.
pub fn entry_pieces(mut record: HeaderRecord, content: Option<Piece>) -> Aggregate {
    if let Some(c) = &content {
        record.size = c.size();
    }
    let mut agg = Aggregate::new();
    agg.push(ByteSegment::new(record.encode().to_vec()));
    if let Some(c) = content {
        let pad = padding_len(c.size());
        agg.push(c);
        if pad > 0 {
            agg.push(ByteSegment::zeroed(pad as usize));
        }
    }
    agg
}

/// Archive fragment for a file or directory on the local filesystem.
///
/// `name` is the entry's path inside the archive and must use `/`.
pub fn tar_file(meta: &EntryMeta, path: &Path, name: &str, owners: &dyn OwnerLookup) -> Result<Aggregate> {
    let record = HeaderRecord::from_meta(name, meta, owners);
    let content = match meta.kind {
        EntryKind::Dir => None,
        _ => Some(Piece::from(FileSegment::new(path)?)),
    };
    Ok(entry_pieces(record, content))
}

/// Like [`tar_file`], for an entry of a [`VirtualFs`].
pub fn tar_vfs_file(
    vfs: &Arc<dyn VirtualFs>,
    meta: &EntryMeta,
    path: &str,
    name: &str,
    owners: &dyn OwnerLookup,
) -> Result<Aggregate> {
    let record = HeaderRecord::from_meta(name, meta, owners);
    let content = match meta.kind {
        EntryKind::Dir => None,
        _ => Some(Piece::from(VirtualFileSegment::new(vfs.clone(), path)?)),
    };
    Ok(entry_pieces(record, content))
}
