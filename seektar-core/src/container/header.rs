//! USTAR header blocks.
//!
//! | Offset | Size | Field    | Encoding            |
//! |--------|------|----------|---------------------|
//! | 0      | 100  | name     | null padded         |
//! | 100    | 8    | mode     | `%06o \0`           |
//! | 108    | 8    | uid      | `%06o \0`           |
//! | 116    | 8    | gid      | `%06o \0`           |
//! | 124    | 12   | size     | `%11o\0`            |
//! | 136    | 12   | mtime    | `%11o\0`            |
//! | 148    | 8    | checksum | `%06o\0 `           |
//! | 156    | 1    | typeflag | `'0'` or `'5'`      |
//! | 157    | 100  | linkname | null padded         |
//! | 257    | 8    | magic    | `"ustar\0" "00"`    |
//! | 265    | 32   | uname    | null padded         |
//! | 297    | 32   | gname    | null padded         |
//! | 329    | 8    | devmajor | `%06o \0`           |
//! | 337    | 8    | devminor | `%06o \0`           |
//! | 345    | 155  | prefix   | null padded         |
//! | 500    | 12   | padding  | zero                |
//!
//! Numbers too large for their octal width are stored in base-256 form
//! (first byte has the high bit set, value big endian across the field).

use std::ops::Range;

use crate::domain::{EntryKind, EntryMeta};
use crate::util::owner::OwnerLookup;

pub const BLOCK_SIZE: usize = 512;
pub const NAME_LEN: usize = 100;
pub const PREFIX_LEN: usize = 155;
pub const USTAR_MAGIC: &[u8; 8] = b"ustar\x0000";

const CHECKSUM_RANGE: Range<usize> = 148..156;

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EntryType {
    Regular = b'0',
    Directory = b'5',
}

/// Metadata for one header block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderRecord {
    /// Path inside the archive, `/` separated.
    pub name: String,
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub size: u64,
    pub mtime: u64,
    pub entry_type: EntryType,
    pub link_name: String,
    pub uname: String,
    pub gname: String,
    pub dev_major: u32,
    pub dev_minor: u32,
}

impl HeaderRecord {
    pub fn new(name: impl Into<String>, entry_type: EntryType) -> Self {
        Self {
            name: name.into(),
            mode: 0,
            uid: 0,
            gid: 0,
            size: 0,
            mtime: 0,
            entry_type,
            link_name: String::new(),
            uname: String::new(),
            gname: String::new(),
            dev_major: 0,
            dev_minor: 0,
        }
    }

    /// Fill a record from entry metadata. Directories always get size 0.
    pub fn from_meta(name: impl Into<String>, meta: &EntryMeta, owners: &dyn OwnerLookup) -> Self {
        let entry_type = if meta.kind == EntryKind::Dir {
            EntryType::Directory
        } else {
            EntryType::Regular
        };
        let mut rec = Self::new(name, entry_type);
        rec.mode = meta.mode & 0o777;
        rec.mtime = meta.mtime;
        if entry_type == EntryType::Regular {
            rec.size = meta.size;
        }
        if let Some(uid) = meta.uid {
            rec.uid = uid;
            rec.uname = owners.user_name(uid).unwrap_or_default();
        }
        if let Some(gid) = meta.gid {
            rec.gid = gid;
            rec.gname = owners.group_name(gid).unwrap_or_default();
        }
        rec
    }

    pub fn encode(&self) -> [u8; BLOCK_SIZE] {
        let (prefix, suffix) = split_name(self.name.as_bytes());
        if suffix.len() > NAME_LEN {
            tracing::warn!(name = %self.name, "entry name does not fit the header, truncating");
        }

        let mut out = Vec::with_capacity(BLOCK_SIZE);
        put_str(&mut out, suffix, NAME_LEN);
        put_octal(&mut out, self.mode as u64, 6, b" \0", b'0');
        put_octal(&mut out, self.uid as u64, 6, b" \0", b'0');
        put_octal(&mut out, self.gid as u64, 6, b" \0", b'0');
        put_octal(&mut out, self.size, 11, b"\0", b' ');
        put_octal(&mut out, self.mtime, 11, b"\0", b' ');
        out.extend_from_slice(b"        ");
        out.push(self.entry_type as u8);
        put_str(&mut out, self.link_name.as_bytes(), 100);
        out.extend_from_slice(USTAR_MAGIC);
        put_str(&mut out, self.uname.as_bytes(), 32);
        put_str(&mut out, self.gname.as_bytes(), 32);
        put_octal(&mut out, self.dev_major as u64, 6, b" \0", b'0');
        put_octal(&mut out, self.dev_minor as u64, 6, b" \0", b'0');
        put_str(&mut out, prefix, PREFIX_LEN);
        out.resize(BLOCK_SIZE, 0);

        let mut block = [0u8; BLOCK_SIZE];
        block.copy_from_slice(&out);
        let sum = checksum(&block);
        block[CHECKSUM_RANGE].copy_from_slice(format!("{sum:06o}\0 ").as_bytes());
        block
    }
}

/// Split a long name into `(prefix, name)` at the last `/` at or before byte
/// 155. The separator itself is dropped. Names of up to 100 bytes, and names
/// without a usable separator, are returned whole as the name part.
pub fn split_name(name: &[u8]) -> (&[u8], &[u8]) {
    if name.len() <= NAME_LEN {
        return (&[], name);
    }
    match name.iter().take(PREFIX_LEN + 1).rposition(|&b| b == b'/') {
        Some(i) => (&name[..i], &name[i + 1..]),
        None => (&[], name),
    }
}

/// Unsigned byte sum of a block, counting the checksum field as spaces.
pub fn checksum(block: &[u8; BLOCK_SIZE]) -> u32 {
    block
        .iter()
        .enumerate()
        .map(|(i, &b)| (if CHECKSUM_RANGE.contains(&i) { b' ' } else { b }) as u32)
        .sum()
}

/// Zero bytes needed after `size` content bytes to reach a block boundary.
pub fn padding_len(size: u64) -> u64 {
    let rem = size % BLOCK_SIZE as u64;
    if rem == 0 { 0 } else { BLOCK_SIZE as u64 - rem }
}

fn put_str(out: &mut Vec<u8>, data: &[u8], len: usize) {
    let n = data.len().min(len);
    out.extend_from_slice(&data[..n]);
    out.resize(out.len() + (len - n), 0);
}

fn put_octal(out: &mut Vec<u8>, value: u64, digits: usize, term: &[u8], pad: u8) {
    if value < 1u64 << (3 * digits) {
        let text = format!("{value:o}");
        out.resize(out.len() + (digits - text.len()), pad);
        out.extend_from_slice(text.as_bytes());
        out.extend_from_slice(term);
    } else {
        let width = digits + term.len();
        let be = value.to_be_bytes();
        let n = be.len().min(width);
        let start = out.len();
        out.resize(start + (width - n), 0);
        out.extend_from_slice(&be[be.len() - n..]);
        out[start] |= 0x80;
    }
}
