use crate::error::{Result, SeektarError};
use crate::read::cursor::Cursor;
use crate::read::range::RangeReader;
use crate::segment::Piece;

/// An ordered concatenation of pieces, read as one logical stream.
///
/// Piece `i` covers the half-open range `[end(i-1), end(i))`. The range table
/// is maintained as pieces are appended, so `size` is O(1).
///
/// The underlying files must not change while a cursor is reading from the
/// aggregate; otherwise reads may mix old and new bytes.
#[derive(Clone, Debug, Default)]
pub struct Aggregate {
    pieces: Vec<Piece>,
    ends: Vec<u64>,
}

impl Aggregate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, piece: impl Into<Piece>) {
        let piece = piece.into();
        let end = self.size() + piece.size();
        self.pieces.push(piece);
        self.ends.push(end);
    }

    /// Append every piece of `other`, flattening it into this aggregate.
    pub fn append(&mut self, other: Aggregate) {
        for p in other.pieces {
            self.push(p);
        }
    }

    pub fn size(&self) -> u64 {
        self.ends.last().copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Byte range `[start, end)` covered by piece `index`.
    pub fn range_of(&self, index: usize) -> Option<(u64, u64)> {
        let end = *self.ends.get(index)?;
        let start = if index == 0 { 0 } else { self.ends[index - 1] };
        Some((start, end))
    }

    /// Index of the piece holding byte `offset`. Zero-sized pieces never match.
    pub fn locate(&self, offset: u64) -> Option<usize> {
        let idx = self.ends.partition_point(|&end| end <= offset);
        (idx < self.pieces.len()).then_some(idx)
    }

    /// Each piece's size (8 bytes, little endian) followed by its fingerprint.
    pub fn fingerprint(&self) -> Vec<u8> {
        let mut id = Vec::new();
        for p in &self.pieces {
            id.extend_from_slice(&p.size().to_le_bytes());
            id.extend_from_slice(&p.fingerprint());
        }
        id
    }

    pub fn digest(&self) -> blake3::Hash {
        blake3::hash(&self.fingerprint())
    }

    /// Hex digest of the fingerprint, suitable as an HTTP entity tag.
    pub fn etag(&self) -> String {
        hex::encode(self.digest().as_bytes())
    }

    pub fn open(&self) -> Cursor<'_> {
        Cursor::new(self)
    }

    pub fn open_range(&self, start: u64, len: u64) -> Result<RangeReader<'_>> {
        let size = self.size();
        if start > size {
            return Err(SeektarError::Range { start, size });
        }
        RangeReader::new(self.open(), start, len)
    }
}

impl FromIterator<Piece> for Aggregate {
    fn from_iter<I: IntoIterator<Item = Piece>>(iter: I) -> Self {
        let mut agg = Aggregate::new();
        for p in iter {
            agg.push(p);
        }
        agg
    }
}

impl Extend<Piece> for Aggregate {
    fn extend<I: IntoIterator<Item = Piece>>(&mut self, iter: I) {
        for p in iter {
            self.push(p);
        }
    }
}
