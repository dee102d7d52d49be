//! Seekable reader over an [`Aggregate`].
//!
//! The cursor keeps at most one piece open. Seeks only move the offset (or
//! reposition the open piece when the target stays inside it); pieces are
//! located and opened lazily by the next read, and closed as soon as the
//! offset leaves their range.

use std::io::{self, Read, Seek, SeekFrom};

use crate::container::aggregate::Aggregate;
use crate::error::SeektarError;
use crate::segment::ReadSeek;

struct OpenPiece<'a> {
    index: usize,
    start: u64,
    end: u64,
    reader: Box<dyn ReadSeek + 'a>,
}

enum State<'a> {
    NoUnderlyingOpen,
    UnderlyingOpen(OpenPiece<'a>),
}

/// One reader per concurrent consumer; a cursor itself is not meant to be
/// shared between threads.
///
/// As with [`std::io::Seek`], seeking beyond the end is allowed: the position
/// is stored as given (it may exceed [`Cursor::len`]) and every read from
/// there returns 0 bytes. Only negative or overflowing targets are errors.
pub struct Cursor<'a> {
    agg: &'a Aggregate,
    size: u64,
    offset: u64,
    state: State<'a>,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(agg: &'a Aggregate) -> Self {
        Self {
            agg,
            size: agg.size(),
            offset: 0,
            state: State::NoUnderlyingOpen,
        }
    }

    pub fn position(&self) -> u64 {
        self.offset
    }

    /// Total size of the aggregate.
    pub fn len(&self) -> u64 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Index of the piece currently held open, if any.
    pub fn open_piece(&self) -> Option<usize> {
        match &self.state {
            State::UnderlyingOpen(p) => Some(p.index),
            State::NoUnderlyingOpen => None,
        }
    }

    /// Release the open piece, if any. Safe to call repeatedly.
    pub fn close(&mut self) {
        if let State::UnderlyingOpen(p) = std::mem::replace(&mut self.state, State::NoUnderlyingOpen) {
            tracing::trace!(index = p.index, offset = self.offset, "closing piece");
        }
    }

    fn locate(&self) -> io::Result<Option<OpenPiece<'a>>> {
        let agg: &'a Aggregate = self.agg;
        let Some(index) = agg.locate(self.offset) else {
            return Ok(None);
        };
        let Some((start, end)) = agg.range_of(index) else {
            return Ok(None);
        };
        tracing::trace!(index, start, end, offset = self.offset, "opening piece");
        let mut reader = agg.pieces()[index]
            .open()
            .map_err(|e| SeektarError::piece_io("open", index, e))?;
        if self.offset > start {
            reader
                .seek(SeekFrom::Start(self.offset - start))
                .map_err(|e| SeektarError::piece_io("seek", index, e))?;
        }
        Ok(Some(OpenPiece {
            index,
            start,
            end,
            reader,
        }))
    }
}

impl Read for Cursor<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if let State::NoUnderlyingOpen = self.state {
            match self.locate()? {
                Some(p) => self.state = State::UnderlyingOpen(p),
                None => return Ok(0),
            }
        }
        let State::UnderlyingOpen(piece) = &mut self.state else {
            return Ok(0);
        };

        let want = buf.len().min((piece.end - self.offset).min(usize::MAX as u64) as usize);
        let n = match piece.reader.read(&mut buf[..want]) {
            Ok(0) => {
                let err = io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!(
                        "piece ended after {} of {} bytes",
                        self.offset - piece.start,
                        piece.end - piece.start
                    ),
                );
                let err = SeektarError::piece_io("read", piece.index, err);
                self.close();
                return Err(err);
            }
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => return Err(e),
            Err(e) => {
                let err = SeektarError::piece_io("read", piece.index, e);
                self.close();
                return Err(err);
            }
        };

        self.offset += n as u64;
        if self.offset >= piece.end {
            self.close();
        }
        Ok(n)
    }
}

impl Seek for Cursor<'_> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(n) => Some(n),
            SeekFrom::Current(d) => self.offset.checked_add_signed(d),
            SeekFrom::End(d) => self.size.checked_add_signed(d),
        };
        let target = target.ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            )
        })?;
        if target == self.offset {
            return Ok(target);
        }
        self.offset = target;

        if let State::UnderlyingOpen(piece) = &mut self.state {
            if target >= piece.start && target < piece.end {
                if let Err(e) = piece.reader.seek(SeekFrom::Start(target - piece.start)) {
                    let err = SeektarError::piece_io("seek", piece.index, e);
                    self.close();
                    return Err(err);
                }
            } else {
                self.close();
            }
        }
        Ok(target)
    }
}
