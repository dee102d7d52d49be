use super::cursor::Cursor;
use crate::error::Result;
use std::io::{Read, Seek, SeekFrom};

/// Reads `len` bytes of an aggregate starting at `start`, e.g. to answer a
/// single byte-range request.
pub struct RangeReader<'a> {
    inner: Cursor<'a>,
    remain: u64,
}

impl<'a> RangeReader<'a> {
    /// The window is clamped to the end of the aggregate.
    pub(crate) fn new(mut inner: Cursor<'a>, start: u64, len: u64) -> Result<Self> {
        let remain = len.min(inner.len().saturating_sub(start));
        inner.seek(SeekFrom::Start(start))?;
        Ok(Self { inner, remain })
    }

    /// Bytes left in the range.
    pub fn remaining(&self) -> u64 {
        self.remain
    }
}

impl Read for RangeReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let room = usize::try_from(self.remain).map_or(buf.len(), |r| r.min(buf.len()));
        if room == 0 {
            return Ok(0);
        }
        let n = self.inner.read(&mut buf[..room])?;
        self.remain -= n as u64;
        Ok(n)
    }
}
