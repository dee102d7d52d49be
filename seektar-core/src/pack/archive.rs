use crate::container::aggregate::Aggregate;
use crate::container::header::BLOCK_SIZE;
use crate::domain::{EntryInfo, EntryMeta};
use crate::read::cursor::Cursor;
use crate::segment::ByteSegment;

/// Two zero blocks terminate a tar stream.
pub const END_OF_ARCHIVE_LEN: usize = 2 * BLOCK_SIZE;

/// A virtual tar archive: the flattened piece list plus one row per entry.
#[derive(Clone, Debug, Default)]
pub struct Archive {
    aggregate: Aggregate,
    entries: Vec<EntryInfo>,
}

impl Archive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry fragment as produced by the entry builders.
    pub fn push_entry(&mut self, name: &str, meta: &EntryMeta, fragment: Aggregate) {
        let header_offset = self.aggregate.size();
        let size = fragment
            .range_of(1)
            .map(|(start, end)| end - start)
            .unwrap_or(0);
        self.entries.push(EntryInfo {
            name: name.to_string(),
            kind: meta.kind,
            mode: meta.mode,
            mtime: meta.mtime,
            size,
            header_offset,
            data_offset: header_offset + BLOCK_SIZE as u64,
        });
        self.aggregate.append(fragment);
    }

    pub fn push_end_of_archive(&mut self) {
        self.aggregate.push(ByteSegment::zeroed(END_OF_ARCHIVE_LEN));
    }

    pub fn aggregate(&self) -> &Aggregate {
        &self.aggregate
    }

    pub fn into_aggregate(self) -> Aggregate {
        self.aggregate
    }

    pub fn entries(&self) -> &[EntryInfo] {
        &self.entries
    }

    pub fn size(&self) -> u64 {
        self.aggregate.size()
    }

    pub fn etag(&self) -> String {
        self.aggregate.etag()
    }

    pub fn open(&self) -> Cursor<'_> {
        self.aggregate.open()
    }
}
