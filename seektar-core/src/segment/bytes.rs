use std::io::Cursor;

/// In-memory piece, used for generated headers and block padding.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ByteSegment {
    data: Vec<u8>,
}

impl ByteSegment {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// `len` zero bytes.
    pub fn zeroed(len: usize) -> Self {
        Self {
            data: vec![0u8; len],
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn reader(&self) -> Cursor<&[u8]> {
        Cursor::new(&self.data)
    }
}
