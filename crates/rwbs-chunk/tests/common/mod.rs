//! Helpers for assembling chunk streams in integration tests.

#![allow(dead_code)]

use rwbs_chunk::ChunkType;
use rwbs_common::Buffer;

/// 3.6.0.3, build 0xFFFF.
pub const V36: u32 = 0x1803_FFFF;

/// Writes nested chunks, patching list sizes when they are closed.
pub struct ChunkWriter {
    out: Vec<u8>,
    open: Vec<usize>,
    version: u32,
}

impl ChunkWriter {
    pub fn new(version: u32) -> Self {
        Self {
            out: Vec::new(),
            open: Vec::new(),
            version,
        }
    }

    fn header(&mut self, kind: ChunkType, size: u32) {
        self.out.extend_from_slice(&kind.raw().to_le_bytes());
        self.out.extend_from_slice(&size.to_le_bytes());
        self.out.extend_from_slice(&self.version.to_le_bytes());
    }

    /// Open a list chunk; children follow until [`end`](Self::end).
    pub fn begin(&mut self, kind: ChunkType) -> &mut Self {
        self.open.push(self.out.len());
        self.header(kind, 0);
        self
    }

    pub fn end(&mut self) -> &mut Self {
        let start = self.open.pop().expect("unbalanced end");
        let size = (self.out.len() - start - 12) as u32;
        self.out[start + 4..start + 8].copy_from_slice(&size.to_le_bytes());
        self
    }

    /// A leaf chunk with the given payload.
    pub fn leaf(&mut self, kind: ChunkType, payload: &[u8]) -> &mut Self {
        self.header(kind, payload.len() as u32);
        self.out.extend_from_slice(payload);
        self
    }

    /// A Struct leaf whose payload is built through a stretchy buffer.
    pub fn structure(&mut self, build: impl FnOnce(&mut Buffer<'static>) -> rwbs_common::Result<()>) -> &mut Self {
        let payload = bytes(build);
        self.leaf(ChunkType::STRUCT, &payload)
    }

    pub fn string(&mut self, text: &str) -> &mut Self {
        let mut payload = text.as_bytes().to_vec();
        payload.push(0);
        self.leaf(ChunkType::STRING, &payload)
    }

    pub fn empty_extension(&mut self) -> &mut Self {
        self.leaf(ChunkType::EXTENSION, &[])
    }

    pub fn finish(&mut self) -> Vec<u8> {
        assert!(self.open.is_empty(), "unclosed list chunk");
        std::mem::take(&mut self.out)
    }
}

pub fn bytes(build: impl FnOnce(&mut Buffer<'static>) -> rwbs_common::Result<()>) -> Vec<u8> {
    let mut out = Buffer::stretchy();
    build(&mut out).unwrap();
    out.into_vec()
}
