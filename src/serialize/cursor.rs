//! Layout cursor for building pointer-addressed files.
//!
//! Writers append sections at aligned positions into one growing buffer and
//! collect the resulting pointers as they go; the header block reserved at
//! offset 0 is patched last, once every section has a final address. All
//! positions are absolute file offsets.

use crate::bytes;

pub struct SectionWriter {
    pub(crate) buf: Vec<u8>,
}

impl SectionWriter {
    pub fn new() -> Self {
        SectionWriter { buf: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Current end of the buffer as a file offset.
    pub fn position(&self) -> u32 {
        self.buf.len() as u32
    }

    /// Zero-fill up to the next multiple of `boundary`.
    pub fn align_to(&mut self, boundary: usize) {
        bytes::pad_to(&mut self.buf, boundary);
    }

    /// Align and return the offset the next section will start at.
    pub fn begin_section(&mut self, align: usize) -> u32 {
        self.align_to(align);
        self.position()
    }

    /// Append `len` zero bytes to be patched later; returns their offset.
    pub fn reserve(&mut self, len: usize) -> usize {
        let at = self.buf.len();
        bytes::write_zeros(&mut self.buf, len);
        at
    }

    pub fn put(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    pub fn put_u16(&mut self, v: u16) {
        bytes::write_u16(&mut self.buf, v);
    }

    pub fn put_u32(&mut self, v: u32) {
        bytes::write_u32(&mut self.buf, v);
    }

    pub fn put_i32(&mut self, v: i32) {
        bytes::write_i32(&mut self.buf, v);
    }

    // Patches target space the writer reserved earlier, so an out-of-range
    // offset is a programming error and panics, matching the block patchers
    // in `bytes`.

    pub fn patch(&mut self, offset: usize, data: &[u8]) {
        self.buf[offset..offset + data.len()].copy_from_slice(data);
    }

    pub fn patch_u16(&mut self, offset: usize, v: u16) {
        bytes::write_u16_at(&mut self.buf, offset, v);
    }

    pub fn patch_u32(&mut self, offset: usize, v: u32) {
        bytes::write_u32_at(&mut self.buf, offset, v);
    }

    pub fn patch_f32(&mut self, offset: usize, v: f32) {
        bytes::write_f32_at(&mut self.buf, offset, v);
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

impl Default for SectionWriter {
    fn default() -> Self {
        SectionWriter::new()
    }
}
