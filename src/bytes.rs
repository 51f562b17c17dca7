//! Big-endian primitive codec.
//!
//! All archive files store multi-byte values big-endian. Readers take a
//! section-local block plus an offset and fail with `TruncatedInput` instead
//! of returning garbage on overrun. Writers come in two shapes: appending
//! into a growing `Vec<u8>` (the common case when building a section) and
//! patching at a fixed offset inside an already-sized block (header
//! backpatching).

use std::io::{Read, Seek, SeekFrom};

use crate::error::{LevelError, Result};

/// Borrow `len` bytes at `offset`, bounds-checked.
pub fn bytes(block: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    block
        .get(offset..offset + len)
        .ok_or(LevelError::TruncatedInput {
            offset: offset as u64,
            needed: len,
        })
}

// ============================================================================
// Readers
// ============================================================================

pub fn read_u8(block: &[u8], offset: usize) -> Result<u8> {
    Ok(bytes(block, offset, 1)?[0])
}

pub fn read_i16(block: &[u8], offset: usize) -> Result<i16> {
    let b = bytes(block, offset, 2)?;
    Ok(i16::from_be_bytes([b[0], b[1]]))
}

pub fn read_u16(block: &[u8], offset: usize) -> Result<u16> {
    let b = bytes(block, offset, 2)?;
    Ok(u16::from_be_bytes([b[0], b[1]]))
}

pub fn read_i32(block: &[u8], offset: usize) -> Result<i32> {
    let b = bytes(block, offset, 4)?;
    Ok(i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

pub fn read_u32(block: &[u8], offset: usize) -> Result<u32> {
    let b = bytes(block, offset, 4)?;
    Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

/// Floats are reinterpreted from the big-endian bit pattern, never parsed.
pub fn read_f32(block: &[u8], offset: usize) -> Result<f32> {
    Ok(f32::from_bits(read_u32(block, offset)?))
}

// ============================================================================
// Appending writers
// ============================================================================

pub fn write_u8(buf: &mut Vec<u8>, v: u8) {
    buf.push(v);
}

pub fn write_i16(buf: &mut Vec<u8>, v: i16) {
    buf.extend_from_slice(&v.to_be_bytes());
}

pub fn write_u16(buf: &mut Vec<u8>, v: u16) {
    buf.extend_from_slice(&v.to_be_bytes());
}

pub fn write_i32(buf: &mut Vec<u8>, v: i32) {
    buf.extend_from_slice(&v.to_be_bytes());
}

pub fn write_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_be_bytes());
}

pub fn write_f32(buf: &mut Vec<u8>, v: f32) {
    buf.extend_from_slice(&v.to_bits().to_be_bytes());
}

pub fn write_zeros(buf: &mut Vec<u8>, n: usize) {
    buf.extend(std::iter::repeat(0u8).take(n));
}

/// Zero-fill `buf` up to the next multiple of `boundary`.
pub fn pad_to(buf: &mut Vec<u8>, boundary: usize) {
    let rem = buf.len() % boundary;
    if rem != 0 {
        write_zeros(buf, boundary - rem);
    }
}

// ============================================================================
// Patching writers
// ============================================================================

// In-place writes target pre-sized buffers the caller controls, so an
// out-of-range offset is a programming error and panics via slice indexing.

pub fn write_u16_at(block: &mut [u8], offset: usize, v: u16) {
    block[offset..offset + 2].copy_from_slice(&v.to_be_bytes());
}

pub fn write_i32_at(block: &mut [u8], offset: usize, v: i32) {
    block[offset..offset + 4].copy_from_slice(&v.to_be_bytes());
}

pub fn write_u32_at(block: &mut [u8], offset: usize, v: u32) {
    block[offset..offset + 4].copy_from_slice(&v.to_be_bytes());
}

pub fn write_f32_at(block: &mut [u8], offset: usize, v: f32) {
    block[offset..offset + 4].copy_from_slice(&v.to_bits().to_be_bytes());
}

// ============================================================================
// Block extraction
// ============================================================================

/// Seek to `offset` and copy `len` bytes out of `source`.
///
/// A non-positive `len` yields a 0x10-byte zero block. Absent objects are
/// encoded as pointer 0, and downstream decoders unconditionally read a
/// nominal header from the returned block, so the placeholder must be large
/// enough to satisfy those reads.
pub fn read_block<R: Read + Seek>(source: &mut R, offset: u64, len: i64) -> Result<Vec<u8>> {
    if len <= 0 {
        return Ok(vec![0u8; 0x10]);
    }
    source.seek(SeekFrom::Start(offset))?;
    let mut block = vec![0u8; len as usize];
    source.read_exact(&mut block).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            LevelError::TruncatedInput {
                offset,
                needed: len as usize,
            }
        } else {
            LevelError::Io(e)
        }
    })?;
    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn integer_round_trips() {
        for &x in &[0i32, 1, -1, i32::MIN, i32::MAX, 0x12345678] {
            let mut buf = Vec::new();
            write_i32(&mut buf, x);
            assert_eq!(read_i32(&buf, 0).unwrap(), x);
        }
        for &x in &[0u16, 1, 0xFFFF, 0xBEEF] {
            let mut buf = Vec::new();
            write_u16(&mut buf, x);
            assert_eq!(read_u16(&buf, 0).unwrap(), x);
        }
    }

    #[test]
    fn f32_round_trips_bit_for_bit() {
        // Includes a NaN with a payload, which an approximate comparison or
        // a text round trip would destroy.
        for bits in [0u32, 0x3F800000, 0xBF800000, 0x7FC00001, 0xFF800000] {
            let mut buf = Vec::new();
            write_f32(&mut buf, f32::from_bits(bits));
            assert_eq!(read_f32(&buf, 0).unwrap().to_bits(), bits);
        }
    }

    #[test]
    fn big_endian_byte_order() {
        let mut buf = Vec::new();
        write_u32(&mut buf, 0x11223344);
        assert_eq!(buf, [0x11, 0x22, 0x33, 0x44]);
        write_u16(&mut buf, 0xAABB);
        assert_eq!(&buf[4..], [0xAA, 0xBB]);
    }

    #[test]
    fn overrun_reports_truncated_input() {
        let buf = [0u8; 6];
        match read_u32(&buf, 4) {
            Err(crate::error::LevelError::TruncatedInput { offset: 4, needed: 4 }) => {}
            other => panic!("expected TruncatedInput, got {:?}", other),
        }
    }

    #[test]
    fn patch_writers_match_appenders() {
        let mut patched = vec![0u8; 8];
        write_u32_at(&mut patched, 4, 0xCAFEBABE);
        let mut appended = vec![0u8; 4];
        write_u32(&mut appended, 0xCAFEBABE);
        assert_eq!(&patched[4..], &appended[..]);
    }

    #[test]
    fn read_block_copies_the_requested_range() {
        let data: Vec<u8> = (0u8..64).collect();
        let mut cursor = Cursor::new(data);
        let block = read_block(&mut cursor, 0x10, 8).unwrap();
        assert_eq!(block, (0x10u8..0x18).collect::<Vec<_>>());
    }

    #[test]
    fn read_block_zero_pads_non_positive_lengths() {
        let mut cursor = Cursor::new(vec![0xFFu8; 4]);
        for len in [0i64, -1, -0x100] {
            let block = read_block(&mut cursor, 0, len).unwrap();
            assert_eq!(block, vec![0u8; 0x10]);
        }
    }

    #[test]
    fn read_block_past_eof_is_truncated_input() {
        let mut cursor = Cursor::new(vec![0u8; 8]);
        match read_block(&mut cursor, 4, 8) {
            Err(crate::error::LevelError::TruncatedInput { offset: 4, needed: 8 }) => {}
            other => panic!("expected TruncatedInput, got {:?}", other),
        }
    }

    #[test]
    fn pad_to_is_idempotent_on_aligned_buffers() {
        let mut buf = vec![1u8; 0x10];
        pad_to(&mut buf, 0x10);
        assert_eq!(buf.len(), 0x10);
        buf.push(2);
        pad_to(&mut buf, 0x10);
        assert_eq!(buf.len(), 0x20);
    }
}
