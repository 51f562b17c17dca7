//! Gameplay sections whose record meaning is unidentified but whose framing
//! is known. Four shapes cover all of them:
//!
//! - [`RawEntity`]: counted sections of fixed 0x10-byte records (type04,
//!   type7C, type80).
//! - [`MatrixEntity`]: counted 0x90-byte records opening with a transform
//!   (type0C). The matrix is decoded so the entity can be repositioned; the
//!   0x50-byte tail is preserved verbatim.
//! - [`KeyValueMap`]: sentinel-terminated (key, value) pair runs with no
//!   count field (type50, type5C).
//! - [`SizedBlob`]: sections that carry their own byte length (type64,
//!   type68, type88).

use cgmath::{Matrix4, SquareMatrix, Vector3};

use crate::bytes;
use crate::error::Result;
use crate::game::GameVariant;
use crate::math;
use crate::objects::{GameRecord, OpaqueBlob, Placed};

// ============================================================================
// Raw fixed-stride records
// ============================================================================

/// A 0x10-byte record preserved verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEntity {
    pub data: [u8; 0x10],
}

impl Default for RawEntity {
    fn default() -> Self {
        RawEntity { data: [0u8; 0x10] }
    }
}

impl GameRecord for RawEntity {
    fn element_size(_game: GameVariant) -> usize {
        0x10
    }

    fn decode(block: &[u8], offset: usize, _game: GameVariant) -> Result<Self> {
        let raw = bytes::bytes(block, offset, 0x10)?;
        let mut data = [0u8; 0x10];
        data.copy_from_slice(raw);
        Ok(RawEntity { data })
    }

    fn encode(&self, buf: &mut Vec<u8>, _game: GameVariant) {
        buf.extend_from_slice(&self.data);
    }
}

// ============================================================================
// Matrix-headed records
// ============================================================================

/// A 0x90-byte record: a 4x4 transform followed by 0x50 opaque bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixEntity {
    pub matrix: Matrix4<f32>,
    pub tail: OpaqueBlob,
}

impl MatrixEntity {
    pub const ELEMENT_SIZE: usize = 0x90;
    const TAIL_LEN: usize = 0x50;
}

impl Default for MatrixEntity {
    fn default() -> Self {
        MatrixEntity {
            matrix: Matrix4::identity(),
            tail: OpaqueBlob::zeroed(Self::TAIL_LEN),
        }
    }
}

impl GameRecord for MatrixEntity {
    fn element_size(_game: GameVariant) -> usize {
        Self::ELEMENT_SIZE
    }

    fn decode(block: &[u8], offset: usize, _game: GameVariant) -> Result<Self> {
        Ok(MatrixEntity {
            matrix: math::read_mat4(block, offset)?,
            tail: OpaqueBlob::from_block(block, offset + 0x40, Self::TAIL_LEN)?,
        })
    }

    fn encode(&self, buf: &mut Vec<u8>, _game: GameVariant) {
        math::write_mat4(buf, &self.matrix);
        self.tail.write(buf);
    }
}

impl Placed for MatrixEntity {
    fn position(&self) -> Vector3<f32> {
        self.matrix.w.truncate()
    }

    fn set_position(&mut self, p: Vector3<f32>) {
        self.matrix.w.x = p.x;
        self.matrix.w.y = p.y;
        self.matrix.w.z = p.z;
    }

    fn rotation(&self) -> Vector3<f32> {
        math::decompose_trs(&self.matrix).1
    }

    fn set_rotation(&mut self, e: Vector3<f32>) {
        let (t, _, s) = math::decompose_trs(&self.matrix);
        self.matrix = math::compose_trs(t, e, s);
    }

    fn scale(&self) -> Vector3<f32> {
        math::decompose_trs(&self.matrix).2
    }

    fn set_scale(&mut self, s: Vector3<f32>) {
        let (t, r, _) = math::decompose_trs(&self.matrix);
        self.matrix = math::compose_trs(t, r, s);
    }
}

// ============================================================================
// Sentinel-terminated pair runs
// ============================================================================

const PAIR_SENTINEL: u32 = 0xFFFF_FFFF;

/// An ordered (key, value) run terminated by an all-ones pair instead of a
/// count. An empty map serializes as an absent section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValueMap {
    pub pairs: Vec<(u32, u32)>,
}

impl KeyValueMap {
    pub fn decode(block: &[u8]) -> Result<Self> {
        let mut pairs = Vec::new();
        let mut at = 0;
        loop {
            let key = bytes::read_u32(block, at)?;
            let value = bytes::read_u32(block, at + 4)?;
            if key == PAIR_SENTINEL && value == PAIR_SENTINEL {
                break;
            }
            pairs.push((key, value));
            at += 8;
        }
        Ok(KeyValueMap { pairs })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity((self.pairs.len() + 1) * 8);
        for &(key, value) in &self.pairs {
            bytes::write_u32(&mut buf, key);
            bytes::write_u32(&mut buf, value);
        }
        bytes::write_u32(&mut buf, PAIR_SENTINEL);
        bytes::write_u32(&mut buf, PAIR_SENTINEL);
        buf
    }

    pub fn get(&self, key: u32) -> Option<u32> {
        self.pairs.iter().find(|&&(k, _)| k == key).map(|&(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

// ============================================================================
// Self-sized blobs
// ============================================================================

/// A section whose first word is its own payload length:
///
/// ```text
/// 0x00 byteLen u32
/// 0x04 zero pad to 0x10
/// 0x10 byteLen bytes
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizedBlob {
    pub data: Vec<u8>,
}

impl SizedBlob {
    pub fn decode(block: &[u8]) -> Result<Self> {
        let len = bytes::read_u32(block, 0x00)? as usize;
        Ok(SizedBlob {
            data: bytes::bytes(block, 0x10, len)?.to_vec(),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(0x10 + self.data.len());
        bytes::write_u32(&mut buf, self.data.len() as u32);
        bytes::pad_to(&mut buf, 0x10);
        buf.extend_from_slice(&self.data);
        buf
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{read_counted, write_counted};

    #[test]
    fn raw_entities_round_trip_through_counted_framing() {
        let list = vec![
            RawEntity {
                data: *b"0123456789ABCDEF",
            },
            RawEntity::default(),
        ];
        let buf = write_counted(&list, GameVariant::Rc3);
        assert_eq!(buf.len(), 0x10 + 2 * 0x10);
        let back: Vec<RawEntity> = read_counted(&buf, GameVariant::Rc3).unwrap();
        assert_eq!(back, list);
    }

    #[test]
    fn matrix_entity_preserves_its_tail_verbatim() {
        let mut buf = Vec::new();
        math::write_mat4(&mut buf, &Matrix4::from_translation(Vector3::new(9.0, 8.0, 7.0)));
        buf.extend((0u8..0x50).map(|b| b ^ 0x5A));
        let entity = MatrixEntity::decode(&buf, 0, GameVariant::Rc2).unwrap();
        assert_eq!(entity.position(), Vector3::new(9.0, 8.0, 7.0));

        let mut out = Vec::new();
        entity.encode(&mut out, GameVariant::Rc2);
        assert_eq!(out, buf);
    }

    #[test]
    fn matrix_entity_moves_without_touching_the_tail() {
        let mut entity = MatrixEntity::default();
        let tail = entity.tail.clone();
        entity.set_position(Vector3::new(1.0, 2.0, 3.0));
        entity.translate(Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(entity.position(), Vector3::new(2.0, 2.0, 3.0));
        assert_eq!(entity.tail, tail);
    }

    #[test]
    fn key_value_run_stops_at_the_sentinel() {
        let map = KeyValueMap {
            pairs: vec![(10, 0x100), (11, 0x200), (500, 0)],
        };
        let mut buf = map.encode();
        // Trailing bytes after the sentinel belong to the next section and
        // must not be consumed.
        buf.extend_from_slice(&[0xAB; 0x20]);
        let back = KeyValueMap::decode(&buf).unwrap();
        assert_eq!(back, map);
        assert_eq!(back.get(11), Some(0x200));
        assert_eq!(back.get(12), None);
    }

    #[test]
    fn empty_key_value_map_is_just_the_sentinel() {
        let buf = KeyValueMap::default().encode();
        assert_eq!(buf, vec![0xFF; 8]);
        assert!(KeyValueMap::decode(&buf).unwrap().is_empty());
    }

    #[test]
    fn unterminated_key_value_run_is_truncated_input() {
        let mut buf = Vec::new();
        bytes::write_u32(&mut buf, 1);
        bytes::write_u32(&mut buf, 2);
        match KeyValueMap::decode(&buf) {
            Err(crate::error::LevelError::TruncatedInput { .. }) => {}
            other => panic!("expected TruncatedInput, got {:?}", other),
        }
    }

    #[test]
    fn sized_blob_length_word_frames_the_payload() {
        let blob = SizedBlob {
            data: vec![7u8; 0x23],
        };
        let buf = blob.encode();
        assert_eq!(bytes::read_u32(&buf, 0).unwrap(), 0x23);
        assert_eq!(buf.len(), 0x10 + 0x23);
        assert_eq!(SizedBlob::decode(&buf).unwrap(), blob);
    }
}
