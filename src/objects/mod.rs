//! Level-object layer: fixed-stride record codecs for positioned entities.
//!
//! Most counted sections share one framing:
//!
//! ```text
//! 0x00 count u32
//! 0x04 zero pad to 0x10
//! 0x10 count * ELEMENTSIZE bytes
//! ```
//!
//! Tie and shrub instance lists are the exception: their counts live in the
//! engine header and the records start directly at the section pointer.

pub mod camera;
pub mod lang;
pub mod level_vars;
pub mod moby;
pub mod occlusion;
pub mod shrub;
pub mod spline;
pub mod tie;
pub mod unknowns;
pub mod volume;

pub use camera::Camera;
pub use lang::{LanguageEntry, LanguageTable};
pub use level_vars::LevelVariables;
pub use moby::Moby;
pub use occlusion::{Occlusion, OcclusionPair};
pub use shrub::Shrub;
pub use spline::Spline;
pub use tie::Tie;
pub use unknowns::{KeyValueMap, MatrixEntity, RawEntity, SizedBlob};
pub use volume::Volume;

use cgmath::Vector3;

use crate::bytes;
use crate::error::Result;
use crate::game::GameVariant;

// ============================================================================
// Opaque data
// ============================================================================

/// A byte range whose semantics are unknown. Preserved verbatim; the
/// recorded length is part of the layout contract and encoders re-emit
/// exactly `len()` bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpaqueBlob {
    pub data: Vec<u8>,
}

impl OpaqueBlob {
    pub fn new(data: Vec<u8>) -> Self {
        OpaqueBlob { data }
    }

    pub fn zeroed(len: usize) -> Self {
        OpaqueBlob {
            data: vec![0u8; len],
        }
    }

    pub fn from_block(block: &[u8], offset: usize, len: usize) -> Result<Self> {
        Ok(OpaqueBlob {
            data: bytes::bytes(block, offset, len)?.to_vec(),
        })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn write(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.data);
    }
}

// ============================================================================
// Record codec
// ============================================================================

/// One fixed-stride record of a section. `decode` reads at a byte offset the
/// caller computed from the element index; `encode` is its exact inverse.
pub trait GameRecord: Sized {
    fn element_size(game: GameVariant) -> usize;
    fn decode(block: &[u8], offset: usize, game: GameVariant) -> Result<Self>;
    fn encode(&self, buf: &mut Vec<u8>, game: GameVariant);
}

/// Read a `[count][pad][records]` framed section.
pub fn read_counted<T: GameRecord>(block: &[u8], game: GameVariant) -> Result<Vec<T>> {
    let count = bytes::read_u32(block, 0)? as usize;
    let size = T::element_size(game);
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        out.push(T::decode(block, 0x10 + i * size, game)?);
    }
    Ok(out)
}

/// Write a `[count][pad][records]` framed section.
pub fn write_counted<T: GameRecord>(list: &[T], game: GameVariant) -> Vec<u8> {
    let mut buf = Vec::new();
    bytes::write_u32(&mut buf, list.len() as u32);
    bytes::pad_to(&mut buf, 0x10);
    for item in list {
        item.encode(&mut buf, game);
    }
    buf
}

/// Read `count` records starting at offset 0 (header-counted sections).
pub fn read_table<T: GameRecord>(block: &[u8], count: usize, game: GameVariant) -> Result<Vec<T>> {
    let size = T::element_size(game);
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        out.push(T::decode(block, i * size, game)?);
    }
    Ok(out)
}

/// Write records back to back with no framing (header-counted sections).
pub fn write_table<T: GameRecord>(list: &[T], game: GameVariant) -> Vec<u8> {
    let mut buf = Vec::new();
    for item in list {
        item.encode(&mut buf, game);
    }
    buf
}

/// Read a counted section of bare u32 values (the model id lists).
pub fn read_counted_u32s(block: &[u8]) -> Result<Vec<u32>> {
    let count = bytes::read_u32(block, 0)? as usize;
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        out.push(bytes::read_u32(block, 0x10 + i * 4)?);
    }
    Ok(out)
}

/// Write a counted section of bare u32 values.
pub fn write_counted_u32s(list: &[u32]) -> Vec<u8> {
    let mut buf = Vec::new();
    bytes::write_u32(&mut buf, list.len() as u32);
    bytes::pad_to(&mut buf, 0x10);
    for &v in list {
        bytes::write_u32(&mut buf, v);
    }
    buf
}

// ============================================================================
// Transform capability
// ============================================================================

/// Transform access shared by every positioned object kind. Rotations are
/// Euler radians. Kinds without a stored transform component return the
/// neutral value and fold mutations into their vertices (see
/// `spline::Spline`).
pub trait Placed {
    fn position(&self) -> Vector3<f32>;
    fn set_position(&mut self, p: Vector3<f32>);

    fn rotation(&self) -> Vector3<f32>;
    fn set_rotation(&mut self, e: Vector3<f32>);

    fn scale(&self) -> Vector3<f32>;
    fn set_scale(&mut self, s: Vector3<f32>);

    fn translate(&mut self, delta: Vector3<f32>) {
        let p = self.position();
        self.set_position(p + delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stub {
        value: u32,
    }

    impl GameRecord for Stub {
        fn element_size(_game: GameVariant) -> usize {
            8
        }

        fn decode(block: &[u8], offset: usize, _game: GameVariant) -> Result<Self> {
            Ok(Stub {
                value: bytes::read_u32(block, offset)?,
            })
        }

        fn encode(&self, buf: &mut Vec<u8>, _game: GameVariant) {
            bytes::write_u32(buf, self.value);
            bytes::write_u32(buf, 0);
        }
    }

    #[test]
    fn counted_framing_pads_the_count_to_0x10() {
        let list = vec![Stub { value: 3 }, Stub { value: 9 }];
        let buf = write_counted(&list, GameVariant::Rc2);
        assert_eq!(buf.len(), 0x10 + 2 * 8);
        assert_eq!(bytes::read_u32(&buf, 0).unwrap(), 2);
        assert_eq!(&buf[4..0x10], [0u8; 12]);
        assert_eq!(bytes::read_u32(&buf, 0x10).unwrap(), 3);

        let back: Vec<Stub> = read_counted(&buf, GameVariant::Rc2).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back[1].value, 9);
    }

    #[test]
    fn empty_counted_section_is_a_bare_count_block() {
        let buf = write_counted::<Stub>(&[], GameVariant::Rc2);
        assert_eq!(buf.len(), 0x10);
        let back: Vec<Stub> = read_counted(&buf, GameVariant::Rc2).unwrap();
        assert!(back.is_empty());
    }

    #[test]
    fn tables_have_no_framing() {
        let list = vec![Stub { value: 7 }];
        let buf = write_table(&list, GameVariant::Rc2);
        assert_eq!(buf.len(), 8);
        let back: Vec<Stub> = read_table(&buf, 1, GameVariant::Rc2).unwrap();
        assert_eq!(back[0].value, 7);
    }

    #[test]
    fn opaque_blob_round_trips_its_exact_length() {
        let blob = OpaqueBlob::from_block(&[1, 2, 3, 4, 5], 1, 3).unwrap();
        assert_eq!(blob.len(), 3);
        let mut out = Vec::new();
        blob.write(&mut out);
        assert_eq!(out, [2, 3, 4]);
    }

    #[test]
    fn u32_lists_use_four_byte_stride() {
        let ids = vec![500u32, 501, 777];
        let buf = write_counted_u32s(&ids);
        assert_eq!(buf.len(), 0x10 + 12);
        assert_eq!(bytes::read_u32(&buf, 0x14).unwrap(), 501);
        assert_eq!(read_counted_u32s(&buf).unwrap(), ids);
    }
}
