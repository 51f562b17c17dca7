//! Skeletons and keyframe animation blocks.
//!
//! Bones come as two parallel tables: 0x40-byte bind/cumulative matrices and
//! 0x10-byte translation records, both `boneCount` long and both encoding
//! their parent as a byte offset into the matrix table.
//!
//! An animation block is self-contained within its containing buffer (a moby
//! model block, or the whole engine file for player animations):
//!
//! ```text
//! 0x00 speed f32        0x04 unk04 u32
//! 0x08 frameCount u8    0x09 soundCount u8   0x0A unk0A u16   0x0C unk0C u32
//! 0x10 frameCount * u32 frame pointers (buffer-origin relative)
//!      soundCount * u32 sound values
//! ```
//!
//! Each frame starts on a 0x20 boundary:
//!
//! ```text
//! 0x00 speed f32              0x04 frameIndex u16   0x06 frameLength u16
//! 0x08 sec0Offset u16         0x0A sec0Count u16
//! 0x0C translationOffset u16  0x0E translationCount u16
//! 0x10 rotation run, then the sec0 and translation runs at their offsets
//! ```
//!
//! All runs hold `[i16; 4]` entries. Sub-run offsets are frame-relative and
//! always written, even for empty runs, so the rotation run is bounded by
//! `sec0Offset` without knowing the bone count; `frameLength` is the padded
//! block size in 0x10 units. Every offset and length is recomputed from the
//! runs actually written.

use binrw::binrw;

use crate::bytes;
use crate::error::{LevelError, Result};

// ============================================================================
// Bones
// ============================================================================

/// Bind pose row-major 3x4 matrix plus the cumulative joint translation.
#[binrw]
#[derive(Debug, Clone, Copy, PartialEq)]
#[br(big)]
#[bw(big)]
pub struct BoneMatrix {
    pub bind: [f32; 12],
    pub cumulative: [f32; 3],
    pub unk3c: u16,
    pub parent_offset: u16,
}

impl BoneMatrix {
    pub const LEN: usize = 0x40;

    /// Parent bone index; the file stores it as a matrix-table byte offset.
    pub fn parent(&self) -> usize {
        (self.parent_offset / 0x40) as usize
    }
}

impl Default for BoneMatrix {
    fn default() -> Self {
        BoneMatrix {
            bind: [
                1.0, 0.0, 0.0, 0.0, //
                0.0, 1.0, 0.0, 0.0, //
                0.0, 0.0, 1.0, 0.0,
            ],
            cumulative: [0.0; 3],
            unk3c: 0,
            parent_offset: 0,
        }
    }
}

/// Local joint translation, parallel to [`BoneMatrix`].
#[binrw]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[br(big)]
#[bw(big)]
pub struct BoneData {
    pub translation: [f32; 3],
    pub unk0c: u16,
    pub parent_offset: u16,
}

impl BoneData {
    pub const LEN: usize = 0x10;

    pub fn parent(&self) -> usize {
        (self.parent_offset / 0x40) as usize
    }
}

// ============================================================================
// Frames
// ============================================================================

#[binrw]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[br(big)]
#[bw(big)]
struct FrameHeader {
    speed: f32,
    frame_index: u16,
    frame_length: u16,
    sec0_offset: u16,
    sec0_count: u16,
    translation_offset: u16,
    translation_count: u16,
}

impl FrameHeader {
    const LEN: usize = 0x10;
}

/// One keyframe: a rotation per bone plus two optional sparse runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub speed: f32,
    pub frame_index: u16,
    /// One quantized quaternion per bone.
    pub rotations: Vec<[i16; 4]>,
    pub sec0: Vec<[i16; 4]>,
    pub translations: Vec<[i16; 4]>,
}

fn read_i16_quads(block: &[u8], offset: usize, count: usize) -> Result<Vec<[i16; 4]>> {
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        let at = offset + i * 8;
        out.push([
            bytes::read_i16(block, at)?,
            bytes::read_i16(block, at + 2)?,
            bytes::read_i16(block, at + 4)?,
            bytes::read_i16(block, at + 6)?,
        ]);
    }
    Ok(out)
}

fn write_i16_quads(buf: &mut Vec<u8>, quads: &[[i16; 4]]) {
    for quad in quads {
        for &v in quad {
            bytes::write_i16(buf, v);
        }
    }
}

impl Frame {
    pub fn decode(block: &[u8], offset: usize) -> Result<Self> {
        bytes::bytes(block, offset, FrameHeader::LEN)?;
        let header: FrameHeader = crate::models::read_record(block, offset)?;
        if header.sec0_offset < 0x10 || (header.sec0_offset - 0x10) % 8 != 0 {
            return Err(LevelError::InvariantViolation(format!(
                "frame at 0x{:X} has rotation run ending at 0x{:X}",
                offset, header.sec0_offset
            )));
        }
        let rotation_count = ((header.sec0_offset - 0x10) / 8) as usize;
        Ok(Frame {
            speed: header.speed,
            frame_index: header.frame_index,
            rotations: read_i16_quads(block, offset + 0x10, rotation_count)?,
            sec0: read_i16_quads(
                block,
                offset + header.sec0_offset as usize,
                header.sec0_count as usize,
            )?,
            translations: read_i16_quads(
                block,
                offset + header.translation_offset as usize,
                header.translation_count as usize,
            )?,
        })
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        let sec0_offset = FrameHeader::LEN + self.rotations.len() * 8;
        let translation_offset = sec0_offset + self.sec0.len() * 8;
        let end = translation_offset + self.translations.len() * 8;
        let padded = (end + 0xF) & !0xF;
        if padded >> 4 > u16::MAX as usize || translation_offset > u16::MAX as usize {
            return Err(LevelError::InvariantViolation(format!(
                "frame of {} bytes exceeds the u16 layout fields",
                padded
            )));
        }
        let mut buf = Vec::with_capacity(padded);
        crate::models::write_record(
            &mut buf,
            &FrameHeader {
                speed: self.speed,
                frame_index: self.frame_index,
                frame_length: (padded >> 4) as u16,
                sec0_offset: sec0_offset as u16,
                sec0_count: self.sec0.len() as u16,
                translation_offset: translation_offset as u16,
                translation_count: self.translations.len() as u16,
            },
        )?;
        write_i16_quads(&mut buf, &self.rotations);
        write_i16_quads(&mut buf, &self.sec0);
        write_i16_quads(&mut buf, &self.translations);
        bytes::pad_to(&mut buf, 0x10);
        Ok(buf)
    }

    /// Rotation for `bone` scaled to [-1, 1].
    pub fn rotation_f32(&self, bone: usize) -> Option<[f32; 4]> {
        self.rotations
            .get(bone)
            .map(|q| q.map(|v| v as f32 / 32767.0))
    }

    /// Translation run entry scaled to world units.
    pub fn translation_f32(&self, index: usize) -> Option<[f32; 4]> {
        self.translations
            .get(index)
            .map(|q| q.map(|v| v as f32 / 1024.0))
    }
}

// ============================================================================
// Animations
// ============================================================================

/// One animation: per-frame keys plus opaque per-animation sound values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Animation {
    pub speed: f32,
    pub unk04: u32,
    pub unk0a: u16,
    pub unk0c: u32,
    pub sounds: Vec<u32>,
    pub frames: Vec<Frame>,
}

impl Animation {
    pub fn decode(block: &[u8], offset: usize) -> Result<Self> {
        let speed = bytes::read_f32(block, offset)?;
        let unk04 = bytes::read_u32(block, offset + 0x04)?;
        let frame_count = bytes::read_u8(block, offset + 0x08)? as usize;
        let sound_count = bytes::read_u8(block, offset + 0x09)? as usize;
        let unk0a = bytes::read_u16(block, offset + 0x0A)?;
        let unk0c = bytes::read_u32(block, offset + 0x0C)?;

        let mut frames = Vec::with_capacity(frame_count);
        for i in 0..frame_count {
            let frame_pointer = bytes::read_u32(block, offset + 0x10 + i * 4)? as usize;
            frames.push(Frame::decode(block, frame_pointer)?);
        }
        let sounds_at = offset + 0x10 + frame_count * 4;
        let mut sounds = Vec::with_capacity(sound_count);
        for i in 0..sound_count {
            sounds.push(bytes::read_u32(block, sounds_at + i * 4)?);
        }
        Ok(Animation {
            speed,
            unk04,
            unk0a,
            unk0c,
            sounds,
            frames,
        })
    }
}

/// Append one animation block to `buf` and return its buffer-origin
/// pointer. Frame pointers are patched into the block's own table as the
/// frames land on 0x20 boundaries.
pub fn append_animation(buf: &mut Vec<u8>, animation: &Animation) -> Result<u32> {
    if animation.frames.len() > u8::MAX as usize || animation.sounds.len() > u8::MAX as usize {
        return Err(LevelError::InvariantViolation(format!(
            "animation with {} frames / {} sounds exceeds the u8 count fields",
            animation.frames.len(),
            animation.sounds.len()
        )));
    }
    bytes::pad_to(buf, 0x10);
    let at = buf.len() as u32;
    bytes::write_f32(buf, animation.speed);
    bytes::write_u32(buf, animation.unk04);
    bytes::write_u8(buf, animation.frames.len() as u8);
    bytes::write_u8(buf, animation.sounds.len() as u8);
    bytes::write_u16(buf, animation.unk0a);
    bytes::write_u32(buf, animation.unk0c);

    let table_at = buf.len();
    bytes::write_zeros(buf, animation.frames.len() * 4);
    for &sound in &animation.sounds {
        bytes::write_u32(buf, sound);
    }
    for (i, frame) in animation.frames.iter().enumerate() {
        bytes::pad_to(buf, 0x20);
        let frame_pointer = buf.len() as u32;
        bytes::write_u32_at(buf, table_at + i * 4, frame_pointer);
        buf.extend_from_slice(&frame.encode()?);
    }
    Ok(at)
}

/// Read a slot table of `count` animation pointers. Pointer 0 is an empty
/// slot and round-trips as 0.
pub fn read_animation_table(
    block: &[u8],
    table_offset: usize,
    count: usize,
) -> Result<Vec<Option<Animation>>> {
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        let pointer = bytes::read_u32(block, table_offset + i * 4)?;
        if pointer == 0 {
            out.push(None);
        } else {
            out.push(Some(Animation::decode(block, pointer as usize)?));
        }
    }
    Ok(out)
}

/// Append a slot table followed by its animation blocks; returns the table's
/// buffer-origin pointer.
pub fn append_animation_table(buf: &mut Vec<u8>, slots: &[Option<Animation>]) -> Result<u32> {
    bytes::pad_to(buf, 0x10);
    let table_at = buf.len();
    bytes::write_zeros(buf, slots.len() * 4);
    for (i, slot) in slots.iter().enumerate() {
        if let Some(animation) = slot {
            let pointer = append_animation(buf, animation)?;
            bytes::write_u32_at(buf, table_at + i * 4, pointer);
        }
    }
    Ok(table_at as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame(bones: usize) -> Frame {
        Frame {
            speed: 0.25,
            frame_index: 3,
            rotations: (0..bones)
                .map(|b| [b as i16, -(b as i16), 16383, 32767])
                .collect(),
            sec0: vec![[1, 2, 3, 4]],
            translations: vec![[100, -100, 2048, 0], [5, 6, 7, 8]],
        }
    }

    #[test]
    fn bone_records_round_trip_and_derive_parents() {
        let matrix = BoneMatrix {
            cumulative: [1.0, 2.0, 3.0],
            unk3c: 9,
            parent_offset: 0x80,
            ..Default::default()
        };
        let mut buf = Vec::new();
        crate::models::write_record(&mut buf, &matrix).unwrap();
        assert_eq!(buf.len(), BoneMatrix::LEN);
        let back: BoneMatrix = crate::models::read_record(&buf, 0).unwrap();
        assert_eq!(back, matrix);
        assert_eq!(back.parent(), 2);

        let data = BoneData {
            translation: [0.5, 0.0, -0.5],
            unk0c: 1,
            parent_offset: 0x40,
        };
        let mut buf = Vec::new();
        crate::models::write_record(&mut buf, &data).unwrap();
        assert_eq!(buf.len(), BoneData::LEN);
        assert_eq!(data.parent(), 1);
    }

    #[test]
    fn frame_offsets_are_recomputed_from_the_runs() {
        let frame = sample_frame(3);
        let buf = frame.encode().unwrap();
        // rotations end at 0x10 + 3*8 = 0x28, sec0 one entry, then two
        // translation entries, padded to 0x10.
        assert_eq!(bytes::read_u16(&buf, 0x08).unwrap(), 0x28);
        assert_eq!(bytes::read_u16(&buf, 0x0A).unwrap(), 1);
        assert_eq!(bytes::read_u16(&buf, 0x0C).unwrap(), 0x30);
        assert_eq!(bytes::read_u16(&buf, 0x0E).unwrap(), 2);
        assert_eq!(buf.len(), 0x40);
        assert_eq!(bytes::read_u16(&buf, 0x06).unwrap(), 4);

        let back = Frame::decode(&buf, 0).unwrap();
        assert_eq!(back, frame);
    }

    #[test]
    fn empty_runs_still_carry_their_offsets() {
        let frame = Frame {
            rotations: vec![[0, 0, 0, 32767]],
            ..Default::default()
        };
        let buf = frame.encode().unwrap();
        assert_eq!(buf.len(), 0x20);
        // Both empty runs point at the rotation run's end.
        assert_eq!(bytes::read_u16(&buf, 0x08).unwrap(), 0x18);
        assert_eq!(bytes::read_u16(&buf, 0x0C).unwrap(), 0x18);
        let back = Frame::decode(&buf, 0).unwrap();
        assert_eq!(back.rotations.len(), 1);
        assert!(back.sec0.is_empty() && back.translations.is_empty());
    }

    #[test]
    fn quantized_views_scale_the_runs() {
        let frame = sample_frame(2);
        let rotation = frame.rotation_f32(0).unwrap();
        assert_eq!(rotation[3], 1.0);
        assert!((rotation[2] - 16383.0 / 32767.0).abs() < 1e-6);
        let translation = frame.translation_f32(0).unwrap();
        assert_eq!(translation[2], 2.0);
        assert_eq!(frame.rotation_f32(9), None);
    }

    #[test]
    fn animation_blocks_round_trip_at_any_buffer_origin() {
        let animation = Animation {
            speed: 1.5,
            unk04: 77,
            unk0a: 3,
            unk0c: 0xAABB,
            sounds: vec![0x100, 0x200],
            frames: vec![sample_frame(2), sample_frame(2)],
        };
        let mut buf = vec![0u8; 0x34];
        let at = append_animation(&mut buf, &animation).unwrap();
        assert_eq!(at, 0x40);
        // Frames land on 0x20 boundaries past the pointer table.
        let first = bytes::read_u32(&buf, at as usize + 0x10).unwrap();
        assert_eq!(first % 0x20, 0);
        let back = Animation::decode(&buf, at as usize).unwrap();
        assert_eq!(back, animation);
    }

    #[test]
    fn slot_tables_preserve_empty_slots() {
        let slots = vec![
            Some(Animation {
                frames: vec![sample_frame(1)],
                ..Default::default()
            }),
            None,
            Some(Animation::default()),
        ];
        let mut buf = Vec::new();
        let table = append_animation_table(&mut buf, &slots).unwrap();
        assert_eq!(bytes::read_u32(&buf, table as usize + 4).unwrap(), 0);
        let back = read_animation_table(&buf, table as usize, 3).unwrap();
        assert_eq!(back, slots);
    }

    #[test]
    fn oversized_frame_count_is_rejected() {
        let animation = Animation {
            frames: vec![Frame::default(); 256],
            ..Default::default()
        };
        match append_animation(&mut Vec::new(), &animation) {
            Err(LevelError::InvariantViolation(_)) => {}
            other => panic!("expected InvariantViolation, got {:?}", other),
        }
    }
}
