//! Moby (dynamic object) models.
//!
//! Each model is a self-contained block; every pointer inside it is relative
//! to the block start, so a block can be relocated without fixups. Block
//! extents are inferred from the gap to the next model in the table (or the
//! section end), and a table pointer of 0 is an absent model that must
//! round-trip as 0.
//!
//! ```text
//! 0x00 meshPointer u32          0x04 boneCount u8, animationCount u8,
//!                                    soundCount u8, pad u8
//! 0x08 boneMatrixPointer u32    0x0C boneDataPointer u32
//! 0x10 animationPointer u32     0x14 soundPointer u32
//! 0x18 attachmentPointer u32    0x1C scale f32
//! 0x20 8 * u32 opaque
//! ```
//!
//! The mesh header at `meshPointer` is 0x20 bytes: texConfigPointer/Count,
//! vertexPointer, indexPointer, vertexCount, indexCount, and two opaque
//! words. Vertices are 8 floats; every game but the first pads the stride
//! to 0x28 with reserved bytes that read back as zero.

use std::io::Cursor;

use crate::bytes;
use crate::error::{LevelError, Result};
use crate::game::GameVariant;
use crate::models::animation::{append_animation_table, read_animation_table};
use crate::models::{self, Animation, BoneData, BoneMatrix, Model, TexConfig, VERTEX_FLOATS};
use crate::objects::OpaqueBlob;
use crate::serialize::cursor::SectionWriter;

const HEADER_LEN: usize = 0x40;
const MESH_HEADER_LEN: usize = 0x20;
const SOUND_STRIDE: usize = 0x20;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MobyModel {
    pub model: Model,
    pub scale: f32,
    pub unk20: [u32; 8],
    pub mesh_unk18: u32,
    pub mesh_unk1c: u32,
    pub bone_matrices: Vec<BoneMatrix>,
    pub bone_datas: Vec<BoneData>,
    pub animations: Vec<Option<Animation>>,
    /// `soundCount` 0x20-byte records, kept opaque.
    pub sounds: OpaqueBlob,
    /// Self-sized trailing block: `[byteLen u32][bytes]`.
    pub attachment: Option<OpaqueBlob>,
}

/// One slot of the engine's moby model table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MobyModelEntry {
    pub id: i32,
    pub model: Option<MobyModel>,
}

impl MobyModel {
    /// Decode one model block. Blocks shorter than a header are the
    /// zero-padded placeholders `bytes::read_block` hands out for empty
    /// spans and decode to the empty model.
    pub fn decode(block: &[u8], game: GameVariant) -> Result<Self> {
        if block.len() < HEADER_LEN {
            return Ok(MobyModel::default());
        }
        let mesh_pointer = bytes::read_u32(block, 0x00)? as usize;
        let bone_count = bytes::read_u8(block, 0x04)? as usize;
        let animation_count = bytes::read_u8(block, 0x05)? as usize;
        let sound_count = bytes::read_u8(block, 0x06)? as usize;
        let bone_matrix_pointer = bytes::read_u32(block, 0x08)? as usize;
        let bone_data_pointer = bytes::read_u32(block, 0x0C)? as usize;
        let animation_pointer = bytes::read_u32(block, 0x10)? as usize;
        let sound_pointer = bytes::read_u32(block, 0x14)? as usize;
        let attachment_pointer = bytes::read_u32(block, 0x18)? as usize;
        let scale = bytes::read_f32(block, 0x1C)?;
        let mut unk20 = [0u32; 8];
        for (i, slot) in unk20.iter_mut().enumerate() {
            *slot = bytes::read_u32(block, 0x20 + i * 4)?;
        }

        let bone_matrices = if bone_matrix_pointer != 0 {
            models::read_records(block, bone_matrix_pointer, bone_count, BoneMatrix::LEN)?
        } else {
            Vec::new()
        };
        let bone_datas = if bone_data_pointer != 0 {
            models::read_records(block, bone_data_pointer, bone_count, BoneData::LEN)?
        } else {
            Vec::new()
        };
        let animations = if animation_pointer != 0 {
            read_animation_table(block, animation_pointer, animation_count)?
        } else {
            Vec::new()
        };
        let sounds = if sound_pointer != 0 {
            OpaqueBlob::from_block(block, sound_pointer, sound_count * SOUND_STRIDE)?
        } else {
            OpaqueBlob::default()
        };
        let attachment = if attachment_pointer != 0 {
            let len = bytes::read_u32(block, attachment_pointer)? as usize;
            Some(OpaqueBlob::from_block(block, attachment_pointer + 4, len)?)
        } else {
            None
        };

        let mut out = MobyModel {
            model: Model::default(),
            scale,
            unk20,
            mesh_unk18: 0,
            mesh_unk1c: 0,
            bone_matrices,
            bone_datas,
            animations,
            sounds,
            attachment,
        };
        if mesh_pointer != 0 {
            out.decode_mesh(block, mesh_pointer, game)?;
        }
        Ok(out)
    }

    fn decode_mesh(&mut self, block: &[u8], mesh_at: usize, game: GameVariant) -> Result<()> {
        let tex_config_pointer = bytes::read_u32(block, mesh_at)? as usize;
        let tex_config_count = bytes::read_u32(block, mesh_at + 0x04)? as usize;
        let vertex_pointer = bytes::read_u32(block, mesh_at + 0x08)? as usize;
        let index_pointer = bytes::read_u32(block, mesh_at + 0x0C)? as usize;
        let vertex_count = bytes::read_u32(block, mesh_at + 0x10)? as usize;
        let index_count = bytes::read_u32(block, mesh_at + 0x14)? as usize;
        self.mesh_unk18 = bytes::read_u32(block, mesh_at + 0x18)?;
        self.mesh_unk1c = bytes::read_u32(block, mesh_at + 0x1C)?;

        self.model.tex_configs =
            models::read_records(block, tex_config_pointer, tex_config_count, TexConfig::LEN)?;
        let stride = game.moby_vertex_stride();
        let mut vertex_buffer = Vec::with_capacity(vertex_count * VERTEX_FLOATS);
        for i in 0..vertex_count {
            let row = vertex_pointer + i * stride;
            vertex_buffer.extend(models::read_f32s(block, row, VERTEX_FLOATS)?);
        }
        self.model.vertex_buffer = vertex_buffer;
        self.model.index_buffer = models::read_u16s(block, index_pointer, index_count)?;
        Ok(())
    }

    /// Encode into a fresh block with every sub-pointer recomputed.
    pub fn encode(&self, game: GameVariant) -> Result<Vec<u8>> {
        if self.bone_matrices.len() != self.bone_datas.len() {
            return Err(LevelError::InvariantViolation(format!(
                "bone matrix/data tables disagree: {} vs {}",
                self.bone_matrices.len(),
                self.bone_datas.len()
            )));
        }
        if self.bone_matrices.len() > u8::MAX as usize
            || self.animations.len() > u8::MAX as usize
            || self.sounds.len() / SOUND_STRIDE > u8::MAX as usize
        {
            return Err(LevelError::InvariantViolation(
                "moby model table counts exceed the u8 header fields".into(),
            ));
        }
        if self.sounds.len() % SOUND_STRIDE != 0 {
            return Err(LevelError::InvariantViolation(format!(
                "sound block of {} bytes is not a whole number of 0x20 records",
                self.sounds.len()
            )));
        }

        let mut buf = vec![0u8; HEADER_LEN];
        let bone_matrix_pointer = if self.bone_matrices.is_empty() {
            0
        } else {
            bytes::pad_to(&mut buf, 0x10);
            let at = buf.len() as u32;
            models::write_records(&mut buf, &self.bone_matrices)?;
            at
        };
        let bone_data_pointer = if self.bone_datas.is_empty() {
            0
        } else {
            bytes::pad_to(&mut buf, 0x10);
            let at = buf.len() as u32;
            models::write_records(&mut buf, &self.bone_datas)?;
            at
        };
        let animation_pointer = if self.animations.is_empty() {
            0
        } else {
            append_animation_table(&mut buf, &self.animations)?
        };
        let sound_pointer = if self.sounds.is_empty() {
            0
        } else {
            bytes::pad_to(&mut buf, 0x10);
            let at = buf.len() as u32;
            self.sounds.write(&mut buf);
            at
        };
        let mesh_pointer = if self.model.is_empty() && self.mesh_unk18 == 0 && self.mesh_unk1c == 0
        {
            0
        } else {
            self.encode_mesh(&mut buf, game)?
        };
        let attachment_pointer = match &self.attachment {
            None => 0,
            Some(blob) => {
                bytes::pad_to(&mut buf, 0x10);
                let at = buf.len() as u32;
                bytes::write_u32(&mut buf, blob.len() as u32);
                blob.write(&mut buf);
                at
            }
        };
        bytes::pad_to(&mut buf, 0x10);

        bytes::write_u32_at(&mut buf, 0x00, mesh_pointer);
        buf[0x04] = self.bone_matrices.len() as u8;
        buf[0x05] = self.animations.len() as u8;
        buf[0x06] = (self.sounds.len() / SOUND_STRIDE) as u8;
        bytes::write_u32_at(&mut buf, 0x08, bone_matrix_pointer);
        bytes::write_u32_at(&mut buf, 0x0C, bone_data_pointer);
        bytes::write_u32_at(&mut buf, 0x10, animation_pointer);
        bytes::write_u32_at(&mut buf, 0x14, sound_pointer);
        bytes::write_u32_at(&mut buf, 0x18, attachment_pointer);
        bytes::write_f32_at(&mut buf, 0x1C, self.scale);
        for (i, &v) in self.unk20.iter().enumerate() {
            bytes::write_u32_at(&mut buf, 0x20 + i * 4, v);
        }
        Ok(buf)
    }

    fn encode_mesh(&self, buf: &mut Vec<u8>, game: GameVariant) -> Result<u32> {
        bytes::pad_to(buf, 0x10);
        let mesh_at = buf.len();
        bytes::write_zeros(buf, MESH_HEADER_LEN);

        let tex_config_pointer = if self.model.tex_configs.is_empty() {
            0
        } else {
            bytes::pad_to(buf, 0x10);
            let at = buf.len() as u32;
            models::write_records(buf, &self.model.tex_configs)?;
            at
        };
        let vertex_count = self.model.vertex_count();
        let vertex_pointer = if vertex_count == 0 {
            0
        } else {
            bytes::pad_to(buf, 0x10);
            let at = buf.len() as u32;
            let pad = game.moby_vertex_stride() - VERTEX_FLOATS * 4;
            for row in self.model.vertex_buffer.chunks_exact(VERTEX_FLOATS) {
                models::write_f32s(buf, row);
                bytes::write_zeros(buf, pad);
            }
            at
        };
        let index_pointer = if self.model.index_buffer.is_empty() {
            0
        } else {
            bytes::pad_to(buf, 0x10);
            let at = buf.len() as u32;
            models::write_u16s(buf, &self.model.index_buffer);
            at
        };

        bytes::write_u32_at(buf, mesh_at, tex_config_pointer);
        bytes::write_u32_at(buf, mesh_at + 0x04, self.model.tex_configs.len() as u32);
        bytes::write_u32_at(buf, mesh_at + 0x08, vertex_pointer);
        bytes::write_u32_at(buf, mesh_at + 0x0C, index_pointer);
        bytes::write_u32_at(buf, mesh_at + 0x10, vertex_count as u32);
        bytes::write_u32_at(buf, mesh_at + 0x14, self.model.index_buffer.len() as u32);
        bytes::write_u32_at(buf, mesh_at + 0x18, self.mesh_unk18);
        bytes::write_u32_at(buf, mesh_at + 0x1C, self.mesh_unk1c);
        Ok(mesh_at as u32)
    }
}

// ============================================================================
// Model tables
// ============================================================================

/// Per-pointer block length: the gap to the next non-zero pointer, or to
/// `end`. Non-positive spans flow into `read_block`'s placeholder path.
fn block_span(pointer: u32, sorted: &[u32], end: u32) -> i64 {
    let next = sorted
        .iter()
        .find(|&&p| p > pointer)
        .copied()
        .unwrap_or(end);
    next as i64 - pointer as i64
}

fn sorted_pointers(pointers: impl Iterator<Item = u32>) -> Vec<u32> {
    let mut list: Vec<u32> = pointers.filter(|&p| p != 0).collect();
    list.sort_unstable();
    list
}

/// Read the engine-style table: `[count][pad][count * {id i32, pointer u32}]`.
pub fn read_model_table(
    data: &[u8],
    offset: usize,
    end: u32,
    game: GameVariant,
) -> Result<Vec<MobyModelEntry>> {
    let count = bytes::read_u32(data, offset)? as usize;
    let mut ids = Vec::with_capacity(count);
    let mut pointers = Vec::with_capacity(count);
    for i in 0..count {
        let at = offset + 0x10 + i * 8;
        ids.push(bytes::read_i32(data, at)?);
        pointers.push(bytes::read_u32(data, at + 4)?);
    }
    let sorted = sorted_pointers(pointers.iter().copied());
    let mut cursor = Cursor::new(data);
    let mut entries = Vec::with_capacity(count);
    for (id, pointer) in ids.into_iter().zip(pointers) {
        let model = if pointer == 0 {
            None
        } else {
            let span = block_span(pointer, &sorted, end);
            let block = bytes::read_block(&mut cursor, pointer as u64, span)?;
            Some(MobyModel::decode(&block, game)?)
        };
        entries.push(MobyModelEntry { id, model });
    }
    Ok(entries)
}

/// Write the engine-style table followed by the model blocks.
pub fn write_model_table(
    w: &mut SectionWriter,
    entries: &[MobyModelEntry],
    game: GameVariant,
) -> Result<u32> {
    let at = w.begin_section(0x10);
    w.put_u32(entries.len() as u32);
    w.align_to(0x10);
    let table_at = w.len();
    for entry in entries {
        w.put_i32(entry.id);
        w.put_u32(0);
    }
    for (i, entry) in entries.iter().enumerate() {
        if let Some(model) = &entry.model {
            let block = model.encode(game)?;
            let pointer = w.begin_section(0x10);
            w.put(&block);
            w.patch_u32(table_at + i * 8 + 4, pointer);
        }
    }
    Ok(at)
}

/// Read the side-container table: `[count][pad][count * u32 pointers]`.
pub fn read_model_slots(
    data: &[u8],
    offset: usize,
    end: u32,
    game: GameVariant,
) -> Result<Vec<Option<MobyModel>>> {
    let count = bytes::read_u32(data, offset)? as usize;
    let mut pointers = Vec::with_capacity(count);
    for i in 0..count {
        pointers.push(bytes::read_u32(data, offset + 0x10 + i * 4)?);
    }
    let sorted = sorted_pointers(pointers.iter().copied());
    let mut cursor = Cursor::new(data);
    let mut slots = Vec::with_capacity(count);
    for pointer in pointers {
        if pointer == 0 {
            slots.push(None);
        } else {
            let span = block_span(pointer, &sorted, end);
            let block = bytes::read_block(&mut cursor, pointer as u64, span)?;
            slots.push(Some(MobyModel::decode(&block, game)?));
        }
    }
    Ok(slots)
}

/// Write the side-container table followed by the model blocks.
pub fn write_model_slots(
    w: &mut SectionWriter,
    slots: &[Option<MobyModel>],
    game: GameVariant,
) -> Result<u32> {
    let at = w.begin_section(0x10);
    w.put_u32(slots.len() as u32);
    w.align_to(0x10);
    let table_at = w.len();
    w.reserve(slots.len() * 4);
    for (i, slot) in slots.iter().enumerate() {
        if let Some(model) = slot {
            let block = model.encode(game)?;
            let pointer = w.begin_section(0x10);
            w.put(&block);
            w.patch_u32(table_at + i * 4, pointer);
        }
    }
    Ok(at)
}
