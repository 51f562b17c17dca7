//! Tie (static scenery) models.
//!
//! The section is a bare array of 0x40 records; the engine header carries
//! the count. Unlike moby blocks, every pointer in a record is file-absolute,
//! and each model splits its geometry over two buffers: position+normal rows
//! at a 0x18 stride and uv pairs at a 0x08 stride. Decoding folds the pair
//! back into the usual 8-float rows; encoding re-splits them.
//!
//! ```text
//! 0x00 vertexPointer u32    0x04 uvPointer u32      0x08 indexPointer u32
//! 0x0C texConfigPointer u32 0x10 vertexCount u32    0x14 indexCount u32
//! 0x18 texConfigCount u16   0x1A unk u16
//! 0x1C culling center vec3  0x28 culling radius f32 0x2C unk u32
//! 0x30 id i32               0x34 3 * u32 opaque
//! ```

use cgmath::Vector3;

use crate::bytes;
use crate::error::Result;
use crate::math;
use crate::models::{self, Model, TexConfig, VERTEX_FLOATS};
use crate::serialize::cursor::SectionWriter;

pub(crate) const RECORD_LEN: usize = 0x40;
const POSITION_STRIDE: usize = 0x18;
const UV_STRIDE: usize = 0x08;

#[derive(Debug, Clone, PartialEq)]
pub struct TieModel {
    pub id: i32,
    pub model: Model,
    pub culling_center: Vector3<f32>,
    pub culling_radius: f32,
    pub unk1a: u16,
    pub unk2c: u32,
    pub unk34: [u32; 3],
}

// ============================================================================
// Shared record codec (tie and shrub models have identical record shapes)
// ============================================================================

pub(crate) struct ModelParts {
    pub id: i32,
    pub model: Model,
    pub culling_center: Vector3<f32>,
    pub culling_radius: f32,
    pub unk1a: u16,
    pub unk2c: u32,
    pub unk34: [u32; 3],
}

pub(crate) fn decode_model_record(data: &[u8], at: usize) -> Result<ModelParts> {
    let vertex_pointer = bytes::read_u32(data, at)? as usize;
    let uv_pointer = bytes::read_u32(data, at + 0x04)? as usize;
    let index_pointer = bytes::read_u32(data, at + 0x08)? as usize;
    let tex_config_pointer = bytes::read_u32(data, at + 0x0C)? as usize;
    let vertex_count = bytes::read_u32(data, at + 0x10)? as usize;
    let index_count = bytes::read_u32(data, at + 0x14)? as usize;
    let tex_config_count = bytes::read_u16(data, at + 0x18)? as usize;
    let unk1a = bytes::read_u16(data, at + 0x1A)?;
    let culling_center = math::read_vec3(data, at + 0x1C)?;
    let culling_radius = bytes::read_f32(data, at + 0x28)?;
    let unk2c = bytes::read_u32(data, at + 0x2C)?;
    let id = bytes::read_i32(data, at + 0x30)?;
    let mut unk34 = [0u32; 3];
    for (i, slot) in unk34.iter_mut().enumerate() {
        *slot = bytes::read_u32(data, at + 0x34 + i * 4)?;
    }

    let mut vertex_buffer = Vec::with_capacity(vertex_count * VERTEX_FLOATS);
    for i in 0..vertex_count {
        if vertex_pointer != 0 {
            vertex_buffer.extend(models::read_f32s(data, vertex_pointer + i * POSITION_STRIDE, 6)?);
        } else {
            vertex_buffer.extend([0.0; 6]);
        }
        if uv_pointer != 0 {
            vertex_buffer.extend(models::read_f32s(data, uv_pointer + i * UV_STRIDE, 2)?);
        } else {
            vertex_buffer.extend([0.0; 2]);
        }
    }
    let index_buffer = if index_pointer != 0 {
        models::read_u16s(data, index_pointer, index_count)?
    } else {
        Vec::new()
    };
    let tex_configs = if tex_config_pointer != 0 {
        models::read_records(data, tex_config_pointer, tex_config_count, TexConfig::LEN)?
    } else {
        Vec::new()
    };

    Ok(ModelParts {
        id,
        model: Model {
            vertex_buffer,
            index_buffer,
            tex_configs,
        },
        culling_center,
        culling_radius,
        unk1a,
        unk2c,
        unk34,
    })
}

/// Append the model's buffers and fill in its reserved record at `slot`.
#[allow(clippy::too_many_arguments)]
pub(crate) fn encode_model_record(
    w: &mut SectionWriter,
    slot: usize,
    id: i32,
    model: &Model,
    culling_center: Vector3<f32>,
    culling_radius: f32,
    unk1a: u16,
    unk2c: u32,
    unk34: [u32; 3],
) -> Result<()> {
    let vertex_count = model.vertex_count();
    let (vertex_pointer, uv_pointer) = if vertex_count == 0 {
        (0, 0)
    } else {
        let vp = w.begin_section(0x10);
        for row in model.vertex_buffer.chunks_exact(VERTEX_FLOATS) {
            models::write_f32s(&mut w.buf, &row[..6]);
        }
        let up = w.begin_section(0x10);
        for row in model.vertex_buffer.chunks_exact(VERTEX_FLOATS) {
            models::write_f32s(&mut w.buf, &row[6..]);
        }
        (vp, up)
    };
    let index_pointer = if model.index_buffer.is_empty() {
        0
    } else {
        let at = w.begin_section(0x10);
        models::write_u16s(&mut w.buf, &model.index_buffer);
        at
    };
    let tex_config_pointer = if model.tex_configs.is_empty() {
        0
    } else {
        let at = w.begin_section(0x10);
        models::write_records(&mut w.buf, &model.tex_configs)?;
        at
    };

    w.patch_u32(slot, vertex_pointer);
    w.patch_u32(slot + 0x04, uv_pointer);
    w.patch_u32(slot + 0x08, index_pointer);
    w.patch_u32(slot + 0x0C, tex_config_pointer);
    w.patch_u32(slot + 0x10, vertex_count as u32);
    w.patch_u32(slot + 0x14, model.index_buffer.len() as u32);
    w.patch_u16(slot + 0x18, model.tex_configs.len() as u16);
    w.patch_u16(slot + 0x1A, unk1a);
    w.patch_f32(slot + 0x1C, culling_center.x);
    w.patch_f32(slot + 0x20, culling_center.y);
    w.patch_f32(slot + 0x24, culling_center.z);
    w.patch_f32(slot + 0x28, culling_radius);
    w.patch_u32(slot + 0x2C, unk2c);
    w.patch(slot + 0x30, &id.to_be_bytes());
    for (i, v) in unk34.iter().enumerate() {
        w.patch_u32(slot + 0x34 + i * 4, *v);
    }
    Ok(())
}

impl TieModel {
    pub fn new(id: i32) -> Self {
        TieModel {
            id,
            model: Model::default(),
            culling_center: Vector3::new(0.0, 0.0, 0.0),
            culling_radius: 0.0,
            unk1a: 0,
            unk2c: 0,
            unk34: [0; 3],
        }
    }
}

impl Default for TieModel {
    fn default() -> Self {
        TieModel::new(0)
    }
}

impl From<ModelParts> for TieModel {
    fn from(parts: ModelParts) -> Self {
        TieModel {
            id: parts.id,
            model: parts.model,
            culling_center: parts.culling_center,
            culling_radius: parts.culling_radius,
            unk1a: parts.unk1a,
            unk2c: parts.unk2c,
            unk34: parts.unk34,
        }
    }
}

pub fn read_tie_models(data: &[u8], offset: usize, count: usize) -> Result<Vec<TieModel>> {
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        out.push(decode_model_record(data, offset + i * RECORD_LEN)?.into());
    }
    Ok(out)
}

/// Write the record table, then every model's buffers. Returns the table
/// pointer; the caller stores the count in the file header.
pub fn write_tie_models(w: &mut SectionWriter, models: &[TieModel]) -> Result<u32> {
    let at = w.begin_section(0x10);
    w.reserve(models.len() * RECORD_LEN);
    for (i, m) in models.iter().enumerate() {
        encode_model_record(
            w,
            at as usize + i * RECORD_LEN,
            m.id,
            &m.model,
            m.culling_center,
            m.culling_radius,
            m.unk1a,
            m.unk2c,
            m.unk34,
        )?;
    }
    Ok(at)
}
