//! Model layer: renderable geometry and the per-kind container codecs.
//!
//! Every model kind reduces to the same [`Model`] core after decoding: an
//! interleaved vertex buffer of 8 floats per vertex (position, normal, uv),
//! a u16 index buffer, and a run of [`TexConfig`] draw ranges binding index
//! spans to textures. What differs per kind is the on-disk framing: moby
//! models live in self-contained pointer blocks, tie and shrub models split
//! position and uv streams into separate buffers, terrain packs fragments
//! into shared per-slot buffers, and the skybox carries vertex colors
//! inline. Those containers are handled by the submodules; the shared
//! pieces live here.

pub mod animation;
pub mod moby_model;
pub mod shrub_model;
pub mod skybox;
pub mod terrain;
pub mod texture;
pub mod tie_model;

pub use animation::{Animation, BoneData, BoneMatrix, Frame};
pub use moby_model::{MobyModel, MobyModelEntry};
pub use shrub_model::ShrubModel;
pub use skybox::{Skybox, SkyboxVertex};
pub use terrain::{Terrain, TerrainFragment};
pub use texture::Texture;
pub use tie_model::TieModel;

use std::io::Cursor;

use binrw::{binrw, BinRead, BinWrite, Endian};

use crate::bytes;
use crate::error::Result;

/// Floats per interleaved vertex: position xyz, normal xyz, uv.
pub const VERTEX_FLOATS: usize = 8;

// ============================================================================
// Shared geometry core
// ============================================================================

/// Geometry shared by every renderable model kind.
///
/// `tex_configs` partition `index_buffer` in ascending `face_start` order;
/// indices reference vertices local to this model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    pub vertex_buffer: Vec<f32>,
    pub index_buffer: Vec<u16>,
    pub tex_configs: Vec<TexConfig>,
}

impl Model {
    pub fn vertex_count(&self) -> usize {
        self.vertex_buffer.len() / VERTEX_FLOATS
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_buffer.is_empty() && self.index_buffer.is_empty() && self.tex_configs.is_empty()
    }
}

/// One draw range: `face_count` indices starting at `face_start`, drawn with
/// `texture_id`. A negative texture id means untextured.
#[binrw]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[br(big)]
#[bw(big)]
pub struct TexConfig {
    pub texture_id: i32,
    pub face_start: i32,
    pub face_count: i32,
    pub mode: i32,
}

impl TexConfig {
    pub const LEN: usize = 0x10;
}

/// A directional light pair from the engine light table.
#[binrw]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[br(big)]
#[bw(big)]
pub struct Light {
    pub color1: [f32; 4],
    pub direction1: [f32; 4],
    pub color2: [f32; 4],
    pub direction2: [f32; 4],
}

impl Light {
    pub const LEN: usize = 0x40;
}

// ============================================================================
// Record codecs
// ============================================================================

/// Read `count` fixed-layout records of `stride` bytes each. The range is
/// bounds-checked up front so an overrun surfaces as `TruncatedInput`
/// rather than a mid-record parse failure.
pub(crate) fn read_records<T>(
    block: &[u8],
    offset: usize,
    count: usize,
    stride: usize,
) -> Result<Vec<T>>
where
    T: for<'a> BinRead<Args<'a> = ()>,
{
    let raw = bytes::bytes(block, offset, count * stride)?;
    let mut cursor = Cursor::new(raw);
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        cursor.set_position((i * stride) as u64);
        out.push(T::read_options(&mut cursor, Endian::Big, ())?);
    }
    Ok(out)
}

/// Read one fixed-layout record at `offset`.
pub(crate) fn read_record<T>(block: &[u8], offset: usize) -> Result<T>
where
    T: for<'a> BinRead<Args<'a> = ()>,
{
    let mut cursor = Cursor::new(block);
    cursor.set_position(offset as u64);
    Ok(T::read_options(&mut cursor, Endian::Big, ())?)
}

/// Append records back to back in big-endian layout.
pub(crate) fn write_records<T>(buf: &mut Vec<u8>, items: &[T]) -> Result<()>
where
    T: for<'a> BinWrite<Args<'a> = ()>,
{
    let mut cursor = Cursor::new(Vec::new());
    for item in items {
        item.write_options(&mut cursor, Endian::Big, ())?;
    }
    buf.extend_from_slice(&cursor.into_inner());
    Ok(())
}

/// Append one record in big-endian layout.
pub(crate) fn write_record<T>(buf: &mut Vec<u8>, item: &T) -> Result<()>
where
    T: for<'a> BinWrite<Args<'a> = ()>,
{
    let mut cursor = Cursor::new(Vec::new());
    item.write_options(&mut cursor, Endian::Big, ())?;
    buf.extend_from_slice(&cursor.into_inner());
    Ok(())
}

// ============================================================================
// Buffer primitives
// ============================================================================

pub(crate) fn read_f32s(block: &[u8], offset: usize, count: usize) -> Result<Vec<f32>> {
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        out.push(bytes::read_f32(block, offset + i * 4)?);
    }
    Ok(out)
}

pub(crate) fn write_f32s(buf: &mut Vec<u8>, values: &[f32]) {
    for &v in values {
        bytes::write_f32(buf, v);
    }
}

pub(crate) fn read_u16s(block: &[u8], offset: usize, count: usize) -> Result<Vec<u16>> {
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        out.push(bytes::read_u16(block, offset + i * 2)?);
    }
    Ok(out)
}

pub(crate) fn write_u16s(buf: &mut Vec<u8>, values: &[u16]) {
    for &v in values {
        bytes::write_u16(buf, v);
    }
}
