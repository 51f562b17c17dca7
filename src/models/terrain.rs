//! Terrain: fragments sharing up to four 16-bit-indexed buffer slots.
//!
//! The head appears in the engine file and in chunk files; all pointers in
//! it are absolute within the containing file.
//!
//! ```text
//! TerrainHead 0x60:
//! 0x00 fragmentCount u32
//! 0x04 4 * slotVertexPointer   0x14 4 * slotRgbaPointer
//! 0x24 4 * slotUvPointer       0x34 4 * slotIndexPointer
//! 0x44 7 * u32 opaque
//!
//! TerrainFragment 0x30, fragmentCount records at head + 0x60:
//! 0x00 center vec3        0x0C radius f32
//! 0x10 texConfigPointer   0x14 texConfigCount u16   0x16 slot u16
//! 0x18 vertexIndex u16    0x1A vertexCount u16
//! 0x1C faceIndex u32      0x20 faceCount u16        0x22 pad
//! 0x24 3 * u32 opaque
//! ```
//!
//! Slot vertices are 8-float 0x20 rows, but the texture coordinates in
//! lanes 6..8 are shadowed by a separate per-slot uv buffer (stride 0x08);
//! the uv buffer wins on decode and both copies are written on encode.
//! Fragment indices are stored slot-relative and rebased to fragment-local
//! on decode; an index below the fragment's vertex base is corrupt data.
//!
//! Slots exist because indices are u16: a slot's vertex buffer can never
//! exceed 65,535 entries. Writing re-packs fragments greedily in order,
//! advancing to the next slot on overflow, and recomputes `slot`,
//! `vertexIndex` and `faceIndex` from the packing.

use cgmath::Vector3;

use crate::bytes;
use crate::error::{LevelError, Result};
use crate::math;
use crate::models::{self, TexConfig, VERTEX_FLOATS};
use crate::serialize::cursor::SectionWriter;

const HEAD_LEN: usize = 0x60;
const FRAGMENT_LEN: usize = 0x30;
const SLOTS: usize = 4;
const SLOT_VERTEX_CEILING: usize = 0xFFFF;
const VERTEX_STRIDE: usize = 0x20;
const UV_STRIDE: usize = 0x08;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Terrain {
    pub fragments: Vec<TerrainFragment>,
    pub unk44: [u32; 7],
}

#[derive(Debug, Clone, PartialEq)]
pub struct TerrainFragment {
    pub center: Vector3<f32>,
    pub radius: f32,
    pub tex_configs: Vec<TexConfig>,
    /// 8 floats per vertex, uv already folded into lanes 6..8.
    pub vertex_buffer: Vec<f32>,
    /// One packed color per vertex.
    pub rgbas: Vec<u32>,
    /// Fragment-local indices.
    pub index_buffer: Vec<u16>,
    pub unk24: [u32; 3],
}

impl Default for TerrainFragment {
    fn default() -> Self {
        TerrainFragment {
            center: Vector3::new(0.0, 0.0, 0.0),
            radius: 0.0,
            tex_configs: Vec::new(),
            vertex_buffer: Vec::new(),
            rgbas: Vec::new(),
            index_buffer: Vec::new(),
            unk24: [0; 3],
        }
    }
}

impl TerrainFragment {
    pub fn vertex_count(&self) -> usize {
        self.vertex_buffer.len() / VERTEX_FLOATS
    }
}

struct FragmentRecord {
    center: Vector3<f32>,
    radius: f32,
    tex_config_pointer: usize,
    tex_config_count: usize,
    slot: usize,
    vertex_index: usize,
    vertex_count: usize,
    face_index: usize,
    face_count: usize,
    unk24: [u32; 3],
}

fn read_fragment_record(data: &[u8], at: usize) -> Result<FragmentRecord> {
    let mut unk24 = [0u32; 3];
    for (i, slot) in unk24.iter_mut().enumerate() {
        *slot = bytes::read_u32(data, at + 0x24 + i * 4)?;
    }
    Ok(FragmentRecord {
        center: math::read_vec3(data, at)?,
        radius: bytes::read_f32(data, at + 0x0C)?,
        tex_config_pointer: bytes::read_u32(data, at + 0x10)? as usize,
        tex_config_count: bytes::read_u16(data, at + 0x14)? as usize,
        slot: bytes::read_u16(data, at + 0x16)? as usize,
        vertex_index: bytes::read_u16(data, at + 0x18)? as usize,
        vertex_count: bytes::read_u16(data, at + 0x1A)? as usize,
        face_index: bytes::read_u32(data, at + 0x1C)? as usize,
        face_count: bytes::read_u16(data, at + 0x20)? as usize,
        unk24,
    })
}

fn read_pointer_row(data: &[u8], at: usize) -> Result<[usize; SLOTS]> {
    let mut row = [0usize; SLOTS];
    for (i, slot) in row.iter_mut().enumerate() {
        *slot = bytes::read_u32(data, at + i * 4)? as usize;
    }
    Ok(row)
}

impl Terrain {
    pub fn read(data: &[u8], offset: usize) -> Result<Terrain> {
        let fragment_count = bytes::read_u32(data, offset)? as usize;
        let vertex_pointers = read_pointer_row(data, offset + 0x04)?;
        let rgba_pointers = read_pointer_row(data, offset + 0x14)?;
        let uv_pointers = read_pointer_row(data, offset + 0x24)?;
        let index_pointers = read_pointer_row(data, offset + 0x34)?;
        let mut unk44 = [0u32; 7];
        for (i, slot) in unk44.iter_mut().enumerate() {
            *slot = bytes::read_u32(data, offset + 0x44 + i * 4)?;
        }

        let mut records = Vec::with_capacity(fragment_count);
        for i in 0..fragment_count {
            let record = read_fragment_record(data, offset + HEAD_LEN + i * FRAGMENT_LEN)?;
            if record.slot >= SLOTS {
                return Err(LevelError::InvariantViolation(format!(
                    "terrain fragment {} names slot {}, only {} exist",
                    i, record.slot, SLOTS
                )));
            }
            records.push(record);
        }

        // Slot extents are implicit: whatever the fragments reach.
        let mut vertex_totals = [0usize; SLOTS];
        let mut index_totals = [0usize; SLOTS];
        for record in &records {
            let v = record.vertex_index + record.vertex_count;
            let f = record.face_index + record.face_count;
            vertex_totals[record.slot] = vertex_totals[record.slot].max(v);
            index_totals[record.slot] = index_totals[record.slot].max(f);
        }

        let mut slot_vertices: [Vec<f32>; SLOTS] = Default::default();
        let mut slot_rgbas: [Vec<u32>; SLOTS] = Default::default();
        let mut slot_indices: [Vec<u16>; SLOTS] = Default::default();
        for s in 0..SLOTS {
            let count = vertex_totals[s];
            let mut floats = Vec::with_capacity(count * VERTEX_FLOATS);
            for i in 0..count {
                let mut row =
                    models::read_f32s(data, vertex_pointers[s] + i * VERTEX_STRIDE, VERTEX_FLOATS)?;
                // The uv buffer is authoritative for lanes 6..8.
                let uv = models::read_f32s(data, uv_pointers[s] + i * UV_STRIDE, 2)?;
                row[6] = uv[0];
                row[7] = uv[1];
                floats.extend(row);
            }
            slot_vertices[s] = floats;
            for i in 0..count {
                slot_rgbas[s].push(bytes::read_u32(data, rgba_pointers[s] + i * 4)?);
            }
            if index_totals[s] > 0 {
                slot_indices[s] = models::read_u16s(data, index_pointers[s], index_totals[s])?;
            }
        }

        let mut fragments = Vec::with_capacity(fragment_count);
        for (i, record) in records.into_iter().enumerate() {
            let vs = record.vertex_index * VERTEX_FLOATS;
            let ve = (record.vertex_index + record.vertex_count) * VERTEX_FLOATS;
            let vertex_buffer = slot_vertices[record.slot][vs..ve].to_vec();
            let rgbas = slot_rgbas[record.slot]
                [record.vertex_index..record.vertex_index + record.vertex_count]
                .to_vec();

            let mut index_buffer = Vec::with_capacity(record.face_count);
            for &raw in
                &slot_indices[record.slot][record.face_index..record.face_index + record.face_count]
            {
                let local = (raw as usize).checked_sub(record.vertex_index).ok_or_else(|| {
                    LevelError::InvariantViolation(format!(
                        "terrain fragment {} index {} is below its vertex base {}",
                        i, raw, record.vertex_index
                    ))
                })?;
                index_buffer.push(local as u16);
            }

            fragments.push(TerrainFragment {
                center: record.center,
                radius: record.radius,
                tex_configs: models::read_records(
                    data,
                    record.tex_config_pointer,
                    record.tex_config_count,
                    TexConfig::LEN,
                )?,
                vertex_buffer,
                rgbas,
                index_buffer,
                unk24: record.unk24,
            });
        }
        Ok(Terrain { fragments, unk44 })
    }

    /// Pick a slot for every fragment in order. Returns per-fragment
    /// `(slot, vertex_index, face_index)`.
    fn pack_slots(&self) -> Result<Vec<(usize, usize, usize)>> {
        let mut placements = Vec::with_capacity(self.fragments.len());
        let mut slot = 0usize;
        let mut vertex_total = 0usize;
        let mut face_total = 0usize;
        for (i, fragment) in self.fragments.iter().enumerate() {
            let n = fragment.vertex_count();
            if n > SLOT_VERTEX_CEILING {
                return Err(LevelError::InvariantViolation(format!(
                    "terrain fragment {} has {} vertices, above the 16-bit slot ceiling",
                    i, n
                )));
            }
            if fragment.rgbas.len() != n {
                return Err(LevelError::InvariantViolation(format!(
                    "terrain fragment {} has {} colors for {} vertices",
                    i,
                    fragment.rgbas.len(),
                    n
                )));
            }
            if fragment.index_buffer.len() > u16::MAX as usize {
                return Err(LevelError::InvariantViolation(format!(
                    "terrain fragment {} has {} indices, above the u16 record field",
                    i,
                    fragment.index_buffer.len()
                )));
            }
            if let Some(&bad) = fragment.index_buffer.iter().find(|&&ix| ix as usize >= n) {
                return Err(LevelError::InvariantViolation(format!(
                    "terrain fragment {} references vertex {} of {}",
                    i, bad, n
                )));
            }
            if vertex_total + n > SLOT_VERTEX_CEILING {
                slot += 1;
                vertex_total = 0;
                face_total = 0;
                if slot >= SLOTS {
                    return Err(LevelError::InvariantViolation(
                        "terrain does not fit in four vertex slots".into(),
                    ));
                }
            }
            placements.push((slot, vertex_total, face_total));
            vertex_total += n;
            face_total += fragment.index_buffer.len();
        }
        Ok(placements)
    }

    pub fn write(&self, w: &mut SectionWriter) -> Result<u32> {
        let placements = self.pack_slots()?;
        let head_at = w.begin_section(0x10) as usize;
        w.reserve(HEAD_LEN + self.fragments.len() * FRAGMENT_LEN);

        for (i, fragment) in self.fragments.iter().enumerate() {
            let record_at = head_at + HEAD_LEN + i * FRAGMENT_LEN;
            let tex_config_pointer = if fragment.tex_configs.is_empty() {
                0
            } else {
                let at = w.begin_section(0x10);
                models::write_records(&mut w.buf, &fragment.tex_configs)?;
                at
            };
            let (slot, vertex_index, face_index) = placements[i];
            w.patch_f32(record_at, fragment.center.x);
            w.patch_f32(record_at + 0x04, fragment.center.y);
            w.patch_f32(record_at + 0x08, fragment.center.z);
            w.patch_f32(record_at + 0x0C, fragment.radius);
            w.patch_u32(record_at + 0x10, tex_config_pointer);
            w.patch_u16(record_at + 0x14, fragment.tex_configs.len() as u16);
            w.patch_u16(record_at + 0x16, slot as u16);
            w.patch_u16(record_at + 0x18, vertex_index as u16);
            w.patch_u16(record_at + 0x1A, fragment.vertex_count() as u16);
            w.patch_u32(record_at + 0x1C, face_index as u32);
            w.patch_u16(record_at + 0x20, fragment.index_buffer.len() as u16);
            for (j, v) in fragment.unk24.iter().enumerate() {
                w.patch_u32(record_at + 0x24 + j * 4, *v);
            }
        }

        for s in 0..SLOTS {
            let members: Vec<usize> = (0..self.fragments.len())
                .filter(|&i| placements[i].0 == s)
                .collect();
            if members.is_empty() {
                continue;
            }
            let vp = w.begin_section(0x10);
            for &i in &members {
                models::write_f32s(&mut w.buf, &self.fragments[i].vertex_buffer);
            }
            let rp = w.begin_section(0x80);
            for &i in &members {
                for &rgba in &self.fragments[i].rgbas {
                    w.put_u32(rgba);
                }
            }
            let up = w.begin_section(0x10);
            for &i in &members {
                for row in self.fragments[i].vertex_buffer.chunks_exact(VERTEX_FLOATS) {
                    models::write_f32s(&mut w.buf, &row[6..]);
                }
            }
            let ip = w.begin_section(0x10);
            for &i in &members {
                let base = placements[i].1 as u16;
                for &local in &self.fragments[i].index_buffer {
                    w.put_u16(base + local);
                }
            }
            w.patch_u32(head_at + 0x04 + s * 4, vp);
            w.patch_u32(head_at + 0x14 + s * 4, rp);
            w.patch_u32(head_at + 0x24 + s * 4, up);
            w.patch_u32(head_at + 0x34 + s * 4, ip);
        }

        w.patch_u32(head_at, self.fragments.len() as u32);
        for (i, v) in self.unk44.iter().enumerate() {
            w.patch_u32(head_at + 0x44 + i * 4, *v);
        }
        Ok(head_at as u32)
    }
}
