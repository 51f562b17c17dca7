//! Skybox mesh: one buffer of colored vertices, never split into slots.
//!
//! ```text
//! SkyboxHead 0x20:
//! 0x00 vertexCount u32   0x04 indexCount u32   0x08 texConfigCount u32
//! 0x0C vertexPointer     0x10 indexPointer     0x14 texConfigPointer
//! 0x18 unk u32           0x1C unk u32
//! ```
//!
//! Pointers are absolute within the engine file. Vertices are 0x18 rows:
//! position, uv, then a packed color.

use cgmath::Vector3;

use crate::bytes;
use crate::error::Result;
use crate::math;
use crate::models::{self, TexConfig};
use crate::serialize::cursor::SectionWriter;

const HEAD_LEN: usize = 0x20;
const VERTEX_STRIDE: usize = 0x18;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyboxVertex {
    pub position: Vector3<f32>,
    pub uv: [f32; 2],
    pub rgba: u32,
}

impl Default for SkyboxVertex {
    fn default() -> Self {
        SkyboxVertex {
            position: Vector3::new(0.0, 0.0, 0.0),
            uv: [0.0; 2],
            rgba: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skybox {
    pub vertices: Vec<SkyboxVertex>,
    pub index_buffer: Vec<u16>,
    pub tex_configs: Vec<TexConfig>,
    pub unk18: u32,
    pub unk1c: u32,
}

impl Skybox {
    pub fn read(data: &[u8], offset: usize) -> Result<Skybox> {
        let vertex_count = bytes::read_u32(data, offset)? as usize;
        let index_count = bytes::read_u32(data, offset + 0x04)? as usize;
        let tex_config_count = bytes::read_u32(data, offset + 0x08)? as usize;
        let vertex_pointer = bytes::read_u32(data, offset + 0x0C)? as usize;
        let index_pointer = bytes::read_u32(data, offset + 0x10)? as usize;
        let tex_config_pointer = bytes::read_u32(data, offset + 0x14)? as usize;
        let unk18 = bytes::read_u32(data, offset + 0x18)?;
        let unk1c = bytes::read_u32(data, offset + 0x1C)?;

        let mut vertices = Vec::with_capacity(vertex_count);
        for i in 0..vertex_count {
            let at = vertex_pointer + i * VERTEX_STRIDE;
            vertices.push(SkyboxVertex {
                position: math::read_vec3(data, at)?,
                uv: [bytes::read_f32(data, at + 0x0C)?, bytes::read_f32(data, at + 0x10)?],
                rgba: bytes::read_u32(data, at + 0x14)?,
            });
        }
        Ok(Skybox {
            vertices,
            index_buffer: if index_pointer != 0 {
                models::read_u16s(data, index_pointer, index_count)?
            } else {
                Vec::new()
            },
            tex_configs: if tex_config_pointer != 0 {
                models::read_records(data, tex_config_pointer, tex_config_count, TexConfig::LEN)?
            } else {
                Vec::new()
            },
            unk18,
            unk1c,
        })
    }

    pub fn write(&self, w: &mut SectionWriter) -> Result<u32> {
        let head_at = w.begin_section(0x10) as usize;
        w.reserve(HEAD_LEN);

        let vertex_pointer = if self.vertices.is_empty() {
            0
        } else {
            let at = w.begin_section(0x10);
            for v in &self.vertices {
                math::write_vec3(&mut w.buf, v.position);
                models::write_f32s(&mut w.buf, &v.uv);
                w.put_u32(v.rgba);
            }
            at
        };
        let index_pointer = if self.index_buffer.is_empty() {
            0
        } else {
            let at = w.begin_section(0x10);
            models::write_u16s(&mut w.buf, &self.index_buffer);
            at
        };
        let tex_config_pointer = if self.tex_configs.is_empty() {
            0
        } else {
            let at = w.begin_section(0x10);
            models::write_records(&mut w.buf, &self.tex_configs)?;
            at
        };

        w.patch_u32(head_at, self.vertices.len() as u32);
        w.patch_u32(head_at + 0x04, self.index_buffer.len() as u32);
        w.patch_u32(head_at + 0x08, self.tex_configs.len() as u32);
        w.patch_u32(head_at + 0x0C, vertex_pointer);
        w.patch_u32(head_at + 0x10, index_pointer);
        w.patch_u32(head_at + 0x14, tex_config_pointer);
        w.patch_u32(head_at + 0x18, self.unk18);
        w.patch_u32(head_at + 0x1C, self.unk1c);
        Ok(head_at as u32)
    }
}
