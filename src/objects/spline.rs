//! Spline paths: variable-length runs of (x, y, z, w) vertices.
//!
//! Section layout:
//!
//! ```text
//! 0x00 splineCount u32
//! 0x04 unk04 u32 (preserved)
//! 0x08 zero pad to 0x10
//! 0x10 splineCount * u32 section-relative block offsets
//!      zero pad to 0x10
//!      blocks, each 0x10-aligned:
//!        0x00 vertexCount u32
//!        0x04 zero pad to 0x10
//!        0x10 vertexCount * (x, y, z, w) f32
//! ```
//!
//! Block offsets are recomputed on write. Transforms are applied vertex by
//! vertex relative to the first vertex, reproducing the original editor's
//! numerical behavior; a spline has no stored rotation or scale of its own.

use cgmath::{Vector3, Vector4};

use crate::bytes;
use crate::error::Result;
use crate::math;
use crate::objects::Placed;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Spline {
    pub vertices: Vec<Vector4<f32>>,
}

impl Spline {
    pub fn decode(block: &[u8], offset: usize) -> Result<Self> {
        let count = bytes::read_u32(block, offset)? as usize;
        let mut vertices = Vec::with_capacity(count);
        for i in 0..count {
            vertices.push(math::read_vec4(block, offset + 0x10 + i * 0x10)?);
        }
        Ok(Spline { vertices })
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        bytes::write_u32(buf, self.vertices.len() as u32);
        bytes::write_zeros(buf, 0x0C);
        for &v in &self.vertices {
            math::write_vec4(buf, v);
        }
    }

    fn anchor(&self) -> Vector3<f32> {
        self.vertices
            .first()
            .map(|v| v.truncate())
            .unwrap_or_else(|| Vector3::new(0.0, 0.0, 0.0))
    }
}

pub fn read_spline_section(block: &[u8]) -> Result<(Vec<Spline>, u32)> {
    let count = bytes::read_u32(block, 0x00)? as usize;
    let unk04 = bytes::read_u32(block, 0x04)?;
    let mut splines = Vec::with_capacity(count);
    for i in 0..count {
        let offset = bytes::read_u32(block, 0x10 + i * 4)? as usize;
        splines.push(Spline::decode(block, offset)?);
    }
    Ok((splines, unk04))
}

pub fn write_spline_section(splines: &[Spline], unk04: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    bytes::write_u32(&mut buf, splines.len() as u32);
    bytes::write_u32(&mut buf, unk04);
    bytes::pad_to(&mut buf, 0x10);

    // Offset table first; blocks start after it, 0x10-aligned, and each
    // block's size is a multiple of 0x10 so alignment is preserved.
    let table_at = buf.len();
    bytes::write_zeros(&mut buf, splines.len() * 4);
    bytes::pad_to(&mut buf, 0x10);
    for (i, spline) in splines.iter().enumerate() {
        let offset = buf.len() as u32;
        bytes::write_u32_at(&mut buf, table_at + i * 4, offset);
        spline.encode(&mut buf);
    }
    buf
}

impl Placed for Spline {
    fn position(&self) -> Vector3<f32> {
        self.anchor()
    }

    fn set_position(&mut self, p: Vector3<f32>) {
        let delta = p - self.anchor();
        for v in &mut self.vertices {
            v.x += delta.x;
            v.y += delta.y;
            v.z += delta.z;
        }
    }

    fn rotation(&self) -> Vector3<f32> {
        Vector3::new(0.0, 0.0, 0.0)
    }

    /// Rotates every vertex about the first one; splines store no angle, so
    /// the argument is a delta, not an absolute orientation.
    fn set_rotation(&mut self, e: Vector3<f32>) {
        let rot = math::euler_to_matrix(e);
        let anchor = self.anchor();
        for v in &mut self.vertices {
            let rel = v.truncate() - anchor;
            let turned = rot * rel + anchor;
            v.x = turned.x;
            v.y = turned.y;
            v.z = turned.z;
        }
    }

    fn scale(&self) -> Vector3<f32> {
        Vector3::new(1.0, 1.0, 1.0)
    }

    /// Scales every vertex about the first one; the argument is a factor.
    fn set_scale(&mut self, s: Vector3<f32>) {
        let anchor = self.anchor();
        for v in &mut self.vertices {
            v.x = (v.x - anchor.x) * s.x + anchor.x;
            v.y = (v.y - anchor.y) * s.y + anchor.y;
            v.z = (v.z - anchor.z) * s.z + anchor.z;
        }
    }
}
