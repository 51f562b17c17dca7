//! Cutscene camera records, 0x40 bytes each.

use cgmath::Vector3;

use crate::bytes;
use crate::error::Result;
use crate::game::GameVariant;
use crate::math;
use crate::objects::{GameRecord, Placed};

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub id: i32,
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub unk1c: [u32; 9],
}

impl Default for Camera {
    fn default() -> Self {
        Camera {
            id: 0,
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            unk1c: [0; 9],
        }
    }
}

impl GameRecord for Camera {
    fn element_size(_game: GameVariant) -> usize {
        0x40
    }

    fn decode(block: &[u8], offset: usize, _game: GameVariant) -> Result<Self> {
        let mut c = Camera {
            id: bytes::read_i32(block, offset)?,
            position: math::read_vec3(block, offset + 0x04)?,
            rotation: math::read_vec3(block, offset + 0x10)?,
            ..Default::default()
        };
        for (i, slot) in c.unk1c.iter_mut().enumerate() {
            *slot = bytes::read_u32(block, offset + 0x1C + i * 4)?;
        }
        Ok(c)
    }

    fn encode(&self, buf: &mut Vec<u8>, _game: GameVariant) {
        bytes::write_i32(buf, self.id);
        math::write_vec3(buf, self.position);
        math::write_vec3(buf, self.rotation);
        for &v in &self.unk1c {
            bytes::write_u32(buf, v);
        }
    }
}

impl Placed for Camera {
    fn position(&self) -> Vector3<f32> {
        self.position
    }

    fn set_position(&mut self, p: Vector3<f32>) {
        self.position = p;
    }

    fn rotation(&self) -> Vector3<f32> {
        self.rotation
    }

    fn set_rotation(&mut self, e: Vector3<f32>) {
        self.rotation = e;
    }

    fn scale(&self) -> Vector3<f32> {
        Vector3::new(1.0, 1.0, 1.0)
    }

    fn set_scale(&mut self, _s: Vector3<f32>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_round_trips_at_0x40() {
        let cam = Camera {
            id: 3,
            position: Vector3::new(9.0, 8.0, 7.0),
            rotation: Vector3::new(0.0, 1.5, 0.0),
            unk1c: [1, 2, 3, 4, 5, 6, 7, 8, 9],
        };
        let mut buf = Vec::new();
        cam.encode(&mut buf, GameVariant::Rc2);
        assert_eq!(buf.len(), 0x40);
        assert_eq!(Camera::decode(&buf, 0, GameVariant::Rc2).unwrap(), cam);
    }
}
