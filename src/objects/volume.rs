//! Trigger volumes: cuboids, spheres, and cylinders all share one 0x80-byte
//! record, a transform followed by its inverse. The inverse is preserved on
//! round trip and only recomputed when the transform is mutated.

use cgmath::{Matrix4, SquareMatrix, Vector3};

use crate::error::Result;
use crate::game::GameVariant;
use crate::math;
use crate::objects::{GameRecord, Placed};

#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    pub matrix: Matrix4<f32>,
    pub inverse: Matrix4<f32>,
}

impl Volume {
    pub const ELEMENT_SIZE: usize = 0x80;

    pub fn new(matrix: Matrix4<f32>) -> Self {
        Volume {
            inverse: matrix.invert().unwrap_or_else(Matrix4::identity),
            matrix,
        }
    }

    fn refresh_inverse(&mut self) {
        self.inverse = self.matrix.invert().unwrap_or_else(Matrix4::identity);
    }
}

impl Default for Volume {
    fn default() -> Self {
        Volume::new(Matrix4::identity())
    }
}

impl GameRecord for Volume {
    fn element_size(_game: GameVariant) -> usize {
        Self::ELEMENT_SIZE
    }

    fn decode(block: &[u8], offset: usize, _game: GameVariant) -> Result<Self> {
        Ok(Volume {
            matrix: math::read_mat4(block, offset)?,
            inverse: math::read_mat4(block, offset + 0x40)?,
        })
    }

    fn encode(&self, buf: &mut Vec<u8>, _game: GameVariant) {
        math::write_mat4(buf, &self.matrix);
        math::write_mat4(buf, &self.inverse);
    }
}

impl Placed for Volume {
    fn position(&self) -> Vector3<f32> {
        self.matrix.w.truncate()
    }

    fn set_position(&mut self, p: Vector3<f32>) {
        self.matrix.w.x = p.x;
        self.matrix.w.y = p.y;
        self.matrix.w.z = p.z;
        self.refresh_inverse();
    }

    fn rotation(&self) -> Vector3<f32> {
        math::decompose_trs(&self.matrix).1
    }

    fn set_rotation(&mut self, e: Vector3<f32>) {
        let (t, _, s) = math::decompose_trs(&self.matrix);
        self.matrix = math::compose_trs(t, e, s);
        self.refresh_inverse();
    }

    fn scale(&self) -> Vector3<f32> {
        math::decompose_trs(&self.matrix).2
    }

    fn set_scale(&mut self, s: Vector3<f32>) {
        let (t, r, _) = math::decompose_trs(&self.matrix);
        self.matrix = math::compose_trs(t, r, s);
        self.refresh_inverse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untouched_records_round_trip_bit_for_bit() {
        // A deliberately non-matching inverse must survive a round trip.
        let mut buf = Vec::new();
        math::write_mat4(&mut buf, &Matrix4::from_translation(Vector3::new(4.0, 5.0, 6.0)));
        math::write_mat4(&mut buf, &Matrix4::from_scale(3.0));
        let v = Volume::decode(&buf, 0, GameVariant::Rc2).unwrap();
        let mut out = Vec::new();
        v.encode(&mut out, GameVariant::Rc2);
        assert_eq!(buf, out);
    }

    #[test]
    fn mutation_refreshes_the_inverse() {
        let mut v = Volume::new(Matrix4::from_translation(Vector3::new(1.0, 0.0, 0.0)));
        v.set_position(Vector3::new(0.0, 2.0, 0.0));
        // inverse * matrix == identity for an affine transform.
        let product = v.inverse * v.matrix;
        assert!((product.x.x - 1.0).abs() < 1e-5);
        assert!((product.w.y).abs() < 1e-5);
    }
}
