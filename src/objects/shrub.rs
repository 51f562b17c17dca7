//! Shrub instances: cheap distant scenery. Identical record shape to ties,
//! including the first game's summed dual-matrix quirk.

use cgmath::{Matrix4, SquareMatrix, Vector3};

use crate::error::Result;
use crate::game::GameVariant;
use crate::math;
use crate::objects::tie::{decode_instance, encode_instance, DUAL_MATRIX_ROTATION_SCALE};
use crate::objects::{GameRecord, OpaqueBlob, Placed};

#[derive(Debug, Clone, PartialEq)]
pub struct Shrub {
    pub matrix: Matrix4<f32>,
    pub unk_mid: OpaqueBlob,
    pub model_id: u32,
    pub unk_tail: OpaqueBlob,
    dual_matrix: bool,
}

impl Shrub {
    pub fn new(game: GameVariant, matrix: Matrix4<f32>, model_id: u32) -> Self {
        Shrub {
            matrix,
            unk_mid: OpaqueBlob::zeroed(0x10),
            model_id,
            unk_tail: OpaqueBlob::zeroed(0x1C),
            dual_matrix: game.has_dual_matrix_instances(),
        }
    }

    fn rotation_factor(&self) -> f32 {
        if self.dual_matrix {
            DUAL_MATRIX_ROTATION_SCALE
        } else {
            1.0
        }
    }
}

impl Default for Shrub {
    fn default() -> Self {
        Shrub::new(GameVariant::Rc2, Matrix4::identity(), 0)
    }
}

impl GameRecord for Shrub {
    fn element_size(game: GameVariant) -> usize {
        game.tie_len()
    }

    fn decode(block: &[u8], offset: usize, game: GameVariant) -> Result<Self> {
        let parts = decode_instance(block, offset, game)?;
        Ok(Shrub {
            matrix: parts.matrix,
            unk_mid: parts.unk_mid,
            model_id: parts.model_id,
            unk_tail: parts.unk_tail,
            dual_matrix: game.has_dual_matrix_instances(),
        })
    }

    fn encode(&self, buf: &mut Vec<u8>, game: GameVariant) {
        encode_instance(
            buf,
            &self.matrix,
            &self.unk_mid,
            self.model_id,
            &self.unk_tail,
            game,
        );
    }
}

impl Placed for Shrub {
    fn position(&self) -> Vector3<f32> {
        self.matrix.w.truncate()
    }

    fn set_position(&mut self, p: Vector3<f32>) {
        self.matrix.w.x = p.x;
        self.matrix.w.y = p.y;
        self.matrix.w.z = p.z;
    }

    fn rotation(&self) -> Vector3<f32> {
        let (_, r, _) = math::decompose_trs(&self.matrix);
        r * self.rotation_factor()
    }

    fn set_rotation(&mut self, e: Vector3<f32>) {
        let (t, _, s) = math::decompose_trs(&self.matrix);
        self.matrix = math::compose_trs(t, e / self.rotation_factor(), s);
    }

    fn scale(&self) -> Vector3<f32> {
        let (_, _, s) = math::decompose_trs(&self.matrix);
        s
    }

    fn set_scale(&mut self, s: Vector3<f32>) {
        let (t, r, _) = math::decompose_trs(&self.matrix);
        self.matrix = math::compose_trs(t, r, s);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shrub_and_tie_strides_agree() {
        for game in GameVariant::ALL {
            assert_eq!(
                <Shrub as GameRecord>::element_size(game),
                <crate::objects::Tie as GameRecord>::element_size(game)
            );
        }
    }

    #[test]
    fn record_round_trips() {
        let m = math::compose_trs(
            Vector3::new(-2.0, 0.5, 9.0),
            Vector3::new(0.0, 1.1, 0.0),
            Vector3::new(2.0, 2.0, 2.0),
        );
        let shrub = Shrub::new(GameVariant::Dl, m, 321);
        let mut buf = Vec::new();
        shrub.encode(&mut buf, GameVariant::Dl);
        assert_eq!(buf.len(), 0x70);

        let back = Shrub::decode(&buf, 0, GameVariant::Dl).unwrap();
        let mut again = Vec::new();
        back.encode(&mut again, GameVariant::Dl);
        assert_eq!(buf, again);
        assert_eq!(back.model_id, 321);
    }
}
