//! Tie instances: placed static scenery, one transform plus a model id.
//!
//! Later games store one 4x4 transform (0x70-byte records). The first game
//! stores two legacy 4x4 blocks that are summed element-wise on decode
//! (0xB0-byte records); on encode the composed transform goes into the
//! first block and the second is zeroed, which is stable from the first
//! save onward.
//!
//! Both layouts end with the same tail: 0x10 unknown bytes, the model id,
//! then 0x1C unknown bytes.

use cgmath::{Matrix4, SquareMatrix, Vector3};

use crate::bytes;
use crate::error::Result;
use crate::game::GameVariant;
use crate::math;
use crate::objects::{GameRecord, OpaqueBlob, Placed};

/// Rotation read from a summed dual-matrix record is multiplied by this
/// empirical factor. Its physical meaning was never recovered from the
/// format; keep the constant as-is, do not re-derive it.
pub(crate) const DUAL_MATRIX_ROTATION_SCALE: f32 = 2.2;

#[derive(Debug, Clone, PartialEq)]
pub struct Tie {
    pub matrix: Matrix4<f32>,
    pub unk_mid: OpaqueBlob,
    pub model_id: u32,
    pub unk_tail: OpaqueBlob,
    dual_matrix: bool,
}

// ============================================================================
// Shared instance codec (ties and shrubs have identical record shapes)
// ============================================================================

pub(crate) struct InstanceParts {
    pub matrix: Matrix4<f32>,
    pub unk_mid: OpaqueBlob,
    pub model_id: u32,
    pub unk_tail: OpaqueBlob,
}

pub(crate) fn decode_instance(
    block: &[u8],
    offset: usize,
    game: GameVariant,
) -> Result<InstanceParts> {
    let (matrix, rest) = if game.has_dual_matrix_instances() {
        let a = math::read_mat4(block, offset)?;
        let b = math::read_mat4(block, offset + 0x40)?;
        (a + b, offset + 0x80)
    } else {
        (math::read_mat4(block, offset)?, offset + 0x40)
    };
    Ok(InstanceParts {
        matrix,
        unk_mid: OpaqueBlob::from_block(block, rest, 0x10)?,
        model_id: bytes::read_u32(block, rest + 0x10)?,
        unk_tail: OpaqueBlob::from_block(block, rest + 0x14, 0x1C)?,
    })
}

pub(crate) fn encode_instance(
    buf: &mut Vec<u8>,
    matrix: &Matrix4<f32>,
    unk_mid: &OpaqueBlob,
    model_id: u32,
    unk_tail: &OpaqueBlob,
    game: GameVariant,
) {
    math::write_mat4(buf, matrix);
    if game.has_dual_matrix_instances() {
        // Second legacy block, normalized to zero.
        bytes::write_zeros(buf, 0x40);
    }
    unk_mid.write(buf);
    bytes::write_u32(buf, model_id);
    unk_tail.write(buf);
}

impl Tie {
    pub fn new(game: GameVariant, matrix: Matrix4<f32>, model_id: u32) -> Self {
        Tie {
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

impl Default for Tie {
    fn default() -> Self {
        Tie::new(GameVariant::Rc2, Matrix4::identity(), 0)
    }
}

impl GameRecord for Tie {
    fn element_size(game: GameVariant) -> usize {
        game.tie_len()
    }

    fn decode(block: &[u8], offset: usize, game: GameVariant) -> Result<Self> {
        let parts = decode_instance(block, offset, game)?;
        Ok(Tie {
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

impl Placed for Tie {
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
