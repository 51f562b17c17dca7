//! Global per-level variables.
//!
//! ```text
//! 0x00 fogColorR u32   0x04 fogColorG u32     0x08 fogColorB u32
//! 0x0C fogNear f32     0x10 fogFar f32        0x14 deathBarrier f32
//! 0x18 shipPosition vec3                      0x24 shipRotation f32
//! 0x28 opaque tail up to the variant block size
//! ```
//!
//! The block is 0x50 bytes in the first game, 0x58 in the second and third,
//! and 0x60 in the fourth; only the first 0x28 bytes are identified and the
//! rest is preserved verbatim.

use cgmath::Vector3;

use crate::bytes;
use crate::error::Result;
use crate::game::GameVariant;
use crate::math;
use crate::objects::OpaqueBlob;

const KNOWN_LEN: usize = 0x28;

#[derive(Debug, Clone, PartialEq)]
pub struct LevelVariables {
    pub fog_color: [u32; 3],
    pub fog_near: f32,
    pub fog_far: f32,
    pub death_barrier: f32,
    pub ship_position: Vector3<f32>,
    pub ship_rotation: f32,
    pub tail: OpaqueBlob,
}

impl LevelVariables {
    /// A zeroed block of the right size for `game`.
    pub fn new(game: GameVariant) -> Self {
        LevelVariables {
            fog_color: [0; 3],
            fog_near: 0.0,
            fog_far: 0.0,
            death_barrier: 0.0,
            ship_position: Vector3::new(0.0, 0.0, 0.0),
            ship_rotation: 0.0,
            tail: OpaqueBlob::zeroed(game.level_vars_len() - KNOWN_LEN),
        }
    }

    pub fn decode(block: &[u8], game: GameVariant) -> Result<Self> {
        Ok(LevelVariables {
            fog_color: [
                bytes::read_u32(block, 0x00)?,
                bytes::read_u32(block, 0x04)?,
                bytes::read_u32(block, 0x08)?,
            ],
            fog_near: bytes::read_f32(block, 0x0C)?,
            fog_far: bytes::read_f32(block, 0x10)?,
            death_barrier: bytes::read_f32(block, 0x14)?,
            ship_position: math::read_vec3(block, 0x18)?,
            ship_rotation: bytes::read_f32(block, 0x24)?,
            tail: OpaqueBlob::from_block(block, KNOWN_LEN, game.level_vars_len() - KNOWN_LEN)?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(KNOWN_LEN + self.tail.len());
        bytes::write_u32(&mut buf, self.fog_color[0]);
        bytes::write_u32(&mut buf, self.fog_color[1]);
        bytes::write_u32(&mut buf, self.fog_color[2]);
        bytes::write_f32(&mut buf, self.fog_near);
        bytes::write_f32(&mut buf, self.fog_far);
        bytes::write_f32(&mut buf, self.death_barrier);
        math::write_vec3(&mut buf, self.ship_position);
        bytes::write_f32(&mut buf, self.ship_rotation);
        self.tail.write(&mut buf);
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_size_tracks_the_variant() {
        assert_eq!(LevelVariables::new(GameVariant::Rc1).encode().len(), 0x50);
        assert_eq!(LevelVariables::new(GameVariant::Rc2).encode().len(), 0x58);
        assert_eq!(LevelVariables::new(GameVariant::Rc3).encode().len(), 0x58);
        assert_eq!(LevelVariables::new(GameVariant::Dl).encode().len(), 0x60);
    }

    #[test]
    fn encode_then_decode_round_trips() {
        let mut vars = LevelVariables::new(GameVariant::Rc3);
        vars.fog_color = [90, 120, 255];
        vars.fog_near = 35.0;
        vars.fog_far = 1200.0;
        vars.death_barrier = -40.0;
        vars.ship_position = Vector3::new(210.5, 150.25, 32.0);
        vars.ship_rotation = 1.5707964;
        vars.tail.data[0] = 0xEE;

        let buf = vars.encode();
        let back = LevelVariables::decode(&buf, GameVariant::Rc3).unwrap();
        assert_eq!(back, vars);
        assert_eq!(back.encode(), buf);
    }

    #[test]
    fn field_offsets_match_the_layout() {
        let mut vars = LevelVariables::new(GameVariant::Rc2);
        vars.death_barrier = 2.5;
        vars.ship_rotation = 3.25;
        let buf = vars.encode();
        assert_eq!(bytes::read_f32(&buf, 0x14).unwrap(), 2.5);
        assert_eq!(bytes::read_f32(&buf, 0x24).unwrap(), 3.25);
    }

    #[test]
    fn short_block_is_truncated_input() {
        let buf = vec![0u8; 0x40];
        match LevelVariables::decode(&buf, GameVariant::Rc2) {
            Err(crate::error::LevelError::TruncatedInput { .. }) => {}
            other => panic!("expected TruncatedInput, got {:?}", other),
        }
    }
}
