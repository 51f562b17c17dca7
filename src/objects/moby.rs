//! Moby records: every scripted, movable, or interactive entity.
//!
//! ```text
//! 0x00 missionId      0x04 spawnType      0x08 mobyId       0x0C bolts
//! 0x10 modelId        0x14 scale          0x18 drawDist     0x1C updateDist
//! 0x20 unk20          0x24 unk24          0x28 position x/y/z
//! 0x34 rotation x/y/z (Euler radians)     0x40 groupIndex   0x44 isRooted
//! 0x48 rootedDist     0x4C unk4C          0x50 pvarIndex    0x54 unk54
//! 0x58 mode           0x5C lightIndex     0x60..0x78 unk60..unk74
//! [fourth game: 0x78 unk78, stride 0x7C]
//! ```
//!
//! Rotation is stored as Euler angles directly, so untouched records
//! round-trip bit-for-bit. `pvar_index` links the record to an entry of the
//! containing file's pvar list; -1 means none.

use cgmath::Vector3;

use crate::bytes;
use crate::error::Result;
use crate::game::GameVariant;
use crate::math;
use crate::objects::{GameRecord, Placed};

#[derive(Debug, Clone, PartialEq)]
pub struct Moby {
    pub mission_id: i32,
    pub spawn_type: u32,
    pub moby_id: i32,
    pub bolts: i32,
    pub model_id: i32,
    pub scale: f32,
    pub draw_distance: i32,
    pub update_distance: i32,
    pub unk20: u32,
    pub unk24: u32,
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub group_index: i32,
    pub is_rooted: i32,
    pub rooted_distance: f32,
    pub unk4c: u32,
    /// Index into the level's pvar list, -1 for none.
    pub pvar_index: i32,
    pub unk54: u32,
    pub mode: i32,
    pub light_index: i32,
    pub unk60: [u32; 6],
    /// Fourth game only.
    pub unk78: u32,
}

impl Default for Moby {
    fn default() -> Self {
        Moby {
            mission_id: 0,
            spawn_type: 0,
            moby_id: 0,
            bolts: 0,
            model_id: 0,
            scale: 1.0,
            draw_distance: 0,
            update_distance: 0,
            unk20: 0,
            unk24: 0,
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            group_index: -1,
            is_rooted: 0,
            rooted_distance: 0.0,
            unk4c: 0,
            pvar_index: -1,
            unk54: 0,
            mode: 0,
            light_index: 0,
            unk60: [0; 6],
            unk78: 0,
        }
    }
}

impl GameRecord for Moby {
    fn element_size(game: GameVariant) -> usize {
        game.moby_len()
    }

    fn decode(block: &[u8], offset: usize, game: GameVariant) -> Result<Self> {
        let mut m = Moby {
            mission_id: bytes::read_i32(block, offset)?,
            spawn_type: bytes::read_u32(block, offset + 0x04)?,
            moby_id: bytes::read_i32(block, offset + 0x08)?,
            bolts: bytes::read_i32(block, offset + 0x0C)?,
            model_id: bytes::read_i32(block, offset + 0x10)?,
            scale: bytes::read_f32(block, offset + 0x14)?,
            draw_distance: bytes::read_i32(block, offset + 0x18)?,
            update_distance: bytes::read_i32(block, offset + 0x1C)?,
            unk20: bytes::read_u32(block, offset + 0x20)?,
            unk24: bytes::read_u32(block, offset + 0x24)?,
            position: math::read_vec3(block, offset + 0x28)?,
            rotation: math::read_vec3(block, offset + 0x34)?,
            group_index: bytes::read_i32(block, offset + 0x40)?,
            is_rooted: bytes::read_i32(block, offset + 0x44)?,
            rooted_distance: bytes::read_f32(block, offset + 0x48)?,
            unk4c: bytes::read_u32(block, offset + 0x4C)?,
            pvar_index: bytes::read_i32(block, offset + 0x50)?,
            unk54: bytes::read_u32(block, offset + 0x54)?,
            mode: bytes::read_i32(block, offset + 0x58)?,
            light_index: bytes::read_i32(block, offset + 0x5C)?,
            ..Default::default()
        };
        for (i, slot) in m.unk60.iter_mut().enumerate() {
            *slot = bytes::read_u32(block, offset + 0x60 + i * 4)?;
        }
        if game == GameVariant::Dl {
            m.unk78 = bytes::read_u32(block, offset + 0x78)?;
        }
        Ok(m)
    }

    fn encode(&self, buf: &mut Vec<u8>, game: GameVariant) {
        bytes::write_i32(buf, self.mission_id);
        bytes::write_u32(buf, self.spawn_type);
        bytes::write_i32(buf, self.moby_id);
        bytes::write_i32(buf, self.bolts);
        bytes::write_i32(buf, self.model_id);
        bytes::write_f32(buf, self.scale);
        bytes::write_i32(buf, self.draw_distance);
        bytes::write_i32(buf, self.update_distance);
        bytes::write_u32(buf, self.unk20);
        bytes::write_u32(buf, self.unk24);
        math::write_vec3(buf, self.position);
        math::write_vec3(buf, self.rotation);
        bytes::write_i32(buf, self.group_index);
        bytes::write_i32(buf, self.is_rooted);
        bytes::write_f32(buf, self.rooted_distance);
        bytes::write_u32(buf, self.unk4c);
        bytes::write_i32(buf, self.pvar_index);
        bytes::write_u32(buf, self.unk54);
        bytes::write_i32(buf, self.mode);
        bytes::write_i32(buf, self.light_index);
        for &v in &self.unk60 {
            bytes::write_u32(buf, v);
        }
        if game == GameVariant::Dl {
            bytes::write_u32(buf, self.unk78);
        }
    }
}

impl Placed for Moby {
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
        Vector3::new(self.scale, self.scale, self.scale)
    }

    /// Mobys scale uniformly; only the x component is kept.
    fn set_scale(&mut self, s: Vector3<f32>) {
        self.scale = s.x;
    }
}
