//! Gameplay file header.
//!
//! Always 0xA0 bytes of u32 pointer slots, but with three different field
//! orderings. The field order of each layout is exactly the canonical
//! section order from `game::gameplay_order`, so reading and writing are a
//! single walk over that table and the adjacent-pointer length inference
//! stays consistent with the serializer for free.
//!
//! The first game's layout has 38 fields (it lacks the type64/type68
//! sections); the final 8 bytes of its header are reserved zeros.

use crate::bytes;
use crate::error::{LevelError, Result};
use crate::game::{self, GameVariant, GameplaySection};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameplayHeader {
    pub level_var_pointer: u32,
    pub type04_pointer: u32,
    pub camera_pointer: u32,
    pub type0c_pointer: u32,
    pub english_pointer: u32,
    pub uk_english_pointer: u32,
    pub french_pointer: u32,
    pub german_pointer: u32,
    pub spanish_pointer: u32,
    pub italian_pointer: u32,
    pub japanese_pointer: u32,
    pub korean_pointer: u32,
    pub moby_pointer: u32,
    pub moby_group_pointer: u32,
    pub global_pvar_pointer: u32,
    pub pvar_table_pointer: u32,
    pub pvar_data_pointer: u32,
    pub cuboid_pointer: u32,
    pub sphere_pointer: u32,
    pub cylinder_pointer: u32,
    pub type50_pointer: u32,
    pub spline_pointer: u32,
    pub grind_path_pointer: u32,
    pub type5c_pointer: u32,
    pub sound_pointer: u32,
    pub type64_pointer: u32,
    pub type68_pointer: u32,
    pub occlusion_pointer: u32,
    pub tie_id_pointer: u32,
    pub shrub_id_pointer: u32,
    pub moby_id_pointer: u32,
    pub type7c_pointer: u32,
    pub type80_pointer: u32,
    pub area_pointer: u32,
    pub type88_pointer: u32,
    pub unk8c_pointer: u32,
    pub unk90_pointer: u32,
    pub unk94_pointer: u32,
    pub unk98_pointer: u32,
    pub unk9c_pointer: u32,
}

impl GameplayHeader {
    pub fn read(block: &[u8], game: GameVariant) -> Result<Self> {
        let mut h = GameplayHeader::default();
        for (i, &section) in game::gameplay_order(game).iter().enumerate() {
            h.set_pointer(section, bytes::read_u32(block, i * 4)?);
        }
        Ok(h)
    }

    pub fn write(&self, game: GameVariant) -> Vec<u8> {
        let mut block = vec![0u8; game.gameplay_header_len()];
        for (i, &section) in game::gameplay_order(game).iter().enumerate() {
            bytes::write_u32_at(&mut block, i * 4, self.pointer(section));
        }
        block
    }

    pub fn pointer(&self, section: GameplaySection) -> u32 {
        match section {
            GameplaySection::LevelVars => self.level_var_pointer,
            GameplaySection::Type04 => self.type04_pointer,
            GameplaySection::Cameras => self.camera_pointer,
            GameplaySection::Type0C => self.type0c_pointer,
            GameplaySection::English => self.english_pointer,
            GameplaySection::UkEnglish => self.uk_english_pointer,
            GameplaySection::French => self.french_pointer,
            GameplaySection::German => self.german_pointer,
            GameplaySection::Spanish => self.spanish_pointer,
            GameplaySection::Italian => self.italian_pointer,
            GameplaySection::Japanese => self.japanese_pointer,
            GameplaySection::Korean => self.korean_pointer,
            GameplaySection::Mobys => self.moby_pointer,
            GameplaySection::MobyGroups => self.moby_group_pointer,
            GameplaySection::GlobalPvars => self.global_pvar_pointer,
            GameplaySection::PvarTable => self.pvar_table_pointer,
            GameplaySection::PvarData => self.pvar_data_pointer,
            GameplaySection::Cuboids => self.cuboid_pointer,
            GameplaySection::Spheres => self.sphere_pointer,
            GameplaySection::Cylinders => self.cylinder_pointer,
            GameplaySection::Type50 => self.type50_pointer,
            GameplaySection::Splines => self.spline_pointer,
            GameplaySection::GrindPaths => self.grind_path_pointer,
            GameplaySection::Type5C => self.type5c_pointer,
            GameplaySection::Sounds => self.sound_pointer,
            GameplaySection::Type64 => self.type64_pointer,
            GameplaySection::Type68 => self.type68_pointer,
            GameplaySection::Occlusion => self.occlusion_pointer,
            GameplaySection::TieIds => self.tie_id_pointer,
            GameplaySection::ShrubIds => self.shrub_id_pointer,
            GameplaySection::MobyIds => self.moby_id_pointer,
            GameplaySection::Type7C => self.type7c_pointer,
            GameplaySection::Type80 => self.type80_pointer,
            GameplaySection::Areas => self.area_pointer,
            GameplaySection::Type88 => self.type88_pointer,
            GameplaySection::Unk8C => self.unk8c_pointer,
            GameplaySection::Unk90 => self.unk90_pointer,
            GameplaySection::Unk94 => self.unk94_pointer,
            GameplaySection::Unk98 => self.unk98_pointer,
            GameplaySection::Unk9C => self.unk9c_pointer,
        }
    }

    pub fn set_pointer(&mut self, section: GameplaySection, value: u32) {
        match section {
            GameplaySection::LevelVars => self.level_var_pointer = value,
            GameplaySection::Type04 => self.type04_pointer = value,
            GameplaySection::Cameras => self.camera_pointer = value,
            GameplaySection::Type0C => self.type0c_pointer = value,
            GameplaySection::English => self.english_pointer = value,
            GameplaySection::UkEnglish => self.uk_english_pointer = value,
            GameplaySection::French => self.french_pointer = value,
            GameplaySection::German => self.german_pointer = value,
            GameplaySection::Spanish => self.spanish_pointer = value,
            GameplaySection::Italian => self.italian_pointer = value,
            GameplaySection::Japanese => self.japanese_pointer = value,
            GameplaySection::Korean => self.korean_pointer = value,
            GameplaySection::Mobys => self.moby_pointer = value,
            GameplaySection::MobyGroups => self.moby_group_pointer = value,
            GameplaySection::GlobalPvars => self.global_pvar_pointer = value,
            GameplaySection::PvarTable => self.pvar_table_pointer = value,
            GameplaySection::PvarData => self.pvar_data_pointer = value,
            GameplaySection::Cuboids => self.cuboid_pointer = value,
            GameplaySection::Spheres => self.sphere_pointer = value,
            GameplaySection::Cylinders => self.cylinder_pointer = value,
            GameplaySection::Type50 => self.type50_pointer = value,
            GameplaySection::Splines => self.spline_pointer = value,
            GameplaySection::GrindPaths => self.grind_path_pointer = value,
            GameplaySection::Type5C => self.type5c_pointer = value,
            GameplaySection::Sounds => self.sound_pointer = value,
            GameplaySection::Type64 => self.type64_pointer = value,
            GameplaySection::Type68 => self.type68_pointer = value,
            GameplaySection::Occlusion => self.occlusion_pointer = value,
            GameplaySection::TieIds => self.tie_id_pointer = value,
            GameplaySection::ShrubIds => self.shrub_id_pointer = value,
            GameplaySection::MobyIds => self.moby_id_pointer = value,
            GameplaySection::Type7C => self.type7c_pointer = value,
            GameplaySection::Type80 => self.type80_pointer = value,
            GameplaySection::Areas => self.area_pointer = value,
            GameplaySection::Type88 => self.type88_pointer = value,
            GameplaySection::Unk8C => self.unk8c_pointer = value,
            GameplaySection::Unk90 => self.unk90_pointer = value,
            GameplaySection::Unk94 => self.unk94_pointer = value,
            GameplaySection::Unk98 => self.unk98_pointer = value,
            GameplaySection::Unk9C => self.unk9c_pointer = value,
        }
    }

    /// See `EngineHeader::end_of`.
    pub fn end_of(&self, game: GameVariant, section: GameplaySection, file_len: u32) -> u32 {
        let order = game::gameplay_order(game);
        let Some(pos) = order.iter().position(|&s| s == section) else {
            return file_len;
        };
        for &later in &order[pos + 1..] {
            let p = self.pointer(later);
            if p != 0 {
                return p;
            }
        }
        file_len
    }

    /// Length of `section` by adjacent-pointer subtraction. 0 when absent.
    pub fn section_len(
        &self,
        game: GameVariant,
        section: GameplaySection,
        file_len: u32,
    ) -> Result<i64> {
        let start = self.pointer(section);
        if start == 0 {
            return Ok(0);
        }
        let len = self.end_of(game, section, file_len) as i64 - start as i64;
        if len < 0 {
            return Err(LevelError::InvariantViolation(format!(
                "gameplay section {:?} at 0x{:X} has negative inferred length {}",
                section, start, len
            )));
        }
        Ok(len)
    }

    /// Number of pvar table entries, inferred from the gap between the table
    /// and the data it points into.
    pub fn pvar_count(&self) -> Result<usize> {
        super::pvar_span_count(self.pvar_table_pointer, self.pvar_data_pointer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header(game: GameVariant) -> GameplayHeader {
        // Pointers ascending in canonical order, the way the serializer
        // would lay them out.
        let mut h = GameplayHeader::default();
        for (i, &section) in game::gameplay_order(game).iter().enumerate() {
            h.set_pointer(section, 0x100 + (i as u32) * 0x40);
        }
        h
    }

    #[test]
    fn write_then_read_round_trips_per_game() {
        for game in GameVariant::ALL {
            let h = sample_header(game);
            let block = h.write(game);
            assert_eq!(block.len(), 0xA0);
            let back = GameplayHeader::read(&block, game).unwrap();
            assert_eq!(back, h, "mismatch for {:?}", game);
        }
    }

    #[test]
    fn field_positions_follow_the_layout_tables() {
        let mut h = GameplayHeader::default();
        h.english_pointer = 0xAAAA;
        h.moby_pointer = 0xBBBB;
        h.pvar_table_pointer = 0xCCCC;

        let rc1 = h.write(GameVariant::Rc1);
        assert_eq!(bytes::read_u32(&rc1, 0x00).unwrap(), 0xAAAA);

        let rc2 = h.write(GameVariant::Rc2);
        assert_eq!(bytes::read_u32(&rc2, 0x10).unwrap(), 0xAAAA);
        assert_eq!(bytes::read_u32(&rc2, 0x30).unwrap(), 0xBBBB);

        let dl = h.write(GameVariant::Dl);
        assert_eq!(bytes::read_u32(&dl, 0x10).unwrap(), 0xCCCC);
        assert_eq!(bytes::read_u32(&dl, 0x40).unwrap(), 0xBBBB);
    }

    #[test]
    fn rc1_reserved_tail_stays_zero() {
        let h = sample_header(GameVariant::Rc1);
        let block = h.write(GameVariant::Rc1);
        assert_eq!(bytes::read_u32(&block, 0x98).unwrap(), 0);
        assert_eq!(bytes::read_u32(&block, 0x9C).unwrap(), 0);
    }

    #[test]
    fn pvar_count_comes_from_pointer_subtraction() {
        let mut h = GameplayHeader::default();
        h.pvar_table_pointer = 0x1000;
        h.pvar_data_pointer = 0x1000 + 3 * 8;
        assert_eq!(h.pvar_count().unwrap(), 3);

        h.pvar_table_pointer = 0;
        assert_eq!(h.pvar_count().unwrap(), 0);
    }

    #[test]
    fn inverted_pvar_pointers_are_an_invariant_violation() {
        let mut h = GameplayHeader::default();
        h.pvar_table_pointer = 0x2000;
        h.pvar_data_pointer = 0x1000;
        match h.pvar_count() {
            Err(LevelError::InvariantViolation(_)) => {}
            other => panic!("expected InvariantViolation, got {:?}", other),
        }
    }
}
