//! Game variant detection and the per-variant layout tables.
//!
//! Every size, field order, and alignment quirk that differs between the four
//! supported games lives here, keyed on [`GameVariant`]. The header readers,
//! the section length inference, and the serializers all consume the same
//! tables, so a layout change in one game touches exactly one place.

use crate::error::{LevelError, Result};

/// The four supported target games, detected from the engine header magic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameVariant {
    Rc1,
    Rc2,
    Rc3,
    Dl,
}

impl GameVariant {
    pub const ALL: [GameVariant; 4] = [
        GameVariant::Rc1,
        GameVariant::Rc2,
        GameVariant::Rc3,
        GameVariant::Dl,
    ];

    pub fn from_magic(magic: u32) -> Result<Self> {
        match magic {
            1 => Ok(GameVariant::Rc1),
            2 => Ok(GameVariant::Rc2),
            3 => Ok(GameVariant::Rc3),
            4 => Ok(GameVariant::Dl),
            other => Err(LevelError::UnsupportedVariant(other)),
        }
    }

    pub fn magic(self) -> u32 {
        match self {
            GameVariant::Rc1 => 1,
            GameVariant::Rc2 => 2,
            GameVariant::Rc3 => 3,
            GameVariant::Dl => 4,
        }
    }

    /// Engine header length in bytes.
    pub fn engine_header_len(self) -> usize {
        match self {
            GameVariant::Dl => 0xA0,
            _ => 0x90,
        }
    }

    /// Gameplay header length in bytes (same for all games).
    pub fn gameplay_header_len(self) -> usize {
        0xA0
    }

    /// Moby record stride.
    pub fn moby_len(self) -> usize {
        match self {
            GameVariant::Dl => 0x7C,
            _ => 0x78,
        }
    }

    /// Tie and shrub instance stride. The earliest game stores two 4x4
    /// blocks per instance instead of one.
    pub fn tie_len(self) -> usize {
        match self {
            GameVariant::Rc1 => 0xB0,
            _ => 0x70,
        }
    }

    /// True for the dual-matrix instance encoding (see `objects::tie`).
    pub fn has_dual_matrix_instances(self) -> bool {
        self == GameVariant::Rc1
    }

    /// Interleaved moby vertex stride in bytes.
    pub fn moby_vertex_stride(self) -> usize {
        match self {
            GameVariant::Rc1 => 0x20,
            _ => 0x28,
        }
    }

    /// Size of the level-variables block in the gameplay file.
    pub fn level_vars_len(self) -> usize {
        match self {
            GameVariant::Rc1 => 0x50,
            GameVariant::Rc2 | GameVariant::Rc3 => 0x58,
            GameVariant::Dl => 0x60,
        }
    }

    /// Alignment for the key/value sections (type50/type5C). One game packs
    /// them on 4-byte boundaries instead of the usual 0x10.
    pub fn kv_align(self) -> u64 {
        match self {
            GameVariant::Dl => 0x04,
            _ => 0x10,
        }
    }
}

// ============================================================================
// Engine file sections
// ============================================================================

/// Every pointer-addressed section of the engine file. Count-bearing sections
/// carry their counts in separate header fields; see `headers::engine`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineSection {
    MobyModels,
    RenderDef,
    TieModels,
    Ties,
    ShrubModels,
    Shrubs,
    Terrain,
    Skybox,
    Collision,
    PlayerAnimations,
    SoundConfig,
    Lights,
    LightConfig,
    Textures,
    TextureConfigMenu,
    Texture2d,
    UiElements,
    Unk64,
    Unk68,
    Unk6C,
    Unk70,
    // Trailing sections present only in the fourth game.
    Unk90,
    Unk94,
}

const ENGINE_ORDER_RC1: &[EngineSection] = &[
    EngineSection::MobyModels,
    EngineSection::RenderDef,
    EngineSection::Terrain,
    EngineSection::Skybox,
    EngineSection::Collision,
    EngineSection::PlayerAnimations,
    EngineSection::TieModels,
    EngineSection::Ties,
    EngineSection::ShrubModels,
    EngineSection::Shrubs,
    EngineSection::SoundConfig,
    EngineSection::Lights,
    EngineSection::LightConfig,
    EngineSection::Textures,
    EngineSection::TextureConfigMenu,
    EngineSection::Texture2d,
    EngineSection::UiElements,
    EngineSection::Unk64,
    EngineSection::Unk68,
    EngineSection::Unk6C,
    EngineSection::Unk70,
];

const ENGINE_ORDER_RC23: &[EngineSection] = &[
    EngineSection::MobyModels,
    EngineSection::RenderDef,
    EngineSection::TieModels,
    EngineSection::Ties,
    EngineSection::ShrubModels,
    EngineSection::Shrubs,
    EngineSection::Terrain,
    EngineSection::Skybox,
    EngineSection::Collision,
    EngineSection::PlayerAnimations,
    EngineSection::SoundConfig,
    EngineSection::Lights,
    EngineSection::LightConfig,
    EngineSection::Textures,
    EngineSection::TextureConfigMenu,
    EngineSection::Texture2d,
    EngineSection::UiElements,
    EngineSection::Unk64,
    EngineSection::Unk68,
    EngineSection::Unk6C,
    EngineSection::Unk70,
];

const ENGINE_ORDER_DL: &[EngineSection] = &[
    EngineSection::MobyModels,
    EngineSection::RenderDef,
    EngineSection::TieModels,
    EngineSection::Ties,
    EngineSection::ShrubModels,
    EngineSection::Shrubs,
    EngineSection::Terrain,
    EngineSection::Skybox,
    EngineSection::Collision,
    EngineSection::PlayerAnimations,
    EngineSection::SoundConfig,
    EngineSection::Lights,
    EngineSection::LightConfig,
    EngineSection::Textures,
    EngineSection::TextureConfigMenu,
    EngineSection::Texture2d,
    EngineSection::UiElements,
    EngineSection::Unk64,
    EngineSection::Unk68,
    EngineSection::Unk6C,
    EngineSection::Unk70,
    EngineSection::Unk90,
    EngineSection::Unk94,
];

/// Canonical engine section order for a game. Both the reader's length
/// inference and the writer's layout pass walk this list, which keeps the
/// adjacent-pointer subtraction consistent with the file actually written.
pub fn engine_order(game: GameVariant) -> &'static [EngineSection] {
    match game {
        GameVariant::Rc1 => ENGINE_ORDER_RC1,
        GameVariant::Rc2 | GameVariant::Rc3 => ENGINE_ORDER_RC23,
        GameVariant::Dl => ENGINE_ORDER_DL,
    }
}

// ============================================================================
// Gameplay file sections
// ============================================================================

/// Every pointer-addressed section of the gameplay file. The `TypeNN` names
/// follow the field offsets of the canonical (second/third game) header
/// layout; their record shapes are only partially identified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameplaySection {
    LevelVars,
    Type04,
    Cameras,
    Type0C,
    English,
    UkEnglish,
    French,
    German,
    Spanish,
    Italian,
    Japanese,
    Korean,
    Mobys,
    MobyGroups,
    GlobalPvars,
    PvarTable,
    PvarData,
    Cuboids,
    Spheres,
    Cylinders,
    Type50,
    Splines,
    GrindPaths,
    Type5C,
    Sounds,
    Type64,
    Type68,
    Occlusion,
    TieIds,
    ShrubIds,
    MobyIds,
    Type7C,
    Type80,
    Areas,
    Type88,
    Unk8C,
    Unk90,
    Unk94,
    Unk98,
    Unk9C,
}

/// The eight language tables in slot order. Indexes into
/// `GameplayFile::languages`.
pub const LANGUAGE_SECTIONS: [GameplaySection; 8] = [
    GameplaySection::English,
    GameplaySection::UkEnglish,
    GameplaySection::French,
    GameplaySection::German,
    GameplaySection::Spanish,
    GameplaySection::Italian,
    GameplaySection::Japanese,
    GameplaySection::Korean,
];

const GAMEPLAY_ORDER_RC1: &[GameplaySection] = &[
    GameplaySection::English,
    GameplaySection::UkEnglish,
    GameplaySection::French,
    GameplaySection::German,
    GameplaySection::Spanish,
    GameplaySection::Italian,
    GameplaySection::Japanese,
    GameplaySection::Korean,
    GameplaySection::LevelVars,
    GameplaySection::Type04,
    GameplaySection::Cameras,
    GameplaySection::Type0C,
    GameplaySection::Mobys,
    GameplaySection::MobyGroups,
    GameplaySection::GlobalPvars,
    GameplaySection::PvarTable,
    GameplaySection::PvarData,
    GameplaySection::Cuboids,
    GameplaySection::Spheres,
    GameplaySection::Cylinders,
    GameplaySection::Type50,
    GameplaySection::Splines,
    GameplaySection::GrindPaths,
    GameplaySection::Type5C,
    GameplaySection::Sounds,
    GameplaySection::Occlusion,
    GameplaySection::TieIds,
    GameplaySection::ShrubIds,
    GameplaySection::MobyIds,
    GameplaySection::Type7C,
    GameplaySection::Type80,
    GameplaySection::Areas,
    GameplaySection::Type88,
    GameplaySection::Unk8C,
    GameplaySection::Unk90,
    GameplaySection::Unk94,
    GameplaySection::Unk98,
    GameplaySection::Unk9C,
];

const GAMEPLAY_ORDER_RC23: &[GameplaySection] = &[
    GameplaySection::LevelVars,
    GameplaySection::Type04,
    GameplaySection::Cameras,
    GameplaySection::Type0C,
    GameplaySection::English,
    GameplaySection::UkEnglish,
    GameplaySection::French,
    GameplaySection::German,
    GameplaySection::Spanish,
    GameplaySection::Italian,
    GameplaySection::Japanese,
    GameplaySection::Korean,
    GameplaySection::Mobys,
    GameplaySection::MobyGroups,
    GameplaySection::GlobalPvars,
    GameplaySection::PvarTable,
    GameplaySection::PvarData,
    GameplaySection::Cuboids,
    GameplaySection::Spheres,
    GameplaySection::Cylinders,
    GameplaySection::Type50,
    GameplaySection::Splines,
    GameplaySection::GrindPaths,
    GameplaySection::Type5C,
    GameplaySection::Sounds,
    GameplaySection::Type64,
    GameplaySection::Type68,
    GameplaySection::Occlusion,
    GameplaySection::TieIds,
    GameplaySection::ShrubIds,
    GameplaySection::MobyIds,
    GameplaySection::Type7C,
    GameplaySection::Type80,
    GameplaySection::Areas,
    GameplaySection::Type88,
    GameplaySection::Unk8C,
    GameplaySection::Unk90,
    GameplaySection::Unk94,
    GameplaySection::Unk98,
    GameplaySection::Unk9C,
];

const GAMEPLAY_ORDER_DL: &[GameplaySection] = &[
    GameplaySection::LevelVars,
    GameplaySection::Type04,
    GameplaySection::MobyGroups,
    GameplaySection::GlobalPvars,
    GameplaySection::PvarTable,
    GameplaySection::PvarData,
    GameplaySection::Cameras,
    GameplaySection::Type0C,
    GameplaySection::English,
    GameplaySection::UkEnglish,
    GameplaySection::French,
    GameplaySection::German,
    GameplaySection::Spanish,
    GameplaySection::Italian,
    GameplaySection::Japanese,
    GameplaySection::Korean,
    GameplaySection::Mobys,
    GameplaySection::Cuboids,
    GameplaySection::Spheres,
    GameplaySection::Cylinders,
    GameplaySection::Type50,
    GameplaySection::Splines,
    GameplaySection::GrindPaths,
    GameplaySection::Type5C,
    GameplaySection::Sounds,
    GameplaySection::Type64,
    GameplaySection::Type68,
    GameplaySection::Occlusion,
    GameplaySection::TieIds,
    GameplaySection::ShrubIds,
    GameplaySection::MobyIds,
    GameplaySection::Type7C,
    GameplaySection::Type80,
    GameplaySection::Areas,
    GameplaySection::Type88,
    GameplaySection::Unk8C,
    GameplaySection::Unk90,
    GameplaySection::Unk94,
    GameplaySection::Unk98,
    GameplaySection::Unk9C,
];

/// Canonical gameplay section order for a game. See [`engine_order`].
pub fn gameplay_order(game: GameVariant) -> &'static [GameplaySection] {
    match game {
        GameVariant::Rc1 => GAMEPLAY_ORDER_RC1,
        GameVariant::Rc2 | GameVariant::Rc3 => GAMEPLAY_ORDER_RC23,
        GameVariant::Dl => GAMEPLAY_ORDER_DL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_round_trips_for_all_games() {
        for game in GameVariant::ALL {
            assert_eq!(GameVariant::from_magic(game.magic()).unwrap(), game);
        }
    }

    #[test]
    fn unknown_magic_is_rejected() {
        match GameVariant::from_magic(9) {
            Err(LevelError::UnsupportedVariant(9)) => {}
            other => panic!("expected UnsupportedVariant, got {:?}", other),
        }
    }

    #[test]
    fn gameplay_orders_cover_the_header() {
        // Every order fits the 0xA0-byte header's 40 pointer slots.
        assert_eq!(GAMEPLAY_ORDER_RC23.len(), 40);
        assert_eq!(GAMEPLAY_ORDER_DL.len(), 40);
        assert_eq!(GAMEPLAY_ORDER_RC1.len(), 38);
    }

    #[test]
    fn first_game_has_no_kv_alignment_quirk() {
        assert_eq!(GameVariant::Rc1.kv_align(), 0x10);
        assert_eq!(GameVariant::Dl.kv_align(), 0x04);
    }
}
