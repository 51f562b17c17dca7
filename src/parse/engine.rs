//! Engine file reader.
//!
//! Everything hangs off the header: counted sections read through their
//! pointer/count pairs, opaque sections take their length from the
//! adjacent-pointer subtraction, and pointer 0 stays empty/None. Texture
//! entries come out with no texel bytes; the vram blob is sliced in later
//! by `Level::load`.

use crate::bytes;
use crate::error::Result;
use crate::game::{EngineSection, GameVariant};
use crate::headers::engine::{self, EngineHeader};
use crate::models::animation::read_animation_table;
use crate::models::moby_model::read_model_table;
use crate::models::shrub_model::read_shrub_models;
use crate::models::tie_model::read_tie_models;
use crate::models::{
    self, Animation, Light, MobyModelEntry, ShrubModel, Skybox, Terrain, TexConfig, Texture,
    TieModel,
};
use crate::objects::{self, OpaqueBlob, Shrub, Tie};
use crate::parse;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineFile {
    pub moby_models: Vec<MobyModelEntry>,
    pub render_def: OpaqueBlob,
    pub tie_models: Vec<TieModel>,
    pub ties: Vec<Tie>,
    pub shrub_models: Vec<ShrubModel>,
    pub shrubs: Vec<Shrub>,
    pub terrain: Option<Terrain>,
    pub skybox: Option<Skybox>,
    pub collision: OpaqueBlob,
    pub player_animations: Vec<Option<Animation>>,
    pub sound_config: OpaqueBlob,
    pub lights: Vec<Light>,
    pub light_config: OpaqueBlob,
    /// Entries only; `data` is filled from vram by the caller.
    pub textures: Vec<Texture>,
    pub texture_config_menu: Vec<TexConfig>,
    pub texture_2d: OpaqueBlob,
    pub ui_elements: OpaqueBlob,
    pub unk64: OpaqueBlob,
    pub unk68: OpaqueBlob,
    pub unk6c: OpaqueBlob,
    pub unk70: OpaqueBlob,
    pub unk90: OpaqueBlob,
    pub unk94: OpaqueBlob,
    /// Opaque header scalars at 0x74.
    pub unk74: [u32; 7],
    pub unk98: u32,
    pub unk9c: u32,
}

fn opaque(
    data: &[u8],
    header: &EngineHeader,
    game: GameVariant,
    section: EngineSection,
) -> Result<OpaqueBlob> {
    let pointer = header.pointer(section);
    if pointer == 0 {
        return Ok(OpaqueBlob::default());
    }
    let len = header.section_len(game, section, data.len() as u32)?;
    OpaqueBlob::from_block(data, pointer as usize, len as usize)
}

impl EngineFile {
    /// Parse a whole engine file. The variant comes from the magic; use
    /// [`engine::detect_game`] if only the variant is needed.
    pub fn read(data: &[u8]) -> Result<(GameVariant, EngineFile)> {
        let game = engine::detect_game(data)?;
        let header = EngineHeader::read(data, game)?;
        let file_len = data.len() as u32;

        let moby_models = if header.moby_model_pointer != 0 {
            let end = header.end_of(game, EngineSection::MobyModels, file_len);
            read_model_table(data, header.moby_model_pointer as usize, end, game)?
        } else {
            Vec::new()
        };
        let tie_models = if header.tie_model_pointer != 0 {
            read_tie_models(
                data,
                header.tie_model_pointer as usize,
                header.tie_model_count as usize,
            )?
        } else {
            Vec::new()
        };
        let ties = if header.tie_pointer != 0 {
            objects::read_table::<Tie>(
                parse::section(data, header.tie_pointer)?,
                header.tie_count as usize,
                game,
            )?
        } else {
            Vec::new()
        };
        let shrub_models = if header.shrub_model_pointer != 0 {
            read_shrub_models(
                data,
                header.shrub_model_pointer as usize,
                header.shrub_model_count as usize,
            )?
        } else {
            Vec::new()
        };
        let shrubs = if header.shrub_pointer != 0 {
            objects::read_table::<Shrub>(
                parse::section(data, header.shrub_pointer)?,
                header.shrub_count as usize,
                game,
            )?
        } else {
            Vec::new()
        };
        let terrain = if header.terrain_pointer != 0 {
            Some(Terrain::read(data, header.terrain_pointer as usize)?)
        } else {
            None
        };
        let skybox = if header.skybox_pointer != 0 {
            Some(Skybox::read(data, header.skybox_pointer as usize)?)
        } else {
            None
        };
        let player_animations = if header.player_anim_pointer != 0 {
            let at = header.player_anim_pointer as usize;
            let count = bytes::read_u32(data, at)? as usize;
            read_animation_table(data, at + 0x10, count)?
        } else {
            Vec::new()
        };
        let lights = if header.light_pointer != 0 {
            models::read_records(
                data,
                header.light_pointer as usize,
                header.light_count as usize,
                Light::LEN,
            )?
        } else {
            Vec::new()
        };
        let textures = if header.texture_pointer != 0 {
            models::read_records(
                data,
                header.texture_pointer as usize,
                header.texture_count as usize,
                Texture::LEN,
            )?
        } else {
            Vec::new()
        };
        let texture_config_menu = if header.texture_config_menu_pointer != 0 {
            models::read_records(
                data,
                header.texture_config_menu_pointer as usize,
                header.texture_config_menu_count as usize,
                TexConfig::LEN,
            )?
        } else {
            Vec::new()
        };

        Ok((
            game,
            EngineFile {
                moby_models,
                render_def: opaque(data, &header, game, EngineSection::RenderDef)?,
                tie_models,
                ties,
                shrub_models,
                shrubs,
                terrain,
                skybox,
                collision: opaque(data, &header, game, EngineSection::Collision)?,
                player_animations,
                sound_config: opaque(data, &header, game, EngineSection::SoundConfig)?,
                lights,
                light_config: opaque(data, &header, game, EngineSection::LightConfig)?,
                textures,
                texture_config_menu,
                texture_2d: opaque(data, &header, game, EngineSection::Texture2d)?,
                ui_elements: opaque(data, &header, game, EngineSection::UiElements)?,
                unk64: opaque(data, &header, game, EngineSection::Unk64)?,
                unk68: opaque(data, &header, game, EngineSection::Unk68)?,
                unk6c: opaque(data, &header, game, EngineSection::Unk6C)?,
                unk70: opaque(data, &header, game, EngineSection::Unk70)?,
                unk90: opaque(data, &header, game, EngineSection::Unk90)?,
                unk94: opaque(data, &header, game, EngineSection::Unk94)?,
                unk74: header.unk74,
                unk98: header.unk98,
                unk9c: header.unk9c,
            },
        ))
    }
}
