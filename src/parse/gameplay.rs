//! Gameplay file reader.
//!
//! The header is a bare pointer table, so every section is typed here:
//! counted record lists, sentinel-terminated key/value maps, self-sized
//! blobs, the eight language tables, and the pvar table/data pair whose
//! entry count comes from pointer subtraction.

use crate::error::Result;
use crate::game::{GameVariant, GameplaySection, LANGUAGE_SECTIONS};
use crate::headers::GameplayHeader;
use crate::objects::spline::read_spline_section;
use crate::objects::{
    self, Camera, KeyValueMap, LanguageTable, LevelVariables, MatrixEntity, Moby, Occlusion,
    OpaqueBlob, RawEntity, SizedBlob, Spline, Volume,
};
use crate::parse;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameplayFile {
    pub level_vars: Option<LevelVariables>,
    pub type04: Vec<RawEntity>,
    pub cameras: Vec<Camera>,
    pub type0c: Vec<MatrixEntity>,
    pub languages: [LanguageTable; 8],
    pub mobys: Vec<Moby>,
    pub moby_groups: OpaqueBlob,
    pub global_pvars: OpaqueBlob,
    pub pvars: Vec<Vec<u8>>,
    pub cuboids: Vec<Volume>,
    pub spheres: Vec<Volume>,
    pub cylinders: Vec<Volume>,
    pub type50: KeyValueMap,
    pub splines: Vec<Spline>,
    pub spline_unk04: u32,
    pub grind_paths: OpaqueBlob,
    pub type5c: KeyValueMap,
    pub sounds: OpaqueBlob,
    pub type64: SizedBlob,
    pub type68: SizedBlob,
    pub occlusion: Option<Occlusion>,
    pub tie_ids: Vec<u32>,
    pub shrub_ids: Vec<u32>,
    pub moby_ids: Vec<u32>,
    pub type7c: Vec<RawEntity>,
    pub type80: Vec<RawEntity>,
    pub areas: OpaqueBlob,
    pub type88: SizedBlob,
    pub unk8c: OpaqueBlob,
    pub unk90: OpaqueBlob,
    pub unk94: OpaqueBlob,
    pub unk98: OpaqueBlob,
    pub unk9c: OpaqueBlob,
}

fn opaque(
    data: &[u8],
    header: &GameplayHeader,
    game: GameVariant,
    section: GameplaySection,
) -> Result<OpaqueBlob> {
    let pointer = header.pointer(section);
    if pointer == 0 {
        return Ok(OpaqueBlob::default());
    }
    let len = header.section_len(game, section, data.len() as u32)?;
    OpaqueBlob::from_block(data, pointer as usize, len as usize)
}

fn counted<T: objects::GameRecord>(
    data: &[u8],
    pointer: u32,
    game: GameVariant,
) -> Result<Vec<T>> {
    if pointer == 0 {
        return Ok(Vec::new());
    }
    objects::read_counted(parse::section(data, pointer)?, game)
}

impl GameplayFile {
    pub fn read(data: &[u8], game: GameVariant) -> Result<GameplayFile> {
        let header = GameplayHeader::read(data, game)?;

        let level_vars = if header.level_var_pointer != 0 {
            Some(LevelVariables::decode(
                parse::section(data, header.level_var_pointer)?,
                game,
            )?)
        } else {
            None
        };
        let mut languages: [LanguageTable; 8] = Default::default();
        for (slot, &section) in languages.iter_mut().zip(LANGUAGE_SECTIONS.iter()) {
            let pointer = header.pointer(section);
            if pointer != 0 {
                *slot = LanguageTable::decode(parse::section(data, pointer)?)?;
            }
        }
        let (splines, spline_unk04) = if header.spline_pointer != 0 {
            read_spline_section(parse::section(data, header.spline_pointer)?)?
        } else {
            (Vec::new(), 0)
        };
        let type50 = if header.type50_pointer != 0 {
            KeyValueMap::decode(parse::section(data, header.type50_pointer)?)?
        } else {
            KeyValueMap::default()
        };
        let type5c = if header.type5c_pointer != 0 {
            KeyValueMap::decode(parse::section(data, header.type5c_pointer)?)?
        } else {
            KeyValueMap::default()
        };
        let occlusion = if header.occlusion_pointer != 0 {
            Some(Occlusion::decode(parse::section(data, header.occlusion_pointer)?)?)
        } else {
            None
        };

        let sized = |pointer: u32| -> Result<SizedBlob> {
            if pointer == 0 {
                Ok(SizedBlob::default())
            } else {
                SizedBlob::decode(parse::section(data, pointer)?)
            }
        };
        let ids = |pointer: u32| -> Result<Vec<u32>> {
            if pointer == 0 {
                Ok(Vec::new())
            } else {
                objects::read_counted_u32s(parse::section(data, pointer)?)
            }
        };

        Ok(GameplayFile {
            level_vars,
            type04: counted(data, header.type04_pointer, game)?,
            cameras: counted(data, header.camera_pointer, game)?,
            type0c: counted(data, header.type0c_pointer, game)?,
            languages,
            mobys: counted(data, header.moby_pointer, game)?,
            moby_groups: opaque(data, &header, game, GameplaySection::MobyGroups)?,
            global_pvars: opaque(data, &header, game, GameplaySection::GlobalPvars)?,
            pvars: parse::read_pvars(
                data,
                header.pvar_table_pointer,
                header.pvar_data_pointer,
                header.pvar_count()?,
            )?,
            cuboids: counted(data, header.cuboid_pointer, game)?,
            spheres: counted(data, header.sphere_pointer, game)?,
            cylinders: counted(data, header.cylinder_pointer, game)?,
            type50,
            splines,
            spline_unk04,
            grind_paths: opaque(data, &header, game, GameplaySection::GrindPaths)?,
            type5c,
            sounds: opaque(data, &header, game, GameplaySection::Sounds)?,
            type64: sized(header.type64_pointer)?,
            type68: sized(header.type68_pointer)?,
            occlusion,
            tie_ids: ids(header.tie_id_pointer)?,
            shrub_ids: ids(header.shrub_id_pointer)?,
            moby_ids: ids(header.moby_id_pointer)?,
            type7c: counted(data, header.type7c_pointer, game)?,
            type80: counted(data, header.type80_pointer, game)?,
            areas: opaque(data, &header, game, GameplaySection::Areas)?,
            type88: sized(header.type88_pointer)?,
            unk8c: opaque(data, &header, game, GameplaySection::Unk8C)?,
            unk90: opaque(data, &header, game, GameplaySection::Unk90)?,
            unk94: opaque(data, &header, game, GameplaySection::Unk94)?,
            unk98: opaque(data, &header, game, GameplaySection::Unk98)?,
            unk9c: opaque(data, &header, game, GameplaySection::Unk9C)?,
        })
    }
}
