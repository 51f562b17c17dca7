//! Side container readers: the armor, gadget, and mission files that ship
//! alongside a level. Armor and gadget share one layout; missions carry
//! their own mobys and pvars.

use crate::bytes;
use crate::error::Result;
use crate::game::GameVariant;
use crate::headers::{MissionHeader, SideModelHeader};
use crate::models::moby_model::read_model_slots;
use crate::models::{self, MobyModel, Texture};
use crate::objects::{self, Moby};
use crate::parse;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SideModelFile {
    pub models: Vec<Option<MobyModel>>,
    pub textures: Vec<Texture>,
    pub unk08: u32,
    pub unk0c: u32,
}

impl SideModelFile {
    pub fn read(data: &[u8], game: GameVariant) -> Result<SideModelFile> {
        let header: SideModelHeader = models::read_record(data, 0)?;
        // Model blocks sit between the two tables, so the texture table (or
        // the end of the file) bounds the last block.
        let end = if header.texture_table_pointer != 0 {
            header.texture_table_pointer
        } else {
            data.len() as u32
        };
        let slots = if header.model_table_pointer != 0 {
            read_model_slots(data, header.model_table_pointer as usize, end, game)?
        } else {
            Vec::new()
        };
        Ok(SideModelFile {
            models: slots,
            textures: read_texture_table(data, header.texture_table_pointer)?,
            unk08: header.unk08,
            unk0c: header.unk0c,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MissionFile {
    pub mobys: Vec<Moby>,
    pub pvars: Vec<Vec<u8>>,
    pub textures: Vec<Texture>,
}

impl MissionFile {
    pub fn read(data: &[u8], game: GameVariant) -> Result<MissionFile> {
        let header: MissionHeader = models::read_record(data, 0)?;
        let mobys = if header.moby_pointer != 0 {
            objects::read_counted(parse::section(data, header.moby_pointer)?, game)?
        } else {
            Vec::new()
        };
        let pvars = parse::read_pvars(
            data,
            header.pvar_table_pointer,
            header.pvar_data_pointer,
            header.pvar_count()?,
        )?;
        Ok(MissionFile {
            mobys,
            pvars,
            textures: read_texture_table(data, header.texture_pointer)?,
        })
    }
}

/// Counted texture entry table: `[count][pad][count * 0x24 records]`.
fn read_texture_table(data: &[u8], pointer: u32) -> Result<Vec<Texture>> {
    if pointer == 0 {
        return Ok(Vec::new());
    }
    let at = pointer as usize;
    let count = bytes::read_u32(data, at)? as usize;
    models::read_records(data, at + 0x10, count, Texture::LEN)
}
