//! Side container writers: armor/gadget model files and mission files.
//!
//! Model blocks land between the slot table and the texture table, so the
//! reader's block-span inference stays valid for files written here.

use crate::error::Result;
use crate::game::GameVariant;
use crate::headers::{MissionHeader, SideModelHeader};
use crate::models::moby_model::write_model_slots;
use crate::models::{self, Texture};
use crate::objects;
use crate::parse::side::{MissionFile, SideModelFile};
use crate::serialize::cursor::SectionWriter;
use crate::serialize::{block, write_pvar_sections};

/// Counted texture entry table: `[count][pad][count * 0x24 records]`.
fn write_texture_table(w: &mut SectionWriter, textures: &[Texture]) -> Result<u32> {
    if textures.is_empty() {
        return Ok(0);
    }
    let at = w.begin_section(0x10);
    w.put_u32(textures.len() as u32);
    w.align_to(0x10);
    models::write_records(&mut w.buf, textures)?;
    Ok(at)
}

pub fn write_side_model(file: &SideModelFile, game: GameVariant) -> Result<Vec<u8>> {
    let mut w = SectionWriter::new();
    w.reserve(SideModelHeader::LEN);

    let model_table_pointer = if file.models.is_empty() {
        0
    } else {
        write_model_slots(&mut w, &file.models, game)?
    };
    let texture_table_pointer = write_texture_table(&mut w, &file.textures)?;

    let header = SideModelHeader {
        model_table_pointer,
        texture_table_pointer,
        unk08: file.unk08,
        unk0c: file.unk0c,
    };
    let mut head = Vec::new();
    models::write_record(&mut head, &header)?;
    w.patch(0, &head);
    Ok(w.into_bytes())
}

pub fn write_mission(file: &MissionFile, game: GameVariant) -> Result<Vec<u8>> {
    let mut w = SectionWriter::new();
    w.reserve(MissionHeader::LEN);

    let moby_pointer = if file.mobys.is_empty() {
        0
    } else {
        block(&mut w, 0x10, &objects::write_counted(&file.mobys, game))
    };
    let (pvar_table_pointer, pvar_data_pointer) = write_pvar_sections(&mut w, &file.pvars);
    let texture_pointer = write_texture_table(&mut w, &file.textures)?;

    let header = MissionHeader {
        moby_pointer,
        pvar_table_pointer,
        pvar_data_pointer,
        texture_pointer,
    };
    let mut head = Vec::new();
    models::write_record(&mut head, &header)?;
    w.patch(0, &head);
    Ok(w.into_bytes())
}
