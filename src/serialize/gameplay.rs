//! Gameplay file writer.
//!
//! Walks the canonical section order for the game, appends each non-empty
//! section at a 0x10 boundary (the key/value maps use the per-game
//! alignment), and patches the pointer table last. The pvar table and data
//! are laid out together so their pointer gap encodes the entry count.

use crate::error::Result;
use crate::game::{self, GameVariant, GameplaySection};
use crate::headers::GameplayHeader;
use crate::objects::spline::write_spline_section;
use crate::objects::{self, GameRecord, KeyValueMap, LanguageTable, SizedBlob};
use crate::parse::gameplay::GameplayFile;
use crate::serialize::cursor::SectionWriter;
use crate::serialize::{block, opaque_block, write_pvar_sections};

fn counted<T: GameRecord>(w: &mut SectionWriter, list: &[T], game: GameVariant) -> u32 {
    if list.is_empty() {
        return 0;
    }
    block(w, 0x10, &objects::write_counted(list, game))
}

fn ids(w: &mut SectionWriter, list: &[u32]) -> u32 {
    if list.is_empty() {
        return 0;
    }
    block(w, 0x10, &objects::write_counted_u32s(list))
}

fn kv_map(w: &mut SectionWriter, map: &KeyValueMap, game: GameVariant) -> u32 {
    if map.is_empty() {
        return 0;
    }
    block(w, game.kv_align() as usize, &map.encode())
}

fn sized(w: &mut SectionWriter, blob: &SizedBlob) -> u32 {
    if blob.is_empty() {
        return 0;
    }
    block(w, 0x10, &blob.encode())
}

fn language(w: &mut SectionWriter, table: &LanguageTable) -> u32 {
    if table.is_empty() {
        return 0;
    }
    block(w, 0x10, &table.encode())
}

pub fn write_gameplay(file: &GameplayFile, game: GameVariant) -> Result<Vec<u8>> {
    let mut w = SectionWriter::new();
    let mut header = GameplayHeader::default();
    w.reserve(game.gameplay_header_len());

    for &section in game::gameplay_order(game) {
        let pointer = match section {
            GameplaySection::LevelVars => match &file.level_vars {
                Some(vars) => block(&mut w, 0x10, &vars.encode()),
                None => 0,
            },
            GameplaySection::Type04 => counted(&mut w, &file.type04, game),
            GameplaySection::Cameras => counted(&mut w, &file.cameras, game),
            GameplaySection::Type0C => counted(&mut w, &file.type0c, game),
            GameplaySection::English => language(&mut w, &file.languages[0]),
            GameplaySection::UkEnglish => language(&mut w, &file.languages[1]),
            GameplaySection::French => language(&mut w, &file.languages[2]),
            GameplaySection::German => language(&mut w, &file.languages[3]),
            GameplaySection::Spanish => language(&mut w, &file.languages[4]),
            GameplaySection::Italian => language(&mut w, &file.languages[5]),
            GameplaySection::Japanese => language(&mut w, &file.languages[6]),
            GameplaySection::Korean => language(&mut w, &file.languages[7]),
            GameplaySection::Mobys => counted(&mut w, &file.mobys, game),
            GameplaySection::MobyGroups => opaque_block(&mut w, &file.moby_groups),
            GameplaySection::GlobalPvars => opaque_block(&mut w, &file.global_pvars),
            GameplaySection::PvarTable => {
                let (table, data) = write_pvar_sections(&mut w, &file.pvars);
                header.set_pointer(GameplaySection::PvarData, data);
                table
            }
            // Patched alongside the table; the two must stay adjacent.
            GameplaySection::PvarData => continue,
            GameplaySection::Cuboids => counted(&mut w, &file.cuboids, game),
            GameplaySection::Spheres => counted(&mut w, &file.spheres, game),
            GameplaySection::Cylinders => counted(&mut w, &file.cylinders, game),
            GameplaySection::Type50 => kv_map(&mut w, &file.type50, game),
            GameplaySection::Splines => {
                if file.splines.is_empty() {
                    0
                } else {
                    block(
                        &mut w,
                        0x10,
                        &write_spline_section(&file.splines, file.spline_unk04),
                    )
                }
            }
            GameplaySection::GrindPaths => opaque_block(&mut w, &file.grind_paths),
            GameplaySection::Type5C => kv_map(&mut w, &file.type5c, game),
            GameplaySection::Sounds => opaque_block(&mut w, &file.sounds),
            GameplaySection::Type64 => sized(&mut w, &file.type64),
            GameplaySection::Type68 => sized(&mut w, &file.type68),
            GameplaySection::Occlusion => match &file.occlusion {
                Some(occlusion) => block(&mut w, 0x10, &occlusion.encode()),
                None => 0,
            },
            GameplaySection::TieIds => ids(&mut w, &file.tie_ids),
            GameplaySection::ShrubIds => ids(&mut w, &file.shrub_ids),
            GameplaySection::MobyIds => ids(&mut w, &file.moby_ids),
            GameplaySection::Type7C => counted(&mut w, &file.type7c, game),
            GameplaySection::Type80 => counted(&mut w, &file.type80, game),
            GameplaySection::Areas => opaque_block(&mut w, &file.areas),
            GameplaySection::Type88 => sized(&mut w, &file.type88),
            GameplaySection::Unk8C => opaque_block(&mut w, &file.unk8c),
            GameplaySection::Unk90 => opaque_block(&mut w, &file.unk90),
            GameplaySection::Unk94 => opaque_block(&mut w, &file.unk94),
            GameplaySection::Unk98 => opaque_block(&mut w, &file.unk98),
            GameplaySection::Unk9C => opaque_block(&mut w, &file.unk9c),
        };
        header.set_pointer(section, pointer);
    }

    // No trailing padding: a tail section read back by pointer subtraction
    // must see exactly the bytes written for it.
    w.patch(0, &header.write(game));
    Ok(w.into_bytes())
}
