//! Engine file writer.
//!
//! Walks the canonical section order for the game and appends each
//! non-empty section at a 0x10 boundary; the model containers lay out
//! their own interior pointers. Table counts land in the header slot next
//! to their pointer, and the header block reserved at offset 0 is patched
//! last.

use binrw::BinWrite;

use crate::error::Result;
use crate::game::{self, EngineSection, GameVariant};
use crate::headers::engine::EngineHeader;
use crate::models;
use crate::models::animation::append_animation_table;
use crate::models::moby_model::write_model_table;
use crate::models::shrub_model::write_shrub_models;
use crate::models::tie_model::write_tie_models;
use crate::objects;
use crate::parse::engine::EngineFile;
use crate::serialize::cursor::SectionWriter;
use crate::serialize::{block, opaque_block};

/// Bare record run with no count framing; the count lives in the header.
fn records<T>(w: &mut SectionWriter, items: &[T]) -> Result<u32>
where
    T: for<'a> BinWrite<Args<'a> = ()>,
{
    if items.is_empty() {
        return Ok(0);
    }
    let at = w.begin_section(0x10);
    models::write_records(&mut w.buf, items)?;
    Ok(at)
}

pub fn write_engine(file: &EngineFile, game: GameVariant) -> Result<Vec<u8>> {
    let mut w = SectionWriter::new();
    let mut header = EngineHeader {
        unk74: file.unk74,
        unk98: file.unk98,
        unk9c: file.unk9c,
        ..Default::default()
    };
    w.reserve(game.engine_header_len());

    for &section in game::engine_order(game) {
        let pointer = match section {
            EngineSection::MobyModels => {
                if file.moby_models.is_empty() {
                    0
                } else {
                    write_model_table(&mut w, &file.moby_models, game)?
                }
            }
            EngineSection::RenderDef => opaque_block(&mut w, &file.render_def),
            EngineSection::TieModels => {
                header.tie_model_count = file.tie_models.len() as u32;
                if file.tie_models.is_empty() {
                    0
                } else {
                    write_tie_models(&mut w, &file.tie_models)?
                }
            }
            EngineSection::Ties => {
                header.tie_count = file.ties.len() as u32;
                block(&mut w, 0x10, &objects::write_table(&file.ties, game))
            }
            EngineSection::ShrubModels => {
                header.shrub_model_count = file.shrub_models.len() as u32;
                if file.shrub_models.is_empty() {
                    0
                } else {
                    write_shrub_models(&mut w, &file.shrub_models)?
                }
            }
            EngineSection::Shrubs => {
                header.shrub_count = file.shrubs.len() as u32;
                block(&mut w, 0x10, &objects::write_table(&file.shrubs, game))
            }
            EngineSection::Terrain => match &file.terrain {
                Some(terrain) => terrain.write(&mut w)?,
                None => 0,
            },
            EngineSection::Skybox => match &file.skybox {
                Some(skybox) => skybox.write(&mut w)?,
                None => 0,
            },
            EngineSection::Collision => opaque_block(&mut w, &file.collision),
            EngineSection::PlayerAnimations => {
                if file.player_animations.is_empty() {
                    0
                } else {
                    let at = w.begin_section(0x10);
                    w.put_u32(file.player_animations.len() as u32);
                    // The appender pads back to 0x10, putting the slot
                    // table at `at + 0x10` with file-absolute pointers.
                    append_animation_table(&mut w.buf, &file.player_animations)?;
                    at
                }
            }
            EngineSection::SoundConfig => opaque_block(&mut w, &file.sound_config),
            EngineSection::Lights => {
                header.light_count = file.lights.len() as u32;
                records(&mut w, &file.lights)?
            }
            EngineSection::LightConfig => opaque_block(&mut w, &file.light_config),
            EngineSection::Textures => {
                header.texture_count = file.textures.len() as u32;
                records(&mut w, &file.textures)?
            }
            EngineSection::TextureConfigMenu => {
                header.texture_config_menu_count = file.texture_config_menu.len() as u32;
                records(&mut w, &file.texture_config_menu)?
            }
            EngineSection::Texture2d => opaque_block(&mut w, &file.texture_2d),
            EngineSection::UiElements => opaque_block(&mut w, &file.ui_elements),
            EngineSection::Unk64 => opaque_block(&mut w, &file.unk64),
            EngineSection::Unk68 => opaque_block(&mut w, &file.unk68),
            EngineSection::Unk6C => opaque_block(&mut w, &file.unk6c),
            EngineSection::Unk70 => opaque_block(&mut w, &file.unk70),
            EngineSection::Unk90 => opaque_block(&mut w, &file.unk90),
            EngineSection::Unk94 => opaque_block(&mut w, &file.unk94),
        };
        header.set_pointer(section, pointer);
    }

    // No trailing padding: a tail section read back by pointer subtraction
    // must see exactly the bytes written for it.
    w.patch(0, &header.write(game));
    Ok(w.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Matrix4, Vector3};

    use crate::models::{
        Animation, Frame, Light, MobyModel, MobyModelEntry, Model, ShrubModel, Skybox,
        SkyboxVertex, Terrain, TerrainFragment, TexConfig, Texture, TieModel,
    };
    use crate::objects::{OpaqueBlob, Shrub, Tie};

    fn sample_file(game: GameVariant) -> EngineFile {
        let mut file = EngineFile {
            moby_models: vec![
                MobyModelEntry {
                    id: 0x1F4,
                    model: Some(MobyModel {
                        model: Model {
                            vertex_buffer: vec![
                                0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, //
                                1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0,
                            ],
                            index_buffer: vec![0, 1, 0],
                            tex_configs: vec![TexConfig {
                                texture_id: 0,
                                face_start: 0,
                                face_count: 3,
                                mode: 0,
                            }],
                        },
                        scale: 0.25,
                        ..Default::default()
                    }),
                },
                // An absent slot must round-trip as pointer 0.
                MobyModelEntry {
                    id: 0x1F5,
                    model: None,
                },
            ],
            render_def: OpaqueBlob::new(vec![0x11; 0x20]),
            tie_models: vec![TieModel::new(0x500)],
            ties: vec![Tie::new(
                game,
                Matrix4::from_translation(Vector3::new(10.0, 0.0, -4.0)),
                0x500,
            )],
            shrub_models: vec![ShrubModel::new(0x6A0)],
            shrubs: vec![Shrub::new(
                game,
                Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0)),
                0x6A0,
            )],
            terrain: None,
            skybox: Some(Skybox {
                vertices: vec![SkyboxVertex {
                    position: Vector3::new(0.0, 50.0, 0.0),
                    uv: [0.5, 0.5],
                    rgba: 0x8090_A0FF,
                }],
                index_buffer: vec![0, 0, 0],
                tex_configs: vec![TexConfig {
                    texture_id: 2,
                    face_start: 0,
                    face_count: 3,
                    mode: 0,
                }],
                unk18: 0,
                unk1c: 0,
            }),
            collision: OpaqueBlob::new(vec![0xC0; 0x30]),
            player_animations: vec![
                None,
                Some(Animation {
                    speed: 1.5,
                    frames: vec![Frame {
                        speed: 0.5,
                        rotations: vec![[0, 0, 0, 32767]],
                        ..Default::default()
                    }],
                    ..Default::default()
                }),
            ],
            sound_config: OpaqueBlob::new(vec![0x50; 0x10]),
            lights: vec![Light {
                color1: [1.0, 1.0, 0.9, 1.0],
                direction1: [0.0, 0.0, 1.0, 0.0],
                ..Default::default()
            }],
            light_config: OpaqueBlob::new(vec![0x1C; 0x10]),
            textures: vec![
                Texture {
                    data_pointer: 0,
                    mip_count: 1,
                    width: 256,
                    height: 256,
                    format: 0x86,
                    ..Default::default()
                },
                Texture {
                    data_pointer: 0x10000,
                    mip_count: 1,
                    width: 64,
                    height: 64,
                    format: 0x86,
                    ..Default::default()
                },
            ],
            texture_config_menu: vec![TexConfig {
                texture_id: 1,
                face_start: 0,
                face_count: 0,
                mode: 0,
            }],
            texture_2d: OpaqueBlob::default(),
            ui_elements: OpaqueBlob::new(vec![0x71; 0x10]),
            unk64: OpaqueBlob::new(vec![0x64; 0x10]),
            unk68: OpaqueBlob::default(),
            unk6c: OpaqueBlob::default(),
            unk70: OpaqueBlob::new(vec![0x70; 0x20]),
            unk90: OpaqueBlob::default(),
            unk94: OpaqueBlob::default(),
            unk74: [1, 2, 3, 4, 5, 6, 7],
            unk98: 0,
            unk9c: 0,
        };
        if game == GameVariant::Dl {
            // Only the widest header carries these four.
            file.unk90 = OpaqueBlob::new(vec![0x90; 0x10]);
            file.unk94 = OpaqueBlob::new(vec![0x94; 0x10]);
            file.unk98 = 0x1234;
            file.unk9c = 0x5678;
        }
        file
    }

    #[test]
    fn written_files_parse_back_per_game() {
        for game in GameVariant::ALL {
            let file = sample_file(game);
            let data = write_engine(&file, game).unwrap();
            let (detected, back) = EngineFile::read(&data).unwrap();
            assert_eq!(detected, game);
            assert_eq!(back, file, "mismatch for {:?}", game);
        }
    }

    #[test]
    fn second_generation_output_is_byte_identical() {
        for game in GameVariant::ALL {
            let first = write_engine(&sample_file(game), game).unwrap();
            let (_, back) = EngineFile::read(&first).unwrap();
            let second = write_engine(&back, game).unwrap();
            assert_eq!(first, second, "unstable bytes for {:?}", game);
        }
    }

    #[test]
    fn header_counts_sit_next_to_their_pointers() {
        let game = GameVariant::Rc2;
        let data = write_engine(&sample_file(game), game).unwrap();
        let header = EngineHeader::read(&data, game).unwrap();
        assert_eq!(header.tie_model_count, 1);
        assert_eq!(header.tie_count, 1);
        assert_eq!(header.shrub_model_count, 1);
        assert_eq!(header.shrub_count, 1);
        assert_eq!(header.light_count, 1);
        assert_eq!(header.texture_count, 2);
        assert_eq!(header.texture_config_menu_count, 1);
    }

    #[test]
    fn empty_sections_get_zero_pointers() {
        let game = GameVariant::Rc3;
        let data = write_engine(&sample_file(game), game).unwrap();
        let header = EngineHeader::read(&data, game).unwrap();
        assert_eq!(header.terrain_pointer, 0);
        assert_eq!(header.texture_2d_pointer, 0);
        assert_eq!(header.unk68_pointer, 0);
        assert_eq!(header.unk6c_pointer, 0);
        assert_ne!(header.skybox_pointer, 0);
        assert_ne!(header.unk70_pointer, 0);
    }

    #[test]
    fn sections_follow_the_canonical_order() {
        for game in [GameVariant::Rc1, GameVariant::Dl] {
            let data = write_engine(&sample_file(game), game).unwrap();
            let header = EngineHeader::read(&data, game).unwrap();
            let mut last = 0u32;
            for &section in game::engine_order(game) {
                let p = header.pointer(section);
                if p != 0 {
                    assert!(p > last, "section {:?} out of order for {:?}", section, game);
                    last = p;
                }
            }
        }
    }

    #[test]
    fn terrain_nests_inside_the_section_order() {
        let game = GameVariant::Rc3;
        let mut file = sample_file(game);
        let mut vertex_buffer = Vec::new();
        for i in 0..3 {
            let x = i as f32;
            vertex_buffer.extend([x, 0.0, -x, 0.0, 1.0, 0.0, x * 0.25, x * 0.5]);
        }
        file.terrain = Some(Terrain {
            fragments: vec![TerrainFragment {
                center: Vector3::new(1.0, 0.0, -1.0),
                radius: 10.0,
                tex_configs: vec![TexConfig {
                    texture_id: 3,
                    face_start: 0,
                    face_count: 3,
                    mode: 0,
                }],
                vertex_buffer,
                rgbas: vec![0xFF00_0000, 0xFF00_0001, 0xFF00_0002],
                index_buffer: vec![0, 1, 2],
                unk24: [7, 8, 9],
            }],
            unk44: [9, 0, 0, 0, 0, 0, 1],
        });

        let data = write_engine(&file, game).unwrap();
        let (_, back) = EngineFile::read(&data).unwrap();
        assert_eq!(back.terrain, file.terrain);
        // Its neighbors must still decode around it.
        assert_eq!(back.skybox, file.skybox);
        assert_eq!(back.collision, file.collision);
    }

    #[test]
    fn empty_animation_slots_round_trip_as_gaps() {
        let game = GameVariant::Rc2;
        let data = write_engine(&sample_file(game), game).unwrap();
        let (_, back) = EngineFile::read(&data).unwrap();
        assert!(back.player_animations[0].is_none());
        let animation = back.player_animations[1].as_ref().unwrap();
        assert_eq!(animation.frames.len(), 1);
        assert_eq!(animation.frames[0].rotations, vec![[0, 0, 0, 32767]]);
    }
}
