//! The level aggregate. `Level::load` takes the engine file's path, derives
//! its sibling files in the same directory, and parses the whole family into
//! one graph; `Level::save` lays the family back out byte-faithfully.
//!
//! The engine and gameplay files are required. Chunk slots are probed one by
//! one; vram and the side containers warn when absent and load as empty, so a
//! level ripped without its optional files still opens.

use std::fs;
use std::path::Path;

use crate::error::{LevelError, Result};
use crate::game::GameVariant;
use crate::models::texture::{self, Texture};
use crate::models::{MobyModel, ShrubModel, TieModel};
use crate::objects::{Moby, Shrub, Spline, Tie};
use crate::parse;
use crate::parse::chunk::ChunkFile;
use crate::parse::engine::EngineFile;
use crate::parse::gameplay::GameplayFile;
use crate::parse::side::{MissionFile, SideModelFile};
use crate::serialize;

/// How many chunk files a level directory can carry.
pub const CHUNK_SLOTS: usize = 5;

const GAMEPLAY_FILE: &str = "gameplay.ps3";
const ENGINE_FILE: &str = "engine.ps3";
const VRAM_FILE: &str = "vram.ps3";
const ARMOR_FILE: &str = "armor.ps3";
const GADGET_FILE: &str = "gadget.ps3";
const MISSION_FILE: &str = "mission.ps3";

fn chunk_file(index: usize) -> String {
    format!("chunk{}.ps3", index)
}

/// One level: the engine and gameplay parts plus whatever optional siblings
/// were found next to them. Per-kind lists live on the parts; the accessors
/// below reach the common ones without caring which file they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub game: GameVariant,
    pub engine: EngineFile,
    pub gameplay: GameplayFile,
    /// Indexed by chunk number; `None` where `chunkN.ps3` does not exist.
    pub chunks: Vec<Option<ChunkFile>>,
    pub armor: Option<SideModelFile>,
    pub gadget: Option<SideModelFile>,
    pub mission: Option<MissionFile>,
}

/// Read an optional sibling; absence is `None`, anything else propagates.
fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match parse::read_file(path) {
        Ok(data) => Ok(Some(data)),
        Err(LevelError::MissingFile { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

impl Level {
    /// An empty level for `game`, ready to be populated and saved.
    pub fn new(game: GameVariant) -> Level {
        Level {
            game,
            engine: EngineFile::default(),
            gameplay: GameplayFile::default(),
            chunks: vec![None; CHUNK_SLOTS],
            armor: None,
            gadget: None,
            mission: None,
        }
    }

    /// Load a level family from the engine file at `engine_path`. The other
    /// files are derived by name in the same directory.
    pub fn load(engine_path: impl AsRef<Path>) -> Result<Level> {
        let engine_path = engine_path.as_ref();
        let dir = engine_path.parent().unwrap_or_else(|| Path::new(""));

        let engine_data = parse::read_file(engine_path)?;
        let (game, engine) = EngineFile::read(&engine_data)?;
        log::debug!("{}: detected {:?}", engine_path.display(), game);

        let gameplay_data = parse::read_file(&dir.join(GAMEPLAY_FILE))?;
        let gameplay = GameplayFile::read(&gameplay_data, game)?;

        let mut chunks = Vec::with_capacity(CHUNK_SLOTS);
        for index in 0..CHUNK_SLOTS {
            match read_optional(&dir.join(chunk_file(index)))? {
                Some(data) => chunks.push(Some(ChunkFile::read(&data)?)),
                None => chunks.push(None),
            }
        }

        let vram = match read_optional(&dir.join(VRAM_FILE))? {
            Some(data) => data,
            None => {
                log::warn!("{} not found; textures keep empty texel data", VRAM_FILE);
                Vec::new()
            }
        };

        let armor = match read_optional(&dir.join(ARMOR_FILE))? {
            Some(data) => Some(SideModelFile::read(&data, game)?),
            None => {
                log::warn!("{} not found; skipping", ARMOR_FILE);
                None
            }
        };
        let gadget = match read_optional(&dir.join(GADGET_FILE))? {
            Some(data) => Some(SideModelFile::read(&data, game)?),
            None => {
                log::warn!("{} not found; skipping", GADGET_FILE);
                None
            }
        };
        let mission = match read_optional(&dir.join(MISSION_FILE))? {
            Some(data) => Some(MissionFile::read(&data, game)?),
            None => {
                log::warn!("{} not found; skipping", MISSION_FILE);
                None
            }
        };

        let mut level = Level {
            game,
            engine,
            gameplay,
            chunks,
            armor,
            gadget,
            mission,
        };

        // Texel spans run to the next-higher pointer, so the bounds need
        // every entry in the family, side containers included.
        let pointers = level.sorted_texture_pointers();
        for entry in level.all_textures_mut() {
            texture::slice_vram(entry, &pointers, &vram);
        }
        Ok(level)
    }

    /// Write the whole family into `dir` under the canonical file names.
    ///
    /// The vram blob is packed first: that reassigns every entry's
    /// `data_pointer`, and the engine and side files written afterwards
    /// carry the reassigned values. Borrows `&mut self` for that reason.
    pub fn save(&mut self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        log::debug!("saving level into {}", dir.display());

        let vram = serialize::vram::write_vram(self.all_textures_mut());

        fs::write(
            dir.join(ENGINE_FILE),
            serialize::engine::write_engine(&self.engine, self.game)?,
        )?;
        fs::write(
            dir.join(GAMEPLAY_FILE),
            serialize::gameplay::write_gameplay(&self.gameplay, self.game)?,
        )?;

        for (index, chunk) in self.chunks.iter().enumerate() {
            if let Some(chunk) = chunk {
                fs::write(dir.join(chunk_file(index)), serialize::chunk::write_chunk(chunk)?)?;
            }
        }
        if let Some(armor) = &self.armor {
            fs::write(
                dir.join(ARMOR_FILE),
                serialize::side::write_side_model(armor, self.game)?,
            )?;
        }
        if let Some(gadget) = &self.gadget {
            fs::write(
                dir.join(GADGET_FILE),
                serialize::side::write_side_model(gadget, self.game)?,
            )?;
        }
        if let Some(mission) = &self.mission {
            fs::write(
                dir.join(MISSION_FILE),
                serialize::side::write_mission(mission, self.game)?,
            )?;
        }

        fs::write(dir.join(VRAM_FILE), vram)?;
        Ok(())
    }

    pub fn mobys(&self) -> &[Moby] {
        &self.gameplay.mobys
    }

    pub fn mobys_mut(&mut self) -> &mut Vec<Moby> {
        &mut self.gameplay.mobys
    }

    pub fn ties(&self) -> &[Tie] {
        &self.engine.ties
    }

    pub fn ties_mut(&mut self) -> &mut Vec<Tie> {
        &mut self.engine.ties
    }

    pub fn shrubs(&self) -> &[Shrub] {
        &self.engine.shrubs
    }

    pub fn shrubs_mut(&mut self) -> &mut Vec<Shrub> {
        &mut self.engine.shrubs
    }

    pub fn splines(&self) -> &[Spline] {
        &self.gameplay.splines
    }

    pub fn splines_mut(&mut self) -> &mut Vec<Spline> {
        &mut self.gameplay.splines
    }

    /// The engine's shared texture list. Side containers carry their own.
    pub fn textures(&self) -> &[Texture] {
        &self.engine.textures
    }

    pub fn textures_mut(&mut self) -> &mut Vec<Texture> {
        &mut self.engine.textures
    }

    /// Find a moby model by class id. An entry whose block was absent from
    /// the archive has no model and is skipped.
    pub fn moby_model(&self, id: i32) -> Option<&MobyModel> {
        self.engine
            .moby_models
            .iter()
            .find(|entry| entry.id == id)
            .and_then(|entry| entry.model.as_ref())
    }

    pub fn tie_model(&self, id: i32) -> Option<&TieModel> {
        self.engine.tie_models.iter().find(|model| model.id == id)
    }

    pub fn shrub_model(&self, id: i32) -> Option<&ShrubModel> {
        self.engine.shrub_models.iter().find(|model| model.id == id)
    }

    /// Every texture entry in the family, in vram layout order: the engine
    /// list first, then armor, gadget, and mission.
    fn all_textures_mut(&mut self) -> impl Iterator<Item = &mut Texture> {
        self.engine
            .textures
            .iter_mut()
            .chain(self.armor.iter_mut().flat_map(|f| f.textures.iter_mut()))
            .chain(self.gadget.iter_mut().flat_map(|f| f.textures.iter_mut()))
            .chain(self.mission.iter_mut().flat_map(|f| f.textures.iter_mut()))
    }

    fn sorted_texture_pointers(&self) -> Vec<u32> {
        let mut pointers: Vec<u32> = self
            .engine
            .textures
            .iter()
            .chain(self.armor.iter().flat_map(|f| f.textures.iter()))
            .chain(self.gadget.iter().flat_map(|f| f.textures.iter()))
            .chain(self.mission.iter().flat_map(|f| f.textures.iter()))
            .map(|entry| entry.data_pointer)
            .collect();
        pointers.sort_unstable();
        pointers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Matrix4, Vector3};
    use tempfile::TempDir;

    use crate::models::{MobyModelEntry, Model, TexConfig};
    use crate::objects::OpaqueBlob;

    fn small_model(scale: f32) -> MobyModel {
        MobyModel {
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
            scale,
            ..Default::default()
        }
    }

    // Texel runs are 0x10 multiples so re-reads see no alignment padding.
    fn entry(width: u16, height: u16, fill: u8, len: usize) -> Texture {
        Texture {
            mip_count: 1,
            width,
            height,
            format: 0x86,
            data: vec![fill; len],
            ..Default::default()
        }
    }

    fn sample_level(game: GameVariant) -> Level {
        let mut level = Level::new(game);

        level.engine.moby_models = vec![
            MobyModelEntry {
                id: 0x1F4,
                model: Some(small_model(0.25)),
            },
            MobyModelEntry {
                id: 0x1F5,
                model: None,
            },
        ];
        level.engine.render_def = OpaqueBlob::new(vec![0x11; 0x20]);
        level.engine.tie_models = vec![TieModel::new(0x500)];
        level.engine.ties = vec![Tie::new(
            game,
            Matrix4::from_translation(Vector3::new(10.0, 0.0, -4.0)),
            0x500,
        )];
        level.engine.shrub_models = vec![ShrubModel::new(0x6A0)];
        level.engine.shrubs = vec![Shrub::new(
            game,
            Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0)),
            0x6A0,
        )];
        level.engine.collision = OpaqueBlob::new(vec![0xC0; 0x30]);
        level.engine.textures = vec![entry(256, 256, 0xA1, 0x40), entry(64, 64, 0xA2, 0x20)];

        level.gameplay.mobys = vec![
            Moby {
                moby_id: 10,
                pvar_index: 0,
                ..Default::default()
            },
            Moby {
                moby_id: 11,
                pvar_index: -1,
                ..Default::default()
            },
        ];
        level.gameplay.pvars = vec![vec![1, 2, 3, 4, 5, 6, 7, 8]];
        level.gameplay.moby_ids = vec![10, 11];
        level.gameplay.tie_ids = vec![0x500];

        level.chunks[1] = Some(ChunkFile {
            terrain: None,
            collision: OpaqueBlob::new(vec![0x33; 0x40]),
        });
        level.armor = Some(SideModelFile {
            models: vec![None, Some(small_model(2.0))],
            textures: vec![entry(128, 128, 0xA3, 0x10)],
            unk08: 3,
            unk0c: 4,
        });
        level.gadget = Some(SideModelFile {
            models: Vec::new(),
            textures: vec![entry(32, 32, 0xA4, 0x30)],
            unk08: 1,
            unk0c: 2,
        });
        level.mission = Some(MissionFile {
            mobys: vec![Moby {
                moby_id: 0x300,
                pvar_index: 0,
                ..Default::default()
            }],
            pvars: vec![vec![9; 8]],
            textures: vec![entry(64, 32, 0xA5, 0x20)],
        });
        level
    }

    #[test]
    fn saved_levels_load_back_for_every_game() {
        for game in GameVariant::ALL {
            let tmp = TempDir::new().unwrap();
            let mut level = sample_level(game);
            level.save(tmp.path()).unwrap();

            let reloaded = Level::load(tmp.path().join(ENGINE_FILE)).unwrap();
            assert_eq!(reloaded, level, "{:?}", game);
        }
    }

    #[test]
    fn texel_data_survives_the_vram_round_trip() {
        let tmp = TempDir::new().unwrap();
        let mut level = sample_level(GameVariant::Rc2);
        level.save(tmp.path()).unwrap();

        let reloaded = Level::load(tmp.path().join(ENGINE_FILE)).unwrap();
        assert_eq!(reloaded.textures()[0].data, vec![0xA1; 0x40]);
        assert_eq!(reloaded.textures()[1].data, vec![0xA2; 0x20]);
        let mission = reloaded.mission.as_ref().unwrap();
        assert_eq!(mission.textures[0].data, vec![0xA5; 0x20]);
    }

    #[test]
    fn second_save_is_byte_identical() {
        for game in GameVariant::ALL {
            let first = TempDir::new().unwrap();
            let second = TempDir::new().unwrap();

            let mut level = sample_level(game);
            level.save(first.path()).unwrap();
            let mut reloaded = Level::load(first.path().join(ENGINE_FILE)).unwrap();
            reloaded.save(second.path()).unwrap();

            let chunk1 = chunk_file(1);
            for name in [
                ENGINE_FILE,
                GAMEPLAY_FILE,
                chunk1.as_str(),
                VRAM_FILE,
                ARMOR_FILE,
                GADGET_FILE,
                MISSION_FILE,
            ] {
                let a = fs::read(first.path().join(name)).unwrap();
                let b = fs::read(second.path().join(name)).unwrap();
                assert_eq!(a, b, "{} for {:?}", name, game);
            }
        }
    }

    /// Opt-in check against a real game dump: point `RCLEVEL_DUMP_DIR` at a
    /// level directory. The first save may normalize the layout, so identity
    /// is asserted between the first and second generations, not against the
    /// shipped bytes.
    #[test]
    fn real_dump_round_trips_byte_for_byte() {
        let dir = match std::env::var_os("RCLEVEL_DUMP_DIR") {
            Some(dir) => std::path::PathBuf::from(dir),
            None => return,
        };
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();

        let mut level = Level::load(dir.join(ENGINE_FILE)).unwrap();
        level.save(first.path()).unwrap();
        let mut reloaded = Level::load(first.path().join(ENGINE_FILE)).unwrap();
        reloaded.save(second.path()).unwrap();

        for entry in fs::read_dir(first.path()).unwrap() {
            let name = entry.unwrap().file_name();
            let a = fs::read(first.path().join(&name)).unwrap();
            let b = fs::read(second.path().join(&name)).unwrap();
            assert_eq!(a, b, "{:?}", name);
        }
    }

    #[test]
    fn optional_files_are_skipped_when_absent() {
        let tmp = TempDir::new().unwrap();
        let mut level = Level::new(GameVariant::Rc3);
        level.save(tmp.path()).unwrap();
        fs::remove_file(tmp.path().join(VRAM_FILE)).unwrap();

        let reloaded = Level::load(tmp.path().join(ENGINE_FILE)).unwrap();
        assert_eq!(reloaded, level);
        assert!(reloaded.chunks.iter().all(|chunk| chunk.is_none()));
        assert!(reloaded.armor.is_none());
        assert!(reloaded.gadget.is_none());
        assert!(reloaded.mission.is_none());
    }

    #[test]
    fn a_missing_gameplay_file_fails_the_load() {
        let tmp = TempDir::new().unwrap();
        let mut level = Level::new(GameVariant::Rc1);
        level.save(tmp.path()).unwrap();
        fs::remove_file(tmp.path().join(GAMEPLAY_FILE)).unwrap();

        match Level::load(tmp.path().join(ENGINE_FILE)) {
            Err(LevelError::MissingFile { path }) => {
                assert!(path.ends_with(GAMEPLAY_FILE));
            }
            other => panic!("expected MissingFile, got {:?}", other),
        }
    }

    #[test]
    fn chunk_numbering_follows_the_slot_index() {
        let tmp = TempDir::new().unwrap();
        let mut level = sample_level(GameVariant::Dl);
        level.save(tmp.path()).unwrap();

        assert!(!tmp.path().join(chunk_file(0)).exists());
        assert!(tmp.path().join(chunk_file(1)).exists());

        let reloaded = Level::load(tmp.path().join(ENGINE_FILE)).unwrap();
        assert!(reloaded.chunks[0].is_none());
        assert_eq!(reloaded.chunks[1], level.chunks[1]);
    }

    #[test]
    fn model_lookups_search_by_id() {
        let level = sample_level(GameVariant::Rc1);

        assert_eq!(level.moby_model(0x1F4).map(|m| m.scale), Some(0.25));
        // The entry exists but its block was absent, so there is no model.
        assert!(level.moby_model(0x1F5).is_none());
        assert!(level.moby_model(1).is_none());
        assert_eq!(level.tie_model(0x500).map(|m| m.id), Some(0x500));
        assert_eq!(level.shrub_model(0x6A0).map(|m| m.id), Some(0x6A0));
    }

    #[test]
    fn save_reassigns_texture_pointers_in_layout_order() {
        let tmp = TempDir::new().unwrap();
        let mut level = sample_level(GameVariant::Rc2);
        level.save(tmp.path()).unwrap();

        // Engine runs first, then armor, gadget, mission.
        assert_eq!(level.engine.textures[0].data_pointer, 0);
        assert_eq!(level.engine.textures[1].data_pointer, 0x40);
        assert_eq!(level.armor.as_ref().unwrap().textures[0].data_pointer, 0x60);
        assert_eq!(level.gadget.as_ref().unwrap().textures[0].data_pointer, 0x70);
        assert_eq!(
            level.mission.as_ref().unwrap().textures[0].data_pointer,
            0xA0
        );

        let vram = fs::read(tmp.path().join(VRAM_FILE)).unwrap();
        assert_eq!(vram.len(), 0xC0);
    }
}
