//! Codec for the level archives of a PS3-era game engine: the engine,
//! gameplay, chunk, and vram files that make up one level directory, plus
//! the armor, gadget, and mission side containers, across four game
//! variants.
//!
//! Everything in the files is big-endian and pointer-addressed. The readers
//! walk the header pointer tables into owned structs; the writers lay the
//! sections back out in each game's canonical order, so a level loaded and
//! saved once re-serializes byte-for-byte from then on.
//!
//! [`Level::load`] opens a whole family from the engine file's path and
//! [`Level::save`] writes it back. The per-file readers and writers stay
//! public for callers that only want one archive: [`parse::engine::EngineFile`],
//! [`parse::gameplay::GameplayFile`], and the writers under [`serialize`].

pub mod bytes;
pub mod error;
pub mod game;
pub mod headers;
pub mod level;
pub mod math;
pub mod models;
pub mod objects;
pub mod parse;
pub mod serialize;

pub use error::{LevelError, Result};
pub use game::GameVariant;
pub use level::Level;
