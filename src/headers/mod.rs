//! Pointer-table headers for every container file.
//!
//! Each header is a fixed-size struct of u32 fields at its file's offset 0.
//! The structures are strictly positional, so the game variant must be known
//! before any field is read. A pointer of 0 always means "section absent"
//! and must round-trip as 0.

pub mod chunk;
pub mod engine;
pub mod gameplay;
pub mod side;

pub use chunk::ChunkHeader;
pub use engine::EngineHeader;
pub use gameplay::GameplayHeader;
pub use side::{MissionHeader, SideModelHeader};

use crate::error::{LevelError, Result};

/// Pvar table entry count from the gap between the table and its data.
/// Shared by the gameplay and mission headers; entries are 8 bytes.
pub(crate) fn pvar_span_count(table_pointer: u32, data_pointer: u32) -> Result<usize> {
    if table_pointer == 0 || data_pointer == 0 {
        return Ok(0);
    }
    let span = data_pointer as i64 - table_pointer as i64;
    if span < 0 || span % 8 != 0 {
        return Err(LevelError::InvariantViolation(format!(
            "pvar table at 0x{:X} and pvar data at 0x{:X} are {} bytes apart",
            table_pointer, data_pointer, span
        )));
    }
    Ok((span / 8) as usize)
}
