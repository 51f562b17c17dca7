//! Side container headers (armor, gadget, and mission files).

use binrw::binrw;

use crate::error::Result;

/// Header shared by the armor and gadget files: a moby model slot table at
/// `model_table_pointer` and a texture entry table at
/// `texture_table_pointer`.
#[binrw]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[br(big)]
#[bw(big)]
pub struct SideModelHeader {
    pub model_table_pointer: u32,
    pub texture_table_pointer: u32,
    pub unk08: u32,
    pub unk0c: u32,
}

impl SideModelHeader {
    pub const LEN: usize = 0x10;
}

/// Mission file header. The pvar table/data pair follows the same
/// subtraction rule as the gameplay file.
#[binrw]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[br(big)]
#[bw(big)]
pub struct MissionHeader {
    pub moby_pointer: u32,
    pub pvar_table_pointer: u32,
    pub pvar_data_pointer: u32,
    pub texture_pointer: u32,
}

impl MissionHeader {
    pub const LEN: usize = 0x10;

    pub fn pvar_count(&self) -> Result<usize> {
        super::pvar_span_count(self.pvar_table_pointer, self.pvar_data_pointer)
    }
}
