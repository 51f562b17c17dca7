//! Whole-file writers. Each submodule builds one archive file through a
//! [`cursor::SectionWriter`], reserving the header block first and patching
//! it once every section has an address.
//!
//! Sections are emitted in the canonical per-game order, which keeps the
//! reader's adjacent-pointer length inference valid for the files written
//! here. Empty sections get pointer 0 instead of a zero-length block.

pub(crate) mod cursor;

pub mod chunk;
pub mod engine;
pub mod gameplay;
pub mod side;
pub mod vram;

use cursor::SectionWriter;

use crate::objects::OpaqueBlob;

/// Append `data` at an aligned position and return its pointer. Empty data
/// means an absent section and pointer 0.
pub(crate) fn block(w: &mut SectionWriter, align: usize, data: &[u8]) -> u32 {
    if data.is_empty() {
        return 0;
    }
    let at = w.begin_section(align);
    w.put(data);
    at
}

pub(crate) fn opaque_block(w: &mut SectionWriter, blob: &OpaqueBlob) -> u32 {
    block(w, 0x10, &blob.data)
}

/// Write the pvar table/data pair. Readers infer the entry count from
/// `data_pointer - table_pointer`, so the data block must start flush
/// against the table's last entry. Returns `(table_pointer, data_pointer)`,
/// both 0 when there are no pvars.
pub(crate) fn write_pvar_sections(w: &mut SectionWriter, pvars: &[Vec<u8>]) -> (u32, u32) {
    if pvars.is_empty() {
        return (0, 0);
    }
    let table = w.begin_section(0x10) as usize;
    w.reserve(pvars.len() * 8);
    let data = w.position();
    for (i, pvar) in pvars.iter().enumerate() {
        w.align_to(4);
        let at = w.position();
        w.put(pvar);
        w.patch_u32(table + i * 8, at - data);
        w.patch_u32(table + i * 8 + 4, pvar.len() as u32);
    }
    (table as u32, data)
}
