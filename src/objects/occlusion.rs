//! Per-kind occlusion id/value tables.
//!
//! ```text
//! 0x00 mobyCount u32    0x04 tieCount u32
//! 0x08 shrubCount u32   0x0C unk0C u32
//! 0x10 mobyCount  * { id u32, value u32 }
//!      tieCount   * { id u32, value u32 }
//!      shrubCount * { id u32, value u32 }
//! ```
//!
//! The three runs are contiguous with no padding between them.

use crate::bytes;
use crate::error::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OcclusionPair {
    pub id: u32,
    pub value: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Occlusion {
    pub mobys: Vec<OcclusionPair>,
    pub ties: Vec<OcclusionPair>,
    pub shrubs: Vec<OcclusionPair>,
    pub unk0c: u32,
}

fn read_pairs(block: &[u8], offset: usize, count: usize) -> Result<Vec<OcclusionPair>> {
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        out.push(OcclusionPair {
            id: bytes::read_u32(block, offset + i * 8)?,
            value: bytes::read_u32(block, offset + i * 8 + 4)?,
        });
    }
    Ok(out)
}

fn write_pairs(buf: &mut Vec<u8>, pairs: &[OcclusionPair]) {
    for pair in pairs {
        bytes::write_u32(buf, pair.id);
        bytes::write_u32(buf, pair.value);
    }
}

impl Occlusion {
    pub fn decode(block: &[u8]) -> Result<Self> {
        let moby_count = bytes::read_u32(block, 0x00)? as usize;
        let tie_count = bytes::read_u32(block, 0x04)? as usize;
        let shrub_count = bytes::read_u32(block, 0x08)? as usize;
        let unk0c = bytes::read_u32(block, 0x0C)?;
        let mobys = read_pairs(block, 0x10, moby_count)?;
        let ties = read_pairs(block, 0x10 + moby_count * 8, tie_count)?;
        let shrubs = read_pairs(block, 0x10 + (moby_count + tie_count) * 8, shrub_count)?;
        Ok(Occlusion {
            mobys,
            ties,
            shrubs,
            unk0c,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        bytes::write_u32(&mut buf, self.mobys.len() as u32);
        bytes::write_u32(&mut buf, self.ties.len() as u32);
        bytes::write_u32(&mut buf, self.shrubs.len() as u32);
        bytes::write_u32(&mut buf, self.unk0c);
        write_pairs(&mut buf, &self.mobys);
        write_pairs(&mut buf, &self.ties);
        write_pairs(&mut buf, &self.shrubs);
        buf
    }
}
