//! Chunk file header: two pointers, zero-padded to 0x10 on disk.

use crate::bytes;
use crate::error::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkHeader {
    pub terrain_pointer: u32,
    pub collision_pointer: u32,
}

impl ChunkHeader {
    pub const LEN: usize = 0x10;

    pub fn read(block: &[u8]) -> Result<Self> {
        Ok(ChunkHeader {
            terrain_pointer: bytes::read_u32(block, 0x00)?,
            collision_pointer: bytes::read_u32(block, 0x04)?,
        })
    }

    pub fn write(&self) -> Vec<u8> {
        let mut block = vec![0u8; Self::LEN];
        bytes::write_u32_at(&mut block, 0x00, self.terrain_pointer);
        bytes::write_u32_at(&mut block, 0x04, self.collision_pointer);
        block
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_and_pads() {
        let h = ChunkHeader {
            terrain_pointer: 0x10,
            collision_pointer: 0x400,
        };
        let block = h.write();
        assert_eq!(block.len(), 0x10);
        assert_eq!(&block[8..], [0u8; 8]);
        assert_eq!(ChunkHeader::read(&block).unwrap(), h);
    }
}
