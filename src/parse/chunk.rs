//! Chunk file reader. Chunks hold extra terrain and collision for levels too
//! large to fit a single engine file; both sections are optional.

use crate::error::Result;
use crate::headers::ChunkHeader;
use crate::models::Terrain;
use crate::objects::OpaqueBlob;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkFile {
    pub terrain: Option<Terrain>,
    pub collision: OpaqueBlob,
}

impl ChunkFile {
    pub fn read(data: &[u8]) -> Result<ChunkFile> {
        let header = ChunkHeader::read(data)?;
        let terrain = if header.terrain_pointer != 0 {
            Some(Terrain::read(data, header.terrain_pointer as usize)?)
        } else {
            None
        };
        let collision = if header.collision_pointer != 0 {
            let at = header.collision_pointer as usize;
            OpaqueBlob::from_block(data, at, data.len().saturating_sub(at))?
        } else {
            OpaqueBlob::default()
        };
        Ok(ChunkFile { terrain, collision })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytes;

    #[test]
    fn empty_chunk_has_no_sections() {
        let data = vec![0u8; 0x10];
        let chunk = ChunkFile::read(&data).unwrap();
        assert!(chunk.terrain.is_none());
        assert!(chunk.collision.is_empty());
    }

    #[test]
    fn collision_runs_to_end_of_file() {
        let mut data = vec![0u8; 0x30];
        bytes::write_u32_at(&mut data, 0x04, 0x10);
        data[0x10..].fill(0xAB);
        let chunk = ChunkFile::read(&data).unwrap();
        assert!(chunk.terrain.is_none());
        assert_eq!(chunk.collision.len(), 0x20);
        assert_eq!(chunk.collision.data[0], 0xAB);
    }
}
