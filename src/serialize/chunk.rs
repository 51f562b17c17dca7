//! Chunk file writer. The collision blob is written last so its read-back
//! span, which runs to the end of the file, sees exactly the bytes put
//! here.

use crate::error::Result;
use crate::headers::ChunkHeader;
use crate::parse::chunk::ChunkFile;
use crate::serialize::cursor::SectionWriter;
use crate::serialize::opaque_block;

pub fn write_chunk(file: &ChunkFile) -> Result<Vec<u8>> {
    let mut w = SectionWriter::new();
    w.reserve(ChunkHeader::LEN);

    let terrain_pointer = match &file.terrain {
        Some(terrain) => terrain.write(&mut w)?,
        None => 0,
    };
    let collision_pointer = opaque_block(&mut w, &file.collision);

    let header = ChunkHeader {
        terrain_pointer,
        collision_pointer,
    };
    w.patch(0, &header.write());
    Ok(w.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    use crate::models::{Terrain, TerrainFragment, TexConfig};
    use crate::objects::OpaqueBlob;

    fn sample_terrain() -> Terrain {
        let mut vertex_buffer = Vec::new();
        for i in 0..4 {
            let x = i as f32;
            vertex_buffer.extend([x, 1.0, -x, 0.0, 1.0, 0.0, x * 0.25, x * 0.5]);
        }
        Terrain {
            fragments: vec![TerrainFragment {
                center: Vector3::new(0.0, 1.0, 0.0),
                radius: 20.0,
                tex_configs: vec![TexConfig {
                    texture_id: 7,
                    face_start: 0,
                    face_count: 6,
                    mode: 0,
                }],
                vertex_buffer,
                rgbas: (0..4u32).map(|i| 0xFF00_0000 | i).collect(),
                index_buffer: vec![0, 1, 2, 1, 3, 2],
                unk24: [0; 3],
            }],
            unk44: [3, 0, 0, 0, 0, 0, 0],
        }
    }

    #[test]
    fn both_sections_round_trip() {
        let file = ChunkFile {
            terrain: Some(sample_terrain()),
            collision: OpaqueBlob::new(vec![0xAB; 0x40]),
        };
        let data = write_chunk(&file).unwrap();
        let back = ChunkFile::read(&data).unwrap();
        assert_eq!(back, file);
    }

    #[test]
    fn second_generation_output_is_byte_identical() {
        let file = ChunkFile {
            terrain: Some(sample_terrain()),
            collision: OpaqueBlob::new(vec![0xAB; 0x40]),
        };
        let first = write_chunk(&file).unwrap();
        let back = ChunkFile::read(&first).unwrap();
        let second = write_chunk(&back).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_chunk_is_a_bare_header() {
        let data = write_chunk(&ChunkFile::default()).unwrap();
        assert_eq!(data, vec![0u8; ChunkHeader::LEN]);
        let back = ChunkFile::read(&data).unwrap();
        assert_eq!(back, ChunkFile::default());
    }

    #[test]
    fn collision_only_chunk_keeps_terrain_pointer_zero() {
        let file = ChunkFile {
            terrain: None,
            collision: OpaqueBlob::new(vec![0xCD; 0x20]),
        };
        let data = write_chunk(&file).unwrap();
        let header = ChunkHeader::read(&data).unwrap();
        assert_eq!(header.terrain_pointer, 0);
        assert_eq!(header.collision_pointer, 0x10);
        assert_eq!(ChunkFile::read(&data).unwrap(), file);
    }
}
