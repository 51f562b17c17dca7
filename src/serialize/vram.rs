//! Vram writer. The texel file has no header: it is every texture's raw
//! bytes packed at 0x10 boundaries, addressed only through the entries'
//! `data_pointer` fields, which are reassigned as the blob is rebuilt.

use crate::bytes;
use crate::models::Texture;

/// Rebuild the vram blob from `textures`, pointing each entry at the
/// offset its bytes land on. The iteration order defines the layout;
/// callers pass the engine list first, then the side containers.
pub fn write_vram<'a, I>(textures: I) -> Vec<u8>
where
    I: IntoIterator<Item = &'a mut Texture>,
{
    let mut vram = Vec::new();
    for texture in textures {
        bytes::pad_to(&mut vram, 0x10);
        texture.data_pointer = vram.len() as u32;
        vram.extend_from_slice(&texture.data);
    }
    vram
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::texture::slice_vram;

    fn texture_with(data: Vec<u8>) -> Texture {
        Texture {
            data,
            ..Default::default()
        }
    }

    #[test]
    fn texel_runs_pack_at_paragraph_boundaries() {
        let mut textures = vec![
            texture_with(vec![0xAA; 0x10]),
            texture_with(vec![0xBB; 0x08]),
            texture_with(vec![0xCC; 0x20]),
        ];
        let vram = write_vram(textures.iter_mut());
        assert_eq!(textures[0].data_pointer, 0x00);
        assert_eq!(textures[1].data_pointer, 0x10);
        assert_eq!(textures[2].data_pointer, 0x20);
        assert_eq!(vram.len(), 0x40);
        assert_eq!(&vram[0x10..0x18], [0xBB; 8]);
        assert_eq!(&vram[0x18..0x20], [0u8; 8]);
    }

    #[test]
    fn reassigned_pointers_slice_back_to_the_same_bytes() {
        let mut textures = vec![
            texture_with(vec![0x11; 0x20]),
            texture_with(vec![0x22; 0x10]),
        ];
        let vram = write_vram(textures.iter_mut());

        let mut sorted: Vec<u32> = textures.iter().map(|t| t.data_pointer).collect();
        sorted.sort_unstable();
        for texture in &mut textures {
            let original = texture.data.clone();
            texture.data.clear();
            slice_vram(texture, &sorted, &vram);
            assert_eq!(texture.data, original);
        }
    }

    #[test]
    fn unaligned_runs_absorb_their_padding_once() {
        // An 0xC-byte run reads back as 0x10 bytes; the second rebuild
        // starts from the padded copy and is stable from then on.
        let mut textures = vec![
            texture_with(vec![0x33; 0x0C]),
            texture_with(vec![0x44; 0x10]),
        ];
        let vram = write_vram(textures.iter_mut());
        let sorted = vec![0x00, 0x10];
        let mut back = textures.clone();
        back[0].data.clear();
        slice_vram(&mut back[0], &sorted, &vram);
        assert_eq!(back[0].data.len(), 0x10);
        assert_eq!(&back[0].data[..0x0C], [0x33; 0x0C]);

        let second = write_vram(back.iter_mut());
        let third = write_vram(back.iter_mut());
        assert_eq!(second, third);
    }

    #[test]
    fn no_textures_means_an_empty_file() {
        let mut none: Vec<Texture> = Vec::new();
        assert!(write_vram(none.iter_mut()).is_empty());
    }
}
