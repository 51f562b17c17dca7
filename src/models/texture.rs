//! Texture entries and the DXT5 decompressor.
//!
//! The engine and side files store 0x24-byte entries; the texel bytes live
//! in the headerless vram blob at `dataPointer`. An entry's span runs to
//! the next higher dataPointer across every texture in the level, else to
//! the end of the blob. On save the blob is rebuilt and the pointers are
//! reassigned, so the struct owns its raw bytes.
//!
//! Everything in the entry is big-endian like the rest of the archive, but
//! DXT5 block interiors keep the codec's own little-endian layout.

use binrw::binrw;
use image::{Rgba, RgbaImage};

use crate::error::{LevelError, Result};

const BLOCK_LEN: usize = 16;

#[binrw]
#[derive(Debug, Clone, Default, PartialEq)]
#[br(big)]
#[bw(big)]
pub struct Texture {
    /// Offset of the texel bytes inside vram. Reassigned on save.
    pub data_pointer: u32,
    pub mip_count: u32,
    pub unk08: u32,
    pub unk0c: u32,
    pub width: u16,
    pub height: u16,
    pub format: u16,
    pub unk16: u16,
    pub tail: [u8; 12],
    /// Raw texel bytes cut out of vram; not part of the entry itself.
    #[br(ignore)]
    #[bw(ignore)]
    pub data: Vec<u8>,
}

impl Texture {
    pub const LEN: usize = 0x24;

    /// Byte length of the top mip as stored: 4x4 DXT5 blocks.
    pub fn mip0_len(&self) -> usize {
        let bx = (self.width as usize + 3) / 4;
        let by = (self.height as usize + 3) / 4;
        bx * by * BLOCK_LEN
    }

    /// Decompress the top mip to straight RGBA8.
    pub fn decode(&self) -> Result<RgbaImage> {
        let needed = self.mip0_len();
        if self.data.len() < needed {
            return Err(LevelError::TruncatedInput {
                offset: self.data.len() as u64,
                needed: needed - self.data.len(),
            });
        }
        Ok(decode_dxt5(
            &self.data[..needed],
            self.width as u32,
            self.height as u32,
        ))
    }
}

/// Cut one texture's bytes out of the vram blob. `sorted_pointers` holds
/// every dataPointer in the level in ascending order.
pub(crate) fn slice_vram(texture: &mut Texture, sorted_pointers: &[u32], vram: &[u8]) {
    let start = texture.data_pointer as usize;
    if start >= vram.len() {
        texture.data = Vec::new();
        return;
    }
    let end = sorted_pointers
        .iter()
        .find(|&&p| p > texture.data_pointer)
        .map(|&p| p as usize)
        .unwrap_or(vram.len())
        .min(vram.len());
    texture.data = vram[start..end].to_vec();
}

// ============================================================================
// DXT5 (BC3) blocks
// ============================================================================

fn expand_565(word: u16) -> [u8; 3] {
    let r5 = ((word >> 11) & 0x1F) as u8;
    let g6 = ((word >> 5) & 0x3F) as u8;
    let b5 = (word & 0x1F) as u8;
    [
        (r5 << 3) | (r5 >> 2),
        (g6 << 2) | (g6 >> 4),
        (b5 << 3) | (b5 >> 2),
    ]
}

fn alpha_table(alpha0: u8, alpha1: u8) -> [u8; 8] {
    let a0 = alpha0 as u16;
    let a1 = alpha1 as u16;
    let mut table = [alpha0, alpha1, 0, 0, 0, 0, 0, 0];
    if alpha0 > alpha1 {
        for k in 2..8u16 {
            table[k as usize] = (((8 - k) * a0 + (k - 1) * a1) / 7) as u8;
        }
    } else {
        for k in 2..6u16 {
            table[k as usize] = (((6 - k) * a0 + (k - 1) * a1) / 5) as u8;
        }
        table[6] = 0;
        table[7] = 255;
    }
    table
}

fn color_table(color0: u16, color1: u16) -> [[u8; 3]; 4] {
    let c0 = expand_565(color0);
    let c1 = expand_565(color1);
    let mut mixed = [c0, c1, [0; 3], [0; 3]];
    for ch in 0..3 {
        mixed[2][ch] = ((2 * c0[ch] as u16 + c1[ch] as u16) / 3) as u8;
        mixed[3][ch] = ((c0[ch] as u16 + 2 * c1[ch] as u16) / 3) as u8;
    }
    mixed
}

/// Decompress a run of DXT5 blocks into an image. Callers hand in at least
/// `ceil(w/4) * ceil(h/4)` blocks; edge blocks past the image bounds are
/// clipped.
pub fn decode_dxt5(data: &[u8], width: u32, height: u32) -> RgbaImage {
    let mut image = RgbaImage::new(width, height);
    let blocks_x = (width as usize + 3) / 4;
    let blocks_y = (height as usize + 3) / 4;
    for by in 0..blocks_y {
        for bx in 0..blocks_x {
            let at = (by * blocks_x + bx) * BLOCK_LEN;
            if at + BLOCK_LEN > data.len() {
                return image;
            }
            let block = &data[at..at + BLOCK_LEN];

            let alphas = alpha_table(block[0], block[1]);
            let mut alpha_bits = 0u64;
            for (i, &b) in block[2..8].iter().enumerate() {
                alpha_bits |= (b as u64) << (8 * i);
            }
            let color0 = u16::from_le_bytes([block[8], block[9]]);
            let color1 = u16::from_le_bytes([block[10], block[11]]);
            let colors = color_table(color0, color1);
            let color_bits = u32::from_le_bytes([block[12], block[13], block[14], block[15]]);

            for py in 0..4usize {
                for px in 0..4usize {
                    let x = (bx * 4 + px) as u32;
                    let y = (by * 4 + py) as u32;
                    if x >= width || y >= height {
                        continue;
                    }
                    let texel = py * 4 + px;
                    let alpha = alphas[((alpha_bits >> (3 * texel)) & 0x7) as usize];
                    let [r, g, b] = colors[((color_bits >> (2 * texel)) & 0x3) as usize];
                    image.put_pixel(x, y, Rgba([r, g, b, alpha]));
                }
            }
        }
    }
    image
}
