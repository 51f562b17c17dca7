//! Shrub models. Identical record shape and split-buffer layout to tie
//! models; only the header slot they hang off differs.

use cgmath::Vector3;

use crate::error::Result;
use crate::models::tie_model::{decode_model_record, encode_model_record, RECORD_LEN};
use crate::models::Model;
use crate::serialize::cursor::SectionWriter;

#[derive(Debug, Clone, PartialEq)]
pub struct ShrubModel {
    pub id: i32,
    pub model: Model,
    pub culling_center: Vector3<f32>,
    pub culling_radius: f32,
    pub unk1a: u16,
    pub unk2c: u32,
    pub unk34: [u32; 3],
}

impl ShrubModel {
    pub fn new(id: i32) -> Self {
        ShrubModel {
            id,
            model: Model::default(),
            culling_center: Vector3::new(0.0, 0.0, 0.0),
            culling_radius: 0.0,
            unk1a: 0,
            unk2c: 0,
            unk34: [0; 3],
        }
    }
}

impl Default for ShrubModel {
    fn default() -> Self {
        ShrubModel::new(0)
    }
}

pub fn read_shrub_models(data: &[u8], offset: usize, count: usize) -> Result<Vec<ShrubModel>> {
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        let parts = decode_model_record(data, offset + i * RECORD_LEN)?;
        out.push(ShrubModel {
            id: parts.id,
            model: parts.model,
            culling_center: parts.culling_center,
            culling_radius: parts.culling_radius,
            unk1a: parts.unk1a,
            unk2c: parts.unk2c,
            unk34: parts.unk34,
        });
    }
    Ok(out)
}

pub fn write_shrub_models(w: &mut SectionWriter, models: &[ShrubModel]) -> Result<u32> {
    let at = w.begin_section(0x10);
    w.reserve(models.len() * RECORD_LEN);
    for (i, m) in models.iter().enumerate() {
        encode_model_record(
            w,
            at as usize + i * RECORD_LEN,
            m.id,
            &m.model,
            m.culling_center,
            m.culling_radius,
            m.unk1a,
            m.unk2c,
            m.unk34,
        )?;
    }
    Ok(at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TexConfig;

    #[test]
    fn records_round_trip_through_a_section() {
        let models = vec![
            ShrubModel {
                id: 0x6A0,
                model: Model {
                    vertex_buffer: vec![
                        1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.1, 0.9, //
                        0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.9, 0.1,
                    ],
                    index_buffer: vec![0, 1, 0],
                    tex_configs: vec![TexConfig {
                        texture_id: 4,
                        face_start: 0,
                        face_count: 3,
                        mode: 0,
                    }],
                },
                culling_center: Vector3::new(-8.0, 2.0, 2.5),
                culling_radius: 6.0,
                unk1a: 1,
                unk2c: 2,
                unk34: [0, 0, 5],
            },
            ShrubModel::new(0x6A1),
        ];
        let mut w = SectionWriter::new();
        w.reserve(0x20);
        let at = write_shrub_models(&mut w, &models).unwrap();
        let data = w.into_bytes();

        let back = read_shrub_models(&data, at as usize, models.len()).unwrap();
        assert_eq!(back, models);
    }
}
