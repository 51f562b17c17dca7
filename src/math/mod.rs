//! Vector and matrix helpers over `cgmath`.
//!
//! Transforms are stored in file as 16 consecutive floats with the
//! translation in the last four, which maps directly onto `cgmath`'s
//! column layout: the floats are read in order into [`Matrix4`] columns and
//! written back the same way, so an untouched matrix round-trips
//! bit-for-bit.

use cgmath::{InnerSpace, Matrix3, Matrix4, Rad, Vector3, Vector4};

use crate::bytes;
use crate::error::Result;

// ============================================================================
// Block codecs
// ============================================================================

pub fn read_vec3(block: &[u8], offset: usize) -> Result<Vector3<f32>> {
    Ok(Vector3::new(
        bytes::read_f32(block, offset)?,
        bytes::read_f32(block, offset + 4)?,
        bytes::read_f32(block, offset + 8)?,
    ))
}

pub fn write_vec3(buf: &mut Vec<u8>, v: Vector3<f32>) {
    bytes::write_f32(buf, v.x);
    bytes::write_f32(buf, v.y);
    bytes::write_f32(buf, v.z);
}

pub fn read_vec4(block: &[u8], offset: usize) -> Result<Vector4<f32>> {
    Ok(Vector4::new(
        bytes::read_f32(block, offset)?,
        bytes::read_f32(block, offset + 4)?,
        bytes::read_f32(block, offset + 8)?,
        bytes::read_f32(block, offset + 12)?,
    ))
}

pub fn write_vec4(buf: &mut Vec<u8>, v: Vector4<f32>) {
    bytes::write_f32(buf, v.x);
    bytes::write_f32(buf, v.y);
    bytes::write_f32(buf, v.z);
    bytes::write_f32(buf, v.w);
}

pub fn read_mat4(block: &[u8], offset: usize) -> Result<Matrix4<f32>> {
    let mut raw = [0f32; 16];
    for (i, slot) in raw.iter_mut().enumerate() {
        *slot = bytes::read_f32(block, offset + i * 4)?;
    }
    Ok(Matrix4::new(
        raw[0], raw[1], raw[2], raw[3],
        raw[4], raw[5], raw[6], raw[7],
        raw[8], raw[9], raw[10], raw[11],
        raw[12], raw[13], raw[14], raw[15],
    ))
}

pub fn write_mat4(buf: &mut Vec<u8>, m: &Matrix4<f32>) {
    for col in [m.x, m.y, m.z, m.w] {
        write_vec4(buf, col);
    }
}

// ============================================================================
// Euler angles
// ============================================================================

// Rotations decompose as Rz * Ry * Rx applied to column vectors, matching
// the order the game engine composes object transforms.

pub fn euler_to_matrix(e: Vector3<f32>) -> Matrix3<f32> {
    Matrix3::from_angle_z(Rad(e.z))
        * Matrix3::from_angle_y(Rad(e.y))
        * Matrix3::from_angle_x(Rad(e.x))
}

pub fn matrix_to_euler(m: &Matrix3<f32>) -> Vector3<f32> {
    let r20 = m.x.z;
    let y = (-r20).clamp(-1.0, 1.0).asin();
    if r20.abs() < 0.99999 {
        let x = m.y.z.atan2(m.z.z);
        let z = m.x.y.atan2(m.x.x);
        Vector3::new(x, y, z)
    } else {
        // Gimbal lock: pitch at +-90 degrees, fold everything into x.
        let x = (-m.z.y).atan2(m.y.y);
        Vector3::new(x, y, 0.0)
    }
}

// ============================================================================
// TRS decomposition
// ============================================================================

/// Split a transform into translation, Euler rotation, and per-axis scale.
pub fn decompose_trs(m: &Matrix4<f32>) -> (Vector3<f32>, Vector3<f32>, Vector3<f32>) {
    let translation = m.w.truncate();

    let mut col0 = m.x.truncate();
    let mut col1 = m.y.truncate();
    let mut col2 = m.z.truncate();

    let scale = Vector3::new(col0.magnitude(), col1.magnitude(), col2.magnitude());
    if scale.x != 0.0 {
        col0 /= scale.x;
    }
    if scale.y != 0.0 {
        col1 /= scale.y;
    }
    if scale.z != 0.0 {
        col2 /= scale.z;
    }

    let rotation = matrix_to_euler(&Matrix3::from_cols(col0, col1, col2));
    (translation, rotation, scale)
}

/// Inverse of [`decompose_trs`] up to float precision.
pub fn compose_trs(
    translation: Vector3<f32>,
    rotation: Vector3<f32>,
    scale: Vector3<f32>,
) -> Matrix4<f32> {
    Matrix4::from_translation(translation)
        * Matrix4::from(euler_to_matrix(rotation))
        * Matrix4::from_nonuniform_scale(scale.x, scale.y, scale.z)
}
