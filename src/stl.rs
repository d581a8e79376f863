//! Binary STL encoding.
//!
//! Layout: 80-byte header, little-endian u32 triangle count, then per
//! triangle a normal and three vertices (12 little-endian f32) followed by a
//! u16 attribute count.

use std::io::{self, Read, Write};

use glam::Vec3;

use crate::mesh::TileMesh;

const HEADER_LEN: usize = 80;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StlTriangle {
    pub normal: Vec3,
    pub vertices: [Vec3; 3],
}

/// Write the mesh in world space, multiplied by `scale`, as binary STL.
pub fn write_binary_stl<W: Write>(
    mut writer: W,
    mesh: &TileMesh,
    header: &str,
    scale: f32,
) -> io::Result<()> {
    let mut header_bytes = [b' '; HEADER_LEN];
    let text = header.as_bytes();
    let len = text.len().min(HEADER_LEN);
    header_bytes[..len].copy_from_slice(&text[..len]);
    writer.write_all(&header_bytes)?;

    let count = mesh.face_count() * 2;
    let count = u32::try_from(count)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "too many triangles for STL"))?;
    writer.write_all(&count.to_le_bytes())?;

    for tri in mesh.triangles() {
        let [a, b, c] = tri.map(|i| mesh.world_position(i as usize) * scale);
        let normal = (b - a).cross(c - a).normalize_or_zero();

        for v in [normal, a, b, c] {
            writer.write_all(&v.x.to_le_bytes())?;
            writer.write_all(&v.y.to_le_bytes())?;
            writer.write_all(&v.z.to_le_bytes())?;
        }
        writer.write_all(&[0u8, 0u8])?;
    }

    writer.flush()
}

/// Read a binary STL back into triangles.
pub fn read_binary_stl<R: Read>(mut reader: R) -> io::Result<(String, Vec<StlTriangle>)> {
    let mut header = [0u8; HEADER_LEN];
    reader.read_exact(&mut header)?;
    let header = String::from_utf8_lossy(&header).trim_end().to_string();

    let mut count_buf = [0u8; 4];
    reader.read_exact(&mut count_buf)?;
    let count = u32::from_le_bytes(count_buf) as usize;

    let mut triangles = Vec::with_capacity(count);
    let mut record = [0u8; 50];
    for _ in 0..count {
        reader.read_exact(&mut record)?;
        let vec_at = |offset: usize| {
            let f = |i: usize| {
                let at = offset + i * 4;
                f32::from_le_bytes([record[at], record[at + 1], record[at + 2], record[at + 3]])
            };
            Vec3::new(f(0), f(1), f(2))
        };
        triangles.push(StlTriangle {
            normal: vec_at(0),
            vertices: [vec_at(12), vec_at(24), vec_at(36)],
        });
    }

    Ok((header, triangles))
}
