//! Parsers turning `.stl` and `.obj` files into an indexed triangle list.

use std::{
    collections::HashMap,
    io::{BufReader, Read, Seek},
};

use anyhow::{bail, Result};
use nalgebra::Vector3;
use tracing::debug;

mod obj;
mod stl;

#[derive(Debug, Default)]
pub struct Mesh {
    pub verts: Vec<Vector3<f32>>,
    pub faces: Vec<[u32; 3]>,
}

/// Extensions [`load_mesh`] understands.
pub const SUPPORTED_FORMATS: [&str; 2] = ["stl", "obj"];

/// Parses a mesh of the given format (the file extension, case insensitive).
/// Vertices with identical positions are merged so faces sharing an edge also
/// share its vertex indices.
pub fn load_mesh<T: Read + Seek>(reader: T, format: &str) -> Result<Mesh> {
    let format = format.to_ascii_lowercase();
    let mut reader = BufReader::new(reader);

    let mesh = match format.as_str() {
        "stl" => stl::parse(&mut reader)?,
        "obj" => obj::parse(&mut reader)?,
        _ => bail!("Unsupported format: {format}"),
    };

    debug!(
        "Parsed {format} mesh {{ vert: {}, face: {} }}",
        mesh.verts.len(),
        mesh.faces.len()
    );
    Ok(mesh)
}

/// Collects faces while deduplicating their vertices.
#[derive(Default)]
struct MeshCollector {
    verts: HashMap<Vector3<u32>, u32>,
    faces: Vec<[u32; 3]>,
}

impl MeshCollector {
    fn push_face(&mut self, face: [Vector3<f32>; 3]) {
        let face = face.map(|vert| self.vert_idx(vert));
        self.faces.push(face);
    }

    fn vert_idx(&mut self, vert: Vector3<f32>) -> u32 {
        let size = self.verts.len() as u32;
        *self.verts.entry(vertex_key(vert)).or_insert(size)
    }

    fn finish(self) -> Mesh {
        let mut verts = self.verts.into_iter().collect::<Vec<_>>();
        verts.sort_by_key(|(_vert, idx)| *idx);
        let verts = (verts.into_iter())
            .map(|(vert, _idx)| vert.map(f32::from_bits))
            .collect();
        Mesh {
            verts,
            faces: self.faces,
        }
    }
}

/// Hash key for a position. `-0.0` maps to the key of `0.0`.
fn vertex_key(vert: Vector3<f32>) -> Vector3<u32> {
    vert.map(|x| if x == 0.0 { 0.0_f32.to_bits() } else { x.to_bits() })
}
