use std::io::{Read, Seek};

use anyhow::{Context, Result};
use nalgebra::Vector3;

use crate::{Mesh, MeshCollector};

/// Reads an ASCII or binary STL file. Both flavors are detected by `stl_io`.
pub fn parse<T: Read + Seek>(reader: &mut T) -> Result<Mesh> {
    let stl = stl_io::read_stl(reader).context("Failed to read STL file")?;

    let mut collector = MeshCollector::default();
    for face in stl.faces.iter() {
        collector.push_face(face.vertices.map(|idx| {
            let vert = stl.vertices[idx];
            Vector3::new(vert[0], vert[1], vert[2])
        }));
    }

    Ok(collector.finish())
}
