use std::io::BufRead;

use anyhow::{anyhow, Result};
use nalgebra::Vector3;
use obj::{load_obj, Obj, Position};

use crate::{Mesh, MeshCollector};

/// Reads the positions and faces of a Wavefront OBJ file. Texture coordinates
/// and normals are ignored.
pub fn parse<T: BufRead>(reader: T) -> Result<Mesh> {
    let obj: Obj<Position, u32> =
        load_obj(reader).map_err(|err| anyhow!("Failed to read OBJ file: {err}"))?;

    let position = |idx: u32| {
        let [x, y, z] = obj.vertices[idx as usize].position;
        Vector3::new(x, y, z)
    };

    let mut collector = MeshCollector::default();
    for face in obj.indices.chunks_exact(3) {
        collector.push_face([position(face[0]), position(face[1]), position(face[2])]);
    }

    Ok(collector.finish())
}
