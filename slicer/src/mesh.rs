use std::{
    collections::HashMap,
    fs::File,
    io::{Read, Seek},
    path::Path,
    slice,
    sync::Arc,
};

use anyhow::{ensure, Context, Result};
use nalgebra::Vector3;
use tracing::{error, info};

use crate::Pos;

/// What the slicing core needs from a mesh: indexed triangles and their
/// bounding box. Faces sharing an edge are expected to share its vertex
/// indices, which is what lets shared crossings be merged.
pub trait MeshSource {
    fn vertices(&self) -> &[Pos];
    fn faces(&self) -> &[[u32; 3]];

    /// Get the minimum and maximum of each component of every vertex. These
    /// points define the axis-aligned bounding box of the mesh.
    fn bounds(&self) -> (Pos, Pos) {
        vertex_bounds(self.vertices())
    }

    fn triangles(&self) -> Triangles<'_> {
        Triangles {
            vertices: self.vertices(),
            faces: self.faces().iter(),
        }
    }
}

/// Iterator over the vertex positions of every face of a [`MeshSource`].
pub struct Triangles<'a> {
    vertices: &'a [Pos],
    faces: slice::Iter<'a, [u32; 3]>,
}

/// An immutable triangle mesh. Cloning is cheap, the geometry is shared.
#[derive(Debug, Clone)]
pub struct Mesh {
    inner: Arc<MeshInner>,
}

#[derive(Debug)]
struct MeshInner {
    vertices: Box<[Pos]>,
    faces: Box<[[u32; 3]]>,
    bounds: (Pos, Pos),
}

/// Summary of a loaded mesh, logged before slicing.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshReport {
    pub vertices: usize,
    pub faces: usize,
    pub dimensions: Vector3<f32>,
    pub volume: f64,
    pub center_mass: Vector3<f64>,
    pub watertight: bool,
}

impl Mesh {
    /// Creates a new mesh from the given vertices and faces. Every face index
    /// must point into `vertices`.
    pub fn new(vertices: Vec<Pos>, faces: Vec<[u32; 3]>) -> Self {
        debug_assert!(faces
            .iter()
            .flatten()
            .all(|&x| (x as usize) < vertices.len()));

        let bounds = vertex_bounds(&vertices);
        Self {
            inner: Arc::new(MeshInner {
                vertices: vertices.into_boxed_slice(),
                faces: faces.into_boxed_slice(),
                bounds,
            }),
        }
    }

    pub fn face(&self, index: usize) -> &[u32; 3] {
        &self.inner.faces[index]
    }

    pub fn face_verts(&self, index: usize) -> [Pos; 3] {
        self.face(index).map(|x| self.inner.vertices[x as usize])
    }

    pub fn vertex_count(&self) -> usize {
        self.inner.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.inner.faces.len()
    }

    /// Size of the bounding box along each axis.
    pub fn dimensions(&self) -> Vector3<f32> {
        let (min, max) = self.inner.bounds;
        max - min
    }

    /// Enclosed volume, from the sum of the signed volumes of the tetrahedra
    /// formed by each face and the origin. Only meaningful for watertight
    /// meshes.
    pub fn volume(&self) -> f64 {
        let signed = self.triangles().fold(0.0, |acc, [a, b, c]| {
            let (a, b, c) = (a.cast::<f64>(), b.cast::<f64>(), c.cast::<f64>());
            acc + a.dot(&b.cross(&c)) / 6.0
        });
        signed.abs()
    }

    /// Center of mass of the enclosed solid, assuming uniform density. Each
    /// face and the origin form a tetrahedron whose centroid is weighted by its
    /// signed volume. Falls back to the mean vertex when the mesh encloses no
    /// volume.
    pub fn center_mass(&self) -> Vector3<f64> {
        let (volume, moment) = self.triangles().fold(
            (0.0, Vector3::zeros()),
            |(volume, moment): (f64, Vector3<f64>), [a, b, c]| {
                let (a, b, c) = (a.cast::<f64>(), b.cast::<f64>(), c.cast::<f64>());
                let tetra = a.dot(&b.cross(&c)) / 6.0;
                (volume + tetra, moment + (a + b + c) * (tetra / 4.0))
            },
        );

        if volume.abs() > f64::EPSILON {
            return moment / volume;
        }

        let vertices = self.vertices();
        let sum = (vertices.iter()).fold(Vector3::zeros(), |acc, x| acc + x.cast::<f64>());
        sum / vertices.len().max(1) as f64
    }

    /// A mesh is watertight when every edge is shared by exactly two faces.
    pub fn is_watertight(&self) -> bool {
        let mut edges = HashMap::<_, u8>::new();

        for [a, b, c] in self.faces() {
            for (a, b) in [(a, b), (b, c), (c, a)] {
                let count = edges.entry((a.min(b), a.max(b))).or_default();
                *count = count.saturating_add(1);
            }
        }

        !edges.is_empty() && edges.values().all(|&count| count == 2)
    }

    pub fn report(&self) -> MeshReport {
        MeshReport {
            vertices: self.vertex_count(),
            faces: self.face_count(),
            dimensions: self.dimensions(),
            volume: self.volume(),
            center_mass: self.center_mass(),
            watertight: self.is_watertight(),
        }
    }
}

impl MeshSource for Mesh {
    fn vertices(&self) -> &[Pos] {
        &self.inner.vertices
    }

    fn faces(&self) -> &[[u32; 3]] {
        &self.inner.faces
    }

    fn bounds(&self) -> (Pos, Pos) {
        self.inner.bounds
    }
}

impl MeshReport {
    pub fn log(&self) {
        let d = self.dimensions;
        info!(
            "Mesh {{ vert: {}, face: {} }}, dimensions (X, Y, Z): ({:.3}, {:.3}, {:.3})",
            self.vertices, self.faces, d.x, d.y, d.z
        );
        info!("Mesh volume: {:.2}", self.volume);
        let c = self.center_mass;
        info!("Mesh center of mass: ({:.3}, {:.3}, {:.3})", c.x, c.y, c.z);

        if self.watertight {
            info!("Mesh is watertight");
        } else {
            error!("Mesh is not watertight, sections may be incomplete");
        }
    }
}

impl Iterator for Triangles<'_> {
    type Item = [Pos; 3];

    fn next(&mut self) -> Option<Self::Item> {
        let face = self.faces.next()?;
        Some(face.map(|x| self.vertices[x as usize]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.faces.size_hint()
    }
}

/// Loads a mesh from a reader. Supported formats are `stl` and `obj`.
pub fn load_mesh<T: Read + Seek>(reader: T, format: &str) -> Result<Mesh> {
    let mesh = mesh_format::load_mesh(reader, format)?;
    ensure!(!mesh.verts.is_empty(), "Mesh has no vertices");
    ensure!(!mesh.faces.is_empty(), "Mesh has no faces");
    ensure!(
        (mesh.faces.iter().flatten()).all(|&x| (x as usize) < mesh.verts.len()),
        "Mesh has faces referencing missing vertices"
    );

    Ok(Mesh::new(mesh.verts, mesh.faces))
}

/// Loads a mesh file, picking the format from its extension.
pub fn load_mesh_file(path: &Path) -> Result<Mesh> {
    info!("Loading mesh `{}`", path.display());

    let format = path
        .extension()
        .with_context(|| format!("`{}` has no file extension", path.display()))?
        .to_string_lossy();
    let file = File::open(path).with_context(|| format!("Failed to open `{}`", path.display()))?;

    load_mesh(file, &format).with_context(|| format!("Failed to load `{}`", path.display()))
}

fn vertex_bounds(vertices: &[Pos]) -> (Pos, Pos) {
    vertices.iter().fold(
        (Pos::repeat(f32::MAX), Pos::repeat(f32::MIN)),
        |(min, max), v| (min.inf(v), max.sup(v)),
    )
}
