//! Plane / mesh intersection.

use std::collections::HashSet;

use common::config::Axis;
use nalgebra::{Vector2, Vector3};

use crate::{mesh::MeshSource, Pos};

pub mod segments_1d;
pub use segments_1d::Segments1D;

/// An infinite plane through `origin` with a unit `normal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub origin: Vector3<f64>,
    pub normal: Vector3<f64>,
}

/// Where a plane crosses a face: either through the interior of a mesh edge
/// (identified by its sorted vertex indices) or exactly through a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Crossing {
    Edge(u32, u32),
    Vertex(u32),
}

impl Plane {
    /// Creates a plane, normalizing `normal`.
    pub fn new(origin: Vector3<f64>, normal: Vector3<f64>) -> Self {
        Self {
            origin,
            normal: normal.normalize(),
        }
    }

    /// The plane perpendicular to `axis` at `position` along it.
    pub fn axis_aligned(axis: Axis, position: f64) -> Self {
        Self {
            origin: axis.unit() * position,
            normal: axis.unit(),
        }
    }

    /// Signed distance from the plane, positive on the side the normal points
    /// to.
    pub fn distance(&self, point: &Vector3<f64>) -> f64 {
        (point - self.origin).dot(&self.normal)
    }

    /// Coordinates kept when projecting onto the plane: all but the dominant
    /// component of the normal.
    pub fn projection(&self) -> [usize; 2] {
        match self.normal.iamax() {
            0 => Axis::X.others(),
            1 => Axis::Y.others(),
            _ => Axis::Z.others(),
        }
    }
}

/// Intersect the mesh with a plane with linear time complexity, returning
/// every distinct point where the plane crosses the mesh surface, projected to
/// 2D and in the order they were found. [`Segments1D`] does the same while only
/// visiting faces near the plane.
pub fn intersect_plane<M: MeshSource + ?Sized>(mesh: &M, plane: &Plane) -> Vec<Vector2<f64>> {
    intersect_faces(mesh, 0..mesh.faces().len(), plane)
}

/// Like [`intersect_plane`], but only considers the listed faces.
pub fn intersect_faces<M: MeshSource + ?Sized>(
    mesh: &M,
    faces: impl IntoIterator<Item = usize>,
    plane: &Plane,
) -> Vec<Vector2<f64>> {
    let mut crossings = CrossingSet::new(plane.projection());
    for face in faces {
        intersect_triangle(mesh.vertices(), mesh.faces()[face], plane, &mut crossings);
    }
    crossings.points
}

/// Adds the points where the plane crosses one face.
fn intersect_triangle(vertices: &[Pos], face: [u32; 3], plane: &Plane, out: &mut CrossingSet) {
    let points = face.map(|x| vertices[x as usize].cast::<f64>());

    // Positive if the vertex is in front of the plane, negative if it's
    // behind it and zero if it's on it.
    let distances = points.map(|x| plane.distance(&x));
    let sides = distances.map(|x| (x > 0.0) as i8 - (x < 0.0) as i8);

    // A face lying in the plane has no single crossing.
    if sides == [0; 3] {
        return;
    }

    for i in 0..3 {
        if sides[i] == 0 {
            out.insert(Crossing::Vertex(face[i]), || points[i]);
        }
    }

    for (a, b) in [(0, 1), (1, 2), (2, 0)] {
        if sides[a] * sides[b] >= 0 {
            continue;
        }

        // Always walk the edge from its lower to its higher vertex index, so
        // both faces sharing the edge compute a bit-identical point.
        let (a, b) = if face[a] < face[b] { (a, b) } else { (b, a) };
        out.insert(Crossing::Edge(face[a], face[b]), || {
            let t = distances[a] / (distances[a] - distances[b]);
            points[a] + t * (points[b] - points[a])
        });
    }
}

/// Crossing points deduplicated by the mesh feature they lie on, kept in
/// discovery order.
struct CrossingSet {
    projection: [usize; 2],
    seen: HashSet<Crossing>,
    points: Vec<Vector2<f64>>,
}

impl CrossingSet {
    fn new(projection: [usize; 2]) -> Self {
        Self {
            projection,
            seen: HashSet::new(),
            points: Vec::new(),
        }
    }

    fn insert(&mut self, crossing: Crossing, point: impl FnOnce() -> Vector3<f64>) {
        if self.seen.insert(crossing) {
            let point = point();
            let [u, v] = self.projection;
            self.points.push(Vector2::new(point[u], point[v]));
        }
    }
}
