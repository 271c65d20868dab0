use common::config::Axis;
use nalgebra::Vector2;

use crate::{
    intersection::{intersect_faces, Plane},
    mesh::MeshSource,
};

/// Acceleration structure for mesh slicing. By spiting the mesh into segments
/// along the slicing axis and adding references to all the triangles that
/// overlap each segment, to slice a plane, you don't need to loop through
/// every triangle in the mesh to find all intersecting faces.
pub struct Segments1D {
    axis: Axis,
    start: f64,
    segment_length: f64,

    segments: Vec<Vec<usize>>,
}

impl Segments1D {
    /// Creates a new Segments structure from a given mesh and segment count.
    pub fn from_mesh<M: MeshSource + ?Sized>(mesh: &M, axis: Axis, segment_count: usize) -> Self {
        let segment_count = segment_count.max(1);
        let (min, max) = mesh.bounds();
        let (start, end) = (min[axis.index()] as f64, max[axis.index()] as f64);

        // A flat mesh gets a single segment holding every face.
        let segment_length = match end > start {
            true => (end - start) / segment_count as f64,
            false => 1.0,
        };
        let mut segments = vec![Vec::new(); segment_count + 1];

        // Adds the index of each face into all of the segments it covers.
        for (face, triangle) in mesh.triangles().enumerate() {
            let heights = triangle.map(|x| x[axis.index()] as f64);
            let (min_height, max_height) = (
                heights[0].min(heights[1]).min(heights[2]),
                heights[0].max(heights[1]).max(heights[2]),
            );

            let first = ((min_height - start) / segment_length) as usize;
            let last = ((max_height - start) / segment_length) as usize;
            for segment in segments.iter_mut().take(last + 1).skip(first) {
                segment.push(face);
            }
        }

        Self {
            axis,
            start,
            segment_length,
            segments,
        }
    }

    /// Faces that may touch the plane at `position` along the axis.
    pub fn faces_near(&self, position: f64) -> &[usize] {
        let segment = (position - self.start) / self.segment_length;
        if !(segment >= 0.0) || segment >= self.segments.len() as f64 {
            return &[];
        }

        &self.segments[segment as usize]
    }

    /// Intersects the axis-aligned plane at `position` with the mesh this
    /// instance was built from. Gives the same points as
    /// [`crate::intersection::intersect_plane`].
    pub fn intersect_plane<M: MeshSource + ?Sized>(
        &self,
        mesh: &M,
        position: f64,
    ) -> Vec<Vector2<f64>> {
        let plane = Plane::axis_aligned(self.axis, position);
        intersect_faces(mesh, self.faces_near(position).iter().copied(), &plane)
    }
}
