use std::f32::consts::{PI, TAU};

use common::config::Axis;

use crate::{mesh::Mesh, Pos};

/// Builds simple synthetic meshes, mostly for tests and benchmarks.
pub struct MeshBuilder {
    vertices: Vec<Pos>,
    faces: Vec<[u32; 3]>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    pub fn add_vertex(&mut self, vertex: Pos) -> u32 {
        self.vertices.push(vertex);
        (self.vertices.len() - 1) as u32
    }

    pub fn add_face(&mut self, face: [u32; 3]) {
        self.faces.push(face);
    }

    pub fn add_quad(&mut self, quad: [u32; 4]) {
        self.add_face([quad[0], quad[1], quad[2]]);
        self.add_face([quad[2], quad[1], quad[3]]);
    }

    pub fn build(self) -> Mesh {
        Mesh::new(self.vertices, self.faces)
    }
}

impl MeshBuilder {
    /// Adds a cylinder (or a cone frustum if the radii differ) running along
    /// `axis` from `start` for `length` units. The side is made of `precision`
    /// quads. When `capped` is false both ends are left open.
    pub fn add_cylinder(
        &mut self,
        axis: Axis,
        start: Pos,
        length: f32,
        (start_radius, end_radius): (f32, f32),
        precision: u32,
        capped: bool,
    ) {
        let mut end = start;
        end[axis.index()] += length;

        let start_ring = self.add_ring(axis, start, start_radius, precision);
        let end_ring = self.add_ring(axis, end, end_radius, precision);
        self.stitch_rings(&start_ring, &end_ring);

        if capped {
            let start_center = self.add_vertex(start);
            let end_center = self.add_vertex(end);
            self.add_fan(start_center, &start_ring, true);
            self.add_fan(end_center, &end_ring, false);
        }
    }

    /// Adds a closed UV sphere. The poles sit on `axis`, so slicing along that
    /// axis gives circular sections.
    pub fn add_sphere(&mut self, axis: Axis, center: Pos, radius: f32, rings: u32, segments: u32) {
        let rings = rings.max(2);
        let mut pole = Pos::zeros();
        pole[axis.index()] = radius;

        let south = self.add_vertex(center - pole);
        let mut last_ring: Option<Vec<u32>> = None;
        for ring in 1..rings {
            let polar = PI * ring as f32 / rings as f32;
            let mut ring_center = center - pole;
            ring_center[axis.index()] += radius * (1.0 - polar.cos());

            let ring = self.add_ring(axis, ring_center, radius * polar.sin(), segments);
            match &last_ring {
                Some(last) => self.stitch_rings(last, &ring),
                None => self.add_fan(south, &ring, true),
            }
            last_ring = Some(ring);
        }

        let north = self.add_vertex(center + pole);
        if let Some(last) = last_ring {
            self.add_fan(north, &last, false);
        }
    }

    fn add_ring(&mut self, axis: Axis, center: Pos, radius: f32, precision: u32) -> Vec<u32> {
        let [u, v] = axis.others();
        (0..precision)
            .map(|i| {
                let angle = TAU * (i as f32) / (precision as f32);
                let mut vertex = center;
                vertex[u] += angle.cos() * radius;
                vertex[v] += angle.sin() * radius;
                self.add_vertex(vertex)
            })
            .collect()
    }

    fn stitch_rings(&mut self, a: &[u32], b: &[u32]) {
        debug_assert_eq!(a.len(), b.len());
        for i in 0..a.len() {
            let next = (i + 1) % a.len();
            self.add_quad([a[i], b[i], a[next], b[next]]);
        }
    }

    fn add_fan(&mut self, center: u32, ring: &[u32], flip: bool) {
        for i in 0..ring.len() {
            let next = ring[(i + 1) % ring.len()];
            match flip {
                true => self.add_face([center, next, ring[i]]),
                false => self.add_face([center, ring[i], next]),
            }
        }
    }
}

impl Default for MeshBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MeshSource;

    #[test]
    fn sphere_is_closed() {
        let mut builder = MeshBuilder::new();
        builder.add_sphere(Axis::Y, Pos::new(1.0, 2.0, 3.0), 2.0, 12, 24);
        let mesh = builder.build();

        assert!(mesh.is_watertight());
        assert_eq!(mesh.vertex_count(), 2 + 11 * 24);

        let (min, max) = mesh.bounds();
        assert!((min.y - 0.0).abs() < 1e-5 && (max.y - 4.0).abs() < 1e-5);
        for vertex in mesh.vertices() {
            let distance = (vertex - Pos::new(1.0, 2.0, 3.0)).norm();
            assert!((distance - 2.0).abs() < 1e-5);
        }
    }

    #[test]
    fn frustum_radii() {
        let mut builder = MeshBuilder::new();
        builder.add_cylinder(Axis::Z, Pos::zeros(), 4.0, (2.0, 1.0), 16, true);
        let mesh = builder.build();

        assert!(mesh.is_watertight());
        let (min, max) = mesh.bounds();
        assert_eq!((min.z, max.z), (0.0, 4.0));
        assert!((max.x - 2.0).abs() < 1e-6);
    }
}
