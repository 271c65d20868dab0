use nalgebra::Vector2;

/// One resampled cross-section of the mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// 1-based ordinal of the slicing plane. Planes that produced no section
    /// leave gaps, so this isn't always contiguous.
    pub index: u32,
    /// Position of the slicing plane along the slicing axis.
    pub axis_position: f64,
    /// Points of the closed contour, in traversal order. The closing edge from
    /// the last point back to the first is implicit.
    pub points: Vec<Vector2<f64>>,
}

impl Section {
    pub fn new(index: u32, axis_position: f64, points: Vec<Vector2<f64>>) -> Self {
        Self {
            index,
            axis_position,
            points,
        }
    }

    /// Minimum and maximum of each coordinate of the section's points.
    pub fn bounds(&self) -> Option<(Vector2<f64>, Vector2<f64>)> {
        let first = *self.points.first()?;
        Some(self.points.iter().fold((first, first), |(min, max), point| {
            (min.inf(point), max.sup(point))
        }))
    }
}
