//! Static preview of a set of sections, one grid cell per section.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use nalgebra::Vector2;
use svg::{
    node::element::{Circle, Polygon, Rectangle},
    Document,
};

use crate::Section;

/// Size of one grid cell in SVG user units.
const CELL_SIZE: f64 = 100.0;
/// Space left around the contour inside each cell.
const CELL_MARGIN: f64 = 8.0;

pub struct SvgPreview<'a> {
    sections: &'a [Section],
}

impl<'a> SvgPreview<'a> {
    pub fn new(sections: &'a [Section]) -> Self {
        Self { sections }
    }

    /// Builds the document. All sections share one scale so their relative
    /// sizes can be compared, and the vertical axis points up.
    pub fn document(&self) -> Document {
        let sides = grid_sides(self.sections.len());
        let size = CELL_SIZE * sides as f64;

        let mut svg = Document::new()
            .set("viewBox", (0.0, 0.0, size, size))
            .set("width", format!("{size}mm"))
            .set("height", format!("{size}mm"));

        let Some((min, max)) = self.bounds() else {
            return svg;
        };
        let extent = (max - min).max().max(f64::EPSILON);
        let scale = (CELL_SIZE - 2.0 * CELL_MARGIN) / extent;
        let center = (min + max) / 2.0;

        for (idx, section) in self.sections.iter().enumerate() {
            let (x, y) = (idx % sides, idx / sides);
            let offset = Vector2::new(x as f64, y as f64) * CELL_SIZE;
            let cell_center = offset + Vector2::repeat(CELL_SIZE / 2.0);

            svg = svg.add(
                Rectangle::new()
                    .set("x", offset.x)
                    .set("y", offset.y)
                    .set("width", CELL_SIZE)
                    .set("height", CELL_SIZE)
                    .set("fill", "none")
                    .set("stroke", "gray")
                    .set("stroke-width", "0.2"),
            );

            let to_cell = |point: &Vector2<f64>| {
                let local = (point - center) * scale;
                (cell_center.x + local.x, cell_center.y - local.y)
            };

            let points = section.points.iter().map(to_cell).collect::<Vec<_>>();
            svg = svg.add(
                Polygon::new()
                    .set("points", points)
                    .set("fill", "none")
                    .set("stroke", "black")
                    .set("stroke-width", "0.3"),
            );

            // Mark the first point so the traversal start is visible.
            if let Some(first) = section.points.first() {
                let (cx, cy) = to_cell(first);
                svg = svg.add(
                    Circle::new()
                        .set("cx", cx)
                        .set("cy", cy)
                        .set("r", 1.0)
                        .set("fill", "red"),
                );
            }
        }

        svg
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.document().to_string())
            .with_context(|| format!("Failed to write preview `{}`", path.display()))
    }

    fn bounds(&self) -> Option<(Vector2<f64>, Vector2<f64>)> {
        self.sections
            .iter()
            .filter_map(Section::bounds)
            .reduce(|(a_min, a_max), (b_min, b_max)| (a_min.inf(&b_min), a_max.sup(&b_max)))
    }
}

/// Number of cells along each side of the smallest square grid holding
/// `count` cells.
fn grid_sides(count: usize) -> usize {
    let mut sides = 1;
    while sides * sides < count {
        sides += 1;
    }
    sides
}
