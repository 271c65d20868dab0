use common::{
    config::{Axis, SectionConfig},
    progress::Progress,
};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use section_format::Section;
use thiserror::Error;

use crate::{
    contour,
    diagnostics::{Diagnostic, DiagnosticSink},
    intersection::Segments1D,
    mesh::MeshSource,
    resample::{resample, FitMethod},
};

/// Number of bins faces are sorted into along the slicing axis.
const SEGMENT_COUNT: usize = 100;

/// Cuts a mesh into evenly spaced cross-sections along one axis, each
/// resampled to a fixed number of points.
pub struct SectionPipeline {
    config: SectionConfig,
    progress: Progress,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("section count must be at least 1")]
    InvalidSectionCount,
    #[error("points per section must be at least 1")]
    InvalidPointCount,
    #[error("minimum intersection point count must be at least 3, got {0}")]
    InvalidMinPoints(usize),
    #[error("inset fraction must be in (0, 0.5), got {0}")]
    InvalidInset(f64),
    #[error("mesh has no vertices or faces")]
    EmptyMesh,
    #[error("mesh has no extent along the {0} axis")]
    ZeroExtent(Axis),
}

/// Result of slicing one plane, along with the diagnostics it raised. These
/// are kept per plane so they can be reported in plane order no matter which
/// thread did the work.
struct PlaneOutcome {
    section: Option<Section>,
    diagnostics: Vec<Diagnostic>,
}

impl SectionPipeline {
    pub fn new(config: SectionConfig) -> Self {
        Self {
            config,
            progress: Progress::new(),
        }
    }

    pub fn config(&self) -> &SectionConfig {
        &self.config
    }

    /// Gets a handle to the progress counter, which counts finished planes.
    pub fn progress(&self) -> Progress {
        self.progress.clone()
    }

    fn validate(&self) -> Result<(), PipelineError> {
        let config = &self.config;
        if config.sections < 1 {
            return Err(PipelineError::InvalidSectionCount);
        }
        if config.points_per_section < 1 {
            return Err(PipelineError::InvalidPointCount);
        }
        if config.min_points < 3 {
            return Err(PipelineError::InvalidMinPoints(config.min_points));
        }
        if !(config.inset_fraction > 0.0 && config.inset_fraction < 0.5) {
            return Err(PipelineError::InvalidInset(config.inset_fraction));
        }

        Ok(())
    }

    /// Slices the mesh, returning the sections that could be made in plane
    /// order. Planes that miss the mesh or cross it at too few points are
    /// skipped with a warning, so the result may be shorter than the
    /// configured section count or even empty.
    pub fn run<M: MeshSource + Sync + ?Sized>(
        &self,
        mesh: &M,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Vec<Section>, PipelineError> {
        self.validate()?;
        if mesh.vertices().is_empty() || mesh.faces().is_empty() {
            return Err(PipelineError::EmptyMesh);
        }

        let axis = self.config.axis;
        let (min, max) = mesh.bounds();
        let (start, end) = (min[axis.index()] as f64, max[axis.index()] as f64);
        if !(end > start) {
            return Err(PipelineError::ZeroExtent(axis));
        }

        let positions =
            plane_positions(start, end, self.config.sections, self.config.inset_fraction);
        sink.emit(Diagnostic::Started {
            sections: self.config.sections,
            axis,
            range: positions[0]..positions[positions.len() - 1],
        });

        self.progress.reset(positions.len() as u64);
        let segments = Segments1D::from_mesh(mesh, axis, SEGMENT_COUNT);

        let slice = |plane: usize| {
            let outcome = self.slice_plane(mesh, &segments, plane as u32 + 1, positions[plane]);
            self.progress.add_complete(1);
            outcome
        };

        let outcomes = match self.config.parallel {
            true => (0..positions.len())
                .into_par_iter()
                .map(&slice)
                .collect::<Vec<_>>(),
            false => (0..positions.len()).map(&slice).collect::<Vec<_>>(),
        };

        let mut sections = Vec::new();
        for outcome in outcomes {
            for diagnostic in outcome.diagnostics {
                sink.emit(diagnostic);
            }
            sections.extend(outcome.section);
        }

        sink.emit(Diagnostic::Finished {
            produced: sections.len(),
            requested: self.config.sections,
        });
        self.progress.set_finished();

        Ok(sections)
    }

    fn slice_plane<M: MeshSource + ?Sized>(
        &self,
        mesh: &M,
        segments: &Segments1D,
        index: u32,
        position: f64,
    ) -> PlaneOutcome {
        let mut diagnostics = Vec::new();

        let mut points = segments.intersect_plane(mesh, position);
        if points.is_empty() {
            diagnostics.push(Diagnostic::NoIntersection { index, position });
            return PlaneOutcome::skipped(diagnostics);
        }

        if points.len() < self.config.min_points {
            diagnostics.push(Diagnostic::TooFewPoints {
                index,
                position,
                count: points.len(),
                required: self.config.min_points,
            });
            return PlaneOutcome::skipped(diagnostics);
        }

        let raw_points = points.len();
        contour::sort_by_angle(&mut points);

        let resampled = resample(&points, self.config.points_per_section as usize);
        if let FitMethod::Linear(reason) = resampled.method {
            diagnostics.push(Diagnostic::LinearFallback {
                index,
                position,
                reason,
            });
        }

        diagnostics.push(Diagnostic::SectionProduced {
            index,
            position,
            raw_points,
        });

        PlaneOutcome {
            section: Some(Section::new(index, position, resampled.points)),
            diagnostics,
        }
    }
}

impl PlaneOutcome {
    fn skipped(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            section: None,
            diagnostics,
        }
    }
}

/// Positions of `count` evenly spaced planes between `start` and `end`, each
/// end moved inwards by `inset_fraction` of the extent. A single plane sits at
/// the first position.
pub fn plane_positions(start: f64, end: f64, count: u32, inset_fraction: f64) -> Vec<f64> {
    let inset = inset_fraction * (end - start);
    let (first, last) = (start + inset, end - inset);

    match count {
        0 => Vec::new(),
        1 => vec![first],
        _ => {
            let step = (last - first) / (count - 1) as f64;
            (0..count)
                .map(|i| match i == count - 1 {
                    true => last,
                    false => first + step * i as f64,
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use proptest::prelude::*;

    use super::*;
    use crate::{
        builder::MeshBuilder,
        mesh::{load_mesh, Mesh},
        resample::FitError,
        Pos,
    };

    fn sphere(radius: f32) -> Mesh {
        let mut builder = MeshBuilder::new();
        builder.add_sphere(Axis::X, Pos::zeros(), radius, 32, 48);
        builder.build()
    }

    fn config(sections: u32, points_per_section: u32) -> SectionConfig {
        SectionConfig {
            sections,
            points_per_section,
            ..Default::default()
        }
    }

    #[test]
    fn positions() {
        assert_eq!(plane_positions(0.0, 10.0, 3, 0.1), vec![1.0, 5.0, 9.0]);
        assert_eq!(plane_positions(-1.0, 1.0, 1, 0.01), vec![-0.98]);
        assert_eq!(plane_positions(0.0, 1.0, 5, 0.0), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert!(plane_positions(0.0, 1.0, 0, 0.0).is_empty());
    }

    #[test]
    fn sphere_sections_are_circles() {
        let radius = 5.0;
        let pipeline = SectionPipeline::new(config(4, 40));
        let mut diagnostics = Vec::<Diagnostic>::new();
        let sections = pipeline.run(&sphere(radius), &mut diagnostics).unwrap();

        assert_eq!(
            sections.iter().map(|x| x.index).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );

        for section in &sections {
            let x = section.axis_position;
            let expected = (radius as f64 * radius as f64 - x * x).sqrt();
            assert_eq!(section.points.len(), 40);
            for point in &section.points {
                assert!(
                    (point.norm() - expected).abs() < 0.05 * radius as f64,
                    "section {} at {x}: {} vs {expected}",
                    section.index,
                    point.norm()
                );
            }
        }

        assert!(matches!(diagnostics.first(), Some(Diagnostic::Started { sections: 4, .. })));
        assert_eq!(
            diagnostics.last(),
            Some(&Diagnostic::Finished {
                produced: 4,
                requested: 4
            })
        );
        assert!(!diagnostics
            .iter()
            .any(|x| matches!(x, Diagnostic::LinearFallback { .. })));
    }

    #[test]
    fn skipped_planes_leave_gaps() {
        // Two cylinders along X with empty space between them.
        let mut builder = MeshBuilder::new();
        builder.add_cylinder(Axis::X, Pos::zeros(), 2.0, (1.0, 1.0), 32, true);
        builder.add_cylinder(Axis::X, Pos::new(8.0, 0.0, 0.0), 2.0, (1.0, 1.0), 32, true);
        let mesh = builder.build();

        // Planes at 0.1, 2.55, 5.0, 7.45 and 9.9.
        let pipeline = SectionPipeline::new(config(5, 30));
        let mut diagnostics = Vec::<Diagnostic>::new();
        let sections = pipeline.run(&mesh, &mut diagnostics).unwrap();

        assert_eq!(sections.iter().map(|x| x.index).collect::<Vec<_>>(), vec![1, 5]);
        assert!((sections[0].axis_position - 0.1).abs() < 1e-12);
        assert!((sections[1].axis_position - 9.9).abs() < 1e-12);

        let missed = diagnostics
            .iter()
            .filter_map(|x| match x {
                Diagnostic::NoIntersection { index, .. } => Some(*index),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(missed, vec![2, 3, 4]);
    }

    #[test]
    fn too_few_points_are_reported() {
        // An 8 sided prism only gives 16 crossing points per plane.
        let mut builder = MeshBuilder::new();
        builder.add_cylinder(Axis::Z, Pos::zeros(), 3.0, (1.0, 1.0), 8, true);
        let mesh = builder.build();

        let pipeline = SectionPipeline::new(SectionConfig {
            axis: Axis::Z,
            sections: 2,
            min_points: 20,
            ..Default::default()
        });
        let mut diagnostics = Vec::<Diagnostic>::new();
        let sections = pipeline.run(&mesh, &mut diagnostics).unwrap();

        assert!(sections.is_empty());
        assert!(diagnostics.contains(&Diagnostic::TooFewPoints {
            index: 1,
            position: 0.03,
            count: 16,
            required: 20,
        }));
        assert_eq!(
            diagnostics.last(),
            Some(&Diagnostic::Finished {
                produced: 0,
                requested: 2
            })
        );
    }

    #[test]
    fn flat_section_falls_back_to_linear() {
        // A flat strip in the XY plane: every X section is a line segment.
        let mut builder = MeshBuilder::new();
        let rows = (0..12)
            .map(|y| {
                let y = y as f32;
                [
                    builder.add_vertex(Pos::new(0.0, y, 0.0)),
                    builder.add_vertex(Pos::new(10.0, y, 0.0)),
                ]
            })
            .collect::<Vec<_>>();
        for pair in rows.windows(2) {
            builder.add_quad([pair[0][0], pair[0][1], pair[1][0], pair[1][1]]);
        }

        let pipeline = SectionPipeline::new(config(3, 16));
        let mut diagnostics = Vec::<Diagnostic>::new();
        let sections = pipeline.run(&builder.build(), &mut diagnostics).unwrap();

        assert_eq!(sections.len(), 3);
        for section in &sections {
            assert_eq!(section.points.len(), 16);
            assert!(section.points.iter().all(|x| x.y == 0.0));
        }

        let fallbacks = diagnostics
            .iter()
            .filter(|x| {
                matches!(
                    x,
                    Diagnostic::LinearFallback {
                        reason: FitError::Collinear,
                        ..
                    }
                )
            })
            .count();
        assert_eq!(fallbacks, 3);
    }

    /// Writes `mesh` as ASCII STL, giving zero coordinates a minus sign in
    /// every other facet.
    fn signed_zero_stl(mesh: &Mesh) -> String {
        let mut out = String::from("solid cylinder\n");
        for (i, face) in mesh.triangles().enumerate() {
            let odd = i % 2 == 1;
            out.push_str("  facet normal 0 0 0\n    outer loop\n");
            for vertex in face {
                let [x, y, z] = [vertex.x, vertex.y, vertex.z].map(|x| match x == 0.0 && odd {
                    true => "-0".to_owned(),
                    false => x.to_string(),
                });
                out.push_str(&format!("      vertex {x} {y} {z}\n"));
            }
            out.push_str("    endloop\n  endfacet\n");
        }
        out.push_str("endsolid cylinder\n");
        out
    }

    #[test]
    fn signed_zero_stl_keeps_shared_crossings() {
        let mut builder = MeshBuilder::new();
        builder.add_cylinder(Axis::X, Pos::zeros(), 10.0, (1.0, 1.0), 32, true);
        let built = builder.build();

        let stl = signed_zero_stl(&built);
        assert!(stl.contains(" -0"));
        let mesh = load_mesh(Cursor::new(stl.into_bytes()), "stl").unwrap();
        assert_eq!(mesh.vertex_count(), built.vertex_count());
        assert!(mesh.is_watertight());

        let pipeline = SectionPipeline::new(SectionConfig::default());
        let mut diagnostics = Vec::<Diagnostic>::new();
        let sections = pipeline.run(&mesh, &mut diagnostics).unwrap();

        assert_eq!(sections.len(), 10);
        assert!(!diagnostics
            .iter()
            .any(|x| matches!(x, Diagnostic::LinearFallback { .. })));
    }

    #[test]
    fn parallel_matches_sequential() {
        let mut builder = MeshBuilder::new();
        builder.add_sphere(Axis::Y, Pos::new(1.0, 2.0, 3.0), 4.0, 24, 36);
        builder.add_cylinder(Axis::Y, Pos::new(1.0, 7.0, 3.0), 4.0, (1.0, 0.2), 24, true);
        let mesh = builder.build();

        let run = |parallel| {
            let pipeline = SectionPipeline::new(SectionConfig {
                axis: Axis::Y,
                sections: 17,
                parallel,
                ..Default::default()
            });
            let mut diagnostics = Vec::<Diagnostic>::new();
            let sections = pipeline.run(&mesh, &mut diagnostics).unwrap();
            (sections, diagnostics)
        };

        let sequential = run(false);
        assert_eq!(sequential, run(true));
        assert_eq!(sequential, run(false));
    }

    #[test]
    fn progress_counts_planes() {
        let pipeline = SectionPipeline::new(config(7, 30));
        let progress = pipeline.progress();
        assert!(!progress.complete());

        pipeline.run(&sphere(1.0), &mut Vec::<Diagnostic>::new()).unwrap();
        assert_eq!(progress.total(), 7);
        assert_eq!(progress.completed(), 7);
        assert!(progress.complete());
    }

    #[test]
    fn invalid_input() {
        let mesh = sphere(1.0);
        let error = |config: SectionConfig| {
            SectionPipeline::new(config)
                .run(&mesh, &mut Vec::<Diagnostic>::new())
                .unwrap_err()
        };

        assert_eq!(error(config(0, 30)), PipelineError::InvalidSectionCount);
        assert_eq!(error(config(5, 0)), PipelineError::InvalidPointCount);
        assert_eq!(
            error(SectionConfig {
                min_points: 2,
                ..Default::default()
            }),
            PipelineError::InvalidMinPoints(2)
        );
        assert_eq!(
            error(SectionConfig {
                inset_fraction: 0.5,
                ..Default::default()
            }),
            PipelineError::InvalidInset(0.5)
        );
        assert_eq!(
            error(SectionConfig {
                inset_fraction: 0.0,
                ..Default::default()
            }),
            PipelineError::InvalidInset(0.0)
        );

        let pipeline = SectionPipeline::new(SectionConfig::default());
        let empty = Mesh::new(Vec::new(), Vec::new());
        assert_eq!(
            pipeline.run(&empty, &mut Vec::<Diagnostic>::new()),
            Err(PipelineError::EmptyMesh)
        );

        let flat = Mesh::new(
            vec![
                Pos::new(1.0, 0.0, 0.0),
                Pos::new(1.0, 1.0, 0.0),
                Pos::new(1.0, 0.0, 1.0),
            ],
            vec![[0, 1, 2]],
        );
        assert_eq!(
            pipeline.run(&flat, &mut Vec::<Diagnostic>::new()),
            Err(PipelineError::ZeroExtent(Axis::X))
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn sections_are_ordered_and_sized(sections in 1..16_u32, points in 1..64_u32) {
            let mesh = sphere(2.0);
            let (min, max) = mesh.bounds();
            let pipeline = SectionPipeline::new(config(sections, points));
            let result = pipeline.run(&mesh, &mut Vec::<Diagnostic>::new()).unwrap();

            prop_assert!(result.len() <= sections as usize);
            for section in &result {
                prop_assert_eq!(section.points.len(), points as usize);
                prop_assert!(section.index >= 1 && section.index <= sections);
                prop_assert!(section.axis_position > min.x as f64);
                prop_assert!(section.axis_position < max.x as f64);
            }
            for pair in result.windows(2) {
                prop_assert!(pair[0].index < pair[1].index);
                prop_assert!(pair[0].axis_position < pair[1].axis_position);
            }
        }
    }
}
