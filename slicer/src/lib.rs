//! Cuts a triangle mesh into a series of planar cross-sections along one axis.
//! Each section is the closed curve where a plane crosses the mesh surface,
//! ordered into a loop and resampled to a fixed number of points. The
//! [`pipeline::SectionPipeline`] ties the steps together.

use nalgebra::Vector3;

pub mod builder;
pub mod contour;
pub mod diagnostics;
pub mod intersection;
pub mod mesh;
pub mod pipeline;
pub mod resample;

pub type Pos = Vector3<f32>;
