//! Resampling of closed contours to a fixed point count.
//!
//! The contour is fit with an interpolating periodic cubic spline and
//! evaluated at evenly spaced parameters. When the spline can't be built, the
//! points are interpolated linearly over their index instead.

use nalgebra::Vector2;
use thiserror::Error;

mod linear;
mod spline;

pub use linear::resample_linear;
pub use spline::PeriodicSpline;

/// Reasons a periodic spline can't be fit through a contour.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("need at least 3 points for a closed curve, got {0}")]
    TooFewPoints(usize),
    #[error("points {0} and {1} coincide")]
    CoincidentPoints(usize, usize),
    #[error("all points are collinear")]
    Collinear,
    #[error("spline system is singular")]
    Singular,
    #[error("spline fit produced non-finite values")]
    NonFinite,
}

/// How a contour was resampled.
#[derive(Debug, Clone, PartialEq)]
pub enum FitMethod {
    Spline,
    /// The spline fit failed for the contained reason and the points were
    /// interpolated linearly instead.
    Linear(FitError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resampled {
    pub points: Vec<Vector2<f64>>,
    pub method: FitMethod,
}

/// Parameters of `count` evenly spaced samples around a closed curve:
/// `0, 1/count, ..., (count - 1)/count`.
pub fn sample_parameters(count: usize) -> impl Iterator<Item = f64> {
    (0..count).map(move |i| i as f64 / count as f64)
}

/// Resamples an ordered closed contour to exactly `count` points, keeping
/// its traversal direction. The first output point is the first input point.
pub fn resample(points: &[Vector2<f64>], count: usize) -> Resampled {
    match PeriodicSpline::fit(points) {
        Ok(spline) => Resampled {
            points: spline.sample(count),
            method: FitMethod::Spline,
        },
        Err(err) => Resampled {
            points: resample_linear(points, count),
            method: FitMethod::Linear(err),
        },
    }
}
