use nalgebra::Vector2;

use super::sample_parameters;

/// Linearly interpolates the point sequence at `count` evenly spaced
/// parameters. Point `i` of `m` sits at parameter `i / (m - 1)`, so the
/// samples follow the open polyline from the first to the last point and
/// never cross back over the closing edge.
pub fn resample_linear(points: &[Vector2<f64>], count: usize) -> Vec<Vector2<f64>> {
    let m = points.len();
    match m {
        0 => return Vec::new(),
        1 => return vec![points[0]; count],
        _ => {}
    }

    sample_parameters(count)
        .map(|t| {
            let position = t * (m - 1) as f64;
            let index = (position.floor() as usize).min(m - 2);
            let local = position - index as f64;

            let (a, b) = (points[index], points[index + 1]);
            a + (b - a) * local
        })
        .collect()
}
