//! Ordering of unordered section points into a closed traversal.
//!
//! Points are sorted by their polar angle around the centroid. This is exact
//! for sections that are star-shaped with respect to their centroid, which
//! covers convex and most near-convex fuselage sections. Strongly concave
//! sections can come out misordered; walking the intersection edge graph would
//! fix that but would also change the traversal downstream tools see.

use nalgebra::Vector2;
use ordered_float::OrderedFloat;

/// Arithmetic mean of the points, `None` for an empty set.
pub fn centroid(points: &[Vector2<f64>]) -> Option<Vector2<f64>> {
    if points.is_empty() {
        return None;
    }

    let sum = points.iter().fold(Vector2::zeros(), |acc, x| acc + x);
    Some(sum / points.len() as f64)
}

/// Sorts the points by ascending angle around their centroid, from -π to π.
/// The sort is stable, so points at equal angles keep their original order.
pub fn sort_by_angle(points: &mut [Vector2<f64>]) {
    let Some(center) = centroid(points) else {
        return;
    };

    points.sort_by_cached_key(|point| {
        let offset = point - center;
        OrderedFloat(offset.y.atan2(offset.x))
    });
}
