use std::ops::{Div, Mul, Sub};

use nalgebra::Vector2;

use super::{sample_parameters, FitError};

/// Chord lengths shorter than this fraction of the perimeter count as
/// coincident points.
const MIN_CHORD: f64 = 1e-12;
/// Points closer than this fraction of the contour size to the line through
/// its extreme points count as collinear.
const MIN_SPREAD: f64 = 1e-9;

/// A closed C2 cubic spline passing through every control point. It's
/// parameterized by normalized chord length over `[0, 1)`, with the closing
/// chord from the last point back to the first included, and wraps around at
/// 1.
#[derive(Debug, Clone)]
pub struct PeriodicSpline {
    /// Control points, the first one is repeated at the end.
    points: Vec<Vector2<f64>>,
    /// Parameter of each control point, from 0 to 1 inclusive.
    knots: Vec<f64>,
    /// Second derivative at each control point, the first one is repeated at
    /// the end.
    moments: Vec<Vector2<f64>>,
}

impl PeriodicSpline {
    pub fn fit(points: &[Vector2<f64>]) -> Result<Self, FitError> {
        let n = points.len();
        if n < 3 {
            return Err(FitError::TooFewPoints(n));
        }

        let chords = (0..n)
            .map(|i| (points[(i + 1) % n] - points[i]).norm())
            .collect::<Vec<_>>();
        let perimeter = chords.iter().sum::<f64>();
        if !perimeter.is_finite() {
            return Err(FitError::NonFinite);
        }

        if let Some(i) = chords.iter().position(|&x| x <= MIN_CHORD * perimeter) {
            return Err(FitError::CoincidentPoints(i, (i + 1) % n));
        }

        if is_collinear(points) {
            return Err(FitError::Collinear);
        }

        let mut knots = Vec::with_capacity(n + 1);
        knots.push(0.0);
        let mut length = 0.0;
        for chord in &chords[..n - 1] {
            length += chord;
            knots.push(length / perimeter);
        }
        knots.push(1.0);

        let spans = knots.windows(2).map(|x| x[1] - x[0]).collect::<Vec<_>>();
        if spans.iter().any(|&x| !(x > 0.0)) {
            return Err(FitError::CoincidentPoints(0, 1));
        }

        // Continuity of the first derivative at every control point gives one
        // equation per point in the second derivatives m:
        //   h[i-1] m[i-1] + 2 (h[i-1] + h[i]) m[i] + h[i] m[i+1]
        //     = 6 ((p[i+1] - p[i]) / h[i] - (p[i] - p[i-1]) / h[i-1])
        // with every index taken modulo n.
        let prev = |i: usize| (i + n - 1) % n;
        let lower = (0..n).map(|i| spans[prev(i)]).collect::<Vec<_>>();
        let diagonal = (0..n)
            .map(|i| 2.0 * (spans[prev(i)] + spans[i]))
            .collect::<Vec<_>>();
        let upper = spans.clone();
        let rhs = (0..n)
            .map(|i| {
                let next = (points[(i + 1) % n] - points[i]) / spans[i];
                let last = (points[i] - points[prev(i)]) / spans[prev(i)];
                (next - last) * 6.0
            })
            .collect::<Vec<_>>();

        let mut moments = solve_cyclic(&lower, &diagonal, &upper, &rhs)?;
        if moments.iter().any(|x| !x.iter().all(|c| c.is_finite())) {
            return Err(FitError::NonFinite);
        }
        moments.push(moments[0]);

        let mut points = points.to_vec();
        points.push(points[0]);

        Ok(Self {
            points,
            knots,
            moments,
        })
    }

    /// Number of control points.
    pub fn len(&self) -> usize {
        self.points.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evaluates the spline at `t`, wrapped into `[0, 1)`.
    pub fn evaluate(&self, t: f64) -> Vector2<f64> {
        let t = t.rem_euclid(1.0);

        // The segment i with knots[i] <= t < knots[i + 1].
        let segment = self.knots.partition_point(|&x| x <= t).clamp(1, self.len()) - 1;

        let (t0, t1) = (self.knots[segment], self.knots[segment + 1]);
        let (p0, p1) = (self.points[segment], self.points[segment + 1]);
        let (m0, m1) = (self.moments[segment], self.moments[segment + 1]);
        let h = t1 - t0;
        let (a, b) = (t1 - t, t - t0);

        m0 * (a * a * a / (6.0 * h))
            + m1 * (b * b * b / (6.0 * h))
            + (p0 / h - m0 * (h / 6.0)) * a
            + (p1 / h - m1 * (h / 6.0)) * b
    }

    /// Evaluates the spline at `count` evenly spaced parameters.
    pub fn sample(&self, count: usize) -> Vec<Vector2<f64>> {
        sample_parameters(count).map(|t| self.evaluate(t)).collect()
    }
}

/// Checks if every point lies (within tolerance) on the line through the
/// first point and the point farthest from it.
fn is_collinear(points: &[Vector2<f64>]) -> bool {
    let origin = points[0];
    let Some(far) = points
        .iter()
        .map(|x| x - origin)
        .max_by(|a, b| a.norm_squared().total_cmp(&b.norm_squared()))
    else {
        return true;
    };

    let length = far.norm();
    if length == 0.0 {
        return true;
    }

    let direction = far / length;
    points.iter().all(|x| {
        let offset = x - origin;
        (offset.x * direction.y - offset.y * direction.x).abs() <= MIN_SPREAD * length
    })
}

/// Solves a tridiagonal system with the Thomas algorithm. `lower[0]` and
/// `upper[n - 1]` are ignored.
fn solve_tridiagonal<T>(
    lower: &[f64],
    diagonal: &[f64],
    upper: &[f64],
    rhs: &[T],
) -> Result<Vec<T>, FitError>
where
    T: Copy + Sub<Output = T> + Mul<f64, Output = T> + Div<f64, Output = T>,
{
    let n = diagonal.len();
    let mut upper_prime = vec![0.0; n];
    let mut rhs_prime = Vec::with_capacity(n);

    let mut pivot = diagonal[0];
    if pivot == 0.0 {
        return Err(FitError::Singular);
    }
    upper_prime[0] = upper[0] / pivot;
    rhs_prime.push(rhs[0] / pivot);

    for i in 1..n {
        pivot = diagonal[i] - lower[i] * upper_prime[i - 1];
        if pivot == 0.0 || !pivot.is_finite() {
            return Err(FitError::Singular);
        }
        upper_prime[i] = upper[i] / pivot;
        let value = (rhs[i] - rhs_prime[i - 1] * lower[i]) / pivot;
        rhs_prime.push(value);
    }

    for i in (0..n - 1).rev() {
        rhs_prime[i] = rhs_prime[i] - rhs_prime[i + 1] * upper_prime[i];
    }

    Ok(rhs_prime)
}

/// Solves a cyclic tridiagonal system, where `lower[0]` couples the first
/// row to the last unknown and `upper[n - 1]` couples the last row to the
/// first, using the Sherman-Morrison formula over two tridiagonal solves.
fn solve_cyclic(
    lower: &[f64],
    diagonal: &[f64],
    upper: &[f64],
    rhs: &[Vector2<f64>],
) -> Result<Vec<Vector2<f64>>, FitError> {
    let n = diagonal.len();
    if n < 3 {
        return Err(FitError::TooFewPoints(n));
    }

    let (alpha, beta) = (upper[n - 1], lower[0]);
    let gamma = -diagonal[0];

    let mut modified = diagonal.to_vec();
    modified[0] -= gamma;
    modified[n - 1] -= alpha * beta / gamma;

    let x = solve_tridiagonal(lower, &modified, upper, rhs)?;

    let mut u = vec![0.0; n];
    u[0] = gamma;
    u[n - 1] = alpha;
    let z = solve_tridiagonal(lower, &modified, upper, &u)?;

    let denominator = 1.0 + z[0] + beta * z[n - 1] / gamma;
    if denominator == 0.0 || !denominator.is_finite() {
        return Err(FitError::Singular);
    }
    let factor = (x[0] + x[n - 1] * (beta / gamma)) / denominator;

    Ok(x.iter().zip(&z).map(|(x, z)| x - factor * *z).collect())
}
