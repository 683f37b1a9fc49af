pub mod polygon_3d;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Linear interpolation between two points at parameter `t`.
#[must_use]
pub fn lerp(a: &Point3, b: &Point3, t: f64) -> Point3 {
    a + (b - a) * t
}

/// Midpoint of two points.
#[must_use]
pub fn midpoint(a: &Point3, b: &Point3) -> Point3 {
    lerp(a, b, 0.5)
}

/// Evaluates the cubic Bézier `(p0, h0, h1, p1)` at parameter `t`.
#[must_use]
pub fn cubic_point(p0: &Point3, h0: &Point3, h1: &Point3, p1: &Point3, t: f64) -> Point3 {
    let u = 1.0 - t;
    let b0 = u * u * u;
    let b1 = 3.0 * u * u * t;
    let b2 = 3.0 * u * t * t;
    let b3 = t * t * t;
    Point3::from(p0.coords * b0 + h0.coords * b1 + h1.coords * b2 + p1.coords * b3)
}

/// Splits the cubic Bézier `(p0, h0, h1, p1)` at parameter `t` by
/// de Casteljau subdivision.
///
/// Returns the two halves as `((p0, h0a, h1a, mid), (mid, h0b, h1b, p1))`;
/// the shared `mid` point is returned once, inside the first tuple.
#[must_use]
pub fn cubic_split(
    p0: &Point3,
    h0: &Point3,
    h1: &Point3,
    p1: &Point3,
    t: f64,
) -> ((Point3, Point3, Point3), (Point3, Point3, Point3)) {
    let q0 = lerp(p0, h0, t);
    let q1 = lerp(h0, h1, t);
    let q2 = lerp(h1, p1, t);
    let r0 = lerp(&q0, &q1, t);
    let r1 = lerp(&q1, &q2, t);
    let mid = lerp(&r0, &r1, t);
    ((q0, r0, mid), (r1, q2, mid))
}

/// Approximate arc length of the cubic Bézier `(p0, h0, h1, p1)`.
///
/// Chord-sampled with a fixed subdivision count; accurate enough for the
/// cached edge lengths the kernel maintains.
#[must_use]
pub fn cubic_length(p0: &Point3, h0: &Point3, h1: &Point3, p1: &Point3) -> f64 {
    const SEGMENTS: usize = 16;
    let mut length = 0.0;
    let mut prev = *p0;
    for i in 1..=SEGMENTS {
        #[allow(clippy::cast_precision_loss)]
        let t = i as f64 / SEGMENTS as f64;
        let next = cubic_point(p0, h0, h1, p1, t);
        length += (next - prev).norm();
        prev = next;
    }
    length
}
