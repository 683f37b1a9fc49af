use super::{Point3, Vector3, TOLERANCE};

/// Computes the (unnormalized) Newell normal of a closed 3D polygon.
///
/// Works for non-planar polygons; the magnitude is twice the projected
/// area. Returns the zero vector for degenerate input.
#[must_use]
pub fn newell_normal(points: &[Point3]) -> Vector3 {
    let n = points.len();
    if n < 3 {
        return Vector3::zeros();
    }
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let a = &points[i];
        let b = &points[(i + 1) % n];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal
}

/// Computes the unit normal of a closed 3D polygon, or the zero vector
/// if the polygon is degenerate.
#[must_use]
pub fn polygon_normal_3d(points: &[Point3]) -> Vector3 {
    let normal = newell_normal(points);
    let len = normal.norm();
    if len < TOLERANCE {
        Vector3::zeros()
    } else {
        normal / len
    }
}

/// Computes the area of a closed 3D polygon.
///
/// Half the magnitude of the Newell normal; exact for planar polygons.
#[must_use]
pub fn polygon_area_3d(points: &[Point3]) -> f64 {
    newell_normal(points).norm() * 0.5
}

/// Computes the vertex centroid of a polygon.
///
/// The arithmetic mean of the vertices, not the area centroid; this is
/// the cheap cached value the kernel maintains per face.
#[must_use]
pub fn polygon_centroid_3d(points: &[Point3]) -> Point3 {
    if points.is_empty() {
        return Point3::origin();
    }
    let mut sum = Vector3::zeros();
    for p in points {
        sum += p.coords;
    }
    #[allow(clippy::cast_precision_loss)]
    Point3::from(sum / points.len() as f64)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn unit_square_normal_and_area() {
        let pts = vec![
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(0.0, 1.0, 0.0),
        ];
        let n = polygon_normal_3d(&pts);
        assert!((n - Vector3::z()).norm() < TOLERANCE);
        assert!((polygon_area_3d(&pts) - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn winding_flips_the_normal() {
        let pts = vec![
            p(0.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(1.0, 0.0, 0.0),
        ];
        let n = polygon_normal_3d(&pts);
        assert!((n + Vector3::z()).norm() < TOLERANCE);
    }

    #[test]
    fn degenerate_polygon_is_zero() {
        assert!(polygon_normal_3d(&[p(0.0, 0.0, 0.0)]).norm() < TOLERANCE);
        assert!(polygon_area_3d(&[]).abs() < TOLERANCE);
    }

    #[test]
    fn centroid_of_triangle() {
        let pts = vec![p(0.0, 0.0, 0.0), p(3.0, 0.0, 0.0), p(0.0, 3.0, 0.0)];
        let c = polygon_centroid_3d(&pts);
        assert!((c - p(1.0, 1.0, 0.0)).norm() < TOLERANCE);
    }
}
