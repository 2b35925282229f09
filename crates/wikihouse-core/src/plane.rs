//! Plane fitting for 3D face loops
//!
//! A face from the model is a closed loop of 3D points. Flattening it means
//! fitting a plane (Newell's method), checking every vertex lies on it, and
//! expressing the loop in a 2D frame on that plane.

use crate::error::{GeometryErrorKind, GeometryResult};
use crate::geometry::{Point2, EPSILON};
use nalgebra::{Matrix4, Point3, Vector3};

/// Orthonormal frame lying on a face's plane
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneFrame {
    pub origin: Point3<f64>,
    /// In-plane X axis, aligned with the loop's longest edge
    pub u: Vector3<f64>,
    /// In-plane Y axis (`normal × u`)
    pub v: Vector3<f64>,
    /// Unit normal; the loop winds counter-clockwise around it
    pub normal: Vector3<f64>,
}

impl PlaneFrame {
    /// Fit a frame to a closed loop of points
    pub fn fit(points: &[Point3<f64>]) -> GeometryResult<Self> {
        if points.len() < 3 {
            return Err(GeometryErrorKind::TooFewVertices {
                count: points.len(),
            });
        }
        if points.iter().any(|p| !p.coords.iter().all(|c| c.is_finite())) {
            return Err(GeometryErrorKind::NonFinite);
        }

        let normal = newell_normal(points);
        let norm = normal.norm();
        if norm < EPSILON {
            return Err(GeometryErrorKind::ZeroArea);
        }
        let normal = normal / norm;

        let (start, edge) = points
            .iter()
            .enumerate()
            .map(|(i, p)| (i, points[(i + 1) % points.len()] - *p))
            .max_by(|a, b| a.1.norm().total_cmp(&b.1.norm()))
            .ok_or(GeometryErrorKind::ZeroArea)?;

        let in_plane = edge - normal * edge.dot(&normal);
        if in_plane.norm() < EPSILON {
            return Err(GeometryErrorKind::ZeroArea);
        }
        let u = in_plane.normalize();
        let v = normal.cross(&u);

        Ok(Self {
            origin: points[start],
            u,
            v,
            normal,
        })
    }

    /// Signed distance from the plane along the normal
    pub fn distance(&self, point: &Point3<f64>) -> f64 {
        (*point - self.origin).dot(&self.normal)
    }

    /// Largest absolute distance of any point from the plane
    pub fn max_deviation(&self, points: &[Point3<f64>]) -> f64 {
        points
            .iter()
            .map(|p| self.distance(p).abs())
            .fold(0.0, f64::max)
    }

    /// Express a model-space point in the frame's 2D coordinates
    pub fn project(&self, point: &Point3<f64>) -> Point2 {
        let d = *point - self.origin;
        Point2::new(d.dot(&self.u), d.dot(&self.v))
    }

    /// Map a frame-local 2D point back to model space
    pub fn lift(&self, point: &Point2) -> Point3<f64> {
        self.origin + self.u * point.x + self.v * point.y
    }

    /// Homogeneous matrix taking frame-local coordinates to model space
    pub fn local_to_model(&self) -> Matrix4<f64> {
        let mut m = Matrix4::identity();
        for row in 0..3 {
            m[(row, 0)] = self.u[row];
            m[(row, 1)] = self.v[row];
            m[(row, 2)] = self.normal[row];
            m[(row, 3)] = self.origin[row];
        }
        m
    }
}

fn newell_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let mut n = Vector3::zeros();
    for (i, cur) in points.iter().enumerate() {
        let next = &points[(i + 1) % points.len()];
        n.x += (cur.y - next.y) * (cur.z + next.z);
        n.y += (cur.z - next.z) * (cur.x + next.x);
        n.z += (cur.x - next.x) * (cur.y + next.y);
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::signed_area;

    #[test]
    fn test_fit_vertical_wall() {
        // 4 x 2 rectangle standing in the XZ plane
        let pts = vec![
            Point3::new(0.0, 5.0, 0.0),
            Point3::new(4.0, 5.0, 0.0),
            Point3::new(4.0, 5.0, 2.0),
            Point3::new(0.0, 5.0, 2.0),
        ];
        let frame = PlaneFrame::fit(&pts).unwrap();
        assert!(frame.max_deviation(&pts) < 1e-12);

        let flat: Vec<Point2> = pts.iter().map(|p| frame.project(p)).collect();
        assert!((signed_area(&flat) - 8.0).abs() < 1e-9);
        assert!((flat[1].distance_to(&flat[0]) - 4.0).abs() < 1e-9);

        let back = frame.lift(&flat[2]);
        assert!((back - pts[2]).norm() < 1e-9);
        let via_matrix = frame.local_to_model().transform_point(&Point3::new(flat[2].x, flat[2].y, 0.0));
        assert!((via_matrix - pts[2]).norm() < 1e-9);
    }

    #[test]
    fn test_fit_detects_warp() {
        let pts = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(10.0, 10.0, 1.0),
            Point3::new(0.0, 10.0, 0.0),
        ];
        let frame = PlaneFrame::fit(&pts).unwrap();
        assert!(frame.max_deviation(&pts) > 0.1);
    }

    #[test]
    fn test_fit_rejects_degenerate() {
        let collinear = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        assert_eq!(PlaneFrame::fit(&collinear), Err(GeometryErrorKind::ZeroArea));
        assert_eq!(
            PlaneFrame::fit(&collinear[..2]),
            Err(GeometryErrorKind::TooFewVertices { count: 2 })
        );
    }
}
