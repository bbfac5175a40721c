use nalgebra::{Matrix3, Vector3};

use crate::Point;

// Projective map taking the canonical basis (1,0,0), (0,1,0), (0,0,1),
// (1,1,1) onto the four points, in homogeneous coordinates.
fn basis_to(points: &[Point; 4]) -> Option<Matrix3<f64>> {
    let m = Matrix3::new(
        points[0].0, points[1].0, points[2].0,
        points[0].1, points[1].1, points[2].1,
        1.0, 1.0, 1.0,
    );

    let v = Vector3::new(points[3].0, points[3].1, 1.0);
    let k = m.lu().solve(&v)?;

    if k.iter().any(|c| c.abs() < 1e-12 || !c.is_finite()) {
        // three of the points are collinear
        return None;
    }

    Some(m * Matrix3::from_diagonal(&k))
}

/// Perspective transform mapping `from[i]` onto `to[i]`.
pub fn calculate(from: &[Point; 4], to: &[Point; 4]) -> Option<Matrix3<f64>> {
    let a = basis_to(to)?;
    let b = basis_to(from)?;

    Some(a * b.try_inverse()?)
}

pub fn project(transform: &Matrix3<f64>, p: Point) -> Option<Point> {
    let v = transform * Vector3::new(p.0, p.1, 1.0);
    if v[2].abs() < 1e-12 {
        return None;
    }

    Some((v[0] / v[2], v[1] / v[2]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_maps(transform: &Matrix3<f64>, from: &[Point; 4], to: &[Point; 4]) {
        for (f, t) in from.iter().zip(to.iter()) {
            let p = project(transform, *f).unwrap();
            assert_relative_eq!(p.0, t.0, epsilon = 1e-6);
            assert_relative_eq!(p.1, t.1, epsilon = 1e-6);
        }
    }

    #[test]
    fn maps_skewed_quad_onto_rectangle() {
        let quad = [(12.0, 8.0), (95.0, 15.0), (88.0, 97.0), (5.0, 90.0)];
        let rect = [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)];

        let h = calculate(&quad, &rect).unwrap();
        assert_maps(&h, &quad, &rect);

        let inverse = calculate(&rect, &quad).unwrap();
        assert_maps(&inverse, &rect, &quad);
    }

    #[test]
    fn identity_for_equal_quads() {
        let rect = [(0.0, 0.0), (640.0, 0.0), (640.0, 480.0), (0.0, 480.0)];
        let h = calculate(&rect, &rect).unwrap();
        let p = project(&h, (123.0, 321.0)).unwrap();

        assert_relative_eq!(p.0, 123.0, epsilon = 1e-9);
        assert_relative_eq!(p.1, 321.0, epsilon = 1e-9);
    }

    #[test]
    fn collinear_points_have_no_transform() {
        let line = [(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)];
        let rect = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];

        assert!(calculate(&line, &rect).is_none());
        assert!(calculate(&rect, &line).is_none());
    }
}
