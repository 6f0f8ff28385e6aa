use nalgebra::{Matrix3, Point3, Rotation3, Vector3};

/// Minimum number of point pairs for a well-defined superposition.
pub const MIN_SUPERPOSITION_POINTS: usize = 3;

pub fn centroid(points: &[Point3<f64>]) -> Option<Point3<f64>> {
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Some(Point3::from(sum / points.len() as f64))
}

pub fn calculate_rmsd(coords1: &[Point3<f64>], coords2: &[Point3<f64>]) -> Option<f64> {
    if coords1.len() != coords2.len() || coords1.is_empty() {
        return None;
    }
    let n = coords1.len() as f64;
    let squared_dist_sum: f64 = coords1
        .iter()
        .zip(coords2.iter())
        .map(|(p1, p2)| (p1 - p2).norm_squared())
        .sum();
    Some((squared_dist_sum / n).sqrt())
}

/// A rigid-body transform `x ↦ R·x + t` together with the RMSD it achieves
/// on the point pairs it was fitted to.
#[derive(Debug, Clone, PartialEq)]
pub struct Superposition {
    pub rotation: Rotation3<f64>,
    pub translation: Vector3<f64>,
    pub rmsd: f64,
}

impl Superposition {
    pub fn identity() -> Self {
        Self {
            rotation: Rotation3::identity(),
            translation: Vector3::zeros(),
            rmsd: 0.0,
        }
    }

    /// Least-squares fit of `mobile` onto `reference` (Kabsch).
    ///
    /// Returns `None` when the slices differ in length, hold fewer than
    /// [`MIN_SUPERPOSITION_POINTS`] points, or the SVD does not converge.
    /// Improper rotations are corrected by flipping the axis of the smallest
    /// singular value.
    pub fn fit(mobile: &[Point3<f64>], reference: &[Point3<f64>]) -> Option<Self> {
        if mobile.len() != reference.len() || mobile.len() < MIN_SUPERPOSITION_POINTS {
            return None;
        }
        let mobile_center = centroid(mobile)?;
        let reference_center = centroid(reference)?;

        let covariance = mobile
            .iter()
            .zip(reference)
            .fold(Matrix3::zeros(), |acc, (m, r)| {
                acc + (m - mobile_center) * (r - reference_center).transpose()
            });

        let svd = covariance.svd(true, true);
        let u = svd.u?;
        let v = svd.v_t?.transpose();

        let mut correction = Matrix3::identity();
        if (v * u.transpose()).determinant() < 0.0 {
            let smallest = svd.singular_values.argmin().0;
            correction[(smallest, smallest)] = -1.0;
        }
        let rotation = Rotation3::from_matrix_unchecked(v * correction * u.transpose());
        let translation = reference_center.coords - rotation * mobile_center.coords;

        let mut superposition = Self {
            rotation,
            translation,
            rmsd: 0.0,
        };
        let moved: Vec<Point3<f64>> = mobile.iter().map(|p| superposition.apply(p)).collect();
        superposition.rmsd = calculate_rmsd(&moved, reference)?;
        Some(superposition)
    }

    pub fn apply(&self, point: &Point3<f64>) -> Point3<f64> {
        self.rotation * point + self.translation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Unit;

    fn sample_points() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.5, 0.0, 0.0),
            Point3::new(1.5, 1.2, 0.0),
            Point3::new(0.3, 1.9, 0.8),
            Point3::new(-0.7, 0.4, 1.6),
        ]
    }

    #[test]
    fn centroid_averages_points_and_rejects_empty_input() {
        let points = [Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 4.0, -2.0)];
        assert_eq!(centroid(&points), Some(Point3::new(1.0, 2.0, -1.0)));
        assert_eq!(centroid(&[]), None);
    }

    #[test]
    fn calculate_rmsd_requires_matching_non_empty_inputs() {
        let a = [Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 0.0)];
        let b = [Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)];
        assert!((calculate_rmsd(&a, &b).unwrap() - 1.0).abs() < 1e-12);
        assert!(calculate_rmsd(&a, &b[..1]).is_none());
        assert!(calculate_rmsd(&[], &[]).is_none());
    }

    #[test]
    fn fit_recovers_a_known_rigid_transform() {
        let reference = sample_points();
        let axis = Unit::new_normalize(Vector3::new(1.0, 2.0, 0.5));
        let rotation = Rotation3::from_axis_angle(&axis, 1.1);
        let shift = Vector3::new(4.0, -3.0, 7.5);
        let mobile: Vec<Point3<f64>> = reference
            .iter()
            .map(|p| rotation.inverse() * (p - shift))
            .collect();

        let fit = Superposition::fit(&mobile, &reference).unwrap();

        assert!(fit.rmsd < 1e-9, "rmsd was {}", fit.rmsd);
        for (m, r) in mobile.iter().zip(&reference) {
            assert!((fit.apply(m) - r).norm() < 1e-9);
        }
        assert!((fit.rotation.matrix() - rotation.matrix()).norm() < 1e-9);
    }

    #[test]
    fn fit_of_mirror_image_stays_a_proper_rotation() {
        let reference = sample_points();
        let mirrored: Vec<Point3<f64>> = reference
            .iter()
            .map(|p| Point3::new(p.x, p.y, -p.z))
            .collect();

        let fit = Superposition::fit(&mirrored, &reference).unwrap();

        assert!((fit.rotation.matrix().determinant() - 1.0).abs() < 1e-9);
        assert!(fit.rmsd > 0.1);
    }

    #[test]
    fn fit_rejects_too_few_or_mismatched_points() {
        let points = sample_points();
        assert!(Superposition::fit(&points[..2], &points[..2]).is_none());
        assert!(Superposition::fit(&points[..4], &points).is_none());
    }

    #[test]
    fn identity_leaves_points_untouched() {
        let p = Point3::new(1.0, -2.0, 3.0);
        assert_eq!(Superposition::identity().apply(&p), p);
    }
}
