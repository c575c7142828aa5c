use nalgebra::{Point3, Rotation3, Unit, Vector3};

/// Ideal tetrahedral angle in degrees.
pub const TETRAHEDRAL_ANGLE_DEG: f64 = 109.471_220_634_490_7;

pub fn rotation_to_align(from: &Vector3<f64>, to: &Vector3<f64>) -> Option<Rotation3<f64>> {
    Rotation3::rotation_between(from, to)
}

pub fn rotation_from_axis_angle(axis: &Vector3<f64>, angle_degrees: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Unit::new_normalize(*axis), angle_degrees.to_radians())
}

/// Returns a unit vector perpendicular to `v`.
pub fn any_perpendicular(v: &Vector3<f64>) -> Vector3<f64> {
    let n = v.normalize();
    let helper = if n.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    (helper - n * n.dot(&helper)).normalize()
}

/// Places the missing substituents of an sp3 center.
///
/// Given the positions of the 1, 2, or 3 atoms already bonded to `base`,
/// returns the positions that complete a tetrahedron at `bond_length`.
/// With a single neighbor, `reference` fixes the rotation of the three new
/// positions around the bond axis: the first one lies in the plane spanned by
/// the bond and `reference`, on the side opposite to `reference`.
///
/// Any other neighbor count yields an empty vector.
pub fn tetrahedral_substituents(
    base: &Point3<f64>,
    neighbors: &[Point3<f64>],
    reference: Option<&Vector3<f64>>,
    bond_length: f64,
) -> Vec<Point3<f64>> {
    let dirs: Vec<Vector3<f64>> = neighbors
        .iter()
        .map(|p| (p - base).normalize())
        .collect();

    match dirs.as_slice() {
        [n1] => {
            let perpendicular = reference
                .map(|r| r - n1 * n1.dot(r))
                .filter(|r| r.norm() > 1e-8)
                .map(|r| -r.normalize())
                .unwrap_or_else(|| any_perpendicular(n1));

            let theta = TETRAHEDRAL_ANGLE_DEG.to_radians();
            let first = n1 * theta.cos() + perpendicular * theta.sin();
            let axis = Unit::new_normalize(*n1);
            (0..3)
                .map(|k| {
                    let rot = Rotation3::from_axis_angle(&axis, (120.0 * k as f64).to_radians());
                    base + (rot * first) * bond_length
                })
                .collect()
        }
        [n1, n2] => {
            let bisector = -(n1 + n2).normalize();
            let normal = n1.cross(n2).normalize();
            let half = (TETRAHEDRAL_ANGLE_DEG / 2.0).to_radians();
            [1.0, -1.0]
                .iter()
                .map(|sign| {
                    let dir = bisector * half.cos() + normal * (sign * half.sin());
                    base + dir * bond_length
                })
                .collect()
        }
        [n1, n2, n3] => {
            let dir = -(n1 + n2 + n3).normalize();
            vec![base + dir * bond_length]
        }
        _ => Vec::new(),
    }
}

/// Angle in degrees between the bonds `a-b` and `c-b`.
pub fn bond_angle_degrees(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    let ba = a - b;
    let bc = c - b;
    ba.angle(&bc).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn assert_all_tetrahedral(base: &Point3<f64>, atoms: &[Point3<f64>]) {
        for i in 0..atoms.len() {
            for j in (i + 1)..atoms.len() {
                let angle = bond_angle_degrees(&atoms[i], base, &atoms[j]);
                assert!(
                    (angle - TETRAHEDRAL_ANGLE_DEG).abs() < 1e-4,
                    "angle {} between substituents {} and {}",
                    angle,
                    i,
                    j
                );
            }
        }
    }

    #[test]
    fn one_neighbor_yields_three_tetrahedral_positions() {
        let base = Point3::origin();
        let neighbor = Point3::new(0.0, 0.0, -0.154);
        let hs = tetrahedral_substituents(&base, &[neighbor], None, 0.109);

        assert_eq!(hs.len(), 3);
        for h in &hs {
            assert!(((h - base).norm() - 0.109).abs() < EPS);
        }
        let mut all = hs.clone();
        all.push(Point3::new(0.0, 0.0, -0.109));
        assert_all_tetrahedral(&base, &all);
    }

    #[test]
    fn one_neighbor_respects_reference_direction() {
        let base = Point3::origin();
        let neighbor = Point3::new(0.0, 0.0, -0.154);
        let reference = Vector3::x();
        let hs = tetrahedral_substituents(&base, &[neighbor], Some(&reference), 0.1);
        assert!(hs[0].x < 0.0);
        assert!(hs[0].y.abs() < EPS);
    }

    #[test]
    fn two_neighbors_yield_two_tetrahedral_positions() {
        let base = Point3::origin();
        let theta = TETRAHEDRAL_ANGLE_DEG.to_radians() / 2.0;
        let n1 = Point3::new(theta.sin(), 0.0, -theta.cos()) * 0.154;
        let n2 = Point3::new(-theta.sin(), 0.0, -theta.cos()) * 0.154;
        let hs = tetrahedral_substituents(&base, &[n1, n2], None, 0.109);

        assert_eq!(hs.len(), 2);
        let scaled: Vec<_> = [n1, n2]
            .iter()
            .map(|p| Point3::from(p.coords.normalize() * 0.109))
            .chain(hs.iter().copied())
            .collect();
        assert_all_tetrahedral(&base, &scaled);
    }

    #[test]
    fn three_neighbors_yield_single_position_opposite_their_sum() {
        let base = Point3::origin();
        let neighbors = [
            Point3::new(1.0, 0.0, -0.3),
            Point3::new(-0.5, 0.866, -0.3),
            Point3::new(-0.5, -0.866, -0.3),
        ];
        let hs = tetrahedral_substituents(&base, &neighbors, None, 1.0);
        assert_eq!(hs.len(), 1);
        assert!((hs[0] - Point3::new(0.0, 0.0, 1.0)).norm() < 1e-3);
    }

    #[test]
    fn unsupported_neighbor_counts_yield_nothing() {
        let base = Point3::origin();
        assert!(tetrahedral_substituents(&base, &[], None, 1.0).is_empty());
        let four = [Point3::new(1.0, 0.0, 0.0); 4];
        assert!(tetrahedral_substituents(&base, &four, None, 1.0).is_empty());
    }

    #[test]
    fn any_perpendicular_is_orthogonal_unit_vector() {
        for v in [Vector3::x(), Vector3::y(), Vector3::new(1.0, 1.0, 1.0)] {
            let p = any_perpendicular(&v);
            assert!(p.dot(&v).abs() < EPS);
            assert!((p.norm() - 1.0).abs() < EPS);
        }
    }
}
