//! Stateless ray-triangle tests.
//!
//! Two strategies: Möller-Trumbore is the one the renderer uses;
//! the plane-projection test is kept as the simpler geometric alternative.

use glam::DVec3;

/// Degeneracy threshold for the determinant, not a physical tolerance.
pub const EPSILON: f64 = 1e-8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: DVec3,
    pub t: f64,
}

/// Möller-Trumbore ray-triangle intersection.
///
/// Solves for the barycentric coordinates (u, v) of the ray's crossing point
/// directly, so no separate plane intersection is needed. A near-zero
/// determinant means the ray is parallel to the triangle (or the triangle is
/// degenerate) and counts as a miss.
///
/// The distance `t` is not sign-checked: a triangle behind the ray origin
/// still reports a hit, with negative `t`. The mesh pass ranks hits by
/// unsigned distance, so callers that care about direction must check `t`.
pub fn moller_trumbore(orig: DVec3, dir: DVec3, a: DVec3, b: DVec3, c: DVec3) -> Option<RayHit> {
    let ab = b - a;
    let ac = c - a;
    let pvec = dir.cross(ac);
    let det = ab.dot(pvec);

    if det.abs() < EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;

    let tvec = orig - a;
    let u = tvec.dot(pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let qvec = tvec.cross(ab);
    let v = dir.dot(qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = ac.dot(qvec) * inv_det;
    Some(RayHit {
        point: orig + t * dir,
        t,
    })
}

/// Plane-projection ray-triangle intersection.
///
/// Intersects the ray with the triangle's supporting plane, then checks the
/// crossing point against each edge via the sign of
/// `(edge x (P - edge_start)) . normal`. Less robust than Möller-Trumbore
/// near edges; retained as the documented alternative.
pub fn plane_projection(
    orig: DVec3,
    dir: DVec3,
    a: DVec3,
    b: DVec3,
    c: DVec3,
    normal: DVec3,
) -> Option<DVec3> {
    let denom = normal.dot(dir);
    if denom.abs() < EPSILON {
        // Ray parallel to the plane.
        return None;
    }

    let d = -normal.dot(a);
    let t = -(normal.dot(orig) + d) / denom;
    let p = orig + t * dir;

    let inside = normal.dot((b - a).cross(p - a)) >= 0.0
        && normal.dot((c - b).cross(p - b)) >= 0.0
        && normal.dot((a - c).cross(p - c)) >= 0.0;
    inside.then_some(p)
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: DVec3 = DVec3::new(0.0, 0.0, 0.0);
    const B: DVec3 = DVec3::new(1.0, 0.0, 0.0);
    const C: DVec3 = DVec3::new(0.0, 1.0, 0.0);

    #[test]
    fn mt_hits_centroid() {
        let centroid = (A + B + C) / 3.0;
        let orig = centroid + DVec3::Z;
        let hit = moller_trumbore(orig, -DVec3::Z, A, B, C).unwrap();
        assert!((hit.point - centroid).length() < 1e-12);
        assert!((hit.t - 1.0).abs() < 1e-12);
    }

    #[test]
    fn mt_misses_outside() {
        let orig = DVec3::new(2.0, 2.0, 1.0);
        assert!(moller_trumbore(orig, -DVec3::Z, A, B, C).is_none());
    }

    #[test]
    fn mt_parallel_ray_is_a_miss() {
        // Ray in a plane parallel to the triangle: det ~ 0, no NaN fallout.
        let orig = DVec3::new(-1.0, 0.2, 1.0);
        let hit = moller_trumbore(orig, DVec3::X, A, B, C);
        assert!(hit.is_none());
    }

    #[test]
    fn mt_reports_hits_behind_the_origin() {
        // Triangle behind the ray still intersects, with negative t.
        let centroid = (A + B + C) / 3.0;
        let orig = centroid + DVec3::Z;
        let hit = moller_trumbore(orig, DVec3::Z, A, B, C).unwrap();
        assert!((hit.t - (-1.0)).abs() < 1e-12);
        assert!((hit.point - centroid).length() < 1e-12);
    }

    #[test]
    fn plane_projection_agrees_on_centroid() {
        let centroid = (A + B + C) / 3.0;
        let orig = centroid + DVec3::Z;
        let p = plane_projection(orig, -DVec3::Z, A, B, C, DVec3::Z).unwrap();
        assert!((p - centroid).length() < 1e-12);
    }

    #[test]
    fn plane_projection_parallel_ray_is_a_miss() {
        let orig = DVec3::new(-1.0, 0.2, 1.0);
        assert!(plane_projection(orig, DVec3::X, A, B, C, DVec3::Z).is_none());
    }

    #[test]
    fn plane_projection_misses_outside() {
        let orig = DVec3::new(2.0, 2.0, 1.0);
        assert!(plane_projection(orig, -DVec3::Z, A, B, C, DVec3::Z).is_none());
    }
}
