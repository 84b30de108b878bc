//! Shared computational-geometry primitives used by several repair
//! operators: triangle measures, ray casting, the van Oosterom-Strang solid
//! angle used by the winding-number classifier, a plane-clip segment
//! intersection for the self-intersection splitter, and a small union-find
//! used by edge-collapse.
//!
//! Grounded on `cad-kernel::geometry::{vector,point,intersection}` in the
//! teacher repo, trimmed to the affine 3D operations this crate needs.

use mesh_types::{Point3d, Vec3};

pub fn triangle_normal_unnormalized(p0: Point3d, p1: Point3d, p2: Point3d) -> Vec3 {
    (p1 - p0).cross(&(p2 - p0))
}

/// Unit outward normal, or `None` if the triangle is degenerate.
pub fn triangle_normal(p0: Point3d, p1: Point3d, p2: Point3d) -> Option<Vec3> {
    triangle_normal_unnormalized(p0, p1, p2).normalized()
}

pub fn triangle_area(p0: Point3d, p1: Point3d, p2: Point3d) -> f64 {
    triangle_normal_unnormalized(p0, p1, p2).length() * 0.5
}

pub fn triangle_centroid(p0: Point3d, p1: Point3d, p2: Point3d) -> Point3d {
    Point3d::new(
        (p0.x + p1.x + p2.x) / 3.0,
        (p0.y + p1.y + p2.y) / 3.0,
        (p0.z + p1.z + p2.z) / 3.0,
    )
}

pub fn shortest_edge_length(p0: Point3d, p1: Point3d, p2: Point3d) -> f64 {
    let a = (p1 - p0).length();
    let b = (p2 - p1).length();
    let c = (p0 - p2).length();
    a.min(b).min(c)
}

pub fn longest_edge_length(p0: Point3d, p1: Point3d, p2: Point3d) -> f64 {
    let a = (p1 - p0).length();
    let b = (p2 - p1).length();
    let c = (p0 - p2).length();
    a.max(b).max(c)
}

/// Axis-aligned bounding box, used for the self-intersection sweep and the
/// edge-collapse cleanup's inflated-box intersection.
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Point3d,
    pub max: Point3d,
}

impl Aabb {
    pub fn of_triangle(p0: Point3d, p1: Point3d, p2: Point3d) -> Self {
        let min = Point3d::new(
            p0.x.min(p1.x).min(p2.x),
            p0.y.min(p1.y).min(p2.y),
            p0.z.min(p1.z).min(p2.z),
        );
        let max = Point3d::new(
            p0.x.max(p1.x).max(p2.x),
            p0.y.max(p1.y).max(p2.y),
            p0.z.max(p1.z).max(p2.z),
        );
        Self { min, max }
    }

    pub fn of_points(points: &[Point3d]) -> Self {
        let mut min = Point3d::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        let mut max = Point3d::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }
        Self { min, max }
    }

    pub fn inflated(&self, margin: f64) -> Self {
        Self {
            min: self.min - Vec3::new(margin, margin, margin),
            max: self.max + Vec3::new(margin, margin, margin),
        }
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    pub fn diagonal(&self) -> f64 {
        (self.max - self.min).length()
    }
}

/// Möller-Trumbore ray-triangle intersection. Returns the ray parameter `t`
/// (distance along `dir`, which need not be unit length) on a hit with
/// `t > t_min`, used by the raycast-vote inside/outside classifiers with a
/// small `t_min` jitter to dodge on-surface grazes.
pub fn ray_triangle_intersect(
    origin: Point3d,
    dir: Vec3,
    p0: Point3d,
    p1: Point3d,
    p2: Point3d,
    t_min: f64,
) -> Option<f64> {
    const EPS: f64 = 1e-12;
    let edge1 = p1 - p0;
    let edge2 = p2 - p0;
    let pvec = dir.cross(&edge2);
    let det = edge1.dot(&pvec);
    if det.abs() < EPS {
        return None;
    }
    let inv_det = 1.0 / det;
    let tvec = origin - p0;
    let u = tvec.dot(&pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let qvec = tvec.cross(&edge1);
    let v = dir.dot(&qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = edge2.dot(&qvec) * inv_det;
    if t > t_min {
        Some(t)
    } else {
        None
    }
}

/// Barycentric coordinates of `p` with respect to triangle `(p0,p1,p2)`,
/// assuming `p` is coplanar with the triangle. Returns `None` if the
/// triangle is degenerate.
pub fn barycentric(p: Point3d, p0: Point3d, p1: Point3d, p2: Point3d) -> Option<(f64, f64, f64)> {
    let v0 = p1 - p0;
    let v1 = p2 - p0;
    let v2 = p - p0;
    let d00 = v0.dot(&v0);
    let d01 = v0.dot(&v1);
    let d11 = v1.dot(&v1);
    let d20 = v2.dot(&v0);
    let d21 = v2.dot(&v1);
    let denom = d00 * d11 - d01 * d01;
    if denom.abs() < 1e-18 {
        return None;
    }
    let v = (d11 * d20 - d01 * d21) / denom;
    let w = (d00 * d21 - d01 * d20) / denom;
    let u = 1.0 - v - w;
    Some((u, v, w))
}

/// Oriented solid angle subtended by a triangle from point `p`, via the
/// van Oosterom-Strang formula. Summing `Ω / (4π)` over every triangle of a
/// closed mesh gives the generalized winding number (§4.3.8, P9).
pub fn solid_angle(p: Point3d, a: Point3d, b: Point3d, c: Point3d) -> f64 {
    let ra = a - p;
    let rb = b - p;
    let rc = c - p;
    let la = ra.length();
    let lb = rb.length();
    let lc = rc.length();
    if la < 1e-15 || lb < 1e-15 || lc < 1e-15 {
        return 0.0;
    }
    let numerator = ra.triple(&rb, &rc);
    let denominator = la * lb * lc
        + ra.dot(&rb) * lc
        + rb.dot(&rc) * la
        + rc.dot(&ra) * lb;
    2.0 * numerator.atan2(denominator)
}

/// Clip a segment `(p0, p1)` against a plane (`plane_point`, `plane_normal`)
/// using signed-distance interpolation, returning the sub-segment on the
/// positive side. Used by the self-intersection splitter's
/// Möller-style triangle/plane clip.
pub fn clip_segment_to_plane(
    p0: Point3d,
    p1: Point3d,
    plane_point: Point3d,
    plane_normal: Vec3,
) -> Option<(Point3d, Point3d)> {
    let d0 = (p0 - plane_point).dot(&plane_normal);
    let d1 = (p1 - plane_point).dot(&plane_normal);
    match (d0 >= 0.0, d1 >= 0.0) {
        (true, true) => Some((p0, p1)),
        (false, false) => None,
        _ => {
            let t = d0 / (d0 - d1);
            let hit = p0.lerp(&p1, t);
            if d0 >= 0.0 {
                Some((p0, hit))
            } else {
                Some((hit, p1))
            }
        }
    }
}

/// Union-find over dense `u32` keys, used by `collapse_tiny_triangles` to
/// merge the endpoints of short edges. The lower index always wins as the
/// representative, matching the source's deterministic collapse order.
pub struct UnionFind {
    parent: Vec<u32>,
}

impl UnionFind {
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n as u32).collect(),
        }
    }

    pub fn find(&mut self, x: u32) -> u32 {
        if self.parent[x as usize] != x {
            let root = self.find(self.parent[x as usize]);
            self.parent[x as usize] = root;
        }
        self.parent[x as usize]
    }

    /// Union `a` and `b`, keeping the smaller root as representative.
    pub fn union(&mut self, a: u32, b: u32) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        if ra < rb {
            self.parent[rb as usize] = ra;
        } else {
            self.parent[ra as usize] = rb;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_of_unit_right_triangle() {
        let p0 = Point3d::ORIGIN;
        let p1 = Point3d::new(1.0, 0.0, 0.0);
        let p2 = Point3d::new(0.0, 1.0, 0.0);
        assert!((triangle_area(p0, p1, p2) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn ray_hits_triangle_head_on() {
        let p0 = Point3d::new(-1.0, -1.0, 1.0);
        let p1 = Point3d::new(2.0, -1.0, 1.0);
        let p2 = Point3d::new(-1.0, 2.0, 1.0);
        let hit = ray_triangle_intersect(Point3d::ORIGIN, Vec3::Z, p0, p1, p2, 1e-9);
        assert!(hit.is_some());
        assert!((hit.unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn solid_angle_of_closed_tetrahedron_sums_to_4pi() {
        let p0 = Point3d::new(1.0, 1.0, 1.0);
        let p1 = Point3d::new(1.0, -1.0, -1.0);
        let p2 = Point3d::new(-1.0, 1.0, -1.0);
        let p3 = Point3d::new(-1.0, -1.0, 1.0);
        let center = Point3d::ORIGIN;
        let faces = [
            (p0, p1, p2),
            (p0, p3, p1),
            (p0, p2, p3),
            (p1, p3, p2),
        ];
        let sum: f64 = faces.iter().map(|(a, b, c)| solid_angle(center, *a, *b, *c)).sum();
        assert!((sum.abs() - 4.0 * std::f64::consts::PI).abs() < 1e-6);
    }

    #[test]
    fn union_find_keeps_smaller_root() {
        let mut uf = UnionFind::new(5);
        uf.union(3, 1);
        uf.union(1, 4);
        assert_eq!(uf.find(3), 1);
        assert_eq!(uf.find(4), 1);
    }

    #[test]
    fn clip_segment_splits_at_plane() {
        let p0 = Point3d::new(-1.0, 0.0, 0.0);
        let p1 = Point3d::new(1.0, 0.0, 0.0);
        let (a, b) = clip_segment_to_plane(p0, p1, Point3d::ORIGIN, Vec3::X).unwrap();
        assert!(a.x >= -1e-9);
        assert!((b.x - 1.0).abs() < 1e-9);
    }
}
