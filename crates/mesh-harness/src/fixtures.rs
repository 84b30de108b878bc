//! Scenario-mesh builders exercised by the integration tests (§8's
//! testable-property scenarios), grounded on the teacher's `ModelBuilder`
//! fixture style but retargeted to the repair pipeline and the sheet-metal
//! unfolder.

use std::f64::consts::{FRAC_PI_2, PI};

use mesh_core::mesh::TaggedMesh;
use mesh_types::{FaceMeta, Point3d, SheetSide, Vec3};

fn set_meta(mesh: &mut TaggedMesh, face_name: &str, meta: FaceMeta) {
    let id = mesh.face_name().id_of(face_name).expect("face must have at least one triangle first");
    mesh.face_meta_mut().insert(id, meta);
}

/// A unit cube (12 triangles, one face name per cube face) plus one extra
/// triangle on `+Z` with two coincident vertices — degenerate by
/// duplicate-vertex, not by area alone.
pub fn cube_with_degenerate_triangle() -> TaggedMesh {
    let mut mesh = TaggedMesh::new();
    let p = |x: f64, y: f64, z: f64| Point3d::new(x, y, z);

    let v = [
        p(0.0, 0.0, 0.0),
        p(1.0, 0.0, 0.0),
        p(1.0, 1.0, 0.0),
        p(0.0, 1.0, 0.0),
        p(0.0, 0.0, 1.0),
        p(1.0, 0.0, 1.0),
        p(1.0, 1.0, 1.0),
        p(0.0, 1.0, 1.0),
    ];

    mesh.add_triangle("bottom", v[0], v[2], v[1]);
    mesh.add_triangle("bottom", v[0], v[3], v[2]);
    mesh.add_triangle("top", v[4], v[5], v[6]);
    mesh.add_triangle("top", v[4], v[6], v[7]);
    mesh.add_triangle("front", v[0], v[1], v[5]);
    mesh.add_triangle("front", v[0], v[5], v[4]);
    mesh.add_triangle("back", v[2], v[3], v[7]);
    mesh.add_triangle("back", v[2], v[7], v[6]);
    mesh.add_triangle("left", v[3], v[0], v[4]);
    mesh.add_triangle("left", v[3], v[4], v[7]);
    mesh.add_triangle("right", v[1], v[2], v[6]);
    mesh.add_triangle("right", v[1], v[6], v[5]);

    // Degenerate sliver riding on the +Z face: two vertices coincide at (0,0,0).
    mesh.add_triangle("top", p(0.0, 0.0, 0.0), p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0));

    mesh
}

/// Two 1x1x1 boxes sharing the unit square at `x=1`, triangulated
/// independently and concatenated — each box contributes its own copy of
/// the shared face, so the interior has two coincident, oppositely-wound
/// triangle pairs for `remove_internal_triangles` to cancel.
pub fn two_touching_unit_cubes() -> TaggedMesh {
    let mut mesh = TaggedMesh::new();

    fn add_cube(mesh: &mut TaggedMesh, origin_x: f64, name_prefix: &str) {
        let p = |x: f64, y: f64, z: f64| Point3d::new(origin_x + x, y, z);
        let v = [
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(0.0, 0.0, 1.0),
            p(1.0, 0.0, 1.0),
            p(1.0, 1.0, 1.0),
            p(0.0, 1.0, 1.0),
        ];
        let f = |s: &str| format!("{name_prefix}_{s}");
        mesh.add_triangle(&f("bottom"), v[0], v[2], v[1]);
        mesh.add_triangle(&f("bottom"), v[0], v[3], v[2]);
        mesh.add_triangle(&f("top"), v[4], v[5], v[6]);
        mesh.add_triangle(&f("top"), v[4], v[6], v[7]);
        mesh.add_triangle(&f("front"), v[0], v[1], v[5]);
        mesh.add_triangle(&f("front"), v[0], v[5], v[4]);
        mesh.add_triangle(&f("back"), v[2], v[3], v[7]);
        mesh.add_triangle(&f("back"), v[2], v[7], v[6]);
        mesh.add_triangle(&f("left"), v[3], v[0], v[4]);
        mesh.add_triangle(&f("left"), v[3], v[4], v[7]);
        mesh.add_triangle(&f("right"), v[1], v[2], v[6]);
        mesh.add_triangle(&f("right"), v[1], v[6], v[5]);
    }

    add_cube(&mut mesh, 0.0, "a");
    add_cube(&mut mesh, 1.0, "b");
    mesh
}

/// Two 2x2 squares meeting along their diagonals, forming an "X" where the
/// triangles of each square cross through the other's interior.
pub fn crossing_quad_pair() -> TaggedMesh {
    let mut mesh = TaggedMesh::new();
    let p = |x: f64, y: f64, z: f64| Point3d::new(x, y, z);

    // Quad in the XZ plane at y=0, spanning x,z in [-1, 1].
    let qa = [p(-1.0, 0.0, -1.0), p(1.0, 0.0, -1.0), p(1.0, 0.0, 1.0), p(-1.0, 0.0, 1.0)];
    mesh.add_triangle("quad_a", qa[0], qa[1], qa[2]);
    mesh.add_triangle("quad_a", qa[0], qa[2], qa[3]);

    // Quad tilted about the x-axis so it crosses quad_a through the middle.
    let qb = [p(-1.0, -1.0, 0.0), p(1.0, -1.0, 0.0), p(1.0, 1.0, 0.0), p(-1.0, 1.0, 0.0)];
    mesh.add_triangle("quad_b", qb[0], qb[1], qb[2]);
    mesh.add_triangle("quad_b", qb[0], qb[2], qb[3]);

    mesh
}

/// Expected triangle count of [`sphere_with_interior_island`]'s sphere
/// shell alone, for the `rings`/`segments` chosen there: pole bands
/// contribute one triangle per segment, interior bands two.
pub fn sphere_shell_triangle_count(rings: usize, segments: usize) -> usize {
    segments * (2 * rings - 2)
}

/// A UV-sphere of radius 1.5 (diameter 3, matching a "3x3x3 sphere")
/// triangulated with `rings=10, segments=10` (~180 triangles), plus a
/// small 8-triangle octahedron fully inside it as an isolated island.
pub fn sphere_with_interior_island() -> TaggedMesh {
    let mut mesh = TaggedMesh::new();
    let radius = 1.5;
    let rings = 10usize;
    let segments = 10usize;

    let vertex = |i: usize, j: usize| -> Point3d {
        let phi = PI * i as f64 / rings as f64;
        let theta = 2.0 * PI * j as f64 / segments as f64;
        let y = radius * phi.cos();
        let r = radius * phi.sin();
        Point3d::new(r * theta.cos(), y, r * theta.sin())
    };

    for i in 0..rings {
        for j in 0..segments {
            let a = vertex(i, j);
            let b = vertex(i, (j + 1) % segments);
            let c = vertex(i + 1, j);
            let d = vertex(i + 1, (j + 1) % segments);
            if i == 0 {
                // South pole band: a == b (both the pole), skip the degenerate half.
                mesh.add_triangle("sphere", a, d, c);
            } else if i + 1 == rings {
                // North pole band: c == d.
                mesh.add_triangle("sphere", a, b, c);
            } else {
                mesh.add_triangle("sphere", a, d, c);
                mesh.add_triangle("sphere", a, b, d);
            }
        }
    }

    // Small octahedron (8 triangular faces), well inside the sphere's radius.
    let s = 0.2;
    let o = [
        Point3d::new(s, 0.0, 0.0),
        Point3d::new(-s, 0.0, 0.0),
        Point3d::new(0.0, s, 0.0),
        Point3d::new(0.0, -s, 0.0),
        Point3d::new(0.0, 0.0, s),
        Point3d::new(0.0, 0.0, -s),
    ];
    let octahedron_faces = [
        [o[2], o[0], o[4]],
        [o[2], o[4], o[1]],
        [o[2], o[1], o[5]],
        [o[2], o[5], o[0]],
        [o[3], o[4], o[0]],
        [o[3], o[1], o[4]],
        [o[3], o[5], o[1]],
        [o[3], o[0], o[5]],
    ];
    for [a, b, c] in octahedron_faces {
        mesh.add_triangle("island", a, b, c);
    }

    mesh
}

/// One cylindrical face, radius `radius`, axis Z, axial extent
/// `axial_extent`, angular extent `angular_extent`, triangulated into a
/// strip. `steps` controls triangulation density only.
pub fn cylindrical_strip(radius: f64, axial_extent: f64, angular_extent: f64, steps: usize) -> TaggedMesh {
    let mut mesh = TaggedMesh::new();
    let axis = Vec3::new(0.0, 0.0, 1.0);
    let point_at = |theta: f64, z: f64| Point3d::new(radius * theta.cos(), radius * theta.sin(), z);

    for i in 0..steps {
        let theta0 = angular_extent * i as f64 / steps as f64;
        let theta1 = angular_extent * (i + 1) as f64 / steps as f64;
        let a = point_at(theta0, 0.0);
        let b = point_at(theta1, 0.0);
        let c = point_at(theta0, axial_extent);
        let d = point_at(theta1, axial_extent);
        mesh.add_triangle("cyl", a, b, d);
        mesh.add_triangle("cyl", a, d, c);
    }

    set_meta(&mut mesh, "cyl", FaceMeta::cylindrical(axis, Point3d::ORIGIN, radius));
    mesh
}

/// Bracket: a planar A-side flange, a quarter-cylinder bend (inside
/// radius `inside_radius`, thickness `thickness`), and a second planar
/// A-side flange, with mirrored B-side faces offset by `thickness` along
/// each face's outward normal. `flange_width` is the width (Y extent) of
/// each flange; `flange_depth` is the X-extent of the top flange and the
/// Z-extent of the side flange.
pub fn l_bracket(inside_radius: f64, thickness: f64, flange_depth: f64, flange_width: f64, steps: usize) -> TaggedMesh {
    let mut mesh = TaggedMesh::new();
    let outside_radius = inside_radius + thickness;
    let y0 = 0.0;
    let y1 = flange_width;

    // Bend center is at x=0, z=inside_radius (the cylinder's axis runs along Y).
    let axis = Vec3::new(0.0, 1.0, 0.0);
    let center = Point3d::new(0.0, 0.0, inside_radius);

    let inside_at = |theta: f64, y: f64| Point3d::new(-inside_radius * theta.sin(), y, inside_radius - inside_radius * theta.cos());
    let outside_at = |theta: f64, y: f64| Point3d::new(-outside_radius * theta.sin(), y, inside_radius - outside_radius * theta.cos());

    // Top flange (A side, theta=0 plane): spans x in [-flange_depth, 0], z=0.
    let top_a = [
        Point3d::new(-flange_depth, y0, 0.0),
        Point3d::new(0.0, y0, 0.0),
        Point3d::new(0.0, y1, 0.0),
        Point3d::new(-flange_depth, y1, 0.0),
    ];
    mesh.add_triangle("top_a", top_a[0], top_a[1], top_a[2]);
    mesh.add_triangle("top_a", top_a[0], top_a[2], top_a[3]);

    let top_b_z = thickness;
    let top_b = [
        Point3d::new(-flange_depth, y0, top_b_z),
        Point3d::new(0.0, y0, top_b_z),
        Point3d::new(0.0, y1, top_b_z),
        Point3d::new(-flange_depth, y1, top_b_z),
    ];
    mesh.add_triangle("top_b", top_b[0], top_b[2], top_b[1]);
    mesh.add_triangle("top_b", top_b[0], top_b[3], top_b[2]);

    // Quarter-cylinder bend, theta in [0, pi/2].
    for i in 0..steps {
        let t0 = FRAC_PI_2 * i as f64 / steps as f64;
        let t1 = FRAC_PI_2 * (i + 1) as f64 / steps as f64;
        let a0 = inside_at(t0, y0);
        let a1 = inside_at(t1, y0);
        let b0 = inside_at(t0, y1);
        let b1 = inside_at(t1, y1);
        mesh.add_triangle("bend_a", a0, a1, b1);
        mesh.add_triangle("bend_a", a0, b1, b0);

        let c0 = outside_at(t0, y0);
        let c1 = outside_at(t1, y0);
        let d0 = outside_at(t0, y1);
        let d1 = outside_at(t1, y1);
        mesh.add_triangle("bend_b", c0, d0, d1);
        mesh.add_triangle("bend_b", c0, d1, c1);
    }

    // Side flange (A side, theta=pi/2 plane): spans z in [inside_radius, inside_radius+flange_depth].
    let side_a_x = -inside_radius;
    let side_a = [
        Point3d::new(side_a_x, y0, inside_radius),
        Point3d::new(side_a_x, y0, inside_radius + flange_depth),
        Point3d::new(side_a_x, y1, inside_radius + flange_depth),
        Point3d::new(side_a_x, y1, inside_radius),
    ];
    mesh.add_triangle("side_a", side_a[0], side_a[1], side_a[2]);
    mesh.add_triangle("side_a", side_a[0], side_a[2], side_a[3]);

    let side_b_x = -outside_radius;
    let side_b = [
        Point3d::new(side_b_x, y0, inside_radius),
        Point3d::new(side_b_x, y0, inside_radius + flange_depth),
        Point3d::new(side_b_x, y1, inside_radius + flange_depth),
        Point3d::new(side_b_x, y1, inside_radius),
    ];
    mesh.add_triangle("side_b", side_b[0], side_b[2], side_b[1]);
    mesh.add_triangle("side_b", side_b[0], side_b[3], side_b[2]);

    set_meta(&mut mesh, "top_a", FaceMeta::planar().with_side(SheetSide::A));
    set_meta(&mut mesh, "top_b", FaceMeta::planar().with_side(SheetSide::B));
    set_meta(&mut mesh, "side_a", FaceMeta::planar().with_side(SheetSide::A));
    set_meta(&mut mesh, "side_b", FaceMeta::planar().with_side(SheetSide::B));
    set_meta(&mut mesh, "bend_a", FaceMeta::cylindrical(axis, center, inside_radius).with_side(SheetSide::A));
    set_meta(&mut mesh, "bend_b", FaceMeta::cylindrical(axis, center, outside_radius).with_side(SheetSide::B));

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_with_degenerate_triangle_has_expected_counts() {
        let mesh = cube_with_degenerate_triangle();
        assert_eq!(mesh.triangle_count(), 13);
        assert_eq!(mesh.vertex_count(), 8);
    }

    #[test]
    fn two_touching_unit_cubes_has_24_triangles_naive() {
        let mesh = two_touching_unit_cubes();
        assert_eq!(mesh.triangle_count(), 24);
    }

    #[test]
    fn sphere_with_interior_island_has_expected_shapes() {
        let mesh = sphere_with_interior_island();
        assert_eq!(mesh.triangle_count(), sphere_shell_triangle_count(10, 10) + 8);
    }

    #[test]
    fn l_bracket_has_six_faces() {
        let mesh = l_bracket(3.0, 2.0, 5.0, 4.0, 6);
        assert_eq!(mesh.face_meta().len(), 6);
    }
}
