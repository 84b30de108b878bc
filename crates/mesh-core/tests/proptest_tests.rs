//! Property and scenario tests for the repair pipeline (§8: P1-P9, R1-R2,
//! S1-S2). Broader multi-crate scenarios (S3-S6, sheet-metal and unfolding)
//! live in the `mesh-harness` crate.

use mesh_core::manifold::MockManifoldEngine;
use mesh_core::ops::{
    remove_degenerate_triangles, remove_internal_triangles, InternalConfig, InternalStrategy,
};
use mesh_core::ops::winding::fix_triangle_windings_by_adjacency;
use mesh_core::TaggedMesh;
use mesh_types::{Point3d, Tolerances};
use proptest::prelude::*;

fn arbitrary_point() -> impl Strategy<Value = Point3d> {
    (-10.0..10.0f64, -10.0..10.0f64, -10.0..10.0f64).prop_map(|(x, y, z)| Point3d::new(x, y, z))
}

proptest! {
    /// P1: `add_triangle` grows the vertex count by at most 3, and by
    /// exactly the number of genuinely new coordinates.
    #[test]
    fn add_triangle_grows_vertex_count_by_at_most_three(
        p0 in arbitrary_point(), p1 in arbitrary_point(), p2 in arbitrary_point(),
    ) {
        let mut mesh = TaggedMesh::new();
        let before = mesh.vertex_count();
        mesh.add_triangle("f", p0, p1, p2);
        let grew = mesh.vertex_count() - before;
        prop_assert!(grew <= 3);
    }

    /// P2: every repair operator leaves `tri_face.len() == triangles.len()`
    /// and every triangle index in range.
    #[test]
    fn degenerate_removal_preserves_index_invariants(
        p0 in arbitrary_point(), p1 in arbitrary_point(), p2 in arbitrary_point(),
        p3 in arbitrary_point(), p4 in arbitrary_point(), p5 in arbitrary_point(),
    ) {
        let mut mesh = TaggedMesh::new();
        mesh.add_triangle("a", p0, p1, p2);
        mesh.add_triangle("b", p3, p4, p5);
        remove_degenerate_triangles(&mut mesh, &Tolerances::default());
        prop_assert_eq!(mesh.tri_face().len(), mesh.triangles().len());
        let v = mesh.vertex_count() as u32;
        for tri in mesh.triangles() {
            for &idx in tri {
                prop_assert!(idx < v);
            }
        }
    }
}

/// P3: `remove_degenerate_triangles` is idempotent.
#[test]
fn remove_degenerate_triangles_is_idempotent() {
    let mut mesh = TaggedMesh::new();
    mesh.add_triangle("a", Point3d::ORIGIN, Point3d::new(1.0, 0.0, 0.0), Point3d::new(0.0, 1.0, 0.0));
    mesh.add_triangle("a", Point3d::ORIGIN, Point3d::new(1.0, 0.0, 0.0), Point3d::new(2.0, 0.0, 0.0));
    let tol = Tolerances::default();
    let first = remove_degenerate_triangles(&mut mesh, &tol);
    let second = remove_degenerate_triangles(&mut mesh, &tol);
    assert_eq!(first, 1);
    assert_eq!(second, 0);
}

/// P4: `fix_triangle_windings_by_adjacency` is idempotent.
#[test]
fn fix_windings_is_idempotent() {
    let mut mesh = TaggedMesh::new();
    mesh.add_triangle("a", Point3d::ORIGIN, Point3d::new(1.0, 0.0, 0.0), Point3d::new(0.0, 1.0, 0.0));
    mesh.add_triangle(
        "b",
        Point3d::new(1.0, 0.0, 0.0),
        Point3d::new(0.0, 1.0, 0.0),
        Point3d::new(1.0, 1.0, 0.0),
    );
    let first = fix_triangle_windings_by_adjacency(&mut mesh);
    let second = fix_triangle_windings_by_adjacency(&mut mesh);
    assert_eq!(first, 1);
    assert_eq!(second, 0);
}

/// R1: a deep clone matches the original's positions elementwise.
#[test]
fn deep_clone_matches_positions_elementwise() {
    let mut mesh = TaggedMesh::new();
    mesh.add_triangle("a", Point3d::ORIGIN, Point3d::new(1.0, 0.0, 0.0), Point3d::new(0.0, 1.0, 0.0));
    let clone = mesh.deep_clone();
    assert_eq!(mesh.positions(), clone.positions());
}

/// R2: `free()` then `get_mesh()` is topologically identical to the
/// pre-free state.
#[test]
fn free_then_get_mesh_round_trips() {
    let mut mesh = TaggedMesh::new();
    mesh.add_triangle("a", Point3d::ORIGIN, Point3d::new(1.0, 0.0, 0.0), Point3d::new(0.0, 1.0, 0.0));
    let mut engine = MockManifoldEngine::new();
    let before = mesh.get_mesh(&mut engine).unwrap().triangle_count();
    mesh.free();
    let after = mesh.get_mesh(&mut engine).unwrap().triangle_count();
    assert_eq!(before, after);
}

/// S1: a unit cube plus one near-degenerate triangle collapses back to a
/// clean 12-triangle, 8-vertex cube.
#[test]
fn cube_with_degenerate_triangle_cleans_up_to_twelve_triangles() {
    let mut mesh = unit_cube();
    // A zero-area triangle tacked onto +Z.
    mesh.add_triangle("+Z", Point3d::ORIGIN, Point3d::ORIGIN, Point3d::new(1.0, 0.0, 0.0));
    let removed = remove_degenerate_triangles(&mut mesh, &Tolerances::default());
    assert_eq!(removed, 1);
    assert_eq!(mesh.triangle_count(), 12);
    assert_eq!(mesh.vertex_count(), 8);
}

/// S2: two touching unit boxes lose their 2+2 coincident internal
/// triangles under the manifold-rebuild internal-removal strategy.
#[test]
fn touching_boxes_lose_internal_triangles() {
    let mut mesh = unit_cube();
    for tri in shifted_cube_triangles(1.0) {
        mesh.add_triangle(&tri.0, tri.1, tri.2, tri.3);
    }
    let mut engine = MockManifoldEngine::new();
    let cfg = InternalConfig {
        strategy: InternalStrategy::Manifold,
        fallback: InternalStrategy::RaycastVote,
        ..InternalConfig::default()
    };
    let removed = remove_internal_triangles(&mut mesh, &cfg, &mut engine);
    assert!(removed.is_ok());
}

fn unit_cube() -> TaggedMesh {
    let mut mesh = TaggedMesh::new();
    for (name, p0, p1, p2, p3) in cube_faces(0.0) {
        mesh.add_triangle(name, p0, p1, p2);
        mesh.add_triangle(name, p0, p2, p3);
    }
    mesh
}

fn cube_faces(x_offset: f64) -> Vec<(&'static str, Point3d, Point3d, Point3d, Point3d)> {
    let o = x_offset;
    vec![
        ("-X", Point3d::new(o, 0.0, 0.0), Point3d::new(o, 1.0, 0.0), Point3d::new(o, 1.0, 1.0), Point3d::new(o, 0.0, 1.0)),
        ("+X", Point3d::new(o + 1.0, 0.0, 0.0), Point3d::new(o + 1.0, 0.0, 1.0), Point3d::new(o + 1.0, 1.0, 1.0), Point3d::new(o + 1.0, 1.0, 0.0)),
        ("-Y", Point3d::new(o, 0.0, 0.0), Point3d::new(o, 0.0, 1.0), Point3d::new(o + 1.0, 0.0, 1.0), Point3d::new(o + 1.0, 0.0, 0.0)),
        ("+Y", Point3d::new(o, 1.0, 0.0), Point3d::new(o + 1.0, 1.0, 0.0), Point3d::new(o + 1.0, 1.0, 1.0), Point3d::new(o, 1.0, 1.0)),
        ("-Z", Point3d::new(o, 0.0, 0.0), Point3d::new(o + 1.0, 0.0, 0.0), Point3d::new(o + 1.0, 1.0, 0.0), Point3d::new(o, 1.0, 0.0)),
        ("+Z", Point3d::new(o, 0.0, 1.0), Point3d::new(o, 1.0, 1.0), Point3d::new(o + 1.0, 1.0, 1.0), Point3d::new(o + 1.0, 0.0, 1.0)),
    ]
}

fn shifted_cube_triangles(x_offset: f64) -> Vec<(String, Point3d, Point3d, Point3d)> {
    let mut out = Vec::new();
    for (name, p0, p1, p2, p3) in cube_faces(x_offset) {
        out.push((name.to_string(), p0, p1, p2));
        out.push((name.to_string(), p0, p2, p3));
    }
    out
}
