//! §4.3.7 Remove Degenerate Triangles.

use mesh_types::Tolerances;

use crate::geom::triangle_area;
use crate::mesh::TaggedMesh;

/// Drop any triangle with duplicate vertices or area below `tol.area`.
/// Compacts vertices if anything was removed.
pub fn remove_degenerate_triangles(mesh: &mut TaggedMesh, tol: &Tolerances) -> usize {
    let positions = mesh.positions().to_vec();
    let mut kept_triangles = Vec::with_capacity(mesh.triangles().len());
    let mut kept_faces = Vec::with_capacity(mesh.triangles().len());
    let mut removed = 0;

    for (tri, face) in mesh.triangles().iter().zip(mesh.tri_face().iter()) {
        let [a, b, c] = *tri;
        if a == b || b == c || a == c {
            removed += 1;
            continue;
        }
        let p0 = positions[a as usize];
        let p1 = positions[b as usize];
        let p2 = positions[c as usize];
        if triangle_area(p0, p1, p2) <= tol.area {
            removed += 1;
            continue;
        }
        kept_triangles.push(*tri);
        kept_faces.push(*face);
    }

    if removed > 0 {
        mesh.replace_topology(positions, kept_triangles, kept_faces);
        mesh.compact_vertices();
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::Point3d;

    #[test]
    fn drops_zero_area_triangle() {
        let mut mesh = TaggedMesh::new();
        mesh.add_triangle("a", Point3d::ORIGIN, Point3d::new(1.0, 0.0, 0.0), Point3d::new(0.0, 1.0, 0.0));
        // Collinear points: zero area.
        mesh.add_triangle(
            "a",
            Point3d::ORIGIN,
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(2.0, 0.0, 0.0),
        );
        let tol = Tolerances::default();
        let removed = remove_degenerate_triangles(&mut mesh, &tol);
        assert_eq!(removed, 1);
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn keeps_healthy_mesh_untouched() {
        let mut mesh = TaggedMesh::new();
        mesh.add_triangle("a", Point3d::ORIGIN, Point3d::new(1.0, 0.0, 0.0), Point3d::new(0.0, 1.0, 0.0));
        let removed = remove_degenerate_triangles(&mut mesh, &Tolerances::default());
        assert_eq!(removed, 0);
        assert_eq!(mesh.triangle_count(), 1);
    }
}
