//! §4.3.10 Fix Triangle Windings by Adjacency.

use std::collections::VecDeque;

use mesh_types::UnorderedEdge;

use crate::mesh::TaggedMesh;
use crate::topology::TopologyIndex;

/// BFS over manifold edges (exactly two incident triangles) from an
/// arbitrary seed: whenever two triangles walk their shared edge in the
/// same direction, one is flipped so the orientation is consistent.
/// Spreads a single orientation over each connected component.
pub fn fix_triangle_windings_by_adjacency(mesh: &mut TaggedMesh) -> usize {
    let topo = TopologyIndex::build(mesh);
    let mut triangles = mesh.triangles().to_vec();
    if triangles.is_empty() {
        return 0;
    }

    let mut tri_adj: Vec<Vec<(usize, UnorderedEdge)>> = vec![Vec::new(); triangles.len()];
    for (&edge, tris) in &topo.edge_to_tris {
        if tris.len() == 2 {
            let a = tris[0].index();
            let b = tris[1].index();
            tri_adj[a].push((b, edge));
            tri_adj[b].push((a, edge));
        }
    }

    let mut visited = vec![false; triangles.len()];
    let mut flips = 0;

    for start in 0..triangles.len() {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        let mut queue = VecDeque::new();
        queue.push_back(start);
        while let Some(t) = queue.pop_front() {
            for &(n, edge) in &tri_adj[t] {
                if visited[n] {
                    continue;
                }
                visited[n] = true;
                if edge_direction_agrees(triangles[t], triangles[n], edge) {
                    triangles[n] = [triangles[n][0], triangles[n][2], triangles[n][1]];
                    flips += 1;
                }
                queue.push_back(n);
            }
        }
    }

    if flips > 0 {
        let positions = mesh.positions().to_vec();
        let tri_face = mesh.tri_face().to_vec();
        mesh.replace_topology(positions, triangles, tri_face);
    }
    flips
}

/// `true` if `tri_a` and `tri_b` traverse the shared `edge` in the same
/// direction (a winding conflict); `false` if they traverse it in
/// opposite directions (consistent orientation).
fn edge_direction_agrees(tri_a: [u32; 3], tri_b: [u32; 3], edge: UnorderedEdge) -> bool {
    let dir_in = |tri: [u32; 3]| -> Option<bool> {
        for i in 0..3 {
            let a = tri[i];
            let b = tri[(i + 1) % 3];
            if (a, b) == (edge.0 .0, edge.1 .0) {
                return Some(true);
            }
            if (a, b) == (edge.1 .0, edge.0 .0) {
                return Some(false);
            }
        }
        None
    };
    match (dir_in(tri_a), dir_in(tri_b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::Point3d;

    #[test]
    fn flips_inconsistent_neighbor() {
        let mut mesh = TaggedMesh::new();
        mesh.add_triangle("a", Point3d::ORIGIN, Point3d::new(1.0, 0.0, 0.0), Point3d::new(0.0, 1.0, 0.0));
        // Wound the same direction as its neighbor across the shared edge
        // (1,0,0)-(0,1,0): a winding conflict that should get one flip.
        mesh.add_triangle(
            "b",
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(0.0, 1.0, 0.0),
            Point3d::new(1.0, 1.0, 0.0),
        );
        let flips = fix_triangle_windings_by_adjacency(&mut mesh);
        assert_eq!(flips, 1);
    }

    #[test]
    fn leaves_already_consistent_mesh_untouched() {
        let mut mesh = TaggedMesh::new();
        mesh.add_triangle("a", Point3d::ORIGIN, Point3d::new(1.0, 0.0, 0.0), Point3d::new(0.0, 1.0, 0.0));
        mesh.add_triangle(
            "b",
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(1.0, 1.0, 0.0),
            Point3d::new(0.0, 1.0, 0.0),
        );
        let flips = fix_triangle_windings_by_adjacency(&mut mesh);
        assert_eq!(flips, 0);
    }
}
