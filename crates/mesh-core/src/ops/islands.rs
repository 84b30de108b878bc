//! §4.3.1 Remove Small Islands.

use std::collections::VecDeque;

use mesh_types::TriIdx;

use crate::geom::{ray_triangle_intersect, triangle_centroid};
use crate::mesh::TaggedMesh;
use crate::topology::TopologyIndex;

#[derive(Debug, Clone, Copy)]
pub struct IslandConfig {
    /// Components with more triangles than this are never removed, no
    /// matter their inside/outside classification.
    pub max_triangles: usize,
    pub remove_internal: bool,
    pub remove_external: bool,
}

impl Default for IslandConfig {
    fn default() -> Self {
        Self {
            max_triangles: 30,
            remove_internal: true,
            remove_external: true,
        }
    }
}

/// Group triangles into connected components via manifold (exactly-two
/// incident triangles) edge adjacency. The largest component is *main*;
/// every other component with at most `max_triangles` triangles is
/// classified inside/outside of *main* by a +X ray cast from its first
/// triangle's jittered centroid, and removed if the caller's flags say so.
pub fn remove_small_islands(mesh: &mut TaggedMesh, cfg: &IslandConfig) -> usize {
    let topo = TopologyIndex::build(mesh);
    let tri_count = mesh.triangle_count();
    if tri_count == 0 {
        return 0;
    }

    let mut tri_adj: Vec<Vec<usize>> = vec![Vec::new(); tri_count];
    for tris in topo.edge_to_tris.values() {
        if tris.len() == 2 {
            let a = tris[0].index();
            let b = tris[1].index();
            tri_adj[a].push(b);
            tri_adj[b].push(a);
        }
    }

    let mut component_of = vec![usize::MAX; tri_count];
    let mut components: Vec<Vec<usize>> = Vec::new();
    for start in 0..tri_count {
        if component_of[start] != usize::MAX {
            continue;
        }
        let comp_id = components.len();
        let mut queue = VecDeque::new();
        let mut members = Vec::new();
        queue.push_back(start);
        component_of[start] = comp_id;
        while let Some(t) = queue.pop_front() {
            members.push(t);
            for &n in &tri_adj[t] {
                if component_of[n] == usize::MAX {
                    component_of[n] = comp_id;
                    queue.push_back(n);
                }
            }
        }
        components.push(members);
    }

    if components.len() <= 1 {
        return 0;
    }

    let (main_idx, _) = components
        .iter()
        .enumerate()
        .max_by_key(|(_, members)| members.len())
        .unwrap();

    let positions = mesh.positions().to_vec();
    let triangles = mesh.triangles().to_vec();
    let main_tris: Vec<TriIdx> = components[main_idx].iter().map(|&t| TriIdx(t as u32)).collect();

    let mut remove_tri = vec![false; tri_count];
    for (idx, members) in components.iter().enumerate() {
        if idx == main_idx || members.len() > cfg.max_triangles {
            continue;
        }
        let first = members[0];
        let [a, b, c] = triangles[first];
        let centroid = triangle_centroid(positions[a as usize], positions[b as usize], positions[c as usize]);
        // Small jitter off the surface so the ray doesn't graze the source
        // triangle itself.
        let origin = mesh_types::Point3d::new(centroid.x, centroid.y + 1e-6, centroid.z + 1e-6);
        let dir = mesh_types::Vec3::X;
        let mut crossings = 0;
        for &mt in &main_tris {
            let [ma, mb, mc] = triangles[mt.index()];
            let p0 = positions[ma as usize];
            let p1 = positions[mb as usize];
            let p2 = positions[mc as usize];
            if ray_triangle_intersect(origin, dir, p0, p1, p2, 1e-9).is_some() {
                crossings += 1;
            }
        }
        let inside = crossings % 2 == 1;
        let drop = (inside && cfg.remove_internal) || (!inside && cfg.remove_external);
        if drop {
            for &t in members {
                remove_tri[t] = true;
            }
        }
    }

    let removed = remove_tri.iter().filter(|&&r| r).count();
    if removed == 0 {
        return 0;
    }

    let tri_face = mesh.tri_face().to_vec();
    let mut kept_triangles = Vec::with_capacity(tri_count - removed);
    let mut kept_faces = Vec::with_capacity(tri_count - removed);
    for t in 0..tri_count {
        if !remove_tri[t] {
            kept_triangles.push(triangles[t]);
            kept_faces.push(tri_face[t]);
        }
    }
    mesh.replace_topology(positions, kept_triangles, kept_faces);
    mesh.compact_vertices();
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::Point3d;

    fn add_triangle_soup(mesh: &mut TaggedMesh, face: &str, pts: &[(Point3d, Point3d, Point3d)]) {
        for (a, b, c) in pts {
            mesh.add_triangle(face, *a, *b, *c);
        }
    }

    #[test]
    fn removes_tiny_disjoint_triangle_outside_main_shell() {
        let mut mesh = TaggedMesh::new();
        // Main shell: two triangles forming a quad far from the origin.
        add_triangle_soup(
            &mut mesh,
            "main",
            &[
                (Point3d::new(10.0, 0.0, 0.0), Point3d::new(11.0, 0.0, 0.0), Point3d::new(10.0, 1.0, 0.0)),
                (Point3d::new(11.0, 0.0, 0.0), Point3d::new(11.0, 1.0, 0.0), Point3d::new(10.0, 1.0, 0.0)),
            ],
        );
        // Tiny floating island elsewhere.
        mesh.add_triangle("island", Point3d::ORIGIN, Point3d::new(0.1, 0.0, 0.0), Point3d::new(0.0, 0.1, 0.0));

        let cfg = IslandConfig::default();
        let removed = remove_small_islands(&mut mesh, &cfg);
        assert_eq!(removed, 1);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn leaves_single_component_mesh_untouched() {
        let mut mesh = TaggedMesh::new();
        mesh.add_triangle("a", Point3d::ORIGIN, Point3d::new(1.0, 0.0, 0.0), Point3d::new(0.0, 1.0, 0.0));
        let removed = remove_small_islands(&mut mesh, &IslandConfig::default());
        assert_eq!(removed, 0);
    }
}
