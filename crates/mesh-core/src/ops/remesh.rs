//! §4.3.4 Uniform-Length Remesh.

use mesh_types::{MeshError, Point3d};

use crate::cancel::CancellationToken;
use crate::mesh::TaggedMesh;
use crate::ops::winding::fix_triangle_windings_by_adjacency;

#[derive(Debug, Clone, Copy)]
pub struct RemeshConfig {
    pub max_edge_length: f64,
    pub max_iterations: usize,
}

impl Default for RemeshConfig {
    fn default() -> Self {
        Self {
            max_edge_length: 1.0,
            max_iterations: 10,
        }
    }
}

/// Soft cap on triangle-count growth relative to the input, matching §5's
/// resource-model note for operators that can grow the mesh.
const GROWTH_CAP_FACTOR: usize = 10;

/// Split every edge longer than `max_edge_length` by midpoint, subdividing
/// each triangle by the standard longest-edge bisection pattern (1, 2, 3, or
/// 4 children depending on how many of its edges are long). Repeats until
/// no long edges remain or the iteration cap is hit. Re-runs winding fix-up.
pub fn remesh_uniform_length(
    mesh: &mut TaggedMesh,
    cfg: &RemeshConfig,
    cancel: &CancellationToken,
) -> Result<usize, MeshError> {
    let input_tris = mesh.triangle_count();
    let growth_cap = (input_tris * GROWTH_CAP_FACTOR).max(64);
    let mut total_splits = 0;

    for pass in 0..cfg.max_iterations {
        if cancel.is_cancelled() {
            break;
        }
        let positions = mesh.positions().to_vec();
        let triangles = mesh.triangles().to_vec();
        let tri_face = mesh.tri_face().to_vec();

        let edge_len = |a: u32, b: u32| (positions[a as usize] - positions[b as usize]).length();
        let mut any_long = false;
        let mut new_positions = positions.clone();
        let mut midpoint_cache: std::collections::HashMap<(u32, u32), u32> = std::collections::HashMap::new();
        let mut midpoint_of = |a: u32, b: u32, new_positions: &mut Vec<Point3d>| -> u32 {
            let key = if a <= b { (a, b) } else { (b, a) };
            if let Some(&idx) = midpoint_cache.get(&key) {
                return idx;
            }
            let mid = new_positions[a as usize].midpoint(&new_positions[b as usize]);
            let idx = new_positions.len() as u32;
            new_positions.push(mid);
            midpoint_cache.insert(key, idx);
            idx
        };

        let mut new_triangles = Vec::with_capacity(triangles.len());
        let mut new_tri_face = Vec::with_capacity(triangles.len());

        for (tri, &face) in triangles.iter().zip(tri_face.iter()) {
            let [a, b, c] = *tri;
            let long_ab = edge_len(a, b) > cfg.max_edge_length;
            let long_bc = edge_len(b, c) > cfg.max_edge_length;
            let long_ca = edge_len(c, a) > cfg.max_edge_length;
            let long_count = long_ab as u8 + long_bc as u8 + long_ca as u8;

            if long_count == 0 {
                new_triangles.push([a, b, c]);
                new_tri_face.push(face);
                continue;
            }
            any_long = true;

            match long_count {
                1 => {
                    // Bisect across the single long edge's opposite vertex.
                    let (m, p0, p1, apex) = if long_ab {
                        (midpoint_of(a, b, &mut new_positions), a, b, c)
                    } else if long_bc {
                        (midpoint_of(b, c, &mut new_positions), b, c, a)
                    } else {
                        (midpoint_of(c, a, &mut new_positions), c, a, b)
                    };
                    new_triangles.push([p0, m, apex]);
                    new_triangles.push([m, p1, apex]);
                    new_tri_face.push(face);
                    new_tri_face.push(face);
                }
                2 => {
                    // Three children: split both long edges, keep the
                    // short-edge corner whole.
                    let (short_vertex, p_next, p_prev) = if !long_ab {
                        (c, a, b)
                    } else if !long_bc {
                        (a, b, c)
                    } else {
                        (b, c, a)
                    };
                    let m_next = midpoint_of(short_vertex, p_next, &mut new_positions);
                    let m_prev = midpoint_of(p_prev, short_vertex, &mut new_positions);
                    new_triangles.push([short_vertex, m_next, m_prev]);
                    new_triangles.push([m_next, p_next, p_prev]);
                    new_triangles.push([m_next, p_prev, m_prev]);
                    new_tri_face.extend([face, face, face]);
                }
                _ => {
                    // All three long: the classic 1-to-4 split.
                    let mab = midpoint_of(a, b, &mut new_positions);
                    let mbc = midpoint_of(b, c, &mut new_positions);
                    let mca = midpoint_of(c, a, &mut new_positions);
                    new_triangles.push([a, mab, mca]);
                    new_triangles.push([b, mbc, mab]);
                    new_triangles.push([c, mca, mbc]);
                    new_triangles.push([mab, mbc, mca]);
                    new_tri_face.extend([face, face, face, face]);
                }
            }
        }

        if !any_long {
            break;
        }
        if new_triangles.len() > growth_cap {
            return Err(MeshError::ExceededBudget {
                operator: "remesh_uniform_length".to_string(),
                iterations: pass + 1,
            });
        }
        total_splits += new_triangles.len() - triangles.len();
        mesh.replace_topology(new_positions, new_triangles, new_tri_face);
    }

    if total_splits > 0 {
        fix_triangle_windings_by_adjacency(mesh);
    }
    Ok(total_splits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::Point3d;

    #[test]
    fn splits_single_long_edge_into_two() {
        let mut mesh = TaggedMesh::new();
        mesh.add_triangle("a", Point3d::ORIGIN, Point3d::new(10.0, 0.0, 0.0), Point3d::new(0.0, 1.0, 0.0));
        let cfg = RemeshConfig {
            max_edge_length: 2.0,
            max_iterations: 6,
        };
        let splits = remesh_uniform_length(&mut mesh, &cfg, &CancellationToken::never()).unwrap();
        assert!(splits > 0);
        assert!(mesh.triangles().iter().all(|tri| {
            let positions = mesh.positions();
            let [a, b, c] = *tri;
            let len = |x: u32, y: u32| (positions[x as usize] - positions[y as usize]).length();
            len(a, b) <= 2.0 + 1e-9 && len(b, c) <= 2.0 + 1e-9 && len(c, a) <= 2.0 + 1e-9
        }));
    }

    #[test]
    fn leaves_short_edges_untouched() {
        let mut mesh = TaggedMesh::new();
        mesh.add_triangle("a", Point3d::ORIGIN, Point3d::new(0.5, 0.0, 0.0), Point3d::new(0.0, 0.5, 0.0));
        let splits = remesh_uniform_length(&mut mesh, &RemeshConfig::default(), &CancellationToken::never()).unwrap();
        assert_eq!(splits, 0);
        assert_eq!(mesh.triangle_count(), 1);
    }
}
