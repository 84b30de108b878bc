//! The Topology Index (§4.2): derived, disposable tables built by a single
//! scan over a [`TaggedMesh`]'s triangles. Rebuilt on demand; a cached
//! index carries the [`MeshVersion`] it was built from and is never reused
//! across a version bump (ref. REDESIGN FLAGS).

use std::collections::{HashMap, HashSet};

use mesh_types::{FaceId, Point3d, Tolerances, TriIdx, UnorderedEdge, VertIdx};
use smallvec::SmallVec;

use crate::mesh::{MeshVersion, TaggedMesh};

/// An ordered vertex sequence tracing one connected boundary between two
/// faces. Open chains have distinct endpoints (T-junctions); closed chains
/// repeat the first vertex as the last.
pub type Chain = Vec<VertIdx>;

/// Derived edge/vertex/face tables over a `TaggedMesh` snapshot (§3).
pub struct TopologyIndex {
    pub version: MeshVersion,
    pub edge_to_tris: HashMap<UnorderedEdge, SmallVec<[TriIdx; 2]>>,
    pub face_adj: HashMap<FaceId, HashSet<FaceId>>,
    pub face_pair_edges: HashMap<(FaceId, FaceId), Vec<Chain>>,
    pub face_tris: HashMap<FaceId, Vec<TriIdx>>,
}

fn ordered_pair(a: FaceId, b: FaceId) -> (FaceId, FaceId) {
    if a.0 <= b.0 {
        (a, b)
    } else {
        (b, a)
    }
}

impl TopologyIndex {
    /// Build by a single scan over `mesh`'s triangles (§4.2).
    pub fn build(mesh: &TaggedMesh) -> Self {
        let mut edge_to_tris: HashMap<UnorderedEdge, SmallVec<[TriIdx; 2]>> = HashMap::new();
        let mut face_tris: HashMap<FaceId, Vec<TriIdx>> = HashMap::new();

        for (t, tri) in mesh.triangles().iter().enumerate() {
            let tri_idx = TriIdx(t as u32);
            let face = mesh.tri_face()[t];
            face_tris.entry(face).or_default().push(tri_idx);
            for &(a, b) in &[(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let key = UnorderedEdge::new(VertIdx(a), VertIdx(b));
                edge_to_tris.entry(key).or_default().push(tri_idx);
            }
        }

        let mut face_adj: HashMap<FaceId, HashSet<FaceId>> = HashMap::new();
        // Collect, per face pair, the set of boundary edges so chains can be
        // traced after the full scan.
        let mut pair_edges: HashMap<(FaceId, FaceId), Vec<(VertIdx, VertIdx)>> = HashMap::new();

        for (edge, tris) in &edge_to_tris {
            if tris.len() != 2 {
                continue;
            }
            let fa = mesh.tri_face()[tris[0].index()];
            let fb = mesh.tri_face()[tris[1].index()];
            if fa == fb {
                continue;
            }
            let key = ordered_pair(fa, fb);
            face_adj.entry(fa).or_default().insert(fb);
            face_adj.entry(fb).or_default().insert(fa);
            pair_edges.entry(key).or_default().push((edge.0, edge.1));
        }

        let mut face_pair_edges = HashMap::new();
        for (pair, edges) in pair_edges {
            face_pair_edges.insert(pair, trace_chains(&edges));
        }

        Self {
            version: mesh.version(),
            edge_to_tris,
            face_adj,
            face_pair_edges,
            face_tris,
        }
    }

    /// `true` if this index was built from `mesh`'s current version.
    pub fn is_fresh(&self, mesh: &TaggedMesh) -> bool {
        self.version == mesh.version()
    }

    /// Manifold edges: exactly two incident triangles, any face.
    pub fn manifold_edges(&self) -> impl Iterator<Item = (&UnorderedEdge, &SmallVec<[TriIdx; 2]>)> {
        self.edge_to_tris.iter().filter(|(_, tris)| tris.len() == 2)
    }

    pub fn chains_between(&self, a: FaceId, b: FaceId) -> Option<&Vec<Chain>> {
        self.face_pair_edges.get(&ordered_pair(a, b))
    }
}

/// Reconstruct chains from an unordered set of edges over a shared vertex
/// index space: DFS from degree-1 seeds yields open chains; remaining
/// edges yield closed loops (§4.2).
pub fn trace_chains(edges: &[(VertIdx, VertIdx)]) -> Vec<Chain> {
    let mut adj: HashMap<VertIdx, Vec<VertIdx>> = HashMap::new();
    for &(a, b) in edges {
        adj.entry(a).or_default().push(b);
        adj.entry(b).or_default().push(a);
    }
    let mut visited: HashSet<(VertIdx, VertIdx)> = HashSet::new();
    let mark = |visited: &mut HashSet<(VertIdx, VertIdx)>, a: VertIdx, b: VertIdx| {
        visited.insert((a, b));
        visited.insert((b, a));
    };
    let mut chains = Vec::new();

    // Open chains first: walk from every degree-1 vertex.
    let mut seeds: Vec<VertIdx> = adj
        .iter()
        .filter(|(_, neighbors)| neighbors.len() == 1)
        .map(|(&v, _)| v)
        .collect();
    seeds.sort_by_key(|v| v.0);

    for seed in seeds {
        // A degree-1 vertex may have already been consumed as the tail of
        // another chain sharing the same endpoint pool.
        let Some(first_edge) = adj[&seed].iter().find(|&&n| !visited.contains(&(seed, n))).copied() else {
            continue;
        };
        let mut chain = vec![seed];
        let mut prev = seed;
        let mut cur = first_edge;
        mark(&mut visited, prev, cur);
        chain.push(cur);
        loop {
            let next = adj
                .get(&cur)
                .and_then(|neighbors| neighbors.iter().find(|&&n| n != prev && !visited.contains(&(cur, n))).copied());
            match next {
                Some(n) => {
                    mark(&mut visited, cur, n);
                    prev = cur;
                    cur = n;
                    chain.push(cur);
                }
                None => break,
            }
        }
        chains.push(chain);
    }

    // Remaining edges form closed loops.
    let mut remaining: Vec<VertIdx> = adj.keys().copied().collect();
    remaining.sort_by_key(|v| v.0);
    for start in remaining {
        let Some(first) = adj[&start].iter().find(|&&n| !visited.contains(&(start, n))).copied() else {
            continue;
        };
        let mut chain = vec![start];
        let mut prev = start;
        let mut cur = first;
        mark(&mut visited, prev, cur);
        chain.push(cur);
        while cur != start {
            let next = adj
                .get(&cur)
                .and_then(|neighbors| neighbors.iter().find(|&&n| n != prev && !visited.contains(&(cur, n))).copied());
            match next {
                Some(n) => {
                    mark(&mut visited, cur, n);
                    prev = cur;
                    cur = n;
                    chain.push(cur);
                }
                None => break,
            }
        }
        chains.push(chain);
    }

    chains
}

/// Round a coordinate to the quantization lattice used by the quantized
/// topology variant: `τ = max(1e-5, diag·1e-8, tol)` (§4.2).
pub fn quantize_spacing(diag: f64, tol: &Tolerances) -> f64 {
    (1e-5_f64).max(diag * 1e-8).max(tol.weld)
}

pub fn quantize_point(p: Point3d, tau: f64) -> (i64, i64, i64) {
    let q = |v: f64| (v / tau).round() as i64;
    (q(p.x), q(p.y), q(p.z))
}

/// Quantized variant (§4.2): collapses distinct vertex indices that map to
/// the same coordinate key, for topology queries across operators that
/// copy vertices (e.g. after the edge-collapse cleanup's adopted mesh).
/// Chains are traced over keys, then mapped back to each face's own vertex
/// indices by picking one representative occurrence per key per face.
pub struct QuantizedFaceChains {
    /// Parallel sequences: `(chain_on_a, chain_on_b)` for each connected
    /// boundary, in each face's own vertex-index space.
    pub pairs: Vec<(Chain, Chain)>,
}

pub fn quantized_chains_between(
    mesh: &TaggedMesh,
    face_tris: &HashMap<FaceId, Vec<TriIdx>>,
    a: FaceId,
    b: FaceId,
    tau: f64,
) -> QuantizedFaceChains {
    let key_of = |v: VertIdx| quantize_point(mesh.positions()[v.index()], tau);

    let mut key_to_vert_a: HashMap<(i64, i64, i64), VertIdx> = HashMap::new();
    let mut key_to_vert_b: HashMap<(i64, i64, i64), VertIdx> = HashMap::new();
    let mut edge_keys: Vec<((i64, i64, i64), (i64, i64, i64))> = Vec::new();

    let mut collect = |face: FaceId, dest: &mut HashMap<(i64, i64, i64), VertIdx>| {
        if let Some(tris) = face_tris.get(&face) {
            for &t in tris {
                let tri = mesh.triangles()[t.index()];
                for &v in &tri {
                    dest.entry(key_of(VertIdx(v))).or_insert(VertIdx(v));
                }
            }
        }
    };
    collect(a, &mut key_to_vert_a);
    collect(b, &mut key_to_vert_b);

    // Boundary edges between the two faces, expressed as key pairs: any
    // edge whose two endpoint keys are each present in both faces'
    // vertex sets but whose incident triangles split across a and b.
    if let (Some(tris_a), Some(tris_b)) = (face_tris.get(&a), face_tris.get(&b)) {
        let mut edge_owner: HashMap<UnorderedEdge, HashSet<FaceId>> = HashMap::new();
        for (face, tris) in [(a, tris_a), (b, tris_b)] {
            for &t in tris {
                let tri = mesh.triangles()[t.index()];
                for &(x, y) in &[(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                    let key = UnorderedEdge::new(VertIdx(x), VertIdx(y));
                    edge_owner.entry(key).or_default().insert(face);
                }
            }
        }
        for (edge, owners) in &edge_owner {
            if owners.len() == 2 && owners.contains(&a) && owners.contains(&b) {
                edge_keys.push((key_of(edge.0), key_of(edge.1)));
            }
        }
    }

    let key_chains = trace_chains_on_keys(&edge_keys);
    let pairs = key_chains
        .into_iter()
        .filter_map(|key_chain| {
            let chain_a: Option<Chain> = key_chain.iter().map(|k| key_to_vert_a.get(k).copied()).collect();
            let chain_b: Option<Chain> = key_chain.iter().map(|k| key_to_vert_b.get(k).copied()).collect();
            match (chain_a, chain_b) {
                (Some(ca), Some(cb)) => Some((ca, cb)),
                _ => None,
            }
        })
        .collect();

    QuantizedFaceChains { pairs }
}

fn trace_chains_on_keys(edges: &[((i64, i64, i64), (i64, i64, i64))]) -> Vec<Vec<(i64, i64, i64)>> {
    // Reuse `trace_chains`'s algorithm by mapping keys to dense indices.
    let mut key_list: Vec<(i64, i64, i64)> = Vec::new();
    let mut key_index: HashMap<(i64, i64, i64), u32> = HashMap::new();
    let mut as_vertidx_edges = Vec::new();
    for &(ka, kb) in edges {
        let ia = *key_index.entry(ka).or_insert_with(|| {
            key_list.push(ka);
            (key_list.len() - 1) as u32
        });
        let ib = *key_index.entry(kb).or_insert_with(|| {
            key_list.push(kb);
            (key_list.len() - 1) as u32
        });
        as_vertidx_edges.push((VertIdx(ia), VertIdx(ib)));
    }
    trace_chains(&as_vertidx_edges)
        .into_iter()
        .map(|chain| chain.into_iter().map(|v| key_list[v.index()]).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::Point3d;

    fn quad_mesh() -> TaggedMesh {
        let mut mesh = TaggedMesh::new();
        let p00 = Point3d::new(0.0, 0.0, 0.0);
        let p10 = Point3d::new(1.0, 0.0, 0.0);
        let p01 = Point3d::new(0.0, 1.0, 0.0);
        let p11 = Point3d::new(1.0, 1.0, 0.0);
        mesh.add_triangle("left", p00, p10, p01);
        mesh.add_triangle("right", p10, p11, p01);
        mesh
    }

    #[test]
    fn builds_face_adjacency_across_shared_edge() {
        let mesh = quad_mesh();
        let topo = TopologyIndex::build(&mesh);
        assert_eq!(topo.face_adj.len(), 2);
        for neighbors in topo.face_adj.values() {
            assert_eq!(neighbors.len(), 1);
        }
    }

    #[test]
    fn chain_between_two_triangles_has_two_vertices() {
        let mesh = quad_mesh();
        let topo = TopologyIndex::build(&mesh);
        let faces: Vec<FaceId> = topo.face_adj.keys().copied().collect();
        let chains = topo.chains_between(faces[0], faces[1]).unwrap();
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].len(), 2);
    }

    #[test]
    fn trace_chains_open_and_closed() {
        // Open chain: 0-1-2
        let open = trace_chains(&[(VertIdx(0), VertIdx(1)), (VertIdx(1), VertIdx(2))]);
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].len(), 3);

        // Closed loop: 0-1-2-0
        let closed = trace_chains(&[
            (VertIdx(0), VertIdx(1)),
            (VertIdx(1), VertIdx(2)),
            (VertIdx(2), VertIdx(0)),
        ]);
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].first(), closed[0].last());
    }
}
