use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense index into a `TaggedMesh`'s vertex array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertIdx(pub u32);

/// Dense index into a `TaggedMesh`'s triangle array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TriIdx(pub u32);

/// Stable identifier for a semantic face (a maximal run of triangles sharing
/// a face name). Distinct from the dense vertex/triangle indices, which are
/// reassigned whenever an operator compacts the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FaceId(pub u32);

impl fmt::Display for VertIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl fmt::Display for TriIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

impl fmt::Display for FaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "face#{}", self.0)
    }
}

impl VertIdx {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl TriIdx {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// An unordered pair of vertex indices, used as an edge key in the topology
/// index. Always stored with the smaller index first so two directed
/// half-edges of the same edge hash identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnorderedEdge(pub VertIdx, pub VertIdx);

impl UnorderedEdge {
    pub fn new(a: VertIdx, b: VertIdx) -> Self {
        if a.0 <= b.0 {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }
}
