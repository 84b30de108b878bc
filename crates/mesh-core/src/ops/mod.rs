//! The mesh repair operator library (§4.3). Every operator reads and
//! writes a [`crate::mesh::TaggedMesh`] in place, returns a count of
//! changes, and calls `touch()` on any modification. None of them keep
//! state between calls; the [`crate::orchestrator::RepairPipeline`]
//! sequences them.

pub mod collapse;
pub mod degenerate;
pub mod edge_flip;
pub mod internal;
pub mod islands;
pub mod merge_faces;
pub mod opposite;
pub mod remesh;
pub mod self_intersect;
pub mod winding;

pub use collapse::{collapse_tiny_triangles, CollapseConfig};
pub use degenerate::remove_degenerate_triangles;
pub use edge_flip::{flip_tiny_triangle_edges, EdgeFlipConfig};
pub use internal::{remove_internal_triangles, InternalConfig, InternalStrategy};
pub use islands::{remove_small_islands, IslandConfig};
pub use merge_faces::{merge_tiny_faces, MergeFacesConfig};
pub use opposite::{remove_opposite_single_edge_faces, OppositeFaceConfig};
pub use remesh::{remesh_uniform_length, RemeshConfig};
pub use self_intersect::{split_self_intersecting_triangles, SelfIntersectConfig};
pub use winding::fix_triangle_windings_by_adjacency;
