//! The Tagged Mesh Store, Topology Index, repair operators, and the
//! orchestrating pipeline (§3, §4). This crate owns the mesh-repair half of
//! the system; sheet-metal classification and unfolding live in the sibling
//! `sheet-metal` crate. The boolean-mesh backend behind [`ManifoldEngine`] is
//! intentionally not shipped here — [`MockManifoldEngine`] is the only
//! implementation, by design (see DESIGN.md).

pub mod cancel;
pub mod geom;
pub mod external;
pub mod manifold;
pub mod mesh;
pub mod ops;
pub mod orchestrator;
pub mod topology;

pub use cancel::CancellationToken;
pub use external::{tagged_mesh_from_raw, raw_from_tagged_mesh, FaceMetaWire, RawMesh};
pub use manifold::{ManifoldEngine, ManifoldError, ManifoldHandle, MockManifoldEngine};
pub use mesh::{MeshVersion, Polyline, TaggedMesh};
pub use orchestrator::{RepairOutcome, RepairPipeline, RepairStep};
pub use topology::{Chain, TopologyIndex};
