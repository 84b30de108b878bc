//! Integration-test harness for the mesh-repair and sheet-metal crates
//! (ref. the teacher's `test-harness`): oracle verdicts, `Result`-returning
//! assertions, scenario-mesh fixtures, STL export, and repair/unfold
//! summary reports.

pub mod assertions;
pub mod fixtures;
pub mod helpers;
pub mod oracle;
pub mod report;
pub mod stl;

pub use helpers::HarnessError;
pub use oracle::OracleVerdict;
pub use report::ModelReport;
