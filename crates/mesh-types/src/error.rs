use thiserror::Error;

use crate::FaceId;

/// Shared error taxonomy for the repair pipeline and the unfolder.
///
/// `InvalidInput` and `ExceededBudget` are fatal and propagate to the
/// caller. `DegenerateGeometry`, `TopologyFailure`, and
/// `DisconnectedFlatPattern` are recoverable: the operator that produced
/// them logs a warning and either no-ops or falls back, rather than
/// aborting the pipeline.
#[derive(Debug, Clone, Error)]
pub enum MeshError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("degenerate geometry in {operator}: {reason}")]
    DegenerateGeometry { operator: String, reason: String },

    #[error("topology failure in {operator}: {reason}")]
    TopologyFailure { operator: String, reason: String },

    #[error("{operator} exceeded its budget after {iterations} iterations")]
    ExceededBudget { operator: String, iterations: usize },

    #[error("flat pattern has {components} disconnected components")]
    DisconnectedFlatPattern { components: usize },

    #[error("face {0} not found")]
    FaceNotFound(FaceId),

    #[error("manifold engine failed: {reason}")]
    ManifoldEngineFailed { reason: String },
}

impl MeshError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn degenerate(operator: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DegenerateGeometry {
            operator: operator.into(),
            reason: reason.into(),
        }
    }

    pub fn topology(operator: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::TopologyFailure {
            operator: operator.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error is recoverable by the caller continuing with a
    /// partial or fallback result, as opposed to a hard abort.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, MeshError::InvalidInput { .. })
    }
}
