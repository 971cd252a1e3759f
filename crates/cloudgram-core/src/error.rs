//! Validation errors for diagram specifications.

use thiserror::Error;

/// Reasons a [`DiagramSpec`](crate::spec::DiagramSpec) cannot be rendered.
///
/// All variants are detected before any output is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("diagram title must not be empty")]
    EmptyTitle,

    #[error("diagram must declare at least one node")]
    NoNodes,

    #[error("node id `{0}` is declared more than once")]
    DuplicateNodeId(String),

    #[error("edge from `{edge_from}` references undeclared node `{id}`")]
    UnknownNodeReference { edge_from: String, id: String },

    #[error("cluster `{cluster}` references undeclared node `{id}`")]
    UnknownClusterMember { cluster: String, id: String },

    #[error("node `{id}` belongs to both cluster `{first}` and cluster `{second}`")]
    NodeInMultipleClusters {
        id: String,
        first: String,
        second: String,
    },
}

impl SpecError {
    /// Returns true if the error is a dangling node reference.
    pub fn is_reference_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownNodeReference { .. } | Self::UnknownClusterMember { .. }
        )
    }
}
