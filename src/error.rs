use thiserror::Error;

/// Errors raised by canvas mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanvasError {
    #[error("node '{0}' already exists")]
    DuplicateNode(String),
    #[error("edge '{0}' already exists")]
    DuplicateEdge(String),
    #[error("node '{0}' not found")]
    UnknownNode(String),
    #[error("edge '{0}' not found")]
    UnknownEdge(String),
    #[error("edge '{edge_id}' references missing node '{node_id}'")]
    DanglingEdge { edge_id: String, node_id: String },
    #[error("control point for edge '{0}' has non-finite coordinates")]
    NonFiniteControlPoint(String),
}

impl CanvasError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CanvasError::UnknownNode(_) | CanvasError::UnknownEdge(_))
    }
}
