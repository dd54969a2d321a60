use std::fmt;

use crate::graph::GraphError;

/// Errors that end a decision tick
#[derive(Debug, Clone, PartialEq)]
pub enum DecisionError {
    /// A graph lookup failed while planning
    Graph(GraphError),
    /// A node reached a state its own rules exclude
    InvalidInternalState(String),
}

impl fmt::Display for DecisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Graph(e) => write!(f, "Graph error: {e}"),
            Self::InvalidInternalState(e) => write!(f, "Invalid internal state: {e}"),
        }
    }
}

impl std::error::Error for DecisionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Graph(e) => Some(e),
            Self::InvalidInternalState(_) => None,
        }
    }
}

impl From<GraphError> for DecisionError {
    fn from(e: GraphError) -> Self {
        Self::Graph(e)
    }
}
