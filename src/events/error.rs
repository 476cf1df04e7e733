use thiserror::Error;

use crate::host::NodeId;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("`{event}` handler on node {node} failed: {source}")]
    Handler {
        event: String,
        node: NodeId,
        #[source]
        source: anyhow::Error,
    },
}

impl DispatchError {
    pub fn node(&self) -> NodeId {
        match self {
            DispatchError::Handler { node, .. } => *node,
        }
    }
}
