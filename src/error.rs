//! Error types for overlay nodes

use crate::membership::types::NodeUrl;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NodeError {
    /// The operation name does not match any supported operation
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Operation '{op}' is missing argument '{arg}'")]
    MissingArgument { op: String, arg: String },

    /// The request is not a list, a map, or the stop sentinel
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Request to {url} timed out")]
    Timeout { url: NodeUrl },

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: NodeUrl,
        #[source]
        source: reqwest::Error,
    },

    /// The peer answered, but refused the request
    #[error("Request to {url} rejected ({status}): {message}")]
    Rejected {
        url: NodeUrl,
        status: u16,
        message: String,
    },

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The node's serving loop has exited
    #[error("Node is stopped")]
    Stopped,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, NodeError>;
