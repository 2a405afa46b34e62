//! Node Request Protocol
//!
//! Every request a node accepts is a single JSON value in one of three shapes:
//!
//! - **Positional**: `["set", "k", "v"]`
//! - **Named**: `{"op": "set", "key": "k", "value": "v"}`
//! - **Stop sentinel**: the bare string `"STOP"`
//!
//! Hyphens in operation names are read as underscores, so `share-neighbors` and
//! `share_neighbors` name the same operation. Requests are decoded into the
//! typed [`Operation`] enum before they reach the node; anything that does not
//! decode is rejected without touching node state.

use crate::error::{NodeError, Result};
use crate::membership::types::{Key, Snapshot};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

// --- API Endpoints ---

/// The single endpoint a node serves. Requests are POSTed here as JSON.
pub const ENDPOINT_RPC: &str = "/rpc";

/// Scalar request asking a node to leave its serving loop.
pub const STOP_SENTINEL: &str = "STOP";

pub const OP_GET: &str = "get";
pub const OP_SET: &str = "set";
pub const OP_SHARE_NEIGHBORS: &str = "share_neighbors";

const OP_FIELD: &str = "op";

const GET_PARAMS: &[&str] = &["key"];
const SET_PARAMS: &[&str] = &["key", "value"];
const SHARE_NEIGHBORS_PARAMS: &[&str] = &["neighbors"];

// --- Requests ---

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Value stored under `key`, or `null`.
    Get { key: Key },
    /// Overwrites `key`; answers `"OK"`.
    Set { key: Key, value: Value },
    /// Gossip exchange; answers with the receiver's full view.
    ShareNeighbors { neighbors: Snapshot },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Stop,
    Call(Operation),
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Get { .. } => OP_GET,
            Operation::Set { .. } => OP_SET,
            Operation::ShareNeighbors { .. } => OP_SHARE_NEIGHBORS,
        }
    }

    /// Encodes the operation in positional form.
    pub fn to_json(&self) -> Value {
        match self {
            Operation::Get { key } => json!([OP_GET, key]),
            Operation::Set { key, value } => json!([OP_SET, key, value]),
            Operation::ShareNeighbors { neighbors } => json!([OP_SHARE_NEIGHBORS, neighbors]),
        }
    }

    fn from_positional(op: &str, args: Vec<Value>) -> Result<Self> {
        let params = parameters(op).ok_or_else(|| NodeError::UnknownOperation(op.to_string()))?;

        if args.len() > params.len() {
            return Err(NodeError::InvalidRequest(format!(
                "'{}' takes {} argument(s), got {}",
                op,
                params.len(),
                args.len()
            )));
        }

        let named: Map<String, Value> = params
            .iter()
            .map(|param| param.to_string())
            .zip(args)
            .collect();

        Self::from_named(op, named)
    }

    fn from_named(op: &str, mut args: Map<String, Value>) -> Result<Self> {
        let params = parameters(op).ok_or_else(|| NodeError::UnknownOperation(op.to_string()))?;

        if let Some(unexpected) = args.keys().find(|arg| !params.contains(&arg.as_str())) {
            return Err(NodeError::InvalidRequest(format!(
                "'{}' got unexpected argument '{}'",
                op, unexpected
            )));
        }

        let mut take = |arg: &str| {
            args.remove(arg).ok_or_else(|| NodeError::MissingArgument {
                op: op.to_string(),
                arg: arg.to_string(),
            })
        };

        let operation = match op {
            OP_GET => Operation::Get {
                key: serde_json::from_value(take("key")?)?,
            },
            OP_SET => Operation::Set {
                key: serde_json::from_value(take("key")?)?,
                value: take("value")?,
            },
            OP_SHARE_NEIGHBORS => Operation::ShareNeighbors {
                neighbors: serde_json::from_value(take("neighbors")?)?,
            },
            other => return Err(NodeError::UnknownOperation(other.to_string())),
        };

        Ok(operation)
    }
}

impl Request {
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::String(s) if s == STOP_SENTINEL => Ok(Request::Stop),
            Value::Array(mut items) => {
                if items.is_empty() {
                    return Err(NodeError::InvalidRequest("empty request".to_string()));
                }
                let op = operation_name(items.remove(0))?;
                Operation::from_positional(&op, items).map(Request::Call)
            }
            Value::Object(mut fields) => {
                let op = fields.remove(OP_FIELD).ok_or_else(|| {
                    NodeError::InvalidRequest(format!("named request without '{}'", OP_FIELD))
                })?;
                let op = operation_name(op)?;
                Operation::from_named(&op, fields).map(Request::Call)
            }
            other => Err(NodeError::InvalidRequest(format!(
                "expected a list, a map or \"{}\", got {}",
                STOP_SENTINEL, other
            ))),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Request::Stop => Value::from(STOP_SENTINEL),
            Request::Call(operation) => operation.to_json(),
        }
    }
}

impl From<Operation> for Request {
    fn from(operation: Operation) -> Self {
        Request::Call(operation)
    }
}

fn operation_name(value: Value) -> Result<String> {
    match value {
        Value::String(name) => Ok(name.replace('-', "_")),
        other => Err(NodeError::InvalidRequest(format!(
            "operation name must be a string, got {}",
            other
        ))),
    }
}

fn parameters(op: &str) -> Option<&'static [&'static str]> {
    match op {
        OP_GET => Some(GET_PARAMS),
        OP_SET => Some(SET_PARAMS),
        OP_SHARE_NEIGHBORS => Some(SHARE_NEIGHBORS_PARAMS),
        _ => None,
    }
}

// --- Replies ---

/// Body of a non-200 reply.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorReply {
    pub error: String,
}
