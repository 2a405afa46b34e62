use axum::{Extension, Json, body::Bytes, http::StatusCode};
use serde_json::Value;

use super::protocol::{ErrorReply, Request};
use super::service::NodeHandle;
use crate::error::{NodeError, Result};

/// Inbound side of the messaging endpoint.
///
/// Decodes the body, hands the request to the serving loop and answers with
/// whatever the loop produced. A bad request fails on its own and leaves the
/// node serving. The body is read as raw bytes so that malformed JSON gets the
/// same `{"error": ..}` reply as any other bad request, whatever the
/// content type.
pub async fn handle_rpc(
    Extension(node): Extension<NodeHandle>,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    tracing::debug!("{}: {}", node.url(), String::from_utf8_lossy(&body));

    let request = match decode(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::error!("{}: rejected request: {}", node.url(), e);
            return error_reply(StatusCode::BAD_REQUEST, &e);
        }
    };

    match node.dispatch(request).await {
        Ok(value) => (StatusCode::OK, Json(value)),
        Err(e @ NodeError::Stopped) => {
            tracing::debug!("{}: request arrived after stop", node.url());
            error_reply(StatusCode::SERVICE_UNAVAILABLE, &e)
        }
        // Dispatch itself only fails on what the request carried.
        Err(e) => {
            tracing::error!("{}: rejected request: {}", node.url(), e);
            error_reply(StatusCode::BAD_REQUEST, &e)
        }
    }
}

fn decode(body: &[u8]) -> Result<Request> {
    let value: Value = serde_json::from_slice(body)?;
    Request::from_json(value)
}

fn error_reply(status: StatusCode, error: &NodeError) -> (StatusCode, Json<Value>) {
    let body = ErrorReply {
        error: error.to_string(),
    };
    let body = serde_json::to_value(body).unwrap_or(Value::Null);
    (status, Json(body))
}
