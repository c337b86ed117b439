//! `GET /businesses`, the collector's own read endpoint.
//!
//! The data file is re-read on every request so a collector writing it in
//! the background is picked up without a reload.

use axum::{extract::State, Extension, Json};
use serde::Serialize;
use serde_json::Value;

use crate::middleware::RequestId;

use super::{ApiError, AppState};

#[derive(Debug, Serialize)]
pub(super) struct CollectorPayload {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    count: usize,
    data: Vec<Value>,
}

impl CollectorPayload {
    fn success(data: Vec<Value>) -> Self {
        Self {
            status: "success",
            message: None,
            count: data.len(),
            data,
        }
    }
}

pub(super) async fn get_collector_businesses(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<CollectorPayload>, ApiError> {
    let path = &state.data_path;
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "data file not found; serving empty list");
            return Ok(Json(CollectorPayload::success(Vec::new())));
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "failed to read data file");
            return Err(ApiError::new(
                req_id.0,
                "internal_error",
                "failed to read data file",
            ));
        }
    };

    let payload = match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Array(items)) => CollectorPayload::success(items),
        Ok(other) => CollectorPayload::success(vec![other]),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "data file is not valid JSON");
            CollectorPayload {
                status: "error",
                message: Some(format!("Invalid JSON format: {e}")),
                count: 0,
                data: Vec::new(),
            }
        }
    };

    Ok(Json(payload))
}
