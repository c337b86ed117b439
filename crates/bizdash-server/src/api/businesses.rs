use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use bizdash_catalog::{CatalogError, LoadOutcome, RecordView};
use bizdash_core::SortKey;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct BusinessQuery {
    /// Case-insensitive name/type filter.
    pub q: Option<String>,
    /// Dropdown value; unrecognized values keep input order.
    pub sort: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct ReloadData {
    outcome: &'static str,
    records: usize,
    generation: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub(super) async fn list_businesses(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<BusinessQuery>,
) -> Json<ApiResponse<Vec<RecordView>>> {
    let sort = SortKey::from_param(query.sort.as_deref().unwrap_or_default());
    let filter = query.q.unwrap_or_default();

    let catalog = state.catalog.read().await;
    let data: Vec<RecordView> = catalog.query(&filter, sort).collect();
    tracing::debug!(filter = %filter, %sort, results = data.len(), "catalog query");

    Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    })
}

pub(super) async fn get_business(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<RecordView>>, ApiError> {
    let view = state
        .catalog
        .read()
        .await
        .select_detail(&id)
        .map_err(|e| map_catalog_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: view,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn reload_catalog(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<ReloadData>>, ApiError> {
    let outcome = state
        .catalog
        .reload(&state.client, &state.source)
        .await
        .map_err(|e| map_catalog_error(req_id.0.clone(), &e))?;

    let catalog = state.catalog.read().await;
    let (label, error) = match outcome {
        LoadOutcome::Applied { .. } => ("applied", None),
        LoadOutcome::Superseded { .. } => ("superseded", None),
        LoadOutcome::Failed { error } => ("failed", Some(error)),
    };

    Ok(Json(ApiResponse {
        data: ReloadData {
            outcome: label,
            records: catalog.len(),
            generation: catalog.generation(),
            error,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn map_catalog_error(request_id: String, error: &CatalogError) -> ApiError {
    match error {
        CatalogError::DetailNotFound { .. } => {
            ApiError::new(request_id, "not_found", error.to_string())
        }
        CatalogError::ReloadInProgress => ApiError::new(request_id, "conflict", error.to_string()),
    }
}
