//! Handlers for batch listing and matrix lookup.

use artgrid_core::batch_name::BatchName;
use artgrid_core::error::CoreError;
use artgrid_core::types::Timestamp;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub name: BatchName,
    pub started_at: Timestamp,
}

/// GET /api/v1/batches
///
/// Batches in the presentation tree, newest first.
pub async fn list_batches(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let batches: Vec<BatchSummary> = state
        .resolver
        .list_batches()
        .await?
        .into_iter()
        .map(|name| BatchSummary {
            started_at: name.started_at(),
            name,
        })
        .collect();

    Ok(Json(DataResponse { data: batches }))
}

/// GET /api/v1/batches/latest/matrix
///
/// Syncs new batches from the generation tree, then resolves the newest one.
pub async fn latest_matrix(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let data = state
        .resolver
        .latest_matrix(Some(state.generation.as_ref()))
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "batch",
            key: "latest".into(),
        })?;

    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/batches/{name}/matrix
pub async fn batch_matrix(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<impl IntoResponse> {
    let batch = BatchName::parse(&name)?;
    let data = state.resolver.get_matrix(&batch).await?;

    Ok(Json(DataResponse { data }))
}
