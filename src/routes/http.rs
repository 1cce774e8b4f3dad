//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented; errors map to status codes via `ApiError`.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use tracing::{info, instrument};

use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
    Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_bank(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(BankOut { worksheets: state.bank_names() })
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_create_worksheet(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateWorksheetIn>,
) -> Result<Json<CreateWorksheetOut>, ApiError> {
    let out = create_worksheet(&state, body).await?;
    info!(target: "worksheet", id = %out.worksheet_id, "HTTP worksheet created");
    Ok(Json(out))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_worksheet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<WorksheetOut>, ApiError> {
    Ok(Json(snapshot(&state, &id).await?))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_delete_worksheet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<HealthOut>, ApiError> {
    discard(&state, &id).await?;
    Ok(Json(HealthOut { ok: true }))
}

#[instrument(level = "info", skip(state, body), fields(%id, body.word_id, %body.blank_id))]
pub async fn http_post_assign(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<AssignIn>,
) -> Result<Json<WorksheetOut>, ApiError> {
    Ok(Json(do_assign(&state, &id, body.word_id, &body.blank_id).await?))
}

#[instrument(level = "info", skip(state, body), fields(%id, %body.blank_id))]
pub async fn http_post_unassign(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<UnassignIn>,
) -> Result<Json<WorksheetOut>, ApiError> {
    Ok(Json(do_unassign(&state, &id, &body.blank_id).await?))
}

#[instrument(level = "info", skip(state, body), fields(%id, body.from_index, body.to_index))]
pub async fn http_post_reorder(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<ReorderIn>,
) -> Result<Json<WorksheetOut>, ApiError> {
    Ok(Json(do_reorder(&state, &id, body.from_index, body.to_index).await?))
}

#[instrument(level = "info", skip(state, body), fields(%id, %body.source_blank_id, %body.dest_blank_id))]
pub async fn http_post_move(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<MoveIn>,
) -> Result<Json<WorksheetOut>, ApiError> {
    Ok(Json(do_move(&state, &id, &body.source_blank_id, &body.dest_blank_id).await?))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_post_evaluate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<crate::scoring::EvaluationReport>, ApiError> {
    Ok(Json(do_evaluate(&state, &id).await?))
}

#[instrument(level = "info", skip(body), fields(text_len = body.text.len()))]
pub async fn http_post_segment(Json(body): Json<SegmentIn>) -> impl IntoResponse {
    Json(SegmentsOut { runs: do_segment(&body.text) })
}
