//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Creating sessions (explicit payload, or served from the bank)
//!   - Applying the four assignment operations to a session
//!   - Running the scoring pass and storing the latest report
//!   - Script segmentation for bilingual display
//!
//! Handlers stay thin: they translate transport-level requests into these
//! calls and serialize the results.

use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use rand::seq::SliceRandom;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::domain::{BlankId, WordId};
use crate::engine;
use crate::error::WorksheetError;
use crate::protocol::{to_out, CreateWorksheetIn, CreateWorksheetOut, ErrorOut, WorksheetOut};
use crate::scoring::{self, EvaluationReport};
use crate::seeds::fallback_worksheet;
use crate::segment::{annotate, AnnotatedRun};
use crate::state::AppState;

/// Errors surfaced at the API boundary: engine/load errors plus the
/// host-level "no such session / bank entry" conditions.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unknown worksheet session: {0}")]
  UnknownSession(String),
  #[error("no worksheet named {0:?} in the bank")]
  UnknownBankName(String),
  #[error(transparent)]
  Worksheet(#[from] WorksheetError),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::UnknownSession(_) | ApiError::UnknownBankName(_) => StatusCode::NOT_FOUND,
      ApiError::Worksheet(WorksheetError::MalformedPayload(_)) => StatusCode::BAD_REQUEST,
      ApiError::Worksheet(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    (self.status(), Json(ErrorOut { message: self.to_string() })).into_response()
  }
}

/// A malformed blank id string cannot resolve to any slot.
fn parse_blank_id(s: &str) -> Result<BlankId, WorksheetError> {
  s.parse::<BlankId>()
    .map_err(|_| WorksheetError::UnknownBlank(s.to_string()))
}

/// Create a session: from the explicit payload if one is given, otherwise
/// from the bank (named entry, or a random one with a shuffled pool).
#[instrument(level = "info", skip(state, input), fields(named = input.name.as_deref().unwrap_or("<any>"), explicit = input.payload.is_some()))]
pub async fn create_worksheet(state: &AppState, input: CreateWorksheetIn) -> Result<CreateWorksheetOut, ApiError> {
  let id = match input.payload {
    Some(payload) => state.create_session(&payload).await?,
    None => {
      let payload = match state.pick_bank(input.name.as_deref()) {
        Some(entry) => {
          let mut payload = entry.payload.clone();
          // served worksheets get a shuffled pool so answer order doesn't leak
          payload.word_bank.shuffle(&mut rand::thread_rng());
          payload
        }
        None => match input.name {
          Some(name) => return Err(ApiError::UnknownBankName(name)),
          None => {
            warn!(target: "worksheet", "Bank is empty; serving hard fallback worksheet");
            fallback_worksheet()
          }
        },
      };
      state.create_session(&payload).await?
    }
  };
  let worksheet = snapshot(state, &id).await?;
  Ok(CreateWorksheetOut { worksheet_id: id, worksheet })
}

/// Read-only snapshot of a session.
#[instrument(level = "debug", skip(state), fields(%id))]
pub async fn snapshot(state: &AppState, id: &str) -> Result<WorksheetOut, ApiError> {
  let sessions = state.sessions.read().await;
  let session = sessions
    .get(id)
    .ok_or_else(|| ApiError::UnknownSession(id.to_string()))?;
  Ok(to_out(&session.worksheet, session.last_report.as_ref()))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn discard(state: &AppState, id: &str) -> Result<(), ApiError> {
  if state.discard_session(id).await {
    Ok(())
  } else {
    Err(ApiError::UnknownSession(id.to_string()))
  }
}

/// Run one mutating engine operation inside a single lock acquisition, so
/// the operation is indivisible with respect to concurrent reads.
async fn with_session<F>(state: &AppState, id: &str, op: F) -> Result<WorksheetOut, ApiError>
where
  F: FnOnce(&mut crate::state::Session) -> Result<(), WorksheetError>,
{
  let mut sessions = state.sessions.write().await;
  let session = sessions
    .get_mut(id)
    .ok_or_else(|| ApiError::UnknownSession(id.to_string()))?;
  op(session)?;
  Ok(to_out(&session.worksheet, session.last_report.as_ref()))
}

#[instrument(level = "info", skip(state), fields(%id, word_id, %blank_id))]
pub async fn do_assign(state: &AppState, id: &str, word_id: u32, blank_id: &str) -> Result<WorksheetOut, ApiError> {
  let blank = parse_blank_id(blank_id)?;
  let out = with_session(state, id, |session| {
    engine::assign(&mut session.worksheet, WordId(word_id), blank)
  })
  .await?;
  info!(target: "worksheet", %id, word_id, %blank_id, "Word assigned");
  Ok(out)
}

#[instrument(level = "info", skip(state), fields(%id, %blank_id))]
pub async fn do_unassign(state: &AppState, id: &str, blank_id: &str) -> Result<WorksheetOut, ApiError> {
  let blank = parse_blank_id(blank_id)?;
  let out = with_session(state, id, |session| {
    engine::unassign(&mut session.worksheet, blank)
  })
  .await?;
  info!(target: "worksheet", %id, %blank_id, "Blank cleared");
  Ok(out)
}

#[instrument(level = "info", skip(state), fields(%id, from_index, to_index))]
pub async fn do_reorder(state: &AppState, id: &str, from_index: usize, to_index: usize) -> Result<WorksheetOut, ApiError> {
  with_session(state, id, |session| {
    engine::reorder_pool(&mut session.worksheet, from_index, to_index)
  })
  .await
}

#[instrument(level = "info", skip(state), fields(%id, %source_blank_id, %dest_blank_id))]
pub async fn do_move(state: &AppState, id: &str, source_blank_id: &str, dest_blank_id: &str) -> Result<WorksheetOut, ApiError> {
  let source = parse_blank_id(source_blank_id)?;
  let dest = parse_blank_id(dest_blank_id)?;
  let out = with_session(state, id, |session| {
    engine::move_between_blanks(&mut session.worksheet, source, dest)
  })
  .await?;
  info!(target: "worksheet", %id, %source_blank_id, %dest_blank_id, "Word moved between blanks");
  Ok(out)
}

/// Scoring pass: recompute every blank, store and return the report.
#[instrument(level = "info", skip(state), fields(%id))]
pub async fn do_evaluate(state: &AppState, id: &str) -> Result<EvaluationReport, ApiError> {
  let mut sessions = state.sessions.write().await;
  let session = sessions
    .get_mut(id)
    .ok_or_else(|| ApiError::UnknownSession(id.to_string()))?;
  let report = scoring::evaluate(&mut session.worksheet);
  info!(
    target: "worksheet",
    %id,
    correct = report.correct,
    incorrect = report.incorrect,
    unanswered = report.unanswered,
    "Worksheet evaluated"
  );
  session.last_report = Some(report.clone());
  Ok(report)
}

/// Pure segmentation; logically independent of any session.
#[instrument(level = "debug", skip(text), fields(text_len = text.len()))]
pub fn do_segment(text: &str) -> Vec<AnnotatedRun> {
  annotate(text)
}
