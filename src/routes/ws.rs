//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::logic::*;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;
use crate::util::trunc_for_log;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    info!(target: "cloze_backend", "WebSocket upgrade requested");
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    info!(target: "cloze_backend", "WebSocket connected");
    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(txt) => {
                // Parse, dispatch, serialize response.
                let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
                    Ok(incoming) => {
                        debug!(target: "cloze_backend", msg = %trunc_for_log(&txt, 256), "WS received");
                        handle_client_ws(incoming, &state).await
                    }
                    Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
                };

                let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
                    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
                });

                if let Err(e) = socket.send(Message::Text(out)).await {
                    error!(target: "cloze_backend", error = %e, "WS send error");
                    break;
                }
            }
            Message::Ping(payload) => {
                let _ = socket.send(Message::Pong(payload)).await;
            }
            Message::Close(_) => break,
            _ => {}
        }
    }
    info!(target: "cloze_backend", "WebSocket disconnected");
}

fn error_reply(e: ApiError) -> ServerWsMessage {
    ServerWsMessage::Error { message: e.to_string() }
}

#[instrument(level = "info", skip(msg, state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
    match msg {
        ClientWsMessage::Ping => ServerWsMessage::Pong,

        ClientWsMessage::NewWorksheet { name } => {
            match create_worksheet(state, crate::protocol::CreateWorksheetIn { name, payload: None }).await {
                Ok(out) => {
                    info!(target: "worksheet", id = %out.worksheet_id, "WS worksheet served from bank");
                    ServerWsMessage::Worksheet { worksheet_id: out.worksheet_id, worksheet: out.worksheet }
                }
                Err(e) => error_reply(e),
            }
        }

        ClientWsMessage::LoadWorksheet { payload } => {
            let input = crate::protocol::CreateWorksheetIn { name: None, payload: Some(payload) };
            match create_worksheet(state, input).await {
                Ok(out) => {
                    info!(target: "worksheet", id = %out.worksheet_id, "WS worksheet loaded from payload");
                    ServerWsMessage::Worksheet { worksheet_id: out.worksheet_id, worksheet: out.worksheet }
                }
                Err(e) => error_reply(e),
            }
        }

        ClientWsMessage::Snapshot { worksheet_id } => match snapshot(state, &worksheet_id).await {
            Ok(worksheet) => ServerWsMessage::Worksheet { worksheet_id, worksheet },
            Err(e) => error_reply(e),
        },

        ClientWsMessage::Assign { worksheet_id, word_id, blank_id } => {
            match do_assign(state, &worksheet_id, word_id, &blank_id).await {
                Ok(worksheet) => ServerWsMessage::Worksheet { worksheet_id, worksheet },
                Err(e) => error_reply(e),
            }
        }

        ClientWsMessage::Unassign { worksheet_id, blank_id } => {
            match do_unassign(state, &worksheet_id, &blank_id).await {
                Ok(worksheet) => ServerWsMessage::Worksheet { worksheet_id, worksheet },
                Err(e) => error_reply(e),
            }
        }

        ClientWsMessage::ReorderPool { worksheet_id, from_index, to_index } => {
            match do_reorder(state, &worksheet_id, from_index, to_index).await {
                Ok(worksheet) => ServerWsMessage::Worksheet { worksheet_id, worksheet },
                Err(e) => error_reply(e),
            }
        }

        ClientWsMessage::MoveWord { worksheet_id, source_blank_id, dest_blank_id } => {
            match do_move(state, &worksheet_id, &source_blank_id, &dest_blank_id).await {
                Ok(worksheet) => ServerWsMessage::Worksheet { worksheet_id, worksheet },
                Err(e) => error_reply(e),
            }
        }

        ClientWsMessage::Evaluate { worksheet_id } => match do_evaluate(state, &worksheet_id).await {
            Ok(report) => ServerWsMessage::Evaluation { worksheet_id, report },
            Err(e) => error_reply(e),
        },

        ClientWsMessage::Discard { worksheet_id } => match discard(state, &worksheet_id).await {
            Ok(()) => ServerWsMessage::Discarded { worksheet_id },
            Err(e) => error_reply(e),
        },

        ClientWsMessage::SegmentInput { text } => {
            let runs = do_segment(&text);
            ServerWsMessage::Segments { text, runs }
        }
    }
}
