//! Application state: in-memory worksheet sessions and the bank of
//! ready-made worksheets.
//!
//! This module owns:
//!   - the session store (worksheet id -> Session)
//!   - the worksheet bank (TOML config entries + built-in seeds)
//!
//! Sessions live for one interactive run: constructed from a payload,
//! mutated through the engine, dropped on discard. Nothing is persisted.

use std::{collections::HashMap, sync::Arc};

use rand::seq::SliceRandom;
use tokio::sync::RwLock;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::config::load_bank_from_env;
use crate::domain::Worksheet;
use crate::error::WorksheetError;
use crate::protocol::WorksheetPayload;
use crate::scoring::EvaluationReport;
use crate::seeds::seed_worksheets;

/// One interactive session: the worksheet plus the latest scoring report.
pub struct Session {
    pub worksheet: Worksheet,
    pub last_report: Option<EvaluationReport>,
}

pub struct BankEntry {
    pub name: String,
    pub payload: WorksheetPayload,
}

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<RwLock<HashMap<String, Session>>>,
    pub bank: Arc<Vec<BankEntry>>,
}

impl AppState {
    /// Build state from env: load the TOML bank if configured, validate its
    /// entries, and append built-in seeds.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let mut bank: Vec<BankEntry> = Vec::new();

        if let Some(cfg) = load_bank_from_env() {
            for ws in &cfg.worksheets {
                let payload = ws.to_payload();
                // Validate once at startup; a bad bank entry is skipped, not fatal.
                if let Err(e) = Worksheet::from_payload(&payload) {
                    error!(target: "worksheet", name = %ws.name, error = %e, "Skipping bank worksheet: payload invalid.");
                    continue;
                }
                bank.push(BankEntry { name: ws.name.clone(), payload });
            }
        }

        // Always append built-in seeds, but don't shadow configured names.
        for seed in seed_worksheets() {
            if bank.iter().any(|b| b.name == seed.name) {
                continue;
            }
            bank.push(BankEntry { name: seed.name.to_string(), payload: seed.payload });
        }

        info!(target: "worksheet", count = bank.len(), "Startup worksheet inventory");

        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            bank: Arc::new(bank),
        }
    }

    /// Construct a worksheet from an explicit payload and store it as a new
    /// session. A malformed payload rejects the whole construction; no
    /// partially-built session is ever stored.
    #[instrument(level = "info", skip(self, payload), fields(sentences = payload.sentences.len(), words = payload.word_bank.len()))]
    pub async fn create_session(&self, payload: &WorksheetPayload) -> Result<String, WorksheetError> {
        let worksheet = Worksheet::from_payload(payload)?;
        let id = Uuid::new_v4().to_string();
        let blanks = worksheet.blank_count_total();
        self.sessions
            .write()
            .await
            .insert(id.clone(), Session { worksheet, last_report: None });
        info!(target: "worksheet", %id, blanks, "Session created");
        Ok(id)
    }

    /// Named lookup into the bank, or a random entry when no name is given.
    pub fn pick_bank(&self, name: Option<&str>) -> Option<&BankEntry> {
        match name {
            Some(n) => self.bank.iter().find(|b| b.name == n),
            None => self.bank.choose(&mut rand::thread_rng()),
        }
    }

    pub fn bank_names(&self) -> Vec<String> {
        self.bank.iter().map(|b| b.name.clone()).collect()
    }

    /// Drop a session. Returns false if the id was unknown.
    #[instrument(level = "info", skip(self), fields(%id))]
    pub async fn discard_session(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            info!(target: "worksheet", %id, "Session discarded");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeds::fallback_worksheet;

    #[tokio::test]
    async fn create_session_stores_a_worksheet() {
        let state = AppState::new();
        let id = state.create_session(&fallback_worksheet()).await.expect("session");
        let sessions = state.sessions.read().await;
        let session = sessions.get(&id).expect("stored");
        assert_eq!(session.worksheet.pool.len(), 2);
        assert!(session.last_report.is_none());
    }

    #[tokio::test]
    async fn create_session_rejects_malformed_payload() {
        let state = AppState::new();
        let mut payload = fallback_worksheet();
        payload.word_bank.clear();
        let err = state.create_session(&payload).await.unwrap_err();
        assert!(matches!(err, WorksheetError::MalformedPayload(_)));
        assert!(state.sessions.read().await.is_empty());
    }

    #[tokio::test]
    async fn discard_removes_the_session() {
        let state = AppState::new();
        let id = state.create_session(&fallback_worksheet()).await.expect("session");
        assert!(state.discard_session(&id).await);
        assert!(!state.discard_session(&id).await);
        assert!(state.sessions.read().await.is_empty());
    }

    #[test]
    fn bank_always_carries_the_seeds() {
        let state = AppState::new();
        assert!(state.pick_bank(Some("morning-routine")).is_some());
        assert!(state.pick_bank(Some("cafe-zh")).is_some());
        assert!(state.pick_bank(Some("no-such-worksheet")).is_none());
        assert!(state.pick_bank(None).is_some());
    }
}
