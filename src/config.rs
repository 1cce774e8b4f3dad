//! Loading the optional worksheet bank from TOML.
//!
//! See `BankConfig` for the expected schema:
//!
//! ```toml
//! [[worksheets]]
//! name = "animals"
//! bilingual = false
//! word_bank = ["cat", "dog"]
//!
//! [[worksheets.sentences]]
//! template = "The ___ sat."
//! answer = "cat"
//! ```

use serde::Deserialize;
use tracing::{error, info};

use crate::protocol::{SentenceIn, WorksheetPayload};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct BankConfig {
  #[serde(default)]
  pub worksheets: Vec<WorksheetCfg>,
}

/// Worksheet entry accepted in TOML configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct WorksheetCfg {
  pub name: String,
  #[serde(default)]
  pub bilingual: bool,
  pub word_bank: Vec<String>,
  pub sentences: Vec<SentenceCfg>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SentenceCfg {
  pub template: String,
  pub answer: String,
}

impl WorksheetCfg {
  pub fn to_payload(&self) -> WorksheetPayload {
    WorksheetPayload {
      sentences: self
        .sentences
        .iter()
        .map(|s| SentenceIn { template: s.template.clone(), answer: s.answer.clone() })
        .collect(),
      word_bank: self.word_bank.clone(),
      bilingual: self.bilingual,
    }
  }
}

/// Attempt to load `BankConfig` from WORKSHEET_BANK_PATH. On any parsing/IO
/// error, returns None and the server falls back to built-in seeds.
pub fn load_bank_from_env() -> Option<BankConfig> {
  let path = std::env::var("WORKSHEET_BANK_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<BankConfig>(&s) {
      Ok(cfg) => {
        info!(target: "cloze_backend", %path, count = cfg.worksheets.len(), "Loaded worksheet bank (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "cloze_backend", %path, error = %e, "Failed to parse TOML bank");
        None
      }
    },
    Err(e) => {
      error!(target: "cloze_backend", %path, error = %e, "Failed to read TOML bank file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Worksheet;

  #[test]
  fn bank_toml_parses_and_builds_a_worksheet() {
    let cfg: BankConfig = toml::from_str(
      r#"
        [[worksheets]]
        name = "animals"
        word_bank = ["cat", "dog"]

        [[worksheets.sentences]]
        template = "The ___ sat."
        answer = "cat"
      "#,
    )
    .expect("toml");
    assert_eq!(cfg.worksheets.len(), 1);
    let entry = &cfg.worksheets[0];
    assert_eq!(entry.name, "animals");
    assert!(!entry.bilingual);
    let ws = Worksheet::from_payload(&entry.to_payload()).expect("worksheet");
    assert_eq!(ws.pool.len(), 2);
    assert_eq!(ws.blank_count_total(), 1);
  }

  #[test]
  fn empty_config_yields_no_worksheets() {
    let cfg: BankConfig = toml::from_str("").expect("toml");
    assert!(cfg.worksheets.is_empty());
  }
}
