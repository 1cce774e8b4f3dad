//! Seed data: built-in worksheets so the server is useful without config.

use crate::protocol::{SentenceIn, WorksheetPayload};

pub struct SeedWorksheet {
  pub name: &'static str,
  pub payload: WorksheetPayload,
}

fn sentence(template: &str, answer: &str) -> SentenceIn {
  SentenceIn { template: template.to_string(), answer: answer.to_string() }
}

/// Minimal set of built-in worksheets covering both the plain and the
/// bilingual path. Word banks carry distractors on purpose.
pub fn seed_worksheets() -> Vec<SeedWorksheet> {
  vec![
    SeedWorksheet {
      name: "morning-routine",
      payload: WorksheetPayload {
        sentences: vec![
          sentence("I drink a cup of ___ before work.", "coffee"),
          sentence("She takes the ___ to the office.", "train"),
          sentence("We usually ___ breakfast together.", "eat"),
        ],
        word_bank: vec![
          "coffee".into(),
          "train".into(),
          "eat".into(),
          "sleep".into(),
          "bus".into(),
        ],
        bilingual: false,
      },
    },
    SeedWorksheet {
      name: "cafe-zh",
      payload: WorksheetPayload {
        sentences: vec![
          sentence("我想喝___。(I want to drink ___.)", "咖啡"),
          sentence("今天天气很___。(The weather is very ___ today.)", "好"),
          sentence("他昨天去了___。(He went to ___ yesterday.)", "北京"),
        ],
        word_bank: vec![
          "咖啡".into(),
          "好".into(),
          "北京".into(),
          "茶".into(),
          "上海".into(),
        ],
        bilingual: true,
      },
    },
  ]
}

/// Absolute last-resort worksheet: if the bank ends up empty (bad config
/// and seeds filtered out), serve this.
pub fn fallback_worksheet() -> WorksheetPayload {
  WorksheetPayload {
    sentences: vec![sentence("The ___ sat.", "cat")],
    word_bank: vec!["cat".into(), "dog".into()],
    bilingual: false,
  }
}
