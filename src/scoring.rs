//! Scoring pass: compares assigned words against expected answers on demand.
//!
//! Evaluation is exact token match, case-sensitive, no trimming beyond what
//! the payload carried at load time. An unanswered blank stays `unknown`;
//! it is never scored as wrong.

use serde::Serialize;

use crate::domain::{Evaluation, Phase, SentenceSegment, Worksheet};

/// Per-blank detail row of an evaluation pass.
#[derive(Clone, Debug, Serialize)]
pub struct BlankReport {
  #[serde(rename = "blankId")]
  pub blank_id: String,
  pub expected: String,
  pub assigned: Option<String>,
  pub evaluation: Evaluation,
}

/// Aggregate returned by `evaluate`: counts plus per-blank detail.
#[derive(Clone, Debug, Serialize)]
pub struct EvaluationReport {
  pub correct: usize,
  pub incorrect: usize,
  pub unanswered: usize,
  pub blanks: Vec<BlankReport>,
}

/// Recompute `last_eval` for every blank and transition the worksheet into
/// the Reviewed phase. Idempotent: without intervening mutation, repeated
/// calls yield identical reports.
pub fn evaluate(ws: &mut Worksheet) -> EvaluationReport {
  let mut report = EvaluationReport {
    correct: 0,
    incorrect: 0,
    unanswered: 0,
    blanks: Vec::with_capacity(ws.blank_count_total()),
  };

  for sentence in &mut ws.sentences {
    for seg in &mut sentence.segments {
      let slot = match seg {
        SentenceSegment::Blank(slot) => slot,
        SentenceSegment::Literal(_) => continue,
      };
      let eval = match &slot.assigned {
        None => Evaluation::Unknown,
        Some(word) if word.text == slot.expected => Evaluation::Correct,
        Some(_) => Evaluation::Incorrect,
      };
      slot.last_eval = eval;
      match eval {
        Evaluation::Correct => report.correct += 1,
        Evaluation::Incorrect => report.incorrect += 1,
        Evaluation::Unknown => report.unanswered += 1,
      }
      report.blanks.push(BlankReport {
        blank_id: slot.id.to_string(),
        expected: slot.expected.clone(),
        assigned: slot.assigned.as_ref().map(|w| w.text.clone()),
        evaluation: eval,
      });
    }
  }

  ws.phase = Phase::Reviewed;
  report
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{BlankId, Worksheet};
  use crate::engine;
  use crate::protocol::{SentenceIn, WorksheetPayload};

  fn load(sentences: &[(&str, &str)], bank: &[&str]) -> Worksheet {
    let payload = WorksheetPayload {
      sentences: sentences
        .iter()
        .map(|(t, a)| SentenceIn { template: t.to_string(), answer: a.to_string() })
        .collect(),
      word_bank: bank.iter().map(|w| w.to_string()).collect(),
      bilingual: false,
    };
    Worksheet::from_payload(&payload).expect("valid payload")
  }

  fn word_id_of(ws: &Worksheet, text: &str) -> crate::domain::WordId {
    ws.pool.iter().find(|w| w.text == text).map(|w| w.id).expect("word in pool")
  }

  #[test]
  fn exact_match_is_correct_mismatch_is_incorrect_empty_is_unknown() {
    let mut ws = load(
      &[("The ___ sat.", "cat"), ("The ___ ran.", "dog"), ("The ___ flew.", "bird")],
      &["cat", "dog", "bird"],
    );
    let cat = word_id_of(&ws, "cat");
    let bird = word_id_of(&ws, "bird");
    engine::assign(&mut ws, cat, BlankId { sentence: 0, slot: 0 }).expect("assign");
    engine::assign(&mut ws, bird, BlankId { sentence: 1, slot: 0 }).expect("assign");

    let report = evaluate(&mut ws);
    assert_eq!((report.correct, report.incorrect, report.unanswered), (1, 1, 1));
    assert_eq!(report.blanks.len(), 3);
    assert_eq!(report.blanks[0].evaluation, Evaluation::Correct);
    assert_eq!(report.blanks[1].evaluation, Evaluation::Incorrect);
    assert_eq!(report.blanks[1].assigned.as_deref(), Some("bird"));
    assert_eq!(report.blanks[2].evaluation, Evaluation::Unknown);
    assert_eq!(report.blanks[2].assigned, None);
  }

  #[test]
  fn matching_is_case_sensitive() {
    let mut ws = load(&[("___ sat.", "Cat")], &["Cat", "cat"]);
    let lower = ws.pool[1].id;
    engine::assign(&mut ws, lower, BlankId { sentence: 0, slot: 0 }).expect("assign");
    let report = evaluate(&mut ws);
    assert_eq!(report.incorrect, 1);
  }

  #[test]
  fn evaluate_is_idempotent_without_mutation() {
    let mut ws = load(&[("The ___ sat.", "cat")], &["cat", "dog"]);
    let cat = word_id_of(&ws, "cat");
    engine::assign(&mut ws, cat, BlankId { sentence: 0, slot: 0 }).expect("assign");
    let first = evaluate(&mut ws);
    let second = evaluate(&mut ws);
    assert_eq!(first.correct, second.correct);
    assert_eq!(first.incorrect, second.incorrect);
    assert_eq!(first.unanswered, second.unanswered);
    assert_eq!(first.blanks.len(), second.blanks.len());
    for (a, b) in first.blanks.iter().zip(second.blanks.iter()) {
      assert_eq!(a.blank_id, b.blank_id);
      assert_eq!(a.evaluation, b.evaluation);
      assert_eq!(a.assigned, b.assigned);
    }
  }

  #[test]
  fn evaluate_then_mutate_then_evaluate_tracks_the_new_state() {
    let mut ws = load(&[("The ___ sat.", "cat")], &["cat", "dog"]);
    let slot0 = BlankId { sentence: 0, slot: 0 };
    let cat = word_id_of(&ws, "cat");
    let dog = word_id_of(&ws, "dog");

    engine::assign(&mut ws, dog, slot0).expect("assign dog");
    assert_eq!(evaluate(&mut ws).incorrect, 1);

    engine::assign(&mut ws, cat, slot0).expect("assign cat");
    assert_eq!(evaluate(&mut ws).correct, 1);

    engine::unassign(&mut ws, slot0).expect("unassign");
    let report = evaluate(&mut ws);
    assert_eq!((report.correct, report.incorrect, report.unanswered), (0, 0, 1));
  }
}
