//! Domain model: words, blanks, sentences, and the worksheet aggregate.
//!
//! A `Worksheet` is built exactly once from an inbound payload
//! (`Worksheet::from_payload`) and afterwards mutated only through the
//! operations in `engine`. Conservation invariant: every word minted at load
//! time lives in exactly one place, either the pool or a single blank.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WorksheetError;
use crate::protocol::WorksheetPayload;

/// Blank markers are runs of at least this many consecutive underscores.
/// Generators emit anything from `___` to full-width 24-underscore lines.
pub const BLANK_MARKER_MIN: usize = 3;

/// Instance identity of a word. Two bank entries with the same surface text
/// get distinct ids, which keeps the conservation invariant well-defined
/// under duplicate words.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WordId(pub u32);

impl fmt::Display for WordId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "w{}", self.0)
  }
}

/// A word token: opaque surface text plus its instance id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Word {
  pub id: WordId,
  pub text: String,
}

/// Identifier of a blank slot: owning sentence index + in-sentence blank
/// index. Rendered `s{sentence}b{slot}` on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlankId {
  pub sentence: usize,
  pub slot: usize,
}

impl fmt::Display for BlankId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "s{}b{}", self.sentence, self.slot)
  }
}

impl FromStr for BlankId {
  type Err = ();

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let rest = s.strip_prefix('s').ok_or(())?;
    let (si, bi) = rest.split_once('b').ok_or(())?;
    Ok(BlankId {
      sentence: si.parse().map_err(|_| ())?,
      slot: bi.parse().map_err(|_| ())?,
    })
  }
}

/// Tri-state result of the last scoring pass over a blank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Evaluation {
  Unknown,
  Correct,
  Incorrect,
}

/// One fillable position inside a sentence. `expected` is immutable after
/// load; `assigned` changes only through the engine; `last_eval` only
/// through the scoring pass (and is invalidated by the engine).
#[derive(Clone, Debug)]
pub struct BlankSlot {
  pub id: BlankId,
  pub expected: String,
  pub assigned: Option<Word>,
  pub last_eval: Evaluation,
}

/// A sentence is literal text interleaved with blank slots.
#[derive(Clone, Debug)]
pub enum SentenceSegment {
  Literal(String),
  Blank(BlankSlot),
}

#[derive(Clone, Debug)]
pub struct Sentence {
  pub segments: Vec<SentenceSegment>,
}

impl Sentence {
  /// Split a template on its blank markers, interleaving blank slots.
  /// Underscore runs shorter than `BLANK_MARKER_MIN` stay literal text.
  pub fn from_template(sentence_idx: usize, template: &str, answer: &str) -> Result<Self, WorksheetError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut blanks = 0usize;

    let mut chars = template.chars().peekable();
    while let Some(ch) = chars.next() {
      if ch != '_' {
        literal.push(ch);
        continue;
      }
      let mut run = 1usize;
      while chars.peek() == Some(&'_') {
        chars.next();
        run += 1;
      }
      if run < BLANK_MARKER_MIN {
        for _ in 0..run {
          literal.push('_');
        }
        continue;
      }
      if !literal.is_empty() {
        segments.push(SentenceSegment::Literal(std::mem::take(&mut literal)));
      }
      segments.push(SentenceSegment::Blank(BlankSlot {
        id: BlankId { sentence: sentence_idx, slot: blanks },
        expected: answer.to_string(),
        assigned: None,
        last_eval: Evaluation::Unknown,
      }));
      blanks += 1;
    }
    if !literal.is_empty() {
      segments.push(SentenceSegment::Literal(literal));
    }

    if blanks == 0 {
      return Err(WorksheetError::MalformedPayload(format!(
        "sentence {} has no blank marker: {:?}",
        sentence_idx, template
      )));
    }
    Ok(Sentence { segments })
  }

  pub fn blank_count(&self) -> usize {
    self
      .segments
      .iter()
      .filter(|s| matches!(s, SentenceSegment::Blank(_)))
      .count()
  }
}

/// Session phase. Scoring enters `Reviewed`; any successful mutating
/// operation drops back to `Editing`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
  Editing,
  Reviewed,
}

/// The top-level aggregate the assignment engine operates over.
#[derive(Clone, Debug)]
pub struct Worksheet {
  pub sentences: Vec<Sentence>,
  pub pool: Vec<Word>,
  pub bilingual: bool,
  pub phase: Phase,
}

impl Worksheet {
  /// Build a worksheet from an inbound payload, or reject it whole.
  ///
  /// Rejection cases (`MalformedPayload`):
  /// - no sentences at all
  /// - a template without a single blank marker
  /// - a word bank that does not carry every answer at least as many times
  ///   as the sentences require it
  pub fn from_payload(payload: &WorksheetPayload) -> Result<Self, WorksheetError> {
    if payload.sentences.is_empty() {
      return Err(WorksheetError::MalformedPayload("payload has no sentences".into()));
    }

    let mut sentences = Vec::with_capacity(payload.sentences.len());
    let mut required: HashMap<&str, usize> = HashMap::new();
    for (si, s) in payload.sentences.iter().enumerate() {
      let sentence = Sentence::from_template(si, &s.template, &s.answer)?;
      *required.entry(s.answer.as_str()).or_insert(0) += sentence.blank_count();
      sentences.push(sentence);
    }

    let mut supply: HashMap<&str, usize> = HashMap::new();
    for w in &payload.word_bank {
      *supply.entry(w.as_str()).or_insert(0) += 1;
    }
    for (answer, needed) in &required {
      let have = supply.get(answer).copied().unwrap_or(0);
      if have < *needed {
        return Err(WorksheetError::MalformedPayload(format!(
          "word bank has {} of {:?} but the sentences require {}",
          have, answer, needed
        )));
      }
    }

    let pool = payload
      .word_bank
      .iter()
      .enumerate()
      .map(|(i, text)| Word { id: WordId(i as u32), text: text.clone() })
      .collect();

    Ok(Worksheet {
      sentences,
      pool,
      bilingual: payload.bilingual,
      phase: Phase::Editing,
    })
  }

  /// Read-only lookup of a blank slot.
  pub fn blank(&self, id: BlankId) -> Option<&BlankSlot> {
    let sentence = self.sentences.get(id.sentence)?;
    sentence
      .segments
      .iter()
      .filter_map(|seg| match seg {
        SentenceSegment::Blank(slot) => Some(slot),
        SentenceSegment::Literal(_) => None,
      })
      .nth(id.slot)
  }

  /// Ordered iterator over all blank slots, across sentences.
  pub fn blanks(&self) -> impl Iterator<Item = &BlankSlot> {
    self.sentences.iter().flat_map(|s| {
      s.segments.iter().filter_map(|seg| match seg {
        SentenceSegment::Blank(slot) => Some(slot),
        SentenceSegment::Literal(_) => None,
      })
    })
  }

  /// Position of a word in the pool, if it is there.
  pub fn pool_position(&self, id: WordId) -> Option<usize> {
    self.pool.iter().position(|w| w.id == id)
  }

  pub fn blank_count_total(&self) -> usize {
    self.blanks().count()
  }

  /// Mutable access to the pool and one blank slot at once. The two live in
  /// disjoint fields, so the engine can move words between them under a
  /// single borrow of the worksheet.
  pub fn pool_and_blank_mut(&mut self, id: BlankId) -> Option<(&mut Vec<Word>, &mut BlankSlot)> {
    let sentence = self.sentences.get_mut(id.sentence)?;
    let slot = sentence
      .segments
      .iter_mut()
      .filter_map(|seg| match seg {
        SentenceSegment::Blank(slot) => Some(slot),
        SentenceSegment::Literal(_) => None,
      })
      .nth(id.slot)?;
    Some((&mut self.pool, slot))
  }

  /// Like `pool_and_blank_mut`, but for two distinct blanks. Returns None
  /// if the ids are equal or either does not resolve.
  pub fn pool_and_two_blanks_mut(
    &mut self,
    a: BlankId,
    b: BlankId,
  ) -> Option<(&mut Vec<Word>, &mut BlankSlot, &mut BlankSlot)> {
    if a == b {
      return None;
    }
    let mut first: Option<&mut BlankSlot> = None;
    let mut second: Option<&mut BlankSlot> = None;
    for (si, sentence) in self.sentences.iter_mut().enumerate() {
      let mut nth = 0usize;
      for seg in &mut sentence.segments {
        if let SentenceSegment::Blank(slot) = seg {
          if si == a.sentence && nth == a.slot {
            first = Some(slot);
          } else if si == b.sentence && nth == b.slot {
            second = Some(slot);
          }
          nth += 1;
        }
      }
    }
    match (first, second) {
      (Some(x), Some(y)) => Some((&mut self.pool, x, y)),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::protocol::SentenceIn;

  fn payload(sentences: &[(&str, &str)], bank: &[&str]) -> WorksheetPayload {
    WorksheetPayload {
      sentences: sentences
        .iter()
        .map(|(t, a)| SentenceIn { template: t.to_string(), answer: a.to_string() })
        .collect(),
      word_bank: bank.iter().map(|w| w.to_string()).collect(),
      bilingual: false,
    }
  }

  #[test]
  fn template_splits_into_literals_and_blanks() {
    let s = Sentence::from_template(0, "The ___ sat on the ___.", "cat").expect("sentence");
    assert_eq!(s.blank_count(), 2);
    let texts: Vec<&str> = s
      .segments
      .iter()
      .filter_map(|seg| match seg {
        SentenceSegment::Literal(t) => Some(t.as_str()),
        SentenceSegment::Blank(_) => None,
      })
      .collect();
    assert_eq!(texts, vec!["The ", " sat on the ", "."]);
  }

  #[test]
  fn long_marker_runs_count_once() {
    let s = Sentence::from_template(0, "I like ________________________ a lot.", "tea").expect("sentence");
    assert_eq!(s.blank_count(), 1);
  }

  #[test]
  fn short_underscore_runs_do_not_form_blanks() {
    let err = Sentence::from_template(0, "snake__case only", "x").unwrap_err();
    assert!(matches!(err, WorksheetError::MalformedPayload(_)));
    let s = Sentence::from_template(0, "a__b ___ c", "x").expect("one blank");
    assert_eq!(s.blank_count(), 1);
    let literal = match &s.segments[0] {
      SentenceSegment::Literal(t) => t.as_str(),
      SentenceSegment::Blank(_) => panic!("expected literal"),
    };
    assert_eq!(literal, "a__b ");
  }

  #[test]
  fn blank_ids_are_scoped_to_the_sentence() {
    let ws = Worksheet::from_payload(&payload(
      &[("A ___ here.", "cat"), ("A ___ and a ___ there.", "dog")],
      &["cat", "dog", "dog"],
    ))
    .expect("worksheet");
    let ids: Vec<String> = ws.blanks().map(|b| b.id.to_string()).collect();
    assert_eq!(ids, vec!["s0b0", "s1b0", "s1b1"]);
  }

  #[test]
  fn load_builds_pool_in_bank_order() {
    let ws = Worksheet::from_payload(&payload(&[("The ___ sat.", "cat")], &["cat", "dog"])).expect("worksheet");
    let texts: Vec<&str> = ws.pool.iter().map(|w| w.text.as_str()).collect();
    assert_eq!(texts, vec!["cat", "dog"]);
    assert_eq!(ws.blank_count_total(), 1);
    assert!(ws.blanks().all(|b| b.assigned.is_none()));
    assert_eq!(ws.phase, Phase::Editing);
  }

  #[test]
  fn rejects_bank_not_covering_answers() {
    let err = Worksheet::from_payload(&payload(
      &[("A ___ and a ___.", "cat")],
      &["cat", "dog"], // needs "cat" twice
    ))
    .unwrap_err();
    assert!(matches!(err, WorksheetError::MalformedPayload(_)));
  }

  #[test]
  fn duplicate_bank_words_get_distinct_ids() {
    let ws = Worksheet::from_payload(&payload(
      &[("A ___ and a ___.", "cat")],
      &["cat", "cat"],
    ))
    .expect("worksheet");
    assert_eq!(ws.pool[0].text, ws.pool[1].text);
    assert_ne!(ws.pool[0].id, ws.pool[1].id);
  }

  #[test]
  fn rejects_empty_payload() {
    let err = Worksheet::from_payload(&payload(&[], &["cat"])).unwrap_err();
    assert!(matches!(err, WorksheetError::MalformedPayload(_)));
  }

  #[test]
  fn blank_id_round_trips_through_wire_form() {
    let id = BlankId { sentence: 3, slot: 1 };
    assert_eq!(id.to_string(), "s3b1");
    assert_eq!("s3b1".parse::<BlankId>(), Ok(id));
    assert!("3b1".parse::<BlankId>().is_err());
    assert!("s3".parse::<BlankId>().is_err());
    assert!("sxbय".parse::<BlankId>().is_err());
  }
}
