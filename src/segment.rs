//! Script-run segmentation for bilingual display.
//!
//! `segment` classifies text into contiguous runs of the secondary script
//! (the CJK blocks, see `util::is_cjk`) versus everything else. `annotate`
//! additionally attaches a Hanyu Pinyin reading to secondary runs so a
//! bilingual worksheet can show reading aids inline.
//!
//! Both functions are pure: no shared state, total over any input.

use pinyin::ToPinyin;
use serde::Serialize;

use crate::util::is_cjk;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Script {
  Primary,
  Secondary,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScriptRun {
  pub text: String,
  pub script: Script,
}

/// Split text into maximal same-script runs, in order. Empty input yields
/// an empty sequence; text without secondary-script characters yields one
/// Primary run.
pub fn segment(text: &str) -> Vec<ScriptRun> {
  let mut runs: Vec<ScriptRun> = Vec::new();
  for ch in text.chars() {
    let script = if is_cjk(ch) { Script::Secondary } else { Script::Primary };
    match runs.last_mut() {
      Some(run) if run.script == script => run.text.push(ch),
      _ => runs.push(ScriptRun { text: ch.to_string(), script }),
    }
  }
  runs
}

/// A script run with an optional pinyin reading (secondary runs only).
#[derive(Clone, Debug, Serialize)]
pub struct AnnotatedRun {
  pub text: String,
  pub script: Script,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub pinyin: Option<String>,
}

/// Segment and annotate: secondary runs carry a tone-diacritic pinyin
/// reading, space-separated per syllable.
pub fn annotate(text: &str) -> Vec<AnnotatedRun> {
  segment(text)
    .into_iter()
    .map(|run| {
      let pinyin = match run.script {
        Script::Secondary => Some(reading(&run.text)),
        Script::Primary => None,
      };
      AnnotatedRun { text: run.text, script: run.script, pinyin }
    })
    .collect()
}

/// Per-character conversion (no word segmentation), so some polyphonic
/// characters use a default reading. Characters without an entry in the
/// pinyin table are copied as-is.
fn reading(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for ch in text.chars() {
    if !out.is_empty() {
      out.push(' ');
    }
    match ch.to_pinyin() {
      Some(py) => out.push_str(py.with_tone()),
      None => out.push(ch),
    }
  }
  out
}
