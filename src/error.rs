//! Error taxonomy for worksheet loading and the assignment engine.
//!
//! Every variant is a local, recoverable condition: the failing operation is
//! reported to the caller and the worksheet is left exactly as it was. None
//! of these ends the session.

use thiserror::Error;

use crate::domain::WordId;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WorksheetError {
  /// The word is not in the pool (e.g. a stale or duplicate drag source).
  #[error("word {0} is not in the pool")]
  UnknownWord(WordId),

  /// The blank id does not resolve to a slot in this worksheet.
  #[error("blank '{0}' does not exist")]
  UnknownBlank(String),

  /// A pool reorder index fell outside `[0, pool.len())`.
  #[error("pool index {index} out of range for {len} words")]
  IndexOutOfRange { index: usize, len: usize },

  /// The inbound payload cannot be built into a worksheet at all.
  /// The host should refuse construction rather than keep a partial state.
  #[error("malformed worksheet payload: {0}")]
  MalformedPayload(String),
}
