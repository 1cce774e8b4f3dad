//! The assignment engine: the only code path allowed to move words between
//! the pool and blank slots.
//!
//! Every operation validates its inputs before touching state, so a failed
//! call leaves the worksheet exactly as it was. Every call that actually
//! changes assignment or pool state drops the worksheet back into the
//! Editing phase and invalidates the touched slots' evaluations.

use crate::domain::{BlankId, Evaluation, Phase, Worksheet, WordId};
use crate::error::WorksheetError;

/// Place a pool word into a blank. Any current occupant is displaced to the
/// end of the pool before the incoming word lands.
pub fn assign(ws: &mut Worksheet, word: WordId, blank: BlankId) -> Result<(), WorksheetError> {
  let pool_idx = match ws.pool_position(word) {
    Some(i) => i,
    None => return Err(WorksheetError::UnknownWord(word)),
  };
  {
    let (pool, slot) = match ws.pool_and_blank_mut(blank) {
      Some(v) => v,
      None => return Err(WorksheetError::UnknownBlank(blank.to_string())),
    };
    let incoming = pool.remove(pool_idx);
    if let Some(prev) = slot.assigned.replace(incoming) {
      pool.push(prev);
    }
    slot.last_eval = Evaluation::Unknown;
  }
  ws.phase = Phase::Editing;
  Ok(())
}

/// Return a blank's occupant to the end of the pool and clear the slot.
/// An already-empty slot is a no-op, not an error, and changes nothing.
pub fn unassign(ws: &mut Worksheet, blank: BlankId) -> Result<(), WorksheetError> {
  let emptied = {
    let (pool, slot) = match ws.pool_and_blank_mut(blank) {
      Some(v) => v,
      None => return Err(WorksheetError::UnknownBlank(blank.to_string())),
    };
    match slot.assigned.take() {
      Some(word) => {
        pool.push(word);
        slot.last_eval = Evaluation::Unknown;
        true
      }
      None => false,
    }
  };
  if emptied {
    ws.phase = Phase::Editing;
  }
  Ok(())
}

/// Move the pool entry at `from` to `to`, shifting the entries between.
/// Purely cosmetic: membership and assignment state never change.
pub fn reorder_pool(ws: &mut Worksheet, from: usize, to: usize) -> Result<(), WorksheetError> {
  let len = ws.pool.len();
  if from >= len {
    return Err(WorksheetError::IndexOutOfRange { index: from, len });
  }
  if to >= len {
    return Err(WorksheetError::IndexOutOfRange { index: to, len });
  }
  if from != to {
    let word = ws.pool.remove(from);
    ws.pool.insert(to, word);
    ws.phase = Phase::Editing;
  }
  Ok(())
}

/// Atomic unassign-from-source + assign-to-destination, so a drag whose
/// source is an already-filled blank behaves like one from the pool. Any
/// destination occupant is displaced to the pool. An empty source slot is a
/// no-op; source == destination is a no-op.
pub fn move_between_blanks(ws: &mut Worksheet, source: BlankId, dest: BlankId) -> Result<(), WorksheetError> {
  if ws.blank(source).is_none() {
    return Err(WorksheetError::UnknownBlank(source.to_string()));
  }
  if ws.blank(dest).is_none() {
    return Err(WorksheetError::UnknownBlank(dest.to_string()));
  }
  if source == dest {
    return Ok(());
  }
  {
    let (pool, src, dst) = match ws.pool_and_two_blanks_mut(source, dest) {
      Some(v) => v,
      None => return Err(WorksheetError::UnknownBlank(dest.to_string())),
    };
    let moved = match src.assigned.take() {
      Some(word) => word,
      None => return Ok(()),
    };
    src.last_eval = Evaluation::Unknown;
    if let Some(prev) = dst.assigned.replace(moved) {
      pool.push(prev);
    }
    dst.last_eval = Evaluation::Unknown;
  }
  ws.phase = Phase::Editing;
  Ok(())
}
