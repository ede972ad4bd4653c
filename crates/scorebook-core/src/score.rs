//! Score facts — one immutable record that a team produced a value for one
//! item/mode in one match.
//!
//! Records are never updated; they are deleted only by event reset, and
//! migration copies them rather than editing in place.

use serde::{Deserialize, Serialize};

/// One score in a submission: which item, in which mode, and the observed
/// value. Tallies carry integer text; flags carry `"0"`/`"1"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
  pub item_id: i64,
  pub mode_id: i64,
  pub value:   String,
}

/// A scorer's full submission for one team in one match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredMatch {
  pub match_number: i64,
  pub team_number:  i64,
  pub scores:       Vec<ScoreEntry>,
}

/// A persisted score fact.
///
/// `page_id` is carried redundantly (the item and mode ids already imply it)
/// so historical scores stay attributable to the page whose catalog was
/// active when they were recorded, even after a later page replaces it.
///
/// Uniqueness: `(page_id, event_code, team_number, item_id, match_number,
/// mode_id)` — the constraint that makes "a team scores a match at most once
/// per item/mode" hold under concurrent submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
  pub page_id:      i64,
  pub mode_id:      i64,
  pub item_id:      i64,
  pub event_code:   String,
  pub team_number:  i64,
  pub match_number: i64,
  pub value:        String,
}

/// How many score rows an event has recorded under one page. Ordered
/// most-used first by the store; the migration flow uses the head entry as
/// the prior page to migrate from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageUsage {
  pub page_id:     i64,
  pub score_count: i64,
}
