//! Aggregation — the fold from raw score records into per-mode and total
//! `{count, total, average}` statistics.
//!
//! Results are computed read models, never stored: repeated calls reflect
//! whatever records exist at that moment, which is the intended live
//! leaderboard behavior. The fold itself is pure; the store feeds it the
//! page catalog, the team's records, and the distinct-match count.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
  catalog::{ItemKind, PageCatalog},
  score::ScoreRecord,
  Error, Result,
};

// ─── Statistics ──────────────────────────────────────────────────────────────

/// Running statistics for one (mode, item) cell or one item grand total.
///
/// `count` is the number of matches contributing data for the team — the
/// same value in every cell of a team's results, not a per-item tally. This
/// mirrors the scoring product's definition of "events scored" and is
/// deliberately shared even where per-item counts would differ.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stat {
  pub count:   u32,
  pub total:   i64,
  pub average: f64,
}

impl Stat {
  fn zeroed(count: u32) -> Self {
    Self { count, total: 0, average: 0.0 }
  }
}

/// Per-team aggregate results: one `Stat` per (mode, item) cell, plus a
/// grand total per item across all modes. Every catalog entry is present
/// even when unobserved, zero-valued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamResults {
  pub team_number: i64,
  pub by_mode:     BTreeMap<String, BTreeMap<String, Stat>>,
  pub totals:      BTreeMap<String, Stat>,
}

/// Results for every team of an event, keyed by team number. Team numbers
/// serialize as JSON-object string keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllTeamResults {
  pub teams: BTreeMap<i64, TeamResults>,
}

// ─── Value interpretation ────────────────────────────────────────────────────

/// Interpret a stored score value per item kind.
///
/// Tallies carry integer text; flags are pre-encoded as `"0"`/`"1"` by the
/// submitting client and use the same arithmetic. The match is exhaustive on
/// purpose: a new [`ItemKind`] must be routed here before it can aggregate.
pub fn interpret(value: &str, kind: ItemKind) -> Result<i64> {
  match kind {
    ItemKind::Tally | ItemKind::Flag => {
      value.trim().parse().map_err(|_| Error::InvalidScoreValue {
        value: value.to_owned(),
        kind,
      })
    }
  }
}

// ─── The fold ────────────────────────────────────────────────────────────────

/// Fold a team's score records into [`TeamResults`].
///
/// `match_count` is `COUNT(DISTINCT match_number)` over the team's records
/// for this event and page, precomputed by the store and shared by every
/// cell. Averages divide by it only when it is non-zero.
///
/// Records referencing ids outside `catalog` fail the whole fold — they
/// indicate a record filed under the wrong page.
pub fn fold_team_results(
  team_number: i64,
  catalog: &PageCatalog,
  records: &[ScoreRecord],
  match_count: u32,
) -> Result<TeamResults> {
  let modes_by_id = catalog.modes_by_id();
  let items_by_id = catalog.items_by_id();

  let mut by_mode: BTreeMap<String, BTreeMap<String, Stat>> = catalog
    .modes
    .keys()
    .map(|mode| {
      let cells = catalog
        .items
        .keys()
        .map(|item| (item.clone(), Stat::zeroed(match_count)))
        .collect();
      (mode.clone(), cells)
    })
    .collect();
  let mut totals: BTreeMap<String, Stat> = catalog
    .items
    .keys()
    .map(|item| (item.clone(), Stat::zeroed(match_count)))
    .collect();

  for record in records {
    let item = items_by_id
      .get(&record.item_id)
      .ok_or(Error::UnknownScoringItem(record.item_id))?;
    let mode = modes_by_id
      .get(&record.mode_id)
      .ok_or(Error::UnknownGameMode(record.mode_id))?;

    let delta = interpret(&record.value, item.kind)?;

    // Both maps were fully seeded from the catalog above.
    let cell = by_mode
      .get_mut(&mode.name)
      .and_then(|cells| cells.get_mut(&item.name))
      .ok_or(Error::UnknownScoringItem(record.item_id))?;
    cell.total += delta;
    let total = totals
      .get_mut(&item.name)
      .ok_or(Error::UnknownScoringItem(record.item_id))?;
    total.total += delta;
  }

  if match_count > 0 {
    let divisor = f64::from(match_count);
    for cell in by_mode.values_mut().flat_map(BTreeMap::values_mut) {
      cell.average = cell.total as f64 / divisor;
    }
    for total in totals.values_mut() {
      total.average = total.total as f64 / divisor;
    }
  }

  Ok(TeamResults { team_number, by_mode, totals })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::{GameMode, ScoringItem};

  fn catalog() -> PageCatalog {
    let modes = [(1, "Auton"), (2, "Teleop")]
      .into_iter()
      .map(|(mode_id, name)| {
        (name.to_owned(), GameMode { mode_id, page_id: 1, name: name.to_owned() })
      })
      .collect();
    let items = [(1, "cone", ItemKind::Tally), (2, "Mobility", ItemKind::Flag)]
      .into_iter()
      .map(|(item_id, name, kind)| {
        (name.to_owned(), ScoringItem { item_id, page_id: 1, name: name.to_owned(), kind })
      })
      .collect();
    PageCatalog { modes, items }
  }

  fn record(mode_id: i64, item_id: i64, match_number: i64, value: &str) -> ScoreRecord {
    ScoreRecord {
      page_id: 1,
      mode_id,
      item_id,
      event_code: "CALA".into(),
      team_number: 1,
      match_number,
      value: value.into(),
    }
  }

  #[test]
  fn interpret_parses_integer_text() {
    assert_eq!(interpret("3", ItemKind::Tally).unwrap(), 3);
    assert_eq!(interpret("1", ItemKind::Flag).unwrap(), 1);
    assert_eq!(interpret(" 0 ", ItemKind::Flag).unwrap(), 0);
  }

  #[test]
  fn interpret_rejects_non_numeric_values() {
    let err = interpret("true", ItemKind::Flag).unwrap_err();
    assert!(matches!(
      err,
      Error::InvalidScoreValue { value, kind: ItemKind::Flag } if value == "true"
    ));
  }

  #[test]
  fn no_records_yields_zeroed_cells_for_the_whole_catalog() {
    let results = fold_team_results(7, &catalog(), &[], 0).unwrap();

    assert_eq!(results.by_mode.len(), 2);
    for cells in results.by_mode.values() {
      assert_eq!(cells.len(), 2);
      for stat in cells.values() {
        assert_eq!(*stat, Stat { count: 0, total: 0, average: 0.0 });
      }
    }
    assert_eq!(results.totals["cone"], Stat { count: 0, total: 0, average: 0.0 });
  }

  #[test]
  fn fold_routes_cells_and_grand_totals() {
    // Match 1: one cone in Auton, two in Teleop.
    let records = [record(1, 1, 1, "1"), record(2, 1, 1, "2")];
    let results = fold_team_results(1, &catalog(), &records, 1).unwrap();

    assert_eq!(results.by_mode["Auton"]["cone"], Stat { count: 1, total: 1, average: 1.0 });
    assert_eq!(results.by_mode["Teleop"]["cone"], Stat { count: 1, total: 2, average: 2.0 });
    assert_eq!(results.totals["cone"], Stat { count: 1, total: 3, average: 3.0 });

    // Match 2 adds one more cone in Auton; averages divide by two matches.
    let records = [record(1, 1, 1, "1"), record(2, 1, 1, "2"), record(1, 1, 2, "1")];
    let results = fold_team_results(1, &catalog(), &records, 2).unwrap();

    assert_eq!(results.by_mode["Auton"]["cone"], Stat { count: 2, total: 2, average: 1.0 });
    assert_eq!(results.totals["cone"], Stat { count: 2, total: 4, average: 2.0 });
    // Untouched cells share the match count but stay zero.
    assert_eq!(results.by_mode["Auton"]["Mobility"], Stat { count: 2, total: 0, average: 0.0 });
  }

  #[test]
  fn record_outside_catalog_fails_the_fold() {
    let records = [record(1, 99, 1, "1")];
    let err = fold_team_results(1, &catalog(), &records, 1).unwrap_err();
    assert!(matches!(err, Error::UnknownScoringItem(99)));
  }
}
