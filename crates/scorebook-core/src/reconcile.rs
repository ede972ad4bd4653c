//! Catalog reconciliation — the planning half of page migration.
//!
//! When an organizer edits the scoring markup mid-event, a new page (and
//! catalog) replaces the old one. Markup authors cannot keep ids stable
//! across edits, so names are the portable identifier: reconciliation is two
//! ordinary set diffs over item and mode names, producing old-id → new-id
//! maps for the intersections. The copy itself happens in the store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{catalog::PageCatalog, score::ScoreRecord};

// ─── Diffs ───────────────────────────────────────────────────────────────────

/// The three-way diff between an old and a new catalog half, by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogDiff {
  /// Names present in both catalogs — eligible for migration.
  pub kept:    Vec<String>,
  /// Names only in the old catalog; their records will not be migrated.
  pub dropped: Vec<String>,
  /// Names only in the new catalog; they have no historical data.
  pub added:   Vec<String>,
  /// Old id → new id, restricted to the kept names.
  pub id_map:  BTreeMap<i64, i64>,
}

fn diff_names(old: &BTreeMap<String, i64>, new: &BTreeMap<String, i64>) -> CatalogDiff {
  let mut diff = CatalogDiff {
    kept:    Vec::new(),
    dropped: Vec::new(),
    added:   Vec::new(),
    id_map:  BTreeMap::new(),
  };

  for (name, old_id) in old {
    match new.get(name) {
      Some(new_id) => {
        diff.kept.push(name.clone());
        diff.id_map.insert(*old_id, *new_id);
      }
      None => diff.dropped.push(name.clone()),
    }
  }
  for name in new.keys() {
    if !old.contains_key(name) {
      diff.added.push(name.clone());
    }
  }

  diff
}

// ─── Plan ────────────────────────────────────────────────────────────────────

/// The reconciliation of two page catalogs: item and mode diffs computed
/// independently.
#[derive(Debug, Clone)]
pub struct MigrationPlan {
  pub items: CatalogDiff,
  pub modes: CatalogDiff,
}

/// Reconcile `old` against `new` by name.
pub fn plan_migration(old: &PageCatalog, new: &PageCatalog) -> MigrationPlan {
  let old_ids = old.id_maps();
  let new_ids = new.id_maps();
  MigrationPlan {
    items: diff_names(&old_ids.items, &new_ids.items),
    modes: diff_names(&old_ids.modes, &new_ids.modes),
  }
}

impl MigrationPlan {
  /// One warning per non-empty diff bucket: dropped names will not be
  /// visible in analytics, added names start with no history.
  pub fn warnings(&self) -> Vec<String> {
    let mut warnings = Vec::new();
    for (diff, noun) in [(&self.items, "scoring items"), (&self.modes, "game modes")] {
      if !diff.dropped.is_empty() {
        warnings.push(format!(
          "{noun} [{}] are not in the new page and will not be migrated; \
           their history will not be visible in analytics",
          diff.dropped.join(", "),
        ));
      }
      if !diff.added.is_empty() {
        warnings.push(format!(
          "{noun} [{}] are new in this page; there is no historical data for them",
          diff.added.join(", "),
        ));
      }
    }
    warnings
  }

  /// Remap a record onto the new page, or `None` if its item or mode was
  /// dropped. Every other field is copied verbatim.
  pub fn remap(&self, record: &ScoreRecord, new_page_id: i64) -> Option<ScoreRecord> {
    let item_id = *self.items.id_map.get(&record.item_id)?;
    let mode_id = *self.modes.id_map.get(&record.mode_id)?;
    Some(ScoreRecord {
      page_id: new_page_id,
      mode_id,
      item_id,
      event_code: record.event_code.clone(),
      team_number: record.team_number,
      match_number: record.match_number,
      value: record.value.clone(),
    })
  }
}

// ─── Report ──────────────────────────────────────────────────────────────────

/// The outcome of one migration attempt. Expected name drift lands in
/// `warning_messages`; only unexpected storage failures land in
/// `error_messages`, and the copy transaction is rolled back when they do.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrationReport {
  pub success_messages: Vec<String>,
  pub warning_messages: Vec<String>,
  pub error_messages:   Vec<String>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::{GameMode, ItemKind, ScoringItem};

  fn catalog(page_id: i64, modes: &[(i64, &str)], items: &[(i64, &str)]) -> PageCatalog {
    PageCatalog {
      modes: modes
        .iter()
        .map(|&(mode_id, name)| {
          (name.to_owned(), GameMode { mode_id, page_id, name: name.to_owned() })
        })
        .collect(),
      items: items
        .iter()
        .map(|&(item_id, name)| {
          (name.to_owned(), ScoringItem {
            item_id,
            page_id,
            name: name.to_owned(),
            kind: ItemKind::Tally,
          })
        })
        .collect(),
    }
  }

  #[test]
  fn reconciliation_splits_kept_dropped_and_added() {
    let old = catalog(1, &[(1, "Auton")], &[(1, "cone"), (2, "cube")]);
    let new = catalog(2, &[(3, "Auton")], &[(7, "cone"), (8, "newItem")]);

    let plan = plan_migration(&old, &new);

    assert_eq!(plan.items.kept, ["cone"]);
    assert_eq!(plan.items.dropped, ["cube"]);
    assert_eq!(plan.items.added, ["newItem"]);
    assert_eq!(plan.items.id_map[&1], 7);
    assert_eq!(plan.modes.kept, ["Auton"]);
    assert_eq!(plan.modes.id_map[&1], 3);
  }

  #[test]
  fn one_warning_per_nonempty_bucket() {
    let old = catalog(1, &[(1, "Auton")], &[(1, "cone"), (2, "cube")]);
    let new = catalog(2, &[(3, "Auton")], &[(7, "cone"), (8, "newItem")]);

    let warnings = plan_migration(&old, &new).warnings();
    assert_eq!(warnings.len(), 2);
    assert!(warnings[0].contains("cube"));
    assert!(warnings[1].contains("newItem"));
  }

  #[test]
  fn identical_catalogs_warn_about_nothing() {
    let old = catalog(1, &[(1, "Auton")], &[(1, "cone")]);
    let new = catalog(2, &[(2, "Auton")], &[(2, "cone")]);
    assert!(plan_migration(&old, &new).warnings().is_empty());
  }

  #[test]
  fn remap_rewrites_ids_and_skips_dropped_items() {
    let old = catalog(1, &[(1, "Auton")], &[(1, "cone"), (2, "cube")]);
    let new = catalog(2, &[(3, "Auton")], &[(7, "cone")]);
    let plan = plan_migration(&old, &new);

    let cone = ScoreRecord {
      page_id:      1,
      mode_id:      1,
      item_id:      1,
      event_code:   "CALA".into(),
      team_number:  2584,
      match_number: 1,
      value:        "1".into(),
    };
    let migrated = plan.remap(&cone, 2).unwrap();
    assert_eq!(migrated.page_id, 2);
    assert_eq!(migrated.item_id, 7);
    assert_eq!(migrated.mode_id, 3);
    assert_eq!(migrated.value, "1");

    let cube = ScoreRecord { item_id: 2, ..cone };
    assert!(plan.remap(&cube, 2).is_none());
  }
}
