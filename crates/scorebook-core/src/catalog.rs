//! Page catalogs — the game modes and scoring items discovered in a page.
//!
//! Catalog rows are created during integration and never updated. Names are
//! the portable identifier across page edits (ids are page-scoped), which is
//! what migration reconciles on.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Item kinds ──────────────────────────────────────────────────────────────

/// How a scoring item's recorded values are interpreted.
/// The variant name, lowercased, is the discriminant stored in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
  /// Additive per-event count (e.g. game pieces scored).
  Tally,
  /// It-happened-or-it-didn't, recorded as `"0"`/`"1"`.
  Flag,
}

impl ItemKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Tally => "tally",
      Self::Flag => "flag",
    }
  }
}

impl fmt::Display for ItemKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ItemKind {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "tally" => Ok(Self::Tally),
      "flag" => Ok(Self::Flag),
      other => Err(Error::UnknownItemKind(other.to_owned())),
    }
  }
}

// ─── Catalog rows ────────────────────────────────────────────────────────────

/// A phase of a match (e.g. Autonomous, Teleop), scoped to one page.
/// `(page_id, name)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMode {
  pub mode_id: i64,
  pub page_id: i64,
  pub name:    String,
}

/// A named, typed countable event defined by the page.
/// `(page_id, name)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringItem {
  pub item_id: i64,
  pub page_id: i64,
  pub name:    String,
  pub kind:    ItemKind,
}

// ─── Parsed page input ───────────────────────────────────────────────────────

/// A scoring-element list as emitted by the markup parser: a single name or
/// a list of names per item kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
  One(String),
  Many(Vec<String>),
}

impl OneOrMany {
  pub fn as_slice(&self) -> &[String] {
    match self {
      Self::One(name) => std::slice::from_ref(name),
      Self::Many(names) => names,
    }
  }
}

/// The raw parse result for a scoring page, consumed as an opaque input from
/// the external markup parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedPage {
  /// Discovered game mode names, unique.
  pub game_modes:       Vec<String>,
  /// Discovered scoring item names, keyed by kind discriminant.
  pub scoring_elements: BTreeMap<String, OneOrMany>,
}

impl ParsedPage {
  /// Flatten `scoring_elements` into `(kind, name)` pairs, accepting both
  /// the scalar and the list form. Fails on a kind string this version does
  /// not know.
  pub fn normalized_items(&self) -> Result<Vec<(ItemKind, &str)>> {
    let mut items = Vec::new();
    for (kind, names) in &self.scoring_elements {
      let kind: ItemKind = kind.parse()?;
      for name in names.as_slice() {
        items.push((kind, name.as_str()));
      }
    }
    Ok(items)
  }
}

// ─── Materialised catalogs ───────────────────────────────────────────────────

/// The full catalog for one page, keyed by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageCatalog {
  pub modes: BTreeMap<String, GameMode>,
  pub items: BTreeMap<String, ScoringItem>,
}

impl PageCatalog {
  /// Name → id maps, the shape integration reports back to its caller.
  pub fn id_maps(&self) -> IntegratedCatalog {
    IntegratedCatalog {
      modes: self.modes.values().map(|m| (m.name.clone(), m.mode_id)).collect(),
      items: self.items.values().map(|i| (i.name.clone(), i.item_id)).collect(),
    }
  }

  pub fn modes_by_id(&self) -> BTreeMap<i64, &GameMode> {
    self.modes.values().map(|m| (m.mode_id, m)).collect()
  }

  pub fn items_by_id(&self) -> BTreeMap<i64, &ScoringItem> {
    self.items.values().map(|i| (i.item_id, i)).collect()
  }
}

/// Name → id maps returned by integration. Two integrations of the same
/// page compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegratedCatalog {
  pub modes: BTreeMap<String, i64>,
  pub items: BTreeMap<String, i64>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn scoring_elements_accept_scalar_and_list_forms() {
    let parsed: ParsedPage = serde_json::from_str(
      r#"{
        "game_modes": ["Auton", "Teleop"],
        "scoring_elements": {
          "tally": ["cone", "cube"],
          "flag": "Broke"
        }
      }"#,
    )
    .unwrap();

    let items = parsed.normalized_items().unwrap();
    assert_eq!(items, vec![
      (ItemKind::Flag, "Broke"),
      (ItemKind::Tally, "cone"),
      (ItemKind::Tally, "cube"),
    ]);
  }

  #[test]
  fn unknown_kind_fails_normalization() {
    let parsed: ParsedPage = serde_json::from_str(
      r#"{
        "game_modes": [],
        "scoring_elements": { "score_gauge": ["dial"] }
      }"#,
    )
    .unwrap();

    let err = parsed.normalized_items().unwrap_err();
    assert!(matches!(err, Error::UnknownItemKind(kind) if kind == "score_gauge"));
  }

  #[test]
  fn item_kind_discriminant_roundtrip() {
    for kind in [ItemKind::Tally, ItemKind::Flag] {
      assert_eq!(kind.as_str().parse::<ItemKind>().unwrap(), kind);
    }
  }
}
