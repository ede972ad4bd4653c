//! Scoring pages — one validated version of the organizer's HTML markup.
//!
//! A page's identity is the hash of its markup: editing the markup produces
//! a new page, and the old page's catalog (and any scores recorded under it)
//! stays queryable under its own id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Lifecycle row for one scoring page.
///
/// `validated` flips after the external markup validator accepts the page,
/// `integrated` after its catalog is written, `tested` after an automated
/// page run. Identity (`content_hash`) never changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringPage {
  pub page_id:      i64,
  pub content_hash: String,
  pub validated:    bool,
  pub integrated:   bool,
  pub tested:       bool,
  pub created_at:   DateTime<Utc>,
}

/// Compute the content hash for a scoring page's markup.
///
/// SHA-256 over the raw markup bytes, hex-encoded. Stable across runs so a
/// re-validated unchanged page maps onto its existing row.
pub fn hash_markup(markup: &str) -> String {
  let mut hasher = Sha256::new();
  hasher.update(markup.as_bytes());
  hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn same_markup_same_hash() {
    assert_eq!(hash_markup("<div class=\"scoring\"/>"), hash_markup("<div class=\"scoring\"/>"));
  }

  #[test]
  fn edited_markup_changes_hash() {
    assert_ne!(hash_markup("<div/>"), hash_markup("<div/> "));
  }
}
