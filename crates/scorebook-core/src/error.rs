//! Error types for `scorebook-core`.

use thiserror::Error;

use crate::catalog::ItemKind;

#[derive(Debug, Error)]
pub enum Error {
  #[error("scoring page not found: {0}")]
  PageNotFound(i64),

  /// Integration was attempted before the page's markup passed validation.
  #[error("scoring page {0} has not been validated")]
  PageNotValidated(i64),

  /// A catalog row carries a kind string this version does not know.
  /// Deliberately fatal: it means the catalog and the aggregator disagree
  /// about the set of scoring item kinds.
  #[error("unknown scoring item kind: {0:?}")]
  UnknownItemKind(String),

  #[error("score value {value:?} is not usable for a {kind} item")]
  InvalidScoreValue { value: String, kind: ItemKind },

  /// A score record references a mode id outside its page's catalog.
  #[error("score references game mode {0}, which is not in the page catalog")]
  UnknownGameMode(i64),

  /// A score record references an item id outside its page's catalog.
  #[error("score references scoring item {0}, which is not in the page catalog")]
  UnknownScoringItem(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
