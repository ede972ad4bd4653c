//! Error type for `scorebook-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] scorebook_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A score tuple collided with an existing record — the team already
  /// scored this item/mode for this match. Nothing from the submission was
  /// persisted.
  #[error(
    "scores for team {team_number} in match {match_number} of event \
     {event_code} were already submitted"
  )]
  DuplicateScore {
    event_code:   String,
    team_number:  i64,
    match_number: i64,
  },

  /// A direct catalog insert hit the `(page_id, name)` uniqueness
  /// constraint. `integrate_page` avoids this by checking the page's
  /// `integrated` flag first.
  #[error("duplicate game mode or scoring item for page {page_id}")]
  DuplicateCatalogEntry { page_id: i64 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// True when the underlying SQLite error is a uniqueness-constraint
/// violation — the storage-level signal for every conflict in this crate.
pub(crate) fn is_unique_violation(err: &tokio_rusqlite::Error) -> bool {
  matches!(
    err,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _))
      if e.code == rusqlite::ErrorCode::ConstraintViolation
  )
}
