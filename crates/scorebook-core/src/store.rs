//! The `ScoreStore` trait.
//!
//! Implemented by storage backends (e.g. `scorebook-store-sqlite`). The API
//! layer and the host process depend on this abstraction, not on any
//! concrete backend.
//!
//! Every operation opens one transaction against the backing database and
//! commits or rolls back before returning; no aggregation state is carried
//! in memory between calls. Uniqueness constraints in the backend are the
//! sole serialization point for concurrent submissions of the same score
//! tuple — the loser observes a conflict error, never a silent overwrite.

use std::future::Future;

use crate::{
  aggregate::{AllTeamResults, TeamResults},
  catalog::{IntegratedCatalog, PageCatalog, ParsedPage},
  event::{Match, MatchesAndTeams, Team},
  page::ScoringPage,
  reconcile::MigrationReport,
  score::{PageUsage, ScoredMatch},
};

/// Abstraction over a scorebook storage backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ScoreStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Scoring pages ─────────────────────────────────────────────────────

  /// Insert-or-fetch a page row by content hash. Registering a hash that
  /// is already present returns the existing row unchanged.
  fn register_page(
    &self,
    content_hash: String,
  ) -> impl Future<Output = Result<ScoringPage, Self::Error>> + Send + '_;

  /// Retrieve a page by id. Returns `None` if not found.
  fn find_page(
    &self,
    page_id: i64,
  ) -> impl Future<Output = Result<Option<ScoringPage>, Self::Error>> + Send + '_;

  /// Retrieve a page by content hash. Returns `None` if not found.
  fn find_page_by_hash<'a>(
    &'a self,
    content_hash: &'a str,
  ) -> impl Future<Output = Result<Option<ScoringPage>, Self::Error>> + Send + 'a;

  /// Record that the page's markup passed external validation.
  fn mark_validated(
    &self,
    page_id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Record the outcome of an automated page test run.
  fn mark_tested(
    &self,
    page_id: i64,
    passed: bool,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Integration ───────────────────────────────────────────────────────

  /// Upsert the parsed page's modes and items into the catalog and flip the
  /// page's `integrated` flag, in one transaction.
  ///
  /// Fails with a validation error before any write if the page is missing
  /// or not validated. Re-running on an already-integrated page writes
  /// nothing and returns the existing name → id maps, so repeated calls
  /// compare equal.
  fn integrate_page(
    &self,
    page_id: i64,
    parsed: ParsedPage,
  ) -> impl Future<Output = Result<IntegratedCatalog, Self::Error>> + Send + '_;

  /// The full mode/item catalog for a page, keyed by name.
  fn page_catalog(
    &self,
    page_id: i64,
  ) -> impl Future<Output = Result<PageCatalog, Self::Error>> + Send + '_;

  // ── Event data ────────────────────────────────────────────────────────

  /// Bulk-load teams. Duplicate `(event_code, team_number)` rows are
  /// silently ignored, so re-ingesting an event is a no-op.
  fn store_teams(
    &self,
    teams: Vec<Team>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Bulk-load matches. Duplicate `(event_code, match_number)` rows are
  /// silently ignored.
  fn store_matches(
    &self,
    matches: Vec<Match>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The event's matches (only unscored ones when `unscored_only`) and all
  /// of its teams, keyed by number.
  fn matches_and_teams<'a>(
    &'a self,
    event_code: &'a str,
    unscored_only: bool,
  ) -> impl Future<Output = Result<MatchesAndTeams, Self::Error>> + Send + 'a;

  /// Remove the event's match rows (event data reset). Scores are deleted
  /// separately via [`ScoreStore::delete_scores`].
  fn delete_matches<'a>(
    &'a self,
    event_code: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Scores ────────────────────────────────────────────────────────────

  /// True iff at least one score record exists for this (event, team,
  /// match) triple, regardless of item or mode. API-boundary duplicate
  /// check; true atomicity rests on the backend's uniqueness constraint.
  fn already_scored<'a>(
    &'a self,
    event_code: &'a str,
    team_number: i64,
    match_number: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Persist a submission's score rows in one transaction and mark the
  /// match scored. Any tuple collision rolls the whole batch back — zero
  /// rows are persisted.
  fn record_scores<'a>(
    &'a self,
    event_code: &'a str,
    page_id: i64,
    submission: ScoredMatch,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Remove every score record for the event, across all pages.
  fn delete_scores<'a>(
    &'a self,
    event_code: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Distinct pages with recorded scores for this event, most rows first.
  fn pages_used<'a>(
    &'a self,
    event_code: &'a str,
  ) -> impl Future<Output = Result<Vec<PageUsage>, Self::Error>> + Send + 'a;

  // ── Aggregation ───────────────────────────────────────────────────────

  /// Aggregate one team's records for (event, page) into per-mode and
  /// grand-total statistics. Teams with no records get a fully zeroed
  /// result, never an error.
  fn team_results<'a>(
    &'a self,
    event_code: &'a str,
    team_number: i64,
    page_id: i64,
  ) -> impl Future<Output = Result<TeamResults, Self::Error>> + Send + 'a;

  /// [`ScoreStore::team_results`] for every stored team of the event.
  fn all_team_results<'a>(
    &'a self,
    event_code: &'a str,
    page_id: i64,
  ) -> impl Future<Output = Result<AllTeamResults, Self::Error>> + Send + 'a;

  // ── Migration ─────────────────────────────────────────────────────────

  /// Reconcile the two pages' catalogs by name and copy the event's
  /// eligible records from the old page onto the new one, originals
  /// untouched. Name drift becomes warnings; a storage failure during the
  /// copy becomes a report error with the transaction rolled back.
  ///
  /// Callers must ensure no concurrent score submission for the same event
  /// while a migration runs — this is a documented precondition, not a
  /// lock.
  fn migrate_event<'a>(
    &'a self,
    event_code: &'a str,
    old_page_id: i64,
    new_page_id: i64,
  ) -> impl Future<Output = Result<MigrationReport, Self::Error>> + Send + 'a;
}
