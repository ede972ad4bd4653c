//! Handler for `GET /matches`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use scorebook_core::{event::MatchesAndTeams, store::ScoreStore};
use serde::Deserialize;

use crate::{ApiContext, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// If `true` (the default), only matches nobody has scored yet are
  /// returned — scoring clients show those for faster match selection.
  #[serde(default = "default_unscored_only")]
  pub unscored_only: bool,
}

fn default_unscored_only() -> bool {
  true
}

/// `GET /matches[?unscored_only=false]` — the event's matches and teams,
/// keyed by number.
pub async fn list<S>(
  State(ctx): State<Arc<ApiContext<S>>>,
  Query(params): Query<ListParams>,
) -> Result<Json<MatchesAndTeams>, ApiError>
where
  S: ScoreStore,
{
  let data = ctx
    .store
    .matches_and_teams(&ctx.event_code, params.unscored_only)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(data))
}
