//! Handlers for `/results` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/results` | [`AllTeamResults`] for the active event/page |
//! | `GET`  | `/results/:team_number` | [`TeamResults`] for one team |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use scorebook_core::{
  aggregate::{AllTeamResults, TeamResults},
  store::ScoreStore,
};

use crate::{ApiContext, error::ApiError};

/// `GET /results` — aggregate statistics for every team of the event.
/// Results reflect whatever scores exist right now; clients poll this for
/// the live leaderboard.
pub async fn all_teams<S>(
  State(ctx): State<Arc<ApiContext<S>>>,
) -> Result<Json<AllTeamResults>, ApiError>
where
  S: ScoreStore,
{
  let results = ctx
    .store
    .all_team_results(&ctx.event_code, ctx.page_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(results))
}

/// `GET /results/:team_number`
pub async fn one_team<S>(
  State(ctx): State<Arc<ApiContext<S>>>,
  Path(team_number): Path<i64>,
) -> Result<Json<TeamResults>, ApiError>
where
  S: ScoreStore,
{
  let results = ctx
    .store
    .team_results(&ctx.event_code, team_number, ctx.page_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(results))
}
