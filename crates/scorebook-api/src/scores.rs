//! Handler for `POST /scores`.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use scorebook_core::{
  score::{ScoreEntry, ScoredMatch},
  store::ScoreStore,
};
use serde::Deserialize;

use crate::{ApiContext, error::ApiError};

// ─── Wire types ──────────────────────────────────────────────────────────────

/// A score value as clients send it. Flags arrive as booleans or `0`/`1`,
/// tallies as numbers; everything is normalised to integer text before
/// storage so the aggregator can always interpret it.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ScoreValue {
  Number(i64),
  Bool(bool),
  Text(String),
}

impl ScoreValue {
  fn into_stored(self) -> String {
    match self {
      Self::Number(n) => n.to_string(),
      Self::Bool(true) => "1".to_owned(),
      Self::Bool(false) => "0".to_owned(),
      Self::Text(text) => text,
    }
  }
}

/// One score triple as submitted; `scoring_item_id` is the wire name for
/// the catalog item id.
#[derive(Debug, Deserialize)]
pub struct ScoreBody {
  pub scoring_item_id: i64,
  pub mode_id:         i64,
  pub value:           ScoreValue,
}

/// JSON body accepted by `POST /scores`.
#[derive(Debug, Deserialize)]
pub struct SubmitBody {
  pub match_number: i64,
  pub team_number:  i64,
  pub scores:       Vec<ScoreBody>,
}

impl From<SubmitBody> for ScoredMatch {
  fn from(body: SubmitBody) -> Self {
    Self {
      match_number: body.match_number,
      team_number:  body.team_number,
      scores:       body
        .scores
        .into_iter()
        .map(|s| ScoreEntry {
          item_id: s.scoring_item_id,
          mode_id: s.mode_id,
          value:   s.value.into_stored(),
        })
        .collect(),
    }
  }
}

// ─── Handler ─────────────────────────────────────────────────────────────────

/// `POST /scores` — record one team's scores for one match; 201 on success.
///
/// Returns 409 when the team already scored this match. The check here is a
/// courtesy for clients; the store's uniqueness constraint is what actually
/// guarantees at-most-once under concurrent submission.
pub async fn submit<S>(
  State(ctx): State<Arc<ApiContext<S>>>,
  Json(body): Json<SubmitBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ScoreStore,
{
  let already = ctx
    .store
    .already_scored(&ctx.event_code, body.team_number, body.match_number)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  if already {
    return Err(ApiError::Conflict(format!(
      "match {} data for team {} already submitted",
      body.match_number, body.team_number,
    )));
  }

  ctx
    .store
    .record_scores(&ctx.event_code, ctx.page_id, ScoredMatch::from(body))
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(StatusCode::CREATED)
}
