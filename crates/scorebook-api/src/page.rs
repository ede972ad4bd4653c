//! Handler for `GET /page`.

use std::sync::Arc;

use axum::{Json, extract::State};
use scorebook_core::{page::ScoringPage, store::ScoreStore};

use crate::{ApiContext, error::ApiError};

/// `GET /page` — lifecycle status of the active scoring page
/// (validated / integrated / tested flags).
pub async fn status<S>(
  State(ctx): State<Arc<ApiContext<S>>>,
) -> Result<Json<ScoringPage>, ApiError>
where
  S: ScoreStore,
{
  let page = ctx
    .store
    .find_page(ctx.page_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("scoring page {} not found", ctx.page_id)))?;
  Ok(Json(page))
}
