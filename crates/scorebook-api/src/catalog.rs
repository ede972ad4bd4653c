//! Handler for `GET /catalog`.

use std::sync::Arc;

use axum::{Json, extract::State};
use scorebook_core::{catalog::PageCatalog, store::ScoreStore};

use crate::{ApiContext, error::ApiError};

/// `GET /catalog` — the active page's game modes and scoring items, keyed by
/// name. Scoring clients use the embedded ids when submitting scores.
pub async fn handler<S>(
  State(ctx): State<Arc<ApiContext<S>>>,
) -> Result<Json<PageCatalog>, ApiError>
where
  S: ScoreStore,
{
  let catalog = ctx
    .store
    .page_catalog(ctx.page_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(catalog))
}
