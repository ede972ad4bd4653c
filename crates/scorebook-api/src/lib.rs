//! JSON scoring API for scorebook.
//!
//! Exposes an axum [`Router`] backed by any
//! [`scorebook_core::store::ScoreStore`]. Auth, TLS, static files, and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", scorebook_api::api_router(ctx.clone()))
//! ```

pub mod catalog;
pub mod error;
pub mod matches;
pub mod page;
pub mod results;
pub mod scores;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use scorebook_core::store::ScoreStore;

pub use error::ApiError;

/// What the router serves: a store plus the active event and the currently
/// integrated scoring page. Injected by the host process — handlers never
/// consult process-wide state.
pub struct ApiContext<S> {
  pub store:      Arc<S>,
  pub event_code: String,
  pub page_id:    i64,
}

/// Build a fully-materialised API router for `ctx`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(ctx: Arc<ApiContext<S>>) -> Router<()>
where
  S: ScoreStore + 'static,
{
  Router::new()
    .route("/catalog", get(catalog::handler::<S>))
    .route("/matches", get(matches::list::<S>))
    .route("/scores", post(scores::submit::<S>))
    .route("/results", get(results::all_teams::<S>))
    .route("/results/{team_number}", get(results::one_team::<S>))
    .route("/page", get(page::status::<S>))
    .with_state(ctx)
}
