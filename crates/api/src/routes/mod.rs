pub mod batches;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /batches                        list batches, newest first
/// /batches/latest/matrix          sync, then matrix of the newest batch
/// /batches/{name}/matrix          matrix of one batch
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/batches", batches::router())
}
