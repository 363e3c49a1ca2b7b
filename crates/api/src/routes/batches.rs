use axum::routing::get;
use axum::Router;

use crate::handlers::batches;
use crate::state::AppState;

/// Batch routes mounted at `/batches`.
///
/// ```text
/// GET /                  -> list_batches
/// GET /latest/matrix     -> latest_matrix
/// GET /{name}/matrix     -> batch_matrix
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(batches::list_batches))
        .route("/latest/matrix", get(batches::latest_matrix))
        .route("/{name}/matrix", get(batches::batch_matrix))
}
