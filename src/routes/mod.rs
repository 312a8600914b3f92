pub mod submit;

use axum::Router;
use axum::routing::post;

use crate::state::SharedState;

/// The form target. Any path is accepted so API Gateway stage or resource
/// prefixes still reach the handler.
pub fn submit_routes() -> Router<SharedState> {
    Router::new()
        .route("/", post(submit::submit))
        .route("/{*path}", post(submit::submit))
}
