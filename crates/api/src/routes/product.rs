//! Route definitions for the `/product` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::product;
use crate::state::AppState;

/// Routes mounted at `/product`.
///
/// ```text
/// GET    /        -> list
/// POST   /        -> create
/// PUT    /{id}    -> update
/// DELETE /{id}    -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(product::list).post(product::create))
        .route("/{id}", put(product::update).delete(product::delete))
}
