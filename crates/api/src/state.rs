use std::sync::Arc;

use storefront_core::image_store::LocalImageStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: storefront_db::DbPool,
    /// Where uploaded product images are written.
    pub image_store: Arc<LocalImageStore>,
}
