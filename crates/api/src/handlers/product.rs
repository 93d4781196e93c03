//! Handlers for the `/product` resource.

use axum::extract::{Path, State};
use storefront_core::types::DbId;
use storefront_db::models::product::ProductWithImages;

use crate::error::AppResult;
use crate::extract::ProductForm;
use crate::response::ApiResponse;
use crate::service::ProductService;
use crate::state::AppState;

/// GET /api/product
pub async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<ProductWithImages>>> {
    ProductService::new(&state.pool, state.image_store.as_ref())
        .list()
        .await
}

/// POST /api/product
///
/// Multipart form with `name`, `price`, `quantity` and one or more `files`.
pub async fn create(
    State(state): State<AppState>,
    form: ProductForm,
) -> AppResult<ApiResponse<ProductWithImages>> {
    ProductService::new(&state.pool, state.image_store.as_ref())
        .create(&form.fields, form.files)
        .await
}

/// PUT /api/product/{id}
///
/// Multipart form with `name`, `price`, `quantity`, optional `idsToDelete`
/// (JSON array of image ids) and optional `files` to append.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    form: ProductForm,
) -> AppResult<ApiResponse<ProductWithImages>> {
    ProductService::new(&state.pool, state.image_store.as_ref())
        .update(
            id,
            &form.fields,
            form.ids_to_delete.as_deref(),
            form.files.unwrap_or_default(),
        )
        .await
}

/// DELETE /api/product/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<ProductWithImages>> {
    ProductService::new(&state.pool, state.image_store.as_ref())
        .delete(id)
        .await
}
