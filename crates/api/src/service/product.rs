//! Product resource operations: list, create, update, delete.
//!
//! Image files are written before the rows that reference them and removed
//! again if the database write fails, so a failed request leaves neither rows
//! nor stray uploads behind.

use axum::http::StatusCode;
use sqlx::PgPool;
use storefront_core::error::CoreError;
use storefront_core::image_store::{ImageStore, UploadedImage};
use storefront_core::product::{parse_ids_to_delete, ProductFields, PRODUCT_IMAGE_NAMESPACE};
use storefront_core::types::DbId;
use storefront_db::models::product::{CreateProduct, ProductWithImages, UpdateProduct};
use storefront_db::repositories::ProductRepo;

use crate::error::{AppError, AppResult};
use crate::response::ApiResponse;

const ENTITY: &str = "Product";

/// Product operations over a connection pool and an [`ImageStore`].
pub struct ProductService<'a, S> {
    pool: &'a PgPool,
    images: &'a S,
}

impl<'a, S: ImageStore> ProductService<'a, S> {
    pub fn new(pool: &'a PgPool, images: &'a S) -> Self {
        Self { pool, images }
    }

    /// Every product with its images.
    pub async fn list(&self) -> AppResult<ApiResponse<Vec<ProductWithImages>>> {
        let products = ProductRepo::list_with_images(self.pool).await?;
        Ok(ApiResponse::new(
            StatusCode::OK,
            "Get products successfully",
            products,
        ))
    }

    /// Create a product with one image per uploaded file.
    ///
    /// Fields are validated before the files are looked at; a form without
    /// any `files` part is rejected, an empty list is not.
    pub async fn create(
        &self,
        fields: &ProductFields,
        files: Option<Vec<UploadedImage>>,
    ) -> AppResult<ApiResponse<ProductWithImages>> {
        let input = fields.validate().map_err(CoreError::Validation)?;
        let files = files.ok_or(AppError::FileRequired)?;

        let paths = self.save_all(&files).await?;
        let create = CreateProduct {
            name: input.name,
            price: input.price,
            quantity: input.quantity,
        };

        let product = match ProductRepo::create_with_images(self.pool, &create, &paths).await {
            Ok(product) => product,
            Err(e) => {
                self.discard(&paths).await;
                return Err(e.into());
            }
        };

        tracing::info!(
            product_id = product.product.id,
            image_count = product.product_images.len(),
            "Product created"
        );
        Ok(ApiResponse::new(
            StatusCode::CREATED,
            "Create product successfully",
            product,
        ))
    }

    /// Update a product's name and image set.
    ///
    /// Existence is checked before the payload is validated. Price and
    /// quantity are validated but not written. Image rows listed in
    /// `ids_to_delete` are removed; the image store is only asked to delete
    /// for rows whose URL is empty, so files behind removed rows stay on disk.
    pub async fn update(
        &self,
        id: DbId,
        fields: &ProductFields,
        ids_to_delete: Option<&str>,
        files: Vec<UploadedImage>,
    ) -> AppResult<ApiResponse<ProductWithImages>> {
        let existing = ProductRepo::find_by_id_with_images(self.pool, id)
            .await?
            .ok_or(CoreError::NotFound { entity: ENTITY, id })?;

        let input = fields.validate().map_err(CoreError::Validation)?;
        let ids = parse_ids_to_delete(ids_to_delete)?;

        let mut remove_ids = Vec::new();
        for image in existing.product_images.iter().filter(|i| ids.contains(&i.id)) {
            if image.image_url.is_empty() {
                self.images.delete(&image.image_url).await;
            }
            remove_ids.push(image.id);
        }

        let paths = self.save_all(&files).await?;
        let update = UpdateProduct {
            name: Some(input.name),
            price: None,
            quantity: None,
        };

        let updated =
            match ProductRepo::update_with_images(self.pool, id, &update, &remove_ids, &paths)
                .await
            {
                Ok(Some(product)) => product,
                Ok(None) => {
                    self.discard(&paths).await;
                    return Err(CoreError::NotFound { entity: ENTITY, id }.into());
                }
                Err(e) => {
                    self.discard(&paths).await;
                    return Err(e.into());
                }
            };

        tracing::info!(
            product_id = id,
            removed = remove_ids.len(),
            added = paths.len(),
            "Product updated"
        );
        Ok(ApiResponse::new(
            StatusCode::CREATED,
            "Update product successfully",
            updated,
        ))
    }

    /// Delete a product, its image rows and their files.
    ///
    /// The payload is the product as it was before deletion.
    pub async fn delete(&self, id: DbId) -> AppResult<ApiResponse<ProductWithImages>> {
        let existing = ProductRepo::find_by_id_with_images(self.pool, id)
            .await?
            .ok_or(CoreError::NotFound { entity: ENTITY, id })?;

        for image in existing
            .product_images
            .iter()
            .filter(|i| !i.image_url.is_empty())
        {
            self.images.delete(&image.image_url).await;
        }

        if !ProductRepo::delete(self.pool, id).await? {
            return Err(CoreError::NotFound { entity: ENTITY, id }.into());
        }

        tracing::info!(
            product_id = id,
            image_count = existing.product_images.len(),
            "Product deleted"
        );
        Ok(ApiResponse::new(
            StatusCode::OK,
            "Delete product successfully",
            existing,
        ))
    }

    /// Save every file, removing the ones already written if any save fails.
    async fn save_all(&self, files: &[UploadedImage]) -> AppResult<Vec<String>> {
        let mut paths = Vec::with_capacity(files.len());
        for file in files {
            match self.images.save(PRODUCT_IMAGE_NAMESPACE, file).await {
                Ok(path) => paths.push(path),
                Err(e) => {
                    self.discard(&paths).await;
                    return Err(e.into());
                }
            }
        }
        Ok(paths)
    }

    async fn discard(&self, paths: &[String]) {
        for path in paths {
            self.images.delete(path).await;
        }
    }
}
