//! Repository for the `products` and `product_images` tables.

use std::collections::HashMap;

use sqlx::PgPool;
use storefront_core::types::DbId;

use crate::models::product::{
    CreateProduct, Product, ProductImage, ProductWithImages, UpdateProduct,
};

/// Column list for the `products` table.
const COLUMNS: &str = "id, name, price, quantity, created_at, updated_at";

/// Column list for the `product_images` table.
const IMAGE_COLUMNS: &str = "id, product_id, image_url, created_at, updated_at";

/// Provides CRUD operations for products and the images they own.
pub struct ProductRepo;

impl ProductRepo {
    /// List every product with its images, ordered by id.
    ///
    /// Images for all products are fetched in a single query and grouped in
    /// memory.
    pub async fn list_with_images(pool: &PgPool) -> Result<Vec<ProductWithImages>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products ORDER BY id");
        let products = sqlx::query_as::<_, Product>(&query).fetch_all(pool).await?;

        let ids: Vec<DbId> = products.iter().map(|p| p.id).collect();
        let image_query = format!(
            "SELECT {IMAGE_COLUMNS} FROM product_images \
             WHERE product_id = ANY($1) ORDER BY id"
        );
        let images = sqlx::query_as::<_, ProductImage>(&image_query)
            .bind(&ids)
            .fetch_all(pool)
            .await?;

        let mut by_product: HashMap<DbId, Vec<ProductImage>> = HashMap::new();
        for image in images {
            by_product.entry(image.product_id).or_default().push(image);
        }

        Ok(products
            .into_iter()
            .map(|product| {
                let product_images = by_product.remove(&product.id).unwrap_or_default();
                ProductWithImages {
                    product,
                    product_images,
                }
            })
            .collect())
    }

    /// Find a product by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = $1");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a product by ID, enriched with its images.
    pub async fn find_by_id_with_images(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ProductWithImages>, sqlx::Error> {
        match Self::find_by_id(pool, id).await? {
            Some(product) => {
                let product_images = Self::list_images(pool, product.id).await?;
                Ok(Some(ProductWithImages {
                    product,
                    product_images,
                }))
            }
            None => Ok(None),
        }
    }

    /// List the images owned by a product, ordered by id.
    pub async fn list_images(
        pool: &PgPool,
        product_id: DbId,
    ) -> Result<Vec<ProductImage>, sqlx::Error> {
        let query = format!(
            "SELECT {IMAGE_COLUMNS} FROM product_images WHERE product_id = $1 ORDER BY id"
        );
        sqlx::query_as::<_, ProductImage>(&query)
            .bind(product_id)
            .fetch_all(pool)
            .await
    }

    /// Insert a product and one image row per entry of `image_urls`, in a
    /// single transaction.
    pub async fn create_with_images(
        pool: &PgPool,
        input: &CreateProduct,
        image_urls: &[String],
    ) -> Result<ProductWithImages, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO products (name, price, quantity) VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        let product = sqlx::query_as::<_, Product>(&query)
            .bind(&input.name)
            .bind(input.price)
            .bind(input.quantity)
            .fetch_one(&mut *tx)
            .await?;

        let product_images = Self::insert_images_inner(&mut tx, product.id, image_urls).await?;

        tx.commit().await?;
        Ok(ProductWithImages {
            product,
            product_images,
        })
    }

    /// Update a product's fields and image set in a single transaction.
    ///
    /// Only non-`None` fields in `input` are applied. Images listed in
    /// `remove_image_ids` are deleted if they belong to this product; ids of
    /// other products' images are ignored. `add_image_urls` become new image
    /// rows. Returns `None` if no product with the given `id` exists.
    pub async fn update_with_images(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProduct,
        remove_image_ids: &[DbId],
        add_image_urls: &[String],
    ) -> Result<Option<ProductWithImages>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE products SET \
                name = COALESCE($2, name), \
                price = COALESCE($3, price), \
                quantity = COALESCE($4, quantity) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let Some(product) = sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.price)
            .bind(input.quantity)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        if !remove_image_ids.is_empty() {
            let removed = sqlx::query(
                "DELETE FROM product_images WHERE product_id = $1 AND id = ANY($2)",
            )
            .bind(id)
            .bind(remove_image_ids)
            .execute(&mut *tx)
            .await?;
            tracing::debug!(product_id = id, removed = removed.rows_affected(), "Removed product images");
        }

        Self::insert_images_inner(&mut tx, id, add_image_urls).await?;

        let image_query = format!(
            "SELECT {IMAGE_COLUMNS} FROM product_images WHERE product_id = $1 ORDER BY id"
        );
        let product_images = sqlx::query_as::<_, ProductImage>(&image_query)
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(ProductWithImages {
            product,
            product_images,
        }))
    }

    /// Delete a product and all of its images. Returns `true` if the product
    /// existed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM product_images WHERE product_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_images_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        product_id: DbId,
        image_urls: &[String],
    ) -> Result<Vec<ProductImage>, sqlx::Error> {
        let query = format!(
            "INSERT INTO product_images (product_id, image_url) VALUES ($1, $2) \
             RETURNING {IMAGE_COLUMNS}"
        );
        let mut images = Vec::with_capacity(image_urls.len());
        for url in image_urls {
            let image = sqlx::query_as::<_, ProductImage>(&query)
                .bind(product_id)
                .bind(url)
                .fetch_one(&mut **tx)
                .await?;
            images.push(image);
        }
        Ok(images)
    }
}
