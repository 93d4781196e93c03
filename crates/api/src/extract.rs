//! Multipart form extraction for product requests.
//!
//! Product create/update requests are `multipart/form-data`: text parts for
//! the product fields plus zero or more `files` parts. Field names are matched
//! case-insensitively. Unknown parts are ignored.

use axum::extract::{FromRequest, Multipart, Request};
use storefront_core::image_store::UploadedImage;
use storefront_core::product::ProductFields;

use crate::error::AppError;

/// A product form, fully buffered.
#[derive(Debug, Default)]
pub struct ProductForm {
    pub fields: ProductFields,
    /// Raw `idsToDelete` value (update only).
    pub ids_to_delete: Option<String>,
    /// `None` when the form carried no `files` part at all.
    ///
    /// A `files` part without a file name or content marks the list as present
    /// but adds nothing to it, which is what browsers send for an empty file
    /// input.
    pub files: Option<Vec<UploadedImage>>,
}

impl<S> FromRequest<S> for ProductForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        let mut form = ProductForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or("").to_ascii_lowercase();
            match name.as_str() {
                "files" => {
                    let file_name = field
                        .file_name()
                        .filter(|n| !n.is_empty())
                        .map(str::to_string);
                    let content_type = field.content_type().map(str::to_string);
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;

                    let files = form.files.get_or_insert_with(Vec::new);
                    if file_name.is_some() || !data.is_empty() {
                        files.push(UploadedImage {
                            file_name,
                            content_type,
                            data: data.to_vec(),
                        });
                    }
                }
                "name" | "price" | "quantity" | "idstodelete" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    match name.as_str() {
                        "name" => form.fields.name = Some(text),
                        "price" => form.fields.price = Some(text),
                        "quantity" => form.fields.quantity = Some(text),
                        _ => form.ids_to_delete = Some(text),
                    }
                }
                _ => {} // ignore unknown fields
            }
        }

        Ok(form)
    }
}
