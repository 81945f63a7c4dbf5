use axum::extract::Multipart;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// `multipart/form-data` body with a single `file` part.
#[derive(Debug, ToSchema)]
pub struct FileUpload {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

/// `multipart/form-data` body for product images.
#[derive(Debug, ToSchema)]
pub struct ImageUpload {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    /// Position among the product's images; appended last when omitted.
    pub order: Option<i32>,
}

impl ImageUpload {
    pub async fn from_multipart(mut multipart: Multipart) -> AppResult<Self> {
        let mut file = None;
        let mut order = None;
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?
        {
            match field.name() {
                Some("file") => {
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::bad_request(e.body_text()))?;
                    file = Some(bytes.to_vec());
                }
                Some("order") => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::bad_request(e.body_text()))?;
                    let text = text.trim();
                    if !text.is_empty() {
                        let value = text
                            .parse::<i32>()
                            .map_err(|_| AppError::bad_request("order must be an integer"))?;
                        order = Some(value);
                    }
                }
                _ => {}
            }
        }

        let file = file.ok_or_else(|| AppError::bad_request("missing file part"))?;
        Ok(Self { file, order })
    }
}

impl FileUpload {
    pub async fn from_multipart(multipart: Multipart) -> AppResult<Self> {
        let ImageUpload { file, .. } = ImageUpload::from_multipart(multipart).await?;
        Ok(Self { file })
    }
}
