//! Axum handlers. Each one extracts and validates its input, calls the
//! matching service operation and wraps the outcome in the envelope.

pub mod departments;
pub mod employees;

use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use chrono::NaiveDate;

use crate::errors::ApiError;
use crate::messages;
use crate::photo::PhotoUpload;
use crate::services::employee::FormFields;

/// Multipart field carrying the photo file.
pub const PHOTO_FIELD: &str = "photo";

/// Reference date for date-of-birth checks and ages.
pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn multipart_error(err: &MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::validation_failed(vec![messages::FILE_TOO_LARGE.to_string()])
    } else {
        ApiError::bad_request(err.body_text())
    }
}

/// Splits a multipart form into its text fields and an optional photo.
/// A `photo` part without a filename or without content counts as absent.
pub(crate) async fn read_employee_form(
    mut multipart: Multipart,
) -> Result<(FormFields, Option<PhotoUpload>), ApiError> {
    let mut fields = FormFields::new();
    let mut photo = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == PHOTO_FIELD {
            let original_name = field.file_name().map(str::to_string);
            let bytes = field.bytes().await.map_err(|e| multipart_error(&e))?;
            match original_name {
                Some(original) if !original.is_empty() && !bytes.is_empty() => {
                    photo = Some(PhotoUpload::new(&original, bytes.to_vec())?);
                }
                _ => tracing::debug!("empty photo part ignored"),
            }
        } else {
            let value = field.text().await.map_err(|e| multipart_error(&e))?;
            fields.insert(name, value);
        }
    }

    Ok((fields, photo))
}
