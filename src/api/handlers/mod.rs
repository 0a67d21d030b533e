//! HTTP request handlers for API endpoints.
//!
//! This module contains all request handlers organized by resource type,
//! plus the multipart and cookie plumbing several of them share.

pub mod auth;
pub mod checklists;
pub mod club_links;
pub mod club_members;
pub mod clubs;
pub mod friends;
pub mod health;
pub mod members;
pub mod my_clubs;
pub mod presets;
pub mod schedules;

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use axum::http::{HeaderValue, StatusCode, header};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::ImageUpload;
use crate::utils::validate::parse_validated;

/// Name of the JSON part in multipart requests
pub const DATA_PART: &str = "data";

fn multipart_error(error: MultipartError) -> AppError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge {
            message: error.body_text(),
        }
    } else {
        AppError::bad_request(error.body_text())
    }
}

/// A multipart request made of a JSON `data` part and an optional file part.
pub struct MultipartForm<T> {
    pub data: Option<T>,
    pub file: Option<ImageUpload>,
}

impl<T> MultipartForm<T> {
    pub fn require_data(self) -> AppResult<(T, Option<ImageUpload>)> {
        let data = self
            .data
            .ok_or_else(|| AppError::bad_request("missing 'data' part"))?;
        Ok((data, self.file))
    }
}

/// Reads `data` (validated JSON) and the file part called `file_part`.
///
/// Unknown parts are drained and ignored; an empty file part counts as absent.
pub async fn read_multipart<T>(
    mut multipart: Multipart,
    file_part: &str,
    max_file_bytes: usize,
) -> AppResult<MultipartForm<T>>
where
    T: DeserializeOwned + Validate,
{
    let mut form = MultipartForm {
        data: None,
        file: None,
    };

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == DATA_PART {
            let bytes = field.bytes().await.map_err(multipart_error)?;
            form.data = Some(parse_validated(&bytes)?);
        } else if name == file_part {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field.bytes().await.map_err(multipart_error)?;
            if bytes.is_empty() {
                continue;
            }
            let upload = ImageUpload {
                bytes: bytes.to_vec(),
                content_type,
            };
            upload.ensure_image(max_file_bytes)?;
            form.file = Some(upload);
        } else {
            tracing::debug!(part = %name, "Ignoring unexpected multipart part");
        }
    }

    Ok(form)
}

/// `Set-Cookie` header pair usable in a response tuple.
pub type CookieHeader = [(header::HeaderName, HeaderValue); 1];

pub fn set_cookie(value: String) -> AppResult<CookieHeader> {
    let value = HeaderValue::from_str(&value).map_err(|e| AppError::Internal {
        source: anyhow::anyhow!("Invalid cookie value: {e}"),
    })?;
    Ok([(header::SET_COOKIE, value)])
}
