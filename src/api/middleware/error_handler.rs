//! Error handling for the HTTP layer.
//!
//! `AppError` renders as a JSON `ErrorResponse`; the global handler attaches the
//! request id and turns bare framework errors (unknown route, wrong method, body
//! limit) into the same shape.

use axum::{
    Json,
    body::Body,
    extract::Request,
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::RequestId;
use crate::api::dto::ErrorResponse;
use crate::error::AppError;

/// HTTP status and machine readable code of an error.
pub fn error_status(error: &AppError) -> (StatusCode, &'static str) {
    match error {
        AppError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        AppError::Duplicate { .. } => (StatusCode::CONFLICT, "DUPLICATE"),
        AppError::Conflict { .. } => (StatusCode::CONFLICT, "CONFLICT"),
        AppError::Validation { .. } | AppError::ValidationErrors { .. } => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
        }
        AppError::BadRequest { .. } => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
        AppError::Unauthorized { .. } => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
        AppError::Forbidden { .. } => (StatusCode::FORBIDDEN, "FORBIDDEN"),
        AppError::PayloadTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
        AppError::Database { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
        AppError::Storage { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
        AppError::Configuration { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR")
        }
        AppError::ConnectionPool { .. } => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
        AppError::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    }
}

/// Client facing body of an error. Server side causes are never rendered.
pub fn error_body(error: &AppError) -> ErrorResponse {
    let (_, code) = error_status(error);
    match error {
        AppError::NotFound { entity, field, value } => {
            ErrorResponse::new(code, format!("{entity} not found"))
                .with_details(json!({ "field": field, "value": value }))
        }
        AppError::Duplicate { entity, field, value } => {
            ErrorResponse::new(code, format!("{entity} with this {field} already exists"))
                .with_details(json!({ "field": field, "value": value }))
        }
        AppError::Validation { field, reason } => {
            ErrorResponse::new(code, format!("{field}: {reason}"))
                .with_details(json!({ "field": field }))
        }
        AppError::ValidationErrors { errors } => {
            let messages: Vec<String> = errors.iter().map(|e| e.summary()).collect();
            ErrorResponse::new(code, messages.join(", ")).with_details(json!(messages))
        }
        AppError::BadRequest { message }
        | AppError::Unauthorized { message }
        | AppError::Forbidden { message }
        | AppError::Conflict { message }
        | AppError::PayloadTooLarge { message } => ErrorResponse::new(code, message.clone()),
        AppError::ConnectionPool { .. } => {
            ErrorResponse::new(code, "Database connection unavailable")
        }
        AppError::Database { .. }
        | AppError::Storage { .. }
        | AppError::Configuration { .. }
        | AppError::Internal { .. } => ErrorResponse::new(code, "An internal error occurred"),
    }
}

impl IntoResponse for AppError {
    /// Converts an AppError into a JSON error response.
    ///
    /// The body is also stored in the response extensions so that
    /// `global_error_handler` can stamp the request id on it.
    fn into_response(self) -> Response {
        let (status, _) = error_status(&self);
        if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let body = error_body(&self);
        let mut response = (status, Json(body.clone())).into_response();
        response.extensions_mut().insert(body);
        response
    }
}

/// Bare framework error bodies are short plain text; anything longer is cut off.
const MAX_PLAIN_ERROR_BODY: usize = 16 * 1024;

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"))
}

fn status_code_name(status: StatusCode) -> &'static str {
    match status {
        StatusCode::NOT_FOUND => "NOT_FOUND",
        StatusCode::METHOD_NOT_ALLOWED => "METHOD_NOT_ALLOWED",
        StatusCode::PAYLOAD_TOO_LARGE => "PAYLOAD_TOO_LARGE",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "UNSUPPORTED_MEDIA_TYPE",
        StatusCode::UNAUTHORIZED => "UNAUTHORIZED",
        StatusCode::FORBIDDEN => "FORBIDDEN",
        StatusCode::REQUEST_TIMEOUT => "REQUEST_TIMEOUT",
        s if s.is_server_error() => "INTERNAL_ERROR",
        _ => "BAD_REQUEST",
    }
}

/// Wraps a plain text rejection (bad query string, unknown route, ...) into an `ErrorResponse`.
async fn plain_error_body(status: StatusCode, body: Body) -> ErrorResponse {
    let text = axum::body::to_bytes(body, MAX_PLAIN_ERROR_BODY)
        .await
        .ok()
        .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string())
        .filter(|text| !text.is_empty() && !status.is_server_error());
    let message = text.unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    });
    ErrorResponse::new(status_code_name(status), message)
}

/// Global error handling middleware.
///
/// Must run inside `request_id_middleware` so the request id is available.
/// JSON error bodies produced elsewhere (e.g. apply results) pass through untouched.
pub async fn global_error_handler(request: Request, next: Next) -> Response {
    let request_id = request.extensions().get::<RequestId>().map(|r| r.0.clone());
    let mut response = next.run(request).await;

    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let rendered = response.extensions_mut().remove::<ErrorResponse>();
    if rendered.is_none() && is_json(&response) {
        return response;
    }

    let (parts, body) = response.into_parts();
    let body = match rendered {
        Some(body) => body,
        None => plain_error_body(status, body).await,
    };
    let body = match request_id {
        Some(id) => body.with_request_id(&id),
        None => body,
    };

    let mut rebuilt = (status, Json(body)).into_response();
    for (name, value) in &parts.headers {
        if name != header::CONTENT_TYPE && name != header::CONTENT_LENGTH {
            rebuilt.headers_mut().append(name.clone(), value.clone());
        }
    }
    rebuilt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationFieldError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::not_found("club", "id", 1), StatusCode::NOT_FOUND),
            (AppError::conflict("exists"), StatusCode::CONFLICT),
            (AppError::bad_request("bad"), StatusCode::BAD_REQUEST),
            (AppError::unauthorized("who"), StatusCode::UNAUTHORIZED),
            (AppError::forbidden("no"), StatusCode::FORBIDDEN),
            (
                AppError::PayloadTooLarge {
                    message: "big".to_string(),
                },
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (
                AppError::Internal {
                    source: anyhow::anyhow!("boom"),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(error_status(&error).0, expected);
        }
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let error = AppError::Internal {
            source: anyhow::anyhow!("password=hunter2"),
        };
        let body = error_body(&error);
        assert_eq!(body.message, "An internal error occurred");
        assert!(body.details.is_none());
    }

    #[test]
    fn test_validation_messages() {
        let error = AppError::ValidationErrors {
            errors: vec![
                ValidationFieldError {
                    field: "email".to_string(),
                    code: "email".to_string(),
                    message: "invalid email".to_string(),
                },
                ValidationFieldError {
                    field: "nickname".to_string(),
                    code: "length".to_string(),
                    message: "too long".to_string(),
                },
            ],
        };
        let body = error_body(&error);
        assert_eq!(body.code, "VALIDATION_ERROR");
        assert_eq!(
            body.message,
            "email-email-invalid email, nickname-length-too long"
        );
    }

    #[test]
    fn test_into_response_keeps_body_in_extensions() {
        let response = AppError::forbidden("not the host").into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = response.extensions().get::<ErrorResponse>().unwrap();
        assert_eq!(body.message, "not the host");
    }

    #[tokio::test]
    async fn test_plain_rejection_text_is_kept() {
        let body = plain_error_body(
            StatusCode::BAD_REQUEST,
            Body::from("Failed to deserialize query string: Unknown FriendStatusFilter: BEST"),
        )
        .await;
        assert_eq!(body.code, "BAD_REQUEST");
        assert!(body.message.contains("Unknown FriendStatusFilter: BEST"));
    }
}
