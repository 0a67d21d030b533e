use crate::error::{AppError, AppResult};
use axum::Json;
use axum::extract::{FromRequest, Request, rejection::JsonRejection};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON body extractor that runs `validator` rules before the handler sees the value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> AppResult<Self> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// Parses and validates a JSON document outside of an extractor, e.g. the `data`
/// part of a multipart request.
pub fn parse_validated<T>(bytes: &[u8]) -> AppResult<T>
where
    T: DeserializeOwned + Validate,
{
    let value: T = serde_json::from_slice(bytes)
        .map_err(|e| AppError::bad_request(format!("Invalid JSON payload: {e}")))?;
    value.validate()?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, header};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Signup {
        #[validate(length(min = 3, max = 20, message = "nickname must be 3-20 characters"))]
        nickname: String,
        #[validate(email(message = "invalid email"))]
        email: String,
    }

    fn json_request(body: &str) -> Request {
        Request::builder()
            .method(Method::POST)
            .uri("/test")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body() {
        let request = json_request(r#"{"nickname":"hana","email":"hana@example.com"}"#);
        let ValidatedJson(body) = ValidatedJson::<Signup>::from_request(request, &())
            .await
            .unwrap();
        assert_eq!(body.nickname, "hana");
        assert_eq!(body.email, "hana@example.com");
    }

    #[tokio::test]
    async fn test_every_failing_field_is_reported() {
        let request = json_request(r#"{"nickname":"ab","email":"nope"}"#);
        match ValidatedJson::<Signup>::from_request(request, &()).await {
            Err(AppError::ValidationErrors { errors }) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["email", "nickname"]);
                assert_eq!(errors[1].message, "nickname must be 3-20 characters");
            }
            other => panic!("Expected ValidationErrors, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let request = json_request("{not json");
        assert!(matches!(
            ValidatedJson::<Signup>::from_request(request, &()).await,
            Err(AppError::BadRequest { .. })
        ));
    }

    #[test]
    fn test_parse_validated() {
        let parsed: Signup = parse_validated(br#"{"nickname":"hana","email":"h@x.io"}"#).unwrap();
        assert_eq!(parsed.nickname, "hana");
        assert!(parse_validated::<Signup>(br#"{"nickname":"h","email":"h@x.io"}"#).is_err());
        assert!(parse_validated::<Signup>(b"[]").is_err());
    }
}
