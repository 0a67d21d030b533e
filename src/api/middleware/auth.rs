//! Access token authentication middleware.
//!
//! The token is read from `Authorization: Bearer <jwt>` first and from the
//! `accessToken` cookie otherwise. A valid token must still point at an
//! existing member.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

use crate::error::{AppError, AppResult};
use crate::models::{Member, MemberType};
use crate::state::AppState;
use crate::utils::cookie::{ACCESS_TOKEN_COOKIE, get_cookie};
use crate::utils::jwt::validate_access_token;

/// Extension type for the authenticated member.
///
/// Added to request extensions after successful authentication and
/// extracted in handlers using `Extension<AuthUser>`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub member_id: i64,
    pub nickname: String,
    pub tag: String,
    pub member_type: MemberType,
}

impl From<&Member> for AuthUser {
    fn from(member: &Member) -> Self {
        Self {
            member_id: member.id,
            nickname: member.nickname.clone(),
            tag: member.tag.clone(),
            member_type: member.member_type,
        }
    }
}

/// Pulls the raw token out of the request headers.
///
/// A present Authorization header that is not a bearer token is an error
/// rather than a fall back to the cookie.
fn extract_token(headers: &HeaderMap) -> AppResult<Option<String>> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        let token = value
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::unauthorized("invalid authorization header"))?;
        return Ok(Some(token.to_string()));
    }

    Ok(headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| get_cookie(cookies, ACCESS_TOKEN_COOKIE))
        .filter(|t| !t.is_empty()))
}

/// Resolves the caller, `None` when the request carries no token at all.
async fn authenticate(state: &AppState, headers: &HeaderMap) -> AppResult<Option<AuthUser>> {
    let Some(token) = extract_token(headers)? else {
        return Ok(None);
    };

    let claims = validate_access_token(&token, &state.jwt_config.secret)?;
    let member_id = claims.member_id()?;
    let member = match state.services.members.get(member_id).await {
        Ok(member) => member,
        Err(AppError::NotFound { .. }) => {
            return Err(AppError::unauthorized("invalid access token"));
        }
        Err(e) => return Err(e),
    };

    Ok(Some(AuthUser::from(&member)))
}

/// Authentication middleware for protected routes.
///
/// # Errors
/// Returns 401 Unauthorized if:
/// - no token is present (`login required`)
/// - the Authorization header is not a bearer token
/// - token validation fails or the token has expired
/// - the member behind the token no longer exists
///
/// # Example
/// ```ignore
/// OpenApiRouter::new()
///     .routes(routes!(handler))
///     .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
/// ```
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_user = authenticate(&state, request.headers())
        .await?
        .ok_or_else(|| AppError::unauthorized("login required"))?;

    tracing::debug!(member_id = auth_user.member_id, "Request authenticated");
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Optional authentication middleware.
///
/// Adds the member to extensions when a valid token is present and
/// continues anonymously otherwise.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&state, request.headers()).await {
        Ok(Some(auth_user)) => {
            request.extensions_mut().insert(auth_user);
        }
        Ok(None) => {}
        Err(e) => tracing::debug!(error = %e, "Ignoring unusable credentials"),
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_bearer_token_is_preferred() {
        let map = headers(&[
            (header::AUTHORIZATION, "Bearer abc"),
            (header::COOKIE, "accessToken=cookie"),
        ]);
        assert_eq!(extract_token(&map).unwrap(), Some("abc".to_string()));
    }

    #[test]
    fn test_cookie_fallback() {
        let map = headers(&[(header::COOKIE, "theme=dark; accessToken=xyz")]);
        assert_eq!(extract_token(&map).unwrap(), Some("xyz".to_string()));
    }

    #[test]
    fn test_malformed_header_is_rejected() {
        let map = headers(&[
            (header::AUTHORIZATION, "Basic dXNlcjpwYXNz"),
            (header::COOKIE, "accessToken=xyz"),
        ]);
        assert!(matches!(
            extract_token(&map),
            Err(AppError::Unauthorized { .. })
        ));
    }

    #[test]
    fn test_no_credentials() {
        assert_eq!(extract_token(&HeaderMap::new()).unwrap(), None);
    }
}
