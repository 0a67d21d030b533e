//! Authentication handlers for registration, login and token management.

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use super::{CookieHeader, set_cookie};
use crate::api::doc::AUTH_TAG;
use crate::api::dto::{
    AuthResponse, ErrorResponse, GuestAuthResponse, GuestRequest, LoginRequest, RefreshRequest,
    RegisterRequest, TokenResponse, VerifyPasswordRequest, VerifyPasswordResponse,
};
use crate::api::middleware::AuthUser;
use crate::error::AppResult;
use crate::services::{GuestSession, IssuedToken, MemberSession};
use crate::state::AppState;
use crate::utils::cookie::{build_access_cookie, clear_access_cookie};
use crate::utils::validate::ValidatedJson;

/// Creates the public authentication routes
///
/// # Routes
/// - `POST /register` - Register a member
/// - `POST /login` - Log in with email and password
/// - `POST /guest-register` - Register a guest of a club
/// - `POST /guest-login` - Log in as a guest of a club
/// - `POST /refresh` - Exchange an api key for a new access token
/// - `DELETE /logout` - Clear the access token cookie
pub fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(register))
        .routes(routes!(login))
        .routes(routes!(guest_register))
        .routes(routes!(guest_login))
        .routes(routes!(refresh))
        .routes(routes!(logout))
}

/// Authentication routes that need a logged in member
pub fn protected_auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(verify_password))
}

fn cookie_for(state: &AppState, token: &IssuedToken) -> AppResult<CookieHeader> {
    set_cookie(build_access_cookie(
        &token.access_token,
        token.max_age,
        state.jwt_config.cookie_secure,
    ))
}

fn member_session(
    state: &AppState,
    status: StatusCode,
    session: MemberSession,
) -> AppResult<(StatusCode, CookieHeader, Json<AuthResponse>)> {
    let cookie = cookie_for(state, &session.token)?;
    let body = AuthResponse {
        api_key: session.member.api_key,
        access_token: session.token.access_token,
    };
    Ok((status, cookie, Json(body)))
}

fn guest_session(
    state: &AppState,
    status: StatusCode,
    session: GuestSession,
) -> AppResult<(StatusCode, CookieHeader, Json<GuestAuthResponse>)> {
    let cookie = cookie_for(state, &session.token)?;
    let body = GuestAuthResponse {
        nickname: session.member.nickname,
        access_token: session.token.access_token,
        club_id: session.club_id,
    };
    Ok((status, cookie, Json(body)))
}

/// POST /api/v1/members/auth/register - Register a member
#[utoipa::path(
    post,
    path = "/register",
    tag = AUTH_TAG,
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Member registered", body = AuthResponse),
        (status = 400, description = "Invalid input or email already in use", body = ErrorResponse)
    )
)]
async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    let session = state.services.members.register(payload.into()).await?;
    member_session(&state, StatusCode::CREATED, session)
}

/// POST /api/v1/members/auth/login - Authenticate a member
#[utoipa::path(
    post,
    path = "/login",
    tag = AUTH_TAG,
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Unknown email or wrong password", body = ErrorResponse)
    )
)]
async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let session = state
        .services
        .members
        .login(&payload.email, &payload.password)
        .await?;
    member_session(&state, StatusCode::OK, session)
}

/// POST /api/v1/members/auth/guest-register - Register a guest of a club
#[utoipa::path(
    post,
    path = "/guest-register",
    tag = AUTH_TAG,
    request_body = GuestRequest,
    responses(
        (status = 201, description = "Guest registered", body = GuestAuthResponse),
        (status = 400, description = "Unknown club or nickname taken", body = ErrorResponse)
    )
)]
async fn guest_register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<GuestRequest>,
) -> AppResult<impl IntoResponse> {
    let session = state
        .services
        .members
        .guest_register(payload.nickname, &payload.password, payload.club_id)
        .await?;
    guest_session(&state, StatusCode::CREATED, session)
}

/// POST /api/v1/members/auth/guest-login - Authenticate a guest
#[utoipa::path(
    post,
    path = "/guest-login",
    tag = AUTH_TAG,
    request_body = GuestRequest,
    responses(
        (status = 200, description = "Login successful", body = GuestAuthResponse),
        (status = 400, description = "Guest not found", body = ErrorResponse)
    )
)]
async fn guest_login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<GuestRequest>,
) -> AppResult<impl IntoResponse> {
    let session = state
        .services
        .members
        .guest_login(&payload.nickname, &payload.password, payload.club_id)
        .await?;
    guest_session(&state, StatusCode::OK, session)
}

/// POST /api/v1/members/auth/refresh - Issue a new access token
///
/// The member's api key acts as the refresh token.
#[utoipa::path(
    post,
    path = "/refresh",
    tag = AUTH_TAG,
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Token refreshed", body = TokenResponse),
        (status = 400, description = "Unknown refresh token", body = ErrorResponse),
        (status = 401, description = "Missing refresh token", body = ErrorResponse)
    )
)]
async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> AppResult<impl IntoResponse> {
    let token = state.services.members.refresh(&payload.refresh_token).await?;
    let cookie = cookie_for(&state, &token)?;
    Ok((
        cookie,
        Json(TokenResponse {
            access_token: token.access_token,
        }),
    ))
}

/// DELETE /api/v1/members/auth/logout - Clear the access token cookie
#[utoipa::path(
    delete,
    path = "/logout",
    tag = AUTH_TAG,
    responses(
        (status = 200, description = "Cookie cleared")
    )
)]
async fn logout(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let cookie = set_cookie(clear_access_cookie(state.jwt_config.cookie_secure))?;
    Ok((StatusCode::OK, cookie))
}

/// POST /api/v1/members/auth/verify-password - Check the caller's password
#[utoipa::path(
    post,
    path = "/verify-password",
    tag = AUTH_TAG,
    request_body = VerifyPasswordRequest,
    responses(
        (status = 200, description = "Verification result", body = VerifyPasswordResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn verify_password(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<VerifyPasswordRequest>,
) -> AppResult<Json<VerifyPasswordResponse>> {
    let member = state.services.members.get(auth_user.member_id).await?;
    let is_valid = state
        .services
        .members
        .verify_password(&member, &payload.password)?;
    Ok(Json(VerifyPasswordResponse { is_valid }))
}
