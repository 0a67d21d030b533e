//! Invitation link endpoints.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::CLUB_LINK_TAG;
use crate::api::dto::{
    ApplyResultResponse, ErrorResponse, InvitationLinkResponse, SimpleClubInfoResponse,
};
use crate::api::middleware::AuthUser;
use crate::error::AppResult;
use crate::models::ClubApplyResult;
use crate::state::AppState;

/// Link management routes, nested under `/clubs/{clubId}/members`
///
/// # Routes
/// - `POST /invitation-link` - Create or reuse the club's link
/// - `GET /invitation-link` - The club's current link
pub fn link_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(issue_link, current_link))
}

/// Public link routes, nested under `/clubs/invitations`
///
/// # Routes
/// - `GET /{token}` - Preview the club behind a link
pub fn public_invitation_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(preview_invitation))
}

/// Authenticated link routes, nested under `/clubs/invitations`
///
/// # Routes
/// - `POST /{token}/apply` - Apply to the club behind a link
pub fn invitation_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(apply_by_invitation))
}

#[utoipa::path(
    post,
    path = "/invitation-link",
    tag = CLUB_LINK_TAG,
    params(("clubId" = i64, Path, description = "Club id")),
    responses(
        (status = 200, description = "Valid invitation link", body = InvitationLinkResponse),
        (status = 403, description = "Not a manager or host", body = ErrorResponse),
        (status = 404, description = "Unknown club", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn issue_link(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(club_id): Path<i64>,
) -> AppResult<Json<InvitationLinkResponse>> {
    let link = state
        .services
        .club_links
        .issue(auth_user.member_id, club_id)
        .await?;
    Ok(Json(InvitationLinkResponse { link }))
}

#[utoipa::path(
    get,
    path = "/invitation-link",
    tag = CLUB_LINK_TAG,
    params(("clubId" = i64, Path, description = "Club id")),
    responses(
        (status = 200, description = "Current invitation link", body = InvitationLinkResponse),
        (status = 400, description = "No valid link", body = ErrorResponse),
        (status = 403, description = "Not a manager or host", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn current_link(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(club_id): Path<i64>,
) -> AppResult<Json<InvitationLinkResponse>> {
    let link = state
        .services
        .club_links
        .current(auth_user.member_id, club_id)
        .await?;
    Ok(Json(InvitationLinkResponse { link }))
}

#[utoipa::path(
    get,
    path = "/{token}",
    tag = CLUB_LINK_TAG,
    params(("token" = String, Path, description = "Invite code")),
    responses(
        (status = 200, description = "Club behind the link", body = SimpleClubInfoResponse),
        (status = 400, description = "Invalid or expired link", body = ErrorResponse)
    )
)]
async fn preview_invitation(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<SimpleClubInfoResponse>> {
    let info = state.services.club_links.preview(&token).await?;
    Ok(Json(info.into()))
}

/// Anything but `SUCCESS` is reported as a 400 carrying the result.
#[utoipa::path(
    post,
    path = "/{token}/apply",
    tag = CLUB_LINK_TAG,
    params(("token" = String, Path, description = "Invite code")),
    responses(
        (status = 200, description = "Application recorded", body = ApplyResultResponse),
        (status = 400, description = "Already related to the club, or unusable link", body = ApplyResultResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn apply_by_invitation(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(token): Path<String>,
) -> AppResult<(StatusCode, Json<ApplyResultResponse>)> {
    let result = state
        .services
        .club_links
        .apply(auth_user.member_id, &token)
        .await?;
    let status = match result {
        ClubApplyResult::Success => StatusCode::OK,
        _ => StatusCode::BAD_REQUEST,
    };
    Ok((status, Json(ApplyResultResponse { result })))
}
