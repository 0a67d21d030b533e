//! Club membership endpoints, as seen by the club's host and managers.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::CLUB_MEMBER_TAG;
use crate::api::dto::{
    ChangeRoleRequest, ClubMemberInfo, ClubMemberStateQuery, ClubMembersResponse, ErrorResponse,
    InviteMembersRequest,
};
use crate::api::middleware::AuthUser;
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::validate::ValidatedJson;

/// Creates the club member routes, nested under `/clubs/{clubId}/members`
///
/// # Routes
/// - `POST /` - Invite members by email (host)
/// - `GET /` - List members (club member)
/// - `DELETE /{memberId}` - Withdraw a member (host or self)
/// - `PUT /{memberId}/role` - Change a member's role (host)
/// - `PATCH /{memberId}/approval` - Approve an application (manager or host)
/// - `DELETE /{memberId}/approval` - Reject an application (manager or host)
pub fn club_member_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(invite_members, list_members))
        .routes(routes!(withdraw_member))
        .routes(routes!(change_role))
        .routes(routes!(approve_application, reject_application))
}

#[utoipa::path(
    post,
    path = "/",
    tag = CLUB_MEMBER_TAG,
    params(("clubId" = i64, Path, description = "Club id")),
    request_body = InviteMembersRequest,
    responses(
        (status = 201, description = "Members invited"),
        (status = 400, description = "HOST role, capacity exceeded or invalid email", body = ErrorResponse),
        (status = 403, description = "Not the host", body = ErrorResponse),
        (status = 404, description = "Unknown club or email", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn invite_members(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(club_id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<InviteMembersRequest>,
) -> AppResult<StatusCode> {
    let invitations = payload
        .members
        .into_iter()
        .map(|m| (m.email, m.role))
        .collect();
    state
        .services
        .club_members
        .invite(auth_user.member_id, club_id, invitations)
        .await?;
    Ok(StatusCode::CREATED)
}

#[utoipa::path(
    get,
    path = "/",
    tag = CLUB_MEMBER_TAG,
    params(("clubId" = i64, Path, description = "Club id"), ClubMemberStateQuery),
    responses(
        (status = 200, description = "Club members", body = ClubMembersResponse),
        (status = 400, description = "Unknown state filter", body = ErrorResponse),
        (status = 403, description = "Not a member of the club", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn list_members(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(club_id): Path<i64>,
    Query(query): Query<ClubMemberStateQuery>,
) -> AppResult<Json<ClubMembersResponse>> {
    let views = state
        .services
        .club_members
        .list(auth_user.member_id, club_id, query.state)
        .await?;
    Ok(Json(ClubMembersResponse {
        members: views.into_iter().map(ClubMemberInfo::from).collect(),
    }))
}

#[utoipa::path(
    delete,
    path = "/{memberId}",
    tag = CLUB_MEMBER_TAG,
    params(
        ("clubId" = i64, Path, description = "Club id"),
        ("memberId" = i64, Path, description = "Member id")
    ),
    responses(
        (status = 200, description = "Member withdrawn"),
        (status = 400, description = "The host cannot withdraw", body = ErrorResponse),
        (status = 403, description = "Neither the host nor the member", body = ErrorResponse),
        (status = 404, description = "Not a member of the club", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn withdraw_member(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path((club_id, member_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    state
        .services
        .club_members
        .withdraw(auth_user.member_id, club_id, member_id)
        .await?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    put,
    path = "/{memberId}/role",
    tag = CLUB_MEMBER_TAG,
    params(
        ("clubId" = i64, Path, description = "Club id"),
        ("memberId" = i64, Path, description = "Member id")
    ),
    request_body = ChangeRoleRequest,
    responses(
        (status = 200, description = "Role changed"),
        (status = 400, description = "Own role or HOST requested", body = ErrorResponse),
        (status = 403, description = "Not the host", body = ErrorResponse),
        (status = 404, description = "Not a member of the club", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn change_role(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path((club_id, member_id)): Path<(i64, i64)>,
    Json(payload): Json<ChangeRoleRequest>,
) -> AppResult<StatusCode> {
    state
        .services
        .club_members
        .change_role(auth_user.member_id, club_id, member_id, payload.role)
        .await?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    patch,
    path = "/{memberId}/approval",
    tag = CLUB_MEMBER_TAG,
    params(
        ("clubId" = i64, Path, description = "Club id"),
        ("memberId" = i64, Path, description = "Member id")
    ),
    responses(
        (status = 200, description = "Application approved"),
        (status = 400, description = "Not applying", body = ErrorResponse),
        (status = 403, description = "Not a manager or host", body = ErrorResponse),
        (status = 404, description = "Not a member of the club", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn approve_application(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path((club_id, member_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    state
        .services
        .club_members
        .approve(auth_user.member_id, club_id, member_id)
        .await?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    delete,
    path = "/{memberId}/approval",
    tag = CLUB_MEMBER_TAG,
    params(
        ("clubId" = i64, Path, description = "Club id"),
        ("memberId" = i64, Path, description = "Member id")
    ),
    responses(
        (status = 200, description = "Application rejected"),
        (status = 400, description = "Not applying", body = ErrorResponse),
        (status = 403, description = "Not a manager or host", body = ErrorResponse),
        (status = 404, description = "Not a member of the club", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn reject_application(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path((club_id, member_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    state
        .services
        .club_members
        .reject(auth_user.member_id, club_id, member_id)
        .await?;
    Ok(StatusCode::OK)
}
