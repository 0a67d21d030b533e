//! Friend relation endpoints of the current member.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::FRIEND_TAG;
use crate::api::dto::{ErrorResponse, FriendDto, FriendListQuery, FriendMemberDto, FriendRequest};
use crate::api::middleware::AuthUser;
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::validate::ValidatedJson;

/// Creates the friend routes, nested under `/members/me/friends`
///
/// # Routes
/// - `GET /` - List relations, optionally filtered
/// - `POST /` - Send a friend request
/// - `PATCH /{friendId}/accept` - Accept a received request
/// - `PATCH /{friendId}/reject` - Reject a received request
/// - `DELETE /{friendId}` - Remove an accepted friend
pub fn friend_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_friends, request_friend))
        .routes(routes!(accept_friend))
        .routes(routes!(reject_friend))
        .routes(routes!(remove_friend))
}

#[utoipa::path(
    get,
    path = "/",
    tag = FRIEND_TAG,
    params(FriendListQuery),
    responses(
        (status = 200, description = "Relations sorted by nickname", body = Vec<FriendDto>),
        (status = 400, description = "Unknown status filter", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn list_friends(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<FriendListQuery>,
) -> AppResult<Json<Vec<FriendDto>>> {
    let friends = state
        .services
        .friends
        .list(auth_user.member_id, query.status)
        .await?;
    Ok(Json(friends.into_iter().map(FriendDto::from).collect()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = FRIEND_TAG,
    request_body = FriendRequest,
    responses(
        (status = 201, description = "Request sent", body = FriendDto),
        (status = 400, description = "Self request or existing relation", body = ErrorResponse),
        (status = 404, description = "Unknown email", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn request_friend(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<FriendRequest>,
) -> AppResult<(StatusCode, Json<FriendDto>)> {
    let view = state
        .services
        .friends
        .request(auth_user.member_id, &payload.friend_email)
        .await?;
    Ok((StatusCode::CREATED, Json(view.into())))
}

#[utoipa::path(
    patch,
    path = "/{friendId}/accept",
    tag = FRIEND_TAG,
    params(("friendId" = i64, Path, description = "Friend relation id")),
    responses(
        (status = 200, description = "Request accepted", body = FriendDto),
        (status = 400, description = "Not pending", body = ErrorResponse),
        (status = 403, description = "Requester or not a party", body = ErrorResponse),
        (status = 404, description = "Unknown relation", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn accept_friend(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(friend_id): Path<i64>,
) -> AppResult<Json<FriendDto>> {
    let view = state
        .services
        .friends
        .accept(auth_user.member_id, friend_id)
        .await?;
    Ok(Json(view.into()))
}

#[utoipa::path(
    patch,
    path = "/{friendId}/reject",
    tag = FRIEND_TAG,
    params(("friendId" = i64, Path, description = "Friend relation id")),
    responses(
        (status = 200, description = "Request rejected", body = FriendDto),
        (status = 400, description = "Not pending", body = ErrorResponse),
        (status = 403, description = "Requester or not a party", body = ErrorResponse),
        (status = 404, description = "Unknown relation", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn reject_friend(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(friend_id): Path<i64>,
) -> AppResult<Json<FriendDto>> {
    let view = state
        .services
        .friends
        .reject(auth_user.member_id, friend_id)
        .await?;
    Ok(Json(view.into()))
}

#[utoipa::path(
    delete,
    path = "/{friendId}",
    tag = FRIEND_TAG,
    params(("friendId" = i64, Path, description = "Friend relation id")),
    responses(
        (status = 200, description = "The removed friend", body = FriendMemberDto),
        (status = 400, description = "Not friends", body = ErrorResponse),
        (status = 403, description = "Not a party", body = ErrorResponse),
        (status = 404, description = "Unknown relation", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn remove_friend(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(friend_id): Path<i64>,
) -> AppResult<Json<FriendMemberDto>> {
    let member = state
        .services
        .friends
        .remove(auth_user.member_id, friend_id)
        .await?;
    Ok(Json(member.into()))
}
