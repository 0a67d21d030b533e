//! The current member's own club memberships.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::MY_CLUB_TAG;
use crate::api::dto::{
    ClubListItem, ErrorResponse, MyClubListResponse, MyClubResponse, MyInfoInClub,
};
use crate::api::middleware::AuthUser;
use crate::error::AppResult;
use crate::state::AppState;

/// Creates the my-club routes, nested under `/my-clubs`
///
/// # Routes
/// - `GET /` - Clubs the member belongs to
/// - `GET /{clubId}` - Own membership in a club
/// - `PATCH /{clubId}/join` - Accept an invitation
/// - `DELETE /{clubId}/invitation` - Reject an invitation
/// - `POST /{clubId}/apply` - Apply to a public club
/// - `DELETE /{clubId}/apply` - Cancel an application
/// - `DELETE /{clubId}/withdraw` - Leave a club
pub fn my_club_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_my_clubs))
        .routes(routes!(get_my_club))
        .routes(routes!(accept_invitation))
        .routes(routes!(reject_invitation))
        .routes(routes!(apply, cancel_application))
        .routes(routes!(withdraw))
}

#[utoipa::path(
    get,
    path = "/",
    tag = MY_CLUB_TAG,
    responses(
        (status = 200, description = "Active clubs of the member", body = MyClubListResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn list_my_clubs(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<MyClubListResponse>> {
    let clubs = state.services.my_clubs.list(auth_user.member_id).await?;
    Ok(Json(MyClubListResponse {
        clubs: clubs.into_iter().map(ClubListItem::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/{clubId}",
    tag = MY_CLUB_TAG,
    params(("clubId" = i64, Path, description = "Club id")),
    responses(
        (status = 200, description = "Own membership", body = MyInfoInClub),
        (status = 404, description = "No membership in the club", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn get_my_club(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(club_id): Path<i64>,
) -> AppResult<Json<MyInfoInClub>> {
    let my_club = state
        .services
        .my_clubs
        .get(auth_user.member_id, club_id)
        .await?;
    Ok(Json(my_club.into()))
}

#[utoipa::path(
    patch,
    path = "/{clubId}/join",
    tag = MY_CLUB_TAG,
    params(("clubId" = i64, Path, description = "Club id")),
    responses(
        (status = 200, description = "Invitation accepted", body = MyClubResponse),
        (status = 400, description = "Already joined or not invited", body = ErrorResponse),
        (status = 404, description = "No membership in the club", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn accept_invitation(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(club_id): Path<i64>,
) -> AppResult<Json<MyClubResponse>> {
    let club = state
        .services
        .my_clubs
        .accept_invitation(auth_user.member_id, club_id)
        .await?;
    Ok(Json(club.into()))
}

#[utoipa::path(
    delete,
    path = "/{clubId}/invitation",
    tag = MY_CLUB_TAG,
    params(("clubId" = i64, Path, description = "Club id")),
    responses(
        (status = 200, description = "Invitation rejected", body = MyClubResponse),
        (status = 400, description = "Already joined or not invited", body = ErrorResponse),
        (status = 404, description = "No membership in the club", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn reject_invitation(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(club_id): Path<i64>,
) -> AppResult<Json<MyClubResponse>> {
    let club = state
        .services
        .my_clubs
        .reject_invitation(auth_user.member_id, club_id)
        .await?;
    Ok(Json(club.into()))
}

#[utoipa::path(
    post,
    path = "/{clubId}/apply",
    tag = MY_CLUB_TAG,
    params(("clubId" = i64, Path, description = "Club id")),
    responses(
        (status = 200, description = "Application sent", body = MyClubResponse),
        (status = 400, description = "Existing membership or recruiting closed", body = ErrorResponse),
        (status = 403, description = "Private club", body = ErrorResponse),
        (status = 404, description = "Unknown club", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn apply(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(club_id): Path<i64>,
) -> AppResult<Json<MyClubResponse>> {
    let club = state
        .services
        .my_clubs
        .apply(auth_user.member_id, club_id)
        .await?;
    Ok(Json(club.into()))
}

#[utoipa::path(
    delete,
    path = "/{clubId}/apply",
    tag = MY_CLUB_TAG,
    params(("clubId" = i64, Path, description = "Club id")),
    responses(
        (status = 200, description = "Application cancelled", body = MyClubResponse),
        (status = 400, description = "Not applying", body = ErrorResponse),
        (status = 404, description = "No membership in the club", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn cancel_application(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(club_id): Path<i64>,
) -> AppResult<Json<MyClubResponse>> {
    let club = state
        .services
        .my_clubs
        .cancel_application(auth_user.member_id, club_id)
        .await?;
    Ok(Json(club.into()))
}

#[utoipa::path(
    delete,
    path = "/{clubId}/withdraw",
    tag = MY_CLUB_TAG,
    params(("clubId" = i64, Path, description = "Club id")),
    responses(
        (status = 200, description = "Left the club", body = MyClubResponse),
        (status = 400, description = "The host cannot withdraw", body = ErrorResponse),
        (status = 404, description = "No membership in the club", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn withdraw(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(club_id): Path<i64>,
) -> AppResult<Json<MyClubResponse>> {
    let club = state
        .services
        .my_clubs
        .withdraw(auth_user.member_id, club_id)
        .await?;
    Ok(Json(club.into()))
}
