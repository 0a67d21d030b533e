//! Club endpoints.

use axum::{
    Extension, Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use validator::Validate;

use super::read_multipart;
use crate::api::doc::CLUB_TAG;
use crate::api::dto::{
    ClubCreatedResponse, ClubInfoResponse, ClubSearchQuery, CreateClubRequest, ErrorResponse,
    PagedResponse, PaginationParams, SimpleClubInfoWithoutLeader, UpdateClubRequest,
};
use crate::api::middleware::AuthUser;
use crate::error::AppResult;
use crate::models::ClubSearch;
use crate::services::MAX_CLUB_IMAGE_BYTES;
use crate::state::AppState;

/// Name of the file part carrying a club image
const IMAGE_PART: &str = "image";

/// Multipart layout of club creation.
#[derive(ToSchema)]
#[allow(dead_code)]
struct CreateClubForm {
    data: CreateClubRequest,
    /// image/*, at most 5 MB
    #[schema(value_type = Option<String>, format = Binary)]
    image: Option<Vec<u8>>,
}

/// Multipart layout of a club update.
#[derive(ToSchema)]
#[allow(dead_code)]
struct UpdateClubForm {
    data: Option<UpdateClubRequest>,
    /// image/*, at most 5 MB
    #[schema(value_type = Option<String>, format = Binary)]
    image: Option<Vec<u8>>,
}

/// Routes reachable without logging in
///
/// # Routes
/// - `GET /public` - Search public clubs
pub fn public_club_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(search_public_clubs))
}

/// Routes behind optional authentication
///
/// # Routes
/// - `GET /{clubId}` - Club details; private clubs only for joined members
pub fn optional_club_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(get_club))
}

/// Routes that require authentication
///
/// # Routes
/// - `POST /` - Create a club
/// - `PATCH /{clubId}` - Update a club (host)
/// - `DELETE /{clubId}` - Soft delete a club (host)
pub fn club_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(create_club))
        .routes(routes!(update_club, delete_club))
}

/// POST /api/v1/clubs - Create a club
///
/// The creator becomes the HOST; `clubMembers` are invited with their roles.
#[utoipa::path(
    post,
    path = "/",
    tag = CLUB_TAG,
    request_body(content = CreateClubForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Club created", body = ClubCreatedResponse),
        (status = 400, description = "Invalid input, dates or capacity", body = ErrorResponse),
        (status = 404, description = "Unknown invited member", body = ErrorResponse),
        (status = 413, description = "Image too large", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn create_club(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ClubCreatedResponse>)> {
    let (data, image) =
        read_multipart::<CreateClubRequest>(multipart, IMAGE_PART, MAX_CLUB_IMAGE_BYTES)
            .await?
            .require_data()?;

    let club = state
        .services
        .clubs
        .create(auth_user.member_id, data.into(), image)
        .await?;
    Ok((StatusCode::CREATED, Json(club.into())))
}

/// PATCH /api/v1/clubs/{clubId} - Partially update a club
#[utoipa::path(
    patch,
    path = "/{clubId}",
    tag = CLUB_TAG,
    params(("clubId" = i64, Path, description = "Club id")),
    request_body(content = UpdateClubForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Updated club", body = ClubInfoResponse),
        (status = 400, description = "Invalid input or dates", body = ErrorResponse),
        (status = 403, description = "Not the host of an active club", body = ErrorResponse),
        (status = 404, description = "Unknown club", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn update_club(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(club_id): Path<i64>,
    multipart: Multipart,
) -> AppResult<Json<ClubInfoResponse>> {
    let form =
        read_multipart::<UpdateClubRequest>(multipart, IMAGE_PART, MAX_CLUB_IMAGE_BYTES).await?;

    let info = state
        .services
        .clubs
        .update(
            auth_user.member_id,
            club_id,
            form.data.unwrap_or_default().into(),
            form.file,
        )
        .await?;
    Ok(Json(info.into()))
}

/// DELETE /api/v1/clubs/{clubId} - Soft delete a club
#[utoipa::path(
    delete,
    path = "/{clubId}",
    tag = CLUB_TAG,
    params(("clubId" = i64, Path, description = "Club id")),
    responses(
        (status = 204, description = "Club deleted"),
        (status = 403, description = "Not the host of an active club", body = ErrorResponse),
        (status = 404, description = "Unknown club", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn delete_club(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(club_id): Path<i64>,
) -> AppResult<StatusCode> {
    state
        .services
        .clubs
        .delete(auth_user.member_id, club_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/clubs/{clubId} - Club details
///
/// Anonymous callers see public clubs only.
#[utoipa::path(
    get,
    path = "/{clubId}",
    tag = CLUB_TAG,
    params(("clubId" = i64, Path, description = "Club id")),
    responses(
        (status = 200, description = "Club details", body = ClubInfoResponse),
        (status = 403, description = "Private club", body = ErrorResponse),
        (status = 404, description = "Unknown or deleted club", body = ErrorResponse)
    ),
    security(
        (),
        ("bearerAuth" = [])
    )
)]
async fn get_club(
    State(state): State<AppState>,
    auth_user: Option<Extension<AuthUser>>,
    Path(club_id): Path<i64>,
) -> AppResult<Json<ClubInfoResponse>> {
    let viewer_id = auth_user.map(|Extension(user)| user.member_id);
    let info = state.services.clubs.get(club_id, viewer_id).await?;
    Ok(Json(info.into()))
}

/// GET /api/v1/clubs/public - Search public clubs
///
/// Ordered by newest first.
#[utoipa::path(
    get,
    path = "/public",
    tag = CLUB_TAG,
    params(PaginationParams, ClubSearchQuery),
    responses(
        (status = 200, description = "Page of public clubs", body = PagedResponse<SimpleClubInfoWithoutLeader>),
        (status = 400, description = "Invalid paging or filter", body = ErrorResponse)
    )
)]
async fn search_public_clubs(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
    Query(query): Query<ClubSearchQuery>,
) -> AppResult<Json<PagedResponse<SimpleClubInfoWithoutLeader>>> {
    params.validate()?;

    let search = ClubSearch::from(query);
    let (clubs, total) = state
        .services
        .clubs
        .search(&search, params.offset(), params.limit())
        .await?;

    let data = clubs.into_iter().map(Into::into).collect();
    Ok(Json(PagedResponse::new(
        data,
        &params,
        u64::try_from(total).unwrap_or_default(),
    )))
}
