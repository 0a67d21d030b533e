//! Checklist endpoints.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::CHECKLIST_TAG;
use crate::api::dto::{CheckListDto, CreateCheckListRequest, ErrorResponse, UpdateCheckListRequest};
use crate::api::middleware::AuthUser;
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::validate::ValidatedJson;

/// Creates the checklist routes, nested under `/checklists`
///
/// # Routes
/// - `POST /` - Attach a checklist to a schedule (manager or host)
/// - `GET /{checkListId}` - Checklist details
/// - `PUT /{checkListId}` - Replace all items (manager or host)
/// - `DELETE /{checkListId}` - Delete a checklist (manager or host)
/// - `GET /group/{clubId}` - Active checklists of a club
pub fn check_list_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(create_check_list))
        .routes(routes!(get_check_list, replace_check_list, delete_check_list))
        .routes(routes!(list_club_check_lists))
}

#[utoipa::path(
    post,
    path = "/",
    tag = CHECKLIST_TAG,
    request_body = CreateCheckListRequest,
    responses(
        (status = 201, description = "Checklist created", body = CheckListDto),
        (status = 400, description = "Invalid items", body = ErrorResponse),
        (status = 403, description = "Not a manager or host, or assignee outside the club", body = ErrorResponse),
        (status = 404, description = "Unknown schedule", body = ErrorResponse),
        (status = 409, description = "The schedule already has a checklist", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn create_check_list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<CreateCheckListRequest>,
) -> AppResult<(StatusCode, Json<CheckListDto>)> {
    let (schedule_id, items) = payload.into_parts();
    let view = state
        .services
        .check_lists
        .create(auth_user.member_id, schedule_id, items)
        .await?;
    Ok((StatusCode::CREATED, Json(view.into())))
}

#[utoipa::path(
    get,
    path = "/{checkListId}",
    tag = CHECKLIST_TAG,
    params(("checkListId" = i64, Path, description = "Checklist id")),
    responses(
        (status = 200, description = "Checklist", body = CheckListDto),
        (status = 403, description = "Not a member of the club", body = ErrorResponse),
        (status = 404, description = "Unknown or inactive checklist", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn get_check_list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(check_list_id): Path<i64>,
) -> AppResult<Json<CheckListDto>> {
    let view = state
        .services
        .check_lists
        .get(auth_user.member_id, check_list_id)
        .await?;
    Ok(Json(view.into()))
}

#[utoipa::path(
    put,
    path = "/{checkListId}",
    tag = CHECKLIST_TAG,
    params(("checkListId" = i64, Path, description = "Checklist id")),
    request_body = UpdateCheckListRequest,
    responses(
        (status = 200, description = "Updated checklist", body = CheckListDto),
        (status = 403, description = "Not a manager or host, or assignee outside the club", body = ErrorResponse),
        (status = 404, description = "Unknown or inactive checklist", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn replace_check_list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(check_list_id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateCheckListRequest>,
) -> AppResult<Json<CheckListDto>> {
    let view = state
        .services
        .check_lists
        .replace(auth_user.member_id, check_list_id, payload.into_drafts())
        .await?;
    Ok(Json(view.into()))
}

#[utoipa::path(
    delete,
    path = "/{checkListId}",
    tag = CHECKLIST_TAG,
    params(("checkListId" = i64, Path, description = "Checklist id")),
    responses(
        (status = 200, description = "The deleted checklist", body = CheckListDto),
        (status = 403, description = "Not a manager or host", body = ErrorResponse),
        (status = 404, description = "Unknown or inactive checklist", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn delete_check_list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(check_list_id): Path<i64>,
) -> AppResult<Json<CheckListDto>> {
    let view = state
        .services
        .check_lists
        .delete(auth_user.member_id, check_list_id)
        .await?;
    Ok(Json(view.into()))
}

#[utoipa::path(
    get,
    path = "/group/{clubId}",
    tag = CHECKLIST_TAG,
    params(("clubId" = i64, Path, description = "Club id")),
    responses(
        (status = 200, description = "Active checklists of the club", body = Vec<CheckListDto>),
        (status = 403, description = "Not a member of the club", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn list_club_check_lists(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(club_id): Path<i64>,
) -> AppResult<Json<Vec<CheckListDto>>> {
    let views = state
        .services
        .check_lists
        .list_by_club(auth_user.member_id, club_id)
        .await?;
    Ok(Json(views.into_iter().map(CheckListDto::from).collect()))
}
