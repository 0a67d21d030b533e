//! Schedule endpoints.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::SCHEDULE_TAG;
use crate::api::dto::{
    CreateScheduleRequest, ErrorResponse, ScheduleDetailDto, ScheduleDto, ScheduleRangeQuery,
    ScheduleWithClubDto, UpdateScheduleRequest,
};
use crate::api::middleware::AuthUser;
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::validate::ValidatedJson;

/// Creates the schedule routes, nested under `/schedules`
///
/// # Routes
/// - `POST /` - Create a schedule (manager or host)
/// - `GET /clubs/{clubId}` - Schedules of a club in a date range
/// - `GET /me` - Schedules of every club the member joined
/// - `GET /{scheduleId}` - Schedule details
/// - `PUT /{scheduleId}` - Replace a schedule (manager or host)
/// - `DELETE /{scheduleId}` - Delete a schedule (manager or host)
///
/// When no range is given, the current month is used.
pub fn schedule_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(create_schedule))
        .routes(routes!(list_club_schedules))
        .routes(routes!(list_my_schedules))
        .routes(routes!(get_schedule, update_schedule, delete_schedule))
}

#[utoipa::path(
    post,
    path = "/",
    tag = SCHEDULE_TAG,
    request_body = CreateScheduleRequest,
    responses(
        (status = 201, description = "Schedule created", body = ScheduleDetailDto),
        (status = 400, description = "Invalid input or start after end", body = ErrorResponse),
        (status = 403, description = "Not a manager or host of an active club", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn create_schedule(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<CreateScheduleRequest>,
) -> AppResult<(StatusCode, Json<ScheduleDetailDto>)> {
    let (club_id, input) = payload.into_parts();
    let view = state
        .services
        .schedules
        .create(auth_user.member_id, club_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(view.into())))
}

#[utoipa::path(
    get,
    path = "/clubs/{clubId}",
    tag = SCHEDULE_TAG,
    params(("clubId" = i64, Path, description = "Club id"), ScheduleRangeQuery),
    responses(
        (status = 200, description = "Active schedules overlapping the range", body = Vec<ScheduleDto>),
        (status = 400, description = "Invalid range", body = ErrorResponse),
        (status = 403, description = "Not a member of the club", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn list_club_schedules(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(club_id): Path<i64>,
    Query(range): Query<ScheduleRangeQuery>,
) -> AppResult<Json<Vec<ScheduleDto>>> {
    let views = state
        .services
        .schedules
        .list_by_club(auth_user.member_id, club_id, range.start_date, range.end_date)
        .await?;
    Ok(Json(views.into_iter().map(ScheduleDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/me",
    tag = SCHEDULE_TAG,
    params(ScheduleRangeQuery),
    responses(
        (status = 200, description = "Schedules across joined clubs", body = Vec<ScheduleWithClubDto>),
        (status = 400, description = "Invalid range", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn list_my_schedules(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(range): Query<ScheduleRangeQuery>,
) -> AppResult<Json<Vec<ScheduleWithClubDto>>> {
    let schedules = state
        .services
        .schedules
        .list_mine(auth_user.member_id, range.start_date, range.end_date)
        .await?;
    Ok(Json(
        schedules
            .into_iter()
            .map(ScheduleWithClubDto::from)
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/{scheduleId}",
    tag = SCHEDULE_TAG,
    params(("scheduleId" = i64, Path, description = "Schedule id")),
    responses(
        (status = 200, description = "Schedule details", body = ScheduleDetailDto),
        (status = 403, description = "Not a member of the club", body = ErrorResponse),
        (status = 404, description = "Unknown or inactive schedule", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn get_schedule(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(schedule_id): Path<i64>,
) -> AppResult<Json<ScheduleDetailDto>> {
    let view = state
        .services
        .schedules
        .get(auth_user.member_id, schedule_id)
        .await?;
    Ok(Json(view.into()))
}

#[utoipa::path(
    put,
    path = "/{scheduleId}",
    tag = SCHEDULE_TAG,
    params(("scheduleId" = i64, Path, description = "Schedule id")),
    request_body = UpdateScheduleRequest,
    responses(
        (status = 200, description = "Updated schedule", body = ScheduleDetailDto),
        (status = 400, description = "Invalid input or start after end", body = ErrorResponse),
        (status = 403, description = "Not a manager or host", body = ErrorResponse),
        (status = 404, description = "Unknown or inactive schedule", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn update_schedule(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(schedule_id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateScheduleRequest>,
) -> AppResult<Json<ScheduleDetailDto>> {
    let view = state
        .services
        .schedules
        .update(auth_user.member_id, schedule_id, payload.into())
        .await?;
    Ok(Json(view.into()))
}

/// Schedules with an active checklist are deactivated instead of deleted.
#[utoipa::path(
    delete,
    path = "/{scheduleId}",
    tag = SCHEDULE_TAG,
    params(("scheduleId" = i64, Path, description = "Schedule id")),
    responses(
        (status = 200, description = "Schedule deleted"),
        (status = 403, description = "Not a manager or host", body = ErrorResponse),
        (status = 404, description = "Unknown or inactive schedule", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn delete_schedule(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(schedule_id): Path<i64>,
) -> AppResult<StatusCode> {
    state
        .services
        .schedules
        .delete(auth_user.member_id, schedule_id)
        .await?;
    Ok(StatusCode::OK)
}
