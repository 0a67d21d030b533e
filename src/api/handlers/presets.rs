//! Checklist preset endpoints.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::PRESET_TAG;
use crate::api::dto::{ErrorResponse, PlatformPresetQuery, PresetDto, PresetRequest};
use crate::api::middleware::AuthUser;
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::validate::ValidatedJson;

/// Public preset routes, nested under `/presets`
///
/// # Routes
/// - `GET /platform?category=` - Bundled presets of a club category
pub fn public_preset_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(platform_presets))
}

/// Presets owned by the current member, nested under `/presets`
///
/// # Routes
/// - `POST /` - Create a preset
/// - `GET /` - List own presets
/// - `GET /{presetId}` - Preset details
/// - `PUT /{presetId}` - Replace name and items
/// - `DELETE /{presetId}` - Delete a preset
pub fn preset_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(create_preset, list_presets))
        .routes(routes!(get_preset, replace_preset, delete_preset))
}

#[utoipa::path(
    get,
    path = "/platform",
    tag = PRESET_TAG,
    params(PlatformPresetQuery),
    responses(
        (status = 200, description = "Platform presets, possibly empty", body = Vec<PresetDto>),
        (status = 400, description = "Unknown category", body = ErrorResponse)
    )
)]
async fn platform_presets(
    State(state): State<AppState>,
    Query(query): Query<PlatformPresetQuery>,
) -> Json<Vec<PresetDto>> {
    let presets = state.services.presets.platform(query.category);
    Json(presets.iter().map(PresetDto::from).collect())
}

#[utoipa::path(
    post,
    path = "/",
    tag = PRESET_TAG,
    request_body = PresetRequest,
    responses(
        (status = 201, description = "Preset created", body = PresetDto),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn create_preset(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<PresetRequest>,
) -> AppResult<(StatusCode, Json<PresetDto>)> {
    let (name, items) = payload.into_parts();
    let detail = state
        .services
        .presets
        .create(auth_user.member_id, name, items)
        .await?;
    Ok((StatusCode::CREATED, Json(detail.into())))
}

#[utoipa::path(
    get,
    path = "/",
    tag = PRESET_TAG,
    responses(
        (status = 200, description = "Own presets", body = Vec<PresetDto>)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn list_presets(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<PresetDto>>> {
    let presets = state.services.presets.list(auth_user.member_id).await?;
    Ok(Json(presets.into_iter().map(PresetDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/{presetId}",
    tag = PRESET_TAG,
    params(("presetId" = i64, Path, description = "Preset id")),
    responses(
        (status = 200, description = "Preset", body = PresetDto),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Unknown preset", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn get_preset(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(preset_id): Path<i64>,
) -> AppResult<Json<PresetDto>> {
    let detail = state
        .services
        .presets
        .get(auth_user.member_id, preset_id)
        .await?;
    Ok(Json(detail.into()))
}

#[utoipa::path(
    put,
    path = "/{presetId}",
    tag = PRESET_TAG,
    params(("presetId" = i64, Path, description = "Preset id")),
    request_body = PresetRequest,
    responses(
        (status = 200, description = "Updated preset", body = PresetDto),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Unknown preset", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn replace_preset(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(preset_id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<PresetRequest>,
) -> AppResult<Json<PresetDto>> {
    let (name, items) = payload.into_parts();
    let detail = state
        .services
        .presets
        .replace(auth_user.member_id, preset_id, name, items)
        .await?;
    Ok(Json(detail.into()))
}

#[utoipa::path(
    delete,
    path = "/{presetId}",
    tag = PRESET_TAG,
    params(("presetId" = i64, Path, description = "Preset id")),
    responses(
        (status = 200, description = "Preset deleted"),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Unknown preset", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn delete_preset(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(preset_id): Path<i64>,
) -> AppResult<StatusCode> {
    state
        .services
        .presets
        .delete(auth_user.member_id, preset_id)
        .await?;
    Ok(StatusCode::OK)
}
