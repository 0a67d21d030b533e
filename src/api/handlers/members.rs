//! Current member (me) endpoints.

use axum::{
    Extension, Json,
    extract::{Multipart, State},
};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use super::read_multipart;
use crate::api::doc::MEMBER_TAG;
use crate::api::dto::{ErrorResponse, MemberProfileResponse, UpdateProfileRequest, WithdrawResponse};
use crate::api::middleware::AuthUser;
use crate::error::AppResult;
use crate::state::AppState;

/// Multipart layout of a profile update.
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
#[allow(dead_code)]
struct UpdateProfileForm {
    data: UpdateProfileRequest,
    #[schema(value_type = Option<String>, format = Binary)]
    profile_image: Option<Vec<u8>>,
}

/// Creates the "me" routes (current authenticated member)
///
/// # Routes
/// - `GET /me` - Own profile
/// - `PUT /me` - Update nickname, password, bio or profile image
/// - `DELETE /me` - Delete the account
///
/// # Authentication
/// All routes require authentication via the auth_middleware
pub fn me_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(get_me, update_me, delete_me))
}

/// GET /api/v1/members/me - Own profile
#[utoipa::path(
    get,
    path = "/me",
    tag = MEMBER_TAG,
    responses(
        (status = 200, description = "Current member", body = MemberProfileResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn get_me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<MemberProfileResponse>> {
    let member = state.services.members.get(auth_user.member_id).await?;
    Ok(Json(member.into()))
}

/// PUT /api/v1/members/me - Update own profile
///
/// Multipart request: a `data` JSON part and an optional `profileImage` file.
/// Changing the nickname assigns a new tag.
#[utoipa::path(
    put,
    path = "/me",
    tag = MEMBER_TAG,
    request_body(content = UpdateProfileForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Updated profile", body = MemberProfileResponse),
        (status = 400, description = "Invalid input or non-image upload", body = ErrorResponse),
        (status = 413, description = "Image too large", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn update_me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    multipart: Multipart,
) -> AppResult<Json<MemberProfileResponse>> {
    let form =
        read_multipart::<UpdateProfileRequest>(multipart, "profileImage", state.max_upload_size)
            .await?;

    let member = state.services.members.get(auth_user.member_id).await?;
    let update = form.data.unwrap_or_default();
    let updated = state
        .services
        .members
        .update_profile(&member, update.into(), form.file)
        .await?;
    Ok(Json(updated.into()))
}

/// DELETE /api/v1/members/me - Delete own account
#[utoipa::path(
    delete,
    path = "/me",
    tag = MEMBER_TAG,
    responses(
        (status = 200, description = "Member removed", body = WithdrawResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn delete_me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<WithdrawResponse>> {
    let member = state.services.members.withdraw(auth_user.member_id).await?;
    Ok(Json(member.into()))
}
