use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub const AUTH_TAG: &str = "Auth";
pub const MEMBER_TAG: &str = "Members";
pub const FRIEND_TAG: &str = "Friends";
pub const CLUB_TAG: &str = "Clubs";
pub const CLUB_LINK_TAG: &str = "Invitation links";
pub const CLUB_MEMBER_TAG: &str = "Club members";
pub const MY_CLUB_TAG: &str = "My clubs";
pub const SCHEDULE_TAG: &str = "Schedules";
pub const CHECKLIST_TAG: &str = "Checklists";
pub const PRESET_TAG: &str = "Presets";
pub const HEALTH_TAG: &str = "Health";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Moim",
        description = "An api server for club and gathering management",
    ),
    modifiers(&SecurityAddon),
    components(
        schemas(
            crate::api::dto::ErrorResponse,
            crate::models::ClubCategory,
            crate::models::EventType,
            crate::models::ClubMemberRole,
            crate::models::ClubMemberState,
            crate::models::ClubApplyResult,
        )
    ),
    tags(
        (name = AUTH_TAG, description = "Registration, login and token endpoints"),
        (name = MEMBER_TAG, description = "Own profile endpoints"),
        (name = FRIEND_TAG, description = "Friend relation endpoints"),
        (name = CLUB_TAG, description = "Club endpoints"),
        (name = CLUB_LINK_TAG, description = "Club invitation link endpoints"),
        (name = CLUB_MEMBER_TAG, description = "Club membership management endpoints"),
        (name = MY_CLUB_TAG, description = "Endpoints for the caller's own memberships"),
        (name = SCHEDULE_TAG, description = "Club schedule endpoints"),
        (name = CHECKLIST_TAG, description = "Schedule checklist endpoints"),
        (name = PRESET_TAG, description = "Checklist preset endpoints"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token; the accessToken cookie is accepted too"))
                        .build(),
                ),
            )
        }
    }
}
