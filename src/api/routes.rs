//! Router configuration for the API.
//!
//! Route groups are assembled per authentication requirement, collected into
//! one OpenAPI document and wrapped in the shared middleware stack.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware,
};
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::doc::ApiDoc;
use crate::api::handlers::{
    auth, checklists, club_links, club_members, clubs, friends, health, members, my_clubs,
    presets, schedules,
};
use crate::api::middleware::{
    auth_middleware, global_error_handler, logging_middleware, optional_auth_middleware,
    request_id_middleware,
};
use crate::state::AppState;

pub const API_PREFIX: &str = "/api/v1";

/// Room for multipart boundaries and the JSON `data` part on top of the file itself.
const MULTIPART_OVERHEAD: usize = 256 * 1024;

fn public_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/members/auth", auth::auth_routes())
        .nest("/clubs", clubs::public_club_routes())
        .nest("/clubs/invitations", club_links::public_invitation_routes())
        .nest("/presets", presets::public_preset_routes())
}

fn protected_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/members/auth", auth::protected_auth_routes())
        .nest("/members", members::me_routes())
        .nest("/members/me/friends", friends::friend_routes())
        .nest("/clubs", clubs::club_routes())
        .nest("/clubs/invitations", club_links::invitation_routes())
        .nest(
            "/clubs/{clubId}/members",
            club_members::club_member_routes().merge(club_links::link_routes()),
        )
        .nest("/my-clubs", my_clubs::my_club_routes())
        .nest("/schedules", schedules::schedule_routes())
        .nest("/checklists", checklists::check_list_routes())
        .nest("/presets", presets::preset_routes())
}

fn cors_layer(frontend_url: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);

    match HeaderValue::from_str(frontend_url.trim_end_matches('/')) {
        Ok(origin) => cors.allow_origin(origin),
        Err(e) => {
            tracing::warn!(error = %e, frontend_url, "Invalid frontend url, CORS disabled");
            cors
        }
    }
}

/// Creates the main application router with all routes and middleware.
///
/// # Middleware Order
/// Middleware is applied in reverse order of declaration (last added runs first):
/// 1. Compression and CORS
/// 2. Request ID middleware - generates/propagates request IDs
/// 3. Logging middleware - logs requests with request IDs
/// 4. Global error handler - renders every error as `ErrorResponse`
/// 5. Timeout and body limit
///
/// Authentication is layered per route group, so it runs after all of the above.
///
/// # Routes
/// - `/api/v1/...` - The API, see the OpenAPI document
/// - `/health` - Health probes
/// - `/swagger-ui`, `/api-docs/openapi.json` - API documentation
pub fn create_router(state: AppState) -> Router {
    let api = public_routes()
        .merge(
            OpenApiRouter::new()
                .nest("/clubs", clubs::optional_club_routes())
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    optional_auth_middleware,
                )),
        )
        .merge(
            protected_routes()
                .layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        );

    let (router, openapi) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest(API_PREFIX, api)
        .merge(health::health_routes())
        .split_for_parts();

    let body_limit = state.max_upload_size.saturating_add(MULTIPART_OVERHEAD);
    let cors = cors_layer(&state.frontend_url);
    let timeout = state.request_timeout;

    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TimeoutLayer::new(timeout))
        .layer(middleware::from_fn(global_error_handler))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(CompressionLayer::new())
        .with_state(state)
}
