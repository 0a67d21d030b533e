//! Router level tests against the in-memory backend.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::api::middleware::REQUEST_ID_HEADER;
use crate::api::routes::create_router;
use crate::config::Settings;
use crate::repositories::Repositories;
use crate::state::AppState;
use crate::storage::MemoryStorage;

const BOUNDARY: &str = "moim-test-boundary";

fn app() -> Router {
    let mut settings = Settings::default();
    settings.jwt.secret = "router-test-secret-router-test-secret".to_string();
    let storage = Arc::new(MemoryStorage::new(&settings.storage.public_base_url));
    let state = AppState::new(Repositories::in_memory(), storage, &settings).unwrap();
    create_router(state)
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn multipart_request(uri: &str, token: &str, data: Value) -> Request<Body> {
    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"data\"\r\n\
         Content-Type: application/json\r\n\r\n\
         {data}\r\n\
         --{BOUNDARY}--\r\n"
    );
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body))
        .unwrap()
}

/// Registers a member and returns its access token.
async fn register(app: &Router, nickname: &str) -> String {
    let response = send(
        app,
        json_request(
            "POST",
            "/api/v1/members/auth/register",
            None,
            json!({
                "email": format!("{nickname}@moim.io"),
                "password": "pw-1234",
                "nickname": nickname,
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(response.headers().contains_key(header::SET_COOKIE));
    let body = json_body(response).await;
    body["accessToken"].as_str().unwrap().to_string()
}

async fn create_club(app: &Router, token: &str, is_public: bool) -> i64 {
    let response = send(
        app,
        multipart_request(
            "/api/v1/clubs",
            token,
            json!({
                "name": "Weekend hikers",
                "category": "SPORTS",
                "mainSpot": "Bukhansan",
                "maximumCapacity": 10,
                "eventType": "LONG_TERM",
                "startDate": "2030-01-01",
                "endDate": "2099-12-31",
                "isPublic": is_public,
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response).await["clubId"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health_reports_memory_backend() {
    let app = app();
    let response = send(&app, empty_request("GET", "/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"]["backend"], "memory");
}

#[tokio::test]
async fn test_unknown_route_is_json_with_request_id() {
    let app = app();
    let request = Request::builder()
        .uri("/api/v1/nowhere")
        .header(REQUEST_ID_HEADER, "req-42")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()[REQUEST_ID_HEADER], "req-42");

    let body = json_body(response).await;
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(body["request_id"], "req-42");
}

#[tokio::test]
async fn test_protected_route_requires_login() {
    let app = app();
    let response = send(&app, empty_request("GET", "/api/v1/members/me", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = json_body(response).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_register_then_read_profile() {
    let app = app();
    let token = register(&app, "hana").await;

    let response = send(&app, empty_request("GET", "/api/v1/members/me", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["nickname"], "hana");
    assert_eq!(body["email"], "hana@moim.io");
}

#[tokio::test]
async fn test_invalid_register_body_is_rejected() {
    let app = app();
    let response = send(
        &app,
        json_request(
            "POST",
            "/api/v1/members/auth/register",
            None,
            json!({ "email": "not-an-email", "password": "pw", "nickname": "x" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_private_club_is_hidden_from_anonymous_callers() {
    let app = app();
    let token = register(&app, "host").await;
    let public_id = create_club(&app, &token, true).await;
    let private_id = create_club(&app, &token, false).await;

    let uri = format!("/api/v1/clubs/{public_id}");
    let response = send(&app, empty_request("GET", &uri, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["name"], "Weekend hikers");

    let uri = format!("/api/v1/clubs/{private_id}");
    let response = send(&app, empty_request("GET", &uri, None)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(&app, empty_request("GET", &uri, Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_public_search_lists_only_public_clubs() {
    let app = app();
    let token = register(&app, "host").await;
    create_club(&app, &token, true).await;
    create_club(&app, &token, false).await;

    let response = send(
        &app,
        empty_request("GET", "/api/v1/clubs/public?page=1&size=10", None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["pagination"]["total_items"], 1);
}

#[tokio::test]
async fn test_apply_through_invitation_link() {
    let app = app();
    let host = register(&app, "host").await;
    let guest = register(&app, "mina").await;
    let club_id = create_club(&app, &host, false).await;

    let uri = format!("/api/v1/clubs/{club_id}/members/invitation-link");
    let response = send(&app, empty_request("POST", &uri, Some(&guest))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(&app, empty_request("POST", &uri, Some(&host))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let link = json_body(response).await["link"]
        .as_str()
        .unwrap()
        .to_string();
    let code = link.rsplit("token=").next().unwrap().to_string();

    let preview = format!("/api/v1/clubs/invitations/{code}");
    let response = send(&app, empty_request("GET", &preview, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["clubId"], club_id);

    let apply = format!("/api/v1/clubs/invitations/{code}/apply");
    let response = send(&app, empty_request("POST", &apply, Some(&guest))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["result"], "SUCCESS");

    let response = send(&app, empty_request("POST", &apply, Some(&guest))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["result"], "ALREADY_APPLYING");
}

#[tokio::test]
async fn test_unknown_enum_in_query_is_reported() {
    let app = app();
    let response = send(
        &app,
        empty_request("GET", "/api/v1/presets/platform?category=DANCING", None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("Unknown ClubCategory: DANCING")
    );
}

#[tokio::test]
async fn test_openapi_document_lists_nested_paths() {
    let app = app();
    let response = send(&app, empty_request("GET", "/api-docs/openapi.json", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let paths = body["paths"].as_object().unwrap();
    assert!(paths.contains_key("/api/v1/clubs/{clubId}"));
    assert!(paths.contains_key("/api/v1/clubs/{clubId}/members/invitation-link"));
    assert!(paths.contains_key("/health"));
    assert!(body["components"]["securitySchemes"]["bearerAuth"].is_object());
}

#[tokio::test]
async fn test_club_detail_for_signed_in_member() {
    let app = app();
    let host = register(&app, "host").await;
    let other = register(&app, "mina").await;
    let club_id = create_club(&app, &host, true).await;

    let uri = format!("/api/v1/clubs/{club_id}");
    let response = send(&app, empty_request("GET", &uri, Some(&other))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["clubId"], club_id);

    // detail, update and delete share one path
    let response = send(&app, empty_request("GET", "/api-docs/openapi.json", None)).await;
    let body = json_body(response).await;
    let item = &body["paths"]["/api/v1/clubs/{clubId}"];
    assert!(item["get"].is_object());
    assert!(item["patch"].is_object());
    assert!(item["delete"].is_object());
    assert!(body["paths"].get("/api/v1/{clubId}").is_none());
}

#[tokio::test]
async fn test_cookie_only_request_is_authenticated() {
    let app = app();
    let token = register(&app, "hana").await;

    let request = Request::builder()
        .uri("/api/v1/members/me")
        .header(header::COOKIE, format!("theme=dark; accessToken={token}"))
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["nickname"], "hana");
}

#[tokio::test]
async fn test_token_of_deleted_member_is_rejected() {
    let app = app();
    let token = register(&app, "hana").await;

    let response = send(&app, empty_request("DELETE", "/api/v1/members/me", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, empty_request("GET", "/api/v1/members/me", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["message"], "invalid access token");
}
