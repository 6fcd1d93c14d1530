mod common;

use anime_service::domain::Anime;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{basic, body_json, request, TestApp};
use serde_json::json;

fn seeded() -> Vec<Anime> {
    vec![Anime::new(1, "mehedi hasan")]
}

#[tokio::test]
async fn anonymous_request_gets_401_with_challenge() {
    let app = TestApp::new(seeded()).await;
    let response = app.send(request("GET", "/anime", None, None)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Basic realm=\"anime\""
    );
    let body = body_json(response).await;
    assert_eq!(body["status"], 401);
    assert_eq!(body["path"], "/anime");
}

#[tokio::test]
async fn wrong_password_and_unknown_user_are_both_401() {
    let app = TestApp::new(seeded()).await;

    for (username, password) in [("user", "not-the-password"), ("ghost", common::PASSWORD)] {
        let response = app
            .send(
                Request::builder()
                    .uri("/anime/1")
                    .header(header::AUTHORIZATION, basic(username, password))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["message"], "Bad credentials");
    }
}

#[tokio::test]
async fn malformed_authorization_header_is_401() {
    let app = TestApp::new(seeded()).await;
    let response = app
        .send(
            Request::builder()
                .uri("/anime/1")
                .header(header::AUTHORIZATION, "Basic %%%")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn user_role_cannot_write() {
    let app = TestApp::new(seeded()).await;

    let deleted = app.send(request("DELETE", "/anime/1", Some("user"), None)).await;
    assert_eq!(deleted.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(deleted).await["message"], "Access Denied");

    let created = app
        .send(request("POST", "/anime", Some("user"), Some(json!({"name": "Naruto"}))))
        .await;
    assert_eq!(created.status(), StatusCode::FORBIDDEN);

    let batch = app
        .send(request("POST", "/anime/batch", Some("user"), Some(json!([{"name": "x"}]))))
        .await;
    assert_eq!(batch.status(), StatusCode::FORBIDDEN);

    let updated = app
        .send(request("PUT", "/anime", Some("user"), Some(json!({"id": 1, "name": "x"}))))
        .await;
    assert_eq!(updated.status(), StatusCode::FORBIDDEN);

    assert_eq!(app.store.len().await, 1);
}

// Authorization runs before the lookup.
#[tokio::test]
async fn forbidden_wins_over_not_found() {
    let app = TestApp::new(seeded()).await;
    let response = app.send(request("DELETE", "/anime/99", Some("user"), None)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn user_role_can_read() {
    let app = TestApp::new(seeded()).await;

    let list = app.send(request("GET", "/anime", Some("user"), None)).await;
    assert_eq!(list.status(), StatusCode::OK);

    let one = app.send(request("GET", "/anime/1", Some("user"), None)).await;
    assert_eq!(one.status(), StatusCode::OK);
}

#[tokio::test]
async fn probes_are_public() {
    let app = TestApp::new(vec![]).await;

    let health = app.send(request("GET", "/health", None, None)).await;
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(body_json(health).await["status"], "healthy");

    let ready = app.send(request("GET", "/ready", None, None)).await;
    assert_eq!(ready.status(), StatusCode::OK);
    assert_eq!(body_json(ready).await["ready"], true);
}

#[tokio::test]
async fn unknown_route_requires_authentication_then_404s() {
    let app = TestApp::new(vec![]).await;

    let anonymous = app.send(request("GET", "/manga", None, None)).await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let authenticated = app.send(request("GET", "/manga", Some("user"), None)).await;
    assert_eq!(authenticated.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = TestApp::new(seeded()).await;
    let response = app.send(request("GET", "/anime/1", Some("user"), None)).await;

    let id = response.headers().get("x-request-id").unwrap();
    assert!(id.to_str().unwrap().starts_with("req_"));
}
