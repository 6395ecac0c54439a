// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API input validation tests.

use axum::http::{header, StatusCode};
use tower::ServiceExt;

mod common;
use common::{create_test_app, get, json_body, post_json};

#[tokio::test]
async fn test_login_empty_body() {
    let app = create_test_app();

    let response = app.oneshot(post_json("/auth", "")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"], "Phone number is required");
}

#[tokio::test]
async fn test_login_blank_phone() {
    let app = create_test_app();

    let response = app
        .oneshot(post_json("/auth", r#"{"phone": "   "}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"], "Phone number is required");
}

#[tokio::test]
async fn test_login_phone_too_long() {
    let app = create_test_app();
    let body = format!(r#"{{"phone": "+{}"}}"#, "1".repeat(40));

    let response = app.oneshot(post_json("/auth", &body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"], "Phone number is too long");
}

#[tokio::test]
async fn test_login_malformed_json() {
    let app = create_test_app();

    let response = app
        .oneshot(post_json("/auth", r#"{"phone": "+7999"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_complete_workout_missing_fields() {
    let app = create_test_app();

    for body in ["", "{}", r#"{"userId": 5}"#, r#"{"difficulty": 2}"#, r#"{"userId": 0, "difficulty": 2}"#] {
        let response = app
            .clone()
            .oneshot(post_json("/game?action=complete-workout", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {:?}", body);
        let json = json_body(response).await;
        assert_eq!(json["error"], "userId and difficulty are required");
    }
}

#[tokio::test]
async fn test_complete_workout_difficulty_out_of_range() {
    let app = create_test_app();

    for difficulty in [-1, 5, 40] {
        let body = format!(r#"{{"userId": 5, "difficulty": {}}}"#, difficulty);
        let response = app
            .clone()
            .oneshot(post_json("/game?action=complete-workout", &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_collection_requires_user_id() {
    let app = create_test_app();

    let response = app
        .oneshot(get("/game?action=collection"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"], "userId is required");
}

#[tokio::test]
async fn test_stats_requires_user_id() {
    let app = create_test_app();

    let response = app
        .oneshot(get("/game?action=stats&userId="))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"], "userId is required");
}

#[tokio::test]
async fn test_unparsable_query_is_json_bad_request() {
    let app = create_test_app();

    let response = app
        .oneshot(get("/game?action=stats&userId=1&userId=2"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    let json = json_body(response).await;
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("duplicate field `userId`"));
}

#[tokio::test]
async fn test_stats_rejects_non_numeric_user_id() {
    let app = create_test_app();

    let response = app
        .oneshot(get("/game?action=stats&userId=abc"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"], "userId must be an integer");
}
