use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::assessment::catalog::FACTOR_COUNT;
use crate::assessment::router::assessment_router;

fn app() -> Router {
    assessment_router(Arc::new(synthetic_engine()))
}

async fn post_json(uri: &str, payload: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request");

    let response = app().oneshot(request).await.expect("response");
    let status = response.status();
    (status, read_json_body(response).await)
}

#[tokio::test]
async fn lists_the_factor_catalog() {
    let request = Request::builder()
        .uri("/api/v1/catalog/factors")
        .body(Body::empty())
        .expect("request");

    let response = app().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json_body(response).await;
    assert_eq!(body["version"], "synthetic");
    let factors = body["factors"].as_array().expect("factor array");
    assert_eq!(factors.len(), FACTOR_COUNT);
    assert_eq!(factors[0]["name"], "자아존중감");
}

#[tokio::test]
async fn classifies_a_score_vector() {
    let (status, body) = post_json(
        "/api/v1/profiles/classify",
        json!({ "school_level": "middle", "scores": neutral_scores() }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["predicted_type"], BALANCED);
    assert_eq!(body["rank"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn wrong_length_vector_is_unprocessable() {
    let (status, body) = post_json(
        "/api/v1/profiles/classify",
        json!({ "school_level": "중학교", "scores": [50.0, 50.0] }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn interventions_without_scores_use_authored_order() {
    let (status, body) = post_json(
        "/api/v1/profiles/interventions",
        json!({ "school_level": "middle", "type_name": BALANCED }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let scores: Vec<u64> = body
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|entry| entry["relevance_score"].as_u64())
        .collect();
    assert_eq!(scores, vec![100, 90, 80]);
}

#[tokio::test]
async fn unknown_type_is_unprocessable() {
    let (status, _) = post_json(
        "/api/v1/profiles/deviations",
        json!({
            "school_level": "middle",
            "type_name": "없는 유형",
            "scores": neutral_scores(),
        }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn assess_returns_created_report() {
    let (status, body) = post_json(
        "/api/v1/profiles/assess",
        json!({
            "student_id": "s-01",
            "round": 1,
            "school_level": "middle",
            "scores": vec![60.0; FACTOR_COUNT],
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["classification"]["predicted_type"], ELEVATED);
    assert_eq!(body["assessment"]["result"]["predicted_type"], ELEVATED);
    assert_eq!(
        body["assessment"]["result"]["deviations"]
            .as_array()
            .map(Vec::len),
        Some(3)
    );
}

#[tokio::test]
async fn class_profile_without_assessments_reports_no_data() {
    let (status, body) = post_json(
        "/api/v1/classes/profile",
        json!({ "round": 2, "students": [] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "no_data", "round": 2 }));
}
