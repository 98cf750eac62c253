use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{SchoolLevel, StudentRecord};
use super::engine::{AssessmentRequest, ProfilingEngine};
use super::error::AssessmentError;

#[derive(Debug, Deserialize)]
pub(crate) struct ClassifyRequest {
    pub(crate) school_level: SchoolLevel,
    pub(crate) scores: Vec<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeviationRequest {
    pub(crate) school_level: SchoolLevel,
    pub(crate) type_name: String,
    pub(crate) scores: Vec<f64>,
    #[serde(default)]
    pub(crate) top_n: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InterventionRequest {
    pub(crate) school_level: SchoolLevel,
    pub(crate) type_name: String,
    #[serde(default)]
    pub(crate) scores: Option<Vec<f64>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClassProfileRequest {
    pub(crate) round: u32,
    #[serde(default)]
    pub(crate) students: Vec<StudentRecord>,
}

/// Router exposing classification, ranking and class aggregation over HTTP.
pub fn assessment_router(engine: Arc<ProfilingEngine>) -> Router {
    Router::new()
        .route("/api/v1/catalog/factors", get(factors_handler))
        .route("/api/v1/profiles/classify", post(classify_handler))
        .route("/api/v1/profiles/deviations", post(deviations_handler))
        .route("/api/v1/profiles/interventions", post(interventions_handler))
        .route("/api/v1/profiles/assess", post(assess_handler))
        .route("/api/v1/classes/profile", post(class_profile_handler))
        .with_state(engine)
}

pub(crate) async fn factors_handler(State(engine): State<Arc<ProfilingEngine>>) -> Response {
    let payload = json!({
        "version": engine.store().version,
        "factors": engine.catalog().factors(),
    });
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) async fn classify_handler(
    State(engine): State<Arc<ProfilingEngine>>,
    Json(request): Json<ClassifyRequest>,
) -> Response {
    match engine.classify(request.school_level, &request.scores) {
        Ok(classification) => (StatusCode::OK, Json(classification)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn deviations_handler(
    State(engine): State<Arc<ProfilingEngine>>,
    Json(request): Json<DeviationRequest>,
) -> Response {
    match engine.deviations(
        request.school_level,
        &request.type_name,
        &request.scores,
        request.top_n,
    ) {
        Ok(deviations) => (StatusCode::OK, Json(deviations)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn interventions_handler(
    State(engine): State<Arc<ProfilingEngine>>,
    Json(request): Json<InterventionRequest>,
) -> Response {
    match engine.rank_interventions(
        request.school_level,
        &request.type_name,
        request.scores.as_deref(),
    ) {
        Ok(ranked) => (StatusCode::OK, Json(ranked)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn assess_handler(
    State(engine): State<Arc<ProfilingEngine>>,
    Json(request): Json<AssessmentRequest>,
) -> Response {
    match engine.assess(request) {
        Ok(report) => (StatusCode::CREATED, Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn class_profile_handler(
    State(engine): State<Arc<ProfilingEngine>>,
    Json(request): Json<ClassProfileRequest>,
) -> Response {
    let analysis = engine.class_profile(&request.students, request.round);
    (StatusCode::OK, Json(analysis)).into_response()
}

fn error_response(error: AssessmentError) -> Response {
    let status = match error {
        AssessmentError::Input(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AssessmentError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}
