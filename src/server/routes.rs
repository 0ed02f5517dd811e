//! HTTP route handlers for the fitness assistant API.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::assistant::{AssistantError, AssistantReply, GUEST_USER};
use crate::meal::{MealError, MealRecommendation};
use crate::workout::{BodyPartSpec, NormalizedWorkoutRequest, SessionEntry, WorkoutError};

use super::state::AppState;

/// Create the API router with all routes.
#[must_use]
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/chat", post(chat))
        .route("/api/chat/history/{user_id}", delete(clear_history))
        .route("/api/workout", post(workout))
        .route("/api/meal", post(meal))
        .with_state(state)
}

/// JSON error body with a status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// Build an error response.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl From<AssistantError> for ApiError {
    fn from(err: AssistantError) -> Self {
        Self::new(err.status(), err.public_message())
    }
}

impl From<WorkoutError> for ApiError {
    fn from(err: WorkoutError) -> Self {
        let status = match &err {
            WorkoutError::InvalidSpec => StatusCode::BAD_REQUEST,
            WorkoutError::NotEnough(_) => StatusCode::NOT_FOUND,
            WorkoutError::Provider { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl From<MealError> for ApiError {
    fn from(_: MealError) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to fetch meal suggestions.",
        )
    }
}

/// Health check endpoint.
async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "fitbot-agent",
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.assistant.model_name(),
        "baseUrl": state.config.server.public_base_url(),
    }))
}

/// Chat request.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user's question.
    pub question: String,
    /// Conversation owner; defaults to the guest user.
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// Handle chat questions.
async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<AssistantReply>, ApiError> {
    let Json(request) = payload?;
    let question = request.question.trim();
    if question.is_empty() {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "Question is required."));
    }

    let user_id = request
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .unwrap_or(GUEST_USER);

    let reply = state.assistant.respond(question, user_id).await?;
    Ok(Json(reply))
}

/// Forget one user's conversation.
async fn clear_history(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> StatusCode {
    state.assistant.conversations().clear(&user_id);
    info!(user_id = %user_id, "conversation cleared");
    StatusCode::NO_CONTENT
}

/// Workout request, as produced by the category resolver.
#[derive(Debug, Deserialize)]
pub struct WorkoutRequest {
    /// Category id, filter, or a list of either.
    #[serde(rename = "bodyPart")]
    pub body_part: Option<BodyPartSpec>,
    /// Interval timing.
    #[serde(rename = "isHIIT", default)]
    pub is_hiit: bool,
    /// Lighter morning volume.
    #[serde(rename = "isMorning", default)]
    pub is_morning: bool,
}

/// Workout response.
#[derive(Debug, Serialize)]
pub struct WorkoutResponse {
    /// Assembled session.
    #[serde(rename = "workoutSession")]
    pub workout_session: Vec<SessionEntry>,
}

/// Plan a session from a structured request.
async fn workout(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<WorkoutRequest>, JsonRejection>,
) -> Result<Json<WorkoutResponse>, ApiError> {
    let Json(request) = payload?;
    let spec = request.body_part.ok_or(WorkoutError::InvalidSpec)?;
    let normalized = NormalizedWorkoutRequest::from_spec(&spec, request.is_hiit, request.is_morning);

    let workout_session = state.assistant.plan_workout(&normalized).await?;
    Ok(Json(WorkoutResponse { workout_session }))
}

/// Meal request.
#[derive(Debug, Deserialize)]
pub struct MealRequest {
    /// Free-text query.
    pub query: String,
}

/// Recommend meals.
async fn meal(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MealRequest>, JsonRejection>,
) -> Result<Json<MealRecommendation>, ApiError> {
    let Json(request) = payload?;
    let recommendation = state.assistant.recommend_meals(&request.query).await?;
    Ok(Json(recommendation))
}
