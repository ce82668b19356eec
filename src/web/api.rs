use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use roadmap_core::projection;
use roadmap_core::{Node, NodeKind, NodeUpdate, Roadmap, Status, StatusInsight, TreeError};
use serde::{Deserialize, Serialize};

use crate::errors::RoadmapError;
use crate::store::{RoadmapDocument, StoreHandle, export_document};

pub const EXPORT_FILE_NAME: &str = "roadmap-export.json";

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pub store: StoreHandle,
    /// Status changes outside the allowed transitions are rejected.
    pub strict_transitions: bool,
}

pub type SharedState = Arc<AppState>;

// ── Request payload types ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SaveRoadmapRequest {
    pub roadmap: Node,
}

#[derive(Deserialize)]
pub struct CreateAxisRequest {
    pub title: String,
}

#[derive(Deserialize)]
pub struct CreateChildRequest {
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: Option<NodeKind>,
}

#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: Status,
}

/// Inline edits arrive as whatever the input field held.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum ProgressValue {
    Number(f64),
    Text(String),
}

impl ProgressValue {
    fn as_input(&self) -> String {
        match self {
            ProgressValue::Number(n) => n.to_string(),
            ProgressValue::Text(s) => s.clone(),
        }
    }
}

#[derive(Deserialize)]
pub struct ProgressRequest {
    pub value: ProgressValue,
}

// ── Response types ────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct SaveResponse {
    pub success: bool,
    pub data: RoadmapDocument,
}

/// A node together with what the engines derive from it.
#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub node: Node,
    pub insight: StatusInsight,
}

impl ItemResponse {
    fn of(node: &Node) -> Self {
        Self {
            node: node.clone(),
            insight: StatusInsight::of(node),
        }
    }
}

fn item(roadmap: &Roadmap, id: &str) -> Result<ItemResponse, TreeError> {
    roadmap
        .find_by_id(id)
        .map(ItemResponse::of)
        .ok_or_else(|| TreeError::NodeNotFound { id: id.to_string() })
}

// ── Error handling ────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    Internal(String),
}

impl From<RoadmapError> for ApiError {
    fn from(err: RoadmapError) -> Self {
        let msg = err.to_string();
        match err {
            RoadmapError::Tree(TreeError::NodeNotFound { .. } | TreeError::ParentNotFound { .. }) => {
                ApiError::NotFound(msg)
            }
            RoadmapError::Tree(TreeError::TransitionNotAllowed { .. }) => ApiError::Conflict(msg),
            RoadmapError::Tree(_) => ApiError::BadRequest(msg),
            RoadmapError::Store(_) | RoadmapError::LockPoisoned | RoadmapError::TaskFailed(_) => {
                tracing::error!(error = %msg, "Roadmap request failed");
                ApiError::Internal(msg)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(serde_json::json!({"error": message}))).into_response()
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/api/roadmap", get(get_roadmap).post(save_roadmap))
        .route("/api/roadmap/axes", post(create_axis))
        .route(
            "/api/roadmap/item/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
        .route("/api/roadmap/item/{id}/children", post(create_child))
        .route("/api/roadmap/item/{id}/status", post(set_status))
        .route("/api/roadmap/item/{id}/progress", post(set_progress))
        .route("/api/roadmap/item/{id}/validate", post(toggle_validation))
        .route("/api/roadmap/summary", get(get_summary))
        .route("/api/roadmap/kanban", get(get_kanban))
        .route("/api/roadmap/grid", get(get_grid))
        .route("/api/roadmap/timeline", get(get_timeline))
        .route("/api/roadmap/navigation", get(get_navigation))
        .route("/api/roadmap/divergent", get(get_divergent))
        .route("/api/roadmap/export", get(export_roadmap))
        .route("/health", get(health_check))
}

// ── Document handlers ─────────────────────────────────────────────────

async fn health_check() -> &'static str {
    "ok"
}

async fn get_roadmap(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let document = state.store.call(|store| Ok(store.load()?)).await?;
    Ok(Json(document))
}

async fn save_roadmap(
    State(state): State<SharedState>,
    Json(req): Json<SaveRoadmapRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let roadmap = Roadmap::new(req.roadmap);
    let duplicates = roadmap.duplicate_ids();
    if !duplicates.is_empty() {
        return Err(ApiError::BadRequest(format!(
            "Duplicate node ids: {}",
            duplicates.join(", ")
        )));
    }
    let data = state
        .store
        .call(move |store| Ok(store.save(roadmap.root())?))
        .await?;
    Ok(Json(SaveResponse {
        success: true,
        data,
    }))
}

async fn export_roadmap(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let body = state
        .store
        .call(|store| Ok(export_document(&store.load()?.roadmap)?))
        .await?;
    let disposition = format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME);
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

// ── Item handlers ─────────────────────────────────────────────────────

async fn get_item(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let found = state.store.read(move |r| item(r, &id)).await?;
    Ok(Json(found.map_err(RoadmapError::from)?))
}

async fn update_item(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(update): Json<NodeUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let strict = state.strict_transitions;
    tracing::info!(id = %id, strict, "Updating roadmap item");
    let updated = state
        .store
        .modify(move |r| r.update_node(&id, update, strict).map(ItemResponse::of))
        .await?;
    Ok(Json(updated))
}

async fn delete_item(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!(id = %id, "Deleting roadmap item");
    state
        .store
        .modify(move |r| r.delete_node(&id).map(|_| ()))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_axis(
    State(state): State<SharedState>,
    Json(req): Json<CreateAxisRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let created = state
        .store
        .modify(move |r| {
            let id = r.add_axis(&req.title)?;
            item(r, &id)
        })
        .await?;
    tracing::info!(id = %created.node.id, "Axis created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn create_child(
    State(state): State<SharedState>,
    Path(parent_id): Path<String>,
    Json(req): Json<CreateChildRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let created = state
        .store
        .modify(move |r| {
            let id = r.add_sub_item(&parent_id, &req.title, req.kind)?;
            item(r, &id)
        })
        .await?;
    tracing::info!(id = %created.node.id, kind = %created.node.kind, "Sub-item created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn set_status(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(req): Json<StatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let strict = state.strict_transitions;
    tracing::info!(id = %id, status = %req.status, strict, "Changing status");
    let updated = state
        .store
        .modify(move |r| {
            if strict {
                r.transition_status(&id, req.status)?;
            } else {
                r.apply_status(&id, req.status)?;
            }
            item(r, &id)
        })
        .await?;
    Ok(Json(updated))
}

async fn set_progress(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(req): Json<ProgressRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let raw = req.value.as_input();
    let updated = state
        .store
        .modify(move |r| {
            r.set_progress(&id, &raw)?;
            item(r, &id)
        })
        .await?;
    Ok(Json(updated))
}

async fn toggle_validation(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state
        .store
        .modify(move |r| {
            r.toggle_validation(&id)?;
            item(r, &id)
        })
        .await?;
    Ok(Json(updated))
}

// ── View handlers ─────────────────────────────────────────────────────

async fn get_summary(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.store.read(projection::summary).await?))
}

async fn get_kanban(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.store.read(projection::kanban).await?))
}

async fn get_grid(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.store.read(projection::grid).await?))
}

async fn get_timeline(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.store.read(projection::timeline).await?))
}

async fn get_navigation(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.store.read(projection::navigation).await?))
}

async fn get_divergent(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.store.read(projection::divergent_nodes).await?))
}

// ── Tests ─────────────────────────────────────────────────────────────
