use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, MethodRouter},
    Json, Router,
};
use serde_json::json;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, Level};
use utoipa::OpenApi;

use common::types::Health;
use service::songs::SongService;

use crate::openapi::ApiDoc;

pub mod songs;

#[derive(Clone)]
pub struct ServerState {
    pub songs: Arc<SongService>,
    /// Attach driver error text to 500 bodies (off in production).
    pub expose_error_details: bool,
}

#[utoipa::path(
    get, path = "/api/health", tag = "health",
    responses((status = 200, description = "Service and database status", body = crate::openapi::HealthDoc))
)]
pub async fn health(State(state): State<ServerState>) -> Json<Health> {
    let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
    Json(Health::new(timestamp, state.songs.store_available()))
}

async fn index() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "message": "songs CRUD service",
        "version": env!("CARGO_PKG_VERSION"),
        "documentation": {
            "endpoints": "/api",
            "health": "/api/health",
            "songs": "/api/songs",
            "openapi": "/api/openapi.json"
        }
    }))
}

async fn api_index() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "message": "songs API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "GET /api/songs": "list all songs",
            "GET /api/songs/:id": "get one song by id",
            "POST /api/songs": "create a song",
            "PUT /api/songs/:id": "replace a song",
            "PATCH /api/songs/:id": "partially update a song",
            "DELETE /api/songs/:id": "delete a song",
            "GET /api/health": "service status"
        },
        "documentation": "send request bodies as JSON (Content-Type: application/json)"
    }))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub async fn not_found(method: Method, uri: Uri) -> Response {
    let body = json!({
        "success": false,
        "error": "endpoint not found",
        "message": format!("route {method} {uri} does not exist"),
        "availableEndpoints": {
            "GET /": "service information",
            "GET /api": "API information",
            "GET /api/health": "service status",
            "GET /api/songs": "song management"
        }
    });
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let msg = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = %msg, "handler panicked");
    let body = json!({"success": false, "error": "internal server error"});
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

fn song_collection() -> MethodRouter<ServerState> {
    get(songs::list).post(songs::create).fallback(not_found)
}

fn song_item() -> MethodRouter<ServerState> {
    get(songs::get)
        .put(songs::replace)
        .patch(songs::patch)
        .delete(songs::delete)
        .fallback(not_found)
}

/// Build the full application router: song CRUD, health, service info and
/// the OpenAPI document. Anything else is a JSON 404.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    // trailing-slash forms resolve to the same handlers
    let song_routes = Router::new()
        .route("/api/songs", song_collection())
        .route("/api/songs/", song_collection())
        .route("/api/songs/:id", song_item())
        .route("/api/songs/:id/", song_item());

    let info_routes = Router::new()
        .route("/", get(index).fallback(not_found))
        .route("/api", get(api_index).fallback(not_found))
        .route("/api/health", get(health).fallback(not_found))
        .route("/api/openapi.json", get(openapi_json).fallback(not_found));

    song_routes
        .merge(info_routes)
        .fallback(not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx responses
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
