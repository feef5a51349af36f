use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use service::errors::ServiceError;
use service::songs::domain::{DeletedSong, Song, SongInput};

use crate::{errors::JsonApiError, routes::ServerState};

/// Success envelope shared by every song endpoint.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub data: T,
}

impl<T> Envelope<T> {
    fn data(data: T) -> Self {
        Self { success: true, count: None, message: None, data }
    }

    fn with_message(message: &'static str, data: T) -> Self {
        Self { success: true, count: None, message: Some(message), data }
    }
}

type ApiResult<T> = Result<Json<Envelope<T>>, JsonApiError>;

/// Decode a song payload. An empty body reads as `{}`; anything other than
/// a JSON object is malformed.
fn parse_input(body: &Bytes) -> Result<SongInput, JsonApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(SongInput::default());
    }
    let malformed = |reason: &dyn std::fmt::Display| {
        warn!(err = %reason, "rejected request body");
        JsonApiError::new(StatusCode::BAD_REQUEST, "malformed JSON body", None)
    };
    let value: Value = serde_json::from_slice(body).map_err(|e| malformed(&e))?;
    if !value.is_object() {
        return Err(malformed(&"body is not a JSON object"));
    }
    serde_json::from_value(value).map_err(|e| malformed(&e))
}

fn fail(state: &ServerState, action: &'static str) -> impl FnOnce(ServiceError) -> JsonApiError {
    let expose = state.expose_error_details;
    move |e| JsonApiError::from_service(e, action, expose)
}

#[utoipa::path(
    get, path = "/api/songs", tag = "songs",
    responses(
        (status = 200, description = "All songs", body = crate::openapi::SongListDoc),
        (status = 500, description = "Store unavailable or failing", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn list(State(state): State<ServerState>) -> ApiResult<Vec<Song>> {
    let songs = state.songs.list_all().await.map_err(fail(&state, "list songs"))?;
    let count = songs.len();
    info!(count, "list songs");
    Ok(Json(Envelope { success: true, count: Some(count), message: None, data: songs }))
}

#[utoipa::path(
    get, path = "/api/songs/{id}", tag = "songs",
    params(("id" = String, Path, description = "Song id (UUID)")),
    responses(
        (status = 200, description = "The song", body = crate::openapi::SongEnvelopeDoc),
        (status = 400, description = "Invalid id", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not found", body = crate::openapi::ErrorDoc),
        (status = 500, description = "Store unavailable or failing", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<String>) -> ApiResult<Song> {
    let song = state.songs.get_by_id(&id).await.map_err(fail(&state, "get song"))?;
    Ok(Json(Envelope::data(song)))
}

#[utoipa::path(
    post, path = "/api/songs", tag = "songs",
    request_body = crate::openapi::SongInputDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::SongEnvelopeDoc),
        (status = 400, description = "Validation error", body = crate::openapi::ErrorDoc),
        (status = 409, description = "Name already taken", body = crate::openapi::ErrorDoc),
        (status = 500, description = "Store unavailable or failing", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create(State(state): State<ServerState>, body: Bytes) -> Result<(StatusCode, Json<Envelope<Song>>), JsonApiError> {
    let input = parse_input(&body)?;
    let song = state.songs.create(input).await.map_err(fail(&state, "create song"))?;
    info!(song_id = %song.id, name = %song.name, "created song");
    Ok((StatusCode::CREATED, Json(Envelope::with_message("song created", song))))
}

#[utoipa::path(
    put, path = "/api/songs/{id}", tag = "songs",
    params(("id" = String, Path, description = "Song id (UUID)")),
    request_body = crate::openapi::SongInputDoc,
    responses(
        (status = 200, description = "Replaced", body = crate::openapi::SongEnvelopeDoc),
        (status = 400, description = "Invalid id or validation error", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not found", body = crate::openapi::ErrorDoc),
        (status = 409, description = "Name already taken", body = crate::openapi::ErrorDoc),
        (status = 500, description = "Store unavailable or failing", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn replace(State(state): State<ServerState>, Path(id): Path<String>, body: Bytes) -> ApiResult<Song> {
    let input = parse_input(&body)?;
    let song = state.songs.replace(&id, input).await.map_err(fail(&state, "update song"))?;
    info!(song_id = %song.id, "replaced song");
    Ok(Json(Envelope::with_message("song updated", song)))
}

#[utoipa::path(
    patch, path = "/api/songs/{id}", tag = "songs",
    params(("id" = String, Path, description = "Song id (UUID)")),
    request_body = crate::openapi::SongPatchDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::SongEnvelopeDoc),
        (status = 400, description = "Invalid id or validation error", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not found", body = crate::openapi::ErrorDoc),
        (status = 409, description = "Name already taken", body = crate::openapi::ErrorDoc),
        (status = 500, description = "Store unavailable or failing", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn patch(State(state): State<ServerState>, Path(id): Path<String>, body: Bytes) -> ApiResult<Song> {
    let input = parse_input(&body)?;
    let song = state.songs.patch(&id, input).await.map_err(fail(&state, "update song"))?;
    info!(song_id = %song.id, "patched song");
    Ok(Json(Envelope::with_message("song updated", song)))
}

#[utoipa::path(
    delete, path = "/api/songs/{id}", tag = "songs",
    params(("id" = String, Path, description = "Song id (UUID)")),
    responses(
        (status = 200, description = "Deleted", body = crate::openapi::DeletedEnvelopeDoc),
        (status = 400, description = "Invalid id", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not found", body = crate::openapi::ErrorDoc),
        (status = 500, description = "Store unavailable or failing", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<String>) -> ApiResult<DeletedSong> {
    let deleted = state.songs.remove(&id).await.map_err(fail(&state, "delete song"))?;
    info!(song_id = %deleted.deleted_song.id, count = deleted.deleted_count, "deleted song");
    Ok(Json(Envelope::with_message("song deleted", deleted)))
}
