use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use duel_core::error::ServiceError;
use duel_core::model::{Artifact, GameSource, GameStatus};
use duel_core::protocol::QueueReply;

use crate::state::AppState;
use crate::{db, game, lobby, matchmaking};

/// Wire mapping of the service error taxonomy. Each kind surfaces verbatim
/// as `{"error": ...}` with its own status code.
pub struct ApiError(ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Generation(_) => StatusCode::BAD_GATEWAY,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

// ── Health ──────────────────────────────────────────────────────────────

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "duel-server" }))
}

// ── Matchmaking ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PlayerBody {
    pub player: String,
}

pub async fn matchmaking_join(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PlayerBody>,
) -> Result<impl IntoResponse, ApiError> {
    let reply = matchmaking::join_queue(&state, &body.player)?;
    let status = match &reply {
        QueueReply::Matched { .. } => StatusCode::CREATED,
        QueueReply::Queued { .. } => StatusCode::OK,
    };
    Ok((status, Json(reply)))
}

pub async fn matchmaking_cancel(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PlayerBody>,
) -> Result<impl IntoResponse, ApiError> {
    let reply = matchmaking::cancel(&state, &body.player)?;
    Ok(Json(reply))
}

pub async fn matchmaking_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(matchmaking::queue_status(&state))
}

// ── Lobby ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateLobbyBody {
    pub host: String,
}

pub async fn lobby_create(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateLobbyBody>,
) -> Result<impl IntoResponse, ApiError> {
    let lobby = lobby::create_lobby(&state, &body.host)?;
    Ok((StatusCode::CREATED, Json(json!({ "lobby": lobby }))))
}

#[derive(Debug, Deserialize)]
pub struct LobbyMemberBody {
    pub lobby_id: String,
    pub player: String,
}

pub async fn lobby_join(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LobbyMemberBody>,
) -> Result<impl IntoResponse, ApiError> {
    let lobby = lobby::join_lobby(&state, &body.lobby_id, &body.player)?;
    Ok(Json(json!({ "lobby": lobby })))
}

pub async fn lobby_leave(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LobbyMemberBody>,
) -> Result<impl IntoResponse, ApiError> {
    let (lobby, deleted) = lobby::leave_lobby(&state, &body.lobby_id, &body.player)?;
    Ok(Json(json!({ "lobby": lobby, "deleted": deleted })))
}

pub async fn lobby_ready(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LobbyMemberBody>,
) -> Result<impl IntoResponse, ApiError> {
    let lobby = lobby::toggle_ready(&state, &body.lobby_id, &body.player)?;
    Ok(Json(json!({ "lobby": lobby })))
}

pub async fn lobby_get(
    State(state): State<Arc<AppState>>,
    Path(lobby_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let lobby = lobby::get_lobby(&state, &lobby_id)?;
    Ok(Json(json!({ "lobby": lobby })))
}

#[derive(Debug, Deserialize)]
pub struct StartLobbyBody {
    pub host: String,
    #[serde(default)]
    pub target: Option<String>,
}

pub async fn lobby_start(
    State(state): State<Arc<AppState>>,
    Path(lobby_id): Path<String>,
    Json(body): Json<StartLobbyBody>,
) -> Result<impl IntoResponse, ApiError> {
    let (lobby, game) = lobby::start_lobby(&state, &lobby_id, &body.host, body.target)?;
    Ok(Json(json!({ "lobby": lobby, "game": game })))
}

// ── Game ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateGameBody {
    pub players: Vec<String>,
    #[serde(default)]
    pub target: Option<String>,
}

pub async fn game_create(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateGameBody>,
) -> Result<impl IntoResponse, ApiError> {
    let game = game::create_game(&state, &body.players, body.target, GameSource::Manual)?;
    Ok((StatusCode::CREATED, Json(json!({ "game": game }))))
}

pub async fn game_get(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let game = game::get_game(&state, &game_id)?;
    Ok(Json(json!({ "game": game })))
}

#[derive(Debug, Deserialize)]
pub struct PromptBody {
    pub player: String,
    pub prompt: String,
}

pub async fn game_prompt(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    Json(body): Json<PromptBody>,
) -> Result<impl IntoResponse, ApiError> {
    let game = game::record_prompt(&state, &game_id, &body.player, &body.prompt)?;
    Ok(Json(json!({ "status": game.status, "game": game })))
}

#[derive(Debug, Deserialize)]
pub struct CompleteGameBody {
    #[serde(default)]
    pub artifacts: Option<HashMap<String, Artifact>>,
    #[serde(default)]
    pub scores: Option<HashMap<String, f64>>,
    #[serde(default)]
    pub winner: Option<String>,
    #[serde(default)]
    pub status: Option<GameStatus>,
}

pub async fn game_complete(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    Json(body): Json<CompleteGameBody>,
) -> Result<impl IntoResponse, ApiError> {
    let game = game::complete_game(
        &state,
        &game_id,
        body.artifacts,
        body.scores,
        body.winner,
        body.status.unwrap_or(GameStatus::Completed),
    )
    .await?;
    Ok(Json(json!({ "game": game })))
}

#[derive(Debug, Deserialize)]
pub struct ResolveBody {
    pub game_id: String,
}

pub async fn ai_resolve(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ResolveBody>,
) -> Result<impl IntoResponse, ApiError> {
    let game = game::resolve(&state, &body.game_id).await?;
    Ok(Json(json!({ "game": game })))
}

// ── Leaderboard ─────────────────────────────────────────────────────────

pub async fn leaderboard(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, StatusCode> {
    let entries = db::get_leaderboard(&state.db, 100)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(entries))
}
