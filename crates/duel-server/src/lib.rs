pub mod db;
pub mod events;
pub mod game;
pub mod generate;
pub mod lobby;
pub mod matchmaking;
pub mod routes;
pub mod state;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use dashmap::DashMap;
use sqlx::sqlite::SqlitePoolOptions;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;

use duel_core::ids::utc_now_millis;
use duel_core::model::LobbyStatus;

use crate::generate::Generator;
use crate::state::{AppState, MatchQueue};

/// Lobbies that never started are evicted after this much idle time.
const STALE_LOBBY_MILLIS: i64 = 600_000;

/// Build a fully configured Router + shared state, with the generator
/// chosen from the environment.
pub async fn build_app(db_url: &str) -> (Router, Arc<AppState>) {
    build_app_with_generator(db_url, generate::from_env()).await
}

/// Same as [`build_app`], but with an explicit generator. Tests use this to
/// inject a failing backend.
pub async fn build_app_with_generator(
    db_url: &str,
    generator: Box<dyn Generator>,
) -> (Router, Arc<AppState>) {
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await
        .expect("Failed to connect to SQLite");

    db::init_db(&pool)
        .await
        .expect("Failed to initialize database");

    let (events, _) = broadcast::channel(256);

    let state = Arc::new(AppState {
        db: pool,
        lobbies: DashMap::new(),
        games: DashMap::new(),
        queue: Mutex::new(MatchQueue::default()),
        generator,
        events,
    });

    // Background sweep: stale lobbies and finished matchmaking pairings.
    {
        let state = state.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(30));
            loop {
                interval.tick().await;
                sweep(&state);
            }
        });
    }

    let app = Router::new()
        .route("/health", get(routes::health))
        .route("/matchmaking/join", post(routes::matchmaking_join))
        .route("/matchmaking/cancel", post(routes::matchmaking_cancel))
        .route("/matchmaking/status", get(routes::matchmaking_status))
        .route("/lobby/create", post(routes::lobby_create))
        .route("/lobby/join", post(routes::lobby_join))
        .route("/lobby/leave", post(routes::lobby_leave))
        .route("/lobby/ready", post(routes::lobby_ready))
        .route("/lobby/{lobby_id}", get(routes::lobby_get))
        .route("/lobby/{lobby_id}/start", post(routes::lobby_start))
        .route("/game/create", post(routes::game_create))
        .route("/game/{game_id}", get(routes::game_get))
        .route("/game/{game_id}/prompt", post(routes::game_prompt))
        .route("/game/{game_id}/complete", post(routes::game_complete))
        .route("/ai/internal/resolve", post(routes::ai_resolve))
        .route("/leaderboard", get(routes::leaderboard))
        .layer(CorsLayer::permissive())
        .with_state(state.clone());

    (app, state)
}

fn sweep(state: &AppState) {
    let now = utc_now_millis();
    let mut stale = Vec::new();

    for entry in state.lobbies.iter() {
        let lobby = entry.value();
        if lobby.status != LobbyStatus::Started && now - lobby.updated_at > STALE_LOBBY_MILLIS {
            stale.push(lobby.id.clone());
        }
    }
    for id in stale {
        state.lobbies.remove(&id);
    }

    matchmaking::sweep_finished_pairings(state);
}
