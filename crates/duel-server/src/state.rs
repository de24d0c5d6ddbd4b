use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use dashmap::DashMap;
use sqlx::SqlitePool;
use tokio::sync::broadcast;

use duel_core::model::{Game, Lobby};

use crate::events::Envelope;
use crate::generate::Generator;

/// Matchmaking queue state. `waiting` and `matched` are mutated only behind
/// the queue mutex; a handle is never in both at once.
#[derive(Debug, Default)]
pub struct MatchQueue {
    /// FIFO order of handles not yet paired.
    pub waiting: VecDeque<String>,
    /// Handles already paired, mapped to their game id, so late polls
    /// resolve to the same game instead of re-queuing.
    pub matched: HashMap<String, String>,
}

/// Shared application state. Lock order for any operation needing more than
/// one lock: queue -> lobby -> game.
pub struct AppState {
    pub db: SqlitePool,
    pub lobbies: DashMap<String, Lobby>,
    pub games: DashMap<String, Game>,
    pub queue: Mutex<MatchQueue>,
    pub generator: Box<dyn Generator>,
    pub events: broadcast::Sender<Envelope>,
}
