use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::ids::{generate_id, utc_now_millis};

/// Game lifecycle state machine. `Completed` and `Abandoned` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Pending,
    Processing,
    Completed,
    Abandoned,
}

impl GameStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GameStatus::Completed | GameStatus::Abandoned)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LobbyStatus {
    Waiting,
    Full,
    Started,
}

/// Provenance of a game. Informational only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameSource {
    Matchmaking,
    Lobby,
    Manual,
}

/// Generated output for one player: markup, style, and behavior sections.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(default)]
    pub markup: String,
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub behavior: String,
}

/// A manually-formed 2-party room with readiness voting.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Lobby {
    pub id: String,
    pub host: String,
    /// Ordered; the host is always index 0. Never exceeds two entries.
    pub players: Vec<String>,
    pub ready_state: HashMap<String, bool>,
    pub status: LobbyStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Lobby {
    pub fn new(host: String) -> Self {
        let now = utc_now_millis();
        Lobby {
            id: generate_id("lobby"),
            players: vec![host.clone()],
            ready_state: HashMap::from([(host.clone(), false)]),
            host,
            status: LobbyStatus::Waiting,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= 2
    }

    pub fn everyone_ready(&self) -> bool {
        self.is_full()
            && self
                .players
                .iter()
                .all(|p| self.ready_state.get(p).copied().unwrap_or(false))
    }

    pub fn touch(&mut self) {
        self.updated_at = utc_now_millis();
    }
}

/// One duel's full record: prompts, artifacts, scores, winner, status.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    /// Exactly two distinct handles.
    pub players: Vec<String>,
    /// The target both players must recreate. Immutable once set.
    pub target: String,
    /// Append-only prompt history per handle; a second entry is a
    /// modification round.
    pub prompts: HashMap<String, Vec<String>>,
    /// Most recent generated output per handle.
    pub artifacts: HashMap<String, Artifact>,
    /// Present for a handle only after that handle's artifact was judged.
    pub scores: HashMap<String, f64>,
    /// Set if and only if `status` is `completed` and one score is strictly
    /// higher than the other.
    pub winner: Option<String>,
    pub status: GameStatus,
    pub source: GameSource,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Game {
    pub fn new(players: Vec<String>, target: String, source: GameSource) -> Self {
        let now = utc_now_millis();
        Game {
            id: generate_id("game"),
            players,
            target,
            prompts: HashMap::new(),
            artifacts: HashMap::new(),
            scores: HashMap::new(),
            winner: None,
            status: GameStatus::Pending,
            source,
            created_at: now,
            updated_at: now,
        }
    }

    /// Resolve a handle to its canonical casing as stored at creation.
    pub fn canonical_player(&self, handle: &str) -> Result<String, ServiceError> {
        self.players
            .iter()
            .find(|p| p.eq_ignore_ascii_case(handle))
            .cloned()
            .ok_or_else(|| ServiceError::not_found("Player is not part of this game."))
    }

    /// Most recent prompt submitted by a handle, if any.
    pub fn latest_prompt(&self, handle: &str) -> Option<&str> {
        self.prompts
            .get(handle)
            .and_then(|history| history.last())
            .map(String::as_str)
    }

    /// True when every player has at least one artifact.
    pub fn all_artifacts_present(&self) -> bool {
        self.players.iter().all(|p| self.artifacts.contains_key(p))
    }

    /// True when every player has at least one prompt.
    pub fn all_prompts_present(&self) -> bool {
        self.players
            .iter()
            .all(|p| self.prompts.get(p).is_some_and(|h| !h.is_empty()))
    }

    pub fn touch(&mut self) {
        self.updated_at = utc_now_millis();
    }
}

/// Winner resolution: the strictly higher score wins; equal scores leave the
/// winner unset.
pub fn decide_winner(players: &[String], scores: &HashMap<String, f64>) -> Option<String> {
    if players.len() != 2 {
        return None;
    }
    let a = scores.get(&players[0])?;
    let b = scores.get(&players[1])?;
    if a > b {
        Some(players[0].clone())
    } else if b > a {
        Some(players[1].clone())
    } else {
        None
    }
}
