use serde::{Deserialize, Serialize};

use crate::model::{Game, Lobby};

/// Reply to a queue join. Idempotent under polling: once matched, every
/// subsequent join returns the same game.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum QueueReply {
    Queued { position: usize },
    Matched { game: Game },
}

/// Reply to a queue cancel.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CancelReply {
    Removed,
    Absent,
}

/// Debug/monitoring view of the matchmaking queue.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QueueStatus {
    pub size: usize,
    pub players: Vec<String>,
    pub matched_count: usize,
}

/// Lifecycle events pushed into the notification sink on every transition.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    QueueMatched { game: Game },
    PlayerJoined { lobby: Lobby, player: String },
    LobbyFull { lobby: Lobby },
    PlayerReady { lobby: Lobby, player: String, ready: bool },
    PlayerLeft { lobby_id: String, player: String },
    GameStarting { lobby: Lobby },
    GameStarted { lobby: Lobby, game: Game },
    GameCreated { game: Game },
    PromptSubmitted { game_id: String, player: String },
    ArtifactGenerated { game_id: String, player: String },
    GameProcessing { game: Game },
    GameCompleted { game: Game },
}

/// Leaderboard entry returned by the REST API.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub handle: String,
    pub elo: i64,
    pub wins: u32,
    pub losses: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Game, GameSource};

    #[test]
    fn queue_reply_is_status_tagged() {
        let v = serde_json::to_value(QueueReply::Queued { position: 3 }).unwrap();
        assert_eq!(v["status"], "queued");
        assert_eq!(v["position"], 3);
    }

    #[test]
    fn cancel_reply_tags() {
        let v = serde_json::to_value(CancelReply::Removed).unwrap();
        assert_eq!(v["status"], "removed");
    }

    #[test]
    fn events_are_snake_case_tagged() {
        let game = Game::new(
            vec!["Nova".to_string(), "Echo".to_string()],
            "Weather Dashboard".to_string(),
            GameSource::Manual,
        );
        let v = serde_json::to_value(Event::GameCompleted { game }).unwrap();
        assert_eq!(v["event"], "game_completed");
        assert_eq!(v["game"]["status"], "pending");
    }
}
