use std::collections::HashMap;
use std::sync::Arc;

use duel_core::error::ServiceError;
use duel_core::model::{decide_winner, Artifact, Game, GameSource, GameStatus};
use duel_core::protocol::Event;
use duel_core::scoring::clamp_score;
use duel_core::targets::random_target;
use duel_core::validation::{clean_prompt, normalize_handle};

use crate::db;
use crate::events::{game_topic, publish};
use crate::generate;
use crate::state::AppState;

/// Create a game in `pending` with exactly two distinct players. When no
/// target is supplied one is drawn from the catalogue.
pub fn create_game(
    state: &AppState,
    players: &[String],
    target: Option<String>,
    source: GameSource,
) -> Result<Game, ServiceError> {
    if players.len() != 2 {
        return Err(ServiceError::validation("Exactly two players are required."));
    }
    let p1 = normalize_handle(&players[0], "player")?;
    let p2 = normalize_handle(&players[1], "player")?;
    if p1.eq_ignore_ascii_case(&p2) {
        return Err(ServiceError::validation("Players must be distinct."));
    }

    let target = target
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| random_target().full_prompt());

    let game = Game::new(vec![p1, p2], target, source);
    state.games.insert(game.id.clone(), game.clone());

    publish(
        state,
        game_topic(&game.id),
        Event::GameCreated { game: game.clone() },
    );
    Ok(game)
}

pub fn get_game(state: &AppState, game_id: &str) -> Result<Game, ServiceError> {
    state
        .games
        .get(game_id)
        .map(|g| g.clone())
        .ok_or_else(|| ServiceError::not_found("Game not found."))
}

/// Append a prompt and hand a generation task to the dispatcher before
/// returning. Safe to call after completion: the modification round appends
/// and regenerates, but never reopens the status.
pub fn record_prompt(
    state: &Arc<AppState>,
    game_id: &str,
    player_name: &str,
    prompt: &str,
) -> Result<Game, ServiceError> {
    let player = normalize_handle(player_name, "player")?;
    let prompt = clean_prompt(prompt)?;

    let (game, canonical) = {
        let mut entry = state
            .games
            .get_mut(game_id)
            .ok_or_else(|| ServiceError::not_found("Game not found."))?;
        let canonical = entry.canonical_player(&player)?;
        entry
            .prompts
            .entry(canonical.clone())
            .or_default()
            .push(prompt.clone());
        entry.touch();
        (entry.clone(), canonical)
    };

    publish(
        state,
        game_topic(game_id),
        Event::PromptSubmitted {
            game_id: game_id.to_string(),
            player: canonical.clone(),
        },
    );

    generate::dispatch(state.clone(), game.id.clone(), canonical, prompt);
    Ok(game)
}

/// Completion callback from the dispatcher: store the artifact under a
/// fresh critical section, then judge once both players have one.
pub async fn on_artifact_ready(
    state: &Arc<AppState>,
    game_id: &str,
    player_name: &str,
    artifact: Artifact,
) -> Result<Game, ServiceError> {
    let (game, ready) = {
        let mut entry = state
            .games
            .get_mut(game_id)
            .ok_or_else(|| ServiceError::not_found("Game not found."))?;
        let canonical = entry.canonical_player(player_name)?;
        entry.artifacts.insert(canonical.clone(), artifact);
        entry.touch();
        let ready = entry.status == GameStatus::Pending && entry.all_artifacts_present();
        (entry.clone(), ready)
    };

    publish(
        state,
        game_topic(game_id),
        Event::ArtifactGenerated {
            game_id: game_id.to_string(),
            player: game.canonical_player(player_name)?,
        },
    );

    if ready {
        score_and_complete(state, game_id).await
    } else {
        Ok(game)
    }
}

/// Manual failsafe: re-run generation and scoring from the latest prompts.
/// Requires both prompts; a game already in a terminal state is returned
/// as-is, never reopened.
pub async fn resolve(state: &Arc<AppState>, game_id: &str) -> Result<Game, ServiceError> {
    let snapshot = get_game(state, game_id)?;
    if snapshot.status.is_terminal() {
        return Ok(snapshot);
    }
    if !snapshot.all_prompts_present() {
        return Err(ServiceError::conflict(
            "Both prompts are required before processing.",
        ));
    }

    // Generate with no locks held.
    let mut artifacts: HashMap<String, Artifact> = HashMap::new();
    for player in &snapshot.players {
        let prompt = snapshot
            .latest_prompt(player)
            .ok_or_else(|| ServiceError::conflict("Both prompts are required before processing."))?;
        let artifact = state.generator.generate(prompt).await?;
        artifacts.insert(player.clone(), artifact);
    }

    {
        let mut entry = state
            .games
            .get_mut(game_id)
            .ok_or_else(|| ServiceError::not_found("Game not found."))?;
        for (player, artifact) in &artifacts {
            entry.artifacts.insert(player.clone(), artifact.clone());
        }
        entry.touch();
    }

    score_and_complete(state, game_id).await
}

/// Score both artifacts and complete the game. The `processing` transition
/// commits before any external call; a scoring failure reverts it so the
/// game never sticks in `processing`.
async fn score_and_complete(state: &Arc<AppState>, game_id: &str) -> Result<Game, ServiceError> {
    let (snapshot, pairs) = {
        let mut entry = state
            .games
            .get_mut(game_id)
            .ok_or_else(|| ServiceError::not_found("Game not found."))?;
        if entry.status.is_terminal() {
            return Ok(entry.clone());
        }
        if !entry.all_artifacts_present() {
            return Err(ServiceError::conflict(
                "Both artifacts are required before judging.",
            ));
        }
        entry.status = GameStatus::Processing;
        entry.touch();
        let pairs: Vec<(String, Artifact)> = entry
            .players
            .iter()
            .filter_map(|p| entry.artifacts.get(p).map(|a| (p.clone(), a.clone())))
            .collect();
        (entry.clone(), pairs)
    };

    publish(
        state,
        game_topic(game_id),
        Event::GameProcessing {
            game: snapshot.clone(),
        },
    );

    let mut scores: HashMap<String, f64> = HashMap::new();
    for (player, artifact) in pairs {
        match state.generator.score(&artifact, &snapshot.target).await {
            Ok(score) => {
                scores.insert(player, score);
            }
            Err(err) => {
                // Roll back to the last committed status.
                if let Some(mut entry) = state.games.get_mut(game_id) {
                    if entry.status == GameStatus::Processing {
                        entry.status = GameStatus::Pending;
                        entry.touch();
                    }
                }
                return Err(err);
            }
        }
    }

    let winner = decide_winner(&snapshot.players, &scores);
    complete_game(state, game_id, None, Some(scores), winner, GameStatus::Completed).await
}

/// Force a terminal state, merging any supplied artifacts and scores. The
/// winner is recorded only when the final status is `completed`. Completed
/// duels are persisted best-effort.
pub async fn complete_game(
    state: &AppState,
    game_id: &str,
    artifacts: Option<HashMap<String, Artifact>>,
    scores: Option<HashMap<String, f64>>,
    winner: Option<String>,
    status: GameStatus,
) -> Result<Game, ServiceError> {
    if !status.is_terminal() {
        return Err(ServiceError::validation(
            "status must be completed or abandoned.",
        ));
    }

    let game = {
        let mut entry = state
            .games
            .get_mut(game_id)
            .ok_or_else(|| ServiceError::not_found("Game not found."))?;

        if let Some(artifacts) = artifacts {
            for (player, artifact) in artifacts {
                let canonical = entry.canonical_player(&player)?;
                entry.artifacts.insert(canonical, artifact);
            }
        }
        if let Some(scores) = scores {
            for (player, score) in scores {
                let canonical = entry.canonical_player(&player)?;
                entry.scores.insert(canonical, clamp_score(score));
            }
        }
        let winner = match winner {
            Some(w) if status == GameStatus::Completed => Some(entry.canonical_player(&w)?),
            _ => None,
        };

        entry.status = status;
        entry.winner = winner;
        entry.touch();
        entry.clone()
    };

    publish(
        state,
        game_topic(&game.id),
        Event::GameCompleted { game: game.clone() },
    );

    if game.status == GameStatus::Completed {
        if let Err(err) = db::record_duel(&state.db, &game).await {
            println!("failed to persist duel {}: {}", game.id, err);
        }
    }

    Ok(game)
}
