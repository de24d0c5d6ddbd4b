use duel_core::error::ServiceError;
use duel_core::model::{Game, GameSource, Lobby, LobbyStatus};
use duel_core::protocol::Event;
use duel_core::validation::normalize_handle;

use crate::events::{lobby_topic, publish};
use crate::game;
use crate::state::AppState;

pub fn create_lobby(state: &AppState, host_name: &str) -> Result<Lobby, ServiceError> {
    let host = normalize_handle(host_name, "host")?;
    let lobby = Lobby::new(host.clone());
    state.lobbies.insert(lobby.id.clone(), lobby.clone());

    publish(
        state,
        lobby_topic(&lobby.id),
        Event::PlayerJoined {
            lobby: lobby.clone(),
            player: host,
        },
    );
    Ok(lobby)
}

pub fn get_lobby(state: &AppState, lobby_id: &str) -> Result<Lobby, ServiceError> {
    state
        .lobbies
        .get(lobby_id)
        .map(|l| l.clone())
        .ok_or_else(|| ServiceError::not_found("Lobby not found."))
}

pub fn join_lobby(state: &AppState, lobby_id: &str, player_name: &str) -> Result<Lobby, ServiceError> {
    let player = normalize_handle(player_name, "player")?;

    let lobby = {
        let mut entry = state
            .lobbies
            .get_mut(lobby_id)
            .ok_or_else(|| ServiceError::not_found("Lobby not found."))?;
        ensure_not_started(&entry)?;
        if entry.players.iter().any(|p| p.eq_ignore_ascii_case(&player)) {
            return Err(ServiceError::conflict("Player already in lobby."));
        }
        if entry.is_full() {
            return Err(ServiceError::conflict("Lobby is full."));
        }

        entry.players.push(player.clone());
        entry.ready_state.insert(player.clone(), false);
        entry.status = LobbyStatus::Full;
        entry.touch();
        entry.clone()
    };

    publish(
        state,
        lobby_topic(lobby_id),
        Event::PlayerJoined {
            lobby: lobby.clone(),
            player,
        },
    );
    if lobby.is_full() {
        publish(
            state,
            lobby_topic(lobby_id),
            Event::LobbyFull { lobby: lobby.clone() },
        );
    }
    Ok(lobby)
}

/// Leave a lobby. The host leaving deletes the lobby entirely; a non-host
/// leaving reverts it to `waiting`. Returns `(lobby, deleted)`.
pub fn leave_lobby(
    state: &AppState,
    lobby_id: &str,
    player_name: &str,
) -> Result<(Option<Lobby>, bool), ServiceError> {
    let player = normalize_handle(player_name, "player")?;

    let (lobby, deleted, player) = {
        let mut entry = state
            .lobbies
            .get_mut(lobby_id)
            .ok_or_else(|| ServiceError::not_found("Lobby not found."))?;
        ensure_not_started(&entry)?;
        let Some(player) = canonical_member(&entry, &player) else {
            return Err(ServiceError::validation("Player not part of this lobby."));
        };

        if player == entry.host {
            drop(entry);
            state.lobbies.remove(lobby_id);
            (None, true, player)
        } else {
            entry.players.retain(|p| p != &player);
            entry.ready_state.remove(&player);
            entry.status = LobbyStatus::Waiting;
            entry.touch();
            (Some(entry.clone()), false, player)
        }
    };

    publish(
        state,
        lobby_topic(lobby_id),
        Event::PlayerLeft {
            lobby_id: lobby_id.to_string(),
            player,
        },
    );
    Ok((lobby, deleted))
}

/// Flip a player's ready flag. Never changes the lobby status.
pub fn toggle_ready(state: &AppState, lobby_id: &str, player_name: &str) -> Result<Lobby, ServiceError> {
    let player = normalize_handle(player_name, "player")?;

    let (lobby, ready, player) = {
        let mut entry = state
            .lobbies
            .get_mut(lobby_id)
            .ok_or_else(|| ServiceError::not_found("Lobby not found."))?;
        ensure_not_started(&entry)?;
        let Some(player) = canonical_member(&entry, &player) else {
            return Err(ServiceError::validation("Player not part of this lobby."));
        };

        let current = entry.ready_state.get(&player).copied().unwrap_or(false);
        entry.ready_state.insert(player.clone(), !current);
        entry.touch();
        (entry.clone(), !current, player)
    };

    publish(
        state,
        lobby_topic(lobby_id),
        Event::PlayerReady {
            lobby: lobby.clone(),
            player,
            ready,
        },
    );
    Ok(lobby)
}

/// Promote a ready lobby into a game. Host-only; requires two players, all
/// ready. The game is created while the lobby entry is still held (lobby ->
/// game lock order) so no caller can observe a ready lobby without its game.
pub fn start_lobby(
    state: &AppState,
    lobby_id: &str,
    host_name: &str,
    target: Option<String>,
) -> Result<(Lobby, Game), ServiceError> {
    let host = normalize_handle(host_name, "host")?;

    let (lobby, game, starting_snapshot) = {
        let mut entry = state
            .lobbies
            .get_mut(lobby_id)
            .ok_or_else(|| ServiceError::not_found("Lobby not found."))?;
        ensure_not_started(&entry)?;
        if host != entry.host {
            return Err(ServiceError::conflict("Only the host can start the lobby."));
        }
        if entry.players.len() != 2 {
            return Err(ServiceError::conflict("Lobby needs two players to start."));
        }
        if !entry.everyone_ready() {
            return Err(ServiceError::conflict(
                "Both players must be ready before starting.",
            ));
        }

        let starting_snapshot = entry.clone();
        let game = game::create_game(state, &entry.players, target, GameSource::Lobby)?;
        entry.status = LobbyStatus::Started;
        entry.touch();
        (entry.clone(), game, starting_snapshot)
    };

    publish(
        state,
        lobby_topic(lobby_id),
        Event::GameStarting {
            lobby: starting_snapshot,
        },
    );
    publish(
        state,
        lobby_topic(lobby_id),
        Event::GameStarted {
            lobby: lobby.clone(),
            game: game.clone(),
        },
    );
    Ok((lobby, game))
}

/// Resolve a handle to its casing as stored in the member list.
fn canonical_member(lobby: &Lobby, handle: &str) -> Option<String> {
    lobby
        .players
        .iter()
        .find(|p| p.eq_ignore_ascii_case(handle))
        .cloned()
}

/// `started` is terminal: no join/leave/ready/start mutation is permitted.
fn ensure_not_started(lobby: &Lobby) -> Result<(), ServiceError> {
    if lobby.status == LobbyStatus::Started {
        return Err(ServiceError::conflict("Lobby already started."));
    }
    Ok(())
}
