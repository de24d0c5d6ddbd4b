use duel_core::error::ServiceError;
use duel_core::model::{GameSource, GameStatus};
use duel_core::protocol::{CancelReply, Event, QueueReply, QueueStatus};
use duel_core::validation::normalize_handle;

use crate::events::{game_topic, publish};
use crate::game;
use crate::state::AppState;

/// Join the matchmaking queue, or retrieve an existing match.
///
/// Idempotent under polling:
/// - already matched -> the same game, every time;
/// - already waiting -> current 1-based position;
/// - otherwise enqueue, pairing the two oldest handles as soon as the queue
///   holds two.
///
/// The pairing, game registration and `matched` bookkeeping all happen under
/// the single queue critical section, so a racing third join never observes
/// a half-formed pair. Lock order queue -> game is respected: the game table
/// is only touched while the queue mutex is held, never the other way
/// around.
pub fn join_queue(state: &AppState, player_name: &str) -> Result<QueueReply, ServiceError> {
    let player = normalize_handle(player_name, "player")?;

    let mut queue = state.queue.lock().unwrap();

    // A previously matched handle resolves to its stored game -- unless that
    // game has meanwhile finished or vanished, in which case the pairing
    // (both sides of it) is evicted and the handle falls through to normal
    // queue logic. Handles compare case-insensitively everywhere, matching
    // game membership.
    if let Some(game_id) = queue
        .matched
        .iter()
        .find(|(handle, _)| handle.eq_ignore_ascii_case(&player))
        .map(|(_, game_id)| game_id.clone())
    {
        let live = state.games.get(&game_id).map(|g| g.clone());
        match live {
            Some(game)
                if game.status == GameStatus::Pending
                    && game.scores.is_empty()
                    && game.winner.is_none() =>
            {
                return Ok(QueueReply::Matched { game });
            }
            _ => {
                queue.matched.retain(|_, gid| gid != &game_id);
            }
        }
    }

    if let Some(pos) = queue
        .waiting
        .iter()
        .position(|p| p.eq_ignore_ascii_case(&player))
    {
        return Ok(QueueReply::Queued { position: pos + 1 });
    }

    queue.waiting.push_back(player);

    if queue.waiting.len() >= 2 {
        // Strict FIFO: the two oldest handles, which may or may not include
        // the caller.
        let (p1, p2) = match (queue.waiting.pop_front(), queue.waiting.pop_front()) {
            (Some(a), Some(b)) => (a, b),
            _ => unreachable!("queue length checked above"),
        };
        let game = match game::create_game(
            state,
            &[p1.clone(), p2.clone()],
            None,
            GameSource::Matchmaking,
        ) {
            Ok(game) => game,
            Err(err) => {
                // Failed registration restores the pair; the queue commits
                // whole or not at all.
                queue.waiting.push_front(p2);
                queue.waiting.push_front(p1);
                return Err(err);
            }
        };
        queue.matched.insert(p1, game.id.clone());
        queue.matched.insert(p2, game.id.clone());

        publish(
            state,
            game_topic(&game.id),
            Event::QueueMatched { game: game.clone() },
        );
        return Ok(QueueReply::Matched { game });
    }

    Ok(QueueReply::Queued {
        position: queue.waiting.len(),
    })
}

/// Remove a handle from the waiting queue. A live pending pairing is not
/// cancellable here (a game-level operation); a pairing whose game already
/// finished is evicted so the handle can re-enter matchmaking.
pub fn cancel(state: &AppState, player_name: &str) -> Result<CancelReply, ServiceError> {
    let player = normalize_handle(player_name, "player")?;

    let mut queue = state.queue.lock().unwrap();

    if let Some(pos) = queue
        .waiting
        .iter()
        .position(|p| p.eq_ignore_ascii_case(&player))
    {
        queue.waiting.remove(pos);
        return Ok(CancelReply::Removed);
    }

    let matched_key = queue
        .matched
        .keys()
        .find(|h| h.eq_ignore_ascii_case(&player))
        .cloned();
    if let Some(key) = matched_key {
        let game_id = queue.matched[&key].clone();
        let pending = state
            .games
            .get(&game_id)
            .map(|g| g.status == GameStatus::Pending)
            .unwrap_or(false);
        if !pending {
            queue.matched.remove(&key);
            return Ok(CancelReply::Removed);
        }
    }

    Ok(CancelReply::Absent)
}

/// Monitoring view of the queue.
pub fn queue_status(state: &AppState) -> QueueStatus {
    let queue = state.queue.lock().unwrap();
    QueueStatus {
        size: queue.waiting.len(),
        players: queue.waiting.iter().cloned().collect(),
        matched_count: queue.matched.len(),
    }
}

/// Evict pairings whose games are no longer pending so players can re-enter
/// matchmaking. Called from the background sweep; returns the eviction
/// count.
pub fn sweep_finished_pairings(state: &AppState) -> usize {
    let mut queue = state.queue.lock().unwrap();
    let before = queue.matched.len();
    queue.matched.retain(|_, game_id| {
        state
            .games
            .get(game_id)
            .map(|g| g.status == GameStatus::Pending)
            .unwrap_or(false)
    });
    before - queue.matched.len()
}
