use sqlx::{Row, SqlitePool};

use duel_core::model::Game;
use duel_core::protocol::LeaderboardEntry;

/// Elo awarded for a win and deducted for a loss. Ratings floor at zero.
const ELO_STEP: i64 = 5;
/// Starting elo for a player seen for the first time.
const STARTING_ELO: i64 = 10;

/// Create all tables if they don't exist.
pub async fn init_db(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS players (
            id INTEGER PRIMARY KEY,
            handle TEXT UNIQUE NOT NULL,
            elo INTEGER NOT NULL DEFAULT 10,
            wins INTEGER NOT NULL DEFAULT 0,
            losses INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS duels (
            id INTEGER PRIMARY KEY,
            game_id TEXT UNIQUE NOT NULL,
            player1 TEXT NOT NULL,
            player2 TEXT NOT NULL,
            winner TEXT,
            player1_score REAL,
            player2_score REAL,
            target TEXT NOT NULL,
            source TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Persist a completed duel and adjust both players' elo. A tie counts as a
/// loss for both sides. Idempotent per game id: a duel that was already
/// recorded is skipped entirely.
pub async fn record_duel(pool: &SqlitePool, game: &Game) -> Result<(), sqlx::Error> {
    if game.players.len() != 2 {
        return Ok(());
    }
    let p1 = &game.players[0];
    let p2 = &game.players[1];

    let inserted = sqlx::query(
        "INSERT INTO duels (game_id, player1, player2, winner, player1_score, player2_score, target, source)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(game_id) DO NOTHING",
    )
    .bind(&game.id)
    .bind(p1)
    .bind(p2)
    .bind(&game.winner)
    .bind(game.scores.get(p1))
    .bind(game.scores.get(p2))
    .bind(&game.target)
    .bind(format!("{:?}", game.source).to_lowercase())
    .execute(pool)
    .await?;

    if inserted.rows_affected() == 0 {
        return Ok(());
    }

    let p1_won = game.winner.as_deref() == Some(p1.as_str());
    let p2_won = game.winner.as_deref() == Some(p2.as_str());
    apply_result(pool, p1, p1_won).await?;
    apply_result(pool, p2, p2_won).await?;

    Ok(())
}

async fn apply_result(pool: &SqlitePool, handle: &str, won: bool) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO players (handle, elo) VALUES (?1, ?2) ON CONFLICT(handle) DO NOTHING")
        .bind(handle)
        .bind(STARTING_ELO)
        .execute(pool)
        .await?;

    if won {
        sqlx::query("UPDATE players SET elo = elo + ?1, wins = wins + 1 WHERE handle = ?2")
            .bind(ELO_STEP)
            .bind(handle)
            .execute(pool)
            .await?;
    } else {
        sqlx::query(
            "UPDATE players SET elo = MAX(0, elo - ?1), losses = losses + 1 WHERE handle = ?2",
        )
        .bind(ELO_STEP)
        .bind(handle)
        .execute(pool)
        .await?;
    }

    Ok(())
}

/// Top players by elo.
pub async fn get_leaderboard(
    pool: &SqlitePool,
    limit: i64,
) -> Result<Vec<LeaderboardEntry>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT handle, elo, wins, losses FROM players ORDER BY elo DESC, handle ASC LIMIT ?1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .enumerate()
        .map(|(i, r)| LeaderboardEntry {
            rank: (i + 1) as u32,
            handle: r.get("handle"),
            elo: r.get("elo"),
            wins: r.get::<i64, _>("wins") as u32,
            losses: r.get::<i64, _>("losses") as u32,
        })
        .collect())
}
