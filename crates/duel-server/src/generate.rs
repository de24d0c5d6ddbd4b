use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use duel_core::error::ServiceError;
use duel_core::model::Artifact;
use duel_core::scoring::{clamp_score, heuristic_score};

use crate::game;
use crate::state::AppState;

/// Seam to the external generation/scoring capability. Calls are bounded by
/// a timeout; a failure must never mutate game state.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Turn a player prompt into a web artifact.
    async fn generate(&self, prompt: &str) -> Result<Artifact, ServiceError>;

    /// Judge an artifact against the assigned target. Returns 0-100.
    async fn score(&self, artifact: &Artifact, target: &str) -> Result<f64, ServiceError>;
}

/// Deterministic built-in generator used when no remote backend is
/// configured. Wraps the prompt in a prototype section and scores it with
/// the vocabulary heuristic.
pub struct HeuristicGenerator;

#[async_trait]
impl Generator for HeuristicGenerator {
    async fn generate(&self, prompt: &str) -> Result<Artifact, ServiceError> {
        Ok(Artifact {
            markup: format!(
                "<section class=\"prototype\">Generated concept for: {}</section>",
                prompt
            ),
            style: String::new(),
            behavior: String::new(),
        })
    }

    async fn score(&self, artifact: &Artifact, _target: &str) -> Result<f64, ServiceError> {
        Ok(heuristic_score(&artifact.markup))
    }
}

/// Remote generation backend spoken to over HTTP.
pub struct RemoteGenerator {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ScoreReply {
    score: f64,
}

impl RemoteGenerator {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        RemoteGenerator { client, base_url }
    }

    fn wire_error(err: reqwest::Error) -> ServiceError {
        if err.is_timeout() {
            ServiceError::generation("generation backend timed out.")
        } else {
            ServiceError::generation(format!("generation backend failed: {}", err))
        }
    }
}

#[async_trait]
impl Generator for RemoteGenerator {
    async fn generate(&self, prompt: &str) -> Result<Artifact, ServiceError> {
        let resp = self
            .client
            .post(format!("{}/generate", self.base_url))
            .json(&json!({ "prompt": prompt }))
            .send()
            .await
            .map_err(Self::wire_error)?;
        if !resp.status().is_success() {
            return Err(ServiceError::generation(format!(
                "generation backend returned {}.",
                resp.status()
            )));
        }
        resp.json::<Artifact>().await.map_err(Self::wire_error)
    }

    async fn score(&self, artifact: &Artifact, target: &str) -> Result<f64, ServiceError> {
        let resp = self
            .client
            .post(format!("{}/score", self.base_url))
            .json(&json!({ "artifact": artifact, "target": target }))
            .send()
            .await
            .map_err(Self::wire_error)?;
        if !resp.status().is_success() {
            return Err(ServiceError::generation(format!(
                "scoring backend returned {}.",
                resp.status()
            )));
        }
        let reply: ScoreReply = resp.json().await.map_err(Self::wire_error)?;
        Ok(clamp_score(reply.score))
    }
}

/// Build a generator from the environment: remote when `GENERATOR_URL` is
/// set, built-in heuristic otherwise.
pub fn from_env() -> Box<dyn Generator> {
    match std::env::var("GENERATOR_URL") {
        Ok(url) if !url.is_empty() => {
            let timeout = std::env::var("GENERATION_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30);
            Box::new(RemoteGenerator::new(url, Duration::from_secs(timeout)))
        }
        _ => Box::new(HeuristicGenerator),
    }
}

/// Hand a generation task to the worker pool. The calling operation returns
/// once the task is spawned; the completion callback re-enters the game
/// update path through `on_artifact_ready`.
pub fn dispatch(state: Arc<AppState>, game_id: String, player: String, prompt: String) {
    tokio::spawn(async move {
        match state.generator.generate(&prompt).await {
            Ok(artifact) => {
                if let Err(err) = game::on_artifact_ready(&state, &game_id, &player, artifact).await
                {
                    println!("artifact pipeline failed for {}: {}", game_id, err);
                }
            }
            Err(err) => {
                println!("generation failed for {}/{}: {}", game_id, player, err);
            }
        }
    });
}
