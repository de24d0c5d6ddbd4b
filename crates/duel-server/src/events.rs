use duel_core::protocol::Event;

use crate::state::AppState;

/// One message pushed into the notification sink: a topic plus the event.
/// The transport that fans these out to clients is external to the core.
#[derive(Clone, Debug)]
pub struct Envelope {
    pub topic: String,
    pub event: Event,
}

pub fn lobby_topic(lobby_id: &str) -> String {
    format!("lobby/{}", lobby_id)
}

pub fn game_topic(game_id: &str) -> String {
    format!("game/{}", game_id)
}

/// Publish an event. A sink with no subscribers drops the event silently.
pub fn publish(state: &AppState, topic: String, event: Event) {
    let _ = state.events.send(Envelope { topic, event });
}
