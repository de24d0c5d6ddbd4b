pub mod error;
pub mod ids;
pub mod model;
pub mod protocol;
pub mod scoring;
pub mod targets;
pub mod validation;

pub use error::ServiceError;
pub use model::{Artifact, Game, GameSource, GameStatus, Lobby, LobbyStatus};
pub use protocol::{CancelReply, Event, QueueReply};
