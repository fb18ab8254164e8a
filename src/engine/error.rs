use thiserror::Error;

use crate::engine::GameMode;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("no track named {name:?}")]
    TrackNotFound { name: String },

    #[error("{mode} needs at least {needed} flashcards but track {track:?} has {available}")]
    InsufficientCards {
        track: String,
        mode: GameMode,
        needed: usize,
        available: usize,
    },
}

pub type Result<T> = std::result::Result<T, EngineError>;
