//! Round engine shared by the review games.
//!
//! [`session::SessionController`] owns one game session for one track. The
//! boards and rounds below it are plain state machines; all timing goes
//! through the epoch-tagged [`timeline::Timeline`].

pub mod assets;
pub mod error;
pub mod matching;
pub mod memory;
pub mod round;
pub mod session;
pub mod shuffle;
pub mod tally;
pub mod timeline;

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use assets::{AssetLayout, VoicePathShape};
pub use error::EngineError;
pub use session::{Game, Selection, SelectionOutcome, SessionController};
pub use tally::Tally;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    MemoryMatch,
    PictureWordMatch,
    ListenVerify,
    TouchQuiz,
}

impl GameMode {
    pub const ALL: [GameMode; 4] = [
        GameMode::MemoryMatch,
        GameMode::PictureWordMatch,
        GameMode::ListenVerify,
        GameMode::TouchQuiz,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GameMode::MemoryMatch => "memory",
            GameMode::PictureWordMatch => "matching",
            GameMode::ListenVerify => "listen",
            GameMode::TouchQuiz => "touch",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GameMode::MemoryMatch => "Memory Game",
            GameMode::PictureWordMatch => "Matching Game",
            GameMode::ListenVerify => "Listen & Verify",
            GameMode::TouchQuiz => "Touch Game",
        }
    }

    /// Pairing games end once every pair is found; quizzes run until left.
    pub fn is_pairing(self) -> bool {
        matches!(self, GameMode::MemoryMatch | GameMode::PictureWordMatch)
    }

    /// Smallest card pool the mode can sample from.
    pub fn min_cards(self) -> usize {
        if self.is_pairing() { 1 } else { 2 }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timings {
    /// How long a flipped memory pair stays visible.
    pub memory_reveal: Duration,
    /// How long a wrong picture/word pair stays flagged.
    pub matching_reveal: Duration,
    /// Feedback time before the next quiz round.
    pub quiz_advance: Duration,
    /// Pause between showing a quiz round and playing its audio cue.
    pub prompt_delay: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            memory_reveal: Duration::from_millis(1000),
            matching_reveal: Duration::from_millis(500),
            quiz_advance: Duration::from_millis(1500),
            prompt_delay: Duration::from_millis(1000),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineSettings {
    pub timings: Timings,
    pub assets: AssetLayout,
    pub listen_voice: VoicePathShape,
    pub touch_voice: VoicePathShape,
}

impl EngineSettings {
    pub fn voice_shape(&self, mode: GameMode) -> VoicePathShape {
        match mode {
            GameMode::TouchQuiz => self.touch_voice,
            _ => self.listen_voice,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            timings: Timings::default(),
            assets: AssetLayout::default(),
            listen_voice: VoicePathShape::TrackScoped,
            touch_voice: VoicePathShape::Flat,
        }
    }
}
