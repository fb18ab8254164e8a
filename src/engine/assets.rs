use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::catalog::{Flashcard, Track};

/// Where per-card pronunciation audio lives relative to the voice root.
///
/// Listen & Verify historically reads `voice/track{t}/card{c}`, the touch quiz
/// reads `voice/card{c}`. Both layouts exist in deployed asset trees, so the
/// shape is chosen per mode rather than unified.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoicePathShape {
    TrackScoped,
    Flat,
}

impl VoicePathShape {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TrackScoped => "track_scoped",
            Self::Flat => "flat",
        }
    }
}

/// File naming convention for lesson assets, rooted at `root`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetLayout {
    pub root: PathBuf,
    pub audio_extension: String,
}

impl AssetLayout {
    pub fn new(root: impl Into<PathBuf>, audio_extension: &str) -> Self {
        Self {
            root: root.into(),
            audio_extension: audio_extension.trim_start_matches('.').to_string(),
        }
    }

    /// `images/flashcards/track{trackId}/{card.image}`
    pub fn image_path(&self, track: &Track, card: &Flashcard) -> PathBuf {
        self.root
            .join("images")
            .join("flashcards")
            .join(format!("track{}", track.id))
            .join(&card.image)
    }

    /// `audio/voice/track{trackId}/card{cardId}.{ext}` or `audio/voice/card{cardId}.{ext}`
    pub fn voice_path(&self, track: &Track, card: &Flashcard, shape: VoicePathShape) -> PathBuf {
        let voice = self.root.join("audio").join("voice");
        let file = format!("card{}.{}", card.id, self.audio_extension);
        match shape {
            VoicePathShape::TrackScoped => voice.join(format!("track{}", track.id)).join(file),
            VoicePathShape::Flat => voice.join(file),
        }
    }

    /// `audio/track{trackId}.{ext}`
    pub fn lesson_path(&self, track: &Track) -> PathBuf {
        self.root
            .join("audio")
            .join(format!("track{}.{}", track.id, self.audio_extension))
    }
}

impl Default for AssetLayout {
    fn default() -> Self {
        Self::new(".", "mp3")
    }
}
