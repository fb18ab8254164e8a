//! Static track/flashcard catalog.
//!
//! The bundled catalog is compiled in from `assets/catalog/tracks.toml`. A user
//! catalog with the same layout can replace it at startup. Either way the
//! catalog is validated once on load and is immutable afterwards.

pub mod track;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use rust_embed::Embed;
use serde::Deserialize;
use thiserror::Error;

pub use track::{Flashcard, Track};

#[derive(Embed)]
#[folder = "assets/catalog/"]
struct CatalogAssets;

const BUNDLED_CATALOG: &str = "tracks.toml";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("bundled catalog is missing")]
    MissingBundle,

    #[error("track {track_id} has no flashcards")]
    EmptyTrack { track_id: u32 },

    #[error("track {track_id} expects {expected} pairs but has {actual} cards")]
    PairCountMismatch {
        track_id: u32,
        expected: usize,
        actual: usize,
    },

    #[error("track {track_id} has duplicate card id {card_id}")]
    DuplicateCardId { track_id: u32, card_id: u32 },

    #[error("duplicate track id {0}")]
    DuplicateTrackId(u32),

    #[error("duplicate track name {0:?}")]
    DuplicateTrackName(String),
}

#[derive(Deserialize)]
struct CatalogFile {
    tracks: Vec<Track>,
}

#[derive(Clone, Debug)]
pub struct Catalog {
    tracks: Vec<Track>,
}

impl Catalog {
    pub fn bundled() -> Result<Self, CatalogError> {
        let file = CatalogAssets::get(BUNDLED_CATALOG).ok_or(CatalogError::MissingBundle)?;
        let content = String::from_utf8_lossy(file.data.as_ref());
        Self::from_toml(&content)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(content)?;
        Self::new(file.tracks)
    }

    pub fn new(tracks: Vec<Track>) -> Result<Self, CatalogError> {
        validate(&tracks)?;
        Ok(Self { tracks })
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn lookup_by_name(&self, name: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.name == name)
    }

    pub fn by_id(&self, id: u32) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn card(&self, track_id: u32, card_id: u32) -> Option<&Flashcard> {
        self.by_id(track_id).and_then(|t| t.card(card_id))
    }

    /// Track after (or before) `current` in catalog order, wrapping around.
    pub fn neighbor(&self, current: u32, forward: bool) -> Option<&Track> {
        let pos = self.tracks.iter().position(|t| t.id == current)?;
        let len = self.tracks.len();
        let next = if forward {
            (pos + 1) % len
        } else {
            (pos + len - 1) % len
        };
        self.tracks.get(next)
    }
}

fn validate(tracks: &[Track]) -> Result<(), CatalogError> {
    let mut track_ids = HashSet::new();
    let mut names = HashSet::new();
    for track in tracks {
        if !track_ids.insert(track.id) {
            return Err(CatalogError::DuplicateTrackId(track.id));
        }
        if !names.insert(track.name.as_str()) {
            return Err(CatalogError::DuplicateTrackName(track.name.clone()));
        }
        if track.cards.is_empty() {
            return Err(CatalogError::EmptyTrack { track_id: track.id });
        }
        // Pairing games are only winnable when every card forms one pair.
        if track.expected_pair_count != track.cards.len() {
            return Err(CatalogError::PairCountMismatch {
                track_id: track.id,
                expected: track.expected_pair_count,
                actual: track.cards.len(),
            });
        }
        let mut card_ids = HashSet::new();
        for card in &track.cards {
            if !card_ids.insert(card.id) {
                return Err(CatalogError::DuplicateCardId {
                    track_id: track.id,
                    card_id: card.id,
                });
            }
        }
    }
    Ok(())
}
