use serde::{Deserialize, Serialize};

/// One picture/word pair belonging to a single track.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub id: u32,
    pub word: String,
    /// File name relative to the track's image directory.
    pub image: String,
}

/// A named lesson unit with its own flashcards and audio.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: u32,
    pub name: String,
    /// Number of pairs a pairing game must find; equals `cards.len()` in a valid catalog.
    pub expected_pair_count: usize,
    pub cards: Vec<Flashcard>,
}

impl Track {
    pub fn card(&self, card_id: u32) -> Option<&Flashcard> {
        self.cards.iter().find(|c| c.id == card_id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
