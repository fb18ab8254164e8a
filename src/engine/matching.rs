use std::collections::BTreeSet;

use rand::Rng;

use crate::catalog::Flashcard;
use crate::engine::shuffle::shuffle;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoolPick {
    Ignored,
    Held,
    Resolved { correct: bool },
}

/// Wrong image/word pair shown until the reveal delay ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mismatch {
    pub image: u32,
    pub word: u32,
}

/// Picture/word pools. Images are shuffled once per game, words keep catalog order.
#[derive(Clone, Debug)]
pub struct MatchingBoard {
    images: Vec<Flashcard>,
    words: Vec<Flashcard>,
    held: Option<u32>,
    resolved: BTreeSet<u32>,
    mismatch: Option<Mismatch>,
    locked: bool,
}

impl MatchingBoard {
    pub fn new<R: Rng + ?Sized>(cards: &[Flashcard], rng: &mut R) -> Self {
        let mut images = cards.to_vec();
        shuffle(&mut images, rng);
        Self {
            images,
            words: cards.to_vec(),
            held: None,
            resolved: BTreeSet::new(),
            mismatch: None,
            locked: false,
        }
    }

    pub fn images(&self) -> &[Flashcard] {
        &self.images
    }

    pub fn words(&self) -> &[Flashcard] {
        &self.words
    }

    pub fn held(&self) -> Option<u32> {
        self.held
    }

    pub fn mismatch(&self) -> Option<Mismatch> {
        self.mismatch
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_resolved(&self, card_id: u32) -> bool {
        self.resolved.contains(&card_id)
    }

    pub fn resolved_count(&self) -> usize {
        self.resolved.len()
    }

    pub fn select_image(&mut self, card_id: u32) -> PoolPick {
        if self.locked || self.is_resolved(card_id) || !self.images.iter().any(|c| c.id == card_id)
        {
            return PoolPick::Ignored;
        }
        self.held = Some(card_id);
        PoolPick::Held
    }

    pub fn select_word(&mut self, card_id: u32) -> PoolPick {
        if self.locked || self.is_resolved(card_id) || !self.words.iter().any(|c| c.id == card_id) {
            return PoolPick::Ignored;
        }
        let Some(image) = self.held.take() else {
            return PoolPick::Ignored;
        };

        let correct = image == card_id;
        if correct {
            self.resolved.insert(card_id);
        } else {
            self.mismatch = Some(Mismatch {
                image,
                word: card_id,
            });
        }
        self.locked = true;
        PoolPick::Resolved { correct }
    }

    pub fn settle(&mut self) {
        self.mismatch = None;
        self.locked = false;
    }
}
