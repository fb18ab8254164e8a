use rand::Rng;

use crate::catalog::Flashcard;
use crate::engine::shuffle::shuffle;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemorySlot {
    pub card: Flashcard,
    pub matched: bool,
}

/// Result of turning a slot face up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flip {
    Ignored,
    First,
    Pair { matched: bool },
}

/// Face-down board holding two slots per flashcard.
#[derive(Clone, Debug)]
pub struct MemoryBoard {
    slots: Vec<MemorySlot>,
    flipped: Vec<usize>,
    checking: bool,
}

impl MemoryBoard {
    pub fn new<R: Rng + ?Sized>(cards: &[Flashcard], rng: &mut R) -> Self {
        let mut slots: Vec<MemorySlot> = cards
            .iter()
            .flat_map(|card| {
                [
                    MemorySlot {
                        card: card.clone(),
                        matched: false,
                    },
                    MemorySlot {
                        card: card.clone(),
                        matched: false,
                    },
                ]
            })
            .collect();
        shuffle(&mut slots, rng);
        Self {
            slots,
            flipped: Vec::with_capacity(2),
            checking: false,
        }
    }

    pub fn slots(&self) -> &[MemorySlot] {
        &self.slots
    }

    pub fn flipped(&self) -> &[usize] {
        &self.flipped
    }

    pub fn is_checking(&self) -> bool {
        self.checking
    }

    pub fn is_face_up(&self, slot: usize) -> bool {
        self.flipped.contains(&slot) || self.slots.get(slot).is_some_and(|s| s.matched)
    }

    pub fn matched_pairs(&self) -> usize {
        self.slots.iter().filter(|s| s.matched).count() / 2
    }

    pub fn flip(&mut self, slot: usize) -> Flip {
        if self.checking || self.flipped.contains(&slot) {
            return Flip::Ignored;
        }
        match self.slots.get(slot) {
            Some(s) if !s.matched => {}
            _ => return Flip::Ignored,
        }

        self.flipped.push(slot);
        if self.flipped.len() < 2 {
            return Flip::First;
        }

        self.checking = true;
        let (a, b) = (self.flipped[0], self.flipped[1]);
        let matched = a != b && self.slots[a].card.id == self.slots[b].card.id;
        if matched {
            self.slots[a].matched = true;
            self.slots[b].matched = true;
        }
        Flip::Pair { matched }
    }

    /// Ends the reveal delay: face-up unmatched slots turn back over.
    pub fn settle(&mut self) {
        self.flipped.clear();
        self.checking = false;
    }
}
