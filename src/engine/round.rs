use rand::Rng;

use crate::catalog::Flashcard;
use crate::engine::shuffle::{pick, pick_distinct};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Pending,
    Correct,
    Incorrect,
}

impl Outcome {
    fn from_correct(correct: bool) -> Self {
        if correct { Self::Correct } else { Self::Incorrect }
    }
}

/// Quiz rounds start `Cueing` (prompt audio not yet requested), become `Open`
/// once the cue plays, and end `Resolved` after one answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundPhase {
    Cueing,
    Open,
    Resolved,
}

/// One question/answer cycle of an audio quiz.
#[derive(Clone, Debug)]
pub struct Round {
    /// Card whose pronunciation is played.
    pub prompt: Flashcard,
    /// Cards on screen: one for Listen & Verify, two for the touch quiz.
    pub candidates: Vec<Flashcard>,
    pub outcome: Outcome,
    pub phase: RoundPhase,
}

impl Round {
    fn new(prompt: Flashcard, candidates: Vec<Flashcard>) -> Self {
        Self {
            prompt,
            candidates,
            outcome: Outcome::Pending,
            phase: RoundPhase::Cueing,
        }
    }

    /// Listen & Verify: half the time the shown card differs from the prompt.
    pub fn listen<R: Rng + ?Sized>(cards: &[Flashcard], rng: &mut R) -> Option<Self> {
        let prompt = pick(cards, rng)?;
        let shown = if rng.gen_bool(0.5) {
            pick_distinct(cards, prompt.id, rng)?
        } else {
            prompt
        };
        Some(Self::new(prompt.clone(), vec![shown.clone()]))
    }

    /// Touch quiz: the prompt card and one distinct decoy in random order.
    pub fn touch<R: Rng + ?Sized>(cards: &[Flashcard], rng: &mut R) -> Option<Self> {
        let prompt = pick(cards, rng)?;
        let decoy = pick_distinct(cards, prompt.id, rng)?;
        let candidates = if rng.gen_bool(0.5) {
            vec![prompt.clone(), decoy.clone()]
        } else {
            vec![decoy.clone(), prompt.clone()]
        };
        Some(Self::new(prompt.clone(), candidates))
    }

    pub fn resolved(&self) -> bool {
        self.outcome != Outcome::Pending
    }

    pub fn is_open(&self) -> bool {
        self.phase == RoundPhase::Open
    }

    pub fn open(&mut self) {
        if self.phase == RoundPhase::Cueing {
            self.phase = RoundPhase::Open;
        }
    }

    /// Card shown to the player in Listen & Verify.
    pub fn shown(&self) -> &Flashcard {
        &self.candidates[0]
    }

    pub fn answer_listen(&mut self, said_yes: bool) -> Option<bool> {
        if !self.is_open() {
            return None;
        }
        let correct = judge_listen(&self.prompt, self.shown(), said_yes);
        self.resolve(correct);
        Some(correct)
    }

    pub fn answer_touch(&mut self, card_id: u32) -> Option<bool> {
        if !self.is_open() || !self.candidates.iter().any(|c| c.id == card_id) {
            return None;
        }
        let correct = card_id == self.prompt.id;
        self.resolve(correct);
        Some(correct)
    }

    fn resolve(&mut self, correct: bool) {
        self.outcome = Outcome::from_correct(correct);
        self.phase = RoundPhase::Resolved;
    }
}

pub fn judge_listen(reference: &Flashcard, shown: &Flashcard, said_yes: bool) -> bool {
    let same = reference.id == shown.id;
    (said_yes && same) || (!said_yes && !same)
}
