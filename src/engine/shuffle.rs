use rand::Rng;

use crate::catalog::Flashcard;

/// Upper bound on rejection-sampling draws before falling back to an explicit
/// pick among the remaining cards.
const MAX_DRAWS: usize = 64;

/// In-place Fisher–Yates shuffle: for each index from last to first, swap with
/// a uniformly chosen index in `[0, i]`.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

pub fn pick<'a, R: Rng + ?Sized>(cards: &'a [Flashcard], rng: &mut R) -> Option<&'a Flashcard> {
    if cards.is_empty() {
        return None;
    }
    cards.get(rng.gen_range(0..cards.len()))
}

/// Uniformly draws a card whose id differs from `exclude`.
///
/// Requires a pool of at least two cards. Calling it on a smaller pool is a
/// programming error; debug builds assert, release builds return `None`.
pub fn pick_distinct<'a, R: Rng + ?Sized>(
    cards: &'a [Flashcard],
    exclude: u32,
    rng: &mut R,
) -> Option<&'a Flashcard> {
    debug_assert!(cards.len() >= 2, "distinct draw from a pool of {}", cards.len());

    for _ in 0..MAX_DRAWS {
        let card = pick(cards, rng)?;
        if card.id != exclude {
            return Some(card);
        }
    }

    let others: Vec<&Flashcard> = cards.iter().filter(|c| c.id != exclude).collect();
    if others.is_empty() {
        return None;
    }
    Some(others[rng.gen_range(0..others.len())])
}
