use serde::{Deserialize, Serialize};

/// Running score for one game session. `score <= attempts` always holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub score: u32,
    pub attempts: u32,
}

impl Tally {
    pub fn record(&mut self, correct: bool) {
        self.attempts += 1;
        if correct {
            self.score += 1;
        }
        debug_assert!(self.score <= self.attempts);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn accuracy(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        self.score as f64 / self.attempts as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_reset() {
        let mut tally = Tally::default();
        tally.record(true);
        tally.record(false);
        tally.record(true);
        assert_eq!(tally, Tally { score: 2, attempts: 3 });
        assert!((tally.accuracy() - 66.666).abs() < 0.01);

        tally.reset();
        assert_eq!(tally, Tally::default());
        assert_eq!(tally.accuracy(), 0.0);
    }
}
