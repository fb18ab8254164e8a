use std::time::{Duration, Instant};

/// A transition waiting for its delay to elapse, tagged with the epoch that
/// was current when it was scheduled.
#[derive(Clone, Debug)]
struct Deferred<A> {
    due: Instant,
    epoch: u64,
    action: A,
}

/// Epoch-tagged queue of delayed transitions.
///
/// Every session reset advances the epoch. Entries scheduled under an older
/// epoch are discarded when they come due instead of firing.
#[derive(Clone, Debug)]
pub struct Timeline<A> {
    epoch: u64,
    pending: Vec<Deferred<A>>,
}

impl<A> Default for Timeline<A> {
    fn default() -> Self {
        Self {
            epoch: 0,
            pending: Vec::new(),
        }
    }
}

impl<A: std::fmt::Debug> Timeline<A> {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn advance_epoch(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }

    pub fn schedule(&mut self, now: Instant, delay: Duration, action: A) {
        self.pending.push(Deferred {
            due: now + delay,
            epoch: self.epoch,
            action,
        });
    }

    /// Removes every entry due at `now` and returns the live ones in due order.
    pub fn drain_due(&mut self, now: Instant) -> Vec<A> {
        let (mut due, rest): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|d| d.due <= now);
        self.pending = rest;
        due.sort_by_key(|d| d.due);

        let epoch = self.epoch;
        due.into_iter()
            .filter_map(|d| {
                if d.epoch == epoch {
                    Some(d.action)
                } else {
                    tracing::debug!(
                        stale_epoch = d.epoch,
                        epoch,
                        action = ?d.action,
                        "dropping stale transition"
                    );
                    None
                }
            })
            .collect()
    }

    /// True when a transition for the current epoch is still waiting.
    pub fn is_busy(&self) -> bool {
        self.pending.iter().any(|d| d.epoch == self.epoch)
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.pending
            .iter()
            .filter(|d| d.epoch == self.epoch)
            .map(|d| d.due)
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    enum Step {
        Flip,
        Next,
    }

    #[test]
    fn test_fires_only_when_due() {
        let start = Instant::now();
        let mut timeline = Timeline::default();
        timeline.schedule(start, Duration::from_millis(500), Step::Flip);

        assert!(timeline.drain_due(start + Duration::from_millis(499)).is_empty());
        assert!(timeline.is_busy());
        assert_eq!(
            timeline.drain_due(start + Duration::from_millis(500)),
            vec![Step::Flip]
        );
        assert!(!timeline.is_busy());
        assert!(timeline.drain_due(start + Duration::from_secs(5)).is_empty());
    }

    #[test]
    fn test_due_order() {
        let start = Instant::now();
        let mut timeline = Timeline::default();
        timeline.schedule(start, Duration::from_millis(900), Step::Next);
        timeline.schedule(start, Duration::from_millis(100), Step::Flip);
        assert_eq!(timeline.next_due(), Some(start + Duration::from_millis(100)));
        assert_eq!(
            timeline.drain_due(start + Duration::from_secs(1)),
            vec![Step::Flip, Step::Next]
        );
    }

    #[test]
    fn test_stale_epoch_is_dropped() {
        let start = Instant::now();
        let mut timeline = Timeline::default();
        timeline.schedule(start, Duration::from_millis(500), Step::Next);
        timeline.advance_epoch();

        assert!(!timeline.is_busy());
        assert_eq!(timeline.next_due(), None);
        assert!(timeline.drain_due(start + Duration::from_secs(1)).is_empty());

        timeline.schedule(start, Duration::from_millis(10), Step::Flip);
        assert_eq!(
            timeline.drain_due(start + Duration::from_secs(1)),
            vec![Step::Flip]
        );
    }
}
