use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::catalog::{Catalog, Track};
use crate::engine::error::{EngineError, Result};
use crate::engine::matching::{MatchingBoard, PoolPick};
use crate::engine::memory::{Flip, MemoryBoard};
use crate::engine::round::Round;
use crate::engine::tally::Tally;
use crate::engine::timeline::Timeline;
use crate::engine::{EngineSettings, GameMode};
use crate::media::{MediaPlayer, play_or_log};

/// Player input, keyed by board slot or card id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    /// Memory board slot index.
    Slot(usize),
    /// Picture pool entry.
    Image(u32),
    /// Word pool entry.
    Word(u32),
    /// Listen & Verify yes/no.
    Answer(bool),
    /// Touch quiz candidate.
    Candidate(u32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionOutcome {
    Ignored,
    /// First half of a pair was accepted.
    Held,
    Resolved { correct: bool, completed: bool },
}

#[derive(Clone, Debug)]
pub enum Game {
    Memory(MemoryBoard),
    Matching(MatchingBoard),
    Quiz(Round),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Transition {
    Settle,
    CuePrompt,
    NextRound,
}

/// Owns one game session: tally, active board or round, and pending transitions.
pub struct SessionController {
    mode: GameMode,
    track: Track,
    settings: EngineSettings,
    rng: SmallRng,
    timeline: Timeline<Transition>,
    tally: Tally,
    game: Game,
    completed: bool,
    /// Set when a track change fails; the session then ignores all input.
    closed: bool,
}

impl SessionController {
    pub fn start(
        catalog: &Catalog,
        track_name: &str,
        mode: GameMode,
        settings: EngineSettings,
        now: Instant,
    ) -> Result<Self> {
        Self::start_with_rng(catalog, track_name, mode, settings, now, SmallRng::from_entropy())
    }

    pub fn start_with_rng(
        catalog: &Catalog,
        track_name: &str,
        mode: GameMode,
        settings: EngineSettings,
        now: Instant,
        mut rng: SmallRng,
    ) -> Result<Self> {
        let track = catalog
            .lookup_by_name(track_name)
            .cloned()
            .ok_or_else(|| EngineError::TrackNotFound {
                name: track_name.to_string(),
            })?;
        let game = new_game(mode, &track, &mut rng)?;

        let mut session = Self {
            mode,
            track,
            settings,
            rng,
            timeline: Timeline::default(),
            tally: Tally::default(),
            game,
            completed: false,
            closed: false,
        };
        session.begin(now);
        Ok(session)
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn tally(&self) -> Tally {
        self.tally
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn epoch(&self) -> u64 {
        self.timeline.epoch()
    }

    /// True while a reveal or advance delay is running.
    pub fn is_busy(&self) -> bool {
        self.timeline.is_busy()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.timeline.next_due()
    }

    /// Starts over on the same track.
    pub fn restart(&mut self, now: Instant, player: &mut dyn MediaPlayer) -> Result<()> {
        player.stop();
        self.timeline.advance_epoch();
        self.game = new_game(self.mode, &self.track, &mut self.rng)?;
        self.closed = false;
        self.begin(now);
        Ok(())
    }

    /// Switches to `track`, cancelling playback and every pending transition of
    /// the old session first. On error the session is closed and ignores input
    /// until restarted; the caller should drop it.
    pub fn change_track(
        &mut self,
        track: Track,
        now: Instant,
        player: &mut dyn MediaPlayer,
    ) -> Result<()> {
        player.stop();
        let epoch = self.timeline.advance_epoch();
        tracing::info!(from = self.track.id, to = track.id, epoch, "track changed");

        self.game = match new_game(self.mode, &track, &mut self.rng) {
            Ok(game) => game,
            Err(err) => {
                self.closed = true;
                return Err(err);
            }
        };
        self.track = track;
        self.begin(now);
        Ok(())
    }

    pub fn select(
        &mut self,
        selection: Selection,
        now: Instant,
        player: &mut dyn MediaPlayer,
    ) -> SelectionOutcome {
        if self.closed {
            return SelectionOutcome::Ignored;
        }
        let timings = self.settings.timings;
        let mode = self.mode;
        let resolved: Option<(bool, Duration, Transition)> = match (&mut self.game, selection) {
            (Game::Memory(board), Selection::Slot(slot)) => match board.flip(slot) {
                Flip::Ignored => return SelectionOutcome::Ignored,
                Flip::First => return SelectionOutcome::Held,
                Flip::Pair { matched } => Some((matched, timings.memory_reveal, Transition::Settle)),
            },
            (Game::Matching(board), Selection::Image(id)) => match board.select_image(id) {
                PoolPick::Held => return SelectionOutcome::Held,
                _ => return SelectionOutcome::Ignored,
            },
            (Game::Matching(board), Selection::Word(id)) => match board.select_word(id) {
                PoolPick::Resolved { correct } => {
                    Some((correct, timings.matching_reveal, Transition::Settle))
                }
                _ => return SelectionOutcome::Ignored,
            },
            (Game::Quiz(round), Selection::Answer(said_yes)) if mode == GameMode::ListenVerify => {
                round
                    .answer_listen(said_yes)
                    .map(|correct| (correct, timings.quiz_advance, Transition::NextRound))
            }
            (Game::Quiz(round), Selection::Candidate(id)) if mode == GameMode::TouchQuiz => {
                round
                    .answer_touch(id)
                    .map(|correct| (correct, timings.quiz_advance, Transition::NextRound))
            }
            _ => None,
        };

        let Some((correct, delay, then)) = resolved else {
            return SelectionOutcome::Ignored;
        };
        if then == Transition::NextRound {
            player.stop();
        }
        self.timeline.schedule(now, delay, then);
        let completed = self.record(correct);
        tracing::debug!(
            mode = self.mode.as_str(),
            correct,
            score = self.tally.score,
            attempts = self.tally.attempts,
            "selection resolved"
        );
        SelectionOutcome::Resolved { correct, completed }
    }

    /// Fires every transition that has come due for the current epoch.
    pub fn tick(&mut self, now: Instant, player: &mut dyn MediaPlayer) {
        if self.closed {
            return;
        }
        for transition in self.timeline.drain_due(now) {
            match transition {
                Transition::Settle => match &mut self.game {
                    Game::Memory(board) => board.settle(),
                    Game::Matching(board) => board.settle(),
                    Game::Quiz(_) => {}
                },
                Transition::CuePrompt => self.cue_prompt(player),
                Transition::NextRound => self.next_round(now),
            }
        }
    }

    /// Plays the current quiz prompt again. Returns false when there is nothing to replay.
    pub fn replay_prompt(&self, player: &mut dyn MediaPlayer) -> bool {
        match &self.game {
            Game::Quiz(round) if round.is_open() && !self.closed => {
                let path = self.settings.assets.voice_path(
                    &self.track,
                    &round.prompt,
                    self.settings.voice_shape(self.mode),
                );
                play_or_log(player, &path);
                true
            }
            _ => false,
        }
    }

    fn begin(&mut self, now: Instant) {
        self.tally.reset();
        self.completed = false;
        if matches!(self.game, Game::Quiz(_)) {
            self.timeline
                .schedule(now, self.settings.timings.prompt_delay, Transition::CuePrompt);
        }
        tracing::info!(
            mode = self.mode.as_str(),
            track = %self.track.name,
            voice = self.settings.voice_shape(self.mode).as_str(),
            epoch = self.timeline.epoch(),
            "session started"
        );
    }

    fn record(&mut self, correct: bool) -> bool {
        self.tally.record(correct);
        if !correct || !self.mode.is_pairing() || self.completed {
            return false;
        }
        if self.tally.score as usize == self.track.expected_pair_count {
            self.completed = true;
            tracing::info!(track = %self.track.name, attempts = self.tally.attempts, "all pairs found");
            return true;
        }
        false
    }

    fn cue_prompt(&mut self, player: &mut dyn MediaPlayer) {
        let Game::Quiz(round) = &mut self.game else {
            return;
        };
        let path = self.settings.assets.voice_path(
            &self.track,
            &round.prompt,
            self.settings.voice_shape(self.mode),
        );
        player.stop();
        play_or_log(player, &path);
        round.open();
    }

    fn next_round(&mut self, now: Instant) {
        match new_game(self.mode, &self.track, &mut self.rng) {
            Ok(game) => {
                self.game = game;
                self.timeline
                    .schedule(now, self.settings.timings.prompt_delay, Transition::CuePrompt);
            }
            Err(err) => tracing::warn!("could not generate next round: {err}"),
        }
    }
}

fn new_game(mode: GameMode, track: &Track, rng: &mut SmallRng) -> Result<Game> {
    let insufficient = || EngineError::InsufficientCards {
        track: track.name.clone(),
        mode,
        needed: mode.min_cards(),
        available: track.cards.len(),
    };
    if track.cards.len() < mode.min_cards() {
        return Err(insufficient());
    }

    let game = match mode {
        GameMode::MemoryMatch => Game::Memory(MemoryBoard::new(&track.cards, rng)),
        GameMode::PictureWordMatch => Game::Matching(MatchingBoard::new(&track.cards, rng)),
        GameMode::ListenVerify => Game::Quiz(Round::listen(&track.cards, rng).ok_or_else(insufficient)?),
        GameMode::TouchQuiz => Game::Quiz(Round::touch(&track.cards, rng).ok_or_else(insufficient)?),
    };
    tracing::debug!(mode = mode.as_str(), track = track.id, "generated");
    Ok(game)
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use crate::catalog::Flashcard;
    use crate::engine::round::{Outcome, RoundPhase};
    use crate::media::PlaybackError;

    use super::*;

    #[derive(Default)]
    struct RecordingPlayer {
        played: Vec<PathBuf>,
        stops: usize,
        fail: bool,
    }

    impl MediaPlayer for RecordingPlayer {
        fn play(&mut self, path: &Path) -> std::result::Result<(), PlaybackError> {
            self.played.push(path.to_path_buf());
            if self.fail {
                Err(PlaybackError::MissingFile(path.to_path_buf()))
            } else {
                Ok(())
            }
        }

        fn stop(&mut self) {
            self.stops += 1;
        }

        fn is_playing(&mut self) -> bool {
            false
        }
    }

    fn catalog() -> Catalog {
        let cards = |words: &[&str]| -> Vec<Flashcard> {
            words
                .iter()
                .zip(1..)
                .map(|(w, id)| Flashcard {
                    id,
                    word: w.to_string(),
                    image: format!("card{id}.jpg"),
                })
                .collect()
        };
        Catalog::new(vec![
            Track {
                id: 1,
                name: "ABC".to_string(),
                expected_pair_count: 3,
                cards: cards(&["A", "B", "C"]),
            },
            Track {
                id: 2,
                name: "Pets".to_string(),
                expected_pair_count: 2,
                cards: cards(&["cat", "dog"]),
            },
            Track {
                id: 3,
                name: "Solo".to_string(),
                expected_pair_count: 1,
                cards: cards(&["sun"]),
            },
        ])
        .unwrap()
    }

    fn start(mode: GameMode, track: &str, now: Instant) -> SessionController {
        SessionController::start_with_rng(
            &catalog(),
            track,
            mode,
            EngineSettings::default(),
            now,
            SmallRng::seed_from_u64(17),
        )
        .unwrap()
    }

    fn memory_board(session: &SessionController) -> &MemoryBoard {
        match session.game() {
            Game::Memory(board) => board,
            other => panic!("expected memory board, got {other:?}"),
        }
    }

    fn quiz_round(session: &SessionController) -> &Round {
        match session.game() {
            Game::Quiz(round) => round,
            other => panic!("expected quiz round, got {other:?}"),
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_unknown_track_is_reported() {
        let result = SessionController::start(
            &catalog(),
            "Nope",
            GameMode::MemoryMatch,
            EngineSettings::default(),
            Instant::now(),
        );
        assert!(matches!(result, Err(EngineError::TrackNotFound { .. })));
    }

    #[test]
    fn test_quiz_on_single_card_track_is_insufficient() {
        let result = SessionController::start(
            &catalog(),
            "Solo",
            GameMode::TouchQuiz,
            EngineSettings::default(),
            Instant::now(),
        );
        assert_eq!(
            result.err(),
            Some(EngineError::InsufficientCards {
                track: "Solo".to_string(),
                mode: GameMode::TouchQuiz,
                needed: 2,
                available: 1,
            })
        );
    }

    #[test]
    fn test_memory_full_game_completes_once() {
        let t0 = Instant::now();
        let mut player = RecordingPlayer::default();
        let mut session = start(GameMode::MemoryMatch, "ABC", t0);
        assert_eq!(memory_board(&session).slots().len(), 6);

        let mut now = t0;
        let mut completions = 0;
        for id in 1..=3 {
            let slots: Vec<usize> = memory_board(&session)
                .slots()
                .iter()
                .enumerate()
                .filter(|(_, s)| s.card.id == id)
                .map(|(i, _)| i)
                .collect();
            assert_eq!(session.select(Selection::Slot(slots[0]), now, &mut player), SelectionOutcome::Held);
            match session.select(Selection::Slot(slots[1]), now, &mut player) {
                SelectionOutcome::Resolved { correct: true, completed } => {
                    completions += usize::from(completed)
                }
                other => panic!("unexpected {other:?}"),
            }
            now += ms(1000);
            session.tick(now, &mut player);
        }

        assert_eq!(completions, 1);
        assert!(session.is_complete());
        assert_eq!(session.tally(), Tally { score: 3, attempts: 3 });
        assert_eq!(session.tally().score as usize, session.track().expected_pair_count);
    }

    #[test]
    fn test_memory_selection_dropped_during_reveal() {
        let t0 = Instant::now();
        let mut player = RecordingPlayer::default();
        let mut session = start(GameMode::MemoryMatch, "ABC", t0);
        let board = memory_board(&session);
        let first = 0;
        let wrong = (1..6)
            .find(|&i| board.slots()[i].card.id != board.slots()[0].card.id)
            .unwrap();
        let third = (1..6).find(|&i| i != wrong).unwrap();

        session.select(Selection::Slot(first), t0, &mut player);
        assert_eq!(
            session.select(Selection::Slot(wrong), t0, &mut player),
            SelectionOutcome::Resolved { correct: false, completed: false }
        );
        assert!(session.is_busy());
        assert_eq!(session.select(Selection::Slot(third), t0 + ms(10), &mut player), SelectionOutcome::Ignored);

        session.tick(t0 + ms(999), &mut player);
        assert!(memory_board(&session).is_checking());
        session.tick(t0 + ms(1000), &mut player);
        assert!(!memory_board(&session).is_checking());
        assert!(memory_board(&session).flipped().is_empty());
        assert_eq!(session.tally(), Tally { score: 0, attempts: 1 });
    }

    #[test]
    fn test_wrong_selection_kind_is_ignored() {
        let t0 = Instant::now();
        let mut player = RecordingPlayer::default();
        let mut session = start(GameMode::MemoryMatch, "ABC", t0);
        assert_eq!(session.select(Selection::Answer(true), t0, &mut player), SelectionOutcome::Ignored);
        assert_eq!(session.select(Selection::Word(1), t0, &mut player), SelectionOutcome::Ignored);
    }

    #[test]
    fn test_matching_game_scores_and_completes() {
        let t0 = Instant::now();
        let mut player = RecordingPlayer::default();
        let mut session = start(GameMode::PictureWordMatch, "Pets", t0);

        assert_eq!(session.select(Selection::Image(1), t0, &mut player), SelectionOutcome::Held);
        assert_eq!(
            session.select(Selection::Word(2), t0, &mut player),
            SelectionOutcome::Resolved { correct: false, completed: false }
        );
        session.tick(t0 + ms(500), &mut player);

        session.select(Selection::Image(1), t0 + ms(600), &mut player);
        session.select(Selection::Word(1), t0 + ms(600), &mut player);
        session.tick(t0 + ms(1100), &mut player);
        session.select(Selection::Image(2), t0 + ms(1200), &mut player);
        assert_eq!(
            session.select(Selection::Word(2), t0 + ms(1200), &mut player),
            SelectionOutcome::Resolved { correct: true, completed: true }
        );
        assert_eq!(session.tally(), Tally { score: 2, attempts: 3 });
        assert!(session.is_complete());
    }

    #[test]
    fn test_touch_quiz_round_lifecycle() {
        let t0 = Instant::now();
        let mut player = RecordingPlayer::default();
        let mut session = start(GameMode::TouchQuiz, "ABC", t0);

        let prompt = quiz_round(&session).prompt.id;
        // Not selectable until the cue has played.
        assert_eq!(session.select(Selection::Candidate(prompt), t0, &mut player), SelectionOutcome::Ignored);
        assert!(!session.replay_prompt(&mut player));

        session.tick(t0 + ms(1000), &mut player);
        assert_eq!(
            player.played,
            vec![PathBuf::from(format!("./audio/voice/card{prompt}.mp3"))]
        );
        assert_eq!(quiz_round(&session).phase, RoundPhase::Open);
        assert!(session.replay_prompt(&mut player));

        assert_eq!(
            session.select(Selection::Candidate(prompt), t0 + ms(1200), &mut player),
            SelectionOutcome::Resolved { correct: true, completed: false }
        );
        assert_eq!(quiz_round(&session).outcome, Outcome::Correct);
        // Second answer during feedback is dropped.
        assert_eq!(
            session.select(Selection::Candidate(prompt), t0 + ms(1300), &mut player),
            SelectionOutcome::Ignored
        );

        session.tick(t0 + ms(2700), &mut player);
        assert_eq!(quiz_round(&session).outcome, Outcome::Pending);
        assert_eq!(quiz_round(&session).phase, RoundPhase::Cueing);
        assert_eq!(session.tally(), Tally { score: 1, attempts: 1 });
        assert!(!session.is_complete());
    }

    #[test]
    fn test_listen_verify_uses_track_scoped_voice_path() {
        let t0 = Instant::now();
        let mut player = RecordingPlayer::default();
        let mut session = start(GameMode::ListenVerify, "ABC", t0);
        session.tick(t0 + ms(1000), &mut player);

        let round = quiz_round(&session);
        let prompt = round.prompt.id;
        let same = round.prompt.id == round.shown().id;
        assert_eq!(
            player.played,
            vec![PathBuf::from(format!("./audio/voice/track1/card{prompt}.mp3"))]
        );
        assert_eq!(
            session.select(Selection::Answer(same), t0 + ms(1100), &mut player),
            SelectionOutcome::Resolved { correct: true, completed: false }
        );
    }

    #[test]
    fn test_playback_failure_does_not_block_round() {
        let t0 = Instant::now();
        let mut player = RecordingPlayer {
            fail: true,
            ..Default::default()
        };
        let mut session = start(GameMode::TouchQuiz, "ABC", t0);
        session.tick(t0 + ms(1000), &mut player);
        assert!(quiz_round(&session).is_open());
    }

    #[test]
    fn test_track_change_cancels_pending_transition() {
        let t0 = Instant::now();
        let mut player = RecordingPlayer::default();
        let mut session = start(GameMode::TouchQuiz, "ABC", t0);
        session.tick(t0 + ms(1000), &mut player);
        let prompt = quiz_round(&session).prompt.id;
        session.select(Selection::Candidate(prompt), t0 + ms(1100), &mut player);
        let old_epoch = session.epoch();

        let pets = catalog().lookup_by_name("Pets").cloned().unwrap();
        let stops_before = player.stops;
        session.change_track(pets, t0 + ms(1200), &mut player).unwrap();
        assert!(player.stops > stops_before);
        assert!(session.epoch() > old_epoch);
        assert_eq!(session.tally(), Tally::default());

        // The old NextRound would fire at 2600; it must not replace the new round.
        let fresh = quiz_round(&session).prompt.clone();
        session.tick(t0 + ms(2199), &mut player);
        session.tick(t0 + ms(2600), &mut player);
        let round = quiz_round(&session);
        assert_eq!(round.prompt, fresh);
        assert_eq!(round.outcome, Outcome::Pending);
        assert!(session.track().cards.iter().any(|c| c.id == round.prompt.id));
        assert_eq!(session.tally(), Tally::default());
    }

    #[test]
    fn test_track_change_to_unusable_track_errors() {
        let t0 = Instant::now();
        let mut player = RecordingPlayer::default();
        let mut session = start(GameMode::ListenVerify, "ABC", t0);
        let solo = catalog().lookup_by_name("Solo").cloned().unwrap();
        assert!(matches!(
            session.change_track(solo, t0, &mut player),
            Err(EngineError::InsufficientCards { .. })
        ));
        // Old cue was cancelled.
        session.tick(t0 + ms(5000), &mut player);
        assert!(player.played.is_empty());
    }

    #[test]
    fn test_failed_track_change_closes_session() {
        let t0 = Instant::now();
        let mut player = RecordingPlayer::default();
        let mut session = start(GameMode::TouchQuiz, "ABC", t0);
        assert_eq!(session.next_due(), Some(t0 + ms(1000)));
        session.tick(t0 + ms(1000), &mut player);
        assert_eq!(session.next_due(), None);
        let prompt = quiz_round(&session).prompt.id;

        let solo = catalog().lookup_by_name("Solo").cloned().unwrap();
        assert!(session.change_track(solo, t0 + ms(1100), &mut player).is_err());
        assert!(session.is_closed());

        assert_eq!(
            session.select(Selection::Candidate(prompt), t0 + ms(1200), &mut player),
            SelectionOutcome::Ignored
        );
        assert_eq!(session.tally(), Tally::default());
        assert!(!session.replay_prompt(&mut player));
        assert!(!session.is_busy());
    }

    #[test]
    fn test_restart_resets_tally_and_completion() {
        let t0 = Instant::now();
        let mut player = RecordingPlayer::default();
        let mut session = start(GameMode::PictureWordMatch, "Pets", t0);
        session.select(Selection::Image(1), t0, &mut player);
        session.select(Selection::Word(1), t0, &mut player);
        session.tick(t0 + ms(500), &mut player);
        session.select(Selection::Image(2), t0 + ms(500), &mut player);
        session.select(Selection::Word(2), t0 + ms(500), &mut player);
        assert!(session.is_complete());

        session.restart(t0 + ms(600), &mut player).unwrap();
        assert!(!session.is_complete());
        assert_eq!(session.tally(), Tally::default());
        // Reveal lock from the old board does not carry over.
        assert_eq!(session.select(Selection::Image(1), t0 + ms(700), &mut player), SelectionOutcome::Held);
    }

    #[test]
    fn test_score_never_exceeds_attempts() {
        let t0 = Instant::now();
        let mut player = RecordingPlayer::default();
        let mut session = start(GameMode::TouchQuiz, "ABC", t0);
        let mut now = t0;
        for i in 0..40 {
            now += ms(1000);
            session.tick(now, &mut player);
            let round = quiz_round(&session);
            let pick = round.candidates[i % 2].id;
            session.select(Selection::Candidate(pick), now, &mut player);
            let tally = session.tally();
            assert!(tally.score <= tally.attempts);
            now += ms(1500);
            session.tick(now, &mut player);
        }
        assert_eq!(session.tally().attempts, 40);
    }
}
