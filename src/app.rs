use std::time::Instant;

use songcards::catalog::{Catalog, Flashcard, Track};
use songcards::config::Config;
use songcards::engine::{Game, GameMode, Selection, SelectionOutcome, SessionController};
use songcards::media::{MediaPlayer, play_or_log};

use crate::ui::components::menu::{Menu, MenuItem};
use crate::ui::layout::grid_columns;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Tracks,
    Activities,
    Flashcards,
    Game,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activity {
    Flashcards,
    Game(GameMode),
}

impl Activity {
    pub const ALL: [Activity; 5] = [
        Activity::Flashcards,
        Activity::Game(GameMode::MemoryMatch),
        Activity::Game(GameMode::PictureWordMatch),
        Activity::Game(GameMode::ListenVerify),
        Activity::Game(GameMode::TouchQuiz),
    ];

    pub fn key(self) -> char {
        match self {
            Activity::Flashcards => 'f',
            Activity::Game(GameMode::MemoryMatch) => '1',
            Activity::Game(GameMode::PictureWordMatch) => '2',
            Activity::Game(GameMode::ListenVerify) => '3',
            Activity::Game(GameMode::TouchQuiz) => '4',
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Activity::Flashcards => "Flashcard Review",
            Activity::Game(mode) => mode.label(),
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Activity::Flashcards => "Review flashcards related to the songs",
            Activity::Game(GameMode::MemoryMatch) => "Match pairs of cards to test your memory",
            Activity::Game(GameMode::PictureWordMatch) => "Connect related images or words",
            Activity::Game(GameMode::ListenVerify) => "Listen and say if the picture matches",
            Activity::Game(GameMode::TouchQuiz) => "Listen and touch the correct picture",
        }
    }
}

/// Which pool the cursor is in on the picture/word board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pane {
    Images,
    Words,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Viewer {
    pub cursor: usize,
    /// Card shown enlarged, if any.
    pub open: Option<u32>,
}

pub struct App {
    pub screen: AppScreen,
    pub catalog: Catalog,
    pub config: Config,
    pub theme: &'static Theme,
    pub track_menu: Menu<'static>,
    pub activity_menu: Menu<'static>,
    /// Track the activities screen and everything below it works on.
    pub track_id: Option<u32>,
    pub session: Option<SessionController>,
    pub viewer: Viewer,
    pub cursor: usize,
    pub pane: Pane,
    /// Track whose lesson audio is playing.
    pub lesson_playing: Option<u32>,
    /// Result of the last resolved pair, shown until the reveal delay ends.
    pub feedback: Option<bool>,
    pub status: Option<String>,
    pub audio_enabled: bool,
    pub should_quit: bool,
    player: Box<dyn MediaPlayer>,
}

impl App {
    pub fn new(
        catalog: Catalog,
        config: Config,
        theme: &'static Theme,
        player: Box<dyn MediaPlayer>,
        audio_enabled: bool,
    ) -> Self {
        let track_items = catalog
            .tracks()
            .iter()
            .enumerate()
            .map(|(i, track)| {
                let key = char::from_digit((i + 1) as u32, 10)
                    .map(String::from)
                    .unwrap_or_default();
                MenuItem::new(key, &track.name, format!("{} flashcards", track.len()))
            })
            .collect();
        let track_menu = Menu::new("songcards", "Pick a song", track_items, theme);

        let activity_items = Activity::ALL
            .iter()
            .map(|a| MenuItem::new(a.key().to_string(), a.title(), a.description()))
            .collect();
        let activity_menu = Menu::new("Activities", "", activity_items, theme);

        Self {
            screen: AppScreen::Tracks,
            catalog,
            config,
            theme,
            track_menu,
            activity_menu,
            track_id: None,
            session: None,
            viewer: Viewer::default(),
            cursor: 0,
            pane: Pane::Images,
            lesson_playing: None,
            feedback: None,
            status: None,
            audio_enabled,
            should_quit: false,
            player,
        }
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.track_id.and_then(|id| self.catalog.by_id(id))
    }

    fn highlighted_track(&self) -> Option<&Track> {
        self.catalog.tracks().get(self.track_menu.selected)
    }

    /// Plays the highlighted track's lesson audio, or stops it if it is already playing.
    pub fn toggle_lesson(&mut self) {
        let Some(track) = self.highlighted_track() else {
            return;
        };
        let id = track.id;
        let path = self.config.asset_layout().lesson_path(track);

        self.player.stop();
        if self.lesson_playing == Some(id) {
            self.lesson_playing = None;
            return;
        }
        play_or_log(self.player.as_mut(), &path);
        self.lesson_playing = Some(id);
    }

    pub fn open_activities(&mut self) {
        let Some(id) = self.highlighted_track().map(|t| t.id) else {
            return;
        };
        self.stop_audio();
        self.track_id = Some(id);
        self.sync_activity_title();
        self.status = None;
        self.screen = AppScreen::Activities;
    }

    /// Opens the track whose menu key is `key`.
    pub fn open_track_by_key(&mut self, key: char) {
        if self.track_menu.select_key(key).is_some() {
            self.open_activities();
        }
    }

    /// Opens the track with catalog id `id`, or stays on the track list with a
    /// warning when no such track exists.
    pub fn open_track_by_id(&mut self, id: u32) {
        match self.catalog.tracks().iter().position(|t| t.id == id) {
            Some(idx) => {
                self.track_menu.selected = idx;
                self.open_activities();
            }
            None => {
                tracing::warn!(track = id, "unknown track id, showing the track list");
                self.status = Some(format!("No track with id {id}"));
            }
        }
    }

    pub fn start_activity(&mut self, activity: Activity, now: Instant) {
        match activity {
            Activity::Flashcards => {
                self.viewer = Viewer::default();
                self.status = None;
                self.screen = AppScreen::Flashcards;
            }
            Activity::Game(mode) => self.start_game(mode, now),
        }
    }

    pub fn start_selected_activity(&mut self, now: Instant) {
        if let Some(&activity) = Activity::ALL.get(self.activity_menu.selected) {
            self.start_activity(activity, now);
        }
    }

    pub fn start_activity_by_key(&mut self, key: char, now: Instant) {
        if let Some(idx) = self.activity_menu.select_key(key) {
            self.start_activity(Activity::ALL[idx], now);
        }
    }

    pub fn start_game(&mut self, mode: GameMode, now: Instant) {
        let Some(name) = self.current_track().map(|t| t.name.clone()) else {
            return;
        };
        match SessionController::start(&self.catalog, &name, mode, self.config.engine_settings(), now)
        {
            Ok(session) => {
                self.session = Some(session);
                self.reset_cursor();
                self.status = None;
                self.screen = AppScreen::Game;
            }
            Err(err) => {
                tracing::warn!(mode = mode.as_str(), track = %name, "cannot start game: {err}");
                self.status = Some(err.to_string());
            }
        }
    }

    /// Moves to the next (or previous) track, carrying the current activity along.
    pub fn switch_track(&mut self, forward: bool, now: Instant) {
        let Some(current) = self.track_id else {
            return;
        };
        let Some(track) = self.catalog.neighbor(current, forward).cloned() else {
            return;
        };
        if track.id == current {
            return;
        }

        self.stop_audio();
        self.track_id = Some(track.id);
        if let Some(idx) = self.catalog.tracks().iter().position(|t| t.id == track.id) {
            self.track_menu.selected = idx;
        }
        self.sync_activity_title();
        self.viewer = Viewer::default();
        self.reset_cursor();
        self.status = None;

        if let Some(session) = self.session.as_mut() {
            if let Err(err) = session.change_track(track, now, self.player.as_mut()) {
                tracing::warn!("track change ended the session: {err}");
                self.session = None;
                self.status = Some(err.to_string());
                self.screen = AppScreen::Activities;
            }
        }
    }

    pub fn move_cursor(&mut self, dx: isize, dy: isize) {
        match self.screen {
            AppScreen::Tracks => {
                if dy < 0 {
                    self.track_menu.prev();
                } else if dy > 0 {
                    self.track_menu.next();
                }
            }
            AppScreen::Activities => {
                if dy < 0 {
                    self.activity_menu.prev();
                } else if dy > 0 {
                    self.activity_menu.next();
                }
            }
            AppScreen::Flashcards => {
                let len = self.current_track().map_or(0, Track::len);
                self.viewer.cursor = step(self.viewer.cursor, len, grid_columns(len), dx, dy);
            }
            AppScreen::Game => self.move_game_cursor(dx, dy),
        }
    }

    fn move_game_cursor(&mut self, dx: isize, dy: isize) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        match session.game() {
            Game::Memory(board) => {
                let len = board.slots().len();
                self.cursor = step(self.cursor, len, grid_columns(len), dx, dy);
            }
            Game::Matching(board) => {
                if dx != 0 {
                    self.pane = if dx < 0 { Pane::Images } else { Pane::Words };
                }
                let len = match self.pane {
                    Pane::Images => board.images().len(),
                    Pane::Words => board.words().len(),
                };
                self.cursor = step(self.cursor, len, 1, 0, dy);
            }
            Game::Quiz(round) => {
                let len = if session.mode() == GameMode::ListenVerify {
                    2
                } else {
                    round.candidates.len()
                };
                self.cursor = step(self.cursor, len, len, dx, 0);
            }
        }
    }

    /// Acts on whatever is under the cursor.
    pub fn select_current(&mut self, now: Instant) {
        match self.screen {
            AppScreen::Tracks => self.open_activities(),
            AppScreen::Activities => self.start_selected_activity(now),
            AppScreen::Flashcards => self.viewer_select(),
            AppScreen::Game => {
                if let Some(selection) = self.selection_at_cursor() {
                    self.submit(selection, now);
                }
            }
        }
    }

    /// Yes/no shortcut for Listen & Verify.
    pub fn answer(&mut self, said_yes: bool, now: Instant) {
        let listening = self
            .session
            .as_ref()
            .is_some_and(|s| s.mode() == GameMode::ListenVerify);
        if listening {
            self.cursor = if said_yes { 0 } else { 1 };
            self.submit(Selection::Answer(said_yes), now);
        }
    }

    fn selection_at_cursor(&self) -> Option<Selection> {
        let session = self.session.as_ref()?;
        let selection = match session.game() {
            Game::Memory(_) => Selection::Slot(self.cursor),
            Game::Matching(board) => match self.pane {
                Pane::Images => Selection::Image(board.images().get(self.cursor)?.id),
                Pane::Words => Selection::Word(board.words().get(self.cursor)?.id),
            },
            Game::Quiz(_) if session.mode() == GameMode::ListenVerify => {
                Selection::Answer(self.cursor == 0)
            }
            Game::Quiz(round) => Selection::Candidate(round.candidates.get(self.cursor)?.id),
        };
        Some(selection)
    }

    fn submit(&mut self, selection: Selection, now: Instant) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.select(selection, now, self.player.as_mut()) {
            SelectionOutcome::Ignored => {}
            SelectionOutcome::Held => {
                self.feedback = None;
                if let Selection::Image(_) = selection {
                    self.pane = Pane::Words;
                    self.cursor = 0;
                }
            }
            SelectionOutcome::Resolved { correct, .. } => {
                self.feedback = Some(correct);
                if let Selection::Word(_) = selection {
                    self.pane = Pane::Images;
                    self.cursor = 0;
                }
            }
        }
    }

    fn viewer_select(&mut self) {
        let Some(track) = self.current_track() else {
            return;
        };
        let Some(card) = track.cards.get(self.viewer.cursor) else {
            return;
        };
        let path = self
            .config
            .asset_layout()
            .voice_path(track, card, self.config.viewer_voice_path);
        let id = card.id;

        self.viewer.open = Some(id);
        play_or_log(self.player.as_mut(), &path);
    }

    /// Card currently enlarged in the viewer.
    pub fn open_card(&self) -> Option<&Flashcard> {
        let id = self.viewer.open?;
        self.current_track()?.card(id)
    }

    pub fn restart(&mut self, now: Instant) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if let Err(err) = session.restart(now, self.player.as_mut()) {
            tracing::warn!("restart failed: {err}");
            self.status = Some(err.to_string());
        }
        self.reset_cursor();
    }

    pub fn replay(&mut self) {
        if let Some(session) = self.session.as_ref() {
            if !session.replay_prompt(self.player.as_mut()) {
                tracing::debug!("nothing to replay");
            }
        }
    }

    pub fn tick(&mut self, now: Instant) {
        if let Some(session) = self.session.as_mut() {
            session.tick(now, self.player.as_mut());
            if !session.is_busy() {
                self.feedback = None;
            }
            // The cursor may point past a fresh quiz round's candidates.
            if let Game::Quiz(round) = session.game() {
                if session.mode() == GameMode::TouchQuiz && self.cursor >= round.candidates.len() {
                    self.cursor = 0;
                }
            }
        }
        if self.lesson_playing.is_some() && !self.player.is_playing() {
            self.lesson_playing = None;
        }
    }

    pub fn back(&mut self) {
        match self.screen {
            AppScreen::Tracks => self.should_quit = true,
            AppScreen::Activities => {
                self.status = None;
                self.screen = AppScreen::Tracks;
            }
            AppScreen::Flashcards => {
                if self.viewer.open.take().is_some() {
                    self.player.stop();
                } else {
                    self.screen = AppScreen::Activities;
                }
            }
            AppScreen::Game => {
                self.player.stop();
                self.session = None;
                self.feedback = None;
                self.screen = AppScreen::Activities;
            }
        }
    }

    fn stop_audio(&mut self) {
        self.player.stop();
        self.lesson_playing = None;
    }

    fn reset_cursor(&mut self) {
        self.cursor = 0;
        self.pane = Pane::Images;
        self.feedback = None;
    }

    fn sync_activity_title(&mut self) {
        if let Some(name) = self.current_track().map(|t| t.name.clone()) {
            self.activity_menu.subtitle = name;
        }
    }
}

/// Moves a grid cursor by `dx` columns and `dy` rows, staying put when the
/// target falls outside the grid.
pub fn step(cursor: usize, len: usize, columns: usize, dx: isize, dy: isize) -> usize {
    if len == 0 {
        return 0;
    }
    let columns = columns.max(1) as isize;
    let target = cursor as isize + dx + dy * columns;
    if (0..len as isize).contains(&target) {
        target as usize
    } else {
        cursor.min(len - 1)
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::rc::Rc;
    use std::cell::RefCell;
    use std::time::Duration;

    use songcards::engine::round::RoundPhase;
    use songcards::media::PlaybackError;

    use super::*;

    #[derive(Clone, Default)]
    struct SharedPlayer {
        played: Rc<RefCell<Vec<PathBuf>>>,
        playing: Rc<RefCell<bool>>,
    }

    impl MediaPlayer for SharedPlayer {
        fn play(&mut self, path: &Path) -> Result<(), PlaybackError> {
            self.played.borrow_mut().push(path.to_path_buf());
            *self.playing.borrow_mut() = true;
            Ok(())
        }

        fn stop(&mut self) {
            *self.playing.borrow_mut() = false;
        }

        fn is_playing(&mut self) -> bool {
            *self.playing.borrow()
        }
    }

    fn app() -> (App, SharedPlayer) {
        let player = SharedPlayer::default();
        let theme: &'static Theme = Box::leak(Box::new(Theme::default()));
        let config = Config {
            asset_root: "/srv/songs".to_string(),
            ..Config::default()
        };
        let app = App::new(
            Catalog::bundled().unwrap(),
            config,
            theme,
            Box::new(player.clone()),
            true,
        );
        (app, player)
    }

    #[test]
    fn test_step_stays_inside_grid() {
        assert_eq!(step(0, 14, 4, 1, 0), 1);
        assert_eq!(step(1, 14, 4, 0, 1), 5);
        assert_eq!(step(12, 14, 4, 0, 1), 12);
        assert_eq!(step(0, 14, 4, -1, 0), 0);
        assert_eq!(step(3, 0, 4, 1, 0), 0);
    }

    #[test]
    fn test_open_track_by_id() {
        let (mut app, _) = app();
        app.open_track_by_id(42);
        assert_eq!(app.screen, AppScreen::Tracks);
        assert_eq!(app.status.as_deref(), Some("No track with id 42"));

        app.open_track_by_id(2);
        assert_eq!(app.screen, AppScreen::Activities);
        assert_eq!(app.track_id, Some(2));
        assert_eq!(app.status, None);
    }

    #[test]
    fn test_lesson_toggle() {
        let (mut app, player) = app();
        app.toggle_lesson();
        assert_eq!(app.lesson_playing, Some(1));
        assert_eq!(
            player.played.borrow().as_slice(),
            &[PathBuf::from("/srv/songs/audio/track1.mp3")]
        );
        app.toggle_lesson();
        assert_eq!(app.lesson_playing, None);
        assert!(!*player.playing.borrow());
    }

    #[test]
    fn test_viewer_plays_track_scoped_voice() {
        let (mut app, player) = app();
        app.open_track_by_key('2');
        assert_eq!(app.track_id, Some(2));
        app.start_activity_by_key('f', Instant::now());
        assert_eq!(app.screen, AppScreen::Flashcards);

        app.move_cursor(1, 0);
        app.select_current(Instant::now());
        assert_eq!(app.open_card().map(|c| c.word.as_str()), Some("drugstore"));
        assert_eq!(
            player.played.borrow().last(),
            Some(&PathBuf::from("/srv/songs/audio/voice/track2/card2.mp3"))
        );

        app.back();
        assert!(app.viewer.open.is_none());
        assert_eq!(app.screen, AppScreen::Flashcards);
        app.back();
        assert_eq!(app.screen, AppScreen::Activities);
    }

    #[test]
    fn test_switch_track_keeps_game_running() {
        let (mut app, _player) = app();
        let t0 = Instant::now();
        app.open_activities();
        app.start_activity_by_key('4', t0);
        assert_eq!(app.screen, AppScreen::Game);

        app.switch_track(true, t0);
        assert_eq!(app.track_id, Some(2));
        let session = app.session.as_ref().unwrap();
        assert_eq!(session.track().id, 2);
        assert_eq!(session.mode(), GameMode::TouchQuiz);

        app.switch_track(false, t0);
        app.switch_track(false, t0);
        assert_eq!(app.track_id, Some(3));
    }

    #[test]
    fn test_touch_quiz_through_app() {
        let (mut app, player) = app();
        let t0 = Instant::now();
        app.open_activities();
        app.start_game(GameMode::TouchQuiz, t0);

        app.tick(t0 + Duration::from_millis(1000));
        let (prompt, candidates) = match app.session.as_ref().unwrap().game() {
            Game::Quiz(round) => {
                assert_eq!(round.phase, RoundPhase::Open);
                (round.prompt.id, round.candidates.clone())
            }
            _ => panic!("expected quiz"),
        };
        assert!(
            player
                .played
                .borrow()
                .contains(&PathBuf::from(format!("/srv/songs/audio/voice/card{prompt}.mp3")))
        );

        app.cursor = candidates.iter().position(|c| c.id == prompt).unwrap();
        app.select_current(t0 + Duration::from_millis(1100));
        assert_eq!(app.session.as_ref().unwrap().tally().score, 1);

        app.back();
        assert!(app.session.is_none());
        assert_eq!(app.screen, AppScreen::Activities);
    }

    #[test]
    fn test_matching_moves_cursor_to_words_after_image() {
        let (mut app, _player) = app();
        let t0 = Instant::now();
        app.open_activities();
        app.start_game(GameMode::PictureWordMatch, t0);
        app.select_current(t0);
        assert_eq!(app.pane, Pane::Words);
        app.move_cursor(-1, 0);
        assert_eq!(app.pane, Pane::Images);
    }
}
