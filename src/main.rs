mod app;
mod event;
mod ui;

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Wrap};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use songcards::catalog::Catalog;
use songcards::config::Config;
use songcards::engine::matching::MatchingBoard;
use songcards::engine::memory::MemoryBoard;
use songcards::engine::round::{Outcome, Round};
use songcards::engine::{Game, GameMode, SessionController};
use songcards::media::{CommandPlayer, MediaPlayer, SilentPlayer};

use app::{App, AppScreen, Pane};
use event::{AppEvent, EventHandler};
use ui::components::card_tile::{CardTile, TileState};
use ui::components::progress_bar::ProgressBar;
use ui::layout::{AppLayout, centered_rect, grid_cells, grid_columns, pack_hint_lines};
use ui::theme::Theme;

#[derive(Parser)]
#[command(
    name = "songcards",
    version,
    about = "Flashcard games for song-based language lessons"
)]
struct Cli {
    #[arg(short, long, help = "Config file (defaults to the user config dir)")]
    config: Option<PathBuf>,

    #[arg(long, help = "Track catalog replacing the bundled one")]
    catalog: Option<PathBuf>,

    #[arg(short, long, help = "Directory containing images/ and audio/")]
    assets: Option<PathBuf>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Open this track id's activities on start")]
    track: Option<u32>,

    #[arg(long, help = "Never play audio")]
    no_audio: bool,

    #[arg(long, help = "Print the track catalog and exit")]
    list_tracks: bool,

    #[arg(long, requires = "list_tracks", help = "Print the catalog as JSON")]
    json: bool,

    #[arg(long, help = "Write the effective config file and exit")]
    init_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::load().context("failed to load config")?,
    };
    if let Some(assets) = &cli.assets {
        config.asset_root = assets.to_string_lossy().to_string();
    }
    if let Some(theme) = &cli.theme {
        config.theme = theme.clone();
    }
    if let Some(catalog) = &cli.catalog {
        config.catalog_path = Some(catalog.to_string_lossy().to_string());
    }

    if cli.init_config {
        match &cli.config {
            Some(path) => config.save_to(path)?,
            None => config.save()?,
        }
        println!(
            "wrote {}",
            cli.config.clone().unwrap_or_else(Config::config_path).display()
        );
        return Ok(());
    }

    let _log_guard = init_logging(&config)?;

    let catalog = match &config.catalog_path {
        Some(path) => Catalog::load(path.as_ref())?,
        None => Catalog::bundled()?,
    };

    if cli.list_tracks {
        return list_tracks(&catalog, cli.json);
    }

    let audio_enabled = !cli.no_audio && !config.audio_command.is_empty();
    let player: Box<dyn MediaPlayer> = match CommandPlayer::new(&config.audio_command) {
        Some(player) if audio_enabled => Box::new(player),
        _ => Box::new(SilentPlayer::default()),
    };

    let loaded_theme = Theme::load(&config.theme).unwrap_or_else(|| {
        tracing::warn!(
            theme = %config.theme,
            available = ?Theme::available_themes(),
            "unknown theme, using default"
        );
        Theme::default()
    });
    let theme: &'static Theme = Box::leak(Box::new(loaded_theme));

    tracing::info!(
        tracks = catalog.tracks().len(),
        audio = audio_enabled,
        assets = %config.asset_root,
        "starting"
    );

    let mut app = App::new(catalog, config, theme, player, audio_enabled);
    if let Some(id) = cli.track {
        app.open_track_by_id(id);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(50));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!("exiting after error: {err:?}");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

/// Logs go to a file since the terminal belongs to the UI.
fn init_logging(config: &Config) -> Result<WorkerGuard> {
    let dir = Config::log_dir();
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log dir {}", dir.display()))?;
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(&dir, "songcards.log"));

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .init();
    Ok(guard)
}

fn list_tracks(catalog: &Catalog, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(catalog.tracks())?);
        return Ok(());
    }
    for track in catalog.tracks() {
        println!("{:>3}  {}  ({} flashcards)", track.id, track.name, track.len());
    }
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick(now) => app.tick(now),
            AppEvent::Resize => {}
        }
        // Steady typing starves the tick channel; fire due transitions anyway.
        app.tick(Instant::now());

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    let now = Instant::now();
    match app.screen {
        AppScreen::Tracks => handle_tracks_key(app, key),
        AppScreen::Activities => handle_activities_key(app, key, now),
        AppScreen::Flashcards => handle_flashcards_key(app, key, now),
        AppScreen::Game => handle_game_key(app, key, now),
    }
}

fn handle_tracks_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.back(),
        KeyCode::Up | KeyCode::Char('k') => app.move_cursor(0, -1),
        KeyCode::Down | KeyCode::Char('j') => app.move_cursor(0, 1),
        KeyCode::Char('p') | KeyCode::Char(' ') => app.toggle_lesson(),
        KeyCode::Enter => app.open_activities(),
        KeyCode::Char(ch) if ch.is_ascii_digit() => app.open_track_by_key(ch),
        _ => {}
    }
}

fn handle_activities_key(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.back(),
        KeyCode::Up | KeyCode::Char('k') => app.move_cursor(0, -1),
        KeyCode::Down | KeyCode::Char('j') => app.move_cursor(0, 1),
        KeyCode::Char('[') => app.switch_track(false, now),
        KeyCode::Char(']') => app.switch_track(true, now),
        KeyCode::Enter => app.select_current(now),
        KeyCode::Char(ch) => app.start_activity_by_key(ch, now),
        _ => {}
    }
}

fn handle_flashcards_key(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.back(),
        KeyCode::Left | KeyCode::Char('h') => app.move_cursor(-1, 0),
        KeyCode::Right | KeyCode::Char('l') => app.move_cursor(1, 0),
        KeyCode::Up | KeyCode::Char('k') => app.move_cursor(0, -1),
        KeyCode::Down | KeyCode::Char('j') => app.move_cursor(0, 1),
        KeyCode::Enter | KeyCode::Char(' ') => app.select_current(now),
        KeyCode::Char('[') => app.switch_track(false, now),
        KeyCode::Char(']') => app.switch_track(true, now),
        _ => {}
    }
}

fn handle_game_key(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.back(),
        KeyCode::Left => app.move_cursor(-1, 0),
        KeyCode::Right => app.move_cursor(1, 0),
        KeyCode::Up => app.move_cursor(0, -1),
        KeyCode::Down => app.move_cursor(0, 1),
        KeyCode::Enter | KeyCode::Char(' ') => app.select_current(now),
        KeyCode::Char('y') => app.answer(true, now),
        KeyCode::Char('n') => app.answer(false, now),
        KeyCode::Char('r') => app.restart(now),
        KeyCode::Char('h') => app.replay(),
        KeyCode::Char('[') => app.switch_track(false, now),
        KeyCode::Char(']') => app.switch_track(true, now),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Tracks => render_tracks(frame, app),
        AppScreen::Activities => render_activities(frame, app),
        AppScreen::Flashcards => render_flashcards(frame, app),
        AppScreen::Game => render_game(frame, app),
    }
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: Rect, title: &str, info: &str) {
    let colors = &app.theme.colors;
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" {title} "),
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            info.to_string(),
            Style::default()
                .fg(colors.text_pending())
                .bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, area: Rect, hints: &[&str]) {
    let colors = &app.theme.colors;
    let mut lines: Vec<Line> = Vec::new();
    if let Some(status) = &app.status {
        lines.push(Line::from(Span::styled(
            format!("  {status}"),
            Style::default().fg(colors.warning()),
        )));
    }
    lines.extend(
        pack_hint_lines(hints, area.width as usize)
            .into_iter()
            .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.text_pending())))),
    );
    frame.render_widget(Paragraph::new(lines), area);
}

fn split_screen(area: Rect) -> [Rect; 3] {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(area);
    [layout[0], layout[1], layout[2]]
}

fn render_tracks(frame: &mut ratatui::Frame, app: &App) {
    let [header, main, footer] = split_screen(frame.area());

    let playing = app
        .lesson_playing
        .and_then(|id| app.catalog.by_id(id))
        .map(|t| format!("| Playing: {}", t.name))
        .unwrap_or_default();
    render_header(frame, app, header, "songcards", &playing);

    let menu_area = centered_rect(60, 80, main);
    frame.render_widget(&app.track_menu, menu_area);

    render_footer(
        frame,
        app,
        footer,
        &["[Enter] Activities", "[p] Play/stop song", "[q] Quit"],
    );
}

fn render_activities(frame: &mut ratatui::Frame, app: &App) {
    let [header, main, footer] = split_screen(frame.area());

    let track_name = app.current_track().map(|t| t.name.as_str()).unwrap_or("");
    render_header(frame, app, header, "Activities", track_name);

    let menu_area = centered_rect(60, 80, main);
    frame.render_widget(&app.activity_menu, menu_area);

    render_footer(
        frame,
        app,
        footer,
        &["[f/1-4] Start", "[ [ ] ] Change track", "[q] Back"],
    );
}

fn render_flashcards(frame: &mut ratatui::Frame, app: &App) {
    let [header, main, footer] = split_screen(frame.area());
    let Some(track) = app.current_track() else {
        return;
    };
    render_header(frame, app, header, "Flashcard Review", &track.name);

    let columns = grid_columns(track.len());
    let cells = grid_cells(main, track.len(), columns);
    for (i, (card, cell)) in track.cards.iter().zip(cells).enumerate() {
        let tile = CardTile::new(&card.word, TileState::FaceUp, app.theme)
            .caption(&card.image)
            .focused(i == app.viewer.cursor);
        frame.render_widget(tile, cell);
    }

    if let Some(card) = app.open_card() {
        let popup = centered_rect(50, 50, main);
        frame.render_widget(Clear, popup);
        let image = app
            .config
            .asset_layout()
            .image_path(track, card)
            .display()
            .to_string();
        let tile = CardTile::new(&card.word, TileState::Selected, app.theme)
            .caption(&image)
            .focused(true);
        frame.render_widget(tile, popup);
    }

    let hints: &[&str] = if app.viewer.open.is_some() {
        &["[Enter] Hear again", "[Esc] Close"]
    } else {
        &["[arrows/hjkl] Move", "[Enter] Open card", "[ [ ] ] Change track", "[q] Back"]
    };
    render_footer(frame, app, footer, hints);
}

fn render_game(frame: &mut ratatui::Frame, app: &App) {
    let Some(session) = app.session.as_ref() else {
        return;
    };
    let area = frame.area();
    let app_layout = AppLayout::new(area);
    let mode = session.mode();
    let tally = session.tally();

    let info = if app_layout.tier.show_sidebar() {
        session.track().name.clone()
    } else {
        format!("{} | Score {}/{}", session.track().name, tally.score, tally.attempts)
    };
    render_header(frame, app, app_layout.header, mode.label(), &info);

    match session.game() {
        Game::Memory(board) => render_memory(frame, app, board, app_layout.main),
        Game::Matching(board) => render_matching(frame, app, board, app_layout.main),
        Game::Quiz(round) => render_quiz(frame, app, session, round, app_layout.main),
    }

    if let Some(sidebar) = app_layout.sidebar {
        render_sidebar(frame, app, session, sidebar);
    }

    if session.is_complete() && !session.is_busy() {
        render_completion(frame, app, app_layout.main);
    }

    let mut hints = vec!["[arrows] Move", "[Enter] Select"];
    match mode {
        GameMode::ListenVerify => hints.extend(["[y/n] Answer", "[h] Hear again"]),
        GameMode::TouchQuiz => hints.push("[h] Hear again"),
        _ => {}
    }
    hints.extend(["[r] Restart", "[ [ ] ] Change track", "[q] Back"]);
    render_footer(frame, app, app_layout.footer, &hints);
}

fn render_sidebar(frame: &mut ratatui::Frame, app: &App, session: &SessionController, area: Rect) {
    let colors = &app.theme.colors;
    let tally = session.tally();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let lines = vec![
        Line::from(Span::styled(
            format!(" Score:    {}", tally.score),
            Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!(" Attempts: {}", tally.attempts),
            Style::default().fg(colors.fg()),
        )),
        Line::from(Span::styled(
            format!(" Accuracy: {:.0}%", tally.accuracy()),
            Style::default().fg(colors.text_pending()),
        )),
    ];
    let block = Block::bordered()
        .title(" Score ")
        .border_style(Style::default().fg(colors.border()));
    frame.render_widget(Paragraph::new(lines).block(block), layout[0]);

    if session.mode().is_pairing() {
        let done = match session.game() {
            Game::Memory(board) => board.matched_pairs(),
            Game::Matching(board) => board.resolved_count(),
            Game::Quiz(_) => 0,
        };
        let progress = ProgressBar::new(
            "Pairs",
            done,
            session.track().expected_pair_count,
            app.theme,
        );
        frame.render_widget(progress, layout[1]);
    }
}

fn render_memory(frame: &mut ratatui::Frame, app: &App, board: &MemoryBoard, area: Rect) {
    let slots = board.slots();
    let cells = grid_cells(area, slots.len(), grid_columns(slots.len()));
    for (i, (slot, cell)) in slots.iter().zip(cells).enumerate() {
        let state = if slot.matched {
            TileState::Matched
        } else if board.is_face_up(i) {
            if board.is_checking() && app.feedback == Some(false) {
                TileState::Wrong
            } else {
                TileState::FaceUp
            }
        } else {
            TileState::FaceDown
        };
        let tile = CardTile::new(&slot.card.word, state, app.theme).focused(i == app.cursor);
        frame.render_widget(tile, cell);
    }
}

fn render_matching(frame: &mut ratatui::Frame, app: &App, board: &MatchingBoard, area: Rect) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let mismatch = board.mismatch();

    let image_cells = grid_cells(halves[0], board.images().len(), 1);
    for (i, (card, cell)) in board.images().iter().zip(image_cells).enumerate() {
        let state = if board.is_resolved(card.id) {
            TileState::Matched
        } else if mismatch.is_some_and(|m| m.image == card.id) {
            TileState::Wrong
        } else if board.held() == Some(card.id) {
            TileState::Selected
        } else {
            TileState::FaceUp
        };
        let tile = CardTile::new(&card.word, state, app.theme)
            .caption(&card.image)
            .focused(app.pane == Pane::Images && i == app.cursor);
        frame.render_widget(tile, cell);
    }

    let word_cells = grid_cells(halves[1], board.words().len(), 1);
    for (i, (card, cell)) in board.words().iter().zip(word_cells).enumerate() {
        let state = if board.is_resolved(card.id) {
            TileState::Matched
        } else if mismatch.is_some_and(|m| m.word == card.id) {
            TileState::Wrong
        } else {
            TileState::FaceUp
        };
        let tile = CardTile::new(&card.word, state, app.theme)
            .focused(app.pane == Pane::Words && i == app.cursor);
        frame.render_widget(tile, cell);
    }
}

fn render_quiz(
    frame: &mut ratatui::Frame,
    app: &App,
    session: &SessionController,
    round: &Round,
    area: Rect,
) {
    let colors = &app.theme.colors;
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(5),
            Constraint::Length(5),
            Constraint::Length(2),
        ])
        .split(area);

    let prompt_text = if !round.is_open() && !round.resolved() {
        "Listen...".to_string()
    } else if app.audio_enabled {
        "Press [h] to hear it again".to_string()
    } else {
        format!("You would hear: \"{}\"", round.prompt.word)
    };
    frame.render_widget(
        Paragraph::new(prompt_text)
            .alignment(Alignment::Center)
            .style(Style::default().fg(colors.accent())),
        layout[0],
    );

    let resolved = round.resolved();
    if session.mode() == GameMode::ListenVerify {
        let shown = round.shown();
        let state = match round.outcome {
            Outcome::Pending => TileState::FaceUp,
            Outcome::Correct => TileState::Correct,
            Outcome::Incorrect => TileState::Wrong,
        };
        let card_area = centered_rect(40, 100, layout[1]);
        frame.render_widget(
            CardTile::new(&shown.word, state, app.theme).caption(&shown.image),
            card_area,
        );

        let buttons = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(layout[2]);
        for (i, label) in ["Yes", "No"].into_iter().enumerate() {
            let tile = CardTile::new(label, TileState::FaceUp, app.theme).focused(i == app.cursor);
            frame.render_widget(tile, buttons[i]);
        }
    } else {
        let cells = grid_cells(layout[1], round.candidates.len(), round.candidates.len());
        for (i, (card, cell)) in round.candidates.iter().zip(cells).enumerate() {
            let is_prompt = card.id == round.prompt.id;
            let state = match round.outcome {
                Outcome::Pending => TileState::FaceUp,
                _ if is_prompt => TileState::Correct,
                Outcome::Incorrect => TileState::Wrong,
                Outcome::Correct => TileState::FaceUp,
            };
            let tile = CardTile::new(&card.word, state, app.theme)
                .caption(&card.image)
                .focused(i == app.cursor && !resolved);
            frame.render_widget(tile, cell);
        }
    }

    let feedback = match round.outcome {
        Outcome::Pending => None,
        Outcome::Correct => Some(("Great job!", colors.success())),
        Outcome::Incorrect => Some(("Try again!", colors.error())),
    };
    if let Some((text, color)) = feedback {
        frame.render_widget(
            Paragraph::new(text)
                .alignment(Alignment::Center)
                .style(Style::default().fg(color).add_modifier(Modifier::BOLD)),
            layout[3],
        );
    }
}

fn render_completion(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let popup = centered_rect(50, 40, area);
    frame.render_widget(Clear, popup);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Wonderful Job!",
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "You found all the matching pairs!",
            Style::default().fg(colors.fg()),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "[r] Play again  [q] Back",
            Style::default().fg(colors.text_pending()),
        )),
    ];
    let block = Block::bordered()
        .border_style(Style::default().fg(colors.border_focused()))
        .style(Style::default().bg(colors.bg()));
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        popup,
    );
}
