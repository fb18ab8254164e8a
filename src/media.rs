//! Audio playback capability handed to the engine by the host UI.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("audio file not found: {0}")]
    MissingFile(PathBuf),

    #[error("failed to launch `{program}`: {source}")]
    Launch { program: String, source: io::Error },
}

pub trait MediaPlayer {
    /// Starts playing `path`, interrupting whatever is currently playing.
    fn play(&mut self, path: &Path) -> Result<(), PlaybackError>;
    fn stop(&mut self);
    fn is_playing(&mut self) -> bool;
}

/// Plays `path`, logging instead of returning a failure.
pub fn play_or_log(player: &mut dyn MediaPlayer, path: &Path) {
    if let Err(err) = player.play(path) {
        tracing::warn!(path = %path.display(), "audio playback failed: {err}");
    }
}

/// Plays files by spawning an external audio command, one child at a time.
pub struct CommandPlayer {
    program: String,
    args: Vec<String>,
    child: Option<Child>,
}

impl CommandPlayer {
    /// `command` is the program followed by its arguments; the file path is appended.
    pub fn new(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            child: None,
        })
    }
}

impl MediaPlayer for CommandPlayer {
    fn play(&mut self, path: &Path) -> Result<(), PlaybackError> {
        self.stop();
        if !path.exists() {
            return Err(PlaybackError::MissingFile(path.to_path_buf()));
        }
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| PlaybackError::Launch {
                program: self.program.clone(),
                source,
            })?;
        tracing::debug!(path = %path.display(), pid = child.id(), "playing");
        self.child = Some(child);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            // Already-exited children make kill() fail; that's fine.
            let _ = child.kill();
            let _ = child.wait();
        }
    }

    fn is_playing(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }
}

impl Drop for CommandPlayer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Player used when no audio command is configured. Remembers what it was asked to play.
#[derive(Debug, Default)]
pub struct SilentPlayer {
    pub current: Option<PathBuf>,
}

impl MediaPlayer for SilentPlayer {
    fn play(&mut self, path: &Path) -> Result<(), PlaybackError> {
        tracing::debug!(path = %path.display(), "audio disabled, skipping playback");
        self.current = Some(path.to_path_buf());
        Ok(())
    }

    fn stop(&mut self) {
        self.current = None;
    }

    fn is_playing(&mut self) -> bool {
        self.current.is_some()
    }
}
