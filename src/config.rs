use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::{AssetLayout, EngineSettings, Timings, VoicePathShape};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    /// Directory containing `images/` and `audio/`.
    #[serde(default = "default_asset_root")]
    pub asset_root: String,
    #[serde(default = "default_audio_extension")]
    pub audio_extension: String,
    /// Program and arguments used to play a file, e.g. `["mpv", "--no-video"]`.
    /// Empty disables audio.
    #[serde(default)]
    pub audio_command: Vec<String>,
    #[serde(default)]
    pub catalog_path: Option<String>,
    #[serde(default = "default_memory_reveal_ms")]
    pub memory_reveal_ms: u64,
    #[serde(default = "default_matching_reveal_ms")]
    pub matching_reveal_ms: u64,
    #[serde(default = "default_quiz_advance_ms")]
    pub quiz_advance_ms: u64,
    #[serde(default = "default_prompt_delay_ms")]
    pub prompt_delay_ms: u64,
    #[serde(default = "default_listen_voice_path")]
    pub listen_voice_path: VoicePathShape,
    #[serde(default = "default_touch_voice_path")]
    pub touch_voice_path: VoicePathShape,
    #[serde(default = "default_viewer_voice_path")]
    pub viewer_voice_path: VoicePathShape,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_theme() -> String {
    "bubblegum".to_string()
}
fn default_asset_root() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("songcards")
        .join("assets")
        .to_string_lossy()
        .to_string()
}
fn default_audio_extension() -> String {
    "mp3".to_string()
}
fn default_memory_reveal_ms() -> u64 {
    1000
}
fn default_matching_reveal_ms() -> u64 {
    500
}
fn default_quiz_advance_ms() -> u64 {
    1500
}
fn default_prompt_delay_ms() -> u64 {
    1000
}
fn default_listen_voice_path() -> VoicePathShape {
    VoicePathShape::TrackScoped
}
fn default_touch_voice_path() -> VoicePathShape {
    VoicePathShape::Flat
}
fn default_viewer_voice_path() -> VoicePathShape {
    VoicePathShape::TrackScoped
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            asset_root: default_asset_root(),
            audio_extension: default_audio_extension(),
            audio_command: Vec::new(),
            catalog_path: None,
            memory_reveal_ms: default_memory_reveal_ms(),
            matching_reveal_ms: default_matching_reveal_ms(),
            quiz_advance_ms: default_quiz_advance_ms(),
            prompt_delay_ms: default_prompt_delay_ms(),
            listen_voice_path: default_listen_voice_path(),
            touch_voice_path: default_touch_voice_path(),
            viewer_voice_path: default_viewer_voice_path(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Missing file means defaults; a file that fails to parse is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("songcards")
            .join("config.toml")
    }

    pub fn log_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("songcards")
    }

    pub fn timings(&self) -> Timings {
        Timings {
            memory_reveal: Duration::from_millis(self.memory_reveal_ms),
            matching_reveal: Duration::from_millis(self.matching_reveal_ms),
            quiz_advance: Duration::from_millis(self.quiz_advance_ms),
            prompt_delay: Duration::from_millis(self.prompt_delay_ms),
        }
    }

    pub fn asset_layout(&self) -> AssetLayout {
        AssetLayout::new(&self.asset_root, &self.audio_extension)
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            timings: self.timings(),
            assets: self.asset_layout(),
            listen_voice: self.listen_voice_path,
            touch_voice: self.touch_voice_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "asset_root = \"/srv/songs\"\ntouch_voice_path = \"track_scoped\"\naudio_command = [\"mpv\", \"--no-video\"]\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.asset_root, "/srv/songs");
        assert_eq!(config.touch_voice_path, VoicePathShape::TrackScoped);
        assert_eq!(config.audio_command, vec!["mpv", "--no-video"]);
        assert_eq!(config.quiz_advance_ms, 1500);
        assert_eq!(config.listen_voice_path, VoicePathShape::TrackScoped);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "touch_voice_path = \"sideways\"\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.theme = "midnight".to_string();
        config.memory_reveal_ms = 750;
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_engine_settings_from_config() {
        let mut config = Config::default();
        config.asset_root = "public".to_string();
        config.matching_reveal_ms = 250;
        let settings = config.engine_settings();
        assert_eq!(settings.timings.matching_reveal, Duration::from_millis(250));
        assert_eq!(settings.assets.root, PathBuf::from("public"));
        assert_eq!(settings.touch_voice, VoicePathShape::Flat);
    }
}
