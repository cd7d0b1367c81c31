//! Configuration management for the callbell relay
//!
//! Configuration is a TOML file with CLI/env overrides applied on top.
//! Every section has defaults that mirror the reference deployment, so the
//! relay runs with no config file at all.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{Error, Result};

/// Default history capacity for the press journal
const DEFAULT_HISTORY_SIZE: usize = 5;

/// Default HTTP port
const DEFAULT_PORT: u16 = 5000;

/// Relay configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Press journal configuration
    pub journal: JournalConfig,

    /// Announcement audio configuration
    pub audio: AudioConfig,

    /// Registered buttons, in dashboard display order
    pub buttons: Vec<ButtonSpec>,

    /// Pool the quote button draws from
    pub quotes: Vec<String>,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ServerConfig {
    /// Address to bind
    pub bind: String,

    /// Port to listen on
    pub port: u16,

    /// Directory served under `/static` (audio clips for the browser)
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            static_dir: None,
        }
    }
}

/// Press journal configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct JournalConfig {
    /// Number of presses kept in the rolling history
    pub history_size: usize,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            history_size: DEFAULT_HISTORY_SIZE,
        }
    }
}

/// TTS provider backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TtsProvider {
    /// `OpenAI` speech API (key from `OPENAI_API_KEY`)
    #[default]
    OpenAI,
    /// `ElevenLabs` speech API (key from `ELEVENLABS_API_KEY`)
    ElevenLabs,
    /// No synthesis; announcements are logged only
    Off,
}

/// Announcement audio configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AudioConfig {
    /// Master switch; `false` degrades the announcer to log-only
    pub enabled: bool,

    /// TTS backend
    pub provider: TtsProvider,

    /// TTS model identifier (e.g. `"tts-1"`)
    pub model: String,

    /// TTS voice identifier
    pub voice: String,

    /// TTS speed multiplier (0.25 to 4.0)
    pub speed: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: TtsProvider::default(),
            model: "tts-1".to_string(),
            voice: "alloy".to_string(),
            speed: 1.0,
        }
    }
}

/// One registered button: its category name and what a press announces
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ButtonSpec {
    /// Category name as sent by the device (e.g. `"MEDICINE"`)
    pub name: String,

    /// Spoken announcement text
    pub speech: String,

    /// Audio clip played instead of TTS, when set
    #[serde(default)]
    pub audio_file: Option<PathBuf>,

    /// Speak a random configured quote instead of `speech`
    #[serde(default)]
    pub quote: bool,
}

impl ButtonSpec {
    fn speech_only(name: &str, speech: &str) -> Self {
        Self {
            name: name.to_string(),
            speech: speech.to_string(),
            audio_file: None,
            quote: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            journal: JournalConfig::default(),
            audio: AudioConfig::default(),
            buttons: default_buttons(),
            quotes: default_quotes(),
        }
    }
}

/// The reference deployment's button set
fn default_buttons() -> Vec<ButtonSpec> {
    vec![
        ButtonSpec::speech_only("VOICE", "Hello, I am your assistant. How can I help you?"),
        ButtonSpec::speech_only("MEDICINE", "It is time to take your medicine. Please don't forget."),
        ButtonSpec::speech_only("CAMERA", "Camera button pressed. Opening the camera."),
        ButtonSpec::speech_only("MUSIC", "Playing your favorite relaxing music."),
        ButtonSpec {
            name: "QUOTE".to_string(),
            speech: "Here is your quote of the day.".to_string(),
            audio_file: None,
            quote: true,
        },
        ButtonSpec {
            name: "CHIME".to_string(),
            speech: "Chime button pressed.".to_string(),
            audio_file: Some(PathBuf::from("static/chime.mp3")),
            quote: false,
        },
    ]
}

fn default_quotes() -> Vec<String> {
    [
        "You are never too old to set another goal or to dream a new dream.",
        "Health is the greatest gift. Peace is the ultimate wealth.",
        "Smile, and let the world wonder why.",
        "Every day is a new beginning. Make it count.",
        "This moment is all you truly have. Enjoy it.",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Config {
    /// Load configuration from `path`, or defaults when `path` is `None`
    /// and no file exists at the conventional location
    /// (`$XDG_CONFIG_HOME/callbell/config.toml`).
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed, or when the
    /// parsed configuration is invalid (see [`Config::validate`]).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(p) => Self::from_file(p)?,
            None => match Self::default_path() {
                Some(p) if p.exists() => Self::from_file(&p)?,
                _ => Self::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Conventional config file location
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "callbell", "callbell")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Check cross-field invariants.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero history size, an empty or duplicated
    /// button name, a quote button with no quotes configured, or a TTS
    /// speed outside 0.25–4.0.
    pub fn validate(&self) -> Result<()> {
        if self.journal.history_size == 0 {
            return Err(Error::Config("journal.history_size must be at least 1".to_string()));
        }
        if !(0.25..=4.0).contains(&self.audio.speed) {
            return Err(Error::Config(format!(
                "audio.speed must be within 0.25-4.0, got {}",
                self.audio.speed
            )));
        }
        let mut seen = std::collections::BTreeSet::new();
        for button in &self.buttons {
            if button.name.trim().is_empty() {
                return Err(Error::Config("button name must not be empty".to_string()));
            }
            if !seen.insert(button.name.as_str()) {
                return Err(Error::Config(format!("duplicate button name: {}", button.name)));
            }
            if button.quote && self.quotes.is_empty() {
                return Err(Error::Config(format!(
                    "button {} wants quotes but none are configured",
                    button.name
                )));
            }
        }
        Ok(())
    }

    /// Buttons keyed by category name, for handler lookups
    #[must_use]
    pub fn button_map(&self) -> BTreeMap<String, ButtonSpec> {
        self.buttons
            .iter()
            .map(|b| (b.name.clone(), b.clone()))
            .collect()
    }

    /// Registered button names, in configured order
    #[must_use]
    pub fn button_names(&self) -> Vec<String> {
        self.buttons.iter().map(|b| b.name.clone()).collect()
    }
}
