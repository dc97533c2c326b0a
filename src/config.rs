use crate::error::TypingError;
use crate::timing::TimingMode;
use crate::typing::StrategyKind;
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "retype.toml";

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Timing preset; when unset the interactive menu asks
    #[serde(default)]
    pub mode: Option<TimingMode>,
    /// How auto-indent is wiped after each newline
    #[serde(default)]
    pub strategy: StrategyKind,
    /// Delete the closer the host inserts after `{ ( [ " '`
    #[serde(default = "default_auto_close")]
    pub auto_close: bool,
    /// Seconds to wait before typing, to focus the editor
    #[serde(default = "default_countdown")]
    pub countdown_secs: u64,
    /// Characters shown in the preview
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
    /// Ask before typing
    #[serde(default = "default_confirm")]
    pub confirm: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: None,
            strategy: StrategyKind::default(),
            auto_close: default_auto_close(),
            countdown_secs: default_countdown(),
            preview_chars: default_preview_chars(),
            confirm: default_confirm(),
        }
    }
}

fn default_auto_close() -> bool {
    true
}

fn default_countdown() -> u64 {
    3
}

fn default_preview_chars() -> usize {
    200
}

fn default_confirm() -> bool {
    true
}

impl Config {
    /// Load `path`, or `retype.toml` in the working directory when `path` is
    /// `None`. Only the implicit file may be absent.
    pub fn load(path: Option<&Path>) -> Result<Self, TypingError> {
        let (path, explicit) = match path {
            Some(p) => (p, true),
            None => (Path::new(DEFAULT_CONFIG_PATH), false),
        };

        if !explicit && !path.exists() {
            log::debug!("no {} found, using defaults", DEFAULT_CONFIG_PATH);
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| TypingError::Config(format!("{}: {}", path.display(), e)))?;
        Self::parse(&contents)
            .map_err(|e| TypingError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}
