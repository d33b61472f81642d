//! Application settings

use crate::core::auto_reply::AutoReplySettings;
use crate::core::console::ViewportMetrics;
use crate::core::display::DisplayConfig;
use crate::core::logger::LogMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::ConfigError;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Display settings
    pub display: DisplayConfig,
    /// Console settings
    pub console: ConsoleSettings,
    /// Send settings
    pub sending: SendSettings,
    /// Logging settings
    pub logging: LoggingConfig,
    /// Auto-reply settings
    pub auto_reply: AutoReplySettings,
}

impl AppConfig {
    /// Load config from the platform config directory.
    ///
    /// Returns defaults when no file exists.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = super::config_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join("config.toml");

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!(path = %config_path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load config from an explicit file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Parse config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Render the config as TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Console settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleSettings {
    /// Follow new output
    pub auto_scroll: bool,
    /// Viewport width in pixels
    pub width_px: f32,
    /// Vertical scrollbar width in pixels
    pub scrollbar_px: f32,
    /// Width of one character in pixels
    pub char_width_px: f32,
    /// Tab stop distance in pixels
    pub tab_stop_px: f32,
    /// Number of visible lines
    pub visible_lines: usize,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        let metrics = ViewportMetrics::default();
        Self {
            auto_scroll: true,
            width_px: metrics.width_px,
            scrollbar_px: metrics.scrollbar_px,
            char_width_px: metrics.char_width_px,
            tab_stop_px: metrics.tab_stop_px,
            visible_lines: metrics.visible_lines,
        }
    }
}

impl ConsoleSettings {
    /// Viewport metrics described by these settings
    pub fn metrics(&self) -> ViewportMetrics {
        ViewportMetrics {
            width_px: self.width_px,
            scrollbar_px: self.scrollbar_px,
            char_width_px: self.char_width_px,
            tab_stop_px: self.tab_stop_px,
            visible_lines: self.visible_lines,
        }
    }
}

/// Send settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SendSettings {
    /// Line ending appended to typed lines
    pub line_ending: LineEnding,
}

/// Line ending type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// Nothing appended
    None,
    /// Carriage Return only
    Cr,
    /// Line Feed only
    Lf,
    /// Both CR and LF
    #[default]
    CrLf,
}

impl LineEnding {
    /// Get the byte sequence for this line ending
    pub fn bytes(&self) -> &'static [u8] {
        match self {
            Self::None => b"",
            Self::Cr => b"\r",
            Self::Lf => b"\n",
            Self::CrLf => b"\r\n",
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// What gets written to the log
    pub mode: LogMode,
    /// Log directory (platform default when unset)
    pub directory: Option<PathBuf>,
}

impl LoggingConfig {
    /// Directory for new log files
    pub fn directory(&self) -> Option<PathBuf> {
        self.directory.clone().or_else(super::log_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(config.console.auto_scroll);
        assert_eq!(config.console.metrics(), ViewportMetrics::default());
        assert_eq!(config.sending.line_ending, LineEnding::CrLf);
        assert_eq!(config.logging.mode, LogMode::AsDisplayed);
        assert!(!config.auto_reply.enabled);
    }

    #[test]
    fn test_partial_file() {
        let config = AppConfig::from_toml_str(
            r#"
            [display]
            hex_mode = true
            timestamp_time_limit_ms = 250

            [sending]
            line_ending = "lf"
            "#,
        )
        .unwrap();

        assert!(config.display.hex_mode);
        assert_eq!(config.display.timestamp_time_limit_ms, 250);
        assert!(config.display.crlf_as_newline);
        assert_eq!(config.sending.line_ending, LineEnding::Lf);
        assert_eq!(config.console, ConsoleSettings::default());
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = AppConfig::default();
        config.display.timestamps_enabled = true;
        config.console.width_px = 1024.0;
        config.logging.mode = LogMode::Raw;

        let text = config.to_toml_string().unwrap();
        assert_eq!(AppConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_toml() {
        let err = AppConfig::from_toml_str("display = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[console]\nauto_scroll = false").unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert!(!config.console.auto_scroll);
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load_from(dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_line_ending_bytes() {
        assert_eq!(LineEnding::None.bytes(), b"");
        assert_eq!(LineEnding::Cr.bytes(), b"\r");
        assert_eq!(LineEnding::Lf.bytes(), b"\n");
        assert_eq!(LineEnding::CrLf.bytes(), b"\r\n");
    }
}
