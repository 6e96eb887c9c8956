//! Settings management for Gesture Relay
//!
//! Settings are stored as JSON. Every field has a default, so a partial file
//! (or no file at all) yields a working configuration. A partial `display` or
//! `speech` section only replaces the fields it names; the rest keep that
//! sink's own defaults.

use std::fs;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::actuators::{CommandSink, NullSink, Sink, SinkKind};
use crate::gesture::{GestureDefinition, GestureTable, GestureTableError};
use crate::telemetry::LogConfig;

/// External program used as a display or speech sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSinkSettings {
    /// When false the sink is replaced by a no-op that always succeeds
    pub enabled: bool,
    /// Program name or path
    pub program: String,
    /// Arguments placed before the message text
    pub args: Vec<String>,
    /// Text written to the program's stdin (e.g. a sudo password)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdin: Option<String>,
}

impl CommandSinkSettings {
    fn display_default() -> Self {
        Self {
            enabled: true,
            program: "python3".to_string(),
            args: vec!["LCD.py".to_string()],
            stdin: None,
        }
    }

    fn speech_default() -> Self {
        Self {
            enabled: true,
            program: "espeak".to_string(),
            args: Vec::new(),
            stdin: None,
        }
    }

    /// Build the sink described by these settings
    pub fn build(&self, kind: SinkKind) -> Box<dyn Sink> {
        if !self.enabled {
            tracing::info!(sink = %kind, "Sink disabled in settings");
            return NullSink::boxed(kind);
        }
        Box::new(CommandSink::new(kind, &self.program, self.args.clone(), self.stdin.clone()))
    }
}

/// Fields present in a `display` or `speech` section of the file
#[derive(Deserialize)]
struct CommandSinkOverrides {
    enabled: Option<bool>,
    program: Option<String>,
    args: Option<Vec<String>>,
    stdin: Option<String>,
}

impl CommandSinkOverrides {
    fn apply(self, mut base: CommandSinkSettings) -> CommandSinkSettings {
        if let Some(enabled) = self.enabled {
            base.enabled = enabled;
        }
        if let Some(program) = self.program {
            base.program = program;
        }
        if let Some(args) = self.args {
            base.args = args;
        }
        if self.stdin.is_some() {
            base.stdin = self.stdin;
        }
        base
    }
}

fn display_section<'de, D: Deserializer<'de>>(deserializer: D) -> Result<CommandSinkSettings, D::Error> {
    CommandSinkOverrides::deserialize(deserializer).map(|o| o.apply(CommandSinkSettings::display_default()))
}

fn speech_section<'de, D: Deserializer<'de>>(deserializer: D) -> Result<CommandSinkSettings, D::Error> {
    CommandSinkOverrides::deserialize(deserializer).map(|o| o.apply(CommandSinkSettings::speech_default()))
}

/// Serial link to the microcontroller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialSettings {
    pub enabled: bool,
    /// Device path, e.g. `/dev/ttyUSB0` or `COM3`
    pub port: String,
    pub baud_rate: u32,
    /// Read/write timeout on the port
    pub timeout_ms: u64,
    /// Delay after opening while the board resets
    pub settle_ms: u64,
}

impl SerialSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 9600,
            timeout_ms: 1000,
            settle_ms: 2000,
        }
    }
}

/// Top-level settings file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Consecutive identical frames needed to confirm a gesture (>= 1)
    pub detection_threshold: u32,

    /// Shown on the display once at startup
    pub startup_message: Option<String>,

    /// Recognized gestures; finger patterns must be unique
    pub gestures: Vec<GestureDefinition>,

    #[serde(deserialize_with = "display_section")]
    pub display: CommandSinkSettings,

    #[serde(deserialize_with = "speech_section")]
    pub speech: CommandSinkSettings,

    pub serial: SerialSettings,

    pub log: LogConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            detection_threshold: 5,
            startup_message: Some("Started .".to_string()),
            gestures: GestureDefinition::canonical(),
            display: CommandSinkSettings::display_default(),
            speech: CommandSinkSettings::speech_default(),
            serial: SerialSettings::default(),
            log: LogConfig::default(),
        }
    }
}

impl Settings {
    /// Platform config location, e.g. `~/.config/gesture-relay/settings.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("gesture-relay");
            p.push("settings.json");
            p
        })
    }

    /// Load and validate settings from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = serde_json::from_str(&contents)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load from the platform config location, falling back to defaults when absent
    pub fn load_or_default() -> Result<Self, SettingsError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Save settings as pretty-printed JSON, creating parent directories
    pub fn save_to_file(&self, path: &Path) -> Result<(), SettingsError> {
        let io_err = |source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(io_err)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.threshold()?;
        self.gesture_table()?;
        for (kind, sink) in [(SinkKind::Display, &self.display), (SinkKind::Speech, &self.speech)] {
            if sink.enabled && sink.program.trim().is_empty() {
                return Err(SettingsError::MissingProgram(kind));
            }
        }
        Ok(())
    }

    pub fn threshold(&self) -> Result<NonZeroU32, SettingsError> {
        NonZeroU32::new(self.detection_threshold).ok_or(SettingsError::ZeroThreshold)
    }

    pub fn gesture_table(&self) -> Result<GestureTable, SettingsError> {
        Ok(GestureTable::new(self.gestures.iter().cloned())?)
    }
}

/// Settings-related errors
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("detection_threshold must be at least 1")]
    ZeroThreshold,
    #[error(transparent)]
    Gestures(#[from] GestureTableError),
    #[error("{0} sink is enabled but has no program")]
    MissingProgram(SinkKind),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::FingerVector;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.detection_threshold, 5);
        assert_eq!(settings.gestures.len(), 5);
        assert_eq!(settings.startup_message.as_deref(), Some("Started ."));
        assert_eq!(settings.speech.program, "espeak");
        assert_eq!(settings.serial.port, "/dev/ttyUSB0");
        assert_eq!(settings.serial.baud_rate, 9600);
        assert_eq!(settings.serial.settle(), Duration::from_secs(2));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"detection_threshold": 3, "serial": {"port": "COM4"}}"#).unwrap();
        assert_eq!(settings.detection_threshold, 3);
        assert_eq!(settings.serial.port, "COM4");
        assert_eq!(settings.serial.baud_rate, 9600);
        assert_eq!(settings.gestures, GestureDefinition::canonical());
        assert_eq!(settings.speech.program, "espeak");
    }

    #[test]
    fn test_disabled_sink_builds_null() {
        let mut speech = CommandSinkSettings::speech_default();
        speech.enabled = false;
        speech.program = "gesture-relay-no-such-helper".to_string();
        let mut sink = speech.build(SinkKind::Speech);
        assert_eq!(sink.kind(), SinkKind::Speech);
        assert!(sink.send("Open Palm").is_ok());
    }

    #[test]
    fn test_partial_sink_section_keeps_sink_defaults() {
        let settings: Settings = serde_json::from_str(
            r#"{"speech": {"args": ["-v", "en"]}, "display": {"stdin": "1234\n"}}"#,
        )
        .unwrap();
        assert_eq!(settings.speech.program, "espeak");
        assert_eq!(settings.speech.args, vec!["-v".to_string(), "en".to_string()]);
        assert!(settings.speech.enabled);
        assert_eq!(settings.display.program, "python3");
        assert_eq!(settings.display.args, vec!["LCD.py".to_string()]);
        assert_eq!(settings.display.stdin.as_deref(), Some("1234\n"));
        assert!(settings.validate().is_ok());

        let settings: Settings = serde_json::from_str(r#"{"speech": {"enabled": false}}"#).unwrap();
        assert!(!settings.speech.enabled);
        assert_eq!(settings.speech.program, "espeak");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_sink_with_blank_program_rejected() {
        let settings: Settings = serde_json::from_str(r#"{"speech": {"program": "  "}}"#).unwrap();
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::MissingProgram(SinkKind::Speech))
        ));
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let settings = Settings {
            detection_threshold: 0,
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(SettingsError::ZeroThreshold)));
    }

    #[test]
    fn test_duplicate_gesture_rejected() {
        let mut settings = Settings::default();
        settings.gestures.push(GestureDefinition::new(
            FingerVector::new([true; 5]),
            "High Five",
            "High Five",
        ));
        assert!(matches!(settings.validate(), Err(SettingsError::Gestures(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = Settings::default();
        settings.detection_threshold = 8;
        settings.display.stdin = Some("1234\n".to_string());
        settings.gestures = vec![GestureDefinition::new("01001".parse().unwrap(), "Rock", "ROCK")];
        settings.save_to_file(&path).unwrap();

        let loaded = Settings::load_from_file(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_invalid_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"gestures": [{"fingers": "0110", "name": "x", "action": "x"}]}"#).unwrap();
        assert!(matches!(Settings::load_from_file(&path), Err(SettingsError::Json(_))));

        let missing = dir.path().join("missing.json");
        assert!(matches!(Settings::load_from_file(&missing), Err(SettingsError::Io { .. })));
    }
}
