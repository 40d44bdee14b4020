//! SMA4 Codec Configuration
//!
//! Options for the command line tool, read from a `key = value` text file.
//!
//! ```text
//! # sma4.txt
//! log_level = debug
//! level_name = Airship Attack
//! import_room_height = 28
//! default_timer = 300
//! pretty_json = true
//! ```

use sma4_core::{Result, Sma4Error};
use sma4_levels::level::{DEFAULT_TIMER, MAX_ROOM_TILE_HEIGHT, MAX_TIMER, MIN_ROOM_TILE_HEIGHT};
use std::fs;
use std::path::Path;

/// Effective configuration of the command line tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    /// Tracing filter used when `RUST_LOG` is not set (from "log_level")
    pub log_level: String,
    /// Name written into encoded levels instead of the level's own (from "level_name")
    pub level_name: Option<String>,
    /// Room height assumed when importing a binary (from "import_room_height")
    pub import_room_height: i32,
    /// Timer given to levels created from scratch (from "default_timer")
    pub default_timer: u16,
    /// Write level documents indented (from "pretty_json")
    pub pretty_json: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            level_name: None,
            import_room_height: MAX_ROOM_TILE_HEIGHT,
            default_timer: DEFAULT_TIMER,
            pretty_json: true,
        }
    }
}

impl CodecConfig {
    /// Load configuration from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| Sma4Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::parse(&content)
    }

    /// Parse configuration text
    ///
    /// Blank lines and `#` comments are skipped. A line without `=` or with
    /// an empty key is an error; values that do not parse keep the default.
    pub fn parse(content: &str) -> Result<Self> {
        let mut config = Self::default();

        for (number, line) in content.lines().enumerate() {
            let line = line.trim();

            // Skip comments and empty lines
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some(eq_pos) = line.find('=') else {
                return Err(Sma4Error::Config(format!("line {}: expected key = value", number + 1)));
            };
            let key = line[..eq_pos].trim();
            let value = line[eq_pos + 1..].trim();
            if key.is_empty() {
                return Err(Sma4Error::Config(format!("line {}: missing key", number + 1)));
            }

            config.parse_option(key, value);
        }

        Ok(config)
    }

    fn parse_option(&mut self, key: &str, value: &str) {
        match key {
            "log_level" => self.log_level = value.into(),
            "level_name" => {
                self.level_name = if value.is_empty() { None } else { Some(value.into()) };
            }
            "import_room_height" => {
                self.import_room_height = value
                    .parse::<i32>()
                    .unwrap_or(MAX_ROOM_TILE_HEIGHT)
                    .clamp(MIN_ROOM_TILE_HEIGHT, MAX_ROOM_TILE_HEIGHT);
            }
            "default_timer" => {
                self.default_timer = value
                    .parse::<i32>()
                    .map_or(DEFAULT_TIMER, |t| t.clamp(0, MAX_TIMER) as u16);
            }
            "pretty_json" => {
                self.pretty_json = value.parse().unwrap_or(true);
            }
            _ => tracing::warn!("unknown config option '{}'", key),
        }
    }

    /// Log the effective configuration
    pub fn display(&self) {
        tracing::info!("Configuration:");
        tracing::info!("  log level: {}", self.log_level);
        match &self.level_name {
            Some(name) => tracing::info!("  level name override: {}", name),
            None => tracing::info!("  level name override: none"),
        }
        tracing::info!("  import room height: {}", self.import_room_height);
        tracing::info!("  default timer: {}", self.default_timer);
        tracing::info!("  pretty json: {}", self.pretty_json);
    }
}
