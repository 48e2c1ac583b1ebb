//! User preferences read from `preferences.json`.
//!
//! The client only ever reads this file. Every field is optional and falls
//! back to its default, so an absent or partial file is fine.

use crate::error::ClientError;
use log::{debug, warn};
use serde::{Deserialize, Deserializer};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_PREFERENCES_FILE: &str = "preferences.json";

const DEFAULT_LOGGING_ENABLED: bool = true;
const DEFAULT_GETSTATUS_INTERVAL_MS: u64 = 2000;
const DEFAULT_COMMAND_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Whether the per-server transcript is written. Accepts `true`/`false`,
    /// `1`/`0` or the same as strings.
    #[serde(deserialize_with = "deserialize_bool_like")]
    pub logging_enabled: bool,
    /// Milliseconds between two `getstatus` polls.
    pub getstatus_interval: u64,
    /// Minimum milliseconds between two accepted rcon commands.
    pub command_interval: u64,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            logging_enabled: DEFAULT_LOGGING_ENABLED,
            getstatus_interval: DEFAULT_GETSTATUS_INTERVAL_MS,
            command_interval: DEFAULT_COMMAND_INTERVAL_MS,
        }
    }
}

impl Preferences {
    pub fn from_json(text: &str) -> Result<Self, ClientError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads preferences from `path`, using defaults when the file is missing
    /// or cannot be parsed.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                debug!("No preferences at {} ({}), using defaults", path.display(), e);
                return Self::default();
            }
        };

        match Self::from_json(&text) {
            Ok(preferences) => preferences,
            Err(e) => {
                warn!("Ignoring {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Poll period for `getstatus`. A zero interval falls back to the default.
    pub fn status_interval(&self) -> Duration {
        match self.getstatus_interval {
            0 => Duration::from_millis(DEFAULT_GETSTATUS_INTERVAL_MS),
            ms => Duration::from_millis(ms),
        }
    }

    pub fn command_interval(&self) -> Duration {
        Duration::from_millis(self.command_interval)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BoolLike {
    Bool(bool),
    Number(i64),
    Text(String),
}

fn deserialize_bool_like<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match BoolLike::deserialize(deserializer)? {
        BoolLike::Bool(value) => value,
        BoolLike::Number(n) => n != 0,
        BoolLike::Text(s) => !matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "0" | "false" | "off" | "no"
        ),
    })
}
