//! Demo configuration read from the environment.
use std::env;
use std::path::PathBuf;

use chronicle_core::{SchedulerConfig, Tick};
use chronicle_runtime::RuntimeConfig;

/// How bus events are written to stdout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::EnumString, strum::Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EventFormat {
    #[default]
    Text,
    Json,
}

/// Settings for the scheduler demo.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CliConfig {
    pub time_in_round: Tick,
    pub steps: usize,
    pub npcs: usize,
    pub event_buffer: usize,
    pub log_dir: Option<PathBuf>,
    pub event_format: EventFormat,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            time_in_round: SchedulerConfig::DEFAULT_TIME_IN_ROUND,
            steps: 20,
            npcs: 3,
            event_buffer: 100,
            log_dir: None,
            event_format: EventFormat::Text,
        }
    }
}

impl CliConfig {
    /// Construct configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CHRONICLE_TIME_IN_ROUND` - Length of a round in time units (default: 100)
    /// - `CHRONICLE_STEPS` - Number of turns to simulate (default: 20)
    /// - `CHRONICLE_NPCS` - Number of AI actors next to the player (default: 3)
    /// - `CHRONICLE_EVENT_BUFFER` - Per-topic event buffer (default: 100)
    /// - `CHRONICLE_LOG_DIR` - Also write logs to `chronicle.log` in this directory
    /// - `CHRONICLE_EVENT_FORMAT` - `text` or `json` (default: text)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`CliConfig::from_env`] over an arbitrary key lookup.
    /// Unparsable values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(len) = read::<u64>(&lookup, "CHRONICLE_TIME_IN_ROUND") {
            config.time_in_round = Tick(len.max(1));
        }
        if let Some(steps) = read(&lookup, "CHRONICLE_STEPS") {
            config.steps = steps;
        }
        if let Some(npcs) = read(&lookup, "CHRONICLE_NPCS") {
            config.npcs = npcs;
        }
        if let Some(buffer) = read::<usize>(&lookup, "CHRONICLE_EVENT_BUFFER") {
            config.event_buffer = buffer.max(1);
        }
        if let Some(dir) = lookup("CHRONICLE_LOG_DIR").filter(|dir| !dir.is_empty()) {
            config.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(format) = read(&lookup, "CHRONICLE_EVENT_FORMAT") {
            config.event_format = format;
        }

        config
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            scheduler: SchedulerConfig::new().with_time_in_round(self.time_in_round),
            event_buffer_size: self.event_buffer,
            ..RuntimeConfig::default()
        }
    }
}

fn read<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    lookup(key)?.trim().parse().ok()
}
