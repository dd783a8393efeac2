/// Logger configuration: minimum level plus per-tag debug switches
use super::levels::LogLevel;
use super::tags::LogTag;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub min_level: LogLevel,
    /// Tags whose Debug entries are shown
    pub debug_tags: HashSet<String>,
    /// Restricts Info/Warning output when non-empty
    pub enabled_tags: HashSet<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_tags: HashSet::new(),
            enabled_tags: HashSet::new(),
        }
    }
}

impl LoggerConfig {
    /// Build from the CLI `--debug a,b` list and `--verbose` switch
    pub fn from_cli(debug: &[String], verbose: bool) -> Self {
        let debug_tags: HashSet<String> = debug
            .iter()
            .flat_map(|entry| entry.split(','))
            .map(|tag| tag.trim().to_lowercase())
            .filter(|tag| !tag.is_empty())
            .collect();

        let min_level = if verbose {
            LogLevel::Verbose
        } else if debug_tags.is_empty() {
            LogLevel::Info
        } else {
            LogLevel::Debug
        };

        Self {
            min_level,
            debug_tags,
            enabled_tags: HashSet::new(),
        }
    }
}

static LOGGER_CONFIG: OnceCell<RwLock<LoggerConfig>> = OnceCell::new();

fn config_cell() -> &'static RwLock<LoggerConfig> {
    LOGGER_CONFIG.get_or_init(|| RwLock::new(LoggerConfig::default()))
}

pub fn get_logger_config() -> LoggerConfig {
    config_cell().read().clone()
}

pub fn set_logger_config(config: LoggerConfig) {
    *config_cell().write() = config;
}

pub fn update_logger_config<F: FnOnce(&mut LoggerConfig)>(f: F) {
    f(&mut config_cell().write());
}

pub fn is_debug_enabled_for_tag(config: &LoggerConfig, tag: &LogTag) -> bool {
    config.debug_tags.contains("all") || config.debug_tags.contains(&tag.to_debug_key())
}
