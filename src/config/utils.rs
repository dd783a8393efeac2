/// Configuration utilities - loading, environment overrides and access helpers
use super::schemas::Config;
use crate::logger::{self, LogTag};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::path::Path;

/// Global configuration instance
///
/// Falls back to defaults when read before [`load_config`] runs, so library
/// users that never touch a config file still get working endpoints.
pub static CONFIG: OnceCell<RwLock<Config>> = OnceCell::new();

/// Default configuration file path
pub const CONFIG_FILE_PATH: &str = "data/config.toml";

/// Load configuration from [`CONFIG_FILE_PATH`] and install it globally
pub fn load_config() -> Result<(), String> {
    load_config_from_path(CONFIG_FILE_PATH)
}

/// Load configuration from a TOML file (defaults when the file is missing),
/// apply environment overrides, validate, and install it globally
pub fn load_config_from_path(path: &str) -> Result<(), String> {
    let mut config = read_config_file(path)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config.validate()?;

    let cell = CONFIG.get_or_init(|| RwLock::new(Config::default()));
    *cell.write() = config;
    Ok(())
}

/// Parse a config file without installing it
pub fn read_config_file(path: &str) -> Result<Config, String> {
    if !Path::new(path).exists() {
        logger::warning(
            LogTag::Config,
            &format!("Config file '{}' not found, using default values", path),
        );
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file '{}': {}", path, e))?;

    toml::from_str::<Config>(&contents)
        .map_err(|e| format!("Failed to parse config file '{}': {}", path, e))
}

/// Secrets come from the environment so they never have to live in the file
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let overrides: [(&str, &mut String); 4] = [
        ("OKX_API_KEY", &mut config.okx.api_key),
        ("OKX_SECRET", &mut config.okx.secret),
        ("OKX_PASSPHRASE", &mut config.okx.passphrase),
        ("JUPITER_API_KEY", &mut config.jupiter.api_key),
    ];

    for (key, field) in overrides {
        if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
            logger::debug(LogTag::Config, &format!("Applied {} from environment", key));
            *field = value;
        }
    }
}

/// Execute a function with read access to the configuration
///
/// ```
/// use solswap::config::with_config;
///
/// let debounce = with_config(|cfg| cfg.store.debounce_ms);
/// assert!(debounce > 0);
/// ```
pub fn with_config<F, R>(f: F) -> R
where
    F: FnOnce(&Config) -> R,
{
    let cell = CONFIG.get_or_init(|| RwLock::new(Config::default()));
    let config = cell.read();
    f(&config)
}

/// Clone of the whole configuration, for holding across await points
pub fn get_config_clone() -> Config {
    with_config(|cfg| cfg.clone())
}

/// Write the current configuration to disk as pretty TOML
pub fn save_config(path: Option<&str>) -> Result<(), String> {
    let path = path.unwrap_or(CONFIG_FILE_PATH);

    let config_str = with_config(|cfg| {
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))
    })?;

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create '{}': {}", parent.display(), e))?;
        }
    }

    std::fs::write(path, config_str)
        .map_err(|e| format!("Failed to write config file '{}': {}", path, e))
}
