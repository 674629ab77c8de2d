//! Configuration loader with file resolution and environment override support.

use super::error::{ConfigError, ConfigResult};
use super::schema::Config;
use directories::ProjectDirs;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Config file name
const CONFIG_FILE_NAME: &str = "sim800.toml";

/// Application directory name under the platform config dir
const APP_DIR_NAME: &str = "sim800";

/// Environment variable for explicit config path
const CONFIG_PATH_ENV: &str = "SIM800_CONFIG";

/// Prefix of numbered message body variables (`MESSAGE_1`, `MESSAGE_2`, ...)
const MESSAGE_ENV_PREFIX: &str = "MESSAGE_";

/// Configuration loader with resolution and override logic.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Resolved config file path (if any)
    pub config_path: Option<PathBuf>,
    /// The loaded configuration
    pub config: Config,
}

impl ConfigLoader {
    /// Load configuration using standard resolution order.
    ///
    /// Resolution priority (highest to lowest):
    /// 1. `SIM800_CONFIG` environment variable (explicit path)
    /// 2. `./sim800.toml` (current directory)
    /// 3. `<platform config dir>/sim800/sim800.toml`
    /// 4. Built-in defaults (no file required)
    ///
    /// Environment variables override file values, and the merged result
    /// must pass [`Config::validate`].
    pub fn load() -> ConfigResult<Self> {
        let config_path = resolve_config_path();

        let mut config = match config_path {
            Some(ref path) => load_from_file(path)?,
            None => Config::default(),
        };

        apply_env_overrides(&mut config)?;
        config.validate()?;

        Ok(Self { config_path, config })
    }

    /// Load configuration from a specific file path.
    ///
    /// Environment overrides apply as for [`ConfigLoader::load`], and the
    /// result is validated.
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(ConfigError::NotFound(path));
        }
        let mut config = load_from_file(&path)?;
        apply_env_overrides(&mut config)?;
        config.validate()?;

        Ok(Self {
            config_path: Some(path),
            config,
        })
    }

    /// Create a loader with default configuration (no file, no environment).
    pub fn with_defaults() -> Self {
        Self {
            config_path: None,
            config: Config::default(),
        }
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get a mutable reference to the configuration.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> Config {
        self.config
    }

    /// Save the current configuration to a specific file.
    pub fn save_to(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        save_to_file(&self.config, path.as_ref())
    }
}

/// Resolve the configuration file path using standard locations.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    let cwd_config = PathBuf::from(CONFIG_FILE_NAME);
    if cwd_config.exists() {
        return Some(cwd_config);
    }

    get_default_config_path().filter(|path| path.exists())
}

/// Platform config directory for this application, e.g. `~/.config/sim800`.
pub fn get_default_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_DIR_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Default config file path inside [`get_default_config_dir`].
pub fn get_default_config_path() -> Option<PathBuf> {
    get_default_config_dir().map(|d| d.join(CONFIG_FILE_NAME))
}

/// Load configuration from a file.
fn load_from_file(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&content).map_err(ConfigError::ParseError)
}

/// Save configuration to a file.
fn save_to_file(config: &Config, path: &Path) -> ConfigResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|e| ConfigError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Apply overrides from the process environment.
fn apply_env_overrides(config: &mut Config) -> ConfigResult<()> {
    apply_overrides(config, &std::env::vars().collect())
}

/// Apply overrides from a set of `NAME=value` pairs.
///
/// Recognised names: `SIM800_PORT`, `SIM800_BAUD`, `SIM800_TIMEOUT_MS`,
/// `SIM800_PIN`, `SMS_PHONE_NUMBER`, `SMS_PHONE_NUMBER_LOG`, `MESSAGE_<n>`,
/// `SIM800_LOG_LEVEL`. Everything else is ignored, including `MESSAGE_*`
/// names whose suffix is not a number.
pub fn apply_overrides(config: &mut Config, vars: &HashMap<String, String>) -> ConfigResult<()> {
    if let Some(val) = vars.get("SIM800_PORT") {
        config.serial.port = val.clone();
    }
    if let Some(val) = vars.get("SIM800_BAUD") {
        config.serial.baud_rate = parse_var("SIM800_BAUD", val, "Invalid baud rate")?;
    }
    if let Some(val) = vars.get("SIM800_TIMEOUT_MS") {
        config.serial.timeout_ms = parse_var("SIM800_TIMEOUT_MS", val, "Invalid timeout")?;
    }
    if let Some(val) = vars.get("SIM800_PIN") {
        config.modem.pin = Some(val.clone());
    }
    if let Some(val) = vars.get("SMS_PHONE_NUMBER") {
        config.sms.phone_number = Some(val.clone());
    }
    if let Some(val) = vars.get("SMS_PHONE_NUMBER_LOG") {
        config.sms.log_phone_number = Some(val.clone());
    }
    if let Some(val) = vars.get("SIM800_LOG_LEVEL") {
        config.logging.level = val.clone();
    }

    for (name, body) in vars {
        let Some(number) = name
            .strip_prefix(MESSAGE_ENV_PREFIX)
            .filter(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
        else {
            continue;
        };
        let number: u32 = parse_var(name, number, "Message number out of range")?;
        config.sms.messages.insert(number.to_string(), body.clone());
    }

    Ok(())
}

fn parse_var<T: FromStr>(var: &str, val: &str, message: &str) -> ConfigResult<T> {
    val.trim()
        .parse()
        .map_err(|_| ConfigError::env_parse(var, message))
}
