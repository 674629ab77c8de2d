//! Configuration module for the SIM800 agent.
//!
//! This module provides TOML-based configuration with environment variable overrides.
//!
//! # Configuration Resolution
//!
//! Configuration is loaded from the following locations (in order of priority):
//!
//! 1. `SIM800_CONFIG` environment variable (explicit path)
//! 2. `./sim800.toml` (current directory)
//! 3. `~/.config/sim800/sim800.toml` (Linux; the platform equivalent elsewhere)
//! 4. Built-in defaults (no file required)
//!
//! # Environment Overrides
//!
//! - `SIM800_PORT`, `SIM800_BAUD`, `SIM800_TIMEOUT_MS`
//! - `SIM800_PIN`
//! - `SMS_PHONE_NUMBER`, `SMS_PHONE_NUMBER_LOG`
//! - `MESSAGE_<n>` for numbered message bodies
//! - `SIM800_LOG_LEVEL`
//!
//! # Example
//!
//! ```rust,ignore
//! use sim800_agent::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load()?;
//! let config = loader.config();
//!
//! println!("Port: {}", config.serial.port);
//! ```

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    apply_overrides, get_default_config_dir, get_default_config_path, resolve_config_path,
    ConfigLoader,
};
pub use schema::{Config, LogFormat, LoggingConfig, ModemConfig, SerialConfig, SmsConfig};
