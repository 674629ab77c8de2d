//! Configuration schema definitions.
//!
//! Every section carries `#[serde(default)]`, so a config file only needs
//! the keys it wants to change.

use super::error::{ConfigError, ConfigResult};
use crate::modem::Timing;
use crate::negotiation::MODEM_BAUD_RATES;
use crate::port::{Framing, PortConfiguration};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Serial link settings
    pub serial: SerialConfig,
    /// Modem behaviour and timing
    pub modem: ModemConfig,
    /// Recipients and message bodies
    pub sms: SmsConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Reject values the modem engine cannot run with: an empty port name,
    /// a zero baud rate or poll interval, or a quiescence window that is not
    /// shorter than the command timeout.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.serial.port.trim().is_empty() {
            return Err(ConfigError::validation("serial.port", "must not be empty"));
        }
        if self.serial.baud_rate == 0 {
            return Err(ConfigError::validation("serial.baud_rate", "must be greater than zero"));
        }

        let modem = &self.modem;
        if modem.poll_interval_ms == 0 {
            return Err(ConfigError::validation("modem.poll_interval_ms", "must be greater than zero"));
        }
        if modem.grace_poll_ms == 0 {
            return Err(ConfigError::validation("modem.grace_poll_ms", "must be greater than zero"));
        }
        if modem.quiescence_ms >= modem.command_timeout_ms {
            return Err(ConfigError::validation(
                "modem.quiescence_ms",
                format!(
                    "must be shorter than command_timeout_ms ({})",
                    modem.command_timeout_ms
                ),
            ));
        }
        Ok(())
    }
}

/// Serial link configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device node or COM port
    pub port: String,
    /// Initial baud rate
    pub baud_rate: u32,
    /// Per-call read timeout in milliseconds
    pub timeout_ms: u64,
    /// `data_bits`, `parity`, `stop_bits`, `flow_control`; 8N1 if absent
    #[serde(flatten)]
    pub framing: Framing,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyS0".to_string(),
            baud_rate: 115200,
            timeout_ms: 1000,
            framing: Framing::default(),
        }
    }
}

impl SerialConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn port_configuration(&self) -> PortConfiguration {
        PortConfiguration::at_baud(self.baud_rate, self.timeout()).with_framing(self.framing)
    }
}

/// Modem configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModemConfig {
    /// SIM PIN, entered only if the SIM asks for one
    pub pin: Option<String>,
    /// Baud rates tried by detection, in order
    pub baud_candidates: Vec<u32>,
    pub command_timeout_ms: u64,
    pub grace_delay_ms: u64,
    pub grace_poll_ms: u64,
    pub quiescence_ms: u64,
    pub poll_interval_ms: u64,
    pub startup_delay_ms: u64,
    pub prompt_timeout_ms: u64,
    pub submit_timeout_ms: u64,
    pub submit_trailer_ms: u64,
    pub message_gap_ms: u64,
}

impl Default for ModemConfig {
    fn default() -> Self {
        let timing = Timing::default();
        let ms = |d: Duration| d.as_millis() as u64;
        Self {
            pin: None,
            baud_candidates: MODEM_BAUD_RATES.to_vec(),
            command_timeout_ms: ms(timing.command_timeout),
            grace_delay_ms: ms(timing.grace_delay),
            grace_poll_ms: ms(timing.grace_poll),
            quiescence_ms: ms(timing.quiescence),
            poll_interval_ms: ms(timing.poll_interval),
            startup_delay_ms: ms(timing.startup_delay),
            prompt_timeout_ms: ms(timing.prompt_timeout),
            submit_timeout_ms: ms(timing.submit_timeout),
            submit_trailer_ms: ms(timing.submit_trailer),
            message_gap_ms: ms(timing.message_gap),
        }
    }
}

impl ModemConfig {
    pub fn timing(&self) -> Timing {
        Timing {
            command_timeout: Duration::from_millis(self.command_timeout_ms),
            grace_delay: Duration::from_millis(self.grace_delay_ms),
            grace_poll: Duration::from_millis(self.grace_poll_ms),
            quiescence: Duration::from_millis(self.quiescence_ms),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            startup_delay: Duration::from_millis(self.startup_delay_ms),
            prompt_timeout: Duration::from_millis(self.prompt_timeout_ms),
            submit_timeout: Duration::from_millis(self.submit_timeout_ms),
            submit_trailer: Duration::from_millis(self.submit_trailer_ms),
            message_gap: Duration::from_millis(self.message_gap_ms),
        }
    }
}

/// SMS configuration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SmsConfig {
    /// Primary recipient
    pub phone_number: Option<String>,
    /// Recipient of the delivery log message
    pub log_phone_number: Option<String>,
    /// Numbered message bodies: `"1" = "text"`
    pub messages: BTreeMap<String, String>,
}

impl SmsConfig {
    /// Body number `n`, if configured.
    pub fn message(&self, n: u32) -> Option<&str> {
        self.messages.get(&n.to_string()).map(String::as_str)
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset: "trace" .. "error"
    pub level: String,
    /// Log format: "json", "pretty", "compact"
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format
    Json,
    /// Pretty format with colors
    #[default]
    Pretty,
    /// Compact format
    Compact,
}
