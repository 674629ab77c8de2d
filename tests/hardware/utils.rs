//! Utility functions for hardware testing.
//!
//! Builds a `Modem` on the port named by `SIM800_PORT`, using the same
//! configuration resolution as the `sim800` binary.

use sim800_agent::config::{Config, ConfigLoader};
use sim800_agent::Modem;
use serialport::available_ports;

/// Configuration for the attached modem, or `None` when no port is set.
pub fn hardware_config() -> Option<Config> {
    std::env::var("SIM800_PORT").ok()?;
    match ConfigLoader::load() {
        Ok(loader) => Some(loader.into_config()),
        Err(e) => {
            println!("Skipping hardware test: configuration error: {e}");
            None
        }
    }
}

/// Skip test if hardware is not available.
pub fn skip_without_hardware() -> Option<Modem> {
    match hardware_config() {
        Some(config) => Some(Modem::from_config(&config)),
        None => {
            println!("Skipping hardware test: SIM800_PORT not set");
            None
        }
    }
}

/// Names of the serial ports the OS reports.
pub fn list_port_names() -> Vec<String> {
    available_ports()
        .unwrap_or_default()
        .into_iter()
        .map(|info| info.port_name)
        .collect()
}
