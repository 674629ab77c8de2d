//! AT-command transaction engine.
//!
//! `Modem` owns the serial link exclusively and runs one command at a time.
//! The submodules add behaviour to it: `transaction` (send and classify),
//! plus connection bring-up here. Status reconciliation, baud negotiation
//! and SMS operations live in their own top-level modules and extend
//! `Modem` with further methods.

pub mod commands;
pub mod timing;
pub mod transaction;

pub use timing::Timing;
pub use transaction::TransactionResult;

use crate::config::Config;
use crate::negotiation::BaudNegotiator;
use crate::port::{Link, PortError};
use tracing::{info, warn};

/// A SIM800-class modem reachable over one serial link.
#[derive(Debug)]
pub struct Modem {
    link: Link,
    timing: Timing,
    negotiator: BaudNegotiator,
}

impl Modem {
    pub fn new(link: Link, timing: Timing) -> Self {
        Self {
            link,
            timing,
            negotiator: BaudNegotiator::new(),
        }
    }

    /// A modem on the hardware port named in `config`, not yet connected.
    pub fn from_config(config: &Config) -> Self {
        let link = Link::system(config.serial.port.clone(), config.serial.port_configuration());
        Self::new(link, config.modem.timing())
            .with_negotiator(BaudNegotiator::with_baud_rates(config.modem.baud_candidates.clone()))
    }

    /// Replace the negotiator used by `detect_baud_rate`.
    pub fn with_negotiator(mut self, negotiator: BaudNegotiator) -> Self {
        self.negotiator = negotiator;
        self
    }

    pub fn link(&self) -> &Link {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut Link {
        &mut self.link
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Open the serial link at the configured speed.
    pub fn connect(&mut self) -> Result<(), PortError> {
        self.link.open()?;
        info!(
            port = %self.link.port_name(),
            baud = self.link.baud_rate(),
            "connected"
        );
        Ok(())
    }

    /// Close the serial link. Safe to call when already closed.
    pub fn disconnect(&mut self) {
        self.link.close();
    }

    /// Try each candidate speed until the modem answers.
    ///
    /// On success the link stays open at the detected speed with the
    /// normal timeout restored. On failure the link is left closed.
    pub fn detect_baud_rate(&mut self) -> bool {
        let negotiator = self.negotiator.clone();
        match negotiator.detect(self) {
            Ok(baud) => {
                info!(baud, "detected baud rate");
                true
            }
            Err(e) => {
                warn!(error = %e, "failed to detect baud rate");
                false
            }
        }
    }

    /// Bring the link up and turn command echo off.
    ///
    /// Opens the link if needed and waits for the module to settle. If the
    /// echo command draws no reply at all, one baud rescan is attempted
    /// before echo is disabled again. `Ok(false)` means the modem could not
    /// be reached at any speed; `Err` means the port itself is unavailable.
    pub fn setup_connection(&mut self) -> Result<bool, PortError> {
        if !self.link.is_open() {
            self.connect()?;
        }
        std::thread::sleep(self.timing.startup_delay);

        let echo = self.send(commands::ECHO_OFF);
        if echo.is_silent() {
            info!("no response from module, attempting baud rate detection");
            if !self.detect_baud_rate() {
                warn!("module not responding at any candidate baud rate");
                return Ok(false);
            }
            self.send(commands::ECHO_OFF);
        }
        Ok(true)
    }

    /// Check that the module identifies itself.
    ///
    /// An identity other than SIM800 is logged but accepted, as long as the
    /// modem answered `OK`.
    pub fn verify_module(&mut self) -> bool {
        let result = self.send(commands::IDENTIFY);
        if !result.success() {
            warn!("failed to verify module");
            return false;
        }

        if result.data().contains("SIM800") {
            info!(identity = %result.data(), "module verified");
        } else {
            warn!(identity = %result.data(), "unexpected module identity");
        }
        true
    }
}
