//! Sequential baud probing over the modem's own transaction engine.

use super::NegotiationError;
use crate::modem::{commands, Modem};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Speeds SIM800 modules are commonly found at, most likely first.
pub const MODEM_BAUD_RATES: &[u32] = &[115200, 9600, 19200, 38400, 57600];

/// Port read timeout while probing.
const PROBE_PORT_TIMEOUT: Duration = Duration::from_millis(500);

/// Bound on each probe transaction.
const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Tries candidate speeds in order until the probe command succeeds.
#[derive(Debug, Clone)]
pub struct BaudNegotiator {
    baud_rates: Vec<u32>,
    probe_command: String,
    probe_port_timeout: Duration,
    probe_timeout: Duration,
}

impl BaudNegotiator {
    /// Negotiator over `MODEM_BAUD_RATES`, probing with `AT`.
    pub fn new() -> Self {
        Self::with_baud_rates(MODEM_BAUD_RATES.to_vec())
    }

    /// Negotiator over custom candidate speeds, tried in the given order.
    ///
    /// An empty list falls back to `MODEM_BAUD_RATES`.
    pub fn with_baud_rates(baud_rates: Vec<u32>) -> Self {
        let baud_rates = if baud_rates.is_empty() {
            MODEM_BAUD_RATES.to_vec()
        } else {
            baud_rates
        };
        Self {
            baud_rates,
            probe_command: commands::ATTENTION.to_string(),
            probe_port_timeout: PROBE_PORT_TIMEOUT,
            probe_timeout: PROBE_TIMEOUT,
        }
    }

    /// Set the port timeout used while probing and the bound on each probe.
    pub fn with_probe_timeouts(mut self, port_timeout: Duration, probe_timeout: Duration) -> Self {
        self.probe_port_timeout = port_timeout;
        self.probe_timeout = probe_timeout;
        self
    }

    pub fn baud_rates(&self) -> &[u32] {
        &self.baud_rates
    }

    /// Find the speed the modem is using.
    ///
    /// Each candidate closes and reopens the link. A candidate whose port
    /// fails to open is logged and skipped. On success the link is left
    /// open at the winning speed with the caller's timeout restored; on
    /// failure it is left closed with the probe timeout configured.
    pub fn detect(&self, modem: &mut Modem) -> Result<u32, NegotiationError> {
        let normal_timeout = modem.link().timeout();
        info!(
            port = %modem.link().port_name(),
            candidates = self.baud_rates.len(),
            "starting baud rate detection"
        );

        for &baud in &self.baud_rates {
            debug!(baud, "trying baud rate");

            if let Err(e) = modem.link_mut().reopen(baud, self.probe_port_timeout) {
                warn!(baud, error = %e, "could not open port at candidate baud rate");
                modem.link_mut().close();
                continue;
            }

            let probe = modem.send_with_timeout(&self.probe_command, self.probe_timeout);
            if probe.success() {
                modem.link_mut().set_timeout(normal_timeout)?;
                return Ok(baud);
            }

            modem.link_mut().close();
        }

        Err(NegotiationError::AllCandidatesFailed {
            tried: self.baud_rates.len(),
        })
    }
}

impl Default for BaudNegotiator {
    fn default() -> Self {
        Self::new()
    }
}
