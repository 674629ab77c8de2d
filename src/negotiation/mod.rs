//! Baud rate negotiation.
//!
//! A SIM800 may be running at any of several speeds (auto-bauding, or a
//! rate stored with `AT+IPR`). The negotiator reopens the link at each
//! candidate speed and probes with `AT` until the modem answers `OK`.

pub mod detector;

pub use detector::{BaudNegotiator, MODEM_BAUD_RATES};

use crate::port::PortError;
use thiserror::Error;

/// Errors that can occur during baud negotiation.
#[derive(Debug, Error)]
pub enum NegotiationError {
    /// No candidate produced a successful probe.
    #[error("No response at any of {tried} candidate baud rates")]
    AllCandidatesFailed { tried: usize },

    /// The link could not be reconfigured after a successful probe.
    #[error("Port error: {0}")]
    PortError(#[from] PortError),
}
