//! Crate-level error type.
//!
//! Protocol outcomes (no reply, `ERROR`, a missing prompt) are ordinary
//! values on `Modem`'s methods. `AgentError` only carries the failures that
//! stop a run outright: an unusable port, a bad configuration, or a modem
//! that cannot be reached at any speed.

use crate::config::ConfigError;
use crate::negotiation::NegotiationError;
use crate::port::PortError;
use thiserror::Error;

/// Unified application error type.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Serial port error: {0}")]
    Port(#[from] PortError),

    #[error("Baud negotiation failed: {0}")]
    Negotiation(#[from] NegotiationError),

    /// A step of a CLI workflow reported failure.
    #[error("{0}")]
    Step(String),
}

impl AgentError {
    pub fn step(message: impl Into<String>) -> Self {
        Self::Step(message.into())
    }
}

/// A specialized `Result` type for agent workflows.
pub type AgentResult<T> = Result<T, AgentError>;
