//! SIM800 Agent Library
//!
//! Drives a SIM800-class GSM modem over a serial link with AT commands:
//! command transactions, baud rate detection, status reconciliation and
//! text-mode SMS.
//!
//! # Modules
//!
//! - `config`: Configuration management with TOML support
//! - `error`: Crate-level error type
//! - `logging`: Tracing subscriber setup
//! - `port`: Serial link transport and its mock
//! - `modem`: Transaction engine and connection bring-up
//! - `negotiation`: Baud rate detection
//! - `status`: Query-then-set reconciliation of modem settings
//! - `sms`: Message listing, parsing, deletion and submission
//! - `workflow`: The init, send and read procedures behind the CLI

pub mod config;
pub mod error;
pub mod logging;
pub mod modem;
pub mod negotiation;
pub mod port;
pub mod sms;
pub mod status;
pub mod workflow;

// Re-export commonly used types for convenience
pub use error::{AgentError, AgentResult};
pub use modem::{Modem, Timing, TransactionResult};
pub use negotiation::{BaudNegotiator, NegotiationError, MODEM_BAUD_RATES};
pub use port::{
    DataBits, FlowControl, Framing, Link, MockOpener, MockSerialPort, Parity,
    PortConfiguration, PortError, PortOpener, SerialPortAdapter, StopBits, SyncSerialPort,
    SystemOpener,
};
pub use sms::{parse_list, SmsRecord, SubmitOutcome};
pub use status::{NumericStatus, Reading, StatusCheck, TextStatus};
pub use workflow::SendReport;

// Re-export config types
pub use config::{Config, ConfigError, ConfigLoader, ConfigResult};
