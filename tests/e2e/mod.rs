//! End-to-end tests for the SIM800 agent.
//!
//! These tests drive `Modem` over mock serial ports that answer like a
//! SIM800 would, covering everything from single transactions to the full
//! init, send and read procedures.

pub mod negotiation_tests;
pub mod sms_tests;
pub mod status_tests;
