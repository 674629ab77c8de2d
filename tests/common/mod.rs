//! Shared test utilities for the SIM800 agent tests.
//!
//! This module provides common test infrastructure including:
//! - Fast timing so mock transactions finish in milliseconds
//! - Modem construction over a scripted `MockSerialPort`
//! - Reply builders in the shape a SIM800 actually sends

#![allow(dead_code)]

use sim800_agent::modem::{Modem, Timing};
use sim800_agent::negotiation::BaudNegotiator;
use sim800_agent::port::{Link, MockOpener, MockSerialPort, PortConfiguration};
use std::time::Duration;

pub const MOCK_PORT: &str = "MOCK0";

/// Timing scaled down for mocks. Ratios between knobs match the defaults.
pub fn fast_timing() -> Timing {
    Timing {
        command_timeout: Duration::from_millis(200),
        grace_delay: Duration::from_millis(30),
        grace_poll: Duration::from_millis(5),
        quiescence: Duration::from_millis(5),
        poll_interval: Duration::from_millis(1),
        startup_delay: Duration::from_millis(1),
        prompt_timeout: Duration::from_millis(100),
        submit_timeout: Duration::from_millis(200),
        submit_trailer: Duration::from_millis(5),
        message_gap: Duration::from_millis(1),
    }
}

/// Negotiator with millisecond probe bounds.
pub fn fast_negotiator(baud_rates: Vec<u32>) -> BaudNegotiator {
    BaudNegotiator::with_baud_rates(baud_rates)
        .with_probe_timeouts(Duration::from_millis(10), Duration::from_millis(60))
}

/// A closed modem whose link opens onto `opener`.
pub fn modem_with_opener(opener: MockOpener) -> Modem {
    let config = PortConfiguration::at_baud(115200, Duration::from_millis(50));
    let link = Link::new(MOCK_PORT, config, opener);
    Modem::new(link, fast_timing()).with_negotiator(fast_negotiator(vec![115200, 9600, 19200]))
}

/// An open modem over a port that answers at every speed.
///
/// Returns the modem and a handle to the shared mock for scripting and
/// inspecting writes.
pub fn connected_modem() -> (Modem, MockSerialPort) {
    let port = MockSerialPort::new(MOCK_PORT);
    let mut modem = modem_with_opener(MockOpener::new(port.clone()));
    modem.connect().expect("mock port opens");
    (modem, port)
}

/// A reply framed the way the modem frames it: each line wrapped in CR LF.
pub fn reply(lines: &[&str]) -> Vec<u8> {
    lines
        .iter()
        .map(|line| format!("\r\n{line}\r\n"))
        .collect::<String>()
        .into_bytes()
}

/// Plain `OK`.
pub fn ok() -> Vec<u8> {
    reply(&["OK"])
}

/// Plain `ERROR`.
pub fn error() -> Vec<u8> {
    reply(&["ERROR"])
}

/// Commands written to the port, terminator stripped, in order.
pub fn sent_commands(port: &MockSerialPort) -> Vec<String> {
    port.written_text()
        .into_iter()
        .map(|text| text.trim_end_matches("\r\n").to_string())
        .collect()
}
