//! Baud detection and connection bring-up against per-baud mock openers.

use crate::common::{fast_negotiator, modem_with_opener, ok, reply, sent_commands, MOCK_PORT};
use pretty_assertions::assert_eq;
use sim800_agent::negotiation::NegotiationError;
use sim800_agent::port::{MockOpener, MockSerialPort};
use std::time::Duration;

#[test]
fn test_detects_first_answering_candidate() {
    let mut port = MockSerialPort::new(MOCK_PORT);
    port.enqueue_reply(&ok());
    let opener = MockOpener::new(port.clone()).live_at(9600);
    let mut modem = modem_with_opener(opener.clone());

    assert!(modem.detect_baud_rate());
    assert_eq!(modem.link().baud_rate(), 9600);
    assert!(modem.link().is_open());
    assert_eq!(opener.attempts(), vec![115200, 9600]);
}

#[test]
fn test_normal_timeout_restored_after_detection() {
    let mut port = MockSerialPort::new(MOCK_PORT);
    port.enqueue_reply(&ok());
    let mut modem = modem_with_opener(MockOpener::new(port.clone()).live_at(19200));
    let normal = modem.link().timeout();

    assert!(modem.detect_baud_rate());
    assert_eq!(modem.link().timeout(), normal);
    assert_eq!(port.current_timeout(), normal);
}

#[test]
fn test_unopenable_candidate_is_skipped() {
    let mut port = MockSerialPort::new(MOCK_PORT);
    port.enqueue_reply(&ok());
    let opener = MockOpener::new(port.clone())
        .live_at(19200)
        .failing_at(9600);
    let mut modem = modem_with_opener(opener.clone());

    assert!(modem.detect_baud_rate());
    assert_eq!(modem.link().baud_rate(), 19200);
    assert_eq!(opener.attempts(), vec![115200, 9600, 19200]);
}

#[test]
fn test_all_candidates_failing_leaves_link_closed() {
    let port = MockSerialPort::new(MOCK_PORT);
    let opener = MockOpener::new(port).live_at(4800);
    let mut modem = modem_with_opener(opener.clone());

    assert!(!modem.detect_baud_rate());
    assert!(!modem.link().is_open());
    assert_eq!(opener.attempts(), vec![115200, 9600, 19200]);
}

#[test]
fn test_negotiator_reports_candidates_tried() {
    let opener = MockOpener::new(MockSerialPort::new(MOCK_PORT)).live_at(4800);
    let mut modem = modem_with_opener(opener);

    let err = fast_negotiator(vec![9600, 57600])
        .detect(&mut modem)
        .unwrap_err();
    assert!(matches!(err, NegotiationError::AllCandidatesFailed { tried: 2 }));
}

#[test]
fn test_probe_sends_plain_attention() {
    let mut port = MockSerialPort::new(MOCK_PORT);
    port.enqueue_reply(&ok());
    let opener = MockOpener::new(port.clone());
    let mut modem = modem_with_opener(opener);

    let baud = fast_negotiator(vec![38400]).detect(&mut modem).unwrap();
    assert_eq!(baud, 38400);
    assert_eq!(sent_commands(&port), vec!["AT"]);
}

#[test]
fn test_setup_connection_disables_echo() {
    let mut port = MockSerialPort::new(MOCK_PORT);
    port.enqueue_reply(&reply(&["ATE0", "OK"]));
    let mut modem = modem_with_opener(MockOpener::new(port.clone()));

    assert!(modem.setup_connection().unwrap());
    assert!(modem.link().is_open());
    assert_eq!(sent_commands(&port), vec!["ATE0"]);
}

#[test]
fn test_setup_connection_rescans_when_silent() {
    let mut port = MockSerialPort::new(MOCK_PORT);
    port.script([ok(), ok()]);
    let opener = MockOpener::new(port.clone()).live_at(9600);
    let mut modem = modem_with_opener(opener.clone());

    assert!(modem.setup_connection().unwrap());
    assert_eq!(modem.link().baud_rate(), 9600);
    // The first ATE0 and the 115200 probe went to silent ports.
    assert_eq!(sent_commands(&port), vec!["AT", "ATE0"]);
    assert_eq!(opener.attempts(), vec![115200, 115200, 9600]);
}

#[test]
fn test_setup_connection_error_reply_does_not_rescan() {
    let mut port = MockSerialPort::new(MOCK_PORT);
    port.enqueue_reply(&reply(&["+CME ERROR: 3", "ERROR"]));
    let opener = MockOpener::new(port.clone());
    let mut modem = modem_with_opener(opener.clone());

    assert!(modem.setup_connection().unwrap());
    assert_eq!(opener.attempts(), vec![115200]);
}

#[test]
fn test_setup_connection_reports_unreachable_modem() {
    let opener = MockOpener::new(MockSerialPort::new(MOCK_PORT)).live_at(4800);
    let mut modem = modem_with_opener(opener);

    assert!(!modem.setup_connection().unwrap());
    assert!(!modem.link().is_open());
}

#[test]
fn test_setup_connection_propagates_open_failure() {
    let opener = MockOpener::new(MockSerialPort::new(MOCK_PORT)).failing_at(115200);
    let mut modem = modem_with_opener(opener);

    assert!(modem.setup_connection().is_err());
}

#[test]
fn test_verify_module_accepts_other_identity() {
    let mut port = MockSerialPort::new(MOCK_PORT);
    port.script([reply(&["SIM800 R14.18", "OK"]), reply(&["Quectel_M95", "OK"]), reply(&["ERROR"])]);
    let mut modem = modem_with_opener(MockOpener::new(port));
    modem.connect().unwrap();

    assert!(modem.verify_module());
    assert!(modem.verify_module());
    assert!(!modem.verify_module());
}

#[test]
fn test_probe_window_is_bounded() {
    let opener = MockOpener::new(MockSerialPort::new(MOCK_PORT)).live_at(4800);
    let mut modem = modem_with_opener(opener);

    let start = std::time::Instant::now();
    assert!(!modem.detect_baud_rate());
    // Three candidates at 60 ms each, with generous slack.
    assert!(start.elapsed() < Duration::from_secs(2));
}
