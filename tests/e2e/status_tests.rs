//! Status reconciliation: query first, correct only when needed.

use crate::common::{connected_modem, error, ok, reply, sent_commands};
use pretty_assertions::assert_eq;
use sim800_agent::status::{self, NumericStatus, TextStatus};
use std::cell::Cell;
use std::time::{Duration, Instant};

#[test]
fn test_satisfied_numeric_sends_only_the_query() {
    let (mut modem, mut port) = connected_modem();
    port.enqueue_reply(&reply(&["+CFUN: 1", "OK"]));

    assert!(modem.reconcile(&status::power()));
    assert_eq!(sent_commands(&port), vec!["AT+CFUN?"]);
}

#[test]
fn test_numeric_correction_applied() {
    let (mut modem, mut port) = connected_modem();
    port.script([reply(&["+CMGF: 0", "OK"]), ok()]);

    assert!(modem.reconcile_numeric(&status::sms_text_mode()));
    assert_eq!(sent_commands(&port), vec!["AT+CMGF?", "AT+CMGF=1"]);
}

#[test]
fn test_settle_delay_follows_successful_correction() {
    let (mut modem, mut port) = connected_modem();
    port.script([reply(&["+CFUN: 0", "OK"]), ok()]);
    let check = NumericStatus::new("Power", "AT+CFUN?", "+CFUN:", 1, "AT+CFUN=1")
        .settle_after(Duration::from_millis(60));

    let start = Instant::now();
    assert!(modem.reconcile(&check));
    assert!(start.elapsed() >= Duration::from_millis(60));
}

#[test]
fn test_no_settle_when_correction_fails() {
    let (mut modem, mut port) = connected_modem();
    port.script([reply(&["+CFUN: 0", "OK"]), error()]);
    let check = NumericStatus::new("Power", "AT+CFUN?", "+CFUN:", 1, "AT+CFUN=1")
        .settle_after(Duration::from_secs(5));

    let start = Instant::now();
    assert!(!modem.reconcile(&check));
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[test]
fn test_failed_query_sends_nothing_else() {
    let (mut modem, mut port) = connected_modem();
    port.enqueue_reply(&error());

    assert!(!modem.reconcile(&status::power()));
    assert_eq!(sent_commands(&port), vec!["AT+CFUN?"]);
}

#[test]
fn test_malformed_numeric_reply_sends_nothing_else() {
    let (mut modem, mut port) = connected_modem();
    port.enqueue_reply(&reply(&["+CFUN: ?", "OK"]));

    assert!(!modem.reconcile(&status::power()));
    assert_eq!(sent_commands(&port), vec!["AT+CFUN?"]);
}

#[test]
fn test_pin_ready_never_asks_for_pin() {
    let (mut modem, mut port) = connected_modem();
    port.enqueue_reply(&reply(&["+CPIN: READY", "OK"]));
    let asked = Cell::new(false);

    let check = status::pin(|| {
        asked.set(true);
        Some("1234".to_string())
    });
    assert!(modem.reconcile_text(&check));
    assert!(!asked.get());
    assert_eq!(sent_commands(&port), vec!["AT+CPIN?"]);
}

#[test]
fn test_pin_entered_when_required() {
    let (mut modem, mut port) = connected_modem();
    port.script([reply(&["+CPIN: SIM PIN", "OK"]), ok()]);
    let check = TextStatus::new("PIN", "AT+CPIN?", "+CPIN:", "READY", || {
        Some("AT+CPIN=4321".to_string())
    });

    assert!(modem.reconcile(&check));
    assert_eq!(sent_commands(&port), vec!["AT+CPIN?", "AT+CPIN=4321"]);
}

#[test]
fn test_missing_pin_fails_without_writing() {
    let (mut modem, mut port) = connected_modem();
    port.enqueue_reply(&reply(&["+CPIN: SIM PIN", "OK"]));

    assert!(!modem.reconcile(&status::pin(|| None)));
    assert_eq!(sent_commands(&port), vec!["AT+CPIN?"]);
}

#[test]
fn test_wrong_pin_reported_as_failure() {
    let (mut modem, mut port) = connected_modem();
    port.script([
        reply(&["+CPIN: SIM PIN", "OK"]),
        reply(&["+CME ERROR: 16", "ERROR"]),
    ]);
    let check = TextStatus::new("PIN", "AT+CPIN?", "+CPIN:", "READY", || {
        Some("AT+CPIN=0000".to_string())
    });

    assert!(!modem.reconcile(&check));
}
