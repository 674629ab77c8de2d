//! Tests against a real SIM800.
//!
//! # Running Hardware Tests
//!
//! ```bash
//! export SIM800_PORT=/dev/ttyUSB0
//! export SIM800_BAUD=115200          # optional
//! export SIM800_PIN=1234             # only if the SIM is locked
//!
//! cargo test --features hardware-tests -- --ignored
//! ```
//!
//! None of these tests send an SMS or delete stored messages.

use super::utils::{list_port_names, skip_without_hardware};
use sim800_agent::status;

#[test]
#[ignore] // Run with --ignored flag
fn test_configured_port_is_listed() {
    let Some(modem) = skip_without_hardware() else {
        return;
    };
    let name = modem.link().port_name().to_string();
    let ports = list_port_names();
    println!("Available ports: {ports:?}");
    assert!(ports.contains(&name), "{name} not among {ports:?}");
}

#[test]
#[ignore]
fn test_setup_and_identify() {
    let Some(mut modem) = skip_without_hardware() else {
        return;
    };

    assert!(modem.setup_connection().expect("port opens"));
    println!("Connected at {} baud", modem.link().baud_rate());
    assert!(modem.verify_module());
    modem.disconnect();
}

#[test]
#[ignore]
fn test_detect_baud_rate() {
    let Some(mut modem) = skip_without_hardware() else {
        return;
    };

    assert!(modem.detect_baud_rate());
    println!("Detected {} baud", modem.link().baud_rate());
    assert!(modem.send("AT").success());
    modem.disconnect();
}

#[test]
#[ignore]
fn test_reconcile_is_stable() {
    let Some(mut modem) = skip_without_hardware() else {
        return;
    };
    assert!(modem.setup_connection().expect("port opens"));

    // A second pass must find everything already in place.
    assert!(modem.reconcile(&status::power()));
    assert!(modem.reconcile(&status::sms_text_mode()));
    assert!(modem.reconcile(&status::sms_text_mode()));
    modem.disconnect();
}

#[test]
#[ignore]
fn test_list_messages() {
    let Some(mut modem) = skip_without_hardware() else {
        return;
    };
    assert!(modem.setup_connection().expect("port opens"));

    let records = modem.list_messages().expect("listing succeeds");
    for record in &records {
        println!("{} {} {}: {}", record.index, record.status, record.sender, record.decoded_content());
    }
    modem.disconnect();
}
