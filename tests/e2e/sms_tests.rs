//! Listing, deleting and submitting messages over a scripted port.

use crate::common::{connected_modem, error, ok, reply, sent_commands};
use pretty_assertions::assert_eq;
use sim800_agent::sms::SubmitOutcome;

const LISTING: &[&str] = &[
    "+CMGL: 1,\"REC READ\",\"+15550001\",\"24/03/01,08:15:00+04\"",
    "Door open",
    "+CMGL: 2,\"REC UNREAD\",\"+15550002\",\"24/03/01,09:00:12+04\"",
    "0041006C00610072006D",
    "OK",
];

#[test]
fn test_list_messages() {
    let (mut modem, mut port) = connected_modem();
    port.script([ok(), reply(LISTING)]);

    let records = modem.list_messages().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].index, "1");
    assert_eq!(records[0].sender, "+15550001");
    assert_eq!(records[0].content, "Door open");
    assert_eq!(records[1].status, "REC UNREAD");
    assert_eq!(records[1].decoded_content(), "Alarm");
    assert_eq!(sent_commands(&port), vec!["AT+CMGF=1", "AT+CMGL=\"ALL\""]);
}

#[test]
fn test_body_matching_a_result_code_keeps_next_record() {
    let (mut modem, mut port) = connected_modem();
    port.script([
        ok(),
        reply(&[
            "+CMGL: 0,\"REC READ\",\"+15550001\",\"24/03/01,08:15:00+04\"",
            "OK",
            "+CMGL: 1,\"REC READ\",\"+15550002\",\"24/03/01,08:16:00+04\"",
            "Door open",
            "OK",
        ]),
    ]);

    let records = modem.list_messages().unwrap();
    assert_eq!(records.len(), 2);
    // The filtered body is lost, the following record is not.
    assert_eq!(records[0].content, "");
    assert_eq!(records[1].index, "1");
    assert_eq!(records[1].content, "Door open");
}

#[test]
fn test_empty_store_lists_nothing() {
    let (mut modem, mut port) = connected_modem();
    port.script([ok(), ok()]);

    assert_eq!(modem.list_messages(), Some(Vec::new()));
}

#[test]
fn test_list_fails_when_text_mode_rejected() {
    let (mut modem, mut port) = connected_modem();
    port.enqueue_reply(&error());

    assert_eq!(modem.list_messages(), None);
    assert_eq!(sent_commands(&port), vec!["AT+CMGF=1"]);
}

#[test]
fn test_list_fails_on_error() {
    let (mut modem, mut port) = connected_modem();
    port.script([ok(), error()]);

    assert_eq!(modem.list_messages(), None);
}

#[test]
fn test_delete_message() {
    let (mut modem, mut port) = connected_modem();
    port.script([ok(), error()]);

    assert!(modem.delete_message("3"));
    assert!(!modem.delete_message("99"));
    assert_eq!(sent_commands(&port), vec!["AT+CMGD=3", "AT+CMGD=99"]);
}

#[test]
fn test_submit_success() {
    let (mut modem, mut port) = connected_modem();
    port.script([ok(), b"\r\n> ".to_vec(), reply(&["+CMGS: 42", "OK"])]);

    let outcome = modem.submit("+15550001", "Power restored");
    match outcome {
        SubmitOutcome::Sent(result) => {
            assert!(result.data().contains("+CMGS: 42"));
        }
        other => panic!("expected Sent, got {other:?}"),
    }

    let written = port.get_write_log();
    assert_eq!(written.len(), 3);
    assert_eq!(written[1], b"AT+CMGS=\"+15550001\"\r\n".to_vec());
    assert_eq!(written[2], b"Power restored\x1a".to_vec());
}

#[test]
fn test_submit_without_prompt_never_writes_body() {
    let (mut modem, mut port) = connected_modem();
    port.script([ok(), reply(&["ERROR"])]);

    let outcome = modem.submit("+15550001", "secret");
    assert!(matches!(outcome, SubmitOutcome::NoPrompt { ref captured } if captured == "ERROR"));
    assert_eq!(port.get_write_log().len(), 2);
    assert!(port.written_text().iter().all(|w| !w.contains("secret")));
}

#[test]
fn test_submit_reports_network_error() {
    let (mut modem, mut port) = connected_modem();
    port.script([ok(), b"> ".to_vec(), reply(&["+CMS ERROR: 500"])]);

    let outcome = modem.submit("+15550001", "hello");
    match outcome {
        SubmitOutcome::NotConfirmed(result) => {
            assert!(!result.success());
            assert_eq!(result.data(), "+CMS ERROR: 500");
        }
        other => panic!("expected NotConfirmed, got {other:?}"),
    }
}

#[test]
fn test_submit_text_mode_rejected() {
    let (mut modem, mut port) = connected_modem();
    port.enqueue_reply(&error());

    assert_eq!(modem.submit("+15550001", "hello"), SubmitOutcome::TextModeRejected);
    assert_eq!(sent_commands(&port), vec!["AT+CMGF=1"]);
}

#[test]
fn test_submit_many_counts_confirmed() {
    let (mut modem, mut port) = connected_modem();
    port.script([
        ok(),
        b"> ".to_vec(),
        reply(&["+CMGS: 1", "OK"]),
        ok(),
        b"> ".to_vec(),
        reply(&["+CMS ERROR: 38"]),
    ]);

    assert_eq!(modem.submit_many("+15550001", &["one", "two"]), 1);
}
