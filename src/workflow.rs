//! End-to-end procedures behind the `sim800` subcommands.
//!
//! Each procedure brings the link up with [`Modem::setup_connection`],
//! does its work, and closes the link again whatever the outcome.

use crate::config::{ConfigError, SmsConfig};
use crate::error::{AgentError, AgentResult};
use crate::modem::Modem;
use crate::sms::SmsRecord;
use crate::status;
use tracing::{info, warn};

/// Counts reported by [`send_with_log`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendReport {
    pub primary_sent: usize,
    pub primary_total: usize,
    pub log_sent: usize,
    pub log_total: usize,
}

impl SendReport {
    /// The primary message went out, and so did the log message if one was due.
    pub fn is_success(&self) -> bool {
        self.primary_sent > 0 && (self.log_total == 0 || self.log_sent > 0)
    }
}

/// Body of the delivery report sent to the log recipient.
pub fn log_message(recipient: &str, body: &str, delivered: bool) -> String {
    let status = if delivered { "SUCCESS" } else { "FAILED" };
    format!("[LOG] Message sent to {recipient}\nContent: {body}\nStatus: {status}")
}

fn bring_up(modem: &mut Modem) -> AgentResult<()> {
    if modem.setup_connection()? {
        Ok(())
    } else {
        Err(AgentError::step("module not responding at any baud rate"))
    }
}

/// Run `body` on a connected modem, closing the link afterwards.
fn with_connection<T>(
    modem: &mut Modem,
    body: impl FnOnce(&mut Modem) -> AgentResult<T>,
) -> AgentResult<T> {
    let outcome = bring_up(modem).and_then(|()| body(modem));
    modem.disconnect();
    outcome
}

/// Bring the modem into a state where it can send SMS: identity checked,
/// radio on, SIM unlocked, text mode selected.
pub fn initialize(modem: &mut Modem, pin: Option<String>) -> AgentResult<()> {
    with_connection(modem, |modem| {
        if !modem.verify_module() {
            return Err(AgentError::step("module verification failed"));
        }
        if !modem.reconcile(&status::power()) {
            return Err(AgentError::step("power management failed"));
        }
        if !modem.reconcile(&status::pin(|| pin.clone())) {
            return Err(AgentError::step("PIN management failed"));
        }
        if !modem.reconcile(&status::sms_text_mode()) {
            return Err(AgentError::step("SMS mode setup failed"));
        }
        info!("initialization complete");
        Ok(())
    })
}

/// Send message number `number` to the primary recipient, then a delivery
/// report to the log recipient if one is configured.
pub fn send_with_log(modem: &mut Modem, sms: &SmsConfig, number: u32) -> AgentResult<SendReport> {
    let primary = sms
        .phone_number
        .as_deref()
        .ok_or_else(|| ConfigError::MissingRequired("SMS_PHONE_NUMBER".to_string()))?;
    let body = sms
        .message(number)
        .ok_or_else(|| ConfigError::MissingRequired(format!("MESSAGE_{number}")))?;

    with_connection(modem, |modem| {
        let mut report = SendReport {
            primary_total: 1,
            ..Default::default()
        };

        info!(recipient = primary, "sending to primary recipient");
        report.primary_sent = modem.submit_many(primary, &[body]);

        match sms.log_phone_number.as_deref() {
            Some(log_recipient) => {
                let report_body = log_message(primary, body, report.primary_sent > 0);
                info!(recipient = log_recipient, "sending to log recipient");
                report.log_total = 1;
                report.log_sent = modem.submit_many(log_recipient, &[report_body]);
            }
            None => warn!("no log recipient configured, skipping delivery report"),
        }

        Ok(report)
    })
}

/// List every stored message, deleting each one afterwards if `delete`
/// is set. Deletion failures are logged and do not fail the listing.
pub fn read_messages(modem: &mut Modem, delete: bool) -> AgentResult<Vec<SmsRecord>> {
    with_connection(modem, |modem| {
        let records = modem
            .list_messages()
            .ok_or_else(|| AgentError::step("failed to read SMS messages"))?;

        if delete {
            for record in &records {
                modem.delete_message(&record.index);
            }
        }
        Ok(records)
    })
}
