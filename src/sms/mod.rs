//! SMS operations on top of the transaction engine.
//!
//! - `parser`: decoding `AT+CMGL` listings into [`SmsRecord`]s
//! - `submit`: the prompt-gated `AT+CMGS` exchange

pub mod parser;
pub mod submit;

pub use parser::{decode_content, parse_list, split_header, SmsRecord};
pub use submit::SubmitOutcome;

use crate::modem::{commands, Modem};
use std::time::Duration;
use tracing::{info, warn};

/// Listing every stored message can take a while on a full SIM.
const LIST_TIMEOUT: Duration = Duration::from_secs(5);

impl Modem {
    /// List every stored message.
    ///
    /// `None` if text mode or the listing command failed; an empty vector
    /// if the SIM holds no messages.
    pub fn list_messages(&mut self) -> Option<Vec<SmsRecord>> {
        if !self.send(commands::SMS_TEXT_MODE).success() {
            warn!("failed to set SMS text mode");
            return None;
        }

        let result = self.send_with_timeout(commands::LIST_ALL_MESSAGES, LIST_TIMEOUT);
        if !result.success() {
            warn!("failed to read SMS messages");
            return None;
        }

        let records = parse_list(result.data());
        info!(count = records.len(), "listed SMS messages");
        Some(records)
    }

    /// Delete the message stored at `index`.
    pub fn delete_message(&mut self, index: &str) -> bool {
        let deleted = self.send(&commands::delete_message(index)).success();
        if deleted {
            info!(index, "SMS deleted");
        } else {
            warn!(index, "failed to delete SMS");
        }
        deleted
    }
}
