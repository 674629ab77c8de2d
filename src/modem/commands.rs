//! AT command strings and reply tokens used by the SIM800 driver.

/// Appended to every command line.
pub const LINE_TERMINATOR: &str = "\r\n";

/// Terminal success token.
pub const OK: &str = "OK";

/// Terminal failure token.
pub const ERROR: &str = "ERROR";

/// Ends an SMS body in text mode (Ctrl+Z).
pub const CTRL_Z: u8 = 0x1A;

/// Prompt the modem prints when it is ready for an SMS body.
pub const SMS_PROMPT: char = '>';

/// Header marker of one record in an `AT+CMGL` listing.
pub const LIST_MARKER: &str = "+CMGL:";

/// Confirmation line carrying the message reference after a submit.
pub const SUBMIT_CONFIRMATION: &str = "+CMGS:";

pub const ATTENTION: &str = "AT";
pub const ECHO_OFF: &str = "ATE0";
pub const IDENTIFY: &str = "ATI";

pub const POWER_QUERY: &str = "AT+CFUN?";
pub const POWER_PREFIX: &str = "+CFUN:";
pub const POWER_FULL: &str = "AT+CFUN=1";

pub const PIN_QUERY: &str = "AT+CPIN?";
pub const PIN_PREFIX: &str = "+CPIN:";
pub const PIN_READY: &str = "READY";

pub const SMS_FORMAT_QUERY: &str = "AT+CMGF?";
pub const SMS_FORMAT_PREFIX: &str = "+CMGF:";
pub const SMS_TEXT_MODE: &str = "AT+CMGF=1";

pub const LIST_ALL_MESSAGES: &str = "AT+CMGL=\"ALL\"";

/// `AT+CPIN=<pin>`
pub fn enter_pin(pin: &str) -> String {
    format!("AT+CPIN={pin}")
}

/// `AT+CMGS="<recipient>"`
pub fn submit_message(recipient: &str) -> String {
    format!("AT+CMGS=\"{recipient}\"")
}

/// `AT+CMGD=<index>`
pub fn delete_message(index: &str) -> String {
    format!("AT+CMGD={index}")
}
