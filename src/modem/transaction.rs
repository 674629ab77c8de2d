//! One AT command in, one classified reply out.

use super::commands::{ATTENTION, ERROR, LINE_TERMINATOR, OK};
use super::Modem;
use crate::port::PortError;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Outcome of a single command exchange.
///
/// `success` and `data` are both derived from the same captured lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionResult {
    success: bool,
    data: String,
}

impl TransactionResult {
    pub(crate) fn new(success: bool, data: impl Into<String>) -> Self {
        Self {
            success,
            data: data.into(),
        }
    }

    /// A failed exchange with nothing captured.
    pub fn failed() -> Self {
        Self::new(false, String::new())
    }

    /// Classify captured reply lines for `command`.
    ///
    /// Success means `OK` appeared somewhere in the capture. The returned
    /// data drops the command echo and bare terminal tokens.
    pub fn from_lines<S: AsRef<str>>(command: &str, lines: &[S]) -> Self {
        let success = lines.iter().any(|line| line.as_ref().contains(OK));
        let echo = command.trim();
        let data = lines
            .iter()
            .map(|line| line.as_ref())
            .filter(|line| !is_noise(line, echo))
            .collect::<Vec<_>>()
            .join("\n");
        Self { success, data }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    /// Failed with nothing captured: the modem did not answer at all.
    pub fn is_silent(&self) -> bool {
        !self.success && self.data.is_empty()
    }
}

fn is_noise(line: &str, echo: &str) -> bool {
    line == ATTENTION || line == OK || line == ERROR || line == echo
}

/// A line carrying either terminal token ends the reply.
pub(crate) fn is_terminal(line: &str) -> bool {
    line.contains(OK) || line.contains(ERROR)
}

impl Modem {
    /// Send `command` using the default command timeout.
    pub fn send(&mut self, command: &str) -> TransactionResult {
        let timeout = self.timing.command_timeout;
        self.send_with_timeout(command, timeout)
    }

    /// Send `command` and capture its reply for at most `timeout`.
    ///
    /// Never fails: a closed link, a transport error, silence, or an `ERROR`
    /// reply all come back as an unsuccessful result.
    pub fn send_with_timeout(&mut self, command: &str, timeout: Duration) -> TransactionResult {
        if !self.link.is_open() {
            warn!(command, "serial link not open");
            return TransactionResult::failed();
        }

        match self.transact(command, timeout) {
            Ok(result) => result,
            Err(e) => {
                warn!(command, error = %e, "transport error during command");
                TransactionResult::failed()
            }
        }
    }

    fn transact(&mut self, command: &str, timeout: Duration) -> Result<TransactionResult, PortError> {
        self.link.discard_input()?;
        self.link
            .write(format!("{command}{LINE_TERMINATOR}").as_bytes())?;
        debug!(command, "sent");

        let lines = self.capture_reply(timeout)?;
        let result = TransactionResult::from_lines(command, &lines);
        if lines.is_empty() {
            debug!(command, ?timeout, "no reply");
        }
        Ok(result)
    }

    /// Accumulate non-empty reply lines until a terminal token has been
    /// followed by the quiescence window, or until `timeout` elapses.
    ///
    /// A terminal token still waiting for its line terminator counts once
    /// the window has passed with no further input.
    fn capture_reply(&mut self, timeout: Duration) -> Result<Vec<String>, PortError> {
        let timing = self.timing;
        let start = Instant::now();
        let mut last_data = start;
        let mut lines = Vec::new();
        let mut terminal_seen = false;
        let mut received_any = false;
        let mut tail: Option<String> = None;

        while start.elapsed() < timeout {
            if let Some(line) = self.link.poll_line()? {
                received_any = true;
                if !line.is_empty() {
                    debug!(line = %line, "received");
                    terminal_seen |= is_terminal(&line);
                    lines.push(line);
                    last_data = Instant::now();
                }
                continue;
            }

            let current = self.link.partial();
            if current != tail {
                received_any |= current.is_some();
                last_data = Instant::now();
                tail = current;
            }

            let tail_terminal = tail.as_deref().is_some_and(is_terminal);
            if (terminal_seen || tail_terminal) && last_data.elapsed() >= timing.quiescence {
                break;
            }

            std::thread::sleep(timing.poll_delay(received_any, start.elapsed()));
        }

        if let Some(rest) = self.link.take_partial() {
            debug!(line = %rest, "received unterminated");
            lines.push(rest);
        }

        Ok(lines)
    }
}
