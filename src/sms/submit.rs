//! Text-mode SMS submission (`AT+CMGS`).
//!
//! Unlike an ordinary command this is a two-phase exchange: the modem
//! answers the command line with a `>` prompt, then takes the body verbatim
//! until Ctrl+Z and only afterwards reports `+CMGS: <ref>` / `OK` or `ERROR`.

use crate::modem::commands::{self, CTRL_Z, ERROR, LINE_TERMINATOR, OK, SMS_PROMPT, SUBMIT_CONFIRMATION};
use crate::modem::{Modem, TransactionResult};
use crate::port::PortError;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How a submission ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The modem confirmed the message.
    Sent(TransactionResult),
    /// Switching to text mode failed; nothing was submitted.
    TextModeRejected,
    /// No `>` prompt arrived; the body was never written. Carries whatever
    /// the modem did say.
    NoPrompt { captured: String },
    /// The body was written but no confirmation arrived, or the modem
    /// reported an error.
    NotConfirmed(TransactionResult),
}

impl SubmitOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent(_))
    }

    /// Collapse into a plain transaction result.
    pub fn into_result(self) -> TransactionResult {
        match self {
            Self::Sent(result) | Self::NotConfirmed(result) => result,
            Self::TextModeRejected => TransactionResult::failed(),
            Self::NoPrompt { captured } => TransactionResult::new(false, captured),
        }
    }
}

fn is_submit_success(line: &str) -> bool {
    line.contains(OK) || line.contains(SUBMIT_CONFIRMATION)
}

impl Modem {
    /// Send one text message to `recipient`.
    pub fn submit(&mut self, recipient: &str, body: &str) -> SubmitOutcome {
        info!(recipient, "sending SMS");

        if !self.send(commands::SMS_TEXT_MODE).success() {
            warn!("failed to set SMS text mode");
            return SubmitOutcome::TextModeRejected;
        }

        match self.try_submit(recipient, body) {
            Ok(outcome) => {
                match &outcome {
                    SubmitOutcome::Sent(_) => info!(recipient, "SMS sent"),
                    SubmitOutcome::NoPrompt { .. } => warn!("did not receive '>' prompt from module"),
                    other => warn!(?other, "failed to send SMS"),
                }
                outcome
            }
            Err(e) => {
                warn!(error = %e, "transport error while sending SMS");
                SubmitOutcome::NotConfirmed(TransactionResult::failed())
            }
        }
    }

    /// Send several bodies to one recipient, pausing between them.
    /// Returns how many were confirmed.
    pub fn submit_many<S: AsRef<str>>(&mut self, recipient: &str, bodies: &[S]) -> usize {
        let total = bodies.len();
        let mut sent = 0;

        for (i, body) in bodies.iter().enumerate() {
            debug!(message = i + 1, total, "submitting");
            if self.submit(recipient, body.as_ref()).is_sent() {
                sent += 1;
            }
            if i + 1 < total {
                std::thread::sleep(self.timing().message_gap);
            }
        }

        info!(recipient, sent, total, "SMS sending complete");
        sent
    }

    fn try_submit(&mut self, recipient: &str, body: &str) -> Result<SubmitOutcome, PortError> {
        let command = commands::submit_message(recipient);
        let timing = *self.timing();

        let link = self.link_mut();
        link.discard_input()?;
        link.write(format!("{command}{LINE_TERMINATOR}").as_bytes())?;
        debug!(command = %command, "sent");

        if let Err(captured) = self.wait_for_prompt(timing.prompt_timeout)? {
            return Ok(SubmitOutcome::NoPrompt { captured });
        }

        let mut payload = Vec::with_capacity(body.len() + 1);
        payload.extend_from_slice(body.as_bytes());
        payload.push(CTRL_Z);
        self.link_mut().write(&payload)?;
        debug!(bytes = body.len(), "body written");

        let lines = self.capture_verdict(timing.submit_timeout, timing.submit_trailer, timing.poll_interval)?;
        let data = lines.join("\n");
        let result = TransactionResult::new(lines.iter().any(|l| is_submit_success(l)), data);

        Ok(if result.success() {
            SubmitOutcome::Sent(result)
        } else {
            SubmitOutcome::NotConfirmed(result)
        })
    }

    /// Poll raw input until the prompt character shows up. `Err` carries
    /// what arrived instead.
    fn wait_for_prompt(&mut self, timeout: Duration) -> Result<Result<(), String>, PortError> {
        let poll = self.timing().poll_interval;
        let start = Instant::now();
        let mut captured = String::new();

        while start.elapsed() < timeout {
            let chunk = self.link_mut().try_read_available()?;
            if !chunk.is_empty() {
                captured.push_str(&String::from_utf8_lossy(&chunk));
                if captured.contains(SMS_PROMPT) {
                    debug!("prompt received");
                    return Ok(Ok(()));
                }
            }
            std::thread::sleep(poll);
        }

        Ok(Err(captured.trim().to_string()))
    }

    /// Collect lines until a success or failure indicator, allowing a short
    /// trailing window after success for a final confirmation line.
    fn capture_verdict(
        &mut self,
        timeout: Duration,
        trailer: Duration,
        poll: Duration,
    ) -> Result<Vec<String>, PortError> {
        let start = Instant::now();
        let mut lines = Vec::new();

        while start.elapsed() < timeout {
            if let Some(line) = self.link_mut().poll_line()? {
                if line.is_empty() {
                    continue;
                }
                debug!(line = %line, "received");
                let success = is_submit_success(&line);
                let failure = line.contains(ERROR);
                lines.push(line);

                if success {
                    std::thread::sleep(trailer);
                    self.drain_lines(&mut lines)?;
                    break;
                }
                if failure {
                    break;
                }
                continue;
            }
            std::thread::sleep(poll);
        }

        if let Some(rest) = self.link_mut().take_partial() {
            lines.push(rest);
        }
        Ok(lines)
    }

    fn drain_lines(&mut self, lines: &mut Vec<String>) -> Result<(), PortError> {
        while let Some(line) = self.link_mut().poll_line()? {
            if !line.is_empty() {
                debug!(line = %line, "received");
                lines.push(line);
            }
        }
        Ok(())
    }
}
