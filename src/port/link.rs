//! The modem link: one serial port identity plus whatever handle is
//! currently open on it.
//!
//! The link owns a `PortOpener` rather than a fixed adapter so the baud
//! negotiator can close and reopen it at another speed. Reads are
//! non-blocking polls; line assembly happens here so the transaction
//! engine only ever sees whole, trimmed lines.

use super::error::PortError;
use super::sync_port::SystemOpener;
use super::traits::{PortConfiguration, PortOpener, SerialPortAdapter};
use std::time::Duration;
use tracing::debug;

/// Read size used when the driver cannot report how many bytes are waiting.
const FALLBACK_READ_SIZE: usize = 256;

/// Serial link to a modem.
///
/// Closed on drop.
#[derive(Debug)]
pub struct Link {
    port_name: String,
    config: PortConfiguration,
    opener: Box<dyn PortOpener>,
    port: Option<Box<dyn SerialPortAdapter>>,
    /// Received bytes not yet consumed as a line.
    pending: Vec<u8>,
}

impl Link {
    /// A closed link that will open through `opener`.
    pub fn new(
        port_name: impl Into<String>,
        config: PortConfiguration,
        opener: impl PortOpener + 'static,
    ) -> Self {
        Self {
            port_name: port_name.into(),
            config,
            opener: Box::new(opener),
            port: None,
            pending: Vec::new(),
        }
    }

    /// A closed link to a hardware device node.
    pub fn system(port_name: impl Into<String>, config: PortConfiguration) -> Self {
        Self::new(port_name, config, SystemOpener)
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn baud_rate(&self) -> u32 {
        self.config.baud_rate
    }

    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    pub fn configuration(&self) -> &PortConfiguration {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.port.is_some()
    }

    /// Open with the current configuration, replacing any open handle.
    pub fn open(&mut self) -> Result<(), PortError> {
        self.close();
        let port = self.opener.open(&self.port_name, &self.config)?;
        debug!(
            port = %self.port_name,
            baud = self.config.baud_rate,
            framing = %self.config.framing,
            "serial link opened"
        );
        self.port = Some(port);
        Ok(())
    }

    /// Close and reopen at a different speed and timeout.
    ///
    /// The new values are kept even if opening fails.
    pub fn reopen(&mut self, baud_rate: u32, timeout: Duration) -> Result<(), PortError> {
        self.config.baud_rate = baud_rate;
        self.config.timeout = timeout;
        self.open()
    }

    /// Close the link. Does nothing if it is already closed.
    pub fn close(&mut self) {
        if self.port.take().is_some() {
            debug!(port = %self.port_name, "serial link closed");
        }
        self.pending.clear();
    }

    /// Change the per-call timeout, applying it to the open handle if any.
    pub fn set_timeout(&mut self, timeout: Duration) -> Result<(), PortError> {
        self.config.timeout = timeout;
        if let Some(port) = self.port.as_mut() {
            port.set_timeout(timeout)?;
        }
        Ok(())
    }

    /// Drop everything received so far, buffered here or in the driver.
    pub fn discard_input(&mut self) -> Result<(), PortError> {
        self.pending.clear();
        self.port_mut()?.clear_buffers()
    }

    /// Write all of `data`.
    pub fn write(&mut self, data: &[u8]) -> Result<(), PortError> {
        let port = self.port_mut()?;
        let mut remaining = data;
        while !remaining.is_empty() {
            let written = port.write_bytes(remaining)?;
            if written == 0 {
                return Err(PortError::Io(std::io::ErrorKind::WriteZero.into()));
            }
            remaining = &remaining[written..];
        }
        Ok(())
    }

    /// Whatever has arrived since the last read, possibly nothing.
    ///
    /// Bypasses line assembly; bytes returned here are not seen by
    /// `poll_line`.
    pub fn try_read_available(&mut self) -> Result<Vec<u8>, PortError> {
        let port = self.port_mut()?;
        let size = match port.bytes_to_read() {
            Some(0) => return Ok(Vec::new()),
            Some(n) => n,
            None => FALLBACK_READ_SIZE,
        };

        let mut buffer = vec![0u8; size];
        match port.read_bytes(&mut buffer) {
            Ok(n) => {
                buffer.truncate(n);
                Ok(buffer)
            }
            Err(e) if e.is_idle() => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// The next complete line, trimmed, if one has arrived.
    ///
    /// A blank line comes back as `Some("")`, so callers can tell that
    /// input arrived even when it carried no text.
    pub fn poll_line(&mut self) -> Result<Option<String>, PortError> {
        if memchr::memchr(b'\n', &self.pending).is_none() {
            let fresh = self.try_read_available()?;
            self.pending.extend_from_slice(&fresh);
        }

        match memchr::memchr(b'\n', &self.pending) {
            Some(end) => {
                let raw: Vec<u8> = self.pending.drain(..=end).collect();
                Ok(Some(String::from_utf8_lossy(&raw).trim().to_string()))
            }
            None => Ok(None),
        }
    }

    /// Trailing text received without a line terminator, left in place.
    pub fn partial(&self) -> Option<String> {
        let text = String::from_utf8_lossy(&self.pending);
        let text = text.trim();
        (!text.is_empty() && memchr::memchr(b'\n', &self.pending).is_none()).then(|| text.to_string())
    }

    /// Take any trailing text that never received a line terminator.
    pub fn take_partial(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let raw = std::mem::take(&mut self.pending);
        let text = String::from_utf8_lossy(&raw).trim().to_string();
        (!text.is_empty()).then_some(text)
    }

    fn port_mut(&mut self) -> Result<&mut Box<dyn SerialPortAdapter>, PortError> {
        self.port.as_mut().ok_or(PortError::NotOpen)
    }
}

impl Drop for Link {
    fn drop(&mut self) {
        self.close();
    }
}
