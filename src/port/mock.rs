//! Scripted serial port for exercising the modem engine without hardware.
//!
//! A real modem answers *after* it receives a command, and the engine
//! discards stale input before every write. `MockSerialPort` therefore keeps
//! a queue of scripted replies: each write pops the next reply and makes it
//! readable. Bytes queued with `enqueue_read` are readable immediately and
//! model unsolicited noise.

use super::error::PortError;
use super::traits::{PortConfiguration, PortOpener, SerialPortAdapter};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Default)]
struct MockPortState {
    /// Bytes currently readable.
    read_queue: VecDeque<u8>,
    /// Replies released one per write.
    replies: VecDeque<Vec<u8>>,
    /// Log of all bytes written to the port.
    write_log: Vec<Vec<u8>>,
    /// When set, writes never release a reply.
    silent: bool,
    /// Whether the next read should fail with a timeout.
    should_timeout: bool,
    timeout: Duration,
    clear_count: usize,
}

/// Mock serial port with per-write scripted replies.
///
/// Clones share state, so a test can keep one handle for inspection while
/// the engine owns another.
///
/// # Example
/// ```
/// use sim800_agent::port::{MockSerialPort, SerialPortAdapter};
///
/// let mut port = MockSerialPort::new("MOCK0");
/// port.enqueue_reply(b"\r\nOK\r\n");
///
/// port.write_bytes(b"AT\r\n").unwrap();
/// let mut buffer = [0u8; 16];
/// let n = port.read_bytes(&mut buffer).unwrap();
/// assert_eq!(&buffer[..n], b"\r\nOK\r\n");
/// assert_eq!(port.written_text(), vec!["AT\r\n".to_string()]);
/// ```
#[derive(Clone)]
pub struct MockSerialPort {
    name: String,
    state: Arc<Mutex<MockPortState>>,
}

impl MockSerialPort {
    /// Create a new mock serial port with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(MockPortState {
                timeout: Duration::from_secs(1),
                ..Default::default()
            })),
        }
    }

    /// A port that swallows every command, like a modem at the wrong baud.
    pub fn silent(name: impl Into<String>) -> Self {
        let port = Self::new(name);
        port.state.lock().unwrap().silent = true;
        port
    }

    /// Make bytes readable right away, independent of any write.
    pub fn enqueue_read(&mut self, data: &[u8]) {
        let mut state = self.state.lock().unwrap();
        state.read_queue.extend(data);
    }

    /// Queue a reply released by the next write that has not yet been
    /// answered.
    pub fn enqueue_reply(&mut self, reply: &[u8]) {
        let mut state = self.state.lock().unwrap();
        state.replies.push_back(reply.to_vec());
    }

    /// Queue one reply per write, in order.
    pub fn script<I, B>(&mut self, replies: I)
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        for reply in replies {
            self.enqueue_reply(reply.as_ref());
        }
    }

    /// Get a copy of all data written to the port.
    pub fn get_write_log(&self) -> Vec<Vec<u8>> {
        let state = self.state.lock().unwrap();
        state.write_log.clone()
    }

    /// The write log decoded as text, one entry per write.
    pub fn written_text(&self) -> Vec<String> {
        self.get_write_log()
            .iter()
            .map(|w| String::from_utf8_lossy(w).into_owned())
            .collect()
    }

    /// Make the next read that finds data waiting fail with a timeout
    /// instead, as a driver may under load.
    pub fn set_should_timeout(&mut self, should_timeout: bool) {
        let mut state = self.state.lock().unwrap();
        state.should_timeout = should_timeout;
    }

    /// How many times the input buffer was discarded.
    pub fn clear_count(&self) -> usize {
        self.state.lock().unwrap().clear_count
    }

    /// Scripted replies not yet released.
    pub fn pending_replies(&self) -> usize {
        self.state.lock().unwrap().replies.len()
    }

    /// Get the number of bytes available to read.
    pub fn available_bytes(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.read_queue.len()
    }

    /// The timeout last applied through `set_timeout`.
    pub fn current_timeout(&self) -> Duration {
        self.state.lock().unwrap().timeout
    }
}

impl SerialPortAdapter for MockSerialPort {
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
        let mut state = self.state.lock().unwrap();
        state.write_log.push(data.to_vec());

        if !state.silent {
            if let Some(reply) = state.replies.pop_front() {
                state.read_queue.extend(reply);
            }
        }

        Ok(data.len())
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        let mut state = self.state.lock().unwrap();

        if state.should_timeout {
            state.should_timeout = false;
            return Err(PortError::timeout(state.timeout));
        }

        let mut bytes_read = 0;
        for byte in buffer.iter_mut() {
            match state.read_queue.pop_front() {
                Some(queued) => {
                    *byte = queued;
                    bytes_read += 1;
                }
                None => break,
            }
        }

        if bytes_read == 0 {
            Err(PortError::Io(std::io::Error::new(
                std::io::ErrorKind::WouldBlock,
                "No data available",
            )))
        } else {
            Ok(bytes_read)
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_timeout(&mut self, timeout: Duration) -> Result<(), PortError> {
        let mut state = self.state.lock().unwrap();
        state.timeout = timeout;
        Ok(())
    }

    fn clear_buffers(&mut self) -> Result<(), PortError> {
        let mut state = self.state.lock().unwrap();
        state.read_queue.clear();
        state.clear_count += 1;
        Ok(())
    }

    fn bytes_to_read(&self) -> Option<usize> {
        let state = self.state.lock().unwrap();
        Some(state.read_queue.len())
    }
}

impl std::fmt::Debug for MockSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSerialPort")
            .field("name", &self.name)
            .field("available_bytes", &self.available_bytes())
            .finish()
    }
}

/// Hands out a shared `MockSerialPort`, optionally only at one line speed.
///
/// Opening at any other speed yields a silent port, and speeds listed with
/// `failing_at` fail to open at all. Every attempted speed is recorded.
#[derive(Debug, Clone)]
pub struct MockOpener {
    port: MockSerialPort,
    live_baud: Option<u32>,
    failing_bauds: Vec<u32>,
    attempts: Arc<Mutex<Vec<u32>>>,
}

impl MockOpener {
    /// An opener whose port answers at every speed.
    pub fn new(port: MockSerialPort) -> Self {
        Self {
            port,
            live_baud: None,
            failing_bauds: Vec::new(),
            attempts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Only answer when opened at `baud`.
    pub fn live_at(mut self, baud: u32) -> Self {
        self.live_baud = Some(baud);
        self
    }

    /// Refuse to open at `baud`.
    pub fn failing_at(mut self, baud: u32) -> Self {
        self.failing_bauds.push(baud);
        self
    }

    /// Baud rates passed to `open`, in call order.
    pub fn attempts(&self) -> Vec<u32> {
        self.attempts.lock().unwrap().clone()
    }
}

impl PortOpener for MockOpener {
    fn open(
        &self,
        port_name: &str,
        config: &PortConfiguration,
    ) -> Result<Box<dyn SerialPortAdapter>, PortError> {
        self.attempts.lock().unwrap().push(config.baud_rate);

        if self.failing_bauds.contains(&config.baud_rate) {
            return Err(PortError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                format!("{port_name} refused {} baud", config.baud_rate),
            )));
        }

        let mut port = match self.live_baud {
            Some(live) if live != config.baud_rate => MockSerialPort::silent(port_name),
            _ => self.port.clone(),
        };
        port.set_timeout(config.timeout)?;
        Ok(Box::new(port))
    }
}
