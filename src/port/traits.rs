//! Core traits for serial port abstraction.
//!
//! `SerialPortAdapter` is the raw byte pipe the modem link drives, and
//! `PortOpener` is the seam that produces one for a given line speed. Baud
//! negotiation reopens the port many times, so the opener (not the adapter)
//! is what the link owns.

use super::error::PortError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Character framing on the wire.
///
/// Read from the `[serial]` config section; every key is optional and the
/// default is 8N1 without flow control, which is what SIM800 modules expect
/// out of the box. Hardware flow control only makes sense once the module
/// has been told to use it (`AT+IFC=2,2`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Framing {
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub flow_control: FlowControl,
}

impl Default for Framing {
    fn default() -> Self {
        Self {
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            flow_control: FlowControl::None,
        }
    }
}

impl std::fmt::Display for Framing {
    /// Conventional short form, e.g. `8N1` or `7E2/hw`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bits = match self.data_bits {
            DataBits::Seven => 7,
            DataBits::Eight => 8,
        };
        let parity = match self.parity {
            Parity::None => 'N',
            Parity::Odd => 'O',
            Parity::Even => 'E',
        };
        let stop = match self.stop_bits {
            StopBits::One => 1,
            StopBits::Two => 2,
        };
        write!(f, "{bits}{parity}{stop}")?;
        match self.flow_control {
            FlowControl::None => Ok(()),
            FlowControl::Software => f.write_str("/sw"),
            FlowControl::Hardware => f.write_str("/hw"),
        }
    }
}

/// Everything needed to open the modem's serial port once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortConfiguration {
    pub baud_rate: u32,
    pub framing: Framing,
    /// Per-call read/write timeout.
    pub timeout: Duration,
}

impl PortConfiguration {
    /// Default framing at the given speed.
    pub fn at_baud(baud_rate: u32, timeout: Duration) -> Self {
        Self {
            baud_rate,
            timeout,
            framing: Framing::default(),
        }
    }

    pub fn with_framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }
}

impl Default for PortConfiguration {
    fn default() -> Self {
        Self::at_baud(115200, Duration::from_secs(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataBits {
    Seven,
    Eight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    None,
    Odd,
    Even,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopBits {
    One,
    Two,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowControl {
    None,
    Software,
    Hardware,
}

impl From<DataBits> for serialport::DataBits {
    fn from(bits: DataBits) -> Self {
        match bits {
            DataBits::Seven => Self::Seven,
            DataBits::Eight => Self::Eight,
        }
    }
}

impl From<Parity> for serialport::Parity {
    fn from(parity: Parity) -> Self {
        match parity {
            Parity::None => Self::None,
            Parity::Odd => Self::Odd,
            Parity::Even => Self::Even,
        }
    }
}

impl From<StopBits> for serialport::StopBits {
    fn from(bits: StopBits) -> Self {
        match bits {
            StopBits::One => Self::One,
            StopBits::Two => Self::Two,
        }
    }
}

impl From<FlowControl> for serialport::FlowControl {
    fn from(flow: FlowControl) -> Self {
        match flow {
            FlowControl::None => Self::None,
            FlowControl::Software => Self::Software,
            FlowControl::Hardware => Self::Hardware,
        }
    }
}

/// Raw byte I/O against an open serial device.
///
/// Implemented by the hardware port and by `MockSerialPort`. No retry or
/// framing logic lives behind this trait.
pub trait SerialPortAdapter: Send + std::fmt::Debug {
    /// Write bytes to the serial port.
    ///
    /// Returns the number of bytes actually written.
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError>;

    /// Read bytes from the serial port into the provided buffer.
    ///
    /// Returns the number of bytes actually read.
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError>;

    /// Get the name/path of this serial port.
    fn name(&self) -> &str;

    /// Set the read/write timeout for this port.
    fn set_timeout(&mut self, timeout: Duration) -> Result<(), PortError>;

    /// Discard unread input and unsent output.
    fn clear_buffers(&mut self) -> Result<(), PortError>;

    /// Bytes waiting in the receive buffer, if the driver can tell.
    fn bytes_to_read(&self) -> Option<usize> {
        None
    }
}

/// Produces a fresh adapter for a port name and configuration.
pub trait PortOpener: Send + std::fmt::Debug {
    fn open(
        &self,
        port_name: &str,
        config: &PortConfiguration,
    ) -> Result<Box<dyn SerialPortAdapter>, PortError>;
}
