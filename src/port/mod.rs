//! Link transport: raw serial I/O and the modem link built on it.
//!
//! Provides the `SerialPortAdapter`/`PortOpener` seams, the hardware and
//! mock implementations behind them, and `Link`, which the transaction
//! engine drives.

pub mod error;
pub mod link;
pub mod mock;
pub mod sync_port;
pub mod traits;

pub use error::PortError;
pub use link::Link;
pub use mock::{MockOpener, MockSerialPort};
pub use sync_port::{SyncSerialPort, SystemOpener};
pub use traits::*;
