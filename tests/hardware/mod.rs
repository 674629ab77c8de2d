//! Hardware-specific tests requiring a real modem.
//!
//! These tests are ignored by default and require actual hardware to run.
//! They should be run manually with the `--ignored` flag and `SIM800_PORT`
//! set.

pub mod modem_tests;
pub mod utils;
