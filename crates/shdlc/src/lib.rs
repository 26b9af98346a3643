//! # shdlc -- SHDLC Master Driver
//!
//! `shdlc` is a synchronous Rust driver for the master side of SHDLC, a
//! byte-oriented, HDLC-inspired framing protocol used to address and
//! command slave devices over a shared serial (or TCP-tunneled-serial)
//! link.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use shdlc::{Connection, Device, SerialPort};
//!
//! fn main() -> shdlc::Result<()> {
//!     let port = Arc::new(SerialPort::open("/dev/ttyUSB0", 115_200)?);
//!     let connection = Connection::new(port);
//!     let mut device = Device::new(&connection, 0);
//!
//!     println!("Serial number: {}", device.get_serial_number()?);
//!     println!("Version: {}", device.get_version()?);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized as a workspace of focused crates:
//!
//! | Crate                 | Purpose                                         |
//! |-----------------------|-------------------------------------------------|
//! | `shdlc-core`          | Frame codec, [`Port`]/[`Command`] traits, [`Connection`], errors |
//! | `shdlc-transport`     | [`SerialPort`] and [`TcpPort`] realizations     |
//! | `shdlc-device`        | [`Device`] layer, command catalogue, firmware update |
//! | `shdlc-test-harness`  | Mock port for hardware-free testing             |
//! | **`shdlc`**           | This facade crate -- re-exports everything      |
//!
//! All port realizations implement the [`Port`] trait, so protocol code
//! works with `Arc<dyn Port>` and stays transport-agnostic.
//!
//! ## Feature Flags
//!
//! | Feature  | Enables                              | Default |
//! |----------|--------------------------------------|---------|
//! | `serial` | [`SerialPort`] (serialport crate)    | yes     |
//! | `tcp`    | [`TcpPort`] (std TCP)                | yes     |
//!
//! ## Concurrency model
//!
//! All calls are synchronous and blocking; the port's re-entrant bus lock
//! is the only synchronization primitive. Hold the guard returned by
//! [`Port::lock`] to keep the bus for a multi-step sequence -- the
//! firmware updater does exactly that.

pub use shdlc_core::*;

pub use shdlc_device::device::Device;
pub use shdlc_device::firmware::{FirmwareImage, FirmwareUpdate};

#[cfg(feature = "serial")]
pub use shdlc_transport::SerialPort;
#[cfg(feature = "tcp")]
pub use shdlc_transport::TcpPort;

/// The SHDLC common command catalogue.
///
/// The [`Device`] layer wraps these in methods; use them directly for
/// unusual call patterns (broadcasts, raw [`Connection`] access).
pub mod commands {
    pub use shdlc_device::commands::*;
}

/// Firmware image handling and update orchestration.
pub mod firmware {
    pub use shdlc_device::firmware::*;
}

/// Port realizations for serial and TCP-tunneled links.
pub mod transport {
    #[cfg(feature = "serial")]
    pub use shdlc_transport::serial::SerialPort;
    #[cfg(feature = "tcp")]
    pub use shdlc_transport::tcp::TcpPort;
}
