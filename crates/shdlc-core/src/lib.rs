//! shdlc-core: Frame codec, traits, and error definitions for the SHDLC
//! master driver.
//!
//! This crate defines the transport-agnostic building blocks that the
//! concrete port realizations and the device layer are built on.
//! Applications usually depend on the `shdlc` facade crate instead.
//!
//! # Key types
//!
//! - [`frame`] -- MOSI frame encoding and incremental MISO frame decoding
//! - [`Port`] -- byte-channel abstraction with a re-entrant bus lock
//! - [`Connection`] -- command execution and response validation on a bus
//! - [`Command`] -- the request/response contract concrete commands implement
//! - [`Error`] / [`Result`] -- error handling

pub mod command;
pub mod connection;
pub mod error;
pub mod frame;
pub mod port;
pub mod types;

// Re-export key types at crate root for ergonomic `use shdlc_core::*`.
pub use command::{Command, RawCommand};
pub use connection::Connection;
pub use error::{DeviceError, Error, Result};
pub use frame::{MisoFrame, MisoFrameDecoder};
pub use port::{Port, PortGuard, PortLock};
pub use types::{FirmwareVersion, HardwareVersion, ProtocolVersion, Version};
