//! shdlc-device: Device layer, command catalogue, and firmware update for
//! the SHDLC master driver.
//!
//! [`Device`] wraps the common SHDLC command set in typed methods against
//! one slave address; the [`commands`] module exposes the underlying
//! command types for direct use; [`firmware`] carries the bootloader-based
//! firmware update orchestration.
//!
//! Applications usually depend on the `shdlc` facade crate instead.

pub mod commands;
pub mod device;
pub mod firmware;

pub use device::Device;
pub use firmware::{FirmwareImage, FirmwareUpdate};
