//! Error types for the SHDLC driver.
//!
//! All fallible operations across the library return [`Result<T>`], which
//! uses [`Error`] as the error type. Transport-layer failures, response
//! validation errors, and errors reported by the slave device itself are
//! all captured here.

use std::borrow::Cow;
use std::fmt;

/// An error reported by the slave device in the status byte of a response.
///
/// The device executed the exchange at the frame level but refused or failed
/// to execute the command; the low 7 bits of the status byte carry the error
/// code. A fixed set of codes is defined by the SHDLC protocol itself
/// ([`DeviceError::standard_errors`]); device types may define additional
/// codes, which the device layer resolves through its registrable error
/// table. Unknown codes are preserved as-is with a generic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceError {
    code: u8,
    message: Cow<'static, str>,
}

impl DeviceError {
    /// Create a device error with a specific code and message.
    ///
    /// Use this to define device-specific error codes for registration via
    /// `Device::register_device_errors`.
    pub fn new(code: u8, message: impl Into<Cow<'static, str>>) -> Self {
        DeviceError {
            code,
            message: message.into(),
        }
    }

    /// Create a generic device error for a code with no registered meaning.
    pub fn with_code(code: u8) -> Self {
        DeviceError {
            code,
            message: Cow::Borrowed("device-specific error"),
        }
    }

    /// Error 0x01: wrong data size of command or response.
    pub fn command_data_size() -> Self {
        Self::new(0x01, "wrong data size of command or response")
    }

    /// Error 0x02: unknown command.
    pub fn unknown_command() -> Self {
        Self::new(0x02, "unknown command")
    }

    /// Error 0x03: no access right for command.
    pub fn access_right() -> Self {
        Self::new(0x03, "no access right for command")
    }

    /// Error 0x04: illegal command parameter or parameter out of allowed range.
    pub fn command_parameter() -> Self {
        Self::new(0x04, "illegal command parameter or parameter out of allowed range")
    }

    /// Error 0x05: wrong checksum.
    pub fn checksum() -> Self {
        Self::new(0x05, "wrong checksum")
    }

    /// Error 0x06: firmware update failed.
    pub fn firmware_update_failure() -> Self {
        Self::new(0x06, "firmware update failed")
    }

    /// The error codes common to all SHDLC devices.
    pub fn standard_errors() -> [DeviceError; 6] {
        [
            Self::command_data_size(),
            Self::unknown_command(),
            Self::access_right(),
            Self::command_parameter(),
            Self::checksum(),
            Self::firmware_update_failure(),
        ]
    }

    /// The numeric error code as reported in the status byte (1..=127).
    pub fn code(&self) -> u8 {
        self.code
    }

    /// Human-readable description of the error.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}: {}", self.code, self.message)
    }
}

/// The error type for all SHDLC driver operations.
///
/// Variants cover the full range of failure modes encountered when talking
/// to SHDLC slaves: timeouts, malformed responses, errors reported by the
/// device, unsupported port capabilities, and plain I/O failures.
///
/// None of these are retried internally; every error propagates to the
/// caller of the operation that triggered it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No response (or an incomplete frame) was received within the
    /// computed deadline.
    ///
    /// This typically indicates the device is powered off, the bitrate is
    /// wrong, or the slave address does not match any device on the bus.
    #[error("timeout while waiting for response from SHDLC device")]
    Timeout,

    /// The received response contains invalid data.
    ///
    /// Covers malformed, oversize, or undersize frames, length-field and
    /// checksum mismatches, address/command-id mismatches, and response
    /// payloads outside a command's declared length bounds. The raw
    /// offending bytes are attached for diagnostics where available.
    #[error("invalid response from SHDLC device: {reason}")]
    Response {
        /// What exactly was wrong with the response.
        reason: String,
        /// The received raw data, empty if not applicable.
        raw: Vec<u8>,
    },

    /// The device received the command but reported a failure executing it.
    #[error("SHDLC device error {0}")]
    Device(DeviceError),

    /// The requested operation is not supported by this port realization
    /// (e.g. bitrate control on a TCP-tunneled port).
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// An invalid parameter was passed to a driver operation.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The port is not open.
    #[error("port is not open")]
    NotOpen,

    /// A transport-level error (serial port, TCP socket).
    #[error("transport error: {0}")]
    Transport(String),

    /// The firmware image signature word does not match.
    #[error("invalid firmware image signature 0x{actual:08X}")]
    FirmwareImageSignature {
        /// The signature word found in the image.
        actual: u32,
    },

    /// The firmware image is built for a different product type than the
    /// connected device reports.
    #[error(
        "firmware image is for product type 0x{expected:08X}, \
         but the device reports 0x{actual:08X}"
    )]
    FirmwareImageIncompatibility {
        /// Product type the image was built for.
        expected: u32,
        /// Product type reported by the device.
        actual: u32,
    },

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a [`Error::Response`] without raw data attached.
    pub fn response(reason: impl Into<String>) -> Self {
        Error::Response {
            reason: reason.into(),
            raw: Vec::new(),
        }
    }

    /// Shorthand for a [`Error::Response`] with the offending raw bytes.
    pub fn response_with_raw(reason: impl Into<String>, raw: impl Into<Vec<u8>>) -> Self {
        Error::Response {
            reason: reason.into(),
            raw: raw.into(),
        }
    }
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;
