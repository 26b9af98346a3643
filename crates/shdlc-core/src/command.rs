//! The SHDLC command abstraction.
//!
//! A [`Command`] is an immutable value describing one request to a slave:
//! the command id, the encoded payload, the timing bounds the device
//! guarantees, and how to validate and interpret the response payload.
//! Commands own no port or connection reference; the
//! [`Connection`](crate::connection::Connection) maps them onto raw
//! transceptions.
//!
//! Concrete commands (baudrate, slave address, device info, ...) live in
//! the device crate; [`RawCommand`] covers ad-hoc or device-specific
//! commands that have no dedicated type.

use std::time::Duration;

use crate::error::{Error, Result};
use crate::frame::MAX_PAYLOAD_LEN;

/// One SHDLC command: request construction, response-length validation,
/// and response interpretation.
///
/// Implementations are plain data; they are created per call and discarded
/// after interpretation.
pub trait Command {
    /// The interpreted response type.
    type Response;

    /// The command id (0..=255).
    fn id(&self) -> u8;

    /// The encoded request payload (0..=255 bytes, may be empty).
    fn data(&self) -> &[u8];

    /// Maximum time the device needs to respond; used as the response
    /// timeout for the exchange.
    fn max_response_time(&self) -> Duration;

    /// Time the device needs *after* sending the response before it is
    /// ready for the next command. Most commands need none; resets and
    /// bootloader entry do.
    fn post_processing_time(&self) -> Duration {
        Duration::ZERO
    }

    /// Minimum expected response payload length.
    fn min_response_length(&self) -> usize {
        0
    }

    /// Maximum expected response payload length.
    fn max_response_length(&self) -> usize {
        MAX_PAYLOAD_LEN
    }

    /// Check that the response payload length is within the declared
    /// bounds.
    fn check_response_length(&self, data: &[u8]) -> Result<()> {
        let min = self.min_response_length();
        let max = self.max_response_length();
        if data.len() < min || data.len() > max {
            return Err(Error::response_with_raw(
                format!(
                    "wrong response length (expected {}..={} bytes, got {})",
                    min,
                    max,
                    data.len()
                ),
                data,
            ));
        }
        Ok(())
    }

    /// Interpret the validated response payload into the typed result.
    fn interpret(&self, data: &[u8]) -> Result<Self::Response>;
}

/// An ad-hoc SHDLC command with no dedicated type.
///
/// Useful for device-specific commands not covered by the built-in
/// catalogue; the response payload is passed through uninterpreted.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use shdlc_core::command::{Command, RawCommand};
///
/// let cmd = RawCommand::new(0x80, vec![0x01, 0x02], Duration::from_millis(50))
///     .with_response_length(2, 4);
/// assert_eq!(cmd.id(), 0x80);
/// assert_eq!(cmd.data(), &[0x01, 0x02]);
/// ```
#[derive(Debug, Clone)]
pub struct RawCommand {
    id: u8,
    data: Vec<u8>,
    max_response_time: Duration,
    post_processing_time: Duration,
    min_response_length: usize,
    max_response_length: usize,
}

impl RawCommand {
    /// Create a raw command with default response bounds (0..=255 bytes)
    /// and no post-processing time.
    pub fn new(id: u8, data: Vec<u8>, max_response_time: Duration) -> Self {
        RawCommand {
            id,
            data,
            max_response_time,
            post_processing_time: Duration::ZERO,
            min_response_length: 0,
            max_response_length: MAX_PAYLOAD_LEN,
        }
    }

    /// Set the expected response payload length bounds.
    pub fn with_response_length(mut self, min: usize, max: usize) -> Self {
        self.min_response_length = min;
        self.max_response_length = max;
        self
    }

    /// Set the post-processing time the device needs after responding.
    pub fn with_post_processing_time(mut self, time: Duration) -> Self {
        self.post_processing_time = time;
        self
    }
}

impl Command for RawCommand {
    type Response = Vec<u8>;

    fn id(&self) -> u8 {
        self.id
    }

    fn data(&self) -> &[u8] {
        &self.data
    }

    fn max_response_time(&self) -> Duration {
        self.max_response_time
    }

    fn post_processing_time(&self) -> Duration {
        self.post_processing_time
    }

    fn min_response_length(&self) -> usize {
        self.min_response_length
    }

    fn max_response_length(&self) -> usize {
        self.max_response_length
    }

    fn interpret(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_command_defaults() {
        let cmd = RawCommand::new(0xD0, vec![0x00], Duration::from_millis(500));
        assert_eq!(cmd.id(), 0xD0);
        assert_eq!(cmd.data(), &[0x00]);
        assert_eq!(cmd.max_response_time(), Duration::from_millis(500));
        assert_eq!(cmd.post_processing_time(), Duration::ZERO);
        assert_eq!(cmd.min_response_length(), 0);
        assert_eq!(cmd.max_response_length(), MAX_PAYLOAD_LEN);
    }

    #[test]
    fn raw_command_interpret_passes_payload_through() {
        let cmd = RawCommand::new(0x00, vec![], Duration::from_millis(50));
        assert_eq!(cmd.interpret(&[0x0A, 0x0B]).unwrap(), vec![0x0A, 0x0B]);
        assert!(cmd.interpret(&[]).unwrap().is_empty());
    }

    #[test]
    fn check_response_length_within_bounds() {
        let cmd = RawCommand::new(0x00, vec![], Duration::from_millis(50))
            .with_response_length(2, 4);
        assert!(cmd.check_response_length(&[0x01, 0x02]).is_ok());
        assert!(cmd.check_response_length(&[0x01, 0x02, 0x03, 0x04]).is_ok());
    }

    #[test]
    fn check_response_length_too_short() {
        let cmd = RawCommand::new(0x00, vec![], Duration::from_millis(50))
            .with_response_length(2, 4);
        let err = cmd.check_response_length(&[0x01]).unwrap_err();
        match err {
            Error::Response { reason, raw } => {
                assert_eq!(reason, "wrong response length (expected 2..=4 bytes, got 1)");
                assert_eq!(raw, vec![0x01]);
            }
            other => panic!("expected Response error, got {other:?}"),
        }
    }

    #[test]
    fn check_response_length_too_long() {
        let cmd = RawCommand::new(0x00, vec![], Duration::from_millis(50))
            .with_response_length(0, 0);
        assert!(cmd.check_response_length(&[0x01]).is_err());
        assert!(cmd.check_response_length(&[]).is_ok());
    }

    #[test]
    fn post_processing_time_builder() {
        let cmd = RawCommand::new(0xD3, vec![], Duration::from_millis(500))
            .with_post_processing_time(Duration::from_secs(2));
        assert_eq!(cmd.post_processing_time(), Duration::from_secs(2));
    }
}
