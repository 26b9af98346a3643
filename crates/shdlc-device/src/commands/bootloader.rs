//! SHDLC command 0xF3: "Bootloader".
//!
//! One command id serves the whole bootloader sequence, selected by the
//! first payload byte: enter bootloader (no payload), update start (0x01),
//! update data (0x02 + chunk), update stop (0x03 + checksum). See
//! [`FirmwareUpdate`](crate::firmware::FirmwareUpdate) for the
//! orchestration built on these.

use std::time::Duration;

use shdlc_core::command::Command;
use shdlc_core::error::Result;
use shdlc_core::frame::MAX_PAYLOAD_LEN;

const ID: u8 = 0xF3;

/// Maximum firmware chunk size per [`FirmwareUpdateData`] command; one
/// payload byte is taken by the subcommand.
pub const MAX_UPDATE_CHUNK_LEN: usize = MAX_PAYLOAD_LEN - 1;

/// Switch the device from the application firmware into the bootloader.
///
/// After the post-processing time the device listens on the fixed
/// bootloader bitrate and slave address, regardless of its configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnterBootloader;

impl Command for EnterBootloader {
    type Response = ();

    fn id(&self) -> u8 {
        ID
    }

    fn data(&self) -> &[u8] {
        &[]
    }

    fn max_response_time(&self) -> Duration {
        Duration::from_millis(100)
    }

    fn post_processing_time(&self) -> Duration {
        Duration::from_secs(2)
    }

    fn max_response_length(&self) -> usize {
        0
    }

    fn interpret(&self, _data: &[u8]) -> Result<()> {
        Ok(())
    }
}

/// Start the firmware update: the bootloader erases the application flash.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirmwareUpdateStart;

impl Command for FirmwareUpdateStart {
    type Response = ();

    fn id(&self) -> u8 {
        ID
    }

    fn data(&self) -> &[u8] {
        &[0x01]
    }

    /// Erasing the flash takes a long time on some devices; 20 seconds is
    /// safe for all known products.
    fn max_response_time(&self) -> Duration {
        Duration::from_secs(20)
    }

    fn max_response_length(&self) -> usize {
        0
    }

    fn interpret(&self, _data: &[u8]) -> Result<()> {
        Ok(())
    }
}

/// Send one chunk of firmware data to the bootloader.
#[derive(Debug, Clone)]
pub struct FirmwareUpdateData {
    data: Vec<u8>,
}

impl FirmwareUpdateData {
    /// Encode an update-data request carrying `chunk`.
    ///
    /// # Panics
    ///
    /// Panics if `chunk` is longer than [`MAX_UPDATE_CHUNK_LEN`] bytes.
    pub fn new(chunk: &[u8]) -> Self {
        assert!(
            chunk.len() <= MAX_UPDATE_CHUNK_LEN,
            "firmware chunk must not exceed {MAX_UPDATE_CHUNK_LEN} bytes"
        );
        let mut data = Vec::with_capacity(1 + chunk.len());
        data.push(0x02);
        data.extend_from_slice(chunk);
        FirmwareUpdateData { data }
    }
}

impl Command for FirmwareUpdateData {
    type Response = ();

    fn id(&self) -> u8 {
        ID
    }

    fn data(&self) -> &[u8] {
        &self.data
    }

    fn max_response_time(&self) -> Duration {
        Duration::from_secs(1)
    }

    fn max_response_length(&self) -> usize {
        0
    }

    fn interpret(&self, _data: &[u8]) -> Result<()> {
        Ok(())
    }
}

/// Finish the firmware update: the bootloader verifies the transferred
/// image against the checksum and boots into the new application.
#[derive(Debug, Clone, Copy)]
pub struct FirmwareUpdateStop {
    data: [u8; 2],
}

impl FirmwareUpdateStop {
    /// Encode an update-stop request with the application data checksum.
    pub fn new(checksum: u8) -> Self {
        FirmwareUpdateStop {
            data: [0x03, checksum],
        }
    }
}

impl Command for FirmwareUpdateStop {
    type Response = ();

    fn id(&self) -> u8 {
        ID
    }

    fn data(&self) -> &[u8] {
        &self.data
    }

    fn max_response_time(&self) -> Duration {
        Duration::from_secs(1)
    }

    fn post_processing_time(&self) -> Duration {
        Duration::from_secs(2)
    }

    fn max_response_length(&self) -> usize {
        0
    }

    fn interpret(&self, _data: &[u8]) -> Result<()> {
        Ok(())
    }
}
