//! SHDLC command 0x91: "Get/Set Baudrate".

use std::time::Duration;

use byteorder::{BigEndian, ByteOrder};

use shdlc_core::command::Command;
use shdlc_core::error::Result;

const ID: u8 = 0x91;

/// Read the baudrate configured on the device.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetBaudrate;

impl Command for GetBaudrate {
    type Response = u32;

    fn id(&self) -> u8 {
        ID
    }

    fn data(&self) -> &[u8] {
        &[]
    }

    fn max_response_time(&self) -> Duration {
        Duration::from_millis(50)
    }

    fn min_response_length(&self) -> usize {
        4
    }

    fn max_response_length(&self) -> usize {
        4
    }

    /// Baudrate in bit/s.
    fn interpret(&self, data: &[u8]) -> Result<u32> {
        Ok(BigEndian::read_u32(data))
    }
}

/// Store a new baudrate on the device.
///
/// The setting is persisted in non-volatile device memory; it survives
/// resets, so the driver's port bitrate must be adjusted to match before
/// further communication (see `Device::set_baudrate`).
#[derive(Debug, Clone, Copy)]
pub struct SetBaudrate {
    data: [u8; 4],
}

impl SetBaudrate {
    /// Encode a set-baudrate request for the given rate in bit/s.
    pub fn new(baudrate: u32) -> Self {
        let mut data = [0u8; 4];
        BigEndian::write_u32(&mut data, baudrate);
        SetBaudrate { data }
    }
}

impl Command for SetBaudrate {
    type Response = ();

    fn id(&self) -> u8 {
        ID
    }

    fn data(&self) -> &[u8] {
        &self.data
    }

    fn max_response_time(&self) -> Duration {
        Duration::from_millis(50)
    }

    fn max_response_length(&self) -> usize {
        0
    }

    fn interpret(&self, _data: &[u8]) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_baudrate_contract() {
        let cmd = GetBaudrate;
        assert_eq!(cmd.id(), 0x91);
        assert!(cmd.data().is_empty());
        assert_eq!(cmd.max_response_time(), Duration::from_millis(50));
        assert_eq!(cmd.post_processing_time(), Duration::ZERO);
        assert_eq!(cmd.min_response_length(), 4);
        assert_eq!(cmd.max_response_length(), 4);
    }

    #[test]
    fn get_baudrate_interpret() {
        let cmd = GetBaudrate;
        assert_eq!(cmd.interpret(&[0x00, 0x00, 0x00, 0x00]).unwrap(), 0);
        assert_eq!(cmd.interpret(&[0x00, 0x01, 0xC2, 0x00]).unwrap(), 115_200);
        assert_eq!(
            cmd.interpret(&[0xFF, 0xFF, 0xFF, 0xFF]).unwrap(),
            0xFFFF_FFFF
        );
    }

    #[test]
    fn get_baudrate_rejects_wrong_lengths() {
        let cmd = GetBaudrate;
        assert!(cmd.check_response_length(&[]).is_err());
        assert!(cmd.check_response_length(&[0x00, 0x00, 0x00]).is_err());
        assert!(cmd
            .check_response_length(&[0x00, 0x00, 0x00, 0x00, 0x00])
            .is_err());
        assert!(cmd.check_response_length(&[0x00, 0x00, 0x00, 0x00]).is_ok());
    }

    #[test]
    fn set_baudrate_encodes_big_endian() {
        let cmd = SetBaudrate::new(115_200);
        assert_eq!(cmd.id(), 0x91);
        assert_eq!(cmd.data(), &[0x00, 0x01, 0xC2, 0x00]);
        assert_eq!(cmd.max_response_length(), 0);
    }
}
